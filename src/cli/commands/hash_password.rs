use std::io::BufRead;

use anyhow::{bail, Context};
use clap::Args;

use crate::auth::password::{hash_password, DEFAULT_COST};

#[derive(Debug, Args)]
pub struct HashPasswordArgs {
    #[arg(long, default_value_t = DEFAULT_COST, help = "bcrypt cost factor (4-31)")]
    pub cost: u32,
}

/// Reads one line from stdin and prints its bcrypt hash.
pub fn handle(args: HashPasswordArgs) -> anyhow::Result<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    let secret = line.trim_end_matches(&['\r', '\n'][..]);
    if secret.is_empty() {
        bail!("empty password");
    }

    let hash = hash_password(secret, args.cost)?;
    println!("{}", hash);
    Ok(())
}
