// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) -> Protected (access token required)

pub mod protected;
pub mod public;
