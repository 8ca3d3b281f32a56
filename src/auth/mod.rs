//! Credential checks, token minting and session rotation.

pub mod error;
pub mod password;
pub mod session;
pub mod token;

pub use error::AuthError;
pub use password::{hash_password, verify_password};
pub use session::{SessionManager, TokenPair};
pub use token::{Claims, TokenCodec, TokenSubject, TokenType};
