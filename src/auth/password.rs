use super::AuthError;

pub use bcrypt::DEFAULT_COST;

/// Well-formed hash at [`DEFAULT_COST`] that no password matches. Checked
/// when the account does not exist so both login failures cost one bcrypt run.
pub const UNKNOWN_ACCOUNT_HASH: &str = "$2b$12$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

/// Checks `candidate` against a stored bcrypt hash.
///
/// A hash that cannot be parsed is treated like a mismatch so that callers
/// cannot distinguish corrupt records from wrong passwords.
pub fn verify_password(stored_hash: &str, candidate: &str) -> Result<(), AuthError> {
    match bcrypt::verify(candidate, stored_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::InvalidCredentials),
        Err(e) => {
            tracing::warn!("Stored password hash could not be checked: {}", e);
            Err(AuthError::InvalidCredentials)
        }
    }
}

/// Produces a salted bcrypt hash for seeding accounts.
pub fn hash_password(secret: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(secret, cost).map_err(|e| AuthError::internal(format!("password hashing failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn accepts_matching_secret() {
        let hash = hash_password("correct-pw", TEST_COST).unwrap();
        assert!(verify_password(&hash, "correct-pw").is_ok());
    }

    #[test]
    fn rejects_wrong_secret() {
        let hash = hash_password("correct-pw", TEST_COST).unwrap();
        assert!(matches!(
            verify_password(&hash, "wrong-pw"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn corrupt_hash_reads_as_invalid_credentials() {
        assert!(matches!(
            verify_password("not-a-bcrypt-hash", "anything"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("same", TEST_COST).unwrap();
        let b = hash_password("same", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_account_hash_is_checked_at_default_cost() {
        assert!(UNKNOWN_ACCOUNT_HASH.starts_with(&format!("$2b${}$", DEFAULT_COST)));
        // a parse failure would skip the key schedule entirely
        assert!(matches!(bcrypt::verify("anything", UNKNOWN_ACCOUNT_HASH), Ok(false)));
    }
}
