//! Owner scoping for per-user records.
//!
//! Repository methods that touch bills or diary entries take an [`Owner`],
//! and every query they issue filters on `user_id = owner`. A record that
//! belongs to someone else is indistinguishable from one that does not exist.

use crate::middleware::AuthUser;

/// Id of the authenticated user on whose behalf a query runs.
///
/// Only obtainable from an [`AuthUser`], so handlers cannot scope a query to
/// an id taken from the request body or path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner(i32);

impl Owner {
    pub fn id(self) -> i32 {
        self.0
    }
}

impl From<&AuthUser> for Owner {
    fn from(user: &AuthUser) -> Self {
        Owner(user.user_id)
    }
}
