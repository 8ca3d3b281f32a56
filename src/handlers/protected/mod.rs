// handlers/protected/mod.rs - Handlers behind the access-token gate
//
// Routes in this tier are wrapped by `middleware::require_auth`, so every
// handler can take an `AuthUser` extractor.

pub mod auth; // /auth/me
pub mod bills; // /bills[/:id]
pub mod diaries; // /diaries[/:id]
