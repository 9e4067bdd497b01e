//! Authentication module for the vault session lifecycle.
//!
//! This module provides:
//! - `SessionStore`: token + expiry pair with lazy expiry checking
//! - `TokenStorage`: minimal key-value persistence trait, with file-backed
//!   and in-memory implementations
//!
//! Sessions persist across restarts; the token expires server-side after
//! the interval returned at login.

pub mod session;
pub mod storage;

pub use session::{AuthGrant, Authenticator, SessionStore};
pub use storage::{FileStore, MemoryStore, TokenStorage, EXPIRES_AT_KEY, TOKEN_KEY};
