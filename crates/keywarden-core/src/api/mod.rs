//! REST API client module for the vault server.
//!
//! This module provides the `ApiClient` for communicating with the vault's
//! credential, category, audit-log, and export endpoints.
//!
//! All data endpoints use bearer token authentication; the token is obtained
//! through `POST /auth/login` with the master password.

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse};
pub use error::ApiError;
