//! Data models for vault entities.
//!
//! These mirror the server's response schemas:
//!
//! - `Credential` and its create/update/filter companions
//! - `Category` with credential counts
//! - `AuditLog` entries
//! - `Page<T>`: the shared pagination envelope

use serde::Deserialize;

pub mod audit;
pub mod category;
pub mod credential;

pub use audit::{AuditAction, AuditLog, AuditLogFilters};
pub use category::{Category, CategoryDraft, CategoryPatch};
pub use credential::{
    Credential, CredentialDraft, CredentialFilters, CredentialPatch, CredentialType,
};

/// Pagination envelope used by the credential and audit-log listings.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    /// An empty first page, for initial UI state.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 1,
            page_size: 0,
            total_pages: 0,
        }
    }
}
