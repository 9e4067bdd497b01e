//! Audit trail entries recorded by the server for every credential access.

use serde::{Deserialize, Serialize};

/// What was done to a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    View,
    Copy,
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub const ALL: [AuditAction; 5] = [
        AuditAction::View,
        AuditAction::Copy,
        AuditAction::Create,
        AuditAction::Update,
        AuditAction::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::View => "view",
            AuditAction::Copy => "copy",
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::View => "View",
            AuditAction::Copy => "Copy",
            AuditAction::Create => "Create",
            AuditAction::Update => "Update",
            AuditAction::Delete => "Delete",
        }
    }
}

/// One audit log row. `credential_id` is null once the credential has been
/// deleted; the name is denormalized so the entry stays meaningful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: i64,
    pub credential_id: Option<i64>,
    pub credential_name: Option<String>,
    pub action: AuditAction,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: String,
}

/// Query parameters for the audit log listing.
#[derive(Debug, Clone, Serialize, Default)]
pub struct AuditLogFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<AuditAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;

    #[test]
    fn parse_audit_log_page() {
        let json = r#"{
            "items": [
                {
                    "id": 31,
                    "credential_id": null,
                    "credential_name": "prod-db",
                    "action": "delete",
                    "ip_address": "10.0.0.5",
                    "user_agent": "keywarden/0.2",
                    "created_at": "2024-03-02T12:00:00"
                }
            ],
            "total": 1,
            "page": 1,
            "page_size": 50,
            "total_pages": 1
        }"#;

        let page: Page<AuditLog> = serde_json::from_str(json).expect("audit page should parse");
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].action, AuditAction::Delete);
        assert_eq!(page.items[0].credential_id, None);
        assert_eq!(page.items[0].credential_name.as_deref(), Some("prod-db"));
    }
}
