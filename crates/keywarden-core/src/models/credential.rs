//! Credential records as served by the vault API.
//!
//! Sensitive fields (host, username, password, extra data) are encrypted at
//! rest on the server; the API returns them decrypted, so they are plain
//! strings here and must never be logged.

use serde::{Deserialize, Serialize};

/// Kind of system a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    Oracle,
    Linux,
    Ftp,
    S3,
}

impl CredentialType {
    pub const ALL: [CredentialType; 4] = [
        CredentialType::Oracle,
        CredentialType::Linux,
        CredentialType::Ftp,
        CredentialType::S3,
    ];

    /// Wire value, also used in query strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::Oracle => "oracle",
            CredentialType::Linux => "linux",
            CredentialType::Ftp => "ftp",
            CredentialType::S3 => "s3",
        }
    }

    /// Display label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialType::Oracle => "Oracle",
            CredentialType::Linux => "Linux",
            CredentialType::Ftp => "FTP",
            CredentialType::S3 => "S3",
        }
    }
}

/// A stored secret with its connection details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CredentialType,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Type-specific fields (Oracle service name, S3 bucket, ...), free-form.
    pub extra_data: Option<serde_json::Value>,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl Credential {
    /// "host:port" when both are present, otherwise whatever exists.
    pub fn location(&self) -> String {
        match (&self.host, self.port) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.clone(),
            (None, Some(port)) => format!(":{}", port),
            (None, None) => String::new(),
        }
    }
}

/// Body for creating a credential.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialDraft {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: CredentialType,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub extra_data: Option<serde_json::Value>,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub description: Option<String>,
}

/// Body for a partial update. Unset fields are omitted from the JSON so the
/// server leaves them untouched.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CredentialPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CredentialType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Query parameters for the credential listing.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CredentialFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<CredentialType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_credential_response() {
        let json = r##"{
            "id": 7,
            "name": "prod-db",
            "type": "oracle",
            "host": "db01.internal",
            "port": 1521,
            "username": "admin",
            "password": "hunter2",
            "extra_data": {"service_name": "ORCL"},
            "category_id": 2,
            "tags": ["prod", "db"],
            "description": "Primary database",
            "created_at": "2024-03-01T09:30:00",
            "updated_at": null,
            "category_name": "Databases",
            "category_color": "#6366f1"
        }"##;

        let cred: Credential = serde_json::from_str(json).expect("credential should parse");
        assert_eq!(cred.id, 7);
        assert_eq!(cred.kind, CredentialType::Oracle);
        assert_eq!(cred.location(), "db01.internal:1521");
        assert_eq!(cred.tags, vec!["prod", "db"]);
        assert_eq!(cred.category_name.as_deref(), Some("Databases"));
    }

    #[test]
    fn missing_tags_default_to_empty() {
        let json = r#"{
            "id": 1,
            "name": "ftp-drop",
            "type": "ftp",
            "created_at": "2024-01-01T00:00:00"
        }"#;
        let cred: Credential = serde_json::from_str(json).expect("credential should parse");
        assert!(cred.tags.is_empty());
        assert_eq!(cred.location(), "");
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let patch = CredentialPatch {
            password: Some("s3cret".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(body, serde_json::json!({"password": "s3cret"}));
    }

    #[test]
    fn filters_serialize_to_query_fields() {
        let filters = CredentialFilters {
            page: Some(2),
            kind: Some(CredentialType::S3),
            search: Some("bucket".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&filters).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"page": 2, "type": "s3", "search": "bucket"})
        );
    }
}
