//! Credential categories.

use serde::{Deserialize, Serialize};

/// A named grouping of credentials, with a display color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub credential_count: i64,
}

/// Body for creating a category. The server picks a default color when none
/// is given.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Body for a partial category update.
#[derive(Debug, Clone, Serialize, Default)]
pub struct CategoryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_category_response() {
        let json = r##"{
            "id": 2,
            "name": "Databases",
            "color": "#6366f1",
            "created_at": "2024-02-10T08:00:00",
            "updated_at": "2024-02-11T10:00:00",
            "credential_count": 5
        }"##;
        let category: Category = serde_json::from_str(json).expect("category should parse");
        assert_eq!(category.name, "Databases");
        assert_eq!(category.credential_count, 5);
    }

    #[test]
    fn draft_omits_unset_color() {
        let draft = CategoryDraft {
            name: "Servers".to_string(),
            color: None,
        };
        let body = serde_json::to_value(&draft).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Servers"}));
    }
}
