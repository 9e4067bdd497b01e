//! Application state management for the keywarden TUI.
//!
//! This module contains the core `App` struct that holds the session, the
//! API client, the current screen, and per-screen UI state. Every screen
//! change goes through `App::navigate`, which applies the navigation guard's
//! decision before switching.

use chrono::Utc;
use tracing::{debug, warn};

use keywarden_core::api::ApiClient;
use keywarden_core::auth::{FileStore, SessionStore};
use keywarden_core::config::Config;
use keywarden_core::models::{
    AuditAction, AuditLog, AuditLogFilters, Category, CategoryDraft, CategoryPatch, Credential,
    CredentialDraft, CredentialFilters, CredentialPatch, CredentialType, Page,
};
use keywarden_core::router::{self, Decision, RouteName};

// ============================================================================
// Constants
// ============================================================================

/// Credentials fetched per page.
const CREDENTIAL_PAGE_SIZE: u32 = 20;

/// Audit log entries fetched per page.
const AUDIT_PAGE_SIZE: u32 = 50;

/// File name for spreadsheet exports written into the data directory.
const EXPORT_FILE: &str = "keywarden-export.xlsx";

/// Maximum length for the master password input.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Input mode layered on top of the current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing into the dashboard search box.
    Searching,
    /// Typing a category name (add or rename).
    EditingCategory,
    /// Waiting for y/n on a delete.
    ConfirmingDelete,
}

/// Fields of the credential form, in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Kind,
    Host,
    Port,
    Username,
    Password,
    Category,
    Tags,
    Description,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::Name,
        FormField::Kind,
        FormField::Host,
        FormField::Port,
        FormField::Username,
        FormField::Password,
        FormField::Category,
        FormField::Tags,
        FormField::Description,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Name => "Name",
            FormField::Kind => "Type",
            FormField::Host => "Host",
            FormField::Port => "Port",
            FormField::Username => "Username",
            FormField::Password => "Password",
            FormField::Category => "Category",
            FormField::Tags => "Tags",
            FormField::Description => "Description",
        }
    }

    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn is_last(&self) -> bool {
        *self == FormField::Description
    }
}

/// Editable state of the credential form (new and edit screens).
#[derive(Debug, Clone)]
pub struct CredentialForm {
    /// `Some(id)` when editing an existing credential.
    pub editing_id: Option<i64>,
    pub name: String,
    pub kind: CredentialType,
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    /// Comma-separated in the form, split on submit.
    pub tags: String,
    pub description: String,
    /// Index into the loaded category list; `None` = uncategorized.
    pub category_index: Option<usize>,
    pub field: FormField,
    pub error: Option<String>,
}

impl Default for CredentialForm {
    fn default() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            kind: CredentialType::Linux,
            host: String::new(),
            port: String::new(),
            username: String::new(),
            password: String::new(),
            tags: String::new(),
            description: String::new(),
            category_index: None,
            field: FormField::Name,
            error: None,
        }
    }
}

impl CredentialForm {
    fn from_credential(credential: &Credential, categories: &[Category]) -> Self {
        Self {
            editing_id: Some(credential.id),
            name: credential.name.clone(),
            kind: credential.kind,
            host: credential.host.clone().unwrap_or_default(),
            port: credential.port.map(|p| p.to_string()).unwrap_or_default(),
            username: credential.username.clone().unwrap_or_default(),
            password: credential.password.clone().unwrap_or_default(),
            tags: credential.tags.join(", "),
            description: credential.description.clone().unwrap_or_default(),
            category_index: credential
                .category_id
                .and_then(|id| categories.iter().position(|c| c.id == id)),
            field: FormField::Name,
            error: None,
        }
    }

    fn split_tags(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn none_if_empty(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Currently selected text buffer, if the focused field is free text.
    pub fn active_text_mut(&mut self) -> Option<&mut String> {
        match self.field {
            FormField::Name => Some(&mut self.name),
            FormField::Host => Some(&mut self.host),
            FormField::Port => Some(&mut self.port),
            FormField::Username => Some(&mut self.username),
            FormField::Password => Some(&mut self.password),
            FormField::Tags => Some(&mut self.tags),
            FormField::Description => Some(&mut self.description),
            FormField::Kind | FormField::Category => None,
        }
    }
}

// ============================================================================
// App
// ============================================================================

/// Top-level application state.
pub struct App {
    pub config: Config,
    pub session: SessionStore<FileStore>,
    pub api: ApiClient,
    pub route: RouteName,
    pub mode: Mode,

    // Login screen
    pub password_input: String,
    pub login_error: Option<String>,

    // Dashboard
    pub credentials: Page<Credential>,
    pub cred_page: u32,
    pub cred_selection: usize,
    pub search_input: String,
    pub filter_kind: Option<CredentialType>,
    pub reveal_password: bool,

    // Categories screen
    pub categories: Vec<Category>,
    pub category_selection: usize,
    pub category_input: String,
    /// `Some(id)` while renaming, `None` while adding.
    pub category_editing: Option<i64>,

    // Audit log screen
    pub audit_logs: Page<AuditLog>,
    pub audit_page: u32,
    pub audit_selection: usize,
    pub filter_action: Option<AuditAction>,

    // Credential form
    pub form: CredentialForm,

    /// One-line status message shown in the footer.
    pub status: Option<String>,
}

impl App {
    pub fn new(config: Config, session: SessionStore<FileStore>, api: ApiClient) -> Self {
        Self {
            config,
            session,
            api,
            route: RouteName::Login,
            mode: Mode::Normal,
            password_input: String::new(),
            login_error: None,
            credentials: Page::empty(),
            cred_page: 1,
            cred_selection: 0,
            search_input: String::new(),
            filter_kind: None,
            reveal_password: false,
            categories: Vec::new(),
            category_selection: 0,
            category_input: String::new(),
            category_editing: None,
            audit_logs: Page::empty(),
            audit_page: 1,
            audit_selection: 0,
            filter_action: None,
            form: CredentialForm::default(),
            status: None,
        }
    }

    // ===== Navigation =====

    /// Switch screens, honoring the guard. The guard decision is applied
    /// here; a redirect replaces the requested target entirely.
    pub async fn navigate(&mut self, target: RouteName) {
        let mut destination = target;
        // A redirect target is re-checked; the guard converges in one hop
        // but looping keeps that an implementation detail.
        loop {
            let route = router::find(destination);
            match router::decide(route, self.session.is_authenticated()) {
                Decision::Allow => break,
                Decision::RedirectTo(next) => {
                    debug!(?destination, ?next, "Navigation redirected");
                    destination = next;
                }
            }
        }

        self.mode = Mode::Normal;
        self.reveal_password = false;
        self.route = destination;

        match destination {
            RouteName::Dashboard => self.refresh_credentials().await,
            RouteName::Categories => self.refresh_categories().await,
            RouteName::AuditLogs => self.refresh_audit_logs().await,
            RouteName::Login | RouteName::CredentialNew | RouteName::CredentialEdit => {}
        }
    }

    // ===== Session =====

    /// Submit the login form. Keeps the password out of logs and state on
    /// either outcome.
    pub async fn submit_login(&mut self) {
        let password = std::mem::take(&mut self.password_input);
        if password.is_empty() {
            self.login_error = Some("Enter the master password".to_string());
            return;
        }

        if self.session.login(&self.api, &password).await {
            if let Some(token) = self.session.token() {
                self.api.set_token(token.to_string());
            }
            self.login_error = None;
            self.status = Some("Unlocked".to_string());
            self.navigate(RouteName::Dashboard).await;
        } else {
            self.login_error =
                Some("Login failed - check the password and the server".to_string());
        }
    }

    pub async fn logout(&mut self) {
        self.session.logout();
        self.api.clear_token();
        self.status = Some("Locked".to_string());
        // The guard bounces this to the login screen.
        self.navigate(RouteName::Dashboard).await;
    }

    /// Whole minutes until the session expires, for the footer.
    pub fn session_minutes_left(&self) -> Option<i64> {
        let expires_at = self.session.expires_at()?;
        let left_ms = expires_at - Utc::now().timestamp_millis();
        Some((left_ms / 60_000).max(0))
    }

    pub fn can_add_password_char(&self) -> bool {
        self.password_input.len() < MAX_PASSWORD_LENGTH
    }

    // ===== Dashboard =====

    fn credential_filters(&self) -> CredentialFilters {
        CredentialFilters {
            page: Some(self.cred_page),
            page_size: Some(CREDENTIAL_PAGE_SIZE),
            search: if self.search_input.is_empty() {
                None
            } else {
                Some(self.search_input.clone())
            },
            kind: self.filter_kind,
            category_id: None,
        }
    }

    pub async fn refresh_credentials(&mut self) {
        match self.api.list_credentials(&self.credential_filters()).await {
            Ok(page) => {
                self.credentials = page;
                if self.cred_selection >= self.credentials.items.len() {
                    self.cred_selection = self.credentials.items.len().saturating_sub(1);
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch credentials");
                self.status = Some(format!("Failed to load credentials: {}", err));
            }
        }
    }

    pub fn selected_credential(&self) -> Option<&Credential> {
        self.credentials.items.get(self.cred_selection)
    }

    pub async fn next_credential_page(&mut self) {
        if self.cred_page < self.credentials.total_pages.max(1) {
            self.cred_page += 1;
            self.cred_selection = 0;
            self.refresh_credentials().await;
        }
    }

    pub async fn prev_credential_page(&mut self) {
        if self.cred_page > 1 {
            self.cred_page -= 1;
            self.cred_selection = 0;
            self.refresh_credentials().await;
        }
    }

    /// Apply the search box and reload from page one.
    pub async fn apply_search(&mut self) {
        self.cred_page = 1;
        self.refresh_credentials().await;
    }

    /// Cycle the type filter: all -> oracle -> linux -> ftp -> s3 -> all.
    pub async fn cycle_kind_filter(&mut self) {
        self.filter_kind = match self.filter_kind {
            None => Some(CredentialType::ALL[0]),
            Some(current) => CredentialType::ALL
                .iter()
                .position(|k| *k == current)
                .and_then(|idx| CredentialType::ALL.get(idx + 1))
                .copied(),
        };
        self.cred_page = 1;
        self.refresh_credentials().await;
    }

    pub async fn delete_selected_credential(&mut self) {
        let Some((id, name)) = self
            .selected_credential()
            .map(|c| (c.id, c.name.clone()))
        else {
            return;
        };

        match self.api.delete_credential(id).await {
            Ok(()) => {
                self.status = Some(format!("Deleted '{}'", name));
                self.refresh_credentials().await;
            }
            Err(err) => {
                warn!(error = %err, id, "Failed to delete credential");
                self.status = Some(format!("Delete failed: {}", err));
            }
        }
    }

    /// Record a copy of the selected credential's field in the audit trail.
    pub async fn record_copy(&mut self, field: &str) {
        let Some(id) = self.selected_credential().map(|c| c.id) else {
            return;
        };
        match self.api.log_copy(id, field).await {
            Ok(()) => self.status = Some(format!("Copy of {} recorded", field)),
            Err(err) => {
                warn!(error = %err, id, field, "Failed to record copy");
                self.status = Some(format!("Copy audit failed: {}", err));
            }
        }
    }

    /// Download the spreadsheet export into the data directory.
    pub async fn export_credentials(&mut self) {
        let path = match self.config.data_dir() {
            Ok(dir) => dir.join(EXPORT_FILE),
            Err(err) => {
                self.status = Some(format!("Export failed: {}", err));
                return;
            }
        };

        match self.api.export_excel().await {
            Ok(bytes) => {
                let result = path
                    .parent()
                    .map(std::fs::create_dir_all)
                    .unwrap_or(Ok(()))
                    .and_then(|_| std::fs::write(&path, &bytes));
                match result {
                    Ok(()) => self.status = Some(format!("Exported to {}", path.display())),
                    Err(err) => self.status = Some(format!("Export write failed: {}", err)),
                }
            }
            Err(err) => {
                warn!(error = %err, "Export download failed");
                self.status = Some(format!("Export failed: {}", err));
            }
        }
    }

    // ===== Credential form =====

    pub async fn open_new_form(&mut self) {
        self.ensure_categories().await;
        self.form = CredentialForm::default();
        self.navigate(RouteName::CredentialNew).await;
    }

    pub async fn open_edit_form(&mut self) {
        self.ensure_categories().await;
        let Some(id) = self.selected_credential().map(|c| c.id) else {
            return;
        };
        // Fetch the full record rather than trusting the list row
        let credential = match self.api.get_credential(id).await {
            Ok(full) => full,
            Err(err) => {
                warn!(error = %err, "Failed to fetch credential for editing");
                self.status = Some(format!("Failed to load credential: {}", err));
                return;
            }
        };
        self.form = CredentialForm::from_credential(&credential, &self.categories);
        self.navigate(RouteName::CredentialEdit).await;
    }

    fn form_category_id(&self) -> Option<i64> {
        self.form
            .category_index
            .and_then(|idx| self.categories.get(idx))
            .map(|c| c.id)
    }

    /// Cycle the form's category selection (None = uncategorized).
    pub fn cycle_form_category(&mut self, forward: bool) {
        let count = self.categories.len();
        if count == 0 {
            return;
        }
        self.form.category_index = if forward {
            match self.form.category_index {
                None => Some(0),
                Some(idx) if idx + 1 < count => Some(idx + 1),
                Some(_) => None,
            }
        } else {
            match self.form.category_index {
                None => Some(count - 1),
                Some(0) => None,
                Some(idx) => Some(idx - 1),
            }
        };
    }

    pub fn cycle_form_kind(&mut self, forward: bool) {
        let idx = CredentialType::ALL
            .iter()
            .position(|k| *k == self.form.kind)
            .unwrap_or(0);
        let len = CredentialType::ALL.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.form.kind = CredentialType::ALL[next];
    }

    /// Create or update from the form. On success returns to the dashboard.
    pub async fn submit_form(&mut self) {
        if self.form.name.trim().is_empty() {
            self.form.error = Some("Name is required".to_string());
            return;
        }
        let port = match self.form.port.trim() {
            "" => None,
            raw => match raw.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    self.form.error = Some("Port must be a number".to_string());
                    return;
                }
            },
        };

        let category_id = self.form_category_id();
        let outcome = if let Some(id) = self.form.editing_id {
            // Empty optional fields are omitted so the server keeps its
            // current values.
            let patch = CredentialPatch {
                name: Some(self.form.name.trim().to_string()),
                kind: Some(self.form.kind),
                host: CredentialForm::none_if_empty(&self.form.host),
                port,
                username: CredentialForm::none_if_empty(&self.form.username),
                password: CredentialForm::none_if_empty(&self.form.password),
                extra_data: None,
                category_id,
                tags: Some(self.form.split_tags()),
                description: CredentialForm::none_if_empty(&self.form.description),
            };
            self.api.update_credential(id, &patch).await.map(|_| "Saved")
        } else {
            let draft = CredentialDraft {
                name: self.form.name.trim().to_string(),
                kind: self.form.kind,
                host: CredentialForm::none_if_empty(&self.form.host),
                port,
                username: CredentialForm::none_if_empty(&self.form.username),
                password: CredentialForm::none_if_empty(&self.form.password),
                extra_data: None,
                category_id,
                tags: self.form.split_tags(),
                description: CredentialForm::none_if_empty(&self.form.description),
            };
            self.api.create_credential(&draft).await.map(|_| "Created")
        };

        match outcome {
            Ok(verb) => {
                self.status = Some(format!("{} '{}'", verb, self.form.name.trim()));
                self.navigate(RouteName::Dashboard).await;
            }
            Err(err) => {
                warn!(error = %err, "Credential save failed");
                self.form.error = Some(format!("Save failed: {}", err));
            }
        }
    }

    // ===== Categories =====

    async fn ensure_categories(&mut self) {
        if self.categories.is_empty() {
            self.refresh_categories().await;
        }
    }

    pub async fn refresh_categories(&mut self) {
        match self.api.list_categories().await {
            Ok(categories) => {
                self.categories = categories;
                if self.category_selection >= self.categories.len() {
                    self.category_selection = self.categories.len().saturating_sub(1);
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch categories");
                self.status = Some(format!("Failed to load categories: {}", err));
            }
        }
    }

    pub fn selected_category(&self) -> Option<&Category> {
        self.categories.get(self.category_selection)
    }

    pub fn start_category_add(&mut self) {
        self.category_input.clear();
        self.category_editing = None;
        self.mode = Mode::EditingCategory;
    }

    pub fn start_category_rename(&mut self) {
        if let Some(category) = self.selected_category() {
            let name = category.name.clone();
            let id = category.id;
            self.category_input = name;
            self.category_editing = Some(id);
            self.mode = Mode::EditingCategory;
        }
    }

    /// Finish the add/rename started above.
    pub async fn submit_category(&mut self) {
        let name = self.category_input.trim().to_string();
        self.mode = Mode::Normal;
        if name.is_empty() {
            return;
        }

        let outcome = match self.category_editing.take() {
            Some(id) => {
                let patch = CategoryPatch {
                    name: Some(name.clone()),
                    color: None,
                };
                self.api.update_category(id, &patch).await.map(|_| "Renamed")
            }
            None => {
                let draft = CategoryDraft {
                    name: name.clone(),
                    color: None,
                };
                self.api.create_category(&draft).await.map(|_| "Added")
            }
        };

        match outcome {
            Ok(verb) => {
                self.status = Some(format!("{} category '{}'", verb, name));
                self.refresh_categories().await;
            }
            Err(err) => {
                warn!(error = %err, "Category save failed");
                self.status = Some(format!("Category save failed: {}", err));
            }
        }
    }

    pub async fn delete_selected_category(&mut self) {
        let Some((id, name)) = self.selected_category().map(|c| (c.id, c.name.clone())) else {
            return;
        };
        match self.api.delete_category(id).await {
            Ok(()) => {
                self.status = Some(format!("Deleted category '{}'", name));
                self.refresh_categories().await;
            }
            Err(err) => {
                warn!(error = %err, id, "Failed to delete category");
                self.status = Some(format!("Delete failed: {}", err));
            }
        }
    }

    // ===== Audit log =====

    fn audit_filters(&self) -> AuditLogFilters {
        AuditLogFilters {
            page: Some(self.audit_page),
            page_size: Some(AUDIT_PAGE_SIZE),
            action: self.filter_action,
            credential_id: None,
        }
    }

    pub async fn refresh_audit_logs(&mut self) {
        match self.api.list_audit_logs(&self.audit_filters()).await {
            Ok(page) => {
                self.audit_logs = page;
                if self.audit_selection >= self.audit_logs.items.len() {
                    self.audit_selection = self.audit_logs.items.len().saturating_sub(1);
                }
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch audit logs");
                self.status = Some(format!("Failed to load audit log: {}", err));
            }
        }
    }

    pub async fn next_audit_page(&mut self) {
        if self.audit_page < self.audit_logs.total_pages.max(1) {
            self.audit_page += 1;
            self.audit_selection = 0;
            self.refresh_audit_logs().await;
        }
    }

    pub async fn prev_audit_page(&mut self) {
        if self.audit_page > 1 {
            self.audit_page -= 1;
            self.audit_selection = 0;
            self.refresh_audit_logs().await;
        }
    }

    /// Cycle the action filter: all -> view -> copy -> create -> update ->
    /// delete -> all.
    pub async fn cycle_action_filter(&mut self) {
        self.filter_action = match self.filter_action {
            None => Some(AuditAction::ALL[0]),
            Some(current) => AuditAction::ALL
                .iter()
                .position(|a| *a == current)
                .and_then(|idx| AuditAction::ALL.get(idx + 1))
                .copied(),
        };
        self.audit_page = 1;
        self.refresh_audit_logs().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app(name: &str) -> App {
        let path = std::env::temp_dir().join(format!(
            "keywarden-app-test-{}-{}.json",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);
        let session = SessionStore::new(FileStore::new(path));
        let api = ApiClient::new("http://localhost:1/api").unwrap();
        App::new(Config::default(), session, api)
    }

    #[tokio::test]
    async fn unauthenticated_navigation_lands_on_login() {
        let mut app = test_app("nav-login");
        app.navigate(RouteName::Dashboard).await;
        assert_eq!(app.route, RouteName::Login);

        app.navigate(RouteName::AuditLogs).await;
        assert_eq!(app.route, RouteName::Login);
    }

    #[tokio::test]
    async fn failed_login_stays_on_login_with_error() {
        // Port 1 is never listening, so the login transport fails.
        let mut app = test_app("login-fail");
        app.password_input = "wrong".to_string();
        app.submit_login().await;
        assert_eq!(app.route, RouteName::Login);
        assert!(app.login_error.is_some());
        assert!(!app.session.is_authenticated());
        // The password input is consumed either way
        assert!(app.password_input.is_empty());
    }

    #[test]
    fn form_field_traversal_wraps() {
        let mut field = FormField::Name;
        for _ in 0..FormField::ALL.len() {
            field = field.next();
        }
        assert_eq!(field, FormField::Name);
        assert_eq!(FormField::Name.prev(), FormField::Description);
    }

    #[test]
    fn form_tags_split_and_trim() {
        let form = CredentialForm {
            tags: " prod, db ,, web ".to_string(),
            ..Default::default()
        };
        assert_eq!(form.split_tags(), vec!["prod", "db", "web"]);
    }
}
