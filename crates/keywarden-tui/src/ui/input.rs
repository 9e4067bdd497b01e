//! Keyboard input handling for the TUI.
//!
//! Translates key events into `App` state changes. Modal modes (search,
//! category editing, delete confirmation) are handled before per-screen
//! keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use keywarden_core::router::RouteName;

use crate::app::{App, FormField, Mode};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Any keypress clears the previous status message
    app.status = None;

    match app.mode {
        Mode::Searching => {
            handle_search_input(app, key).await;
            return Ok(false);
        }
        Mode::EditingCategory => {
            handle_category_edit_input(app, key).await;
            return Ok(false);
        }
        Mode::ConfirmingDelete => {
            handle_confirm_delete_input(app, key).await;
            return Ok(false);
        }
        Mode::Normal => {}
    }

    match app.route {
        RouteName::Login => handle_login_input(app, key).await,
        RouteName::Dashboard => handle_dashboard_input(app, key).await,
        RouteName::CredentialNew | RouteName::CredentialEdit => {
            handle_form_input(app, key).await;
            Ok(false)
        }
        RouteName::Categories => handle_categories_input(app, key).await,
        RouteName::AuditLogs => handle_audit_input(app, key).await,
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => return Ok(true),
        KeyCode::Enter => app.submit_login().await,
        KeyCode::Backspace => {
            app.password_input.pop();
        }
        KeyCode::Char(c) => {
            if app.can_add_password_char() {
                app.password_input.push(c);
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Char('2') => app.navigate(RouteName::Categories).await,
        KeyCode::Char('3') => app.navigate(RouteName::AuditLogs).await,
        KeyCode::Up | KeyCode::Char('k') => {
            app.cred_selection = app.cred_selection.saturating_sub(1);
            app.reveal_password = false;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.cred_selection + 1 < app.credentials.items.len() {
                app.cred_selection += 1;
            }
            app.reveal_password = false;
        }
        KeyCode::Left | KeyCode::Char('<') => app.prev_credential_page().await,
        KeyCode::Right | KeyCode::Char('>') => app.next_credential_page().await,
        KeyCode::Char('/') => app.mode = Mode::Searching,
        KeyCode::Char('t') => app.cycle_kind_filter().await,
        KeyCode::Char('n') => app.open_new_form().await,
        KeyCode::Char('e') => app.open_edit_form().await,
        KeyCode::Char('d') => {
            if app.selected_credential().is_some() {
                app.mode = Mode::ConfirmingDelete;
            }
        }
        KeyCode::Char('p') => app.reveal_password = !app.reveal_password,
        KeyCode::Char('c') => app.record_copy("password").await,
        KeyCode::Char('x') => app.export_credentials().await,
        KeyCode::Char('r') => app.refresh_credentials().await,
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }
    Ok(false)
}

async fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.navigate(RouteName::Dashboard).await,
        KeyCode::Tab | KeyCode::Down => app.form.field = app.form.field.next(),
        KeyCode::BackTab | KeyCode::Up => app.form.field = app.form.field.prev(),
        KeyCode::Left => match app.form.field {
            FormField::Kind => app.cycle_form_kind(false),
            FormField::Category => app.cycle_form_category(false),
            _ => {}
        },
        KeyCode::Right => match app.form.field {
            FormField::Kind => app.cycle_form_kind(true),
            FormField::Category => app.cycle_form_category(true),
            _ => {}
        },
        KeyCode::Enter => {
            if app.form.field.is_last() {
                app.submit_form().await;
            } else {
                app.form.field = app.form.field.next();
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = app.form.active_text_mut() {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = app.form.active_text_mut() {
                text.push(c);
            }
        }
        _ => {}
    }
}

async fn handle_categories_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Esc | KeyCode::Char('1') => app.navigate(RouteName::Dashboard).await,
        KeyCode::Char('3') => app.navigate(RouteName::AuditLogs).await,
        KeyCode::Up | KeyCode::Char('k') => {
            app.category_selection = app.category_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.category_selection + 1 < app.categories.len() {
                app.category_selection += 1;
            }
        }
        KeyCode::Char('a') => app.start_category_add(),
        KeyCode::Char('e') => app.start_category_rename(),
        KeyCode::Char('d') => {
            if app.selected_category().is_some() {
                app.mode = Mode::ConfirmingDelete;
            }
        }
        KeyCode::Char('r') => app.refresh_categories().await,
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }
    Ok(false)
}

async fn handle_audit_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Char('q') => return Ok(true),
        KeyCode::Esc | KeyCode::Char('1') => app.navigate(RouteName::Dashboard).await,
        KeyCode::Char('2') => app.navigate(RouteName::Categories).await,
        KeyCode::Up | KeyCode::Char('k') => {
            app.audit_selection = app.audit_selection.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.audit_selection + 1 < app.audit_logs.items.len() {
                app.audit_selection += 1;
            }
        }
        KeyCode::Left | KeyCode::Char('<') => app.prev_audit_page().await,
        KeyCode::Right | KeyCode::Char('>') => app.next_audit_page().await,
        KeyCode::Char('f') => app.cycle_action_filter().await,
        KeyCode::Char('r') => app.refresh_audit_logs().await,
        KeyCode::Char('L') => app.logout().await,
        _ => {}
    }
    Ok(false)
}

async fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
        }
        KeyCode::Enter => {
            app.mode = Mode::Normal;
            app.apply_search().await;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
        }
        KeyCode::Char(c) => app.search_input.push(c),
        _ => {}
    }
}

async fn handle_category_edit_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            app.category_editing = None;
        }
        KeyCode::Enter => app.submit_category().await,
        KeyCode::Backspace => {
            app.category_input.pop();
        }
        KeyCode::Char(c) => app.category_input.push(c),
        _ => {}
    }
}

async fn handle_confirm_delete_input(app: &mut App, key: KeyEvent) {
    let confirmed = matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'));
    app.mode = Mode::Normal;
    if !confirmed {
        return;
    }
    match app.route {
        RouteName::Categories => app.delete_selected_category().await,
        _ => app.delete_selected_credential().await,
    }
}
