use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use keywarden_core::router::RouteName;

use crate::app::{App, FormField, Mode};
use crate::utils::{format_date, format_optional, truncate_string};

use super::styles;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.mode, Mode::ConfirmingDelete) {
        render_delete_overlay(frame, app);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  KeyWarden";
    let screen = app.route.title();

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::styled(format!("  -  {}", screen), styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    // Credential form screens belong to the credentials tab
    let credentials_active = matches!(
        app.route,
        RouteName::Dashboard | RouteName::CredentialNew | RouteName::CredentialEdit
    );
    let tabs = vec![
        ("[1] Credentials", credentials_active),
        ("[2] Categories", app.route == RouteName::Categories),
        ("[3] Audit Log", app.route == RouteName::AuditLogs),
    ];

    let mut spans = vec![Span::raw(" ")];
    for (i, (label, selected)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*selected)));
    }

    if app.route == RouteName::Login {
        spans = vec![Span::styled(" vault locked", styles::muted_style())];
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.route {
        RouteName::Login => render_login(frame, app, area),
        RouteName::Dashboard => render_dashboard(frame, app, area),
        RouteName::CredentialNew | RouteName::CredentialEdit => render_form(frame, app, area),
        RouteName::Categories => render_categories(frame, app, area),
        RouteName::AuditLogs => render_audit(frame, app, area),
    }
}

// ===== Login =====

fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let box_area = centered_rect(50, 9, area);

    let masked = "*".repeat(app.password_input.len());
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  Master password: ", styles::list_item_style()),
            Span::styled(masked, styles::highlight_style()),
            Span::styled("_", styles::muted_style()),
        ]),
        Line::from(""),
    ];
    if let Some(ref error) = app.login_error {
        lines.push(Line::from(Span::styled(
            format!("  {}", error),
            styles::error_style(),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  [Enter] unlock   [Esc] quit",
        styles::muted_style(),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::header_style())
        .title(" Unlock vault ");
    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

// ===== Dashboard =====

fn render_dashboard(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(columns[0]);

    render_filter_bar(frame, app, left[0]);
    render_credential_table(frame, app, left[1]);
    render_credential_detail(frame, app, columns[1]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let search = if matches!(app.mode, Mode::Searching) {
        format!("/{}_", app.search_input)
    } else if app.search_input.is_empty() {
        String::from("/ to search")
    } else {
        format!("/{}", app.search_input)
    };
    let kind = match app.filter_kind {
        Some(kind) => format!("type: {}", kind.label()),
        None => String::from("type: all"),
    };
    let page = format!(
        "page {}/{} ({} total)",
        app.credentials.page,
        app.credentials.total_pages.max(1),
        app.credentials.total
    );

    let line = Line::from(vec![
        Span::styled(format!(" {}", search), styles::highlight_style()),
        Span::styled(format!("   {}", kind), styles::muted_style()),
        Span::styled(format!("   {}", page), styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_credential_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec!["Name", "Type", "Location", "Category", "Tags"])
        .style(styles::header_style());

    let rows: Vec<Row> = app
        .credentials
        .items
        .iter()
        .enumerate()
        .map(|(i, cred)| {
            let style = if i == app.cred_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                truncate_string(&cred.name, 24),
                cred.kind.label().to_string(),
                truncate_string(&cred.location(), 22),
                format_optional(&cred.category_name, "-"),
                truncate_string(&cred.tags.join(","), 18),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Min(14),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::muted_style()),
    );

    frame.render_widget(table, area);
}

fn render_credential_detail(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(cred) = app.selected_credential() {
        let password = match (&cred.password, app.reveal_password) {
            (Some(pw), true) => pw.clone(),
            (Some(_), false) => String::from("********  ([p] reveal)"),
            (None, _) => String::from("-"),
        };

        lines.push(detail_line("Name", &cred.name));
        lines.push(detail_line("Type", cred.kind.label()));
        lines.push(detail_line("Host", &format_optional(&cred.host, "-")));
        lines.push(detail_line(
            "Port",
            &cred.port.map(|p| p.to_string()).unwrap_or_else(|| "-".into()),
        ));
        lines.push(detail_line("User", &format_optional(&cred.username, "-")));
        lines.push(detail_line("Password", &password));
        lines.push(detail_line(
            "Category",
            &format_optional(&cred.category_name, "-"),
        ));
        lines.push(detail_line("Tags", &cred.tags.join(", ")));
        lines.push(detail_line(
            "Description",
            &format_optional(&cred.description, "-"),
        ));
        lines.push(Line::from(""));
        lines.push(detail_line("Created", &format_date(&cred.created_at)));
        if let Some(ref updated) = cred.updated_at {
            lines.push(detail_line("Updated", &format_date(updated)));
        }
        if let Some(ref extra) = cred.extra_data {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                " Extra data:",
                styles::header_style(),
            )));
            for (key, value) in extra.as_object().into_iter().flatten() {
                lines.push(detail_line(key, &value.to_string()));
            }
        }
    } else {
        lines.push(Line::from(Span::styled(
            " No credential selected",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::muted_style())
        .title(" Detail ");
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn detail_line<'a>(label: &str, value: &str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!(" {:<12}", label), styles::muted_style()),
        Span::styled(value.to_string(), styles::list_item_style()),
    ])
}

// ===== Credential form =====

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let box_area = centered_rect(64, (FormField::ALL.len() as u16) + 6, area);
    let mut lines: Vec<Line> = vec![Line::from("")];

    for field in FormField::ALL {
        let value = match field {
            FormField::Name => app.form.name.clone(),
            FormField::Kind => format!("< {} >", app.form.kind.label()),
            FormField::Host => app.form.host.clone(),
            FormField::Port => app.form.port.clone(),
            FormField::Username => app.form.username.clone(),
            FormField::Password => "*".repeat(app.form.password.len()),
            FormField::Category => match app
                .form
                .category_index
                .and_then(|idx| app.categories.get(idx))
            {
                Some(category) => format!("< {} >", category.name),
                None => String::from("< none >"),
            },
            FormField::Tags => app.form.tags.clone(),
            FormField::Description => app.form.description.clone(),
        };

        let selected = app.form.field == field;
        let cursor = if selected { "_" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<13}", field.label()),
                if selected {
                    styles::highlight_style()
                } else {
                    styles::muted_style()
                },
            ),
            Span::styled(
                format!("{}{}", value, cursor),
                if selected {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                },
            ),
        ]));
    }

    lines.push(Line::from(""));
    if let Some(ref error) = app.form.error {
        lines.push(Line::from(Span::styled(
            format!(" {}", error),
            styles::error_style(),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            " [Tab] next  [Enter] save  [Esc] cancel",
            styles::muted_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::header_style())
        .title(format!(" {} ", app.route.title()));
    frame.render_widget(Clear, box_area);
    frame.render_widget(Paragraph::new(lines).block(block), box_area);
}

// ===== Categories =====

fn render_categories(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .split(area);

    let header =
        Row::new(vec!["Name", "Color", "Credentials", "Created"]).style(styles::header_style());

    let rows: Vec<Row> = app
        .categories
        .iter()
        .enumerate()
        .map(|(i, category)| {
            let style = if i == app.category_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                truncate_string(&category.name, 28),
                category.color.clone(),
                category.credential_count.to_string(),
                format_date(&category.created_at),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(8),
            Constraint::Length(11),
            Constraint::Min(14),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::muted_style()),
    );
    frame.render_widget(table, chunks[0]);

    if matches!(app.mode, Mode::EditingCategory) {
        let verb = if app.category_editing.is_some() {
            "Rename"
        } else {
            "New"
        };
        let line = Line::from(vec![
            Span::styled(format!(" {} category: ", verb), styles::highlight_style()),
            Span::styled(app.category_input.clone(), styles::list_item_style()),
            Span::styled("_", styles::muted_style()),
        ]);
        frame.render_widget(Paragraph::new(line), chunks[1]);
    }
}

// ===== Audit log =====

fn render_audit(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let action = match app.filter_action {
        Some(action) => format!("action: {}", action.label()),
        None => String::from("action: all"),
    };
    let page = format!(
        "page {}/{} ({} total)",
        app.audit_logs.page,
        app.audit_logs.total_pages.max(1),
        app.audit_logs.total
    );
    let line = Line::from(vec![
        Span::styled(format!(" {}", action), styles::highlight_style()),
        Span::styled(format!("   {}", page), styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(line), chunks[0]);

    let header =
        Row::new(vec!["Time", "Action", "Credential", "Address"]).style(styles::header_style());

    let rows: Vec<Row> = app
        .audit_logs
        .items
        .iter()
        .enumerate()
        .map(|(i, log)| {
            let style = if i == app.audit_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                format_date(&log.created_at),
                log.action.label().to_string(),
                format_optional(&log.credential_name, "-"),
                format_optional(&log.ip_address, "-"),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(19),
            Constraint::Length(7),
            Constraint::Min(20),
            Constraint::Min(12),
        ],
    )
    .header(header)
    .column_spacing(1)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(styles::muted_style()),
    );
    frame.render_widget(table, chunks[1]);
}

// ===== Status bar & overlays =====

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.route {
        RouteName::Login => "",
        RouteName::Dashboard => {
            "[n]ew [e]dit [d]elete [c]opy [x]port [/]search [t]ype [<>]page [r]efresh [L]ock [q]uit"
        }
        RouteName::CredentialNew | RouteName::CredentialEdit => "",
        RouteName::Categories => "[a]dd [e]rename [d]elete [L]ock [q]uit",
        RouteName::AuditLogs => "[f]ilter [<>]page [r]efresh [L]ock [q]uit",
    };

    let left = match app.status {
        Some(ref status) => Span::styled(format!(" {}", status), styles::success_style()),
        None => Span::styled(format!(" {}", hints), styles::muted_style()),
    };

    let session = match app.session_minutes_left() {
        Some(minutes) if app.session.is_authenticated() => format!("session {}m ", minutes),
        _ => String::from("locked "),
    };

    let left_width = area.width.saturating_sub(session.len() as u16 + 1);
    let line = Line::from(vec![
        left,
        Span::raw(" ".repeat(left_width as usize)),
        Span::styled(session, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(styles::muted_style());
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_delete_overlay(frame: &mut Frame, app: &App) {
    let name = match app.route {
        RouteName::Categories => app
            .selected_category()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
        _ => app
            .selected_credential()
            .map(|c| c.name.clone())
            .unwrap_or_default(),
    };

    let box_area = centered_rect(44, 5, frame.area());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(" Delete '{}'? [y/n]", truncate_string(&name, 28)),
            styles::error_style(),
        )),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::error_style())
        .title(" Confirm ");
    frame.render_widget(Clear, box_area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Left).block(block), box_area);
}

/// A rect of the given size centered inside `area`, clamped to fit.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
