// UI rendering logic
use crate::app::{App, InputMode, Modal, View, Viewport};
use pkgscout_core::{NoticeLevel, Package};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame,
};

/// Each result takes a name line and a description line
const RESULT_ITEM_HEIGHT: u16 = 2;

pub fn render(frame: &mut Frame, app: &mut App) {
    let screen = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(screen);

    render_header(frame, app, chunks[0]);

    match app.view {
        View::Search => render_search_view(frame, app, chunks[1]),
        View::Favorites => render_favorites_view(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    match &app.modal {
        Modal::None => {}
        Modal::AddFavorite { package, reason } => render_reason_modal(
            frame,
            " Add to Favorites ",
            &format!("Package Name: {}", package),
            "Why is this your favorite?",
            reason,
        ),
        Modal::EditReason { name, reason } => render_reason_modal(
            frame,
            " Edit Reason ",
            &format!("Edit Reason for {}", name),
            "Reason",
            reason,
        ),
        Modal::ConfirmDelete { name } => render_confirm_delete(frame, name),
    }

    render_toasts(frame, app, screen);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &str, active: bool| {
        if active {
            Span::styled(
                format!(" {} ", label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    let line = Line::from(vec![
        Span::styled(
            "pkgscout ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│ "),
        tab("Search npm Packages", app.view == View::Search),
        Span::raw(" "),
        tab("My Favorites", app.view == View::Favorites),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_search_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    render_search_input(frame, app, chunks[0]);
    render_results_list(frame, app, chunks[1]);
}

fn render_search_input(frame: &mut Frame, app: &App, area: Rect) {
    let input_style = match app.input_mode {
        InputMode::Searching if app.modal == Modal::None => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };

    let input = Paragraph::new(app.search_input.as_str())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search npm packages (ESC to navigate, / to search)")
                .border_style(input_style),
        );

    frame.render_widget(input, area);

    if app.input_mode == InputMode::Searching && app.modal == Modal::None {
        frame.set_cursor_position((cursor_x(area, &app.search_input), area.y + 1));
    }
}

/// Cursor column after `input`, kept inside the box's right border
fn cursor_x(area: Rect, input: &str) -> u16 {
    let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
    let last_inner = area.x + area.width.saturating_sub(2);
    (area.x + 1).saturating_add(typed).min(last_inner)
}

fn render_results_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let loading = app.pager.is_loading();

    if app.results().is_empty() {
        let message = if loading {
            Span::styled(
                "Searching...",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                "Type a package name and press ENTER",
                Style::default().fg(Color::DarkGray),
            )
        };

        let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
            .block(Block::default().borders(Borders::ALL).title(" Results "))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        app.viewport = Viewport::default();
        return;
    }

    let desc_width = area.width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = app
        .results()
        .iter()
        .enumerate()
        .map(|(i, pkg)| result_item(pkg, i == app.selected_index, desc_width))
        .collect();

    let mut title = match app.pager.total() {
        Some(total) => format!(" Results ({} of {}) ", app.results().len(), total),
        None => format!(" Results ({}) ", app.results().len()),
    };
    if loading {
        title.push_str("- loading more... ");
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Rgb(68, 71, 90)))
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);

    // Remember what is on screen so the pager can see the last item
    // A partly visible item counts as visible
    let inner_height = area.height.saturating_sub(2);
    app.viewport = Viewport {
        first: app.list_state.offset(),
        rows: inner_height.div_ceil(RESULT_ITEM_HEIGHT) as usize,
    };
}

fn result_item(pkg: &Package, selected: bool, desc_width: usize) -> ListItem<'static> {
    let name_style = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };

    let description = truncate(pkg.display_description(), desc_width);

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(pkg.name.clone(), name_style),
            Span::styled(format!("  v{}", pkg.version), Style::default().fg(Color::Gray)),
        ]),
        Line::from(Span::styled(
            format!("  {}", description),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}

/// Cut to `max` chars on one line, with an ellipsis when shortened
fn truncate(text: &str, max: usize) -> String {
    let single_line = text.replace(['\n', '\r'], " ");
    if single_line.chars().count() <= max {
        return single_line;
    }
    let keep = max.saturating_sub(1);
    let mut out: String = single_line.chars().take(keep).collect();
    out.push('…');
    out
}

fn render_favorites_view(frame: &mut Frame, app: &mut App, area: Rect) {
    if app.favorites.is_empty() {
        let paragraph = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No favorites yet",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Search for a package and press 'a' to add it",
                Style::default().fg(Color::Yellow),
            )),
        ])
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" My Favorite npm Packages "),
        );
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec![Cell::from("Package Name"), Cell::from("Reason")])
        .style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(33, 150, 243))
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = app
        .favorites
        .iter()
        .map(|fav| {
            Row::new(vec![
                Cell::from(fav.name.clone()),
                Cell::from(fav.reason.replace('\n', " ")),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(30), Constraint::Percentage(70)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" My Favorite npm Packages ({}) ", app.favorites.len())),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::Rgb(68, 71, 90))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(table, area, &mut app.favorites_state);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = match (&app.modal, app.view, app.input_mode) {
        (Modal::ConfirmDelete { .. }, _, _) => Span::styled(
            "CONFIRM | y/ENTER: delete | n/ESC: cancel",
            Style::default().fg(Color::Red),
        ),
        (Modal::AddFavorite { .. } | Modal::EditReason { .. }, _, _) => Span::styled(
            "EDITING | Type reason | ENTER: save | ESC: cancel",
            Style::default().fg(Color::Green),
        ),
        (Modal::None, View::Search, InputMode::Searching) => Span::styled(
            "SEARCH MODE | ESC: normal mode | ENTER: search",
            Style::default().fg(Color::Yellow),
        ),
        (Modal::None, View::Search, InputMode::Normal) => Span::raw(
            "j/k: navigate | /: search | a: add favorite | o: open | v: favorites | q: quit",
        ),
        (Modal::None, View::Favorites, _) => {
            Span::raw("j/k: navigate | e: edit reason | d: delete | v/ESC: back to search | q: quit")
        }
    };

    frame.render_widget(Paragraph::new(Line::from(status)), area);
}

fn render_reason_modal(frame: &mut Frame, title: &str, heading: &str, label: &str, reason: &str) {
    let area = centered_rect(60, 10, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(3)])
        .split(inner);

    let heading = Paragraph::new(Line::from(Span::styled(
        heading.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(heading, chunks[0]);

    let input = Paragraph::new(format!("{}█", reason))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(label.to_string())
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(input, chunks[1]);
}

fn render_confirm_delete(frame: &mut Frame, name: &str) {
    let area = centered_rect(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(format!(
            "Are you sure you want to delete \"{}\" from your favorites?",
            name
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(": delete   "),
            Span::styled("n", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(": cancel"),
        ]),
    ];

    let dialog = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm Delete ")
                .border_style(Style::default().fg(Color::Red)),
        );
    frame.render_widget(dialog, area);
}

fn render_toasts(frame: &mut Frame, app: &App, area: Rect) {
    let width = area.width.min(50);
    let mut y = area.y + 1;

    // Newest on top
    let notices: Vec<_> = app.toasts.iter().collect();
    for notice in notices.into_iter().rev() {
        if y + 3 > area.y + area.height {
            break;
        }

        let color = match notice.level {
            NoticeLevel::Success => Color::Green,
            NoticeLevel::Info => Color::Cyan,
            NoticeLevel::Warning => Color::Yellow,
            NoticeLevel::Error => Color::Red,
        };

        let toast_area = Rect {
            x: area.x + area.width.saturating_sub(width + 1),
            y,
            width,
            height: 3,
        };

        frame.render_widget(Clear, toast_area);
        let toast = Paragraph::new(truncate(&notice.message, width.saturating_sub(2) as usize))
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        frame.render_widget(toast, toast_area);

        y += 3;
    }
}

/// Fixed-height popup, `percent_x` of the width, centered
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
