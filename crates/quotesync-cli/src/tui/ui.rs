//! UI rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use quotesync_core::catalog::Selection;
use quotesync_core::sync::SyncStatus;
use quotesync_core::CategoryFilter;

use super::app::{AddField, App, InputMode};

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    // Create vertical layout for status bar at the bottom
    let outer_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(frame.area());

    let pane_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(outer_chunks[0]);

    draw_categories_pane(frame, app, pane_chunks[0]);
    draw_quote_pane(frame, app, pane_chunks[1]);

    match app.input_mode {
        InputMode::Normal => draw_status_bar(frame, app, outer_chunks[1]),
        InputMode::Add(field) => {
            let prompt = match field {
                AddField::Text => "Quote: ",
                AddField::Category => "Category: ",
            };
            draw_input(frame, app, prompt, outer_chunks[1]);
        }
        InputMode::Import => draw_input(frame, app, "Import file: ", outer_chunks[1]),
    }

    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the category selector (left)
fn draw_categories_pane(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .categories
        .iter()
        .map(|category| {
            let name = match category {
                CategoryFilter::All => category.label().to_string(),
                CategoryFilter::Named(name) => {
                    let count = app
                        .counts
                        .iter()
                        .find(|(label, _)| label == name)
                        .map(|(_, n)| *n)
                        .unwrap_or(0);
                    format!("  {} ({})", name, count)
                }
            };
            ListItem::new(name)
        })
        .collect();

    let block = Block::default()
        .title(" Categories ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED),
    );

    let mut state = ListState::default();
    state.select(Some(app.category_index));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the displayed quote (right)
fn draw_quote_pane(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.current_category() {
        Some(category) => format!(" {} ({}) ", category, app.current_count()),
        None => " Quote ".to_string(),
    };

    let block = Block::default().title(title).borders(Borders::ALL);

    let content = match &app.display {
        Selection::Quote(quote) => vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                format!("\u{201c}{}\u{201d}", quote.text),
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![Span::styled(
                format!("  {}", quote.category),
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ],
        Selection::NoQuotes => vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                app.display.display_text(),
                Style::default().add_modifier(Modifier::DIM),
            )]),
        ],
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the status bar at the bottom, with the sync indicator on the right
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let label = app.sync_label();
    let indicator_width = label.chars().count() as u16 + 1;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(indicator_width)])
        .split(area);

    let content = match &app.status_message {
        Some(msg) => Span::raw(msg.as_str()),
        None => Span::styled(
            "j/k:category  n:next  a:add  e:export  i:import  s:sync  ?:help  q:quit",
            Style::default().add_modifier(Modifier::DIM),
        ),
    };
    frame.render_widget(Paragraph::new(Line::from(content)), chunks[0]);

    let style = if !app.sync_enabled {
        Style::default().add_modifier(Modifier::DIM)
    } else {
        match app.sync_status {
            SyncStatus::Idle => Style::default().add_modifier(Modifier::DIM),
            SyncStatus::Syncing => Style::default().fg(Color::Yellow),
            SyncStatus::Synced => Style::default().fg(Color::Green),
            SyncStatus::Failed => Style::default().fg(Color::Red),
        }
    };
    frame.render_widget(Paragraph::new(Span::styled(label, style)), chunks[1]);
}

/// Draw a one-line prompt at the bottom
fn draw_input(frame: &mut Frame, app: &App, prompt: &str, area: Rect) {
    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(Color::Yellow)),
        Span::raw(app.input.as_str()),
        Span::styled(
            "  (Enter: ok, Esc: cancel)",
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);

    let cursor_x = area.x + prompt.chars().count() as u16 + app.cursor as u16;
    frame.set_cursor_position((cursor_x, area.y));
}

/// Draw help overlay
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();

    let popup_width = 46.min(area.width.saturating_sub(4));
    let popup_height = 17.min(area.height.saturating_sub(4));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(vec![Span::styled(
            "Keyboard Shortcuts",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from("  j/k, ↑/↓    Change category"),
        Line::from("  n           Show another quote"),
        Line::from("  a           Add a quote"),
        Line::from("  e           Export to quotes.json"),
        Line::from("  i           Import from a JSON file"),
        Line::from("  s           Sync with server now"),
        Line::from("  ?           Toggle help"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from("In prompts: Enter submits, Esc cancels"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().add_modifier(Modifier::BOLD));

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}
