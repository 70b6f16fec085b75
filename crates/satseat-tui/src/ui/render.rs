use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use satseat_core::view::ResultRow;

use crate::app::{App, AppMode, Field};

use super::{results, styles};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(3), // Search form
            Constraint::Min(6),    // Results table
            Constraint::Length(1), // Map link for the selected row
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, chunks[0]);
    render_form(frame, app, chunks[1]);
    results::render(frame, app, chunks[2]);
    render_link_line(frame, app, chunks[3]);
    render_status_bar(frame, app, chunks[4]);

    match app.mode {
        AppMode::ShowingHelp => render_help_overlay(frame),
        AppMode::ShowingAlert => render_alert_overlay(frame, app),
        AppMode::ConfirmingQuit => render_quit_overlay(frame),
        _ => {}
    }
}

fn render_title_bar(frame: &mut Frame, area: Rect) {
    let title = "  SAT Seat Finder";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 2)
                as usize,
        )),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let editing = match app.mode {
        AppMode::Editing(field) => Some(field),
        _ => None,
    };

    let field_spans = |label: &'static str, value: &str, field: Field, width: usize| {
        let active = editing == Some(field);
        let cursor = if active { "▌" } else { "" };
        vec![
            Span::styled(label, styles::muted_style()),
            Span::styled("[", styles::muted_style()),
            Span::styled(
                format!("{:<width$}", format!("{}{}", value, cursor), width = width),
                styles::input_style(active),
            ),
            Span::styled("]", styles::muted_style()),
        ]
    };

    let mut spans = vec![Span::raw(" ")];
    spans.extend(field_spans("[z]ip: ", &app.zip_input, Field::Zip, 6));
    spans.push(Span::raw("   "));
    spans.extend(field_spans("[d]istance: ", &app.distance_input, Field::Distance, 9));
    spans.push(Span::styled(" mi", styles::muted_style()));

    if let Some(ref error) = app.input_error {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(error.as_str(), styles::error_style()));
    }

    let block = Block::default()
        .title(" Search ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing.is_some()));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_link_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.selected_row() {
        Some(ResultRow::School { map_url, .. }) => Line::from(vec![
            Span::styled(" Map: ", styles::muted_style()),
            Span::styled(map_url.as_str(), styles::link_style()),
        ]),
        _ => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = "[u]pdate | [q]uit";

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => format!(" Updated {} ", app.last_updated()),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.len())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(48, 18, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ])
    };

    let help_text = vec![
        Line::from(Span::styled("  SAT Seat Finder", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Search", styles::highlight_style())),
        key("z or /", "Edit zip code"),
        key("d", "Edit distance (miles)"),
        key("Enter", "Submit field"),
        key("Tab", "Switch field while editing"),
        key("Esc", "Cancel editing"),
        Line::from(""),
        Line::from(Span::styled(" Results", styles::highlight_style())),
        key("↑/↓", "Select school"),
        key("u", "Update from College Board"),
        key("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_alert_overlay(frame: &mut Frame, app: &App) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let message = app.alert.as_deref().unwrap_or_default();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!(" {}", message), styles::error_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Press ", styles::muted_style()),
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(" to continue", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Error ")
        .title_style(styles::error_style())
        .borders(Borders::ALL)
        .border_style(styles::error_style())
        .style(Style::default());

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 6, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Are you sure you want to quit?",
            styles::highlight_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect_fixed(40, 10, outer), Rect::new(30, 15, 40, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_small_terminal() {
        let outer = Rect::new(0, 0, 20, 5);
        assert_eq!(centered_rect_fixed(40, 10, outer), Rect::new(0, 0, 20, 5));
    }
}
