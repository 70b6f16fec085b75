use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use satseat_core::view::ResultRow;

use crate::app::{App, AppMode};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.mode, AppMode::Normal);
    let title = if app.header.is_empty() {
        " Results ".to_string()
    } else {
        format!(" {} ", app.header)
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    if app.rows.is_empty() {
        let message = if app.state.entry.is_none() {
            "Enter a zip code to search for open test centers."
        } else {
            "No test centers with open seats within this distance."
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(message, styles::muted_style())))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from("School"),
        Cell::from("Address"),
        Cell::from("Distance"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app.rows.iter().map(table_row).collect();

    // Column widths: School, Address, Distance ("123.45 mi")
    let widths = [
        Constraint::Percentage(38),
        Constraint::Fill(1),
        Constraint::Length(10),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.selection));

    frame.render_stateful_widget(table, area, &mut state);
}

fn table_row(row: &ResultRow) -> Row<'_> {
    match row {
        // Spans the table visually: the date sits alone on its row
        ResultRow::Date { display_date } => Row::new([
            Cell::from(display_date.as_str()),
            Cell::from(""),
            Cell::from(""),
        ])
        .style(styles::date_row_style()),
        ResultRow::School {
            name,
            address,
            distance,
            ..
        } => Row::new([
            Cell::from(name.as_str()),
            Cell::from(Span::styled(address.as_str(), styles::link_style())),
            Cell::from(distance.as_str()),
        ])
        .style(styles::list_item_style()),
    }
}
