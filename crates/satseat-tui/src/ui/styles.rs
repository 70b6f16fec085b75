//! Colors and text styles shared by every widget.

use ratatui::style::{Color, Modifier, Style};

// Palette: navy frame, teal accents, amber for keys
pub const NAVY: Color = Color::Rgb(70, 110, 170);
pub const TEAL: Color = Color::Rgb(72, 170, 160);
pub const AMBER: Color = Color::Rgb(214, 170, 72);
pub const LINK: Color = Color::Rgb(110, 150, 235);
pub const ERROR: Color = Color::Rgb(210, 80, 80);
pub const DIM: Color = Color::Rgb(125, 125, 135);
pub const TEXT: Color = Color::Rgb(225, 225, 230);
pub const SELECTION_BG: Color = Color::Rgb(40, 52, 72);
pub const STATUS_BG: Color = Color::Rgb(28, 30, 38);

fn fg(color: Color) -> Style {
    Style::new().fg(color)
}

pub fn title_style() -> Style {
    fg(NAVY).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::new().bg(SELECTION_BG).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    fg(TEXT)
}

pub fn muted_style() -> Style {
    fg(DIM)
}

pub fn highlight_style() -> Style {
    fg(TEAL)
}

/// Date section rows in the results table
pub fn date_row_style() -> Style {
    fg(TEAL).add_modifier(Modifier::BOLD | Modifier::ITALIC)
}

pub fn link_style() -> Style {
    fg(LINK).add_modifier(Modifier::UNDERLINED)
}

pub fn error_style() -> Style {
    fg(ERROR).add_modifier(Modifier::BOLD)
}

pub fn border_style(focused: bool) -> Style {
    fg(if focused { NAVY } else { DIM })
}

/// Form field value; highlighted while the field has the cursor.
pub fn input_style(editing: bool) -> Style {
    if editing {
        fg(AMBER).bg(SELECTION_BG)
    } else {
        list_item_style()
    }
}

pub fn status_bar_style() -> Style {
    Style::new().bg(STATUS_BG).fg(TEXT)
}

pub fn help_key_style() -> Style {
    fg(AMBER).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    list_item_style()
}
