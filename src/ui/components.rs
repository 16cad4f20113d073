//! Reusable UI component helpers shared by the menu and the popups.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::theme::ButtonColors;

use super::{accent, header, inactive, text};

/// Rounded menu button; a selected button takes its hover colour
pub fn menu_button<'a>(
    label: &'a str,
    shortcut: char,
    colors: ButtonColors,
    selected: bool,
) -> Paragraph<'a> {
    let bg = if selected { colors.hover } else { colors.normal };
    let fg = if selected { Color::Black } else { Color::White };

    let mut style = Style::default().fg(fg).bg(bg);
    if selected {
        style = style.add_modifier(Modifier::BOLD);
    }

    Paragraph::new(Line::from(vec![
        Span::styled(format!("({}) ", shortcut), style.add_modifier(Modifier::DIM)),
        Span::styled(label, style),
    ]))
    .style(style)
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(bg).bg(bg)),
    )
}

/// Single-line text input with a label in its border
pub fn input_field<'a>(label: &'a str, value: &'a str, focused: bool) -> Paragraph<'a> {
    let border = if focused { accent() } else { inactive() };
    let title_color = if focused { accent() } else { header() };
    let cursor = if focused { "_" } else { "" };

    Paragraph::new(Line::from(vec![
        Span::styled(value, Style::default().fg(text())),
        Span::styled(cursor, Style::default().fg(accent())),
    ]))
    .block(
        Block::default()
            .title(Span::styled(format!(" {} ", label), Style::default().fg(title_color)))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    )
}

/// Key hint spans: `key` highlighted, `action` dimmed
pub fn hint_spans<'a>(hints: &[(&'a str, &'a str)]) -> Vec<Span<'a>> {
    hints
        .iter()
        .enumerate()
        .flat_map(|(i, (key, action))| {
            let sep = if i + 1 < hints.len() { " │ " } else { "" };
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {}{}", action, sep), Style::default().fg(super::text_dim())),
            ]
        })
        .collect()
}
