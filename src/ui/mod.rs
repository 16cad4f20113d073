mod components;

use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, MenuItem, MessageKind, Popup};
use crate::manual::FIELD_LABELS;
use crate::splash::Bouncer;
use crate::theme::{ButtonColors, Theme};

use components::{hint_spans, input_field, menu_button};

// Set once from config at startup; falls back to the default palette
static THEME: OnceLock<Theme> = OnceLock::new();

pub fn init_theme(theme: Theme) {
    if THEME.set(theme).is_err() {
        tracing::debug!("Theme already initialised");
    }
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn inactive() -> Color { theme().inactive }
fn success() -> Color { theme().success }
fn warning() -> Color { theme().warning }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn bg_selected() -> Color { theme().bg_selected }
fn header() -> Color { theme().header }

fn button_colors(item: MenuItem) -> ButtonColors {
    let t = theme();
    match item {
        MenuItem::AddManual => t.add,
        MenuItem::Search => t.search,
        MenuItem::Edit => t.edit,
        MenuItem::ViewAll => t.view_all,
        MenuItem::Exit => t.exit,
    }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // Info line
            Constraint::Min(5),                  // Menu
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_menu(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    // Draw popups on top
    match app.popup {
        Popup::None => {}
        Popup::AddManual => draw_add_manual(f, app),
        Popup::Search => draw_search(f, app),
        Popup::Edit => draw_edit(f, app),
        Popup::ViewAll => draw_view_all(f, app),
        Popup::Confirm => draw_confirm_popup(f, app),
    }

    // Message boxes block everything
    if app.message.is_some() {
        draw_message(f, app);
    }
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(warning())))
    } else {
        Line::from(Span::styled("Ready", Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_menu(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " Manuals Catalogue ",
            Style::default().fg(accent()).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.popup == Popup::None { accent() } else { inactive() }));
    let inner = block.inner(area);
    f.render_widget(block, area);

    // Buttons are 3 rows each with a blank row between
    let button_width = inner.width.min(34);
    let column = Rect {
        x: inner.x + (inner.width - button_width) / 2,
        width: button_width,
        ..inner
    };

    let mut constraints = vec![Constraint::Min(0)];
    for _ in MenuItem::ALL {
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(column);

    for (i, item) in MenuItem::ALL.iter().enumerate() {
        let button = menu_button(
            item.label(),
            item.shortcut(),
            button_colors(*item),
            i == app.selected_menu,
        );
        f.render_widget(button, rows[1 + i * 2]);
    }
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = if app.message.is_some() {
        vec![("Enter", "Dismiss")]
    } else {
        match app.popup {
            Popup::None => vec![
                ("↑↓", "Nav"),
                ("Enter", "Open"),
                ("a/s/e/v", "Shortcut"),
                ("q", "Exit"),
            ],
            Popup::AddManual => vec![
                ("Tab", "Next field"),
                ("Enter", "Next/Save"),
                ("F2", "Save"),
                ("Esc", "Cancel"),
            ],
            Popup::Edit => vec![
                ("Enter", "Find/Next/Save"),
                ("Tab", "Next field"),
                ("F2", "Save"),
                ("Esc", "Cancel"),
            ],
            Popup::Search => vec![
                ("Enter", "Search"),
                ("↑↓", "Scroll"),
                ("Esc", "Close"),
            ],
            Popup::ViewAll => vec![
                ("↑↓", "Nav"),
                ("d", "Delete"),
                ("R", "Reload"),
                ("Esc", "Close"),
            ],
            Popup::Confirm => vec![("y", "Yes"), ("n", "No")],
        }
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 2 } else { hints.len() };
    let hints = &hints[..max_hints.min(hints.len())];

    let footer = Paragraph::new(Line::from(hint_spans(hints)))
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(format!(" {} ", title), Style::default().fg(accent())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent()))
}

fn draw_add_manual(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 60 }, 80, area);

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block("Add new manual"), popup_area);

    let mut constraints: Vec<Constraint> = FIELD_LABELS.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Min(0));

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(popup_area);

    for (i, label) in FIELD_LABELS.iter().enumerate() {
        f.render_widget(input_field(label, &app.form[i], app.focus == i), inner[i]);
    }

    let save_hint = Paragraph::new(Line::from(vec![
        Span::styled("[ ", Style::default().fg(text_dim())),
        Span::styled("F2 = Save", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
        Span::styled(" ]  [ ", Style::default().fg(text_dim())),
        Span::styled("Esc = Cancel", Style::default().fg(danger())),
        Span::styled(" ]", Style::default().fg(text_dim())),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(save_hint, inner[FIELD_LABELS.len()]);
}

fn draw_edit(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 60 }, 90, area);

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block("Edit manual"), popup_area);

    let mut constraints = vec![Constraint::Length(3), Constraint::Length(1)];
    constraints.extend(FIELD_LABELS.iter().map(|_| Constraint::Length(3)));
    constraints.push(Constraint::Min(0));

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(constraints)
        .split(popup_area);

    f.render_widget(
        input_field("Title to edit (Enter = find)", &app.lookup, app.focus == 0),
        inner[0],
    );

    let found = match &app.edit_target {
        Some(title) => Line::from(vec![
            Span::styled("Editing: ", Style::default().fg(text_dim())),
            Span::styled(title.as_str(), Style::default().fg(success())),
        ]),
        None => Line::from(Span::styled("No record loaded", Style::default().fg(text_dim()))),
    };
    f.render_widget(Paragraph::new(found).alignment(Alignment::Center), inner[1]);

    for (i, label) in FIELD_LABELS.iter().enumerate() {
        f.render_widget(input_field(label, &app.form[i], app.focus == i + 1), inner[i + 2]);
    }

    let save_hint = Paragraph::new(Line::from(vec![
        Span::styled("[ ", Style::default().fg(text_dim())),
        Span::styled("F2 = Save changes", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
        Span::styled(" ]", Style::default().fg(text_dim())),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(save_hint, inner[FIELD_LABELS.len() + 2]);
}

fn draw_search(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 95 } else { 70 }, 80, area);

    f.render_widget(Clear, popup_area);
    f.render_widget(popup_block("Search manuals"), popup_area);

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(popup_area);

    f.render_widget(
        input_field("Title or author", &app.search_query, true),
        inner[0],
    );

    let results_block = Block::default()
        .title(Span::styled(" Results ", Style::default().fg(header())))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    match &app.search_results {
        None => {
            let hint = Paragraph::new(Span::styled(
                "Type a title or author and press Enter",
                Style::default().fg(text_dim()),
            ))
            .block(results_block);
            f.render_widget(hint, inner[1]);
        }
        Some(results) if results.is_empty() => {
            let empty = Paragraph::new(Span::styled("No manuals found.", Style::default().fg(text_dim())))
                .block(results_block);
            f.render_widget(empty, inner[1]);
        }
        Some(results) => {
            let items: Vec<ListItem> = results
                .iter()
                .map(|m| ListItem::new(Span::styled(m.details(), Style::default().fg(text()))))
                .collect();
            draw_selectable_list(f, items, app.search_selected, results_block, inner[1]);
        }
    }
}

fn draw_view_all(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(if area.width < 80 { 90 } else { 50 }, 80, area);

    f.render_widget(Clear, popup_area);

    let block = popup_block("All titles");
    if app.titles.is_empty() {
        let empty = Paragraph::new(Span::styled("  The catalogue is empty", Style::default().fg(text_dim())))
            .block(block);
        f.render_widget(empty, popup_area);
        return;
    }

    let items: Vec<ListItem> = app
        .titles
        .iter()
        .map(|t| ListItem::new(Span::styled(format!("  {}", t), Style::default().fg(text()))))
        .collect();
    draw_selectable_list(f, items, app.titles_selected, block, popup_area);
}

fn draw_selectable_list(f: &mut Frame, items: Vec<ListItem>, selected: usize, block: Block, area: Rect) {
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(bg_selected()).fg(text()));
    let mut state = ListState::default().with_selected(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_confirm_popup(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(50, 25, f.area());

    f.render_widget(Clear, popup_area);

    let prompt = app.confirm_prompt();
    let confirm = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(prompt, Style::default().fg(warning()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y", Style::default().fg(success()).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes   "),
            Span::styled("n", Style::default().fg(danger()).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(" Confirm ", Style::default().fg(warning())))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(warning())),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(confirm, popup_area);
}

fn draw_message(f: &mut Frame, app: &App) {
    let Some(message) = &app.message else {
        return;
    };

    let popup_area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, popup_area);

    let color = match message.kind {
        MessageKind::Info => success(),
        MessageKind::Error => danger(),
    };

    let body = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message.body.as_str(), Style::default().fg(text()))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Enter", Style::default().fg(accent())),
            Span::styled(" OK", Style::default().fg(text_dim())),
        ]),
    ])
    .block(
        Block::default()
            .title(Span::styled(format!(" {} ", message.title), Style::default().fg(color)))
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(color)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });

    f.render_widget(body, popup_area);
}

/// Splash frame: black canvas with the boxed logo at the bouncer's position
pub fn draw_splash(f: &mut Frame, bouncer: &Bouncer, logo: &str) {
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(Color::Black)), area);

    let (r, g, b) = bouncer.color;
    let color = Color::Rgb(r, g, b);

    let rect = bouncer.logo_area();
    let logo_area = Rect {
        x: area.x + rect.x,
        y: area.y + rect.y,
        ..rect
    }
    .intersection(area);

    let widget = Paragraph::new(Span::styled(
        logo,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(color)),
    )
    .style(Style::default().bg(Color::Black));
    f.render_widget(widget, logo_area);

    if area.height > 1 {
        let hint = Paragraph::new(Line::from(hint_spans(&[("Enter", "Continue"), ("q", "Quit")])))
            .alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black));
        let hint_area = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        // Logo takes precedence when it sits on the bottom row
        if !hint_area.intersects(logo_area) {
            f.render_widget(hint, hint_area);
        }
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::store::Database;
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_menu_shows_every_button() {
        let app = App::new(Database::open_in_memory().unwrap(), &AppConfig::default());
        let screen = render(&app);
        for item in MenuItem::ALL {
            assert!(screen.contains(item.label()), "missing {}", item.label());
        }
        assert!(screen.contains("Ready"));
    }

    #[test]
    fn test_message_is_drawn_over_popup() {
        let mut app = App::new(Database::open_in_memory().unwrap(), &AppConfig::default());
        app.popup = Popup::AddManual;
        app.show_error("Input error", "Year must be a number");
        let screen = render(&app);
        assert!(screen.contains("Year must be a number"));
        assert!(screen.contains("Input error"));
    }

    #[test]
    fn test_splash_draws_logo_inside_small_terminal() {
        use rand::{rngs::StdRng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(1);
        let bouncer = Bouncer::new(10, 4, 7, 3, 1, &mut rng);
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).unwrap();
        terminal.draw(|f| draw_splash(f, &bouncer, "DVD")).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("DVD"));
    }
}
