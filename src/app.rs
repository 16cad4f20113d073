use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::manual::{Manual, FIELD_LABELS, YEAR_FIELD};
use crate::store::Database;

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    AddManual,
    Search,
    Edit,
    ViewAll,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] = [
        MenuItem::AddManual,
        MenuItem::Search,
        MenuItem::Edit,
        MenuItem::ViewAll,
        MenuItem::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::AddManual => "Add new manual",
            MenuItem::Search => "Search",
            MenuItem::Edit => "Edit",
            MenuItem::ViewAll => "View all titles",
            MenuItem::Exit => "Exit",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            MenuItem::AddManual => 'a',
            MenuItem::Search => 's',
            MenuItem::Edit => 'e',
            MenuItem::ViewAll => 'v',
            MenuItem::Exit => 'q',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    AddManual,
    Search,
    Edit,
    ViewAll,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// Blocking message box drawn above everything else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Exit,
    Delete(String),
}

pub struct App {
    db: Database,
    notifications: bool,

    pub popup: Popup,
    pub message: Option<Message>,
    pub should_quit: bool,

    // Main menu
    pub selected_menu: usize,

    // Add/Edit form buffers, in FIELD_LABELS order
    pub form: [String; 4],
    // Focused input. Add: 0..4 = form. Edit: 0 = lookup, 1..=4 = form.
    pub focus: usize,

    // Edit lookup
    pub lookup: String,
    pub edit_target: Option<String>,  // Title of the record the lookup found

    // Search
    pub search_query: String,
    pub search_results: Option<Vec<Manual>>,  // None until the first search
    pub search_selected: usize,

    // View all titles
    pub titles: Vec<String>,
    pub titles_selected: usize,

    // Pending confirmation and the popup to go back to afterwards
    pub confirm: Option<ConfirmAction>,
    pub confirm_return: Popup,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(db: Database, config: &AppConfig) -> Self {
        Self {
            db,
            notifications: config.notifications,

            popup: Popup::None,
            message: None,
            should_quit: false,

            selected_menu: 0,

            form: Default::default(),
            focus: 0,

            lookup: String::new(),
            edit_target: None,

            search_query: String::new(),
            search_results: None,
            search_selected: 0,

            titles: Vec::new(),
            titles_selected: 0,

            confirm: None,
            confirm_return: Popup::None,

            status_message: None,
            status_message_time: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    fn show_info(&mut self, title: &str, body: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Info,
            title: title.to_string(),
            body: body.into(),
        });
    }

    /// Show an error box (used by the main loop for failed actions too)
    pub fn show_error(&mut self, title: &str, body: impl Into<String>) {
        self.message = Some(Message {
            kind: MessageKind::Error,
            title: title.to_string(),
            body: body.into(),
        });
    }

    fn notify(&self, body: &str) {
        if !self.notifications {
            return;
        }
        if let Err(e) = notify_rust::Notification::new()
            .summary("manuals")
            .body(body)
            .icon("accessories-dictionary")
            .show()
        {
            tracing::warn!("Notification failed: {}", e);
        }
    }

    /// Text prompt for the pending confirmation
    pub fn confirm_prompt(&self) -> String {
        match &self.confirm {
            Some(ConfirmAction::Exit) => "Do you really want to quit?".to_string(),
            Some(ConfirmAction::Delete(title)) => format!("Delete every manual titled '{}'?", title),
            None => "Confirm?".to_string(),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // A message box blocks everything underneath
        if self.message.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.message = None;
            }
            return Ok(());
        }

        match self.popup {
            Popup::None => self.handle_menu_key(key),
            Popup::AddManual => self.handle_add_key(key),
            Popup::Edit => self.handle_edit_key(key),
            Popup::Search => self.handle_search_key(key),
            Popup::ViewAll => self.handle_view_all_key(key),
            Popup::Confirm => self.handle_confirm_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> Result<()> {
        let count = MenuItem::ALL.len();
        match key.code {
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.selected_menu = (self.selected_menu + 1) % count;
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => {
                self.selected_menu = self.selected_menu.checked_sub(1).unwrap_or(count - 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.activate(MenuItem::ALL[self.selected_menu])?;
            }
            KeyCode::Esc => self.activate(MenuItem::Exit)?,
            KeyCode::Char(c) => {
                if let Some(pos) = MenuItem::ALL.iter().position(|item| item.shortcut() == c) {
                    self.selected_menu = pos;
                    self.activate(MenuItem::ALL[pos])?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn activate(&mut self, item: MenuItem) -> Result<()> {
        match item {
            MenuItem::AddManual => {
                self.form = Default::default();
                self.focus = 0;
                self.popup = Popup::AddManual;
            }
            MenuItem::Search => {
                self.search_query.clear();
                self.search_results = None;
                self.search_selected = 0;
                self.popup = Popup::Search;
            }
            MenuItem::Edit => {
                self.lookup.clear();
                self.form = Default::default();
                self.edit_target = None;
                self.focus = 0;
                self.popup = Popup::Edit;
            }
            MenuItem::ViewAll => {
                self.titles_selected = 0;
                self.reload_titles()?;
                self.popup = Popup::ViewAll;
            }
            MenuItem::Exit => {
                self.ask_confirm(ConfirmAction::Exit, Popup::None);
            }
        }
        Ok(())
    }

    fn ask_confirm(&mut self, action: ConfirmAction, return_to: Popup) {
        self.confirm = Some(action);
        self.confirm_return = return_to;
        self.popup = Popup::Confirm;
    }

    fn close_popup(&mut self) {
        self.popup = Popup::None;
        self.focus = 0;
    }

    /// Apply a text-editing key to `buffer`. Returns true if consumed.
    ///
    /// Ctrl-U clears the field; other Ctrl/Alt chords are ignored.
    fn edit_text(buffer: &mut String, key: &KeyEvent) -> bool {
        let chord = key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                buffer.clear();
                true
            }
            _ if chord => false,
            KeyCode::Backspace => {
                buffer.pop();
                true
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                true
            }
            _ => false,
        }
    }

    fn handle_add_key(&mut self, key: KeyEvent) -> Result<()> {
        let fields = FIELD_LABELS.len();
        match key.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % fields,
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.checked_sub(1).unwrap_or(fields - 1);
            }
            KeyCode::F(2) => self.save_new_manual()?,
            KeyCode::Enter => {
                if self.focus == YEAR_FIELD {
                    self.save_new_manual()?;
                } else {
                    self.focus += 1;
                }
            }
            _ => {
                Self::edit_text(&mut self.form[self.focus], &key);
            }
        }
        Ok(())
    }

    fn save_new_manual(&mut self) -> Result<()> {
        let manual = match Manual::from_fields(&self.form) {
            Ok(m) => m,
            Err(e) => {
                // Keep the popup open with the input intact
                self.focus = YEAR_FIELD;
                self.show_error("Input error", e.to_string());
                return Ok(());
            }
        };

        self.db.save(&manual)?;
        tracing::info!("Added manual '{}'", manual.title);

        self.close_popup();
        self.form = Default::default();
        self.show_info("Success", "Manual added");
        self.set_status(format!("Added '{}'", manual.title));
        self.notify(&format!("Added '{}'", manual.title));
        Ok(())
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        // Lookup field plus the four form fields
        let inputs = FIELD_LABELS.len() + 1;
        match key.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % inputs,
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.checked_sub(1).unwrap_or(inputs - 1);
            }
            KeyCode::F(2) => self.save_edited_manual()?,
            KeyCode::Enter => {
                if self.focus == 0 {
                    self.find_manual()?;
                } else if self.focus == inputs - 1 {
                    self.save_edited_manual()?;
                } else {
                    self.focus += 1;
                }
            }
            _ => {
                let buffer = if self.focus == 0 {
                    &mut self.lookup
                } else {
                    &mut self.form[self.focus - 1]
                };
                Self::edit_text(buffer, &key);
            }
        }
        Ok(())
    }

    /// Fill the edit form from the first record matching the lookup text
    fn find_manual(&mut self) -> Result<()> {
        let matches = self.db.load(Some(self.lookup.as_str()))?;
        match matches.into_iter().next() {
            Some(manual) => {
                self.form = manual.to_fields();
                self.set_status(format!("Editing '{}'", manual.title));
                self.edit_target = Some(manual.title);
                self.focus = 1;
            }
            None => {
                self.edit_target = None;
                self.show_info("Result", "Manual not found.");
            }
        }
        Ok(())
    }

    fn save_edited_manual(&mut self) -> Result<()> {
        let manual = match Manual::from_fields(&self.form) {
            Ok(m) => m,
            Err(e) => {
                self.focus = YEAR_FIELD + 1;
                self.show_error("Input error", e.to_string());
                return Ok(());
            }
        };

        let old_title = self
            .edit_target
            .clone()
            .unwrap_or_else(|| self.lookup.clone());

        let changed = self.db.update(&old_title, &manual)?;
        if changed == 0 {
            self.show_info("Result", format!("No manual titled '{}'", old_title));
            return Ok(());
        }

        self.close_popup();
        self.edit_target = None;
        self.show_info("Success", "Manual updated");
        self.set_status(format!("Updated '{}'", manual.title));
        self.notify(&format!("Updated '{}'", manual.title));
        Ok(())
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => self.close_popup(),
            KeyCode::Enter => {
                let results = self.db.load(Some(self.search_query.as_str()))?;
                self.set_status(format!("{} result(s)", results.len()));
                self.search_results = Some(results);
                self.search_selected = 0;
            }
            KeyCode::Down => {
                if let Some(results) = &self.search_results {
                    if !results.is_empty() {
                        self.search_selected = (self.search_selected + 1) % results.len();
                    }
                }
            }
            KeyCode::Up => {
                if let Some(results) = &self.search_results {
                    if !results.is_empty() {
                        self.search_selected =
                            self.search_selected.checked_sub(1).unwrap_or(results.len() - 1);
                    }
                }
            }
            _ => {
                Self::edit_text(&mut self.search_query, &key);
            }
        }
        Ok(())
    }

    fn reload_titles(&mut self) -> Result<()> {
        self.titles = self
            .db
            .load(None)?
            .into_iter()
            .map(|m| m.title)
            .collect();

        if self.titles_selected >= self.titles.len() {
            self.titles_selected = self.titles.len().saturating_sub(1);
        }
        Ok(())
    }

    fn handle_view_all_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.close_popup(),
            KeyCode::Char('j') | KeyCode::Down => {
                if !self.titles.is_empty() {
                    self.titles_selected = (self.titles_selected + 1) % self.titles.len();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if !self.titles.is_empty() {
                    self.titles_selected =
                        self.titles_selected.checked_sub(1).unwrap_or(self.titles.len() - 1);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(title) = self.titles.get(self.titles_selected).cloned() {
                    self.ask_confirm(ConfirmAction::Delete(title), Popup::ViewAll);
                }
            }
            KeyCode::Char('R') => self.reload_titles()?,
            _ => {}
        }
        Ok(())
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                let action = self.confirm.take();
                self.popup = self.confirm_return;
                match action {
                    Some(ConfirmAction::Exit) => self.should_quit = true,
                    Some(ConfirmAction::Delete(title)) => self.delete_manual(&title)?,
                    None => {}
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.confirm = None;
                self.popup = self.confirm_return;
            }
            _ => {}
        }
        Ok(())
    }

    fn delete_manual(&mut self, title: &str) -> Result<()> {
        let removed = self.db.delete(title)?;
        self.reload_titles()?;
        self.set_status(format!("Deleted {} manual(s) titled '{}'", removed, title));
        if removed > 0 {
            self.notify(&format!("Deleted '{}'", title));
        }
        Ok(())
    }

    /// Periodic housekeeping, called once per loop iteration
    pub fn tick(&mut self) {
        if let Some(when) = self.status_message_time {
            if when.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Database::open_in_memory().unwrap(), &AppConfig::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    /// Fill the Add form field by field and submit with Enter
    fn add(app: &mut App, fields: [&str; 4]) {
        press(app, KeyCode::Char('a'));
        for field in fields {
            type_text(app, field);
            press(app, KeyCode::Enter);
        }
    }

    #[test]
    fn test_menu_navigation_wraps() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected_menu, MenuItem::ALL.len() - 1);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.selected_menu, 0);
    }

    #[test]
    fn test_add_manual_saves_and_confirms() {
        let mut app = app();
        add(&mut app, ["Dune", "Fiction", "Frank Herbert", "1965"]);

        assert_eq!(app.popup, Popup::None);
        let message = app.message.clone().unwrap();
        assert_eq!(message.kind, MessageKind::Info);
        assert_eq!(message.body, "Manual added");

        let all = app.db.load(None).unwrap();
        assert_eq!(all, vec![Manual::new("Dune", "Fiction", "Frank Herbert", 1965)]);
    }

    #[test]
    fn test_add_with_bad_year_keeps_form_open() {
        let mut app = app();
        add(&mut app, ["Dune", "Fiction", "Frank Herbert", "sixties"]);

        assert_eq!(app.popup, Popup::AddManual);
        assert_eq!(app.message.as_ref().unwrap().kind, MessageKind::Error);
        assert_eq!(app.form[0], "Dune");
        assert!(app.db.load(None).unwrap().is_empty());

        // Dismiss, fix the year, save with F2
        press(&mut app, KeyCode::Enter);
        assert!(app.message.is_none());
        for _ in 0.."sixties".len() {
            press(&mut app, KeyCode::Backspace);
        }
        type_text(&mut app, "1965");
        press(&mut app, KeyCode::F(2));

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.db.load(None).unwrap().len(), 1);
    }

    #[test]
    fn test_message_blocks_other_keys() {
        let mut app = app();
        add(&mut app, ["A", "B", "C", "x"]);
        press(&mut app, KeyCode::Char('z'));
        assert_eq!(app.form[YEAR_FIELD], "x");
    }

    #[test]
    fn test_search_by_author_substring() {
        let mut app = app();
        add(&mut app, ["Dune", "Fiction", "Frank Herbert", "1965"]);
        press(&mut app, KeyCode::Enter);
        add(&mut app, ["Emma", "Fiction", "Jane Austen", "1815"]);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.popup, Popup::Search);
        type_text(&mut app, "Herb");
        press(&mut app, KeyCode::Enter);

        let results = app.search_results.clone().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].details(), "Dune (1965), Subject: Fiction, Author: Frank Herbert");
    }

    #[test]
    fn test_search_without_match() {
        let mut app = app();
        press(&mut app, KeyCode::Char('s'));
        type_text(&mut app, "nothing");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.search_results, Some(Vec::new()));
    }

    #[test]
    fn test_edit_by_partial_lookup_updates_found_record() {
        let mut app = app();
        add(&mut app, ["Calculus", "Mathematics", "Spivak", "1967"]);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "Calc");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.edit_target.as_deref(), Some("Calculus"));
        assert_eq!(app.form[2], "Spivak");
        assert_eq!(app.focus, 1);

        // Change the year and save
        app.form[YEAR_FIELD] = "2008".to_string();
        press(&mut app, KeyCode::F(2));

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.message.as_ref().unwrap().body, "Manual updated");
        let all = app.db.load(None).unwrap();
        assert_eq!(all, vec![Manual::new("Calculus", "Mathematics", "Spivak", 2008)]);
    }

    #[test]
    fn test_edit_lookup_not_found() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "Missing");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.message.as_ref().unwrap().body, "Manual not found.");
        assert!(app.edit_target.is_none());
        assert_eq!(app.popup, Popup::Edit);
    }

    #[test]
    fn test_edit_without_lookup_match_reports_zero_rows() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        type_text(&mut app, "Ghost");
        app.form = ["Ghost".into(), "S".into(), "A".into(), "2000".into()];
        press(&mut app, KeyCode::F(2));

        assert_eq!(app.popup, Popup::Edit);
        assert_eq!(app.message.as_ref().unwrap().body, "No manual titled 'Ghost'");
        assert!(app.db.load(None).unwrap().is_empty());
    }

    #[test]
    fn test_view_all_and_delete() {
        let mut app = app();
        add(&mut app, ["Dune", "Fiction", "Frank Herbert", "1965"]);
        press(&mut app, KeyCode::Enter);
        add(&mut app, ["Emma", "Fiction", "Jane Austen", "1815"]);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('v'));
        assert_eq!(app.titles, vec!["Dune", "Emma"]);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.popup, Popup::Confirm);
        assert_eq!(app.confirm_prompt(), "Delete every manual titled 'Emma'?");

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.popup, Popup::ViewAll);
        assert_eq!(app.titles, vec!["Dune"]);
        assert_eq!(app.titles_selected, 0);
    }

    #[test]
    fn test_delete_cancelled() {
        let mut app = app();
        add(&mut app, ["Dune", "Fiction", "Frank Herbert", "1965"]);
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('v'));
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.popup, Popup::ViewAll);
        assert_eq!(app.titles.len(), 1);
    }

    #[test]
    fn test_exit_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.popup, Popup::Confirm);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.popup, Popup::None);
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Enter);
        assert!(app.should_quit);
    }

    #[test]
    fn test_menu_enter_activates_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.popup, Popup::Search);

        // Typed characters go to the query, not menu shortcuts
        type_text(&mut app, "qa");
        assert_eq!(app.search_query, "qa");
        assert_eq!(app.popup, Popup::Search);

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)).unwrap();
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_control_chords_do_not_type() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Dune");

        app.handle_key(KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)).unwrap();
        app.handle_key(KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)).unwrap();
        assert_eq!(app.form[0], "Dune");

        // Ctrl-U clears the focused field
        app.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)).unwrap();
        assert_eq!(app.form[0], "");

        // Shifted characters still type
        app.handle_key(KeyEvent::new(KeyCode::Char('D'), KeyModifiers::SHIFT)).unwrap();
        assert_eq!(app.form[0], "D");
    }

    #[test]
    fn test_status_clears_after_timeout() {
        let mut app = app();
        app.status_message = Some("old".to_string());
        app.status_message_time = Some(Instant::now() - Duration::from_secs(5));
        app.tick();
        assert!(app.status_message.is_none());
    }
}
