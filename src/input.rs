use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event inside a prompt or modal.
pub enum KeyResult {
    /// Stay in the current mode
    Continue,
    /// Close the prompt/modal without acting
    Finish,
    /// Show a message and close
    Message(String),
    /// Jump to a 1-based record number
    GoTo(usize),
    /// Apply a filter over a column
    Filter { col: usize, text: String },
    /// Switch to the named sheet
    SelectSheet(usize),
    /// Toggle visibility of one column
    ToggleField(usize),
    /// Select or unselect every column
    AllFields(bool),
    /// Consume the install token and install
    InstallAccept,
    /// Consume the install token without installing
    InstallDismiss,
}

/// Check for escape key (Esc or Ctrl+[)
pub fn is_escape(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('[') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// The go-to-record prompt: digits only, Enter commits.
#[derive(Default)]
pub struct GoToHandler {
    pub buffer: String,
}

impl GoToHandler {
    pub fn start(&mut self) {
        self.buffer.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            return KeyResult::Finish;
        }
        match key.code {
            KeyCode::Enter => match self.buffer.parse::<usize>() {
                Ok(n) => KeyResult::GoTo(n),
                Err(_) => KeyResult::Message("Invalid row number.".to_string()),
            },
            KeyCode::Backspace => {
                self.buffer.pop();
                KeyResult::Continue
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.buffer.push(c);
                KeyResult::Continue
            }
            _ => KeyResult::Continue,
        }
    }
}

/// The filter prompt: a column selector (Tab / Up / Down cycles) plus
/// a free-text needle, Enter applies.
#[derive(Default)]
pub struct FilterHandler {
    pub col: usize,
    pub buffer: String,
    col_count: usize,
}

impl FilterHandler {
    /// Open the prompt, keeping the previously chosen column when it
    /// still exists.
    pub fn start(&mut self, col_count: usize) {
        self.buffer.clear();
        self.col_count = col_count;
        if self.col >= col_count {
            self.col = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            return KeyResult::Finish;
        }
        match key.code {
            KeyCode::Enter => KeyResult::Filter {
                col: self.col,
                text: self.buffer.clone(),
            },
            KeyCode::Tab | KeyCode::Down => {
                if self.col_count > 0 {
                    self.col = (self.col + 1) % self.col_count;
                }
                KeyResult::Continue
            }
            KeyCode::BackTab | KeyCode::Up => {
                if self.col_count > 0 {
                    self.col = (self.col + self.col_count - 1) % self.col_count;
                }
                KeyResult::Continue
            }
            KeyCode::Backspace => {
                self.buffer.pop();
                KeyResult::Continue
            }
            KeyCode::Char(c) => {
                self.buffer.push(c);
                KeyResult::Continue
            }
            _ => KeyResult::Continue,
        }
    }
}

/// The field-visibility modal: one checkbox per header position.
#[derive(Default)]
pub struct FieldsHandler {
    pub cursor: usize,
    count: usize,
}

impl FieldsHandler {
    pub fn start(&mut self, count: usize) {
        self.count = count;
        if self.cursor >= count {
            self.cursor = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) || key.code == KeyCode::Enter {
            return KeyResult::Finish;
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                KeyResult::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.count > 0 {
                    self.cursor = (self.cursor + 1).min(self.count - 1);
                }
                KeyResult::Continue
            }
            KeyCode::Char(' ') => {
                if self.count > 0 {
                    KeyResult::ToggleField(self.cursor)
                } else {
                    KeyResult::Continue
                }
            }
            KeyCode::Char('a') => KeyResult::AllFields(true),
            KeyCode::Char('n') => KeyResult::AllFields(false),
            _ => KeyResult::Continue,
        }
    }
}

/// The sheet selector modal.
#[derive(Default)]
pub struct SheetsHandler {
    pub cursor: usize,
    count: usize,
}

impl SheetsHandler {
    pub fn start(&mut self, count: usize, current: usize) {
        self.count = count;
        self.cursor = current.min(count.saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            return KeyResult::Finish;
        }
        match key.code {
            KeyCode::Enter => {
                if self.count > 0 {
                    KeyResult::SelectSheet(self.cursor)
                } else {
                    KeyResult::Finish
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                KeyResult::Continue
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.count > 0 {
                    self.cursor = (self.cursor + 1).min(self.count - 1);
                }
                KeyResult::Continue
            }
            _ => KeyResult::Continue,
        }
    }
}

/// The install confirmation card.
pub struct InstallHandler;

impl InstallHandler {
    pub fn handle_key(key: KeyEvent) -> KeyResult {
        if is_escape(key) {
            return KeyResult::InstallDismiss;
        }
        match key.code {
            KeyCode::Enter | KeyCode::Char('y') => KeyResult::InstallAccept,
            KeyCode::Char('n') => KeyResult::InstallDismiss,
            _ => KeyResult::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_goto_digits_only() {
        let mut h = GoToHandler::default();
        h.start();
        h.handle_key(press(KeyCode::Char('1')));
        h.handle_key(press(KeyCode::Char('x')));
        h.handle_key(press(KeyCode::Char('2')));
        assert_eq!(h.buffer, "12");
        match h.handle_key(press(KeyCode::Enter)) {
            KeyResult::GoTo(n) => assert_eq!(n, 12),
            _ => panic!("expected GoTo"),
        }
    }

    #[test]
    fn test_goto_empty_buffer_rejected() {
        let mut h = GoToHandler::default();
        h.start();
        match h.handle_key(press(KeyCode::Enter)) {
            KeyResult::Message(m) => assert!(m.contains("Invalid")),
            _ => panic!("expected Message"),
        }
    }

    #[test]
    fn test_filter_column_cycles() {
        let mut h = FilterHandler::default();
        h.start(3);
        assert_eq!(h.col, 0);
        h.handle_key(press(KeyCode::Tab));
        h.handle_key(press(KeyCode::Tab));
        assert_eq!(h.col, 2);
        h.handle_key(press(KeyCode::Tab));
        assert_eq!(h.col, 0);
        h.handle_key(press(KeyCode::Up));
        assert_eq!(h.col, 2);
    }

    #[test]
    fn test_filter_commits_column_and_text() {
        let mut h = FilterHandler::default();
        h.start(2);
        h.handle_key(press(KeyCode::Tab));
        h.handle_key(press(KeyCode::Char('4')));
        h.handle_key(press(KeyCode::Char('1')));
        match h.handle_key(press(KeyCode::Enter)) {
            KeyResult::Filter { col, text } => {
                assert_eq!(col, 1);
                assert_eq!(text, "41");
            }
            _ => panic!("expected Filter"),
        }
    }

    #[test]
    fn test_fields_cursor_clamps() {
        let mut h = FieldsHandler::default();
        h.start(2);
        h.handle_key(press(KeyCode::Up));
        assert_eq!(h.cursor, 0);
        h.handle_key(press(KeyCode::Down));
        h.handle_key(press(KeyCode::Down));
        assert_eq!(h.cursor, 1);
        match h.handle_key(press(KeyCode::Char(' '))) {
            KeyResult::ToggleField(i) => assert_eq!(i, 1),
            _ => panic!("expected ToggleField"),
        }
    }

    #[test]
    fn test_install_answers() {
        assert!(matches!(
            InstallHandler::handle_key(press(KeyCode::Enter)),
            KeyResult::InstallAccept
        ));
        assert!(matches!(
            InstallHandler::handle_key(press(KeyCode::Esc)),
            KeyResult::InstallDismiss
        ));
    }
}
