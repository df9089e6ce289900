use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::{ListState, TableState};
use ratatui::Terminal;
use tracing::info;

use crate::export;
use crate::input::{
    FieldsHandler, FilterHandler, GoToHandler, InstallHandler, KeyResult, SheetsHandler,
};
use crate::install::InstallPrompt;
use crate::mode::Mode;
use crate::prefs::PrefStore;
use crate::table::{SortDirection, Table};
use crate::ui;
use crate::viewstate::{ViewMode, ViewState};
use crate::workbook::Workbook;

pub struct App {
    pub workbook: Workbook,
    pub table: Table,
    pub sheet_index: usize,
    pub view: ViewState,
    pub prefs: PrefStore,
    pub install: InstallPrompt,
    pub mode: Mode,
    pub message: Option<String>,
    pub should_quit: bool,
    /// Where export files land; the working directory outside tests.
    pub export_dir: PathBuf,

    // table view cursors
    pub table_state: TableState,
    pub col_cursor: usize,
    // form view field cursor
    pub form_state: ListState,

    // prompt/modal handlers
    pub goto_handler: GoToHandler,
    pub filter_handler: FilterHandler,
    pub fields_handler: FieldsHandler,
    pub sheets_handler: SheetsHandler,
}

impl App {
    pub fn new(workbook: Workbook, sheet_index: usize, table: Table, prefs: PrefStore) -> Self {
        let mut view = ViewState::new();
        view.mode = prefs.view_mode();
        view.reset_for(&table, prefs.prefs.visible_headers.as_deref());

        let mut app = Self {
            workbook,
            table,
            sheet_index,
            view,
            prefs,
            install: InstallPrompt::capture(),
            mode: Mode::Browse,
            message: None,
            should_quit: false,
            export_dir: PathBuf::from("."),
            table_state: TableState::default(),
            col_cursor: 0,
            form_state: ListState::default(),
            goto_handler: GoToHandler::default(),
            filter_handler: FilterHandler::default(),
            fields_handler: FieldsHandler::default(),
            sheets_handler: SheetsHandler::default(),
        };
        app.sync_cursors();
        app
    }

    pub fn current_sheet_name(&self) -> String {
        self.workbook
            .sheet_names()
            .get(self.sheet_index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.message = None;
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Browse => self.handle_browse_key(key),
            Mode::GoTo => {
                let result = self.goto_handler.handle_key(key);
                self.handle_goto_result(result);
            }
            Mode::Filter => {
                let result = self.filter_handler.handle_key(key);
                self.handle_filter_result(result);
            }
            Mode::Fields => {
                let result = self.fields_handler.handle_key(key);
                self.handle_fields_result(result);
            }
            Mode::Sheets => {
                let result = self.sheets_handler.handle_key(key);
                self.handle_sheets_result(result);
            }
            Mode::Install => {
                let result = InstallHandler::handle_key(key);
                self.handle_install_result(result);
            }
        }
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        // ctrl/meta combinations belong to the terminal, not to record
        // navigation
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::META | KeyModifiers::SUPER)
        {
            return;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('f') => {
                self.fields_handler.start(self.table.col_count());
                self.mode = Mode::Fields;
                return;
            }
            KeyCode::Char('s') => {
                if self.workbook.sheet_names().len() > 1 {
                    self.sheets_handler
                        .start(self.workbook.sheet_names().len(), self.sheet_index);
                    self.mode = Mode::Sheets;
                }
                return;
            }
            KeyCode::Char('i') => {
                // silently unavailable when there is no install token
                if self.install.is_available() {
                    self.mode = Mode::Install;
                }
                return;
            }
            _ => {}
        }

        // everything below operates on records; inert without data
        if self.table.is_empty() {
            return;
        }

        match key.code {
            KeyCode::Char('g') => {
                self.goto_handler.start();
                self.mode = Mode::GoTo;
            }
            KeyCode::Char('/') => {
                self.filter_handler.start(self.table.col_count());
                self.mode = Mode::Filter;
            }
            KeyCode::Char('c') => {
                if self.view.filter().is_some() {
                    self.view.clear_filter();
                    self.sync_cursors();
                    self.message = Some("Filter cleared.".to_string());
                }
            }
            KeyCode::Char('t') => {
                self.view.mode = self.view.mode.toggled();
                self.prefs.set_view_mode(self.view.mode);
                self.sync_cursors();
            }
            KeyCode::Char('e') => self.export(ExportKind::Csv),
            KeyCode::Char('x') => self.export(ExportKind::Xlsx),
            _ => match self.view.mode {
                ViewMode::Form => self.handle_form_key(key),
                ViewMode::Table => self.handle_table_key(key),
            },
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => {
                self.view.step(&self.table, -1);
                self.sync_cursors();
            }
            KeyCode::Right => {
                self.view.step(&self.table, 1);
                self.sync_cursors();
            }
            KeyCode::Up => {
                let sel = self.form_state.selected().unwrap_or(0);
                self.form_state.select(Some(sel.saturating_sub(1)));
            }
            KeyCode::Down => {
                let count = self.view.visible_cols(&self.table).len();
                if count > 0 {
                    let sel = self.form_state.selected().unwrap_or(0);
                    self.form_state.select(Some((sel + 1).min(count - 1)));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                let cols = self.view.visible_cols(&self.table);
                if let Some(&col) = cols.get(self.form_state.selected().unwrap_or(0)) {
                    self.view.toggle_expanded(col);
                }
            }
            _ => {}
        }
    }

    fn handle_table_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => {
                self.col_cursor = self.col_cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                let count = self.view.visible_cols(&self.table).len();
                if count > 0 {
                    self.col_cursor = (self.col_cursor + 1).min(count - 1);
                }
            }
            KeyCode::Up => {
                let sel = self.table_state.selected().unwrap_or(0);
                self.table_state.select(Some(sel.saturating_sub(1)));
            }
            KeyCode::Down => {
                let count = self.view.displayed_rows(&self.table).len();
                if count > 0 {
                    let sel = self.table_state.selected().unwrap_or(0);
                    self.table_state.select(Some((sel + 1).min(count - 1)));
                }
            }
            KeyCode::Enter => {
                // open the highlighted row as a form record
                let displayed = self.view.displayed_rows(&self.table);
                if let Some(&abs) = displayed.get(self.table_state.selected().unwrap_or(0)) {
                    self.view.go_to(&self.table, abs);
                    self.view.mode = ViewMode::Form;
                    self.prefs.set_view_mode(ViewMode::Form);
                    self.sync_cursors();
                }
            }
            KeyCode::Char('o') => self.sort_by_cursor_column(),
            _ => {}
        }
    }

    fn sort_by_cursor_column(&mut self) {
        let cols = self.view.visible_cols(&self.table);
        if cols.is_empty() {
            return;
        }
        let col = cols[self.col_cursor.min(cols.len() - 1)];
        let direction = self.view.sort_request(&mut self.table, col);
        let dir_str = match direction {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        };
        self.message = Some(format!(
            "Sorted by {} ({})",
            self.table.header_label(col),
            dir_str
        ));
        self.sync_cursors();
    }

    fn handle_goto_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::Finish => self.mode = Mode::Browse,
            KeyResult::Message(m) => {
                self.message = Some(m);
                self.mode = Mode::Browse;
            }
            KeyResult::GoTo(n) => {
                self.mode = Mode::Browse;
                if n >= 1 && n <= self.table.row_count() {
                    self.view.go_to(&self.table, n - 1);
                    self.view.mode = ViewMode::Form;
                    self.prefs.set_view_mode(ViewMode::Form);
                    self.sync_cursors();
                } else {
                    self.message = Some("Invalid row number.".to_string());
                }
            }
            _ => {}
        }
    }

    fn handle_filter_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::Finish => self.mode = Mode::Browse,
            KeyResult::Filter { col, text } => {
                self.mode = Mode::Browse;
                match self.view.apply_filter(&self.table, col, &text) {
                    Ok(n) => {
                        self.view.mode = ViewMode::Form;
                        self.prefs.set_view_mode(ViewMode::Form);
                        self.message = Some(format!("Found {} match(es).", n));
                        self.sync_cursors();
                    }
                    Err(m) => self.message = Some(m),
                }
            }
            _ => {}
        }
    }

    fn handle_fields_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::Finish => self.mode = Mode::Browse,
            KeyResult::ToggleField(col) => {
                self.view.toggle_col(col);
                self.persist_visible_headers();
            }
            KeyResult::AllFields(on) => {
                self.view.set_all_visible(on);
                self.persist_visible_headers();
            }
            _ => {}
        }
    }

    fn persist_visible_headers(&mut self) {
        let names = self.view.visible_names(&self.table);
        self.prefs.set_visible_headers(names);
        // visibility changes can shrink the cursors' ranges
        let count = self.view.visible_cols(&self.table).len();
        self.col_cursor = self.col_cursor.min(count.saturating_sub(1));
        let sel = self.form_state.selected().unwrap_or(0);
        self.form_state.select(Some(sel.min(count.saturating_sub(1))));
    }

    fn handle_sheets_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::Finish => self.mode = Mode::Browse,
            KeyResult::SelectSheet(idx) => {
                self.mode = Mode::Browse;
                self.load_sheet(idx);
            }
            _ => {}
        }
    }

    /// Switch to another sheet. On decode failure the old table stays
    /// in place and the error lands on the message line.
    pub fn load_sheet(&mut self, idx: usize) {
        let Some(name) = self.workbook.sheet_names().get(idx).cloned() else {
            return;
        };
        match self.workbook.sheet(&name) {
            Ok(table) => {
                self.table = table;
                self.sheet_index = idx;
                self.view
                    .reset_for(&self.table, self.prefs.prefs.visible_headers.as_deref());
                self.sync_cursors();
                if self.table.is_empty() {
                    self.message = Some("No data in this sheet.".to_string());
                } else {
                    info!(sheet = %name, "sheet selected");
                }
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn handle_install_result(&mut self, result: KeyResult) {
        match result {
            KeyResult::Continue => {}
            KeyResult::InstallAccept => {
                self.mode = Mode::Browse;
                match self.install.accept() {
                    Some(Ok(())) => {
                        self.prefs.set_install_choice("accepted");
                        self.message = Some("Launcher entry installed.".to_string());
                    }
                    Some(Err(e)) => self.message = Some(format!("Install failed: {}", e)),
                    None => {}
                }
            }
            KeyResult::InstallDismiss => {
                self.mode = Mode::Browse;
                self.install.dismiss();
                self.prefs.set_install_choice("dismissed");
            }
            _ => self.mode = Mode::Browse,
        }
    }

    fn export(&mut self, kind: ExportKind) {
        let rows = self.view.displayed_rows(&self.table);
        let cols = self.view.visible_cols(&self.table);
        let (result, filename) = match kind {
            ExportKind::Csv => {
                let path = self.export_dir.join(export::CSV_FILENAME);
                (
                    export::write_csv(&self.table, &rows, &cols, &path),
                    export::CSV_FILENAME,
                )
            }
            ExportKind::Xlsx => {
                let path = self.export_dir.join(export::XLSX_FILENAME);
                (
                    export::write_xlsx(&self.table, &rows, &cols, &path),
                    export::XLSX_FILENAME,
                )
            }
        };
        self.message = Some(match result {
            Ok(()) => format!("Exported {} record(s) to {}", rows.len(), filename),
            Err(e) => format!("Export failed: {}", e),
        });
    }

    /// Point both view cursors at the current record after any change
    /// to navigation, filtering, or the table itself.
    fn sync_cursors(&mut self) {
        let displayed = self.view.displayed_rows(&self.table);
        if displayed.is_empty() {
            self.table_state.select(None);
        } else {
            let pos = displayed
                .iter()
                .position(|&r| r == self.view.current())
                .unwrap_or(0);
            self.table_state.select(Some(pos));
        }

        let col_count = self.view.visible_cols(&self.table).len();
        self.col_cursor = self.col_cursor.min(col_count.saturating_sub(1));
        if col_count == 0 {
            self.form_state.select(None);
        } else if self.form_state.selected().is_none() {
            self.form_state.select(Some(0));
        } else {
            let sel = self.form_state.selected().unwrap_or(0);
            self.form_state.select(Some(sel.min(col_count - 1)));
        }
    }
}

enum ExportKind {
    Csv,
    Xlsx,
}
