use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, List, ListItem, Paragraph, Row, Table as TableWidget,
};
use ratatui::Frame;

use crate::app::App;
use crate::mode::Mode;
use crate::table::SortDirection;
use crate::text::{display_width, truncate_chars, TRUNCATE_AT};
use crate::viewstate::ViewMode;

/// Cell width cap in the table view; the form view shows full values.
const TABLE_CELL_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    if app.table.is_empty() {
        render_empty(frame, app, chunks[0]);
    } else {
        match app.view.mode {
            ViewMode::Form => render_form(frame, app, chunks[0]),
            ViewMode::Table => render_table(frame, app, chunks[0]),
        }
    }

    render_status(frame, app, chunks[1]);
    render_bottom_line(frame, app, chunks[2]);

    match app.mode {
        Mode::Fields => render_fields_modal(frame, app),
        Mode::Sheets => render_sheets_modal(frame, app),
        Mode::Install => render_install_modal(frame, app),
        _ => {}
    }
}

fn title_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn render_empty(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(app.workbook.file_name());
    let para = Paragraph::new("No data to display.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block);
    frame.render_widget(para, area);
}

/// One record as label/value lines, scrolled by the field cursor.
fn render_form(frame: &mut Frame, app: &mut App, area: Rect) {
    let total = app.table.row_count();
    let current = app.view.current();
    let title = match app.view.filter() {
        Some(_) => format!(
            "Record {} of {} (match {} of {})",
            current + 1,
            total,
            app.view.match_pos() + 1,
            app.view.matches().len()
        ),
        None => format!("Record {} of {}", current + 1, total),
    };

    let label_width = app
        .view
        .visible_cols(&app.table)
        .iter()
        .map(|&c| display_width(&app.table.header_label(c)))
        .max()
        .unwrap_or(0);

    let items: Vec<ListItem> = app
        .view
        .visible_cols(&app.table)
        .iter()
        .map(|&col| {
            let label = app.table.header_label(col);
            let value = app.table.cell(current, col);
            let (shown, truncated) = truncate_chars(value, TRUNCATE_AT);
            let shown = if app.view.is_expanded(col) {
                value.to_string()
            } else {
                shown
            };
            let mut spans = vec![
                Span::styled(format!("{:<label_width$}", label), title_style()),
                Span::raw("  "),
                Span::raw(shown),
            ];
            if truncated && !app.view.is_expanded(col) {
                spans.push(Span::styled(
                    " [Enter expands]",
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_stateful_widget(list, area, &mut app.form_state);
}

/// All displayed rows as a grid, one column per visible header.
fn render_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let cols = app.view.visible_cols(&app.table);
    let rows_shown = app.view.displayed_rows(&app.table);

    let widths: Vec<Constraint> = cols
        .iter()
        .map(|&c| {
            let mut w = display_width(&app.table.header_label(c));
            for &row in &rows_shown {
                w = w.max(display_width(app.table.cell(row, c)));
            }
            Constraint::Length(w.min(TABLE_CELL_WIDTH) as u16)
        })
        .collect();

    let header_cells: Vec<Span> = cols
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let mut label = app.table.header_label(c);
            match app.view.sort() {
                Some((sorted, SortDirection::Ascending)) if sorted == c => label.push_str(" ^"),
                Some((sorted, SortDirection::Descending)) if sorted == c => label.push_str(" v"),
                _ => {}
            }
            let mut style = title_style();
            if i == app.col_cursor {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            Span::styled(label, style)
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    let body: Vec<Row> = rows_shown
        .iter()
        .map(|&row| {
            let cells: Vec<String> = cols
                .iter()
                .map(|&c| truncate_chars(app.table.cell(row, c), TABLE_CELL_WIDTH).0)
                .collect();
            Row::new(cells)
        })
        .collect();

    let table = TableWidget::new(body, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(app.workbook.file_name()),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut parts = vec![
        app.workbook.file_name(),
        app.current_sheet_name(),
        format!("{} view", app.view.mode.as_str()),
    ];
    if !app.table.is_empty() {
        parts.push(format!(
            "record {}/{}",
            app.view.current() + 1,
            app.table.row_count()
        ));
    }
    if let Some(filter) = app.view.filter() {
        parts.push(format!(
            "filter: {} contains \"{}\"",
            app.table.header_label(filter.col),
            filter.raw
        ));
        parts.push(format!(
            "Found {} matches. Showing {} of {}.",
            app.view.matches().len(),
            app.view.match_pos() + 1,
            app.view.matches().len()
        ));
    }

    let status = Paragraph::new(parts.join(" | "))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(status, area);
}

/// Bottom line: an active text prompt, else a message, else key hints.
fn render_bottom_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode {
        Mode::GoTo => format!("Go to record: {}", app.goto_handler.buffer),
        Mode::Filter => format!(
            "Filter {} contains: {}  (Tab switches column)",
            app.table.header_label(app.filter_handler.col),
            app.filter_handler.buffer
        ),
        _ => match &app.message {
            Some(m) => m.clone(),
            None => {
                "\u{2190}/\u{2192} records  / filter  c clear  t view  f fields  o sort  \
                 e/x export  q quit"
                    .to_string()
            }
        },
    };
    let style = if app.mode.is_text_input() {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    frame.render_widget(Paragraph::new(line).style(style), area);
}

fn render_fields_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(50, 60, frame.size());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = (0..app.table.col_count())
        .map(|col| {
            let mark = if app.view.is_visible(col) { "[x]" } else { "[ ]" };
            let line = format!("{} {}", mark, app.table.header_label(col));
            if col == app.fields_handler.cursor {
                ListItem::new(line).style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Fields (space: toggle, a: all, n: none)"),
    );
    frame.render_widget(list, area);
}

fn render_sheets_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(40, 50, frame.size());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = app
        .workbook
        .sheet_names()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mark = if i == app.sheet_index { "* " } else { "  " };
            let line = format!("{}{}", mark, name);
            if i == app.sheets_handler.cursor {
                ListItem::new(line).style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Sheets"));
    frame.render_widget(list, area);
}

fn render_install_modal(frame: &mut Frame, _app: &App) {
    let area = centered_rect(50, 30, frame.size());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from("Add recview to your application launcher?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", title_style()),
            Span::raw("/"),
            Span::styled("Enter", title_style()),
            Span::raw(" install    "),
            Span::styled("n", title_style()),
            Span::raw("/"),
            Span::styled("Esc", title_style()),
            Span::raw(" not now"),
        ]),
    ];
    let para = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Install"));
    frame.render_widget(para, area);
}

/// Rect centered in `r`, sized as a percentage of it.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}
