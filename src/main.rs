use std::io;
use std::path::PathBuf;
use std::process;

use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

mod app;
mod export;
mod input;
mod install;
mod mode;
mod normalize;
mod prefs;
mod table;
mod text;
mod ui;
mod viewstate;
mod workbook;

use app::App;
use prefs::PrefStore;
use workbook::Workbook;

const USAGE: &str = "Usage: recview [OPTIONS] <FILE>

Browse a spreadsheet one record at a time.

Arguments:
  <FILE>  CSV, TSV, or Excel file to open

Options:
  -d, --delimiter <CHAR>  Field delimiter for text files
  -s, --sheet <NAME>      Sheet to open first
  -h, --help              Print help";

struct Args {
    path: PathBuf,
    delimiter: Option<u8>,
    sheet: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut path = None;
    let mut delimiter = None;
    let mut sheet = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{}", USAGE);
                process::exit(0);
            }
            "-d" | "--delimiter" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("{} requires a value", arg))?;
                let mut bytes = value.bytes();
                match (bytes.next(), bytes.next()) {
                    (Some(b), None) => delimiter = Some(b),
                    _ => return Err("delimiter must be a single character".to_string()),
                }
            }
            "-s" | "--sheet" => {
                sheet = Some(
                    args.next()
                        .ok_or_else(|| format!("{} requires a value", arg))?,
                );
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {}", other));
            }
            other => {
                if path.is_some() {
                    return Err("only one file may be given".to_string());
                }
                path = Some(PathBuf::from(other));
            }
        }
    }

    Ok(Args {
        path: path.ok_or_else(|| "no file given".to_string())?,
        delimiter,
        sheet,
    })
}

/// Log to a file in the user's data directory; never to the terminal
/// the TUI owns. No data directory means no logging, silently.
fn init_logging() {
    let Some(dir) = dirs::data_dir().map(|d| d.join("recview")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::File::create(dir.join("recview.log")) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(std::sync::Arc::new(file))
        .with_ansi(false)
        .init();
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", e, USAGE);
            process::exit(2);
        }
    };

    init_logging();

    let mut workbook = match Workbook::open(&args.path, args.delimiter) {
        Ok(wb) => wb,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let sheet_index = match &args.sheet {
        Some(name) => match workbook.sheet_names().iter().position(|s| s == name) {
            Some(idx) => idx,
            None => {
                eprintln!("error: no sheet named '{}'", name);
                process::exit(1);
            }
        },
        None => 0,
    };
    let sheet_name = workbook.sheet_names()[sheet_index].clone();
    let table = match workbook.sheet(&sheet_name) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    info!(rows = table.row_count(), cols = table.col_count(), "loaded");

    // leave the terminal usable if we panic mid-draw
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        default_hook(info);
    }));

    if let Err(e) = run_tui(workbook, sheet_index, table) {
        restore_terminal();
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run_tui(workbook: Workbook, sheet_index: usize, table: table::Table) -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let mut app = App::new(workbook, sheet_index, table, PrefStore::load());
    let result = app.run(&mut terminal);

    restore_terminal();
    result
}
