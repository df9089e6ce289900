//! Cell normalization applied once at sheet load.
//!
//! Dates arrive in three shapes: native date cells, bare numbers in the
//! Excel serial range, and slash-delimited strings. All three collapse
//! to a canonical `dd-mm-yyyy` display string; everything else passes
//! through unchanged.

use std::sync::OnceLock;

use calamine::Data;
use chrono::{Duration, NaiveDate};
use regex::Regex;

/// Plain numbers inside this open interval are treated as Excel date
/// serials (roughly 1954..2064).
const SERIAL_MIN: f64 = 20000.0;
const SERIAL_MAX: f64 = 60000.0;

fn slash_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{2,4})$").unwrap())
}

/// Format an Excel date serial (1900 system, epoch 1899-12-30) as
/// `dd-mm-yyyy`. Returns None for serials outside chrono's range.
pub fn serial_to_date(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::days(serial.floor() as i64))?;
    Some(date.format("%d-%m-%Y").to_string())
}

/// Normalize a string cell: slash-delimited `D/M/Y` dates become
/// `dd-mm-yyyy` (two-digit years are taken as 20xx); anything else is
/// returned as-is.
pub fn normalize_str(s: &str) -> String {
    if let Some(caps) = slash_date_re().captures(s.trim()) {
        let d = &caps[1];
        let m = &caps[2];
        let y = &caps[3];
        let yyyy = if y.len() == 2 {
            format!("20{}", y)
        } else {
            y.to_string()
        };
        return format!("{:0>2}-{:0>2}-{}", d, m, yyyy);
    }
    s.to_string()
}

/// Format a numeric cell: serial-range values become dates, integral
/// values drop the trailing `.0`.
pub fn normalize_number(n: f64) -> String {
    if n > SERIAL_MIN && n < SERIAL_MAX {
        if let Some(date) = serial_to_date(n) {
            return date;
        }
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Convert a decoded cell to its display string.
pub fn normalize_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => normalize_str(s),
        Data::Float(f) => normalize_number(*f),
        Data::Int(i) => normalize_number(*i as f64),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::DateTime(dt) => serial_to_date(dt.as_f64()).unwrap_or_default(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}
