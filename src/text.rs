use unicode_width::UnicodeWidthStr;

/// Maximum characters shown for a field value before it is truncated
/// behind an expand toggle.
pub const TRUNCATE_AT: usize = 80;

/// Fold a string for matching: lowercase, trim, collapse runs of
/// whitespace to a single space.
pub fn fold_for_match(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            in_space = true;
            continue;
        }
        if in_space && !out.is_empty() {
            out.push(' ');
        }
        in_space = false;
        for lc in c.to_lowercase() {
            out.push(lc);
        }
    }
    out
}

/// Truncate to at most `max` characters, appending an ellipsis when
/// anything was cut. Counts chars, not bytes, so multibyte values
/// never get split.
pub fn truncate_chars(s: &str, max: usize) -> (String, bool) {
    if s.chars().count() <= max {
        return (s.to_string(), false);
    }
    let cut: String = s.chars().take(max).collect();
    (format!("{}...", cut), true)
}

/// Display width of a string in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Extract the numeric content of a cell for sort comparison: keeps
/// digits and dots, plus a minus sign only in the leading position.
/// Returns None unless the remainder parses as a finite number.
pub fn sortable_number(s: &str) -> Option<f64> {
    let mut cleaned = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '0'..='9' | '.' => cleaned.push(c),
            '-' if cleaned.is_empty() => cleaned.push('-'),
            _ => {}
        }
    }
    let n: f64 = cleaned.parse().ok()?;
    n.is_finite().then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_for_match() {
        assert_eq!(fold_for_match("  Hello   World "), "hello world");
        assert_eq!(fold_for_match("ABC"), "abc");
        assert_eq!(fold_for_match("   "), "");
        assert_eq!(fold_for_match("a\t\nb"), "a b");
    }

    #[test]
    fn test_truncate_chars() {
        let (s, cut) = truncate_chars("short", 80);
        assert_eq!(s, "short");
        assert!(!cut);

        let long = "x".repeat(200);
        let (s, cut) = truncate_chars(&long, 80);
        assert!(cut);
        assert_eq!(s.chars().count(), 83); // 80 + "..."
        assert!(s.ends_with("..."));
    }

    #[test]
    fn test_sortable_number() {
        assert_eq!(sortable_number("42"), Some(42.0));
        assert_eq!(sortable_number("$1,234.50"), Some(1234.50));
        assert_eq!(sortable_number("-7kg"), Some(-7.0));
        assert_eq!(sortable_number("abc"), None);
        assert_eq!(sortable_number(""), None);
        // minus sign only counts when leading
        assert_eq!(sortable_number("3-4"), Some(34.0));
    }
}
