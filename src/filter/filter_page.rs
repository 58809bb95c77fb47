use super::types::PageWindow;

pub const DEFAULT_PAGE: i64 = 1;

pub struct FilterPage;

impl FilterPage {
    /// Resolve `page`/`limit` into a window. Missing, non-numeric and
    /// non-positive values fall back to the defaults.
    pub fn resolve(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> PageWindow {
        let page = positive_or(page, DEFAULT_PAGE);
        let limit = positive_or(limit, default_limit.max(1));
        PageWindow::new(page, limit)
    }

    /// Clamp the limit to `max`, recomputing skip. Returns the window unchanged when within bounds.
    pub fn cap(window: PageWindow, max: i64) -> PageWindow {
        if max > 0 && window.limit > max {
            PageWindow::new(window.page, max)
        } else {
            window
        }
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    match raw.and_then(parse_leading_int) {
        Some(n) if n > 0 => n,
        _ => default,
    }
}

/// Leading-integer parse: optional sign followed by digits, trailing junk ignored.
/// `"3abc"` is 3, `"abc"` is None.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}
