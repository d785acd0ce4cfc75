//! Formatting and small-value helpers shared across the dashboard.
//!
//! The school runs on the Thai calendar: dates are displayed as
//! `day <Thai month> <Buddhist-era year>`, and the backend's monthly
//! series is labeled with Thai month names. Everything here is a pure
//! function except [`Debouncer`] and the unique-id counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{Datelike, NaiveDate, Utc};

/// Thai month names, January first. Shared by the date formatter and the
/// zero-filled fallback series.
pub const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Displayed when a task has no due date.
pub const NO_DUE_DATE_LABEL: &str = "ไม่มีกำหนด";

/// The wire sentinel the backend uses for tasks without a due date.
pub const NO_DUE_DATE_SENTINEL: &str = "No Due Date";

// ---------------------------------------------------------------------------
// Thai calendar formatting
// ---------------------------------------------------------------------------

/// Convert a Gregorian year to the Buddhist-era year used everywhere in
/// the school's records.
pub fn buddhist_year(gregorian: i32) -> i32 {
    gregorian + 543
}

/// The current Buddhist-era year.
pub fn current_buddhist_year() -> i32 {
    buddhist_year(Utc::now().year())
}

/// Format a wire date string as `day <Thai month> <BE year>`.
///
/// Accepts ISO dates (`2024-06-15` or a full RFC 3339 timestamp — only the
/// first ten characters are considered). The empty string and the
/// `"No Due Date"` sentinel render as "ไม่มีกำหนด". Anything unparseable is
/// returned unchanged rather than erroring — the table keeps rendering
/// whatever the spreadsheet holds.
pub fn format_thai_date(wire: &str) -> String {
    let trimmed = wire.trim();
    if trimmed.is_empty() || trimmed == NO_DUE_DATE_SENTINEL {
        return NO_DUE_DATE_LABEL.to_string();
    }

    let Some(prefix) = trimmed.get(..10) else {
        return trimmed.to_string();
    };

    match NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
        Ok(date) => {
            let month = THAI_MONTHS[date.month0() as usize];
            format!("{} {} {}", date.day(), month, buddhist_year(date.year()))
        }
        Err(_) => trimmed.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Format a count with comma separators for readability.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}

// ---------------------------------------------------------------------------
// Unique ids
// ---------------------------------------------------------------------------

/// Process-wide counter folded into every generated id. Guarantees that
/// ids minted in the same millisecond still differ.
static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Encode a value in lowercase base-36.
pub fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 digits are ASCII")
}

/// A short suffix unique within this process, even under rapid calls:
/// clock entropy in the high bits, the counter in the low 20 bits, so two
/// suffixes can only collide after a million calls in one process.
pub fn unique_suffix() -> String {
    let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    base36(((epoch_millis() & 0xffff) << 20) | (count & 0xf_ffff))
}

/// Generate a task identifier for reports filed without a task context:
/// a prefix, the epoch-millisecond timestamp, and a short suffix,
/// upper-cased.
pub fn generate_task_gid() -> String {
    format!("TASK-{}-{}", epoch_millis(), unique_suffix()).to_uppercase()
}

// ---------------------------------------------------------------------------
// Refresh debouncing
// ---------------------------------------------------------------------------

/// Coalesces refresh triggers that arrive closer together than a minimum
/// interval. Used by watch mode so an online-again notification and the
/// regular tick don't both reload the dashboard back to back.
#[derive(Debug)]
pub struct Debouncer {
    min_interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last: None,
        }
    }

    /// Returns `true` and arms the debouncer if enough time has passed
    /// since the last accepted trigger.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(prev) if now.duration_since(prev) < self.min_interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
