use chrono::NaiveDateTime;
use tracing::warn;

/// Layout SQLite's `datetime('now')` writes.
pub const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Layout returned to readers, e.g. `10/03/2023, 16:25:07`.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y, %H:%M:%S";

/// Reformat a stored timestamp for display. A value that does not parse is
/// passed through unchanged.
pub fn display(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, STORED_FORMAT) {
        Ok(ts) => ts.format(DISPLAY_FORMAT).to_string(),
        Err(e) => {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            raw.to_string()
        }
    }
}
