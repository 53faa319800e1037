use chrono::{DateTime, Utc};

/// Wall-clock label such as `22:13:20`.
#[must_use]
pub fn format_clock(value: DateTime<Utc>) -> String {
    value.format("%H:%M:%S").to_string()
}
