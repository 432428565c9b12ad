//! Conversion of stored UTC date-times into the server's local timezone for display.

use time::{OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description};
use time_tz::{Offset, TimeZone};

/// How record dates are shown, e.g. "Sat, Mar 01, 2025, 09:30 AM".
const DISPLAY_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[weekday repr:short], [month repr:short] [day], [year], [hour repr:12]:[minute] [period]"
);

pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Format `date_time` for display in the local timezone given by `local_offset`.
pub fn format_local_date_time(date_time: OffsetDateTime, local_offset: UtcOffset) -> String {
    date_time
        .to_offset(local_offset)
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|error| {
            tracing::error!("could not format date {date_time}: {error}");
            date_time.to_string()
        })
}
