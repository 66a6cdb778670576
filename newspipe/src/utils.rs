/// Text processing utilities
pub mod text {
    /// Keep at most `max_chars` characters. Counts chars, so multi-byte text
    /// is never split inside a code point.
    pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
        match text.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &text[..byte_index],
            None => text,
        }
    }
}

/// Time utilities
pub mod time {
    use chrono::{DateTime, Local, NaiveDate, TimeZone};

    pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
    pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn today_local() -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn file_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        at.format(FILE_STAMP_FORMAT).to_string()
    }

    pub fn display_stamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        at.format(DISPLAY_FORMAT).to_string()
    }
}
