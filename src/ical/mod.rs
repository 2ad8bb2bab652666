//! This module handles conversion between iCal files and internal representations
//!
//! Reading is done by a small line-oriented scanner, because tasks are re-uploaded from the property lines the server sent us
//! (so that properties this crate does not know about survive a round-trip). Brand new tasks are generated with the `ics` crate.

mod parser;
pub use parser::parse;
mod builder;
pub use builder::{build_new_todo, build_with_completion, generate_uid, with_completion, wrap_vtodo};

use chrono::{DateTime, Utc};

/// Timestamps are written in UTC, in the basic ISO format (`YYYYMMDDTHHMMSSZ`)
pub(crate) fn format_date_time(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Make a raw `DUE` value human-readable.
///
/// `VALUE=DATE:20240115`, `TZID=Europe/Paris:20240115T090000` or `20240115T090000Z` all become `15.01.2024`.
/// Values that do not contain any 8-digit date are returned (almost) unchanged.
pub fn format_due(raw_due: &str) -> String {
    let mut cleaned = raw_due.replacen("VALUE=DATE:", "", 1);
    if cleaned.starts_with("TZID=") {
        if let Some(colon) = cleaned.find(':') {
            cleaned = cleaned[colon + 1..].to_string();
        }
    }

    match first_eight_digits(&cleaned) {
        Some(date) => format!("{}.{}.{}", &date[6..8], &date[4..6], &date[0..4]),
        None => cleaned,
    }
}

fn first_eight_digits(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let mut run_start = 0;
    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() {
            if i + 1 - run_start == 8 {
                return Some(&s[run_start..=i]);
            }
        } else {
            run_start = i + 1;
        }
    }
    None
}

/// RFC5545 TEXT escaping (backslashes, commas, semicolons and newlines)
pub(crate) fn unescape_text(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_formats() {
        assert_eq!(format_due("VALUE=DATE:20240115"), "15.01.2024");
        assert_eq!(format_due("TZID=America/New_York:20240115T090000"), "15.01.2024");
        assert_eq!(format_due("20240115T090000Z"), "15.01.2024");
        assert_eq!(format_due("VALUE=DATE-TIME:20241231T235959Z"), "31.12.2024");
    }

    #[test]
    fn test_due_without_date() {
        assert_eq!(format_due("tomorrow"), "tomorrow");
        assert_eq!(format_due("2024-01-15"), "2024-01-15");
        assert_eq!(format_due("VALUE=DATE:2024011"), "2024011");
        assert_eq!(format_due(""), "");
    }

    #[test]
    fn test_due_takes_the_first_digit_run() {
        assert_eq!(format_due("X-PARAM=1:20240115T120000"), "15.01.2024");
        assert_eq!(format_due("123456789"), "78.56.1234");
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_text(r"Buy milk\, eggs\; bread\nthen \\ cook"), "Buy milk, eggs; bread\nthen \\ cook");
        assert_eq!(unescape_text(r"trailing\"), "trailing\\");
    }
}
