//! A module to build ICal files

use chrono::{DateTime, Utc};
use ics::properties::{PercentComplete, Status, Summary};
use ics::{escape_text, ICalendar, ToDo};
use uuid::Uuid;

use crate::config;
use crate::ical::format_date_time;
use crate::ical::parser::physical_lines;

/// Properties that describe the completion of a task. They are all rewritten when the completion changes.
const COMPLETION_PROPERTIES: [&str; 3] = ["STATUS", "PERCENT-COMPLETE", "COMPLETED"];

fn property_name(line: &str) -> Option<String> {
    let end = line.find(|c: char| c == ':' || c == ';')?;
    Some(line[..end].to_ascii_uppercase())
}

/// Removes the completion properties of the task itself (not the ones of nested components such as `VALARM`), including their folded continuation lines
fn strip_completion_properties<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut kept = Vec::with_capacity(lines.len());
    let mut depth: usize = 0;
    let mut skipping = false;

    for line in lines {
        if line.starts_with(' ') || line.starts_with('\t') {
            if !skipping {
                kept.push(*line);
            }
            continue;
        }
        skipping = false;

        match property_name(line).as_deref() {
            Some("BEGIN") => depth += 1,
            Some("END") => depth = depth.saturating_sub(1),
            Some(name) if depth == 0 && COMPLETION_PROPERTIES.contains(&name) => {
                skipping = true;
                continue;
            },
            _ => {},
        }
        kept.push(*line);
    }
    kept
}

/// Returns a copy of a VTODO body (i.e. its property lines, without `BEGIN:VTODO` and `END:VTODO`), with its completion properties replaced.
pub fn with_completion(vtodo_body: &str, completed: bool, now: &DateTime<Utc>) -> String {
    let lines = physical_lines(vtodo_body);
    let mut body: Vec<String> = strip_completion_properties(&lines)
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.to_string())
        .collect();

    if completed {
        body.push("STATUS:COMPLETED".to_string());
        body.push("PERCENT-COMPLETE:100".to_string());
        body.push(format!("COMPLETED:{}", format_date_time(now)));
    } else {
        body.push("STATUS:NEEDS-ACTION".to_string());
        body.push("PERCENT-COMPLETE:0".to_string());
    }
    body.join("\r\n")
}

/// Wrap a VTODO body into a minimal iCal file
pub fn wrap_vtodo(vtodo_body: &str) -> String {
    let mut ical = String::new();
    ical.push_str("BEGIN:VCALENDAR\r\n");
    ical.push_str("VERSION:2.0\r\n");
    ical.push_str(&format!("PRODID:{}\r\n", config::ical_product_id()));
    ical.push_str("BEGIN:VTODO\r\n");
    for line in physical_lines(vtodo_body) {
        ical.push_str(line);
        ical.push_str("\r\n");
    }
    ical.push_str("END:VTODO\r\n");
    ical.push_str("END:VCALENDAR\r\n");
    ical
}

/// Create the iCal file to upload when a task gets (un)completed
pub fn build_with_completion(vtodo_body: &str, completed: bool, now: &DateTime<Utc>) -> String {
    wrap_vtodo(&with_completion(vtodo_body, completed, now))
}

/// Create the iCal file of a brand new task.
///
/// The summary is escaped as RFC5545 requires for TEXT values.
pub fn build_new_todo(summary: &str, uid: &str, now: &DateTime<Utc>) -> String {
    let mut todo = ToDo::new(uid, format_date_time(now));
    todo.push(Summary::new(escape_text(summary)));
    todo.push(Status::needs_action());
    todo.push(PercentComplete::new("0"));

    let mut calendar = ICalendar::new("2.0", config::ical_product_id());
    calendar.add_todo(todo);

    calendar.to_string()
}

/// Pick a UID for a new task.
///
/// This combines the current time with some randomness, and the configured domain.
pub fn generate_uid() -> String {
    let random = Uuid::new_v4().to_simple().to_string();
    format!("{}-{}@{}", Utc::now().timestamp_millis(), &random[..12], config::uid_domain())
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::calendar::CalendarId;

    const BODY: &str = "UID:task-1\r\n\
        DTSTAMP:20240101T100000Z\r\n\
        SUMMARY:Water the plants\r\n\
        STATUS:NEEDS-ACTION\r\n\
        PERCENT-COMPLETE:0\r\n\
        BEGIN:VALARM\r\n\
        ACTION:DISPLAY\r\n\
        STATUS:NEEDS-ACTION\r\n\
        END:VALARM\r\n\
        X-CUSTOM;FOO=bar:kept";

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    fn count_top_level(body: &str, name: &str) -> usize {
        let lines = physical_lines(body);
        let mut depth = 0;
        let mut count = 0;
        for line in lines {
            match property_name(line).as_deref() {
                Some("BEGIN") => depth += 1,
                Some("END") => depth -= 1,
                Some(n) if depth == 0 && n == name => count += 1,
                _ => {},
            }
        }
        count
    }

    #[test]
    fn test_completion_body() {
        let body = with_completion(BODY, true, &now());
        assert_eq!(count_top_level(&body, "STATUS"), 1);
        assert_eq!(count_top_level(&body, "PERCENT-COMPLETE"), 1);
        assert_eq!(count_top_level(&body, "COMPLETED"), 1);
        assert!(body.ends_with("STATUS:COMPLETED\r\nPERCENT-COMPLETE:100\r\nCOMPLETED:20240115T093000Z"));
        // Other properties and nested components are untouched
        assert!(body.contains("BEGIN:VALARM\r\nACTION:DISPLAY\r\nSTATUS:NEEDS-ACTION\r\nEND:VALARM"));
        assert!(body.contains("X-CUSTOM;FOO=bar:kept"));
        assert!(body.starts_with("UID:task-1\r\n"));
    }

    #[test]
    fn test_uncompletion_is_idempotent() {
        let once = with_completion(BODY, false, &now());
        let twice = with_completion(&once, false, &now());
        assert_eq!(once, twice);
        assert_eq!(count_top_level(&twice, "STATUS"), 1);
        assert_eq!(count_top_level(&twice, "PERCENT-COMPLETE"), 1);
        assert_eq!(count_top_level(&twice, "COMPLETED"), 0);
        assert!(twice.ends_with("STATUS:NEEDS-ACTION\r\nPERCENT-COMPLETE:0"));
    }

    #[test]
    fn test_folded_status_is_fully_removed() {
        let body = "UID:task-2\nSUMMARY:Fold\nCOMPLETED:2024\n 0101T100000Z\nSTATUS:COMPLETED\n";
        let result = with_completion(body, false, &now());
        assert_eq!(result, "UID:task-2\r\nSUMMARY:Fold\r\nSTATUS:NEEDS-ACTION\r\nPERCENT-COMPLETE:0");
    }

    #[test]
    fn test_wrap() {
        let ical = wrap_vtodo("UID:abc\r\nSUMMARY:Test");
        let expected = format!("BEGIN:VCALENDAR\r\n\
            VERSION:2.0\r\n\
            PRODID:{}\r\n\
            BEGIN:VTODO\r\n\
            UID:abc\r\n\
            SUMMARY:Test\r\n\
            END:VTODO\r\n\
            END:VCALENDAR\r\n", config::ical_product_id());
        assert_eq!(ical, expected);
    }

    #[test]
    fn test_completion_round_trip() {
        let cal_id: CalendarId = "https://dav.example.com/cal/".parse().unwrap();
        let ical = build_with_completion(BODY, true, &now());
        let task = crate::ical::parse(&ical, "/cal/task-1.ics".to_string(), cal_id, None).unwrap();

        assert_eq!(task.completed(), true);
        assert_eq!(task.uid(), "task-1");
        assert_eq!(task.summary(), "Water the plants");
        assert_eq!(task.completion_status(), &crate::task::CompletionStatus::Completed(Some(now())));
    }

    #[test]
    fn test_ical_from_new_task() {
        let ical = build_new_todo("Buy milk, eggs; bread", "1705311000000-abc@caldav-tasks", &now());
        let expected_ical = format!("BEGIN:VCALENDAR\r\n\
            VERSION:2.0\r\n\
            PRODID:{}\r\n\
            BEGIN:VTODO\r\n\
            UID:1705311000000-abc@caldav-tasks\r\n\
            DTSTAMP:20240115T093000Z\r\n\
            SUMMARY:Buy milk\\, eggs\\; bread\r\n\
            STATUS:NEEDS-ACTION\r\n\
            PERCENT-COMPLETE:0\r\n\
            END:VTODO\r\n\
            END:VCALENDAR\r\n", config::ical_product_id());
        assert_eq!(ical, expected_ical);
    }

    #[test]
    fn test_new_task_can_be_read_back() {
        let cal_id: CalendarId = "https://dav.example.com/cal/".parse().unwrap();
        let ical = build_new_todo("Line one\nline two, with a comma", "uid-3", &now());
        let task = crate::ical::parse(&ical, String::new(), cal_id, None).unwrap();
        assert_eq!(task.summary(), "Line one\nline two, with a comma");
        assert_eq!(task.completed(), false);
    }

    #[test]
    fn test_uids_differ() {
        let a = generate_uid();
        let b = generate_uid();
        assert_ne!(a, b);
        assert!(a.ends_with(&format!("@{}", config::uid_domain())));
    }
}
