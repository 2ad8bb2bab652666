//! A module to parse ICal files

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use ical::parser::ical::component::IcalTodo;
use ical::property::Property;

use crate::calendar::CalendarId;
use crate::error::CalDavError;
use crate::task::{CompletionStatus, Task, VersionTag};


/// Returns the lines located between `BEGIN:<component>` and its matching `END:<component>` (both excluded)
pub(crate) fn component_lines<'a>(lines: &[&'a str], component: &str) -> Option<Vec<&'a str>> {
    let begin = format!("BEGIN:{}", component);
    let end = format!("END:{}", component);

    let start = lines.iter().position(|l| l.trim_end().eq_ignore_ascii_case(&begin))?;
    let mut depth: usize = 0;
    let mut inner = Vec::new();
    for line in &lines[start + 1..] {
        let trimmed = line.trim_end();
        if trimmed.eq_ignore_ascii_case(&end) && depth == 0 {
            return Some(inner);
        }
        let upper = trimmed.to_ascii_uppercase();
        if upper.starts_with("BEGIN:") {
            depth += 1;
        } else if upper.starts_with("END:") {
            depth = depth.saturating_sub(1);
        }
        inner.push(*line);
    }
    None
}

/// Splits a text into physical lines, whatever the line endings are
pub(crate) fn physical_lines(content: &str) -> Vec<&str> {
    content.lines()
        .map(|l| l.trim_end_matches('\r'))
        .collect()
}

fn parse_date_time(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value.trim(), "%Y%m%dT%H%M%SZ").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// The first property of the task itself with this name (properties of its alarms are not considered)
fn first_property<'a>(todo: &'a IcalTodo, name: &str) -> Option<&'a Property> {
    todo.properties
        .iter()
        .find(|prop| prop.name.eq_ignore_ascii_case(name))
}

fn property_value(todo: &IcalTodo, name: &str) -> Option<String> {
    first_property(todo, name)
        .and_then(|prop| prop.value.as_ref())
        .map(|value| value.trim().to_string())
}

/// The parameters and the value of a property, as they were written (e.g. `VALUE=DATE:20240115`)
fn parameters_and_value(prop: &Property) -> String {
    let value = prop.value.as_deref().unwrap_or_default();
    let params: Vec<String> = prop.params
        .iter()
        .flatten()
        .map(|(name, values)| format!("{}={}", name, values.join(",")))
        .collect();
    if params.is_empty() {
        value.to_string()
    } else {
        format!("{}:{}", params.join(";"), value)
    }
}


/// Parse an iCal file into a [`crate::Task`].
///
/// Only the first `VTODO` of the file is considered. Files that have no `VTODO`, or whose `VTODO` has no `UID` or no `SUMMARY`, are rejected.
pub fn parse(content: &str, href: String, calendar_url: CalendarId, etag: Option<VersionTag>) -> Result<Task, CalDavError> {
    let lines: Vec<&str> = physical_lines(content)
        .into_iter()
        .filter(|line| !line.trim().is_empty())
        .collect();

    let normalized = lines.join("\n");
    let mut reader = ical::IcalParser::new(normalized.as_bytes());
    let parsed_item = match reader.next() {
        None => return Err(CalDavError::Parse(format!("Invalid iCal data for item {}", href))),
        Some(Err(err)) => return Err(CalDavError::Parse(format!("Unable to parse iCal data for item {}: {}", href, err))),
        Some(Ok(item)) => item,
    };
    let todo = match parsed_item.todos.first() {
        None => return Err(CalDavError::Parse(format!("No VTODO found for item {}", href))),
        Some(todo) => todo,
    };

    let uid = match property_value(todo, "UID") {
        Some(uid) if !uid.is_empty() => uid,
        _ => return Err(CalDavError::Parse(format!("Missing UID for item {}", href))),
    };
    let summary = match first_property(todo, "SUMMARY").and_then(|prop| prop.value.as_deref()) {
        Some(summary) => crate::ical::unescape_text(summary),
        None => return Err(CalDavError::Parse(format!("Missing SUMMARY for item {}", href))),
    };
    let completion_status = match property_value(todo, "STATUS") {
        Some(s) if s.eq_ignore_ascii_case("COMPLETED") => {
            let completed_on = property_value(todo, "COMPLETED").and_then(|value| parse_date_time(&value));
            CompletionStatus::Completed(completed_on)
        },
        _ => CompletionStatus::Uncompleted,
    };
    let due = first_property(todo, "DUE").map(parameters_and_value);

    // Updates are uploaded from the lines the server sent, not from what the parser understood
    let vtodo = component_lines(&lines, "VTODO")
        .ok_or_else(|| CalDavError::Parse(format!("No VTODO found for item {}", href)))?;
    let vcalendar = match component_lines(&lines, "VCALENDAR") {
        Some(inner) => {
            let mut block = vec!["BEGIN:VCALENDAR"];
            block.extend(inner);
            block.push("END:VCALENDAR");
            block.join("\r\n")
        },
        None => lines.join("\r\n"),
    };

    Ok(Task::new_with_parameters(
        uid, summary, completion_status, due,
        href, calendar_url, etag,
        vtodo.join("\r\n"), vcalendar,
    ))
}
