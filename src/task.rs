//! To-do tasks (iCal `VTODO` item)

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::calendar::CalendarId;

/// RFC5545 defines the completion as several optional fields, yet some combinations make no sense.
/// This enum provides an API that forbids such impossible combinations.
///
/// * `COMPLETED` is an optional timestamp that tells when this task has been completed
/// * `STATUS` is an optional field, that can be set to `NEEDS-ACTION`, `COMPLETED`, or others.
/// Only `STATUS:COMPLETED` makes a task completed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Completed(Option<DateTime<Utc>>),
    Uncompleted,
}
impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        match self {
            CompletionStatus::Completed(_) => true,
            _ => false,
        }
    }
}

/// A VersionTag is basically a CalDAV `etag`. Whenever it changes, this means the data has changed.
///
/// It is fetched along with tasks, but not used to detect conflicting edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VersionTag {
    tag: String
}

impl From<String> for VersionTag {
    fn from(tag: String) -> VersionTag {
        Self { tag }
    }
}

impl VersionTag {
    /// Get the inner version tag (usually a WebDAV `etag`)
    pub fn as_str(&self) -> &str {
        &self.tag
    }
}


/// A to-do task
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Persistent identifier for the calendar component.
    /// It is unique within a calendar, but two calendars may contain tasks with the same UID.
    uid: String,
    /// The display name of the task
    summary: String,
    /// The completion status of this task
    completion_status: CompletionStatus,
    /// The raw `DUE` value, including its parameters (e.g. `VALUE=DATE:20240115`)
    due: Option<String>,

    /// The path of the task on the server, exactly as the server sent it
    href: String,
    /// The calendar this task belongs to
    calendar_url: CalendarId,
    /// The version of this task the server sent
    etag: Option<VersionTag>,

    /// The property lines of the `VTODO`, without its `BEGIN` and `END` lines.
    /// Updates are uploaded from these, so that unknown properties are not lost.
    raw_vtodo_body: String,
    /// The whole iCal file this task comes from
    raw_vcalendar: String,
}


impl Task {
    /// Create a new Task instance, that is synced on the server already
    pub fn new_with_parameters(uid: String, summary: String, completion_status: CompletionStatus, due: Option<String>,
                               href: String, calendar_url: CalendarId, etag: Option<VersionTag>,
                               raw_vtodo_body: String, raw_vcalendar: String,
                            ) -> Self
    {
        Self {
            uid,
            summary,
            completion_status,
            due,
            href,
            calendar_url,
            etag,
            raw_vtodo_body,
            raw_vcalendar,
        }
    }

    pub fn uid(&self) -> &str       { &self.uid         }
    pub fn summary(&self) -> &str   { &self.summary     }
    pub fn completed(&self) -> bool { self.completion_status.is_completed() }
    pub fn completion_status(&self) -> &CompletionStatus { &self.completion_status }
    pub fn due(&self) -> Option<&str> { self.due.as_deref() }
    pub fn href(&self) -> &str      { &self.href        }
    pub fn calendar_url(&self) -> &CalendarId { &self.calendar_url }
    pub fn etag(&self) -> Option<&VersionTag> { self.etag.as_ref() }
    pub fn raw_vtodo_body(&self) -> &str { &self.raw_vtodo_body }
    pub fn raw_vcalendar(&self) -> &str  { &self.raw_vcalendar  }

    /// The due date, formatted for display (e.g. `15.01.2024`).
    /// The raw value is left untouched.
    pub fn due_display(&self) -> Option<String> {
        self.due.as_deref().map(crate::ical::format_due)
    }

    /// Record a completion change that has been accepted by the server.
    /// `raw_vtodo_body` and `raw_vcalendar` are what has been uploaded.
    pub(crate) fn set_completion(&mut self, completion_status: CompletionStatus, raw_vtodo_body: String, raw_vcalendar: String) {
        self.completion_status = completion_status;
        self.raw_vtodo_body = raw_vtodo_body;
        self.raw_vcalendar = raw_vcalendar;
    }
}
