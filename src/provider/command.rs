//! Commands the presentation layer can send to a [`Provider`](crate::Provider)

use url::Url;

use crate::calendar::CalendarId;

/// A user-triggered action
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Fetch calendars and tasks from the server again
    Refresh,
    /// Only show the tasks of a calendar (or all tasks, with `None`)
    SelectCalendar(Option<CalendarId>),
    /// Create a task with this summary, then refresh
    Create(String),
    /// Complete (or uncomplete) the task with this UID
    ToggleComplete(String),
    /// Delete the task with this UID
    Delete(String),
}

/// What happened after the server has refreshed
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshStatus {
    /// No server is configured yet. Nothing has been fetched.
    NotConfigured,
    Refreshed {
        calendars: usize,
        tasks: usize,
        /// Calendars whose tasks could not be fetched. They are shown as empty.
        failed_calendars: usize,
    },
}

/// The result of a successful [`Command`]
#[derive(Clone, Debug, PartialEq)]
pub enum CommandOutcome {
    Refreshed(RefreshStatus),
    Selected,
    /// A task has been uploaded at this URL, and the store has been refreshed
    Created { url: Url, refresh: RefreshStatus },
    /// A task is now completed (or not)
    Toggled { uid: String, completed: bool },
    Deleted { uid: String },
}
