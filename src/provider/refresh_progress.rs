//! Progress of a refresh, as reported to a user interface

use std::fmt::{Display, Formatter};

use crate::calendar::{Calendar, CalendarId};
use crate::error::CalDavError;
use crate::provider::RefreshStatus;

/// Where a refresh currently is
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshEvent {
    NotStarted,
    /// The calendar list is being requested
    Discovering,
    /// The tasks of the `index`-th calendar (starting at 1) out of `total` are being requested
    Fetching { calendar: CalendarId, index: usize, total: usize },
    Fetched { calendar: CalendarId, n_tasks: usize },
    /// This calendar will be shown as empty
    CalendarFailed { calendar: CalendarId },
    /// The store has been replaced
    Finished { n_tasks: usize, failed_calendars: usize },
    /// The calendar list could not be fetched. The store has not changed
    Aborted,
}

impl Display for RefreshEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RefreshEvent::NotStarted => write!(f, "Not started"),
            RefreshEvent::Discovering => write!(f, "Looking for calendars..."),
            RefreshEvent::Fetching{ calendar, index, total } => write!(f, "[{}/{}] Fetching {}...", index, total, calendar),
            RefreshEvent::Fetched{ calendar, n_tasks } => write!(f, "{} tasks in {}", n_tasks, calendar),
            RefreshEvent::CalendarFailed{ calendar } => write!(f, "Unable to fetch {}", calendar),
            RefreshEvent::Finished{ n_tasks, failed_calendars: 0 } => write!(f, "Refresh done, {} tasks", n_tasks),
            RefreshEvent::Finished{ n_tasks, failed_calendars } => write!(f, "Refresh done, {} tasks ({} calendars could not be fetched)", n_tasks, failed_calendars),
            RefreshEvent::Aborted => write!(f, "Refresh failed"),
        }
    }
}

impl Default for RefreshEvent {
    fn default() -> Self {
        Self::NotStarted
    }
}


pub type FeedbackSender = tokio::sync::watch::Sender<RefreshEvent>;
pub type FeedbackReceiver = tokio::sync::watch::Receiver<RefreshEvent>;

/// A channel a user interface can watch while [`Provider::refresh_with_feedback`](crate::Provider::refresh_with_feedback) runs
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(RefreshEvent::default())
}


/// Counts what a refresh has fetched so far, and tells the listener (if any)
pub(crate) struct RefreshProgress {
    sender: Option<FeedbackSender>,
    n_tasks: usize,
    failed_calendars: usize,
}

impl RefreshProgress {
    pub fn new(sender: Option<FeedbackSender>) -> Self {
        Self { sender, n_tasks: 0, failed_calendars: 0 }
    }

    fn send(&self, event: RefreshEvent) {
        if let Some(sender) = &self.sender {
            // Nobody listening anymore is not an error
            let _ = sender.send(event);
        }
    }

    pub fn discovering(&self) {
        log::info!("Starting a refresh");
        self.send(RefreshEvent::Discovering);
    }

    pub fn fetching(&self, calendar: &Calendar, index: usize, total: usize) {
        log::debug!("Fetching the tasks of {} ({}/{})", calendar.name(), index, total);
        self.send(RefreshEvent::Fetching{ calendar: calendar.url().clone(), index, total });
    }

    pub fn fetched(&mut self, calendar: &Calendar, n_tasks: usize) {
        log::debug!("{} tasks in calendar {}", n_tasks, calendar.name());
        self.n_tasks += n_tasks;
        self.send(RefreshEvent::Fetched{ calendar: calendar.url().clone(), n_tasks });
    }

    pub fn failed(&mut self, calendar: &Calendar, err: &CalDavError) {
        log::warn!("Unable to fetch the tasks of calendar {} ({}). It will be shown as empty", calendar.name(), err);
        self.failed_calendars += 1;
        self.send(RefreshEvent::CalendarFailed{ calendar: calendar.url().clone() });
    }

    /// Report a completed refresh of `n_calendars` calendars
    pub fn finish(&self, n_calendars: usize) -> RefreshStatus {
        let status = RefreshStatus::Refreshed {
            calendars: n_calendars,
            tasks: self.n_tasks,
            failed_calendars: self.failed_calendars,
        };
        log::info!("Refresh done: {:?}", status);
        self.send(RefreshEvent::Finished{ n_tasks: self.n_tasks, failed_calendars: self.failed_calendars });
        status
    }

    pub fn abort(&self, err: &CalDavError) {
        log::error!("Refresh terminated because of an error: {}", err);
        self.send(RefreshEvent::Aborted);
    }
}
