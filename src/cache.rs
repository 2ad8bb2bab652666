//! This module provides an in-memory cache for CalDAV data
//!
//! The [`TaskStore`] is what is displayed to the user. It is rebuilt as a whole on every refresh,
//! and patched locally after every successful change, so that a full refresh is not needed each time a task is ticked.

use crate::calendar::{Calendar, CalendarId};
use crate::error::CalDavError;
use crate::task::{CompletionStatus, Task};


/// All the calendars and tasks known from the server, along with the calendar the user is currently looking at
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskStore {
    calendars: Vec<Calendar>,
    tasks: Vec<Task>,
    /// `None` means "all calendars"
    selected_calendar: Option<CalendarId>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendars
    }

    /// Every known task, whatever the selection is
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_calendar(&self) -> Option<&CalendarId> {
        self.selected_calendar.as_ref()
    }

    /// Select a calendar (or all of them with `None`).
    /// This only changes what [`Self::filtered`] returns, nothing is fetched from the server.
    pub fn select(&mut self, calendar: Option<CalendarId>) {
        self.selected_calendar = calendar;
    }

    /// Replace the calendar list with a freshly discovered one.
    /// The selection is reset in case the selected calendar has disappeared.
    pub fn replace_calendars(&mut self, calendars: Vec<Calendar>) {
        if let Some(selected) = &self.selected_calendar {
            if !calendars.iter().any(|cal| cal.url() == selected) {
                log::info!("Selected calendar {} does not exist anymore, showing all calendars", selected);
                self.selected_calendar = None;
            }
        }
        self.calendars = calendars;
    }

    /// Replace the whole task list
    pub fn refresh(&mut self, tasks: Vec<Task>) {
        log::debug!("Task store now holds {} tasks", tasks.len());
        self.tasks = tasks;
    }

    /// The tasks of the selected calendar, or all tasks if no calendar is selected
    pub fn filtered(&self) -> Vec<&Task> {
        match &self.selected_calendar {
            None => self.tasks.iter().collect(),
            Some(selected) => self.tasks
                .iter()
                .filter(|task| task.calendar_url() == selected)
                .collect(),
        }
    }

    /// Find a task by its UID, preferring tasks from the selected calendar
    pub fn find_by_uid(&self, uid: &str) -> Option<&Task> {
        self.filtered()
            .into_iter()
            .find(|task| task.uid() == uid)
            .or_else(|| self.tasks.iter().find(|task| task.uid() == uid))
    }

    fn position(&self, calendar: &CalendarId, uid: &str) -> Option<usize> {
        self.tasks
            .iter()
            .position(|task| task.calendar_url() == calendar && task.uid() == uid)
    }

    /// Update the completion status of a task, after the server has accepted the change.
    /// Returns `false` if there is no such task (e.g. because a refresh happened in the meantime)
    pub fn apply_local_completion(&mut self, calendar: &CalendarId, uid: &str,
                                  completion_status: CompletionStatus, raw_vtodo_body: String, raw_vcalendar: String) -> bool
    {
        match self.position(calendar, uid) {
            None => {
                log::warn!("Task {} is not in the store anymore, unable to update it", uid);
                false
            },
            Some(index) => {
                self.tasks[index].set_completion(completion_status, raw_vtodo_body, raw_vcalendar);
                true
            },
        }
    }

    /// Remove a task, after the server has deleted it
    pub fn remove_by_uid(&mut self, calendar: &CalendarId, uid: &str) -> Option<Task> {
        let index = self.position(calendar, uid)?;
        Some(self.tasks.remove(index))
    }

    /// The calendar new tasks should be created in: the selected calendar if any,
    /// otherwise the calendar called "inbox", otherwise the first calendar.
    pub fn target_calendar(&self) -> Result<CalendarId, CalDavError> {
        if let Some(selected) = &self.selected_calendar {
            return Ok(selected.clone());
        }
        self.calendars
            .iter()
            .find(|cal| cal.is_inbox())
            .or_else(|| self.calendars.first())
            .map(|cal| cal.url().clone())
            .ok_or(CalDavError::NoCalendar)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SupportedComponents;

    fn url(s: &str) -> CalendarId {
        s.parse().unwrap()
    }

    fn task(uid: &str, calendar: &str) -> Task {
        Task::new_with_parameters(
            uid.to_string(), format!("Task {}", uid), CompletionStatus::Uncompleted, None,
            format!("/cal/{}.ics", uid), url(calendar), None,
            format!("UID:{}\r\nSUMMARY:Task {}", uid, uid), String::new(),
        )
    }

    const CAL_A: &str = "https://dav.example.com/cal/a/";
    const CAL_B: &str = "https://dav.example.com/cal/b/";
    const CAL_EMPTY: &str = "https://dav.example.com/cal/empty/";

    fn store() -> TaskStore {
        let mut store = TaskStore::new();
        store.replace_calendars(vec![
            Calendar::new("A".into(), url(CAL_A), SupportedComponents::TODO),
            Calendar::new("B".into(), url(CAL_B), SupportedComponents::TODO),
            Calendar::new("Empty".into(), url(CAL_EMPTY), SupportedComponents::TODO),
        ]);
        store.refresh(vec![task("1", CAL_A), task("2", CAL_B), task("3", CAL_A), task("shared", CAL_B), task("shared", CAL_A)]);
        store
    }

    fn uids(tasks: Vec<&Task>) -> Vec<&str> {
        tasks.into_iter().map(|t| t.uid()).collect()
    }

    #[test]
    fn test_filtering() {
        let mut store = store();
        assert_eq!(uids(store.filtered()), vec!["1", "2", "3", "shared", "shared"]);

        store.select(Some(url(CAL_A)));
        assert_eq!(uids(store.filtered()), vec!["1", "3", "shared"]);

        store.select(Some(url(CAL_EMPTY)));
        assert!(store.filtered().is_empty());

        store.select(None);
        assert_eq!(store.filtered().len(), 5);
    }

    #[test]
    fn test_refresh_replaces_everything() {
        let mut store = store();
        store.refresh(vec![task("9", CAL_B)]);
        assert_eq!(uids(store.filtered()), vec!["9"]);
        store.refresh(Vec::new());
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_local_completion() {
        let mut store = store();
        let done = CompletionStatus::Completed(None);
        assert!(store.apply_local_completion(&url(CAL_A), "shared", done.clone(), "UID:shared\r\nSTATUS:COMPLETED".into(), String::new()));

        let in_a = store.tasks().iter().find(|t| t.uid() == "shared" && t.calendar_url() == &url(CAL_A)).unwrap();
        let in_b = store.tasks().iter().find(|t| t.uid() == "shared" && t.calendar_url() == &url(CAL_B)).unwrap();
        assert!(in_a.completed());
        assert_eq!(in_a.raw_vtodo_body(), "UID:shared\r\nSTATUS:COMPLETED");
        assert!(!in_b.completed());

        assert!(!store.apply_local_completion(&url(CAL_EMPTY), "1", done, String::new(), String::new()));
    }

    #[test]
    fn test_removal() {
        let mut store = store();
        let removed = store.remove_by_uid(&url(CAL_B), "shared").unwrap();
        assert_eq!(removed.calendar_url(), &url(CAL_B));
        assert_eq!(store.tasks().len(), 4);
        assert!(store.remove_by_uid(&url(CAL_B), "shared").is_none());
        assert!(store.find_by_uid("shared").is_some());
    }

    #[test]
    fn test_find_prefers_selection() {
        let mut store = store();
        store.select(Some(url(CAL_A)));
        assert_eq!(store.find_by_uid("shared").unwrap().calendar_url(), &url(CAL_A));
        // Tasks outside of the selection are still found
        assert_eq!(store.find_by_uid("2").unwrap().calendar_url(), &url(CAL_B));
        assert!(store.find_by_uid("nope").is_none());
    }

    #[test]
    fn test_target_calendar() {
        let mut store = store();
        assert_eq!(store.target_calendar().unwrap(), url(CAL_A));

        let mut calendars = store.calendars().to_vec();
        calendars.push(Calendar::new("Inbox".into(), url("https://dav.example.com/cal/inbox/"), SupportedComponents::TODO));
        store.replace_calendars(calendars);
        assert_eq!(store.target_calendar().unwrap(), url("https://dav.example.com/cal/inbox/"));

        store.select(Some(url(CAL_B)));
        assert_eq!(store.target_calendar().unwrap(), url(CAL_B));

        let empty = TaskStore::new();
        match empty.target_calendar() {
            Err(CalDavError::NoCalendar) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_vanished_selection_is_reset() {
        let mut store = store();
        store.select(Some(url(CAL_B)));
        store.replace_calendars(vec![Calendar::new("A".into(), url(CAL_A), SupportedComponents::TODO)]);
        assert_eq!(store.selected_calendar(), None);
    }
}
