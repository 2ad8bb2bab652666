//! This modules ties a CalDAV server to the in-memory [`TaskStore`]
//!
//! It refreshes the store from the server, and applies the user's changes on the server first, then on the store.

use chrono::Utc;
use url::Url;

use crate::cache::TaskStore;
use crate::calendar::CalendarId;
use crate::client::{calendar_object_url, Client};
use crate::error::CalDavError;
use crate::ical;
use crate::task::{CompletionStatus, Task};
use crate::traits::{CredentialsSource, DavTransport};
use crate::transport::HttpTransport;

pub mod command;
pub use command::{Command, CommandOutcome, RefreshStatus};
pub mod refresh_progress;
use refresh_progress::{FeedbackSender, RefreshProgress};


/// Build a client from the credentials that are current right now
fn connect<'t, S, T>(credentials: &S, transport: &'t T) -> Result<Client<'t, T>, CalDavError>
where
    S: CredentialsSource,
    T: DavTransport,
{
    let resource = credentials.get_credentials().to_resource()?;
    Ok(Client::new(resource, transport))
}


/// A CalDAV server, along with the local copy of its tasks.
///
/// Credentials are read again from `S` before every operation, so that a change in the settings is used right away.
#[derive(Debug)]
pub struct Provider<S, T = HttpTransport>
where
    S: CredentialsSource,
    T: DavTransport,
{
    credentials: S,
    transport: T,
    store: TaskStore,
}

impl<S: CredentialsSource> Provider<S, HttpTransport> {
    /// Create a provider that talks HTTP(S) to the server
    pub fn new(credentials: S) -> Self {
        Self::with_transport(credentials, HttpTransport::new())
    }
}

impl<S, T> Provider<S, T>
where
    S: CredentialsSource,
    T: DavTransport,
{
    pub fn with_transport(credentials: S, transport: T) -> Self {
        Self { credentials, transport, store: TaskStore::new() }
    }

    /// The local copy of the server data
    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Only show the tasks of a calendar (or every task, with `None`). This does not fetch anything.
    pub fn select_calendar(&mut self, calendar: Option<CalendarId>) {
        self.store.select(calendar);
    }

    /// Fetch the calendars and their tasks from the server, and replace the content of the store with them.
    ///
    /// See [`Self::refresh_with_feedback`]
    pub async fn refresh(&mut self) -> Result<RefreshStatus, CalDavError> {
        self.run_refresh(RefreshProgress::new(None)).await
    }

    /// Fetch the calendars and their tasks from the server, and provide feedback to the user about the progress.
    ///
    /// Calendars whose tasks cannot be fetched are shown as empty, without failing the whole refresh.
    /// However, failing to list the calendars is an error, and the store is left untouched in this case.
    pub async fn refresh_with_feedback(&mut self, feedback_sender: FeedbackSender) -> Result<RefreshStatus, CalDavError> {
        self.run_refresh(RefreshProgress::new(Some(feedback_sender))).await
    }

    async fn run_refresh(&mut self, mut progress: RefreshProgress) -> Result<RefreshStatus, CalDavError> {
        let client = match connect(&self.credentials, &self.transport) {
            Err(CalDavError::NotConfigured) => {
                log::info!("No server is configured, nothing to refresh");
                return Ok(RefreshStatus::NotConfigured);
            },
            Err(err) => return Err(err),
            Ok(client) => client,
        };

        progress.discovering();
        let calendars = match client.get_calendars().await {
            Err(err) => {
                progress.abort(&err);
                return Err(err);
            },
            Ok(calendars) => calendars,
        };

        // The new task list is built aside, so that the store never holds a partial list
        let mut tasks = Vec::new();
        for (index, calendar) in calendars.iter().enumerate() {
            progress.fetching(calendar, index + 1, calendars.len());
            match client.get_tasks(calendar.url()).await {
                Ok(cal_tasks) => {
                    progress.fetched(calendar, cal_tasks.len());
                    tasks.extend(cal_tasks);
                },
                Err(err) => progress.failed(calendar, &err),
            }
        }

        let n_calendars = calendars.len();
        self.store.replace_calendars(calendars);
        self.store.refresh(tasks);
        Ok(progress.finish(n_calendars))
    }

    /// Mark a task as completed, on the server then locally
    pub async fn complete_task(&mut self, task: &Task) -> Result<(), CalDavError> {
        self.set_completion(task, true).await
    }

    /// Mark a task as not completed, on the server then locally
    pub async fn uncomplete_task(&mut self, task: &Task) -> Result<(), CalDavError> {
        self.set_completion(task, false).await
    }

    /// Complete the task if it is not, uncomplete it otherwise. Returns whether it is now completed
    pub async fn toggle_task(&mut self, task: &Task) -> Result<bool, CalDavError> {
        let completed = !task.completed();
        self.set_completion(task, completed).await?;
        Ok(completed)
    }

    async fn set_completion(&mut self, task: &Task, completed: bool) -> Result<(), CalDavError> {
        let client = connect(&self.credentials, &self.transport)?;
        let url = client.resolve_href(task.href())?;

        let now = Utc::now();
        let new_body = ical::with_completion(task.raw_vtodo_body(), completed, &now);
        let new_vcalendar = ical::wrap_vtodo(&new_body);
        client.put_calendar_object(url, new_vcalendar.clone()).await?;

        let new_status = match completed {
            true => CompletionStatus::Completed(Some(now)),
            false => CompletionStatus::Uncompleted,
        };
        log::info!("Task {} is now {}", task.summary(), if completed { "completed" } else { "not completed" });
        self.store.apply_local_completion(task.calendar_url(), task.uid(), new_status, new_body, new_vcalendar);
        Ok(())
    }

    /// Delete a task, on the server then locally
    pub async fn delete_task(&mut self, task: &Task) -> Result<(), CalDavError> {
        let client = connect(&self.credentials, &self.transport)?;
        let url = client.resolve_href(task.href())?;
        client.delete_calendar_object(url).await?;

        log::info!("Task {} has been deleted", task.summary());
        if self.store.remove_by_uid(task.calendar_url(), task.uid()).is_none() {
            log::warn!("Deleted task {} was not in the store anymore", task.uid());
        }
        Ok(())
    }

    /// Create a task in the selected calendar, or in the "inbox" calendar, or in the first calendar.
    ///
    /// The store is not updated: its URL and version tag are only known once the store is refreshed.
    /// Returns the URL the task has been uploaded to.
    pub async fn create_task(&mut self, summary: &str) -> Result<Url, CalDavError> {
        let calendar = self.store.target_calendar()?;
        self.create_task_in(summary, &calendar).await
    }

    /// Create a task in a given calendar. See [`Self::create_task`]
    pub async fn create_task_in(&mut self, summary: &str, calendar: &CalendarId) -> Result<Url, CalDavError> {
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(CalDavError::EmptySummary);
        }
        let client = connect(&self.credentials, &self.transport)?;

        let uid = ical::generate_uid();
        let new_ical = ical::build_new_todo(summary, &uid, &Utc::now());
        let url = calendar_object_url(calendar, &uid)?;
        client.put_calendar_object(url.clone(), new_ical).await?;

        log::info!("Created task {} at {}", summary, url);
        Ok(url)
    }

    /// Run a user command. Tasks are addressed by their UID, see [`TaskStore::find_by_uid`]
    pub async fn execute(&mut self, command: Command) -> Result<CommandOutcome, CalDavError> {
        match command {
            Command::Refresh => {
                let status = self.refresh().await?;
                Ok(CommandOutcome::Refreshed(status))
            },
            Command::SelectCalendar(calendar) => {
                self.select_calendar(calendar);
                Ok(CommandOutcome::Selected)
            },
            Command::Create(summary) => {
                let url = self.create_task(&summary).await?;
                let refresh = self.refresh().await?;
                Ok(CommandOutcome::Created{ url, refresh })
            },
            Command::ToggleComplete(uid) => {
                let task = self.known_task(&uid)?;
                let completed = self.toggle_task(&task).await?;
                Ok(CommandOutcome::Toggled{ uid, completed })
            },
            Command::Delete(uid) => {
                let task = self.known_task(&uid)?;
                self.delete_task(&task).await?;
                Ok(CommandOutcome::Deleted{ uid })
            },
        }
    }

    fn known_task(&self, uid: &str) -> Result<Task, CalDavError> {
        self.store
            .find_by_uid(uid)
            .cloned()
            .ok_or_else(|| CalDavError::UnknownTask(uid.to_string()))
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::credentials::Credentials;
    use crate::transport::{DavRequest, DavResponse};

    /// A transport that fails every request, and counts them
    #[derive(Default)]
    struct FailingTransport {
        n_requests: AtomicUsize,
    }

    #[async_trait]
    impl DavTransport for FailingTransport {
        async fn send(&self, _request: DavRequest) -> Result<DavResponse, CalDavError> {
            self.n_requests.fetch_add(1, Ordering::SeqCst);
            Ok(DavResponse::new(500, Vec::new()))
        }
    }

    #[tokio::test]
    async fn test_not_configured_does_not_hit_the_network() {
        let mut provider = Provider::with_transport(Credentials::new("", "john", "secret"), FailingTransport::default());
        let status = provider.refresh().await.unwrap();
        assert_eq!(status, RefreshStatus::NotConfigured);
        assert_eq!(provider.transport().n_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_refresh_feedback() {
        let mut provider = Provider::with_transport(Credentials::new("https://dav.example.com/", "john", "secret"), FailingTransport::default());
        let (sender, receiver) = refresh_progress::feedback_channel();

        let err = provider.refresh_with_feedback(sender).await.unwrap_err();
        match err {
            CalDavError::UnexpectedStatus{ status: 500, .. } => (),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(*receiver.borrow(), refresh_progress::RefreshEvent::Aborted);
        assert_eq!(provider.transport().n_requests.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_summary_is_rejected() {
        let mut provider = Provider::with_transport(Credentials::new("https://dav.example.com/", "john", "secret"), FailingTransport::default());
        let calendar: CalendarId = "https://dav.example.com/cal/".parse().unwrap();
        match provider.create_task_in("   ", &calendar).await {
            Err(CalDavError::EmptySummary) => (),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(provider.transport().n_requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_task() {
        let mut provider = Provider::with_transport(Credentials::default(), FailingTransport::default());
        match provider.execute(Command::Delete("nope".to_string())).await {
            Err(CalDavError::UnknownTask(uid)) => assert_eq!(uid, "nope"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
