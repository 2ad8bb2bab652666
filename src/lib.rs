//! This crate provides a way to manage to-do tasks stored on a CalDAV server.
//!
//! It provides a CalDAV client in the [`client`] module, that discovers calendars and fetches their `VTODO` items.
//!
//! The tasks that have been fetched are kept in memory in a [`TaskStore`](cache::TaskStore), which is what a user interface displays. \
//! A [`Provider`](provider::Provider) ties both together: it refreshes the store from the server,
//! and applies the changes of the user (create, complete, uncomplete, delete) on the server, then on the store.
//!
//! Nothing is persisted across runs: the store is rebuilt from the server on every refresh.

pub mod traits;

pub mod calendar;
pub use calendar::Calendar;
mod task;
pub use task::{CompletionStatus, Task, VersionTag};
pub mod provider;
pub use provider::{Command, CommandOutcome, Provider, RefreshStatus};

pub mod client;
pub mod cache;
pub use cache::TaskStore;
pub mod credentials;
pub use credentials::{Credentials, EnvCredentials};
pub mod error;
pub use error::CalDavError;
pub mod ical;
pub mod multistatus;
pub mod transport;
pub use transport::HttpTransport;
mod resource;
pub use resource::Resource;

pub mod config;
pub mod utils;
