use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::error::CalDavError;
use crate::transport::{DavRequest, DavResponse};

/// Something that knows the server URL and the account to use (a settings store, environment variables...)
pub trait CredentialsSource {
    /// Returns the current credentials.
    /// Empty fields mean the user has not configured the server yet.
    fn get_credentials(&self) -> Credentials;
}

/// Issues authenticated HTTP requests to a CalDAV server
///
/// Implementors must not interpret the status code, this is the caller's job.
#[async_trait]
pub trait DavTransport {
    /// Send a request and return the status code and the body of the reply.
    /// This only fails in case the request could not be carried out (connection, DNS, TLS...)
    async fn send(&self, request: DavRequest) -> Result<DavResponse, CalDavError>;
}
