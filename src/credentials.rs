//! Where the server URL and the account credentials come from

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CalDavError;
use crate::resource::Resource;
use crate::traits::CredentialsSource;

/// Raw credentials, as entered by the user. Any of these may be empty.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new<S: ToString, T: ToString, U: ToString>(url: S, username: T, password: U) -> Self {
        Self {
            url: url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Read credentials from a JSON file such as `{"url": "...", "username": "...", "password": "..."}`
    pub fn from_file(path: &Path) -> Result<Self, CalDavError> {
        let file = std::fs::File::open(path)?;
        let credentials = serde_json::from_reader(file)?;
        Ok(credentials)
    }

    /// Whether every field has been filled in. Blank fields count as empty
    pub fn is_configured(&self) -> bool {
        [&self.url, &self.username, &self.password]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// Validate these credentials. Returns [`CalDavError::NotConfigured`] when a field is missing.
    pub fn to_resource(&self) -> Result<Resource, CalDavError> {
        if !self.is_configured() {
            return Err(CalDavError::NotConfigured);
        }
        let url = self.url.trim().parse()?;
        Ok(Resource::new(url, self.username.clone(), self.password.clone()))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl CredentialsSource for Credentials {
    fn get_credentials(&self) -> Credentials {
        self.clone()
    }
}

/// Credentials read from the `CALDAV_URL`, `CALDAV_USERNAME` and `CALDAV_PASSWORD` environment variables.
///
/// They are read again on every call, so that changes are picked up by the next operation.
#[derive(Clone, Debug, Default)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub const URL_VAR: &'static str = "CALDAV_URL";
    pub const USERNAME_VAR: &'static str = "CALDAV_USERNAME";
    pub const PASSWORD_VAR: &'static str = "CALDAV_PASSWORD";
}

impl CredentialsSource for EnvCredentials {
    fn get_credentials(&self) -> Credentials {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Credentials {
            url: var(Self::URL_VAR),
            username: var(Self::USERNAME_VAR),
            password: var(Self::PASSWORD_VAR),
        }
    }
}
