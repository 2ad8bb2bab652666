use url::Url;

use crate::error::CalDavError;

/// Just a wrapper around a URL and credentials
#[derive(Clone)]
pub struct Resource {
    url: Url,
    username: String,
    password: String,
}

impl Resource {
    pub fn new(url: Url, username: String, password: String) -> Self {
        Self { url, username, password }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn username(&self) -> &String { &self.username }
    pub fn password(&self) -> &String { &self.password }

    /// Build the absolute URL of an `href` returned by the server, by keeping the scheme and server from `self` but changing the path part.
    ///
    /// The href is kept verbatim (including its percent-encoding).
    /// Absolute hrefs are moved to the configured server as well, so that credentials are never sent to another host.
    pub fn combine(&self, href: &str) -> Result<Url, CalDavError> {
        let href = href.trim();
        if href.is_empty() {
            return Err(CalDavError::Parse("empty href".to_string()));
        }
        if let Ok(absolute) = Url::parse(href) {
            if absolute.origin() == self.url.origin() {
                return Ok(absolute);
            }
            log::warn!("{} is not on the configured server, using its path on {} instead", absolute, self.url.origin().ascii_serialization());
            let mut built = self.url.clone();
            built.set_path(absolute.path());
            built.set_query(absolute.query());
            built.set_fragment(None);
            return Ok(built);
        }

        let mut built = self.url.clone();
        built.set_query(None);
        built.set_fragment(None);
        if href.starts_with('/') {
            built.set_path(href);
        } else {
            built = built.join(href)?;
        }
        Ok(built)
    }
}

impl std::fmt::Debug for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> Resource {
        Resource::new("https://dav.example.com:8443/remote.php/dav/?x=1".parse().unwrap(), "john".into(), "secret".into())
    }

    #[test]
    fn test_combine_keeps_origin() {
        let url = resource().combine("/remote.php/dav/calendars/john/tasks/").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com:8443/remote.php/dav/calendars/john/tasks/");
    }

    #[test]
    fn test_combine_keeps_encoding() {
        let url = resource().combine("/cal/My%20Tasks/a%40b.ics").unwrap();
        assert_eq!(url.path(), "/cal/My%20Tasks/a%40b.ics");
    }

    #[test]
    fn test_combine_absolute_href() {
        let url = resource().combine("https://dav.example.com:8443/cal/task.ics").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com:8443/cal/task.ics");
    }

    #[test]
    fn test_combine_never_leaves_the_configured_server() {
        let url = resource().combine("http://127.0.0.1:5232/remote.php/dav/cal/task.ics").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com:8443/remote.php/dav/cal/task.ics");

        let url = resource().combine("https://other.example.com/cal/My%20Tasks/?export").unwrap();
        assert_eq!(url.as_str(), "https://dav.example.com:8443/cal/My%20Tasks/?export");
    }

    #[test]
    fn test_combine_empty_href() {
        assert!(resource().combine("  ").is_err());
    }
}
