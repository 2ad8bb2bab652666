//! HTTP plumbing used to talk to a CalDAV server

use async_trait::async_trait;
use reqwest::Method;
use url::Url;

use crate::error::CalDavError;
use crate::resource::Resource;
use crate::traits::DavTransport;

pub const XML_CONTENT_TYPE: &str = "application/xml";
pub const ICAL_CONTENT_TYPE: &str = "text/calendar";

/// A request to a CalDAV server
#[derive(Clone)]
pub struct DavRequest {
    method: String,
    url: Url,
    headers: Vec<(&'static str, String)>,
    basic_auth: Option<(String, String)>,
    body: Option<String>,
}

impl DavRequest {
    pub fn new<S: ToString>(method: S, url: Url) -> Self {
        Self {
            method: method.to_string(),
            url,
            headers: Vec::new(),
            basic_auth: None,
            body: None,
        }
    }

    /// A `PROPFIND` or `REPORT` request, that carries an XML body and a `Depth: 1` header
    pub fn xml_query(method: &str, resource: &Resource, url: Url, body: &str) -> Self {
        Self::new(method, url)
            .authenticated(resource)
            .header("Depth", "1")
            .header("Content-Type", XML_CONTENT_TYPE)
            .body(body.to_string())
    }

    /// A `PUT` request that uploads an iCal file
    pub fn put_ical(resource: &Resource, url: Url, ical: String) -> Self {
        Self::new("PUT", url)
            .authenticated(resource)
            .header("Content-Type", ICAL_CONTENT_TYPE)
            .body(ical)
    }

    pub fn delete(resource: &Resource, url: Url) -> Self {
        Self::new("DELETE", url)
            .authenticated(resource)
    }

    pub fn header<S: ToString>(mut self, name: &'static str, value: S) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    /// Use `Authorization: Basic` with the credentials of this resource
    pub fn authenticated(mut self, resource: &Resource) -> Self {
        self.basic_auth = Some((resource.username().clone(), resource.password().clone()));
        self
    }

    pub fn body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn url(&self) -> &Url { &self.url }
    pub fn headers(&self) -> &[(&'static str, String)] { &self.headers }
    pub fn body_text(&self) -> Option<&str> { self.body.as_deref() }
}

impl std::fmt::Debug for DavRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DavRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers)
            .field("authenticated", &self.basic_auth.is_some())
            .finish()
    }
}

/// The raw reply of a CalDAV server
#[derive(Clone, Debug)]
pub struct DavResponse {
    status: u16,
    body: Vec<u8>,
}

impl DavResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn body(&self) -> &[u8] { &self.body }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `207 Multi-Status`
    pub fn is_multi_status(&self) -> bool {
        self.status == 207
    }

    /// The body, decoded as UTF-8. Invalid sequences are replaced rather than rejected.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}


/// A [`DavTransport`] backed by `reqwest`.
///
/// A single `reqwest::Client` is kept, so that its connection pool is shared by the requests of a refresh cycle.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl DavTransport for HttpTransport {
    async fn send(&self, request: DavRequest) -> Result<DavResponse, CalDavError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|err| CalDavError::Transport(Box::new(err)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(*name, value.as_str());
        }
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        log::debug!("{} {} -> {}", request.method, request.url, status);

        Ok(DavResponse::new(status, body))
    }
}
