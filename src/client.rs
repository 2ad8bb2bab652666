//! This module provides a client to connect to a CalDAV server

use url::Url;

use crate::calendar::{Calendar, CalendarId, SupportedComponents};
use crate::config::RESERVED_CONTACTS_NAME;
use crate::error::CalDavError;
use crate::multistatus;
use crate::resource::Resource;
use crate::task::{Task, VersionTag};
use crate::traits::DavTransport;
use crate::transport::{DavRequest, DavResponse};


static CAL_BODY: &str = r#"<?xml version="1.0"?>
<propfind xmlns="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <prop>
    <resourcetype/>
    <displayname/>
    <C:supported-calendar-component-set/>
  </prop>
</propfind>"#;

static TASKS_BODY: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<C:calendar-query xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
  <D:prop><D:getetag/><C:calendar-data/></D:prop>
  <C:filter><C:comp-filter name="VCALENDAR"><C:comp-filter name="VTODO"/></C:comp-filter></C:filter>
</C:calendar-query>"#;


/// A CalDAV client, bound to a server and an account.
///
/// Clients are cheap: they are meant to be created for a single operation (a refresh, a change...), with the credentials that are current at that time.
pub struct Client<'t, T: DavTransport> {
    resource: Resource,
    transport: &'t T,
}

impl<'t, T: DavTransport> Client<'t, T> {
    /// Create a client. This does not start a connection
    pub fn new(resource: Resource, transport: &'t T) -> Self {
        Self { resource, transport }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Send a PROPFIND or a REPORT and check the server replied with a `207 Multi-Status`
    async fn multistatus_request(&self, method: &str, url: &Url, body: &str) -> Result<String, CalDavError> {
        let request = DavRequest::xml_query(method, &self.resource, url.clone(), body);
        let response = self.transport.send(request).await?;

        if !response.is_multi_status() {
            return Err(unexpected_status(method, url, &response));
        }
        Ok(response.text())
    }

    /// Return the list of calendars the server root URL contains.
    ///
    /// Collections without a display name are ignored, and so are address books that some servers list along with calendars.
    pub async fn get_calendars(&self) -> Result<Vec<Calendar>, CalDavError> {
        let url = self.resource.url();
        let text = self.multistatus_request("PROPFIND", url, CAL_BODY).await?;

        let mut calendars = Vec::new();
        for rep in multistatus::parse(&text) {
            let display_name = rep.display_name;
            if display_name.is_empty() {
                log::debug!("Ignoring collection {} that has no name", rep.href);
                continue;
            }
            if display_name == RESERVED_CONTACTS_NAME {
                log::debug!("Ignoring address book {}", rep.href);
                continue;
            }
            log::debug!("Considering calendar {}", display_name);

            if rep.href.is_empty() {
                log::warn!("Calendar {} has no URL! Ignoring it.", display_name);
                continue;
            }
            let this_calendar_url = match self.resource.combine(&rep.href) {
                Err(err) => {
                    log::warn!("Calendar {} has an invalid URL ({})! Ignoring it.", display_name, err);
                    continue;
                },
                Ok(url) => url,
            };

            let supported_components = SupportedComponents::from_names(rep.supported_components.as_slice());
            let this_calendar = Calendar::new(display_name, this_calendar_url, supported_components);
            log::info!("Found calendar {}", this_calendar.name());
            calendars.push(this_calendar);
        }

        Ok(calendars)
    }

    /// Fetch every task of a calendar.
    ///
    /// Items that cannot be understood (events, tasks without UID or summary...) are skipped.
    pub async fn get_tasks(&self, calendar: &CalendarId) -> Result<Vec<Task>, CalDavError> {
        let text = self.multistatus_request("REPORT", calendar, TASKS_BODY).await?;

        let mut tasks = Vec::new();
        for rep in multistatus::parse(&text) {
            if rep.calendar_data.is_empty() {
                log::debug!("No calendar data for {}, ignoring it", rep.href);
                continue;
            }
            if rep.href.is_empty() {
                log::warn!("An item of calendar {} has no URL, it will not be modifiable", calendar);
            }
            let etag = if rep.etag.is_empty() { None } else { Some(VersionTag::from(rep.etag)) };

            match crate::ical::parse(&rep.calendar_data, rep.href, calendar.clone(), etag) {
                Ok(task) => tasks.push(task),
                Err(err) => log::debug!("Ignoring an item of calendar {}: {}", calendar, err),
            }
        }

        log::debug!("Got {} tasks from {}", tasks.len(), calendar);
        Ok(tasks)
    }

    /// The absolute URL of a task, from its href
    pub fn resolve_href(&self, href: &str) -> Result<Url, CalDavError> {
        self.resource.combine(href)
    }

    /// Upload an iCal file. Any 2xx reply is a success
    pub async fn put_calendar_object(&self, url: Url, ical: String) -> Result<(), CalDavError> {
        log::debug!("Uploading {}", url);
        let request = DavRequest::put_ical(&self.resource, url.clone(), ical);
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(unexpected_status("PUT", &url, &response));
        }
        Ok(())
    }

    /// Delete an item. Any 2xx reply is a success
    pub async fn delete_calendar_object(&self, url: Url) -> Result<(), CalDavError> {
        log::debug!("Deleting {}", url);
        let request = DavRequest::delete(&self.resource, url.clone());
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Err(unexpected_status("DELETE", &url, &response));
        }
        Ok(())
    }
}

fn unexpected_status(method: &str, url: &Url, response: &DavResponse) -> CalDavError {
    CalDavError::UnexpectedStatus {
        method: method.to_string(),
        url: url.clone(),
        status: response.status(),
    }
}

/// The URL of a new item called `<uid>.ics` inside a calendar
pub fn calendar_object_url(calendar: &CalendarId, uid: &str) -> Result<Url, CalDavError> {
    let mut base = calendar.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("{}.ics", uid))?)
}
