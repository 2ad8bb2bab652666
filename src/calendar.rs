//! Calendars (i.e. CalDAV collections) tasks belong to

use serde::{Deserialize, Serialize};
use bitflags::bitflags;

use crate::config::INBOX_CALENDAR_NAME;

/// Calendars are identified by their absolute URL
pub type CalendarId = url::Url;

bitflags! {
    #[derive(Serialize, Deserialize)]
    pub struct SupportedComponents: u8 {
        /// An event, such as a calendar meeting
        const EVENT = 1;
        /// A to-do item, such as a reminder
        const TODO = 2;
    }
}

impl SupportedComponents {
    /// Create an instance from the `name`s of the `<comp>` items of a `<supported-calendar-component-set>`
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut flags = Self::empty();
        for name in names {
            match name.as_ref() {
                "VEVENT" => flags.insert(Self::EVENT),
                "VTODO" => flags.insert(Self::TODO),
                other => {
                    log::debug!("Unimplemented supported component type: {:?}. Ignoring it", other);
                },
            }
        }
        flags
    }
}


/// A calendar found on the server
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    name: String,
    url: CalendarId,
    /// What the server says this calendar can hold. This is empty when the server did not tell.
    supported_components: SupportedComponents,
}

impl Calendar {
    pub fn new(name: String, url: CalendarId, supported_components: SupportedComponents) -> Self {
        Self { name, url, supported_components }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn url(&self) -> &CalendarId { &self.url }
    pub fn supported_components(&self) -> SupportedComponents { self.supported_components }

    /// Whether this calendar is the one new tasks go to by default
    pub fn is_inbox(&self) -> bool {
        self.name.eq_ignore_ascii_case(INBOX_CALENDAR_NAME)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_components() {
        let comps = SupportedComponents::from_names(&["VEVENT", "VTODO", "VJOURNAL"][..]);
        assert_eq!(comps, SupportedComponents::EVENT | SupportedComponents::TODO);

        let comps = SupportedComponents::from_names::<String>(&[]);
        assert!(comps.is_empty());
    }

    #[test]
    fn test_inbox() {
        let url: CalendarId = "https://dav.example.com/cal/inbox/".parse().unwrap();
        assert!(Calendar::new("INBOX".into(), url.clone(), SupportedComponents::TODO).is_inbox());
        assert!(!Calendar::new("Inbox 2".into(), url, SupportedComponents::TODO).is_inbox());
    }
}
