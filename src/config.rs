//! Support for library configuration options

use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// Part of the ProdID string that describes the organization (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static ORG_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("CalDAV Tasks".to_string())));

/// Part of the ProdID string that describes the product name (example of a ProdID string: `-//ABC Corporation//My Product//EN`).
/// Feel free to override it when initing this library.
pub static PRODUCT_NAME: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("caldav-tasks".to_string())));

/// The domain suffix appended to the UIDs of tasks created by this crate (e.g. `1618000000000-abcdef@caldav-tasks`)
pub static UID_DOMAIN: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("caldav-tasks".to_string())));

/// Some servers expose their address book through the same PROPFIND as calendars.
/// A collection with this display name is never considered as a calendar.
pub const RESERVED_CONTACTS_NAME: &str = "My Contacts";

/// When no calendar is selected, new tasks go to the calendar with this name (compared case-insensitively), if any
pub const INBOX_CALENDAR_NAME: &str = "inbox";

fn read_setting(setting: &Lazy<Arc<Mutex<String>>>) -> String {
    match setting.lock() {
        Ok(value) => value.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// The PRODID that is written into every iCal file this crate sends
pub fn ical_product_id() -> String {
    format!("-//{}//{}//EN", read_setting(&ORG_NAME), read_setting(&PRODUCT_NAME))
}

/// The current UID domain suffix
pub fn uid_domain() -> String {
    read_setting(&UID_DOMAIN)
}
