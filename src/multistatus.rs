//! A tolerant reader for WebDAV `207 Multi-Status` bodies
//!
//! Real servers disagree on namespace prefixes (`D:`, `d:`, no prefix at all...), and some of them send slightly broken XML.
//! This module only looks at the local names of elements, does not check that end tags match their start tags,
//! and stops quietly (keeping what has already been read) when the XML becomes unreadable.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// The interesting parts of a `<response>` element.
///
/// Absent elements are represented by empty strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseItem {
    /// The first `<href>` of the response (i.e. the address of the resource it is about)
    pub href: String,
    pub display_name: String,
    pub calendar_data: String,
    pub etag: String,
    /// The `name` attributes of the `<comp>` items of a `<supported-calendar-component-set>`
    pub supported_components: Vec<String>,
}

/// The text elements we are interested in
#[derive(Clone, Copy, Debug, PartialEq)]
enum Field {
    Href,
    DisplayName,
    CalendarData,
    ETag,
}

impl Field {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"href" => Some(Field::Href),
            b"displayname" => Some(Field::DisplayName),
            b"calendar-data" => Some(Field::CalendarData),
            b"getetag" => Some(Field::ETag),
            _ => None,
        }
    }

    fn slot<'r>(&self, response: &'r mut ResponseItem) -> &'r mut String {
        match self {
            Field::Href => &mut response.href,
            Field::DisplayName => &mut response.display_name,
            Field::CalendarData => &mut response.calendar_data,
            Field::ETag => &mut response.etag,
        }
    }
}

/// Iterates over the `<response>` elements of a multi-status body.
///
/// Responses are parsed lazily, one at a time.
pub struct MultiStatus<'a> {
    reader: Reader<&'a [u8]>,
    finished: bool,
}

/// Start reading a multi-status body
pub fn parse(xml: &str) -> MultiStatus<'_> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().check_end_names = false;
    MultiStatus { reader, finished: false }
}

impl<'a> MultiStatus<'a> {
    fn stop(&mut self, err: quick_xml::Error) {
        log::warn!("Unreadable multi-status XML at position {}: {}. Ignoring the rest of it.", self.reader.buffer_position(), err);
        self.finished = true;
    }

    /// Read the content of a `<response>`, whose start tag has just been consumed.
    /// Returns `None` if the document ends before the `</response>`.
    fn read_response(&mut self) -> Option<ResponseItem> {
        let mut response = ResponseItem::default();
        let mut current: Option<(Field, String)> = None;
        let mut in_component_set = false;

        loop {
            let event = match self.reader.read_event() {
                Ok(ev) => ev,
                Err(err) => {
                    self.stop(err);
                    return None;
                },
            };

            match event {
                Event::Start(e) => {
                    let name = e.local_name();
                    if let Some(field) = Field::from_local_name(name.as_ref()) {
                        if current.is_none() {
                            current = Some((field, String::new()));
                        }
                    } else if name.as_ref() == b"supported-calendar-component-set" {
                        in_component_set = true;
                    } else if in_component_set && name.as_ref() == b"comp" {
                        push_component(&mut response, &e);
                    }
                },
                Event::Empty(e) => {
                    if in_component_set && e.local_name().as_ref() == b"comp" {
                        push_component(&mut response, &e);
                    }
                },
                Event::Text(t) => {
                    if let Some((_, text)) = current.as_mut() {
                        match t.unescape() {
                            Ok(unescaped) => text.push_str(&unescaped),
                            Err(_) => text.push_str(&String::from_utf8_lossy(&t)),
                        }
                    }
                },
                Event::CData(c) => {
                    if let Some((_, text)) = current.as_mut() {
                        text.push_str(&String::from_utf8_lossy(&c));
                    }
                },
                Event::End(e) => {
                    let name = e.local_name();
                    if name.as_ref() == b"response" {
                        return Some(response);
                    }
                    if name.as_ref() == b"supported-calendar-component-set" {
                        in_component_set = false;
                        continue;
                    }
                    let closes_current = matches!(&current, Some((field, _)) if Field::from_local_name(name.as_ref()) == Some(*field));
                    if closes_current {
                        if let Some((field, text)) = current.take() {
                            let slot = field.slot(&mut response);
                            // The first occurrence wins
                            if slot.is_empty() {
                                *slot = text.trim().to_string();
                            }
                        }
                    }
                },
                Event::Eof => {
                    log::warn!("Multi-status body ended inside a <response>");
                    self.finished = true;
                    return None;
                },
                _ => {},
            }
        }
    }
}

fn push_component(response: &mut ResponseItem, element: &BytesStart) {
    if let Ok(Some(attr)) = element.try_get_attribute("name") {
        let name: Cow<str> = String::from_utf8_lossy(&attr.value);
        response.supported_components.push(name.into_owned());
    }
}

impl<'a> Iterator for MultiStatus<'a> {
    type Item = ResponseItem;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.reader.read_event() {
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"response" => {
                    return self.read_response();
                },
                Ok(Event::Eof) => self.finished = true,
                Ok(_) => continue,
                Err(err) => self.stop(err),
            }
        }
        None
    }
}
