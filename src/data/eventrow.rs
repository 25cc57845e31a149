// src/data/eventrow.rs

//! Implement [`EventRow`], one decoded event record, and [`EventType`].

use std::fmt;

use crate::common::NLc;
use crate::data::datetime::{
    DateL,
    DateTimeL,
    DATE_FORMAT,
    TIME_FORMAT,
};
use crate::debug::printers::str_to_String_noraw;

/// Separator between the description strings of an [`EventRow`]. A
/// consumer may render it as a newline, see [`EventRow::description_lines`].
pub const DESCRIPTION_SEPARATOR: char = '\0';

/// The event type of a record, from field `EventType` of an
/// `EVENTLOGRECORD`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum EventType {
    Error,
    Warning,
    Information,
    AuditSuccess,
    AuditFailure,
    Unknown,
}

pub const EVENTLOG_SUCCESS: u16 = 0x0000;
pub const EVENTLOG_ERROR_TYPE: u16 = 0x0001;
pub const EVENTLOG_WARNING_TYPE: u16 = 0x0002;
pub const EVENTLOG_INFORMATION_TYPE: u16 = 0x0004;
pub const EVENTLOG_AUDIT_SUCCESS: u16 = 0x0008;
pub const EVENTLOG_AUDIT_FAILURE: u16 = 0x0010;

impl EventType {
    /// All variants, in display order.
    pub const ALL: [EventType; 6] = [
        EventType::Error,
        EventType::Warning,
        EventType::Information,
        EventType::AuditSuccess,
        EventType::AuditFailure,
        EventType::Unknown,
    ];

    /// Map the numeric event type code to an `EventType`.
    ///
    /// `EVENTLOG_SUCCESS` is shown as `Information`, as the Windows Event
    /// Viewer does.
    pub const fn from_code(code: u16) -> EventType {
        match code {
            EVENTLOG_SUCCESS | EVENTLOG_INFORMATION_TYPE => EventType::Information,
            EVENTLOG_ERROR_TYPE => EventType::Error,
            EVENTLOG_WARNING_TYPE => EventType::Warning,
            EVENTLOG_AUDIT_SUCCESS => EventType::AuditSuccess,
            EVENTLOG_AUDIT_FAILURE => EventType::AuditFailure,
            _ => EventType::Unknown,
        }
    }

    /// The label shown in the "Type" column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventType::Error => "Error",
            EventType::Warning => "Warning",
            EventType::Information => "Information",
            EventType::AuditSuccess => "AuditSuccess",
            EventType::AuditFailure => "AuditFailure",
            EventType::Unknown => "Unknown",
        }
    }

    /// Case-insensitive match of a label, e.g. `"warning"`.
    pub fn from_label(label: &str) -> Option<EventType> {
        EventType::ALL
            .iter()
            .find(|et| et.as_str().eq_ignore_ascii_case(label))
            .copied()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded event record; the nine fields shown for every event plus the
/// record number.
///
/// An `EventRow` is an immutable value. It is created by a
/// [`RecordParser`], sent to the consumer, and not retained by the parser.
///
/// [`RecordParser`]: crate::readers::recordparser::RecordParser
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct EventRow {
    event_type: EventType,
    /// When the event was generated, in the session timezone.
    dt: DateTimeL,
    source: String,
    /// Description strings joined by [`DESCRIPTION_SEPARATOR`].
    description: String,
    category: String,
    /// Low 16 bits of the raw event identifier.
    event_id: u16,
    user: String,
    system: String,
    record_number: u32,
}

impl fmt::Debug for EventRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRow")
            .field("record_number", &self.record_number)
            .field("type", &self.event_type)
            .field("dt", &self.dt)
            .field("source", &self.source)
            .field("description", &str_to_String_noraw(&self.description))
            .field("category", &self.category)
            .field("event_id", &self.event_id)
            .field("user", &self.user)
            .field("system", &self.system)
            .finish()
    }
}

impl EventRow {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_type: EventType,
        dt: DateTimeL,
        source: String,
        description: String,
        category: String,
        event_id: u16,
        user: String,
        system: String,
        record_number: u32,
    ) -> EventRow {
        EventRow {
            event_type,
            dt,
            source,
            description,
            category,
            event_id,
            user,
            system,
            record_number,
        }
    }

    pub const fn event_type(&self) -> EventType {
        self.event_type
    }

    pub const fn dt(&self) -> &DateTimeL {
        &self.dt
    }

    /// The calendar date of [`dt`](EventRow::dt).
    pub fn date(&self) -> DateL {
        self.dt.date_naive()
    }

    /// The "Date" column, e.g. `2004-03-12`.
    pub fn date_str(&self) -> String {
        self.dt.format(DATE_FORMAT).to_string()
    }

    /// The "Time" column, e.g. `17:05:59`.
    pub fn time_str(&self) -> String {
        self.dt.format(TIME_FORMAT).to_string()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// The raw description, strings joined by [`DESCRIPTION_SEPARATOR`].
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The description with each [`DESCRIPTION_SEPARATOR`] rendered as
    /// `sep`.
    pub fn description_with(&self, sep: &str) -> String {
        self.description.replace(DESCRIPTION_SEPARATOR, sep)
    }

    /// The description with each separator rendered as a newline.
    pub fn description_lines(&self) -> String {
        let mut nl = [0u8; 4];
        self.description_with(NLc.encode_utf8(&mut nl))
    }

    /// Each description string.
    pub fn description_parts(&self) -> impl Iterator<Item = &str> {
        self.description.split(DESCRIPTION_SEPARATOR)
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub const fn event_id(&self) -> u16 {
        self.event_id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub const fn record_number(&self) -> u32 {
        self.record_number
    }
}
