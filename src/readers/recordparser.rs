// src/readers/recordparser.rs

//! Implements a [`RecordParser`], the decoder of an [`EvtRawRecord`] into
//! an [`EventRow`].
//!
//! [`EvtRawRecord`]: crate::data::evt::EvtRawRecord
//! [`EventRow`]: crate::data::eventrow::EventRow

use std::fmt;

#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};

use crate::common::Count;
use crate::data::datetime::{
    epoch_to_datetimel,
    TimeZoneL,
};
use crate::data::eventrow::{
    EventRow,
    EventType,
    DESCRIPTION_SEPARATOR,
};
use crate::data::evt::{
    EvtError,
    EvtRawRecord,
    RECORD_FIXED_SZ,
};
use crate::data::sid::{
    sid_bytes_to_hex,
    Sid,
    SidResolver,
    WellKnownSidResolver,
};

/// Category shown for category `0`.
pub const CATEGORY_NONE: &str = "None";

/// Decode a UTF-16LE string that begins at `at` and is terminated by a
/// zero code unit before `end`.
///
/// Returns the string and the offset just past the terminator, or `None` if
/// there is no terminator before `end`. Invalid code units are replaced with
/// U+FFFD.
pub fn utf16z_at(
    buffer: &[u8],
    at: usize,
    end: usize,
) -> Option<(String, usize)> {
    let end: usize = std::cmp::min(end, buffer.len());
    let mut i: usize = at;
    while i + 2 <= end {
        if buffer[i] == 0 && buffer[i + 1] == 0 {
            let (cow, _had_errors) = ::encoding_rs::UTF_16LE.decode_without_bom_handling(&buffer[at..i]);
            return Some((cow.into_owned(), i + 2));
        }
        i += 2;
    }

    None
}

/// Category text; message-file lookup is not done.
pub fn category_to_string(category: u16) -> String {
    match category {
        0 => String::from(CATEGORY_NONE),
        n => format!("({})", n),
    }
}

/// Decodes [`EvtRawRecord`]s into [`EventRow`]s.
///
/// Holds the session timezone and a [`SidResolver`].
pub struct RecordParser {
    tz: TimeZoneL,
    sid_resolver: Box<dyn SidResolver>,
    /// `Count` of records decoded.
    pub(super) records_decoded: Count,
    /// `Count` of records that failed decoding.
    pub(super) decode_errors: Count,
}

impl fmt::Debug for RecordParser {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("RecordParser")
            .field("tz", &self.tz)
            .field("records_decoded", &self.records_decoded)
            .field("decode_errors", &self.decode_errors)
            .finish()
    }
}

impl RecordParser {
    /// Create a `RecordParser` that resolves only well-known `SID`s.
    pub fn new(tz: TimeZoneL) -> RecordParser {
        RecordParser::with_resolver(tz, Box::new(WellKnownSidResolver))
    }

    pub fn with_resolver(
        tz: TimeZoneL,
        sid_resolver: Box<dyn SidResolver>,
    ) -> RecordParser {
        RecordParser {
            tz,
            sid_resolver,
            records_decoded: 0,
            decode_errors: 0,
        }
    }

    pub const fn tz(&self) -> &TimeZoneL {
        &self.tz
    }

    pub const fn count_records_decoded(&self) -> Count {
        self.records_decoded
    }

    pub const fn count_decode_errors(&self) -> Count {
        self.decode_errors
    }

    /// Check a non-empty sub-region `[offset, offset + len)` lies within
    /// the variable region `[RECORD_FIXED_SZ, end)`.
    fn check_region(
        raw: &EvtRawRecord,
        what: &str,
        offset: u32,
        len: u32,
        end: usize,
    ) -> Result<(usize, usize), EvtError> {
        let beg: usize = offset as usize;
        let stop: Option<usize> = beg.checked_add(len as usize);
        match stop {
            Some(stop) if beg >= RECORD_FIXED_SZ && stop <= end => Ok((beg, stop)),
            _ => Err(EvtError::corruption(
                raw.fileoffset(),
                format!(
                    "{} offset {} length {} outside of variable region [{}, {})",
                    what, offset, len, RECORD_FIXED_SZ, end
                ),
            )),
        }
    }

    /// The "User" column: resolved account name, else textual `SID`, else
    /// hexadecimal of the identifier bytes. Never fails.
    pub fn resolve_user(
        &self,
        sid_bytes: &[u8],
    ) -> String {
        if sid_bytes.is_empty() {
            return String::new();
        }
        match Sid::from_bytes(sid_bytes) {
            Some(sid) => match self.sid_resolver.resolve(&sid) {
                Some(name) => name,
                None => sid.to_string(),
            },
            None => sid_bytes_to_hex(sid_bytes),
        }
    }

    /// Decode `raw` into an [`EventRow`].
    ///
    /// Fails with `EvtError::Corruption` if a declared offset or length is
    /// out of bounds or a string terminator is missing.
    pub fn decode(
        &mut self,
        raw: &EvtRawRecord,
    ) -> Result<EventRow, EvtError> {
        defn!("({:?})", raw);
        match self.decode_impl(raw) {
            Ok(row) => {
                self.records_decoded += 1;
                defx!("return Ok({:?})", row);
                Ok(row)
            }
            Err(err) => {
                self.decode_errors += 1;
                defx!("return Err({})", err);
                Err(err)
            }
        }
    }

    fn decode_impl(
        &self,
        raw: &EvtRawRecord,
    ) -> Result<EventRow, EvtError> {
        let buffer: &[u8] = raw.as_bytes();
        let end: usize = raw.variable_end();

        let (source, at) = match utf16z_at(buffer, RECORD_FIXED_SZ, end) {
            Some(val) => val,
            None => {
                return Err(EvtError::corruption(
                    raw.fileoffset(),
                    String::from("source name is not terminated"),
                ));
            }
        };
        let (system, _) = match utf16z_at(buffer, at, end) {
            Some(val) => val,
            None => {
                return Err(EvtError::corruption(
                    raw.fileoffset(),
                    String::from("computer name is not terminated"),
                ));
            }
        };

        let user: String = match raw.user_sid_length() {
            0 => String::new(),
            sid_len => {
                let (beg, stop) = Self::check_region(raw, "user SID", raw.user_sid_offset(), sid_len, end)?;
                self.resolve_user(&buffer[beg..stop])
            }
        };

        let num_strings: u16 = raw.num_strings();
        let mut description = String::new();
        if num_strings > 0 {
            let (mut at, _) = Self::check_region(raw, "strings", raw.string_offset(), 1, end)?;
            for i in 0..num_strings {
                let (s, next) = match utf16z_at(buffer, at, end) {
                    Some(val) => val,
                    None => {
                        return Err(EvtError::corruption(
                            raw.fileoffset(),
                            format!("string {} of {} is not terminated", i + 1, num_strings),
                        ));
                    }
                };
                if i > 0 {
                    description.push(DESCRIPTION_SEPARATOR);
                }
                description.push_str(&s);
                at = next;
            }
        }

        if raw.data_length() != 0 {
            Self::check_region(raw, "data", raw.data_offset(), raw.data_length(), end)?;
        }

        Ok(EventRow::new(
            EventType::from_code(raw.event_type()),
            epoch_to_datetimel(raw.time_generated(), &self.tz),
            source,
            description,
            category_to_string(raw.event_category()),
            (raw.event_id() & 0xFFFF) as u16,
            user,
            system,
            raw.record_number(),
        ))
    }
}
