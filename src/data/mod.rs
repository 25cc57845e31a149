// src/data/mod.rs

//! The `data` module is specialized data containers for the binary layout
//! of an `.evt` file ([`EvtFileHeader`], [`EvtRawRecord`]) and for decoded
//! event records ([`EventRow`]).
//!
//! ## Definitions of data
//!
//! ### Record
//!
//! A "record" is one logged event as stored in the file: a fixed portion
//! followed by a variable region of strings, a user `SID`, and binary data.
//! A record begins and ends with its own length.
//!
//! A "record" is represented by a [`EvtRawRecord`] and found by an
//! [`EvtReader`].
//!
//! ### Row
//!
//! A "row" is a decoded record: type, date, time, source, description,
//! category, event ID, user, and system.
//!
//! A "row" is represented by an [`EventRow`] and created by a
//! [`RecordParser`].
//!
//! [`EvtFileHeader`]: crate::data::evt::EvtFileHeader
//! [`EvtRawRecord`]: crate::data::evt::EvtRawRecord
//! [`EventRow`]: crate::data::eventrow::EventRow
//! [`EvtReader`]: crate::readers::evtreader::EvtReader
//! [`RecordParser`]: crate::readers::recordparser::RecordParser

pub mod datetime;
pub mod eventrow;
pub mod evt;
pub mod filter;
pub mod sid;
