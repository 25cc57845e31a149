// src/readers/mod.rs

//! "Readers" for _elplib_.
//!
//! ## Overview of readers
//!
//! * A [`ParseController`] drives an [`EvtReader`] and a [`RecordParser`]
//!   for one file and sends [`ParseNotification`s] to a consumer.
//! * An `EvtReader` finds [`EvtRawRecord`s] in the file, in logical order.
//! * A `RecordParser` decodes each `EvtRawRecord` to an [`EventRow`].
//!
//! <br/>
//!
//! * An `EvtReader` only handles `u8` bytes.
//! * A `RecordParser` does all UTF-16 to `String` conversions.
//!
//! <br/>
//!
//! Also see [_Definitions of data_].
//!
//! <br/>
//!
//! ---
//!
//! The _elp_ binary program uses a `ParseController` instance, one per file
//! and one thread per file, to drive processing for a file.
//!
//! <br/>
//!
//! _These are not rust "Readers"; these structs do not implement the trait
//! [`Read`]. These are "readers" in an informal sense._
//!
//! [_Definitions of data_]: crate::data
//! [`Read`]: std::io::Read
//! [`EvtRawRecord`s]: crate::data::evt::EvtRawRecord
//! [`EventRow`]: crate::data::eventrow::EventRow
//! [`EvtReader`]: crate::readers::evtreader::EvtReader
//! [`RecordParser`]: crate::readers::recordparser::RecordParser
//! [`ParseController`]: crate::readers::parsecontroller::ParseController
//! [`ParseNotification`s]: crate::readers::parsecontroller::ParseNotification

pub mod evtreader;
pub mod filepreprocessor;
pub mod helpers;
pub mod parsecontroller;
pub mod recordparser;
pub mod summary;
