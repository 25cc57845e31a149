// src/readers/summary.rs

//! Implements [`SummaryParse`], statistics of one parse session.

use std::fmt;
use std::time::Duration;

use crate::common::{
    Count,
    FPath,
    FileSz,
};
use crate::readers::evtreader::SummaryEvtReader;
use crate::readers::parsecontroller::ParseState;

/// Accumulated statistics about one parse session of a
/// [`ParseController`] and its [`EvtReader`] and [`RecordParser`].
///
/// For CLI option `--summary`.
///
/// [`ParseController`]: crate::readers::parsecontroller::ParseController
/// [`EvtReader`]: crate::readers::evtreader::EvtReader
/// [`RecordParser`]: crate::readers::recordparser::RecordParser
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SummaryParse {
    /// the `FPath` of the parsed file
    pub path: FPath,
    /// terminal state of the session
    pub state: ParseState,
    /// `Record` notifications sent
    pub records_sent: Count,
    /// corrupt records reported by the `EvtReader`
    pub corruptions: Count,
    /// records that failed decoding
    pub decode_errors: Count,
    /// `Progress` notifications sent
    pub progress_sent: Count,
    /// `Status` notifications sent
    pub status_sent: Count,
    pub bytes_consumed: FileSz,
    pub bytes_total: FileSz,
    pub elapsed: Duration,
    /// `None` if the file was never opened
    pub evtreader: Option<SummaryEvtReader>,
    /// the fatal error, if any
    pub error: Option<String>,
}

impl SummaryParse {
    pub fn new(path: FPath) -> SummaryParse {
        SummaryParse {
            path,
            ..Default::default()
        }
    }
}

impl fmt::Display for SummaryParse {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        writeln!(f, "File: {:?}", self.path)?;
        writeln!(f, "  State            : {:?}", self.state)?;
        writeln!(f, "  Records          : {}", self.records_sent)?;
        writeln!(f, "  Corrupt records  : {}", self.corruptions)?;
        writeln!(f, "  Decode errors    : {}", self.decode_errors)?;
        writeln!(f, "  Bytes            : {} of {}", self.bytes_consumed, self.bytes_total)?;
        if let Some(summary) = &self.evtreader {
            writeln!(f, "  Wrapped          : {}", summary.wrapped)?;
            writeln!(f, "  Dirty            : {}", summary.dirty)?;
            writeln!(f, "  Stitched records : {}", summary.records_stitched)?;
            writeln!(f, "  Bytes skipped    : {}", summary.bytes_skipped)?;
            writeln!(
                f,
                "  Header           : version {}.{}, records {}..{}, max size {}",
                summary.header.major_version,
                summary.header.minor_version,
                summary.header.oldest_record_number,
                summary.header.current_record_number,
                summary.header.max_size,
            )?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  Error            : {}", error)?;
        }
        write!(f, "  Elapsed          : {:?}", self.elapsed)
    }
}
