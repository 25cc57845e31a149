// src/data/evt.rs

//! Implement the binary layout of a legacy Windows Event Log `.evt` file:
//! the [`EvtFileHeader`], the [`EvtRawRecord`], and the EOF record.
//!
//! An `.evt` file is a circular buffer. A 48 byte header is followed by
//! variable-length records. Each record begins and ends with its own length.
//! All integers are little-endian regardless of the host.
//!
//! ```text
//! offset 0x00   ELF_LOGFILE_HEADER (48 bytes)
//! offset 0x30   EVENTLOGRECORD     (length L1)
//!               EVENTLOGRECORD     (length L2)
//!               …
//!               ELF_EOF_RECORD     (40 bytes)
//!               (unused space, or older records when wrapped)
//! ```
//!
//! See [libyal Windows Event Log (EVT) format] and
//! [EVENTLOGRECORD structure].
//!
//! [libyal Windows Event Log (EVT) format]: https://github.com/libyal/libevt/blob/main/documentation/Windows%20Event%20Log%20(EVT)%20format.asciidoc
//! [EVENTLOGRECORD structure]: https://learn.microsoft.com/en-us/windows/win32/api/winnt/ns-winnt-eventlogrecord

use std::fmt;

use ::const_format::assertcp;

use crate::common::{
    Bytes,
    FPath,
    FileOffset,
};
use crate::debug::printers::buffer_to_String_hex;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// format constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The signature `"LfLe"` as a little-endian `u32`. Found in the file
/// header and in every record.
pub const EVT_SIGNATURE: u32 = 0x654c664c;

/// Size of the file header `ELF_LOGFILE_HEADER`.
pub const HEADER_SZ: usize = 0x30;
pub const HEADER_SZ_FO: FileOffset = HEADER_SZ as FileOffset;

pub const HEADER_FLAG_DIRTY: u32 = 0x1;
pub const HEADER_FLAG_WRAP: u32 = 0x2;
pub const HEADER_FLAG_LOGFULL_WRITTEN: u32 = 0x4;
pub const HEADER_FLAG_ARCHIVE_SET: u32 = 0x8;

/// Size of the fixed portion of an `EVENTLOGRECORD`, the variable region
/// begins here.
pub const RECORD_FIXED_SZ: usize = 0x38;

/// Size of the trailing length field of a record.
pub const RECORD_TRAILER_SZ: usize = 4;

/// The smallest possible record; the fixed portion plus the trailing length.
pub const RECORD_SZ_MIN: usize = RECORD_FIXED_SZ + RECORD_TRAILER_SZ;
pub const RECORD_SZ_MIN_U32: u32 = RECORD_SZ_MIN as u32;

/// Size of the `ELF_EOF_RECORD`.
pub const EOF_RECORD_SZ: usize = 0x28;
pub const EOF_RECORD_SZ_U32: u32 = EOF_RECORD_SZ as u32;

/// The four marker values following the leading size of an `ELF_EOF_RECORD`.
pub const EOF_RECORD_MARKERS: [u32; 4] = [0x11111111, 0x22222222, 0x33333333, 0x44444444];

/// Dword value the writer uses to fill unused space at the end of the
/// buffer.
pub const PADDING_DWORD: u32 = 0x00000027;

/// Size of one length or offset field; the resynchronization step.
pub const FIELD_SZ: usize = 4;

assertcp!(RECORD_SZ_MIN > EOF_RECORD_SZ, "a record must be larger than an EOF record");
assertcp!(HEADER_SZ % FIELD_SZ == 0);

// record field offsets
pub const RECORD_OFFSET_LENGTH: usize = 0;
pub const RECORD_OFFSET_SIGNATURE: usize = 4;
pub const RECORD_OFFSET_RECORD_NUMBER: usize = 8;
pub const RECORD_OFFSET_TIME_GENERATED: usize = 12;
pub const RECORD_OFFSET_TIME_WRITTEN: usize = 16;
pub const RECORD_OFFSET_EVENT_ID: usize = 20;
pub const RECORD_OFFSET_EVENT_TYPE: usize = 24;
pub const RECORD_OFFSET_NUM_STRINGS: usize = 26;
pub const RECORD_OFFSET_EVENT_CATEGORY: usize = 28;
pub const RECORD_OFFSET_RESERVED_FLAGS: usize = 30;
pub const RECORD_OFFSET_CLOSING_RECORD_NUMBER: usize = 32;
pub const RECORD_OFFSET_STRING_OFFSET: usize = 36;
pub const RECORD_OFFSET_USER_SID_LENGTH: usize = 40;
pub const RECORD_OFFSET_USER_SID_OFFSET: usize = 44;
pub const RECORD_OFFSET_DATA_LENGTH: usize = 48;
pub const RECORD_OFFSET_DATA_OFFSET: usize = 52;

assertcp!(RECORD_OFFSET_DATA_OFFSET + FIELD_SZ == RECORD_FIXED_SZ);

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// little-endian helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Read a little-endian `u32` at `at`. `None` if `buffer` is too short.
#[inline(always)]
pub fn u32_at(buffer: &[u8], at: usize) -> Option<u32> {
    let bytes: [u8; 4] = buffer.get(at..at.checked_add(4)?)?.try_into().ok()?;

    Some(u32::from_le_bytes(bytes))
}

/// Read a little-endian `u16` at `at`. `None` if `buffer` is too short.
#[inline(always)]
pub fn u16_at(buffer: &[u8], at: usize) -> Option<u16> {
    let bytes: [u8; 2] = buffer.get(at..at.checked_add(2)?)?.try_into().ok()?;

    Some(u16::from_le_bytes(bytes))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EvtError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Errors when reading and decoding an `.evt` file.
///
/// `NotFound`, `Access`, and `Format` are fatal to a parse session.
/// `Corruption` is per-record and not fatal.
#[derive(Debug)]
pub enum EvtError {
    /// The path does not exist.
    NotFound(FPath),
    /// The path exists but cannot be read.
    Access(FPath, String),
    /// The file header is not a valid `.evt` header.
    Format(String),
    /// A record is inconsistent. `fileoffset` is the logical beginning of
    /// the record.
    Corruption {
        fileoffset: FileOffset,
        reason: String,
    },
    /// Some other I/O error.
    Io(std::io::Error),
}

impl EvtError {
    /// Is this error fatal to a parse session?
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, EvtError::Corruption { .. })
    }

    pub const fn is_corruption(&self) -> bool {
        matches!(self, EvtError::Corruption { .. })
    }

    /// Helper to create a `EvtError::Corruption`.
    pub fn corruption(fileoffset: FileOffset, reason: String) -> EvtError {
        EvtError::Corruption { fileoffset, reason }
    }
}

impl fmt::Display for EvtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvtError::NotFound(path) => write!(f, "file not found {:?}", path),
            EvtError::Access(path, why) => write!(f, "cannot access {:?}: {}", path, why),
            EvtError::Format(why) => write!(f, "not a valid event log file: {}", why),
            EvtError::Corruption { fileoffset, reason } => {
                write!(f, "corrupt record at offset {}: {}", fileoffset, reason)
            }
            EvtError::Io(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EvtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvtError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EvtError {
    fn from(err: std::io::Error) -> Self {
        EvtError::Io(err)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EvtFileHeader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `ELF_LOGFILE_HEADER` at the beginning of every `.evt` file.
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct EvtFileHeader {
    pub header_size: u32,
    pub signature: u32,
    pub major_version: u32,
    pub minor_version: u32,
    /// Offset of the oldest record.
    pub start_offset: u32,
    /// Offset of the EOF record, i.e. one past the newest record.
    pub end_offset: u32,
    pub current_record_number: u32,
    pub oldest_record_number: u32,
    pub max_size: u32,
    pub flags: u32,
    pub retention: u32,
    pub end_header_size: u32,
}

impl fmt::Debug for EvtFileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvtFileHeader")
            .field("header_size", &self.header_size)
            .field("signature", &format_args!("{:#010x}", self.signature))
            .field("version", &format_args!("{}.{}", self.major_version, self.minor_version))
            .field("start_offset", &self.start_offset)
            .field("end_offset", &self.end_offset)
            .field("current_record_number", &self.current_record_number)
            .field("oldest_record_number", &self.oldest_record_number)
            .field("max_size", &self.max_size)
            .field("flags", &format_args!("{:#x}", self.flags))
            .finish()
    }
}

impl EvtFileHeader {
    /// Create a `EvtFileHeader` from the first [`HEADER_SZ`] bytes of
    /// `buffer`. Checks the signature and both header sizes.
    pub fn from_buffer(buffer: &[u8]) -> Result<EvtFileHeader, EvtError> {
        if buffer.len() < HEADER_SZ {
            return Err(EvtError::Format(format!(
                "file is {} bytes, smaller than the header size {}",
                buffer.len(), HEADER_SZ,
            )));
        }
        // length was checked so every `u32_at` below succeeds
        let at = |offset: usize| -> u32 { u32_at(buffer, offset).unwrap_or_default() };
        let header = EvtFileHeader {
            header_size: at(0),
            signature: at(4),
            major_version: at(8),
            minor_version: at(12),
            start_offset: at(16),
            end_offset: at(20),
            current_record_number: at(24),
            oldest_record_number: at(28),
            max_size: at(32),
            flags: at(36),
            retention: at(40),
            end_header_size: at(44),
        };
        if header.signature != EVT_SIGNATURE {
            return Err(EvtError::Format(format!(
                "bad signature {:#010x}, expected {:#010x}",
                header.signature, EVT_SIGNATURE,
            )));
        }
        if header.header_size as usize != HEADER_SZ {
            return Err(EvtError::Format(format!(
                "bad header size {}, expected {}",
                header.header_size, HEADER_SZ,
            )));
        }
        if header.end_header_size as usize != HEADER_SZ {
            return Err(EvtError::Format(format!(
                "bad trailing header size {}, expected {}",
                header.end_header_size, HEADER_SZ,
            )));
        }

        Ok(header)
    }

    pub const fn is_dirty(&self) -> bool {
        self.flags & HEADER_FLAG_DIRTY != 0
    }

    /// Has the circular buffer wrapped around?
    ///
    /// Either the flag is set or the newest record lies before the oldest.
    pub const fn is_wrapped(&self) -> bool {
        self.flags & HEADER_FLAG_WRAP != 0 || self.end_offset < self.start_offset
    }

    pub const fn is_version_known(&self) -> bool {
        self.major_version == 1 && self.minor_version == 1
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EOF record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The `ELF_EOF_RECORD` that marks the logical end of the records.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct EvtEofRecord {
    /// Offset of the oldest record.
    pub begin_record: u32,
    /// Offset of this EOF record.
    pub end_record: u32,
    pub current_record_number: u32,
    pub oldest_record_number: u32,
}

impl EvtEofRecord {
    /// Does `buffer` begin with the EOF record size and markers?
    ///
    /// Only the first 20 bytes are examined.
    pub fn is_eof_record(buffer: &[u8]) -> bool {
        if u32_at(buffer, 0) != Some(EOF_RECORD_SZ_U32) {
            return false;
        }
        EOF_RECORD_MARKERS
            .iter()
            .enumerate()
            .all(|(i, marker)| u32_at(buffer, 4 + i * 4) == Some(*marker))
    }

    /// Create a `EvtEofRecord` from a buffer of at least [`EOF_RECORD_SZ`]
    /// bytes. `None` if the buffer is not an EOF record.
    pub fn from_buffer(buffer: &[u8]) -> Option<EvtEofRecord> {
        if !EvtEofRecord::is_eof_record(buffer) {
            return None;
        }
        if u32_at(buffer, EOF_RECORD_SZ - 4)? != EOF_RECORD_SZ_U32 {
            return None;
        }

        Some(EvtEofRecord {
            begin_record: u32_at(buffer, 20)?,
            end_record: u32_at(buffer, 24)?,
            current_record_number: u32_at(buffer, 28)?,
            oldest_record_number: u32_at(buffer, 32)?,
        })
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// EvtRawRecord
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One `EVENTLOGRECORD` as bytes, as found by an [`EvtReader`].
///
/// The `EvtReader` guarantees the buffer is at least [`RECORD_SZ_MIN`]
/// bytes, begins with the record signature, and the leading and trailing
/// lengths agree. The variable region offsets are not yet checked; that is
/// done by the [`RecordParser`].
///
/// [`EvtReader`]: crate::readers::evtreader::EvtReader
/// [`RecordParser`]: crate::readers::recordparser::RecordParser
#[derive(Clone, Eq, PartialEq)]
pub struct EvtRawRecord {
    /// Logical file offset of the first byte of the record.
    fileoffset: FileOffset,
    /// All bytes of the record including both length fields.
    data: Bytes,
}

impl fmt::Debug for EvtRawRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvtRawRecord")
            .field("fileoffset", &self.fileoffset)
            .field("len", &self.data.len())
            .field("record_number", &self.record_number())
            .field("data", &buffer_to_String_hex(&self.data, 16))
            .finish()
    }
}

impl EvtRawRecord {
    pub fn new(fileoffset: FileOffset, data: Bytes) -> EvtRawRecord {
        debug_assert!(data.len() >= RECORD_SZ_MIN, "record too small {}", data.len());

        EvtRawRecord { fileoffset, data }
    }

    #[inline(always)]
    pub const fn fileoffset(&self) -> FileOffset {
        self.fileoffset
    }

    /// Length of the record in bytes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Clippy recommends `fn is_empty` since there is a `len()`.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// End of the variable region; the trailing length field begins here.
    #[inline(always)]
    pub fn variable_end(&self) -> usize {
        self.data.len().saturating_sub(RECORD_TRAILER_SZ)
    }

    #[inline(always)]
    fn u32_field(&self, at: usize) -> u32 {
        u32_at(&self.data, at).unwrap_or_default()
    }

    #[inline(always)]
    fn u16_field(&self, at: usize) -> u16 {
        u16_at(&self.data, at).unwrap_or_default()
    }

    pub fn length(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_LENGTH)
    }

    pub fn length_trailing(&self) -> u32 {
        self.u32_field(self.variable_end())
    }

    pub fn signature(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_SIGNATURE)
    }

    pub fn record_number(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_RECORD_NUMBER)
    }

    /// Seconds since the Unix epoch (UTC) when the event was generated.
    pub fn time_generated(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_TIME_GENERATED)
    }

    /// Seconds since the Unix epoch (UTC) when the event was written.
    pub fn time_written(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_TIME_WRITTEN)
    }

    /// The raw event identifier including the severity, customer, and
    /// facility bits.
    pub fn event_id(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_EVENT_ID)
    }

    pub fn event_type(&self) -> u16 {
        self.u16_field(RECORD_OFFSET_EVENT_TYPE)
    }

    pub fn num_strings(&self) -> u16 {
        self.u16_field(RECORD_OFFSET_NUM_STRINGS)
    }

    pub fn event_category(&self) -> u16 {
        self.u16_field(RECORD_OFFSET_EVENT_CATEGORY)
    }

    pub fn reserved_flags(&self) -> u16 {
        self.u16_field(RECORD_OFFSET_RESERVED_FLAGS)
    }

    pub fn closing_record_number(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_CLOSING_RECORD_NUMBER)
    }

    pub fn string_offset(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_STRING_OFFSET)
    }

    pub fn user_sid_length(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_USER_SID_LENGTH)
    }

    pub fn user_sid_offset(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_USER_SID_OFFSET)
    }

    pub fn data_length(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_DATA_LENGTH)
    }

    pub fn data_offset(&self) -> u32 {
        self.u32_field(RECORD_OFFSET_DATA_OFFSET)
    }
}
