// src/tests/common.rs

//! Common data and functions for tests; builders of `.evt` file bytes.
//!
//! Files are built in memory then written to a `NamedTempFile` with
//! [`create_temp_file_bytes`].
//!
//! [`create_temp_file_bytes`]: crate::debug::helpers::create_temp_file_bytes

#![allow(non_upper_case_globals)]

use ::lazy_static::lazy_static;

use crate::common::{
    Bytes,
    FPath,
};
use crate::data::datetime::{
    FixedOffset,
    TimeZoneL,
};
use crate::data::evt::{
    u32_at,
    EOF_RECORD_MARKERS,
    EOF_RECORD_SZ,
    EOF_RECORD_SZ_U32,
    EVT_SIGNATURE,
    HEADER_FLAG_DIRTY,
    HEADER_FLAG_WRAP,
    HEADER_SZ,
    RECORD_FIXED_SZ,
    RECORD_OFFSET_LENGTH,
    RECORD_OFFSET_RECORD_NUMBER,
    RECORD_OFFSET_SIGNATURE,
};
use crate::debug::helpers::{
    create_temp_file_bytes,
    ntf_fpath,
    NamedTempFile,
};

/// 2004-03-10 16:00:00 UTC
pub const TIME_BASE: u32 = 1078934400;

pub const SOURCE_DEFAULT: &str = "Service Control Manager";
pub const COMPUTER_DEFAULT: &str = "WORKSTATION1";

/// Path that does not exist.
pub const FPATH_NOT_EXIST: &str = "/THIS/PATH/DOES/NOT/EXIST/file.evt";

pub fn tz_utc() -> TimeZoneL {
    TimeZoneL::Fixed(FixedOffset::east_opt(0).unwrap())
}

pub fn tz_plus1() -> TimeZoneL {
    TimeZoneL::Fixed(FixedOffset::east_opt(3600).unwrap())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// record builders
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `s` as UTF-16LE with a zero terminator.
pub fn utf16z(s: &str) -> Bytes {
    let mut buffer: Bytes = Bytes::with_capacity(s.len() * 2 + 2);
    for unit in s.encode_utf16() {
        buffer.extend_from_slice(&unit.to_le_bytes());
    }
    buffer.extend_from_slice(&[0, 0]);

    buffer
}

fn pad4(buffer: &mut Bytes) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

fn put_u32(buffer: &mut [u8], at: usize, value: u32) {
    buffer[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_u16(buffer: &mut [u8], at: usize, value: u16) {
    buffer[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

/// Binary `SID` with the given identifier authority and sub-authorities.
pub fn sid_bytes(authority: u64, sub_authorities: &[u32]) -> Bytes {
    let mut buffer: Bytes = vec![1, sub_authorities.len() as u8];
    buffer.extend_from_slice(&authority.to_be_bytes()[2..8]);
    for sub in sub_authorities.iter() {
        buffer.extend_from_slice(&sub.to_le_bytes());
    }

    buffer
}

lazy_static! {
    /// `S-1-5-18`, `NT AUTHORITY\SYSTEM`
    pub static ref SID_SYSTEM: Bytes = sid_bytes(5, &[18]);
    /// `S-1-5-21-1004336348-1177238915-682003330-512`, not well-known
    pub static ref SID_DOMAIN_ADMINS: Bytes = sid_bytes(5, &[21, 1004336348, 1177238915, 682003330, 512]);
}

/// The fields of one record to build.
#[derive(Clone, Debug)]
pub struct RecordSpec {
    pub record_number: u32,
    pub time_generated: u32,
    pub time_written: u32,
    pub event_id: u32,
    pub event_type: u16,
    pub category: u16,
    pub source: String,
    pub computer: String,
    pub sid: Bytes,
    pub strings: Vec<String>,
    pub data: Bytes,
}

impl Default for RecordSpec {
    fn default() -> Self {
        RecordSpec {
            record_number: 1,
            time_generated: TIME_BASE,
            time_written: TIME_BASE,
            event_id: 0x40001B58,
            event_type: 4,
            category: 0,
            source: String::from(SOURCE_DEFAULT),
            computer: String::from(COMPUTER_DEFAULT),
            sid: Bytes::new(),
            strings: vec![String::from("Alerter"), String::from("stopped")],
            data: Bytes::new(),
        }
    }
}

impl RecordSpec {
    /// Default record with `record_number`, generated `record_number`
    /// minutes after [`TIME_BASE`].
    pub fn new(record_number: u32) -> RecordSpec {
        RecordSpec {
            record_number,
            time_generated: TIME_BASE + record_number * 60,
            time_written: TIME_BASE + record_number * 60,
            ..Default::default()
        }
    }

    pub fn build(&self) -> Bytes {
        build_record(self)
    }
}

/// Build the bytes of one `EVENTLOGRECORD`.
///
/// Layout after the fixed portion is source, computer, `SID`, strings,
/// data, each region 4-byte aligned, then the trailing length.
pub fn build_record(spec: &RecordSpec) -> Bytes {
    let mut var: Bytes = Bytes::new();
    var.extend(utf16z(&spec.source));
    var.extend(utf16z(&spec.computer));
    pad4(&mut var);
    let sid_offset: usize = RECORD_FIXED_SZ + var.len();
    var.extend_from_slice(&spec.sid);
    pad4(&mut var);
    let string_offset: usize = RECORD_FIXED_SZ + var.len();
    for s in spec.strings.iter() {
        var.extend(utf16z(s));
    }
    pad4(&mut var);
    let data_offset: usize = RECORD_FIXED_SZ + var.len();
    var.extend_from_slice(&spec.data);
    pad4(&mut var);
    let length: usize = RECORD_FIXED_SZ + var.len() + 4;

    let mut record: Bytes = vec![0; RECORD_FIXED_SZ];
    put_u32(&mut record, 0, length as u32);
    put_u32(&mut record, 4, EVT_SIGNATURE);
    put_u32(&mut record, 8, spec.record_number);
    put_u32(&mut record, 12, spec.time_generated);
    put_u32(&mut record, 16, spec.time_written);
    put_u32(&mut record, 20, spec.event_id);
    put_u16(&mut record, 24, spec.event_type);
    put_u16(&mut record, 26, spec.strings.len() as u16);
    put_u16(&mut record, 28, spec.category);
    put_u16(&mut record, 30, 0);
    put_u32(&mut record, 32, 0);
    put_u32(&mut record, 36, string_offset as u32);
    put_u32(&mut record, 40, spec.sid.len() as u32);
    put_u32(&mut record, 44, sid_offset as u32);
    put_u32(&mut record, 48, spec.data.len() as u32);
    put_u32(&mut record, 52, data_offset as u32);
    record.extend(var);
    record.extend_from_slice(&(length as u32).to_le_bytes());
    assert_eq!(record.len(), length);

    record
}

/// Build `count` default records numbered from `first`.
pub fn build_records(first: u32, count: u32) -> Vec<Bytes> {
    (first..first + count)
        .map(|n| RecordSpec::new(n).build())
        .collect()
}

/// Overwrite a `u32` field of a built record.
pub fn record_set_u32(record: &mut Bytes, at: usize, value: u32) {
    put_u32(record, at, value);
}

/// Overwrite the trailing length of a built record.
pub fn record_set_trailing_length(record: &mut Bytes, value: u32) {
    let at: usize = record.len() - 4;
    put_u32(record, at, value);
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// file builders
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub fn build_header(
    start_offset: u32,
    end_offset: u32,
    current_record_number: u32,
    oldest_record_number: u32,
    max_size: u32,
    flags: u32,
) -> Bytes {
    let mut header: Bytes = vec![0; HEADER_SZ];
    put_u32(&mut header, 0, HEADER_SZ as u32);
    put_u32(&mut header, 4, EVT_SIGNATURE);
    put_u32(&mut header, 8, 1);
    put_u32(&mut header, 12, 1);
    put_u32(&mut header, 16, start_offset);
    put_u32(&mut header, 20, end_offset);
    put_u32(&mut header, 24, current_record_number);
    put_u32(&mut header, 28, oldest_record_number);
    put_u32(&mut header, 32, max_size);
    put_u32(&mut header, 36, flags);
    put_u32(&mut header, 40, 0);
    put_u32(&mut header, 44, HEADER_SZ as u32);

    header
}

pub fn build_eof_record(
    begin_record: u32,
    end_record: u32,
    current_record_number: u32,
    oldest_record_number: u32,
) -> Bytes {
    let mut eof: Bytes = vec![0; EOF_RECORD_SZ];
    put_u32(&mut eof, 0, EOF_RECORD_SZ_U32);
    for (i, marker) in EOF_RECORD_MARKERS.iter().enumerate() {
        put_u32(&mut eof, 4 + i * 4, *marker);
    }
    put_u32(&mut eof, 20, begin_record);
    put_u32(&mut eof, 24, end_record);
    put_u32(&mut eof, 28, current_record_number);
    put_u32(&mut eof, 32, oldest_record_number);
    put_u32(&mut eof, 36, EOF_RECORD_SZ_U32);

    eof
}

/// Oldest and next record numbers of `records`.
fn record_numbers(records: &[Bytes]) -> (u32, u32) {
    let oldest: u32 = records
        .first()
        .and_then(|r| u32_at(r, RECORD_OFFSET_RECORD_NUMBER))
        .unwrap_or(1);
    let current: u32 = records
        .last()
        .and_then(|r| u32_at(r, RECORD_OFFSET_RECORD_NUMBER))
        .map_or(1, |n| n + 1);

    (oldest, current)
}

/// Build an unwrapped file: header, `records`, EOF record.
pub fn build_evt_linear(records: &[Bytes]) -> Bytes {
    let (oldest, current) = record_numbers(records);
    let mut file: Bytes = vec![0; HEADER_SZ];
    for record in records.iter() {
        file.extend_from_slice(record);
    }
    let end: usize = file.len();
    file.extend(build_eof_record(HEADER_SZ as u32, end as u32, current, oldest));
    let header = build_header(HEADER_SZ as u32, end as u32, current, oldest, file.len() as u32, 0);
    file[..HEADER_SZ].copy_from_slice(&header);

    file
}

/// Build a wrapped file. The oldest record begins at physical offset
/// `start`; the records and the EOF record continue past the end of the
/// file to just after the header. `slack` zero bytes lie between the EOF
/// record and `start`. The EOF record may itself be split.
pub fn build_evt_wrapped(
    records: &[Bytes],
    start: usize,
    slack: usize,
) -> Bytes {
    assert_eq!(start % 4, 0, "start must be 4-byte aligned");
    let (oldest, current) = record_numbers(records);
    let mut stream: Bytes = Bytes::new();
    for record in records.iter() {
        stream.extend_from_slice(record);
    }
    let eof_at: usize = stream.len();
    let ringsz: usize = stream.len() + EOF_RECORD_SZ + slack;
    let filesz: usize = HEADER_SZ + ringsz;
    assert!(start >= HEADER_SZ && start < filesz, "bad start {}", start);
    let phys = |at: usize| -> usize { HEADER_SZ + (start - HEADER_SZ + at) % ringsz };
    let end: usize = phys(eof_at);
    stream.extend(build_eof_record(start as u32, end as u32, current, oldest));

    let mut file: Bytes = vec![0; filesz];
    for (at, byte) in stream.iter().enumerate() {
        file[phys(at)] = *byte;
    }
    // wrapped if any byte of the stream continues after the header
    let flags: u32 = match start - HEADER_SZ + stream.len() > ringsz {
        true => HEADER_FLAG_WRAP,
        false => 0,
    };
    let header = build_header(start as u32, end as u32, current, oldest, filesz as u32, flags);
    file[..HEADER_SZ].copy_from_slice(&header);

    file
}

/// Set the `DIRTY` flag and overwrite the header offsets with stale
/// values.
pub fn make_dirty(file: &mut Bytes, stale_start: u32, stale_end: u32) {
    let flags: u32 = u32_at(file, 36).unwrap_or_default();
    put_u32(file, 16, stale_start);
    put_u32(file, 20, stale_end);
    put_u32(file, 36, (flags | HEADER_FLAG_DIRTY) & !HEADER_FLAG_WRAP);
}

/// Physical offsets of each record signature in an unwrapped `file`.
pub fn find_record_offsets(file: &[u8]) -> Vec<usize> {
    let mut offsets: Vec<usize> = Vec::new();
    let mut at: usize = HEADER_SZ;
    while let (Some(length), Some(sig)) = (
        u32_at(file, at + RECORD_OFFSET_LENGTH),
        u32_at(file, at + RECORD_OFFSET_SIGNATURE),
    ) {
        if sig != EVT_SIGNATURE || length == 0 {
            break;
        }
        offsets.push(at);
        at += length as usize;
    }

    offsets
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// temporary files
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub const EVT_5_COUNT: u32 = 5;
pub const EVT_1000_COUNT: u32 = 1000;

lazy_static! {
    /// unwrapped file with 5 records
    pub static ref EVT_5_DATA: Bytes = build_evt_linear(&build_records(1, EVT_5_COUNT));
    pub static ref NTF_EVT_5: NamedTempFile = create_temp_file_bytes(&EVT_5_DATA);
    pub static ref NTF_EVT_5_FPATH: FPath = ntf_fpath(&NTF_EVT_5);

    /// unwrapped file with 1000 records
    pub static ref EVT_1000_DATA: Bytes = build_evt_linear(&build_records(1, EVT_1000_COUNT));
    pub static ref NTF_EVT_1000: NamedTempFile = create_temp_file_bytes(&EVT_1000_DATA);
    pub static ref NTF_EVT_1000_FPATH: FPath = ntf_fpath(&NTF_EVT_1000);

    /// header and EOF record, no records
    pub static ref EVT_EMPTY_DATA: Bytes = build_evt_linear(&[]);
    pub static ref NTF_EVT_EMPTY: NamedTempFile = create_temp_file_bytes(&EVT_EMPTY_DATA);
    pub static ref NTF_EVT_EMPTY_FPATH: FPath = ntf_fpath(&NTF_EVT_EMPTY);

    /// zero bytes
    pub static ref NTF_ZERO: NamedTempFile = create_temp_file_bytes(&[]);
    pub static ref NTF_ZERO_FPATH: FPath = ntf_fpath(&NTF_ZERO);

    /// 5 records with a bad file signature
    pub static ref EVT_BAD_MAGIC_DATA: Bytes = {
        let mut data = EVT_5_DATA.clone();
        data[4..8].copy_from_slice(b"XfLe");
        data
    };
    pub static ref NTF_EVT_BAD_MAGIC: NamedTempFile = create_temp_file_bytes(&EVT_BAD_MAGIC_DATA);
    pub static ref NTF_EVT_BAD_MAGIC_FPATH: FPath = ntf_fpath(&NTF_EVT_BAD_MAGIC);

    /// 5 records; record 3 has a trailing length that disagrees
    pub static ref EVT_5_MISMATCH3_DATA: Bytes = {
        let mut records = build_records(1, EVT_5_COUNT);
        let length = records[2].len() as u32;
        record_set_trailing_length(&mut records[2], length + 4);
        build_evt_linear(&records)
    };
    pub static ref NTF_EVT_5_MISMATCH3: NamedTempFile = create_temp_file_bytes(&EVT_5_MISMATCH3_DATA);
    pub static ref NTF_EVT_5_MISMATCH3_FPATH: FPath = ntf_fpath(&NTF_EVT_5_MISMATCH3);

    /// 8 records wrapped; the oldest record at offset 0x200
    pub static ref EVT_8_WRAPPED_DATA: Bytes = build_evt_wrapped(&build_records(11, 8), 0x200, 0x40);
    pub static ref NTF_EVT_8_WRAPPED: NamedTempFile = create_temp_file_bytes(&EVT_8_WRAPPED_DATA);
    pub static ref NTF_EVT_8_WRAPPED_FPATH: FPath = ntf_fpath(&NTF_EVT_8_WRAPPED);
}
