// src/readers/evtreader.rs

//! Implements an [`EvtReader`], a cursor over the records of a legacy
//! Windows Event Log `.evt` file.
//!
//! The `EvtReader` validates the [`EvtFileHeader`], then yields one
//! [`EvtRawRecord`] at a time in logical (oldest to newest) order. It knows
//! the circular buffer layout of the file and attempts to resynchronize after
//! finding a corrupt record.
//!
//! Records are not decoded here; that is done by a [`RecordParser`].
//!
//! _XXX: not a rust "Reader"; does not implement trait [`Read`]._
//!
//! [`EvtFileHeader`]: crate::data::evt::EvtFileHeader
//! [`EvtRawRecord`]: crate::data::evt::EvtRawRecord
//! [`RecordParser`]: crate::readers::recordparser::RecordParser
//! [`Read`]: std::io::Read

use std::fmt;
use std::io::{
    ErrorKind,
    Read,
    Seek,
    SeekFrom,
};

#[allow(unused_imports)]
use ::more_asserts::{
    debug_assert_ge,
    debug_assert_le,
    debug_assert_lt,
};
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
    def1n,
    def1o,
    def1x,
    def1ñ,
};

use crate::common::{
    Bytes,
    Count,
    FPath,
    File,
    FileMetadata,
    FileOffset,
    FileOpenOptions,
    FileSz,
    ResultS3,
};
use crate::data::evt::{
    u32_at,
    EvtEofRecord,
    EvtError,
    EvtFileHeader,
    EvtRawRecord,
    EOF_RECORD_SZ,
    EVT_SIGNATURE,
    FIELD_SZ,
    HEADER_SZ,
    HEADER_SZ_FO,
    PADDING_DWORD,
    RECORD_SZ_MIN,
};
use crate::{de_err, de_wrn};

/// Size of each read when scanning for a record boundary.
pub const SCAN_BLOCKSZ: usize = 0x10000;

const FIELD_SZ_FO: FileOffset = FIELD_SZ as FileOffset;

/// [`EvtReader::next_record`] result.
pub type ResultS3EvtRawRecord = ResultS3<EvtRawRecord, EvtError>;

/// A contiguous range of the file that is read in order, `[beg, end)`.
///
/// An unwrapped file has one segment, from the oldest record to the end of
/// the file. A wrapped file has a second segment, from the end of the header
/// to the oldest record.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Segment {
    pub beg: FileOffset,
    pub end: FileOffset,
}

impl Segment {
    pub const fn len(&self) -> FileSz {
        self.end.saturating_sub(self.beg)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A cursor over the records of an `.evt` file.
///
/// The open [`File`] is owned by the `EvtReader` and is closed when the
/// `EvtReader` is dropped.
pub struct EvtReader {
    path: FPath,
    file: File,
    filesz: FileSz,
    header: EvtFileHeader,
    /// The EOF record, if it was found.
    eof_record: Option<EvtEofRecord>,
    /// Logical segments of the file, in reading order.
    segments: Vec<Segment>,
    /// Index into `segments` of the current segment.
    segment_index: usize,
    /// Physical file offset of the next read.
    fileoffset: FileOffset,
    /// Bytes of the file accounted for so far; header, records, skipped
    /// bytes, and filler.
    bytes_consumed: FileSz,
    /// All records have been read.
    done: bool,
    /// Is the circular buffer wrapped?
    wrapped: bool,
    /// `Count` of records returned.
    pub(super) records_found: Count,
    /// `Count` of records reassembled from both ends of the buffer.
    pub(super) records_stitched: Count,
    /// `Count` of corrupt records found.
    pub(super) corruptions: Count,
    /// Bytes passed over during resynchronization.
    pub(super) bytes_skipped: FileSz,
    /// The last [`Error`], if any, as a `String`
    ///
    /// [`Error`]: std::io::Error
    error: Option<String>,
}

impl fmt::Debug for EvtReader {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("EvtReader")
            .field("Path", &self.path)
            .field("filesz", &self.filesz)
            .field("header", &self.header)
            .field("segments", &self.segments)
            .field("fileoffset", &self.fileoffset)
            .field("bytes_consumed", &self.bytes_consumed)
            .field("records_found", &self.records_found)
            .field("corruptions", &self.corruptions)
            .field("Error?", &self.error)
            .finish()
    }
}

/// Statistics of an [`EvtReader`], for `--summary`.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct SummaryEvtReader {
    pub filesz: FileSz,
    pub records_found: Count,
    pub records_stitched: Count,
    pub corruptions: Count,
    pub bytes_skipped: FileSz,
    pub wrapped: bool,
    pub dirty: bool,
    pub header: EvtFileHeader,
}

/// Map an error from opening `path` to an [`EvtError`].
fn open_error_to_evterror(
    path: &FPath,
    err: std::io::Error,
) -> EvtError {
    match err.kind() {
        ErrorKind::NotFound => EvtError::NotFound(path.clone()),
        ErrorKind::PermissionDenied => EvtError::Access(path.clone(), err.to_string()),
        _ => EvtError::Io(err),
    }
}

impl EvtReader {
    /// Open the `.evt` file at `path` and check its header.
    ///
    /// Fails with `EvtError::NotFound`, `EvtError::Access` (also for a path
    /// that is not a regular file), or `EvtError::Format` for a bad header.
    pub fn new(path: FPath) -> Result<EvtReader, EvtError> {
        def1n!("({:?})", path);

        let metadata: FileMetadata = match std::fs::metadata(&path) {
            Ok(val) => val,
            Err(err) => {
                def1x!("metadata({:?}) error {}", path, err);
                return Err(open_error_to_evterror(&path, err));
            }
        };
        if !metadata.is_file() {
            def1x!("not a file {:?}", path);
            return Err(EvtError::Access(path.clone(), String::from("not a regular file")));
        }
        let mut open_options = FileOpenOptions::new();
        def1o!("open_options.read(true).open({:?})", path);
        let mut file: File = match open_options
            .read(true)
            .open(&path)
        {
            Ok(val) => val,
            Err(err) => {
                def1x!("open({:?}) error {}", path, err);
                return Err(open_error_to_evterror(&path, err));
            }
        };
        let filesz: FileSz = metadata.len() as FileSz;
        def1o!("filesz {}", filesz);

        let header_len: usize = std::cmp::min(filesz, HEADER_SZ_FO) as usize;
        let mut buffer: Bytes = vec![0; header_len];
        if let Err(err) = file.read_exact(&mut buffer) {
            def1x!("read_exact error {}", err);
            return Err(open_error_to_evterror(&path, err));
        }
        let header: EvtFileHeader = match EvtFileHeader::from_buffer(&buffer) {
            Ok(val) => val,
            Err(err) => {
                def1x!("return {}", err);
                return Err(err);
            }
        };
        def1o!("header {:?}", header);
        if !header.is_version_known() {
            de_wrn!(
                "unexpected version {}.{} in {:?}",
                header.major_version, header.minor_version, path,
            );
        }

        let mut evtreader = EvtReader {
            path,
            file,
            filesz,
            header,
            eof_record: None,
            segments: Vec::with_capacity(2),
            segment_index: 0,
            fileoffset: HEADER_SZ_FO,
            bytes_consumed: HEADER_SZ_FO,
            done: false,
            wrapped: false,
            records_found: 0,
            records_stitched: 0,
            corruptions: 0,
            bytes_skipped: 0,
            error: None,
        };
        evtreader.layout()?;
        def1x!("return Ok(EvtReader) segments {:?}", evtreader.segments);

        Ok(evtreader)
    }

    /// Determine the logical segments of the file from the header, or from
    /// the EOF record if the header is dirty.
    fn layout(&mut self) -> Result<(), EvtError> {
        defn!();
        let mut start: FileOffset = self.header.start_offset as FileOffset;
        let mut end: FileOffset = self.header.end_offset as FileOffset;
        if self.header.is_dirty() {
            defo!("header is dirty; search for the EOF record");
            match self.find_eof_record()? {
                Some((fo, eof)) => {
                    defo!("found EOF record at {} {:?}", fo, eof);
                    start = eof.begin_record as FileOffset;
                    end = fo;
                    self.eof_record = Some(eof);
                }
                None => {
                    de_wrn!("dirty header and no EOF record found in {:?}", self.path);
                }
            }
        }
        if start < HEADER_SZ_FO || start >= self.filesz {
            if self.filesz > HEADER_SZ_FO {
                de_wrn!(
                    "start offset {} out of bounds [{}, {}) in {:?}; use {}",
                    start, HEADER_SZ, self.filesz, self.path, HEADER_SZ,
                );
            }
            start = HEADER_SZ_FO;
        }
        self.wrapped = self.header.flags & crate::data::evt::HEADER_FLAG_WRAP != 0 || end < start;
        self.segments.clear();
        self.segments.push(Segment { beg: start, end: self.filesz });
        if self.wrapped && start > HEADER_SZ_FO {
            self.segments.push(Segment { beg: HEADER_SZ_FO, end: start });
        }
        self.segments.retain(|seg| !seg.is_empty());
        let segments_len: FileSz = self.segments.iter().map(|seg| seg.len()).sum();
        debug_assert_le!(segments_len, self.filesz);
        self.bytes_consumed = self.filesz - segments_len;
        self.segment_index = 0;
        match self.segments.first() {
            Some(seg) => self.fileoffset = seg.beg,
            None => self.finish(),
        }
        defx!("wrapped {}, segments {:?}", self.wrapped, self.segments);

        Ok(())
    }

    /// Search the file for an `ELF_EOF_RECORD`. Return its offset and
    /// contents.
    fn find_eof_record(&mut self) -> Result<Option<(FileOffset, EvtEofRecord)>, EvtError> {
        defn!();
        let mut at: FileOffset = HEADER_SZ_FO;
        while at + EOF_RECORD_SZ as FileOffset <= self.filesz {
            let len: usize = std::cmp::min(SCAN_BLOCKSZ as FileSz, self.filesz - at) as usize;
            let block: Bytes = self.read_at(at, len)?;
            let mut i: usize = 0;
            while i + EOF_RECORD_SZ <= block.len() {
                if let Some(eof) = EvtEofRecord::from_buffer(&block[i..]) {
                    let fo: FileOffset = at + i as FileOffset;
                    if (eof.begin_record as FileOffset) < self.filesz {
                        defx!("return {} {:?}", fo, eof);
                        return Ok(Some((fo, eof)));
                    }
                }
                i += FIELD_SZ;
            }
            if i == 0 {
                break;
            }
            at += i as FileOffset;
        }
        defx!("return None");

        Ok(None)
    }

    /// Read `len` bytes at `fileoffset`.
    fn read_at(
        &mut self,
        fileoffset: FileOffset,
        len: usize,
    ) -> std::io::Result<Bytes> {
        self.file.seek(SeekFrom::Start(fileoffset))?;
        let mut buffer: Bytes = vec![0; len];
        self.file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    /// Read up to `len` bytes at `fileoffset` before `end`. In the first
    /// segment of a wrapped file the bytes continue at the beginning of the
    /// second segment.
    fn read_logical(
        &mut self,
        fileoffset: FileOffset,
        len: usize,
        end: FileOffset,
    ) -> std::io::Result<Bytes> {
        let remain: FileSz = end.saturating_sub(fileoffset);
        let mut buffer: Bytes = self.read_at(fileoffset, std::cmp::min(remain, len as FileSz) as usize)?;
        if buffer.len() < len && self.can_stitch() {
            if let Some(seg2) = self.segments.get(1).copied() {
                let more: usize = std::cmp::min((len - buffer.len()) as FileSz, seg2.len()) as usize;
                let head: Bytes = self.read_at(seg2.beg, more)?;
                buffer.extend_from_slice(&head);
            }
        }

        Ok(buffer)
    }

    /// Move the cursor forward within the current segment.
    fn advance_to(
        &mut self,
        fileoffset: FileOffset,
    ) {
        debug_assert_ge!(fileoffset, self.fileoffset, "cursor cannot move backwards");
        self.bytes_consumed += fileoffset - self.fileoffset;
        self.fileoffset = fileoffset;
        debug_assert_le!(self.bytes_consumed, self.filesz);
    }

    /// Pass over the remainder of the current segment and move to the
    /// beginning of the next.
    fn next_segment(&mut self) {
        if let Some(seg) = self.segments.get(self.segment_index) {
            let end: FileOffset = seg.end;
            if self.fileoffset < end {
                self.advance_to(end);
            }
        }
        self.segment_index += 1;
        match self.segments.get(self.segment_index) {
            Some(seg) => {
                defñ!("segment {} {:?}", self.segment_index, seg);
                self.fileoffset = seg.beg;
            }
            None => self.finish(),
        }
    }

    /// All records have been read.
    fn finish(&mut self) {
        self.done = true;
        self.bytes_consumed = self.filesz;
    }

    /// Is the cursor in the first segment of a wrapped file, where a record
    /// may continue at the beginning of the second segment?
    fn can_stitch(&self) -> bool {
        self.wrapped && self.segment_index == 0 && self.segments.len() > 1
    }

    /// Does a record, or the EOF record, begin at `fileoffset`?
    ///
    /// A record must have the signature, a plausible length that fits before
    /// `end`, and a matching trailing length.
    fn is_boundary(
        &mut self,
        fileoffset: FileOffset,
        end: FileOffset,
    ) -> std::io::Result<bool> {
        if fileoffset >= end {
            return Ok(false);
        }
        let remain: FileSz = end - fileoffset;
        let head: Bytes = self.read_logical(fileoffset, 20, end)?;
        if head.len() < 8 {
            return Ok(false);
        }
        if EvtEofRecord::is_eof_record(&head) {
            return Ok(true);
        }
        let length: u32 = u32_at(&head, 0).unwrap_or_default();
        if u32_at(&head, 4) != Some(EVT_SIGNATURE) || (length as usize) < RECORD_SZ_MIN {
            return Ok(false);
        }
        if length as FileSz > remain {
            // a record continuing past the end of the buffer; checked when
            // it is reassembled
            return Ok(self.can_stitch()
                && length as FileSz <= remain + self.segments.get(1).map_or(0, |seg| seg.len()));
        }
        let trailing: Bytes = self.read_at(fileoffset + length as FileOffset - FIELD_SZ_FO, FIELD_SZ)?;

        Ok(u32_at(&trailing, 0) == Some(length))
    }

    /// Find the next record boundary after a corrupt record at `fileoffset`
    /// with leading length `length`, within the current segment.
    ///
    /// First try `fileoffset + length`. Else scan forward one field at a
    /// time. Else return the end of the segment.
    fn resync_offset(
        &mut self,
        fileoffset: FileOffset,
        length: u32,
        end: FileOffset,
    ) -> std::io::Result<FileOffset> {
        defn!("({}, {}, {})", fileoffset, length, end);
        if length as usize >= RECORD_SZ_MIN {
            let candidate: FileOffset = fileoffset + length as FileOffset;
            if self.is_boundary(candidate, end)? {
                defx!("return {} (leading length)", candidate);
                return Ok(candidate);
            }
        }
        let mut at: FileOffset = fileoffset + FIELD_SZ_FO;
        while at + 8 <= end {
            let len: usize = std::cmp::min(SCAN_BLOCKSZ as FileSz, end - at) as usize;
            let block: Bytes = self.read_at(at, len)?;
            let mut i: usize = 0;
            while i + 8 <= block.len() {
                let dword0: u32 = u32_at(&block, i).unwrap_or_default();
                let dword1: u32 = u32_at(&block, i + 4).unwrap_or_default();
                if dword1 == EVT_SIGNATURE
                    || (dword0 as usize == EOF_RECORD_SZ && dword1 == crate::data::evt::EOF_RECORD_MARKERS[0])
                {
                    let candidate: FileOffset = at + i as FileOffset;
                    if self.is_boundary(candidate, end)? {
                        defx!("return {} (scan)", candidate);
                        return Ok(candidate);
                    }
                }
                i += FIELD_SZ;
            }
            if i == 0 {
                break;
            }
            at += i as FileOffset;
        }
        defx!("return {} (segment end)", end);

        Ok(end)
    }

    /// Record a corruption at `fileoffset`, resynchronize the cursor, and
    /// return the error to pass to the caller.
    fn corruption(
        &mut self,
        fileoffset: FileOffset,
        length: u32,
        reason: String,
    ) -> ResultS3EvtRawRecord {
        def1n!("({}, {}, {:?})", fileoffset, length, reason);
        let seg: Segment = match self.segments.get(self.segment_index) {
            Some(seg) => *seg,
            None => {
                self.corruptions += 1;
                self.finish();
                return ResultS3::Err(EvtError::corruption(fileoffset, reason));
            }
        };
        let resync: FileOffset = match self.resync_offset(fileoffset, length, seg.end) {
            Ok(val) => val,
            Err(err) => {
                de_err!("resync_offset error {} for {:?}", err, self.path);
                self.error = Some(err.to_string());
                def1x!("return Err(Io)");
                return ResultS3::Err(EvtError::Io(err));
            }
        };
        def1x!("resync to {}", resync);

        self.skip_corrupt(fileoffset, resync, seg, reason)
    }

    /// Count a corruption at `fileoffset` and move the cursor to `resync`
    /// within `seg`, or to the next segment.
    fn skip_corrupt(
        &mut self,
        fileoffset: FileOffset,
        resync: FileOffset,
        seg: Segment,
        reason: String,
    ) -> ResultS3EvtRawRecord {
        debug_assert_ge!(resync, fileoffset);
        self.corruptions += 1;
        self.bytes_skipped += resync - fileoffset;
        if resync >= seg.end {
            self.next_segment();
        } else {
            self.advance_to(resync);
        }

        ResultS3::Err(EvtError::corruption(fileoffset, reason))
    }

    /// Reassemble a record that begins at `fileoffset` near the end of the
    /// first segment and continues at the beginning of the second segment.
    fn stitch_record(
        &mut self,
        fileoffset: FileOffset,
        length: u32,
    ) -> ResultS3EvtRawRecord {
        defn!("({}, {})", fileoffset, length);
        let seg1: Segment = self.segments[0];
        let seg2: Segment = self.segments[1];
        let tail_len: FileSz = seg1.end - fileoffset;
        let head_len: FileSz = length as FileSz - tail_len;
        if head_len > seg2.len() {
            defx!("head_len {} > segment 2 len {}", head_len, seg2.len());
            return self.corruption(
                fileoffset,
                length,
                format!("record length {} exceeds the remaining bytes {}", length, tail_len + seg2.len()),
            );
        }
        let mut data: Bytes = match self.read_at(fileoffset, tail_len as usize) {
            Ok(val) => val,
            Err(err) => return ResultS3::Err(EvtError::Io(err)),
        };
        match self.read_at(seg2.beg, head_len as usize) {
            Ok(val) => data.extend_from_slice(&val),
            Err(err) => return ResultS3::Err(EvtError::Io(err)),
        }
        let signature: u32 = u32_at(&data, 4).unwrap_or_default();
        if signature != EVT_SIGNATURE {
            defx!("bad signature {:#010x}", signature);
            return self.corruption(
                fileoffset,
                length,
                format!("bad wrapped record signature {:#010x}", signature),
            );
        }
        let trailing: u32 = u32_at(&data, data.len() - FIELD_SZ).unwrap_or_default();
        if trailing != length {
            defx!("trailing length {} != {}", trailing, length);
            return self.corruption(
                fileoffset,
                length,
                format!("wrapped record leading length {} != trailing length {}", length, trailing),
            );
        }
        self.advance_to(seg1.end);
        self.next_segment();
        self.advance_to(seg2.beg + head_len);
        self.records_found += 1;
        self.records_stitched += 1;
        defx!("return Found; stitched {} + {}", tail_len, head_len);

        ResultS3::Found(EvtRawRecord::new(fileoffset, data))
    }

    /// Return the next record in logical order.
    ///
    /// `Done` at the EOF record or after the last segment.
    /// `Err(EvtError::Corruption)` when a record is inconsistent; the cursor
    /// has already moved past it so the next call continues the stream.
    /// `Err(EvtError::Io)` when reading fails.
    pub fn next_record(&mut self) -> ResultS3EvtRawRecord {
        loop {
            if self.done {
                def1ñ!("return Done");
                return ResultS3::Done;
            }
            let seg: Segment = match self.segments.get(self.segment_index) {
                Some(seg) => *seg,
                None => {
                    self.finish();
                    continue;
                }
            };
            let fileoffset: FileOffset = self.fileoffset;
            debug_assert_le!(fileoffset, seg.end);
            let remain: FileSz = seg.end - fileoffset;
            if remain < FIELD_SZ_FO {
                self.next_segment();
                continue;
            }
            // the EOF record may continue past the end of the buffer
            let head: Bytes = match self.read_logical(fileoffset, 20, seg.end) {
                Ok(val) => val,
                Err(err) => {
                    de_err!("read_at({}) error {} for {:?}", fileoffset, err, self.path);
                    self.error = Some(err.to_string());
                    return ResultS3::Err(EvtError::Io(err));
                }
            };
            let length: u32 = u32_at(&head, 0).unwrap_or_default();
            if length == 0 || length == PADDING_DWORD {
                // filler ends the segment only if no record follows it
                let resync: FileOffset = match self.resync_offset(fileoffset, 0, seg.end) {
                    Ok(val) => val,
                    Err(err) => {
                        de_err!("resync_offset error {} for {:?}", err, self.path);
                        self.error = Some(err.to_string());
                        return ResultS3::Err(EvtError::Io(err));
                    }
                };
                if resync >= seg.end {
                    defo!("filler {:#x} at {}; end of segment {}", length, fileoffset, self.segment_index);
                    self.next_segment();
                    continue;
                }
                defo!("filler {:#x} at {} followed by a record at {}", length, fileoffset, resync);
                return self.skip_corrupt(
                    fileoffset,
                    resync,
                    seg,
                    format!("record length {:#x} followed by a record at {}", length, resync),
                );
            }
            if EvtEofRecord::is_eof_record(&head) {
                if let Ok(buffer) = self.read_logical(fileoffset, EOF_RECORD_SZ, seg.end) {
                    self.eof_record = EvtEofRecord::from_buffer(&buffer);
                }
                def1ñ!("EOF record at {}; return Done", fileoffset);
                self.finish();
                return ResultS3::Done;
            }
            if head.len() >= 8 {
                let signature: u32 = u32_at(&head, 4).unwrap_or_default();
                if signature != EVT_SIGNATURE {
                    return self.corruption(
                        fileoffset,
                        length,
                        format!("bad record signature {:#010x}", signature),
                    );
                }
            }
            if (length as usize) < RECORD_SZ_MIN {
                return self.corruption(
                    fileoffset,
                    length,
                    format!("record length {} is less than the minimum {}", length, RECORD_SZ_MIN),
                );
            }
            if length as FileSz > remain {
                if self.can_stitch() {
                    return self.stitch_record(fileoffset, length);
                }
                return self.corruption(
                    fileoffset,
                    length,
                    format!("record length {} exceeds the remaining bytes {}", length, remain),
                );
            }
            let data: Bytes = match self.read_at(fileoffset, length as usize) {
                Ok(val) => val,
                Err(err) => {
                    de_err!("read_at({}, {}) error {} for {:?}", fileoffset, length, err, self.path);
                    self.error = Some(err.to_string());
                    return ResultS3::Err(EvtError::Io(err));
                }
            };
            let trailing: u32 = u32_at(&data, data.len() - FIELD_SZ).unwrap_or_default();
            if trailing != length {
                return self.corruption(
                    fileoffset,
                    length,
                    format!("leading length {} != trailing length {}", length, trailing),
                );
            }
            self.advance_to(fileoffset + length as FileOffset);
            self.records_found += 1;
            def1ñ!("return Found record at {} len {}", fileoffset, length);

            return ResultS3::Found(EvtRawRecord::new(fileoffset, data));
        }
    }

    #[inline(always)]
    pub const fn path(&self) -> &FPath {
        &self.path
    }

    #[inline(always)]
    pub const fn header(&self) -> &EvtFileHeader {
        &self.header
    }

    #[inline(always)]
    pub const fn eof_record(&self) -> Option<&EvtEofRecord> {
        self.eof_record.as_ref()
    }

    #[inline(always)]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline(always)]
    pub const fn is_wrapped(&self) -> bool {
        self.wrapped
    }

    #[inline(always)]
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Bytes of the file accounted for so far. Never decreases.
    #[inline(always)]
    pub const fn bytes_consumed(&self) -> FileSz {
        self.bytes_consumed
    }

    /// File size in bytes. Constant.
    #[inline(always)]
    pub const fn total_bytes(&self) -> FileSz {
        self.filesz
    }

    #[inline(always)]
    pub const fn filesz(&self) -> FileSz {
        self.filesz
    }

    #[inline(always)]
    pub const fn count_records_found(&self) -> Count {
        self.records_found
    }

    #[inline(always)]
    pub const fn count_corruptions(&self) -> Count {
        self.corruptions
    }

    /// Return an up-to-date `SummaryEvtReader` for this `EvtReader`.
    pub fn summary(&self) -> SummaryEvtReader {
        SummaryEvtReader {
            filesz: self.filesz,
            records_found: self.records_found,
            records_stitched: self.records_stitched,
            corruptions: self.corruptions,
            bytes_skipped: self.bytes_skipped,
            wrapped: self.wrapped,
            dirty: self.header.is_dirty(),
            header: self.header,
        }
    }
}
