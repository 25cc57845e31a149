// src/readers/parsecontroller.rs

//! Implements a [`ParseController`], the driver of one parse session.
//!
//! A `ParseController` opens an [`EvtReader`], decodes each record with a
//! [`RecordParser`], and sends a [`ParseNotification`] through a
//! [channel] for each row, each status change, and periodic progress.
//!
//! A session passes through [`ParseState`]s
//!
//! ```text
//! Idle → Opening → Streaming → Completed
//!                            → Failed
//!                            → Cancelled
//! ```
//!
//! `Opening` may go directly to `Failed` or `Cancelled`.
//!
//! [`EvtReader`]: crate::readers::evtreader::EvtReader
//! [`RecordParser`]: crate::readers::recordparser::RecordParser
//! [channel]: self::ChanSendNotification

use std::fmt;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::Arc;
use std::thread;
use std::time::{
    Duration,
    Instant,
};

use ::crossbeam_channel::SendTimeoutError;
#[allow(unused_imports)]
use ::more_asserts::{
    debug_assert_ge,
    debug_assert_le,
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
    Count,
    FPath,
    FileSz,
    ResultS3,
};
use crate::data::datetime::TimeZoneL;
use crate::data::eventrow::EventRow;
use crate::data::evt::EvtError;
use crate::readers::evtreader::EvtReader;
use crate::readers::helpers::basename;
use crate::readers::recordparser::RecordParser;
use crate::readers::summary::SummaryParse;

/// Default for [`ParseConfig::progress_records`].
pub const PROGRESS_RECORDS_DEFAULT: Count = 500;
/// Default for [`ParseConfig::progress_interval`].
pub const PROGRESS_INTERVAL_DEFAULT: Duration = Duration::from_millis(200);
/// Default for [`ParseConfig::channel_capacity`].
pub const CHANNEL_CAPACITY_DEFAULT: usize = 64;
/// Default for [`ParseConfig::send_timeout`].
pub const SEND_TIMEOUT_DEFAULT: Duration = Duration::from_millis(50);

/// State of a parse session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ParseState {
    #[default]
    Idle,
    Opening,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl ParseState {
    /// `Completed`, `Failed`, or `Cancelled`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, ParseState::Completed | ParseState::Failed | ParseState::Cancelled)
    }
}

/// Sent from a [`ParseController`] to the consumer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseNotification {
    /// Human-readable status text.
    Status(String),
    /// `(current, total)` bytes; `current <= total`.
    Progress(u64, u64),
    /// One decoded row.
    Record(EventRow),
}

impl fmt::Display for ParseNotification {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        match self {
            ParseNotification::Status(s) => write!(f, "Status({:?})", s),
            ParseNotification::Progress(cur, total) => write!(f, "Progress({}, {})", cur, total),
            ParseNotification::Record(row) => write!(f, "Record({})", row.record_number()),
        }
    }
}

/// Sender channel used by a [`ParseController`].
pub type ChanSendNotification = crossbeam_channel::Sender<ParseNotification>;

/// Receiver channel used by the consumer.
pub type ChanRecvNotification = crossbeam_channel::Receiver<ParseNotification>;

/// Shared cancellation request. Set by any thread; checked by the
/// `ParseController` once per loop iteration and while waiting to send.
pub type CancelFlag = Arc<AtomicBool>;

/// Create an unset [`CancelFlag`].
pub fn cancel_flag_new() -> CancelFlag {
    Arc::new(AtomicBool::new(false))
}

/// Settings for a parse session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseConfig {
    /// Send `Progress` after at most this many records.
    pub progress_records: Count,
    /// Send `Progress` after at most this much time.
    pub progress_interval: Duration,
    /// Capacity of the channel created by [`ParseController::spawn`].
    pub channel_capacity: usize,
    /// Each wait to send before checking for cancellation.
    pub send_timeout: Duration,
    /// Timezone of rendered dates and times.
    pub tz: TimeZoneL,
}

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            progress_records: PROGRESS_RECORDS_DEFAULT,
            progress_interval: PROGRESS_INTERVAL_DEFAULT,
            channel_capacity: CHANNEL_CAPACITY_DEFAULT,
            send_timeout: SEND_TIMEOUT_DEFAULT,
            tz: TimeZoneL::Local,
        }
    }
}

/// Drives an [`EvtReader`] and a [`RecordParser`] for one file and sends
/// [`ParseNotification`]s.
pub struct ParseController {
    config: ParseConfig,
    cancel: CancelFlag,
    state: ParseState,
    /// The receiver was dropped.
    disconnected: bool,
    /// Last `current` sent in a `Progress`.
    progress_last: Option<u64>,
    summary: SummaryParse,
}

impl fmt::Debug for ParseController {
    fn fmt(
        &self,
        f: &mut fmt::Formatter,
    ) -> fmt::Result {
        f.debug_struct("ParseController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cancelled", &self.is_cancelled())
            .field("records_sent", &self.summary.records_sent)
            .finish()
    }
}

impl ParseController {
    pub fn new(config: ParseConfig) -> ParseController {
        ParseController::with_cancel_flag(config, cancel_flag_new())
    }

    /// Create a `ParseController` that observes a shared `cancel` flag.
    pub fn with_cancel_flag(
        config: ParseConfig,
        cancel: CancelFlag,
    ) -> ParseController {
        ParseController {
            config,
            cancel,
            state: ParseState::Idle,
            disconnected: false,
            progress_last: None,
            summary: SummaryParse::default(),
        }
    }

    pub const fn state(&self) -> ParseState {
        self.state
    }

    pub const fn config(&self) -> &ParseConfig {
        &self.config
    }

    /// A clone of the shared cancel flag; setting it cancels the session.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Cancellation was requested or the receiver was dropped.
    pub fn is_cancelled(&self) -> bool {
        self.disconnected || self.cancel.load(Ordering::Relaxed)
    }

    /// Statistics of the last session.
    pub fn summary(&self) -> SummaryParse {
        self.summary.clone()
    }

    /// Send `notification`, waiting while the channel is full.
    ///
    /// Returns `false` without sending if cancellation was requested while
    /// waiting, or if the receiver was dropped.
    fn chan_send(
        &mut self,
        chan: &ChanSendNotification,
        notification: ParseNotification,
    ) -> bool {
        def1ñ!("({})", notification);
        let mut notification: ParseNotification = notification;
        loop {
            if self.is_cancelled() {
                return false;
            }
            match chan.send_timeout(notification, self.config.send_timeout) {
                Ok(_) => return true,
                Err(SendTimeoutError::Timeout(val)) => notification = val,
                Err(SendTimeoutError::Disconnected(_)) => {
                    def1o!("receiver dropped");
                    self.disconnected = true;
                    return false;
                }
            }
        }
    }

    fn send_status(
        &mut self,
        chan: &ChanSendNotification,
        status: String,
    ) -> bool {
        let ret = self.chan_send(chan, ParseNotification::Status(status));
        if ret {
            self.summary.status_sent += 1;
        }

        ret
    }

    /// Send `Progress` unless `current` was already sent.
    fn send_progress(
        &mut self,
        chan: &ChanSendNotification,
        current: u64,
        total: u64,
    ) -> bool {
        debug_assert_le!(current, total, "progress current > total");
        if let Some(last) = self.progress_last {
            debug_assert_ge!(current, last, "progress went backwards");
            if last == current {
                return true;
            }
        }
        let ret = self.chan_send(chan, ParseNotification::Progress(current, total));
        if ret {
            self.progress_last = Some(current);
            self.summary.progress_sent += 1;
        }

        ret
    }

    /// The final `Status` of a session; one try, it may be dropped if the
    /// consumer is not receiving.
    fn send_status_final(
        &mut self,
        chan: &ChanSendNotification,
        status: String,
    ) {
        if self.disconnected {
            return;
        }
        match chan.send_timeout(ParseNotification::Status(status), self.config.send_timeout) {
            Ok(_) => self.summary.status_sent += 1,
            Err(_err) => {
                def1o!("final status not sent: {}", _err);
            }
        }
    }

    fn set_terminal(
        &mut self,
        state: ParseState,
        started: &Instant,
    ) -> ParseState {
        debug_assert!(state.is_terminal(), "not a terminal state {:?}", state);
        self.state = state;
        self.summary.state = state;
        self.summary.elapsed = started.elapsed();

        state
    }

    fn finish_cancelled(
        &mut self,
        chan: &ChanSendNotification,
        path: &FPath,
        started: &Instant,
    ) -> ParseState {
        def1o!("cancelled {:?}", path);
        let status = format!("Cancelled {} after {} records", path, self.summary.records_sent);
        self.send_status_final(chan, status);

        self.set_terminal(ParseState::Cancelled, started)
    }

    fn finish_failed(
        &mut self,
        chan: &ChanSendNotification,
        path: &FPath,
        err: EvtError,
        started: &Instant,
    ) -> ParseState {
        def1o!("failed {:?} {}", path, err);
        self.summary.error = Some(err.to_string());
        let status = format!("Failed {}: {}", path, err);
        self.send_status_final(chan, status);

        self.set_terminal(ParseState::Failed, started)
    }

    /// Parse the file at `path`, sending notifications to `chan`.
    ///
    /// Returns the terminal state. The file is closed before returning.
    /// Every session ends with one terminal `Status` (unless the receiver
    /// was dropped or the consumer stopped receiving after cancellation).
    pub fn parse(
        &mut self,
        path: &FPath,
        chan: &ChanSendNotification,
    ) -> ParseState {
        def1n!("({:?})", path);
        let started: Instant = Instant::now();
        self.summary = SummaryParse::new(path.clone());
        self.progress_last = None;
        self.disconnected = false;

        self.state = ParseState::Opening;
        if !self.send_status(chan, format!("Opening {}", path)) {
            let state = self.finish_cancelled(chan, path, &started);
            def1x!("return {:?}", state);
            return state;
        }
        let mut evtreader: EvtReader = match EvtReader::new(path.clone()) {
            Ok(val) => val,
            Err(err) => {
                let state = self.finish_failed(chan, path, err, &started);
                def1x!("return {:?}", state);
                return state;
            }
        };
        let total: FileSz = evtreader.total_bytes();
        self.summary.bytes_total = total;
        let mut recordparser = RecordParser::new(self.config.tz);

        self.state = ParseState::Streaming;
        def1o!("Streaming; total {}", total);
        if !self.send_progress(chan, 0, total) {
            let state = self.finish_cancelled(chan, path, &started);
            def1x!("return {:?}", state);
            return state;
        }
        let mut progress_instant: Instant = Instant::now();
        let mut progress_records: Count = 0;

        loop {
            if self.is_cancelled() {
                self.summary.evtreader = Some(evtreader.summary());
                self.summary.bytes_consumed = evtreader.bytes_consumed();
                let state = self.finish_cancelled(chan, path, &started);
                def1x!("return {:?}", state);
                return state;
            }
            let sent: bool = match evtreader.next_record() {
                ResultS3::Found(raw) => match recordparser.decode(&raw) {
                    Ok(row) => {
                        let sent = self.chan_send(chan, ParseNotification::Record(row));
                        if sent {
                            self.summary.records_sent += 1;
                            progress_records += 1;
                        }
                        sent
                    }
                    Err(err) => {
                        self.summary.decode_errors += 1;
                        self.send_status(chan, format!("Skipped record: {}", err))
                    }
                },
                ResultS3::Done => break,
                ResultS3::Err(err) if err.is_corruption() => {
                    self.summary.corruptions += 1;
                    self.send_status(chan, format!("Skipped: {}", err))
                }
                ResultS3::Err(err) => {
                    self.summary.evtreader = Some(evtreader.summary());
                    self.summary.bytes_consumed = evtreader.bytes_consumed();
                    let state = self.finish_failed(chan, path, err, &started);
                    def1x!("return {:?}", state);
                    return state;
                }
            };
            if !sent {
                continue;
            }
            if progress_records >= self.config.progress_records
                || progress_instant.elapsed() >= self.config.progress_interval
            {
                let current: u64 = evtreader.bytes_consumed();
                if !self.send_progress(chan, current, total) {
                    continue;
                }
                progress_records = 0;
                progress_instant = Instant::now();
            }
        }

        self.summary.evtreader = Some(evtreader.summary());
        self.summary.bytes_consumed = evtreader.bytes_consumed();
        debug_assert_eq!(self.summary.bytes_consumed, total);
        if !self.send_progress(chan, total, total) {
            let state = self.finish_cancelled(chan, path, &started);
            def1x!("return {:?}", state);
            return state;
        }
        drop(evtreader);
        let status = format!("Completed {}: {} records", path, self.summary.records_sent);
        self.send_status_final(chan, status);
        let state = self.set_terminal(ParseState::Completed, &started);
        def1x!("return {:?}", state);

        state
    }

    /// Run a session for `path` on a new named thread.
    ///
    /// Returns the thread handle, which yields the [`SummaryParse`], and the
    /// receiving end of a bounded channel of `config.channel_capacity`.
    pub fn spawn(
        path: FPath,
        config: ParseConfig,
        cancel: CancelFlag,
    ) -> std::io::Result<(thread::JoinHandle<SummaryParse>, ChanRecvNotification)> {
        defn!("({:?})", path);
        let (chan_send, chan_recv) =
            crossbeam_channel::bounded::<ParseNotification>(std::cmp::max(config.channel_capacity, 1));
        let thread_name: String = format!("elp_{}", basename(&path));
        let handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || -> SummaryParse {
                let mut controller = ParseController::with_cancel_flag(config, cancel);
                controller.parse(&path, &chan_send);

                controller.summary()
            })?;
        defx!();

        Ok((handle, chan_recv))
    }
}
