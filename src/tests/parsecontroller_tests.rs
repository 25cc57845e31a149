// src/tests/parsecontroller_tests.rs

//! tests for `parsecontroller.rs`

#![allow(non_snake_case)]

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::common::{
    Count,
    FPath,
    FileSz,
};
use crate::data::eventrow::EventRow;
use crate::data::evt::{
    RECORD_OFFSET_LENGTH,
    RECORD_OFFSET_STRING_OFFSET,
};
use crate::debug::helpers::{
    create_temp_file_bytes,
    ntf_fpath,
};
use crate::readers::parsecontroller::{
    cancel_flag_new,
    ChanRecvNotification,
    ParseConfig,
    ParseController,
    ParseNotification,
    ParseState,
};
use crate::readers::summary::SummaryParse;
use crate::tests::common::{
    build_evt_linear,
    build_records,
    record_set_u32,
    tz_utc,
    EVT_1000_COUNT,
    EVT_1000_DATA,
    EVT_5_COUNT,
    EVT_5_DATA,
    FPATH_NOT_EXIST,
    NTF_EVT_1000_FPATH,
    NTF_EVT_5_FPATH,
    NTF_EVT_5_MISMATCH3_FPATH,
    NTF_EVT_8_WRAPPED_FPATH,
    NTF_EVT_BAD_MAGIC_FPATH,
    NTF_EVT_EMPTY_FPATH,
};

use ::more_asserts::{
    assert_ge,
    assert_gt,
    assert_le,
};
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};
use ::test_case::test_case;

fn config() -> ParseConfig {
    ParseConfig {
        tz: tz_utc(),
        ..Default::default()
    }
}

/// Parse `path` on this thread into an unbounded channel and collect every
/// notification.
fn parse_collect(
    path: &FPath,
    config: ParseConfig,
) -> (ParseState, Vec<ParseNotification>, SummaryParse) {
    let (chan_send, chan_recv) = crossbeam_channel::unbounded::<ParseNotification>();
    let mut controller = ParseController::new(config);
    assert_eq!(controller.state(), ParseState::Idle);
    let state = controller.parse(path, &chan_send);
    assert_eq!(controller.state(), state);
    drop(chan_send);
    let notifications: Vec<ParseNotification> = chan_recv.iter().collect();

    (state, notifications, controller.summary())
}

fn records(notifications: &[ParseNotification]) -> Vec<EventRow> {
    notifications
        .iter()
        .filter_map(|n| match n {
            ParseNotification::Record(row) => Some(row.clone()),
            _ => None,
        })
        .collect()
}

fn progresses(notifications: &[ParseNotification]) -> Vec<(u64, u64)> {
    notifications
        .iter()
        .filter_map(|n| match n {
            ParseNotification::Progress(cur, total) => Some((*cur, *total)),
            _ => None,
        })
        .collect()
}

fn statuses(notifications: &[ParseNotification]) -> Vec<String> {
    notifications
        .iter()
        .filter_map(|n| match n {
            ParseNotification::Status(s) => Some(s.clone()),
            _ => None,
        })
        .collect()
}

fn record_numbers(notifications: &[ParseNotification]) -> Vec<u32> {
    records(notifications)
        .iter()
        .map(|row| row.record_number())
        .collect()
}

#[test]
fn test_ParseState_is_terminal() {
    assert!(!ParseState::Idle.is_terminal());
    assert!(!ParseState::Opening.is_terminal());
    assert!(!ParseState::Streaming.is_terminal());
    assert!(ParseState::Completed.is_terminal());
    assert!(ParseState::Failed.is_terminal());
    assert!(ParseState::Cancelled.is_terminal());
}

#[test]
fn test_ParseNotification_display() {
    assert_eq!(ParseNotification::Progress(1, 2).to_string(), "Progress(1, 2)");
    assert_eq!(ParseNotification::Status(String::from("a")).to_string(), "Status(\"a\")");
}

#[test]
fn test_parse_5() {
    let path: &FPath = &NTF_EVT_5_FPATH;
    let (state, notifications, summary) = parse_collect(path, config());
    assert_eq!(state, ParseState::Completed);
    assert_eq!(record_numbers(&notifications), vec![1, 2, 3, 4, 5]);

    let statuses = statuses(&notifications);
    assert_eq!(statuses.first(), Some(&format!("Opening {}", path)));
    assert_eq!(statuses.last(), Some(&format!("Completed {}: {} records", path, EVT_5_COUNT)));
    // the first notification is the "Opening" status, the last is the terminal status
    assert!(matches!(notifications.first(), Some(ParseNotification::Status(_))));
    assert!(matches!(notifications.last(), Some(ParseNotification::Status(_))));

    let total = EVT_5_DATA.len() as u64;
    let progresses = progresses(&notifications);
    assert_eq!(progresses.first(), Some(&(0, total)));
    assert_eq!(progresses.last(), Some(&(total, total)));

    assert_eq!(summary.state, ParseState::Completed);
    assert_eq!(summary.records_sent, EVT_5_COUNT as Count);
    assert_eq!(summary.corruptions, 0);
    assert_eq!(summary.decode_errors, 0);
    assert_eq!(summary.bytes_consumed, summary.bytes_total);
    assert_eq!(summary.bytes_total, total as FileSz);
    assert!(summary.evtreader.is_some());
    assert!(summary.error.is_none());
}

#[test_case(1)]
#[test_case(7)]
#[test_case(100)]
#[test_case(5000)]
fn test_parse_1000_progress(progress_records: Count) {
    let config = ParseConfig {
        progress_records,
        progress_interval: Duration::from_secs(3600),
        ..config()
    };
    let (state, notifications, summary) = parse_collect(&NTF_EVT_1000_FPATH, config);
    assert_eq!(state, ParseState::Completed);
    assert_eq!(records(&notifications).len(), EVT_1000_COUNT as usize);

    let total = EVT_1000_DATA.len() as u64;
    let progresses = progresses(&notifications);
    assert_eq!(progresses[0], (0, total));
    assert_eq!(progresses[progresses.len() - 1], (total, total));
    for pair in progresses.windows(2) {
        // strictly increasing; duplicate values are not sent
        assert_gt!(pair[1].0, pair[0].0, "progress {:?}", pair);
        assert_eq!(pair[1].1, total);
    }
    for (cur, total_) in progresses.iter() {
        assert_le!(cur, total_);
    }
    // one per `progress_records` records, plus the first and the last
    let expect_min: usize = std::cmp::min(EVT_1000_COUNT as usize / progress_records as usize, 999) + 1;
    assert_ge!(progresses.len(), expect_min);
    assert_eq!(summary.progress_sent, progresses.len() as Count);
}

#[test]
fn test_parse_progress_interleaved() {
    let config = ParseConfig {
        progress_records: 10,
        ..config()
    };
    let (_state, notifications, _summary) = parse_collect(&NTF_EVT_1000_FPATH, config);
    // no more than `progress_records` records between two `Progress`
    let mut since: Count = 0;
    for notification in notifications.iter() {
        match notification {
            ParseNotification::Record(_) => {
                since += 1;
                assert_le!(since, 10);
            }
            ParseNotification::Progress(..) => since = 0,
            ParseNotification::Status(_) => {}
        }
    }
}

#[test]
fn test_parse_empty() {
    let (state, notifications, summary) = parse_collect(&NTF_EVT_EMPTY_FPATH, config());
    assert_eq!(state, ParseState::Completed);
    assert!(records(&notifications).is_empty());
    let progresses = progresses(&notifications);
    let total = summary.bytes_total;
    assert_eq!(progresses, vec![(0, total), (total, total)]);
    assert!(statuses(&notifications).last().unwrap().starts_with("Completed"));
}

#[test]
fn test_parse_length_mismatch() {
    let (state, notifications, summary) = parse_collect(&NTF_EVT_5_MISMATCH3_FPATH, config());
    assert_eq!(state, ParseState::Completed);
    assert_eq!(record_numbers(&notifications), vec![1, 2, 4, 5]);
    let statuses = statuses(&notifications);
    assert_eq!(
        statuses.iter().filter(|s| s.starts_with("Skipped: ")).count(),
        1,
        "statuses {:?}",
        statuses
    );
    assert!(statuses.last().unwrap().ends_with(": 4 records"));
    assert_eq!(summary.corruptions, 1);
    assert_eq!(summary.records_sent, 4);
}

#[test_case(0; "zero")]
#[test_case(0x27; "padding value")]
fn test_parse_leading_length_filler_value(length: u32) {
    let mut records = build_records(1, EVT_5_COUNT);
    record_set_u32(&mut records[2], RECORD_OFFSET_LENGTH, length);
    let ntf = create_temp_file_bytes(&build_evt_linear(&records));
    let (state, notifications, summary) = parse_collect(&ntf_fpath(&ntf), config());
    assert_eq!(state, ParseState::Completed);
    assert_eq!(record_numbers(&notifications), vec![1, 2, 4, 5]);
    let statuses = statuses(&notifications);
    assert_eq!(
        statuses.iter().filter(|s| s.starts_with("Skipped: ")).count(),
        1,
        "statuses {:?}",
        statuses
    );
    assert_eq!(summary.corruptions, 1);
    assert_eq!(summary.records_sent, 4);
}

#[test]
fn test_parse_decode_error_skipped() {
    // record 3 has a string offset past its end
    let mut records = build_records(1, EVT_5_COUNT);
    record_set_u32(&mut records[2], RECORD_OFFSET_STRING_OFFSET, 0xFFFF);
    let ntf = create_temp_file_bytes(&build_evt_linear(&records));
    let (state, notifications, summary) = parse_collect(&ntf_fpath(&ntf), config());
    assert_eq!(state, ParseState::Completed);
    assert_eq!(record_numbers(&notifications), vec![1, 2, 4, 5]);
    let statuses = statuses(&notifications);
    assert_eq!(
        statuses.iter().filter(|s| s.starts_with("Skipped record: ")).count(),
        1,
        "statuses {:?}",
        statuses
    );
    assert!(statuses.last().unwrap().starts_with("Completed"), "statuses {:?}", statuses);
    assert_eq!(summary.decode_errors, 1);
    assert_eq!(summary.corruptions, 0);
    assert_eq!(summary.records_sent, 4);
    assert_eq!(summary.state, ParseState::Completed);
}

#[test]
fn test_parse_wrapped() {
    let (state, notifications, summary) = parse_collect(&NTF_EVT_8_WRAPPED_FPATH, config());
    assert_eq!(state, ParseState::Completed);
    assert_eq!(record_numbers(&notifications), (11..19).collect::<Vec<u32>>());
    let summary_evtreader = summary.evtreader.unwrap();
    assert!(summary_evtreader.wrapped);
    assert_eq!(summary_evtreader.records_stitched, 1);
}

#[test]
fn test_parse_bad_magic() {
    let path: &FPath = &NTF_EVT_BAD_MAGIC_FPATH;
    let (state, notifications, summary) = parse_collect(path, config());
    assert_eq!(state, ParseState::Failed);
    assert!(records(&notifications).is_empty());
    assert!(progresses(&notifications).is_empty());
    let statuses = statuses(&notifications);
    assert_eq!(statuses.len(), 2, "statuses {:?}", statuses);
    assert!(statuses[1].starts_with(&format!("Failed {}: ", path)), "status {:?}", statuses[1]);
    assert!(summary.error.is_some());
    assert!(summary.evtreader.is_none());
}

#[test]
fn test_parse_not_found() {
    let path: FPath = FPath::from(FPATH_NOT_EXIST);
    let (state, notifications, summary) = parse_collect(&path, config());
    assert_eq!(state, ParseState::Failed);
    assert!(records(&notifications).is_empty());
    assert_eq!(summary.state, ParseState::Failed);
    assert!(statuses(&notifications).last().unwrap().starts_with("Failed"));
}

#[test]
fn test_parse_cancelled_before() {
    let (chan_send, chan_recv) = crossbeam_channel::unbounded::<ParseNotification>();
    let mut controller = ParseController::new(config());
    controller.cancel();
    assert!(controller.is_cancelled());
    let state = controller.parse(&NTF_EVT_1000_FPATH, &chan_send);
    assert_eq!(state, ParseState::Cancelled);
    drop(chan_send);
    let notifications: Vec<ParseNotification> = chan_recv.iter().collect();
    assert!(records(&notifications).is_empty());
    let statuses = statuses(&notifications);
    assert_eq!(statuses.len(), 1, "statuses {:?}", statuses);
    assert!(statuses[0].starts_with("Cancelled"), "status {:?}", statuses[0]);
    assert_eq!(controller.summary().records_sent, 0);
}

#[test]
fn test_parse_receiver_dropped() {
    let (chan_send, chan_recv) = crossbeam_channel::bounded::<ParseNotification>(1);
    drop(chan_recv);
    let mut controller = ParseController::new(config());
    let state = controller.parse(&NTF_EVT_5_FPATH, &chan_send);
    assert_eq!(state, ParseState::Cancelled);
    assert_eq!(controller.summary().records_sent, 0);
    assert!(controller.is_cancelled());
}

#[test]
fn test_parse_cancel_midstream() {
    const CAPACITY: usize = 1;
    let config = ParseConfig {
        channel_capacity: CAPACITY,
        send_timeout: Duration::from_millis(5),
        ..config()
    };
    let cancel = cancel_flag_new();
    let (handle, chan_recv) =
        ParseController::spawn(NTF_EVT_1000_FPATH.clone(), config, cancel.clone()).unwrap();
    let mut records_before: usize = 0;
    for notification in chan_recv.iter() {
        if let ParseNotification::Record(_) = notification {
            records_before += 1;
            if records_before == 20 {
                break;
            }
        }
    }
    cancel.store(true, Ordering::Relaxed);
    let records_after: usize = drain_records(&chan_recv);
    let summary = handle.join().unwrap();
    assert_eq!(summary.state, ParseState::Cancelled);
    assert_le!(records_after, CAPACITY + 1, "records received after cancel");
    assert_eq!(summary.records_sent as usize, records_before + records_after);
    assert_le!(summary.bytes_consumed, summary.bytes_total);
}

fn drain_records(chan_recv: &ChanRecvNotification) -> usize {
    chan_recv
        .iter()
        .filter(|n| matches!(n, ParseNotification::Record(_)))
        .count()
}

#[test]
fn test_parse_deterministic() {
    let (_, notifications1, _) = parse_collect(&NTF_EVT_1000_FPATH, config());
    let (_, notifications2, _) = parse_collect(&NTF_EVT_1000_FPATH, config());
    assert_eq!(records(&notifications1), records(&notifications2));
}

#[test]
fn test_parse_reuse_controller() {
    let (chan_send, chan_recv) = crossbeam_channel::unbounded::<ParseNotification>();
    let mut controller = ParseController::new(config());
    assert_eq!(controller.parse(&NTF_EVT_BAD_MAGIC_FPATH, &chan_send), ParseState::Failed);
    assert_eq!(controller.parse(&NTF_EVT_5_FPATH, &chan_send), ParseState::Completed);
    let summary = controller.summary();
    assert_eq!(summary.records_sent, EVT_5_COUNT as Count);
    assert!(summary.error.is_none());
    drop(chan_send);
    assert_eq!(drain_records(&chan_recv), EVT_5_COUNT as usize);
}

#[test]
fn test_spawn_1000() {
    let (handle, chan_recv) =
        ParseController::spawn(NTF_EVT_1000_FPATH.clone(), config(), cancel_flag_new()).unwrap();
    let notifications: Vec<ParseNotification> = chan_recv.iter().collect();
    let summary = handle.join().unwrap();
    assert_eq!(summary.state, ParseState::Completed);
    assert_eq!(summary.records_sent, EVT_1000_COUNT as Count);
    assert_eq!(record_numbers(&notifications), (1..=EVT_1000_COUNT).collect::<Vec<u32>>());
    assert_eq!(summary.progress_sent, progresses(&notifications).len() as Count);
    assert_eq!(summary.status_sent, statuses(&notifications).len() as Count);
    assert_ge!(summary.progress_sent, 2);
    let s = summary.to_string();
    assert!(s.contains("Completed"), "summary {}", s);
}
