// src/bin/elp.rs

//! Driver program _elp_ (Event Log Parser).
//!
//! Processes user-passed command-line arguments, finds `.evt` files among
//! the paths, then runs one [`ParseController`] per file on a worker thread.
//! The main thread receives each [`ParseNotification`], applies the user's
//! [`RowFilter`], and prints the passing rows.
//!
//! Rows are printed to stdout. Status, progress, and summaries are printed
//! to stderr.
//!
//! Pressing Ctrl-C sets the shared cancel flag; the running session stops
//! and no further files are processed.
//!
//! [`ParseController`]: elplib::readers::parsecontroller::ParseController
//! [`ParseNotification`]: elplib::readers::parsecontroller::ParseNotification
//! [`RowFilter`]: elplib::data::filter::RowFilter

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]

use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::{
    Duration,
    Instant,
};

use ::clap::{
    Parser,
    ValueEnum,
};
use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
    stack::stack_offset_set,
};

use ::elplib::common::{
    Count,
    FPath,
    FPaths,
};
use ::elplib::data::datetime::{
    date_from_str,
    tz_offset_from_str,
    DateL,
    FixedOffset,
    TimeZoneL,
};
use ::elplib::data::eventrow::EventType;
use ::elplib::data::filter::RowFilter;
#[allow(unused_imports)]
use ::elplib::debug::printers::{
    de_err,
    de_wrn,
    e_err,
    e_wrn,
};
use ::elplib::printer::printers::{
    ColorChoice,
    PrinterEventRow,
    WriteColor,
    SEPARATOR_DEFAULT,
};
use ::elplib::readers::filepreprocessor::{
    process_path,
    ProcessPathResult,
    ProcessPathResults,
};
use ::elplib::readers::parsecontroller::{
    cancel_flag_new,
    CancelFlag,
    ParseConfig,
    ParseController,
    ParseNotification,
    ParseState,
    CHANNEL_CAPACITY_DEFAULT,
    PROGRESS_RECORDS_DEFAULT,
    SEND_TIMEOUT_DEFAULT,
};
use ::elplib::readers::summary::SummaryParse;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// command-line parsing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

const CLI_HELP_AFTER: &str = "\
Each row is printed as columns
    Type, Date, Time, Source, Description, Category, EventID, User, System
separated by SEPARATOR.

Text filters are case-insensitive substring matches. Date filters are
inclusive and in the form \"YYYY-MM-DD\".

TZ_OFFSET examples are \"+01:00\", \"-0800\", or \"Z\".";

#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    name = "elp",
    version = concatcp!(
        "(Event Log Parser)\n",
        "Version: ", env!("CARGO_PKG_VERSION"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path(s) of .evt files or directories.
    /// Directories will be recursed for files named "*.evt".
    #[clap(required = true, verbatim_doc_comment)]
    paths: Vec<String>,

    /// Print only rows of this event type.
    /// One of "Error", "Warning", "Information", "AuditSuccess",
    /// "AuditFailure", "Unknown".
    #[clap(long = "type", verbatim_doc_comment, value_parser = cli_parse_event_type)]
    event_type: Option<EventType>,

    /// Print only rows on or after this date, "YYYY-MM-DD".
    #[clap(short = 'a', long, verbatim_doc_comment, value_parser = cli_parse_date)]
    date_after: Option<DateL>,

    /// Print only rows on or before this date, "YYYY-MM-DD".
    #[clap(short = 'b', long, verbatim_doc_comment, value_parser = cli_parse_date)]
    date_before: Option<DateL>,

    /// Print only rows with a Source containing this text.
    #[clap(long, verbatim_doc_comment)]
    source: Option<String>,

    /// Print only rows with a Description containing this text.
    #[clap(long, verbatim_doc_comment)]
    description: Option<String>,

    /// Print only rows with a Category containing this text.
    #[clap(long, verbatim_doc_comment)]
    category: Option<String>,

    /// Print only rows with a User containing this text.
    #[clap(long, verbatim_doc_comment)]
    user: Option<String>,

    /// Print only rows with this EventID.
    #[clap(long, verbatim_doc_comment)]
    event_id: Option<u16>,

    /// Timezone offset of printed dates and times.
    /// To pass a value with leading "-" use "=" notation, e.g. "-t=-0800".
    /// If not passed then the local system timezone is used, following its
    /// daylight saving rules.
    #[clap(
        short = 't',
        long,
        verbatim_doc_comment,
        value_parser = cli_parse_tz_offset,
    )]
    tz_offset: Option<FixedOffset>,

    /// Choose to print to terminal using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Column separator.
    #[clap(short = 's', long, verbatim_doc_comment, default_value_t = String::from(SEPARATOR_DEFAULT))]
    separator: String,

    /// Print each description string on its own line.
    #[clap(short = 'e', long, verbatim_doc_comment)]
    expand_description: bool,

    /// Print the column names before the first row.
    #[clap(long, verbatim_doc_comment)]
    header: bool,

    /// Print progress to stderr.
    #[clap(short = 'p', long, verbatim_doc_comment)]
    progress: bool,

    /// Print a summary of each file to stderr.
    #[clap(long, verbatim_doc_comment)]
    summary: bool,

    /// Report progress at least every this many records.
    #[clap(long, verbatim_doc_comment, default_value_t = PROGRESS_RECORDS_DEFAULT)]
    progress_records: Count,

    /// Capacity of the channel between the parsing thread and the printing
    /// thread.
    #[clap(long, verbatim_doc_comment, default_value_t = CHANNEL_CAPACITY_DEFAULT)]
    channel_capacity: usize,
}

fn cli_parse_event_type(label: &str) -> std::result::Result<EventType, String> {
    match EventType::from_label(label) {
        Some(et) => Ok(et),
        None => Err(format!("Unknown event type {:?}", label)),
    }
}

fn cli_parse_date(date: &str) -> std::result::Result<DateL, String> {
    match date_from_str(date) {
        Some(d) => Ok(d),
        None => Err(format!("Unable to parse a date from {:?}; expected \"YYYY-MM-DD\"", date)),
    }
}

fn cli_parse_tz_offset(tzo: &str) -> std::result::Result<FixedOffset, String> {
    match tz_offset_from_str(tzo) {
        Some(tz) => Ok(tz),
        None => Err(format!("Unable to parse a timezone offset from {:?}", tzo)),
    }
}

/// Settings for the printing loop derived from [`CLI_Args`].
#[derive(Debug)]
struct CLI_Settings {
    paths: FPaths,
    filter: RowFilter,
    config: ParseConfig,
    color_choice: ColorChoice,
    separator: String,
    expand_description: bool,
    header: bool,
    progress: bool,
    summary: bool,
}

/// Process the user-passed command-line arguments.
fn cli_process_args() -> CLI_Settings {
    let args = CLI_Args::parse();
    defo!("args {:?}", args);

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    defo!("color_choice {:?}", color_choice);

    let filter = RowFilter {
        event_type: args.event_type,
        date_after: args.date_after,
        date_before: args.date_before,
        source: args.source,
        description: args.description,
        category: args.category,
        event_id: args.event_id,
        user: args.user,
    };
    defo!("filter {:?}", filter);

    let config = ParseConfig {
        progress_records: std::cmp::max(args.progress_records, 1),
        channel_capacity: std::cmp::max(args.channel_capacity, 1),
        send_timeout: SEND_TIMEOUT_DEFAULT,
        tz: match args.tz_offset {
            Some(fo) => TimeZoneL::Fixed(fo),
            None => TimeZoneL::Local,
        },
        ..Default::default()
    };
    defo!("config {:?}", config);

    CLI_Settings {
        paths: args.paths,
        filter,
        config,
        color_choice,
        separator: args.separator,
        expand_description: args.expand_description,
        header: args.header,
        progress: args.progress,
        summary: args.summary,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// processing
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Set the Ctrl-C handler to set `cancel`.
pub fn set_signal_handler(cancel: CancelFlag) -> anyhow::Result<(), ctrlc::Error> {
    defn!();
    ctrlc::set_handler(move || {
        defñ!("ctrl-c");
        cancel.store(true, Ordering::Relaxed);
    })?;
    defx!();

    Ok(())
}

/// Minimum time between printed progress lines.
const PROGRESS_PRINT_INTERVAL: Duration = Duration::from_millis(500);

/// Parse one file and print its rows. Returns the session summary.
fn process_file<W: WriteColor>(
    path: &FPath,
    settings: &CLI_Settings,
    cancel: &CancelFlag,
    printer: &mut PrinterEventRow<W>,
) -> SummaryParse {
    defn!("({:?})", path);
    let (handle, chan_recv) = match ParseController::spawn(path.clone(), settings.config, cancel.clone()) {
        Ok(val) => val,
        Err(err) => {
            e_err!("failed to start a thread for {:?}: {}", path, err);
            let mut summary = SummaryParse::new(path.clone());
            summary.state = ParseState::Failed;
            summary.error = Some(err.to_string());
            return summary;
        }
    };

    let mut progress_printed: Option<Instant> = None;
    let mut printing: bool = true;
    for notification in chan_recv.iter() {
        match notification {
            ParseNotification::Record(row) => {
                if !printing || !settings.filter.matches(&row) {
                    continue;
                }
                if let Err(err) = printer.print_eventrow(&row) {
                    // e.g. stdout closed by `head`
                    de_err!("print_eventrow error {}", err);
                    printing = false;
                    cancel.store(true, Ordering::Relaxed);
                }
            }
            ParseNotification::Status(status) => {
                eprintln!("{}", status);
            }
            ParseNotification::Progress(current, total) => {
                if !settings.progress {
                    continue;
                }
                let due: bool = match progress_printed {
                    None => true,
                    Some(instant) => instant.elapsed() >= PROGRESS_PRINT_INTERVAL || current == total,
                };
                if due {
                    let percent: f64 = match total {
                        0 => 100.0,
                        _ => current as f64 * 100.0 / total as f64,
                    };
                    eprintln!("{}: {} of {} bytes ({:.0}%)", path, current, total, percent);
                    progress_printed = Some(Instant::now());
                }
            }
        }
    }
    if let Err(err) = printer.flush() {
        de_err!("printer.flush() error {}", err);
    }

    let summary: SummaryParse = match handle.join() {
        Ok(summary) => summary,
        Err(_err) => {
            e_err!("thread for {:?} panicked", path);
            let mut summary = SummaryParse::new(path.clone());
            summary.state = ParseState::Failed;
            summary
        }
    };
    defx!("({:?}) {:?}", path, summary.state);

    summary
}

pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    defn!();

    let settings: CLI_Settings = cli_process_args();

    let cancel: CancelFlag = cancel_flag_new();
    if let Err(err) = set_signal_handler(cancel.clone()) {
        e_wrn!("failed to set the Ctrl-C handler: {}", err);
    }

    let mut processed_paths: ProcessPathResults = ProcessPathResults::with_capacity(settings.paths.len());
    for path in settings.paths.iter() {
        defo!("path {:?}", path);
        processed_paths.extend(process_path(path));
    }

    let mut failed: bool = false;
    let mut printer = PrinterEventRow::new_stdout(
        settings.color_choice,
        settings.separator.clone(),
        settings.expand_description,
    );
    if settings.header {
        if let Err(err) = printer.print_header() {
            de_err!("print_header error {}", err);
        }
    }
    let mut summaries: Vec<SummaryParse> = Vec::new();
    for processed_path in processed_paths.iter() {
        match processed_path {
            ProcessPathResult::FileValid(path) => {
                if cancel.load(Ordering::Relaxed) {
                    defo!("cancelled; skip {:?}", path);
                    break;
                }
                let summary: SummaryParse = process_file(path, &settings, &cancel, &mut printer);
                if summary.state == ParseState::Failed {
                    failed = true;
                }
                summaries.push(summary);
            }
            ProcessPathResult::FileErrNotSupported(_path) => {
                defo!("not supported {:?}", _path);
            }
            ProcessPathResult::FileErrNotAFile(path) => {
                e_wrn!("not a file {:?}", path);
            }
            ProcessPathResult::FileErrNotExist(path) => {
                e_err!("path not found {:?}", path);
                failed = true;
            }
        }
    }

    if settings.summary {
        for summary in summaries.iter() {
            eprintln!("{}", summary);
        }
    }

    let exitcode: ExitCode = match failed {
        true => ExitCode::FAILURE,
        false => ExitCode::SUCCESS,
    };
    defx!("exitcode {:?}", exitcode);

    exitcode
}
