// src/data/datetime.rs

//! Functions and types for converting event record timestamps and for
//! date filtering.
//!
//! Record timestamps are seconds since the Unix epoch in UTC. They are
//! converted to a [`DateTimeL`] in the session's [`TimeZoneL`] and
//! then split into a date and a time for display.

pub use ::chrono::{
    DateTime,
    FixedOffset,
    Local,
    LocalResult,
    NaiveDate,
    NaiveTime,
    TimeZone,
    Utc,
};
#[allow(unused_imports)]
use ::more_asserts::debug_assert_le;
#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx, defñ};

/// `DateTime` with a `FixedOffset`, the datetime type of this library.
pub type DateTimeL = DateTime<FixedOffset>;
pub type DateTimeLOpt = Option<DateTimeL>;
/// A calendar date used by date filters.
pub type DateL = NaiveDate;
pub type DateLOpt = Option<DateL>;

/// `strftime` format for the "Date" column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `strftime` format for the "Time" column.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Timezone in which record timestamps are rendered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TimeZoneL {
    /// The local system timezone. Each timestamp gets the offset in effect
    /// at that instant, so daylight saving changes are followed.
    #[default]
    Local,
    /// A fixed offset for every timestamp.
    Fixed(FixedOffset),
}

impl From<FixedOffset> for TimeZoneL {
    fn from(fo: FixedOffset) -> Self {
        TimeZoneL::Fixed(fo)
    }
}

/// Convert seconds since the Unix epoch to a [`DateTimeL`] in timezone
/// `tz`.
pub fn epoch_to_datetimel(
    seconds: u32,
    tz: &TimeZoneL,
) -> DateTimeL {
    match tz {
        TimeZoneL::Local => epoch_to_datetime_tz(seconds, &Local),
        TimeZoneL::Fixed(fo) => epoch_to_datetime_tz(seconds, fo),
    }
}

fn epoch_to_datetime_tz<Tz: TimeZone>(
    seconds: u32,
    tz: &Tz,
) -> DateTimeL {
    // all `u32` seconds are in range for `chrono`; a UTC instant maps to
    // exactly one local time
    match tz.timestamp_opt(seconds as i64, 0) {
        LocalResult::Single(dt) => dt.fixed_offset(),
        LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        LocalResult::None => DateTime::<Utc>::UNIX_EPOCH.fixed_offset(),
    }
}

/// Parse a timezone offset string, e.g. `"+01:00"`, `"-0800"`, `"+05"`,
/// `"Z"`, or `"UTC"`.
pub fn tz_offset_from_str(tzo: &str) -> Option<FixedOffset> {
    defn!("({:?})", tzo);
    match tzo {
        "Z" | "z" | "UTC" | "utc" | "GMT" | "gmt" => {
            defx!("return UTC");
            return FixedOffset::east_opt(0);
        }
        _ => {}
    }
    // transform the timezone string to a `FixedOffset` instance
    // using a dummy `DateTimeL`
    let mut data: String = String::from("2000-01-02 03:04:05 ");
    data.push_str(tzo);
    for pattern in [
        "%Y-%m-%d %H:%M:%S %:z",
        "%Y-%m-%d %H:%M:%S %z",
        "%Y-%m-%d %H:%M:%S %#z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(data.as_str(), pattern) {
            defx!("return {:?}", dt.offset());
            return Some(*dt.offset());
        }
    }
    defx!("return None");

    None
}

/// Parse a date string `YYYY-MM-DD`.
pub fn date_from_str(date: &str) -> Option<DateL> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Result of comparing a date to a pair of date filters.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Result_Filter_Date2 {
    /// the date is before the "after" filter
    BeforeRange,
    /// the date is after the "before" filter
    AfterRange,
    /// the date is between both filters (inclusive)
    InRange,
}

impl Result_Filter_Date2 {
    #[inline(always)]
    pub const fn is_pass(&self) -> bool {
        matches!(*self, Result_Filter_Date2::InRange)
    }

    #[inline(always)]
    pub const fn is_fail(&self) -> bool {
        matches!(*self, Result_Filter_Date2::AfterRange | Result_Filter_Date2::BeforeRange)
    }
}

/// How does the passed `date` pass the optional filters `date_after` and
/// `date_before`?
///
/// Comparisons are inclusive, i.e. `date == date_after` is `InRange`.
/// If both filters are `None` then return `InRange`.
pub fn date_pass_filters(
    date: &DateL,
    date_after: &DateLOpt,
    date_before: &DateLOpt,
) -> Result_Filter_Date2 {
    defñ!("({:?}, {:?}, {:?})", date, date_after, date_before);
    if let (Some(da), Some(db)) = (date_after, date_before) {
        debug_assert_le!(da, db, "Bad date range values date_after {:?} {:?} date_before", da, db);
    }
    if let Some(da) = date_after {
        if date < da {
            return Result_Filter_Date2::BeforeRange;
        }
    }
    if let Some(db) = date_before {
        if db < date {
            return Result_Filter_Date2::AfterRange;
        }
    }

    Result_Filter_Date2::InRange
}
