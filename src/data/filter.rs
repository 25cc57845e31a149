// src/data/filter.rs

//! Implement [`RowFilter`], the consumer-side selection of [`EventRow`]s.
//!
//! Every set criterion must match; unset criteria match everything.
//! Text criteria are case-insensitive substring matches. Dates are
//! inclusive.

use crate::data::datetime::{
    date_pass_filters,
    DateLOpt,
};
use crate::data::eventrow::{
    EventRow,
    EventType,
};

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RowFilter {
    pub event_type: Option<EventType>,
    pub date_after: DateLOpt,
    pub date_before: DateLOpt,
    pub source: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub event_id: Option<u16>,
    pub user: Option<String>,
}

/// Case-insensitive `needle` in `haystack`. An unset `needle` always matches.
fn contains_nocase(
    haystack: &str,
    needle: &Option<String>,
) -> bool {
    match needle {
        None => true,
        Some(needle) => haystack
            .to_lowercase()
            .contains(needle.to_lowercase().as_str()),
    }
}

impl RowFilter {
    /// Are no criteria set?
    pub fn is_empty(&self) -> bool {
        self == &RowFilter::default()
    }

    /// Does `row` pass every criterion?
    pub fn matches(&self, row: &EventRow) -> bool {
        if let Some(et) = self.event_type {
            if et != row.event_type() {
                return false;
            }
        }
        if let Some(event_id) = self.event_id {
            if event_id != row.event_id() {
                return false;
            }
        }
        if date_pass_filters(&row.date(), &self.date_after, &self.date_before).is_fail() {
            return false;
        }

        contains_nocase(row.source(), &self.source)
            && contains_nocase(row.description(), &self.description)
            && contains_nocase(row.category(), &self.category)
            && contains_nocase(row.user(), &self.user)
    }
}
