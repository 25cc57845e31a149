// src/printer/printers.rs

//! Specialized printer struct [`PrinterEventRow`] and helper functions
//! for printing [`EventRow`s].
//!
//! [`EventRow`s]: crate::data::eventrow::EventRow

use std::io::Write;

#[doc(hidden)]
pub use ::termcolor::{
    Buffer,
    Color,
    ColorChoice,
    ColorSpec,
    StandardStream,
    WriteColor,
};

use crate::common::NLu8;
use crate::data::eventrow::{
    EventRow,
    EventType,
};
use crate::debug::printers::de_err;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// globals and constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// [`Color`] for printing some user-facing error messages.
///
/// [`Color`]: https://docs.rs/termcolor/1.1.3/termcolor/enum.Color.html
pub const COLOR_ERROR: Color = Color::Red;

/// Default column separator.
pub const SEPARATOR_DEFAULT: &str = "\t";

/// Column names, in printed order.
pub const COLUMN_NAMES: [&str; 9] = [
    "Type",
    "Date",
    "Time",
    "Source",
    "Description",
    "Category",
    "EventID",
    "User",
    "System",
];

/// Text color of a row of `event_type`. `None` is the terminal default.
///
/// Chosen for a dark background console.
pub const fn event_type_to_color(event_type: EventType) -> Option<Color> {
    match event_type {
        EventType::Error => Some(Color::Red),
        EventType::Warning => Some(Color::Yellow),
        EventType::Information => None,
        EventType::AuditSuccess => Some(Color::Green),
        EventType::AuditFailure => Some(Color::Magenta),
        EventType::Unknown => Some(Color::Cyan),
    }
}

/// Render `row` as one line of columns joined by `separator`, without a
/// newline.
///
/// If `expand_description` then description strings are joined by
/// newlines, as a detail view would show them. Otherwise they are joined
/// by a space.
pub fn eventrow_to_string(
    row: &EventRow,
    separator: &str,
    expand_description: bool,
) -> String {
    let description: String = match expand_description {
        true => row.description_lines(),
        false => row.description_with(" "),
    };
    let event_id: String = row.event_id().to_string();
    let date: String = row.date_str();
    let time: String = row.time_str();
    let columns: [&str; 9] = [
        row.event_type().as_str(),
        &date,
        &time,
        row.source(),
        &description,
        row.category(),
        &event_id,
        row.user(),
        row.system(),
    ];

    columns.join(separator)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PrinterEventRow
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Bytes printed, or the error.
pub type PrinterEventRowResult = std::io::Result<usize>;

/// A printer specialized for [`EventRow`s].
///
/// [`EventRow`s]: crate::data::eventrow::EventRow
pub struct PrinterEventRow<W: WriteColor> {
    /// termcolor handle
    out: W,
    /// should printing be in color?
    do_color: bool,
    /// column separator
    separator: String,
    /// print each description string on its own line
    expand_description: bool,
    /// last value passed to `self.out.set_color()`
    color_spec_last: ColorSpec,
}

/// Macro to write to the given output. If there is an error then return it.
macro_rules! write_or_return {
    ($out:expr, $slice_:expr, $printed:expr) => {
        match $out.write_all($slice_) {
            Ok(_) => {
                $printed += $slice_.len();
            }
            Err(err) => {
                // XXX: this will print when stdout is truncated, like when
                //      piping to `head`, e.g. `elp file.evt | head`
                de_err!("{}.write_all(len {}) error {}", stringify!($out), $slice_.len(), err);
                let _ = $out.flush();
                return Err(err);
            }
        }
    };
}

/// Macro that sets output color, only changed if needed.
///
/// Unnecessary changes to `set_color` may cause errant formatting bytes to
/// print to the terminal.
macro_rules! setcolor_or_return {
    ($out:expr, $color_spec:expr, $color_spec_last:expr) => {
        if $color_spec != $color_spec_last {
            if let Err(err) = $out.set_color(&$color_spec) {
                de_err!("{}.set_color({:?}) returned error {}", stringify!($out), $color_spec, err);
                return Err(err);
            };
            $color_spec_last = $color_spec.clone();
        }
    };
}

impl PrinterEventRow<StandardStream> {
    /// A `PrinterEventRow` for stdout.
    pub fn new_stdout(
        color_choice: ColorChoice,
        separator: String,
        expand_description: bool,
    ) -> PrinterEventRow<StandardStream> {
        let do_color: bool = color_choice != ColorChoice::Never;
        PrinterEventRow::new(StandardStream::stdout(color_choice), do_color, separator, expand_description)
    }
}

impl<W: WriteColor> PrinterEventRow<W> {
    pub fn new(
        out: W,
        do_color: bool,
        separator: String,
        expand_description: bool,
    ) -> PrinterEventRow<W> {
        PrinterEventRow {
            out,
            do_color,
            separator,
            expand_description,
            color_spec_last: ColorSpec::new(),
        }
    }

    /// Print the column names.
    pub fn print_header(&mut self) -> PrinterEventRowResult {
        let mut printed: usize = 0;
        let header: String = COLUMN_NAMES.join(self.separator.as_str());
        write_or_return!(self.out, header.as_bytes(), printed);
        write_or_return!(self.out, &[NLu8], printed);

        Ok(printed)
    }

    /// Print one `row` and a newline.
    pub fn print_eventrow(
        &mut self,
        row: &EventRow,
    ) -> PrinterEventRowResult {
        let mut printed: usize = 0;
        let line: String = eventrow_to_string(row, self.separator.as_str(), self.expand_description);
        if self.do_color {
            let mut color_spec = ColorSpec::new();
            color_spec.set_fg(event_type_to_color(row.event_type()));
            setcolor_or_return!(self.out, color_spec, self.color_spec_last);
        }
        write_or_return!(self.out, line.as_bytes(), printed);
        if self.do_color {
            let color_spec = ColorSpec::new();
            setcolor_or_return!(self.out, color_spec, self.color_spec_last);
        }
        write_or_return!(self.out, &[NLu8], printed);

        Ok(printed)
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// The underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }
}
