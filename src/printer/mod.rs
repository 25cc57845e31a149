// src/printer/mod.rs

//! The `printer` module is for printing user-facing [`EventRow`s]
//! with text color per event type and a chosen column separator.
//!
//! [`EventRow`s]: crate::data::eventrow::EventRow

pub mod printers;
