// src/tests/mod.rs

//! Tests for _elplib_.
//!
//! Tests are placed at `src/tests/`, inside the `elplib`. This is a
//! reasonable trade-off of separation and access.
//!
//! Tests placed at top-level path `tests/` do not have crate-internal
//! visibility. While it is recommended to not require internal visibility for
//! testing, in practice that often makes tests difficult or impossible to
//! implement.

pub mod common;
pub mod parsecontroller_tests;
