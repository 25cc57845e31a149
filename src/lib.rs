// src/lib.rs

//! _elplib_ reads legacy Windows Event Log `.evt` files.
//!
//! See [`readers`] for an overview.

#![allow(non_snake_case)]

pub mod common;
pub mod data;
pub mod debug;
pub mod printer;
pub mod readers;
#[cfg(test)]
pub mod tests;
