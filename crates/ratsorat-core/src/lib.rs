//! Core data types for ratsorat.
//!
//! This crate defines the module table a resolver reads seeds from and the
//! configuration that tunes bulk resolution.
//!
//! This crate is intentionally free of async code.

pub mod config;
pub mod module_table;
