//! Shared utilities for ratsorat.
//!
//! This crate provides the cross-cutting concerns used by the other ratsorat
//! crates: the resolution error type and the `tracing` subscriber bootstrap.

pub mod errors;
pub mod logging;
