//! Common utilities for the gnaw workspace.
//!
//! This crate provides shared infrastructure used across the gnaw crates:
//!
//! - [`debug`] - Per-module logging controlled via the `GNAW_DEBUG` environment variable
//! - [`intern`] - String interning using arena allocation
//! - [`lines`] - Line/column tables for translating byte offsets

pub mod debug;
pub mod intern;
pub mod lines;

pub use debug::{create_logger, Logger};
pub use intern::StringInterner;
pub use lines::LineTable;
