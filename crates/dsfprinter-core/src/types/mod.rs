//! Type aliases shared across the DSFPrinter crates.
//!
//! - [`aliases`]: thread-safe wrappers and the subscription latch

pub mod aliases;

pub use aliases::*;
