//! G-code line classification
//!
//! Splits a single serial protocol line into its command word, parameter
//! words, trailing comment and checksum. Used for diagnostics and dispatch
//! decisions; the raw line is what gets forwarded to the machine.

pub mod command;
pub mod parser;

pub use command::{CodeLetter, ParsedCommand};
pub use parser::parse_line;
