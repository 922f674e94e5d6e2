//! # DSFPrinter Core
//!
//! Core types and pure algorithms for DSFPrinter.
//! Provides the error taxonomy, the G-code line parser, the machine model
//! merge-patch engine and the heater index derivation used by the
//! virtual serial bridge.

pub mod error;
pub mod gcode;
pub mod model;
pub mod types;

pub use error::{ConnectionError, Error, ModelError, ProtocolError, Result, StateError};

pub use gcode::{parse_line, CodeLetter, ParsedCommand};

pub use model::{
    apply_patch, apply_patch_with, HeaterIndexTable, HeaterState, ListPolicy, PathKey,
};

pub use types::{
    latch, thread_safe, thread_safe_deque, thread_safe_none, Latch, ThreadSafe, ThreadSafeDeque,
    ThreadSafeOption,
};
