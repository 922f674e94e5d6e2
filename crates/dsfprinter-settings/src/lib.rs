//! DSFPrinter Settings Crate
//!
//! Handles the flat key-value configuration supplied by the host and the
//! textual templates used for status reports.

pub mod config;
pub mod error;
pub mod template;

pub use config::PrinterSettings;
pub use error::{SettingsError, SettingsResult};
pub use template::render_template;
