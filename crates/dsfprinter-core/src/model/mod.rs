//! Machine model document handling
//!
//! The machine model is the daemon's JSON description of the printer
//! (tools, heaters, axes...). It is kept as a [`serde_json::Value`] and
//! updated in place by merge patches.

pub mod machine;
pub mod patch;

pub use machine::{
    heater_current, heater_target, lookup, HeaterIndexTable, HeaterState, PathKey,
};
pub use patch::{apply_patch, apply_patch_with, ListPolicy};
