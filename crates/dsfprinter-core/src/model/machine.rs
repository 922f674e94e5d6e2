//! Machine model navigation and heater index derivation

use serde_json::Value;
use std::fmt;

/// One step of a path into the machine model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathKey {
    /// Object member
    Key(String),
    /// Array element
    Index(usize),
}

impl From<&str> for PathKey {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathKey {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "{}", key),
            Self::Index(index) => write!(f, "[{}]", index),
        }
    }
}

/// Walk `path` from `document`, returning `None` as soon as a step misses
pub fn lookup<'a>(document: &'a Value, path: &[PathKey]) -> Option<&'a Value> {
    path.iter().try_fold(document, |value, key| match key {
        PathKey::Key(key) => value.get(key.as_str()),
        PathKey::Index(index) => value.get(*index),
    })
}

/// Heater state as reported in `heat.heaters[].state`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaterState {
    /// Heater is turned off
    Off,
    /// Heater holds its standby temperature
    Standby,
    /// Heater holds its active temperature
    Active,
    /// Heater is in a fault state
    Fault,
    /// Heater is being auto-tuned
    Tuning,
    /// Heater is not reachable
    Offline,
    /// Any state string not listed above
    Unknown(String),
}

impl HeaterState {
    /// Parse the state string used by the daemon
    pub fn parse(state: &str) -> Self {
        match state {
            "off" => Self::Off,
            "standby" => Self::Standby,
            "active" => Self::Active,
            "fault" => Self::Fault,
            "tuning" => Self::Tuning,
            "offline" => Self::Offline,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Current temperature of a heater object, 0 when missing
pub fn heater_current(heater: &Value) -> f64 {
    heater.get("current").and_then(Value::as_f64).unwrap_or(0.0)
}

/// Target temperature of a heater object.
///
/// The `active` setpoint while active, the `standby` setpoint while on
/// standby, otherwise 0.
pub fn heater_target(heater: &Value) -> f64 {
    let state = heater
        .get("state")
        .and_then(Value::as_str)
        .map(HeaterState::parse);

    let field = match state {
        Some(HeaterState::Active) => "active",
        Some(HeaterState::Standby) => "standby",
        _ => return 0.0,
    };
    heater.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

/// Heater slots for each logical role, derived once from the full model
///
/// Indices refer to `heat.heaters[]`. Slots valued `-1` are unassigned and
/// left out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaterIndexTable {
    /// Primary heater of each tool that has one, in tool order
    pub tools: Vec<usize>,
    /// Bed heaters
    pub bed: Vec<usize>,
    /// Chamber heaters
    pub chamber: Vec<usize>,
}

impl HeaterIndexTable {
    /// Derive the table from a full machine model.
    ///
    /// Missing sections yield empty lists.
    pub fn from_model(model: &Value) -> Self {
        let tools = model
            .get("tools")
            .and_then(Value::as_array)
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|tool| {
                        let heater = tool.get("heaters")?.as_array()?.first()?;
                        slot_index(heater)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let heat = model.get("heat");
        let table = Self {
            tools,
            bed: slot_list(heat, "bedHeaters"),
            chamber: slot_list(heat, "chamberHeaters"),
        };
        tracing::debug!(
            "heater table tools={:?} bed={:?} chamber={:?}",
            table.tools,
            table.bed,
            table.chamber
        );
        table
    }

    /// Heater slot of tool `tool`
    pub fn tool(&self, tool: usize) -> Option<usize> {
        self.tools.get(tool).copied()
    }

    /// First bed heater slot
    pub fn first_bed(&self) -> Option<usize> {
        self.bed.first().copied()
    }

    /// First chamber heater slot
    pub fn first_chamber(&self) -> Option<usize> {
        self.chamber.first().copied()
    }

    /// Path to heater slot `index` in the machine model
    pub fn heater_path(index: usize) -> [PathKey; 3] {
        [
            PathKey::from("heat"),
            PathKey::from("heaters"),
            PathKey::Index(index),
        ]
    }
}

fn slot_index(value: &Value) -> Option<usize> {
    value.as_i64().and_then(|index| usize::try_from(index).ok())
}

fn slot_list(heat: Option<&Value>, key: &str) -> Vec<usize> {
    heat.and_then(|heat| heat.get(key))
        .and_then(Value::as_array)
        .map(|slots| slots.iter().filter_map(slot_index).collect())
        .unwrap_or_default()
}
