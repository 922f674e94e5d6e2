//! Merge-patch engine for the machine model
//!
//! A patch mirrors a subset of the model. Applying it overwrites only what
//! the patch names:
//! - object into object: merge key by key, keys missing from the patch stay
//! - array into array: merge index by index, the base grows as needed
//! - anything else: the patch value replaces the base value verbatim
//!
//! There is no schema validation. A patch of the wrong shape overwrites
//! rather than fails.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// What happens to base array elements past the end of a patch array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListPolicy {
    /// Keep trailing base elements; arrays only grow
    #[default]
    Retain,
    /// Cut the base array down to the patch length
    Truncate,
}

/// Apply `patch` onto `base` in place, retaining trailing array elements.
///
/// Returns `base` for chaining.
pub fn apply_patch<'a>(base: &'a mut Value, patch: &Value) -> &'a mut Value {
    apply_patch_with(base, patch, ListPolicy::Retain)
}

/// Apply `patch` onto `base` in place with an explicit array policy.
pub fn apply_patch_with<'a>(
    base: &'a mut Value,
    patch: &Value,
    policy: ListPolicy,
) -> &'a mut Value {
    tracing::trace!("patch the machine model with {}", patch);
    merge_value(base, patch, policy, 0);
    base
}

/// Nesting prefix for the trace diagram of a patch
struct Indent(usize);

impl fmt::Display for Indent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            f.write_str(" > ")?;
        }
        Ok(())
    }
}

fn merge_value(base: &mut Value, patch: &Value, policy: ListPolicy, depth: usize) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => merge_object(base, patch, policy, depth),
        (Value::Array(base), Value::Array(patch)) => merge_array(base, patch, policy, depth),
        (base, patch) => {
            tracing::trace!("{}= {}", Indent(depth), patch);
            *base = patch.clone();
        }
    }
}

fn merge_object(
    base: &mut Map<String, Value>,
    patch: &Map<String, Value>,
    policy: ListPolicy,
    depth: usize,
) {
    for (key, value) in patch {
        tracing::trace!("{}{}", Indent(depth), key);
        match base.get_mut(key) {
            Some(existing) => merge_value(existing, value, policy, depth + 1),
            None => {
                // unknown keys are spliced in as-is
                tracing::trace!("{}*** = {}", Indent(depth), value);
                base.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge_array(base: &mut Vec<Value>, patch: &[Value], policy: ListPolicy, depth: usize) {
    if policy == ListPolicy::Truncate {
        base.truncate(patch.len());
    }

    for (idx, value) in patch.iter().enumerate() {
        tracing::trace!("{}[{}]", Indent(depth), idx);
        match base.get_mut(idx) {
            Some(existing) => merge_value(existing, value, policy, depth + 1),
            None => base.push(value.clone()),
        }
    }
}
