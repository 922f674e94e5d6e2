//! Property tests for the machine model merge patch

use dsfprinter_core::{apply_patch, apply_patch_with, ListPolicy};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-1000i64..1000).prop_map(Value::from),
        "[a-z]{0,6}".prop_map(Value::from),
    ]
}

fn arb_document() -> impl Strategy<Value = Value> {
    arb_scalar().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::btree_map("[a-e]", inner, 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn applying_twice_equals_applying_once(base in arb_document(), patch in arb_document()) {
        let mut once = base.clone();
        apply_patch(&mut once, &patch);

        let mut twice = base;
        apply_patch(&mut twice, &patch);
        apply_patch(&mut twice, &patch);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn truncating_twice_equals_truncating_once(base in arb_document(), patch in arb_document()) {
        let mut once = base.clone();
        apply_patch_with(&mut once, &patch, ListPolicy::Truncate);

        let mut twice = base;
        apply_patch_with(&mut twice, &patch, ListPolicy::Truncate);
        apply_patch_with(&mut twice, &patch, ListPolicy::Truncate);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn empty_object_patch_is_identity(base in arb_document()) {
        let mut patched = base.clone();
        apply_patch(&mut patched, &json!({}));
        if base.is_object() {
            prop_assert_eq!(patched, base);
        } else {
            prop_assert_eq!(patched, json!({}));
        }
    }

    #[test]
    fn patched_keys_read_back(key in "[a-e]", value in arb_scalar()) {
        let mut base = json!({"a": {"x": 1}, "b": [1, 2, 3], "c": "keep"});
        let mut patch = Map::new();
        patch.insert(key.clone(), value.clone());
        apply_patch(&mut base, &Value::Object(patch));
        prop_assert_eq!(&base[key.as_str()], &value);
    }
}

#[test]
fn sequential_patches_compose_into_one() {
    let base = json!({
        "heat": {"heaters": [{"current": 20.0, "active": 0.0, "state": "off"}]},
        "state": {"status": "idle"}
    });
    let first = json!({"heat": {"heaters": [{"current": 30.0, "state": "active"}]}});
    let second = json!({"heat": {"heaters": [{"active": 210.0}]}, "state": {"status": "busy"}});
    let combined = json!({
        "heat": {"heaters": [{"current": 30.0, "state": "active", "active": 210.0}]},
        "state": {"status": "busy"}
    });

    let mut sequential = base.clone();
    apply_patch(&mut sequential, &first);
    apply_patch(&mut sequential, &second);

    let mut single = base;
    apply_patch(&mut single, &combined);

    assert_eq!(sequential, single);
}

#[test]
fn heater_current_round_trip() {
    let mut base = json!({"heat": {"heaters": [{"current": 20.0, "active": 60.0}]}});
    apply_patch(&mut base, &json!({"heat": {"heaters": [{"current": 45.5}]}}));

    assert_eq!(base["heat"]["heaters"][0]["current"], json!(45.5));
    assert_eq!(base["heat"]["heaters"][0]["active"], json!(60.0));
}
