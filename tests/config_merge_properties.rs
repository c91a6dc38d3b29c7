//! Property-based tests for partial configuration edits
//!
//! A partial edit changes only the keys it names. Everything else in the
//! document, including keys the typed model does not know, is kept.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use shellwright_common::RecordingDiagnostics;
use shellwright_config::{deep_merge, merge_at_path, ConfigStore};
use tempfile::TempDir;

fn leaf_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn object_strategy() -> impl Strategy<Value = Map<String, Value>> {
    let nested = prop::collection::btree_map("[a-z]{1,4}", leaf_strategy(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect()));
    prop::collection::btree_map("[a-z]{1,4}", prop_oneof![leaf_strategy(), nested], 0..6)
        .prop_map(|m| m.into_iter().collect())
}

fn feature_flags_strategy() -> impl Strategy<Value = BTreeMap<String, bool>> {
    prop::collection::btree_map(
        prop_oneof![
            Just("git".to_string()),
            Just("ssh".to_string()),
            Just("virtualenv".to_string()),
            Just("wsl".to_string()),
            "custom-[a-z]{1,5}",
        ],
        any::<bool>(),
        0..5,
    )
}

fn store_in(dir: &TempDir) -> ConfigStore {
    ConfigStore::new(dir.path().join("config.json"))
        .with_diagnostics(Arc::new(RecordingDiagnostics::new()))
}

proptest! {
    /// Keys absent from the overlay keep their value; scalar overlay
    /// values replace; null removes.
    #[test]
    fn prop_deep_merge_touches_only_overlay_keys(
        base in object_strategy(),
        overlay in object_strategy(),
        removed in "[a-z]{1,4}",
    ) {
        let mut merged = Value::Object(base.clone());
        let mut overlay_value = Value::Object(overlay.clone());
        overlay_value[&removed] = Value::Null;
        deep_merge(&mut merged, overlay_value);

        prop_assert!(merged.get(&removed).is_none());
        for (key, value) in &base {
            if key != &removed && !overlay.contains_key(key) {
                prop_assert_eq!(&merged[key], value);
            }
        }
        for (key, value) in &overlay {
            if key == &removed {
                continue;
            }
            let both_objects = value.is_object()
                && base.get(key).map(Value::is_object).unwrap_or(false);
            if !both_objects {
                prop_assert_eq!(&merged[key], value);
            }
        }
    }

    /// Merging at a nested path leaves siblings of every ancestor alone
    #[test]
    fn prop_merge_at_path_keeps_siblings(
        base in object_strategy(),
        leaf in leaf_strategy(),
    ) {
        let mut document = json!({ "outer": { "sibling": 1, "inner": {} } });
        document["other"] = Value::Object(base.clone());

        merge_at_path(&mut document, "outer.inner", json!({ "leaf": leaf.clone() })).unwrap();

        prop_assert_eq!(&document["outer"]["inner"]["leaf"], &leaf);
        prop_assert_eq!(&document["outer"]["sibling"], &json!(1));
        prop_assert_eq!(&document["other"], &Value::Object(base));
    }

    /// Setting feature flags changes exactly those flags, and unknown
    /// feature keys survive alongside known ones
    #[test]
    fn prop_store_set_changes_only_named_features(
        first in feature_flags_strategy(),
        second in feature_flags_strategy(),
    ) {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("features", serde_json::to_value(&first).unwrap()).unwrap();
        store.set("features", serde_json::to_value(&second).unwrap()).unwrap();

        let mut expected = first.clone();
        expected.extend(second.clone());
        prop_assert_eq!(store.get().features, expected.clone());

        let on_disk: Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        prop_assert_eq!(on_disk["features"].clone(), serde_json::to_value(&expected).unwrap());
    }

    /// A nested composer edit leaves the rest of the prompt section alone
    #[test]
    fn prop_store_nested_set_keeps_siblings(show_timestamp in any::<bool>(), extra in "[a-z]{1,8}") {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("", json!({ "userNote": extra.clone() })).unwrap();
        let before = store.get();

        let after = store
            .set("prompt.composed", json!({ "showTimestamp": show_timestamp }))
            .unwrap();

        prop_assert_eq!(after.prompt.composed.show_timestamp, show_timestamp);
        prop_assert_eq!(&after.prompt.delegate, &before.prompt.delegate);
        prop_assert_eq!(&after.prompt.composed.colors, &before.prompt.composed.colors);
        prop_assert_eq!(after.mode, before.mode);
        prop_assert_eq!(store.get_path("userNote"), Some(json!(extra)));
    }
}
