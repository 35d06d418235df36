//! WASM-specific integration tests
//!
//! These tests run in a headless browser environment using wasm-bindgen-test.
//! Run with: `wasm-pack test --headless --chrome`

use js_sys::{Array, Object, Reflect};
use signalforge_core::Value;
use signalforge_wasm::*;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn id_of(store: &SignalForge, initial: JsValue) -> JsValue {
    JsValue::from_str(&store.create_signal(initial))
}

#[wasm_bindgen_test]
fn test_create_get_set_delete() {
    let store = SignalForge::new();
    let id = id_of(&store, JsValue::from_f64(42.0));

    assert_eq!(store.get_signal(id.clone()).unwrap().as_f64(), Some(42.0));
    assert_eq!(store.get_version(id.clone()).unwrap(), 0.0);

    store
        .set_signal(id.clone(), JsValue::from_str("hello"))
        .unwrap();
    assert_eq!(
        store.get_signal(id.clone()).unwrap().as_string(),
        Some("hello".to_string())
    );
    assert_eq!(store.get_version(id.clone()).unwrap(), 1.0);

    store.delete_signal(id.clone()).unwrap();
    assert!(!store.has_signal(id.clone()).unwrap());
    assert!(store.get_signal(id).is_err());
}

#[wasm_bindgen_test]
fn test_unknown_id_throws() {
    let store = SignalForge::new();
    let missing = JsValue::from_str("sig_missing");

    assert!(store.get_signal(missing.clone()).is_err());
    assert!(store.set_signal(missing.clone(), JsValue::NULL).is_err());
    assert!(store.get_version(missing.clone()).is_err());
    assert!(store.delete_signal(missing).is_ok());
}

#[wasm_bindgen_test]
fn test_non_string_id_is_rejected() {
    let store = SignalForge::new();
    assert!(store.get_signal(JsValue::from_f64(1.0)).is_err());
    assert!(store.has_signal(JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn test_value_classification() {
    assert_eq!(value_from_js(&JsValue::UNDEFINED), Value::Undefined);
    assert_eq!(value_from_js(&JsValue::NULL), Value::Null);
    assert_eq!(value_from_js(&JsValue::TRUE), Value::Boolean(true));
    assert_eq!(value_from_js(&JsValue::from_f64(1.5)), Value::Number(1.5));
    assert_eq!(
        value_from_js(&JsValue::from_str("x")),
        Value::String("x".into())
    );

    let array = Array::of2(&JsValue::from_f64(1.0), &JsValue::from_f64(2.0));
    assert_eq!(value_from_js(&array.into()), Value::Object("[1,2]".into()));

    let object = Object::new();
    Reflect::set(&object, &"a".into(), &JsValue::from_f64(1.0)).unwrap();
    assert_eq!(
        value_from_js(&object.into()),
        Value::Object(r#"{"a":1}"#.into())
    );
}

#[wasm_bindgen_test]
fn test_object_round_trip_is_text() {
    let store = SignalForge::new();
    let array = Array::of1(&JsValue::from_f64(7.0));
    let id = id_of(&store, array.into());

    let back = store.get_signal(id).unwrap();
    assert_eq!(back.as_string(), Some("[7]".to_string()));
}

#[wasm_bindgen_test]
fn test_batch_update() {
    let store = SignalForge::new();
    let a = id_of(&store, JsValue::from_f64(0.0));
    let b = id_of(&store, JsValue::from_f64(0.0));

    let updates = Array::new();
    updates.push(&Array::of2(&a, &JsValue::from_str("A")));
    updates.push(&Array::of2(&b, &JsValue::TRUE));
    updates.push(&Array::of2(&JsValue::from_str("unknown"), &JsValue::NULL));

    store.batch_update(updates.into()).unwrap();

    assert_eq!(
        store.get_signal(a.clone()).unwrap().as_string(),
        Some("A".to_string())
    );
    assert_eq!(store.get_signal(b.clone()).unwrap().as_bool(), Some(true));
    assert_eq!(store.get_version(a).unwrap(), 1.0);
    assert_eq!(store.get_version(b).unwrap(), 1.0);
}

#[wasm_bindgen_test]
fn test_malformed_batch_writes_nothing() {
    let store = SignalForge::new();
    let a = id_of(&store, JsValue::from_f64(0.0));

    let updates = Array::new();
    updates.push(&Array::of2(&a, &JsValue::from_f64(1.0)));
    updates.push(&JsValue::from_str("not a pair"));

    assert!(store.batch_update(updates.into()).is_err());
    assert_eq!(store.get_version(a).unwrap(), 0.0);
    assert!(store.batch_update(JsValue::from_f64(3.0)).is_err());
}

#[wasm_bindgen_test]
fn test_snapshot_shape() {
    let store = SignalForge::with_id_prefix("ui");
    let id = id_of(&store, JsValue::from_f64(3.0));
    assert!(id.as_string().unwrap().starts_with("ui_0_"));

    let snapshot = store.snapshot(id).unwrap();
    let version = Reflect::get(&snapshot, &"version".into()).unwrap();
    let value = Reflect::get(&snapshot, &"value".into()).unwrap();
    let kind = Reflect::get(&value, &"kind".into()).unwrap();

    assert_eq!(version.as_f64(), Some(0.0));
    assert_eq!(kind.as_string(), Some("Number".to_string()));
}

#[wasm_bindgen_test]
fn test_count_and_clear() {
    let store = SignalForge::new();
    for i in 0..3 {
        store.create_signal(JsValue::from_f64(i as f64));
    }
    assert_eq!(store.signal_count(), 3);

    store.clear();
    assert_eq!(store.signal_count(), 0);
}
