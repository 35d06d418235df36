//! # SignalForge WebAssembly Bindings
//!
//! Exposes a [`SignalStore`] to a JavaScript host. This crate is the boundary
//! adapter: it validates call arguments, converts host values into store
//! [`Value`]s and back, and turns store errors into thrown JS errors. The
//! store itself never sees a malformed argument.
//!
//! ## Usage
//!
//! ```javascript
//! import init, { SignalForge } from 'signalforge-wasm';
//!
//! await init();
//!
//! const store = new SignalForge();
//! const id = store.createSignal(42);
//! store.setSignal(id, 'hello');
//!
//! console.log(store.getSignal(id));  // "hello"
//! console.log(store.getVersion(id)); // 1
//!
//! store.batchUpdate([[id, true], ['missing', 1]]);
//! ```

use js_sys::Array;
use serde::Serialize;
use signalforge_core::{SignalId, SignalStore, StoreConfigBuilder, StoreError, Value};
use std::sync::Arc;
use wasm_bindgen::prelude::*;

// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// ============================================================================
// SignalForge
// ============================================================================

/// A signal store handle for JavaScript.
///
/// Every method maps to exactly one store operation. Ids are plain strings
/// on the JS side.
#[wasm_bindgen]
pub struct SignalForge {
    store: Arc<SignalStore>,
}

#[wasm_bindgen]
impl SignalForge {
    /// Create a handle over a fresh, empty store.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::from_store(Arc::new(SignalStore::new()))
    }

    /// Create a handle over a fresh store whose ids use `prefix`.
    #[wasm_bindgen(js_name = withIdPrefix)]
    pub fn with_id_prefix(prefix: &str) -> Self {
        let config = StoreConfigBuilder::new().id_prefix(prefix).build();
        Self::from_store(Arc::new(SignalStore::with_config(config)))
    }

    /// Create a signal and return its id.
    #[wasm_bindgen(js_name = createSignal)]
    pub fn create_signal(&self, initial: JsValue) -> String {
        self.store.create_signal(value_from_js(&initial)).0
    }

    /// Current value of a signal. Throws if the id is unknown.
    #[wasm_bindgen(js_name = getSignal)]
    pub fn get_signal(&self, id: JsValue) -> Result<JsValue, JsValue> {
        let id = signal_id(&id, "getSignal")?;
        let value = self.store.get_signal(&id).map_err(store_error)?;
        Ok(value_to_js(&value))
    }

    /// Write a new value. Throws if the id is unknown.
    #[wasm_bindgen(js_name = setSignal)]
    pub fn set_signal(&self, id: JsValue, value: JsValue) -> Result<(), JsValue> {
        let id = signal_id(&id, "setSignal")?;
        self.store
            .set_signal(&id, value_from_js(&value))
            .map_err(store_error)
    }

    #[wasm_bindgen(js_name = hasSignal)]
    pub fn has_signal(&self, id: JsValue) -> Result<bool, JsValue> {
        let id = signal_id(&id, "hasSignal")?;
        Ok(self.store.has_signal(&id))
    }

    /// Remove a signal. Unknown ids are ignored.
    #[wasm_bindgen(js_name = deleteSignal)]
    pub fn delete_signal(&self, id: JsValue) -> Result<(), JsValue> {
        let id = signal_id(&id, "deleteSignal")?;
        self.store.delete_signal(&id);
        Ok(())
    }

    /// Version of a signal as a JS number. Throws if the id is unknown.
    #[wasm_bindgen(js_name = getVersion)]
    pub fn get_version(&self, id: JsValue) -> Result<f64, JsValue> {
        let id = signal_id(&id, "getVersion")?;
        let version = self.store.get_signal_version(&id).map_err(store_error)?;
        Ok(version as f64)
    }

    /// Apply an array of `[id, value]` pairs.
    ///
    /// The whole array is validated before any write happens. Ids missing
    /// from the store are skipped silently.
    #[wasm_bindgen(js_name = batchUpdate)]
    pub fn batch_update(&self, updates: JsValue) -> Result<(), JsValue> {
        let updates = parse_updates(&updates)?;
        self.store.batch_update(updates);
        Ok(())
    }

    /// Number of signals in the store.
    #[wasm_bindgen(js_name = signalCount)]
    pub fn signal_count(&self) -> usize {
        self.store.get_signal_count()
    }

    /// Remove every signal.
    #[wasm_bindgen]
    pub fn clear(&self) {
        self.store.clear();
    }

    /// `{ id, version, value: { kind, value } }` read in one step.
    #[wasm_bindgen]
    pub fn snapshot(&self, id: JsValue) -> Result<JsValue, JsValue> {
        let id = signal_id(&id, "snapshot")?;
        let snapshot = self.store.snapshot(&id).map_err(store_error)?;

        let data = SnapshotData {
            id: id.0,
            version: snapshot.version,
            value: snapshot.value,
        };
        serde_wasm_bindgen::to_value(&data).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl SignalForge {
    /// Wrap a store that Rust code also holds, e.g. to register native
    /// subscribers on signals the host writes to.
    pub fn from_store(store: Arc<SignalStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<SignalStore> {
        &self.store
    }
}

impl Default for SignalForge {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
struct SnapshotData {
    id: String,
    version: u64,
    value: Value,
}

// ============================================================================
// Value conversion
// ============================================================================

/// Classify a host value. Anything that is not a primitive becomes an
/// `Object` holding its JSON text.
pub fn value_from_js(value: &JsValue) -> Value {
    if value.is_undefined() {
        Value::Undefined
    } else if value.is_null() {
        Value::Null
    } else if let Some(b) = value.as_bool() {
        Value::Boolean(b)
    } else if let Some(n) = value.as_f64() {
        Value::Number(n)
    } else if let Some(s) = value.as_string() {
        Value::String(s)
    } else {
        Value::Object(object_text(value))
    }
}

/// Convert back to a host value. Objects come back as their stored text.
pub fn value_to_js(value: &Value) -> JsValue {
    match value {
        Value::Undefined => JsValue::UNDEFINED,
        Value::Null => JsValue::NULL,
        Value::Boolean(b) => JsValue::from_bool(*b),
        Value::Number(n) => JsValue::from_f64(*n),
        Value::String(s) | Value::Object(s) => JsValue::from_str(s),
    }
}

fn object_text(value: &JsValue) -> String {
    // JSON.stringify yields undefined for functions and symbols.
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

// ============================================================================
// Argument validation
// ============================================================================

fn signal_id(arg: &JsValue, operation: &str) -> Result<SignalId, JsValue> {
    arg.as_string()
        .map(SignalId::from)
        .ok_or_else(|| js_error(&format!("{} requires a string signal ID", operation)))
}

fn parse_updates(updates: &JsValue) -> Result<Vec<(SignalId, Value)>, JsValue> {
    if !Array::is_array(updates) {
        return Err(js_error("batchUpdate requires an array of updates"));
    }

    Array::from(updates)
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            if !Array::is_array(&entry) {
                return Err(js_error(&format!(
                    "batchUpdate entry {} must be an [id, value] pair",
                    index
                )));
            }
            let pair = Array::from(&entry);
            let id = pair.get(0).as_string().ok_or_else(|| {
                js_error(&format!(
                    "batchUpdate entry {} requires a string signal ID",
                    index
                ))
            })?;
            Ok((SignalId::from(id), value_from_js(&pair.get(1))))
        })
        .collect()
}

fn store_error(err: StoreError) -> JsValue {
    js_error(&err.to_string())
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}

// ============================================================================
// Tests
// ============================================================================
