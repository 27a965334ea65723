//! Session - one recorded keystroke/mouse sample
//!
//! Stored exactly as the client sent it (a JSON object). Coercion to numbers
//! happens only when the session is turned into a `FeatureVector`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session(Map<String, Value>);

impl Session {
    /// Empty session; every feature reads as 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`; a non-finite value is stored as null
    pub fn insert(&mut self, key: &str, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null);
        self.0.insert(key.to_string(), value);
    }

    /// Value of `key` as a float; absent or non-numeric → 0
    pub fn get_f64(&self, key: &str) -> f64 {
        self.0.get(key).map(coerce).unwrap_or(0.0)
    }

}

fn coerce(value: &Value) -> f64 {
    let v = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    };
    // "nan" / "inf" parse as floats
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
