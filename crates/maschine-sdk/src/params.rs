//! Typed parameter access
//!
//! Raw request parameters arrive as one JSON document per key. Each one is
//! decoded into a [`ParamValue`] up front; values that are not valid JSON are
//! kept as text. Getters then coerce on demand:
//!
//! - every JSON number is a 64-bit float, so integer getters accept any finite
//!   number and truncate toward zero (`42.7` becomes `42`), failing with
//!   [`ParamError::OutOfRange`] when the value does not fit the target type
//! - incompatible families are never converted (a string is never a number)
//! - a JSON `null` reads the same as an absent key

use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

use crate::errors::ParamError;

/// 2^63, the first float beyond the range of `i64`
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

/// Largest magnitude at which every integer is exactly representable as f64
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

/// A dynamically-typed decoded parameter value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(BTreeMap<String, ParamValue>),
}

impl ParamValue {
    /// Decode raw parameter bytes, falling back to the bytes as text
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(value) => ParamValue::from(value),
            Err(_) => ParamValue::String(String::from_utf8_lossy(bytes).into_owned()),
        }
    }

    /// Name of the value's family, used in mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            ParamValue::Null => "null",
            ParamValue::Bool(_) => "boolean",
            ParamValue::Number(_) => "number",
            ParamValue::String(_) => "string",
            ParamValue::Array(_) => "array",
            ParamValue::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ParamValue::Null,
            serde_json::Value::Bool(b) => ParamValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(ParamValue::Null, ParamValue::Number),
            serde_json::Value::String(s) => ParamValue::String(s),
            serde_json::Value::Array(items) => {
                ParamValue::Array(items.into_iter().map(ParamValue::from).collect())
            }
            serde_json::Value::Object(map) => ParamValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, ParamValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&ParamValue> for serde_json::Value {
    fn from(value: &ParamValue) -> Self {
        match value {
            ParamValue::Null => serde_json::Value::Null,
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            // Integral floats go back to JSON integers so integer targets deserialize.
            ParamValue::Number(n) if n.fract() == 0.0 && n.abs() < EXACT_INT_LIMIT => {
                serde_json::Value::from(*n as i64)
            }
            ParamValue::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            ParamValue::String(s) => serde_json::Value::String(s.clone()),
            ParamValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            ParamValue::Object(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

/// Conversion from a decoded parameter value to a concrete type
pub trait FromParamValue: Sized {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError>;
}

fn mismatch(key: &str, expected: &'static str, value: &ParamValue) -> ParamError {
    ParamError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: value.kind(),
    }
}

fn out_of_range(key: &str, value: f64, target: &'static str) -> ParamError {
    ParamError::OutOfRange {
        key: key.to_string(),
        value,
        target,
    }
}

fn truncate_to_i64(key: &str, value: f64, target: &'static str) -> Result<i64, ParamError> {
    if !value.is_finite() {
        return Err(out_of_range(key, value, target));
    }
    let truncated = value.trunc();
    if truncated < -I64_LIMIT || truncated >= I64_LIMIT {
        return Err(out_of_range(key, value, target));
    }
    Ok(truncated as i64)
}

impl FromParamValue for ParamValue {
    fn from_param(_key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        Ok(value.clone())
    }
}

impl FromParamValue for String {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::String(s) => Ok(s.clone()),
            other => Err(mismatch(key, "a string", other)),
        }
    }
}

impl FromParamValue for bool {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Bool(b) => Ok(*b),
            other => Err(mismatch(key, "a boolean", other)),
        }
    }
}

impl FromParamValue for f64 {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Number(n) => Ok(*n),
            other => Err(mismatch(key, "a number", other)),
        }
    }
}

impl FromParamValue for i64 {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Number(n) => truncate_to_i64(key, *n, "i64"),
            other => Err(mismatch(key, "a number", other)),
        }
    }
}

impl FromParamValue for i32 {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Number(n) => {
                let wide = truncate_to_i64(key, *n, "i32")?;
                i32::try_from(wide).map_err(|_| out_of_range(key, *n, "i32"))
            }
            other => Err(mismatch(key, "a number", other)),
        }
    }
}

impl FromParamValue for Vec<ParamValue> {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Array(items) => Ok(items.clone()),
            other => Err(mismatch(key, "an array", other)),
        }
    }
}

impl FromParamValue for BTreeMap<String, ParamValue> {
    fn from_param(key: &str, value: &ParamValue) -> Result<Self, ParamError> {
        match value {
            ParamValue::Object(map) => Ok(map.clone()),
            other => Err(mismatch(key, "an object", other)),
        }
    }
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Named parameter values with typed, on-demand coercion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
}

impl Parameters {
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Decode every raw parameter; undecodable bytes are kept as text
    pub fn from_raw(raw: &HashMap<String, Vec<u8>>) -> Self {
        raw.iter()
            .map(|(key, bytes)| (key.clone(), ParamValue::from_bytes(bytes)))
            .collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.values.insert(key.into(), value);
    }

    /// Raw value for `key`; `null` counts as absent
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Coerce the value for `key`, failing when it is absent
    pub fn get_as<T: FromParamValue>(&self, key: &str) -> Result<T, ParamError> {
        match self.get(key) {
            Some(value) => T::from_param(key, value),
            None => Err(ParamError::Missing {
                key: key.to_string(),
            }),
        }
    }

    /// Coerce the value for `key`, returning `default` when it is absent.
    ///
    /// A present value of the wrong type is still an error.
    pub fn get_as_or<T: FromParamValue>(&self, key: &str, default: T) -> Result<T, ParamError> {
        match self.get(key) {
            Some(value) => T::from_param(key, value),
            None => Ok(default),
        }
    }

    /// Borrow a string value without cloning it
    pub fn get_str(&self, key: &str) -> Result<&str, ParamError> {
        match self.get(key) {
            Some(ParamValue::String(s)) => Ok(s),
            Some(other) => Err(mismatch(key, "a string", other)),
            None => Err(ParamError::Missing {
                key: key.to_string(),
            }),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String, ParamError> {
        self.get_as(key)
    }

    pub fn get_string_with_default(&self, key: &str, default: &str) -> Result<String, ParamError> {
        self.get_as_or(key, default.to_string())
    }

    pub fn get_int(&self, key: &str) -> Result<i32, ParamError> {
        self.get_as(key)
    }

    pub fn get_int_with_default(&self, key: &str, default: i32) -> Result<i32, ParamError> {
        self.get_as_or(key, default)
    }

    pub fn get_int64(&self, key: &str) -> Result<i64, ParamError> {
        self.get_as(key)
    }

    pub fn get_int64_with_default(&self, key: &str, default: i64) -> Result<i64, ParamError> {
        self.get_as_or(key, default)
    }

    pub fn get_float64(&self, key: &str) -> Result<f64, ParamError> {
        self.get_as(key)
    }

    pub fn get_float64_with_default(&self, key: &str, default: f64) -> Result<f64, ParamError> {
        self.get_as_or(key, default)
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ParamError> {
        self.get_as(key)
    }

    pub fn get_bool_with_default(&self, key: &str, default: bool) -> Result<bool, ParamError> {
        self.get_as_or(key, default)
    }

    pub fn get_slice(&self, key: &str) -> Result<Vec<ParamValue>, ParamError> {
        self.get_as(key)
    }

    pub fn get_slice_with_default(
        &self,
        key: &str,
        default: Vec<ParamValue>,
    ) -> Result<Vec<ParamValue>, ParamError> {
        self.get_as_or(key, default)
    }

    pub fn get_object(&self, key: &str) -> Result<BTreeMap<String, ParamValue>, ParamError> {
        self.get_as(key)
    }

    /// Deserialize the value for `key` into any serde type
    pub fn decode<T: DeserializeOwned>(&self, key: &str) -> Result<T, ParamError> {
        let value = self.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_string(),
        })?;
        serde_json::from_value(serde_json::Value::from(value)).map_err(|e| ParamError::Malformed {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}

impl From<BTreeMap<String, ParamValue>> for Parameters {
    fn from(values: BTreeMap<String, ParamValue>) -> Self {
        Parameters { values }
    }
}

impl FromIterator<(String, ParamValue)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Parameters {
            values: iter.into_iter().collect(),
        }
    }
}
