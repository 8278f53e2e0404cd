// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::ConditionError;

// Option keys are case-insensitive; fold them so serde sees lowercase names.
fn fold_keys(options: &Value) -> Value {
    match options {
        Value::Null => Value::Object(Map::new()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

pub(super) fn parse<T: DeserializeOwned>(
    result: &str,
    options: &Value,
) -> Result<T, ConditionError> {
    serde_json::from_value(fold_keys(options)).map_err(|err| ConditionError::BadOptions {
        result: result.to_owned(),
        message: err.to_string(),
    })
}

/// Instance filenames; blank means unset.
pub(super) fn instance(file: Option<String>) -> Option<String> {
    file.filter(|f| !f.trim().is_empty())
}

pub(super) const fn yes() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBool {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts JSON booleans, integers, or keyvalue-style strings such as `"1"`.
pub(super) fn flex_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    match RawBool::deserialize(de)? {
        RawBool::Bool(b) => Ok(b),
        RawBool::Int(n) => Ok(n != 0),
        RawBool::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "t" => Ok(true),
            "0" | "false" | "no" | "n" | "f" | "" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("expected a boolean, got {s:?}"))),
        },
    }
}
