//! Job input validation.
//!
//! Each parameter is looked up under a set of accepted aliases; the first alias
//! holding a non-null value wins.

use serde_json::{Map, Value};

use crate::{
    error::AdapterError,
    model::{Coordinate, ValidatedInput},
};

pub const LAT_ALIASES: &[&str] = &["lat"];
pub const LON_ALIASES: &[&str] = &["lon"];
pub const DATE_ALIASES: &[&str] = &["date", "day"];
pub const ENDPOINT_ALIASES: &[&str] = &["endpoint"];

/// Job id of a raw input, if it carries a usable one.
///
/// Extracted separately so errored envelopes can echo it even when the rest of
/// the input is rejected.
pub fn job_id(input: &Value) -> Option<String> {
    match input.get("id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Check a raw job input and pull out the typed parameters.
pub fn validate(input: &Value, default_endpoint: &str) -> Result<ValidatedInput, AdapterError> {
    let empty = Map::new();
    let data = input.get("data").and_then(Value::as_object).unwrap_or(&empty);

    let lat = parse_coordinate("lat", require_param(data, "lat", LAT_ALIASES)?)?;
    let lon = parse_coordinate("lon", require_param(data, "lon", LON_ALIASES)?)?;
    let timestamp = parse_timestamp("date", require_param(data, "date", DATE_ALIASES)?)?;

    let endpoint = match find_param(data, ENDPOINT_ALIASES) {
        None => default_endpoint.to_string(),
        Some(Value::String(s)) if s.trim().trim_matches('/').is_empty() => {
            default_endpoint.to_string()
        }
        Some(Value::String(s)) => s.trim().trim_matches('/').to_string(),
        Some(other) => {
            return Err(AdapterError::invalid_parameter(
                "endpoint",
                format!("expected a string, got {other}"),
            ));
        }
    };

    Ok(ValidatedInput { job_id: job_id(input), lat, lon, timestamp, endpoint })
}

fn find_param<'a>(data: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().filter_map(|alias| data.get(*alias)).find(|v| !v.is_null())
}

fn require_param<'a>(
    data: &'a Map<String, Value>,
    name: &str,
    aliases: &[&str],
) -> Result<&'a Value, AdapterError> {
    find_param(data, aliases).ok_or_else(|| AdapterError::missing_parameter(name))
}

fn parse_coordinate(name: &str, value: &Value) -> Result<Coordinate, AdapterError> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => {
            return Err(AdapterError::invalid_parameter(
                name,
                format!("expected a number, got {other}"),
            ));
        }
    };

    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Coordinate { raw, value: v }),
        _ => Err(AdapterError::invalid_parameter(name, format!("'{raw}' is not a number"))),
    }
}

fn parse_timestamp(name: &str, value: &Value) -> Result<i64, AdapterError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_seconds)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(whole_seconds))
        }
        _ => None,
    };

    parsed.ok_or_else(|| {
        AdapterError::invalid_parameter(name, format!("{value} is not a unix timestamp"))
    })
}

fn whole_seconds(v: f64) -> Option<i64> {
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64).then_some(v as i64)
}
