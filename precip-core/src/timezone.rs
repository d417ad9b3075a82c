//! Coordinate to timezone lookup and local calendar dates.

use std::sync::OnceLock;

use chrono::DateTime;
use chrono_tz::Tz;
use tzf_rs::DefaultFinder;

use crate::{error::AdapterError, model::ValidatedInput};

static FINDER: OnceLock<DefaultFinder> = OnceLock::new();

fn finder() -> &'static DefaultFinder {
    FINDER.get_or_init(DefaultFinder::new)
}

/// IANA zone containing `(lat, lon)`.
pub fn resolve(lat: f64, lon: f64) -> Result<Tz, AdapterError> {
    let unresolved = || AdapterError::TimezoneResolution { lat, lon };

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(unresolved());
    }

    let name = finder().get_tz_name(lon, lat);
    if name.is_empty() {
        return Err(unresolved());
    }

    name.parse::<Tz>().map_err(|_| unresolved())
}

/// `YYYY-MM-DD` of `timestamp` as read on a calendar in `tz`.
pub fn local_date(timestamp: i64, tz: Tz) -> Result<String, AdapterError> {
    let utc = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        AdapterError::invalid_parameter("date", format!("{timestamp} is out of range"))
    })?;

    Ok(utc.with_timezone(&tz).format("%Y-%m-%d").to_string())
}

/// Resolve zone and date for a validated input.
pub fn localize(input: &ValidatedInput) -> Result<(Tz, String), AdapterError> {
    let tz = resolve(input.lat.value, input.lon.value)?;
    let date = local_date(input.timestamp, tz)?;
    Ok((tz, date))
}
