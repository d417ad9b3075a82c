//! The request processor: one job in, exactly one `(statusCode, envelope)` out.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    Config,
    error::AdapterError,
    model::{AdapterResponse, Envelope, ResolvedQuery, UpstreamResponse, ValidatedInput},
    provider::PrecipitationProvider,
    timezone, validate,
};

pub const MM_PER_INCH: f64 = 25.4;

#[derive(Debug)]
pub struct Processor {
    provider: Box<dyn PrecipitationProvider>,
    default_endpoint: String,
    treat_zero_as_missing: bool,
}

impl Processor {
    pub fn new(provider: Box<dyn PrecipitationProvider>, config: &Config) -> Self {
        Self {
            provider,
            default_endpoint: config.default_endpoint.clone(),
            treat_zero_as_missing: config.treat_zero_as_missing,
        }
    }

    /// Run one job. Never fails: errors come back as a 500 errored envelope.
    #[instrument(skip_all, fields(job_id))]
    pub async fn process(&self, input: &Value) -> AdapterResponse {
        let job_id = validate::job_id(input);
        tracing::Span::current().record("job_id", job_id.as_deref().unwrap_or("-"));

        match self.run(input).await {
            Ok((status, result)) => {
                info!(status, result, "job completed");
                AdapterResponse::success(job_id, status, result)
            }
            Err(err) => {
                warn!(kind = err.name(), error = %err, detail = ?err, "job errored");
                AdapterResponse::errored(job_id, &err)
            }
        }
    }

    /// Callback form of [`Processor::process`]; `respond` is called exactly once.
    pub async fn process_with<F>(&self, input: &Value, respond: F)
    where
        F: FnOnce(u16, Envelope),
    {
        let response = self.process(input).await;
        respond(response.status_code, response.envelope);
    }

    async fn run(&self, input: &Value) -> Result<(u16, f64), AdapterError> {
        let validated = validate::validate(input, &self.default_endpoint)?;
        let query = resolve_query(&validated)?;
        debug!(time_zone = %query.time_zone, date = %query.formatted_date, "resolved local date");

        let UpstreamResponse { status, body } = self.provider.fetch_daily(&query).await?;

        let inches = extract_reading(&body, &query.formatted_date, self.treat_zero_as_missing)?;
        Ok((status, inches_to_millimetres(inches)?))
    }
}

/// Derive the upstream query, resolving the local date at the coordinates.
pub fn resolve_query(input: &ValidatedInput) -> Result<ResolvedQuery, AdapterError> {
    let (time_zone, formatted_date) = timezone::localize(input)?;

    Ok(ResolvedQuery {
        endpoint: input.endpoint.clone(),
        location: format!("{}_{}", input.lat.raw, input.lon.raw),
        time_zone,
        formatted_date,
    })
}

/// Reading in inches stored at `data.<date>`.
///
/// The upstream value looks like `"0.50 in"`; only the first token counts.
pub fn extract_reading(
    body: &Value,
    date: &str,
    treat_zero_as_missing: bool,
) -> Result<f64, AdapterError> {
    let value = body
        .get("data")
        .and_then(|data| data.get(date))
        .filter(|v| !v.is_null())
        .ok_or_else(|| AdapterError::DataNotFound { path: format!("data.{date}") })?;

    let invalid = || AdapterError::InvalidResult { value: value.to_string() };

    let reading = match value {
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<f64>().ok())
            .ok_or_else(invalid)?,
        Value::Number(n) => n.as_f64().ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    if !reading.is_finite() || (treat_zero_as_missing && reading == 0.0) {
        return Err(invalid());
    }

    Ok(reading)
}

/// Converted value must still be a finite number, or it would serialize as `null`.
pub fn inches_to_millimetres(inches: f64) -> Result<f64, AdapterError> {
    let mm = inches * MM_PER_INCH;
    if !mm.is_finite() {
        return Err(AdapterError::InvalidResult { value: inches.to_string() });
    }
    Ok(mm)
}
