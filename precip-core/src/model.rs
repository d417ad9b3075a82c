use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;

/// Default dClimate catalog path when the job does not name one.
pub const DEFAULT_ENDPOINT: &str = "grid-history/cpcc_precip_us-daily";

/// A latitude or longitude as the caller sent it.
///
/// `raw` goes into the URL untouched, `value` is what the timezone lookup uses.
#[derive(Debug, Clone, PartialEq)]
pub struct Coordinate {
    pub raw: String,
    pub value: f64,
}

/// Job input after the required fields have been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub job_id: Option<String>,
    pub lat: Coordinate,
    pub lon: Coordinate,
    /// Unix seconds, UTC.
    pub timestamp: i64,
    pub endpoint: String,
}

/// Everything needed to address one daily record upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub endpoint: String,
    /// `<lat>_<lon>`
    pub location: String,
    pub time_zone: Tz,
    /// `YYYY-MM-DD` in `time_zone`.
    pub formatted_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultData {
    pub result: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    #[serde(rename = "jobRunID")]
    pub job_run_id: Option<String>,
    pub data: ResultData,
    pub result: f64,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Errored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub name: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "jobRunID")]
    pub job_run_id: Option<String>,
    pub status: JobStatus,
    pub error: ErrorDetail,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Response wrapper correlating a job id with either a result or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Success(SuccessEnvelope),
    Errored(ErrorEnvelope),
}

impl Envelope {
    pub fn success(job_run_id: Option<String>, status_code: u16, result: f64) -> Self {
        Envelope::Success(SuccessEnvelope {
            job_run_id,
            data: ResultData { result },
            result,
            status_code,
        })
    }

    pub fn errored(job_run_id: Option<String>, error: &AdapterError) -> Self {
        Envelope::Errored(ErrorEnvelope {
            job_run_id,
            status: JobStatus::Errored,
            error: ErrorDetail {
                name: error.name().to_string(),
                message: error.to_string(),
            },
            status_code: 500,
        })
    }

    pub fn job_run_id(&self) -> Option<&str> {
        match self {
            Envelope::Success(s) => s.job_run_id.as_deref(),
            Envelope::Errored(e) => e.job_run_id.as_deref(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Envelope::Success(s) => s.status_code,
            Envelope::Errored(e) => e.status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success(_))
    }
}

/// The `(statusCode, envelope)` pair a job completes with.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterResponse {
    pub status_code: u16,
    pub envelope: Envelope,
}

impl AdapterResponse {
    pub fn success(job_run_id: Option<String>, status_code: u16, result: f64) -> Self {
        Self { status_code, envelope: Envelope::success(job_run_id, status_code, result) }
    }

    pub fn errored(job_run_id: Option<String>, error: &AdapterError) -> Self {
        let envelope = Envelope::errored(job_run_id, error);
        Self { status_code: envelope.status_code(), envelope }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_mirrors_result_at_top_level() {
        let envelope = Envelope::success(Some("1".into()), 200, 12.7);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(
            json,
            json!({
                "jobRunID": "1",
                "data": { "result": 12.7 },
                "result": 12.7,
                "statusCode": 200
            })
        );
    }

    #[test]
    fn errored_envelope_without_job_id_serializes_null() {
        let err = AdapterError::missing_parameter("lat");
        let json = serde_json::to_value(Envelope::errored(None, &err)).unwrap();

        assert_eq!(json["jobRunID"], Value::Null);
        assert_eq!(json["status"], "errored");
        assert_eq!(json["statusCode"], 500);
        assert_eq!(json["error"]["name"], "ValidationError");
        assert_eq!(json["error"]["message"], "Required parameter not supplied: lat");
    }

    #[test]
    fn envelope_deserializes_into_the_right_variant() {
        let errored: Envelope = serde_json::from_value(json!({
            "jobRunID": "7",
            "status": "errored",
            "error": { "name": "InvalidResultError", "message": "Invalid result" },
            "statusCode": 500
        }))
        .unwrap();
        assert!(!errored.is_success());
        assert_eq!(errored.job_run_id(), Some("7"));

        let success: Envelope = serde_json::from_value(json!({
            "jobRunID": null,
            "data": { "result": 2.54 },
            "result": 2.54,
            "statusCode": 200
        }))
        .unwrap();
        assert!(success.is_success());
        assert_eq!(success.job_run_id(), None);
    }
}
