//! Adapters between hosting runtimes and [`Processor`].
//!
//! Each one only reshapes the trigger's payload and the processor's
//! `(statusCode, envelope)` pair; none of them adds behaviour.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::AdapterError,
    model::{AdapterResponse, Envelope},
    processor::Processor,
};

/// HTTP-proxy style response for event runtimes that expect an encoded body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded [`Envelope`].
    pub body: String,
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

impl From<AdapterResponse> for ProxyResponse {
    fn from(response: AdapterResponse) -> Self {
        let body = serde_json::to_string(&response.envelope)
            .unwrap_or_else(|e| serialization_error_body(&e.to_string()));

        Self { status_code: response.status_code, body, is_base64_encoded: false }
    }
}

fn serialization_error_body(message: &str) -> String {
    json!({
        "status": "errored",
        "error": { "name": "SerializationError", "message": message },
        "statusCode": 500
    })
    .to_string()
}

/// Request body in, status and JSON body out.
pub async fn handle_http(processor: &Processor, body: &Value) -> (u16, Envelope) {
    let response = processor.process(body).await;
    (response.status_code, response.envelope)
}

/// The event itself is the job; only the envelope is returned.
pub async fn handle_event(processor: &Processor, event: &Value) -> Envelope {
    processor.process(event).await.envelope
}

/// The job arrives JSON-encoded in `event.body`.
pub async fn handle_proxy_event(processor: &Processor, event: &Value) -> ProxyResponse {
    match decode_body(event) {
        Ok(job) => processor.process(&job).await.into(),
        Err(err) => {
            tracing::warn!(error = %err, "could not decode proxy event body");
            AdapterResponse::errored(None, &err).into()
        }
    }
}

fn decode_body(event: &Value) -> Result<Value, AdapterError> {
    match event.get("body") {
        Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
            AdapterError::Validation(format!("Event body is not valid JSON: {e}"))
        }),
        // Some gateways hand over the body already decoded.
        Some(body @ Value::Object(_)) => Ok(body.clone()),
        _ => Err(AdapterError::Validation("Event carries no body".to_string())),
    }
}
