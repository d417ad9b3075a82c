use thiserror::Error;

/// Every way a single job can fail.
///
/// All of them end up as a 500 errored envelope; the variant only decides the
/// `error.name` and message the caller sees.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Missing or malformed `lat`, `lon` or `date`/`day`.
    #[error("{0}")]
    Validation(String),

    /// Coordinates do not map to any known IANA zone.
    #[error("Could not resolve a timezone for coordinates ({lat}, {lon})")]
    TimezoneResolution { lat: f64, lon: f64 },

    /// Upstream kept answering with its transient-error payload.
    #[error("dClimate reported an error on all {attempts} attempts")]
    UpstreamTransient { attempts: u32 },

    /// Network error, timeout, non-2xx status or unreadable body.
    #[error("{0}")]
    UpstreamFailure(String),

    /// Nothing stored at `data.<date>` in the response body.
    #[error("Result could not be found in path")]
    DataNotFound { path: String },

    /// Value present but zero or not a number.
    #[error("Invalid result")]
    InvalidResult { value: String },
}

impl AdapterError {
    pub fn missing_parameter(name: &str) -> Self {
        Self::Validation(format!("Required parameter not supplied: {name}"))
    }

    pub fn invalid_parameter(name: &str, reason: impl std::fmt::Display) -> Self {
        Self::Validation(format!("Invalid parameter '{name}': {reason}"))
    }

    /// Taxonomy name reported in the errored envelope.
    pub fn name(&self) -> &'static str {
        match self {
            AdapterError::Validation(_) => "ValidationError",
            AdapterError::TimezoneResolution { .. } => "TimezoneResolutionError",
            AdapterError::UpstreamTransient { .. } => "UpstreamTransientError",
            AdapterError::UpstreamFailure(_) => "UpstreamFailure",
            AdapterError::DataNotFound { .. } => "DataNotFoundError",
            AdapterError::InvalidResult { .. } => "InvalidResultError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_errors_keep_fixed_messages() {
        let not_found = AdapterError::DataNotFound { path: "data.2021-10-12".into() };
        assert_eq!(not_found.to_string(), "Result could not be found in path");

        let invalid = AdapterError::InvalidResult { value: "0 in".into() };
        assert_eq!(invalid.to_string(), "Invalid result");
    }

    #[test]
    fn missing_parameter_names_the_field() {
        let err = AdapterError::missing_parameter("lat");
        assert_eq!(err.name(), "ValidationError");
        assert!(err.to_string().contains("lat"));
    }
}
