//! Core library for the dClimate precipitation adapter.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Job validation and the timezone-aware date lookup
//! - The dClimate provider and its retrying requester
//! - The request processor and the runtime entrypoint adapters
//!
//! It is used by `precip-cli`, but can also be embedded in any serverless host.

pub mod config;
pub mod entrypoint;
pub mod error;
pub mod model;
pub mod processor;
pub mod provider;
pub mod requester;
pub mod timezone;
pub mod validate;

pub use config::Config;
pub use entrypoint::{ProxyResponse, handle_event, handle_http, handle_proxy_event};
pub use error::AdapterError;
pub use model::{AdapterResponse, Envelope, ErrorEnvelope, SuccessEnvelope};
pub use processor::Processor;
pub use provider::{PrecipitationProvider, dclimate::DClimateProvider, provider_from_config};
