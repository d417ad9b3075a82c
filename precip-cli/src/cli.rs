use std::io::Read;

use anyhow::{Context, Result, anyhow};
use chrono::DateTime;
use clap::{Parser, Subcommand, ValueEnum};
use precip_core::{
    Config, Processor, handle_event, handle_http, handle_proxy_event, provider_from_config,
};
use serde_json::{Value, json};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "precip", version, about = "dClimate daily precipitation adapter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the dClimate auth token in the config file.
    Configure,

    /// Run a job given as JSON (from --job or stdin).
    Run {
        /// Job JSON, e.g. '{"id":"1","data":{"lat":"36.53","lon":"-116.93","date":1634023282}}'.
        #[arg(long)]
        job: Option<String>,

        /// Runtime shape the job is wrapped in.
        #[arg(long, value_enum, default_value_t = Shape::Http)]
        shape: Shape,
    },

    /// Fetch the precipitation for a location and date.
    Fetch {
        #[arg(long, allow_hyphen_values = true)]
        lat: String,

        #[arg(long, allow_hyphen_values = true)]
        lon: String,

        /// Unix seconds or an RFC 3339 timestamp.
        #[arg(long)]
        date: String,

        /// Catalog path; defaults to the configured one.
        #[arg(long)]
        endpoint: Option<String>,

        /// Job id echoed in the envelope.
        #[arg(long)]
        id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// Job is the request body; prints the envelope.
    Http,
    /// Job is the event; prints the envelope.
    Event,
    /// Job is JSON-encoded in the event's `body`; prints the proxy response.
    Proxy,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Run { job, shape } => {
                let raw = match job {
                    Some(job) => job,
                    None => read_stdin()?,
                };
                let input: Value = serde_json::from_str(&raw).context("Job is not valid JSON")?;
                let processor = build_processor()?;

                let output = match shape {
                    Shape::Http => {
                        let (status, envelope) = handle_http(&processor, &input).await;
                        tracing::debug!(status, "http job finished");
                        serde_json::to_value(envelope)?
                    }
                    Shape::Event => serde_json::to_value(handle_event(&processor, &input).await)?,
                    Shape::Proxy => {
                        serde_json::to_value(handle_proxy_event(&processor, &input).await)?
                    }
                };

                println!("{}", serde_json::to_string_pretty(&output)?);
                Ok(())
            }
            Command::Fetch { lat, lon, date, endpoint, id } => {
                let job = fetch_job(lat, lon, &date, endpoint, id)?;
                let processor = build_processor()?;
                let response = processor.process(&job).await;

                println!("{}", serde_json::to_string_pretty(&response.envelope)?);
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let token = inquire::Password::new("dClimate auth token:")
        .without_confirmation()
        .prompt()
        .context("Failed to read auth token")?;

    if token.trim().is_empty() {
        return Err(anyhow!("Auth token must not be empty"));
    }

    config.set_auth_token(token.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_processor() -> Result<Processor> {
    let config = Config::load()?.with_env_overrides();
    let provider = provider_from_config(&config)?;
    Ok(Processor::new(provider, &config))
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin().read_to_string(&mut buf).context("Failed to read job from stdin")?;
    Ok(buf)
}

fn fetch_job(
    lat: String,
    lon: String,
    date: &str,
    endpoint: Option<String>,
    id: Option<String>,
) -> Result<Value> {
    let mut data = json!({ "lat": lat, "lon": lon, "date": parse_date(date)? });
    if let Some(endpoint) = endpoint {
        data["endpoint"] = Value::String(endpoint);
    }

    let mut job = json!({ "data": data });
    if let Some(id) = id {
        job["id"] = Value::String(id);
    }
    Ok(job)
}

/// Unix seconds, or an RFC 3339 timestamp converted to unix seconds.
fn parse_date(date: &str) -> Result<i64> {
    if let Ok(ts) = date.trim().parse::<i64>() {
        return Ok(ts);
    }

    DateTime::parse_from_rfc3339(date.trim())
        .map(|dt| dt.timestamp())
        .with_context(|| format!("'{date}' is neither unix seconds nor an RFC 3339 timestamp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_unix_and_rfc3339() {
        assert_eq!(parse_date("1634023282").unwrap(), 1_634_023_282);
        assert_eq!(parse_date("2021-10-12T07:21:22Z").unwrap(), 1_634_023_282);
        assert_eq!(parse_date("2021-10-12T00:21:22-07:00").unwrap(), 1_634_023_282);
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn fetch_job_only_sets_given_fields() {
        let job = fetch_job("36.53".into(), "-116.93".into(), "1634023282", None, None).unwrap();
        assert_eq!(
            job,
            json!({ "data": { "lat": "36.53", "lon": "-116.93", "date": 1634023282 } })
        );

        let job = fetch_job(
            "36.53".into(),
            "-116.93".into(),
            "1634023282",
            Some("grid-history/other".into()),
            Some("7".into()),
        )
        .unwrap();
        assert_eq!(job["id"], "7");
        assert_eq!(job["data"]["endpoint"], "grid-history/other");
    }

    #[test]
    fn cli_parses_negative_longitude() {
        let cli = Cli::parse_from([
            "precip", "fetch", "--lat", "36.53", "--lon", "-116.93", "--date", "1634023282",
        ]);
        let Command::Fetch { lon, .. } = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(lon, "-116.93");
    }
}
