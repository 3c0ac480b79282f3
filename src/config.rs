//! Run configuration.
//!
//! Values resolve with precedence: environment variables, then the YAML plan
//! named by `SCENARIO_FILE`, then defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tokio::time::Duration;
use tracing::info;

use crate::client::ClientConfig;
use crate::config_validation::{RangeValidator, UrlValidator, MAX_COUNT};
use crate::scenario::{CountRange, ScenarioPlan};
use crate::utils::parse_duration_string;
use crate::yaml_config::{YamlConfigError, YamlPlan};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'. {reason}")]
    InvalidValue {
        var: String,
        value: String,
        reason: String,
    },

    #[error("Scenario file {path}: {source}")]
    ScenarioFile {
        path: String,
        #[source]
        source: YamlConfigError,
    },
}

impl ConfigError {
    fn invalid(var: &str, value: &str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            var: var.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("Unknown report format '{}'. Use 'text' or 'json'.", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Everything needed to start a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub cities_file: Option<PathBuf>,

    /// `None` means draw one from entropy at startup.
    pub seed: Option<u64>,

    pub plan: ScenarioPlan,
    pub request_timeout: Duration,
    pub skip_tls_verify: bool,
    pub custom_headers: Option<String>,
    pub report_format: ReportFormat,
    pub metrics_port: Option<u16>,
    pub log_format: LogFormat,
    pub scenario_file: Option<PathBuf>,
}

impl Config {
    /// Load from environment variables, layering over `SCENARIO_FILE` if set.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env_string("SCENARIO_FILE") {
            Some(path) => {
                let plan = YamlPlan::from_file(&path).map_err(|source| {
                    ConfigError::ScenarioFile {
                        path: path.clone(),
                        source,
                    }
                })?;
                let mut config = Self::from_yaml_with_env_overrides(&plan)?;
                config.scenario_file = Some(PathBuf::from(path));
                Ok(config)
            }
            None => Self::from_yaml_with_env_overrides(&YamlPlan::default()),
        }
    }

    /// Resolve every field as env > `plan` > default.
    pub fn from_yaml_with_env_overrides(plan: &YamlPlan) -> Result<Self, ConfigError> {
        let base_url = env_string("BASE_URL")
            .or_else(|| plan.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        UrlValidator::validate(&base_url)
            .map_err(|e| ConfigError::invalid("BASE_URL", &base_url, e.to_string()))?;

        let cities_file = env_string("CITIES_FILE")
            .or_else(|| plan.cities_file.clone())
            .map(PathBuf::from);

        let seed = match env_string("SIM_SEED") {
            Some(raw) => Some(parse_number::<u64>("SIM_SEED", &raw)?),
            None => plan.seed,
        };

        let defaults = ScenarioPlan::default();
        let guests = resolve_count("NUM_GUESTS", plan.actors.guests, defaults.guests)?;
        let owners = resolve_count("NUM_OWNERS", plan.actors.owners, defaults.owners)?;
        let hotels_per_owner = resolve_range(
            "HOTELS_PER_OWNER",
            plan.hotels_per_owner.as_ref().map(|c| c.to_count_range()),
            defaults.hotels_per_owner,
        )?;
        let room_types_per_hotel = resolve_range(
            "ROOM_TYPES_PER_HOTEL",
            plan.room_types_per_hotel.as_ref().map(|c| c.to_count_range()),
            defaults.room_types_per_hotel,
        )?;

        let request_timeout = match env_string("REQUEST_TIMEOUT") {
            Some(raw) => {
                let timeout = parse_duration_string(&raw)
                    .map_err(|e| ConfigError::invalid("REQUEST_TIMEOUT", &raw, e))?;
                if timeout.is_zero() {
                    return Err(ConfigError::invalid(
                        "REQUEST_TIMEOUT",
                        &raw,
                        "Timeout must be positive",
                    ));
                }
                timeout
            }
            None => match &plan.timeout {
                Some(timeout) => timeout
                    .to_std_duration()
                    .map_err(|e| ConfigError::invalid("timeout", "", e.to_string()))?,
                None => Duration::from_secs(30),
            },
        };

        let skip_tls_verify = match env_string("SKIP_TLS_VERIFY") {
            Some(raw) => raw.to_lowercase() == "true",
            None => plan.skip_tls_verify.unwrap_or(false),
        };

        let custom_headers = env_string("CUSTOM_HEADERS").or_else(|| plan.custom_headers.clone());

        let report_format_raw = env_string("REPORT_FORMAT")
            .or_else(|| plan.report.format.clone())
            .unwrap_or_else(|| "text".to_string());
        let report_format = report_format_raw
            .parse()
            .map_err(|e: String| ConfigError::invalid("REPORT_FORMAT", &report_format_raw, e))?;

        let metrics_port = match env_string("METRICS_PORT") {
            Some(raw) => Some(parse_number::<u16>("METRICS_PORT", &raw)?),
            None => plan.metrics_port,
        };

        let log_format = match env_string("LOG_FORMAT") {
            Some(raw) if raw.to_lowercase() == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Config {
            base_url,
            cities_file,
            seed,
            plan: ScenarioPlan {
                guests,
                owners,
                hotels_per_owner,
                room_types_per_hotel,
            },
            request_timeout,
            skip_tls_verify,
            custom_headers,
            report_format,
            metrics_port,
            log_format,
            scenario_file: None,
        })
    }

    pub fn to_client_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: self.request_timeout,
            skip_tls_verify: self.skip_tls_verify,
            custom_headers: self.custom_headers.clone(),
        }
    }

    /// Log the resolved configuration.
    pub fn log_summary(&self, seed: u64, parsed_headers: &reqwest::header::HeaderMap) {
        info!(
            base_url = %self.base_url,
            scenario_file = ?self.scenario_file,
            cities_file = ?self.cities_file,
            seed,
            seed_source = if self.seed.is_some() { "configured" } else { "entropy" },
            guests = self.plan.guests,
            owners = self.plan.owners,
            hotels_per_owner = %self.plan.hotels_per_owner,
            room_types_per_hotel = %self.plan.room_types_per_hotel,
            request_timeout = ?self.request_timeout,
            skip_tls_verify = self.skip_tls_verify,
            custom_headers = parsed_headers.len(),
            report_format = ?self.report_format,
            metrics_port = ?self.metrics_port,
            "Configuration loaded"
        );
        for (name, value) in parsed_headers.iter() {
            info!(
                header = %name,
                value = value.to_str().unwrap_or("<non-ASCII or sensitive value>"),
                "Custom header"
            );
        }
    }
}

/// Usage text printed when configuration fails.
pub fn help_text() -> &'static str {
    r#"Environment variables (override SCENARIO_FILE values):
  BASE_URL              Target API root (default: http://localhost:3000)
  SCENARIO_FILE         Optional YAML scenario plan
  CITIES_FILE           JSON list of {city, country} (default: ./cities.json, else built-in)
  SIM_SEED              Seed for all selection and payload randomness (default: random)
  NUM_GUESTS            Guests to register (default: 3)
  NUM_OWNERS            Hotel owners to register (default: 2)
  HOTELS_PER_OWNER      Count or range, e.g. "1-2" (default: 1-2)
  ROOM_TYPES_PER_HOTEL  Count or range, e.g. "1-3" (default: 1-3)
  REQUEST_TIMEOUT       Per-request timeout, e.g. "30s" (default: 30s)
  SKIP_TLS_VERIFY       "true" to accept invalid certificates
  CUSTOM_HEADERS        "Name:Value,Other:Value" (escape commas as \,)
  REPORT_FORMAT         text | json (default: text)
  METRICS_PORT          Serve Prometheus metrics on this port
  LOG_FORMAT            json for JSON log lines
  RUST_LOG              Log filter (default: info)"#
}

fn env_string(var: &str) -> Option<String> {
    env::var(var).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number<T: FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::invalid(var, raw, "Must be a non-negative integer"))
}

fn resolve_count(var: &str, yaml_value: Option<u32>, default: u32) -> Result<u32, ConfigError> {
    let count = match env_string(var) {
        Some(raw) => parse_number::<u32>(var, &raw)?,
        None => yaml_value.unwrap_or(default),
    };
    RangeValidator::validate_u64(count as u64, 0, MAX_COUNT, var)
        .map_err(|e| ConfigError::invalid(var, &count.to_string(), e.to_string()))?;
    Ok(count)
}

fn resolve_range(
    var: &str,
    yaml_value: Option<Result<CountRange, YamlConfigError>>,
    default: CountRange,
) -> Result<CountRange, ConfigError> {
    let range = match env_string(var) {
        Some(raw) => raw
            .parse::<CountRange>()
            .map_err(|e| ConfigError::invalid(var, &raw, e))?,
        None => match yaml_value {
            Some(parsed) => parsed.map_err(|e| ConfigError::invalid(var, "", e.to_string()))?,
            None => default,
        },
    };
    RangeValidator::validate_u64(range.max as u64, 0, MAX_COUNT, var)
        .map_err(|e| ConfigError::invalid(var, &range.to_string(), e.to_string()))?;
    Ok(range)
}
