//! YAML scenario plans.
//!
//! A plan file is an optional, version-controllable alternative to setting
//! every environment variable by hand. Every field is optional; environment
//! variables still take precedence over anything set here.
//!
//! ```yaml
//! baseUrl: https://staging.example.com
//! citiesFile: ./cities.json
//! seed: 42
//! timeout: 10s
//! actors:
//!   guests: 10
//!   owners: 3
//! hotelsPerOwner: "1-2"
//! roomTypesPerHotel: 2
//! report:
//!   format: json
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration as StdDuration;
use thiserror::Error;

use crate::config_validation::{
    CountRangeValidator, RangeValidator, UrlValidator, ValidationContext, MAX_COUNT,
};
use crate::scenario::CountRange;

#[derive(Error, Debug)]
pub enum YamlConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Duration written as seconds (`30`) or with a unit (`"30s"`, `"500ms"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YamlDuration {
    Seconds(u64),
    String(String),
}

impl YamlDuration {
    pub fn to_std_duration(&self) -> Result<StdDuration, YamlConfigError> {
        match self {
            YamlDuration::Seconds(s) => Ok(StdDuration::from_secs(*s)),
            YamlDuration::String(s) => crate::utils::parse_duration_string(s).map_err(|e| {
                YamlConfigError::Validation(format!("Invalid duration '{}': {}", s, e))
            }),
        }
    }
}

/// Count written as a number (`2`) or a range (`"1-3"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YamlCount {
    Fixed(u32),
    Range(String),
}

impl YamlCount {
    pub fn to_count_range(&self) -> Result<CountRange, YamlConfigError> {
        match self {
            YamlCount::Fixed(n) => Ok(CountRange::fixed(*n)),
            YamlCount::Range(s) => s.parse().map_err(YamlConfigError::Validation),
        }
    }

    fn as_text(&self) -> String {
        match self {
            YamlCount::Fixed(n) => n.to_string(),
            YamlCount::Range(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlActors {
    pub guests: Option<u32>,
    pub owners: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct YamlReport {
    pub format: Option<String>,
}

/// Root of a plan file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct YamlPlan {
    pub base_url: Option<String>,

    pub cities_file: Option<String>,

    pub seed: Option<u64>,

    pub timeout: Option<YamlDuration>,

    pub skip_tls_verify: Option<bool>,

    pub custom_headers: Option<String>,

    #[serde(default)]
    pub actors: YamlActors,

    pub hotels_per_owner: Option<YamlCount>,

    pub room_types_per_hotel: Option<YamlCount>,

    #[serde(default)]
    pub report: YamlReport,

    pub metrics_port: Option<u16>,
}

impl YamlPlan {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, YamlConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate. An empty document is an empty plan.
    pub fn parse(content: &str) -> Result<Self, YamlConfigError> {
        let plan: YamlPlan = if content.trim().is_empty() {
            YamlPlan::default()
        } else {
            serde_yaml::from_str(content)?
        };
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<(), YamlConfigError> {
        let mut ctx = ValidationContext::new();

        if let Some(url) = &self.base_url {
            ctx.enter("baseUrl");
            ctx.check(UrlValidator::validate(url));
            ctx.exit();
        }

        if let Some(timeout) = &self.timeout {
            ctx.enter("timeout");
            match timeout.to_std_duration() {
                Ok(d) if d.is_zero() => ctx.field_error("Timeout must be positive".to_string()),
                Ok(_) => {}
                Err(e) => ctx.field_error(e.to_string()),
            }
            ctx.exit();
        }

        ctx.enter("actors");
        for (field, value) in [("guests", self.actors.guests), ("owners", self.actors.owners)] {
            if let Some(count) = value {
                ctx.enter(field);
                ctx.check(RangeValidator::validate_u64(count as u64, 0, MAX_COUNT, field));
                ctx.exit();
            }
        }
        ctx.exit();

        for (field, value) in [
            ("hotelsPerOwner", &self.hotels_per_owner),
            ("roomTypesPerHotel", &self.room_types_per_hotel),
        ] {
            if let Some(count) = value {
                ctx.enter(field);
                ctx.check(CountRangeValidator::validate(&count.as_text(), field));
                ctx.exit();
            }
        }

        if let Some(format) = &self.report.format {
            ctx.enter("report");
            ctx.enter("format");
            if !matches!(format.to_lowercase().as_str(), "text" | "json") {
                ctx.field_error(format!(
                    "Unknown report format '{}'. Use 'text' or 'json'.",
                    format
                ));
            }
            ctx.exit();
            ctx.exit();
        }

        ctx.into_result()
            .map_err(|e| YamlConfigError::Validation(e.to_string()))
    }
}
