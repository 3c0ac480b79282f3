//! Field-level validation for scenario configuration.
//!
//! Errors carry the dotted path of the offending field
//! (`actors.guests`, `roomTypesPerHotel`), and a [`ValidationContext`]
//! collects every problem in one pass instead of stopping at the first.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Field '{field}': value {value} is out of range ({min} to {max})")]
    OutOfRange {
        field: String,
        value: String,
        min: String,
        max: String,
    },

    #[error("Field '{field}': invalid format - {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Multiple validation errors: {0}")]
    Multiple(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Collects errors while walking nested fields.
#[derive(Debug, Default)]
pub struct ValidationContext {
    field_path: Vec<String>,
    errors: Vec<ValidationError>,
}

impl ValidationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, field: &str) {
        self.field_path.push(field.to_string());
    }

    pub fn exit(&mut self) {
        self.field_path.pop();
    }

    pub fn current_path(&self) -> String {
        self.field_path.join(".")
    }

    /// Record an error at the current path.
    pub fn field_error(&mut self, message: String) {
        self.errors.push(ValidationError::FieldError {
            field: self.current_path(),
            message,
        });
    }

    /// Record the error of a validator, if any.
    pub fn check(&mut self, result: ValidationResult<()>) {
        if let Err(e) = result {
            self.field_error(e.to_string());
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_result(self) -> ValidationResult<()> {
        let mut errors = self.errors;
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => {
                let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                Err(ValidationError::Multiple(messages.join("; ")))
            }
        }
    }
}

pub struct UrlValidator;

impl UrlValidator {
    /// An absolute http(s) URL.
    pub fn validate(url: &str) -> ValidationResult<()> {
        let invalid = |message: String| ValidationError::InvalidFormat {
            field: "url".to_string(),
            message,
        };

        if url.is_empty() {
            return Err(invalid("URL cannot be empty".to_string()));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(invalid(format!(
                "URL must start with http:// or https://, got: {}",
                url
            )));
        }
        reqwest::Url::parse(url).map_err(|e| invalid(format!("{}: {}", url, e)))?;
        Ok(())
    }
}

pub struct RangeValidator;

impl RangeValidator {
    pub fn validate_u64(value: u64, min: u64, max: u64, field: &str) -> ValidationResult<()> {
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
                min: min.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }
}

/// Upper bound on any actor or per-parent entity count.
pub const MAX_COUNT: u64 = 1000;

pub struct CountRangeValidator;

impl CountRangeValidator {
    /// A `"min-max"` or `"n"` count within `0..=MAX_COUNT`.
    pub fn validate(range: &str, field: &str) -> ValidationResult<()> {
        let parsed: crate::scenario::CountRange =
            range.parse().map_err(|message| ValidationError::InvalidFormat {
                field: field.to_string(),
                message,
            })?;
        RangeValidator::validate_u64(parsed.max as u64, 0, MAX_COUNT, field)
    }
}
