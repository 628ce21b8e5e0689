//! Record Validator for Range Checking

use crate::error::ValidationError;
use feature_engine::CustomerRecord;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Tenure valid range (months)
    pub tenure_range: (f64, f64),
    /// Monthly charges valid range
    pub monthly_charges_range: (f64, f64),
    /// Total charges valid range
    pub total_charges_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            tenure_range: (0.0, 72.0),
            monthly_charges_range: (0.0, 1000.0),
            total_charges_range: (0.0, 100_000.0),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }

    /// All error messages joined for display
    pub fn message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Range validator for customer records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against an inclusive range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            Err(ValidationError::NotFinite { field })
        } else if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate tenure, a whole number of months
    pub fn validate_tenure(&self, tenure: f64) -> Result<(), ValidationError> {
        self.validate_range("tenure", tenure, self.config.tenure_range)?;
        if tenure.fract() != 0.0 {
            return Err(ValidationError::NotWholeNumber {
                field: "tenure",
                value: tenure,
            });
        }
        Ok(())
    }

    /// Validate monthly charges
    pub fn validate_monthly_charges(&self, amount: f64) -> Result<(), ValidationError> {
        self.validate_range("MonthlyCharges", amount, self.config.monthly_charges_range)
    }

    /// Validate total charges
    pub fn validate_total_charges(&self, amount: f64) -> Result<(), ValidationError> {
        self.validate_range("TotalCharges", amount, self.config.total_charges_range)
    }

    /// Validate the senior citizen flag
    pub fn validate_senior_citizen(&self, flag: u8) -> Result<(), ValidationError> {
        if flag > 1 {
            Err(ValidationError::InvalidFlag {
                field: "SeniorCitizen",
                value: flag,
            })
        } else {
            Ok(())
        }
    }

    /// Validate every range-constrained field, collecting all violations
    pub fn validate_record(&self, record: &CustomerRecord) -> ValidationResult {
        let checks = [
            self.validate_senior_citizen(record.senior_citizen),
            self.validate_tenure(record.tenure),
            self.validate_monthly_charges(record.monthly_charges),
            self.validate_total_charges(record.total_charges),
        ];
        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            debug!("Record failed validation: {:?}", errors);
            ValidationResult::invalid(errors, fields_checked)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
