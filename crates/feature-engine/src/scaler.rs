//! Fitted Numeric Scalers

use crate::error::ScalingError;
use serde::{Deserialize, Serialize};

/// A fitted transform over the numeric feature slice
pub trait Transformer {
    /// Number of columns the transform was fitted on
    fn n_features(&self) -> usize;

    /// Transform one row of numeric values
    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError>;
}

fn check_row(values: &[f64], expected: usize) -> Result<(), ScalingError> {
    if values.len() != expected {
        return Err(ScalingError::WidthMismatch {
            expected,
            actual: values.len(),
        });
    }
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ScalingError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Zero-mean, unit-variance standardization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-column training mean
    pub mean: Vec<f64>,
    /// Per-column training standard deviation
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ScalingError> {
        let scaler = Self { mean, scale };
        scaler.check_parameters()?;
        Ok(scaler)
    }

    fn check_parameters(&self) -> Result<(), ScalingError> {
        if self.mean.len() != self.scale.len() {
            return Err(ScalingError::InvalidParameters(format!(
                "{} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }
}

impl Transformer for StandardScaler {
    fn n_features(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        self.check_parameters()?;
        check_row(values, self.n_features())?;

        Ok(values
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (mean, scale))| {
                // Constant training columns have zero variance
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (v - mean) / scale
            })
            .collect())
    }
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Maps the fitted `[data_min, data_max]` onto `feature_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    pub fn new(data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self, ScalingError> {
        let scaler = Self {
            data_min,
            data_max,
            feature_range: default_feature_range(),
        };
        scaler.check_parameters()?;
        Ok(scaler)
    }

    fn check_parameters(&self) -> Result<(), ScalingError> {
        if self.data_min.len() != self.data_max.len() {
            return Err(ScalingError::InvalidParameters(format!(
                "{} minimums but {} maximums",
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        if self.feature_range.0 >= self.feature_range.1 {
            return Err(ScalingError::InvalidParameters(format!(
                "empty feature range {:?}",
                self.feature_range
            )));
        }
        Ok(())
    }
}

impl Transformer for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.data_min.len()
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        self.check_parameters()?;
        check_row(values, self.n_features())?;

        let (low, high) = self.feature_range;
        Ok(values
            .iter()
            .zip(self.data_min.iter().zip(&self.data_max))
            .map(|(v, (min, max))| {
                let range = max - min;
                let range = if range == 0.0 { 1.0 } else { range };
                let scale = (high - low) / range;
                v * scale + (low - min * scale)
            })
            .collect())
    }
}

/// Any scaler an artifact can carry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FittedScaler {
    Standard(StandardScaler),
    MinMax(MinMaxScaler),
}

impl FittedScaler {
    /// Check the fitted parameters without transforming anything
    pub fn validate(&self) -> Result<(), ScalingError> {
        match self {
            FittedScaler::Standard(s) => s.check_parameters(),
            FittedScaler::MinMax(s) => s.check_parameters(),
        }
    }
}

impl Transformer for FittedScaler {
    fn n_features(&self) -> usize {
        match self {
            FittedScaler::Standard(s) => s.n_features(),
            FittedScaler::MinMax(s) => s.n_features(),
        }
    }

    fn transform(&self, values: &[f64]) -> Result<Vec<f64>, ScalingError> {
        match self {
            FittedScaler::Standard(s) => s.transform(values),
            FittedScaler::MinMax(s) => s.transform(values),
        }
    }
}
