//! Feature Vector Assembly

use crate::error::AlignError;
use crate::record::{indicator_column, RawRecord, RawValue};
use crate::scaler::Transformer;
use crate::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// What to do with a categorical level outside the trained enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLevelPolicy {
    /// Fail the request with [`AlignError::UnknownLevel`]
    #[default]
    Reject,
    /// Encode the attribute as all-zero indicators and keep going
    ZeroFill,
}

/// Feature vector aligned with a [`FeatureSchema`]
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Column names, shared with the schema
    columns: Arc<[String]>,
    /// One value per column, in schema order
    values: Vec<f64>,
    /// Attributes whose unknown level was encoded as all zeros
    zero_filled: Vec<String>,
}

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named column
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// (column, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter().copied())
    }

    /// Attributes encoded as all zeros because their level was unknown
    pub fn zero_filled(&self) -> &[String] {
        &self.zero_filled
    }
}

/// Turns raw records into schema-exact feature vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureAligner {
    policy: UnknownLevelPolicy,
}

impl FeatureAligner {
    /// Create an aligner with the given unknown-level policy
    pub fn new(policy: UnknownLevelPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> UnknownLevelPolicy {
        self.policy
    }

    /// Align a record with the schema and scale its numeric columns
    pub fn align(
        &self,
        record: &RawRecord,
        schema: &FeatureSchema,
        scaler: &dyn Transformer,
    ) -> Result<FeatureVector, AlignError> {
        let (expanded, zero_filled) = self.expand(record, schema)?;

        // Select and order; absent indicators encode the reference level
        let mut values = Vec::with_capacity(schema.len());
        for column in schema.columns() {
            match expanded.get(column.as_str()) {
                Some(value) if !value.is_finite() => {
                    return Err(AlignError::NonFiniteValue {
                        column: column.clone(),
                    })
                }
                Some(value) => values.push(*value),
                None if schema.is_indicator(column) => values.push(0.0),
                None => {
                    return Err(AlignError::SchemaMismatch {
                        column: column.clone(),
                    })
                }
            }
        }

        let dropped: Vec<&str> = expanded
            .keys()
            .filter(|c| schema.position(c).is_none())
            .map(String::as_str)
            .collect();
        if !dropped.is_empty() {
            debug!("Dropping {} columns not in schema: {:?}", dropped.len(), dropped);
        }

        let positions = schema.numeric_positions();
        let numeric: Vec<f64> = positions.iter().map(|&i| values[i]).collect();
        let scaled = scaler.transform(&numeric)?;
        if scaled.len() != positions.len() {
            return Err(crate::ScalingError::WidthMismatch {
                expected: positions.len(),
                actual: scaled.len(),
            }
            .into());
        }
        for (&i, value) in positions.iter().zip(scaled) {
            values[i] = value;
        }

        Ok(FeatureVector {
            columns: schema.column_names(),
            values,
            zero_filled,
        })
    }

    /// One-hot expand categorical attributes and pass numbers through
    fn expand(
        &self,
        record: &RawRecord,
        schema: &FeatureSchema,
    ) -> Result<(HashMap<String, f64>, Vec<String>), AlignError> {
        let mut expanded = HashMap::with_capacity(record.len());
        let mut zero_filled = Vec::new();

        for attribute in schema.categorical_columns() {
            let level = match record.get(attribute) {
                Some(RawValue::Category(level)) => level,
                Some(RawValue::Number(_)) => {
                    return Err(AlignError::UnexpectedValueKind {
                        attribute: attribute.clone(),
                        expected: "categorical",
                    })
                }
                None => {
                    return Err(AlignError::MissingAttribute {
                        attribute: attribute.clone(),
                    })
                }
            };

            let known = schema
                .levels(attribute)
                .is_some_and(|levels| levels.iter().any(|l| l == level));
            if !known {
                match self.policy {
                    UnknownLevelPolicy::Reject => {
                        return Err(AlignError::UnknownLevel {
                            attribute: attribute.clone(),
                            level: level.clone(),
                        })
                    }
                    UnknownLevelPolicy::ZeroFill => {
                        warn!("Unknown level {:?} for {}, encoding as all zeros", level, attribute);
                        zero_filled.push(attribute.clone());
                        continue;
                    }
                }
            }

            let column = indicator_column(attribute, level);
            if schema.position(&column).is_some() {
                expanded.insert(column, 1.0);
            } else {
                debug!("{} = {:?} is the reference level", attribute, level);
            }
        }

        for (attribute, value) in record.iter() {
            if schema.is_categorical(attribute) {
                continue;
            }
            // Indicators only ever come from expanding a categorical attribute
            if schema.is_indicator(attribute) {
                return Err(AlignError::EncodedIndicator {
                    column: attribute.to_string(),
                });
            }
            match value {
                RawValue::Number(number) => {
                    expanded.insert(attribute.to_string(), *number);
                }
                RawValue::Category(_) if schema.position(attribute).is_some() => {
                    return Err(AlignError::UnexpectedValueKind {
                        attribute: attribute.to_string(),
                        expected: "numeric",
                    })
                }
                RawValue::Category(level) => {
                    debug!("Ignoring categorical attribute {} = {:?} not in schema", attribute, level);
                }
            }
        }

        Ok((expanded, zero_filled))
    }
}
