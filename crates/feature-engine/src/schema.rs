//! Training-time Feature Schema

use crate::error::SchemaError;
use crate::record::indicator_column;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Column layout the classifier was trained on
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    /// Ordered feature column names
    columns: Arc<[String]>,
    /// Columns rescaled by the fitted scaler, in scaler order
    numeric_columns: Vec<String>,
    /// Source attributes expanded into indicator columns
    categorical_columns: Vec<String>,
    /// Full level enumeration per categorical attribute
    levels: BTreeMap<String, Vec<String>>,
    /// Column name to position
    index: HashMap<String, usize>,
    /// Every `{attribute}_{level}` name a known level can produce
    indicators: HashSet<String>,
    /// Positions of `numeric_columns` within `columns`
    numeric_positions: Vec<usize>,
}

impl FeatureSchema {
    /// Build and validate a schema
    pub fn new(
        columns: Vec<String>,
        numeric_columns: Vec<String>,
        categorical_columns: Vec<String>,
        levels: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, SchemaError> {
        if columns.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if index.insert(column.clone(), position).is_some() {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }

        let mut numeric_positions = Vec::with_capacity(numeric_columns.len());
        for column in &numeric_columns {
            if categorical_columns.contains(column) {
                return Err(SchemaError::CategoricalNumericOverlap(column.clone()));
            }
            match index.get(column) {
                Some(&position) => numeric_positions.push(position),
                None => return Err(SchemaError::NumericColumnNotInSchema(column.clone())),
            }
        }

        let mut indicators = HashSet::new();
        for attribute in &categorical_columns {
            let attribute_levels = levels
                .get(attribute)
                .filter(|l| !l.is_empty())
                .ok_or_else(|| SchemaError::MissingLevels(attribute.clone()))?;
            indicators.extend(
                attribute_levels
                    .iter()
                    .map(|level| indicator_column(attribute, level)),
            );
        }

        debug!(
            "Feature schema: {} columns, {} numeric, {} categorical attributes",
            columns.len(),
            numeric_columns.len(),
            categorical_columns.len()
        );

        Ok(Self {
            columns: columns.into(),
            numeric_columns,
            categorical_columns,
            levels,
            index,
            indicators,
            numeric_positions,
        })
    }

    /// Ordered column names
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Shared handle to the column names
    pub fn column_names(&self) -> Arc<[String]> {
        Arc::clone(&self.columns)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a validated schema
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Positions of the numeric columns, in scaler order
    pub fn numeric_positions(&self) -> &[usize] {
        &self.numeric_positions
    }

    /// Level enumeration of a categorical attribute
    pub fn levels(&self, attribute: &str) -> Option<&[String]> {
        self.levels.get(attribute).map(Vec::as_slice)
    }

    /// All level enumerations
    pub fn all_levels(&self) -> &BTreeMap<String, Vec<String>> {
        &self.levels
    }

    /// Position of a column
    pub fn position(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn is_categorical(&self, attribute: &str) -> bool {
        self.categorical_columns.iter().any(|c| c == attribute)
    }

    /// Whether `column` is an indicator some known level could set
    pub fn is_indicator(&self, column: &str) -> bool {
        self.indicators.contains(column)
    }
}
