//! Alignment, Scaling and Schema Error Types

use thiserror::Error;

/// Errors raised while building a [`FeatureSchema`](crate::FeatureSchema)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// No feature columns at all
    #[error("Feature schema has no columns")]
    Empty,

    /// Same column listed twice
    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),

    /// Numeric column that the classifier never sees
    #[error("Numeric column {0} is not part of the feature columns")]
    NumericColumnNotInSchema(String),

    /// Attribute listed both as numeric and categorical
    #[error("Column {0} is declared both numeric and categorical")]
    CategoricalNumericOverlap(String),

    /// Categorical attribute without a known level enumeration
    #[error("No level enumeration for categorical attribute {0}")]
    MissingLevels(String),
}

/// Errors raised by a [`Transformer`](crate::Transformer)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalingError {
    /// Numeric slice width differs from what the scaler was fitted on
    #[error("Scaler expects {expected} numeric columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    /// NaN or infinite value in the numeric slice
    #[error("Non-finite value at numeric column {index}")]
    NonFinite { index: usize },

    /// Fitted parameters are internally inconsistent
    #[error("Invalid scaler parameters: {0}")]
    InvalidParameters(String),
}

/// Errors during feature alignment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    /// Schema column that neither the record nor a known indicator can populate
    #[error("Schema mismatch: column {column} cannot be populated from the record")]
    SchemaMismatch { column: String },

    /// Categorical attribute the schema expands is absent from the record
    #[error("Schema mismatch: record has no value for categorical attribute {attribute}")]
    MissingAttribute { attribute: String },

    /// Value of the wrong kind for its attribute
    #[error("Schema mismatch: attribute {attribute} expects a {expected} value")]
    UnexpectedValueKind {
        attribute: String,
        expected: &'static str,
    },

    /// Observed level outside the trained enumeration
    #[error("Schema mismatch: {level:?} is not a trained level of {attribute}")]
    UnknownLevel { attribute: String, level: String },

    /// Record carries an already-encoded indicator column
    #[error("Schema mismatch: {column} is an encoded indicator; submit the categorical attribute instead")]
    EncodedIndicator { column: String },

    /// NaN or infinite passthrough value
    #[error("Non-finite value for column {column}")]
    NonFiniteValue { column: String },

    /// Scaler rejected the numeric slice
    #[error("Scaling failed: {0}")]
    Scaling(#[from] ScalingError),
}

impl AlignError {
    /// True for the errors caused by a record/schema disagreement rather than the scaler
    pub fn is_schema_mismatch(&self) -> bool {
        !matches!(self, AlignError::Scaling(_))
    }
}
