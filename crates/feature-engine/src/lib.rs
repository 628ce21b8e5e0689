//! Feature Engineering Engine
//!
//! Encodes customer records into feature vectors that match the column
//! layout, one-hot encoding and numeric scaling the churn classifier was
//! trained with.

mod error;
mod features;
mod record;
mod scaler;
mod schema;

pub use error::{AlignError, ScalingError, SchemaError};
pub use features::{FeatureAligner, FeatureVector, UnknownLevelPolicy};
pub use record::{
    indicator_column, Contract, CustomerRecord, Gender, InternetAddon, InternetService,
    MultipleLines, PaymentMethod, RawRecord, RawValue, YesNo, CATEGORICAL_ATTRIBUTES,
    NUMERIC_ATTRIBUTES,
};
pub use scaler::{FittedScaler, MinMaxScaler, StandardScaler, Transformer};
pub use schema::FeatureSchema;
