//! Customer Record Validation
//!
//! Range checks applied to a submitted record before it reaches the aligner.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Validator, ValidationConfig, ValidationResult};
