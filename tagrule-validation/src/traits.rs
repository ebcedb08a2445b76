// Validation traits

use crate::{Error, ValidationContext, ValidationErrors};
use tagrule_core::Record;

/// Validation entry point available on every [`Record`]
pub trait Validate {
    /// Validate against the validators and settings of `ctx`
    fn validate_with(&self, ctx: &ValidationContext) -> Result<ValidationErrors, Error>;
}

impl<T: Record> Validate for T {
    fn validate_with(&self, ctx: &ValidationContext) -> Result<ValidationErrors, Error> {
        ctx.validate(self)
    }
}
