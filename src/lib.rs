// tagrule - declarative struct validation driven by field metadata
//
// Rules are written next to the fields they constrain, parsed at validation
// time and dispatched to a registry of named validators.

// Re-export the record model
pub use tagrule_core::*;

// Re-export the derive macro
pub use tagrule_derive::Record;

// Re-export the validation engine
pub use tagrule_validation as validation;
pub use tagrule_validation::{
    Error, ValidationContext, ValidationError, ValidationErrors, Validator, ValidatorRegistry,
};

// Re-export optional crates
#[cfg(feature = "config")]
pub use tagrule_config;

#[cfg(feature = "query")]
pub use tagrule_query;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AsFieldValue,
        Field,
        FieldValue,
        Record,
        ValidationContext,
        ValidationError,
        ValidationErrors,
        Validator,
        ValidatorRegistry,
    };
    pub use tagrule_validation::{NestedPolicy, ParseMode, Validate};

    #[cfg(feature = "config")]
    pub use tagrule_config::{SettingsBuilder, ValidationSettings};

    #[cfg(feature = "query")]
    pub use tagrule_query::{ComposeQuery, InsertQuery, SelectQuery, UpdateQuery};
}
