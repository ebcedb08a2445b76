//! Declarative field validation for tagrule records
//!
//! Rules live in field metadata as a small grammar:
//!
//! ```text
//! funcVal:Required,errorMessage:Name is required;funcVal:Match,format:^[a-z]+$
//! ```
//!
//! `;` separates rules, `,` separates the parameters of one rule and the
//! first `:` of a parameter separates its key from its value. Recognized keys
//! are `funcVal`, `errorMessage`, `format`, `compareKey`, `compareValue`,
//! `dateLayout` and `values`.
//!
//! A [`ValidationContext`] couples a [`ValidatorRegistry`] with message
//! overrides and date defaults. Validating a record walks its fields in
//! order, parses each rule string, resolves the named validator and binds
//! the rule parameters according to the validator's [`Validator`] shape.
//!
//! # Examples
//!
//! ## Built-in validators
//!
//! ```
//! use tagrule_core::{AsFieldValue, Field, Record};
//! use tagrule_validation::{Validate, ValidationContext};
//!
//! struct Application {
//!     status: String,
//!     approval_reason: String,
//! }
//!
//! impl Record for Application {
//!     fn type_name(&self) -> &'static str {
//!         "Application"
//!     }
//!
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::new("Status", self.status.as_field_value())
//!                 .with_rules("funcVal:AcceptedValues,values:pending|approved"),
//!             Field::new("ApprovalReason", self.approval_reason.as_field_value())
//!                 .with_rules("funcVal:CondRequired,compareKey:Status,compareValue:approved"),
//!         ]
//!     }
//! }
//!
//! let ctx = ValidationContext::with_builtins();
//!
//! let approved = Application { status: "approved".into(), approval_reason: String::new() };
//! let errors = approved.validate_with(&ctx).unwrap();
//! assert_eq!(errors.messages(), vec!["ApprovalReason is required"]);
//!
//! let pending = Application { status: "pending".into(), approval_reason: String::new() };
//! assert!(pending.validate_with(&ctx).unwrap().is_empty());
//! ```
//!
//! ## Custom validators
//!
//! ```
//! use tagrule_core::{AsFieldValue, Field, Record};
//! use tagrule_validation::{ValidationContext, ValidationError, Validator};
//!
//! struct Team {
//!     name: String,
//! }
//!
//! impl Record for Team {
//!     fn type_name(&self) -> &'static str {
//!         "Team"
//!     }
//!
//!     fn fields(&self) -> Vec<Field<'_>> {
//!         vec![Field::new("name", self.name.as_field_value()).with_rules("funcVal:Lowercase")]
//!     }
//! }
//!
//! let ctx = ValidationContext::with_builtins();
//! ctx.register(
//!     "Lowercase",
//!     Validator::simple(|value, key, message| match value.as_str() {
//!         Some(s) if s != s.to_lowercase() => Err(ValidationError::new(
//!             key,
//!             if message.is_empty() { format!("{} must be lowercase", key) } else { message.to_string() },
//!         )),
//!         _ => Ok(()),
//!     }),
//! );
//!
//! let errors = ctx.validate(&Team { name: "Core".into() }).unwrap();
//! assert_eq!(errors.messages(), vec!["name must be lowercase"]);
//! assert_eq!(errors.errors[0].constraint, "Lowercase");
//! ```

mod context;
mod errors;
mod registry;
mod rules;
mod traits;
pub mod validators;

pub use context::*;
pub use errors::*;
pub use registry::*;
pub use rules::*;
pub use traits::*;
pub use validators::{BUILTIN_NAMES, BuiltinFormats, register_builtins};

pub use tagrule_config::{NestedPolicy, ParseMode};
