//! Record model for tagrule
//!
//! Rust has no runtime field reflection, so everything tagrule needs to know
//! about a record (field order, identifiers, external names, rule and query
//! metadata, current values) is exposed through the [`Record`] trait. Values
//! are lowered to the borrowed [`FieldValue`] enum so validators can be
//! written once against a closed set of value kinds.
//!
//! `#[derive(Record)]` (from `tagrule-derive`) generates the implementation
//! from field attributes:
//!
//! ```ignore
//! #[derive(Record)]
//! struct User {
//!     #[valid("funcVal:Required,errorMessage:Please provide your name")]
//!     name: String,
//!     #[serde(rename = "email_address")]
//!     #[valid("funcVal:Required;funcVal:Email")]
//!     email: String,
//! }
//! ```

pub mod logging;
mod record;
mod value;

pub use record::*;
pub use value::*;
