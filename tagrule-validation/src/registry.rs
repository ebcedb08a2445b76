//! Validator registry
//!
//! Validators come in exactly four call shapes, modelled by [`Validator`].
//! The registry maps rule names (`funcVal`) to validators and is shared by
//! every validation that runs against a context.

use crate::validators::{BuiltinFormats, register_builtins};
use crate::{Error, ValidationError};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tagrule_core::{FieldValue, Record};
use tracing::{debug, warn};

/// `(value, key, message)`
pub type SimpleFn = fn(&FieldValue<'_>, &str, &str) -> Result<(), ValidationError>;

/// `(subject, key1, key2, message)`
pub type SingleParamFn = fn(&FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError>;

/// `(record, key, value, compare_key, compare_value, message)`
pub type ConditionalFn =
    fn(&dyn Record, &str, &FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError>;

/// `(value, key, format, layout, message)`
pub type DateParseFn = fn(&FieldValue<'_>, &str, &str, &str, &str) -> Result<(), ValidationError>;

type SimpleValidator =
    Arc<dyn Fn(&FieldValue<'_>, &str, &str) -> Result<(), ValidationError> + Send + Sync>;
type SingleParamValidator =
    Arc<dyn Fn(&FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError> + Send + Sync>;
type ConditionalValidator = Arc<
    dyn Fn(&dyn Record, &str, &FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError>
        + Send
        + Sync,
>;
type DateParseValidator = Arc<
    dyn Fn(&FieldValue<'_>, &str, &str, &str, &str) -> Result<(), ValidationError> + Send + Sync,
>;

/// A registered validator, tagged by call shape.
///
/// The shape decides which rule parameters the executor binds:
///
/// - `Simple`: the field value and key.
/// - `SingleParam`: a subject (the field value, or the whole record as
///   [`FieldValue::Record`]) plus two keys taken from `compareKey`,
///   `compareValue`, `values` or `format`.
/// - `Conditional`: the record, the field, and `compareKey`/`compareValue`.
/// - `DateParse`: the field value with a human format and a chrono layout.
///
/// Every shape receives the effective error message last; an empty message
/// means the validator should produce its own text.
#[derive(Clone)]
pub enum Validator {
    Simple(SimpleValidator),
    SingleParam(SingleParamValidator),
    Conditional(ConditionalValidator),
    DateParse(DateParseValidator),
}

impl Validator {
    pub fn simple<F>(f: F) -> Self
    where
        F: Fn(&FieldValue<'_>, &str, &str) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        Validator::Simple(Arc::new(f))
    }

    pub fn single_param<F>(f: F) -> Self
    where
        F: Fn(&FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Validator::SingleParam(Arc::new(f))
    }

    pub fn conditional<F>(f: F) -> Self
    where
        F: Fn(&dyn Record, &str, &FieldValue<'_>, &str, &str, &str) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Validator::Conditional(Arc::new(f))
    }

    pub fn date_parse<F>(f: F) -> Self
    where
        F: Fn(&FieldValue<'_>, &str, &str, &str, &str) -> Result<(), ValidationError>
            + Send
            + Sync
            + 'static,
    {
        Validator::DateParse(Arc::new(f))
    }

    /// Name of the call shape
    pub fn shape(&self) -> &'static str {
        match self {
            Validator::Simple(_) => "simple",
            Validator::SingleParam(_) => "single_param",
            Validator::Conditional(_) => "conditional",
            Validator::DateParse(_) => "date_parse",
        }
    }

    /// Recover a validator from a type-erased candidate.
    ///
    /// Accepts a `Validator` or a function pointer of one of the four shapes.
    /// Function items must be cast first (`my_check as SimpleFn`).
    fn from_any(candidate: Box<dyn Any + Send + Sync>) -> Option<Self> {
        let candidate = match candidate.downcast::<Validator>() {
            Ok(validator) => return Some(*validator),
            Err(other) => other,
        };
        let candidate = match candidate.downcast::<SimpleFn>() {
            Ok(f) => return Some(Validator::simple(*f)),
            Err(other) => other,
        };
        let candidate = match candidate.downcast::<SingleParamFn>() {
            Ok(f) => return Some(Validator::single_param(*f)),
            Err(other) => other,
        };
        let candidate = match candidate.downcast::<ConditionalFn>() {
            Ok(f) => return Some(Validator::conditional(*f)),
            Err(other) => other,
        };
        match candidate.downcast::<DateParseFn>() {
            Ok(f) => Some(Validator::date_parse(*f)),
            Err(_) => None,
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Validator").field(&self.shape()).finish()
    }
}

/// Name to validator mapping, safe to share across threads.
///
/// The last registration for a name wins.
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: RwLock<HashMap<String, Validator>>,
}

impl ValidatorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in validators
    pub fn with_builtins(formats: &BuiltinFormats) -> Self {
        let registry = Self::new();
        register_builtins(&registry, formats);
        registry
    }

    /// Register a validator under `name`
    pub fn register(&self, name: impl Into<String>, validator: Validator) {
        let name = name.into();
        debug!(validator = %name, shape = validator.shape(), "registering validator");
        self.validators.write().insert(name, validator);
    }

    /// Register a type-erased validator.
    ///
    /// Fails with [`Error::SignatureNotAccepted`] and leaves the registry
    /// unchanged when the candidate is not a [`Validator`] or one of
    /// [`SimpleFn`], [`SingleParamFn`], [`ConditionalFn`], [`DateParseFn`].
    ///
    /// ```
    /// use tagrule_core::FieldValue;
    /// use tagrule_validation::{SimpleFn, ValidationError, ValidatorRegistry};
    ///
    /// fn lowercase(value: &FieldValue<'_>, key: &str, _: &str) -> Result<(), ValidationError> {
    ///     match value.as_str() {
    ///         Some(s) if s != s.to_lowercase() => Err(ValidationError::new(key, "not lowercase")),
    ///         _ => Ok(()),
    ///     }
    /// }
    ///
    /// let registry = ValidatorRegistry::new();
    /// registry.try_register("Lowercase", Box::new(lowercase as SimpleFn)).unwrap();
    /// assert!(registry.try_register("Bad", Box::new("not a function")).is_err());
    /// assert_eq!(registry.names(), vec!["Lowercase"]);
    /// ```
    pub fn try_register(
        &self,
        name: impl Into<String>,
        candidate: Box<dyn Any + Send + Sync>,
    ) -> Result<(), Error> {
        let name = name.into();
        match Validator::from_any(candidate) {
            Some(validator) => {
                self.register(name, validator);
                Ok(())
            }
            None => {
                warn!(validator = %name, "rejected validator with unsupported signature");
                Err(Error::SignatureNotAccepted { name })
            }
        }
    }

    /// Look up a validator
    pub fn resolve(&self, name: &str) -> Result<Validator, Error> {
        self.validators
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ValidatorNotFound {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.read().contains_key(name)
    }

    /// Remove a validator, returning it if it was registered
    pub fn unregister(&self, name: &str) -> Option<Validator> {
        self.validators.write().remove(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.validators.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("validators", &self.names())
            .finish()
    }
}
