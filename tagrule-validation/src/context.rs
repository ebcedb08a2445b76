// Validation context and dispatch executor

use crate::rules::{RuleDescriptor, RuleSet, parse, parse_strict};
use crate::validators::BuiltinFormats;
use crate::{Error, ValidationError, ValidationErrors, Validator, ValidatorRegistry};
use std::collections::HashMap;
use std::sync::Arc;
use tagrule_config::{
    ConfigError, DEFAULT_DATE_FORMAT, DEFAULT_DATE_LAYOUT, NestedPolicy, ParseMode,
    Validate as _, ValidationSettings,
};
use tagrule_core::{Field, FieldValue, Record};
use tracing::{debug, debug_span, trace, warn};

/// Everything one validation needs besides the record itself.
///
/// Build it once and reuse it; clones share the registry and the message
/// overrides.
///
/// ```
/// use tagrule_core::{AsFieldValue, Field, Record};
/// use tagrule_validation::ValidationContext;
///
/// struct Login {
///     email: String,
/// }
///
/// impl Record for Login {
///     fn type_name(&self) -> &'static str {
///         "Login"
///     }
///
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![Field::new("Email", self.email.as_field_value())
///             .with_rename("email")
///             .with_rules("funcVal:Required;funcVal:Email")]
///     }
/// }
///
/// let ctx = ValidationContext::with_builtins();
/// let errors = ctx.validate(&Login { email: "not-an-email".into() }).unwrap();
/// assert_eq!(errors.messages(), vec!["email has invalid format value"]);
/// ```
#[derive(Clone)]
pub struct ValidationContext {
    registry: Arc<ValidatorRegistry>,
    error_messages: Arc<HashMap<String, String>>,
    date_format: String,
    date_layout: String,
    nested: NestedPolicy,
    parse_mode: ParseMode,
}

impl ValidationContext {
    /// Context over `registry` with default date layout, legacy nesting and
    /// lenient parsing
    pub fn new(registry: Arc<ValidatorRegistry>) -> Self {
        Self {
            registry,
            error_messages: Arc::new(HashMap::new()),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            date_layout: DEFAULT_DATE_LAYOUT.to_string(),
            nested: NestedPolicy::default(),
            parse_mode: ParseMode::default(),
        }
    }

    /// Context over a fresh registry holding the built-in validators
    pub fn with_builtins() -> Self {
        Self::new(Arc::new(ValidatorRegistry::with_builtins(
            &BuiltinFormats::default(),
        )))
    }

    /// Build a context, and its built-in validators, from loaded settings
    pub fn from_settings(settings: &ValidationSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let formats =
            BuiltinFormats::from_settings(settings).map_err(|e| ConfigError::ValidationError {
                key: "formats".to_string(),
                message: e.to_string(),
            })?;

        debug!(
            nested = %settings.nested,
            parse_mode = %settings.parse_mode,
            overrides = settings.error_messages.len(),
            "building validation context from settings"
        );

        Ok(
            Self::new(Arc::new(ValidatorRegistry::with_builtins(&formats)))
                .with_error_messages(settings.error_messages.clone())
                .with_date_defaults(settings.date_format.clone(), settings.date_layout.clone())
                .with_nested_policy(settings.nested)
                .with_parse_mode(settings.parse_mode),
        )
    }

    /// Default message for `validator` when a rule has none
    pub fn with_error_message(
        mut self,
        validator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.error_messages).insert(validator.into(), message.into());
        self
    }

    pub fn with_error_messages<I, K, V>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = Arc::make_mut(&mut self.error_messages);
        for (validator, message) in messages {
            map.insert(validator.into(), message.into());
        }
        self
    }

    /// Human-readable format and chrono layout used by date-parse validators
    /// when a rule does not carry both
    pub fn with_date_defaults(mut self, format: impl Into<String>, layout: impl Into<String>) -> Self {
        self.date_format = format.into();
        self.date_layout = layout.into();
        self
    }

    pub fn with_nested_policy(mut self, nested: NestedPolicy) -> Self {
        self.nested = nested;
        self
    }

    pub fn with_parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.parse_mode = parse_mode;
        self
    }

    pub fn registry(&self) -> &Arc<ValidatorRegistry> {
        &self.registry
    }

    /// Shorthand for registering on the shared registry
    pub fn register(&self, name: impl Into<String>, validator: Validator) {
        self.registry.register(name, validator);
    }

    pub fn error_message(&self, validator: &str) -> Option<&str> {
        self.error_messages.get(validator).map(String::as_str)
    }

    pub fn nested_policy(&self) -> NestedPolicy {
        self.nested
    }

    pub fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn date_layout(&self) -> &str {
        &self.date_layout
    }

    /// Validate every field of `record`.
    ///
    /// Predicate failures are collected in field then rule order. A rule that
    /// names an unregistered validator aborts the whole call with
    /// [`Error::ValidatorNotFound`]; in strict parse mode malformed rule
    /// metadata aborts with [`Error::Rules`].
    ///
    /// A field holding a record runs its own rules first, then the nested
    /// record is handled according to the [`NestedPolicy`].
    pub fn validate(&self, record: &dyn Record) -> Result<ValidationErrors, Error> {
        let span = debug_span!("validate", record = record.type_name());
        let _enter = span.enter();

        let mut errors = ValidationErrors::default();

        for field in record.fields() {
            if !field.rules.is_empty() {
                self.apply_rules(record, &field, &mut errors)?;
            }

            if let Some(nested) = field.value.as_record() {
                self.validate_nested(&field, nested, &mut errors)?;
            }
        }

        debug!(errors = errors.len(), "validation finished");
        Ok(errors)
    }

    /// Validate a value that should be a record.
    ///
    /// Any other value kind yields a single `unsupportedInputKind` error.
    pub fn validate_value(&self, value: &FieldValue<'_>) -> Result<ValidationErrors, Error> {
        match value.as_record() {
            Some(record) => self.validate(record),
            None => Ok(ValidationErrors::new(vec![ValidationError::unsupported_input(
                value.kind(),
            )])),
        }
    }

    /// Run the rules of one field, own rules before any nested record
    fn apply_rules(
        &self,
        record: &dyn Record,
        field: &Field<'_>,
        errors: &mut ValidationErrors,
    ) -> Result<(), Error> {
        for rule in self.parse_rules(field)?.iter().filter(|rule| !rule.is_inert()) {
            let validator = self.registry.resolve(rule.validator_name).inspect_err(|_| {
                warn!(field = field.key(), validator = rule.validator_name, "validator not registered");
            })?;

            let message = self.effective_message(rule);
            match self.dispatch(&validator, record, field, rule, message) {
                None => trace!(
                    field = field.key(),
                    validator = rule.validator_name,
                    "rule skipped, parameters missing"
                ),
                Some(Ok(())) => {}
                Some(Err(mut error)) => {
                    error.field = field.key().to_string();
                    errors.add(error.with_constraint(rule.validator_name));
                }
            }
        }
        Ok(())
    }

    fn validate_nested(
        &self,
        field: &Field<'_>,
        nested: &dyn Record,
        errors: &mut ValidationErrors,
    ) -> Result<(), Error> {
        match self.nested {
            NestedPolicy::Merge => {
                errors.extend(self.validate(nested)?);
            }
            NestedPolicy::Legacy => match self.validate(nested) {
                Ok(discarded) => debug!(
                    field = field.key(),
                    discarded = discarded.len(),
                    "nested record errors discarded"
                ),
                Err(e) => debug!(field = field.key(), error = %e, "nested record error discarded"),
            },
        }
        Ok(())
    }

    fn parse_rules<'f>(&self, field: &Field<'f>) -> Result<RuleSet<'f>, Error> {
        match self.parse_mode {
            ParseMode::Lenient => Ok(parse(field.rules)),
            ParseMode::Strict => parse_strict(field.rules).map_err(|source| Error::Rules {
                field: field.key().to_string(),
                source,
            }),
        }
    }

    /// Rule message, else the override for the validator, else empty
    fn effective_message<'m>(&'m self, rule: &RuleDescriptor<'m>) -> &'m str {
        if !rule.error_message.is_empty() {
            return rule.error_message;
        }
        self.error_message(rule.validator_name).unwrap_or("")
    }

    /// Bind the rule parameters to the validator's shape and call it.
    ///
    /// `None` when the rule lacks the parameters the shape needs.
    fn dispatch(
        &self,
        validator: &Validator,
        record: &dyn Record,
        field: &Field<'_>,
        rule: &RuleDescriptor<'_>,
        message: &str,
    ) -> Option<Result<(), ValidationError>> {
        let key = field.key();

        match validator {
            Validator::Simple(f) => Some(f(&field.value, key, message)),
            Validator::SingleParam(f) => {
                let whole = FieldValue::Record(record);
                let (subject, key1, key2) = if !rule.compare_key.is_empty()
                    && !rule.compare_value.is_empty()
                {
                    (&whole, rule.compare_key, rule.compare_value)
                } else if !rule.compare_key.is_empty() {
                    (&whole, key, rule.compare_key)
                } else if !rule.accepted_values.is_empty() {
                    (&field.value, key, rule.accepted_values)
                } else if !rule.format.is_empty() {
                    (&field.value, key, rule.format)
                } else {
                    return None;
                };
                Some(f(subject, key1, key2, message))
            }
            Validator::Conditional(f) => {
                if rule.compare_key.is_empty() || rule.compare_value.is_empty() {
                    return None;
                }
                Some(f(
                    record,
                    key,
                    &field.value,
                    rule.compare_key,
                    rule.compare_value,
                    message,
                ))
            }
            Validator::DateParse(f) => {
                let (format, layout) = if !rule.format.is_empty() && !rule.date_layout.is_empty() {
                    (rule.format, rule.date_layout)
                } else {
                    (self.date_format.as_str(), self.date_layout.as_str())
                };
                if format.is_empty() || layout.is_empty() {
                    return None;
                }
                Some(f(&field.value, key, format, layout, message))
            }
        }
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationContext")
            .field("registry", &self.registry)
            .field("error_messages", &self.error_messages)
            .field("date_format", &self.date_format)
            .field("date_layout", &self.date_layout)
            .field("nested", &self.nested)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}
