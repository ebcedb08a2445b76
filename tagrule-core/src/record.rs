// Record model

use crate::FieldValue;
use std::fmt;

/// A value whose fields can be walked by the validation engine.
///
/// Fields must be returned in declaration order; error ordering depends on
/// it. Implement it with `#[derive(Record)]` from `tagrule-derive`, or by hand
/// for types whose shape is only known at runtime.
///
/// # Examples
///
/// ```
/// use tagrule_core::{AsFieldValue, Field, Record};
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
///         vec![Field::new("email", self.email.as_field_value())
///             .with_rules("funcVal:Required;funcVal:Email")]
///     }
/// }
///
/// let login = Login { email: "a@b.io".to_string() };
/// assert_eq!(login.field("email").unwrap().rules, "funcVal:Required;funcVal:Email");
/// ```
pub trait Record {
    /// Name of the concrete type, for diagnostics
    fn type_name(&self) -> &'static str;

    /// All fields, in declaration order
    fn fields(&self) -> Vec<Field<'_>>;

    /// Look up a field by external name or declared identifier
    fn field(&self, key: &str) -> Option<Field<'_>> {
        self.fields().into_iter().find(|field| field.matches(key))
    }
}

impl fmt::Debug for dyn Record + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct(self.type_name());
        for field in self.fields() {
            out.field(field.ident, &field.value);
        }
        out.finish()
    }
}

/// One field of a record together with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<'a> {
    /// Declared identifier
    pub ident: &'a str,

    /// External (serialization) name, if declared
    pub rename: Option<&'a str>,

    /// Rule metadata string, empty when the field carries no rules
    pub rules: &'a str,

    /// Query metadata string (`column[,primary]`), empty when absent
    pub query: &'a str,

    /// Current value
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    /// Create a field without metadata
    pub fn new(ident: &'a str, value: FieldValue<'a>) -> Self {
        Self {
            ident,
            rename: None,
            rules: "",
            query: "",
            value,
        }
    }

    /// Set the external name
    pub fn with_rename(mut self, rename: &'a str) -> Self {
        if !rename.is_empty() {
            self.rename = Some(rename);
        }
        self
    }

    /// Set the rule metadata
    pub fn with_rules(mut self, rules: &'a str) -> Self {
        self.rules = rules;
        self
    }

    /// Set the query metadata
    pub fn with_query(mut self, query: &'a str) -> Self {
        self.query = query;
        self
    }

    /// Key used in error text: the external name if present, else the identifier.
    pub fn key(&self) -> &'a str {
        self.rename.unwrap_or(self.ident)
    }

    /// Whether `key` names this field.
    pub fn matches(&self, key: &str) -> bool {
        self.ident == key || self.rename == Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AsFieldValue;

    struct Application {
        id: u32,
        applied_time: String,
        note: Option<String>,
    }

    impl Record for Application {
        fn type_name(&self) -> &'static str {
            "Application"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::new("id", self.id.as_field_value()).with_rules("funcVal:Required"),
                Field::new("applied_time", self.applied_time.as_field_value())
                    .with_rename("appliedTime"),
                Field::new("note", self.note.as_field_value()),
            ]
        }
    }

    fn sample() -> Application {
        Application {
            id: 7,
            applied_time: "09/20/2017".to_string(),
            note: None,
        }
    }

    #[test]
    fn test_field_key_prefers_rename() {
        let app = sample();
        let fields = app.fields();
        assert_eq!(fields[0].key(), "id");
        assert_eq!(fields[1].key(), "appliedTime");
    }

    #[test]
    fn test_lookup_by_ident_or_rename() {
        let app = sample();
        assert_eq!(
            app.field("applied_time").map(|f| f.value),
            Some(FieldValue::Str("09/20/2017"))
        );
        assert_eq!(
            app.field("appliedTime").map(|f| f.value),
            Some(FieldValue::Str("09/20/2017"))
        );
        assert!(app.field("missing").is_none());
    }

    #[test]
    fn test_empty_rename_is_ignored() {
        let field = Field::new("name", FieldValue::Null).with_rename("");
        assert_eq!(field.rename, None);
        assert_eq!(field.key(), "name");
    }

    #[test]
    fn test_nested_record_emptiness() {
        let app = Application {
            id: 0,
            applied_time: String::new(),
            note: None,
        };
        assert!(FieldValue::Record(&app).is_empty());
        assert!(!FieldValue::Record(&sample()).is_empty());
    }

    #[test]
    fn test_debug_output() {
        let app = sample();
        let record: &dyn Record = &app;
        let debug = format!("{:?}", record);
        assert!(debug.starts_with("Application"));
        assert!(debug.contains("applied_time"));
    }
}
