// Built-in validators

use crate::{ValidationError, Validator, ValidatorRegistry};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use tagrule_config::{DEFAULT_DATE_LAYOUT, DEFAULT_EMAIL_FORMAT, DEFAULT_PHONE_FORMAT, ValidationSettings};
use tagrule_core::{FieldValue, Record};

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_EMAIL_FORMAT).unwrap());

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(DEFAULT_PHONE_FORMAT).unwrap());

const RANGE_SEPARATOR: &str = "<->";
const LIST_SEPARATOR: char = '|';

/// Names under which [`register_builtins`] installs validators
pub const BUILTIN_NAMES: [&str; 9] = [
    "Required",
    "CondRequired",
    "AfterDate",
    "Email",
    "Url",
    "Phone",
    "Date",
    "Match",
    "AcceptedValues",
];

/// Patterns and layout the built-in validators close over
#[derive(Debug, Clone)]
pub struct BuiltinFormats {
    pub email: Regex,
    pub phone: Regex,
    /// chrono layout used by `AfterDate`
    pub date_layout: String,
}

impl Default for BuiltinFormats {
    fn default() -> Self {
        Self {
            email: EMAIL_REGEX.clone(),
            phone: PHONE_REGEX.clone(),
            date_layout: DEFAULT_DATE_LAYOUT.to_string(),
        }
    }
}

impl BuiltinFormats {
    pub fn from_settings(settings: &ValidationSettings) -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(&settings.email_format)?,
            phone: Regex::new(&settings.phone_format)?,
            date_layout: settings.date_layout.clone(),
        })
    }
}

/// Install every built-in validator into `registry`
pub fn register_builtins(registry: &ValidatorRegistry, formats: &BuiltinFormats) {
    let email = formats.email.clone();
    let phone = formats.phone.clone();
    let layout = formats.date_layout.clone();

    registry.register("Required", Validator::simple(required));
    registry.register("CondRequired", Validator::conditional(cond_required));
    registry.register(
        "AfterDate",
        Validator::single_param(move |subject, key1, key2, message| {
            after_date(&layout, subject, key1, key2, message)
        }),
    );
    registry.register(
        "Email",
        Validator::simple(move |value, key, message| match_regex(&email, value, key, message)),
    );
    registry.register("Url", Validator::simple(url));
    registry.register(
        "Phone",
        Validator::simple(move |value, key, message| match_regex(&phone, value, key, message)),
    );
    registry.register("Date", Validator::date_parse(date));
    registry.register("Match", Validator::single_param(matches));
    registry.register("AcceptedValues", Validator::single_param(accepted_values));
}

fn fail(key: &str, message: &str, default: impl FnOnce() -> String) -> ValidationError {
    if message.is_empty() {
        ValidationError::new(key, default())
    } else {
        ValidationError::new(key, message)
    }
}

/// `Required`: the value must not be empty
pub fn required(value: &FieldValue<'_>, key: &str, message: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(fail(key, message, || format!("{} is required", key)));
    }
    Ok(())
}

/// `Url`: an absolute URL or an absolute path. Non-string values pass.
pub fn url(value: &FieldValue<'_>, key: &str, message: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let Some(input) = value.as_str() else {
        return Ok(());
    };
    if input.starts_with('/') {
        return Ok(());
    }

    url::Url::parse(input)
        .map(|_| ())
        .map_err(|e| fail(key, message, || e.to_string()).with_value(input))
}

/// Match a string value against a compiled pattern
pub fn match_regex(
    pattern: &Regex,
    value: &FieldValue<'_>,
    key: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let Some(input) = value.as_str() else {
        return Err(ValidationError::new(
            key,
            format!("invalid type, expected string found {}", value.kind()),
        ));
    };

    if pattern.is_match(input) {
        Ok(())
    } else {
        Err(fail(key, message, || format!("{} has invalid format value", key)).with_value(input))
    }
}

/// `Match`: `pattern` is compiled on every call
pub fn matches(
    value: &FieldValue<'_>,
    key: &str,
    pattern: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let compiled = Regex::new(pattern).map_err(|e| {
        ValidationError::new(key, format!("invalid regular expression {}: {}", pattern, e))
    })?;
    match_regex(&compiled, value, key, message)
}

/// `AcceptedValues`: `lo<->hi` is an inclusive numeric range, anything else a
/// `|`-separated list of accepted values
pub fn accepted_values(
    value: &FieldValue<'_>,
    key: &str,
    values: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }

    match values.split_once(RANGE_SEPARATOR) {
        Some((lo, hi)) => check_in_range(value, key, lo, hi, message),
        None => {
            let accepted: Vec<&str> = values.split(LIST_SEPARATOR).collect();
            check_in_values(value, key, &accepted, values, message)
        }
    }
}

fn parse_bound<T>(key: &str, bound: &str) -> Result<T, ValidationError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    bound
        .parse()
        .map_err(|e| ValidationError::new(key, format!("invalid bound {}: {}", bound, e)))
}

fn check_in_range(
    value: &FieldValue<'_>,
    key: &str,
    lo: &str,
    hi: &str,
    message: &str,
) -> Result<(), ValidationError> {
    let inside = match value {
        FieldValue::Int(v) => {
            let (lo, hi): (i64, i64) = (parse_bound(key, lo)?, parse_bound(key, hi)?);
            (lo..=hi).contains(v)
        }
        FieldValue::UInt(v) => {
            let (lo, hi): (u64, u64) = (parse_bound(key, lo)?, parse_bound(key, hi)?);
            (lo..=hi).contains(v)
        }
        FieldValue::Float(v) => {
            let (lo, hi): (f64, f64) = (parse_bound(key, lo)?, parse_bound(key, hi)?);
            *v >= lo && *v <= hi
        }
        other => {
            return Err(ValidationError::new(
                key,
                format!(
                    "for check in range only accept int|uint|float, found {}",
                    other.kind()
                ),
            ));
        }
    };

    if inside {
        Ok(())
    } else {
        Err(fail(key, message, || {
            format!("{} is outside of range {} - {}", value, lo, hi)
        })
        .with_value(value.to_string()))
    }
}

fn check_in_values(
    value: &FieldValue<'_>,
    key: &str,
    accepted: &[&str],
    raw: &str,
    message: &str,
) -> Result<(), ValidationError> {
    for candidate in accepted {
        let found = match value {
            FieldValue::Int(v) => parse_bound::<i64>(key, candidate)? == *v,
            FieldValue::UInt(v) => parse_bound::<u64>(key, candidate)? == *v,
            FieldValue::Float(v) => parse_bound::<f64>(key, candidate)? == *v,
            FieldValue::Str(v) => v == candidate,
            FieldValue::Bool(v) => v.to_string() == *candidate,
            _ => false,
        };
        if found {
            return Ok(());
        }
    }

    Err(fail(key, message, || {
        format!("wrong value {}, accepted values {}", value, raw)
    })
    .with_value(value.to_string()))
}

/// `CondRequired`: the value is required when the field named `compare_key`
/// renders to one of the `|`-separated `compare_value`s
pub fn cond_required(
    record: &dyn Record,
    key: &str,
    value: &FieldValue<'_>,
    compare_key: &str,
    compare_value: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if compare_key.is_empty() && compare_value.is_empty() {
        return Err(ValidationError::new(
            key,
            "bad state, compareKey and compareValue are expected to have a string value",
        ));
    }

    let Some(sibling) = record.field(compare_key) else {
        return Ok(());
    };
    let rendered = sibling.value.to_string();

    if compare_value.split(LIST_SEPARATOR).any(|c| c == rendered) && value.is_empty() {
        return Err(fail(key, message, || format!("{} is required", key)));
    }
    Ok(())
}

/// Parse `input` with a chrono layout; date-only layouts resolve to midnight.
pub fn parse_date(input: &str, layout: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input, layout).or_else(|_| {
        NaiveDate::parse_from_str(input, layout).map(|date| date.and_time(NaiveTime::MIN))
    })
}

/// `AfterDate`: the record field `key1` must hold a later date than `key2`
pub fn after_date(
    layout: &str,
    subject: &FieldValue<'_>,
    key1: &str,
    key2: &str,
    message: &str,
) -> Result<(), ValidationError> {
    let Some(record) = subject.as_record() else {
        return Err(ValidationError::new(
            key1,
            format!("bad value, expected record value, got {}", subject.kind()),
        ));
    };

    let (Some(first), Some(second)) = (record.field(key1), record.field(key2)) else {
        return Err(ValidationError::new(
            key1,
            "unable comparing values, both value need to be provided",
        ));
    };

    if matches!(first.value, FieldValue::Null) {
        return Ok(());
    }
    if first.value.kind() != second.value.kind() {
        return Err(ValidationError::new(
            key1,
            "unable comparing values, both value should have the same type",
        ));
    }

    let Some(first) = first.value.as_str() else {
        return Err(ValidationError::new(
            key1,
            format!("expected type string got {}", first.value.kind()),
        ));
    };
    if first.is_empty() {
        return Ok(());
    }
    let Some(second) = second.value.as_str() else {
        return Err(ValidationError::new(
            key1,
            format!("expected type string got {}", second.value.kind()),
        ));
    };

    let parse = |input: &str| {
        parse_date(input, layout).map_err(|e| ValidationError::new(key1, e.to_string()).with_value(input))
    };
    let (first, second) = (parse(first)?, parse(second)?);

    if first > second {
        Ok(())
    } else {
        Err(fail(key1, message, || {
            format!("invalid {} should be after {}", key1, key2)
        }))
    }
}

/// `Date`: a string that parses with `layout`; `format` is its readable form
pub fn date(
    value: &FieldValue<'_>,
    key: &str,
    format: &str,
    layout: &str,
    message: &str,
) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let Some(input) = value.as_str() else {
        return Err(ValidationError::new(
            key,
            format!("{} is expected of type string", key),
        ));
    };

    parse_date(input, layout).map(|_| ()).map_err(|_| {
        fail(key, message, || format!("{} is expected of format {}", key, format)).with_value(input)
    })
}
