//! Compile-time rule metadata checking
//!
//! Enabled per struct with `#[record(strict_rules)]`. Catches mistakes that the
//! runtime parser would silently ignore:
//! - Empty rule segments (`funcVal:Required;`)
//! - Parameters without a `:` separator
//! - Unknown parameter keys
//! - Segments that carry parameters but no `funcVal`

use proc_macro2::Span;
use syn::Error;

/// Parameter keys understood by the rule parser
pub const KNOWN_KEYS: &[&str] = &[
    "funcVal",
    "errorMessage",
    "format",
    "compareKey",
    "compareValue",
    "dateLayout",
    "values",
];

/// Check one `#[valid("...")]` string against the strict grammar
pub fn check_rules(rules: &str, span: Span) -> Result<(), Error> {
    if rules.is_empty() {
        return Ok(());
    }

    for (index, segment) in rules.split(';').enumerate() {
        if segment.is_empty() {
            return Err(Error::new(
                span,
                format!(
                    "rule {} is empty in \"{}\"\n\
                     hint: remove the stray ';'",
                    index, rules
                ),
            ));
        }

        let mut has_validator = false;
        for token in segment.split(',') {
            let Some((key, value)) = token.split_once(':') else {
                return Err(Error::new(
                    span,
                    format!(
                        "parameter \"{}\" in rule {} has no ':' separator\n\
                         hint: parameters are written as key:value; a ',' inside an \
                         errorMessage starts a new parameter",
                        token, index
                    ),
                ));
            };

            if !KNOWN_KEYS.contains(&key) {
                return Err(Error::new(
                    span,
                    format!(
                        "unknown rule parameter \"{}\" in rule {}\n\
                         hint: expected one of {}",
                        key,
                        index,
                        KNOWN_KEYS.join(", ")
                    ),
                ));
            }

            if key == "funcVal" && !value.is_empty() {
                has_validator = true;
            }
        }

        if !has_validator {
            return Err(Error::new(
                span,
                format!("rule {} in \"{}\" does not name a validator (funcVal)", index, rules),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rules: &str) -> Result<(), String> {
        check_rules(rules, Span::call_site()).map_err(|e| e.to_string())
    }

    #[test]
    fn test_valid_rules() {
        assert!(check("").is_ok());
        assert!(check("funcVal:Required").is_ok());
        assert!(check("funcVal:Required;funcVal:Email").is_ok());
        assert!(check("funcVal:Match,format:^(62|0)([0-9]*)$").is_ok());
        assert!(check("funcVal:Date,format:mm/dd/yyyy,dateLayout:%m/%d/%Y").is_ok());
    }

    #[test]
    fn test_empty_segment() {
        let err = check("funcVal:Required;").unwrap_err();
        assert!(err.contains("rule 1 is empty"));
    }

    #[test]
    fn test_missing_separator() {
        let err = check("funcVal:Date,errorMessage:Wrong date, pls check").unwrap_err();
        assert!(err.contains("has no ':' separator"));
    }

    #[test]
    fn test_unknown_key() {
        let err = check("funcVal:Required,key:name").unwrap_err();
        assert!(err.contains("unknown rule parameter \"key\""));
    }

    #[test]
    fn test_missing_validator() {
        let err = check("errorMessage:oops").unwrap_err();
        assert!(err.contains("does not name a validator"));
    }
}
