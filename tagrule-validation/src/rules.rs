// Rule metadata grammar
//
// key1:value1,key2:value2;key3:value3
//
// `;` separates rules, `,` separates parameters of one rule and the first `:`
// of a parameter separates its key from its value.

use std::fmt;
use thiserror::Error;

const RULE_SEPARATOR: char = ';';
const PARAM_SEPARATOR: char = ',';
const KEY_SEPARATOR: char = ':';

/// One parsed rule, borrowing from the metadata string it came from.
///
/// Unset parameters are empty strings. A descriptor without a validator name
/// is inert and skipped at dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleDescriptor<'a> {
    /// `funcVal`
    pub validator_name: &'a str,
    /// `errorMessage`
    pub error_message: &'a str,
    /// `format`
    pub format: &'a str,
    /// `compareKey`
    pub compare_key: &'a str,
    /// `compareValue`
    pub compare_value: &'a str,
    /// `dateLayout`
    pub date_layout: &'a str,
    /// `values`
    pub accepted_values: &'a str,
}

impl<'a> RuleDescriptor<'a> {
    pub fn new(validator_name: &'a str) -> Self {
        Self {
            validator_name,
            ..Default::default()
        }
    }

    pub fn is_inert(&self) -> bool {
        self.validator_name.is_empty()
    }

    /// Store `value` under `key`; returns `false` for unrecognized keys.
    fn assign(&mut self, key: &str, value: &'a str) -> bool {
        let slot = match key {
            "funcVal" => &mut self.validator_name,
            "errorMessage" => &mut self.error_message,
            "format" => &mut self.format,
            "compareKey" => &mut self.compare_key,
            "compareValue" => &mut self.compare_value,
            "dateLayout" => &mut self.date_layout,
            "values" => &mut self.accepted_values,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn params(&self) -> [(&'static str, &'a str); 7] {
        [
            ("funcVal", self.validator_name),
            ("errorMessage", self.error_message),
            ("format", self.format),
            ("compareKey", self.compare_key),
            ("compareValue", self.compare_value),
            ("dateLayout", self.date_layout),
            ("values", self.accepted_values),
        ]
    }
}

impl fmt::Display for RuleDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in self.params() {
            if value.is_empty() {
                continue;
            }
            if !first {
                write!(f, "{}", PARAM_SEPARATOR)?;
            }
            write!(f, "{}{}{}", key, KEY_SEPARATOR, value)?;
            first = false;
        }
        Ok(())
    }
}

/// Ordered rules of one field, executed left to right.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet<'a> {
    rules: Vec<RuleDescriptor<'a>>,
}

impl<'a> RuleSet<'a> {
    pub fn new(rules: Vec<RuleDescriptor<'a>>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RuleDescriptor<'a>> {
        self.rules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleDescriptor<'a>> {
        self.rules.iter()
    }

    pub fn as_slice(&self) -> &[RuleDescriptor<'a>] {
        &self.rules
    }
}

impl<'a> IntoIterator for RuleSet<'a> {
    type Item = RuleDescriptor<'a>;
    type IntoIter = std::vec::IntoIter<RuleDescriptor<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

impl<'s, 'a> IntoIterator for &'s RuleSet<'a> {
    type Item = &'s RuleDescriptor<'a>;
    type IntoIter = std::slice::Iter<'s, RuleDescriptor<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Display for RuleSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", RULE_SEPARATOR)?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}

/// Rejections reported by [`parse_strict`]. Segments are zero-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("rule {segment} is empty")]
    EmptySegment { segment: usize },

    #[error("rule {segment}: parameter `{token}` has no `:` separator")]
    MissingSeparator { segment: usize, token: String },

    #[error("rule {segment}: unknown parameter key `{key}`")]
    UnknownKey { segment: usize, key: String },
}

/// Parse rule metadata leniently.
///
/// Never fails: tokens without `:` and unknown keys are ignored, values are
/// kept verbatim (no trimming) and only the first `:` of a token splits it, so
/// values may contain `:`. One descriptor is produced per `;` segment.
///
/// ```
/// use tagrule_validation::parse;
///
/// let rules = parse("funcVal:Required,errorMessage:Name is required;funcVal:Match,format:^[a-z]+$");
/// assert_eq!(rules.len(), 2);
/// assert_eq!(rules.get(0).unwrap().error_message, "Name is required");
/// assert_eq!(rules.get(1).unwrap().format, "^[a-z]+$");
/// ```
pub fn parse(metadata: &str) -> RuleSet<'_> {
    let mut slots = Vec::new();
    fill(metadata, None, &mut slots);
    RuleSet::new(slots)
}

// Each call handles one nesting level and recurses on the smaller fragments.
fn fill<'a>(input: &'a str, index: Option<usize>, slots: &mut Vec<RuleDescriptor<'a>>) {
    if input.is_empty() {
        return;
    }

    if input.contains(RULE_SEPARATOR) {
        let segments: Vec<&'a str> = input.split(RULE_SEPARATOR).collect();
        slots.resize(segments.len(), RuleDescriptor::default());
        for (i, segment) in segments.into_iter().enumerate() {
            fill(segment, Some(i), slots);
        }
    } else if input.contains(PARAM_SEPARATOR) {
        let index = claim(index, slots);
        for token in input.split(PARAM_SEPARATOR) {
            fill(token, Some(index), slots);
        }
    } else {
        let index = claim(index, slots);
        if let Some((key, value)) = input.split_once(KEY_SEPARATOR) {
            slots[index].assign(key, value);
        }
    }
}

// A fragment parsed at top level owns slot 0.
fn claim(index: Option<usize>, slots: &mut Vec<RuleDescriptor<'_>>) -> usize {
    if slots.is_empty() {
        slots.push(RuleDescriptor::default());
        return 0;
    }
    index.unwrap_or(0)
}

/// Parse rule metadata, rejecting empty segments, parameters without `:` and
/// unknown keys.
///
/// Well-formed metadata yields the same rules as [`parse`].
pub fn parse_strict(metadata: &str) -> Result<RuleSet<'_>, ParseError> {
    if metadata.is_empty() {
        return Ok(RuleSet::default());
    }

    let mut rules = Vec::new();
    for (segment, text) in metadata.split(RULE_SEPARATOR).enumerate() {
        if text.is_empty() {
            return Err(ParseError::EmptySegment { segment });
        }

        let mut rule = RuleDescriptor::default();
        for token in text.split(PARAM_SEPARATOR) {
            let (key, value) =
                token
                    .split_once(KEY_SEPARATOR)
                    .ok_or_else(|| ParseError::MissingSeparator {
                        segment,
                        token: token.to_string(),
                    })?;

            if !rule.assign(key, value) {
                return Err(ParseError::UnknownKey {
                    segment,
                    key: key.to_string(),
                });
            }
        }
        rules.push(rule);
    }

    Ok(RuleSet::new(rules))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_metadata() {
        assert!(parse("").is_empty());
        assert!(parse_strict("").unwrap().is_empty());
    }

    #[test]
    fn test_single_rule() {
        let rules = parse("funcVal:Required");
        assert_eq!(rules.as_slice(), &[RuleDescriptor::new("Required")]);
    }

    #[test]
    fn test_rules_keep_order() {
        let rules = parse("funcVal:Required;funcVal:Email");
        let names: Vec<&str> = rules.iter().map(|r| r.validator_name).collect();
        assert_eq!(names, vec!["Required", "Email"]);
    }

    #[test]
    fn test_all_keys() {
        let rules = parse(
            "funcVal:Date,errorMessage:bad date,format:dd-mm-yyyy,dateLayout:%d-%m-%Y;\
             funcVal:CondRequired,compareKey:status,compareValue:approved|done;\
             funcVal:AcceptedValues,values:1<->10",
        );

        assert_eq!(rules.len(), 3);
        let date = rules.get(0).unwrap();
        assert_eq!(date.error_message, "bad date");
        assert_eq!(date.format, "dd-mm-yyyy");
        assert_eq!(date.date_layout, "%d-%m-%Y");

        let cond = rules.get(1).unwrap();
        assert_eq!(cond.compare_key, "status");
        assert_eq!(cond.compare_value, "approved|done");

        assert_eq!(rules.get(2).unwrap().accepted_values, "1<->10");
    }

    #[test]
    fn test_value_keeps_inner_colons() {
        let rules = parse("funcVal:Match,format:^[0-9]{2}:[0-9]{2}$");
        assert_eq!(rules.get(0).unwrap().format, "^[0-9]{2}:[0-9]{2}$");
    }

    #[test]
    fn test_whitespace_is_preserved() {
        let rules = parse("funcVal: Required ,errorMessage: spaced ");
        let rule = rules.get(0).unwrap();
        assert_eq!(rule.validator_name, " Required ");
        assert_eq!(rule.error_message, " spaced ");
    }

    #[test]
    fn test_lenient_ignores_malformed_tokens() {
        let rules = parse("funcVal:Required,garbage,unknown:1");
        assert_eq!(rules.as_slice(), &[RuleDescriptor::new("Required")]);

        // a bare token still claims a slot, which stays inert
        let rules = parse("Required");
        assert_eq!(rules.len(), 1);
        assert!(rules.get(0).unwrap().is_inert());
    }

    #[test]
    fn test_comma_in_message_truncates() {
        let rules = parse("funcVal:Required,errorMessage:Hello, world");
        assert_eq!(rules.get(0).unwrap().error_message, "Hello");
    }

    #[test]
    fn test_empty_segments_leave_inert_slots() {
        let rules = parse("funcVal:Required;;funcVal:Email;");
        assert_eq!(rules.len(), 4);
        assert!(rules.get(1).unwrap().is_inert());
        assert_eq!(rules.get(2).unwrap().validator_name, "Email");
        assert!(rules.get(3).unwrap().is_inert());
    }

    #[test]
    fn test_strict_matches_lenient_on_valid_input() {
        let metadata = "funcVal:Required,errorMessage:needed;funcVal:Match,format:^a:b$";
        assert_eq!(parse_strict(metadata).unwrap(), parse(metadata));
    }

    #[test]
    fn test_strict_rejections() {
        assert_eq!(
            parse_strict("funcVal:Required;;funcVal:Email"),
            Err(ParseError::EmptySegment { segment: 1 })
        );
        assert_eq!(
            parse_strict("funcVal:Required,errorMessage:Hello, world"),
            Err(ParseError::MissingSeparator {
                segment: 0,
                token: " world".to_string()
            })
        );
        assert_eq!(
            parse_strict("funcVal:Email;funcVal:Match,pattern:x"),
            Err(ParseError::UnknownKey {
                segment: 1,
                key: "pattern".to_string()
            })
        );
    }

    #[test]
    fn test_render() {
        let rules = RuleSet::new(vec![
            RuleDescriptor {
                validator_name: "Required",
                error_message: "Name is required",
                ..Default::default()
            },
            RuleDescriptor {
                validator_name: "AcceptedValues",
                accepted_values: "a|b",
                ..Default::default()
            },
        ]);

        assert_eq!(
            rules.to_string(),
            "funcVal:Required,errorMessage:Name is required;funcVal:AcceptedValues,values:a|b"
        );
    }

    fn param() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[a-zA-Z0-9 :|<>./%^$-]{1,12}"]
    }

    fn rule() -> impl Strategy<Value = Vec<String>> {
        ("[A-Za-z]{1,10}", proptest::collection::vec(param(), 6)).prop_map(|(name, mut rest)| {
            rest.insert(0, name);
            rest
        })
    }

    fn descriptor(parts: &[String]) -> RuleDescriptor<'_> {
        RuleDescriptor {
            validator_name: &parts[0],
            error_message: &parts[1],
            format: &parts[2],
            compare_key: &parts[3],
            compare_value: &parts[4],
            date_layout: &parts[5],
            accepted_values: &parts[6],
        }
    }

    proptest! {
        #[test]
        fn prop_render_then_parse(raw in proptest::collection::vec(rule(), 1..5)) {
            let set = RuleSet::new(raw.iter().map(|parts| descriptor(parts)).collect());
            let rendered = set.to_string();

            prop_assert_eq!(&parse(&rendered), &set);
            prop_assert_eq!(&parse_strict(&rendered).unwrap(), &set);
        }

        #[test]
        fn prop_lenient_never_panics(input in ".{0,64}") {
            let rules = parse(&input);
            prop_assert!(rules.len() <= input.matches(';').count() + 1);
        }
    }
}
