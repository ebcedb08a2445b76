//! Integration tests for tagrule-validation

use serde::Serialize;
use std::sync::Arc;
use std::thread;
use tagrule_core::FieldValue;
use tagrule_derive::Record;
use tagrule_validation::*;

#[derive(Record, Default)]
struct User {
    #[valid("funcVal:Required,errorMessage:Please provide your name")]
    name: String,
    #[valid("funcVal:Required")]
    address: String,
    #[valid("funcVal:Required;funcVal:Email")]
    email: String,
    #[valid("funcVal:Required;funcVal:Phone")]
    phone: String,
}

#[derive(Record, Serialize, Default)]
struct Application {
    #[serde(rename = "id")]
    #[valid("funcVal:Required")]
    id: u32,
    #[serde(rename = "application_name")]
    #[valid("funcVal:Required")]
    name: String,
    #[serde(rename = "applied_time")]
    #[valid("funcVal:Required")]
    applied_time: String,
    #[serde(rename = "approved_time")]
    #[valid("funcVal:Required;funcVal:AfterDate,compareKey:applied_time")]
    approved_time: String,
}

#[derive(Record, Default)]
struct Approval {
    #[valid("funcVal:Required")]
    id: u32,
    status: String,
    #[valid("funcVal:CondRequired,compareKey:status,compareValue:approved|rejected")]
    approval_reason: String,
}

#[derive(Record, Default)]
struct Enrollment {
    #[valid("funcVal:Required")]
    id: u32,
    #[valid("funcVal:Required;funcVal:Date,format:mm/dd/yyyy,dateLayout:%m/%d/%Y")]
    date_join: String,
    #[valid(
        "funcVal:Required;funcVal:Date,format:mm/dd/yyyy,dateLayout:%m/%d/%Y,errorMessage:Wrong date format, pls check your format"
    )]
    date_testing: String,
}

#[derive(Record, Default)]
struct Reward {
    #[valid("funcVal:Required")]
    id: u32,
    #[valid("funcVal:AcceptedValues,values:e-voucher|giftcard")]
    reward_type: String,
    #[valid("funcVal:AcceptedValues,values:1<->5")]
    level: i32,
}

#[derive(Record, Default)]
struct Address {
    #[valid("funcVal:Required")]
    city: String,
}

#[derive(Record, Default)]
struct Customer {
    #[valid("funcVal:Required")]
    name: String,
    address: Address,
    #[valid("funcVal:Required")]
    phone: String,
}

fn messages(errors: &ValidationErrors) -> Vec<&str> {
    errors.messages()
}

#[test]
fn test_empty_user_reports_in_field_order() {
    let ctx = ValidationContext::with_builtins();
    let errors = ctx.validate(&User::default()).unwrap();

    assert_eq!(
        messages(&errors),
        vec![
            "Please provide your name",
            "address is required",
            "email is required",
            "phone is required",
        ]
    );
    let constraints: Vec<&str> = errors.iter().map(|e| e.constraint.as_str()).collect();
    assert_eq!(constraints, vec!["Required"; 4]);
}

#[test]
fn test_invalid_email_yields_single_error() {
    let ctx = ValidationContext::with_builtins();
    let user = User {
        name: "Bilal".into(),
        address: "Jakarta".into(),
        email: "not-an-email".into(),
        phone: "081234567".into(),
    };

    let errors = ctx.validate(&user).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors[0].constraint, "Email");
    assert_eq!(errors.errors[0].field, "email");
    assert_eq!(errors.errors[0].message, "email has invalid format value");
}

#[test]
fn test_email_pattern_is_case_sensitive() {
    let ctx = ValidationContext::with_builtins();
    let user = User {
        name: "Bilal".into(),
        address: "Jakarta".into(),
        email: "Bilal.muhammad@exampl.com".into(),
        phone: "+6281817800".into(),
    };

    let errors = ctx.validate(&user).unwrap();
    assert_eq!(
        messages(&errors),
        vec!["email has invalid format value", "phone has invalid format value"]
    );
}

#[test]
fn test_serde_rename_is_the_error_key() {
    let ctx = ValidationContext::with_builtins();
    let app = Application {
        id: 1,
        name: "AppName".into(),
        applied_time: "09/20/2017".into(),
        approved_time: String::new(),
    };

    let errors = ctx.validate(&app).unwrap();
    assert_eq!(messages(&errors), vec!["approved_time is required"]);
    assert_eq!(errors.get_field_errors("approved_time").len(), 1);
}

#[test]
fn test_after_date() {
    let ctx = ValidationContext::with_builtins();
    let mut app = Application {
        id: 1,
        name: String::new(),
        applied_time: "09/20/2017".into(),
        approved_time: "09/19/2017".into(),
    };

    let errors = ctx.validate(&app).unwrap();
    assert_eq!(
        messages(&errors),
        vec![
            "application_name is required",
            "invalid approved_time should be after applied_time",
        ]
    );
    assert_eq!(errors.errors[1].constraint, "AfterDate");

    app.name = "AppName".into();
    app.approved_time = "09/21/2017".into();
    assert!(ctx.validate(&app).unwrap().is_empty());
}

#[test]
fn test_conditional_requirement() {
    let ctx = ValidationContext::with_builtins();

    for status in ["approved", "rejected"] {
        let approval = Approval {
            id: 2,
            status: status.into(),
            approval_reason: String::new(),
        };
        let errors = ctx.validate(&approval).unwrap();
        assert_eq!(messages(&errors), vec!["approval_reason is required"], "status {}", status);
    }

    let pending = Approval {
        id: 2,
        status: "pending".into(),
        approval_reason: String::new(),
    };
    assert!(ctx.validate(&pending).unwrap().is_empty());
}

#[test]
fn test_match_with_inline_format() {
    #[derive(Record)]
    struct Contact {
        #[valid("funcVal:Required;funcVal:Match,format:^(62|0)([0-9]*)$")]
        phone_number: String,
    }

    let ctx = ValidationContext::with_builtins();
    let errors = ctx
        .validate(&Contact {
            phone_number: "+6281817800".into(),
        })
        .unwrap();
    assert_eq!(messages(&errors), vec!["phone_number has invalid format value"]);

    let errors = ctx
        .validate(&Contact {
            phone_number: "6281817800".into(),
        })
        .unwrap();
    assert!(errors.is_empty());
}

#[test]
fn test_dates_and_truncated_message() {
    let ctx = ValidationContext::with_builtins();

    let errors = ctx.validate(&Enrollment::default()).unwrap();
    assert_eq!(
        messages(&errors),
        vec![
            "id is required",
            "date_join is required",
            "date_testing is required"
        ]
    );

    let enrollment = Enrollment {
        id: 123,
        date_join: "29/11/2017".into(),
        date_testing: "date 19/29/2017".into(),
    };
    let errors = ctx.validate(&enrollment).unwrap();
    // the `,` in the message ends the errorMessage parameter
    assert_eq!(
        messages(&errors),
        vec![
            "date_join is expected of format mm/dd/yyyy",
            "Wrong date format"
        ]
    );
}

#[test]
fn test_accepted_values() {
    let ctx = ValidationContext::with_builtins();
    let reward = Reward {
        id: 0,
        reward_type: "The gifts".into(),
        level: 9,
    };

    let errors = ctx.validate(&reward).unwrap();
    assert_eq!(
        messages(&errors),
        vec![
            "id is required",
            "wrong value The gifts, accepted values e-voucher|giftcard",
            "9 is outside of range 1 - 5",
        ]
    );

    let reward = Reward {
        id: 1,
        reward_type: "giftcard".into(),
        level: 5,
    };
    assert!(ctx.validate(&reward).unwrap().is_empty());
}

#[test]
fn test_message_override_precedence() {
    let ctx = ValidationContext::with_builtins().with_error_message("Required", "Fields is required");

    let errors = ctx.validate(&User::default()).unwrap();
    assert_eq!(
        messages(&errors),
        vec![
            // the rule's own message wins over the override
            "Please provide your name",
            "Fields is required",
            "Fields is required",
            "Fields is required",
        ]
    );

    // validators without an override keep their default text
    let reward = Reward {
        id: 0,
        reward_type: "The gifts".into(),
        level: 1,
    };
    let errors = ctx.validate(&reward).unwrap();
    assert_eq!(
        messages(&errors),
        vec![
            "Fields is required",
            "wrong value The gifts, accepted values e-voucher|giftcard",
        ]
    );
}

#[test]
fn test_unknown_validator_fails_fast() {
    #[derive(Record)]
    struct Broken {
        #[valid("funcVal:Required")]
        first: String,
        #[valid("funcVal:Required;funcVal:Missing;funcVal:Required")]
        second: String,
        #[valid("funcVal:Required")]
        third: String,
    }

    let ctx = ValidationContext::with_builtins();
    let err = ctx
        .validate(&Broken {
            first: String::new(),
            second: String::new(),
            third: String::new(),
        })
        .unwrap_err();

    assert!(matches!(err, Error::ValidatorNotFound { ref name } if name == "Missing"));
}

#[test]
fn test_nested_policy() {
    let customer = Customer {
        name: String::new(),
        address: Address::default(),
        phone: String::new(),
    };

    let legacy = ValidationContext::with_builtins();
    assert_eq!(legacy.nested_policy(), NestedPolicy::Legacy);
    assert_eq!(
        messages(&legacy.validate(&customer).unwrap()),
        vec!["name is required", "phone is required"]
    );

    let merge = ValidationContext::with_builtins().with_nested_policy(NestedPolicy::Merge);
    assert_eq!(
        messages(&merge.validate(&customer).unwrap()),
        vec!["name is required", "city is required", "phone is required"]
    );
}

#[test]
fn test_nested_fail_fast_only_propagates_on_merge() {
    #[derive(Record, Default)]
    struct Inner {
        #[valid("funcVal:Unknown")]
        value: String,
    }

    #[derive(Record, Default)]
    struct Outer {
        #[valid("funcVal:Required")]
        name: String,
        inner: Inner,
    }

    let legacy = ValidationContext::with_builtins();
    assert_eq!(legacy.validate(&Outer::default()).unwrap().len(), 1);

    let merge = legacy.clone().with_nested_policy(NestedPolicy::Merge);
    assert!(matches!(
        merge.validate(&Outer::default()),
        Err(Error::ValidatorNotFound { .. })
    ));
}

#[test]
fn test_record_field_runs_its_own_rules() {
    #[derive(Record, Default)]
    struct Order {
        #[valid("funcVal:Required")]
        code: String,
        #[valid("funcVal:Required;funcVal:Verified")]
        shipping: Option<Address>,
    }

    let legacy = ValidationContext::with_builtins();
    legacy.register(
        "Verified",
        Validator::simple(|value, key, _| match value {
            FieldValue::Record(_) => Err(ValidationError::new(key, format!("{} is not verified", key))),
            _ => Ok(()),
        }),
    );

    let missing = Order { code: "A1".to_string(), shipping: None };
    assert_eq!(messages(&legacy.validate(&missing).unwrap()), vec!["shipping is required"]);

    let present = Order {
        code: "A1".to_string(),
        shipping: Some(Address { city: "Bandung".to_string() }),
    };
    let errors = legacy.validate(&present).unwrap();
    assert_eq!(messages(&errors), vec!["shipping is not verified"]);
    assert_eq!(errors.errors[0].constraint, "Verified");

    let blank = Order { code: "A1".to_string(), shipping: Some(Address::default()) };
    let merge = legacy.clone().with_nested_policy(NestedPolicy::Merge);
    assert_eq!(
        messages(&merge.validate(&blank).unwrap()),
        vec!["shipping is required", "shipping is not verified", "city is required"]
    );
}

#[test]
fn test_custom_validator_and_signature_gating() {
    fn even(value: &FieldValue<'_>, key: &str, message: &str) -> Result<(), ValidationError> {
        match value {
            FieldValue::Int(n) if n % 2 != 0 => Err(ValidationError::new(
                key,
                if message.is_empty() { format!("{} must be even", key) } else { message.to_string() },
            )),
            _ => Ok(()),
        }
    }

    #[derive(Record)]
    struct Batch {
        #[valid("funcVal:Even")]
        size: i64,
    }

    let ctx = ValidationContext::with_builtins();
    let before = ctx.registry().len();

    let err = ctx
        .registry()
        .try_register("Even", Box::new(|n: i64| n % 2 == 0))
        .unwrap_err();
    assert!(matches!(err, Error::SignatureNotAccepted { .. }));
    assert_eq!(ctx.registry().len(), before);
    assert!(matches!(
        ctx.validate(&Batch { size: 3 }),
        Err(Error::ValidatorNotFound { .. })
    ));

    ctx.registry().try_register("Even", Box::new(even as SimpleFn)).unwrap();
    let errors = ctx.validate(&Batch { size: 3 }).unwrap();
    assert_eq!(messages(&errors), vec!["size must be even"]);
    assert_eq!(errors.errors[0].constraint, "Even");
    assert!(ctx.validate(&Batch { size: 4 }).unwrap().is_empty());
}

#[test]
fn test_validate_trait_and_values() {
    let ctx = ValidationContext::with_builtins();
    let user = User::default();

    assert_eq!(user.validate_with(&ctx).unwrap().len(), 4);

    let errors = ctx.validate_value(&FieldValue::Int(3)).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors[0].constraint, "unsupportedInputKind");
}

#[test]
fn test_strict_parse_mode() {
    #[derive(Record)]
    struct Sloppy {
        #[valid("funcVal:Required,errorMessage:Hello, world")]
        name: String,
    }

    let sloppy = Sloppy { name: String::new() };

    let lenient = ValidationContext::with_builtins();
    assert_eq!(messages(&lenient.validate(&sloppy).unwrap()), vec!["Hello"]);

    let strict = lenient.with_parse_mode(ParseMode::Strict);
    match strict.validate(&sloppy) {
        Err(Error::Rules { field, source }) => {
            assert_eq!(field, "name");
            assert_eq!(
                source,
                ParseError::MissingSeparator {
                    segment: 0,
                    token: " world".to_string()
                }
            );
        }
        other => panic!("expected a rules error, got {:?}", other),
    }
}

#[test]
fn test_context_shared_across_threads() {
    let ctx = Arc::new(ValidationContext::with_builtins());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                let user = User {
                    name: format!("user{}", i),
                    ..Default::default()
                };
                ctx.validate(&user).map(|errors| errors.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 3);
    }
}

#[test]
fn test_errors_to_json() {
    let ctx = ValidationContext::with_builtins();
    let errors = ctx.validate(&Approval {
        id: 0,
        status: "approved".into(),
        approval_reason: String::new(),
    });

    let json = errors.unwrap().to_json();
    assert_eq!(json["errors"][0]["field"], "id");
    assert_eq!(json["errors"][1]["constraint"], "CondRequired");
}
