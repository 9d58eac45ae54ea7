use super::*;
use crate::domain::{Address, Company, Geo};

fn valid_user() -> NewUser {
    NewUser {
        name: "Ann Example".into(),
        email: "ann@example.com".into(),
        phone: "(555) 010-2000".into(),
        website: "example.org".into(),
        address: Address {
            street: "Main Street".into(),
            suite: "Apt. 1".into(),
            city: "Springfield".into(),
            zipcode: "12345-6789".into(),
            geo: Geo::default(),
        },
        company: Company {
            name: "Acme".into(),
            catch_phrase: "Everything you need".into(),
            bs: "synergize things".into(),
        },
    }
}

#[test]
fn accepts_complete_user() {
    assert!(validate_user(&valid_user()).is_ok());
}

#[test]
fn reports_each_failing_field_once() {
    let mut user = valid_user();
    user.name = " ".into();
    user.email = "not-an-email".into();
    user.address.zipcode = "1234".into();
    user.company.bs = "abc".into();

    let errors = validate_user(&user).expect_err("invalid");
    assert_eq!(errors.len(), 4);
    assert_eq!(errors.get("name"), Some("Name is required"));
    assert_eq!(errors.get("email"), Some("Please enter a valid email"));
    assert_eq!(errors.get("address.zipcode"), Some("Please enter a valid zipcode"));
    assert_eq!(
        errors.get("company.bs"),
        Some("Business strategy must be at least 5 characters")
    );
}

#[test]
fn enforces_name_length_bounds() {
    assert_eq!(
        validate_field("name", "A").as_deref(),
        Some("Name must be at least 2 characters")
    );
    let long = "x".repeat(NAME_MAX_LENGTH + 1);
    assert_eq!(
        validate_field("name", &long).as_deref(),
        Some("Name must be no more than 50 characters")
    );
    assert_eq!(validate_field("name", "Al"), None);
}

#[test]
fn website_requires_bare_domain() {
    assert_eq!(validate_field("website", "hildegard.org"), None);
    assert!(validate_field("website", "https://hildegard.org").is_some());
}

#[test]
fn geo_is_not_validated() {
    assert_eq!(validate_field("address.geo.lat", ""), None);
}

#[test]
fn email_taken_is_case_insensitive_and_skips_edited_record() {
    let records = vec![valid_user().into_record(UserId(1))];
    assert!(email_taken(&records, "ANN@example.com", None));
    assert!(!email_taken(&records, "ann@example.com", Some(UserId(1))));
    assert!(!email_taken(&records, "bob@example.com", None));
}

#[test]
fn edit_rules_only_apply_formats_to_changed_fields() {
    let mut before = valid_user();
    before.phone = "1-770-736-8031 x56442".into();
    before.address.zipcode = "3350".into();

    let mut after = before.clone();
    after.name = "Ann Edited".into();
    assert!(validate_user_edit(&before, &after).is_ok());

    after.address.zipcode = "33501".into();
    assert!(validate_user_edit(&before, &after).is_ok());

    after.phone = "ring ring".into();
    after.address.suite = "  ".into();
    let errors = validate_user_edit(&before, &after).expect_err("invalid");
    assert_eq!(errors.get("phone"), Some("Please enter a valid phone"));
    assert_eq!(errors.get("address.suite"), Some("Suite is required"));
    assert_eq!(errors.len(), 2);
}
