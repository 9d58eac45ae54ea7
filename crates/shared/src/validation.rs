//! Field rules applied by every front end before handing a record to the store.
//!
//! The store itself accepts any well-formed record; these checks only exist so
//! forms across front ends reject the same input with the same messages.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    domain::{NewUser, UserId, UserRecord},
    error::FieldErrors,
};

pub const NAME_MIN_LENGTH: usize = 2;
pub const NAME_MAX_LENGTH: usize = 50;
pub const STREET_MIN_LENGTH: usize = 3;
pub const CITY_MIN_LENGTH: usize = 2;
pub const COMPANY_NAME_MIN_LENGTH: usize = 2;
pub const CATCH_PHRASE_MIN_LENGTH: usize = 5;
pub const BS_MIN_LENGTH: usize = 5;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d\s\-+()]+$").expect("phone pattern"));
static WEBSITE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{1,61}[a-zA-Z0-9]\.[a-zA-Z]{2,}$")
        .expect("website pattern")
});
static ZIPCODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("zipcode pattern"));

struct FieldRule {
    field: &'static str,
    label: &'static str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<&'static LazyLock<Regex>>,
}

impl FieldRule {
    const fn required(field: &'static str, label: &'static str) -> Self {
        Self {
            field,
            label,
            min_length: None,
            max_length: None,
            pattern: None,
        }
    }

    const fn min(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self
    }

    const fn max(mut self, len: usize) -> Self {
        self.max_length = Some(len);
        self
    }

    const fn pattern(mut self, pattern: &'static LazyLock<Regex>) -> Self {
        self.pattern = Some(pattern);
        self
    }

    fn check_required(&self, value: &str) -> Option<String> {
        value
            .trim()
            .is_empty()
            .then(|| format!("{} is required", self.label))
    }

    fn check(&self, value: &str) -> Option<String> {
        if let Some(message) = self.check_required(value) {
            return Some(message);
        }

        let len = value.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Some(format!("{} must be at least {min} characters", self.label));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Some(format!(
                    "{} must be no more than {max} characters",
                    self.label
                ));
            }
        }
        if let Some(pattern) = self.pattern {
            if !pattern.is_match(value) {
                return Some(format!(
                    "Please enter a valid {}",
                    self.label.to_ascii_lowercase()
                ));
            }
        }
        None
    }
}

static RULES: [FieldRule; 11] = [
    FieldRule::required("name", "Name")
        .min(NAME_MIN_LENGTH)
        .max(NAME_MAX_LENGTH),
    FieldRule::required("email", "Email").pattern(&EMAIL_PATTERN),
    FieldRule::required("phone", "Phone").pattern(&PHONE_PATTERN),
    FieldRule::required("website", "Website").pattern(&WEBSITE_PATTERN),
    FieldRule::required("address.street", "Street").min(STREET_MIN_LENGTH),
    FieldRule::required("address.suite", "Suite"),
    FieldRule::required("address.city", "City").min(CITY_MIN_LENGTH),
    FieldRule::required("address.zipcode", "Zipcode").pattern(&ZIPCODE_PATTERN),
    FieldRule::required("company.name", "Company name").min(COMPANY_NAME_MIN_LENGTH),
    FieldRule::required("company.catchPhrase", "Catch phrase").min(CATCH_PHRASE_MIN_LENGTH),
    FieldRule::required("company.bs", "Business strategy").min(BS_MIN_LENGTH),
];

fn field_value<'a>(user: &'a NewUser, field: &str) -> &'a str {
    match field {
        "name" => &user.name,
        "email" => &user.email,
        "phone" => &user.phone,
        "website" => &user.website,
        "address.street" => &user.address.street,
        "address.suite" => &user.address.suite,
        "address.city" => &user.address.city,
        "address.zipcode" => &user.address.zipcode,
        "company.name" => &user.company.name,
        "company.catchPhrase" => &user.company.catch_phrase,
        "company.bs" => &user.company.bs,
        _ => "",
    }
}

/// Checks a single field path; unknown paths have no rules and always pass.
pub fn validate_field(field: &str, value: &str) -> Option<String> {
    RULES
        .iter()
        .find(|rule| rule.field == field)
        .and_then(|rule| rule.check(value))
}

pub fn validate_user(user: &NewUser) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for rule in &RULES {
        if let Some(message) = rule.check(field_value(user, rule.field)) {
            errors.insert(rule.field, message);
        }
    }
    errors.into_result()
}

/// Edit-form rules. Every field must still be filled in, but length and format
/// rules apply only to fields whose value differs from `before`, so records
/// imported with looser formats (`1-770-736-8031 x56442`) stay editable.
pub fn validate_user_edit(before: &NewUser, after: &NewUser) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    for rule in &RULES {
        let value = field_value(after, rule.field);
        let message = if value == field_value(before, rule.field) {
            rule.check_required(value)
        } else {
            rule.check(value)
        };
        if let Some(message) = message {
            errors.insert(rule.field, message);
        }
    }
    errors.into_result()
}

/// Case-insensitive email lookup, ignoring the record `except` (the one being edited).
pub fn email_taken(records: &[UserRecord], email: &str, except: Option<UserId>) -> bool {
    let wanted = email.trim().to_lowercase();
    records
        .iter()
        .filter(|record| Some(record.id) != except)
        .any(|record| record.email.to_lowercase() == wanted)
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
