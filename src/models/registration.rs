use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::responses::FieldError;

pub const NAME_LENGTH: RangeInclusive<usize> = 2..=32;
pub const PASSWORD_LENGTH: RangeInclusive<usize> = 3..=32;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub dob: Option<String>,
    pub password: String,

    #[serde(default)]
    pub default_shipping_check: bool,
    pub ship_country: String,
    pub ship_city: String,
    pub ship_street: String,
    pub ship_postal_code: String,

    #[serde(default)]
    pub default_billing_check: bool,
    #[serde(default)]
    pub bill_country: Option<String>,
    #[serde(default)]
    pub bill_city: Option<String>,
    #[serde(default)]
    pub bill_street: Option<String>,
    #[serde(default)]
    pub bill_postal_code: Option<String>,
}

impl RegistrationPayload {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_length(&mut errors, "firstName", &self.first_name, NAME_LENGTH);
        check_length(&mut errors, "lastName", &self.last_name, NAME_LENGTH);
        check_length(&mut errors, "password", &self.password, PASSWORD_LENGTH);
        check_email(&mut errors, "email", &self.email);
        errors
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

impl LoginPayload {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_email(&mut errors, "email", &self.email);
        errors
    }
}

/// Lower-cased and trimmed, the form under which emails are stored.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lengths are measured on the trimmed value, the form names are stored in.
pub fn check_length(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: &str,
    range: RangeInclusive<usize>,
) {
    let len = value.trim().chars().count();
    if !range.contains(&len) {
        errors.push(FieldError::new(
            field,
            format!(
                "must be between {} and {} characters",
                range.start(),
                range.end()
            ),
        ));
    }
}

fn check_email(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if normalize_email(value).parse::<lettre::Address>().is_err() {
        errors.push(FieldError::new(field, "must be a valid email address"));
    }
}
