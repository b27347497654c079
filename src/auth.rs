use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum AuthField {
    Email,
    Password,
    ConfirmPassword,
    FullName,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AuthForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub full_name: String,
}

pub type ValidationErrors = BTreeMap<AuthField, &'static str>;

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

/// Inline form errors keyed by field. Empty means the form can be submitted.
pub fn validate(form: &AuthForm, mode: AuthMode) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if form.email.is_empty() {
        errors.insert(AuthField::Email, "Email is required");
    } else if !is_valid_email(&form.email) {
        errors.insert(AuthField::Email, "Please enter a valid email address");
    }

    if form.password.is_empty() {
        errors.insert(AuthField::Password, "Password is required");
    } else if form.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.insert(AuthField::Password, "Password must be at least 8 characters");
    }

    if mode == AuthMode::SignUp {
        if form.full_name.is_empty() {
            errors.insert(AuthField::FullName, "Full name is required");
        }
        if form.confirm_password.is_empty() {
            errors.insert(AuthField::ConfirmPassword, "Please confirm your password");
        } else if form.password != form.confirm_password {
            errors.insert(AuthField::ConfirmPassword, "Passwords do not match");
        }
    }

    errors
}
