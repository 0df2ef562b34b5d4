pub mod rules;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::dtos::auth_dtos::{CompleteProfileIn, LoginIn, RegisterIn};
use crate::dtos::profile_dtos::{UpdateBrandProfileIn, UpdateProfileIn};
use rules::is_reserved_username;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$").unwrap());
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").unwrap());
static BIRTH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}-\d{2}-\d{4}|\d{4}-\d{2}-\d{2})$").unwrap());
static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Substrings nobody should build a password around. Checked case-sensitive,
/// as a substring match.
const COMMON_PASSWORD_FRAGMENTS: [&str; 7] = [
    "123456",
    "password",
    "qwerty",
    "admin",
    "linkhub",
    "12345678",
    "password123",
];

/// Per-field validation messages, serialized as `{"field": ["msg", ...]}`.
/// Field keys use the wire-format names (`confirmPassword`, `birthDate`).
#[derive(Debug, Default, Serialize)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|messages| messages.as_slice())
    }
}

fn finish(errors: FieldErrors) -> Result<(), FieldErrors> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !EMAIL_RE.is_match(email) {
        errors.add("email", "Enter a valid email address.");
    }
}

fn is_url(value: &str) -> bool {
    reqwest::Url::parse(value).is_ok()
}

pub fn validate_register(input: &RegisterIn) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if input.role != "brand" && input.role != "creator" {
        errors.add("role", "Role must be either \"brand\" or \"creator\".");
    }
    check_email(&mut errors, &input.email);

    let password_len = input.password.chars().count();
    if password_len < 8 {
        errors.add("password", "Password must be at least 8 characters.");
    }
    if password_len > 128 {
        errors.add("password", "Password must be at most 128 characters.");
    }
    if !input.password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.add("password", "Password must contain an uppercase letter.");
    }
    if !input.password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.add("password", "Password must contain a lowercase letter.");
    }
    if !input.password.chars().any(|c| c.is_ascii_digit()) {
        errors.add("password", "Password must contain a digit.");
    }
    if !input.password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        errors.add("password", "Password must contain a special character.");
    }
    if COMMON_PASSWORD_FRAGMENTS
        .iter()
        .any(|fragment| input.password.contains(fragment))
    {
        errors.add("password", "Password is too common.");
    }

    if input.password != input.confirm_password {
        errors.add("confirmPassword", "Passwords do not match.");
    }

    finish(errors)
}

/// Login only checks length so the response never leaks the full
/// registration password policy.
pub fn validate_login(input: &LoginIn) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_email(&mut errors, &input.email);
    if input.password.chars().count() < 8 {
        errors.add("password", "Password must be at least 8 characters.");
    }

    finish(errors)
}

pub fn validate_complete_profile(input: &CompleteProfileIn) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    let username_len = input.username.chars().count();
    if username_len < 3 {
        errors.add("username", "Username must be at least 3 characters.");
    }
    if username_len > 20 {
        errors.add("username", "Username must be at most 20 characters.");
    }
    if !USERNAME_RE.is_match(&input.username) {
        errors.add("username", "Only letters, numbers, and underscores are allowed.");
    }
    if is_reserved_username(&input.username) {
        errors.add("username", "This username is not available.");
    }

    let name_len = input.full_name.chars().count();
    if name_len < 2 {
        errors.add("fullName", "Full name must be at least 2 characters.");
    }
    if name_len > 50 {
        errors.add("fullName", "Full name must be at most 50 characters.");
    }

    if !BIRTH_DATE_RE.is_match(&input.birth_date) {
        errors.add("birthDate", "Use DD-MM-YYYY or YYYY-MM-DD format.");
    }

    finish(errors)
}

pub fn validate_email_payload(email: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, email);
    finish(errors)
}

fn check_display_name(errors: &mut FieldErrors, display_name: &str) {
    let len = display_name.chars().count();
    if len < 2 {
        errors.add("display_name", "Display name must be at least 2 characters.");
    }
    if len > 50 {
        errors.add("display_name", "Display name must be at most 50 characters.");
    }
}

fn check_optional_url(errors: &mut FieldErrors, field: &str, value: Option<&String>) {
    if let Some(value) = value {
        if !is_url(value) {
            errors.add(field, "Enter a valid URL.");
        }
    }
}

fn check_bio(errors: &mut FieldErrors, bio: Option<&String>) {
    if let Some(bio) = bio {
        if bio.chars().count() > 500 {
            errors.add("bio", "Bio must be at most 500 characters.");
        }
    }
}

pub fn validate_profile_update(input: &UpdateProfileIn) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_display_name(&mut errors, &input.display_name);
    check_bio(&mut errors, input.bio.as_ref());
    check_optional_url(&mut errors, "avatar_url", input.avatar_url.as_ref());
    check_optional_url(&mut errors, "website", input.website.as_ref());

    finish(errors)
}

pub fn validate_brand_profile(input: &UpdateBrandProfileIn) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    check_display_name(&mut errors, &input.display_name);
    check_bio(&mut errors, input.bio.as_ref());

    let category_len = input.business_category.chars().count();
    if category_len < 2 {
        errors.add("business_category", "Business category must be at least 2 characters.");
    }
    if category_len > 50 {
        errors.add("business_category", "Business category must be at most 50 characters.");
    }

    if !ISO_DATE_RE.is_match(&input.established_date) {
        errors.add("established_date", "Use YYYY-MM-DD format.");
    }

    check_optional_url(&mut errors, "logo", input.logo.as_ref());
    check_optional_url(&mut errors, "website", input.website.as_ref());

    finish(errors)
}
