//! Field validators.
//!
//! Every validator is a pure function from a raw value (and, for
//! `ConfirmPassword`, the peer password) to `Option<FieldError>`. `None` means
//! the value is acceptable, so callers can treat the presence of an error as
//! the failure signal.
//!
//! Passwords are checked two ways:
//! - [`validate`] with [`FieldRule::Password`] reports the first failing
//!   requirement only (submit-time gating).
//! - [`password_strength`] evaluates every requirement at once for live
//!   feedback while typing.

use std::fmt;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// Characters accepted as the "special character" password requirement.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_NAME_LENGTH: usize = 2;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid");
    static ref NAME_PATTERN: Regex =
        Regex::new(r"^[A-Za-z '-]+$").expect("name pattern is valid");
    static ref AMOUNT_PATTERN: Regex =
        Regex::new(r"^\d+(\.\d{1,2})?$").expect("amount pattern is valid");
    static ref GROUP_CODE_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9]{4,12}$").expect("group code pattern is valid");
}

/// Machine-readable reason attached to every [`FieldError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorCode {
    Required,
    InvalidFormat,
    TooShort,
    InvalidChars,
    Mismatch,
    PasswordLength,
    PasswordUppercase,
    PasswordLowercase,
    PasswordDigit,
    PasswordSpecial,
    InvalidNumber,
    NotPositive,
    InvalidDate,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Structured validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: ErrorCode,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Which validation rule a field is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Email,
    Password,
    Name,
    /// Must equal the peer password value.
    ConfirmPassword,
    /// Any non-blank value.
    Required,
    /// Positive decimal with at most two fraction digits.
    Amount,
    /// Calendar date written as `YYYY-MM-DD`.
    Date,
    /// 4 to 12 ASCII letters or digits.
    GroupCode,
}

impl FieldRule {
    /// Field key used by [`validate`] when no explicit key is given.
    pub fn default_key(&self) -> &'static str {
        match self {
            FieldRule::Email => "email",
            FieldRule::Password => "password",
            FieldRule::Name => "name",
            FieldRule::ConfirmPassword => "confirm_password",
            FieldRule::Required => "value",
            FieldRule::Amount => "amount",
            FieldRule::Date => "date",
            FieldRule::GroupCode => "group_code",
        }
    }

    fn required_message(&self) -> &'static str {
        match self {
            FieldRule::Email => "Email is required",
            FieldRule::Password => "Password is required",
            FieldRule::Name => "Name is required",
            FieldRule::ConfirmPassword => "Please confirm your password",
            FieldRule::Required => "This field is required",
            FieldRule::Amount => "Amount is required",
            FieldRule::Date => "Date is required",
            FieldRule::GroupCode => "Group code is required",
        }
    }
}

/// Validate `value` under `rule`, reporting errors against the rule's default key.
pub fn validate(rule: FieldRule, value: &str, peer: Option<&str>) -> Option<FieldError> {
    validate_field(rule.default_key(), rule, value, peer)
}

/// Validate `value` under `rule`, reporting errors against `field`.
pub fn validate_field(
    field: &str,
    rule: FieldRule,
    value: &str,
    peer: Option<&str>,
) -> Option<FieldError> {
    let fail = |code: ErrorCode, message: &str| Some(FieldError::new(field, code, message));

    // Identity fields are checked as typed; only the empty string is missing.
    let blank = match rule {
        FieldRule::Email | FieldRule::Name | FieldRule::Password | FieldRule::ConfirmPassword => {
            value.is_empty()
        }
        _ => value.trim().is_empty(),
    };
    if blank {
        return fail(ErrorCode::Required, rule.required_message());
    }

    match rule {
        FieldRule::Email => {
            if !EMAIL_PATTERN.is_match(value) {
                return fail(
                    ErrorCode::InvalidFormat,
                    "Please enter a valid email address",
                );
            }
        }
        FieldRule::Password => {
            if let Some(check) = PasswordCheck::iter().find(|check| !check.holds(value)) {
                return fail(check.error_code(), check.message());
            }
        }
        FieldRule::Name => {
            if value.chars().count() < MIN_NAME_LENGTH {
                return fail(ErrorCode::TooShort, "Name must be at least 2 characters");
            }
            if !NAME_PATTERN.is_match(value) {
                return fail(
                    ErrorCode::InvalidChars,
                    "Name can only contain letters, spaces, hyphens and apostrophes",
                );
            }
        }
        FieldRule::ConfirmPassword => {
            if Some(value) != peer {
                return fail(ErrorCode::Mismatch, "Passwords do not match");
            }
        }
        FieldRule::Required => {}
        FieldRule::Amount => {
            let trimmed = value.trim();
            if !AMOUNT_PATTERN.is_match(trimmed) {
                return fail(ErrorCode::InvalidNumber, "Enter a valid amount");
            }
            match trimmed.parse::<f64>() {
                Ok(amount) if amount > 0.0 => {}
                Ok(_) => return fail(ErrorCode::NotPositive, "Amount must be greater than zero"),
                Err(_) => return fail(ErrorCode::InvalidNumber, "Enter a valid amount"),
            }
        }
        FieldRule::Date => {
            if NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_err() {
                return fail(ErrorCode::InvalidDate, "Enter a date as YYYY-MM-DD");
            }
        }
        FieldRule::GroupCode => {
            if !GROUP_CODE_PATTERN.is_match(value.trim()) {
                return fail(
                    ErrorCode::InvalidFormat,
                    "Group codes are 4 to 12 letters or digits",
                );
            }
        }
    }

    None
}

/// One password requirement, in the order the submit-time check applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum PasswordCheck {
    Length,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordCheck {
    pub fn holds(&self, password: &str) -> bool {
        match self {
            PasswordCheck::Length => password.chars().count() >= MIN_PASSWORD_LENGTH,
            PasswordCheck::Uppercase => password.chars().any(|c| c.is_ascii_uppercase()),
            PasswordCheck::Lowercase => password.chars().any(|c| c.is_ascii_lowercase()),
            PasswordCheck::Digit => password.chars().any(|c| c.is_ascii_digit()),
            PasswordCheck::Special => password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)),
        }
    }

    /// Short checklist label for live feedback.
    pub fn label(&self) -> &'static str {
        match self {
            PasswordCheck::Length => "At least 8 characters",
            PasswordCheck::Uppercase => "One uppercase letter",
            PasswordCheck::Lowercase => "One lowercase letter",
            PasswordCheck::Digit => "One number",
            PasswordCheck::Special => "One special character",
        }
    }

    fn error_code(&self) -> ErrorCode {
        match self {
            PasswordCheck::Length => ErrorCode::PasswordLength,
            PasswordCheck::Uppercase => ErrorCode::PasswordUppercase,
            PasswordCheck::Lowercase => ErrorCode::PasswordLowercase,
            PasswordCheck::Digit => ErrorCode::PasswordDigit,
            PasswordCheck::Special => ErrorCode::PasswordSpecial,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            PasswordCheck::Length => "Password must be at least 8 characters long",
            PasswordCheck::Uppercase => "Password must contain at least one uppercase letter",
            PasswordCheck::Lowercase => "Password must contain at least one lowercase letter",
            PasswordCheck::Digit => "Password must contain at least one number",
            PasswordCheck::Special => {
                "Password must contain at least one special character (!@#$%^&*(),.?\":{}|<>)"
            }
        }
    }
}

/// All five password requirements evaluated at once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordStrength {
    pub fn is_satisfied(&self, check: PasswordCheck) -> bool {
        match check {
            PasswordCheck::Length => self.length,
            PasswordCheck::Uppercase => self.uppercase,
            PasswordCheck::Lowercase => self.lowercase,
            PasswordCheck::Digit => self.digit,
            PasswordCheck::Special => self.special,
        }
    }

    pub fn as_array(&self) -> [bool; 5] {
        [
            self.length,
            self.uppercase,
            self.lowercase,
            self.digit,
            self.special,
        ]
    }

    pub fn satisfied_count(&self) -> usize {
        self.as_array().iter().filter(|ok| **ok).count()
    }

    pub fn is_strong(&self) -> bool {
        self.satisfied_count() == 5
    }

    /// Checklist rows in display order.
    pub fn checklist(&self) -> Vec<(PasswordCheck, bool)> {
        PasswordCheck::iter()
            .map(|check| (check, self.is_satisfied(check)))
            .collect()
    }
}

pub fn password_strength(password: &str) -> PasswordStrength {
    PasswordStrength {
        length: PasswordCheck::Length.holds(password),
        uppercase: PasswordCheck::Uppercase.holds(password),
        lowercase: PasswordCheck::Lowercase.holds(password),
        digit: PasswordCheck::Digit.holds(password),
        special: PasswordCheck::Special.holds(password),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn code(rule: FieldRule, value: &str, peer: Option<&str>) -> Option<ErrorCode> {
        validate(rule, value, peer).map(|e| e.code)
    }

    #[test]
    fn empty_values_are_required() {
        for rule in [FieldRule::Email, FieldRule::Password, FieldRule::Name] {
            assert_eq!(code(rule, "", None), Some(ErrorCode::Required), "{rule:?}");
        }
        assert_eq!(
            code(FieldRule::ConfirmPassword, "", Some("Abcdef1!")),
            Some(ErrorCode::Required)
        );
    }

    #[test]
    fn email_format() {
        assert_eq!(code(FieldRule::Email, "a@b.com", None), None);
        assert_eq!(
            code(FieldRule::Email, "a@b", None),
            Some(ErrorCode::InvalidFormat)
        );
        assert_eq!(
            code(FieldRule::Email, "a b@c.com", None),
            Some(ErrorCode::InvalidFormat)
        );
    }

    #[test]
    fn email_and_name_are_checked_as_typed() {
        assert_eq!(
            code(FieldRule::Email, " a@b.com ", None),
            Some(ErrorCode::InvalidFormat)
        );
        assert_eq!(code(FieldRule::Email, "   ", None), Some(ErrorCode::InvalidFormat));
        assert_eq!(code(FieldRule::Name, " a ", None), None);
        assert_eq!(code(FieldRule::Name, " ", None), Some(ErrorCode::TooShort));
    }

    #[test]
    fn name_allows_plain_spaces_only() {
        assert_eq!(code(FieldRule::Name, "Ada Lovelace", None), None);
        assert_eq!(
            code(FieldRule::Name, "Ada\tLovelace", None),
            Some(ErrorCode::InvalidChars)
        );
        assert_eq!(
            code(FieldRule::Name, "Ada\nLovelace", None),
            Some(ErrorCode::InvalidChars)
        );
    }

    #[test]
    fn password_reports_first_failure_only() {
        assert_eq!(code(FieldRule::Password, "Abcdef1!", None), None);
        assert_eq!(
            code(FieldRule::Password, "abcdef1!", None),
            Some(ErrorCode::PasswordUppercase)
        );
        // short and missing everything else: length wins
        assert_eq!(
            code(FieldRule::Password, "abc", None),
            Some(ErrorCode::PasswordLength)
        );
        assert_eq!(
            code(FieldRule::Password, "ABCDEF1!", None),
            Some(ErrorCode::PasswordLowercase)
        );
        assert_eq!(
            code(FieldRule::Password, "Abcdefg!", None),
            Some(ErrorCode::PasswordDigit)
        );
        assert_eq!(
            code(FieldRule::Password, "Abcdefg1", None),
            Some(ErrorCode::PasswordSpecial)
        );
    }

    #[test]
    fn every_short_password_fails_on_length() {
        for pw in ["A", "Ab1!", "Abcde1!", "!!!!!!!"] {
            assert_eq!(
                code(FieldRule::Password, pw, None),
                Some(ErrorCode::PasswordLength),
                "{pw}"
            );
        }
    }

    #[test]
    fn strength_reports_all_checks() {
        assert_eq!(
            password_strength("abc"),
            PasswordStrength {
                length: false,
                uppercase: false,
                lowercase: true,
                digit: false,
                special: false,
            }
        );
        let strong = password_strength("Abcdef1!");
        assert!(strong.is_strong());
        assert_eq!(strong.as_array(), [true; 5]);
        assert_eq!(password_strength("").satisfied_count(), 0);
        assert_eq!(password_strength("abcdef1!").checklist()[1], (PasswordCheck::Uppercase, false));
    }

    #[test]
    fn name_rules() {
        assert_eq!(code(FieldRule::Name, "Jo", None), None);
        assert_eq!(code(FieldRule::Name, "Mary-Jane O'Neil", None), None);
        assert_eq!(code(FieldRule::Name, "J", None), Some(ErrorCode::TooShort));
        assert_eq!(
            code(FieldRule::Name, "R2D2", None),
            Some(ErrorCode::InvalidChars)
        );
    }

    #[test]
    fn confirm_password_compares_with_peer() {
        assert_eq!(
            code(FieldRule::ConfirmPassword, "x", Some("y")),
            Some(ErrorCode::Mismatch)
        );
        assert_eq!(code(FieldRule::ConfirmPassword, "x", Some("x")), None);
        assert_eq!(
            code(FieldRule::ConfirmPassword, "x", None),
            Some(ErrorCode::Mismatch)
        );
    }

    #[test]
    fn amounts_dates_and_codes() {
        assert_eq!(code(FieldRule::Amount, "150.50", None), None);
        assert_eq!(code(FieldRule::Amount, "0", None), Some(ErrorCode::NotPositive));
        assert_eq!(
            code(FieldRule::Amount, "12.345", None),
            Some(ErrorCode::InvalidNumber)
        );
        assert_eq!(code(FieldRule::Amount, "-3", None), Some(ErrorCode::InvalidNumber));
        assert_eq!(code(FieldRule::Date, "2024-02-29", None), None);
        assert_eq!(code(FieldRule::Date, "2023-02-29", None), Some(ErrorCode::InvalidDate));
        assert_eq!(code(FieldRule::GroupCode, "THS2024", None), None);
        assert_eq!(
            code(FieldRule::GroupCode, "ab", None),
            Some(ErrorCode::InvalidFormat)
        );
    }

    #[test]
    fn errors_carry_the_requested_field_key() {
        let err = validate_field("new_password", FieldRule::Password, "", None).unwrap();
        assert_eq!(err.field, "new_password");
        assert_eq!(err.code.as_str(), "required");
        assert_eq!(err.to_string(), "Password is required");
    }
}
