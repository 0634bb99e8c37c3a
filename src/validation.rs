//! Pure form-field validation. No state, no side effects; the app's
//! `update()` is the only caller.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::{PASSWORD_MAX_CHARS, PASSWORD_MIN_CHARS};

/// Anchored, full-string email pattern. Matches one-or-more local-part
/// characters, an `@`, a domain, a dot and a 2+ letter TLD.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

pub const MSG_INVALID_EMAIL: &str = "Enter a valid email address.";
pub const MSG_EMAIL_TAKEN: &str =
    "This email account has been registered. Please use another.";
pub const MSG_INVALID_PASSWORD: &str =
    "Password has to be from 8 to 20 characters long.";
pub const MSG_PASSWORD_MISMATCH: &str = "This must match with your password above.";

/// Three-state verdict on a single form field's current text.
///
/// `Pending` means the field has not been evaluated yet (screen just
/// opened); it is never produced by the validators below, only held in the
/// model until the first change event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldValidity {
    #[default]
    Pending,
    Valid,
    Invalid,
}

impl FieldValidity {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    #[must_use]
    pub const fn is_invalid(self) -> bool {
        matches!(self, Self::Invalid)
    }

    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// `Valid` iff the whole string matches [`EMAIL_PATTERN`]. The empty
/// string is `Invalid`.
#[must_use]
pub fn validate_email_format(text: &str) -> FieldValidity {
    if EMAIL_PATTERN.is_match(text) {
        FieldValidity::Valid
    } else {
        FieldValidity::Invalid
    }
}

/// `Valid` iff the character count (not byte count) is within
/// `PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS`. Both bounds are inclusive.
#[must_use]
pub fn validate_password_strength(text: &str) -> FieldValidity {
    let count = text.chars().count();
    if (PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&count) {
        FieldValidity::Valid
    } else {
        FieldValidity::Invalid
    }
}

/// `None` while the primary password field is empty, otherwise whether the
/// confirmation equals it.
///
/// The emptiness check is against the primary field, not the confirmation:
/// clearing the password while a confirmation value is still present
/// suppresses the mismatch verdict entirely.
#[must_use]
pub fn passwords_match(password: &str, confirmation: &str) -> Option<bool> {
    if password.is_empty() {
        None
    } else {
        Some(password == confirmation)
    }
}

/// Message shown under the email field for a given validity/availability
/// pair. Availability only applies once the format is valid; an invalid
/// format never triggers an availability check, so the format error wins.
#[must_use]
pub fn email_message(validity: FieldValidity, available: Option<bool>) -> &'static str {
    match (validity, available) {
        (FieldValidity::Invalid, _) => MSG_INVALID_EMAIL,
        (FieldValidity::Valid, Some(false)) => MSG_EMAIL_TAKEN,
        _ => "",
    }
}

#[must_use]
pub fn password_message(validity: FieldValidity) -> &'static str {
    if validity.is_invalid() {
        MSG_INVALID_PASSWORD
    } else {
        ""
    }
}

#[must_use]
pub fn confirm_message(matched: Option<bool>) -> &'static str {
    match matched {
        Some(false) => MSG_PASSWORD_MISMATCH,
        _ => "",
    }
}
