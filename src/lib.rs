//! Shared core for the Calendr signup screen.
//!
//! Headless Crux app: the shell (iOS/Android/Web) feeds raw text-change
//! and tap events in, renders the [`ViewModel`] out, and executes the
//! HTTP and navigation effects the core requests. All validation and
//! submission sequencing lives here; the shell stays a dumb terminal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

pub use app::App;
pub use capabilities::{Capabilities, Effect, Navigate, NavigateOperation};
pub use validation::{
    FieldValidity, MSG_EMAIL_TAKEN, MSG_INVALID_EMAIL, MSG_INVALID_PASSWORD,
    MSG_PASSWORD_MISMATCH,
};

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 20;

// crux_http requires absolute URLs; a relative path has no base to
// resolve against and fails inside the capability.
pub const API_BASE_URL: &str = "https://api.example.com";
pub const AVAILABILITY_PATH: &str = "/api/v1/accounts/availability";
pub const REGISTER_PATH: &str = "/api/v1/accounts";

pub type HttpResult<T> = crux_http::Result<crux_http::Response<T>>;

// --- Secret wrapper: redacts Debug, zeroizes on Drop ---

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

// --- Errors ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    Validation,
    Conflict,
    RateLimited,
    Serialization,
    Internal,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Validation => "VALIDATION_ERROR",
            Self::Conflict => "CONFLICT",
            Self::RateLimited => "RATE_LIMITED",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::Internal => "INTERNAL_ERROR",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::RateLimited => ErrorSeverity::Transient,
            Self::Serialization => ErrorSeverity::Fatal,
            Self::Validation | Self::Conflict | Self::Internal | Self::Unknown => {
                ErrorSeverity::Permanent
            }
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimited | Self::Internal | Self::Unknown
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to connect. Please check your internet connection and try again.".into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::Conflict => MSG_EMAIL_TAKEN.into(),
            ErrorKind::RateLimited => {
                "Too many requests. Please wait a moment and try again.".into()
            }
            ErrorKind::Serialization => {
                "A data error occurred. Please contact support if this persists.".into()
            }
            ErrorKind::Internal | ErrorKind::Unknown => {
                "We couldn't create your account. Please try again.".into()
            }
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        let kind = match status {
            400 => ErrorKind::Validation,
            408 => ErrorKind::Timeout,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            500..=599 => ErrorKind::Internal,
            _ => ErrorKind::Unknown,
        };
        Self::new(kind, format!("HTTP error: {status}"))
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

// --- Account API wire types ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityBody {
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationBody {
    #[serde(default)]
    pub success: bool,
}

#[derive(Serialize)]
struct RegistrationRequest {
    email: String,
    // Base64 of the raw password. Reversible obfuscation for wire parity
    // with the existing backend, not a security control; confidentiality
    // comes from TLS on the shell's HTTP stack.
    password: String,
}

// --- Model ---

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub email: String,
    pub email_validity: FieldValidity,
    pub email_available: Option<bool>,
    pub password: Secret,
    pub password_validity: FieldValidity,
    pub confirm_password: Secret,
    pub passwords_match: Option<bool>,
    pub is_submitting: bool,
    pub active_error: Option<AppError>,
}

impl Model {
    /// The submit control is enabled only when every check has landed on
    /// the happy side: format, strength, match, and availability.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.email_validity.is_valid()
            && self.password_validity.is_valid()
            && self.passwords_match == Some(true)
            && self.email_available == Some(true)
    }

    /// The match flag depends on both password fields, so both change
    /// handlers funnel through here. An empty confirmation field leaves
    /// the flag unset; no mismatch is shown before the user has typed one.
    pub fn recompute_passwords_match(&mut self) {
        self.passwords_match = if self.confirm_password.is_empty() {
            None
        } else {
            validation::passwords_match(self.password.expose(), self.confirm_password.expose())
        };
    }

    pub fn set_error(&mut self, error: AppError) {
        self.active_error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.active_error = None;
    }
}

// --- Events ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    EmailChanged {
        text: String,
    },
    PasswordChanged {
        text: Secret,
    },
    ConfirmPasswordChanged {
        text: Secret,
    },
    SubmitTapped,
    SigninTapped,
    ErrorDismissed,

    /// Result of the availability check, tagged with the email it was
    /// issued for so superseded responses can be rejected on arrival.
    /// Response variants originate inside the core, never from the shell,
    /// so they stay off the FFI event surface.
    #[serde(skip)]
    AvailabilityResponse {
        email: String,
        result: Box<HttpResult<AvailabilityBody>>,
    },
    #[serde(skip)]
    RegistrationResponse {
        result: Box<HttpResult<RegistrationBody>>,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EmailChanged { .. } => "email_changed",
            Self::PasswordChanged { .. } => "password_changed",
            Self::ConfirmPasswordChanged { .. } => "confirm_password_changed",
            Self::SubmitTapped => "submit_tapped",
            Self::SigninTapped => "signin_tapped",
            Self::ErrorDismissed => "error_dismissed",
            Self::AvailabilityResponse { .. } => "availability_response",
            Self::RegistrationResponse { .. } => "registration_response",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        !matches!(
            self,
            Self::AvailabilityResponse { .. } | Self::RegistrationResponse { .. }
        )
    }
}

// --- View model ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFacingError {
    pub message: String,
    pub is_retryable: bool,
}

impl From<&AppError> for UserFacingError {
    fn from(error: &AppError) -> Self {
        Self {
            message: error.user_facing_message(),
            is_retryable: error.is_retryable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub email_validity: FieldValidity,
    pub email_available: Option<bool>,
    pub email_message: String,
    pub password_validity: FieldValidity,
    pub password_message: String,
    pub passwords_match: Option<bool>,
    pub confirm_message: String,
    pub can_submit: bool,
    pub is_submitting: bool,
    pub error: Option<UserFacingError>,
}

pub mod app {
    use super::*;
    use crate::capabilities::Capabilities;
    use base64::engine::general_purpose::STANDARD as base64_engine;
    use base64::Engine;
    use tracing::{debug, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn availability_url(email: &str) -> String {
            let query: String = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("email", email)
                .finish();
            format!("{API_BASE_URL}{AVAILABILITY_PATH}?{query}")
        }

        fn send_availability_check(email: &str, caps: &Capabilities) {
            let url = Self::availability_url(email);
            let email = email.to_owned();
            caps.http
                .get(&url)
                .expect_json::<AvailabilityBody>()
                .send(move |result| Event::AvailabilityResponse {
                    email: email.clone(),
                    result: Box::new(result),
                });
        }

        fn send_registration(model: &Model, caps: &Capabilities) -> Result<(), AppError> {
            let body = RegistrationRequest {
                email: model.email.clone(),
                password: base64_engine.encode(model.password.expose()),
            };

            let url = format!("{API_BASE_URL}{REGISTER_PATH}");
            let builder = caps.http.post(&url).body_json(&body).map_err(|e| {
                AppError::new(ErrorKind::Serialization, "Could not encode registration")
                    .with_internal(e.to_string())
            })?;

            builder
                .expect_json::<RegistrationBody>()
                .send(|result| Event::RegistrationResponse {
                    result: Box::new(result),
                });

            Ok(())
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            debug!(event = event.name(), user = event.is_user_initiated(), "handling event");

            match event {
                Event::EmailChanged { text } => {
                    model.email = text;
                    model.email_validity = validation::validate_email_format(&model.email);
                    // Any edit invalidates whatever the service said about
                    // the previous value.
                    model.email_available = None;

                    if model.email_validity.is_valid() {
                        Self::send_availability_check(&model.email, caps);
                    }

                    caps.render.render();
                }

                Event::PasswordChanged { text } => {
                    model.password = text;
                    model.password_validity =
                        validation::validate_password_strength(model.password.expose());
                    model.recompute_passwords_match();
                    caps.render.render();
                }

                Event::ConfirmPasswordChanged { text } => {
                    model.confirm_password = text;
                    model.recompute_passwords_match();
                    caps.render.render();
                }

                Event::AvailabilityResponse { email, result } => {
                    if email != model.email {
                        debug!("discarding availability result for superseded email");
                        return;
                    }

                    match *result {
                        Ok(mut response) if response.status().is_success() => {
                            if let Some(body) = response.take_body() {
                                model.email_available = Some(body.available);
                            } else {
                                warn!("availability response had no body");
                            }
                        }
                        Ok(response) => {
                            warn!(
                                status = u16::from(response.status()),
                                "availability check failed"
                            );
                        }
                        Err(e) => {
                            warn!(error = %e, "availability check failed");
                        }
                    }

                    caps.render.render();
                }

                Event::SubmitTapped => {
                    if model.is_submitting || !model.can_submit() {
                        return;
                    }

                    model.clear_error();
                    model.is_submitting = true;

                    if let Err(e) = Self::send_registration(model, caps) {
                        model.is_submitting = false;
                        model.set_error(e);
                    }

                    caps.render.render();
                }

                Event::RegistrationResponse { result } => {
                    model.is_submitting = false;

                    match *result {
                        Ok(mut response) if response.status().is_success() => {
                            let succeeded =
                                response.take_body().map(|b| b.success).unwrap_or(false);

                            if succeeded {
                                debug!("registration complete");
                                caps.navigate.to_signin();
                            } else {
                                model.set_error(AppError::new(
                                    ErrorKind::Unknown,
                                    "Registration rejected",
                                ));
                            }
                        }
                        Ok(response) => {
                            let status = u16::from(response.status());
                            warn!(status, "registration failed");
                            model.set_error(AppError::from_http_status(status));
                        }
                        Err(e) => {
                            warn!(error = %e, "registration failed");
                            model.set_error(
                                AppError::new(ErrorKind::Network, "Network error")
                                    .with_internal(e.to_string()),
                            );
                        }
                    }

                    caps.render.render();
                }

                Event::SigninTapped => {
                    caps.navigate.to_signin();
                }

                Event::ErrorDismissed => {
                    model.clear_error();
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel {
                email_validity: model.email_validity,
                email_available: model.email_available,
                email_message: validation::email_message(
                    model.email_validity,
                    model.email_available,
                )
                .to_string(),
                password_validity: model.password_validity,
                password_message: validation::password_message(model.password_validity)
                    .to_string(),
                passwords_match: model.passwords_match,
                confirm_message: validation::confirm_message(model.passwords_match).to_string(),
                can_submit: model.can_submit(),
                is_submitting: model.is_submitting,
                error: model.active_error.as_ref().map(UserFacingError::from),
            }
        }
    }
}
