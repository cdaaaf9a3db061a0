//! Sign-in / sign-up form state. The identity provider does the real work;
//! this only tracks the mode and checks that required fields are present.

use crate::error::{McError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIGNED_IN_MESSAGE: &str = "Signed in successfully!";
pub const SIGN_UP_MESSAGE: &str = "Check your email for a magic link to sign in!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggle(self) -> AuthMode {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthMode::SignIn => "sign-in",
            AuthMode::SignUp => "sign-up",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In to Mission Control",
            AuthMode::SignUp => "Sign Up for Mission Control",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }

    /// Prompt and link label offering the other mode.
    pub fn switch_prompt(self) -> (&'static str, &'static str) {
        match self {
            AuthMode::SignIn => ("Don't have an account?", "Sign Up"),
            AuthMode::SignUp => ("Already have an account?", "Sign In"),
        }
    }

    /// Parse a query value; anything unrecognised falls back to sign-in.
    pub fn from_param(param: Option<&str>) -> AuthMode {
        match param {
            Some("sign-up") => AuthMode::SignUp,
            _ => AuthMode::SignIn,
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Email and password as submitted; both required.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Trimmed email with both fields present.
    pub fn validated(&self) -> Result<(&str, &str)> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(McError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(McError::MissingField("password"));
        }
        Ok((email, &self.password))
    }
}

/// What the user sees after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "message", rename_all = "snake_case")]
pub enum AuthOutcome {
    SignedIn,
    ConfirmationSent,
    /// Provider error message, shown verbatim.
    Rejected(String),
}

impl AuthOutcome {
    pub fn message(&self) -> &str {
        match self {
            AuthOutcome::SignedIn => SIGNED_IN_MESSAGE,
            AuthOutcome::ConfirmationSent => SIGN_UP_MESSAGE,
            AuthOutcome::Rejected(msg) => msg,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, AuthOutcome::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_toggles_between_two_states() {
        assert_eq!(AuthMode::default(), AuthMode::SignIn);
        assert_eq!(AuthMode::SignIn.toggle(), AuthMode::SignUp);
        assert_eq!(AuthMode::SignUp.toggle(), AuthMode::SignIn);
    }

    #[test]
    fn mode_copy() {
        assert_eq!(AuthMode::SignIn.title(), "Sign In to Mission Control");
        assert_eq!(AuthMode::SignUp.submit_label(), "Sign Up");
        assert_eq!(AuthMode::SignIn.switch_prompt().1, "Sign Up");
    }

    #[test]
    fn mode_from_param_defaults_to_sign_in() {
        assert_eq!(AuthMode::from_param(Some("sign-up")), AuthMode::SignUp);
        assert_eq!(AuthMode::from_param(Some("bogus")), AuthMode::SignIn);
        assert_eq!(AuthMode::from_param(None), AuthMode::SignIn);
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(matches!(
            Credentials::new("  ", "pw").validated(),
            Err(McError::MissingField("email"))
        ));
        assert!(matches!(
            Credentials::new("a@b.co", "").validated(),
            Err(McError::MissingField("password"))
        ));
        let creds = Credentials::new(" a@b.co ", "pw");
        assert_eq!(creds.validated().unwrap(), ("a@b.co", "pw"));
    }

    #[test]
    fn debug_redacts_password() {
        let dbg = format!("{:?}", Credentials::new("a@b.co", "hunter2"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn outcome_messages() {
        assert_eq!(AuthOutcome::SignedIn.message(), "Signed in successfully!");
        let rejected = AuthOutcome::Rejected("Invalid login credentials".into());
        assert_eq!(rejected.message(), "Invalid login credentials");
        assert!(!rejected.is_success());
        assert!(AuthOutcome::ConfirmationSent.is_success());
    }
}
