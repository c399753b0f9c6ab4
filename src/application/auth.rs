// src/application/auth.rs
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, instrument};

use crate::application::Backend;
use crate::constants::MIN_PASSWORD_LEN;
use crate::domain::{DomainError, Route, User, ValidationErrors};
use crate::ports::Notifier;

/// What is known about the current session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// The session check has not resolved yet.
    Unknown,
    Anonymous,
    Authenticated(User),
}

/// Outcome of asking the gate for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Nothing but a loading placeholder may be shown.
    Placeholder,
    Render(Route),
    Redirect(Route),
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^\S+@\S+$").expect("email pattern is valid"))
}

fn validate_credentials(errors: &mut ValidationErrors, email: &str, password: &str) {
    if email.is_empty() {
        errors.add("email", "Email is required");
    } else if !email_pattern().is_match(email) {
        errors.add("email", "Invalid email address");
    }

    if password.is_empty() {
        errors.add("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.add("password", "Password must be at least 8 characters");
    }
}

/// Session provider and route guard.
pub struct AuthGate<B: Backend> {
    backend: B,
    state: SessionState,
    notifier: Notifier,
}

impl<B: Backend> AuthGate<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SessionState::Unknown,
            notifier: Notifier::new(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        match &self.state {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    /// The signed-in user, or `NotAuthenticated`.
    pub fn require_user(&self) -> Result<&User, DomainError> {
        self.user().ok_or(DomainError::NotAuthenticated)
    }

    pub fn is_loading(&self) -> bool {
        self.state == SessionState::Unknown
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Resolves the initial session check. A failure means "signed out", not an error.
    #[instrument(level = "debug", skip(self))]
    pub fn check_session(&mut self) -> &SessionState {
        self.state = match self.backend.current_user() {
            Ok(user) => {
                debug!(user_id = %user.id, "Session restored");
                SessionState::Authenticated(user)
            }
            Err(e) => {
                debug!(error = %e, "No active session");
                SessionState::Anonymous
            }
        };
        &self.state
    }

    #[instrument(level = "debug", skip(self, password))]
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<&User, DomainError> {
        let mut errors = ValidationErrors::new();
        validate_credentials(&mut errors, email, password);
        errors.into_result()?;

        let result = self
            .backend
            .create_email_session(email, password)
            .and_then(|_| self.backend.current_user());

        self.finish_authentication(result, "Welcome back!")
    }

    #[instrument(level = "debug", skip(self, password))]
    pub fn sign_up(&mut self, name: &str, email: &str, password: &str) -> Result<&User, DomainError> {
        let mut errors = ValidationErrors::new();
        errors.require("name", name, "Name is required");
        validate_credentials(&mut errors, email, password);
        errors.into_result()?;

        let result = self
            .backend
            .create_account(email, password, name)
            .and_then(|_| self.backend.create_email_session(email, password))
            .and_then(|_| self.backend.current_user());

        self.finish_authentication(result, "Account created successfully!")
    }

    fn finish_authentication(
        &mut self,
        result: Result<User, crate::domain::BackendError>,
        greeting: &str,
    ) -> Result<&User, DomainError> {
        match result {
            Ok(user) => {
                info!(user_id = %user.id, "Signed in");
                self.notifier.success(greeting);
                self.state = SessionState::Authenticated(user);
                self.require_user()
            }
            Err(e) => {
                self.notifier.error(e.to_string());
                if self.state == SessionState::Unknown {
                    self.state = SessionState::Anonymous;
                }
                Err(e.into())
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn sign_out(&mut self) -> Result<(), DomainError> {
        match self.backend.delete_current_session() {
            Ok(()) => {
                self.state = SessionState::Anonymous;
                self.notifier.success("Logged out successfully");
                Ok(())
            }
            Err(e) => {
                self.notifier.error("Error logging out");
                Err(e.into())
            }
        }
    }

    /// Decides what may be shown for a route in the current session state.
    pub fn resolve(&self, route: Route) -> GateDecision {
        match (&self.state, route) {
            (SessionState::Unknown, _) => GateDecision::Placeholder,
            (SessionState::Anonymous, route) if route.is_protected() => {
                GateDecision::Redirect(Route::SignIn)
            }
            (SessionState::Authenticated(_), route) if route.is_auth_page() => {
                GateDecision::Redirect(Route::Home)
            }
            (_, route) => GateDecision::Render(route),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_valid_credentials_when_validating_then_no_errors() {
        let mut errors = ValidationErrors::new();
        validate_credentials(&mut errors, "ada@example.com", "correct horse");
        assert!(errors.is_empty());
    }

    #[test]
    fn given_bad_email_and_short_password_when_validating_then_reports_both() {
        let mut errors = ValidationErrors::new();
        validate_credentials(&mut errors, "not an email", "short");

        assert_eq!(errors.get("email"), Some("Invalid email address"));
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn given_empty_fields_when_validating_then_required_messages() {
        let mut errors = ValidationErrors::new();
        validate_credentials(&mut errors, "", "");

        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("password"), Some("Password is required"));
    }
}
