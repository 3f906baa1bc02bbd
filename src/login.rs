//! Email sign-in flow shown in the panel's login popover

use std::rc::Rc;

use crate::credentials::{CredentialError, KeyringCredentialStore, Session};

/// Outcome of a sign-in attempt
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("Enter a valid email address")]
    InvalidEmail,
    #[error("Enter your password")]
    MissingPassword,
    #[error("Could not save credentials: {0}")]
    Storage(#[from] CredentialError),
}

/// Something that can turn an email/password into a session
pub trait LoginFlow {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, LoginError>;
}

/// `local@domain` with both parts present
pub fn is_valid_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn validate(email: &str, password: &str) -> Result<(), LoginError> {
    if !is_valid_email(email) {
        return Err(LoginError::InvalidEmail);
    }
    if password.is_empty() {
        return Err(LoginError::MissingPassword);
    }
    Ok(())
}

/// Stores the credentials in the keyring; the tunnel service authenticates with them
pub struct KeyringLogin {
    store: Rc<KeyringCredentialStore>,
}

impl KeyringLogin {
    pub fn new(store: Rc<KeyringCredentialStore>) -> Self {
        Self { store }
    }
}

impl LoginFlow for KeyringLogin {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, LoginError> {
        validate(email, password)?;
        let session = self.store.save_credentials(email, password)?;
        tracing::info!("Signed in");
        Ok(session)
    }
}

/// Form state for the login popover
#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub error: Option<String>,
}

impl LoginForm {
    pub fn can_submit(&self) -> bool {
        validate(&self.email, &self.password).is_ok()
    }

    /// Run the flow. On success the form is cleared and the session returned.
    pub fn submit(&mut self, flow: &dyn LoginFlow) -> Option<Session> {
        match flow.sign_in(&self.email, &self.password) {
            Ok(session) => {
                *self = Self::default();
                Some(session)
            }
            Err(e) => {
                tracing::info!("Sign in failed: {}", e);
                self.error = Some(e.to_string());
                None
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AcceptAll;

    impl LoginFlow for AcceptAll {
        fn sign_in(&self, email: &str, password: &str) -> Result<Session, LoginError> {
            validate(email, password)?;
            Ok(Session::new(email.trim()))
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("  user@example.com "));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("a@b@c"));
    }

    #[test]
    fn test_form_requires_password() {
        let mut form = LoginForm {
            email: "user@example.com".to_string(),
            ..LoginForm::default()
        };
        assert!(!form.can_submit());

        form.password = "secret".to_string();
        assert!(form.can_submit());
    }

    #[test]
    fn test_submit_success_clears_form() {
        let mut form = LoginForm {
            email: "user@example.com".to_string(),
            password: "secret".to_string(),
            error: Some("old".to_string()),
        };

        let session = form.submit(&AcceptAll).unwrap();
        assert_eq!(session.email, "user@example.com");
        assert!(form.email.is_empty());
        assert!(form.error.is_none());
    }

    #[test]
    fn test_submit_failure_keeps_input_and_sets_error() {
        let mut form = LoginForm {
            email: "nope".to_string(),
            password: "secret".to_string(),
            error: None,
        };

        assert!(form.submit(&AcceptAll).is_none());
        assert_eq!(form.email, "nope");
        assert_eq!(form.error.as_deref(), Some("Enter a valid email address"));
    }

    #[test]
    fn test_keyring_login_saves_session() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let store = Rc::new(KeyringCredentialStore::new().unwrap());
        let login = KeyringLogin::new(Rc::clone(&store));

        assert!(matches!(login.sign_in("user@example.com", ""), Err(LoginError::MissingPassword)));

        let session = login.sign_in("user@example.com", "secret").unwrap();
        assert_eq!(session.email, "user@example.com");

        use crate::credentials::CredentialStore;
        assert_eq!(store.current_session(), Some(session));
    }
}
