use integra_types::AuthErrorKind;
use thiserror::Error;

use crate::identity::ProviderError;

/// Failure of a login or session check, as reported to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("Malformed identity provider response: {0}")]
    MalformedResponse(String),
    #[error("Login was superseded by a later sign-out or login")]
    Superseded,
}

impl AuthError {
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::InvalidCredentials => AuthErrorKind::InvalidCredentials,
            AuthError::ProviderUnavailable(_) => AuthErrorKind::ProviderUnavailable,
            AuthError::MalformedResponse(_) => AuthErrorKind::MalformedResponse,
            AuthError::Superseded => AuthErrorKind::Superseded,
        }
    }

    /// Message suitable for a login form.
    ///
    /// Provider internals stay in the logs, a malformed response reads like
    /// an outage to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "Invalid email or password.",
            AuthError::ProviderUnavailable(_) | AuthError::MalformedResponse(_) => {
                "Sign-in is temporarily unavailable. Please try again later."
            }
            AuthError::Superseded => "Sign-in was cancelled.",
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::InvalidCredentials => AuthError::InvalidCredentials,
            ProviderError::Unavailable(message) => AuthError::ProviderUnavailable(message),
            ProviderError::Malformed(message) => AuthError::MalformedResponse(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_map_to_auth_errors() {
        assert_eq!(
            AuthError::from(ProviderError::InvalidCredentials),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from(ProviderError::Unavailable("down".into())).kind(),
            AuthErrorKind::ProviderUnavailable
        );
        assert_eq!(
            AuthError::from(ProviderError::Malformed("role".into())).kind(),
            AuthErrorKind::MalformedResponse
        );
    }

    #[test]
    fn test_user_message_hides_provider_details() {
        let err = AuthError::MalformedResponse("unknown role 'root'".into());
        assert!(!err.user_message().contains("root"));
        assert_eq!(
            err.user_message(),
            AuthError::ProviderUnavailable("x".into()).user_message()
        );
    }
}
