use async_trait::async_trait;
use integra_core::http::{HttpClient, HttpError, RetryError, RetryPolicy};
use integra_core::settings::identity_provider::IdentityProviderSettings;
use integra_core::utils::secret::MaskedSecret;
use integra_types::{Role, User};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::{Authenticated, IdentityProvider, ProviderError};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: WireUser,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    user: WireUser,
}

/// User as sent by the provider; the role is validated before it reaches
/// the session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
    #[serde(alias = "name")]
    display_name: String,
    email: String,
    role: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

impl TryFrom<WireUser> for User {
    type Error = ProviderError;

    fn try_from(wire: WireUser) -> Result<Self, Self::Error> {
        let role = Role::from_str(&wire.role).ok_or_else(|| {
            ProviderError::Malformed(format!("unknown role '{}' for {}", wire.role, wire.email))
        })?;
        Ok(User {
            id: wire.id,
            display_name: wire.display_name,
            email: wire.email,
            role,
        })
    }
}

fn provider_error(err: RetryError) -> ProviderError {
    match err.into_last_error() {
        HttpError::Decode(message) => ProviderError::Malformed(message),
        other => ProviderError::Unavailable(other.to_string()),
    }
}

/// Identity provider speaking the registry's `/api/auth` endpoints.
pub struct HttpIdentityProvider {
    base_url: String,
    client: HttpClient,
}

impl HttpIdentityProvider {
    pub fn new(base_url: &str, client: HttpClient) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn from_settings(settings: &IdentityProviderSettings) -> anyhow::Result<Self> {
        let base_url = settings
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("identity_provider.base_url is required in http mode"))?;
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .retry_policy(RetryPolicy::with_attempts(settings.max_attempts))
            .build()?;
        Ok(Self::new(base_url, client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn verify(&self, token: &MaskedSecret) -> Result<Option<User>, ProviderError> {
        debug!("Verifying credential {} against {}", token, self.base_url);
        match self
            .client
            .get_json_with_bearer::<SessionResponse>(
                &self.url("/api/auth/session"),
                token.expose_secret(),
            )
            .await
        {
            Ok(response) => User::try_from(response.user).map(Some),
            Err(err) if err.is_rejection() => {
                debug!("Credential rejected by identity provider: {}", err);
                Ok(None)
            }
            Err(err) => Err(provider_error(err)),
        }
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &MaskedSecret,
    ) -> Result<Authenticated, ProviderError> {
        let request = LoginRequest {
            email,
            password: password.expose_secret(),
        };
        match self
            .client
            .post_json::<_, LoginResponse>(&self.url("/api/auth/login"), &request)
            .await
        {
            Ok(response) => {
                if response.token.is_empty() {
                    return Err(ProviderError::Malformed(
                        "login response carries an empty token".to_string(),
                    ));
                }
                Ok(Authenticated {
                    user: User::try_from(response.user)?,
                    token: MaskedSecret::new(response.token),
                })
            }
            Err(err) if err.is_rejection() => Err(ProviderError::InvalidCredentials),
            Err(err) => Err(provider_error(err)),
        }
    }

    async fn revoke(&self, token: &MaskedSecret) -> Result<(), ProviderError> {
        self.client
            .post_with_bearer(&self.url("/api/auth/logout"), token.expose_secret())
            .await
            .or_else(|err| {
                if err.is_rejection() {
                    Ok(())
                } else {
                    warn!("Failed to revoke credential {}: {}", token, err);
                    Err(provider_error(err))
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> HttpIdentityProvider {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(2))
            .retry_policy(RetryPolicy {
                attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            })
            .build()
            .unwrap();
        HttpIdentityProvider::new(&server.uri(), client)
    }

    fn user_json(role: &str) -> serde_json::Value {
        json!({"id": 7, "displayName": "Olga Operator", "email": "olga@cbank.example", "role": role})
    }

    #[tokio::test]
    async fn test_login_parses_user_and_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "olga@cbank.example", "password": "pw"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"token": "tok-1", "user": user_json("operator")})),
            )
            .mount(&server)
            .await;

        let result = provider(&server)
            .authenticate("olga@cbank.example", &MaskedSecret::from("pw"))
            .await
            .unwrap();

        assert_eq!(result.user.id, "7");
        assert_eq!(result.user.role, Role::Operator);
        assert_eq!(result.token.expose_secret(), "tok-1");
    }

    #[tokio::test]
    async fn test_login_rejected_is_invalid_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server)
            .authenticate("olga@cbank.example", &MaskedSecret::from("bad"))
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_unknown_role_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/session"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": user_json("root")})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .verify(&MaskedSecret::from("tok-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(message) if message.contains("root")));
    }

    #[tokio::test]
    async fn test_verify_forbidden_means_no_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/session"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = provider(&server).verify(&MaskedSecret::from("tok-1")).await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/session"))
            .respond_with(ResponseTemplate::new(503))
            .expect(2)
            .mount(&server)
            .await;

        let err = provider(&server)
            .verify(&MaskedSecret::from("tok-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
