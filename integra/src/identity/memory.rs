use async_trait::async_trait;
use integra_core::utils::secret::MaskedSecret;
use integra_types::{Role, User};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use subtle::ConstantTimeEq;
use tracing::{debug, info};
use uuid::Uuid;

use super::{Authenticated, IdentityProvider, ProviderError};

struct Account {
    user: User,
    password: MaskedSecret,
}

/// Seeded user directory living in process memory.
///
/// Tokens are random UUIDs and only valid for the lifetime of the provider.
pub struct InMemoryIdentityProvider {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, String>>,
    available: AtomicBool,
    latency: Option<Duration>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            tokens: Mutex::new(HashMap::new()),
            available: AtomicBool::new(true),
            latency: None,
        }
    }

    /// One demo account per role, password `<role>-demo`.
    pub fn seeded() -> Self {
        let provider = Self::new();
        provider.add_user(
            User {
                id: "1".to_string(),
                display_name: "Ada Admin".to_string(),
                email: "admin@cbank.example".to_string(),
                role: Role::Administrator,
            },
            "admin-demo",
        );
        provider.add_user(
            User {
                id: "2".to_string(),
                display_name: "Otto Operator".to_string(),
                email: "operator@cbank.example".to_string(),
                role: Role::Operator,
            },
            "operator-demo",
        );
        provider.add_user(
            User {
                id: "3".to_string(),
                display_name: "Vera Viewer".to_string(),
                email: "viewer@cbank.example".to_string(),
                role: Role::Viewer,
            },
            "viewer-demo",
        );
        provider
    }

    /// Delay every call, to exercise in-flight races.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn add_user(&self, user: User, password: &str) {
        let key = user.email.to_lowercase();
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.insert(
                key,
                Account {
                    user,
                    password: MaskedSecret::from(password),
                },
            );
        }
    }

    /// Change the role of an existing account, effective on the next verify.
    pub fn set_role(&self, email: &str, role: Role) -> bool {
        let Ok(mut accounts) = self.accounts.lock() else {
            return false;
        };
        match accounts.get_mut(&email.to_lowercase()) {
            Some(account) => {
                account.user.role = role;
                true
            }
            None => false,
        }
    }

    /// Drop every token issued to `email`.
    pub fn revoke_user(&self, email: &str) -> usize {
        let key = email.to_lowercase();
        let Ok(mut tokens) = self.tokens.lock() else {
            return 0;
        };
        let before = tokens.len();
        tokens.retain(|_, owner| *owner != key);
        let removed = before - tokens.len();
        info!("Revoked {} credential(s) of {}", removed, email);
        removed
    }

    /// Simulate an outage: every call fails with `Unavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn active_tokens(&self) -> usize {
        self.tokens.lock().map(|tokens| tokens.len()).unwrap_or(0)
    }

    async fn simulate_call(&self) -> Result<(), ProviderError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ProviderError::Unavailable(
                "in-memory identity provider is offline".to_string(),
            ))
        }
    }

    fn poisoned() -> ProviderError {
        ProviderError::Unavailable("in-memory directory lock poisoned".to_string())
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn verify(&self, token: &MaskedSecret) -> Result<Option<User>, ProviderError> {
        self.simulate_call().await?;

        let owner = {
            let tokens = self.tokens.lock().map_err(|_| Self::poisoned())?;
            tokens.get(token.expose_secret()).cloned()
        };
        let Some(owner) = owner else {
            debug!("Unknown credential {}", token);
            return Ok(None);
        };

        let accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
        Ok(accounts.get(&owner).map(|account| account.user.clone()))
    }

    async fn authenticate(
        &self,
        email: &str,
        password: &MaskedSecret,
    ) -> Result<Authenticated, ProviderError> {
        self.simulate_call().await?;

        let key = email.trim().to_lowercase();
        let user = {
            let accounts = self.accounts.lock().map_err(|_| Self::poisoned())?;
            let account = accounts
                .get(&key)
                .ok_or(ProviderError::InvalidCredentials)?;
            let matches: bool = account
                .password
                .expose_secret()
                .as_bytes()
                .ct_eq(password.expose_secret().as_bytes())
                .into();
            if !matches {
                return Err(ProviderError::InvalidCredentials);
            }
            account.user.clone()
        };

        let token = Uuid::new_v4().to_string();
        self.tokens
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(token.clone(), key);

        Ok(Authenticated {
            user,
            token: MaskedSecret::new(token),
        })
    }

    async fn revoke(&self, token: &MaskedSecret) -> Result<(), ProviderError> {
        self.tokens
            .lock()
            .map_err(|_| Self::poisoned())?
            .remove(token.expose_secret());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_login_and_verify_round() {
        let provider = InMemoryIdentityProvider::seeded();
        let auth = provider
            .authenticate("Viewer@CBank.example", &MaskedSecret::from("viewer-demo"))
            .await
            .unwrap();
        assert_eq!(auth.user.role, Role::Viewer);

        let user = provider.verify(&auth.token).await.unwrap();
        assert_eq!(user.map(|u| u.email), Some("viewer@cbank.example".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let provider = InMemoryIdentityProvider::seeded();
        let wrong_password = provider
            .authenticate("admin@cbank.example", &MaskedSecret::from("nope"))
            .await
            .unwrap_err();
        let unknown = provider
            .authenticate("ghost@cbank.example", &MaskedSecret::from("admin-demo"))
            .await
            .unwrap_err();
        assert_eq!(wrong_password, ProviderError::InvalidCredentials);
        assert_eq!(unknown, wrong_password);
    }

    #[tokio::test]
    async fn test_revoked_user_no_longer_verifies() {
        let provider = InMemoryIdentityProvider::seeded();
        let auth = provider
            .authenticate("operator@cbank.example", &MaskedSecret::from("operator-demo"))
            .await
            .unwrap();

        assert_eq!(provider.revoke_user("operator@cbank.example"), 1);
        assert_eq!(provider.verify(&auth.token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_role_change_is_visible_on_verify() {
        let provider = InMemoryIdentityProvider::seeded();
        let auth = provider
            .authenticate("operator@cbank.example", &MaskedSecret::from("operator-demo"))
            .await
            .unwrap();
        assert!(provider.set_role("operator@cbank.example", Role::Viewer));

        let user = provider.verify(&auth.token).await.unwrap().unwrap();
        assert_eq!(user.role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_offline_provider_is_unavailable() {
        let provider = InMemoryIdentityProvider::seeded();
        provider.set_available(false);
        let err = provider
            .verify(&MaskedSecret::from("anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
