//! Identity provider abstraction
//!
//! The session store only talks to an [`IdentityProvider`]. Two adapters
//! exist: an HTTP client for the registry's auth API and a seeded in-memory
//! directory used for local development and tests.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use integra_core::utils::secret::MaskedSecret;
use integra_types::User;

pub use http::HttpIdentityProvider;
pub use memory::InMemoryIdentityProvider;

/// Successful password login.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: User,
    pub token: MaskedSecret,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("credentials rejected")]
    InvalidCredentials,
    #[error("{0}")]
    Unavailable(String),
    #[error("{0}")]
    Malformed(String),
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short name used in logs and as key for stored credentials
    fn name(&self) -> &str;

    /// Resolve a stored credential to a user.
    ///
    /// `Ok(None)` means the provider answered and the credential is no
    /// longer valid.
    async fn verify(&self, token: &MaskedSecret) -> Result<Option<User>, ProviderError>;

    async fn authenticate(
        &self,
        email: &str,
        password: &MaskedSecret,
    ) -> Result<Authenticated, ProviderError>;

    /// Invalidate a credential on the provider side. Best effort.
    async fn revoke(&self, _token: &MaskedSecret) -> Result<(), ProviderError> {
        Ok(())
    }
}
