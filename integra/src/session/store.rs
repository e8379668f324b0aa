use integra_core::utils::secret::MaskedSecret;
use integra_types::{Session, User};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::credentials::{CredentialStore, StoredCredential};
use crate::error::AuthError;
use crate::identity::IdentityProvider;

/// Owns the current [`Session`] and publishes every change.
///
/// Logins and logouts bump a generation counter. An operation only applies
/// its result when the counter still has the value it observed, so a check
/// or login that resolves after a later logout cannot resurrect the
/// identity. All state and credential mutations happen while holding the
/// watch channel's lock.
pub struct SessionStore {
    state: watch::Sender<Session>,
    provider: Arc<dyn IdentityProvider>,
    credentials: Arc<dyn CredentialStore>,
    generation: AtomicU64,
    checks_in_flight: AtomicUsize,
}

enum CheckOutcome {
    NoCredential,
    Verified(User),
    Rejected,
    Failed(AuthError),
}

/// Counts a running session check. Dropping it without [`PendingCheck::settle`]
/// (the check future was cancelled) still releases the slot and publishes the
/// new `loading` flag.
struct PendingCheck<'a> {
    store: &'a SessionStore,
    settled: bool,
}

impl<'a> PendingCheck<'a> {
    fn start(store: &'a SessionStore) -> Self {
        store.state.send_modify(|session| {
            store.checks_in_flight.fetch_add(1, Ordering::SeqCst);
            session.loading = true;
        });
        Self {
            store,
            settled: false,
        }
    }

    /// Release the slot while the caller already holds the channel lock.
    fn settle(mut self, session: &mut Session) {
        self.settled = true;
        session.loading = self.store.finish_check();
    }
}

impl Drop for PendingCheck<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!("Session check cancelled before it resolved");
        let store = self.store;
        store.state.send_modify(|session| session.loading = store.finish_check());
    }
}

impl SessionStore {
    /// Starts in the loading state; the owner is expected to run
    /// [`SessionStore::check_session`] right away.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let (state, _) = watch::channel(Session::initial());
        Self {
            state,
            provider,
            credentials,
            generation: AtomicU64::new(0),
            checks_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn has_stored_credential(&self) -> bool {
        matches!(self.credentials.load(), Ok(Some(_)))
    }

    /// Re-validate the stored credential with the identity provider.
    ///
    /// Never fails: any error leaves the session unauthenticated and
    /// `loading` is cleared once no other check is pending, also when the
    /// returned future is dropped early. A result only applies while the
    /// credential it verified is still the stored one.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn check_session(&self) -> Session {
        let generation = self.generation.load(Ordering::SeqCst);
        let pending = PendingCheck::start(self);

        let (checked, outcome) = self.verify_stored_credential().await;

        self.state.send_modify(|session| {
            pending.settle(session);

            if self.generation.load(Ordering::SeqCst) != generation {
                debug!("Discarding session check result, a login or logout happened meanwhile");
                return;
            }
            if self.stored_token().as_ref() != checked.as_ref() {
                debug!("Discarding session check result, the stored credential changed meanwhile");
                return;
            }

            match outcome {
                CheckOutcome::NoCredential => session.identity = None,
                CheckOutcome::Verified(user) => {
                    debug!("Session verified for {}", user.email);
                    session.identity = Some(user);
                }
                CheckOutcome::Rejected => {
                    if let Some(previous) = session.identity.take() {
                        info!(
                            "Credential of {} was revoked by the identity provider, signing out",
                            previous.email
                        );
                    }
                    if let Err(e) = self.credentials.clear() {
                        warn!("Failed to remove rejected credential: {}", e);
                    }
                }
                CheckOutcome::Failed(err) => {
                    match &err {
                        AuthError::MalformedResponse(_) => {
                            error!("Session check failed: {}", err)
                        }
                        _ => warn!("Session check failed: {}", err),
                    }
                    // the credential stays for the next check
                    session.identity = None;
                }
            }
        });

        self.snapshot()
    }

    /// Release one check slot, returns whether other checks are still running.
    fn finish_check(&self) -> bool {
        let previous = self
            .checks_in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.saturating_sub(1)))
            .unwrap_or_default();
        previous > 1
    }

    fn stored_token(&self) -> Option<MaskedSecret> {
        match self.credentials.load() {
            Ok(credential) => credential.map(|c| c.token),
            Err(_) => None,
        }
    }

    async fn verify_stored_credential(&self) -> (Option<MaskedSecret>, CheckOutcome) {
        let credential = match self.credentials.load() {
            Ok(Some(credential)) => credential,
            Ok(None) => return (None, CheckOutcome::NoCredential),
            Err(e) => {
                warn!("Failed to read stored credential: {}", e);
                return (None, CheckOutcome::NoCredential);
            }
        };

        let outcome = match self.provider.verify(&credential.token).await {
            Ok(Some(user)) => CheckOutcome::Verified(user),
            Ok(None) => CheckOutcome::Rejected,
            Err(e) => CheckOutcome::Failed(e.into()),
        };
        (Some(credential.token), outcome)
    }

    /// Exchange email and password for a session.
    ///
    /// On success the identity is set and the credential stored. A later
    /// `logout` or `login` started before this one resolves wins, this call
    /// then reports [`AuthError::Superseded`].
    #[instrument(skip(self, password), fields(provider = self.provider.name()))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let password = MaskedSecret::from(password);

        let authenticated = match self.provider.authenticate(email, &password).await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                let err = AuthError::from(e);
                match &err {
                    AuthError::InvalidCredentials => info!("Login rejected for {}", email),
                    AuthError::MalformedResponse(_) => error!("Login failed for {}: {}", email, err),
                    _ => warn!("Login failed for {}: {}", email, err),
                }
                return Err(err);
            }
        };

        let mut applied = false;
        self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let credential = StoredCredential::new(
                authenticated.token.clone(),
                self.provider.name(),
                &authenticated.user.email,
            );
            if let Err(e) = self.credentials.save(&credential) {
                warn!(
                    "Failed to persist credential, the session will not survive a restart: {}",
                    e
                );
            }
            session.identity = Some(authenticated.user.clone());
            session.loading = self.checks_in_flight.load(Ordering::SeqCst) > 0;
            applied = true;
            true
        });

        if !applied {
            info!("Login of {} superseded, discarding its credential", email);
            if let Err(e) = self.provider.revoke(&authenticated.token).await {
                debug!("Could not revoke superseded credential: {}", e);
            }
            return Err(AuthError::Superseded);
        }

        info!("Signed in {} as {}", authenticated.user.email, authenticated.user.role);
        Ok(authenticated.user)
    }

    /// Forget the identity and the stored credential.
    ///
    /// Takes effect before returning. Revocation at the provider runs in the
    /// background when a runtime is available; its handle is returned for
    /// callers about to exit.
    pub fn logout(&self) -> Option<JoinHandle<()>> {
        let mut revoked_token: Option<MaskedSecret> = None;

        self.state.send_if_modified(|session| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            match self.credentials.load() {
                Ok(credential) => revoked_token = credential.map(|c| c.token),
                Err(e) => warn!("Failed to read stored credential during logout: {}", e),
            }
            if let Err(e) = self.credentials.clear() {
                warn!("Failed to remove stored credential: {}", e);
            }
            let was_loading = session.loading;
            session.loading = self.checks_in_flight.load(Ordering::SeqCst) > 0;
            match session.identity.take() {
                Some(user) => {
                    info!("Signed out {}", user.email);
                    true
                }
                None => was_loading != session.loading,
            }
        });

        let token = revoked_token?;
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        let provider = self.provider.clone();
        Some(runtime.spawn(async move {
            if let Err(e) = provider.revoke(&token).await {
                debug!("Could not revoke credential at the provider: {}", e);
            }
        }))
    }
}
