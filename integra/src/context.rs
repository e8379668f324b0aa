use integra_core::authorization::{self, AccessDenied, Guarded};
use integra_core::routing::{self, navigation_for, required_capabilities, Navigator, RouteGuard};
use integra_core::settings::identity_provider::ProviderMode;
use integra_core::settings::session::CredentialStoreKind;
use integra_types::{Capability, NavItem, PermissionSet, RouteDecision, Session, User};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
use crate::error::AuthError;
use crate::identity::{HttpIdentityProvider, IdentityProvider, InMemoryIdentityProvider};
use crate::routing::spawn_route_guard;
use crate::session::{spawn_session_refresher, SessionStore};
use crate::settings::Settings;
use crate::stop_flag::StopFlag;

/// Everything an application needs to gate its views: the session store,
/// the permission lookups and the background tasks keeping them current.
pub struct AuthContext {
    pub settings: Settings,
    pub session: Arc<SessionStore>,
    pub stop_flag: StopFlag,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

pub type SharedAuthContext = Arc<AuthContext>;

impl AuthContext {
    /// Build provider and credential store as configured.
    pub fn new(settings: Settings) -> anyhow::Result<SharedAuthContext> {
        let provider: Arc<dyn IdentityProvider> = match settings.identity_provider.mode {
            ProviderMode::InMemory => {
                info!("Using the in-memory identity provider");
                Arc::new(InMemoryIdentityProvider::seeded())
            }
            ProviderMode::Http => {
                let provider = HttpIdentityProvider::from_settings(&settings.identity_provider)?;
                info!("Using the identity provider at {}", provider.base_url());
                Arc::new(provider)
            }
        };

        let credentials: Arc<dyn CredentialStore> = match settings.session.credential_store {
            CredentialStoreKind::Memory => Arc::new(MemoryCredentialStore::new()),
            CredentialStoreKind::File => match &settings.session.credential_dir {
                Some(dir) => Arc::new(FileCredentialStore::new(dir, provider.name())),
                None => Arc::new(FileCredentialStore::in_default_dir(provider.name())?),
            },
        };

        Ok(Self::from_parts(settings, provider, credentials))
    }

    pub fn from_parts(
        settings: Settings,
        provider: Arc<dyn IdentityProvider>,
        credentials: Arc<dyn CredentialStore>,
    ) -> SharedAuthContext {
        Arc::new(Self {
            settings,
            session: Arc::new(SessionStore::new(provider, credentials)),
            stop_flag: StopFlag::new(),
            handles: Mutex::new(Vec::new()),
        })
    }

    /// Run the initial session check and start the periodic re-check.
    pub async fn start(&self) -> Session {
        let session = self.session.check_session().await;
        let handle = spawn_session_refresher(
            self.session.clone(),
            self.settings.session.recheck_interval,
            self.stop_flag.clone(),
        );
        self.track(handle);
        session
    }

    /// Keep `navigator` guarded for as long as the context runs.
    pub fn attach_router<N>(
        &self,
        navigator: N,
        location: watch::Receiver<String>,
    ) -> watch::Receiver<RouteDecision>
    where
        N: Navigator + 'static,
    {
        let (decisions, handle) = spawn_route_guard(
            RouteGuard::new(navigator),
            self.session.subscribe(),
            location,
            self.stop_flag.clone(),
        );
        self.track(handle);
        decisions
    }

    fn track(&self, handle: JoinHandle<()>) {
        if let Ok(mut handles) = self.handles.lock() {
            handles.push(handle);
        }
    }

    pub fn session(&self) -> Session {
        self.session.snapshot()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.snapshot().identity
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        self.session.login(email, password).await
    }

    pub fn logout(&self) -> Option<JoinHandle<()>> {
        self.session.logout()
    }

    pub fn permissions(&self) -> &'static PermissionSet {
        authorization::permissions_for(self.session.snapshot().role())
    }

    pub fn can(&self, capability: Capability) -> bool {
        authorization::is_allowed(self.session.snapshot().role(), capability)
    }

    pub fn route_decision(&self, pathname: &str) -> RouteDecision {
        routing::evaluate(&self.session.snapshot(), pathname)
    }

    pub fn guard<T, C, F>(&self, required: &[Capability], children: C, fallback: Option<F>) -> Guarded<T>
    where
        C: FnOnce() -> T,
        F: FnOnce() -> T,
    {
        authorization::guard(&self.session.snapshot(), required, children, fallback)
    }

    /// Guard the content of a page with the capabilities its route requires.
    /// Pages outside the route table are always denied.
    pub fn guard_page<T, C>(&self, pathname: &str, children: C) -> Guarded<T>
    where
        C: FnOnce() -> T,
    {
        match required_capabilities(pathname) {
            Some(required) => self.guard(required, children, None::<fn() -> T>),
            None => {
                debug!("No route matches {}, denying its content", pathname);
                Guarded::Denied(AccessDenied::unknown_page(&self.session.snapshot()))
            }
        }
    }

    pub fn navigation(&self) -> Vec<NavItem> {
        navigation_for(self.permissions())
    }

    /// Stop background tasks and wait for them.
    pub async fn shutdown(&self) {
        self.stop_flag.stop();
        let handles: Vec<JoinHandle<()>> = match self.handles.lock() {
            Ok(mut handles) => handles.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                debug!("Background task ended abnormally: {}", e);
            }
        }
    }
}
