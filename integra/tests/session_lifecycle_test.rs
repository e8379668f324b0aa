use integra::credentials::{CredentialStore, MemoryCredentialStore};
use integra::identity::InMemoryIdentityProvider;
use integra::routing::HistoryRouter;
use integra::settings::Settings;
use integra::{AuthContext, AuthError, SharedAuthContext};
use integra_core::routing::Navigator;
use integra_core::settings::scheduler_interval::SchedulerInterval;
use integra_core::settings::session::SessionSettings;
use integra_types::{RouteDecision, Session, SessionStatus};
use std::sync::Arc;
use std::time::Duration;

struct Harness {
    ctx: SharedAuthContext,
    provider: Arc<InMemoryIdentityProvider>,
    credentials: Arc<MemoryCredentialStore>,
}

fn harness_with(provider: InMemoryIdentityProvider, recheck: SchedulerInterval) -> Harness {
    let provider = Arc::new(provider);
    let credentials = Arc::new(MemoryCredentialStore::new());
    let settings = Settings {
        session: SessionSettings::with_recheck_interval(recheck),
        ..Settings::default()
    };
    let ctx = AuthContext::from_parts(settings, provider.clone(), credentials.clone());
    Harness {
        ctx,
        provider,
        credentials,
    }
}

fn harness() -> Harness {
    harness_with(
        InMemoryIdentityProvider::seeded(),
        SchedulerInterval::Minutes(5),
    )
}

#[tokio::test]
async fn test_repeated_checks_agree() {
    let h = harness();
    h.ctx.start().await;
    h.ctx
        .login("operator@cbank.example", "operator-demo")
        .await
        .unwrap();

    let (first, second) = tokio::join!(
        h.ctx.session.check_session(),
        h.ctx.session.check_session()
    );
    assert_eq!(first.identity, second.identity);
    assert_eq!(h.ctx.session().status(), SessionStatus::Authenticated);
    assert!(!h.ctx.session().loading);

    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_provider_failure_fails_closed() {
    let h = harness();
    h.ctx.start().await;
    h.ctx.login("admin@cbank.example", "admin-demo").await.unwrap();

    h.provider.set_available(false);
    let session = h.ctx.session.check_session().await;

    assert_eq!(session, Session::unauthenticated());
    assert!(h.ctx.permissions().granted().is_empty());
    assert!(h.credentials.load().unwrap().is_some());

    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_login_unavailable_reports_error() {
    let h = harness();
    h.ctx.start().await;
    h.provider.set_available(false);

    let err = h
        .ctx
        .login("admin@cbank.example", "admin-demo")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    assert_eq!(h.ctx.session(), Session::unauthenticated());

    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_logout_while_login_in_flight_wins() {
    let h = harness_with(
        InMemoryIdentityProvider::seeded().with_latency(Duration::from_millis(100)),
        SchedulerInterval::Minutes(5),
    );
    h.ctx.start().await;

    let login = {
        let ctx = h.ctx.clone();
        tokio::spawn(async move { ctx.login("admin@cbank.example", "admin-demo").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    h.ctx.logout();

    assert_eq!(login.await.unwrap(), Err(AuthError::Superseded));
    assert_eq!(h.ctx.session(), Session::unauthenticated());
    assert!(h.credentials.load().unwrap().is_none());
    assert_eq!(h.provider.active_tokens(), 0);

    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_later_login_supersedes_earlier_one() {
    let h = harness_with(
        InMemoryIdentityProvider::seeded().with_latency(Duration::from_millis(60)),
        SchedulerInterval::Minutes(5),
    );
    h.ctx.start().await;

    let first = {
        let ctx = h.ctx.clone();
        tokio::spawn(async move { ctx.login("admin@cbank.example", "admin-demo").await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    let second = h.ctx.login("viewer@cbank.example", "viewer-demo").await;

    assert_eq!(first.await.unwrap(), Err(AuthError::Superseded));
    assert_eq!(second.unwrap().email, "viewer@cbank.example");
    assert_eq!(
        h.ctx.current_user().map(|u| u.email),
        Some("viewer@cbank.example".to_string())
    );

    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_periodic_recheck_signs_out_revoked_user() {
    let h = harness_with(
        InMemoryIdentityProvider::seeded(),
        SchedulerInterval::Seconds(1),
    );
    h.ctx.start().await;
    h.ctx
        .login("operator@cbank.example", "operator-demo")
        .await
        .unwrap();
    let mut updates = h.ctx.session.subscribe();

    h.provider.revoke_user("operator@cbank.example");

    tokio::time::timeout(Duration::from_secs(5), async {
        while updates.borrow_and_update().is_authenticated() {
            updates.changed().await.unwrap();
        }
    })
    .await
    .expect("revoked session should be signed out by the periodic check");

    assert!(h.credentials.load().unwrap().is_none());
    h.ctx.shutdown().await;
}

#[tokio::test]
async fn test_router_follows_session_changes() {
    let h = harness();
    let router = Arc::new(HistoryRouter::new("/integrations/INT-3/edit"));
    let mut decisions = h.ctx.attach_router(router.clone(), router.subscribe());
    h.ctx.start().await;

    tokio::time::timeout(Duration::from_secs(1), async {
        while router.current_path() != "/login" {
            decisions.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
    assert_eq!(
        router.redirected_from().as_deref(),
        Some("/integrations/INT-3/edit")
    );

    h.ctx
        .login("operator@cbank.example", "operator-demo")
        .await
        .unwrap();
    tokio::time::timeout(Duration::from_secs(1), async {
        while *decisions.borrow_and_update() != RouteDecision::Render
            || router.current_path() == "/login"
        {
            decisions.changed().await.unwrap();
        }
    })
    .await
    .unwrap();
    assert_eq!(router.current_path(), "/integrations/INT-3/edit");

    h.ctx.shutdown().await;
}
