use integra_core::routing::{Navigator, RouteGuard};
use integra_types::{RouteDecision, Session};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::stop_flag::StopFlag;

/// Keep the guard applied while the session or the location changes.
///
/// The returned receiver carries the latest decision for rendering. The task
/// ends when either source is dropped or the stop flag is raised.
pub fn spawn_route_guard<N>(
    guard: RouteGuard<N>,
    mut session: watch::Receiver<Session>,
    mut location: watch::Receiver<String>,
    stop_flag: StopFlag,
) -> (watch::Receiver<RouteDecision>, JoinHandle<()>)
where
    N: Navigator + 'static,
{
    let (decisions, receiver) = watch::channel(RouteDecision::Wait);

    let handle = tokio::spawn(async move {
        loop {
            let snapshot = session.borrow_and_update().clone();
            location.borrow_and_update();

            let decision = guard.apply(&snapshot);
            decisions.send_if_modified(|current| {
                if *current == decision {
                    return false;
                }
                *current = decision;
                true
            });

            tokio::select! {
                changed = session.changed() => if changed.is_err() { break },
                changed = location.changed() => if changed.is_err() { break },
                _ = stop_flag.wait() => break,
            }
        }
        debug!("Route guard binding stopped");
    });

    (receiver, handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::HistoryRouter;
    use integra_types::{Role, User};
    use std::sync::Arc;
    use std::time::Duration;

    fn viewer() -> User {
        User {
            id: "3".to_string(),
            display_name: "Vera Viewer".to_string(),
            email: "viewer@cbank.example".to_string(),
            role: Role::Viewer,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    #[tokio::test]
    async fn test_waits_then_redirects_to_login() {
        let router = Arc::new(HistoryRouter::new("/settings"));
        let (session_tx, session_rx) = watch::channel(Session::initial());
        let stop_flag = StopFlag::new();

        let (decisions, handle) = spawn_route_guard(
            RouteGuard::new(router.clone()),
            session_rx,
            router.subscribe(),
            stop_flag.clone(),
        );
        settle().await;
        assert_eq!(*decisions.borrow(), RouteDecision::Wait);
        assert_eq!(router.current_path(), "/settings");

        session_tx.send_replace(Session::unauthenticated());
        settle().await;
        assert_eq!(router.current_path(), "/login");
        assert_eq!(router.redirected_from().as_deref(), Some("/settings"));
        assert_eq!(router.entries().len(), 1);
        assert_eq!(*decisions.borrow(), RouteDecision::Render);

        session_tx.send_replace(Session::authenticated(viewer()));
        settle().await;
        assert_eq!(router.current_path(), "/settings");
        assert_eq!(router.redirected_from(), None);

        stop_flag.stop();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_login_moves_away_from_login_page() {
        let router = Arc::new(HistoryRouter::new("/login"));
        let (session_tx, session_rx) = watch::channel(Session::unauthenticated());
        let stop_flag = StopFlag::new();

        let (_decisions, handle) = spawn_route_guard(
            RouteGuard::new(router.clone()),
            session_rx,
            router.subscribe(),
            stop_flag.clone(),
        );
        settle().await;
        assert_eq!(router.current_path(), "/login");

        session_tx.send_replace(Session::authenticated(viewer()));
        settle().await;
        assert_eq!(router.current_path(), "/dashboard");
        assert_eq!(router.entries().len(), 1);

        drop(session_tx);
        handle.await.unwrap();
    }
}
