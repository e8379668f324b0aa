use integra_types::{RouteDecision, Session, SessionStatus};
use tracing::debug;

use super::routes::{access_for, normalize_path, Access, LANDING_PATH, LOGIN_PATH};

/// Options passed along with a navigation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Replace the current history entry instead of pushing a new one
    pub replace: bool,
    /// Path the user originally asked for
    pub from: Option<String>,
}

/// The router the guard drives.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn navigate(&self, path: &str, options: NavigateOptions);

    /// `from` state of the current location, set when the guard redirected
    /// to the login page.
    fn redirected_from(&self) -> Option<String> {
        None
    }
}

impl<T: Navigator + ?Sized> Navigator for std::sync::Arc<T> {
    fn current_path(&self) -> String {
        (**self).current_path()
    }

    fn navigate(&self, path: &str, options: NavigateOptions) {
        (**self).navigate(path, options)
    }

    fn redirected_from(&self) -> Option<String> {
        (**self).redirected_from()
    }
}

/// Decide what to do for `pathname` given the session.
///
/// Pure so it stays correct under back/forward navigation and concurrent
/// session changes: callers re-run it whenever either input changes.
pub fn evaluate(session: &Session, pathname: &str) -> RouteDecision {
    let path = normalize_path(pathname);

    match (session.status(), access_for(path)) {
        (SessionStatus::Loading, _) => RouteDecision::Wait,
        (SessionStatus::Unauthenticated, Access::Protected) => RouteDecision::Redirect {
            to: LOGIN_PATH.to_string(),
            replace: true,
            from: Some(pathname.to_string()),
        },
        (SessionStatus::Authenticated, Access::PublicOnly) => RouteDecision::Redirect {
            to: LANDING_PATH.to_string(),
            replace: true,
            from: None,
        },
        _ => RouteDecision::Render,
    }
}

/// Where to go after a successful login.
///
/// Only internal protected paths are honoured; anything else (external
/// URLs, scheme-relative `//host` paths, the login page itself) lands on
/// the default route.
pub fn post_login_destination(from: Option<&str>) -> String {
    match from {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && access_for(path) == Access::Protected =>
        {
            path.to_string()
        }
        _ => LANDING_PATH.to_string(),
    }
}

/// Applies route decisions to a [`Navigator`].
pub struct RouteGuard<N: Navigator> {
    navigator: N,
}

impl<N: Navigator> RouteGuard<N> {
    pub fn new(navigator: N) -> Self {
        Self { navigator }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Evaluate the current path and issue at most one navigation.
    ///
    /// A signed-in user on a public-only page is sent back to the route the
    /// guard originally redirected away from.
    pub fn apply(&self, session: &Session) -> RouteDecision {
        let path = self.navigator.current_path();
        let decision = match evaluate(session, &path) {
            RouteDecision::Redirect { replace, .. } if session.is_authenticated() => {
                RouteDecision::Redirect {
                    to: post_login_destination(self.navigator.redirected_from().as_deref()),
                    replace,
                    from: None,
                }
            }
            decision => decision,
        };

        if let RouteDecision::Redirect { to, replace, from } = &decision {
            debug!("Route guard redirecting from {} to {}", path, to);
            self.navigator.navigate(
                to,
                NavigateOptions {
                    replace: *replace,
                    from: from.clone(),
                },
            );
        }

        decision
    }
}
