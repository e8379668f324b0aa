use integra_types::{Capability, CapabilityDecision, Session};
use std::fmt;

use super::permission_table::permissions_for;

/// Denial produced when a guarded region may not be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub missing: Vec<Capability>,
    pub authenticated: bool,
}

impl AccessDenied {
    /// Denial for a page outside the route table.
    pub fn unknown_page(session: &Session) -> Self {
        Self {
            missing: Vec::new(),
            authenticated: session.is_authenticated(),
        }
    }

    /// Standard notice shown when the caller did not supply a fallback
    pub fn notice(&self) -> String {
        if !self.authenticated {
            return "Access denied: sign in to view this page.".to_string();
        }
        if self.missing.is_empty() {
            return "Access denied: this page does not exist.".to_string();
        }
        let names: Vec<&str> = self.missing.iter().map(|c| c.as_str()).collect();
        format!(
            "Access denied: your role lacks the required permission(s): {}.",
            names.join(", ")
        )
    }
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notice())
    }
}

/// What a guarded region resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Content(T),
    Fallback(T),
    Denied(AccessDenied),
}

impl<T> Guarded<T> {
    pub fn is_content(&self) -> bool {
        matches!(self, Guarded::Content(_))
    }

    pub fn content(self) -> Option<T> {
        match self {
            Guarded::Content(content) => Some(content),
            _ => None,
        }
    }
}

/// Decide whether `required` is satisfied by the session's role.
///
/// All capabilities must be granted. A session without identity is denied
/// even when nothing is required.
pub fn evaluate(session: &Session, required: &[Capability]) -> CapabilityDecision {
    let permissions = permissions_for(session.role());
    let missing = permissions.missing(required);

    if session.identity.is_none() || !missing.is_empty() {
        CapabilityDecision::Denied { missing }
    } else {
        CapabilityDecision::Granted
    }
}

/// Render `children` only when the session satisfies `required`.
///
/// `children` is never invoked on denial. Without a fallback the result
/// carries an [`AccessDenied`] naming the missing capabilities.
pub fn guard<T, C, F>(
    session: &Session,
    required: &[Capability],
    children: C,
    fallback: Option<F>,
) -> Guarded<T>
where
    C: FnOnce() -> T,
    F: FnOnce() -> T,
{
    match evaluate(session, required) {
        CapabilityDecision::Granted => Guarded::Content(children()),
        CapabilityDecision::Denied { missing } => match fallback {
            Some(fallback) => Guarded::Fallback(fallback()),
            None => Guarded::Denied(AccessDenied {
                missing,
                authenticated: session.is_authenticated(),
            }),
        },
    }
}
