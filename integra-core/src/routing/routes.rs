use integra_types::Capability;

/// Public entry point for unauthenticated users
pub const LOGIN_PATH: &str = "/login";
/// Where authenticated users land by default
pub const LANDING_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable with or without a session
    Public,
    /// Only makes sense without a session (login, password reset)
    PublicOnly,
    Protected,
}

#[derive(Debug, Clone, Copy)]
pub struct RouteDef {
    /// Path pattern, `{id}` matches any single segment
    pub pattern: &'static str,
    pub access: Access,
    /// Capabilities the page content needs
    pub required: &'static [Capability],
    /// Sidebar label, if the route is a navigation entry
    pub nav_label: Option<&'static str>,
}

pub static ROUTES: &[RouteDef] = &[
    RouteDef {
        pattern: "/login",
        access: Access::PublicOnly,
        required: &[],
        nav_label: None,
    },
    RouteDef {
        pattern: "/forgot-password",
        access: Access::PublicOnly,
        required: &[],
        nav_label: None,
    },
    RouteDef {
        pattern: "/unauthorized",
        access: Access::Public,
        required: &[],
        nav_label: None,
    },
    RouteDef {
        pattern: "/",
        access: Access::Protected,
        required: &[],
        nav_label: None,
    },
    RouteDef {
        pattern: "/dashboard",
        access: Access::Protected,
        required: &[Capability::ViewDashboard],
        nav_label: Some("Dashboard"),
    },
    RouteDef {
        pattern: "/integrations",
        access: Access::Protected,
        required: &[Capability::ViewIntegrations],
        nav_label: Some("Integrations"),
    },
    RouteDef {
        pattern: "/integrations/new",
        access: Access::Protected,
        required: &[Capability::CreateIntegration],
        nav_label: None,
    },
    RouteDef {
        pattern: "/integrations/{id}",
        access: Access::Protected,
        required: &[Capability::ViewIntegrations],
        nav_label: None,
    },
    RouteDef {
        pattern: "/integrations/{id}/edit",
        access: Access::Protected,
        required: &[Capability::ViewIntegrations, Capability::EditIntegration],
        nav_label: None,
    },
    RouteDef {
        pattern: "/integrations/{id}/history",
        access: Access::Protected,
        required: &[Capability::ViewIntegrations, Capability::ViewAudit],
        nav_label: None,
    },
    RouteDef {
        pattern: "/audit",
        access: Access::Protected,
        required: &[Capability::ViewAudit],
        nav_label: Some("Audit Log"),
    },
    RouteDef {
        pattern: "/analytics",
        access: Access::Protected,
        required: &[Capability::ViewAnalytics],
        nav_label: Some("Analytics"),
    },
    RouteDef {
        pattern: "/users",
        access: Access::Protected,
        required: &[Capability::ViewUsers],
        nav_label: Some("Users"),
    },
    RouteDef {
        pattern: "/settings",
        access: Access::Protected,
        required: &[Capability::ViewSettings],
        nav_label: Some("Settings"),
    },
    RouteDef {
        pattern: "/profile",
        access: Access::Protected,
        required: &[],
        nav_label: None,
    },
];

/// Strip query string, fragment and trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let path = path[..end].trim_end_matches('/');
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let pattern_parts: Vec<&str> = pattern.trim_start_matches('/').split('/').collect();
    let path_parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    pattern_parts.len() == path_parts.len()
        && pattern_parts
            .iter()
            .zip(path_parts.iter())
            .all(|(expected, actual)| {
                if *expected == "{id}" {
                    !actual.is_empty()
                } else {
                    expected == actual
                }
            })
}

/// Find the route definition for a path. Literal patterns win over
/// placeholders, so `/integrations/new` is not read as an integration id.
pub fn match_route(path: &str) -> Option<&'static RouteDef> {
    let path = normalize_path(path);
    ROUTES
        .iter()
        .filter(|route| pattern_matches(route.pattern, path))
        .min_by_key(|route| route.pattern.matches("{id}").count())
}

/// Access class of a path. Unknown paths are protected.
pub fn access_for(path: &str) -> Access {
    match_route(path)
        .map(|route| route.access)
        .unwrap_or(Access::Protected)
}

/// Capabilities the content behind `path` requires, `None` for paths
/// outside the route table.
pub fn required_capabilities(path: &str) -> Option<&'static [Capability]> {
    match_route(path).map(|route| route.required)
}
