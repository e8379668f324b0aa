/*!
 * Types shared between the integra authorization core and the browser frontend
 *
 * This crate only carries plain data (roles, capabilities, the session value
 * and guard decisions) so the TypeScript generator can be built without the
 * HTTP and runtime dependencies of the core.
 */

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ts_rs::TS;

pub use ts_rs;

/// Coarse identity classification that decides capability grants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[serde(rename = "admin", alias = "administrator")]
    Administrator,
    Operator,
    Viewer,
}

impl Role {
    pub fn all() -> [Role; 3] {
        [Role::Administrator, Role::Operator, Role::Viewer]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "admin",
            Role::Operator => "operator",
            Role::Viewer => "viewer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Operator => "Operator",
            Role::Viewer => "Viewer",
        }
    }

    /// Parse a role name coming from an untrusted source.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Role> {
        match s.trim().to_lowercase().as_str() {
            "admin" | "administrator" => Some(Role::Administrator),
            "operator" => Some(Role::Operator),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single protected action or view of the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    ViewIntegrations,
    CreateIntegration,
    EditIntegration,
    DeleteIntegration,
    /// Audit log and per-integration version history
    ViewAudit,
    ViewAnalytics,
    /// Spreadsheet export of integration tables
    ExportData,
    ViewUsers,
    ManageUsers,
    ViewSettings,
}

impl Capability {
    /// All capabilities in display order
    pub fn all() -> [Capability; 11] {
        [
            Capability::ViewDashboard,
            Capability::ViewIntegrations,
            Capability::CreateIntegration,
            Capability::EditIntegration,
            Capability::DeleteIntegration,
            Capability::ViewAudit,
            Capability::ViewAnalytics,
            Capability::ExportData,
            Capability::ViewUsers,
            Capability::ManageUsers,
            Capability::ViewSettings,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewDashboard => "view_dashboard",
            Capability::ViewIntegrations => "view_integrations",
            Capability::CreateIntegration => "create_integration",
            Capability::EditIntegration => "edit_integration",
            Capability::DeleteIntegration => "delete_integration",
            Capability::ViewAudit => "view_audit",
            Capability::ViewAnalytics => "view_analytics",
            Capability::ExportData => "export_data",
            Capability::ViewUsers => "view_users",
            Capability::ManageUsers => "manage_users",
            Capability::ViewSettings => "view_settings",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Capability> {
        let s = s.trim().to_lowercase().replace('-', "_");
        Capability::all().into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The full capability grant of one role.
///
/// Every capability always has an entry, so lookups never have to guess
/// about missing keys. Deserializing fills absent entries with `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PermissionSet {
    #[ts(type = "Record<Capability, boolean>")]
    grants: BTreeMap<Capability, bool>,
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Wire {
            #[serde(default)]
            grants: BTreeMap<Capability, bool>,
        }

        let wire = Wire::deserialize(deserializer)?;
        let granted: Vec<Capability> = wire
            .grants
            .into_iter()
            .filter(|(_, allowed)| *allowed)
            .map(|(c, _)| c)
            .collect();
        Ok(Self::from_granted(&granted))
    }
}

impl PermissionSet {
    /// A set where nothing is granted.
    pub fn deny_all() -> Self {
        Self::from_granted(&[])
    }

    /// Build a total set from the list of granted capabilities.
    pub fn from_granted(granted: &[Capability]) -> Self {
        let grants = Capability::all()
            .into_iter()
            .map(|c| (c, granted.contains(&c)))
            .collect();
        Self { grants }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.grants.get(&capability).copied().unwrap_or(false)
    }

    /// Capabilities of `required` that this set does not grant, in input order.
    pub fn missing(&self, required: &[Capability]) -> Vec<Capability> {
        let mut missing = Vec::new();
        for capability in required {
            if !self.allows(*capability) && !missing.contains(capability) {
                missing.push(*capability);
            }
        }
        missing
    }

    pub fn allows_all(&self, required: &[Capability]) -> bool {
        required.iter().all(|c| self.allows(*c))
    }

    pub fn granted(&self) -> Vec<Capability> {
        self.grants
            .iter()
            .filter(|(_, allowed)| **allowed)
            .map(|(c, _)| *c)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.grants.iter().map(|(c, allowed)| (*c, *allowed))
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

/// Current authentication state of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Session {
    pub identity: Option<User>,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SessionStatus {
    Loading,
    Unauthenticated,
    Authenticated,
}

impl Session {
    /// Session before the first check has run.
    pub fn initial() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn authenticated(user: User) -> Self {
        Self {
            identity: Some(user),
            loading: false,
        }
    }

    /// A re-check running behind an authenticated session keeps it
    /// `Authenticated`; only a session without identity shows as loading.
    pub fn status(&self) -> SessionStatus {
        match (&self.identity, self.loading) {
            (Some(_), _) => SessionStatus::Authenticated,
            (None, true) => SessionStatus::Loading,
            (None, false) => SessionStatus::Unauthenticated,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Outcome of evaluating the route guard for one (session, path) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteDecision {
    /// Show the neutral waiting indicator and do nothing else
    Wait,
    Render,
    Redirect {
        to: String,
        replace: bool,
        /// Originally requested path, restored after login
        from: Option<String>,
    },
}

impl RouteDecision {
    pub fn renders_children(&self) -> bool {
        matches!(self, RouteDecision::Render)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CapabilityDecision {
    Granted,
    Denied { missing: Vec<Capability> },
}

impl CapabilityDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, CapabilityDecision::Granted)
    }
}

/// Sidebar entry shown to a user whose role grants `capability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NavItem {
    pub path: String,
    pub label: String,
    pub capability: Capability,
}

/// Error kinds surfaced to the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    ProviderUnavailable,
    MalformedResponse,
    Superseded,
}
