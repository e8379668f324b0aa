use integra_types::{Capability, PermissionSet, Role};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::warn;

/// Capability grants per role, built once and never mutated.
static PERMISSION_TABLE: Lazy<HashMap<Role, PermissionSet>> = Lazy::new(|| {
    Role::all()
        .into_iter()
        .map(|role| (role, PermissionSet::from_granted(granted_capabilities(role))))
        .collect()
});

static DENY_ALL: Lazy<PermissionSet> = Lazy::new(PermissionSet::deny_all);

/// Capabilities granted to a role. The match is exhaustive so adding a role
/// without deciding its grants does not compile.
fn granted_capabilities(role: Role) -> &'static [Capability] {
    match role {
        Role::Administrator => &[
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
        ],
        Role::Operator => &[
            Capability::ViewDashboard,
            Capability::ViewIntegrations,
            Capability::CreateIntegration,
            Capability::EditIntegration,
            Capability::ViewAudit,
            Capability::ViewAnalytics,
            Capability::ExportData,
        ],
        Role::Viewer => &[
            Capability::ViewDashboard,
            Capability::ViewIntegrations,
            Capability::ViewAnalytics,
        ],
    }
}

/// Permission set for a role; `None` (not authenticated) grants nothing.
pub fn permissions_for(role: Option<Role>) -> &'static PermissionSet {
    match role {
        Some(role) => PERMISSION_TABLE.get(&role).unwrap_or(&DENY_ALL),
        None => &DENY_ALL,
    }
}

/// Permission set for a role name from an untrusted source.
///
/// Unknown names get the deny-all set instead of an error.
pub fn permissions_for_role_name(name: &str) -> &'static PermissionSet {
    match Role::from_str(name) {
        Some(role) => permissions_for(Some(role)),
        None => {
            warn!("Unknown role '{}', granting no capabilities", name);
            &DENY_ALL
        }
    }
}

pub fn is_allowed(role: Option<Role>, capability: Capability) -> bool {
    permissions_for(role).allows(capability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_a_total_permission_set() {
        for role in Role::all() {
            let set = permissions_for(Some(role));
            assert_eq!(set.len(), Capability::all().len(), "role {role}");
            for capability in Capability::all() {
                assert!(set.iter().any(|(c, _)| c == capability));
            }
        }
    }

    #[test]
    fn test_unauthenticated_gets_nothing() {
        let set = permissions_for(None);
        assert_eq!(set.len(), Capability::all().len());
        assert!(set.granted().is_empty());
    }

    #[test]
    fn test_unknown_role_name_falls_back_to_deny_all() {
        assert!(permissions_for_role_name("superuser").granted().is_empty());
        assert!(permissions_for_role_name("").granted().is_empty());
        assert_eq!(
            permissions_for_role_name("viewer"),
            permissions_for(Some(Role::Viewer))
        );
    }

    #[test]
    fn test_administrator_has_everything() {
        assert_eq!(
            permissions_for(Some(Role::Administrator)).granted().len(),
            Capability::all().len()
        );
    }

    #[test]
    fn test_operator_grants() {
        let role = Some(Role::Operator);
        assert!(is_allowed(role, Capability::EditIntegration));
        assert!(is_allowed(role, Capability::ViewAudit));
        assert!(!is_allowed(role, Capability::DeleteIntegration));
        assert!(!is_allowed(role, Capability::ViewUsers));
        assert!(!is_allowed(role, Capability::ViewSettings));
    }

    #[test]
    fn test_viewer_is_read_only() {
        let role = Some(Role::Viewer);
        assert!(is_allowed(role, Capability::ViewIntegrations));
        assert!(!is_allowed(role, Capability::ViewUsers));
        assert!(!is_allowed(role, Capability::CreateIntegration));
        assert!(!is_allowed(role, Capability::EditIntegration));
        assert!(!is_allowed(role, Capability::ExportData));
    }

    #[test]
    fn test_lookup_is_deterministic() {
        assert_eq!(
            permissions_for(Some(Role::Operator)),
            permissions_for(Some(Role::Operator))
        );
    }
}
