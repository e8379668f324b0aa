use integra_types::{NavItem, PermissionSet};

use super::routes::ROUTES;

/// Sidebar entries visible with the given permissions, in display order.
pub fn navigation_for(permissions: &PermissionSet) -> Vec<NavItem> {
    ROUTES
        .iter()
        .filter_map(|route| {
            let label = route.nav_label?;
            let capability = *route.required.first()?;
            permissions.allows_all(route.required).then(|| NavItem {
                path: route.pattern.to_string(),
                label: label.to_string(),
                capability,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authorization::permissions_for;
    use integra_types::Role;

    fn labels(items: &[NavItem]) -> Vec<&str> {
        items.iter().map(|item| item.label.as_str()).collect()
    }

    #[test]
    fn test_administrator_sees_everything() {
        let items = navigation_for(permissions_for(Some(Role::Administrator)));
        assert_eq!(
            labels(&items),
            vec!["Dashboard", "Integrations", "Audit Log", "Analytics", "Users", "Settings"]
        );
    }

    #[test]
    fn test_viewer_navigation() {
        let items = navigation_for(permissions_for(Some(Role::Viewer)));
        assert_eq!(labels(&items), vec!["Dashboard", "Integrations", "Analytics"]);
    }

    #[test]
    fn test_operator_has_audit_but_no_admin_pages() {
        let items = navigation_for(permissions_for(Some(Role::Operator)));
        assert!(labels(&items).contains(&"Audit Log"));
        assert!(!labels(&items).contains(&"Users"));
        assert!(!labels(&items).contains(&"Settings"));
    }

    #[test]
    fn test_anonymous_navigation_is_empty() {
        assert!(navigation_for(permissions_for(None)).is_empty());
    }
}
