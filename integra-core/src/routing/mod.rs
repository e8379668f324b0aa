//! Client-side routes of the registry and the guard deciding access to them

pub mod navigation;
pub mod route_guard;
pub mod routes;

pub use navigation::navigation_for;
pub use route_guard::{evaluate, post_login_destination, NavigateOptions, Navigator, RouteGuard};
pub use routes::{access_for, required_capabilities, Access, LANDING_PATH, LOGIN_PATH};
