//! Role based access control for the registry
//!
//! The permission table maps each role to a fixed capability grant. The
//! capability guard consults it to decide whether a region may be shown.

pub mod capability_guard;
pub mod permission_table;

pub use capability_guard::{guard, AccessDenied, Guarded};
pub use permission_table::{is_allowed, permissions_for, permissions_for_role_name};
