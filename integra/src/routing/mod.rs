//! Router integration for the route guard

pub mod binding;
pub mod history;

pub use binding::spawn_route_guard;
pub use history::{HistoryEntry, HistoryRouter};
