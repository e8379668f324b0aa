//! Session lifecycle: login, logout and periodic re-validation

pub mod refresher;
pub mod store;

pub use refresher::spawn_session_refresher;
pub use store::SessionStore;
