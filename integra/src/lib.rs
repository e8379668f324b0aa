//! Session runtime of the integra registry front end
//!
//! Ties the pure authorization rules of `integra_core` to a live session:
//! an identity provider, a credential store, periodic re-validation and a
//! guarded router.

pub mod context;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod init_telemetry;
pub mod routing;
pub mod session;
pub mod settings;
pub mod stop_flag;

pub use context::{AuthContext, SharedAuthContext};
pub use error::AuthError;
