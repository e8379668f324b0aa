pub mod identity_provider;
pub mod scheduler_interval;
pub mod session;
