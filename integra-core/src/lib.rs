pub mod authorization;
pub mod http;
pub mod routing;
pub mod settings;
pub mod utils;

// Shared data types live in integra-types so the TypeScript generator stays small
pub use integra_types as types;
