pub mod auth;

pub use auth::{identity_middleware, resolve_identity};
