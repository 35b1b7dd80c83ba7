pub mod partial_update;
pub mod pool;

pub use partial_update::{sql_for_partial_update, SqlBuildError, UpdateClause};
pub use pool::{connect, health_check};
