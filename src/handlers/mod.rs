// Route handlers, one module per resource.
//
// Public endpoints (token acquisition, company/job browsing) call no gate;
// everything else runs one of the authorization predicates from crate::auth
// before touching storage.
pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use axum::Extension;
use serde_json::{Map, Value};

use crate::auth::AuthUser;
use crate::error::ApiError;

/// Expected JSON type for a patchable field
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Str,
    Int,
    Num,
    Bool,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::Str => value.is_string(),
            FieldType::Int => value.as_i64().is_some(),
            FieldType::Num => value.is_number(),
            FieldType::Bool => value.is_boolean(),
        }
    }
}

/// Borrow the request identity out of the optional extension
pub fn identity(auth: &Option<Extension<AuthUser>>) -> Option<&AuthUser> {
    auth.as_ref().map(|Extension(user)| user)
}

/// Check a partial-update body against a closed field list before it
/// reaches the clause builder: unknown fields and wrong-typed values are
/// client faults. Emptiness is the builder's call, not ours.
pub fn validate_patch(
    data: &Map<String, Value>,
    allowed: &[(&str, FieldType)],
) -> Result<(), ApiError> {
    for (field, value) in data.iter() {
        let Some((_, expected)) = allowed.iter().find(|(name, _)| *name == field.as_str()) else {
            return Err(ApiError::bad_request(format!(
                "Field is not allowed: {field}"
            )));
        };
        if !expected.matches(value) {
            return Err(ApiError::bad_request(format!(
                "Invalid value for field: {field}"
            )));
        }
    }
    Ok(())
}
