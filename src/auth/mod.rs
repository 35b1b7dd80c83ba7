use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(username: String, is_admin: bool, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: username,
            is_admin,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Requester identity for the lifetime of one request, decoded from a
/// verified bearer token. Absent from request extensions when no valid
/// token was presented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            is_admin: claims.is_admin,
        }
    }
}

/// Sign a token for the given user
pub fn generate_token(
    username: &str,
    is_admin: bool,
    auth: &AuthConfig,
) -> Result<String, ApiError> {
    if auth.jwt_secret.is_empty() {
        tracing::error!("JWT secret not configured");
        return Err(ApiError::service_unavailable("Service misconfigured"));
    }

    let claims = Claims::new(username.to_string(), is_admin, auth.jwt_expiry_hours);
    let encoding_key = EncodingKey::from_secret(auth.jwt_secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Failed to generate token")
    })
}

// Authorization gates. Each is a pure function over the request's optional
// identity (plus a route param where relevant); handlers call one before
// touching storage. Public endpoints call none of them.

/// Gate: any authenticated user
pub fn require_logged_in(auth: Option<&AuthUser>) -> Result<&AuthUser, ApiError> {
    auth.ok_or_else(|| ApiError::unauthorized("Authentication required"))
}

/// Gate: authenticated admin
pub fn require_admin(auth: Option<&AuthUser>) -> Result<&AuthUser, ApiError> {
    let user = require_logged_in(auth)?;
    if user.is_admin {
        Ok(user)
    } else {
        Err(ApiError::forbidden("Admin access required"))
    }
}

/// Gate: the user named in the route, or any admin. The route param is only
/// compared once an identity is present.
pub fn require_self_or_admin<'a>(
    auth: Option<&'a AuthUser>,
    username: &str,
) -> Result<&'a AuthUser, ApiError> {
    let user = require_logged_in(auth)?;
    if user.is_admin || user.username == username {
        Ok(user)
    } else {
        Err(ApiError::forbidden("Admin or matching user required"))
    }
}
