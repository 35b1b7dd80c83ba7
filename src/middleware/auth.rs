use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::auth::{AuthUser, Claims};
use crate::state::AppState;

/// Bearer-token middleware that attaches the requester's identity when a
/// valid token is presented.
///
/// This never rejects a request: a missing, malformed, expired or
/// badly-signed token just leaves the identity extension unset, and the
/// route's own authorization gate decides what that means.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_identity(request.headers(), &state.config.auth.jwt_secret) {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

/// Verify and decode the Authorization header into an identity, if possible
pub fn resolve_identity(headers: &HeaderMap, secret: &str) -> Option<AuthUser> {
    let token = bearer_token(headers)?;

    if secret.is_empty() {
        tracing::warn!("JWT secret not configured; treating request as anonymous");
        return None;
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    match decode::<Claims>(&token, &decoding_key, &validation) {
        Ok(data) => Some(AuthUser::from(data.claims)),
        Err(e) => {
            tracing::debug!("Ignoring invalid bearer token: {}", e);
            None
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get("authorization")?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-secret";

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {}", token).parse().unwrap());
        headers
    }

    #[test]
    fn absent_credential_yields_no_identity() {
        assert_eq!(resolve_identity(&HeaderMap::new(), SECRET), None);
    }

    #[test]
    fn valid_token_yields_claims_identity() {
        let claims = Claims::new("aliya".to_string(), true, 1);
        let headers = headers_with_token(&sign(&claims, SECRET));

        let identity = resolve_identity(&headers, SECRET).unwrap();
        assert_eq!(identity.username, "aliya");
        assert!(identity.is_admin);
    }

    #[test]
    fn wrong_signature_yields_no_identity() {
        let claims = Claims::new("aliya".to_string(), false, 1);
        let headers = headers_with_token(&sign(&claims, "some-other-secret"));

        assert_eq!(resolve_identity(&headers, SECRET), None);
    }

    #[test]
    fn expired_token_yields_no_identity() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "aliya".to_string(),
            is_admin: false,
            exp: now - 3600,
            iat: now - 7200,
        };
        let headers = headers_with_token(&sign(&claims, SECRET));

        assert_eq!(resolve_identity(&headers, SECRET), None);
    }

    #[test]
    fn malformed_header_yields_no_identity() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Token abc".parse().unwrap());
        assert_eq!(resolve_identity(&headers, SECRET), None);

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(resolve_identity(&headers, SECRET), None);

        headers.insert("authorization", "Bearer not.a.jwt".parse().unwrap());
        assert_eq!(resolve_identity(&headers, SECRET), None);
    }
}
