//! Bearer-token verification.
//!
//! Token issuance lives in a separate identity service; this module only
//! validates inbound HS256 tokens and turns them into an [`AuthUser`]
//! principal that handlers pass explicitly into services.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::models::error::ErrorResponse;
use crate::AppState;

/// Verification state shared through the router
#[derive(Clone)]
pub struct JwtContext {
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtContext {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    pub exp: usize,
}

/// Authenticated principal resolved from the bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub email: String,
    pub is_admin: bool,
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::with_message("Unauthorized", message)),
    )
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| unauthorized("Missing Authorization header"))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| unauthorized("Expected a Bearer token"))?;

        let claims = state.jwt.verify(token).map_err(|e| {
            tracing::debug!("Token verification failed: {}", e);
            unauthorized("Invalid or expired token")
        })?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            is_admin: claims.admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn verify_accepts_valid_token() {
        let ctx = JwtContext::new("test-secret");
        let claims = Claims {
            sub: 7,
            email: "user@example.com".to_string(),
            admin: false,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };

        let verified = ctx.verify(&token_for(&claims, "test-secret")).unwrap();
        assert_eq!(verified.sub, 7);
        assert_eq!(verified.email, "user@example.com");
        assert!(!verified.admin);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let ctx = JwtContext::new("test-secret");
        let claims = Claims {
            sub: 7,
            email: "user@example.com".to_string(),
            admin: false,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };

        assert!(ctx.verify(&token_for(&claims, "other-secret")).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let ctx = JwtContext::new("test-secret");
        let claims = Claims {
            sub: 7,
            email: "user@example.com".to_string(),
            admin: false,
            exp: (chrono::Utc::now().timestamp() - 3600) as usize,
        };

        assert!(ctx.verify(&token_for(&claims, "test-secret")).is_err());
    }
}
