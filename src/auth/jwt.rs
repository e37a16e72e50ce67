use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthProvider, Session};
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub token_type: TokenType,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// HS256 access-token verification against a shared secret.
pub struct JwtAuthProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtAuthProvider {
    pub fn new(secret: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_issuer(&[issuer]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl AuthProvider for JwtAuthProvider {
    fn authenticate(&self, bearer_token: &str) -> AppResult<Session> {
        let token_data = decode::<Claims>(bearer_token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Bearer token rejected");
                AppError::Unauthorized
            })?;
        let claims = token_data.claims;

        if claims.token_type != TokenType::Access {
            return Err(AppError::Unauthorized);
        }

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp, 0).ok_or(AppError::Unauthorized)?;

        Ok(Session {
            user_id: claims.sub,
            email: if claims.email.is_empty() {
                None
            } else {
                Some(claims.email)
            },
            expires_at,
        })
    }
}
