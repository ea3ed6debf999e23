use crate::core::errors::RoomsplitError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Audience the auth provider stamps on signed-in users' access tokens.
pub const TOKEN_AUDIENCE: &str = "authenticated";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // profile id
    pub aud: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
}

/// Verifies access tokens signed by the hosted auth provider with a shared HS256 secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_required_spec_claims(&["sub", "aud", "exp"]);
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Mints a token shaped like the provider's; used for local runs and tests.
    pub fn generate_token(&self, user_id: &str, ttl: Duration) -> Result<String, RoomsplitError> {
        let claims = Claims {
            sub: user_id.to_string(),
            aud: TOKEN_AUDIENCE.to_string(),
            role: TOKEN_AUDIENCE.to_string(),
            email: None,
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RoomsplitError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, RoomsplitError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| RoomsplitError::Unauthenticated(format!("Invalid token: {}", e)))?
            .claims;
        if claims.sub.trim().is_empty() {
            return Err(RoomsplitError::Unauthenticated("Token has no subject".to_string()));
        }
        Ok(claims)
    }
}
