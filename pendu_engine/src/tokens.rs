//! Access-token codec.
//!
//! Tokens are HS256 JWTs over `{email_address, role, exp}` with a fixed expiration window. Verifying a token is
//! a pure cryptographic check plus the expiry comparison; it never touches the data store. Possession of a
//! valid token is necessary but not sufficient for authorization: permission enforcement is a separate step
//! keyed on the `role` claim (see [`crate::permissions`]).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use pendu_common::Secret;
use serde::{Deserialize, Serialize};

use crate::{api::errors::AuthApiError, db_types::Role};

pub const DEFAULT_TOKEN_VALIDITY_HOURS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub email_address: String,
    pub role: Role,
    pub exp: i64,
}

/// Issues and verifies access tokens with a single symmetric secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &Secret<String>, validity: Duration) -> Self {
        let bytes = secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validity,
        }
    }

    /// Issue a signed token over the user's email address and role.
    ///
    /// This method does NOT check that the identity is legitimate; callers must have verified the credential
    /// before asking for a token.
    pub fn issue(&self, email_address: &str, role: Role) -> Result<String, AuthApiError> {
        if email_address.is_empty() {
            return Err(AuthApiError::TokenCreation("Missing information for the token creation".to_string()));
        }
        let claims = JwtClaims {
            email_address: email_address.to_string(),
            role,
            exp: (Utc::now() + self.validity).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthApiError::TokenCreation(e.to_string()))?;
        Ok(token)
    }

    /// Verify the signature and expiry of a token and return its claims.
    pub fn decode(&self, token: &str) -> Result<JwtClaims, AuthApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token verification failed: {e}");
            AuthApiError::JwtValidation("Invalid token".to_string())
        })?;
        Ok(data.claims)
    }

    /// Boolean form of [`decode`](Self::decode) for the verifyToken endpoint. Never errors.
    pub fn verify(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }
}
