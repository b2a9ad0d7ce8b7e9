//! Identity extraction for handlers.
//!
//! The JWT middleware verifies the Bearer token and stores the claims in the request extensions; handlers
//! declare an [`AuthenticatedUser`] argument to receive them. Requesting an identity on a route that is not
//! behind the JWT middleware fails the request rather than panicking.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use pendu_engine::{db_types::Role, tokens::JwtClaims, AuthApiError};

use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub email_address: String,
    pub role: Role,
}

impl From<JwtClaims> for AuthenticatedUser {
    fn from(claims: JwtClaims) -> Self {
        Self { email_address: claims.email_address, role: claims.role }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .extensions()
            .get::<JwtClaims>()
            .cloned()
            .map(AuthenticatedUser::from)
            .ok_or_else(|| ServerError::ApiError(AuthApiError::jwt_validation("Invalid token")));
        ready(user)
    }
}
