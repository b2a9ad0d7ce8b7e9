use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use pendu_engine::{schema::SchemaError, AuthApiError};
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Some specified parameters aren't specified in the schema document")]
    SchemaValidation(Vec<String>),
    #[error("{0}")]
    ApiError(#[from] AuthApiError),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ServerError {
    /// The stable numeric code clients switch on. Codes extend the HTTP status with two extra digits.
    pub fn error_code(&self) -> u32 {
        match self {
            Self::ApiError(AuthApiError::WrongCredential(_)) => 40103,
            Self::ApiError(AuthApiError::TokenCreation(_)) => 40104,
            Self::ApiError(AuthApiError::JwtValidation(_)) => 40105,
            Self::ApiError(AuthApiError::WrongPermission(_)) => 40302,
            Self::ApiError(AuthApiError::NotFound(_)) => 40401,
            Self::SchemaValidation(_) => 40005,
            Self::InvalidRequestBody(_) => 40002,
            _ => 50001,
        }
    }

    fn error_details(&self) -> Value {
        match self {
            Self::SchemaValidation(params) => json!({ "invalidParameters": params }),
            _ => json!({}),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::SchemaValidation(_) => StatusCode::BAD_REQUEST,
            Self::ApiError(e) => match e {
                AuthApiError::WrongCredential(_) => StatusCode::UNAUTHORIZED,
                AuthApiError::TokenCreation(_) => StatusCode::UNAUTHORIZED,
                AuthApiError::JwtValidation(_) => StatusCode::UNAUTHORIZED,
                AuthApiError::WrongPermission(_) => StatusCode::FORBIDDEN,
                AuthApiError::NotFound(_) => StatusCode::NOT_FOUND,
                AuthApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let prefix = match status {
            StatusCode::BAD_REQUEST => "Bad request: ",
            StatusCode::UNAUTHORIZED => "Authentication error: ",
            StatusCode::FORBIDDEN => "You are not authorized to access this information: ",
            StatusCode::NOT_FOUND => "Can't find the requested information: ",
            _ => "",
        };
        let body = json!({
            "statusCode": status.as_u16(),
            "errorCode": self.error_code(),
            "errorMessage": format!("{prefix}{self}"),
            "errorDetails": self.error_details(),
        });
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<SchemaError> for ServerError {
    fn from(e: SchemaError) -> Self {
        match e {
            SchemaError::UnknownParameters(params) | SchemaError::MissingParameters(params) => {
                Self::SchemaValidation(params)
            },
            // Reference problems are boot-time defects in the API document, not client errors.
            other => Self::BackendError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn error_codes_extend_status_codes() {
        let err = ServerError::ApiError(AuthApiError::wrong_credential("Wrong credentials"));
        assert_eq!(err.status_code().as_u16(), 401);
        assert_eq!(err.error_code(), 40103);

        let err = ServerError::ApiError(AuthApiError::wrong_permission("Insufficient permissions"));
        assert_eq!(err.status_code().as_u16(), 403);
        assert_eq!(err.error_code(), 40302);

        let err = ServerError::SchemaValidation(vec!["b.d".to_string()]);
        assert_eq!(err.status_code().as_u16(), 400);
        assert_eq!(err.error_code(), 40005);

        let err = ServerError::ApiError(AuthApiError::not_found("Non existing user"));
        assert_eq!(err.status_code().as_u16(), 404);
        assert_eq!(err.error_code(), 40401);
    }

    #[test]
    fn error_body_carries_the_fixed_shape() {
        use actix_web::body::MessageBody;

        let err = ServerError::SchemaValidation(vec!["b.d".to_string()]);
        let res = err.error_response();
        let bytes = res.into_body().try_into_bytes().unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["errorCode"], 40005);
        assert_eq!(body["errorDetails"]["invalidParameters"][0], "b.d");
        assert!(body["errorMessage"].as_str().unwrap().starts_with("Bad request: "));
    }
}
