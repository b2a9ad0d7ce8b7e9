use std::rc::Rc;

use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::Duration;
use log::*;
use pendu_common::Secret;
use pendu_engine::{
    db_types::{AccountStatus, Role},
    tokens::TokenIssuer,
    AuthApi,
    UsersApi,
};
use serde_json::{json, Value};

use super::mocks::{user_with_password, MockUserStore};
use crate::{
    api_doc::ApiDoc,
    errors::ServerError,
    middleware::BodyValidationFactory,
    routes::{LoginRoute, NewPasswordRoute, RegisterRoute, VerifyTokenRoute},
};

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&Secret::new("endpoint-test-secret".to_string()), Duration::hours(2))
}

// The auth routes split across two API structs, so each test hands its expectations to the mock backing the
// API its route uses and leaves the other mock empty.
fn configure_app(auth_store: MockUserStore, users_store: MockUserStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        cfg.app_data(web::Data::new(AuthApi::new(auth_store, issuer())))
            .app_data(web::Data::new(UsersApi::new(users_store)))
            .app_data(json_config)
            .service(LoginRoute::<MockUserStore>::new())
            .service(RegisterRoute::<MockUserStore>::new())
            .service(NewPasswordRoute::<MockUserStore>::new())
            .service(VerifyTokenRoute::<MockUserStore>::new());
    }
}

async fn call_json(
    auth_store: MockUserStore,
    users_store: MockUserStore,
    req: TestRequest,
) -> (StatusCode, Value) {
    let _ = env_logger::try_init();
    let doc = Rc::new(ApiDoc::new().unwrap());
    let app =
        App::new().wrap(BodyValidationFactory::new(doc)).configure(configure_app(auth_store, users_store));
    let app = test::init_service(app).await;
    // Errors surfaced by middleware come back as `Err` here; a real `HttpServer` renders them through
    // `ResponseError`, so mirror that conversion.
    let res = match test::try_call_service(&app, req.to_request()).await {
        Ok(res) => res.into_parts().1.map_into_boxed_body(),
        Err(err) => actix_web::HttpResponse::from_error(err),
    };
    let status = res.status();
    let bytes = res.into_body().try_into_bytes().unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    debug!("Response ({status}): {body}");
    (status, body)
}

#[actix_web::test]
async fn login_with_valid_credentials() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));
    store.expect_touch_last_login().returning(|_| Ok(()));

    let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "login": "alice@example.com", "password": "hunter22" }));
    let (status, body) = call_json(store, MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email_address"], "alice@example.com");
    assert!(body["user"].get("password").is_none(), "password must not leak: {body}");
    let token = body["token"].as_str().unwrap();
    let claims = issuer().decode(token).unwrap();
    assert_eq!(claims.email_address, "alice@example.com");
}

#[actix_web::test]
async fn login_with_wrong_password() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));

    let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "login": "alice@example.com", "password": "nope" }));
    let (status, body) = call_json(store, MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["statusCode"], 401);
    assert_eq!(body["errorCode"], 40103);
    assert_eq!(body["errorMessage"], "Authentication error: Wrong credentials");
}

#[actix_web::test]
async fn login_with_pending_account() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Pending);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));

    let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "login": "alice@example.com", "password": "hunter22" }));
    let (status, body) = call_json(store, MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMessage"], "Authentication error: account must be validated.");
}

#[actix_web::test]
async fn login_without_a_login_field() {
    let req = TestRequest::post().uri("/auth/login").set_json(json!({ "password": "hunter22" }));
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], 40103);
    assert_eq!(body["errorMessage"], "Authentication error: Login is missing");
}

#[actix_web::test]
async fn login_with_undeclared_fields_is_schema_checked() {
    let req = TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "login": "alice@example.com", "password": "x", "remember": true }));
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorCode"], 40005);
    assert_eq!(body["errorDetails"]["invalidParameters"], json!(["remember"]));
    assert!(body["errorMessage"].as_str().unwrap().starts_with("Bad request: "));
}

#[actix_web::test]
async fn register_creates_a_pending_account() {
    let mut store = MockUserStore::new();
    store.expect_fetch_user_by_email().returning(|_| Ok(None));
    store.expect_insert_user().returning(|new_user| {
        let mut user =
            user_with_password(&new_user.email_address, "irrelevant", Role::SimpleUser, AccountStatus::Pending);
        user.first_name = new_user.first_name;
        user.password = new_user.password;
        Ok(user)
    });

    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "first_name": "Bob",
        "last_name": "Doe",
        "email_address": "bob@example.com",
        "password1": "hunter22",
        "password2": "hunter22"
    }));
    let (status, body) = call_json(MockUserStore::new(), store, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["role"], "SimpleUser");
    assert_eq!(body["first_name"], "Bob");
}

#[actix_web::test]
async fn register_with_mismatched_passwords() {
    let mut store = MockUserStore::new();
    store.expect_fetch_user_by_email().returning(|_| Ok(None));

    let req = TestRequest::post().uri("/auth/register").set_json(json!({
        "email_address": "bob@example.com",
        "password1": "hunter22",
        "password2": "different"
    }));
    let (status, body) = call_json(MockUserStore::new(), store, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMessage"], "Authentication error: Passwords are differents");
}

#[actix_web::test]
async fn new_password_requires_all_fields() {
    let req = TestRequest::post().uri("/auth/newpassword").set_json(json!({ "password1": "newpassword" }));
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMessage"], "Authentication error: Missing information for change password");
}

#[actix_web::test]
async fn verify_token_reports_validity() {
    let token = issuer().issue("alice@example.com", Role::SimpleUser).unwrap();
    let req = TestRequest::get().uri(&format!("/auth/verifyToken?token={token}"));
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let req = TestRequest::get().uri("/auth/verifyToken?token=not.a.jwt");
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);

    let req = TestRequest::get().uri("/auth/verifyToken");
    let (status, body) = call_json(MockUserStore::new(), MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], false);
}
