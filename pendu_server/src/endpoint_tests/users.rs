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
    permissions::PermissionPolicy,
    tokens::TokenIssuer,
    UsersApi,
};
use serde_json::{json, Value};

use super::mocks::{user_with_password, MockUserStore};
use crate::{
    errors::ServerError,
    middleware::JwtMiddlewareFactory,
    routes::{
        GetRegistersRoute,
        GetUserRoute,
        GetUsersRoute,
        MeRoute,
        RemovePushTokenRoute,
        SetPushTokenRoute,
        ValidateRegisterRoute,
    },
};

fn issuer() -> TokenIssuer {
    TokenIssuer::new(&Secret::new("endpoint-test-secret".to_string()), Duration::hours(2))
}

fn bearer(email: &str, role: Role) -> (&'static str, String) {
    let token = issuer().issue(email, role).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

// Mirrors the protected scopes from `server.rs`, backed by the mock store.
fn configure_app(store: MockUserStore) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        let registers_scope = web::scope("/auth/registers")
            .wrap(JwtMiddlewareFactory::new(issuer()))
            .service(GetRegistersRoute::<MockUserStore>::new())
            .service(ValidateRegisterRoute::<MockUserStore>::new());
        let users_scope = web::scope("/users")
            .wrap(JwtMiddlewareFactory::new(issuer()))
            .service(GetUsersRoute::<MockUserStore>::new())
            .service(MeRoute::<MockUserStore>::new())
            .service(SetPushTokenRoute::<MockUserStore>::new())
            .service(RemovePushTokenRoute::<MockUserStore>::new())
            .service(GetUserRoute::<MockUserStore>::new());
        cfg.app_data(web::Data::new(UsersApi::new(store)))
            .app_data(web::Data::new(PermissionPolicy::default()))
            .app_data(json_config)
            .service(registers_scope)
            .service(users_scope);
    }
}

async fn call(store: MockUserStore, req: TestRequest) -> (StatusCode, Value) {
    let _ = env_logger::try_init();
    let app = App::new().configure(configure_app(store));
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
async fn me_returns_the_callers_account() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));

    let req = TestRequest::get().uri("/users/me").insert_header(bearer("alice@example.com", Role::SimpleUser));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email_address"], "alice@example.com");
}

#[actix_web::test]
async fn users_can_be_fetched_by_id() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_id().returning(move |id, _| {
        let mut user = user.clone();
        user.id = id;
        Ok(Some(user))
    });

    let req = TestRequest::get().uri("/users/7").insert_header(bearer("bob@example.com", Role::SimpleUser));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 7);
    assert_eq!(body["email_address"], "alice@example.com");
    assert!(body.get("password").is_none(), "password must not leak: {body}");
}

#[actix_web::test]
async fn fetching_a_missing_user_by_id_is_not_found() {
    let mut store = MockUserStore::new();
    store.expect_fetch_user_by_id().returning(|_, _| Ok(None));

    let req = TestRequest::get().uri("/users/999").insert_header(bearer("bob@example.com", Role::SimpleUser));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], 40401);
    assert_eq!(body["errorMessage"], "Can't find the requested information: Non existing user");
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let req = TestRequest::get().uri("/users/me");
    let (status, body) = call(MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], 40105);
    assert_eq!(body["errorMessage"], "Authentication error: Invalid token");

    let req = TestRequest::get().uri("/users/me").insert_header(("Authorization", "Bearer not.a.token"));
    let (status, body) = call(MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorCode"], 40105);
}

#[actix_web::test]
async fn simple_users_cannot_manage_registrations() {
    let req = TestRequest::get()
        .uri("/auth/registers")
        .insert_header(bearer("bob@example.com", Role::SimpleUser));
    let (status, body) = call(MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["errorCode"], 40302);
    assert_eq!(
        body["errorMessage"],
        "You are not authorized to access this information: Insufficient permissions"
    );
}

#[actix_web::test]
async fn administrators_can_list_registrations() {
    let mut store = MockUserStore::new();
    let pending = user_with_password("new@example.com", "hunter22", Role::SimpleUser, AccountStatus::Pending);
    store.expect_fetch_users_by_status().returning(move |_| Ok(vec![pending.clone()]));

    let req = TestRequest::get()
        .uri("/auth/registers")
        .insert_header(bearer("admin@example.com", Role::Administrator));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["email_address"], "new@example.com");
}

#[actix_web::test]
async fn validating_a_missing_registration_is_not_found() {
    let mut store = MockUserStore::new();
    store.expect_update_status().returning(|_, _, _| Ok(0));

    let req = TestRequest::post()
        .uri("/auth/registers/42/validate")
        .insert_header(bearer("admin@example.com", Role::Administrator));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errorCode"], 40401);
    assert_eq!(body["errorMessage"], "Can't find the requested information: Non existing register");
}

#[actix_web::test]
async fn push_tokens_are_cleared_before_being_set() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));
    store.expect_clear_push_token().times(1).returning(|_| Ok(1));
    store.expect_set_push_token().times(1).returning(|_, _| Ok(()));

    let req = TestRequest::put()
        .uri("/users/push-token")
        .insert_header(bearer("alice@example.com", Role::SimpleUser))
        .set_json(json!({ "push_token": "tok.en.one" }));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn malformed_push_tokens_are_rejected() {
    let req = TestRequest::put()
        .uri("/users/push-token")
        .insert_header(bearer("alice@example.com", Role::SimpleUser))
        .set_json(json!({ "push_token": "nonsense" }));
    let (status, body) = call(MockUserStore::new(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMessage"], "Authentication error: Invalid push token");
}

#[actix_web::test]
async fn removing_a_push_token_succeeds_without_one() {
    let mut store = MockUserStore::new();
    let user = user_with_password("alice@example.com", "hunter22", Role::SimpleUser, AccountStatus::Valid);
    store.expect_fetch_user_by_email().returning(move |_| Ok(Some(user.clone())));

    let req = TestRequest::delete()
        .uri("/users/push-token")
        .insert_header(bearer("alice@example.com", Role::SimpleUser));
    let (status, body) = call(store, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
