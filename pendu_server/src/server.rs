use std::{rc::Rc, time::Duration};

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use pendu_engine::{
    db,
    permissions::PermissionPolicy,
    tokens::TokenIssuer,
    AuthApi,
    SqliteDatabase,
    UsersApi,
};

use crate::{
    api_doc::ApiDoc,
    config::ServerConfig,
    errors::ServerError,
    middleware::{BodyValidationFactory, JwtMiddlewareFactory},
    routes::{
        health,
        GetRegisterRoute,
        GetRegistersRoute,
        GetUserRoute,
        GetUsersRoute,
        LoginRoute,
        MeRoute,
        NewPasswordRoute,
        RegisterRoute,
        RejectRegisterRoute,
        RemovePushTokenRoute,
        SetPushTokenRoute,
        ValidateRegisterRoute,
        VerifyTokenRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    if config.migrate_on_start {
        db::run_migrations(db.pool()).await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    }
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let issuer = TokenIssuer::new(&config.auth.jwt_secret, config.auth.token_validity);
        let auth_api = AuthApi::new(db.clone(), issuer.clone());
        let users_api = UsersApi::new(db.clone());
        let policy = PermissionPolicy::default();
        let doc = Rc::new(ApiDoc::new().expect("API document is well-formed"));
        let json_config = web::JsonConfig::default()
            .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pendu::access_log"))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(users_api))
            .app_data(web::Data::new(policy))
            .app_data(web::Data::new(issuer.clone()))
            .app_data(json_config);
        // Admin registration management. Everything in here needs a token and a permission.
        let registers_scope = web::scope("/auth/registers")
            .wrap(JwtMiddlewareFactory::new(issuer.clone()))
            .service(GetRegistersRoute::<SqliteDatabase>::new())
            .service(ValidateRegisterRoute::<SqliteDatabase>::new())
            .service(RejectRegisterRoute::<SqliteDatabase>::new())
            .service(GetRegisterRoute::<SqliteDatabase>::new());
        let users_scope = web::scope("/users")
            .wrap(JwtMiddlewareFactory::new(issuer))
            .service(GetUsersRoute::<SqliteDatabase>::new())
            .service(MeRoute::<SqliteDatabase>::new())
            .service(SetPushTokenRoute::<SqliteDatabase>::new())
            .service(RemovePushTokenRoute::<SqliteDatabase>::new())
            .service(GetUserRoute::<SqliteDatabase>::new());
        app.service(health)
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(NewPasswordRoute::<SqliteDatabase>::new())
            .service(VerifyTokenRoute::<SqliteDatabase>::new())
            .service(registers_scope)
            .service(users_scope)
            .wrap(BodyValidationFactory::new(doc))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
