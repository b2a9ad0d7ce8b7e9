//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy.
//!
//! Handlers are generic over the storage backend, which actix-web's attribute macros cannot express, so the
//! `route!` macro generates the service factory for each handler instead.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use pendu_engine::{
    permissions::Permission,
    traits::UserManagement,
    AuthApi,
    RegisterAccount,
    UsersApi,
};
use serde_json::json;

use crate::{
    auth::AuthenticatedUser,
    data_objects::{LoginRequest, NewPasswordRequest, PushTokenRequest, TokenQuery},
    errors::ServerError,
};

#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($perms:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($perms),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("Received health check request");
    HttpResponse::Ok().body("ok\n")
}

//----------------------------------------------   Auth  ----------------------------------------------------
route!(login => Post "/auth/login" impl UserManagement);
/// Checks a login/password pair and returns the account together with a fresh access token.
pub async fn login<B: UserManagement>(
    body: web::Json<LoginRequest>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    trace!("Received login request for {:?}", body.login);
    let result = api.login(body.login.as_deref(), body.password.as_deref()).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(register => Post "/auth/register" impl UserManagement);
pub async fn register<B: UserManagement>(
    body: web::Json<RegisterAccount>,
    api: web::Data<UsersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user = api.register(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

route!(new_password => Post "/auth/newpassword" impl UserManagement);
pub async fn new_password<B: UserManagement>(
    body: web::Json<NewPasswordRequest>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let body = body.into_inner();
    let user =
        api.change_password(body.token.as_deref(), body.password1.as_deref(), body.password2.as_deref()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(verify_token => Get "/auth/verifyToken" impl UserManagement);
/// Reports whether a token is currently valid. Never fails; an absent token is simply not valid.
pub async fn verify_token<B: UserManagement>(
    query: web::Query<TokenQuery>,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let valid = query.into_inner().token.map(|t| api.verify_token(&t)).unwrap_or(false);
    Ok(HttpResponse::Ok().json(json!({ "valid": valid })))
}

//----------------------------------------------   Registers  ----------------------------------------------------
route!(get_registers => Get "" impl UserManagement where requires [Permission::GetRegisters]);
pub async fn get_registers<A: UserManagement>(
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let pending = api.pending_registrations().await?;
    Ok(HttpResponse::Ok().json(pending))
}

route!(get_register => Get "/{id}" impl UserManagement where requires [Permission::GetRegisters]);
pub async fn get_register<A: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let registration = api.pending_registration(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(registration))
}

route!(validate_register => Post "/{id}/validate" impl UserManagement where requires [Permission::ValidateRegister]);
pub async fn validate_register<A: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    api.approve_registration(id).await?;
    debug!("Registration {id} validated");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

route!(reject_register => Delete "/{id}" impl UserManagement where requires [Permission::ValidateRegister]);
pub async fn reject_register<A: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    api.reject_registration(id).await?;
    debug!("Registration {id} rejected");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(get_users => Get "" impl UserManagement where requires [Permission::GetUsers]);
pub async fn get_users<A: UserManagement>(api: web::Data<UsersApi<A>>) -> Result<HttpResponse, ServerError> {
    let users = api.users().await?;
    Ok(HttpResponse::Ok().json(users))
}

route!(me => Get "/me" impl UserManagement);
/// The caller's own account, as identified by the access token.
pub async fn me<B: UserManagement>(
    user: AuthenticatedUser,
    api: web::Data<UsersApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("GET me for {}", user.email_address);
    let account = api.user_by_email(&user.email_address).await?;
    Ok(HttpResponse::Ok().json(account))
}

route!(get_user => Get "/{id}" impl UserManagement where requires [Permission::GetUsers]);
pub async fn get_user<A: UserManagement>(
    path: web::Path<i64>,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let user = api.user_by_id(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user))
}

route!(set_push_token => Put "/push-token" impl UserManagement where requires [Permission::SetOwnToken]);
pub async fn set_push_token<A: UserManagement>(
    user: AuthenticatedUser,
    body: web::Json<PushTokenRequest>,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let token = body.into_inner().push_token.unwrap_or_default();
    api.set_push_token(&user.email_address, &token).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

route!(remove_push_token => Delete "/push-token" impl UserManagement where requires [Permission::DeleteOwnToken]);
pub async fn remove_push_token<A: UserManagement>(
    user: AuthenticatedUser,
    api: web::Data<UsersApi<A>>,
) -> Result<HttpResponse, ServerError> {
    api.remove_push_token(&user.email_address).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}
