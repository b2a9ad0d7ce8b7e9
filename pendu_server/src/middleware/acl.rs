//! Access control middleware.
//!
//! This middleware can be placed on any route or service. It reads the JWT claims that the JWT middleware
//! stored in the request extensions and checks them against the route's required permissions using the
//! [`PermissionPolicy`] shared through the application data. A missing identity or an unmapped role is an
//! authentication failure; a held identity without the required capability is a permission failure.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    web,
    Error,
    HttpMessage,
};
use futures::future::LocalBoxFuture;
use log::warn;
use pendu_engine::{permissions::{Permission, PermissionPolicy}, tokens::JwtClaims};

use crate::errors::ServerError;

pub struct AclMiddlewareFactory {
    required_permissions: Vec<Permission>,
}

impl AclMiddlewareFactory {
    pub fn new(required_permissions: &[Permission]) -> Self {
        AclMiddlewareFactory { required_permissions: required_permissions.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AclMiddlewareService {
            required_permissions: self.required_permissions.clone(),
            service: Rc::new(service),
        }))
    }
}

pub struct AclMiddlewareService<S> {
    required_permissions: Vec<Permission>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required = self.required_permissions.clone();
        Box::pin(async move {
            let claims = req.extensions().get::<JwtClaims>().cloned().ok_or_else(|| {
                warn!("No JWT claims found in request extensions");
                ErrorInternalServerError("No JWT claims found in request extensions")
            })?;
            let policy = req.app_data::<web::Data<PermissionPolicy>>().cloned().ok_or_else(|| {
                warn!("No permission policy registered on the application");
                ErrorInternalServerError("No permission policy registered on the application")
            })?;
            policy.check(&claims.email_address, claims.role, &required).map_err(ServerError::ApiError)?;
            service.call(req).await
        })
    }
}
