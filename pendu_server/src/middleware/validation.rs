//! Request-body validation middleware.
//!
//! For every operation listed in the [`ApiDoc`], the raw payload is buffered, parsed as JSON and validated
//! against the operation's declared body schema. The validated (and filtered) body is then re-serialized and
//! replayed downstream, so handlers only ever deserialize fields the API document declares. Routes without an
//! entry in the document pass through untouched.

use std::rc::Rc;

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use log::debug;
use pendu_engine::schema::validate_request_body;
use serde_json::{Map, Value};

use crate::{api_doc::ApiDoc, errors::ServerError};

pub struct BodyValidationFactory {
    doc: Rc<ApiDoc>,
}

impl BodyValidationFactory {
    pub fn new(doc: Rc<ApiDoc>) -> Self {
        Self { doc }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BodyValidationFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = BodyValidationService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BodyValidationService { doc: Rc::clone(&self.doc), service: Rc::new(service) }))
    }
}

pub struct BodyValidationService<S> {
    doc: Rc<ApiDoc>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for BodyValidationService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let doc = Rc::clone(&self.doc);
        Box::pin(async move {
            let method = req.method().clone();
            let path = req.path().to_string();
            let Some(operation) = doc.operation(&method, &path) else {
                return service.call(req).await;
            };
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                debug!("Failed to buffer request body for {method} {path}: {e}");
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            let mut body = if data.is_empty() {
                Value::Object(Map::new())
            } else {
                serde_json::from_slice::<Value>(&data)
                    .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?
            };
            validate_request_body(&mut body, operation, doc.resolver()).map_err(|e| {
                debug!("Body validation failed for {method} {path}: {e}");
                ServerError::from(e)
            })?;
            let buf = web::Bytes::from(
                serde_json::to_vec(&body).map_err(|e| ServerError::Unspecified(e.to_string()))?,
            );
            req.set_payload(bytes_to_payload(buf));
            service.call(req).await
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
