//! # Pendu server
//!
//! This crate hosts the HTTP surface of the Pendu backend. It is responsible for:
//! * Validating every request body against the API document before a handler sees it.
//! * Authenticating callers via Bearer JWTs and enforcing per-route permissions.
//! * Translating engine errors into the fixed JSON error body the clients expect.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! Public: `/health`, `POST /auth/login`, `POST /auth/register`, `POST /auth/newpassword`,
//! `GET /auth/verifyToken`. Everything under `/auth/registers` and `/users` requires a valid access token and
//! the permission attached to the route.

pub mod api_doc;
pub mod auth;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
