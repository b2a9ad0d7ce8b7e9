mod auth;
mod mocks;
mod users;
