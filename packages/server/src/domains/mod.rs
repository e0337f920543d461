pub mod auth;
pub mod migration;
pub mod routes;
