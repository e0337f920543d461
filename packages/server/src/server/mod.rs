// HTTP server setup (Axum + Kakao webhook)
pub mod app;
pub mod kakao;
pub mod middleware;
pub mod routes;

pub use app::*;
