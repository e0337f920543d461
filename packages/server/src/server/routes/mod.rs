// HTTP routes
pub mod auth;
pub mod health;
pub mod kakao;
pub mod migration;
pub mod routes_api;
pub mod sync;

pub use auth::*;
pub use health::*;
pub use kakao::*;
pub use migration::*;
pub use routes_api::*;
pub use sync::*;
