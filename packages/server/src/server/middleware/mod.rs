pub mod admin_auth;
pub mod api_key;

pub use admin_auth::admin_auth_middleware;
pub use api_key::api_key_middleware;
