pub mod jwt;
pub mod models;
pub mod password;
pub mod service;
pub mod store;

pub use jwt::{AdminClaims, JwtService};
pub use models::{Admin, AdminDto, LoginRequest, LoginResponse};
pub use service::AuthService;
pub use store::{AdminStore, MemoryAdminStore, PgAdminStore};
