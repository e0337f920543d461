pub mod models;
pub mod search;
pub mod store;
pub mod sync;

pub use models::*;
pub use search::SearchService;
pub use store::{MemoryRouteStore, PgRouteStore, RouteStore};
pub use sync::{SyncResult, SyncService};
