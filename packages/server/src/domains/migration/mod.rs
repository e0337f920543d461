pub mod models;
pub mod runner;
pub mod store;

pub use models::{JobStatus, MigrationJob, MigrationJobDto};
pub use runner::{MigrationRunner, RunnerConfig};
pub use store::{JobStore, MemoryJobStore, PgJobStore};
