//! Shared infrastructure: the dispatch-site crawler, the in-memory cache and
//! the cron scheduler. Domain services depend on the traits here, never on
//! concrete HTTP or timer machinery.

pub mod cache;
pub mod crawler;
pub mod scheduler;

pub use cache::{CacheStats, MemoryCache};
pub use crawler::{CrawlOptions, Crawler, DaesinCrawler};
pub use scheduler::start_scheduler;
