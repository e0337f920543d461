// Freight dispatch route bot - API core
//
// Scrapes the Daesin dispatch site on a schedule, stores route/car/fare
// records, and answers lookups over a REST API and a Kakao skill webhook.
// Admins can start a historical migration job that backfills a date range
// day by day (see domains/migration).

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::Config;
