// Common types shared across the application

pub mod date;
pub mod error;

pub use date::{SearchDate, YearMonth};
pub use error::DomainError;
