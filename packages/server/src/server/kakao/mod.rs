//! Kakao skill webhook support: request/response types for the v2 skill
//! payload, the utterance parser and the response formatter.

pub mod formatter;
pub mod parser;
pub mod types;

pub use parser::Command;
pub use types::{SkillPayload, SkillResponse};
