pub mod api;
pub mod config;
pub mod error;
pub mod export;
pub mod kb;
pub mod models;
pub mod rollup;
pub mod rules;
pub mod service;

pub use config::AppConfig;
pub use error::{MatcherError, Result};
pub use kb::KbIndex;
pub use rules::MatchingRules;
pub use service::MatchingEngine;
