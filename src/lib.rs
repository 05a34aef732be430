pub mod analyzers;
pub mod charts;
pub mod cleaner;
pub mod config;
pub mod error;
pub mod frame;
pub mod loader;
pub mod pipeline;
pub mod report;
pub mod schema;

pub use error::{AnalysisError, Result};
