pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::storage::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use crate::core::{etl::TrendEngine, pipeline::TrendPipeline};
pub use utils::error::{Result, TrendError};
