pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};

pub use app::pipelines::FilePipeline;
pub use core::engine::{RunSummary, ValidationEngine};
pub use core::scheduler::{BatchScheduler, CancelHandle};
pub use core::strategy::ValidationStrategy;
pub use utils::error::{Result, ValidatorError};
