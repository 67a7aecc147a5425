pub mod aggregator;
pub mod engine;
pub mod extractor;
pub mod progress;
pub mod report;
pub mod scheduler;
pub mod strategy;

pub use crate::domain::model::{Address, AddressList, Progress, ValidationResult, Verdict};
pub use crate::domain::ports::{Classifier, ConfigProvider, Pipeline, ProgressSink, Storage};
pub use crate::utils::error::Result;
