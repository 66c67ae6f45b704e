pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::HarnessConfig;

pub use adapters::MemoryReporter;
pub use crate::core::client::ApiClient;
pub use domain::builder::DataBuilder;
pub use domain::model::{ApiMessage, Attachment, ExchangeReport, Pet, PetStatus, ResponseSnapshot, User};
pub use domain::ports::Reporter;
pub use utils::error::{HarnessError, Result};
