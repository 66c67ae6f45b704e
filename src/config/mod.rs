#[cfg(feature = "cli")]
pub mod cli;
pub mod harness;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use harness::HarnessConfig;
