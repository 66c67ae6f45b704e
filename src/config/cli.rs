use crate::config::harness::HarnessConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "petstore-smoke")]
#[command(about = "Run the pet and user lifecycle scenarios against a Petstore API")]
pub struct CliConfig {
    #[arg(long, help = "TOML file with harness settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Base URL of the API [env: API_BASE_URL] [default: https://petstore.swagger.io/v2]")]
    pub base_url: Option<String>,

    #[arg(long, help = "Bearer token sent with every request [env: API_TOKEN]")]
    pub token: Option<String>,

    #[arg(long, help = "Request timeout in seconds [env: API_TIMEOUT_SECONDS]")]
    pub timeout_seconds: Option<u64>,

    #[arg(long, help = "Only run the pet lifecycle")]
    pub pets_only: bool,

    #[arg(long, help = "Emit JSON log lines")]
    pub json_logs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Resolve the effective configuration: defaults, then the config file,
    /// then environment variables, then command-line flags.
    pub fn resolve(&self) -> Result<HarnessConfig> {
        self.resolve_with_env(|key| std::env::var(key).ok())
    }

    pub fn resolve_with_env<F>(&self, lookup: F) -> Result<HarnessConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = match &self.config {
            Some(path) => HarnessConfig::from_file(path)?,
            None => HarnessConfig::default(),
        };

        let mut config = base.with_env_overrides(lookup)?;

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(token) = &self.token {
            config.token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }

        tracing::debug!(
            base_url = %config.base_url,
            timeout_seconds = config.timeout_seconds,
            token_set = config.token.is_some(),
            "Resolved harness configuration"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn flags_override_env_and_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://file.example/v2\"\ntimeout_seconds = 12").unwrap();

        let cli = CliConfig::parse_from([
            "petstore-smoke",
            "--config",
            file.path().to_str().unwrap(),
            "--token",
            "from-flag",
        ]);

        let config = cli
            .resolve_with_env(|key| match key {
                "API_BASE_URL" => Some("http://env.example/v2".to_string()),
                "API_TOKEN" => Some("from-env".to_string()),
                _ => None,
            })
            .unwrap();

        assert_eq!(config.base_url, "http://env.example/v2");
        assert_eq!(config.token.as_deref(), Some("from-flag"));
        assert_eq!(config.timeout_seconds, 12);
    }

    #[test]
    fn no_sources_yields_defaults() {
        let cli = CliConfig::parse_from(["petstore-smoke"]);
        let config = cli.resolve_with_env(|_| None).unwrap();
        assert_eq!(config, HarnessConfig::default());
    }
}
