use crate::utils::error::{HarnessError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://petstore.swagger.io/v2";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

pub const ENV_BASE_URL: &str = "API_BASE_URL";
pub const ENV_TOKEN: &str = "API_TOKEN";
pub const ENV_TIMEOUT_SECONDS: &str = "API_TIMEOUT_SECONDS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub user_agent: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            user_agent: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults overridden by whatever `API_*` variables are set.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Load a TOML file, expanding `${VAR}` references first.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content, |key| std::env::var(key).ok())?;

        toml::from_str(&processed).map_err(|e| HarnessError::Config {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Apply environment overrides read through `lookup`. Empty values are
    /// treated as unset.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Some(token) = lookup(ENV_TOKEN) {
            self.token = Some(token);
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECONDS) {
            self.timeout_seconds =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| HarnessError::InvalidConfigValue {
                        field: ENV_TIMEOUT_SECONDS.to_string(),
                        value: timeout.clone(),
                        reason: "expected a whole number of seconds".to_string(),
                    })?;
        }

        Ok(self)
    }
}

impl Validate for HarnessConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("base_url", &self.base_url)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 600)?;
        if let Some(token) = &self.token {
            validation::validate_non_empty_string("token", token)?;
        }
        Ok(())
    }
}

fn substitute_env_vars<F>(content: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarnessError::Config {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
