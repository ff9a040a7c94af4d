/*
[INPUT]:  Optional YAML configuration file and AEVO_* environment variables
[OUTPUT]: Parsed CLI configuration and adapter credentials
[POS]:    Configuration layer - credential setup
[UPDATE]: When adding new configuration options
*/

use std::fmt;
use std::path::Path;

use aevo_adapter::{Credentials, Environment};
use anyhow::{Context, Result, bail};
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// Prefix of the environment variables layered over the file
pub const ENV_PREFIX: &str = "AEVO";

/// Account and environment settings for the CLI
///
/// Keys come from the Aevo UI; nothing is written back.
#[derive(Clone, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_environment")]
    pub environment: Environment,
    #[serde(default)]
    pub signing_key: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Only needed for withdrawals
    #[serde(default)]
    pub wallet_private_key: Option<String>,
}

impl CliConfig {
    /// Load `path` (if given) then override with `AEVO_*` variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_sources(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    pub(crate) fn from_sources(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            let path_str = path.to_str().context("config path must be valid utf-8")?;
            builder = builder.add_source(File::new(path_str, FileFormat::Yaml));
        }

        builder
            .add_source(env.try_parsing(false))
            .build()
            .context("read configuration")?
            .try_deserialize()
            .context("parse configuration")
    }

    /// Whether REST private endpoints and WebSocket auth are usable
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        if self.signing_key.is_empty() {
            bail!("signing_key is not set (config file or {ENV_PREFIX}_SIGNING_KEY)");
        }
        if self.wallet_address.is_empty() {
            bail!("wallet_address is not set (config file or {ENV_PREFIX}_WALLET_ADDRESS)");
        }

        let credentials = Credentials::new(
            &self.signing_key,
            &self.wallet_address,
            self.api_key.clone(),
            self.api_secret.clone(),
            &self.environment.to_string(),
        )
        .context("invalid credentials")?;

        match &self.wallet_private_key {
            Some(key) if !key.is_empty() => credentials
                .with_wallet_private_key(key)
                .context("invalid wallet_private_key"),
            _ => Ok(credentials),
        }
    }
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("environment", &self.environment)
            .field("wallet_address", &self.wallet_address)
            .field("has_signing_key", &!self.signing_key.is_empty())
            .field("has_api_key", &self.has_api_key())
            .field("has_wallet_private_key", &self.wallet_private_key.is_some())
            .finish()
    }
}

fn default_environment() -> Environment {
    Environment::Testnet
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        config::Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("aevo-cli-{}-{}.yaml", name, std::process::id()));
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let config = CliConfig::from_sources(None, env(&[])).expect("config");
        assert_eq!(config.environment, Environment::Testnet);
        assert!(!config.has_api_key());
        assert!(config.credentials().is_err());
    }

    #[test]
    fn test_environment_variables() {
        let config = CliConfig::from_sources(
            None,
            env(&[
                ("AEVO_ENVIRONMENT", "mainnet"),
                ("AEVO_SIGNING_KEY", TEST_KEY),
                ("AEVO_WALLET_ADDRESS", TEST_ADDRESS),
                ("AEVO_API_KEY", "key"),
                ("AEVO_API_SECRET", "secret"),
            ]),
        )
        .expect("config");

        assert_eq!(config.environment, Environment::Mainnet);
        assert!(config.has_api_key());
        let credentials = config.credentials().expect("credentials");
        assert_eq!(credentials.environment(), Environment::Mainnet);
        assert_eq!(credentials.api_key(), "key");
    }

    #[test]
    fn test_file_then_environment_override() {
        let path = write_config(
            "override",
            &format!(
                "environment: testnet\nsigning_key: \"{TEST_KEY}\"\nwallet_address: \"{TEST_ADDRESS}\"\napi_key: from-file\napi_secret: from-file\n"
            ),
        );

        let config = CliConfig::from_sources(Some(&path), env(&[("AEVO_API_KEY", "from-env")]))
            .expect("config");
        std::fs::remove_file(&path).ok();

        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.api_secret, "from-file");
        assert!(config.credentials().is_ok());
    }

    #[test]
    fn test_invalid_environment_is_rejected() {
        let err = CliConfig::from_sources(None, env(&[("AEVO_ENVIRONMENT", "devnet")])).unwrap_err();
        assert!(format!("{err:#}").contains("parse configuration"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = CliConfig::from_sources(
            None,
            env(&[("AEVO_API_SECRET", "very-secret"), ("AEVO_SIGNING_KEY", TEST_KEY)]),
        )
        .expect("config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(!rendered.contains(TEST_KEY));
    }
}
