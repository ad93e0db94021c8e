//! Configuration loading for the meta-transaction pipeline.
//!
//! TOML files with `${VAR}` environment substitution, plus `METATX_`-prefixed
//! environment overrides for the settings that change between deployments.

use std::env;
use std::path::Path;
use thiserror::Error;

mod types;

pub use types::{ChainConfig, Config, ContractsConfig, ExecutorSettings, RelayerConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
#[derive(Default)]
pub struct ConfigLoader {
	file_path: Option<String>,
	env_prefix: String,
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "METATX_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_string_lossy().to_string());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	pub async fn load(&self) -> Result<Config, ConfigError> {
		let mut config = if let Some(file_path) = &self.file_path {
			self.load_from_file(file_path).await?
		} else {
			return Err(ConfigError::FileNotFound(
				"No configuration file specified".to_string(),
			));
		};

		self.apply_env_overrides(&mut config);
		self.validate_config(&config)?;

		Ok(config)
	}

	async fn load_from_file(&self, file_path: &str) -> Result<Config, ConfigError> {
		let content = tokio::fs::read_to_string(file_path).await?;

		let substituted_content = self.substitute_env_vars(&content)?;

		let config: Config = toml::from_str(&substituted_content)
			.map_err(|e| ConfigError::ParseError(e.to_string()))?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let mut result = content.to_string();

		// Find and replace ${VAR_NAME} patterns
		let re = regex::Regex::new(r"\$\{([^}]+)\}").unwrap();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut Config) {
		if let Ok(relayer_url) = env::var(format!("{}RELAYER_URL", self.env_prefix)) {
			config.relayer.url = relayer_url;
		}

		if let Ok(rpc_url) = env::var(format!("{}RPC_URL", self.env_prefix)) {
			config.chain.rpc_url = rpc_url;
		}
	}

	fn validate_config(&self, config: &Config) -> Result<(), ConfigError> {
		for (name, url) in [
			("relayer.url", &config.relayer.url),
			("chain.rpc_url", &config.chain.rpc_url),
		] {
			if !url.starts_with("http://") && !url.starts_with("https://") {
				return Err(ConfigError::ValidationError(format!(
					"{} must start with http:// or https://",
					name
				)));
			}
		}

		if config.executor.deadline_secs == 0 {
			return Err(ConfigError::ValidationError(
				"executor.deadline_secs must be positive".to_string(),
			));
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	const SAMPLE: &str = r#"
[relayer]
url = "http://localhost:3000"

[chain]
rpc_url = "https://sepolia.example.org"
chain_id = 11155111

[contracts]
idrp_token = "0xc1fAB272a555DB0d420E44f61e0F1ddB440E9B88"
goods_token = "0x0d2df3127A1dF32D899C210B1209a611739A4e3A"
trade_escrow = "0x3a0edaFB40FA11E2f5316e6D64217AFf685a56ac"
vault_factory = "0x174E729378577e0Ba20ed97B47983A494dF8F77c"
goods_router = "0x5fA2Cd4e60d0c486Dc952D68DB58706faeD22F88"
"#;

	fn write_config(content: &str) -> NamedTempFile {
		let mut file = NamedTempFile::new().unwrap();
		file.write_all(content.as_bytes()).unwrap();
		file
	}

	#[tokio::test]
	async fn loads_sample_with_executor_defaults() {
		let file = write_config(SAMPLE);
		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();

		assert_eq!(config.relayer.url, "http://localhost:3000");
		assert_eq!(config.chain.chain_id, 11_155_111);
		assert_eq!(config.executor.default_gas, 500_000);
		assert_eq!(config.executor.deadline_secs, 3600);
		assert!(config.relayer.relay_timeout_secs.is_none());
	}

	#[tokio::test]
	async fn substitutes_env_vars() {
		std::env::set_var("TEST_METATX_RELAYER", "http://relayer.internal:3000");
		let file = write_config(&SAMPLE.replace(
			"http://localhost:3000",
			"${TEST_METATX_RELAYER}",
		));

		let config = ConfigLoader::new().with_file(file.path()).load().await.unwrap();
		assert_eq!(config.relayer.url, "http://relayer.internal:3000");
	}

	#[tokio::test]
	async fn missing_env_var_is_an_error() {
		let file = write_config(&SAMPLE.replace(
			"http://localhost:3000",
			"${TEST_METATX_UNSET_VAR}",
		));

		let err = ConfigLoader::new().with_file(file.path()).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
	}

	#[tokio::test]
	async fn rejects_non_http_relayer_url() {
		let file = write_config(&SAMPLE.replace("http://localhost:3000", "localhost:3000"));

		let err = ConfigLoader::new().with_file(file.path()).load().await.unwrap_err();
		assert!(matches!(err, ConfigError::ValidationError(_)));
	}

	#[tokio::test]
	async fn env_override_wins_over_file() {
		let file = write_config(SAMPLE);

		std::env::set_var("METATX_TEST_RELAYER_URL", "http://other:4000");
		let config = ConfigLoader::new()
			.with_env_prefix("METATX_TEST_")
			.with_file(file.path())
			.load()
			.await
			.unwrap();
		assert_eq!(config.relayer.url, "http://other:4000");
	}
}
