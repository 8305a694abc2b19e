//! `console.toml` loading.
//!
//! Every section and key is optional; omitted values take the defaults below.
//! Unknown keys are rejected so typos surface at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use roster_directory::{FailureMode, RetryPolicy};
use serde::Deserialize;
use thiserror::Error;

/// File name looked up in the user config directory.
pub const CONFIG_FILE: &str = "console.toml";

/// Errors that can occur when loading configuration or fixture files.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error reading a file.
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// Error parsing `console.toml`.
	#[error("invalid config {path}: {error}")]
	Parse {
		path: PathBuf,
		error: toml::de::Error,
	},

	/// Error parsing a JSON fixture.
	#[error("invalid fixture {path}: {error}")]
	Fixture {
		path: PathBuf,
		error: serde_json::Error,
	},
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
	pub directory: DirectoryConfig,
	pub form: FormConfig,
	pub messages: MessagesConfig,
	pub backend: BackendConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
	/// Extra attempts after the first failed listing.
	pub retries: u32,
	pub retry_delay_ms: u64,
	pub failure: FailurePolicy,
}

impl Default for DirectoryConfig {
	fn default() -> Self {
		let policy = RetryPolicy::default();
		Self {
			retries: policy.retries,
			retry_delay_ms: policy.delay_ms(),
			failure: FailurePolicy::Sticky,
		}
	}
}

impl DirectoryConfig {
	pub fn retry_policy(&self) -> RetryPolicy {
		RetryPolicy::new(self.retries, Duration::from_millis(self.retry_delay_ms))
	}

	pub fn failure_mode(&self) -> FailureMode {
		match self.failure {
			FailurePolicy::Sticky => FailureMode::Sticky,
			FailurePolicy::Retry => FailureMode::Retry,
		}
	}
}

/// Config spelling of [`FailureMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
	Sticky,
	Retry,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
	/// Role value that makes the team field editable.
	pub team_role: String,
}

impl Default for FormConfig {
	fn default() -> Self {
		Self { team_role: "dm".into() }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MessagesConfig {
	pub hint_ms: u64,
	pub error_ms: u64,
}

impl Default for MessagesConfig {
	fn default() -> Self {
		Self {
			hint_ms: 2500,
			error_ms: 5000,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackendConfig {
	pub fixture: Option<PathBuf>,
	/// Simulated latency of every backend call.
	pub latency_ms: u64,
	/// Number of initial directory listings that fail.
	pub fail_first: u32,
}

impl ConsoleConfig {
	/// Default location: `<config dir>/roster/console.toml`.
	pub fn default_path() -> Option<PathBuf> {
		dirs::config_dir().map(|dir| dir.join("roster").join(CONFIG_FILE))
	}

	/// Loads the explicit file, or the default file when present.
	///
	/// A missing explicit file is an error; a missing default file yields defaults.
	pub fn load(explicit: Option<&Path>) -> Result<Self> {
		match explicit {
			Some(path) => Self::from_path(path),
			None => match Self::default_path() {
				Some(path) if path.is_file() => Self::from_path(&path),
				_ => {
					tracing::debug!("config.defaults");
					Ok(Self::default())
				}
			},
		}
	}

	pub fn from_path(path: &Path) -> Result<Self> {
		let src = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let config = toml::from_str(&src).map_err(|error| ConfigError::Parse {
			path: path.to_path_buf(),
			error,
		})?;
		tracing::debug!(path = %path.display(), "config.loaded");
		Ok(config)
	}
}
