//! Remote services used by the screens, besides the user directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a backend call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
	/// The service rejected or failed the call.
	#[error("{operation} failed: {message}")]
	Failed {
		operation: &'static str,
		message: String,
	},

	/// The addressed object or document does not exist.
	#[error("not found: {0}")]
	NotFound(String),
}

impl BackendError {
	pub fn failed(operation: &'static str, message: impl Into<String>) -> Self {
		Self::Failed {
			operation,
			message: message.into(),
		}
	}
}

/// Result type for backend calls.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Role and team attached to an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub team: Option<String>,
}

/// Account management functions.
#[async_trait]
pub trait UserFunctions: Send + Sync {
	async fn generate_password(&self) -> Result<String>;

	/// Creates or updates the account. A `None` password leaves it unchanged.
	async fn update_user(&self, email: &str, password: Option<&str>, claims: &UserClaims) -> Result<()>;
}

/// Binary object storage.
#[async_trait]
pub trait ObjectStore: Send + Sync {
	/// Stores `bytes` at `path` and returns a download URL.
	async fn put(&self, path: &str, bytes: Vec<u8>) -> Result<String>;

	async fn delete(&self, path: &str) -> Result<()>;
}

/// Stored team document, keyed by initials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamDocument {
	pub name: String,
	pub initials: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logo_url: Option<String>,
}

/// Team document collection.
#[async_trait]
pub trait TeamStore: Send + Sync {
	async fn set(&self, initials: &str, document: TeamDocument) -> Result<()>;

	async fn delete(&self, initials: &str) -> Result<()>;
}

/// Object path of a team's logo.
pub fn team_logo_path(initials: &str) -> String {
	format!("/teams/{initials}")
}
