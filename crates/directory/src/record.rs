use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One user as listed by the directory endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRecord {
	/// Identity of the user; compared case-insensitively.
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub team: Option<String>,
}

impl UserRecord {
	pub fn new(email: impl Into<String>) -> Self {
		Self {
			email: email.into(),
			role: None,
			team: None,
		}
	}

	pub fn with_role(mut self, role: impl Into<String>) -> Self {
		self.role = Some(role.into());
		self
	}

	pub fn with_team(mut self, team: impl Into<String>) -> Self {
		self.team = Some(team.into());
		self
	}

	/// Lowercased email used for identity comparisons.
	pub fn email_key(&self) -> String {
		self.email.to_lowercase()
	}
}

/// Immutable, ordered listing produced by one successful fetch.
///
/// Cloning is cheap and shares the same records.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DirectorySnapshot {
	records: Arc<[UserRecord]>,
}

impl DirectorySnapshot {
	pub fn new(records: impl Into<Arc<[UserRecord]>>) -> Self {
		Self { records: records.into() }
	}

	pub fn records(&self) -> &[UserRecord] {
		&self.records
	}

	/// Returns true when both handles point at the same fetched listing.
	pub fn same_listing(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.records, &other.records)
	}
}

impl Deref for DirectorySnapshot {
	type Target = [UserRecord];

	fn deref(&self) -> &Self::Target {
		&self.records
	}
}

impl From<Vec<UserRecord>> for DirectorySnapshot {
	fn from(records: Vec<UserRecord>) -> Self {
		Self::new(records)
	}
}
