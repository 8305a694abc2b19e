//! In-memory backend seeded from a JSON fixture.
//!
//! Serves the directory listing, account functions, object storage and team
//! documents for the console. Latency and an initial outage of the directory
//! listing can be simulated to watch retries and edit coalescing at work.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use roster_directory::{DirectoryEndpoint, FetchError, UserRecord};
use serde::Deserialize;

use crate::backend::{self, BackendError, ObjectStore, TeamDocument, TeamStore, UserClaims, UserFunctions};
use crate::config::{self, BackendConfig, ConfigError};

const MIN_PASSWORD_LEN: usize = 6;
const GENERATED_PASSWORD_LEN: usize = 12;

/// On-disk fixture layout.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
	#[serde(default)]
	users: Vec<UserRecord>,
	#[serde(default)]
	teams: Vec<TeamDocument>,
}

#[derive(Debug, Default)]
pub struct FixtureBackend {
	users: Mutex<Vec<UserRecord>>,
	objects: Mutex<HashMap<String, Vec<u8>>>,
	teams: Mutex<BTreeMap<String, TeamDocument>>,
	latency: Duration,
	outages: AtomicU32,
	listings: AtomicU32,
}

impl FixtureBackend {
	pub fn new(users: Vec<UserRecord>) -> Self {
		Self {
			users: Mutex::new(users),
			..Self::default()
		}
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = latency;
		self
	}

	/// Makes the first `count` directory listings fail.
	pub fn failing_first(self, count: u32) -> Self {
		self.outages.store(count, Ordering::Relaxed);
		self
	}

	pub fn from_path(path: &Path) -> config::Result<Self> {
		let src = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		let file: FixtureFile = serde_json::from_str(&src).map_err(|error| ConfigError::Fixture {
			path: path.to_path_buf(),
			error,
		})?;
		tracing::info!(path = %path.display(), users = file.users.len(), teams = file.teams.len(), "fixture.loaded");

		let backend = Self::new(file.users);
		backend
			.teams
			.lock()
			.extend(file.teams.into_iter().map(|team| (team.initials.clone(), team)));
		Ok(backend)
	}

	/// Builds the backend described by `[backend]`, with `fixture` overriding the file.
	pub fn from_config(config: &BackendConfig, fixture: Option<&Path>) -> config::Result<Self> {
		let backend = match fixture.or(config.fixture.as_deref()) {
			Some(path) => Self::from_path(path)?,
			None => {
				tracing::warn!("fixture.empty");
				Self::default()
			}
		};
		Ok(backend
			.with_latency(Duration::from_millis(config.latency_ms))
			.failing_first(config.fail_first))
	}

	/// Number of directory listings served or failed so far.
	pub fn listings(&self) -> u32 {
		self.listings.load(Ordering::Relaxed)
	}

	pub fn users(&self) -> Vec<UserRecord> {
		self.users.lock().clone()
	}

	pub fn teams(&self) -> Vec<TeamDocument> {
		self.teams.lock().values().cloned().collect()
	}

	#[cfg(test)]
	pub fn object(&self, path: &str) -> Option<Vec<u8>> {
		self.objects.lock().get(path).cloned()
	}

	async fn simulate_latency(&self) {
		if !self.latency.is_zero() {
			tokio::time::sleep(self.latency).await;
		}
	}
}

#[async_trait]
impl DirectoryEndpoint for FixtureBackend {
	async fn list_users(&self) -> roster_directory::Result<Vec<UserRecord>> {
		self.listings.fetch_add(1, Ordering::Relaxed);
		self.simulate_latency().await;
		let outage = self
			.outages
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
			.is_ok();
		if outage {
			return Err(FetchError::endpoint("fixture: simulated outage"));
		}
		Ok(self.users())
	}
}

#[async_trait]
impl UserFunctions for FixtureBackend {
	async fn generate_password(&self) -> backend::Result<String> {
		self.simulate_latency().await;
		let mut password = uuid::Uuid::new_v4().simple().to_string();
		password.truncate(GENERATED_PASSWORD_LEN);
		Ok(password)
	}

	async fn update_user(&self, email: &str, password: Option<&str>, claims: &UserClaims) -> backend::Result<()> {
		self.simulate_latency().await;
		if !email.contains('@') {
			return Err(BackendError::failed("update_user", format!("invalid email '{email}'")));
		}
		if let Some(password) = password
			&& password.chars().count() < MIN_PASSWORD_LEN
		{
			return Err(BackendError::failed(
				"update_user",
				format!("password must have at least {MIN_PASSWORD_LEN} characters"),
			));
		}

		let key = email.to_lowercase();
		let mut users = self.users.lock();
		let index = match users.iter().position(|user| user.email_key() == key) {
			Some(index) => index,
			None => {
				users.push(UserRecord::new(email));
				users.len() - 1
			}
		};
		let record = &mut users[index];
		record.role = claims.role.clone();
		record.team = claims.team.clone();
		tracing::debug!(email, role = ?claims.role, team = ?claims.team, "fixture.user.updated");
		Ok(())
	}
}

#[async_trait]
impl ObjectStore for FixtureBackend {
	async fn put(&self, path: &str, bytes: Vec<u8>) -> backend::Result<String> {
		self.simulate_latency().await;
		self.objects.lock().insert(path.to_string(), bytes);
		Ok(format!("fixture://{}", path.trim_start_matches('/')))
	}

	async fn delete(&self, path: &str) -> backend::Result<()> {
		self.simulate_latency().await;
		match self.objects.lock().remove(path) {
			Some(_) => Ok(()),
			None => Err(BackendError::NotFound(path.to_string())),
		}
	}
}

#[async_trait]
impl TeamStore for FixtureBackend {
	async fn set(&self, initials: &str, document: TeamDocument) -> backend::Result<()> {
		self.simulate_latency().await;
		self.teams.lock().insert(initials.to_string(), document);
		Ok(())
	}

	async fn delete(&self, initials: &str) -> backend::Result<()> {
		self.simulate_latency().await;
		match self.teams.lock().remove(initials) {
			Some(_) => Ok(()),
			None => Err(BackendError::NotFound(format!("team {initials}"))),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::io::Write;

	use pretty_assertions::assert_eq;

	use super::*;

	const FIXTURE: &str = r#"{
		"users": [
			{ "email": "a@x.com", "role": "dm", "team": "RED" },
			{ "email": "b@y.com" }
		],
		"teams": [
			{ "name": "Red Dragons", "initials": "RED" }
		]
	}"#;

	#[tokio::test]
	async fn loads_users_and_teams() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(FIXTURE.as_bytes()).unwrap();

		let backend = FixtureBackend::from_path(file.path()).unwrap();
		let users = backend.list_users().await.unwrap();
		assert_eq!(users[0], UserRecord::new("a@x.com").with_role("dm").with_team("RED"));
		assert_eq!(users[1], UserRecord::new("b@y.com"));
		assert_eq!(backend.teams()[0].name, "Red Dragons");
	}

	#[test]
	fn malformed_fixture_is_reported() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all(b"{\"users\": [{\"mail\": \"a@x.com\"}]}").unwrap();
		assert!(matches!(FixtureBackend::from_path(file.path()), Err(ConfigError::Fixture { .. })));
	}

	#[tokio::test]
	async fn outage_covers_only_the_first_listings() {
		let backend = FixtureBackend::new(vec![UserRecord::new("a@x.com")]).failing_first(2);
		assert!(backend.list_users().await.is_err());
		assert!(backend.list_users().await.is_err());
		assert_eq!(backend.list_users().await.unwrap().len(), 1);
		assert_eq!(backend.listings(), 3);
	}

	#[tokio::test]
	async fn update_user_upserts_claims() {
		let backend = FixtureBackend::new(vec![UserRecord::new("a@x.com").with_role("player")]);
		let claims = UserClaims {
			role: Some("dm".into()),
			team: Some("RED".into()),
		};
		backend.update_user("A@X.COM", None, &claims).await.unwrap();
		backend.update_user("new@x.com", Some("secret1"), &UserClaims::default()).await.unwrap();

		assert_eq!(
			backend.users(),
			vec![
				UserRecord::new("a@x.com").with_role("dm").with_team("RED"),
				UserRecord::new("new@x.com"),
			]
		);
	}

	#[tokio::test]
	async fn update_user_validates_input() {
		let backend = FixtureBackend::default();
		let claims = UserClaims::default();
		assert!(backend.update_user("nobody", None, &claims).await.is_err());
		assert!(backend.update_user("a@x.com", Some("123"), &claims).await.is_err());
		assert!(backend.users().is_empty());
	}

	#[tokio::test]
	async fn generated_passwords_are_distinct() {
		let backend = FixtureBackend::default();
		let a = backend.generate_password().await.unwrap();
		let b = backend.generate_password().await.unwrap();
		assert_eq!(a.len(), GENERATED_PASSWORD_LEN);
		assert_ne!(a, b);
	}

	#[tokio::test]
	async fn deleting_missing_entries_fails() {
		let backend = FixtureBackend::default();
		assert_eq!(ObjectStore::delete(&backend, "/teams/RED").await, Err(BackendError::NotFound("/teams/RED".into())));
		assert!(TeamStore::delete(&backend, "RED").await.is_err());

		let url = backend.put("/teams/RED", vec![1, 2]).await.unwrap();
		assert_eq!(url, "fixture://teams/RED");
		assert_eq!(backend.object("/teams/RED"), Some(vec![1, 2]));
		ObjectStore::delete(&backend, "/teams/RED").await.unwrap();
	}
}
