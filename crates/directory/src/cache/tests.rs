use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;

use super::*;
use crate::UserRecord;

/// Endpoint that replays a fixed script of outcomes, then keeps succeeding.
struct ScriptedEndpoint {
	script: parking_lot::Mutex<VecDeque<Result<Vec<UserRecord>>>>,
	fallback: Vec<UserRecord>,
	latency: Duration,
	calls: AtomicU32,
}

impl ScriptedEndpoint {
	fn new(script: Vec<Result<Vec<UserRecord>>>) -> Self {
		Self {
			script: parking_lot::Mutex::new(script.into()),
			fallback: users(),
			latency: Duration::from_millis(50),
			calls: AtomicU32::new(0),
		}
	}

	fn calls(&self) -> u32 {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl DirectoryEndpoint for ScriptedEndpoint {
	async fn list_users(&self) -> Result<Vec<UserRecord>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		tokio::time::sleep(self.latency).await;
		let next = self.script.lock().pop_front();
		next.unwrap_or_else(|| Ok(self.fallback.clone()))
	}
}

fn users() -> Vec<UserRecord> {
	vec![
		UserRecord::new("a@x.com").with_role("dm").with_team("RED"),
		UserRecord::new("ab@x.com").with_role("player"),
	]
}

fn down() -> Result<Vec<UserRecord>> {
	Err(FetchError::endpoint("backend down"))
}

#[tokio::test(start_paused = true)]
async fn retries_twice_then_caches_success() {
	let cache = CachedDirectory::new(ScriptedEndpoint::new(vec![down(), down()]));
	let started = Instant::now();

	let snapshot = cache.fetch().await.expect("third attempt succeeds");
	assert_eq!(snapshot.records(), users().as_slice());
	assert_eq!(cache.endpoint().calls(), 3);
	// Three calls of 50ms plus two 1000ms retry delays.
	assert_eq!(started.elapsed(), Duration::from_millis(2150));

	let again = cache.fetch().await.expect("cached");
	assert!(again.same_listing(&snapshot));
	assert_eq!(cache.endpoint().calls(), 3);
	assert_eq!(cache.state(), CacheState::Ready(snapshot));
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_attempt_sequence() {
	let cache = Arc::new(CachedDirectory::new(ScriptedEndpoint::new(vec![down(), down()])));

	let first = {
		let cache = Arc::clone(&cache);
		tokio::spawn(async move { cache.fetch().await })
	};
	// Arrive during the first retry delay.
	tokio::time::sleep(Duration::from_millis(500)).await;
	assert_eq!(cache.state(), CacheState::Pending);
	let second = {
		let cache = Arc::clone(&cache);
		tokio::spawn(async move { cache.fetch().await })
	};

	let first = first.await.unwrap().expect("first caller");
	let second = second.await.unwrap().expect("second caller");
	assert!(first.same_listing(&second));
	assert_eq!(cache.endpoint().calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn sticky_failure_is_returned_until_refresh() {
	let cache = CachedDirectory::new(ScriptedEndpoint::new(vec![down(), down(), down()]));

	let err = cache.fetch().await.expect_err("all attempts fail");
	assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }), "got {err:?}");
	assert_eq!(cache.state(), CacheState::Failed(err.clone()));

	let again = cache.fetch().await.expect_err("failure is cached");
	assert_eq!(again, err);
	assert_eq!(cache.endpoint().calls(), 3);

	cache.refresh();
	assert_eq!(cache.state(), CacheState::Empty);
	let snapshot = cache.fetch().await.expect("fresh attempt sequence succeeds");
	assert_eq!(snapshot.len(), 2);
	assert_eq!(cache.endpoint().calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn retry_mode_starts_over_on_next_fetch() {
	let endpoint = ScriptedEndpoint::new(vec![down(), down(), down()]);
	let cache = CachedDirectory::with_policy(endpoint, RetryPolicy::default(), FailureMode::Retry);

	assert!(cache.fetch().await.is_err());
	assert_eq!(cache.state(), CacheState::Empty);

	let snapshot = cache.fetch().await.expect("second sequence succeeds");
	assert_eq!(snapshot.len(), 2);
	assert_eq!(cache.endpoint().calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn refresh_supersedes_ready_snapshot() {
	let cache = CachedDirectory::new(ScriptedEndpoint::new(Vec::new()));
	let first = cache.fetch().await.expect("first");
	cache.refresh();
	let second = cache.fetch().await.expect("second");
	assert!(!first.same_listing(&second));
	assert_eq!(first, second);
	assert_eq!(cache.endpoint().calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn refresh_leaves_pending_fetch_shared() {
	let cache = Arc::new(CachedDirectory::new(ScriptedEndpoint::new(Vec::new())));
	let waiter = {
		let cache = Arc::clone(&cache);
		tokio::spawn(async move { cache.fetch().await })
	};
	tokio::time::sleep(Duration::from_millis(10)).await;
	cache.refresh();
	assert_eq!(cache.state(), CacheState::Pending);

	let joined = cache.fetch().await.expect("joins pending fetch");
	let first = waiter.await.unwrap().expect("waiter");
	assert!(first.same_listing(&joined));
	assert_eq!(cache.endpoint().calls(), 1);
}
