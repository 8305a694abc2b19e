use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

use crate::{DirectoryEndpoint, DirectorySnapshot, DirectorySource, FetchError, Result, RetryPolicy};

type SharedFetch = Shared<BoxFuture<'static, Result<DirectorySnapshot>>>;

/// What happens to the cache slot after an attempt sequence fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
	/// The failure is kept and returned to every later caller until
	/// [`CachedDirectory::refresh`] clears it.
	#[default]
	Sticky,
	/// The slot is emptied so the next caller starts a new attempt sequence.
	Retry,
}

/// Observable state of the cache slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
	Empty,
	Pending,
	Ready(DirectorySnapshot),
	Failed(FetchError),
}

enum Slot {
	Empty,
	Pending { epoch: u64, fetch: SharedFetch },
	Ready(DirectorySnapshot),
	Failed(FetchError),
}

/// Retrying, single-flight cache in front of a [`DirectoryEndpoint`].
///
/// The first caller starts an attempt sequence; callers arriving while it is
/// pending await the same shared future. The first success becomes the cached
/// snapshot for the rest of the session.
pub struct CachedDirectory<E> {
	endpoint: Arc<E>,
	policy: RetryPolicy,
	failure_mode: FailureMode,
	slot: Mutex<Slot>,
	epoch: Mutex<u64>,
}

impl<E> CachedDirectory<E>
where
	E: DirectoryEndpoint + 'static,
{
	pub fn new(endpoint: E) -> Self {
		Self::with_policy(endpoint, RetryPolicy::default(), FailureMode::default())
	}

	pub fn with_policy(endpoint: E, policy: RetryPolicy, failure_mode: FailureMode) -> Self {
		Self {
			endpoint: Arc::new(endpoint),
			policy,
			failure_mode,
			slot: Mutex::new(Slot::Empty),
			epoch: Mutex::new(0),
		}
	}

	#[cfg(test)]
	fn endpoint(&self) -> &E {
		&self.endpoint
	}

	/// Returns the cached snapshot, joining or starting a fetch when needed.
	pub async fn fetch(&self) -> Result<DirectorySnapshot> {
		let (epoch, fetch) = {
			let mut slot = self.slot.lock();
			let joined = match &*slot {
				Slot::Ready(snapshot) => {
					tracing::trace!(records = snapshot.len(), "directory.cache.hit");
					return Ok(snapshot.clone());
				}
				Slot::Failed(err) => {
					tracing::trace!(error = %err, "directory.cache.failed");
					return Err(err.clone());
				}
				Slot::Pending { epoch, fetch } => Some((*epoch, fetch.clone())),
				Slot::Empty => None,
			};
			match joined {
				Some((epoch, fetch)) => {
					tracing::trace!(epoch, "directory.cache.join");
					(epoch, fetch)
				}
				None => {
					let epoch = self.next_epoch();
					let fetch = self.start(epoch);
					*slot = Slot::Pending {
						epoch,
						fetch: fetch.clone(),
					};
					(epoch, fetch)
				}
			}
		};

		let result = fetch.await;
		self.settle(epoch, &result);
		result
	}

	/// Drops a cached snapshot or failure so the next fetch starts over.
	///
	/// A fetch that is still pending is left alone; its waiters keep sharing it.
	pub fn refresh(&self) {
		let mut slot = self.slot.lock();
		if matches!(*slot, Slot::Ready(_) | Slot::Failed(_)) {
			tracing::debug!("directory.cache.refresh");
			*slot = Slot::Empty;
		}
	}

	pub fn state(&self) -> CacheState {
		match &*self.slot.lock() {
			Slot::Empty => CacheState::Empty,
			Slot::Pending { .. } => CacheState::Pending,
			Slot::Ready(snapshot) => CacheState::Ready(snapshot.clone()),
			Slot::Failed(err) => CacheState::Failed(err.clone()),
		}
	}

	fn next_epoch(&self) -> u64 {
		let mut epoch = self.epoch.lock();
		*epoch = epoch.wrapping_add(1);
		*epoch
	}

	fn start(&self, epoch: u64) -> SharedFetch {
		let endpoint = Arc::clone(&self.endpoint);
		let policy = self.policy;
		tracing::debug!(epoch, max_attempts = policy.max_attempts(), "directory.fetch.start");
		async move {
			let records = policy
				.run(|attempt| {
					let endpoint = Arc::clone(&endpoint);
					async move {
						tracing::debug!(epoch, attempt, "directory.fetch.attempt");
						endpoint.list_users().await
					}
				})
				.await?;
			tracing::debug!(epoch, records = records.len(), "directory.fetch.done");
			Ok(DirectorySnapshot::from(records))
		}
		.boxed()
		.shared()
	}

	/// Stores the outcome of attempt sequence `epoch`, unless a refresh already
	/// replaced it.
	fn settle(&self, epoch: u64, result: &Result<DirectorySnapshot>) {
		let mut slot = self.slot.lock();
		let current = matches!(&*slot, Slot::Pending { epoch: pending, .. } if *pending == epoch);
		if !current {
			return;
		}
		*slot = match (result, self.failure_mode) {
			(Ok(snapshot), _) => Slot::Ready(snapshot.clone()),
			(Err(err), FailureMode::Sticky) => Slot::Failed(err.clone()),
			(Err(_), FailureMode::Retry) => Slot::Empty,
		};
	}
}

#[async_trait]
impl<E> DirectorySource for CachedDirectory<E>
where
	E: DirectoryEndpoint + 'static,
{
	async fn snapshot(&self) -> Result<DirectorySnapshot> {
		self.fetch().await
	}
}

#[cfg(test)]
mod tests;
