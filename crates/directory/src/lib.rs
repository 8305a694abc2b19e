//! User directory access for the users screen.
//!
//! # Mental model
//!
//! * A [`DirectoryEndpoint`] is the remote "list all users" call. It knows
//!   nothing about retries or caching.
//! * [`CachedDirectory`] wraps an endpoint with a [`RetryPolicy`] and one
//!   cache slot. Concurrent callers share one in-flight attempt sequence; the
//!   first success is kept as the session's [`DirectorySnapshot`].
//! * Consumers depend on the [`DirectorySource`] trait so query evaluation can
//!   run against stubs.
//!
//! # Invariants
//!
//! * A snapshot is never mutated after creation; a refresh replaces it.
//! * At most one attempt sequence is in flight per cache.
//! * A partially fetched listing is never exposed.

mod cache;
mod endpoint;
mod error;
mod record;
mod retry;

pub use cache::{CacheState, CachedDirectory, FailureMode};
pub use endpoint::{DirectoryEndpoint, DirectorySource};
pub use error::{FetchError, Result};
pub use record::{DirectorySnapshot, UserRecord};
pub use retry::RetryPolicy;
