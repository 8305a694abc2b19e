use std::sync::Arc;

use async_trait::async_trait;

use crate::{DirectorySnapshot, Result, UserRecord};

/// Remote "list all users" call.
#[async_trait]
pub trait DirectoryEndpoint: Send + Sync {
	/// Returns the complete user listing or fails; never a partial listing.
	async fn list_users(&self) -> Result<Vec<UserRecord>>;
}

#[async_trait]
impl<T: DirectoryEndpoint + ?Sized> DirectoryEndpoint for Arc<T> {
	async fn list_users(&self) -> Result<Vec<UserRecord>> {
		(**self).list_users().await
	}
}

/// Anything that can hand out the current directory snapshot.
#[async_trait]
pub trait DirectorySource: Send + Sync {
	async fn snapshot(&self) -> Result<DirectorySnapshot>;
}

#[async_trait]
impl<T: DirectorySource + ?Sized> DirectorySource for Arc<T> {
	async fn snapshot(&self) -> Result<DirectorySnapshot> {
		(**self).snapshot().await
	}
}
