use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

/// Busy indicator shared by every screen.
///
/// Publishes the number of operations in flight; zero means idle.
#[derive(Debug, Clone)]
pub struct Loading {
	tx: Arc<watch::Sender<usize>>,
}

impl Default for Loading {
	fn default() -> Self {
		Self::new()
	}
}

impl Loading {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(0);
		Self { tx: Arc::new(tx) }
	}

	pub fn subscribe(&self) -> watch::Receiver<usize> {
		self.tx.subscribe()
	}

	pub fn in_flight(&self) -> usize {
		*self.tx.borrow()
	}

	/// Runs `fut` with the indicator raised and returns its output.
	pub async fn run_on<F>(&self, fut: F) -> F::Output
	where
		F: Future,
	{
		let _guard = self.begin();
		fut.await
	}

	fn begin(&self) -> LoadingGuard {
		self.tx.send_modify(|n| *n += 1);
		LoadingGuard { tx: Arc::clone(&self.tx) }
	}
}

/// Lowers the indicator when dropped, including on cancellation.
struct LoadingGuard {
	tx: Arc<watch::Sender<usize>>,
}

impl Drop for LoadingGuard {
	fn drop(&mut self) {
		self.tx.send_modify(|n| *n = n.saturating_sub(1));
	}
}
