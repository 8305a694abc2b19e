use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Outcome from storing a value into a [`LatestSlot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOutcome {
	/// The slot was empty.
	Stored,
	/// A pending value that was never taken got dropped in favor of this one.
	Replaced,
}

/// The slot was closed by its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotClosed;

impl std::fmt::Display for SlotClosed {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str("slot closed")
	}
}

impl std::error::Error for SlotClosed {}

struct SlotState<T> {
	pending: Option<T>,
	closed: bool,
}

struct SlotInner<T> {
	state: Mutex<SlotState<T>>,
	notify: Notify,
}

/// Single-element hand-off between a producer and one sequential consumer.
///
/// While the consumer is busy with a taken value, newer values overwrite the
/// pending one; the consumer always resumes with the most recent value and
/// intermediate values are dropped without ever being observed.
pub struct LatestSlot<T> {
	inner: Arc<SlotInner<T>>,
}

/// Producer handle for a [`LatestSlot`].
pub struct SlotSender<T> {
	inner: Arc<SlotInner<T>>,
}

/// Consumer handle for a [`LatestSlot`].
pub struct SlotReceiver<T> {
	inner: Arc<SlotInner<T>>,
}

impl<T> Clone for SlotSender<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> Default for LatestSlot<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> LatestSlot<T> {
	/// Creates an empty, open slot.
	pub fn new() -> Self {
		Self {
			inner: Arc::new(SlotInner {
				state: Mutex::new(SlotState { pending: None, closed: false }),
				notify: Notify::new(),
			}),
		}
	}

	/// Returns a sender handle.
	pub fn sender(&self) -> SlotSender<T> {
		SlotSender {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Returns the receiver handle.
	pub fn receiver(&self) -> SlotReceiver<T> {
		SlotReceiver {
			inner: Arc::clone(&self.inner),
		}
	}
}

impl<T> SlotSender<T> {
	/// Stores `value` as the pending value, replacing any value not yet taken.
	pub fn put(&self, value: T) -> Result<SlotOutcome, SlotClosed> {
		let mut state = self.inner.state.lock();
		if state.closed {
			return Err(SlotClosed);
		}
		let replaced = state.pending.replace(value).is_some();
		drop(state);
		self.inner.notify.notify_one();
		Ok(if replaced { SlotOutcome::Replaced } else { SlotOutcome::Stored })
	}

	/// Closes the slot. A pending value is still handed out before the receiver sees `None`.
	pub fn close(&self) {
		self.inner.state.lock().closed = true;
		self.inner.notify.notify_waiters();
		self.inner.notify.notify_one();
	}
}

impl<T> SlotReceiver<T> {
	/// Waits for the pending value. Returns `None` once the slot is closed and drained.
	pub async fn take(&self) -> Option<T> {
		loop {
			// Register before checking state so a put between the check and the
			// await still wakes us.
			let notified = self.inner.notify.notified();
			{
				let mut state = self.inner.state.lock();
				if let Some(value) = state.pending.take() {
					return Some(value);
				}
				if state.closed {
					return None;
				}
			}
			notified.await;
		}
	}
}
