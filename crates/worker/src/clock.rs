use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic sequence clock shared between the producers of one input stream.
///
/// The first call to [`SequenceClock::next`] returns 1, so 0 can be used as a
/// "nothing seen yet" marker by consumers.
#[derive(Debug, Default, Clone)]
pub struct SequenceClock {
	next: Arc<AtomicU64>,
}

impl SequenceClock {
	/// Creates a clock whose next value is 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the next sequence number.
	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
	}

	/// Returns the most recently issued sequence number, or 0.
	pub fn current(&self) -> u64 {
		self.next.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clones_share_one_sequence() {
		let clock = SequenceClock::new();
		let other = clock.clone();
		assert_eq!(clock.current(), 0);
		assert_eq!(clock.next(), 1);
		assert_eq!(other.next(), 2);
		assert_eq!(clock.current(), 2);
	}
}
