//! Shared task primitives for the console runtime.
//!
//! * [`spawn`] routes async work onto the current tokio runtime with a
//!   [`TaskClass`] tag for tracing.
//! * [`SequenceClock`] hands out monotonic sequence numbers for input edits.
//! * [`LatestSlot`] is a one-element hand-off where a newer value replaces the
//!   pending one instead of queueing behind it.

mod class;
mod clock;
mod join;
mod slot;
mod spawn;

pub use class::TaskClass;
pub use clock::SequenceClock;
pub use join::join_error_panic_message;
pub use slot::{LatestSlot, SlotClosed, SlotOutcome, SlotReceiver, SlotSender};
pub use spawn::spawn;
