//! Exhaust-and-drop evaluation of email edits.
//!
//! # Mental model
//!
//! * One engine task evaluates one edit at a time: fetch the snapshot, filter.
//! * Edits are handed over through a [`LatestSlot`]. While the task is busy,
//!   each new edit replaces the pending one, so the next evaluation always
//!   starts from the newest text.
//! * Every edit gets a sequence number from a [`SequenceClock`]; events carry
//!   it so consumers can check ordering.
//!
//! # Invariants
//!
//! * The implicit empty edit (sequence 1) is evaluated first, before any
//!   caller edit can replace it.
//! * Events are emitted in strictly increasing sequence order.
//! * An evaluation failure becomes an event; the loop keeps running.
//! * A superseded pending edit is dropped before evaluation, never after.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use roster_directory::DirectorySource;
use roster_worker::{LatestSlot, SequenceClock, SlotOutcome, SlotReceiver, SlotSender, TaskClass};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Query, QueryError, filter};

/// One email edit waiting for evaluation.
#[derive(Debug, Clone)]
struct Edit {
	seq: u64,
	text: String,
}

/// Outcome of evaluating one edit.
#[derive(Debug, Clone)]
pub struct QueryEvent {
	/// Sequence number of the edit; 1 is the implicit empty edit.
	pub edit: u64,
	pub text: String,
	pub outcome: Result<Query, QueryError>,
}

/// The engine task has stopped and accepts no more edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("query engine closed")]
pub struct EngineClosed;

#[derive(Debug, Default)]
struct EngineStats {
	busy: AtomicBool,
	dropped: AtomicU64,
}

/// Handle used to feed edits into a running engine.
///
/// Dropping the handle closes the input; the task finishes the edit it holds
/// and then stops.
pub struct QueryEngine {
	input: SlotSender<Edit>,
	clock: SequenceClock,
	stats: Arc<EngineStats>,
	task: Option<JoinHandle<()>>,
}

/// Stream of [`QueryEvent`]s produced by a [`QueryEngine`].
pub struct QueryResults {
	rx: mpsc::UnboundedReceiver<QueryEvent>,
}

impl QueryEngine {
	/// Starts the engine task and queues the implicit empty edit.
	pub fn spawn<S>(source: Arc<S>) -> (Self, QueryResults)
	where
		S: DirectorySource + ?Sized + 'static,
	{
		let slot = LatestSlot::new();
		let clock = SequenceClock::new();
		let stats = Arc::new(EngineStats::default());
		let (tx, rx) = mpsc::unbounded_channel();

		let initial = Edit {
			seq: clock.next(),
			text: String::new(),
		};
		let task = roster_worker::spawn(
			TaskClass::Interactive,
			run(source, initial, slot.receiver(), tx, Arc::clone(&stats)),
		);

		let engine = Self {
			input: slot.sender(),
			clock,
			stats,
			task: Some(task),
		};
		(engine, QueryResults { rx })
	}

	/// Submits an edit and returns its sequence number.
	///
	/// If an earlier edit is still waiting, it is dropped in favor of this one.
	pub fn edit(&self, text: impl Into<String>) -> Result<u64, EngineClosed> {
		let edit = Edit {
			seq: self.clock.next(),
			text: text.into(),
		};
		let seq = edit.seq;
		match self.input.put(edit).map_err(|_| EngineClosed)? {
			SlotOutcome::Stored => tracing::trace!(edit = seq, "query.edit.pending"),
			SlotOutcome::Replaced => {
				self.stats.dropped.fetch_add(1, Ordering::Relaxed);
				tracing::trace!(edit = seq, "query.edit.coalesced");
			}
		}
		Ok(seq)
	}

	/// Sequence number of the most recent edit, including the implicit one.
	pub fn latest_edit(&self) -> u64 {
		self.clock.current()
	}

	/// Returns true while an evaluation is in flight.
	pub fn is_busy(&self) -> bool {
		self.stats.busy.load(Ordering::Acquire)
	}

	/// Number of edits dropped because a newer edit replaced them.
	pub fn dropped_edits(&self) -> u64 {
		self.stats.dropped.load(Ordering::Relaxed)
	}

	/// Stops accepting edits, lets the pending edit finish, then waits for the task.
	pub async fn shutdown(mut self) {
		self.input.close();
		let Some(task) = self.task.take() else {
			return;
		};
		if let Err(err) = task.await
			&& let Some(msg) = roster_worker::join_error_panic_message(err)
		{
			tracing::error!(panic = %msg, "query.engine.panicked");
		}
	}
}

impl Drop for QueryEngine {
	fn drop(&mut self) {
		self.input.close();
	}
}

impl QueryResults {
	/// Waits for the next event. Returns `None` after the engine stopped.
	pub async fn recv(&mut self) -> Option<QueryEvent> {
		self.rx.recv().await
	}
}

impl Stream for QueryResults {
	type Item = QueryEvent;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		self.rx.poll_recv(cx)
	}
}

async fn run<S>(
	source: Arc<S>,
	initial: Edit,
	input: SlotReceiver<Edit>,
	output: mpsc::UnboundedSender<QueryEvent>,
	stats: Arc<EngineStats>,
) where
	S: DirectorySource + ?Sized,
{
	let mut next = Some(initial);
	while let Some(edit) = next {
		stats.busy.store(true, Ordering::Release);
		let outcome = evaluate(source.as_ref(), &edit.text).await;
		stats.busy.store(false, Ordering::Release);

		match &outcome {
			Ok(query) => tracing::debug!(edit = edit.seq, matches = query.matches.len(), "query.evaluated"),
			Err(err) => tracing::warn!(edit = edit.seq, error = %err, "query.failed"),
		}

		let event = QueryEvent {
			edit: edit.seq,
			text: edit.text,
			outcome,
		};
		if output.send(event).is_err() {
			tracing::debug!("query.engine.consumer_gone");
			break;
		}
		next = input.take().await;
	}
	tracing::debug!("query.engine.stopped");
}

async fn evaluate<S>(source: &S, text: &str) -> Result<Query, QueryError>
where
	S: DirectorySource + ?Sized,
{
	let snapshot = source.snapshot().await?;
	Ok(filter(&snapshot, text)?)
}
