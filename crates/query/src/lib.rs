//! Incremental user lookup for the users screen.
//!
//! # Data flow
//!
//! 1. Every email edit is handed to [`QueryEngine::edit`].
//! 2. The engine evaluates one edit at a time against the
//!    [`roster_directory::DirectorySource`]; edits arriving meanwhile collapse
//!    into one pending edit.
//! 3. Each evaluation yields a [`QueryEvent`] on [`QueryResults`], in edit order.
//! 4. [`AutoPopulationRule`] projects a [`Query`] to an optional
//!    [`PopulateInstruction`] which the consumer applies to its form.
//!
//! # Invariants
//!
//! * Results are delivered in strictly increasing edit order.
//! * The latest edit is always evaluated; only superseded pending edits are dropped.
//! * A failed evaluation is delivered as an event and never stops the engine.

mod engine;
mod error;
mod filter;
mod populate;

pub use engine::{EngineClosed, QueryEngine, QueryEvent, QueryResults};
pub use error::{FilterError, QueryError};
pub use filter::{Query, filter};
pub use populate::{AutoPopulationRule, PopulateInstruction, PopulateSink};
