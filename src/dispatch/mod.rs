//! Dispatch of approved operations to their target endpoints.
//!
//! - `traits`: the `Dispatcher` capability and its value types
//! - `revert`: failure-reason codec
//! - `mock`: scripted dispatcher for tests
//! - `journal`: append-only journal dispatcher used by the CLI

pub mod journal;
pub mod mock;
pub mod revert;
pub mod traits;

pub use journal::JournalDispatcher;
pub use mock::{MockBehavior, MockDispatcher};
pub use revert::{decode_revert_reason, encode_revert_reason, failure_message};
pub use traits::{CallOutcome, DispatchError, DispatchResult, Dispatcher, Invocation};
