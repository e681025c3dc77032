//! approval-gate - Threshold Approval Ledger
//!
//! Puts a multi-party approval workflow in front of privileged operations.
//! An admin registers a call type (an operation on an endpoint) with a set of
//! approvers, a threshold and a per-approver open cap; approvers then propose,
//! approve and execute invocations of it.
//!
//! Key principles:
//! - Every operation is all-or-nothing, including a failed dispatch
//! - Mutations are serialized; queries see a consistent snapshot
//! - Every state transition is recorded in the event trail

pub mod collections;
pub mod dispatch;
pub mod gatekeeper;
pub mod ledger;
pub mod primitives;
pub mod serialization;

pub use ledger::{Ledger, LedgerError, LedgerResult, LedgerState, ProposalState};
pub use primitives::{Address, CallType, ProposalId, Selector};
