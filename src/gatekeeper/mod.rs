//! Gatekeeper: who may act on the ledger, how much, and what they did.
//!
//! - Admin: allow-list gating configuration changes
//! - Admission: per-call-type open-proposal tracking and the open cap
//! - Audit trail: append-only record of every state transition

pub mod admin;
pub mod admission;
pub mod audit_trail;

pub use admin::{AdminList, StaticAdminList};
pub use admission::CallTypeTracker;
pub use audit_trail::{
    format_events, query_events, EventKind, EventQuery, EventRecord, EventTrail, LedgerEvent,
};
