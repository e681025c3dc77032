//! Ledger Event Trail
//!
//! Every state transition emits exactly one event; bulk closes emit one
//! `ProposalClosed` per affected proposal before the triggering
//! configuration event.
//!
//! Design principles:
//! - Immutable append-only log (no deletion, no rewrite)
//! - Strictly increasing sequence numbers starting at 0
//! - Lives inside the ledger state, so a rolled-back operation leaves no events

use crate::primitives::{Address, CallType, ProposalId};
use serde::{Deserialize, Serialize};

/// A single state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ConfigurationChanged {
        call_type: CallType,
        admin: Address,
        threshold: u32,
        open_cap: u32,
        approvers: Vec<Address>,
    },
    ConfigurationRemoved {
        call_type: CallType,
        admin: Address,
    },
    ProposalCreated {
        id: ProposalId,
        call_type: CallType,
        proposer: Address,
    },
    /// `approvals` and `threshold` let observers compute what is still
    /// missing without a second query.
    ProposalApprovalSubmitted {
        id: ProposalId,
        call_type: CallType,
        approver: Address,
        approvals: u32,
        threshold: u32,
    },
    ProposalApprovalRescinded {
        id: ProposalId,
        call_type: CallType,
        approver: Address,
        approvals: u32,
        threshold: u32,
    },
    ProposalClosed {
        id: ProposalId,
        call_type: CallType,
        closer: Address,
    },
    ProposalExecuted {
        id: ProposalId,
        call_type: CallType,
        executor: Address,
    },
}

/// Event discriminant, for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    ConfigurationChanged,
    ConfigurationRemoved,
    ProposalCreated,
    ProposalApprovalSubmitted,
    ProposalApprovalRescinded,
    ProposalClosed,
    ProposalExecuted,
}

impl LedgerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LedgerEvent::ConfigurationChanged { .. } => EventKind::ConfigurationChanged,
            LedgerEvent::ConfigurationRemoved { .. } => EventKind::ConfigurationRemoved,
            LedgerEvent::ProposalCreated { .. } => EventKind::ProposalCreated,
            LedgerEvent::ProposalApprovalSubmitted { .. } => EventKind::ProposalApprovalSubmitted,
            LedgerEvent::ProposalApprovalRescinded { .. } => EventKind::ProposalApprovalRescinded,
            LedgerEvent::ProposalClosed { .. } => EventKind::ProposalClosed,
            LedgerEvent::ProposalExecuted { .. } => EventKind::ProposalExecuted,
        }
    }

    pub fn call_type(&self) -> &CallType {
        match self {
            LedgerEvent::ConfigurationChanged { call_type, .. }
            | LedgerEvent::ConfigurationRemoved { call_type, .. }
            | LedgerEvent::ProposalCreated { call_type, .. }
            | LedgerEvent::ProposalApprovalSubmitted { call_type, .. }
            | LedgerEvent::ProposalApprovalRescinded { call_type, .. }
            | LedgerEvent::ProposalClosed { call_type, .. }
            | LedgerEvent::ProposalExecuted { call_type, .. } => call_type,
        }
    }

    /// Proposal the event concerns, if any.
    pub fn proposal_id(&self) -> Option<ProposalId> {
        match self {
            LedgerEvent::ProposalCreated { id, .. }
            | LedgerEvent::ProposalApprovalSubmitted { id, .. }
            | LedgerEvent::ProposalApprovalRescinded { id, .. }
            | LedgerEvent::ProposalClosed { id, .. }
            | LedgerEvent::ProposalExecuted { id, .. } => Some(*id),
            LedgerEvent::ConfigurationChanged { .. } | LedgerEvent::ConfigurationRemoved { .. } => {
                None
            }
        }
    }

    /// Principal that caused the event.
    pub fn actor(&self) -> &Address {
        match self {
            LedgerEvent::ConfigurationChanged { admin, .. }
            | LedgerEvent::ConfigurationRemoved { admin, .. } => admin,
            LedgerEvent::ProposalCreated { proposer, .. } => proposer,
            LedgerEvent::ProposalApprovalSubmitted { approver, .. }
            | LedgerEvent::ProposalApprovalRescinded { approver, .. } => approver,
            LedgerEvent::ProposalClosed { closer, .. } => closer,
            LedgerEvent::ProposalExecuted { executor, .. } => executor,
        }
    }
}

/// Event with its position in the trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: LedgerEvent,
}

/// Append-only event log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTrail {
    records: Vec<EventRecord>,
}

impl EventTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its sequence number.
    pub fn emit(&mut self, event: LedgerEvent) -> u64 {
        let sequence = self.records.len() as u64;
        self.records.push(EventRecord { sequence, event });
        sequence
    }

    /// All records, oldest first.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records emitted by a rolled-back transaction.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }
}

/// Query options for the event trail.
#[derive(Debug, Clone)]
pub struct EventQuery {
    /// Filter by event kind.
    pub kind: Option<EventKind>,
    /// Filter by call type.
    pub call_type: Option<CallType>,
    /// Filter by proposal.
    pub proposal: Option<ProposalId>,
    /// Filter by acting principal.
    pub actor: Option<Address>,
    /// Only records with a sequence greater than this.
    pub after_sequence: Option<u64>,
    /// Limit number of results (most recent first).
    pub limit: Option<usize>,
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            kind: None,
            call_type: None,
            proposal: None,
            actor: None,
            after_sequence: None,
            limit: Some(50),
        }
    }
}

impl EventQuery {
    /// Query with no filters and no limit.
    pub fn all() -> Self {
        Self {
            limit: None,
            ..Self::default()
        }
    }

    fn matches(&self, record: &EventRecord) -> bool {
        if let Some(kind) = self.kind {
            if record.event.kind() != kind {
                return false;
            }
        }

        if let Some(ref call_type) = self.call_type {
            if record.event.call_type() != call_type {
                return false;
            }
        }

        if let Some(id) = self.proposal {
            if record.event.proposal_id() != Some(id) {
                return false;
            }
        }

        if let Some(ref actor) = self.actor {
            if record.event.actor() != actor {
                return false;
            }
        }

        if let Some(after) = self.after_sequence {
            if record.sequence <= after {
                return false;
            }
        }

        true
    }
}

/// Query the trail with filters.
///
/// Returns records in reverse chronological order (most recent first).
pub fn query_events(trail: &EventTrail, query: &EventQuery) -> Vec<EventRecord> {
    let mut filtered: Vec<EventRecord> = trail
        .records()
        .iter()
        .rev()
        .filter(|record| query.matches(record))
        .cloned()
        .collect();

    if let Some(limit) = query.limit {
        filtered.truncate(limit);
    }

    filtered
}

/// Format records for terminal display, one line per event.
pub fn format_events(records: &[EventRecord]) -> String {
    if records.is_empty() {
        return "No events found.".to_string();
    }

    let mut output = String::new();
    for record in records {
        output.push_str(&format!("#{:<6} {}\n", record.sequence, describe(&record.event)));
    }
    output
}

fn describe(event: &LedgerEvent) -> String {
    match event {
        LedgerEvent::ConfigurationChanged {
            call_type,
            admin,
            threshold,
            open_cap,
            approvers,
        } => format!(
            "ConfigurationChanged {} by {} (threshold {}, cap {}, {} approvers)",
            call_type,
            admin,
            threshold,
            open_cap,
            approvers.len()
        ),
        LedgerEvent::ConfigurationRemoved { call_type, admin } => {
            format!("ConfigurationRemoved {} by {}", call_type, admin)
        }
        LedgerEvent::ProposalCreated {
            id,
            call_type,
            proposer,
        } => format!("ProposalCreated {} for {} by {}", id, call_type, proposer),
        LedgerEvent::ProposalApprovalSubmitted {
            id,
            approver,
            approvals,
            threshold,
            ..
        } => format!(
            "ProposalApprovalSubmitted {} by {} ({}/{})",
            id, approver, approvals, threshold
        ),
        LedgerEvent::ProposalApprovalRescinded {
            id,
            approver,
            approvals,
            threshold,
            ..
        } => format!(
            "ProposalApprovalRescinded {} by {} ({}/{})",
            id, approver, approvals, threshold
        ),
        LedgerEvent::ProposalClosed { id, closer, .. } => {
            format!("ProposalClosed {} by {}", id, closer)
        }
        LedgerEvent::ProposalExecuted { id, executor, .. } => {
            format!("ProposalExecuted {} by {}", id, executor)
        }
    }
}
