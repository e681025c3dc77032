//! Ledger state and the transactional envelope around every mutation.
//!
//! `LedgerState` is the whole arena: configurations and trackers keyed by
//! call type, proposals keyed by id, the id allocator and the event trail.
//!
//! All mutation goes through a `Transaction`. It checkpoints the parts of the
//! state an operation may touch and restores them when dropped without
//! `commit`, so an error anywhere (including after the execute step has
//! already marked a proposal executed, or a cancelled dispatch future) leaves
//! no trace.
//!
//! ## Checkpoint cost
//!
//! - configurations and trackers: cloned (bounded by live call types and
//!   open proposals)
//! - proposals: copy-on-write, only those touched by the operation
//! - event trail: length recorded, truncated on rollback

use super::config::CallTypeConfig;
use super::proposal::Proposal;
use crate::gatekeeper::admission::CallTypeTracker;
use crate::gatekeeper::audit_trail::{EventTrail, LedgerEvent};
use crate::primitives::{CallType, ProposalId};
use crate::serialization::{from_cbor, to_cbor, SerializationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Complete ledger state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerState {
    pub(crate) configs: BTreeMap<CallType, CallTypeConfig>,
    pub(crate) trackers: BTreeMap<CallType, CallTypeTracker>,
    pub(crate) proposals: BTreeMap<ProposalId, Proposal>,
    pub(crate) next_id: ProposalId,
    pub(crate) events: EventTrail,
}

impl LedgerState {
    /// Create new empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SerializationError> {
        to_cbor(self)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SerializationError> {
        from_cbor(bytes)
    }
}

struct Checkpoint {
    configs: BTreeMap<CallType, CallTypeConfig>,
    trackers: BTreeMap<CallType, CallTypeTracker>,
    next_id: ProposalId,
    event_len: usize,
    /// Original value of each touched proposal (`None`: did not exist).
    proposals: BTreeMap<ProposalId, Option<Proposal>>,
}

/// All-or-nothing mutation scope over a `LedgerState`.
pub(crate) struct Transaction<'a> {
    state: &'a mut LedgerState,
    checkpoint: Option<Checkpoint>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(state: &'a mut LedgerState) -> Self {
        let checkpoint = Checkpoint {
            configs: state.configs.clone(),
            trackers: state.trackers.clone(),
            next_id: state.next_id,
            event_len: state.events.len(),
            proposals: BTreeMap::new(),
        };

        Self {
            state,
            checkpoint: Some(checkpoint),
        }
    }

    /// Keep every change made in this transaction.
    pub(crate) fn commit(mut self) {
        self.checkpoint = None;
    }

    pub(crate) fn configs_mut(&mut self) -> &mut BTreeMap<CallType, CallTypeConfig> {
        &mut self.state.configs
    }

    /// Tracker for `call_type`, created empty if missing.
    pub(crate) fn tracker_mut(&mut self, call_type: CallType) -> &mut CallTypeTracker {
        self.state.trackers.entry(call_type).or_default()
    }

    pub(crate) fn remove_tracker_if_empty(&mut self, call_type: &CallType) {
        if self.state.trackers.get(call_type).is_some_and(|t| t.is_empty()) {
            self.state.trackers.remove(call_type);
        }
    }

    /// Mutable access to a proposal, recording its prior value first.
    pub(crate) fn proposal_mut(&mut self, id: ProposalId) -> Option<&mut Proposal> {
        self.remember_proposal(id);
        self.state.proposals.get_mut(&id)
    }

    pub(crate) fn insert_proposal(&mut self, proposal: Proposal) {
        self.remember_proposal(proposal.id());
        self.state.proposals.insert(proposal.id(), proposal);
    }

    /// Allocate the next proposal id. Ids are never reused.
    pub(crate) fn allocate_id(&mut self) -> ProposalId {
        let id = self.state.next_id;
        self.state.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.state.events.emit(event);
    }

    fn remember_proposal(&mut self, id: ProposalId) {
        if let Some(checkpoint) = self.checkpoint.as_mut() {
            if !checkpoint.proposals.contains_key(&id) {
                checkpoint
                    .proposals
                    .insert(id, self.state.proposals.get(&id).cloned());
            }
        }
    }
}

impl Deref for Transaction<'_> {
    type Target = LedgerState;

    fn deref(&self) -> &LedgerState {
        self.state
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        let Some(checkpoint) = self.checkpoint.take() else {
            return;
        };

        self.state.configs = checkpoint.configs;
        self.state.trackers = checkpoint.trackers;
        self.state.next_id = checkpoint.next_id;
        self.state.events.truncate(checkpoint.event_len);
        for (id, original) in checkpoint.proposals {
            match original {
                Some(proposal) => {
                    self.state.proposals.insert(id, proposal);
                }
                None => {
                    self.state.proposals.remove(&id);
                }
            }
        }

        tracing::debug!("ledger transaction rolled back");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{Address, Selector};

    fn call_type() -> CallType {
        CallType::new(Address::from_label("target"), Selector::new([1, 2, 3, 4]))
    }

    fn open_proposal(tx: &mut Transaction<'_>) -> ProposalId {
        let id = tx.allocate_id();
        let proposer = Address::from_label("alice");
        tx.insert_proposal(Proposal::new(id, proposer, call_type(), vec![1]));
        tx.tracker_mut(call_type()).record_open(id, proposer);
        tx.emit(LedgerEvent::ProposalCreated {
            id,
            call_type: call_type(),
            proposer,
        });
        id
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut state = LedgerState::new();
        let mut tx = Transaction::begin(&mut state);
        open_proposal(&mut tx);
        tx.commit();

        assert_eq!(state.next_id, 1);
        assert_eq!(state.proposals.len(), 1);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn test_drop_without_commit_restores_everything() {
        let mut state = LedgerState::new();
        {
            let mut tx = Transaction::begin(&mut state);
            open_proposal(&mut tx);
            tx.commit();
        }
        let before = state.clone();

        {
            let mut tx = Transaction::begin(&mut state);
            open_proposal(&mut tx);
            if let Some(p) = tx.proposal_mut(0) {
                p.approvals_mut().add(Address::from_label("bob"));
            }
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_state_cbor_roundtrip() {
        let mut state = LedgerState::new();
        let mut tx = Transaction::begin(&mut state);
        open_proposal(&mut tx);
        tx.commit();

        let bytes = state.to_bytes().unwrap();
        let restored = LedgerState::from_bytes(&bytes).unwrap();
        assert_eq!(restored, state);
    }
}
