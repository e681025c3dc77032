//! Proposal store and lifecycle transitions.
//!
//! ```text
//! NotExist ──propose──▶ Open ◀──rescind── OpenAndExecutable ──execute──▶ Executed
//!                        │   ───approve──▶        │
//!                        └────────close───────────┴──▶ Closed
//! ```
//!
//! Proposer, call type and payload are fixed at creation. `Closed` and
//! `Executed` are terminal: nothing changes a proposal once it gets there.

use super::error::{LedgerError, LedgerResult};
use super::guards::{require_approver, require_open, require_proposal, require_proposer};
use super::state::Transaction;
use crate::collections::OrderedSet;
use crate::gatekeeper::audit_trail::LedgerEvent;
use crate::primitives::{Address, CallType, ProposalId, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    /// No proposal was ever created with this id.
    NotExist,
    /// Awaiting approvals.
    Open,
    /// Threshold met; any approver may execute.
    OpenAndExecutable,
    /// Closed by its proposer or by a configuration change.
    Closed,
    /// Dispatched successfully.
    Executed,
}

impl ProposalState {
    pub fn is_open(&self) -> bool {
        matches!(self, ProposalState::Open | ProposalState::OpenAndExecutable)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalState::Closed | ProposalState::Executed)
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalState::NotExist => "not-exist",
            ProposalState::Open => "open",
            ProposalState::OpenAndExecutable => "executable",
            ProposalState::Closed => "closed",
            ProposalState::Executed => "executed",
        };
        f.write_str(name)
    }
}

/// A pending request to invoke one call type with one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    id: ProposalId,
    state: ProposalState,
    proposer: Address,
    call_type: CallType,
    payload: Vec<u8>,
    approvals: OrderedSet<Address>,
}

impl Proposal {
    /// Create an `Open` proposal with no approvals.
    pub fn new(id: ProposalId, proposer: Address, call_type: CallType, payload: Vec<u8>) -> Self {
        Self {
            id,
            state: ProposalState::Open,
            proposer,
            call_type,
            payload,
            approvals: OrderedSet::new(),
        }
    }

    pub fn id(&self) -> ProposalId {
        self.id
    }

    pub fn state(&self) -> ProposalState {
        self.state
    }

    pub fn proposer(&self) -> &Address {
        &self.proposer
    }

    pub fn call_type(&self) -> &CallType {
        &self.call_type
    }

    pub fn endpoint(&self) -> &Address {
        &self.call_type.endpoint
    }

    pub fn selector(&self) -> &Selector {
        &self.call_type.selector
    }

    /// Argument payload, passed to the endpoint verbatim on execution.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Approvers in the order they approved.
    pub fn approvals(&self) -> &OrderedSet<Address> {
        &self.approvals
    }

    pub fn approval_count(&self) -> u32 {
        self.approvals.len() as u32
    }

    pub(crate) fn approvals_mut(&mut self) -> &mut OrderedSet<Address> {
        &mut self.approvals
    }

    pub(crate) fn set_state(&mut self, state: ProposalState) {
        self.state = state;
    }
}

impl Transaction<'_> {
    /// Open a new proposal for `call_type`.
    pub(crate) fn apply_propose(
        &mut self,
        caller: Address,
        call_type: CallType,
        payload: Vec<u8>,
    ) -> LedgerResult<ProposalId> {
        if !self.is_configured(&call_type) {
            return Err(LedgerError::NotConfigured(call_type));
        }
        require_approver(self, &call_type, &caller)?;

        let cap = self.open_cap(&call_type);
        if let Some(tracker) = self.trackers.get(&call_type) {
            tracker
                .check_open_cap(&caller, cap)
                .map_err(|_| LedgerError::OpenCapReached { cap })?;
        }

        let id = self.allocate_id();
        self.insert_proposal(Proposal::new(id, caller, call_type, payload));
        self.tracker_mut(call_type).record_open(id, caller);

        self.emit(LedgerEvent::ProposalCreated {
            id,
            call_type,
            proposer: caller,
        });
        Ok(id)
    }

    /// Add `caller`'s approval. Returns the resulting state.
    pub(crate) fn apply_approve(
        &mut self,
        caller: Address,
        id: ProposalId,
    ) -> LedgerResult<ProposalState> {
        let proposal = require_proposal(self, id)?;
        let call_type = *proposal.call_type();
        require_approver(self, &call_type, &caller)?;
        require_open(proposal)?;
        if proposal.approvals.contains(&caller) {
            return Err(LedgerError::AlreadyApproved {
                id,
                approver: caller,
            });
        }

        let threshold = self.threshold(&call_type);
        let proposal = self.proposal_mut(id).ok_or(LedgerError::NotOpen(id))?;
        proposal.approvals.add(caller);
        let approvals = proposal.approval_count();
        if approvals >= threshold {
            proposal.state = ProposalState::OpenAndExecutable;
        }
        let state = proposal.state;

        self.emit(LedgerEvent::ProposalApprovalSubmitted {
            id,
            call_type,
            approver: caller,
            approvals,
            threshold,
        });
        Ok(state)
    }

    /// Withdraw `caller`'s approval. Returns the resulting state.
    pub(crate) fn apply_rescind(
        &mut self,
        caller: Address,
        id: ProposalId,
    ) -> LedgerResult<ProposalState> {
        let proposal = require_proposal(self, id)?;
        let call_type = *proposal.call_type();
        require_approver(self, &call_type, &caller)?;
        require_open(proposal)?;
        if !proposal.approvals.contains(&caller) {
            return Err(LedgerError::NotApproved {
                id,
                approver: caller,
            });
        }

        let threshold = self.threshold(&call_type);
        let proposal = self.proposal_mut(id).ok_or(LedgerError::NotOpen(id))?;
        proposal.approvals.remove(&caller);
        let approvals = proposal.approval_count();
        if approvals < threshold {
            proposal.state = ProposalState::Open;
        }
        let state = proposal.state;

        self.emit(LedgerEvent::ProposalApprovalRescinded {
            id,
            call_type,
            approver: caller,
            approvals,
            threshold,
        });
        Ok(state)
    }

    /// Close an open proposal on its proposer's request.
    pub(crate) fn apply_close(&mut self, caller: Address, id: ProposalId) -> LedgerResult<()> {
        let proposal = require_proposal(self, id)?;
        require_proposer(proposal, &caller)?;
        require_open(proposal)?;

        self.close_open_proposal(id, caller);
        Ok(())
    }

    /// Move an open proposal to `Closed` and release its tracker slot.
    ///
    /// Callers have already checked that `id` is open.
    pub(crate) fn close_open_proposal(&mut self, id: ProposalId, closer: Address) {
        let Some(proposal) = self.proposal_mut(id) else {
            return;
        };
        proposal.state = ProposalState::Closed;
        let call_type = proposal.call_type;
        let proposer = proposal.proposer;

        self.tracker_mut(call_type).release(id, &proposer);
        self.remove_tracker_if_empty(&call_type);

        self.emit(LedgerEvent::ProposalClosed {
            id,
            call_type,
            closer,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::state::LedgerState;
    use crate::primitives::Selector;

    fn call_type() -> CallType {
        CallType::new(Address::from_label("target"), Selector::new([1, 2, 3, 4]))
    }

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn configured(threshold: u32, cap: u32) -> LedgerState {
        let mut state = LedgerState::new();
        let mut tx = Transaction::begin(&mut state);
        tx.apply_configure(
            addr("admin"),
            call_type(),
            threshold,
            cap,
            &[addr("a1"), addr("a2"), addr("a3")],
            false,
        )
        .unwrap();
        tx.commit();
        state
    }

    #[test]
    fn test_state_predicates() {
        assert!(ProposalState::Open.is_open());
        assert!(ProposalState::OpenAndExecutable.is_open());
        assert!(!ProposalState::Closed.is_open());
        assert!(ProposalState::Executed.is_terminal());
        assert!(!ProposalState::NotExist.is_terminal());
        assert_eq!(ProposalState::OpenAndExecutable.to_string(), "executable");
    }

    #[test]
    fn test_propose_requires_approver() {
        let mut state = configured(2, 5);
        let mut tx = Transaction::begin(&mut state);
        let err = tx
            .apply_propose(addr("mallory"), call_type(), vec![])
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotApprover { .. }));
    }

    #[test]
    fn test_propose_unconfigured_is_not_configured() {
        let mut state = LedgerState::new();
        let mut tx = Transaction::begin(&mut state);
        let err = tx.apply_propose(addr("a1"), call_type(), vec![]).unwrap_err();
        assert_eq!(err, LedgerError::NotConfigured(call_type()));
        assert_eq!(tx.next_proposal_id(), 0);
    }

    #[test]
    fn test_approve_crosses_threshold() {
        let mut state = configured(2, 5);
        let mut tx = Transaction::begin(&mut state);
        let id = tx.apply_propose(addr("a1"), call_type(), vec![7]).unwrap();

        assert_eq!(tx.apply_approve(addr("a1"), id).unwrap(), ProposalState::Open);
        assert_eq!(
            tx.apply_approve(addr("a1"), id),
            Err(LedgerError::AlreadyApproved {
                id,
                approver: addr("a1")
            })
        );
        assert_eq!(
            tx.apply_approve(addr("a2"), id).unwrap(),
            ProposalState::OpenAndExecutable
        );
        assert_eq!(
            tx.apply_rescind(addr("a2"), id).unwrap(),
            ProposalState::Open
        );
        assert_eq!(
            tx.apply_rescind(addr("a3"), id),
            Err(LedgerError::NotApproved {
                id,
                approver: addr("a3")
            })
        );
    }

    #[test]
    fn test_close_only_by_proposer() {
        let mut state = configured(1, 5);
        let mut tx = Transaction::begin(&mut state);
        let id = tx.apply_propose(addr("a1"), call_type(), vec![]).unwrap();

        assert_eq!(
            tx.apply_close(addr("a2"), id),
            Err(LedgerError::NotProposer {
                caller: addr("a2"),
                id
            })
        );
        tx.apply_close(addr("a1"), id).unwrap();
        assert_eq!(tx.apply_close(addr("a1"), id), Err(LedgerError::NotOpen(id)));
        assert_eq!(
            tx.apply_approve(addr("a2"), id),
            Err(LedgerError::NotOpen(id))
        );
        tx.commit();

        assert_eq!(state.proposal_state(id), ProposalState::Closed);
        assert!(state.open_proposals(&call_type()).is_empty());
        assert_eq!(state.open_count(&call_type(), &addr("a1")), 0);
    }

    #[test]
    fn test_unknown_proposal_is_not_open() {
        let mut state = configured(1, 5);
        let mut tx = Transaction::begin(&mut state);
        assert_eq!(tx.apply_approve(addr("a1"), 42), Err(LedgerError::NotOpen(42)));
        assert_eq!(tx.apply_close(addr("a1"), 42), Err(LedgerError::NotOpen(42)));
    }
}
