//! Role guards.
//!
//! Invoked first in every mutating operation, before any state is touched.

use super::error::{LedgerError, LedgerResult};
use super::proposal::Proposal;
use super::state::LedgerState;
use crate::gatekeeper::admin::AdminList;
use crate::primitives::{Address, CallType, ProposalId};

/// Caller must be on the admin allow-list.
pub(crate) fn require_admin<A: AdminList + ?Sized>(
    admins: &A,
    caller: &Address,
) -> LedgerResult<()> {
    if !admins.is_admin(caller) {
        return Err(LedgerError::NotAdmin(*caller));
    }
    Ok(())
}

/// Caller must be an approver of `call_type`'s current configuration.
pub(crate) fn require_approver(
    state: &LedgerState,
    call_type: &CallType,
    caller: &Address,
) -> LedgerResult<()> {
    if !state.is_approver(call_type, caller) {
        return Err(LedgerError::NotApprover {
            caller: *caller,
            call_type: *call_type,
        });
    }
    Ok(())
}

/// Caller must be the proposal's original proposer.
pub(crate) fn require_proposer(proposal: &Proposal, caller: &Address) -> LedgerResult<()> {
    if proposal.proposer() != caller {
        return Err(LedgerError::NotProposer {
            caller: *caller,
            id: proposal.id(),
        });
    }
    Ok(())
}

/// Proposal must exist. Absence is reported as "not open".
pub(crate) fn require_proposal(state: &LedgerState, id: ProposalId) -> LedgerResult<&Proposal> {
    state.proposal(id).ok_or(LedgerError::NotOpen(id))
}

/// Proposal must be in one of the open states.
pub(crate) fn require_open(proposal: &Proposal) -> LedgerResult<()> {
    if !proposal.state().is_open() {
        return Err(LedgerError::NotOpen(proposal.id()));
    }
    Ok(())
}
