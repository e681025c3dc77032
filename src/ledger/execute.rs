//! Execution engine.
//!
//! Order of checks:
//! 1. proposal exists and the caller approves for its call type
//! 2. state is exactly `OpenAndExecutable`
//! 3. the endpoint is callable
//!
//! Only then is the proposal marked `Executed` and the invocation dispatched.
//! A failed dispatch returns an error, and the enclosing transaction undoes
//! the `Executed` transition when it is dropped.

use super::error::{LedgerError, LedgerResult};
use super::guards::{require_approver, require_proposal};
use super::proposal::ProposalState;
use super::state::Transaction;
use crate::dispatch::{decode_revert_reason, Dispatcher, Invocation};
use crate::gatekeeper::audit_trail::LedgerEvent;
use crate::primitives::{Address, CallType, ProposalId};
use tracing::{debug, warn};

impl Transaction<'_> {
    fn check_executable(&self, caller: &Address, id: ProposalId) -> LedgerResult<CallType> {
        let proposal = require_proposal(self, id)?;
        require_approver(self, proposal.call_type(), caller)?;

        match proposal.state() {
            ProposalState::OpenAndExecutable => Ok(*proposal.call_type()),
            ProposalState::Open => Err(LedgerError::NeedsMoreApprovals(id)),
            _ => Err(LedgerError::NotOpen(id)),
        }
    }

    /// Mark `id` executed, release it from the tracker and build the call.
    fn mark_executed(
        &mut self,
        id: ProposalId,
        executor: Address,
        value: u128,
    ) -> LedgerResult<Invocation> {
        let proposal = self.proposal_mut(id).ok_or(LedgerError::NotOpen(id))?;
        proposal.set_state(ProposalState::Executed);
        let call_type = *proposal.call_type();
        let proposer = *proposal.proposer();
        let invocation = Invocation::for_operation(
            call_type.endpoint,
            call_type.selector,
            proposal.payload(),
            value,
        );

        self.tracker_mut(call_type).release(id, &proposer);
        self.remove_tracker_if_empty(&call_type);

        self.emit(LedgerEvent::ProposalExecuted {
            id,
            call_type,
            executor,
        });
        Ok(invocation)
    }

    /// Execute `id`, returning the target's raw return data.
    ///
    /// The transaction must not be committed when this returns an error.
    pub(crate) async fn apply_execute<D: Dispatcher + ?Sized>(
        &mut self,
        dispatcher: &D,
        caller: Address,
        id: ProposalId,
        value: u128,
    ) -> LedgerResult<Vec<u8>> {
        let call_type = self.check_executable(&caller, id)?;

        if !dispatcher.is_callable(&call_type.endpoint).await {
            warn!(proposal = id, endpoint = %call_type.endpoint, "Target is not callable");
            return Err(LedgerError::TargetNotCallable(call_type.endpoint));
        }

        let invocation = self.mark_executed(id, caller, value)?;
        debug!(proposal = id, call_type = %call_type, value, "Dispatching proposal");

        match dispatcher.invoke(&invocation).await {
            Ok(outcome) if outcome.success => Ok(outcome.return_data),
            Ok(outcome) => {
                let reason = decode_revert_reason(&outcome.return_data);
                warn!(proposal = id, reason = ?reason, "Dispatched call reverted");
                Err(LedgerError::CallFailed { reason })
            }
            Err(e) => {
                warn!(proposal = id, error = %e, "Dispatch failed");
                Err(LedgerError::CallFailed { reason: None })
            }
        }
    }
}
