//! Call-type configuration store.
//!
//! One `CallTypeConfig` per call type. Writing or removing a configuration
//! bulk-closes every open proposal of that call type, so an open proposal
//! always belongs to the configuration currently in force.

use super::error::{LedgerError, LedgerResult};
use super::proposal::ProposalState;
use super::state::Transaction;
use crate::collections::OrderedSet;
use crate::gatekeeper::audit_trail::LedgerEvent;
use crate::primitives::{Address, CallType};
use serde::{Deserialize, Serialize};

/// Approval policy of one call type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTypeConfig {
    /// Minimum distinct approvals to execute. Zero means "not configured".
    threshold: u32,
    /// Maximum concurrently open proposals per approver.
    open_cap: u32,
    approvers: OrderedSet<Address>,
}

impl CallTypeConfig {
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn open_cap(&self) -> u32 {
        self.open_cap
    }

    pub fn approvers(&self) -> &OrderedSet<Address> {
        &self.approvers
    }

    pub fn is_configured(&self) -> bool {
        self.threshold > 0
    }
}

impl Transaction<'_> {
    /// Write the configuration of `call_type`, replacing any previous one.
    ///
    /// Returns the number of open proposals closed by the change.
    pub(crate) fn apply_configure(
        &mut self,
        admin: Address,
        call_type: CallType,
        threshold: u32,
        open_cap: u32,
        approvers: &[Address],
        close_executable: bool,
    ) -> LedgerResult<usize> {
        if threshold == 0 {
            return Err(LedgerError::ZeroThreshold);
        }
        if open_cap == 0 {
            return Err(LedgerError::ZeroOpenCap);
        }
        if call_type.endpoint.is_zero() {
            return Err(LedgerError::NullEndpoint);
        }

        let config = self.configs_mut().entry(call_type).or_default();
        config.approvers.clear();
        for approver in approvers {
            config.approvers.add(*approver);
        }

        // Duplicates collapsed above; only distinct approvers count.
        if config.approvers.len() < threshold as usize {
            return Err(LedgerError::InsufficientApprovers {
                approvers: config.approvers.len(),
                threshold,
            });
        }

        config.threshold = threshold;
        config.open_cap = open_cap;
        let approvers = config.approvers.elements();

        let closed = self.bulk_close(call_type, admin, close_executable)?;

        self.emit(LedgerEvent::ConfigurationChanged {
            call_type,
            admin,
            threshold,
            open_cap,
            approvers,
        });
        Ok(closed)
    }

    /// Remove the configuration of `call_type`.
    ///
    /// Returns the number of open proposals closed by the removal.
    pub(crate) fn apply_remove_configuration(
        &mut self,
        admin: Address,
        call_type: CallType,
        close_executable: bool,
    ) -> LedgerResult<usize> {
        if !self.is_configured(&call_type) {
            return Err(LedgerError::NotConfigured(call_type));
        }

        self.configs_mut().remove(&call_type);
        let closed = self.bulk_close(call_type, admin, close_executable)?;
        self.remove_tracker_if_empty(&call_type);

        self.emit(LedgerEvent::ConfigurationRemoved { call_type, admin });
        Ok(closed)
    }

    /// Close every open proposal of `call_type`, first-opened first.
    ///
    /// Fails on the first executable proposal unless `close_executable`;
    /// the enclosing transaction then discards the closures already made.
    fn bulk_close(
        &mut self,
        call_type: CallType,
        closer: Address,
        close_executable: bool,
    ) -> LedgerResult<usize> {
        let mut closed = 0;

        while let Some(id) = self.trackers.get(&call_type).and_then(|t| t.first_open()) {
            let state = self.proposal_state(id);
            debug_assert!(state.is_open(), "tracked proposal {} is {}", id, state);
            if state == ProposalState::OpenAndExecutable && !close_executable {
                return Err(LedgerError::ExecutableProposalExists(call_type));
            }

            self.close_open_proposal(id, closer);
            closed += 1;
        }

        Ok(closed)
    }
}
