//! Multi-party approval ledger.
//!
//! An admin configures a call type with approvers, a threshold and an open
//! cap. Approvers propose invocations of it, approve them and, once the
//! threshold is met, execute them through a `Dispatcher`.
//!
//! ## Serialization
//!
//! Every mutating operation holds the write lock for its whole duration
//! (including the awaited dispatch) and runs inside a `Transaction`, so it
//! either fully applies or leaves no trace. Queries take the read lock.
//!
//! Dispatch targets must not call back into the same ledger.

pub mod config;
pub mod error;
mod execute;
mod guards;
pub mod proposal;
pub mod query;
pub mod state;

#[cfg(test)]
mod proptests;

pub use config::CallTypeConfig;
pub use error::{ErrorKind, LedgerError, LedgerResult};
pub use proposal::{Proposal, ProposalState};
pub use query::{ConfigurationView, ProposalView};
pub use state::LedgerState;

use crate::dispatch::Dispatcher;
use crate::gatekeeper::admin::AdminList;
use crate::primitives::{Address, CallType, ProposalId};
use guards::require_admin;
use state::Transaction;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Approval ledger over an admin allow-list and a dispatcher.
pub struct Ledger<A: AdminList, D: Dispatcher> {
    state: RwLock<LedgerState>,
    admins: A,
    dispatcher: D,
}

impl<A: AdminList, D: Dispatcher> Ledger<A, D> {
    /// Create an empty ledger.
    pub fn new(admins: A, dispatcher: D) -> Self {
        Self::from_state(LedgerState::new(), admins, dispatcher)
    }

    /// Resume from a previously exported state.
    pub fn from_state(state: LedgerState, admins: A, dispatcher: D) -> Self {
        Self {
            state: RwLock::new(state),
            admins,
            dispatcher,
        }
    }

    /// Copy of the current state, for persistence.
    pub async fn snapshot(&self) -> LedgerState {
        self.state.read().await.clone()
    }

    pub fn into_state(self) -> LedgerState {
        self.state.into_inner()
    }

    pub fn admin_list(&self) -> &A {
        &self.admins
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Shared view of the state for several queries against one snapshot.
    pub async fn read(&self) -> RwLockReadGuard<'_, LedgerState> {
        self.state.read().await
    }

    /// Configure `call_type`. See `remove_configuration` for `close_executable`.
    pub async fn configure(
        &self,
        caller: Address,
        call_type: CallType,
        threshold: u32,
        open_cap: u32,
        approvers: &[Address],
        close_executable: bool,
    ) -> LedgerResult<()> {
        require_admin(&self.admins, &caller)?;

        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let closed = tx.apply_configure(
            caller,
            call_type,
            threshold,
            open_cap,
            approvers,
            close_executable,
        )?;
        tx.commit();

        info!(
            call_type = %call_type,
            threshold,
            open_cap,
            closed,
            "Configured call type"
        );
        Ok(())
    }

    /// Remove the configuration of `call_type`, closing its open proposals.
    ///
    /// Fails with `ExecutableProposalExists` if one of them has met its
    /// threshold, unless `close_executable` is set.
    pub async fn remove_configuration(
        &self,
        caller: Address,
        call_type: CallType,
        close_executable: bool,
    ) -> LedgerResult<()> {
        require_admin(&self.admins, &caller)?;

        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let closed = tx.apply_remove_configuration(caller, call_type, close_executable)?;
        tx.commit();

        info!(call_type = %call_type, closed, "Removed call type configuration");
        Ok(())
    }

    /// Open a proposal to invoke `call_type` with `payload`.
    pub async fn propose(
        &self,
        caller: Address,
        call_type: CallType,
        payload: Vec<u8>,
    ) -> LedgerResult<ProposalId> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let id = tx.apply_propose(caller, call_type, payload)?;
        tx.commit();

        info!(proposal = id, call_type = %call_type, proposer = %caller, "Proposal created");
        Ok(id)
    }

    pub async fn approve(&self, caller: Address, id: ProposalId) -> LedgerResult<ProposalState> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let new_state = tx.apply_approve(caller, id)?;
        tx.commit();

        debug!(proposal = id, approver = %caller, state = %new_state, "Approval submitted");
        Ok(new_state)
    }

    pub async fn rescind_approval(
        &self,
        caller: Address,
        id: ProposalId,
    ) -> LedgerResult<ProposalState> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let new_state = tx.apply_rescind(caller, id)?;
        tx.commit();

        debug!(proposal = id, approver = %caller, state = %new_state, "Approval rescinded");
        Ok(new_state)
    }

    /// Close an open proposal. Only its proposer may do so.
    pub async fn close_proposal(&self, caller: Address, id: ProposalId) -> LedgerResult<()> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.apply_close(caller, id)?;
        tx.commit();

        info!(proposal = id, closer = %caller, "Proposal closed");
        Ok(())
    }

    /// Execute an executable proposal, forwarding `value` to the target.
    ///
    /// Returns the target's return data. On failure nothing changes.
    pub async fn execute(
        &self,
        caller: Address,
        id: ProposalId,
        value: u128,
    ) -> LedgerResult<Vec<u8>> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let data = tx.apply_execute(&self.dispatcher, caller, id, value).await?;
        tx.commit();

        info!(proposal = id, executor = %caller, "Proposal executed");
        Ok(data)
    }

    /// Approve and execute as one step. The approval is discarded if the
    /// execution fails.
    pub async fn approve_and_execute(
        &self,
        caller: Address,
        id: ProposalId,
        value: u128,
    ) -> LedgerResult<Vec<u8>> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        tx.apply_approve(caller, id)?;
        let data = tx.apply_execute(&self.dispatcher, caller, id, value).await?;
        tx.commit();

        info!(proposal = id, executor = %caller, "Proposal approved and executed");
        Ok(data)
    }

    /// Propose, approve and execute as one step.
    ///
    /// Only succeeds when a single approval meets the threshold.
    pub async fn propose_and_execute(
        &self,
        caller: Address,
        call_type: CallType,
        payload: Vec<u8>,
        value: u128,
    ) -> LedgerResult<(ProposalId, Vec<u8>)> {
        let mut state = self.state.write().await;
        let mut tx = Transaction::begin(&mut state);
        let id = tx.apply_propose(caller, call_type, payload)?;
        tx.apply_approve(caller, id)?;
        let data = tx.apply_execute(&self.dispatcher, caller, id, value).await?;
        tx.commit();

        info!(proposal = id, call_type = %call_type, executor = %caller, "Proposal created and executed");
        Ok((id, data))
    }
}
