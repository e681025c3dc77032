//! Read-only query surface.
//!
//! Queries never fail and never mutate. Unknown call types read as
//! unconfigured (threshold 0, no approvers) and unknown proposal ids read as
//! `NotExist`.

use super::config::CallTypeConfig;
use super::proposal::{Proposal, ProposalState};
use super::state::LedgerState;
use super::Ledger;
use crate::dispatch::Dispatcher;
use crate::gatekeeper::admin::AdminList;
use crate::gatekeeper::audit_trail::{query_events, EventQuery, EventRecord};
use crate::primitives::{Address, CallType, ProposalId};
use serde::Serialize;

/// Display-friendly snapshot of a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposalView {
    pub id: ProposalId,
    pub state: ProposalState,
    pub proposer: String,
    pub endpoint: String,
    pub selector: String,
    /// Hex-encoded argument payload.
    pub payload: String,
    pub approvals: Vec<String>,
    /// Threshold of the call type's current configuration (0 if removed).
    pub threshold: u32,
}

/// Display-friendly snapshot of a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationView {
    pub call_type: String,
    pub threshold: u32,
    pub open_cap: u32,
    pub approvers: Vec<String>,
    pub open_proposals: Vec<ProposalId>,
}

impl LedgerState {
    pub fn configuration(&self, call_type: &CallType) -> Option<&CallTypeConfig> {
        self.configs.get(call_type)
    }

    pub fn threshold(&self, call_type: &CallType) -> u32 {
        self.configuration(call_type).map_or(0, |c| c.threshold())
    }

    pub fn open_cap(&self, call_type: &CallType) -> u32 {
        self.configuration(call_type).map_or(0, |c| c.open_cap())
    }

    pub fn approvers(&self, call_type: &CallType) -> Vec<Address> {
        self.configuration(call_type)
            .map(|c| c.approvers().elements())
            .unwrap_or_default()
    }

    pub fn is_approver(&self, call_type: &CallType, who: &Address) -> bool {
        self.configuration(call_type)
            .is_some_and(|c| c.approvers().contains(who))
    }

    pub fn is_configured(&self, call_type: &CallType) -> bool {
        self.configuration(call_type)
            .is_some_and(|c| c.is_configured())
    }

    /// Every configured call type, in key order.
    pub fn configured_call_types(&self) -> Vec<CallType> {
        self.configs
            .iter()
            .filter(|(_, c)| c.is_configured())
            .map(|(ct, _)| *ct)
            .collect()
    }

    pub fn proposal(&self, id: ProposalId) -> Option<&Proposal> {
        self.proposals.get(&id)
    }

    pub fn proposal_state(&self, id: ProposalId) -> ProposalState {
        self.proposal(id)
            .map_or(ProposalState::NotExist, |p| p.state())
    }

    pub fn proposer(&self, id: ProposalId) -> Option<Address> {
        self.proposal(id).map(|p| *p.proposer())
    }

    /// Approvers of `id`, in approval order.
    pub fn approvals(&self, id: ProposalId) -> Vec<Address> {
        self.proposal(id)
            .map(|p| p.approvals().elements())
            .unwrap_or_default()
    }

    pub fn approval_count(&self, id: ProposalId) -> u32 {
        self.proposal(id).map_or(0, |p| p.approval_count())
    }

    pub fn has_approved(&self, id: ProposalId, who: &Address) -> bool {
        self.proposal(id)
            .is_some_and(|p| p.approvals().contains(who))
    }

    /// Approvals still missing before `id` becomes executable.
    ///
    /// Zero for proposals that are not open.
    pub fn remaining_approvals(&self, id: ProposalId) -> u32 {
        match self.proposal(id) {
            Some(p) if p.state().is_open() => self
                .threshold(p.call_type())
                .saturating_sub(p.approval_count()),
            _ => 0,
        }
    }

    /// Open proposals of `call_type`, in creation order.
    pub fn open_proposals(&self, call_type: &CallType) -> Vec<ProposalId> {
        self.trackers
            .get(call_type)
            .map(|t| t.open_proposals().elements())
            .unwrap_or_default()
    }

    /// Open proposals of `call_type` that have met the threshold.
    ///
    /// Linear in the number of open proposals. Meant for diagnostics, not for
    /// use on every operation.
    pub fn executable_proposals(&self, call_type: &CallType) -> Vec<ProposalId> {
        let Some(tracker) = self.trackers.get(call_type) else {
            return Vec::new();
        };

        let mut executable = Vec::with_capacity(tracker.open_proposals().len());
        for id in tracker.open_proposals().iter() {
            if self.proposal_state(*id) == ProposalState::OpenAndExecutable {
                executable.push(*id);
            }
        }
        executable.shrink_to_fit();
        executable
    }

    /// Open proposals of `call_type` created by `proposer`.
    pub fn open_count(&self, call_type: &CallType, proposer: &Address) -> u32 {
        self.trackers
            .get(call_type)
            .map_or(0, |t| t.open_count(proposer))
    }

    /// Id the next proposal will receive.
    pub fn next_proposal_id(&self) -> ProposalId {
        self.next_id
    }

    /// Filtered event trail, most recent first.
    pub fn events(&self, query: &EventQuery) -> Vec<EventRecord> {
        query_events(&self.events, query)
    }

    pub fn proposal_view(&self, id: ProposalId) -> Option<ProposalView> {
        let p = self.proposal(id)?;
        Some(ProposalView {
            id,
            state: p.state(),
            proposer: p.proposer().to_string(),
            endpoint: p.endpoint().to_string(),
            selector: p.selector().to_string(),
            payload: hex::encode(p.payload()),
            approvals: p.approvals().iter().map(|a| a.to_string()).collect(),
            threshold: self.threshold(p.call_type()),
        })
    }

    pub fn configuration_view(&self, call_type: &CallType) -> Option<ConfigurationView> {
        let config = self.configuration(call_type)?;
        Some(ConfigurationView {
            call_type: call_type.to_string(),
            threshold: config.threshold(),
            open_cap: config.open_cap(),
            approvers: config.approvers().iter().map(|a| a.to_string()).collect(),
            open_proposals: self.open_proposals(call_type),
        })
    }
}

/// Async query wrappers, each served under the shared lock.
impl<A: AdminList, D: Dispatcher> Ledger<A, D> {
    pub async fn threshold(&self, call_type: &CallType) -> u32 {
        self.read().await.threshold(call_type)
    }

    pub async fn open_cap(&self, call_type: &CallType) -> u32 {
        self.read().await.open_cap(call_type)
    }

    pub async fn approvers(&self, call_type: &CallType) -> Vec<Address> {
        self.read().await.approvers(call_type)
    }

    pub async fn is_approver(&self, call_type: &CallType, who: &Address) -> bool {
        self.read().await.is_approver(call_type, who)
    }

    pub async fn is_configured(&self, call_type: &CallType) -> bool {
        self.read().await.is_configured(call_type)
    }

    pub async fn configuration(&self, call_type: &CallType) -> Option<CallTypeConfig> {
        self.read().await.configuration(call_type).cloned()
    }

    pub async fn configured_call_types(&self) -> Vec<CallType> {
        self.read().await.configured_call_types()
    }

    pub async fn proposal_state(&self, id: ProposalId) -> ProposalState {
        self.read().await.proposal_state(id)
    }

    pub async fn proposal(&self, id: ProposalId) -> Option<ProposalView> {
        self.read().await.proposal_view(id)
    }

    pub async fn proposer(&self, id: ProposalId) -> Option<Address> {
        self.read().await.proposer(id)
    }

    pub async fn approvals(&self, id: ProposalId) -> Vec<Address> {
        self.read().await.approvals(id)
    }

    pub async fn approval_count(&self, id: ProposalId) -> u32 {
        self.read().await.approval_count(id)
    }

    pub async fn has_approved(&self, id: ProposalId, who: &Address) -> bool {
        self.read().await.has_approved(id, who)
    }

    pub async fn remaining_approvals(&self, id: ProposalId) -> u32 {
        self.read().await.remaining_approvals(id)
    }

    pub async fn open_proposals(&self, call_type: &CallType) -> Vec<ProposalId> {
        self.read().await.open_proposals(call_type)
    }

    pub async fn executable_proposals(&self, call_type: &CallType) -> Vec<ProposalId> {
        self.read().await.executable_proposals(call_type)
    }

    pub async fn open_count(&self, call_type: &CallType, proposer: &Address) -> u32 {
        self.read().await.open_count(call_type, proposer)
    }

    pub async fn next_proposal_id(&self) -> ProposalId {
        self.read().await.next_proposal_id()
    }

    pub async fn events(&self, query: &EventQuery) -> Vec<EventRecord> {
        self.read().await.events(query)
    }

    pub fn admins(&self) -> Vec<Address> {
        self.admin_list().admins()
    }
}
