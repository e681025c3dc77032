//! Admission Control for Proposals
//!
//! Each call type carries a tracker of its currently open proposals and a
//! per-approver count of how many of those each approver proposed. A new
//! proposal is admitted only while the proposer's count is below the call
//! type's open cap; otherwise it is rejected before any state changes.
//!
//! ## Lifecycle
//!
//! - `check_open_cap`: consulted by `propose` before allocating an id
//! - `record_open`: id enters the open set, proposer's count goes up
//! - `release`: id leaves the open set (close, bulk close, execute),
//!   proposer's count goes down

use crate::collections::OrderedSet;
use crate::primitives::{Address, ProposalId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Open-proposal bookkeeping for one call type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTypeTracker {
    /// Open proposal ids, in creation order.
    open_proposals: OrderedSet<ProposalId>,
    /// Proposer -> number of open proposals they created.
    open_count: BTreeMap<Address, u32>,
}

impl CallTypeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `proposer` may open another proposal.
    ///
    /// Returns `Ok(())` if admitted, or `Err(current)` with the proposer's
    /// current open count when the cap is reached.
    pub fn check_open_cap(&self, proposer: &Address, cap: u32) -> Result<(), u32> {
        let current = self.open_count(proposer);
        if current >= cap {
            return Err(current);
        }
        Ok(())
    }

    /// Record a newly opened proposal.
    pub fn record_open(&mut self, id: ProposalId, proposer: Address) {
        if self.open_proposals.add(id) {
            *self.open_count.entry(proposer).or_insert(0) += 1;
        }
    }

    /// Release a proposal that left the open states.
    ///
    /// Returns `false` if `id` was not tracked as open.
    pub fn release(&mut self, id: ProposalId, proposer: &Address) -> bool {
        if !self.open_proposals.remove(&id) {
            return false;
        }
        if let Some(count) = self.open_count.get_mut(proposer) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.open_count.remove(proposer);
            }
        }
        true
    }

    /// Number of open proposals created by `proposer`.
    pub fn open_count(&self, proposer: &Address) -> u32 {
        self.open_count.get(proposer).copied().unwrap_or(0)
    }

    pub fn is_open(&self, id: ProposalId) -> bool {
        self.open_proposals.contains(&id)
    }

    /// Open proposal ids in creation order.
    pub fn open_proposals(&self) -> &OrderedSet<ProposalId> {
        &self.open_proposals
    }

    /// First open proposal, used by bulk close.
    pub fn first_open(&self) -> Option<ProposalId> {
        self.open_proposals.first().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.open_proposals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_below_cap() {
        let alice = Address::from_label("alice");
        let mut tracker = CallTypeTracker::new();

        assert!(tracker.check_open_cap(&alice, 2).is_ok());
        tracker.record_open(0, alice);
        assert!(tracker.check_open_cap(&alice, 2).is_ok());
        tracker.record_open(1, alice);
        assert_eq!(tracker.check_open_cap(&alice, 2), Err(2));
    }

    #[test]
    fn test_caps_are_per_proposer() {
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        let mut tracker = CallTypeTracker::new();

        tracker.record_open(0, alice);
        assert!(tracker.check_open_cap(&alice, 1).is_err());
        assert!(tracker.check_open_cap(&bob, 1).is_ok());
    }

    #[test]
    fn test_release_frees_capacity() {
        let alice = Address::from_label("alice");
        let mut tracker = CallTypeTracker::new();

        tracker.record_open(0, alice);
        tracker.record_open(1, alice);
        assert!(tracker.release(0, &alice));
        assert_eq!(tracker.open_count(&alice), 1);
        assert!(!tracker.is_open(0));
        assert!(tracker.check_open_cap(&alice, 2).is_ok());
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let alice = Address::from_label("alice");
        let mut tracker = CallTypeTracker::new();

        tracker.record_open(0, alice);
        assert!(!tracker.release(7, &alice));
        assert_eq!(tracker.open_count(&alice), 1);
    }

    #[test]
    fn test_first_open_follows_creation_order() {
        let alice = Address::from_label("alice");
        let mut tracker = CallTypeTracker::new();

        tracker.record_open(3, alice);
        tracker.record_open(5, alice);
        tracker.record_open(4, alice);
        assert_eq!(tracker.first_open(), Some(3));
        tracker.release(3, &alice);
        assert_eq!(tracker.first_open(), Some(5));
    }
}
