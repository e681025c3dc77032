//! Property-based tests for the ledger lifecycle
//!
//! Random operation sequences against one call type. After every step:
//! - OpenAndExecutable iff approvals >= threshold, for every open proposal
//! - no approver holds more open proposals than the open cap
//! - a configured call type has at least `threshold` distinct approvers
//! - the tracker's open set is exactly the set of open proposals
//! - a rejected operation leaves the state byte-for-byte unchanged

use super::proposal::ProposalState;
use super::state::{LedgerState, Transaction};
use super::LedgerResult;
use crate::primitives::{Address, CallType, Selector};
use proptest::prelude::*;

const APPROVERS: usize = 4;

fn approver(i: usize) -> Address {
    Address::from_label(&format!("approver-{}", i))
}

fn admin() -> Address {
    Address::from_label("admin")
}

fn call_type() -> CallType {
    CallType::new(Address::from_label("target"), Selector::new([0xde, 0xad, 0xbe, 0xef]))
}

#[derive(Debug, Clone)]
enum Op {
    Propose(usize),
    Approve(usize, u64),
    Rescind(usize, u64),
    Close(usize, u64),
    Reconfigure {
        threshold: u32,
        open_cap: u32,
        members: usize,
        close_executable: bool,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..APPROVERS + 1).prop_map(Op::Propose),
        4 => (0..APPROVERS + 1, 0u64..12).prop_map(|(a, id)| Op::Approve(a, id)),
        2 => (0..APPROVERS + 1, 0u64..12).prop_map(|(a, id)| Op::Rescind(a, id)),
        1 => (0..APPROVERS, 0u64..12).prop_map(|(a, id)| Op::Close(a, id)),
        1 => (0u32..5, 0u32..4, 1..APPROVERS + 1, any::<bool>()).prop_map(
            |(threshold, open_cap, members, close_executable)| Op::Reconfigure {
                threshold,
                open_cap,
                members,
                close_executable,
            }
        ),
    ]
}

fn configured_state(threshold: u32, open_cap: u32) -> LedgerState {
    let mut state = LedgerState::new();
    let approvers: Vec<Address> = (0..APPROVERS).map(approver).collect();
    let mut tx = Transaction::begin(&mut state);
    tx.apply_configure(admin(), call_type(), threshold, open_cap, &approvers, false)
        .expect("valid configuration");
    tx.commit();
    state
}

fn apply(state: &mut LedgerState, op: &Op) -> LedgerResult<()> {
    let mut tx = Transaction::begin(state);
    match *op {
        Op::Propose(a) => tx.apply_propose(approver(a), call_type(), vec![a as u8]).map(|_| ()),
        Op::Approve(a, id) => tx.apply_approve(approver(a), id).map(|_| ()),
        Op::Rescind(a, id) => tx.apply_rescind(approver(a), id).map(|_| ()),
        Op::Close(a, id) => tx.apply_close(approver(a), id),
        Op::Reconfigure {
            threshold,
            open_cap,
            members,
            close_executable,
        } => {
            let list: Vec<Address> = (0..members).map(approver).collect();
            tx.apply_configure(admin(), call_type(), threshold, open_cap, &list, close_executable)
                .map(|_| ())
        }
    }?;
    tx.commit();
    Ok(())
}

fn check_invariants(state: &LedgerState) -> Result<(), TestCaseError> {
    let ct = call_type();
    let threshold = state.threshold(&ct);
    let cap = state.open_cap(&ct);

    if state.is_configured(&ct) {
        prop_assert!(state.approvers(&ct).len() >= threshold as usize);
    }

    let mut open_ids = Vec::new();
    for (id, proposal) in &state.proposals {
        if proposal.state().is_open() {
            open_ids.push(*id);
            let executable = proposal.state() == ProposalState::OpenAndExecutable;
            prop_assert_eq!(executable, proposal.approval_count() >= threshold);
        }
    }
    prop_assert_eq!(state.open_proposals(&ct), open_ids);

    for i in 0..APPROVERS {
        prop_assert!(state.open_count(&ct, &approver(i)) <= cap);
    }
    Ok(())
}

proptest! {
    /// Property: invariants hold after every operation, and failures roll back
    #[test]
    fn lifecycle_invariants_hold(
        threshold in 1u32..=APPROVERS as u32,
        open_cap in 1u32..4,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut state = configured_state(threshold, open_cap);

        for op in &ops {
            let before = state.clone();
            if apply(&mut state, op).is_err() {
                prop_assert_eq!(&state, &before, "rejected {:?} mutated state", op);
            }
            check_invariants(&state)?;
        }
    }

    /// Property: approve then rescind by the same approver is a no-op on the proposal
    #[test]
    fn approve_rescind_roundtrip(
        threshold in 1u32..=APPROVERS as u32,
        prior in prop::collection::vec(0..APPROVERS, 0..APPROVERS),
        who in 0..APPROVERS,
    ) {
        let mut state = configured_state(threshold, 2);
        let id = {
            let mut tx = Transaction::begin(&mut state);
            let id = tx.apply_propose(approver(0), call_type(), vec![]).expect("propose");
            for a in &prior {
                if *a != who {
                    let _ = tx.apply_approve(approver(*a), id);
                }
            }
            tx.commit();
            id
        };

        let proposal_before = state.proposal(id).cloned();

        let mut tx = Transaction::begin(&mut state);
        tx.apply_approve(approver(who), id).expect("approve");
        tx.apply_rescind(approver(who), id).expect("rescind");
        tx.commit();

        prop_assert_eq!(state.proposal(id).cloned(), proposal_before);
    }

    /// Property: configure keeps exactly the distinct approvers, or fails cleanly
    #[test]
    fn configure_counts_distinct_approvers(
        threshold in 1u32..6,
        picks in prop::collection::vec(0..APPROVERS, 1..10),
    ) {
        let list: Vec<Address> = picks.iter().map(|i| approver(*i)).collect();
        let mut distinct = list.clone();
        distinct.sort();
        distinct.dedup();

        let mut state = LedgerState::new();
        let mut tx = Transaction::begin(&mut state);
        let result = tx.apply_configure(admin(), call_type(), threshold, 1, &list, false);
        let ok = result.is_ok();
        if ok {
            tx.commit();
        } else {
            drop(tx);
        }

        prop_assert_eq!(ok, distinct.len() >= threshold as usize);
        if ok {
            let mut stored = state.approvers(&call_type());
            stored.sort();
            prop_assert_eq!(stored, distinct);
        } else {
            prop_assert_eq!(state, LedgerState::new());
        }
    }
}
