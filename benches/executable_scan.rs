//! Benchmarks for the executable-proposals scan
//!
//! The scan is linear in the number of open proposals of a call type. These
//! benchmarks track that cost at growing open-set sizes, with half of the
//! proposals executable.

use approval_gate::dispatch::MockDispatcher;
use approval_gate::gatekeeper::StaticAdminList;
use approval_gate::ledger::{Ledger, LedgerState};
use approval_gate::{Address, CallType, Selector};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn call_type() -> CallType {
    CallType::new(Address::from_label("vault"), Selector::new([1, 2, 3, 4]))
}

/// Ledger state with `open` open proposals, every other one executable.
fn create_state(open: u32) -> LedgerState {
    let runtime = tokio::runtime::Runtime::new().expect("runtime");
    let admin = Address::from_label("admin");
    let approver = Address::from_label("approver");

    let ledger = Ledger::new(StaticAdminList::new([admin]), MockDispatcher::new());
    runtime.block_on(async {
        ledger
            .configure(admin, call_type(), 1, open.max(1), &[approver], false)
            .await
            .expect("configure");
        for i in 0..open {
            let id = ledger
                .propose(approver, call_type(), vec![])
                .await
                .expect("propose");
            if i % 2 == 0 {
                ledger.approve(approver, id).await.expect("approve");
            }
        }
    });
    ledger.into_state()
}

fn benchmark_scan_small(c: &mut Criterion) {
    let state = create_state(16);

    c.bench_function("executable_scan_16_open", |b| {
        b.iter(|| black_box(&state).executable_proposals(black_box(&call_type())));
    });
}

fn benchmark_scan_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("executable_scan_scaling");

    for open in [64u32, 256, 1024, 4096].iter() {
        let state = create_state(*open);
        group.bench_with_input(BenchmarkId::from_parameter(open), open, |b, _| {
            b.iter(|| black_box(&state).executable_proposals(black_box(&call_type())));
        });
    }

    group.finish();
}

fn benchmark_open_list(c: &mut Criterion) {
    let state = create_state(1024);

    c.bench_function("open_proposals_1024_open", |b| {
        b.iter(|| black_box(&state).open_proposals(black_box(&call_type())));
    });
}

criterion_group!(
    benches,
    benchmark_scan_small,
    benchmark_scan_scaling,
    benchmark_open_list
);
criterion_main!(benches);
