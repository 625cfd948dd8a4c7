/// revtape Criterion Benchmark Suite
///
/// Covers:
///   - Recording throughput (primitive + fitness score + tape write)
///   - Steady-state recording on a wrapped tape (fitness comparison path)
///   - A single pruning cycle over a full tape
///   - Checkpoint + restore over a long backward walk
///   - Statevector gate cost at increasing register sizes
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use revtape::{BackendKind, FitnessParams, TapeRuntime, TAPE_CAPACITY};

fn quiet_runtime(kind: BackendKind, cells: usize) -> TapeRuntime {
    let mut rt = TapeRuntime::with_backend(kind, cells, 0).unwrap();
    rt.tune(FitnessParams::default().with_prune(u64::MAX, 0.75)).unwrap();
    rt
}

// ── Recording throughput ──────────────────────────────────────────────────

fn bench_record_fresh_tape(c: &mut Criterion) {
    c.bench_function("record_1000_ops_fresh_tape", |b| {
        b.iter(|| {
            let mut rt = TapeRuntime::new(black_box(8), 0).unwrap();
            for i in 0..1000 {
                rt.cnot(i % 8, (i + 1) % 8).unwrap();
            }
        })
    });
}

fn bench_record_wrapped_tape(c: &mut Criterion) {
    let mut rt = quiet_runtime(BackendKind::Classical, 8);
    for i in 0..TAPE_CAPACITY {
        rt.ccnot(i % 8, (i + 1) % 8, (i + 2) % 8).unwrap();
    }
    c.bench_function("record_op_wrapped_tape", |b| {
        b.iter(|| {
            rt.not(black_box(3)).unwrap();
        })
    });
}

// ── Pruning ───────────────────────────────────────────────────────────────

fn bench_prune_full_tape(c: &mut Criterion) {
    let mut full = quiet_runtime(BackendKind::Classical, 8);
    for i in 0..TAPE_CAPACITY {
        full.cnot(i % 8, (i + 3) % 8).unwrap();
    }
    c.bench_function("prune_full_tape", |b| {
        b.iter(|| {
            let mut rt = full.fork();
            rt.prune();
            black_box(rt.stats())
        })
    });
}

// ── Reversibility ─────────────────────────────────────────────────────────

fn bench_restore(c: &mut Criterion) {
    let mut group = c.benchmark_group("restore");
    for steps in [16usize, 256, 1000] {
        group.bench_with_input(BenchmarkId::new("steps", steps), &steps, |b, &steps| {
            b.iter(|| {
                let mut rt = quiet_runtime(BackendKind::Classical, 8);
                let cp = rt.checkpoint().unwrap();
                for i in 0..steps {
                    rt.swap(i % 8, (i + 5) % 8).unwrap();
                }
                rt.restore(black_box(&cp)).unwrap();
            });
        });
    }
    group.finish();
}

// ── Statevector backend ───────────────────────────────────────────────────

fn bench_statevector_gates(c: &mut Criterion) {
    let mut group = c.benchmark_group("statevector_ccnot");
    for n in [4usize, 8, 12, 16] {
        group.bench_with_input(BenchmarkId::new("cells", n), &n, |b, &n| {
            let mut rt = quiet_runtime(BackendKind::Statevector, n);
            b.iter(|| {
                for q in 0..n - 2 {
                    rt.ccnot(black_box(q), q + 1, q + 2).unwrap();
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_record_fresh_tape,
    bench_record_wrapped_tape,
    bench_prune_full_tape,
    bench_restore,
    bench_statevector_gates,
);
criterion_main!(benches);
