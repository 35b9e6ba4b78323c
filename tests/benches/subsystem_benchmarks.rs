//! Plasma-Exit subsystem benchmarks.
//!
//! Performance validation for the hot paths:
//!
//! | Subsystem | Claim | Target |
//! |-----------|-------|--------|
//! | px-01 Priority Queue | O(log n) insert / delete-min | < 1us at 10k |
//! | px-06 Merkle adapter | O(log n) proof build + verify | < 10us at 4k leaves |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use px_01_priority_queue::ExitQueue;
use px_06_exit_processor::{MerkleInclusionVerifier, MerkleTree};
use rand::Rng;
use shared_types::{ExitId, ExitPriority, InclusionVerifier, UtxoPos};

fn random_priority(rng: &mut impl Rng) -> ExitPriority {
    let pos = UtxoPos::new(rng.gen_range(1..1_000_000), rng.gen_range(0..65_535), 0)
        .expect("in-range position");
    ExitPriority::pack(rng.gen(), pos, ExitId(rng.gen()))
}

fn bench_exit_queue(c: &mut Criterion) {
    let mut group = c.benchmark_group("px-01-priority-queue");
    let mut rng = rand::thread_rng();

    for size in [1_000usize, 10_000] {
        let priorities: Vec<ExitPriority> =
            (0..size).map(|_| random_priority(&mut rng)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("insert", size), &priorities, |b, ps| {
            b.iter(|| {
                let mut queue = ExitQueue::new();
                for p in ps {
                    queue.insert(*p);
                }
                black_box(queue.len())
            })
        });
        group.bench_with_input(BenchmarkId::new("drain_min", size), &priorities, |b, ps| {
            b.iter(|| {
                let mut queue = ExitQueue::new();
                for p in ps {
                    queue.insert(*p);
                }
                while let Ok(min) = queue.delete_min() {
                    black_box(min);
                }
            })
        });
    }
    group.finish();
}

fn bench_merkle_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("px-06-merkle-adapter");

    for size in [256usize, 4_096] {
        let leaves: Vec<Vec<u8>> = (0..size)
            .map(|i| format!("tx-{i}").into_bytes())
            .collect();
        let tree = MerkleTree::build(&leaves);
        let root = tree.root();
        let verifier = MerkleInclusionVerifier;
        let index = size / 2;
        let pos = UtxoPos::new(1_000, index as u32, 0).expect("in-range position");

        group.bench_with_input(BenchmarkId::new("build", size), &leaves, |b, ls| {
            b.iter(|| black_box(MerkleTree::build(ls).root()))
        });
        group.bench_with_input(BenchmarkId::new("prove_and_verify", size), &tree, |b, t| {
            b.iter(|| {
                let proof = t.proof(index);
                black_box(verifier.verify(&leaves[index], pos, &root, &proof))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_exit_queue, bench_merkle_proofs);
criterion_main!(benches);
