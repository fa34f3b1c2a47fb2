// Mining benchmarks for the powchain ledger.
//
// Covers a single record hash, a full proof-of-work search at several worker
// counts, and whole-chain verification.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use powchain::config::GENESIS_PREVIOUS_HASH;
use powchain::ledger::record_hash;
use powchain::{Chain, Miner, MinerConfig};

fn bench_record_hash(c: &mut Criterion) {
    c.bench_function("sha256/record_hash", |b| {
        b.iter(|| record_hash(42, "audit entry 42", GENESIS_PREVIOUS_HASH, 65_536));
    });
}

fn bench_mine(c: &mut Criterion) {
    let mut group = c.benchmark_group("pow/mine");
    group.sample_size(10);

    for workers in [1usize, 2, 4, 8] {
        let miner = Miner::new(MinerConfig::default().with_workers(workers)).expect("config");
        group.bench_with_input(BenchmarkId::from_parameter(workers), &miner, |b, miner| {
            b.iter(|| miner.mine(1, "benchmark payload", GENESIS_PREVIOUS_HASH));
        });
    }

    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut chain = Chain::new();
    for i in 0..8 {
        chain.append(format!("record {i}")).expect("append");
    }

    c.bench_function("chain/verify_9_records", |b| {
        b.iter(|| chain.verify());
    });
}

criterion_group!(benches, bench_record_hash, bench_mine, bench_verify);
criterion_main!(benches);
