//! Criterion benchmarks for satstake-core hot paths.
//!
//! Covers: reward computation, admission validation, and deposit record
//! serialization.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use satstake_core::reward::{compute_reward, elapsed_days, RewardSchedule};
use satstake_core::types::{DepositRecord, DepositRequest};
use satstake_core::validation::validate_deposit;

fn sample_record() -> DepositRecord {
    DepositRecord {
        wallet: "bc1qexamplewalletaddress".into(),
        amount: 7.25,
        staking_days: 60,
        created_at: 1_700_000_000_000,
    }
}

fn bench_reward(c: &mut Criterion) {
    c.bench_function("compute_reward", |b| {
        b.iter(|| compute_reward(black_box(7.25), black_box(45)))
    });

    let schedule = RewardSchedule::default();
    c.bench_function("schedule_compute", |b| {
        b.iter(|| schedule.compute(black_box(3.0), black_box(45)))
    });

    c.bench_function("elapsed_days", |b| {
        b.iter(|| {
            elapsed_days(
                black_box(1_700_000_000_000),
                black_box(1_703_000_000_000),
                black_box(60),
            )
        })
    });
}

fn bench_validation(c: &mut Criterion) {
    let req = DepositRequest::new("bc1qexamplewalletaddress", 7.25, 60.0);
    c.bench_function("validate_deposit", |b| {
        b.iter(|| validate_deposit(black_box(&req)))
    });
}

fn bench_record_serde(c: &mut Criterion) {
    let record = sample_record();
    c.bench_function("deposit_record_encode", |b| {
        b.iter(|| {
            bincode::encode_to_vec(black_box(&record), bincode::config::standard())
                .expect("encode failed")
        })
    });

    let encoded = bincode::encode_to_vec(&record, bincode::config::standard())
        .expect("encode failed");
    c.bench_function("deposit_record_decode", |b| {
        b.iter(|| {
            let (decoded, _): (DepositRecord, usize) =
                bincode::decode_from_slice(black_box(&encoded), bincode::config::standard())
                    .expect("decode failed");
            decoded
        })
    });
}

criterion_group!(benches, bench_reward, bench_validation, bench_record_serde);
criterion_main!(benches);
