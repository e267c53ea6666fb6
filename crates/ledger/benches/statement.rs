use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{DateTime, Duration, Utc};
use fintrack_core::{Money, UserId};
use fintrack_ledger::{derive_statement, DateRange, NewTransaction, Transaction};

fn history(user_id: UserId, count: usize) -> Vec<Transaction> {
    let start = DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_else(Utc::now);
    (0..count)
        .map(|i| {
            // Alternate deposits and smaller withdrawals.
            let amount = if i % 3 == 2 { -700 } else { 1_000 };
            Transaction::record(
                NewTransaction {
                    user_id,
                    amount: Money::from_minor(amount),
                    kind: "bench".to_string(),
                    description: None,
                },
                start + Duration::seconds(i as i64),
            )
            .unwrap()
        })
        .collect()
}

fn bench_statement_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_derivation");

    for count in [10usize, 100, 1_000, 10_000].iter() {
        let user_id = UserId::new();
        let mut txs = history(user_id, *count);
        // Stores hand back arbitrary order; the derivation sorts.
        txs.reverse();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("full_history", count), &txs, |b, txs| {
            b.iter(|| derive_statement(user_id, black_box(txs), DateRange::all()).unwrap());
        });

        let mid = txs[txs.len() / 2].created_at;
        let range = DateRange::new(Some(mid), None).unwrap();
        group.bench_with_input(BenchmarkId::new("from_midpoint", count), &txs, |b, txs| {
            b.iter(|| derive_statement(user_id, black_box(txs), range).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_statement_derivation);
criterion_main!(benches);
