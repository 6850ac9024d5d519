//! Benchmarks for Stockview queries
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use stockview::query::{compute_stats, FilterParams, QueryService};
use stockview::storage::*;
use std::sync::Arc;
use tempfile::tempdir;

const COMPANIES: [&str; 5] = ["AAPL", "MSFT", "GOOG", "AMZN", "TSLA"];

fn create_test_records(days: usize) -> Vec<PriceRecord> {
    let start = chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    (0..days)
        .flat_map(|i| {
            let date = (start + chrono::Duration::days(i as i64))
                .format("%Y-%m-%d 00:00:00")
                .to_string();
            COMPANIES.iter().enumerate().map(move |(c, company)| {
                let base = 100.0 + c as f64 * 10.0 + (i % 50) as f64;
                PriceRecord::new(date.clone(), *company, base, base + 2.0, base - 2.0, base + 1.0, 1e6)
            })
        })
        .collect()
}

fn bench_stats(c: &mut Criterion) {
    let mut group = c.benchmark_group("stats");

    for size in [100, 1000, 10000] {
        let values: Vec<f64> = (0..size).map(|i| (i % 97) as f64 * 1.25).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_function(format!("compute_stats_{}", size), |b| {
            b.iter(|| compute_stats(black_box(&values)))
        });
    }

    group.finish();
}

fn bench_stores(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let records = create_test_records(2000);

    let memory: Arc<dyn RecordStore> = Arc::new(MemoryStore::with_records(records.clone()).unwrap());

    let dir = tempdir().unwrap();
    let sqlite = SqliteStore::open(dir.path().join("bench.db")).unwrap();
    rt.block_on(sqlite.insert_many(records)).unwrap();
    let sqlite: Arc<dyn RecordStore> = Arc::new(sqlite);

    let params = FilterParams::for_field("Close")
        .company("MSFT")
        .start_date("2016-01-01")
        .end_date("2016-12-31");

    let mut group = c.benchmark_group("query");

    for store in [memory, sqlite] {
        let name = store.name();
        let service = QueryService::new(Arc::clone(&store));

        group.bench_function(format!("{}_series_one_year", name), |b| {
            b.iter(|| rt.block_on(service.get_series(black_box(&params))).unwrap())
        });

        group.bench_function(format!("{}_metrics_one_year", name), |b| {
            b.iter(|| rt.block_on(service.get_metrics(black_box(&params))).unwrap())
        });

        group.bench_function(format!("{}_date_range", name), |b| {
            b.iter(|| rt.block_on(service.get_date_range()).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_stats, bench_stores);
criterion_main!(benches);
