//! Benchmarks for parsing and ingesting connection vectors
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Cursor;
use tmix_ingest::pipeline::{ChannelPairFactory, DirectionRunner, RecordParser, RngSource};
use tmix_ingest::IngestConfig;

fn cvec_text(records: usize) -> String {
    let mut text = String::with_capacity(records * 96);
    for i in 0..records {
        text.push_str(&format!(
            "SEQ {} 2 {} 80\nw 65535 65535\nr 1500\nl 0.0 0.0\n> 320\nt 1200\n< 4096\n",
            i * 1000,
            i % 65536
        ));
    }
    text
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for records in [1_000, 10_000] {
        let text = cvec_text(records);
        group.throughput(Throughput::Elements(records as u64));
        group.bench_with_input(BenchmarkId::from_parameter(records), &text, |b, text| {
            b.iter(|| {
                let parser = RecordParser::new(Cursor::new(text.as_bytes()));
                black_box(parser.filter_map(Result::ok).count())
            })
        });
    }
    group.finish();
}

fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    let records = 10_000;
    let text = cvec_text(records);
    group.throughput(Throughput::Elements(records as u64));

    for keep in [0.1, 1.0] {
        let runner = DirectionRunner::new(
            IngestConfig::default()
                .with_keep_probability(keep)
                .with_cvecs_per_pair(1_000),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::new("keep", keep), &text, |b, text| {
            b.iter(|| {
                let (mut factory, rx) = ChannelPairFactory::new();
                let summary = runner.run(
                    Ok(Cursor::new(text.as_bytes())),
                    None,
                    &mut factory,
                    &mut RngSource::seeded(42),
                );
                black_box((summary.inbound.stats, rx.drain().len()))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_ingest);
criterion_main!(benches);
