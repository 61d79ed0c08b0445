//! Publishing performance benchmarks.
//!
//! Measures table parsing, definition rendering and end-to-end publishing.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kallysto::{DataTable, FormatterKind, Parser, Publication, PublicationConfig, Registry};
use tempfile::TempDir;

/// Generate synthetic CSV data with the specified number of rows.
fn generate_csv_data(rows: usize) -> String {
    let mut data = String::from("region,quarter,sales,growth\n");
    for row in 0..rows {
        data.push_str(&format!(
            "region_{},Q{},{:.2},{:.3}\n",
            row % 10,
            (row % 4) + 1,
            row as f64 * 1.5,
            (row % 7) as f64 / 10.0
        ));
    }
    data
}

fn generate_table(rows: usize) -> DataTable {
    Parser::new()
        .parse_bytes(generate_csv_data(rows).as_bytes())
        .unwrap()
}

fn bench_parse_csv(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_csv");

    for rows in [100, 1_000, 10_000].iter() {
        let data = generate_csv_data(*rows);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &data, |b, data| {
            b.iter(|| black_box(Parser::new().parse_bytes(data.as_bytes()).unwrap()))
        });
    }

    group.finish();
}

fn bench_render_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_table");

    for rows in [10, 100, 1_000].iter() {
        let table = generate_table(*rows);
        group.bench_with_input(BenchmarkId::new("latex", rows), &table, |b, table| {
            b.iter(|| black_box(table.to_latex()))
        });
        group.bench_with_input(BenchmarkId::new("pipe", rows), &table, |b, table| {
            b.iter(|| black_box(table.to_pipe_table()))
        });
    }

    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("publish");

    for format in [FormatterKind::Latex, FormatterKind::Markdown] {
        let dir = TempDir::new().unwrap();
        let config = PublicationConfig::new("bench", "paper")
            .with_formatter(format)
            .with_notebook_root(dir.path())
            .with_pub_root("pubs");
        let mut publication = Publication::new(config).unwrap();
        let mut registry = Registry::new();
        let value = registry.value("meanSales", 132.5).into_export().unwrap();
        let table = registry
            .table("salesTable", generate_table(100), "Sales")
            .into_export()
            .unwrap();

        group.bench_function(BenchmarkId::new("value", format), |b| {
            b.iter(|| publication.publish(&value).unwrap())
        });
        group.bench_function(BenchmarkId::new("table", format), |b| {
            b.iter(|| publication.publish(&table).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse_csv, bench_render_table, bench_publish);
criterion_main!(benches);
