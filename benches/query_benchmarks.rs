/*!
# Query Benchmarks

Benchmarks for parameter parsing, filter rendering and pager generation.

## Usage

```bash
# Run all benchmarks
cargo bench --bench query_benchmarks

# Run specific benchmark group
cargo bench --bench query_benchmarks -- "Filter Parsing"

# Quick benchmark with fewer samples
cargo bench --bench query_benchmarks -- --quick
```

HTML reports are generated in `target/criterion/report/index.html`.
*/

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use querycrate::filtering::select_statement;
use querycrate::{FilterBuilder, Operator, Paginator, QueryConfig, QueryParams, Value, parse_filter};
use sea_orm::sea_query::SqliteQueryBuilder;
use std::hint::black_box;
use std::time::Duration;

const QUERIES: [(&str, &str); 3] = [
    ("simple", "name=mary"),
    (
        "mixed",
        "name=tom&name=jerry&age_gt=10&age_lte=60&email_like=company&_page=2&_limit=20",
    ),
    (
        "typed",
        "id=58db2700cf2f6715b00021a7&born_at_gte=1990-01-01T12:00:00&ok=true&ratio_lt=0.75&user.id=58db2700cf2f6715b00021a8",
    ),
];

fn bench_filter_parsing(c: &mut Criterion) {
    let config = QueryConfig::default();
    let mut group = c.benchmark_group("Filter Parsing");

    for (name, query) in QUERIES {
        group.bench_with_input(BenchmarkId::new("parse_filter", name), &query, |b, query| {
            b.iter(|| {
                let params = QueryParams::parse(black_box(query));
                parse_filter(&params, &config, &[])
            });
        });
    }

    group.finish();
}

fn bench_range_collapse(c: &mut Criterion) {
    let mut group = c.benchmark_group("Range Collapse");

    for size in [10_i64, 100, 1000] {
        let mut builder = FilterBuilder::new();
        builder.add("age", Operator::Gt, (0..size).rev().map(Value::from));
        builder.add("age", Operator::Lt, (0..size).map(|n| Value::from(n * 2)));

        group.bench_with_input(BenchmarkId::new("render", size), &builder, |b, builder| {
            b.iter(|| black_box(builder).render());
        });
    }

    group.finish();
}

fn bench_sql_rendering(c: &mut Criterion) {
    let config = QueryConfig::default();
    let params = QueryParams::parse(QUERIES[1].1);
    let filter = parse_filter(&params, &config, &[]);

    c.bench_function("select_statement", |b| {
        b.iter(|| select_statement("users", black_box(&filter), "-age", 20).to_string(SqliteQueryBuilder));
    });
}

fn bench_pager(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pager");

    for count in [166_i64, 100_000, 10_000_000] {
        let paginator = Paginator::new(count / 2, 10, count);
        group.bench_with_input(BenchmarkId::new("iter_range", count), &paginator, |b, p| {
            b.iter(|| black_box(p).iter_range(2, 5, 5, 2));
        });
    }

    group.finish();
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches;
    config = configure_criterion();
    targets = bench_filter_parsing, bench_range_collapse, bench_sql_rendering, bench_pager
}
criterion_main!(benches);
