use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use trellis_grid::{MemorySource, Predicate, QueryPlan, Row, SelectSource, row_matches};
use trellis_query::{OrderSpec, SortDirection};

fn generate_rows(n: usize) -> Vec<Row> {
    (0..n)
        .map(|i| {
            let mut row = Row::new();
            row.insert("id".into(), json!(i));
            row.insert("name".into(), json!(format!("user-{i}")));
            row.insert("age".into(), json!(18 + (i * 7) % 60));
            row.insert(
                "status".into(),
                json!(if i % 3 == 0 { "active" } else { "inactive" }),
            );
            row
        })
        .collect()
}

fn bench_row_matches(c: &mut Criterion) {
    let rows = generate_rows(10_000);
    let predicate = Predicate::And(vec![
        Predicate::Eq("status".into(), json!("active")),
        Predicate::Gt("age".into(), json!(40)),
        Predicate::Like("name".into(), "user-1%".into()),
    ]);

    c.bench_function("row_matches_composite", |b| {
        b.iter(|| rows.iter().filter(|r| row_matches(r, &predicate)).count())
    });
}

fn bench_memory_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("memory_select");
    for n in [1_000, 10_000] {
        let source = MemorySource::new(generate_rows(n));
        let mut order = OrderSpec::new();
        order.push("age", SortDirection::Desc);
        let plan = QueryPlan {
            predicates: vec![Predicate::Eq("status".into(), json!("active"))],
            order,
            limit: Some(25),
            offset: Some(50),
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let selected = source.select(&plan).unwrap();
                selected.rows.count()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_row_matches, bench_memory_select);
criterion_main!(benches);
