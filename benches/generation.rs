use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use crudgen::{
    Dialect, EntityDescriptor, Params, PropertyDescriptor, SqlType, StatementGenerator,
    StatementName, ValueKind, create_count_query,
};

fn sample_entity() -> EntityDescriptor {
    EntityDescriptor::builder("User", "ds_user")
        .id(PropertyDescriptor::new("id", SqlType::BigInt, ValueKind::Numeric))
        .property(PropertyDescriptor::new(
            "userName",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .property(PropertyDescriptor::new(
            "email",
            SqlType::VarChar,
            ValueKind::String,
        ))
        .property(PropertyDescriptor::new(
            "age",
            SqlType::Integer,
            ValueKind::Numeric,
        ))
        .property(
            PropertyDescriptor::new("version", SqlType::Integer, ValueKind::Numeric).version(),
        )
        .build()
}

fn bench_statement_generation(c: &mut Criterion) {
    let entity = sample_entity();
    let generator = StatementGenerator::new(Dialect::h2());
    c.bench_function("generate_statement_set", |b| {
        b.iter(|| generator.generate(black_box(&entity)));
    });
}

fn bench_statement_rendering(c: &mut Criterion) {
    let set = StatementGenerator::new(Dialect::h2()).generate(&sample_entity());
    let statement = set.get(StatementName::FindAll).unwrap();
    let params = Params::new();
    c.bench_function("render_find_all", |b| {
        b.iter(|| statement.render(black_box(&params)));
    });
}

fn bench_count_rewrite(c: &mut Criterion) {
    let sql = "with recent as ( select * from ds_order where placed_at > ? ), \
               totals as ( select customer_id, sum(amount) as total from recent group by customer_id ) \
               select c.name, t.total from customer c join totals t on t.customer_id = c.id";
    c.bench_function("rewrite_cte_count_query", |b| {
        b.iter(|| create_count_query(black_box(sql)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_statement_generation,
    bench_statement_rendering,
    bench_count_rewrite
);
criterion_main!(benches);
