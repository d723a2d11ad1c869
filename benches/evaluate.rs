use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rete_branch::{
    binding, resolve_binding, BranchChainBuilder, ConditionalBranchEvaluator, EngineState,
    ExprCondition, Fact, FactHandle, FactId, SinkId, TupleArena, TupleId,
};

const ORDER: &str = "com.acme.Order";
const ITEM: &str = "com.acme.LineItem";

/// Build a chain of `n` branches where only the last one holds.
fn build_chain(n: usize) -> ConditionalBranchEvaluator<ExprCondition> {
    let mut builder = BranchChainBuilder::new();
    for i in 0..n {
        let limit = if i + 1 == n { 0 } else { 1_000_000 + i as i64 };
        builder = builder.branch(
            ExprCondition::new(binding(ORDER).field("total").gt(limit)),
            SinkId::new(i as u32 + 1),
            true,
        );
    }
    builder.build().unwrap()
}

/// Order at the root with `depth` line items stacked beneath it.
fn build_ancestry(depth: usize) -> (TupleArena, TupleId) {
    let mut arena = TupleArena::new();
    let mut leaf = arena.root(FactHandle::new(
        FactId::new(0),
        Fact::new(ORDER).set("total", 500_i64),
    ));
    for i in 0..depth {
        leaf = arena
            .extend(
                leaf,
                FactHandle::new(FactId::new(i as u64 + 1), Fact::new(ITEM).set("qty", 1_i64)),
            )
            .unwrap();
    }
    (arena, leaf)
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_eval");
    let (arena, leaf) = build_ancestry(2);
    let tuple = arena.get(leaf).unwrap();
    let state = EngineState::new();

    for &n in &[1, 8, 32] {
        let chain = build_chain(n);
        group.bench_function(&format!("{n}_branches"), |b| {
            b.iter(|| {
                let mut ctx = chain.create_context();
                chain
                    .evaluate(black_box(tuple), &state, &mut ctx)
                    .unwrap()
                    .copied()
            });
        });

        group.bench_function(&format!("{n}_branches_detailed"), |b| {
            b.iter(|| {
                let mut ctx = chain.create_context();
                chain
                    .evaluate_detailed(black_box(tuple), &state, &mut ctx)
                    .unwrap()
            });
        });
    }

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    let required = [ORDER.to_owned()];

    for &depth in &[0, 4, 16, 64] {
        let (arena, leaf) = build_ancestry(depth);
        group.bench_function(&format!("depth_{depth}"), |b| {
            b.iter(|| {
                let tuple = arena.get(black_box(leaf)).unwrap();
                resolve_binding(tuple, &required, &"order").unwrap().id()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_resolution);
criterion_main!(benches);
