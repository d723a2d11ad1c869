use rete_branch::{
    binding, global, BranchChainBuilder, BranchNetwork, EngineState, ExprCondition, Fact,
    FactHandle, FactId, RecordingPropagator, SinkId, TupleArena,
};

fn main() {
    // if (total > 1000) break -> vip
    // else if (qty > 10 or promo == "bulk") do -> bulk
    // continuation -> audit
    let chain = BranchChainBuilder::new()
        .branch(
            ExprCondition::new(binding("com.acme.Order").field("total").gt(1000_i64)),
            SinkId::new(1),
            true,
        )
        .branch(
            ExprCondition::new(
                binding("com.acme.LineItem")
                    .field("qty")
                    .gt(10_i64)
                    .or(global("promo").eq("bulk")),
            ),
            SinkId::new(2),
            false,
        )
        .build()
        .expect("failed to build branch chain");

    println!("{chain}");

    let mut network = BranchNetwork::new();
    let node = network.add_node(chain, SinkId::new(3));

    let mut arena = TupleArena::new();
    let order = arena.root(FactHandle::new(
        FactId::new(1),
        Fact::new("com.acme.Order").set("total", 250_i64),
    ));
    let item = arena
        .extend(
            order,
            FactHandle::new(FactId::new(2), Fact::new("com.acme.LineItem").set("qty", 4_i64)),
        )
        .expect("order tuple is live");

    let mut recorder = RecordingPropagator::new();
    for promo in ["none", "bulk"] {
        let state = EngineState::new().with_global("promo", promo);
        let routing = network
            .fire(node, item, &arena, &state, &mut recorder)
            .expect("failed to fire branch node");
        println!("promo={promo}: {routing}");
    }

    // A detailed report shows which tuple each branch was evaluated against.
    let chain = network.node(node).expect("node exists").evaluator();
    let tuple = arena.get(item).expect("item tuple is live");
    let report = chain
        .evaluate_detailed(tuple, &EngineState::new(), &mut chain.create_context())
        .expect("failed to evaluate");
    println!("{report}");
    for attempt in report.attempts() {
        println!(
            "  branch {} on {}: {}",
            attempt.position, attempt.resolved, attempt.allowed
        );
    }
    for mismatch in report.diagnostics() {
        println!("  {mismatch}");
    }

    for delivery in recorder.deliveries() {
        println!(
            "{} -> {} ({})",
            delivery.tuple, delivery.sink, delivery.partition
        );
    }
}
