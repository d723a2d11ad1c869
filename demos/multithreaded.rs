use rete_branch::{
    binding, Activation, BranchChainBuilder, BranchNetwork, EngineState, ExprCondition, Fact,
    FactHandle, FactId, PartitionId, RecordingPropagator, SinkId, TupleArena,
};

fn main() {
    let mut network = BranchNetwork::new();
    let nodes: Vec<_> = (0..4)
        .map(|p| {
            let chain = BranchChainBuilder::new()
                .partition(PartitionId::new(p))
                .branch(
                    ExprCondition::new(binding("com.acme.Order").field("total").gte(500_i64)),
                    SinkId::new(1),
                    true,
                )
                .build()
                .expect("failed to build branch chain");
            network.add_node(chain, SinkId::new(2))
        })
        .collect();

    let mut arena = TupleArena::new();
    let activations: Vec<_> = (0..16_u64)
        .map(|i| {
            let tuple = arena.root(FactHandle::new(
                FactId::new(i),
                Fact::new("com.acme.Order").set("total", i as i64 * 60),
            ));
            Activation::new(nodes[i as usize % nodes.len()], tuple)
        })
        .collect();

    let runs = network
        .fire_partitioned(&arena, &EngineState::new(), &activations, |_| {
            RecordingPropagator::new()
        })
        .expect("activations name known nodes");

    for run in runs {
        for (index, outcome) in &run.outcomes {
            match outcome {
                Ok(routing) => println!("{}: activation {index} {routing}", run.partition),
                Err(err) => println!("{}: activation {index} failed: {err}", run.partition),
            }
        }
    }
}
