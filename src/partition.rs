//! Partition identifiers and partitioned firing of branch activations.

use std::collections::BTreeMap;
use std::fmt;
use std::thread;

use crate::propagate::{Routing, SinkPropagator};
use crate::types::{
    BranchNetwork, BranchNodeId, Condition, EngineState, FireError, TupleArena, TupleId,
};

/// Opaque token naming the worker partition that owns a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartitionId(u32);

impl PartitionId {
    /// The partition every sink belongs to unless told otherwise.
    pub const MAIN: PartitionId = PartitionId(0);

    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "partition:{}", self.0)
    }
}

/// A tuple arriving at a branch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub node: BranchNodeId,
    pub tuple: TupleId,
}

impl Activation {
    #[must_use]
    pub const fn new(node: BranchNodeId, tuple: TupleId) -> Self {
        Self { node, tuple }
    }
}

/// Everything one partition produced during a partitioned firing.
#[derive(Debug)]
pub struct PartitionRun<P, E> {
    pub partition: PartitionId,
    pub propagator: P,
    /// `(activation index, outcome)` in the order the partition fired them.
    pub outcomes: Vec<(usize, Result<Routing, FireError<E>>)>,
}

pub(crate) fn fire_partitioned<C, P, F>(
    network: &BranchNetwork<C>,
    arena: &TupleArena,
    state: &EngineState,
    activations: &[Activation],
    make_propagator: F,
) -> Result<Vec<PartitionRun<P, C::Error>>, FireError<C::Error>>
where
    C: Condition + Sync + Send,
    C::Error: Send,
    P: SinkPropagator + Send,
    F: Fn(PartitionId) -> P + Sync,
{
    let mut batches: BTreeMap<PartitionId, Vec<(usize, Activation)>> = BTreeMap::new();
    for (index, activation) in activations.iter().enumerate() {
        let node = network
            .node(activation.node)
            .ok_or(FireError::UnknownNode(activation.node))?;
        batches
            .entry(node.partition())
            .or_default()
            .push((index, *activation));
    }

    let make_propagator = &make_propagator;
    let runs = thread::scope(|scope| {
        let handles: Vec<_> = batches
            .into_iter()
            .map(|(partition, batch)| {
                scope.spawn(move || {
                    tracing::debug!(%partition, activations = batch.len(), "firing partition");
                    let mut propagator = make_propagator(partition);
                    let outcomes = batch
                        .into_iter()
                        .map(|(index, activation)| {
                            let outcome = network.fire(
                                activation.node,
                                activation.tuple,
                                arena,
                                state,
                                &mut propagator,
                            );
                            (index, outcome)
                        })
                        .collect();
                    PartitionRun {
                        partition,
                        propagator,
                        outcomes,
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(run) => run,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect::<Vec<_>>()
    });

    Ok(runs)
}
