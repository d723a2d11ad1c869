use std::fmt;
use std::sync::Arc;

use super::condition::Condition;
use super::error::{EvaluateError, FireError, TupleError};
use super::evaluator::ConditionalBranchEvaluator;
use super::execution::SinkId;
use super::registry::BranchRegistry;
use super::state::EngineState;
use super::tuple::{TupleArena, TupleId, TupleRef};
use crate::partition::{Activation, PartitionId, PartitionRun};
use crate::propagate::{dispatch, Routing, SinkPropagator};

/// Index of a node in its [`BranchNetwork`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchNodeId(u32);

impl BranchNodeId {
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for BranchNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A conditional branch point of the rule network: a branch chain plus the
/// main downstream sink tuples continue to when no breaking branch holds.
#[derive(Debug)]
pub struct BranchNode<C> {
    evaluator: Arc<ConditionalBranchEvaluator<C>>,
    partition: PartitionId,
    continuation: SinkId,
}

impl<C> BranchNode<C> {
    #[must_use]
    pub fn evaluator(&self) -> &Arc<ConditionalBranchEvaluator<C>> {
        &self.evaluator
    }

    #[must_use]
    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    #[must_use]
    pub fn continuation(&self) -> SinkId {
        self.continuation
    }
}

impl<C: Condition> BranchNode<C> {
    /// Evaluate the chain for `tuple` with a fresh context and route it.
    ///
    /// # Errors
    ///
    /// Propagates the evaluation error; nothing is forwarded in that case.
    pub fn fire<P>(
        &self,
        tuple: TupleRef<'_>,
        state: &EngineState,
        propagator: &mut P,
    ) -> Result<Routing, EvaluateError<C::Error>>
    where
        P: SinkPropagator + ?Sized,
    {
        let mut ctx = self.evaluator.create_context();
        let selected = self.evaluator.evaluate(tuple, state, &mut ctx)?;
        Ok(dispatch(
            selected,
            self.partition,
            self.continuation,
            tuple,
            propagator,
        ))
    }
}

/// The branch nodes of a rule network, with equal chains shared per
/// partition.
#[derive(Debug)]
pub struct BranchNetwork<C> {
    nodes: Vec<BranchNode<C>>,
    registry: BranchRegistry<C>,
}

impl<C> Default for BranchNetwork<C> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            registry: BranchRegistry::default(),
        }
    }
}

impl<C: PartialEq> BranchNetwork<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a branch node owned by the partition of the chain's head branch.
    #[allow(clippy::cast_possible_truncation)] // networks never hold u32::MAX nodes
    pub fn add_node(
        &mut self,
        evaluator: ConditionalBranchEvaluator<C>,
        continuation: SinkId,
    ) -> BranchNodeId {
        let partition = evaluator.execution().partition();
        let evaluator = self.registry.intern(evaluator);
        let id = BranchNodeId(self.nodes.len() as u32);
        self.nodes.push(BranchNode {
            evaluator,
            partition,
            continuation,
        });
        id
    }

    /// Distinct branch chains backing the nodes.
    #[must_use]
    pub fn shared_chains(&self) -> usize {
        self.registry.len()
    }
}

impl<C> BranchNetwork<C> {
    #[must_use]
    pub fn node(&self, id: BranchNodeId) -> Option<&BranchNode<C>> {
        self.nodes.get(id.0 as usize)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<C: Condition> BranchNetwork<C> {
    /// Fire one activation on the calling thread.
    ///
    /// # Errors
    ///
    /// [`FireError::UnknownNode`] for an id this network never issued,
    /// [`FireError::Tuple`] when the tuple was retracted, or the evaluation
    /// error.
    pub fn fire<P>(
        &self,
        node: BranchNodeId,
        tuple: TupleId,
        arena: &TupleArena,
        state: &EngineState,
        propagator: &mut P,
    ) -> Result<Routing, FireError<C::Error>>
    where
        P: SinkPropagator + ?Sized,
    {
        let branch = self.node(node).ok_or(FireError::UnknownNode(node))?;
        let tuple = arena.get(tuple).ok_or(TupleError::Dead(tuple))?;
        Ok(branch.fire(tuple, state, propagator)?)
    }

    /// Fire a batch of activations, one scoped worker thread per partition.
    ///
    /// Each partition gets its own propagator from `make_propagator` and
    /// fires its activations in input order. Runs come back ordered by
    /// partition id.
    ///
    /// # Errors
    ///
    /// [`FireError::UnknownNode`] before any work starts if an activation
    /// names a node outside this network. Per-activation failures are
    /// reported in [`PartitionRun::outcomes`].
    pub fn fire_partitioned<P, F>(
        &self,
        arena: &TupleArena,
        state: &EngineState,
        activations: &[Activation],
        make_propagator: F,
    ) -> Result<Vec<PartitionRun<P, C::Error>>, FireError<C::Error>>
    where
        C: Sync + Send,
        C::Error: Send,
        P: SinkPropagator + Send,
        F: Fn(PartitionId) -> P + Sync,
    {
        crate::partition::fire_partitioned(self, arena, state, activations, make_propagator)
    }
}
