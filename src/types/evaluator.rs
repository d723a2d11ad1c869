use std::fmt;

use super::condition::Condition;
use super::error::{BuildError, EvaluateError};
use super::execution::{ConditionalExecution, SinkId};
use super::report::BranchReport;
use super::state::EngineState;
use super::tuple::TupleRef;
use crate::partition::PartitionId;

/// Longest chain the builder produces and the persisted form accepts.
pub const MAX_CHAIN_DEPTH: usize = 1024;

/// One `if ( condition ) target` step of an if / else-if chain, owning the
/// rest of the chain as its else-branch.
///
/// The chain is immutable once built and is safe to share between threads
/// behind an `Arc` when the condition type is.
#[derive(Debug)]
pub struct ConditionalBranchEvaluator<C> {
    pub(crate) condition: C,
    pub(crate) execution: ConditionalExecution,
    pub(crate) else_branch: Option<Box<ConditionalBranchEvaluator<C>>>,
}

impl<C> ConditionalBranchEvaluator<C> {
    #[must_use]
    pub fn new(
        condition: C,
        partition: PartitionId,
        sink: SinkId,
        breaking: bool,
        else_branch: Option<ConditionalBranchEvaluator<C>>,
    ) -> Self {
        Self {
            condition,
            execution: ConditionalExecution::new(partition, sink, breaking),
            else_branch: else_branch.map(Box::new),
        }
    }

    #[must_use]
    pub fn condition(&self) -> &C {
        &self.condition
    }

    #[must_use]
    pub fn execution(&self) -> &ConditionalExecution {
        &self.execution
    }

    #[must_use]
    pub fn else_branch(&self) -> Option<&ConditionalBranchEvaluator<C>> {
        self.else_branch.as_deref()
    }

    /// This evaluator followed by each else-branch, in evaluation order.
    pub fn branches(&self) -> Branches<'_, C> {
        Branches { next: Some(self) }
    }

    /// Number of branches in the chain, including this one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.branches().count()
    }

    /// A chain always holds at least its head branch.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `true` when both chains route every position to the same targets.
    #[must_use]
    pub fn same_routing(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .branches()
                .zip(other.branches())
                .all(|(a, b)| a.execution == b.execution)
    }
}

impl<C: Condition> ConditionalBranchEvaluator<C> {
    /// Fresh per-firing-cycle context from the head condition.
    ///
    /// Pass the same value to every `evaluate` call of one cycle.
    pub fn create_context(&self) -> C::Context {
        self.condition.create_context()
    }

    /// Pick the execution target for `tuple`.
    ///
    /// Branches are tried in order, each against the original tuple; the
    /// first condition that holds wins and no later condition is invoked.
    /// Returns `None` when every condition is false.
    ///
    /// # Errors
    ///
    /// [`EvaluateError::BindingNotFound`] when a branch's required bindings
    /// are absent from the ancestry, or the condition's own error.
    pub fn evaluate(
        &self,
        tuple: TupleRef<'_>,
        state: &EngineState,
        ctx: &mut C::Context,
    ) -> Result<Option<&ConditionalExecution>, EvaluateError<C::Error>> {
        crate::evaluate::evaluate(self, tuple, state, ctx)
    }

    /// Like [`evaluate`](Self::evaluate) but records every attempt,
    /// resolution diagnostics, and timing.
    ///
    /// # Errors
    ///
    /// Same as [`evaluate`](Self::evaluate).
    pub fn evaluate_detailed(
        &self,
        tuple: TupleRef<'_>,
        state: &EngineState,
        ctx: &mut C::Context,
    ) -> Result<BranchReport, EvaluateError<C::Error>> {
        crate::evaluate::evaluate_detailed(self, tuple, state, ctx)
    }
}

#[cfg(feature = "persist")]
impl<C> ConditionalBranchEvaluator<C> {
    /// Serialize the whole chain to a byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::serial::SerializeError>
    where
        C: serde::Serialize,
    {
        crate::serial::encode(self)
    }

    /// Deserialize a chain previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError>
    where
        C: Condition + serde::de::DeserializeOwned,
    {
        crate::serial::decode(bytes)
    }

    /// Serialize the chain and write it to a file.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) on
    /// encoding or I/O failure.
    pub fn to_file(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), crate::serial::SerializeError>
    where
        C: serde::Serialize,
    {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Read a file and deserialize the chain it contains.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// I/O, format, integrity, or validation failure.
    pub fn from_file(
        path: impl AsRef<std::path::Path>,
    ) -> Result<Self, crate::serial::DeserializeError>
    where
        C: Condition + serde::de::DeserializeOwned,
    {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

impl<C: Clone> Clone for ConditionalBranchEvaluator<C> {
    fn clone(&self) -> Self {
        let rest: Vec<_> = self.branches().skip(1).collect();
        let mut tail: Option<Box<Self>> = None;
        for branch in rest.into_iter().rev() {
            tail = Some(Box::new(Self {
                condition: branch.condition.clone(),
                execution: branch.execution,
                else_branch: tail,
            }));
        }
        Self {
            condition: self.condition.clone(),
            execution: self.execution,
            else_branch: tail,
        }
    }
}

/// Unlinks the else-chain one branch at a time.
impl<C> Drop for ConditionalBranchEvaluator<C> {
    fn drop(&mut self) {
        let mut next = self.else_branch.take();
        while let Some(mut branch) = next {
            next = branch.else_branch.take();
        }
    }
}

/// Structural equality: conditions match position by position and both
/// chains have the same length. Execution targets are not compared.
impl<C: PartialEq> PartialEq for ConditionalBranchEvaluator<C> {
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.branches();
        let mut right = other.branches();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) if a.condition == b.condition => {}
                (None, None) => return true,
                _ => return false,
            }
        }
    }
}

impl<C: fmt::Display> fmt::Display for ConditionalBranchEvaluator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, branch) in self.branches().enumerate() {
            if i > 0 {
                f.write_str(" else ")?;
            }
            write!(f, "if ( {} ) {}", branch.condition, branch.execution)?;
        }
        Ok(())
    }
}

/// Iterator over the branches of a chain.
#[derive(Debug)]
pub struct Branches<'a, C> {
    next: Option<&'a ConditionalBranchEvaluator<C>>,
}

impl<'a, C> Iterator for Branches<'a, C> {
    type Item = &'a ConditionalBranchEvaluator<C>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.else_branch.as_deref();
        Some(current)
    }
}

/// Builder for an if / else-if chain, branches given in evaluation order.
///
/// # Example
///
/// ```
/// use rete_branch::{BranchChainBuilder, ExprCondition, SinkId, binding};
///
/// let chain = BranchChainBuilder::new()
///     .branch(
///         ExprCondition::new(binding("com.acme.Order").field("total").gt(1000_i64)),
///         SinkId::new(1),
///         true,
///     )
///     .branch(
///         ExprCondition::new(binding("com.acme.Order").field("total").gt(100_i64)),
///         SinkId::new(2),
///         false,
///     )
///     .build()
///     .unwrap();
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Debug)]
pub struct BranchChainBuilder<C> {
    partition: PartitionId,
    branches: Vec<(C, SinkId, bool)>,
}

impl<C> Default for BranchChainBuilder<C> {
    fn default() -> Self {
        Self {
            partition: PartitionId::MAIN,
            branches: Vec::new(),
        }
    }
}

impl<C: Condition> BranchChainBuilder<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition owning the sinks of every branch. Defaults to
    /// [`PartitionId::MAIN`].
    #[must_use]
    pub fn partition(mut self, partition: PartitionId) -> Self {
        self.partition = partition;
        self
    }

    /// Append the next `else if` branch.
    #[must_use]
    pub fn branch(mut self, condition: C, sink: SinkId, breaking: bool) -> Self {
        self.branches.push((condition, sink, breaking));
        self
    }

    /// Assemble the chain.
    ///
    /// # Errors
    ///
    /// [`BuildError::EmptyChain`] without branches,
    /// [`BuildError::ChainTooDeep`] past [`MAX_CHAIN_DEPTH`] branches, or
    /// [`BuildError::BlankBindingType`] when a condition declares an empty
    /// binding type name.
    pub fn build(self) -> Result<ConditionalBranchEvaluator<C>, BuildError> {
        if self.branches.len() > MAX_CHAIN_DEPTH {
            return Err(BuildError::ChainTooDeep {
                branches: self.branches.len(),
                limit: MAX_CHAIN_DEPTH,
            });
        }
        for (position, (condition, _, _)) in self.branches.iter().enumerate() {
            if condition.required_types().iter().any(|t| t.trim().is_empty()) {
                return Err(BuildError::BlankBindingType {
                    position,
                    condition: condition.to_string(),
                });
            }
        }

        let partition = self.partition;
        self.branches
            .into_iter()
            .rev()
            .fold(None, |tail, (condition, sink, breaking)| {
                Some(ConditionalBranchEvaluator::new(
                    condition, partition, sink, breaking, tail,
                ))
            })
            .ok_or(BuildError::EmptyChain)
    }
}
