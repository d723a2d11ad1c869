use std::collections::HashMap;
use std::sync::Arc;

use super::evaluator::ConditionalBranchEvaluator;
use crate::partition::PartitionId;

/// Per-partition interning of branch chains.
///
/// Rules that share a partition often compile to the same if / else-if
/// structure. Registering an evaluator returns the already-registered `Arc`
/// when one is structurally equal and routes every branch to the same
/// targets, so duplicate chains collapse to a single shared node.
#[derive(Debug)]
pub struct BranchRegistry<C> {
    partitions: HashMap<PartitionId, Vec<Arc<ConditionalBranchEvaluator<C>>>>,
}

impl<C> Default for BranchRegistry<C> {
    fn default() -> Self {
        Self {
            partitions: HashMap::new(),
        }
    }
}

impl<C: PartialEq> BranchRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `evaluator` under the partition of its head branch.
    pub fn intern(
        &mut self,
        evaluator: ConditionalBranchEvaluator<C>,
    ) -> Arc<ConditionalBranchEvaluator<C>> {
        let partition = evaluator.execution().partition();
        let shared = self.partitions.entry(partition).or_default();

        if let Some(existing) = shared
            .iter()
            .find(|e| ***e == evaluator && e.same_routing(&evaluator))
        {
            tracing::debug!(%partition, branches = evaluator.len(), "reusing shared branch chain");
            return Arc::clone(existing);
        }

        let evaluator = Arc::new(evaluator);
        shared.push(Arc::clone(&evaluator));
        evaluator
    }

    /// Distinct chains registered across all partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
