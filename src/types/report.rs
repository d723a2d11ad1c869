use std::fmt;
use std::time::Duration;

use super::execution::ConditionalExecution;
use super::tuple::TupleId;

/// The first tuple examined during binding resolution had none of the
/// required types. Informational: resolution goes on walking the ancestry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatch {
    pub tuple: TupleId,
    pub found: String,
    pub required: Vec<String>,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "required [{}], {} binds {}",
            self.required.join(", "),
            self.tuple,
            self.found
        )
    }
}

/// One condition invocation made while walking a branch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchAttempt {
    /// Zero-based position in the chain (0 is the head branch).
    pub position: usize,
    /// The tuple the condition was evaluated against.
    pub resolved: TupleId,
    pub allowed: bool,
}

/// Detailed outcome returned by
/// [`ConditionalBranchEvaluator::evaluate_detailed()`](super::ConditionalBranchEvaluator::evaluate_detailed).
#[derive(Debug, Clone)]
#[must_use]
pub struct BranchReport {
    selected: Option<(usize, ConditionalExecution)>,
    attempts: Vec<BranchAttempt>,
    diagnostics: Vec<TypeMismatch>,
    duration: Duration,
}

impl BranchReport {
    pub(crate) fn new(
        selected: Option<(usize, ConditionalExecution)>,
        attempts: Vec<BranchAttempt>,
        diagnostics: Vec<TypeMismatch>,
        duration: Duration,
    ) -> Self {
        Self {
            selected,
            attempts,
            diagnostics,
            duration,
        }
    }

    /// The execution target chosen, same as `evaluate()`.
    #[must_use]
    pub fn execution(&self) -> Option<&ConditionalExecution> {
        self.selected.as_ref().map(|(_, execution)| execution)
    }

    /// Chain position of the branch whose condition held.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.selected.as_ref().map(|(position, _)| *position)
    }

    /// Every condition invocation, in chain order.
    #[must_use]
    pub fn attempts(&self) -> &[BranchAttempt] {
        &self.attempts
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[TypeMismatch] {
        &self.diagnostics
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for BranchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selected {
            Some((position, execution)) => write!(f, "selected: #{position} {execution}")?,
            None => write!(f, "selected: none")?,
        }
        write!(f, ", attempts: {}", self.attempts.len())?;
        write!(f, ", duration: {:?}", self.duration)
    }
}
