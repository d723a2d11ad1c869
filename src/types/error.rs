use thiserror::Error;

use super::network::BranchNodeId;
use super::tuple::TupleId;

/// The tuple ancestry holds no fact of any type a condition requires.
///
/// This means the network wiring and the condition's declarations disagree.
/// Callers must abort the firing cycle and report an internal engine error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "no tuple on the ancestry of {tuple} binds any of [{}] required by `{condition}`",
    .required.join(", ")
)]
pub struct BindingNotFound {
    pub tuple: TupleId,
    pub required: Vec<String>,
    pub condition: String,
}

/// Failure of a single branch evaluation.
#[derive(Debug, Error)]
pub enum EvaluateError<E> {
    #[error("rule network inconsistency: {0}")]
    BindingNotFound(#[from] BindingNotFound),

    #[error(transparent)]
    Condition(E),
}

impl<E> EvaluateError<E> {
    /// `true` for engine-consistency failures, `false` for errors raised by
    /// the condition itself.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, EvaluateError::BindingNotFound(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("branch chain has no branches")]
    EmptyChain,

    #[error("branch chain has {branches} branches, limit is {limit}")]
    ChainTooDeep { branches: usize, limit: usize },

    #[error("branch {position} (`{condition}`) declares a blank binding type")]
    BlankBindingType { position: usize, condition: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TupleError {
    #[error("{0} is not live")]
    Dead(TupleId),
}

/// Failure of one activation fired through a [`BranchNetwork`](super::BranchNetwork).
#[derive(Debug, Error)]
pub enum FireError<E> {
    #[error("unknown branch node {0}")]
    UnknownNode(BranchNodeId),

    #[error(transparent)]
    Tuple(#[from] TupleError),

    #[error(transparent)]
    Evaluate(#[from] EvaluateError<E>),
}
