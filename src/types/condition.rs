use std::fmt;

use super::state::EngineState;
use super::tuple::TupleRef;

/// A compiled predicate guarding one branch of a conditional chain.
///
/// Implementations are produced by a condition compiler at network build
/// time and are immutable afterwards. The required binding types are the
/// fully qualified fact type names the predicate was compiled against; the
/// evaluator uses them to pick the tuple handed to [`is_allowed`].
///
/// [`is_allowed`]: Condition::is_allowed
pub trait Condition: fmt::Display {
    /// Per-firing-cycle scratch state, created by [`create_context`] and
    /// threaded through every branch attempt of one cycle.
    ///
    /// [`create_context`]: Condition::create_context
    type Context;

    /// Error raised by the predicate itself. Propagated to the caller as-is.
    type Error: std::error::Error + 'static;

    /// Fully qualified fact type names this condition binds. May be empty.
    fn required_types(&self) -> &[String];

    fn create_context(&self) -> Self::Context;

    /// Evaluate the predicate against a tuple.
    ///
    /// # Errors
    ///
    /// Returns the implementation's own error type when the predicate
    /// cannot be decided.
    fn is_allowed(
        &self,
        tuple: TupleRef<'_>,
        state: &EngineState,
        ctx: &mut Self::Context,
    ) -> Result<bool, Self::Error>;
}
