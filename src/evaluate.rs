use std::time::Instant;

use crate::resolve::resolve;
use crate::types::{
    BranchAttempt, BranchReport, Condition, ConditionalBranchEvaluator, ConditionalExecution,
    EngineState, EvaluateError, TupleRef,
};

pub(crate) fn evaluate<'e, C: Condition>(
    head: &'e ConditionalBranchEvaluator<C>,
    tuple: TupleRef<'_>,
    state: &EngineState,
    ctx: &mut C::Context,
) -> Result<Option<&'e ConditionalExecution>, EvaluateError<C::Error>> {
    for branch in head.branches() {
        if eval_branch(branch, tuple, state, ctx)?.allowed {
            return Ok(Some(&branch.execution));
        }
    }
    Ok(None)
}

pub(crate) fn evaluate_detailed<C: Condition>(
    head: &ConditionalBranchEvaluator<C>,
    tuple: TupleRef<'_>,
    state: &EngineState,
    ctx: &mut C::Context,
) -> Result<BranchReport, EvaluateError<C::Error>> {
    let start = Instant::now();
    let mut attempts = Vec::new();
    let mut diagnostics = Vec::new();
    let mut selected = None;

    for (position, branch) in head.branches().enumerate() {
        let outcome = eval_branch(branch, tuple, state, ctx)?;
        diagnostics.extend(outcome.mismatch);
        attempts.push(BranchAttempt {
            position,
            resolved: outcome.resolved,
            allowed: outcome.allowed,
        });
        if outcome.allowed {
            selected = Some((position, branch.execution));
            break;
        }
    }

    Ok(BranchReport::new(
        selected,
        attempts,
        diagnostics,
        start.elapsed(),
    ))
}

struct Outcome {
    resolved: crate::types::TupleId,
    mismatch: Option<crate::types::TypeMismatch>,
    allowed: bool,
}

/// Resolve and test a single branch. `tuple` is always the caller's
/// original tuple, never one resolved for an earlier branch.
fn eval_branch<C: Condition>(
    branch: &ConditionalBranchEvaluator<C>,
    tuple: TupleRef<'_>,
    state: &EngineState,
    ctx: &mut C::Context,
) -> Result<Outcome, EvaluateError<C::Error>> {
    let condition = &branch.condition;
    let (resolved, mismatch) = resolve(tuple, condition.required_types(), condition)?;
    let allowed = condition
        .is_allowed(resolved, state, ctx)
        .map_err(EvaluateError::Condition)?;
    Ok(Outcome {
        resolved: resolved.id(),
        mismatch,
        allowed,
    })
}
