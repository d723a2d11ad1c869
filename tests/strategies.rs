#![allow(dead_code)]

use std::fmt;

use proptest::prelude::*;
use rete_branch::{
    BranchChainBuilder, Condition, ConditionalBranchEvaluator, EngineState, Fact, FactHandle,
    FactId, PartitionId, SinkId, TupleArena, TupleId, TupleRef,
};
use serde::{Deserialize, Serialize};

// --- Fixed type schema ---
// Ancestries are built from these fact types plus empty placeholders.

pub const TYPES: &[&str] = &[
    "com.acme.Order",
    "com.acme.LineItem",
    "com.acme.Customer",
    "com.acme.Invoice",
];

/// One condition invocation, recorded in the cycle context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub tuple: TupleId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scripted {
    Allow,
    Deny,
    Fail,
}

#[derive(Debug, thiserror::Error)]
#[error("scripted failure in `{0}`")]
pub struct ScriptError(pub String);

/// A condition with a fixed answer that records every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedCondition {
    pub label: String,
    pub required: Vec<String>,
    pub answer: Scripted,
}

impl ScriptedCondition {
    pub fn new(label: &str, required: &[&str], answer: Scripted) -> Self {
        Self {
            label: label.to_owned(),
            required: required.iter().map(|&r| r.to_owned()).collect(),
            answer,
        }
    }
}

impl fmt::Display for ScriptedCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Condition for ScriptedCondition {
    type Context = Vec<Invocation>;
    type Error = ScriptError;

    fn required_types(&self) -> &[String] {
        &self.required
    }

    fn create_context(&self) -> Vec<Invocation> {
        Vec::new()
    }

    fn is_allowed(
        &self,
        tuple: TupleRef<'_>,
        _state: &EngineState,
        ctx: &mut Vec<Invocation>,
    ) -> Result<bool, ScriptError> {
        ctx.push(Invocation {
            label: self.label.clone(),
            tuple: tuple.id(),
        });
        match self.answer {
            Scripted::Allow => Ok(true),
            Scripted::Deny => Ok(false),
            Scripted::Fail => Err(ScriptError(self.label.clone())),
        }
    }
}

/// Build a single ancestry, root first. `None` entries are placeholders.
/// Returns the arena and the ids in the same order.
pub fn build_ancestry(types: &[Option<&str>]) -> (TupleArena, Vec<TupleId>) {
    let mut arena = TupleArena::new();
    let mut ids: Vec<TupleId> = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let parent = ids.last().copied();
        let id = match (ty, parent) {
            (Some(ty), None) => arena.root(handle(i as u64, ty)),
            (Some(ty), Some(parent)) => arena.extend(parent, handle(i as u64, ty)).unwrap(),
            (None, parent) => arena.placeholder(parent).unwrap(),
        };
        ids.push(id);
    }
    (arena, ids)
}

pub fn handle(id: u64, type_name: &str) -> FactHandle {
    FactHandle::new(FactId::new(id), Fact::new(type_name))
}

/// Reference resolution over an ancestry given root first: index of the
/// tuple a condition with `required` types must see when fired at the leaf.
pub fn model_resolve(types: &[Option<&str>], required: &[&str]) -> Option<usize> {
    if required.is_empty() {
        return types.len().checked_sub(1);
    }
    (0..types.len())
        .rev()
        .find(|&i| types[i].is_some_and(|ty| required.iter().any(|r| *r == ty)))
}

/// Generate an ancestry of 1..=8 tuples, roughly one in five a placeholder.
pub fn arb_ancestry() -> impl Strategy<Value = Vec<Option<&'static str>>> {
    prop::collection::vec(
        prop_oneof![
            4 => prop::sample::select(TYPES).prop_map(Some),
            1 => Just(None),
        ],
        1..=8,
    )
}

/// Generated description of one branch.
#[derive(Debug, Clone)]
pub struct GenBranch {
    pub required: Vec<&'static str>,
    pub answer: Scripted,
    pub breaking: bool,
}

/// Generated description of a whole chain; branch `i` routes to sink `i + 1`.
#[derive(Debug, Clone)]
pub struct GenChain {
    pub partition: u32,
    pub branches: Vec<GenBranch>,
}

impl GenChain {
    pub fn build(&self) -> ConditionalBranchEvaluator<ScriptedCondition> {
        self.branches
            .iter()
            .enumerate()
            .fold(
                BranchChainBuilder::new().partition(PartitionId::new(self.partition)),
                |builder, (i, branch)| {
                    builder.branch(
                        ScriptedCondition::new(&format!("b{i}"), &branch.required, branch.answer),
                        SinkId::new(i as u32 + 1),
                        branch.breaking,
                    )
                },
            )
            .build()
            .unwrap()
    }
}

fn arb_branch(fallible: bool) -> impl Strategy<Value = GenBranch> {
    let answer = if fallible {
        prop_oneof![
            3 => Just(Scripted::Allow),
            4 => Just(Scripted::Deny),
            1 => Just(Scripted::Fail),
        ]
        .boxed()
    } else {
        prop_oneof![3 => Just(Scripted::Allow), 4 => Just(Scripted::Deny)].boxed()
    };
    (
        prop::sample::subsequence(TYPES, 0..=2),
        answer,
        any::<bool>(),
    )
        .prop_map(|(required, answer, breaking)| GenBranch {
            required,
            answer,
            breaking,
        })
}

/// Chains of 1..=6 branches whose conditions never fail.
pub fn arb_chain() -> impl Strategy<Value = GenChain> {
    (0_u32..4, prop::collection::vec(arb_branch(false), 1..=6))
        .prop_map(|(partition, branches)| GenChain { partition, branches })
}

/// Chains that may contain failing conditions.
pub fn arb_fallible_chain() -> impl Strategy<Value = GenChain> {
    (0_u32..4, prop::collection::vec(arb_branch(true), 1..=6))
        .prop_map(|(partition, branches)| GenChain { partition, branches })
}
