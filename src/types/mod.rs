mod condition;
mod error;
mod evaluator;
mod execution;
mod expr;
mod fact;
mod network;
mod record;
mod registry;
mod report;
mod state;
mod tuple;
mod value;

pub use condition::Condition;
pub use error::{BindingNotFound, BuildError, EvaluateError, FireError, TupleError};
pub use evaluator::{BranchChainBuilder, Branches, ConditionalBranchEvaluator, MAX_CHAIN_DEPTH};
pub use execution::{ConditionalExecution, SinkId};
pub use expr::{
    Binding, CompareOp, CycleCounter, Expr, ExprCondition, ExprError, Operand, OperandExpr,
    binding, global,
};
pub use fact::{Fact, FactHandle, FactId};
pub use network::{BranchNetwork, BranchNode, BranchNodeId};
pub use record::Record;
pub use registry::BranchRegistry;
pub use report::{BranchAttempt, BranchReport, TypeMismatch};
pub use state::EngineState;
pub use tuple::{Ancestors, TupleArena, TupleId, TupleRef};
pub use value::Value;
