mod evaluate;
mod partition;
mod propagate;
mod resolve;
#[cfg(feature = "persist")]
pub mod serial;
mod types;

pub use partition::{Activation, PartitionId, PartitionRun};
pub use propagate::{Delivery, RecordingPropagator, Routing, SinkPropagator, dispatch};
pub use resolve::resolve_binding;
pub use types::{
    Ancestors, Binding, BindingNotFound, BranchAttempt, BranchChainBuilder, BranchNetwork,
    BranchNode, BranchNodeId, BranchRegistry, BranchReport, Branches, BuildError, CompareOp,
    Condition, ConditionalBranchEvaluator, ConditionalExecution, CycleCounter, EngineState,
    EvaluateError, Expr, ExprCondition, ExprError, Fact, FactHandle, FactId, FireError,
    MAX_CHAIN_DEPTH, Operand, OperandExpr, Record, SinkId, TupleArena, TupleError, TupleId,
    TupleRef, TypeMismatch, Value, binding, global,
};
