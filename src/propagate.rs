//! Forwarding matched tuples to downstream sinks.

use std::fmt;

use crate::partition::PartitionId;
use crate::types::{ConditionalExecution, SinkId, TupleId, TupleRef};

/// Receiver of routed tuples, owned by one partition's firing loop.
///
/// Any `FnMut(PartitionId, SinkId, TupleRef<'_>)` closure is a propagator.
pub trait SinkPropagator {
    fn propagate(&mut self, partition: PartitionId, sink: SinkId, tuple: TupleRef<'_>);
}

impl<F> SinkPropagator for F
where
    F: FnMut(PartitionId, SinkId, TupleRef<'_>),
{
    fn propagate(&mut self, partition: PartitionId, sink: SinkId, tuple: TupleRef<'_>) {
        self(partition, sink, tuple);
    }
}

/// How a branch node routed one tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routing {
    /// A breaking branch held; the tuple went to `sink` only.
    Break { sink: SinkId },
    /// A non-breaking branch held; the tuple went to `sink` and on to the
    /// continuation.
    Do { sink: SinkId },
    /// No branch held; the tuple went to the continuation only.
    Continue,
}

impl Routing {
    /// The branch sink that received the tuple, if a branch was selected.
    #[must_use]
    pub fn sink(&self) -> Option<SinkId> {
        match self {
            Routing::Break { sink } | Routing::Do { sink } => Some(*sink),
            Routing::Continue => None,
        }
    }

    #[must_use]
    pub fn reached_continuation(&self) -> bool {
        !matches!(self, Routing::Break { .. })
    }
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Routing::Break { sink } => write!(f, "break[{sink}]"),
            Routing::Do { sink } => write!(f, "do[{sink}]"),
            Routing::Continue => f.write_str("continue"),
        }
    }
}

/// Route `tuple` according to the selected execution target.
///
/// `partition` and `continuation` name the node's own main downstream sink.
pub fn dispatch<P>(
    selected: Option<&ConditionalExecution>,
    partition: PartitionId,
    continuation: SinkId,
    tuple: TupleRef<'_>,
    propagator: &mut P,
) -> Routing
where
    P: SinkPropagator + ?Sized,
{
    let routing = match selected {
        Some(execution) if execution.is_breaking() => {
            propagator.propagate(execution.partition(), execution.sink(), tuple);
            Routing::Break {
                sink: execution.sink(),
            }
        }
        Some(execution) => {
            propagator.propagate(execution.partition(), execution.sink(), tuple);
            propagator.propagate(partition, continuation, tuple);
            Routing::Do {
                sink: execution.sink(),
            }
        }
        None => {
            propagator.propagate(partition, continuation, tuple);
            Routing::Continue
        }
    };
    tracing::trace!(tuple = %tuple.id(), %routing, "tuple routed");
    routing
}

/// One tuple handed to a [`RecordingPropagator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub partition: PartitionId,
    pub sink: SinkId,
    pub tuple: TupleId,
}

/// Propagator that records every delivery in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordingPropagator {
    deliveries: Vec<Delivery>,
}

impl RecordingPropagator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Tuples delivered to `sink`, in arrival order.
    #[must_use]
    pub fn delivered_to(&self, sink: SinkId) -> Vec<TupleId> {
        self.deliveries
            .iter()
            .filter(|d| d.sink == sink)
            .map(|d| d.tuple)
            .collect()
    }

    #[must_use]
    pub fn into_deliveries(self) -> Vec<Delivery> {
        self.deliveries
    }
}

impl SinkPropagator for RecordingPropagator {
    fn propagate(&mut self, partition: PartitionId, sink: SinkId, tuple: TupleRef<'_>) {
        self.deliveries.push(Delivery {
            partition,
            sink,
            tuple: tuple.id(),
        });
    }
}
