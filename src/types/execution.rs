use std::fmt;

use crate::partition::PartitionId;

/// Reference to a downstream sink of the rule network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SinkId(u32);

impl SinkId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink:{}", self.0)
    }
}

/// Where a tuple goes when its branch condition holds.
///
/// A breaking target ends routing at its sink. A non-breaking ("do") target
/// forwards to its sink and lets the tuple continue down the main path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionalExecution {
    partition: PartitionId,
    sink: SinkId,
    breaking: bool,
}

impl ConditionalExecution {
    #[must_use]
    pub const fn new(partition: PartitionId, sink: SinkId, breaking: bool) -> Self {
        Self {
            partition,
            sink,
            breaking,
        }
    }

    #[must_use]
    pub fn sink(&self) -> SinkId {
        self.sink
    }

    /// Partition owning the downstream sink.
    #[must_use]
    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    #[must_use]
    pub fn is_breaking(&self) -> bool {
        self.breaking
    }
}

impl fmt::Display for ConditionalExecution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.breaking { "break" } else { "do" };
        write!(f, "{kind}[{}]", self.sink)
    }
}
