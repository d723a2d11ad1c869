use std::fmt;
use std::sync::Arc;

use super::{Record, Value};

/// Working-memory identity of a fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FactId(u64);

impl FactId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fact#{}", self.0)
    }
}

/// A fact instance: its fully qualified runtime type plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    type_name: String,
    fields: Record,
}

impl Fact {
    /// Create a fact of the given fully qualified type with no fields.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Record::new(),
        }
    }

    /// Set a field at a dot-separated path.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(path, value.into());
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.fields.get(path)
    }

    #[must_use]
    pub fn fields(&self) -> &Record {
        &self.fields
    }
}

/// Handle binding a fact into a tuple. Cloning shares the fact.
#[derive(Debug, Clone)]
pub struct FactHandle {
    id: FactId,
    fact: Arc<Fact>,
}

impl FactHandle {
    #[must_use]
    pub fn new(id: FactId, fact: Fact) -> Self {
        Self {
            id,
            fact: Arc::new(fact),
        }
    }

    #[must_use]
    pub fn id(&self) -> FactId {
        self.id
    }

    #[must_use]
    pub fn fact(&self) -> &Fact {
        &self.fact
    }

    /// The runtime type name of the bound fact.
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.fact.type_name()
    }
}

impl PartialEq for FactHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FactHandle {}
