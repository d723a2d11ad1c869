use std::collections::HashMap;

use super::Value;

/// Field storage keyed by dot-separated paths such as `"address.city"`.
///
/// Used for the fields of a [`Fact`](super::Fact) and for engine globals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: HashMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq)]
enum Entry {
    Leaf(Value),
    Nested(Record),
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value at a dot-separated path, creating intermediate records.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path. A leaf standing where an
    /// intermediate segment is needed is replaced by a nested record.
    pub fn insert(&mut self, path: &str, value: Value) {
        let mut segments = path.split('.').peekable();
        let mut record = self;
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                record.entries.insert(segment.to_owned(), Entry::Leaf(value));
                return;
            }
            let entry = record
                .entries
                .entry(segment.to_owned())
                .or_insert_with(|| Entry::Nested(Record::new()));
            if let Entry::Leaf(_) = entry {
                *entry = Entry::Nested(Record::new());
            }
            record = match entry {
                Entry::Nested(nested) => nested,
                Entry::Leaf(_) => return,
            };
        }
    }

    /// Look up a leaf value. Paths that stop at a nested record yield `None`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.').peekable();
        let mut record = self;
        while let Some(segment) = segments.next() {
            match (record.entries.get(segment)?, segments.peek().is_none()) {
                (Entry::Leaf(value), true) => return Some(value),
                (Entry::Nested(nested), false) => record = nested,
                _ => return None,
            }
        }
        None
    }

    /// Number of top-level entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
