use super::{Record, Value};

/// Read-only engine services available to conditions during evaluation.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    globals: Record,
}

impl EngineState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a global at a dot-separated path.
    #[must_use]
    pub fn with_global(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.globals.insert(path, value.into());
        self
    }

    pub fn set_global(&mut self, path: &str, value: Value) {
        self.globals.insert(path, value);
    }

    #[must_use]
    pub fn global(&self, path: &str) -> Option<&Value> {
        self.globals.get(path)
    }
}
