use indexmap::IndexMap;
use rhai::FnPtr;
use tracing::debug;

/// Functions a script exported during its own execution.
///
/// The registry belongs to the script source and is cleared before every
/// script runs, so exports never leak from one source into the next.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, FnPtr>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.functions.clear();
    }

    /// Records `function` under `name`, replacing an earlier export of that name.
    pub fn register(&mut self, name: impl Into<String>, function: FnPtr) {
        let name = name.into();
        debug!(function = %name, "collecting function");
        self.functions.insert(name, function);
    }

    /// Takes every export, leaving the registry empty.
    pub fn drain(&mut self) -> IndexMap<String, FnPtr> {
        std::mem::take(&mut self.functions)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
