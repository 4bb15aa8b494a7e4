//! `(language_tag -> runner)` registry. The only extensibility seam the
//! spec calls out: adding a backend is registering one more entry here, no
//! other component changes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::SandboxRunner;

#[derive(Default, Clone)]
pub struct LanguageRegistry {
    runners: HashMap<String, Arc<dyn SandboxRunner>>,
}

impl LanguageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, language: impl Into<String>, runner: Arc<dyn SandboxRunner>) {
        self.runners.insert(language.into(), runner);
    }

    pub fn get(&self, language: &str) -> Option<Arc<dyn SandboxRunner>> {
        self.runners.get(language).cloned()
    }
}
