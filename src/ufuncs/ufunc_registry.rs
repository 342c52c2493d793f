use std::{collections::HashMap, sync::Arc};

use crate::ufuncs::{HashlistHasImpl, HaswordImpl, MatchImpl, NocasecmpImpl, UfuncError, UfuncImpl};

/// Case-insensitive registry of user defined functions.
#[derive(Default, Clone)]
pub struct UfuncRegistry {
    by_name: HashMap<String, Arc<dyn UfuncImpl>>,
}

impl UfuncRegistry {
    pub fn new() -> Self {
        Self { by_name: HashMap::new() }
    }

    pub fn register<I: UfuncImpl + 'static>(&mut self, impl_: I) {
        self.by_name.insert(impl_.name().to_ascii_lowercase(), Arc::new(impl_));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn UfuncImpl>> {
        self.by_name.get(&name.to_ascii_lowercase()).cloned()
    }

    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.by_name.keys().cloned().collect();
        names.sort();
        names
    }

    /// Looks up `name` and checks that it is called with `count` arguments.
    pub fn checked(&self, name: &str, count: usize) -> Result<Arc<dyn UfuncImpl>, UfuncError> {
        let ufunc = self.get(name).ok_or_else(|| UfuncError::Unknown(name.to_string()))?;
        if ufunc.arity() != count {
            return Err(UfuncError::Arity { name: ufunc.name().to_string(), expected: ufunc.arity(), got: count });
        }
        Ok(ufunc)
    }

    pub fn default_registry() -> Self {
        let mut registry = Self::new();
        registry.register(MatchImpl);
        registry.register(NocasecmpImpl);
        registry.register(HaswordImpl);
        registry.register(HashlistHasImpl);
        registry
    }
}

impl std::fmt::Debug for UfuncRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UfuncRegistry").field("functions", &self.list()).finish()
    }
}
