//! Actions and callback resolution.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::response::Response;

use crate::routing::{Callback, Route};

/// Everything an action needs from the matched request.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub route: Arc<Route>,
    pub method: String,
    pub base_url: String,
    /// Resolved arguments, path values first.
    pub arguments: Vec<(String, String)>,
    pub dynamic_arguments: Vec<String>,
}

impl Invocation {
    pub fn argument(&self, name: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A request handler a callback resolves to.
pub trait Action: Send + Sync {
    fn invoke(&self, invocation: &Invocation) -> Response;
}

impl<F> Action for F
where
    F: Fn(&Invocation) -> Response + Send + Sync,
{
    fn invoke(&self, invocation: &Invocation) -> Response {
        self(invocation)
    }
}

/// Turns a route callback into an action.
pub trait CallbackResolver: Send + Sync {
    fn resolve(&self, callback: &Callback) -> Option<Arc<dyn Action>>;
}

/// Map-backed [`CallbackResolver`].
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    functions: HashMap<String, Arc<dyn Action>>,
    methods: HashMap<(String, String), Arc<dyn Action>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the action for `Callback::Function(name)`.
    pub fn function(mut self, name: impl Into<String>, action: impl Action + 'static) -> Self {
        self.functions.insert(name.into(), Arc::new(action));
        self
    }

    /// Register the action for `Callback::Method { component, method }`.
    pub fn method(
        mut self,
        component: impl Into<String>,
        method: impl Into<String>,
        action: impl Action + 'static,
    ) -> Self {
        self.methods
            .insert((component.into(), method.into()), Arc::new(action));
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CallbackResolver for HandlerRegistry {
    fn resolve(&self, callback: &Callback) -> Option<Arc<dyn Action>> {
        match callback {
            Callback::Function(name) => self.functions.get(name).cloned(),
            Callback::Method { component, method } => self
                .methods
                .get(&(component.clone(), method.clone()))
                .cloned(),
        }
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
