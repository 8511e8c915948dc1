//! Transform registry system for value transforms.
//!
//! A configuration names transforms (`trim`, `attr(href)`, ...). The factory
//! looks each name up here while building the configuration tree, so unknown
//! names are rejected before any extraction runs. Callers can register their own
//! transforms alongside the built-in set.

mod builtin;
mod spec;

pub use spec::TransformSpec;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use scraper::ElementRef;
use serde_json::Value;

/// What a transform sees: the current pipeline value plus the element the
/// pipeline started from.
///
/// The element stays the same across a chain, so `[attr(foo), number]` still
/// reads attributes of the selected element even though `value` has changed.
pub struct PipelineInput<'a> {
    pub value: Value,
    pub element: ElementRef<'a>,
    pub base_uri: Option<&'a str>,
}

/// Trait for transformation functions
pub trait TransformFn: Send + Sync {
    /// Produce the next pipeline value. Failures degrade to `Value::Null`.
    fn execute(&self, input: &PipelineInput<'_>, args: &[String]) -> Value;

    /// Validate call arguments at configuration build time
    fn check_args(&self, args: &[String]) -> Result<(), String> {
        let _ = args;
        Ok(())
    }
}

/// Simple function-based implementation of TransformFn
impl<F> TransformFn for F
where
    F: Fn(&PipelineInput<'_>, &[String]) -> Value + Send + Sync,
{
    fn execute(&self, input: &PipelineInput<'_>, args: &[String]) -> Value {
        self(input, args)
    }
}

static BUILTIN: LazyLock<TransformRegistry> = LazyLock::new(|| {
    let mut registry = TransformRegistry::new();
    builtin::register_builtins(&mut registry);
    registry
});

/// Registry for storing and looking up transformation functions
#[derive(Clone)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn TransformFn>>,
}

impl TransformRegistry {
    /// Create a new empty transform registry
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Registry holding `trim`, `number`, `html`, `attr` and `url`
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Register a transformation function, replacing any previous one with
    /// the same name.
    ///
    /// # Example
    ///
    /// ```
    /// use markup_extract::transforms::{PipelineInput, TransformFn, TransformRegistry};
    /// use serde_json::Value;
    ///
    /// let mut registry = TransformRegistry::builtin();
    /// registry.register(
    ///     "uppercase",
    ///     Box::new(|input: &PipelineInput<'_>, _args: &[String]| match &input.value {
    ///         Value::String(s) => Value::String(s.to_uppercase()),
    ///         other => other.clone(),
    ///     }) as Box<dyn TransformFn>,
    /// );
    /// assert!(registry.has_transform("uppercase"));
    /// ```
    pub fn register(&mut self, name: impl Into<String>, func: Box<dyn TransformFn>) {
        self.transforms.insert(name.into(), Arc::from(func));
    }

    /// Look up a transform by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn TransformFn>> {
        self.transforms.get(name).cloned()
    }

    /// Check if a transform is registered
    pub fn has_transform(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Get list of all registered transform names, sorted
    pub fn list_transforms(&self) -> Vec<String> {
        let mut names: Vec<String> = self.transforms.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}
