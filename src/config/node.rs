//! Typed configuration tree

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use scraper::Selector;
use serde_json::Value;

use crate::transforms::{PipelineInput, TransformFn, TransformSpec};

/// One parsed configuration fragment.
#[derive(Debug, Clone)]
pub enum ConfigNode {
    /// Select, then either build a mapping from `properties` or produce a
    /// scalar through the transform chain.
    Leaf(LeafNode),
    /// Ordered alternatives; the first branch that matches wins.
    Union(Vec<ConfigNode>),
    /// `{ constant: <literal> }`: ignores the context entirely.
    Constant(Value),
}

#[derive(Debug, Clone, Default)]
pub struct LeafNode {
    pub selector: Option<SelectorExpr>,
    pub transform: Option<Vec<Transform>>,
    pub properties: Option<IndexMap<String, ConfigNode>>,
}

/// Where a leaf takes its elements from.
#[derive(Debug, Clone)]
pub enum SelectorExpr {
    /// `$self`: the current context, not a child query
    SelfRef,
    /// A CSS selector, possibly a comma-separated list
    Query { source: String, selector: Selector },
}

impl SelectorExpr {
    pub const SELF_SENTINEL: &'static str = "$self";

    pub fn source(&self) -> &str {
        match self {
            SelectorExpr::SelfRef => Self::SELF_SENTINEL,
            SelectorExpr::Query { source, .. } => source,
        }
    }
}

/// A transform call resolved against a registry
#[derive(Clone)]
pub struct Transform {
    spec: TransformSpec,
    func: Arc<dyn TransformFn>,
}

impl Transform {
    pub(crate) fn new(spec: TransformSpec, func: Arc<dyn TransformFn>) -> Self {
        Self { spec, func }
    }

    pub fn spec(&self) -> &TransformSpec {
        &self.spec
    }

    pub fn apply(&self, input: &PipelineInput<'_>) -> Value {
        self.func.execute(input, &self.spec.args)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.spec.to_string()).finish()
    }
}

impl ConfigNode {
    /// Total number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            ConfigNode::Leaf(leaf) => {
                1 + leaf
                    .properties
                    .iter()
                    .flat_map(|props| props.values())
                    .map(ConfigNode::node_count)
                    .sum::<usize>()
            }
            ConfigNode::Union(branches) => {
                1 + branches.iter().map(ConfigNode::node_count).sum::<usize>()
            }
            ConfigNode::Constant(_) => 1,
        }
    }
}
