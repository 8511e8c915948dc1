//! Extraction configuration: the typed tree and the factory that builds it.

mod factory;
mod node;

pub use factory::{ConfigFactory, DEFAULT_MAX_DEPTH};
pub use node::{ConfigNode, LeafNode, SelectorExpr, Transform};
