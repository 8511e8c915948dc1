//! Building `ConfigNode` trees from YAML configuration text
//!
//! The whole tree is validated in a single pass: selectors are compiled,
//! transform names are resolved against the registry and argument counts are
//! checked. The first violation aborts the build.

use indexmap::IndexMap;
use scraper::Selector;
use serde_yaml::{Mapping, Value as YamlValue};

use super::node::{ConfigNode, LeafNode, SelectorExpr, Transform};
use crate::error::{ConfigError, ConfigPath, Result};
use crate::transforms::{TransformRegistry, TransformSpec};

/// Default cap on configuration nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

const SELECTOR: &str = "selector";
const TRANSFORM: &str = "transform";
const PROPERTIES: &str = "properties";
const UNION: &str = "union";
const CONSTANT: &str = "constant";

const KNOWN_KEYS: [&str; 5] = [SELECTOR, TRANSFORM, PROPERTIES, UNION, CONSTANT];

/// Builds configuration trees using a transform registry and a depth limit.
#[derive(Clone)]
pub struct ConfigFactory {
    registry: TransformRegistry,
    max_depth: usize,
}

impl ConfigFactory {
    /// Factory with the built-in transforms and the default depth limit
    pub fn new() -> Self {
        Self {
            registry: TransformRegistry::builtin(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_registry(mut self, registry: TransformRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse YAML configuration text into a validated tree
    pub fn build(&self, text: &str) -> Result<ConfigNode> {
        let yaml: YamlValue = match serde_yaml::from_str(text) {
            Ok(yaml) => yaml,
            Err(source) => {
                tracing::debug!(error = %source, "configuration text is not valid YAML");
                return Err(ConfigError::Syntax { source });
            }
        };
        self.build_value(&yaml)
    }

    /// Build from an already deserialized YAML value
    pub fn build_value(&self, value: &YamlValue) -> Result<ConfigNode> {
        match self.build_node(value, &ConfigPath::root(), 0) {
            Ok(node) => {
                tracing::debug!(nodes = node.node_count(), "built extraction config");
                Ok(node)
            }
            Err(err) => {
                tracing::debug!(error = %err, "rejected extraction config");
                Err(err)
            }
        }
    }

    fn build_node(&self, value: &YamlValue, path: &ConfigPath, depth: usize) -> Result<ConfigNode> {
        if depth > self.max_depth {
            return Err(ConfigError::TooDeep {
                path: path.clone(),
                max_depth: self.max_depth,
            });
        }

        let YamlValue::Mapping(mapping) = value else {
            return Err(ConfigError::NotAMapping {
                path: path.clone(),
                found: yaml_kind(value),
            });
        };

        let keys = checked_keys(mapping, path)?;

        for exclusive in [UNION, CONSTANT] {
            if !keys.contains(&exclusive) {
                continue;
            }
            if let Some(sibling) = keys.iter().find(|k| **k != exclusive) {
                return Err(ConfigError::ExclusiveKey {
                    path: path.clone(),
                    exclusive,
                    sibling: sibling.to_string(),
                });
            }
        }

        if let Some(branches) = mapping.get(UNION) {
            return self.build_union(branches, &path.key(UNION), depth);
        }

        if let Some(literal) = mapping.get(CONSTANT) {
            let value = serde_json::to_value(literal).map_err(|e| ConfigError::InvalidConstant {
                path: path.key(CONSTANT),
                message: e.to_string(),
            })?;
            return Ok(ConfigNode::Constant(value));
        }

        if keys.contains(&TRANSFORM) && keys.contains(&PROPERTIES) {
            return Err(ConfigError::TransformWithProperties { path: path.clone() });
        }

        let selector = mapping
            .get(SELECTOR)
            .map(|s| build_selector(s, &path.key(SELECTOR)))
            .transpose()?;

        let transform = mapping
            .get(TRANSFORM)
            .map(|t| self.build_transforms(t, &path.key(TRANSFORM)))
            .transpose()?;

        let properties = mapping
            .get(PROPERTIES)
            .map(|p| self.build_properties(p, &path.key(PROPERTIES), depth))
            .transpose()?;

        Ok(ConfigNode::Leaf(LeafNode {
            selector,
            transform,
            properties,
        }))
    }

    fn build_union(&self, value: &YamlValue, path: &ConfigPath, depth: usize) -> Result<ConfigNode> {
        let branches = match value {
            YamlValue::Sequence(items) if !items.is_empty() => items,
            _ => return Err(ConfigError::InvalidUnion { path: path.clone() }),
        };

        let nodes = branches
            .iter()
            .enumerate()
            .map(|(i, branch)| self.build_node(branch, &path.index(i), depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(ConfigNode::Union(nodes))
    }

    fn build_properties(
        &self,
        value: &YamlValue,
        path: &ConfigPath,
        depth: usize,
    ) -> Result<IndexMap<String, ConfigNode>> {
        let YamlValue::Mapping(mapping) = value else {
            return Err(ConfigError::PropertiesNotMapping { path: path.clone() });
        };

        let mut properties = IndexMap::with_capacity(mapping.len());
        for (key, child) in mapping {
            let name = match key {
                YamlValue::String(s) => s.clone(),
                YamlValue::Number(n) => n.to_string(),
                YamlValue::Bool(b) => b.to_string(),
                _ => return Err(ConfigError::PropertiesNotMapping { path: path.clone() }),
            };
            let node = self.build_node(child, &path.key(name.clone()), depth + 1)?;
            properties.insert(name, node);
        }
        Ok(properties)
    }

    fn build_transforms(&self, value: &YamlValue, path: &ConfigPath) -> Result<Vec<Transform>> {
        match value {
            YamlValue::String(text) => Ok(vec![self.resolve_transform(text, path)?]),
            YamlValue::Sequence(items) if !items.is_empty() => items
                .iter()
                .enumerate()
                .map(|(i, item)| match item {
                    YamlValue::String(text) => self.resolve_transform(text, &path.index(i)),
                    _ => Err(ConfigError::InvalidTransformList { path: path.index(i) }),
                })
                .collect(),
            _ => Err(ConfigError::InvalidTransformList { path: path.clone() }),
        }
    }

    fn resolve_transform(&self, text: &str, path: &ConfigPath) -> Result<Transform> {
        let spec = TransformSpec::parse(text).ok_or_else(|| ConfigError::MalformedTransform {
            path: path.clone(),
            text: text.to_string(),
        })?;

        let func = self
            .registry
            .get(&spec.name)
            .ok_or_else(|| ConfigError::UnknownTransform {
                path: path.clone(),
                name: spec.name.clone(),
            })?;

        func.check_args(&spec.args)
            .map_err(|message| ConfigError::InvalidTransformArgs {
                path: path.clone(),
                name: spec.name.clone(),
                message,
            })?;

        Ok(Transform::new(spec, func))
    }
}

impl Default for ConfigFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigNode {
    /// Build with the built-in transforms and default limits
    pub fn from_text(text: &str) -> Result<Self> {
        ConfigFactory::new().build(text)
    }
}

/// Mapping keys as strings, rejecting anything unrecognised
fn checked_keys<'m>(mapping: &'m Mapping, path: &ConfigPath) -> Result<Vec<&'m str>> {
    mapping
        .keys()
        .map(|key| match key.as_str() {
            Some(k) if KNOWN_KEYS.contains(&k) => Ok(k),
            Some(k) => Err(ConfigError::UnknownKey {
                path: path.clone(),
                key: k.to_string(),
            }),
            None => Err(ConfigError::UnknownKey {
                path: path.clone(),
                key: format!("<{}>", yaml_kind(key)),
            }),
        })
        .collect()
}

fn build_selector(value: &YamlValue, path: &ConfigPath) -> Result<SelectorExpr> {
    let YamlValue::String(source) = value else {
        return Err(ConfigError::SelectorNotString { path: path.clone() });
    };

    let source = source.trim();
    if source == SelectorExpr::SELF_SENTINEL {
        return Ok(SelectorExpr::SelfRef);
    }

    let selector = Selector::parse(source).map_err(|e| ConfigError::InvalidSelector {
        path: path.clone(),
        selector: source.to_string(),
        message: e.to_string(),
    })?;

    Ok(SelectorExpr::Query {
        source: source.to_string(),
        selector,
    })
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "list",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}
