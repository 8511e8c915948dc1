//! Evaluation of a configuration tree against a document context
//!
//! Pure recursion over the `ConfigNode` tree: no state survives a call, and
//! every non-match degrades to `null` instead of an error.

use std::borrow::Cow;

use scraper::ElementRef;
use serde_json::{Map, Value};

use crate::config::{ConfigNode, LeafNode, SelectorExpr, Transform};
use crate::document::{text_content, Context};
use crate::transforms::PipelineInput;

/// Evaluate `config` against `context` and return the extracted value
pub fn extract(context: &Context<'_>, config: &ConfigNode) -> Value {
    tracing::debug!(context_len = context.len(), "starting extraction");
    evaluate(context, config)
}

fn evaluate(context: &Context<'_>, node: &ConfigNode) -> Value {
    match node {
        ConfigNode::Constant(value) => value.clone(),
        ConfigNode::Union(branches) => evaluate_union(context, branches).unwrap_or(Value::Null),
        ConfigNode::Leaf(leaf) => match select(context, leaf.selector.as_ref()) {
            Some(selected) => evaluate_selected(&selected, leaf),
            None => Value::Null,
        },
    }
}

/// First matching branch wins. `None` means no branch matched.
///
/// A leaf matches when its selector finds something (or it has none), a
/// constant always matches, a nested union matches when one of its own
/// branches does.
fn evaluate_union(context: &Context<'_>, branches: &[ConfigNode]) -> Option<Value> {
    for (index, branch) in branches.iter().enumerate() {
        let value = match branch {
            ConfigNode::Constant(value) => Some(value.clone()),
            ConfigNode::Union(nested) => evaluate_union(context, nested),
            ConfigNode::Leaf(leaf) => select(context, leaf.selector.as_ref())
                .map(|selected| evaluate_selected(&selected, leaf)),
        };
        if value.is_some() {
            tracing::trace!(branch = index, "union branch matched");
            return value;
        }
    }
    tracing::trace!(branches = branches.len(), "no union branch matched");
    None
}

/// Resolve a leaf's selector. No selector and `$self` keep the context as is.
fn select<'c, 'a>(
    context: &'c Context<'a>,
    selector: Option<&SelectorExpr>,
) -> Option<Cow<'c, Context<'a>>> {
    match selector {
        None | Some(SelectorExpr::SelfRef) => Some(Cow::Borrowed(context)),
        Some(SelectorExpr::Query { source, selector }) => {
            let selected = context.select(selector);
            tracing::trace!(
                selector = %source,
                matches = selected.as_ref().map_or(0, Context::len),
                "resolved selector"
            );
            selected.map(Cow::Owned)
        }
    }
}

fn evaluate_selected(selected: &Context<'_>, leaf: &LeafNode) -> Value {
    if let Some(properties) = &leaf.properties {
        let object: Map<String, Value> = properties
            .iter()
            .map(|(name, node)| (name.clone(), evaluate(selected, node)))
            .collect();
        return Value::Object(object);
    }

    let transforms = leaf.transform.as_deref().unwrap_or(&[]);
    match selected.elements() {
        [element] => run_pipeline(*element, selected.base_uri(), transforms),
        elements => Value::Array(
            elements
                .iter()
                .map(|element| run_pipeline(*element, selected.base_uri(), transforms))
                .collect(),
        ),
    }
}

/// Start from the element's raw text and feed each stage's output to the next
fn run_pipeline<'a>(
    element: ElementRef<'a>,
    base_uri: Option<&'a str>,
    transforms: &[Transform],
) -> Value {
    let mut input = PipelineInput {
        value: Value::String(text_content(&element)),
        element,
        base_uri,
    };
    for transform in transforms {
        input.value = transform.apply(&input);
    }
    input.value
}
