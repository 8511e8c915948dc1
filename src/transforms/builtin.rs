//! Built-in transforms: trim, number, html, attr, url

use serde_json::{Map, Number, Value};
use url::Url;

use super::{PipelineInput, TransformFn, TransformRegistry};
use crate::document::{attribute, attributes, inner_markup};

pub(super) fn register_builtins(registry: &mut TransformRegistry) {
    registry.register("trim", Box::new(NoArgs(trim)));
    registry.register("number", Box::new(NoArgs(number)));
    registry.register("html", Box::new(NoArgs(html)));
    registry.register("url", Box::new(NoArgs(resolve_url)));
    registry.register("attr", Box::new(attr));
}

/// Transform that rejects any call arguments
struct NoArgs(fn(&PipelineInput<'_>) -> Value);

impl TransformFn for NoArgs {
    fn execute(&self, input: &PipelineInput<'_>, _args: &[String]) -> Value {
        (self.0)(input)
    }

    fn check_args(&self, args: &[String]) -> Result<(), String> {
        if args.is_empty() {
            Ok(())
        } else {
            Err(format!("expected no arguments, got {}", args.len()))
        }
    }
}

fn trim(input: &PipelineInput<'_>) -> Value {
    match &input.value {
        Value::String(s) => Value::String(s.trim().to_string()),
        other => other.clone(),
    }
}

fn number(input: &PipelineInput<'_>) -> Value {
    match &input.value {
        Value::String(s) => parse_number(s),
        Value::Number(n) => Value::Number(n.clone()),
        _ => Value::Null,
    }
}

/// Integers stay integers; anything non-finite or unparsable is null
fn parse_number(text: &str) -> Value {
    let text = text.trim();
    if text.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = text.parse::<u64>() {
        return Value::Number(u.into());
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn html(input: &PipelineInput<'_>) -> Value {
    Value::String(inner_markup(&input.element))
}

fn attr(input: &PipelineInput<'_>, args: &[String]) -> Value {
    match args {
        [] => {
            let all: Map<String, Value> = attributes(&input.element)
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            Value::Object(all)
        }
        [name] => attribute(&input.element, name)
            .map(|v| Value::String(v.to_string()))
            .unwrap_or(Value::Null),
        names => {
            let picked: Map<String, Value> = names
                .iter()
                .map(|name| {
                    let value = attribute(&input.element, name)
                        .map(|v| Value::String(v.to_string()))
                        .unwrap_or(Value::Null);
                    (name.clone(), value)
                })
                .collect();
            Value::Object(picked)
        }
    }
}

fn resolve_url(input: &PipelineInput<'_>) -> Value {
    let Value::String(reference) = &input.value else {
        return Value::Null;
    };
    let reference = reference.trim();

    let resolved = match input.base_uri {
        Some(base) => Url::parse(base).and_then(|base| base.join(reference)),
        None => match Url::parse(reference) {
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Value::String(reference.to_string());
            }
            other => other,
        },
    };

    resolved
        .map(|u| Value::String(u.to_string()))
        .unwrap_or(Value::Null)
}
