//! Declarative HTML extraction driven by YAML configuration
//!
//! A configuration describes what to select and how to shape it:
//! - `selector`: CSS selector (comma lists allowed) or `$self`
//! - `transform`: `trim`, `number`, `html`, `attr(...)`, `url`, or a list of them
//! - `properties`: named sub-configurations producing a mapping
//! - `union`: alternatives, first match wins
//! - `{ constant: ... }`: a literal value
//!
//! ```
//! use serde_json::json;
//!
//! let html = r#"<div class="foo">    Hello World!   </div>"#;
//! let value = markup_extract::extract_html(html, "selector: .foo\ntransform: trim").unwrap();
//! assert_eq!(value, json!("Hello World!"));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod ffi;
pub mod transforms;

pub use config::{ConfigFactory, ConfigNode};
pub use document::{Context, Document};
pub use error::{ConfigError, ConfigPath, Result};
pub use evaluator::extract;
pub use ffi::*;
pub use transforms::{PipelineInput, TransformFn, TransformRegistry, TransformSpec};

use serde_json::Value;

/// Parse `html` as a document, build `config_text` and extract from the root
pub fn extract_html(html: &str, config_text: &str) -> Result<Value> {
    let config = ConfigNode::from_text(config_text)?;
    let document = Document::parse(html);
    Ok(extract(&document.root_context(), &config))
}
