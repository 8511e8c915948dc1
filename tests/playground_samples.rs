//! The playground sample configurations, run end to end over full documents.

use markup_extract::{extract, extract_html, ConfigError, ConfigFactory, Document};
use serde_json::{json, Value};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn sample(html: &str, config: &str) -> Value {
    init_tracing();
    extract_html(html, config).unwrap()
}

#[test]
fn test_simple() {
    assert_eq!(
        sample(r#"<div class="foo">Hello World!</div>"#, "selector: .foo"),
        json!("Hello World!")
    );
}

#[test]
fn test_overlapping_selector_patterns() {
    assert_eq!(
        sample(r#"<div class="a">x</div><p>y</p>"#, "selector: div, .a, p"),
        json!(["x", "y"])
    );
}

#[test]
fn test_quoted_attr_argument_keeps_commas() {
    assert_eq!(
        sample("<p>y</p>", "selector: p\ntransform: attr(\"a,b\")"),
        Value::Null
    );
}

#[test]
fn test_get_number() {
    assert_eq!(
        sample(
            r#"<div class="foo">123</div>"#,
            "selector: .foo\ntransform: number"
        ),
        json!(123)
    );
    assert_eq!(
        sample(
            r#"<div class="foo">one two three</div>"#,
            "selector: .foo\ntransform: number"
        ),
        Value::Null
    );
}

#[test]
fn test_trim() {
    let html = r#"<div class="foo">    Hello World!   </div>"#;
    assert_eq!(
        sample(
            html,
            "selector: .foo\ntransform: trim # try commenting-out this see non-trimmed result"
        ),
        json!("Hello World!")
    );
    assert_eq!(sample(html, "selector: .foo"), json!("    Hello World!   "));
}

#[test]
fn test_attr() {
    assert_eq!(
        sample(
            r#"<div foo="bar">Hello World!</div>"#,
            "selector: div\ntransform: attr(foo)"
        ),
        json!("bar")
    );
}

#[test]
fn test_attr_multi() {
    assert_eq!(
        sample(
            r#"<div foo="aaa" bar="bbb">Hello World!</div>"#,
            "selector: div\ntransform: attr(foo, bar)"
        ),
        json!({"foo": "aaa", "bar": "bbb"})
    );
}

#[test]
fn test_attr_all() {
    assert_eq!(
        sample(
            r#"<div foo="aaa" bar="bbb">Hello World!</div>"#,
            "selector: div\ntransform: attr()"
        ),
        json!({"foo": "aaa", "bar": "bbb"})
    );
}

#[test]
fn test_html() {
    let html = "<div class=\"foo\">\n  <span>Hello world!</span>\n</div>";
    assert_eq!(
        sample(html, "selector: .foo\ntransform: html\n"),
        json!("\n  <span>Hello world!</span>\n")
    );
}

#[test]
fn test_parent_html() {
    let html = "<div class=\"foo\">\n  <div>\n    Hello <span>World!</span>\n  </div>\n</div>";
    let expected = json!({"innerHTML": "\n  <div>\n    Hello <span>World!</span>\n  </div>\n"});

    assert_eq!(
        sample(html, "selector: .foo\nproperties:\n  innerHTML:\n    transform: html"),
        expected
    );
    assert_eq!(
        sample(
            html,
            "selector: .foo\nproperties:\n  innerHTML:\n    selector: $self\n    transform: html"
        ),
        expected
    );
}

#[test]
fn test_multi_transform() {
    assert_eq!(
        sample(
            r#"<span foo="123">Hello World!</span>"#,
            "selector: span\ntransform: [attr(foo), number]"
        ),
        json!(123)
    );
}

#[test]
fn test_union() {
    let config = r#"union: # union must be the only config property
  - selector: p # the first config, will search for p element
  - selector: a # the second config. searches a elements and converts these to number
    transform: number
  - selector: div, span # both of div's and span's will be matched."#;

    assert_eq!(
        sample("<div>Hello </div><span>World!</span>", config),
        json!(["Hello ", "World!"])
    );
}

#[test]
fn test_union_equals_first_matching_branch() {
    let html = "<div>Hello </div><span>World!</span>";
    let union = "union:\n  - selector: p\n  - selector: a\n    transform: number\n  - selector: div, span";
    assert_eq!(sample(html, union), sample(html, "selector: div, span"));
}

#[test]
fn test_union_default() {
    let config = r#"union: # union must be the only config property
  - selector: p # the first config, will search for p element
  - selector: a # the second config. searches a elements and converts these to number
    transform: number
  - selector: non-existent
  # the default if any of the configs above don't match
  # (selector was not passed)
  - properties:
      foo: { constant: nothing-matched }"#;

    assert_eq!(
        sample("<div>Hello </div><span>World!</span>", config),
        json!({"foo": "nothing-matched"})
    );
}

#[test]
fn test_invalid_union_config() {
    init_tracing();
    let err = extract_html("<p>x</p>", "selector: p\nunion:\n  - selector: p").unwrap_err();
    assert!(matches!(err, ConfigError::ExclusiveKey { .. }));
}

#[test]
fn test_shared_config_across_threads() {
    init_tracing();
    let config = ConfigFactory::new()
        .build("selector: li\ntransform: [trim, number]")
        .unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let config = &config;
                scope.spawn(move || {
                    let document = Document::parse(&format!("<ul><li> {} </li></ul>", n));
                    extract(&document.root_context(), config)
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            assert_eq!(handle.join().unwrap(), json!(n));
        }
    });
}

#[test]
fn test_same_output_on_rerun() {
    let html = r#"<ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul>"#;
    let config = r#"
selector: li
properties:
  links:
    selector: a
    transform: attr(href)
  labels:
    selector: a
"#;
    let first = sample(html, config);
    assert_eq!(first, json!({"links": ["/a", "/b"], "labels": ["A", "B"]}));
    assert_eq!(first, sample(html, config));
}
