//! End-to-end rendering scenarios.

use std::io;

use pooled_render::{RenderError, Renderer, Template, TemplateSet};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Person {
    #[serde(rename = "Name")]
    name: String,
}

#[test]
fn greet_renders_exact_output() {
    let renderer = Renderer::new();
    renderer
        .register_source("greet", "<p>Hello, {{ Name }}</p>")
        .unwrap();

    let mut sink = Vec::new();
    renderer
        .render(&mut sink, "greet", &Person { name: "Ada".into() })
        .unwrap();

    assert_eq!(String::from_utf8(sink).unwrap(), "<p>Hello, Ada</p>");
}

#[test]
fn missing_template_leaves_sink_unchanged() {
    let renderer = Renderer::new();
    renderer.register_source("greet", "hi").unwrap();

    let mut sink = b"prior content".to_vec();
    let err = renderer
        .render(&mut sink, "missing", &json!({ "Name": "Ada" }))
        .unwrap_err();

    match err {
        RenderError::TemplateNotFound { name } => assert_eq!(name, "missing"),
        other => panic!("expected TemplateNotFound, got {other}"),
    }
    assert_eq!(sink, b"prior content");
    assert_eq!(renderer.pool().stats().allocated, 0);
}

#[test]
fn missing_sub_template_is_execution_error_and_pool_stays_clean() {
    let renderer = Renderer::new();
    renderer
        .register_source("bad", r#"partial output {% include "nope" %}"#)
        .unwrap();
    renderer.register_source("good", "clean").unwrap();

    let mut sink = b"before".to_vec();
    let err = renderer.render(&mut sink, "bad", &()).unwrap_err();
    assert!(matches!(err, RenderError::Execution { ref name, .. } if name == "bad"));
    assert_eq!(sink, b"before");

    let stats = renderer.pool().stats();
    assert_eq!(stats.in_flight(), 0);
    assert_eq!(stats.idle, 1);

    let mut sink = Vec::new();
    renderer.render(&mut sink, "good", &()).unwrap();
    assert_eq!(sink, b"clean");
    assert_eq!(renderer.pool().stats().reused, 1);
}

#[test]
fn absent_data_expands_fields_to_empty() {
    let renderer = Renderer::new();
    renderer
        .register_source("greet", "<p>Hello, {{ Name }}</p>")
        .unwrap();

    let mut sink = Vec::new();
    renderer.render(&mut sink, "greet", &()).unwrap();
    assert_eq!(sink, b"<p>Hello, </p>");

    let mut sink = Vec::new();
    renderer
        .render(&mut sink, "greet", &None::<Person>)
        .unwrap();
    assert_eq!(sink, b"<p>Hello, </p>");
}

#[test]
fn rendering_twice_is_byte_identical() {
    let renderer = Renderer::new();
    renderer
        .register_source(
            "list",
            "{% for p in people %}<li>{{ p.Name }}</li>{% endfor %}",
        )
        .unwrap();
    let data = json!({ "people": [{ "Name": "Ada" }, { "Name": "Grace" }] });

    let mut first = Vec::new();
    let mut second = Vec::new();
    renderer.render(&mut first, "list", &data).unwrap();
    renderer.render(&mut second, "list", &data).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, b"<li>Ada</li><li>Grace</li>");
}

/// Writes a long prefix into the buffer and then fails.
struct FailsHalfway;

impl Template for FailsHalfway {
    fn execute(
        &self,
        _entry: &str,
        _data: &serde_json::Value,
        out: &mut dyn io::Write,
    ) -> Result<(), pooled_render::ExecutionError> {
        out.write_all(b"GARBAGE GARBAGE GARBAGE")?;
        Err("engine fault".into())
    }

    fn has_entry(&self, _entry: &str) -> bool {
        true
    }
}

#[test]
fn failed_partial_output_never_leaks_into_next_render() {
    let renderer = Renderer::new();
    renderer.register("broken", FailsHalfway);
    renderer.register_source("short", "ok").unwrap();

    let mut sink = Vec::new();
    let err = renderer.render(&mut sink, "broken", &()).unwrap_err();
    assert!(err.to_string().contains("engine fault"));
    assert!(sink.is_empty());

    renderer.render(&mut sink, "short", &()).unwrap();
    assert_eq!(sink, b"ok");
}

#[test]
fn reregistration_replaces_template() {
    let renderer = Renderer::new();
    renderer.register_source("page", "v1").unwrap();
    assert_eq!(renderer.render_to_string("page", &()).unwrap(), "v1");

    renderer.register("page", TemplateSet::single("page", "v2").unwrap());
    assert_eq!(renderer.render_to_string("page", &()).unwrap(), "v2");
}

#[test]
fn handle_registered_under_other_name_needs_matching_entry() {
    let renderer = Renderer::new();
    renderer.register("alias", TemplateSet::single("real", "body").unwrap());

    let mut sink = Vec::new();
    let err = renderer.render(&mut sink, "alias", &()).unwrap_err();
    assert!(matches!(err, RenderError::Execution { .. }));
    assert!(sink.is_empty());
}
