//! Integration tests for filling placeholders in rendered notes.

use boxnote_html::{convert_str, fill_placeholders, placeholders, TemplateValues};
use serde_json::json;

fn greeting_note() -> String {
    json!({"doc": {"content": [
        {"type": "paragraph", "content": [
            {"type": "text", "text": "Hi ${Name}, "},
            {"type": "text", "text": "welcome", "marks": [{"type": "strong"}]},
            {"type": "text", "text": " to ${TEAM}. Ask ${manager} anything."}
        ]}
    ]}})
    .to_string()
}

#[test]
fn test_fill_rendered_note() {
    let html = convert_str(&greeting_note(), "Welcome").unwrap();
    assert_eq!(placeholders(&html), vec!["Name", "TEAM", "manager"]);

    let values = TemplateValues::new()
        .with("name", "Ada")
        .with("team", "R&D");
    let filled = fill_placeholders(&html, &values);

    assert!(filled.contains("Hi Ada, <strong>welcome</strong> to R&amp;D."));
    assert_eq!(placeholders(&filled), vec!["manager"]);
}

#[test]
fn test_fill_from_assignments() {
    let html = convert_str(&greeting_note(), "Welcome").unwrap();
    let values =
        TemplateValues::from_assignments(["NAME=Grace", "team=Compilers", "manager=<Admiral>"])
            .unwrap();
    let filled = fill_placeholders(&html, &values);

    assert!(placeholders(&filled).is_empty());
    assert!(filled.contains("Ask &lt;Admiral&gt; anything."));
}

#[test]
fn test_bad_assignment_is_template_error() {
    let err = TemplateValues::from_assignments(["missing-equals"]).unwrap_err();
    assert!(matches!(err, boxnote_html::Error::Template(_)));
}
