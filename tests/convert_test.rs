//! Integration tests for end-to-end note conversion.

use std::fs;

use boxnote_html::{
    convert, convert_file, convert_str, BoxnoteHtml, CleanupPreset, Error, NodeKind,
    RenderOptions,
};
use serde_json::json;

const VOID_ELEMENTS: [&str; 4] = ["hr", "img", "meta", "br"];

/// Check that every opened element is closed in order.
fn assert_balanced(html: &str) {
    let mut stack: Vec<String> = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        let end = after.find('>').expect("unterminated tag");
        let tag = &after[..end];
        rest = &after[end + 1..];

        if tag.starts_with('!') {
            continue;
        }
        if let Some(name) = tag.strip_prefix('/') {
            let open = stack.pop().unwrap_or_else(|| panic!("unexpected </{}> in {}", name, html));
            assert_eq!(open, name, "mismatched close in {}", html);
            continue;
        }
        let name: String = tag
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if !VOID_ELEMENTS.contains(&name.as_str()) {
            stack.push(name);
        }
    }
    assert!(stack.is_empty(), "unclosed elements {:?} in {}", stack, html);
}

fn note(content: serde_json::Value) -> String {
    json!({"doc": {"content": content}}).to_string()
}

fn body(html: &str) -> &str {
    let start = html.find("<body>").map(|i| i + "<body>".len()).unwrap_or(0);
    let end = html.rfind("</body>").unwrap_or(html.len());
    &html[start..end]
}

// ==================== Scenarios ====================

#[test]
fn test_hello_paragraph() {
    let input = r#"{"doc":{"content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}}"#;
    let html = convert(input, "Test", ".", None, None).unwrap();

    assert!(html.starts_with("<!DOCTYPE html><html>"));
    assert!(html.contains("<title>Test</title>"));
    assert_eq!(body(&html), "<p style=\"text-align: left\">Hello</p>");
    assert_balanced(&html);
}

#[test]
fn test_centered_paragraph() {
    let input = note(json!([{
        "type": "paragraph",
        "marks": [{"type": "alignment", "attrs": {"alignment": "center"}}],
        "content": [{"type": "text", "text": "Centered"}]
    }]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(body(&html), "<p style=\"text-align: center\">Centered</p>");
}

#[test]
fn test_list_item_paragraph_unwrapped() {
    let input = note(json!([{
        "type": "bullet_list",
        "content": [{
            "type": "list_item",
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Item"}]}]
        }]
    }]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(body(&html), "<ul><li>Item</li></ul>");
    assert!(!body(&html).contains("<p"));
}

#[test]
fn test_unknown_type_skipped_with_children() {
    let input = note(json!([
        {"type": "unknown_future_type", "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "hidden"}]}
        ]},
        {"type": "paragraph", "content": [{"type": "text", "text": "visible"}]}
    ]));
    let html = convert_str(&input, "t").unwrap();
    assert!(!html.contains("hidden"));
    assert!(html.contains("visible"));
}

#[test]
fn test_missing_type_anywhere_fails() {
    let cases = [
        note(json!([{"content": []}])),
        note(json!([{"type": "paragraph", "content": [{"text": "x"}]}])),
        note(json!([{"type": "unknown_future_type", "content": [{"text": "x"}]}])),
        note(json!([{"type": "table", "content": {"type": "table_row", "content": [{"attrs": {}}]}}])),
    ];
    for input in cases {
        let result = convert(&input, "t", ".", None, None);
        assert!(
            matches!(result, Err(Error::MalformedDocument(_))),
            "expected malformed for {}",
            input
        );
    }
}

// ==================== Validation ====================

#[test]
fn test_envelope_validation() {
    for input in ["", "not json", "[]", r#"{"doc": 1}"#, r#"{"other": {}}"#, r#"{"doc": {}}"#] {
        let err = convert(input, "t", ".", None, None).unwrap_err();
        assert!(err.is_malformed(), "expected malformed for {:?}: {}", input, err);
    }
}

#[test]
fn test_empty_content_renders_empty_body() {
    let html = convert(r#"{"doc":{"content":[]}}"#, "Empty", ".", None, None).unwrap();
    assert_eq!(body(&html), "");
    assert_balanced(&html);
}

#[test]
fn test_deep_nesting_converts() {
    let mut node = json!({"type": "paragraph", "content": [{"type": "text", "text": "deep"}]});
    for _ in 0..200 {
        node = json!({"type": "blockquote", "content": [node]});
    }
    let input = json!({"doc": {"content": [node]}}).to_string();

    let html = convert(&input, "t", ".", None, None).unwrap();
    assert_eq!(html.matches("<blockquote>").count(), 200);
    assert!(html.contains("<blockquote><p style=\"text-align: left\">deep</p></blockquote>"));
    assert_balanced(&html);
}

// ==================== Suppression ====================

#[test]
fn test_suppressing_containers() {
    let para = json!({"type": "paragraph", "content": [{"type": "text", "text": "x"}]});
    let containers = [
        json!({"type": "check_list", "content": [{"type": "check_list_item", "attrs": {"checked": false}, "content": [para.clone()]}]}),
        json!({"type": "table", "content": [{"type": "table_row", "content": [{"type": "table_cell", "content": [para.clone()]}]}]}),
        json!({"type": "call_out_box", "content": [para.clone()]}),
        json!({"type": "ordered_list", "content": [{"type": "list_item", "content": [para.clone()]}]}),
    ];
    for container in containers {
        let html = convert_str(&note(json!([container])), "t").unwrap();
        assert!(!body(&html).contains("<p"), "paragraph not unwrapped: {}", html);
        assert!(body(&html).contains('x'));
        assert_balanced(&html);
    }

    let html = convert_str(&note(json!([para])), "t").unwrap();
    assert!(body(&html).contains("<p style=\"text-align: left\">x</p>"));
}

#[test]
fn test_suppression_survives_nested_wrappers() {
    let input = note(json!([{
        "type": "bullet_list",
        "content": [{"type": "list_item", "content": [
            {"type": "bullet_list", "content": [{"type": "list_item", "content": [
                {"type": "blockquote", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "deep"}]}
                ]}
            ]}]}
        ]}]
    }]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(
        body(&html),
        "<ul><li><ul><li><blockquote>deep</blockquote></li></ul></li></ul>"
    );
}

#[test]
fn test_check_list_item_markers() {
    let input = note(json!([{"type": "check_list", "content": [
        {"type": "check_list_item", "attrs": {"checked": true}, "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "done"}]}
        ]},
        {"type": "check_list_item", "attrs": {"checked": false}, "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": "todo"}]}
        ]}
    ]}]));
    let html = convert_str(&input, "t").unwrap();
    let body = body(&html);
    assert!(body.contains("class=\"check-list-item checked\""));
    assert!(body.contains("[X]</span> done</li>"));
    assert!(body.contains("[  ]</span> todo</li>"));
}

// ==================== Cleanup ====================

#[test]
fn test_empty_paragraphs_removed() {
    let input = note(json!([
        {"type": "paragraph"},
        {"type": "paragraph", "content": []},
        {"type": "paragraph", "marks": [{"type": "alignment", "attrs": {"alignment": "right"}}]},
        {"type": "paragraph", "content": [{"type": "text", "text": "kept"}]}
    ]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(body(&html), "<p style=\"text-align: left\">kept</p>");
}

#[test]
fn test_paragraph_with_empty_marked_run_removed() {
    let input = note(json!([
        {"type": "paragraph", "content": [
            {"type": "text", "text": "", "marks": [{"type": "strong"}]},
            {"type": "text", "marks": [{"type": "link", "attrs": {"href": "https://box.com"}}]}
        ]},
        {"type": "paragraph", "content": [{"type": "text", "text": "kept"}]}
    ]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(body(&html), "<p style=\"text-align: left\">kept</p>");
}

#[test]
fn test_cleanup_preset_standard() {
    let input = note(json!([{"type": "paragraph", "content": [
        {"type": "text", "text": "cafe\u{0301}\u{FFFD}"}
    ]}]));
    let result = BoxnoteHtml::new()
        .with_cleanup(CleanupPreset::Standard)
        .convert(input.as_bytes())
        .unwrap();
    assert!(result.html.contains(">caf\u{00E9}</p>"));
}

#[test]
fn test_style_block_optional() {
    let input = note(json!([{"type": "paragraph", "content": [{"type": "text", "text": "x"}]}]));

    let styled = BoxnoteHtml::new().convert(input.as_bytes()).unwrap();
    assert!(styled.html.contains("<style>"));

    let bare = BoxnoteHtml::new()
        .with_options(RenderOptions::default().with_style(false))
        .convert(input.as_bytes())
        .unwrap();
    assert!(!bare.html.contains("<style>"));
    assert_balanced(&bare.html);
}

// ==================== Catalog ====================

#[test]
fn test_every_catalog_type_is_balanced() {
    let children = json!([{"type": "text", "text": "x"}]);
    let mut nodes = Vec::new();
    for kind in NodeKind::CATALOG {
        let mut node = json!({"type": kind.as_str(), "content": children.clone()});
        if kind == NodeKind::Text {
            node = json!({"type": "text", "text": "t"});
        }
        nodes.push(node);
    }
    let html = convert_str(&note(json!(nodes)), "All").unwrap();
    assert_balanced(&html);
}

#[test]
fn test_text_marks_and_escaping() {
    let input = note(json!([{"type": "paragraph", "content": [
        {"type": "text", "text": "a < b", "marks": [{"type": "em"}, {"type": "strong"}]},
        {"type": "text", "text": "site", "marks": [{"type": "link", "attrs": {"href": "https://box.com"}}]},
        {"type": "text", "text": "plain", "marks": [{"type": "sparkle"}, {"attrs": {}}]}
    ]}]));
    let html = convert_str(&input, "t").unwrap();
    assert_eq!(
        body(&html),
        "<p style=\"text-align: left\"><strong><em>a &lt; b</em></strong><a href=\"https://box.com\">site</a>plain</p>"
    );
}

// ==================== Files ====================

#[test]
fn test_convert_file_uses_stem_as_title() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Weekly Sync.boxnote");
    fs::write(&path, note(json!([{"type": "paragraph", "content": [{"type": "text", "text": "Agenda"}]}]))).unwrap();

    let html = convert_file(&path).unwrap();
    assert!(html.contains("<title>Weekly Sync</title>"));
    assert!(html.contains("Agenda"));
}

#[test]
fn test_convert_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert_file(dir.path().join("missing.boxnote")).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
