//! Tag catalog: node type and attributes to opening/closing markup.
//!
//! Every function here is a pure lookup. For each kind, [`open_tag`] and
//! [`close_tag`] produce a balanced pair; `horizontal_rule` is a void element
//! and closes with nothing, while `text`, `image` and unknown kinds produce no
//! structural markup at all.

use serde_json::Value;

use super::escape::{css_keyword, css_value, escape_attr, escape_html, sanitize_url};
use crate::model::{attr_bool, attr_string, attr_u32, Attrs, Mark, MarkKind, NodeKind, DEFAULT_ALIGNMENT};

/// Marker shown in front of a checked checklist item.
pub const CHECKED_MARKER: &str = "X";

/// Marker shown in front of an unchecked checklist item.
pub const UNCHECKED_MARKER: &str = "  ";

const BASE_STYLE: &str = concat!(
    "<style>",
    "body{font-family:Lato,\"Helvetica Neue\",Helvetica,Arial,sans-serif;font-size:14px;line-height:1.5;color:#222222;}",
    "p{margin:0 0 8px 0;}",
    "h1,h2,h3,h4,h5,h6{margin:16px 0 8px 0;}",
    "table{border-collapse:collapse;margin:0 0 8px 0;}",
    "td{border:1px solid #cccccc;padding:4px 8px;vertical-align:top;}",
    "blockquote{border-left:3px solid #cccccc;margin:0 0 8px 0;padding-left:12px;color:#555555;}",
    "pre{background-color:#f5f5f5;padding:8px;white-space:pre-wrap;}",
    "ul.check-list{list-style-type:none;padding-left:8px;}",
    "li.check-list-item .check-box{font-family:monospace;white-space:pre;}",
    "li.check-list-item.checked{color:#767676;}",
    ".call-out-box{border-radius:4px;padding:8px 12px;margin:0 0 8px 0;background-color:#f2f4f7;}",
    ".image-unavailable{color:#767676;font-style:italic;}",
    "</style>",
);

/// Static style block injected once per document.
pub fn base_style() -> &'static str {
    BASE_STYLE
}

/// Opening markup for a node kind.
///
/// For `paragraph`, `attrs["alignment"]` selects `text-align`; for
/// `check_list_item`, `attrs["checked"]` selects the checked state. Other
/// kinds read their own attributes verbatim.
pub fn open_tag(kind: &NodeKind, attrs: &Attrs) -> String {
    match kind {
        NodeKind::Paragraph => paragraph_open(attrs),
        NodeKind::Text | NodeKind::Image | NodeKind::Unknown(_) => String::new(),
        NodeKind::CheckListItem => check_list_item_open(attr_bool(attrs, "checked")),
        NodeKind::ListItem => "<li>".to_string(),
        NodeKind::TableCell => table_cell_open(attrs),
        NodeKind::CallOutBox => call_out_box_open(attrs),
        NodeKind::Strong => "<strong>".to_string(),
        NodeKind::Em => "<em>".to_string(),
        NodeKind::Underline => "<u>".to_string(),
        NodeKind::Strikethrough => "<s>".to_string(),
        NodeKind::OrderedList => ordered_list_open(attrs),
        NodeKind::BulletList => "<ul>".to_string(),
        NodeKind::Blockquote => "<blockquote>".to_string(),
        NodeKind::CodeBlock => code_block_open(attrs),
        NodeKind::CheckList => "<ul class=\"check-list\">".to_string(),
        NodeKind::Table => "<table><tbody>".to_string(),
        NodeKind::TableRow => "<tr>".to_string(),
        NodeKind::Heading => format!("<h{}>", heading_level(attrs)),
        NodeKind::Link => link_open(attrs),
        NodeKind::FontSize => font_size_open(attrs),
        NodeKind::FontColor => font_color_open(attrs),
        NodeKind::HorizontalRule => "<hr>".to_string(),
    }
}

/// Closing markup for a node kind.
pub fn close_tag(kind: &NodeKind, attrs: &Attrs) -> String {
    let tag = match kind {
        NodeKind::Paragraph => "</p>",
        NodeKind::Text | NodeKind::Image | NodeKind::Unknown(_) | NodeKind::HorizontalRule => "",
        NodeKind::CheckListItem | NodeKind::ListItem => "</li>",
        NodeKind::TableCell => "</td>",
        NodeKind::CallOutBox => "</div>",
        NodeKind::Strong => "</strong>",
        NodeKind::Em => "</em>",
        NodeKind::Underline => "</u>",
        NodeKind::Strikethrough => "</s>",
        NodeKind::OrderedList => "</ol>",
        NodeKind::BulletList | NodeKind::CheckList => "</ul>",
        NodeKind::Blockquote => "</blockquote>",
        NodeKind::CodeBlock => "</code></pre>",
        NodeKind::Table => "</tbody></table>",
        NodeKind::TableRow => "</tr>",
        NodeKind::Heading => return format!("</h{}>", heading_level(attrs)),
        NodeKind::Link => "</a>",
        NodeKind::FontSize | NodeKind::FontColor => "</span>",
    };
    tag.to_string()
}

/// Node kind whose tags wrap text carrying the given inline mark.
pub fn mark_node_kind(kind: &MarkKind) -> Option<NodeKind> {
    match kind {
        MarkKind::Strong => Some(NodeKind::Strong),
        MarkKind::Em => Some(NodeKind::Em),
        MarkKind::Underline => Some(NodeKind::Underline),
        MarkKind::Strikethrough => Some(NodeKind::Strikethrough),
        MarkKind::Link => Some(NodeKind::Link),
        MarkKind::FontSize => Some(NodeKind::FontSize),
        MarkKind::FontColor => Some(NodeKind::FontColor),
        MarkKind::Alignment | MarkKind::Unknown(_) => None,
    }
}

/// Opening markup for an inline mark, empty for non-inline marks.
pub fn mark_open(mark: &Mark) -> String {
    mark_node_kind(&mark.kind)
        .map(|kind| open_tag(&kind, &mark.attrs))
        .unwrap_or_default()
}

/// Closing markup for an inline mark, empty for non-inline marks.
pub fn mark_close(mark: &Mark) -> String {
    mark_node_kind(&mark.kind)
        .map(|kind| close_tag(&kind, &mark.attrs))
        .unwrap_or_default()
}

/// Attribute map used to open a paragraph with the given alignment.
pub fn paragraph_attrs(alignment: &str) -> Attrs {
    let mut attrs = Attrs::new();
    attrs.insert("alignment".to_string(), Value::String(alignment.to_string()));
    attrs
}

/// Fragment emitted in place of an image that could not be resolved.
pub fn image_placeholder(name: Option<&str>) -> String {
    match name {
        Some(name) => format!(
            "<span class=\"image-unavailable\">[image: {}]</span>",
            escape_html(name)
        ),
        None => "<span class=\"image-unavailable\">[image]</span>".to_string(),
    }
}

fn paragraph_open(attrs: &Attrs) -> String {
    let alignment = attrs
        .get("alignment")
        .and_then(Value::as_str)
        .and_then(css_keyword)
        .unwrap_or(DEFAULT_ALIGNMENT);
    format!("<p style=\"text-align: {}\">", alignment)
}

fn check_list_item_open(checked: bool) -> String {
    let (class, marker) = if checked {
        (" checked", CHECKED_MARKER)
    } else {
        ("", UNCHECKED_MARKER)
    };
    format!(
        "<li class=\"check-list-item{}\" data-checked=\"{}\"><span class=\"check-box\">[{}]</span> ",
        class, checked, marker
    )
}

fn table_cell_open(attrs: &Attrs) -> String {
    let mut tag = String::from("<td");
    for key in ["colspan", "rowspan"] {
        if let Some(span) = attr_u32(attrs, key).filter(|n| *n > 1) {
            tag.push_str(&format!(" {}=\"{}\"", key, span));
        }
    }

    let mut styles = Vec::new();
    let width = match attrs.get("colwidth") {
        Some(Value::Array(widths)) => widths.first().and_then(Value::as_u64),
        Some(Value::Number(n)) => n.as_u64(),
        _ => None,
    };
    if let Some(width) = width.filter(|w| *w > 0) {
        styles.push(format!("width: {}px", width));
    }
    if let Some(color) = background_color(attrs) {
        styles.push(format!("background-color: {}", color));
    }
    if !styles.is_empty() {
        tag.push_str(&format!(" style=\"{}\"", styles.join("; ")));
    }

    tag.push('>');
    tag
}

fn call_out_box_open(attrs: &Attrs) -> String {
    let mut tag = String::from("<div class=\"call-out-box\"");
    if let Some(color) = background_color(attrs) {
        tag.push_str(&format!(" style=\"background-color: {}\"", color));
    }
    tag.push('>');
    if let Some(emoji) = attr_string(attrs, "emoji").filter(|e| !e.trim().is_empty()) {
        tag.push_str(&format!("<span class=\"call-out-emoji\">{}</span> ", escape_html(&emoji)));
    }
    tag
}

fn background_color(attrs: &Attrs) -> Option<String> {
    ["backgroundColor", "background_color", "background"]
        .iter()
        .find_map(|key| attr_string(attrs, key))
        .and_then(|c| css_value(&c).map(str::to_string))
}

fn ordered_list_open(attrs: &Attrs) -> String {
    match attr_u32(attrs, "order").or_else(|| attr_u32(attrs, "start")) {
        Some(start) if start != 1 => format!("<ol start=\"{}\">", start),
        _ => "<ol>".to_string(),
    }
}

fn code_block_open(attrs: &Attrs) -> String {
    let language = attr_string(attrs, "language").filter(|lang| {
        !lang.is_empty()
            && lang
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '+'))
    });
    match language {
        Some(lang) => format!("<pre><code class=\"language-{}\">", lang),
        None => "<pre><code>".to_string(),
    }
}

fn heading_level(attrs: &Attrs) -> u32 {
    attr_u32(attrs, "level").unwrap_or(1).clamp(1, 6)
}

fn link_open(attrs: &Attrs) -> String {
    match attr_string(attrs, "href").and_then(|href| sanitize_url(&href)) {
        Some(href) => {
            let mut tag = format!("<a href=\"{}\"", href);
            if let Some(title) = attr_string(attrs, "title").filter(|t| !t.is_empty()) {
                tag.push_str(&format!(" title=\"{}\"", escape_attr(&title)));
            }
            tag.push('>');
            tag
        }
        None => "<a>".to_string(),
    }
}

fn font_size_open(attrs: &Attrs) -> String {
    let size = ["size", "fontSize", "font_size"]
        .iter()
        .find_map(|key| attrs.get(*key))
        .and_then(css_font_size);
    match size {
        Some(size) => format!("<span style=\"font-size: {}\">", size),
        None => "<span>".to_string(),
    }
}

/// Bare numbers are pixel sizes; values with units or keywords pass through.
fn css_font_size(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| *v > 0.0).map(|v| format!("{}px", v)),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(v) = s.parse::<f64>() {
                return (v > 0.0).then(|| format!("{}px", v));
            }
            css_value(s).map(str::to_string)
        }
        _ => None,
    }
}

fn font_color_open(attrs: &Attrs) -> String {
    match attr_string(attrs, "color").as_deref().and_then(css_value) {
        Some(color) => format!("<span style=\"color: {}\">", color),
        None => "<span>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: serde_json::Value) -> Attrs {
        match value {
            Value::Object(map) => map,
            _ => Attrs::new(),
        }
    }

    /// Count element openings (excluding void `<hr>`) and closings.
    fn tag_balance(markup: &str) -> (usize, usize) {
        let opens = markup
            .match_indices('<')
            .filter(|(i, _)| {
                let rest = &markup[i + 1..];
                !rest.starts_with('/') && !rest.starts_with("hr>")
            })
            .count();
        let closes = markup.matches("</").count();
        (opens, closes)
    }

    #[test]
    fn test_every_kind_is_balanced() {
        let rich = attrs(json!({
            "checked": true,
            "colspan": 2,
            "backgroundColor": "#ffeecc",
            "emoji": "💡",
            "order": 3,
            "language": "rust",
            "level": 2,
            "href": "https://example.com",
            "size": 18,
            "color": "red",
        }));
        for kind in NodeKind::CATALOG {
            for a in [Attrs::new(), rich.clone()] {
                let markup = format!("{}{}", open_tag(&kind, &a), close_tag(&kind, &a));
                let (opens, closes) = tag_balance(&markup);
                assert_eq!(opens, closes, "unbalanced markup for {}: {}", kind, markup);
            }
        }
    }

    #[test]
    fn test_paragraph_alignment() {
        assert_eq!(
            open_tag(&NodeKind::Paragraph, &paragraph_attrs("center")),
            "<p style=\"text-align: center\">"
        );
        assert_eq!(
            open_tag(&NodeKind::Paragraph, &Attrs::new()),
            "<p style=\"text-align: left\">"
        );
        // Injection attempts fall back to the default alignment
        assert_eq!(
            open_tag(&NodeKind::Paragraph, &paragraph_attrs("left\"><script>")),
            "<p style=\"text-align: left\">"
        );
    }

    #[test]
    fn test_check_list_item_markers() {
        let checked = open_tag(&NodeKind::CheckListItem, &attrs(json!({"checked": true})));
        assert!(checked.contains("check-list-item checked"));
        assert!(checked.contains("[X]"));

        let unchecked = open_tag(&NodeKind::CheckListItem, &attrs(json!({"checked": false})));
        assert!(!unchecked.contains("checked\""));
        assert!(unchecked.contains("[  ]"));
        assert!(unchecked.contains("data-checked=\"false\""));
    }

    #[test]
    fn test_table_cell_attrs() {
        let tag = open_tag(
            &NodeKind::TableCell,
            &attrs(json!({"colspan": 2, "rowspan": 1, "colwidth": [120]})),
        );
        assert_eq!(tag, "<td colspan=\"2\" style=\"width: 120px\">");
        assert_eq!(open_tag(&NodeKind::TableCell, &Attrs::new()), "<td>");
    }

    #[test]
    fn test_heading_levels() {
        let a = attrs(json!({"level": 3}));
        assert_eq!(open_tag(&NodeKind::Heading, &a), "<h3>");
        assert_eq!(close_tag(&NodeKind::Heading, &a), "</h3>");
        let a = attrs(json!({"level": 9}));
        assert_eq!(open_tag(&NodeKind::Heading, &a), "<h6>");
    }

    #[test]
    fn test_link_rejects_script_urls() {
        assert_eq!(
            open_tag(&NodeKind::Link, &attrs(json!({"href": "javascript:alert(1)"}))),
            "<a>"
        );
        assert_eq!(
            open_tag(&NodeKind::Link, &attrs(json!({"href": "https://box.com"}))),
            "<a href=\"https://box.com\">"
        );
    }

    #[test]
    fn test_font_size_units() {
        assert_eq!(
            open_tag(&NodeKind::FontSize, &attrs(json!({"size": 18}))),
            "<span style=\"font-size: 18px\">"
        );
        assert_eq!(
            open_tag(&NodeKind::FontSize, &attrs(json!({"size": "1.5em"}))),
            "<span style=\"font-size: 1.5em\">"
        );
        assert_eq!(open_tag(&NodeKind::FontSize, &Attrs::new()), "<span>");
    }

    #[test]
    fn test_mark_tags() {
        assert_eq!(mark_open(&Mark::new(MarkKind::Strong)), "<strong>");
        assert_eq!(mark_close(&Mark::new(MarkKind::Strong)), "</strong>");
        assert_eq!(mark_open(&Mark::alignment("center")), "");
        assert_eq!(mark_open(&Mark::color("#00ff00")), "<span style=\"color: #00ff00\">");
    }

    #[test]
    fn test_image_placeholder_escapes_name() {
        assert_eq!(
            image_placeholder(Some("<x>.png")),
            "<span class=\"image-unavailable\">[image: &lt;x&gt;.png]</span>"
        );
    }

    #[test]
    fn test_base_style_is_a_style_block() {
        assert!(base_style().starts_with("<style>"));
        assert!(base_style().ends_with("</style>"));
    }
}
