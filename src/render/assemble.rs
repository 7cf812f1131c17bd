//! Output assembler: body fragments into a standalone HTML document.

use super::cleanup::CleanupPipeline;
use super::escape::escape_html;
use super::tags::base_style;

/// Wrap body fragments in the HTML skeleton and run the default cleanup.
///
/// Empty paragraphs (`<p style="text-align: left"></p>` and friends) are
/// removed from the final string.
pub fn assemble(fragments: &[String], title: &str) -> String {
    assemble_with(fragments, title, true, &CleanupPipeline::default())
}

/// Wrap body fragments in the HTML skeleton, then apply `cleanup`.
pub fn assemble_with(
    fragments: &[String],
    title: &str,
    include_style: bool,
    cleanup: &CleanupPipeline,
) -> String {
    let body_len: usize = fragments.iter().map(String::len).sum();
    let style = if include_style { base_style() } else { "" };

    let mut html = String::with_capacity(body_len + style.len() + title.len() + 128);
    html.push_str("<!DOCTYPE html><html>");
    html.push_str(style);
    html.push_str("<head><meta charset=\"UTF-8\"><title>");
    html.push_str(&escape_html(title));
    html.push_str("</title></head><body>");
    for fragment in fragments {
        html.push_str(fragment);
    }
    html.push_str("</body></html>");

    cleanup.process(&html)
}
