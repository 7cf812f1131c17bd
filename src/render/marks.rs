//! Mark composer: inline annotations around a text run.

use super::escape::escape_html;
use super::tags::{mark_close, mark_open};
use crate::model::{Mark, MarkKind};

/// Wrap `text` in one nesting layer per recognized inline mark.
///
/// Layers nest in the fixed order given by [`MarkKind::precedence`]
/// (link outermost, strikethrough innermost), so any permutation of the same
/// mark set yields the same markup. When a kind appears more than once, the
/// last occurrence wins. Alignment and unknown marks are ignored.
///
/// With no inline marks the text is returned bare (escaped when `escape` is set).
/// An empty run produces nothing, so no empty inline element is left behind.
pub fn compose(marks: &[Mark], text: &str, escape: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let body = if escape {
        escape_html(text)
    } else {
        text.to_string()
    };

    let mut slots: [Option<&Mark>; MarkKind::INLINE_LAYERS] = [None; MarkKind::INLINE_LAYERS];
    for mark in marks {
        if let Some(rank) = mark.kind.precedence() {
            slots[rank] = Some(mark);
        }
    }

    let layers: Vec<&Mark> = slots.iter().flatten().copied().collect();
    if layers.is_empty() {
        return body;
    }

    let mut out = String::with_capacity(body.len() + layers.len() * 24);
    for mark in &layers {
        out.push_str(&mark_open(mark));
    }
    out.push_str(&body);
    for mark in layers.iter().rev() {
        out.push_str(&mark_close(mark));
    }
    out
}
