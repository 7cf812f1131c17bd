//! Mark (annotation) types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::node::{null_as_default, scalar_to_string, Attrs};

/// Mark type tag.
///
/// `Alignment` is block-level and only meaningful on paragraphs; the rest are
/// inline formatting applied to text runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarkKind {
    Alignment,
    Strong,
    Em,
    Underline,
    Strikethrough,
    Link,
    FontSize,
    FontColor,
    /// A mark type this renderer does not recognize.
    Unknown(String),
}

impl MarkKind {
    /// Number of inline nesting layers a text run can carry.
    pub const INLINE_LAYERS: usize = 7;

    /// Look up a kind from its `type` tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "alignment" => MarkKind::Alignment,
            "strong" => MarkKind::Strong,
            "em" => MarkKind::Em,
            "underline" => MarkKind::Underline,
            "strikethrough" => MarkKind::Strikethrough,
            "link" => MarkKind::Link,
            "font_size" => MarkKind::FontSize,
            "font_color" => MarkKind::FontColor,
            other => MarkKind::Unknown(other.to_string()),
        }
    }

    /// The `type` tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            MarkKind::Alignment => "alignment",
            MarkKind::Strong => "strong",
            MarkKind::Em => "em",
            MarkKind::Underline => "underline",
            MarkKind::Strikethrough => "strikethrough",
            MarkKind::Link => "link",
            MarkKind::FontSize => "font_size",
            MarkKind::FontColor => "font_color",
            MarkKind::Unknown(tag) => tag,
        }
    }

    /// Nesting rank for inline marks, outermost first.
    ///
    /// `None` for marks that do not wrap text.
    pub fn precedence(&self) -> Option<usize> {
        match self {
            MarkKind::Link => Some(0),
            MarkKind::FontColor => Some(1),
            MarkKind::FontSize => Some(2),
            MarkKind::Strong => Some(3),
            MarkKind::Em => Some(4),
            MarkKind::Underline => Some(5),
            MarkKind::Strikethrough => Some(6),
            MarkKind::Alignment | MarkKind::Unknown(_) => None,
        }
    }
}

impl Default for MarkKind {
    fn default() -> Self {
        MarkKind::Unknown(String::new())
    }
}

impl From<String> for MarkKind {
    fn from(tag: String) -> Self {
        MarkKind::from_tag(&tag)
    }
}

impl From<MarkKind> for String {
    fn from(kind: MarkKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for MarkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An annotation attached to a node.
///
/// A mark without `type` is tolerated and treated as unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Mark type tag
    #[serde(rename = "type", default)]
    pub kind: MarkKind,

    /// Mark attributes (href, color, size, alignment)
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Attrs,
}

impl Mark {
    /// Create a mark without attributes.
    pub fn new(kind: MarkKind) -> Self {
        Self {
            kind,
            attrs: Attrs::new(),
        }
    }

    /// Create a paragraph alignment mark.
    pub fn alignment(alignment: &str) -> Self {
        Self::new(MarkKind::Alignment).with_attr("alignment", alignment)
    }

    /// Create a link mark.
    pub fn link(href: &str) -> Self {
        Self::new(MarkKind::Link).with_attr("href", href)
    }

    /// Create a font color mark.
    pub fn color(color: &str) -> Self {
        Self::new(MarkKind::FontColor).with_attr("color", color)
    }

    /// Create a font size mark.
    pub fn size(size: impl Into<Value>) -> Self {
        Self::new(MarkKind::FontSize).with_attr("size", size)
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Read an attribute as a string.
    pub fn attr_string(&self, key: &str) -> Option<String> {
        self.attrs.get(key).and_then(scalar_to_string)
    }
}
