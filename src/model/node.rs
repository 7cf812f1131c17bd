//! Node-level types.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{Mark, MarkKind};

/// Attribute map carried by nodes and marks.
pub type Attrs = Map<String, Value>;

/// Alignment used when a paragraph carries no alignment mark.
pub const DEFAULT_ALIGNMENT: &str = "left";

/// Node type tag.
///
/// The catalog is closed: every recognized `type` string has a variant, and
/// anything else is kept as [`NodeKind::Unknown`] so that it can be skipped
/// without failing the conversion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Paragraph,
    Text,
    CheckListItem,
    ListItem,
    TableCell,
    CallOutBox,
    Strong,
    Em,
    Underline,
    Strikethrough,
    OrderedList,
    BulletList,
    Blockquote,
    CodeBlock,
    CheckList,
    Table,
    TableRow,
    Heading,
    Link,
    FontSize,
    FontColor,
    HorizontalRule,
    Image,
    /// A type outside the catalog.
    Unknown(String),
}

/// How the renderer treats a node of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Alignment-parameterized paragraph, unwrapped when suppressed.
    Paragraph,
    /// Text run composed with its marks.
    Text,
    /// Checkbox list item; children rendered with paragraphs suppressed.
    CheckListItem,
    /// Block container whose children never get their own paragraph tags.
    SuppressingContainer,
    /// Plain open/close wrapper; suppression passes through unchanged.
    Wrapper,
    /// Delegated to the image resolver.
    Image,
    /// Produces nothing, children included.
    Skip,
}

impl NodeKind {
    /// Every kind in the catalog, in declaration order.
    pub const CATALOG: [NodeKind; 23] = [
        NodeKind::Paragraph,
        NodeKind::Text,
        NodeKind::CheckListItem,
        NodeKind::ListItem,
        NodeKind::TableCell,
        NodeKind::CallOutBox,
        NodeKind::Strong,
        NodeKind::Em,
        NodeKind::Underline,
        NodeKind::Strikethrough,
        NodeKind::OrderedList,
        NodeKind::BulletList,
        NodeKind::Blockquote,
        NodeKind::CodeBlock,
        NodeKind::CheckList,
        NodeKind::Table,
        NodeKind::TableRow,
        NodeKind::Heading,
        NodeKind::Link,
        NodeKind::FontSize,
        NodeKind::FontColor,
        NodeKind::HorizontalRule,
        NodeKind::Image,
    ];

    /// Look up a kind from its `type` tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "paragraph" => NodeKind::Paragraph,
            "text" => NodeKind::Text,
            "check_list_item" => NodeKind::CheckListItem,
            "list_item" => NodeKind::ListItem,
            "table_cell" => NodeKind::TableCell,
            "call_out_box" => NodeKind::CallOutBox,
            "strong" => NodeKind::Strong,
            "em" => NodeKind::Em,
            "underline" => NodeKind::Underline,
            "strikethrough" => NodeKind::Strikethrough,
            "ordered_list" => NodeKind::OrderedList,
            "bullet_list" => NodeKind::BulletList,
            "blockquote" => NodeKind::Blockquote,
            "code_block" => NodeKind::CodeBlock,
            "check_list" => NodeKind::CheckList,
            "table" => NodeKind::Table,
            "table_row" => NodeKind::TableRow,
            "heading" => NodeKind::Heading,
            "link" => NodeKind::Link,
            "font_size" => NodeKind::FontSize,
            "font_color" => NodeKind::FontColor,
            "horizontal_rule" => NodeKind::HorizontalRule,
            "image" => NodeKind::Image,
            other => NodeKind::Unknown(other.to_string()),
        }
    }

    /// The `type` tag for this kind.
    pub fn as_str(&self) -> &str {
        match self {
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text => "text",
            NodeKind::CheckListItem => "check_list_item",
            NodeKind::ListItem => "list_item",
            NodeKind::TableCell => "table_cell",
            NodeKind::CallOutBox => "call_out_box",
            NodeKind::Strong => "strong",
            NodeKind::Em => "em",
            NodeKind::Underline => "underline",
            NodeKind::Strikethrough => "strikethrough",
            NodeKind::OrderedList => "ordered_list",
            NodeKind::BulletList => "bullet_list",
            NodeKind::Blockquote => "blockquote",
            NodeKind::CodeBlock => "code_block",
            NodeKind::CheckList => "check_list",
            NodeKind::Table => "table",
            NodeKind::TableRow => "table_row",
            NodeKind::Heading => "heading",
            NodeKind::Link => "link",
            NodeKind::FontSize => "font_size",
            NodeKind::FontColor => "font_color",
            NodeKind::HorizontalRule => "horizontal_rule",
            NodeKind::Image => "image",
            NodeKind::Unknown(tag) => tag,
        }
    }

    /// Rendering strategy for this kind.
    pub fn dispatch(&self) -> Dispatch {
        match self {
            NodeKind::Paragraph => Dispatch::Paragraph,
            NodeKind::Text => Dispatch::Text,
            NodeKind::CheckListItem => Dispatch::CheckListItem,
            NodeKind::ListItem | NodeKind::TableCell | NodeKind::CallOutBox => {
                Dispatch::SuppressingContainer
            }
            NodeKind::Strong
            | NodeKind::Em
            | NodeKind::Underline
            | NodeKind::Strikethrough
            | NodeKind::OrderedList
            | NodeKind::BulletList
            | NodeKind::Blockquote
            | NodeKind::CodeBlock
            | NodeKind::CheckList
            | NodeKind::Table
            | NodeKind::TableRow
            | NodeKind::Heading
            | NodeKind::Link
            | NodeKind::FontSize
            | NodeKind::FontColor
            | NodeKind::HorizontalRule => Dispatch::Wrapper,
            NodeKind::Image => Dispatch::Image,
            NodeKind::Unknown(_) => Dispatch::Skip,
        }
    }

    /// Check if the renderer descends into children of this kind.
    pub fn renders_children(&self) -> bool {
        matches!(
            self.dispatch(),
            Dispatch::Paragraph
                | Dispatch::CheckListItem
                | Dispatch::SuppressingContainer
                | Dispatch::Wrapper
        )
    }

    /// Check if this kind is outside the catalog.
    pub fn is_unknown(&self) -> bool {
        matches!(self, NodeKind::Unknown(_))
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        NodeKind::from_tag(&tag)
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single element of the document tree.
///
/// `type` is required; a node without it fails deserialization. `content`
/// accepts a sequence, a single node, `null`, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Node type tag
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Child nodes in document order
    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub content: Vec<Node>,

    /// Inline or block-level annotations
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub marks: Vec<Mark>,

    /// Type-specific attributes
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Map::is_empty"
    )]
    pub attrs: Attrs,

    /// Raw text of a `text` node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Node {
    /// Create an empty node of the given kind.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
            marks: Vec::new(),
            attrs: Attrs::new(),
            text: None,
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        let mut node = Self::new(NodeKind::Text);
        node.text = Some(text.into());
        node
    }

    /// Create a paragraph holding a single text node.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Paragraph).with_child(Self::text(text))
    }

    /// Append a child node.
    pub fn with_child(mut self, child: Node) -> Self {
        self.content.push(child);
        self
    }

    /// Replace the children.
    pub fn with_content(mut self, content: Vec<Node>) -> Self {
        self.content = content;
        self
    }

    /// Append a mark.
    pub fn with_mark(mut self, mark: Mark) -> Self {
        self.marks.push(mark);
        self
    }

    /// Set an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Text content of a text node, empty for everything else.
    pub fn text_str(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    /// Block alignment of a paragraph.
    ///
    /// Scans `marks` for `alignment`; the last one carrying a value wins.
    pub fn alignment(&self) -> String {
        self.marks
            .iter()
            .filter(|m| m.kind == MarkKind::Alignment)
            .filter_map(|m| m.attr_string("alignment"))
            .last()
            .unwrap_or_else(|| DEFAULT_ALIGNMENT.to_string())
    }

    /// Read an attribute as a string, accepting strings, numbers and booleans.
    pub fn attr_string(&self, key: &str) -> Option<String> {
        attr_string(&self.attrs, key)
    }

    /// Read an attribute as a boolean (`true`, `"true"`, or non-zero number).
    pub fn attr_bool(&self, key: &str) -> bool {
        attr_bool(&self.attrs, key)
    }

    /// Check if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.content.is_empty()
    }
}

/// Children are dropped from a heap stack so nesting depth never reaches the
/// call stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.content);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.content);
        }
    }
}

/// Read an attribute as a string, accepting strings, numbers and booleans.
pub fn attr_string(attrs: &Attrs, key: &str) -> Option<String> {
    attrs.get(key).and_then(scalar_to_string)
}

/// Read an attribute as a boolean (`true`, `"true"`, `"checked"`, or a non-zero number).
pub fn attr_bool(attrs: &Attrs, key: &str) -> bool {
    match attrs.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true") || s == "checked",
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    }
}

/// Read an attribute as an unsigned integer, accepting numeric strings.
pub fn attr_u32(attrs: &Attrs, key: &str) -> Option<u32> {
    match attrs.get(key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Convert a scalar JSON value into its string form.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize `content` as a sequence, normalizing a lone node to one element
/// and `null` to an empty sequence.
pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct OneOrMany<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> Visitor<'de> for OneOrMany<T> {
        type Value = Vec<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a node or a sequence of nodes")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(item) = seq.next_element()? {
                items.push(item);
            }
            Ok(items)
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
            T::deserialize(de::value::MapAccessDeserializer::new(map)).map(|item| vec![item])
        }
    }

    deserializer.deserialize_any(OneOrMany(PhantomData))
}

/// Deserialize a field treating `null` like an absent value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
