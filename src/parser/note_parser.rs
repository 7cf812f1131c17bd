//! Note payload loader.

use std::fs;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::model::{Document, Node};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Loader turning a raw note export into a validated [`Document`].
pub struct NoteParser {
    data: Vec<u8>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    doc: Option<RawDoc>,
}

#[derive(Deserialize)]
struct RawDoc {
    #[serde(default, deserialize_with = "present_content")]
    content: Option<Vec<Node>>,
}

/// Distinguish an absent `content` key (`None`) from an explicit `null` (`Some(empty)`).
fn present_content<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<Node>>, D::Error>
where
    D: Deserializer<'de>,
{
    crate::model::one_or_many(deserializer).map(Some)
}

/// Deserialize the envelope without a nesting limit.
///
/// serde_json stops at 128 levels by default; deeper notes are valid, so the
/// limit is lifted and the stack grows on the heap as needed instead.
fn parse_envelope(payload: &[u8]) -> serde_json::Result<Envelope> {
    let mut json = serde_json::Deserializer::from_slice(payload);
    json.disable_recursion_limit();
    let envelope = Envelope::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(envelope)
}

impl NoteParser {
    /// Open a note file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self { data })
    }

    /// Create a parser from raw bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    /// Create a parser from text.
    pub fn from_text(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Create a parser from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self { data })
    }

    /// Payload size in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Parse and validate the payload.
    ///
    /// Fails with [`Error::MalformedDocument`] when the payload is not JSON,
    /// when `doc` or `doc.content` is missing, or when any node lacks `type`.
    pub fn parse(&self) -> Result<Document> {
        let payload = self.data.strip_prefix(UTF8_BOM).unwrap_or(&self.data);

        let envelope = parse_envelope(payload).map_err(|e| {
            log::error!("Invalid note content: {}", e);
            Error::from(e)
        })?;

        let Some(doc) = envelope.doc else {
            log::error!("Invalid note content: no doc field");
            return Err(Error::MalformedDocument("no doc field".into()));
        };

        let Some(content) = doc.content else {
            log::error!("Invalid note content: no content field");
            return Err(Error::MalformedDocument("no content field".into()));
        };

        log::debug!("Parsed note with {} top-level nodes", content.len());
        Ok(Document::with_content(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeKind;

    #[test]
    fn test_parse_minimal() {
        let doc = NoteParser::from_text(
            r#"{"doc":{"content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}}"#,
        )
        .parse()
        .unwrap();
        assert_eq!(doc.content.len(), 1);
        assert_eq!(doc.content[0].kind, NodeKind::Paragraph);
        assert_eq!(doc.plain_text(), "Hello");
    }

    #[test]
    fn test_parse_not_json() {
        let result = NoteParser::from_text("definitely not json").parse();
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_parse_missing_doc() {
        let result = NoteParser::from_text(r#"{"version": 1}"#).parse();
        match result {
            Err(Error::MalformedDocument(msg)) => assert_eq!(msg, "no doc field"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_content() {
        let result = NoteParser::from_text(r#"{"doc": {"type": "doc"}}"#).parse();
        match result {
            Err(Error::MalformedDocument(msg)) => assert_eq!(msg, "no content field"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_null_content_is_empty() {
        let doc = NoteParser::from_text(r#"{"doc": {"content": null}}"#)
            .parse()
            .unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_single_node_content() {
        let doc = NoteParser::from_text(r#"{"doc": {"content": {"type": "horizontal_rule"}}}"#)
            .parse()
            .unwrap();
        assert_eq!(doc.content.len(), 1);
    }

    #[test]
    fn test_parse_nested_missing_type() {
        let result = NoteParser::from_text(
            r#"{"doc":{"content":[{"type":"bullet_list","content":[{"content":[]}]}]}}"#,
        )
        .parse();
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }

    #[test]
    fn test_parse_with_bom() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(br#"{"doc":{"content":[]}}"#);
        let doc = NoteParser::from_bytes(&data).parse().unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_parse_ignores_extra_fields() {
        let doc = NoteParser::from_text(
            r#"{"version":2,"schema_version":1,"doc":{"type":"doc","content":[{"type":"text","text":"x","extra":true}]}}"#,
        )
        .parse()
        .unwrap();
        assert_eq!(doc.plain_text(), "x");
    }

    #[test]
    fn test_parse_deep_nesting() {
        let depth = 1_000;
        let mut text = String::from(r#"{"doc":{"content":["#);
        for _ in 0..depth {
            text.push_str(r#"{"type":"blockquote","content":["#);
        }
        text.push_str(r#"{"type":"text","text":"deep"}"#);
        for _ in 0..depth {
            text.push_str("]}");
        }
        text.push_str("]}}");

        let doc = NoteParser::from_text(&text).parse().unwrap();
        assert_eq!(doc.max_depth(), depth + 1);
        assert_eq!(doc.plain_text(), "deep");
    }

    #[test]
    fn test_parse_rejects_trailing_data() {
        let result = NoteParser::from_text(r#"{"doc":{"content":[]}} trailing"#).parse();
        assert!(matches!(result, Err(Error::MalformedDocument(_))));
    }
}
