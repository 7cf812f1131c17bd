//! Conversion result with statistics.

use serde::{Deserialize, Serialize};

/// Result of converting a note, including the HTML and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// The assembled HTML document
    pub html: String,

    /// Render statistics (zeroed unless collection was enabled)
    pub stats: RenderStats,
}

impl ConversionResult {
    /// Create a new conversion result.
    pub fn new(html: String, stats: RenderStats) -> Self {
        Self { html, stats }
    }

    /// Create a simple result with just HTML.
    pub fn html_only(html: String) -> Self {
        Self {
            html,
            stats: RenderStats::default(),
        }
    }

    /// Get the HTML length in bytes.
    pub fn content_len(&self) -> usize {
        self.html.len()
    }
}

/// Statistics collected during a render walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Paragraphs emitted with a wrapping tag
    pub paragraph_count: u32,

    /// Paragraphs rendered without a wrapping tag inside a container
    pub suppressed_paragraph_count: u32,

    /// Text runs composed
    pub text_run_count: u32,

    /// Images resolved successfully
    pub images_resolved: u32,

    /// Images whose resolver failed
    pub images_failed: u32,

    /// Nodes skipped because their type is not recognized
    pub unknown_node_count: u32,

    /// Deepest node visited (top-level nodes are depth 1)
    pub max_depth: u32,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment paragraph count.
    pub fn add_paragraph(&mut self, suppressed: bool) {
        if suppressed {
            self.suppressed_paragraph_count += 1;
        } else {
            self.paragraph_count += 1;
        }
    }

    /// Increment text run count.
    pub fn add_text_run(&mut self) {
        self.text_run_count += 1;
    }

    /// Record an image resolution outcome.
    pub fn add_image(&mut self, resolved: bool) {
        if resolved {
            self.images_resolved += 1;
        } else {
            self.images_failed += 1;
        }
    }

    /// Increment unknown node count.
    pub fn add_unknown(&mut self) {
        self.unknown_node_count += 1;
    }

    /// Record that a node at `depth` was visited.
    pub fn visit_depth(&mut self, depth: u32) {
        self.max_depth = self.max_depth.max(depth);
    }

    /// Total images encountered.
    pub fn image_count(&self) -> u32 {
        self.images_resolved + self.images_failed
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.paragraph_count += other.paragraph_count;
        self.suppressed_paragraph_count += other.suppressed_paragraph_count;
        self.text_run_count += other.text_run_count;
        self.images_resolved += other.images_resolved;
        self.images_failed += other.images_failed;
        self.unknown_node_count += other.unknown_node_count;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}
