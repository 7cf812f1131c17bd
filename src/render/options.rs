//! Rendering options and configuration.

use super::{CleanupOptions, CleanupPreset};

/// Options for rendering a note to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Escape markup-significant characters in text content
    pub escape_text: bool,

    /// Tree traversal strategy
    pub traversal: Traversal,

    /// What to emit for an image that fails to resolve
    pub image_failure: ImageFailurePolicy,

    /// Resolve images concurrently before the render walk
    pub parallel_images: bool,

    /// Inject the base style block into the document
    pub include_style: bool,

    /// Post-assembly cleanup options
    pub cleanup: CleanupOptions,

    /// Collect render statistics
    pub collect_stats: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable text escaping.
    pub fn with_escape_text(mut self, escape: bool) -> Self {
        self.escape_text = escape;
        self
    }

    /// Set the traversal strategy.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.traversal = traversal;
        self
    }

    /// Set the image failure policy.
    pub fn with_image_failure(mut self, policy: ImageFailurePolicy) -> Self {
        self.image_failure = policy;
        self
    }

    /// Enable or disable parallel image resolution.
    pub fn with_parallel_images(mut self, parallel: bool) -> Self {
        self.parallel_images = parallel;
        self
    }

    /// Enable or disable the base style block.
    pub fn with_style(mut self, include: bool) -> Self {
        self.include_style = include;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, cleanup: CleanupOptions) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup_preset(mut self, preset: CleanupPreset) -> Self {
        self.cleanup = CleanupOptions::from_preset(preset);
        self
    }

    /// Enable statistics collection during rendering.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.collect_stats = collect;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_text: true,
            traversal: Traversal::default(),
            image_failure: ImageFailurePolicy::default(),
            parallel_images: false,
            include_style: true,
            cleanup: CleanupOptions::default(),
            collect_stats: false,
        }
    }
}

/// How the renderer walks the document tree.
///
/// Both strategies emit identical output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Traversal {
    /// Plain recursive descent; depth bounded by the call stack
    Recursive,
    /// Explicit heap-allocated stack; safe for arbitrarily deep trees
    #[default]
    Iterative,
}

/// Fragment emitted when an image resolver fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFailurePolicy {
    /// Visible `[image: name]` marker
    #[default]
    Placeholder,
    /// Nothing at all
    Omit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_defaults() {
        let options = RenderOptions::default();
        assert!(options.escape_text);
        assert!(options.include_style);
        assert!(!options.parallel_images);
        assert_eq!(options.traversal, Traversal::Iterative);
        assert_eq!(options.image_failure, ImageFailurePolicy::Placeholder);
        assert!(options.cleanup.remove_empty_paragraphs);
    }

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_traversal(Traversal::Recursive)
            .with_image_failure(ImageFailurePolicy::Omit)
            .with_parallel_images(true)
            .with_cleanup_preset(CleanupPreset::Aggressive)
            .with_stats(true);

        assert_eq!(options.traversal, Traversal::Recursive);
        assert_eq!(options.image_failure, ImageFailurePolicy::Omit);
        assert!(options.parallel_images);
        assert!(options.cleanup.remove_zero_width);
        assert!(options.collect_stats);
    }
}
