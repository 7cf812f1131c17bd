//! # boxnote-html
//!
//! Converts Box Notes exports into standalone HTML suitable for email bodies.
//!
//! A note is a JSON tree of typed nodes (paragraphs, lists, tables, call-out
//! boxes, images, ...) with inline marks. This library parses that tree,
//! renders it to HTML with a fixed tag catalog, resolves embedded images, and
//! wraps the result in a complete document.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> boxnote_html::Result<()> {
//!     let note = std::fs::read("Welcome.boxnote")?;
//!     let html = boxnote_html::convert(&note, "Welcome", ".", None, None)?;
//!     std::fs::write("Welcome.html", html)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Exhaustive dispatch**: every recognized node type has one rendering rule;
//!   unknown types are skipped, nodes without a type are rejected
//! - **Email-safe nesting**: paragraphs inside list items, table cells and
//!   call-out boxes are unwrapped
//! - **Deterministic marks**: inline marks nest in a fixed order
//! - **Hardened traversal**: explicit-stack walk for deeply nested input
//! - **Image isolation**: a failing image becomes a placeholder, never an error
//! - **Parallel image resolution**: optional, using Rayon
//! - **Template fill**: `${KEY}` placeholders in the rendered HTML

pub mod error;
pub mod image;
pub mod model;
pub mod parser;
pub mod render;
pub mod template;

// Re-export commonly used types
pub use error::{Error, Result};
pub use image::{
    default_resolver, ChainResolver, ImageAttrs, ImageRequest, ImageResolver, LocalImageResolver,
    ReferenceResolver,
};
#[cfg(feature = "box-api")]
pub use image::BoxApiResolver;
pub use model::{Document, Mark, MarkKind, Node, NodeKind};
pub use parser::NoteParser;
pub use render::{
    AuthContext, CleanupOptions, CleanupPreset, ConversionResult, ImageFailurePolicy,
    RenderContext, RenderOptions, RenderStats, Traversal,
};
pub use template::{fill_placeholders, placeholders, TemplateValues};

use std::io::Read;
use std::path::{Path, PathBuf};

/// Parse a note export from text.
pub fn parse_str(text: &str) -> Result<Document> {
    NoteParser::from_text(text).parse()
}

/// Parse a note export from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    NoteParser::from_bytes(data).parse()
}

/// Parse a note export file.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    NoteParser::open(path)?.parse()
}

/// Parse a note export from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    NoteParser::from_reader(reader)?.parse()
}

/// Convert a note export to an HTML document.
///
/// `workdir` is where attachments are looked up and cached. With a token (and
/// the `box-api` feature), attachments missing locally are downloaded.
/// Images that cannot be resolved become placeholders; only a structurally
/// malformed note fails the conversion.
///
/// # Example
///
/// ```
/// let note = r#"{"doc":{"content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}}"#;
/// let html = boxnote_html::convert(note, "Test", ".", None, None).unwrap();
/// assert!(html.contains("<title>Test</title>"));
/// assert!(html.contains(">Hello</p>"));
/// ```
pub fn convert(
    content: impl AsRef<[u8]>,
    title: &str,
    workdir: impl AsRef<Path>,
    token: Option<&str>,
    user_id: Option<&str>,
) -> Result<String> {
    let result = BoxnoteHtml::new()
        .with_title(title)
        .with_workdir(workdir.as_ref())
        .with_auth(AuthContext::from_parts(token, user_id))
        .convert(content.as_ref())?;
    Ok(result.html)
}

/// Convert note text to HTML without touching the filesystem.
///
/// Images are emitted as references into `images/<title>/`.
pub fn convert_str(text: &str, title: &str) -> Result<String> {
    let document = parse_str(text)?;
    Ok(render::render(&document.content, title))
}

/// Convert note bytes to HTML without touching the filesystem.
pub fn convert_bytes(data: &[u8], title: &str) -> Result<String> {
    let document = parse_bytes(data)?;
    Ok(render::render(&document.content, title))
}

/// Convert a note file to HTML.
///
/// The title is the file stem and attachments are looked up next to the file.
///
/// # Example
///
/// ```no_run
/// let html = boxnote_html::convert_file("notes/Onboarding.boxnote").unwrap();
/// std::fs::write("Onboarding.html", html).unwrap();
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<String> {
    Ok(BoxnoteHtml::new().convert_file(path)?.html)
}

/// Builder for converting notes with custom options.
///
/// # Example
///
/// ```no_run
/// use boxnote_html::{BoxnoteHtml, CleanupPreset, ImageFailurePolicy};
///
/// let result = BoxnoteHtml::new()
///     .with_workdir("./export")
///     .with_token("access-token")
///     .with_parallel_images(true)
///     .with_image_failure(ImageFailurePolicy::Omit)
///     .with_cleanup(CleanupPreset::Standard)
///     .with_stats(true)
///     .convert_file("./export/Weekly.boxnote")?;
/// println!("{} images failed", result.stats.images_failed);
/// # Ok::<(), boxnote_html::Error>(())
/// ```
pub struct BoxnoteHtml {
    title: Option<String>,
    workdir: Option<PathBuf>,
    auth: AuthContext,
    render_options: RenderOptions,
    resolver: Option<Box<dyn ImageResolver>>,
}

impl BoxnoteHtml {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            title: None,
            workdir: None,
            auth: AuthContext::default(),
            render_options: RenderOptions::default(),
            resolver: None,
        }
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the working directory for attachments.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// Set the auth context.
    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth = self.auth.with_token(token);
        self
    }

    /// Set the user to act as.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.auth = self.auth.with_user(user_id);
        self
    }

    /// Replace the render options.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Use a custom image resolver instead of the default chain.
    pub fn with_resolver<R: ImageResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    /// Set the traversal strategy.
    pub fn with_traversal(mut self, traversal: Traversal) -> Self {
        self.render_options = self.render_options.with_traversal(traversal);
        self
    }

    /// Enable or disable parallel image resolution.
    pub fn with_parallel_images(mut self, parallel: bool) -> Self {
        self.render_options = self.render_options.with_parallel_images(parallel);
        self
    }

    /// Set the image failure policy.
    pub fn with_image_failure(mut self, policy: ImageFailurePolicy) -> Self {
        self.render_options = self.render_options.with_image_failure(policy);
        self
    }

    /// Set cleanup preset.
    pub fn with_cleanup(mut self, preset: CleanupPreset) -> Self {
        self.render_options = self.render_options.with_cleanup_preset(preset);
        self
    }

    /// Enable statistics collection.
    pub fn with_stats(mut self, collect: bool) -> Self {
        self.render_options = self.render_options.with_stats(collect);
        self
    }

    /// Convert a note payload.
    pub fn convert(&self, data: &[u8]) -> Result<ConversionResult> {
        let document = parse_bytes(data)?;
        Ok(self.convert_document(&document))
    }

    /// Convert a note file; the title defaults to the file stem and the
    /// working directory to the file's directory.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<ConversionResult> {
        let path = path.as_ref();
        let document = parse_file(path)?;

        let title = match &self.title {
            Some(title) => title.clone(),
            None => file_stem(path),
        };
        let workdir = match &self.workdir {
            Some(dir) => dir.clone(),
            None => path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let context = RenderContext::new(title)
            .with_workdir(workdir)
            .with_auth(self.auth.clone());
        Ok(self.render(&document, &context))
    }

    /// Render an already parsed document.
    pub fn convert_document(&self, document: &Document) -> ConversionResult {
        let context = RenderContext::new(self.title.clone().unwrap_or_default())
            .with_workdir(self.workdir.clone().unwrap_or_else(|| PathBuf::from(".")))
            .with_auth(self.auth.clone());
        self.render(document, &context)
    }

    fn render(&self, document: &Document, context: &RenderContext) -> ConversionResult {
        match &self.resolver {
            Some(resolver) => {
                render::render_document(&document.content, context, &**resolver, &self.render_options)
            }
            None => {
                let resolver = default_resolver(&context.auth);
                render::render_document(&document.content, context, &resolver, &self.render_options)
            }
        }
    }
}

impl Default for BoxnoteHtml {
    fn default() -> Self {
        Self::new()
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO: &str =
        r#"{"doc":{"content":[{"type":"paragraph","content":[{"type":"text","text":"Hello"}]}]}}"#;

    #[test]
    fn test_builder_defaults() {
        let builder = BoxnoteHtml::default();
        assert!(builder.title.is_none());
        assert!(builder.auth.is_anonymous());
        assert_eq!(builder.render_options.traversal, Traversal::Iterative);
    }

    #[test]
    fn test_builder_chained() {
        let builder = BoxnoteHtml::new()
            .with_title("Weekly")
            .with_token("tok")
            .with_user("99")
            .with_traversal(Traversal::Recursive)
            .with_parallel_images(true)
            .with_cleanup(CleanupPreset::Aggressive)
            .with_stats(true);

        assert_eq!(builder.title.as_deref(), Some("Weekly"));
        assert_eq!(builder.auth.token.as_deref(), Some("tok"));
        assert_eq!(builder.auth.user_id.as_deref(), Some("99"));
        assert_eq!(builder.render_options.traversal, Traversal::Recursive);
        assert!(builder.render_options.parallel_images);
        assert!(builder.render_options.cleanup.remove_zero_width);
        assert!(builder.render_options.collect_stats);
    }

    #[test]
    fn test_convert_str() {
        let html = convert_str(HELLO, "Test").unwrap();
        assert!(html.contains("<title>Test</title>"));
        assert!(html.contains("<p style=\"text-align: left\">Hello</p>"));
    }

    #[test]
    fn test_convert_rejects_malformed() {
        assert!(matches!(
            convert("{}", "t", ".", None, None),
            Err(Error::MalformedDocument(_))
        ));
        assert!(matches!(
            convert_bytes(b"\xff\xfe", "t"),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_builder_stats() {
        let result = BoxnoteHtml::new()
            .with_stats(true)
            .convert(HELLO.as_bytes())
            .unwrap();
        assert_eq!(result.stats.paragraph_count, 1);
        assert_eq!(result.stats.text_run_count, 1);

        let result = BoxnoteHtml::new().convert(HELLO.as_bytes()).unwrap();
        assert_eq!(result.stats, RenderStats::default());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem(Path::new("dir/Weekly Sync.boxnote")), "Weekly Sync");
        assert_eq!(file_stem(Path::new("")), "");
    }
}
