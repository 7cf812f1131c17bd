//! Rendering module for converting note trees to HTML.

mod assemble;
mod cleanup;
mod context;
pub(crate) mod escape;
mod html;
mod marks;
mod options;
mod result;
pub mod tags;

pub use assemble::{assemble, assemble_with};
pub use cleanup::{CleanupOptions, CleanupPipeline, CleanupPreset};
pub use context::{AuthContext, RenderContext};
pub use escape::{escape_attr, escape_html, sanitize_url};
pub use html::{render, render_document, HtmlRenderer, Rendered};
pub use marks::compose;
pub use options::{ImageFailurePolicy, RenderOptions, Traversal};
pub use result::{ConversionResult, RenderStats};
