//! Document model types for note content representation.
//!
//! The tree mirrors the exported JSON: typed nodes carrying children, marks
//! and attributes. It is parsed once, walked read-only by the renderer, and
//! dropped after the HTML is produced.

mod document;
mod mark;
mod node;

pub use document::{Document, Nodes};
pub use mark::{Mark, MarkKind};
pub use node::{attr_bool, attr_string, attr_u32, Attrs, Dispatch, Node, NodeKind, DEFAULT_ALIGNMENT};
pub(crate) use node::one_or_many;
