//! Tree renderer: document nodes to HTML body fragments.
//!
//! Rendering happens in two passes. First every reachable `image` node is
//! handed to the [`ImageResolver`] (sequentially, or on the rayon pool when
//! [`RenderOptions::parallel_images`] is set). Then the tree is walked
//! depth-first and each node is expanded into an opening fragment, a run of
//! children, and a closing fragment.
//!
//! Two walks are provided. [`Traversal::Recursive`] returns each subtree's
//! fragments by value and the parent appends them. [`Traversal::Iterative`]
//! keeps an explicit stack on the heap so nesting depth is not limited by the
//! call stack. Both share the same per-node expansion and emit identical
//! output.
//!
//! The only context threaded through the walk is the suppress-paragraph flag.
//! It starts `false` at the root, is forced `true` below list items, checklist
//! items, table cells and call-out boxes, and passes through unchanged
//! everywhere else.

use std::collections::HashMap;

use rayon::prelude::*;

use super::assemble::assemble_with;
use super::cleanup::CleanupPipeline;
use super::marks::compose;
use super::options::{ImageFailurePolicy, RenderOptions, Traversal};
use super::result::{ConversionResult, RenderStats};
use super::tags::{close_tag, image_placeholder, open_tag, paragraph_attrs};
use super::RenderContext;
use crate::image::{ImageAttrs, ImageResolver, ReferenceResolver};
use crate::model::{Dispatch, Node, NodeKind};

/// Body fragments of a render walk, in document order.
#[derive(Debug, Clone, Default)]
pub struct Rendered {
    /// Markup fragments
    pub fragments: Vec<String>,
    /// Statistics gathered along the way
    pub stats: RenderStats,
}

impl Rendered {
    /// Append another walk's output after this one.
    pub fn append(&mut self, other: Rendered) {
        self.fragments.extend(other.fragments);
        self.stats.merge(&other.stats);
    }

    /// Concatenate the fragments.
    pub fn concat(&self) -> String {
        self.fragments.concat()
    }
}

/// Resolved image fragments keyed by node address.
///
/// The tree is borrowed immutably for the whole render, so addresses are
/// stable between the resolution pass and the walk.
struct ImageFragments {
    by_node: HashMap<usize, String>,
    stats: RenderStats,
}

impl ImageFragments {
    fn get(&self, node: &Node) -> &str {
        self.by_node.get(&node_key(node)).map(String::as_str).unwrap_or("")
    }
}

fn node_key(node: &Node) -> usize {
    node as *const Node as usize
}

/// A node broken into the pieces the walk emits.
struct Expansion<'n> {
    open: String,
    children: &'n [Node],
    child_suppress: bool,
    close: String,
}

impl<'n> Expansion<'n> {
    fn leaf(markup: String) -> Self {
        Self {
            open: markup,
            children: &[],
            child_suppress: false,
            close: String::new(),
        }
    }
}

/// One unit of work for the iterative walk.
enum Step<'n> {
    Enter {
        node: &'n Node,
        suppress: bool,
        depth: u32,
    },
    Emit(String),
}

/// Renders document content into body fragments.
pub struct HtmlRenderer<'a> {
    resolver: &'a dyn ImageResolver,
    context: &'a RenderContext,
    options: &'a RenderOptions,
}

impl<'a> HtmlRenderer<'a> {
    /// Create a renderer.
    pub fn new(
        resolver: &'a dyn ImageResolver,
        context: &'a RenderContext,
        options: &'a RenderOptions,
    ) -> Self {
        Self {
            resolver,
            context,
            options,
        }
    }

    /// Render top-level content into body fragments.
    pub fn render(&self, content: &[Node]) -> Rendered {
        let images = self.resolve_images(content);

        let mut rendered = match self.options.traversal {
            Traversal::Recursive => {
                let mut rendered = Rendered::default();
                for node in content {
                    rendered.append(self.render_node(node, false, 1, &images));
                }
                rendered
            }
            Traversal::Iterative => self.render_iterative(content, &images),
        };

        rendered.stats.merge(&images.stats);
        rendered
    }

    /// Resolve every image the walk will reach, in document order.
    fn resolve_images(&self, content: &[Node]) -> ImageFragments {
        let nodes = collect_images(content);
        if nodes.is_empty() {
            return ImageFragments {
                by_node: HashMap::new(),
                stats: RenderStats::default(),
            };
        }

        let outcomes: Vec<(usize, String, bool)> = if self.options.parallel_images && nodes.len() > 1 {
            log::debug!("Resolving {} images in parallel", nodes.len());
            nodes
                .par_iter()
                .map(|node| self.resolve_image(node))
                .collect()
        } else {
            nodes.iter().map(|node| self.resolve_image(node)).collect()
        };

        let mut stats = RenderStats::default();
        let mut by_node = HashMap::with_capacity(outcomes.len());
        for (key, fragment, resolved) in outcomes {
            stats.add_image(resolved);
            by_node.insert(key, fragment);
        }
        ImageFragments { by_node, stats }
    }

    fn resolve_image(&self, node: &Node) -> (usize, String, bool) {
        let request = self.context.image_request(&node.attrs);
        match self.resolver.resolve(&request) {
            Ok(fragment) => (node_key(node), fragment, true),
            Err(e) => {
                let image = ImageAttrs::from_attrs(&node.attrs);
                log::warn!(
                    "Image {} could not be resolved: {}",
                    image.display_name().unwrap_or("(unnamed)"),
                    e
                );
                let fragment = match self.options.image_failure {
                    ImageFailurePolicy::Placeholder => image_placeholder(image.display_name()),
                    ImageFailurePolicy::Omit => String::new(),
                };
                (node_key(node), fragment, false)
            }
        }
    }

    /// Break a node into open markup, children to walk, and close markup.
    fn expand<'n>(
        &self,
        node: &'n Node,
        suppress: bool,
        images: &ImageFragments,
        stats: &mut RenderStats,
    ) -> Expansion<'n> {
        match node.kind.dispatch() {
            Dispatch::Paragraph => {
                stats.add_paragraph(suppress);
                if suppress {
                    Expansion {
                        open: String::new(),
                        children: &node.content,
                        child_suppress: true,
                        close: String::new(),
                    }
                } else {
                    let attrs = paragraph_attrs(&node.alignment());
                    Expansion {
                        open: open_tag(&NodeKind::Paragraph, &attrs),
                        children: &node.content,
                        child_suppress: false,
                        close: close_tag(&NodeKind::Paragraph, &attrs),
                    }
                }
            }
            Dispatch::Text => {
                stats.add_text_run();
                Expansion::leaf(compose(&node.marks, node.text_str(), self.options.escape_text))
            }
            Dispatch::CheckListItem | Dispatch::SuppressingContainer => Expansion {
                open: open_tag(&node.kind, &node.attrs),
                children: &node.content,
                child_suppress: true,
                close: close_tag(&node.kind, &node.attrs),
            },
            Dispatch::Wrapper => Expansion {
                open: open_tag(&node.kind, &node.attrs),
                children: &node.content,
                child_suppress: suppress,
                close: close_tag(&node.kind, &node.attrs),
            },
            Dispatch::Image => Expansion::leaf(images.get(node).to_string()),
            Dispatch::Skip => {
                log::debug!("Skipping unknown node type: {}", node.kind);
                stats.add_unknown();
                Expansion::leaf(String::new())
            }
        }
    }

    /// Recursive walk; each call owns and returns its subtree's fragments.
    fn render_node(&self, node: &Node, suppress: bool, depth: u32, images: &ImageFragments) -> Rendered {
        let mut rendered = Rendered::default();
        rendered.stats.visit_depth(depth);

        let expansion = self.expand(node, suppress, images, &mut rendered.stats);
        push_fragment(&mut rendered.fragments, expansion.open);
        for child in expansion.children {
            rendered.append(self.render_node(child, expansion.child_suppress, depth + 1, images));
        }
        push_fragment(&mut rendered.fragments, expansion.close);

        rendered
    }

    /// Explicit-stack walk producing the same fragments as the recursive one.
    fn render_iterative(&self, content: &[Node], images: &ImageFragments) -> Rendered {
        let mut rendered = Rendered::default();
        let mut stack: Vec<Step<'_>> = content
            .iter()
            .rev()
            .map(|node| Step::Enter {
                node,
                suppress: false,
                depth: 1,
            })
            .collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Emit(fragment) => push_fragment(&mut rendered.fragments, fragment),
                Step::Enter {
                    node,
                    suppress,
                    depth,
                } => {
                    rendered.stats.visit_depth(depth);
                    let expansion = self.expand(node, suppress, images, &mut rendered.stats);
                    push_fragment(&mut rendered.fragments, expansion.open);
                    stack.push(Step::Emit(expansion.close));
                    for child in expansion.children.iter().rev() {
                        stack.push(Step::Enter {
                            node: child,
                            suppress: expansion.child_suppress,
                            depth: depth + 1,
                        });
                    }
                }
            }
        }

        rendered
    }
}

/// Render top-level content into a complete HTML document.
///
/// Images are emitted as references into the attachment directory; nothing
/// is read from disk or fetched.
pub fn render(content: &[Node], title: &str) -> String {
    let context = RenderContext::new(title);
    render_document(content, &context, &ReferenceResolver, &RenderOptions::default()).html
}

/// Render and assemble a document with explicit context, resolver and options.
pub fn render_document(
    content: &[Node],
    context: &RenderContext,
    resolver: &dyn ImageResolver,
    options: &RenderOptions,
) -> ConversionResult {
    let rendered = HtmlRenderer::new(resolver, context, options).render(content);
    let cleanup = CleanupPipeline::new(options.cleanup.clone());
    let html = assemble_with(&rendered.fragments, &context.title, options.include_style, &cleanup);

    if options.collect_stats {
        log::debug!("Render stats: {:?}", rendered.stats);
        ConversionResult::new(html, rendered.stats)
    } else {
        ConversionResult::html_only(html)
    }
}

fn push_fragment(fragments: &mut Vec<String>, fragment: String) {
    if !fragment.is_empty() {
        fragments.push(fragment);
    }
}

/// Image nodes the walk will reach, in document order.
///
/// Only children of kinds that render their children are visited, so images
/// under unknown nodes are never resolved.
fn collect_images(content: &[Node]) -> Vec<&Node> {
    let mut images = Vec::new();
    let mut stack: Vec<&Node> = content.iter().rev().collect();
    while let Some(node) = stack.pop() {
        if node.kind == NodeKind::Image {
            images.push(node);
        } else if node.kind.renders_children() {
            stack.extend(node.content.iter().rev());
        }
    }
    images
}
