//! Image resolution.
//!
//! An [`ImageResolver`] turns the attributes of an `image` node into a markup
//! fragment. Resolvers may read the filesystem or call out to the attachment
//! store; the renderer isolates their failures to the single node.
//!
//! Built-in resolvers:
//! - [`ReferenceResolver`]: `<img>` pointing at the cached attachment path
//! - [`LocalImageResolver`]: inlines an attachment found under the workdir
//! - `BoxApiResolver` (feature `box-api`): downloads from the Box content API
//! - [`ChainResolver`]: tries several resolvers in order

#[cfg(feature = "box-api")]
mod box_api;
mod local;

use std::path::{Path, PathBuf};

use base64::prelude::BASE64_STANDARD;
use base64::Engine;

use crate::error::{Error, Result};
use crate::model::{attr_string, attr_u32, Attrs};
use crate::render::escape::escape_attr;
use crate::render::AuthContext;

#[cfg(feature = "box-api")]
pub use box_api::BoxApiResolver;
pub use local::{LocalImageResolver, ReferenceResolver};

/// Directory under the workdir holding note attachments.
pub const IMAGES_DIR: &str = "images";

/// Attributes of an `image` node that resolvers understand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageAttrs {
    /// Attachment id in the store (`boxFileId` or `fileId`)
    pub file_id: Option<String>,
    /// Attachment file name
    pub file_name: Option<String>,
    /// Explicit source URL
    pub src: Option<String>,
    /// Display width in pixels
    pub width: Option<u32>,
    /// Display height in pixels
    pub height: Option<u32>,
    /// Alternative text
    pub alt: Option<String>,
}

impl ImageAttrs {
    /// Read the known keys out of an attribute map.
    pub fn from_attrs(attrs: &Attrs) -> Self {
        let non_empty = |key: &str| attr_string(attrs, key).filter(|s| !s.trim().is_empty());
        Self {
            file_id: non_empty("boxFileId").or_else(|| non_empty("fileId")),
            file_name: non_empty("fileName"),
            src: non_empty("src"),
            width: attr_u32(attrs, "width").filter(|w| *w > 0),
            height: attr_u32(attrs, "height").filter(|h| *h > 0),
            alt: non_empty("alt"),
        }
    }

    /// Name shown to readers when the image is missing.
    pub fn display_name(&self) -> Option<&str> {
        self.file_name
            .as_deref()
            .or(self.alt.as_deref())
            .or(self.file_id.as_deref())
    }

    /// Attachment file name, rejecting anything that would escape its directory.
    pub fn safe_file_name(&self) -> Result<&str> {
        let name = self
            .file_name
            .as_deref()
            .ok_or_else(|| Error::ImageResolution("image has no fileName".into()))?;
        let traversal = name == "." || name == ".." || name.contains(['/', '\\']);
        if traversal {
            return Err(Error::ImageResolution(format!("unsafe file name: {}", name)));
        }
        Ok(name)
    }
}

/// Everything a resolver gets for one image node.
#[derive(Debug, Clone)]
pub struct ImageRequest<'a> {
    /// Raw node attributes
    pub attrs: &'a Attrs,
    /// Known attributes, parsed
    pub image: ImageAttrs,
    /// Document title
    pub title: &'a str,
    /// Working directory
    pub workdir: &'a Path,
    /// Credentials for the attachment store
    pub auth: &'a AuthContext,
}

impl<'a> ImageRequest<'a> {
    /// Create a request.
    pub fn new(attrs: &'a Attrs, title: &'a str, workdir: &'a Path, auth: &'a AuthContext) -> Self {
        Self {
            attrs,
            image: ImageAttrs::from_attrs(attrs),
            title,
            workdir,
            auth,
        }
    }

    /// Directory where attachments of this document are cached.
    pub fn attachment_dir(&self) -> PathBuf {
        let mut dir = self.workdir.join(IMAGES_DIR);
        if let Some(title) = safe_title(self.title) {
            dir.push(title);
        }
        dir
    }
}

/// Title usable as a single path component.
fn safe_title(title: &str) -> Option<&str> {
    let title = title.trim();
    let usable = !title.is_empty() && title != "." && title != ".." && !title.contains(['/', '\\']);
    usable.then_some(title)
}

/// Resolves an image node into an embeddable fragment.
pub trait ImageResolver: Send + Sync {
    /// Produce markup for the image, or fail.
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "resolver"
    }
}

impl<R: ImageResolver + ?Sized> ImageResolver for Box<R> {
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String> {
        (**self).resolve(request)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Tries resolvers in order; the first success wins.
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn ImageResolver>>,
}

impl ChainResolver {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resolver to the chain.
    pub fn with<R: ImageResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Append a boxed resolver to the chain.
    pub fn push(&mut self, resolver: Box<dyn ImageResolver>) {
        self.resolvers.push(resolver);
    }

    /// Number of resolvers in the chain.
    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    /// Check if the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl ImageResolver for ChainResolver {
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String> {
        let mut failures = Vec::new();
        for resolver in &self.resolvers {
            match resolver.resolve(request) {
                Ok(fragment) => return Ok(fragment),
                Err(e) => {
                    log::debug!("{} could not resolve image: {}", resolver.name(), e);
                    failures.push(format!("{}: {}", resolver.name(), e));
                }
            }
        }
        if failures.is_empty() {
            return Err(Error::ImageResolution("no resolvers configured".into()));
        }
        Err(Error::ImageResolution(failures.join("; ")))
    }

    fn name(&self) -> &str {
        "chain"
    }
}

/// Default resolver chain for the given credentials.
///
/// Local attachments are inlined when present. With the `box-api` feature and
/// a token, missing attachments are downloaded. Anything left falls back to a
/// reference into the attachment directory.
pub fn default_resolver(auth: &AuthContext) -> ChainResolver {
    let chain = ChainResolver::new().with(LocalImageResolver::new());

    #[cfg(feature = "box-api")]
    let chain = if auth.is_anonymous() {
        chain
    } else {
        chain.with(BoxApiResolver::new())
    };
    #[cfg(not(feature = "box-api"))]
    let _ = auth;

    chain.with(ReferenceResolver::new())
}

/// `<img>` tag for a resolved source.
pub fn img_tag(src: &str, image: &ImageAttrs) -> String {
    let mut tag = format!("<img src=\"{}\"", escape_attr(src));
    if let Some(alt) = image.alt.as_deref().or(image.file_name.as_deref()) {
        tag.push_str(&format!(" alt=\"{}\"", escape_attr(alt)));
    }
    if let Some(width) = image.width {
        tag.push_str(&format!(" width=\"{}\"", width));
    }
    if let Some(height) = image.height {
        tag.push_str(&format!(" height=\"{}\"", height));
    }
    tag.push('>');
    tag
}

/// Encode bytes as a `data:` URI.
pub fn data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, BASE64_STANDARD.encode(bytes))
}

/// Guess the MIME type of an attachment from its file name.
pub fn guess_mime(file_name: &str) -> String {
    mime_guess::from_path(file_name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
