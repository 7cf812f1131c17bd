//! Per-conversion render context.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::image::ImageRequest;
use crate::model::Attrs;

/// Credentials forwarded to image resolvers.
///
/// Scoped to a single conversion; nothing is cached across calls.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    /// Bearer token for the attachment store
    pub token: Option<String>,

    /// User to act on behalf of
    pub user_id: Option<String>,
}

impl AuthContext {
    /// Create an empty auth context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from optional token and user id, treating blank strings as absent.
    pub fn from_parts(token: Option<&str>, user_id: Option<&str>) -> Self {
        let clean = |s: Option<&str>| s.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
        Self {
            token: clean(token),
            user_id: clean(user_id),
        }
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the user id.
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Check if no token is present.
    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }
}

// Keep tokens out of logs
impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Everything the renderer passes through to image resolvers.
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// Document title, also used to namespace cached attachments
    pub title: String,

    /// Working directory for attachment lookup and caching
    pub workdir: PathBuf,

    /// Credentials for the attachment store
    pub auth: AuthContext,
}

impl RenderContext {
    /// Create a context for the given title, rooted at the current directory.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            workdir: PathBuf::from("."),
            auth: AuthContext::default(),
        }
    }

    /// Set the working directory.
    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = workdir.into();
        self
    }

    /// Set the auth context.
    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = auth;
        self
    }

    /// Working directory.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Build the resolver request for an image node's attributes.
    pub fn image_request<'a>(&'a self, attrs: &'a Attrs) -> ImageRequest<'a> {
        ImageRequest::new(attrs, &self.title, &self.workdir, &self.auth)
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new("")
    }
}
