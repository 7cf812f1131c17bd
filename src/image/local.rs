//! Filesystem-backed resolvers.

use std::fs;
use std::path::PathBuf;

use super::{data_uri, guess_mime, img_tag, safe_title, ImageRequest, ImageResolver, IMAGES_DIR};
use crate::error::{Error, Result};
use crate::render::escape::sanitize_url;

/// Inlines an attachment found under the working directory.
///
/// Looks in `workdir`, `workdir/images` and `workdir/images/<title>`, in that
/// order, and embeds the first match as a base64 `data:` URI.
#[derive(Debug, Clone, Default)]
pub struct LocalImageResolver {
    max_bytes: Option<u64>,
}

impl LocalImageResolver {
    /// Create a resolver with no size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse to inline files larger than `max_bytes`.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = Some(max_bytes);
        self
    }

    /// Candidate paths for the attachment, in lookup order.
    pub fn candidates(request: &ImageRequest<'_>) -> Result<Vec<PathBuf>> {
        let name = request.image.safe_file_name()?;
        let mut paths = vec![
            request.workdir.join(name),
            request.workdir.join(IMAGES_DIR).join(name),
        ];
        let titled = request.attachment_dir().join(name);
        if !paths.contains(&titled) {
            paths.push(titled);
        }
        Ok(paths)
    }
}

impl ImageResolver for LocalImageResolver {
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String> {
        let name = request.image.safe_file_name()?;
        let path = Self::candidates(request)?
            .into_iter()
            .find(|p| p.is_file())
            .ok_or_else(|| Error::ImageResolution(format!("{} not found under {}", name, request.workdir.display())))?;

        if let Some(limit) = self.max_bytes {
            let size = fs::metadata(&path)?.len();
            if size > limit {
                return Err(Error::ImageResolution(format!(
                    "{} is {} bytes, limit is {}",
                    name, size, limit
                )));
            }
        }

        let bytes = fs::read(&path)?;
        log::debug!("Inlined {} ({} bytes)", path.display(), bytes.len());
        Ok(img_tag(&data_uri(&bytes, &guess_mime(name)), &request.image))
    }

    fn name(&self) -> &str {
        "local"
    }
}

/// Emits an `<img>` referencing the attachment without reading it.
///
/// Uses the node's `src` when it is a safe URL, otherwise the attachment's
/// path relative to the working directory (`images/<title>/<fileName>`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceResolver;

impl ReferenceResolver {
    /// Create a reference resolver.
    pub fn new() -> Self {
        Self
    }
}

impl ImageResolver for ReferenceResolver {
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String> {
        if let Some(src) = request.image.src.as_deref() {
            // sanitize_url escapes; img_tag escapes again, so pass the raw value
            if sanitize_url(src).is_some() {
                return Ok(img_tag(src.trim(), &request.image));
            }
            log::warn!("Ignoring unsafe image src: {}", src);
        }

        let name = request.image.safe_file_name()?;
        let src = match safe_title(request.title) {
            Some(title) => format!("{}/{}/{}", IMAGES_DIR, title, name),
            None => format!("{}/{}", IMAGES_DIR, name),
        };
        Ok(img_tag(&src, &request.image))
    }

    fn name(&self) -> &str {
        "reference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Attrs;
    use crate::render::AuthContext;
    use serde_json::{json, Value};
    use std::path::Path;

    fn attrs(value: Value) -> Attrs {
        match value {
            Value::Object(map) => map,
            _ => Attrs::new(),
        }
    }

    #[test]
    fn test_local_resolves_from_images_dir() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("images").join("Notes");
        fs::create_dir_all(&images).unwrap();
        fs::write(images.join("dot.png"), b"\x89PNG").unwrap();

        let a = attrs(json!({"fileName": "dot.png"}));
        let auth = AuthContext::default();
        let request = ImageRequest::new(&a, "Notes", dir.path(), &auth);
        let html = LocalImageResolver::new().resolve(&request).unwrap();
        assert!(html.starts_with("<img src=\"data:image/png;base64,"));
        assert!(html.contains("alt=\"dot.png\""));
    }

    #[test]
    fn test_local_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let a = attrs(json!({"fileName": "nope.png"}));
        let auth = AuthContext::default();
        let request = ImageRequest::new(&a, "Notes", dir.path(), &auth);
        let err = LocalImageResolver::new().resolve(&request).unwrap_err();
        assert!(matches!(err, Error::ImageResolution(_)));
    }

    #[test]
    fn test_local_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("big.gif"), vec![0u8; 64]).unwrap();
        let a = attrs(json!({"fileName": "big.gif"}));
        let auth = AuthContext::default();
        let request = ImageRequest::new(&a, "", dir.path(), &auth);
        assert!(LocalImageResolver::new().with_max_bytes(10).resolve(&request).is_err());
        assert!(LocalImageResolver::new().with_max_bytes(64).resolve(&request).is_ok());
    }

    #[test]
    fn test_reference_uses_attachment_path() {
        let a = attrs(json!({"fileName": "chart.png", "width": 300}));
        let auth = AuthContext::default();
        let request = ImageRequest::new(&a, "Weekly", Path::new("/work"), &auth);
        assert_eq!(
            ReferenceResolver.resolve(&request).unwrap(),
            "<img src=\"images/Weekly/chart.png\" alt=\"chart.png\" width=\"300\">"
        );

        let request = ImageRequest::new(&a, "", Path::new("/work"), &auth);
        assert_eq!(
            ReferenceResolver.resolve(&request).unwrap(),
            "<img src=\"images/chart.png\" alt=\"chart.png\" width=\"300\">"
        );
    }

    #[test]
    fn test_reference_prefers_safe_src() {
        let a = attrs(json!({"src": "https://cdn.example.com/x.png?a=1&b=2"}));
        let auth = AuthContext::default();
        let request = ImageRequest::new(&a, "t", Path::new("."), &auth);
        assert_eq!(
            ReferenceResolver.resolve(&request).unwrap(),
            "<img src=\"https://cdn.example.com/x.png?a=1&amp;b=2\">"
        );

        let a = attrs(json!({"src": "javascript:alert(1)"}));
        let request = ImageRequest::new(&a, "t", Path::new("."), &auth);
        assert!(ReferenceResolver.resolve(&request).is_err());
    }
}
