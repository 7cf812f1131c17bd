//! Box content API resolver.
//!
//! Downloads an image attachment by file id, caches it under the document's
//! attachment directory, and inlines it as a `data:` URI.

use std::fs;
use std::time::Duration;

use ureq::Agent;

use super::{data_uri, guess_mime, img_tag, ImageRequest, ImageResolver};
use crate::error::{Error, Result};

/// Default Box API base URL.
pub const DEFAULT_API_URL: &str = "https://api.box.com/2.0";

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Resolver that fetches attachments from the Box content API.
pub struct BoxApiResolver {
    agent: Agent,
    base_url: String,
    cache: bool,
}

impl BoxApiResolver {
    /// Create a resolver against the public API with the default timeout.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL, Duration::from_secs(DEFAULT_TIMEOUT))
    }

    /// Create a resolver against a custom base URL.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            cache: true,
        }
    }

    /// Enable or disable writing downloads to the attachment directory.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Content endpoint for a file id.
    pub fn content_url(&self, file_id: &str) -> String {
        format!("{}/files/{}/content", self.base_url, file_id)
    }

    fn download(&self, request: &ImageRequest<'_>, file_id: &str) -> Result<Vec<u8>> {
        let token = request
            .auth
            .token
            .as_deref()
            .ok_or_else(|| Error::ImageResolution("no access token".into()))?;

        let url = self.content_url(file_id);
        log::info!("Downloading image {} from Box", file_id);

        let mut call = self
            .agent
            .get(&url)
            .header("Authorization", &format!("Bearer {}", token));
        if let Some(user) = request.auth.user_id.as_deref() {
            call = call.header("As-User", user);
        }

        let response = call
            .call()
            .map_err(|e| Error::ImageResolution(format!("HTTP error: {}", e)))?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            return Err(Error::ImageResolution(format!("HTTP {}: {}", status, error_body)));
        }

        body.read_to_vec()
            .map_err(|e| Error::ImageResolution(format!("reading body: {}", e)))
    }
}

impl Default for BoxApiResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageResolver for BoxApiResolver {
    fn resolve(&self, request: &ImageRequest<'_>) -> Result<String> {
        let file_id = request
            .image
            .file_id
            .as_deref()
            .ok_or_else(|| Error::ImageResolution("image has no boxFileId".into()))?;
        if !is_file_id(file_id) {
            return Err(Error::ImageResolution(format!("invalid boxFileId: {}", file_id)));
        }
        let name = request.image.safe_file_name()?;

        let bytes = self.download(request, file_id)?;

        if self.cache {
            let dir = request.attachment_dir();
            let cached = fs::create_dir_all(&dir).and_then(|_| fs::write(dir.join(name), &bytes));
            if let Err(e) = cached {
                log::warn!("Failed to cache {} in {}: {}", name, dir.display(), e);
            }
        }

        Ok(img_tag(&data_uri(&bytes, &guess_mime(name)), &request.image))
    }

    fn name(&self) -> &str {
        "box-api"
    }
}

/// Box file ids are decimal; anything else would be spliced into the URL path.
fn is_file_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())
}
