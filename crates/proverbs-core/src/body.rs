//! Comment body rendering.

use url::form_urlencoded::Serializer;
use url::Url;

use crate::config::StyleOptions;
use crate::error::ConfigError;

/// Image service that renders a themed proverb card.
pub const DEFAULT_RENDER_ENDPOINT: &str = "https://styled-proverbs.vercel.app/api/proverb";

/// Alt text of the embedded image.
pub const IMAGE_ALT: &str = "Styled Proverbs";

/// Validated base URL of the rendering service.
///
/// The endpoint is kept exactly as configured (minus surrounding
/// whitespace); the parsed form is only used for validation. When the
/// endpoint already carries a query, the style parameters are appended to it
/// with `&`. Endpoints with a fragment are rejected, since parameters after
/// a `#` never reach the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEndpoint {
    raw: String,
}

impl RenderEndpoint {
    /// Parse an absolute `http(s)` URL.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidEndpoint {
            endpoint: raw.to_string(),
            reason,
        };
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if url.fragment().is_some() {
            return Err(invalid("fragments are not supported".to_string()));
        }
        Ok(Self {
            raw: trimmed.to_string(),
        })
    }

    /// Image URL for a style: `<endpoint>?theme=<theme>&layout=<layout>`.
    pub fn image_url(&self, style: &StyleOptions) -> String {
        let query = Serializer::new(String::new())
            .append_pair("theme", &style.theme)
            .append_pair("layout", &style.layout)
            .finish();
        let separator = match self.raw.find('?') {
            None => "?",
            Some(_) if self.raw.ends_with('?') || self.raw.ends_with('&') => "",
            Some(_) => "&",
        };
        format!("{}{separator}{query}", self.raw)
    }

    /// Full comment body: the image reference, a blank line, then the
    /// attribution naming the triggering commit.
    pub fn render_body(&self, style: &StyleOptions, commit_sha: &str) -> String {
        format!(
            "![{IMAGE_ALT}]({})\n\nTriggered by commit: {commit_sha}",
            self.image_url(style)
        )
    }
}

impl std::fmt::Display for RenderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
