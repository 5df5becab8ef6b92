//! Configuration types: partial batch entries, single-run inputs, and the
//! fully resolved operation descriptor.

mod resolver;

pub use resolver::ConfigResolver;

use serde::Deserialize;
use serde_json::Value;

/// Default theme when neither the batch entry nor the inputs set one.
pub const DEFAULT_THEME: &str = "light";

/// Default layout when neither the batch entry nor the inputs set one.
pub const DEFAULT_LAYOUT: &str = "classic";

/// Visual style of the rendered proverb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleOptions {
    pub theme: String,
    pub layout: String,
}

/// The issue or pull request a comment is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceOptions {
    /// Issue/PR number, always > 0.
    pub request_id: u64,
}

/// Repository targeted by the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOptions {
    pub owner: String,
    pub repo: String,
}

impl std::fmt::Display for RepoOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Fully resolved descriptor for one publish operation.
///
/// Only [`ConfigResolver::resolve`] builds one, so every field has passed
/// validation by the time a pipeline sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOptions {
    style_options: StyleOptions,
    resource_options: ResourceOptions,
    repo_options: RepoOptions,
}

impl ConfigOptions {
    pub fn style_options(&self) -> &StyleOptions {
        &self.style_options
    }

    pub fn resource_options(&self) -> ResourceOptions {
        self.resource_options
    }

    pub fn repo_options(&self) -> &RepoOptions {
        &self.repo_options
    }

    /// Shorthand for `resource_options().request_id`.
    pub fn request_id(&self) -> u64 {
        self.resource_options.request_id
    }
}

/// Style fields as they appear in a batch entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialStyleOptions {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

/// Resource fields as they appear in a batch entry.
///
/// `request_id` is kept as raw JSON so numeric strings and malformed values
/// reach the resolver, which owns validation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResourceOptions {
    #[serde(default)]
    pub request_id: Option<Value>,
}

/// Any subset of descriptor fields, as supplied by a batch entry.
///
/// Unknown keys (including `repoOptions`) are ignored: the repository is
/// always taken from the ambient context.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialConfigOptions {
    #[serde(default)]
    pub style_options: Option<PartialStyleOptions>,
    #[serde(default)]
    pub resource_options: Option<PartialResourceOptions>,
}

impl PartialConfigOptions {
    /// Partial config that only pins the request id.
    pub fn for_request(request_id: impl Into<Value>) -> Self {
        Self {
            style_options: None,
            resource_options: Some(PartialResourceOptions {
                request_id: Some(request_id.into()),
            }),
        }
    }

    fn theme(&self) -> Option<&str> {
        self.style_options.as_ref()?.theme.as_deref()
    }

    fn layout(&self) -> Option<&str> {
        self.style_options.as_ref()?.layout.as_deref()
    }

    fn request_id(&self) -> Option<&Value> {
        self.resource_options.as_ref()?.request_id.as_ref()
    }
}

/// Single-run action inputs (`with:` block of the workflow step).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunInputs {
    pub theme: Option<String>,
    pub layout: Option<String>,
    pub request_id: Option<String>,
}

impl RunInputs {
    /// Build inputs, treating empty strings as unset.
    ///
    /// The Actions runner exports every declared input, so an input the
    /// workflow did not set arrives as an empty variable.
    pub fn new(
        theme: Option<String>,
        layout: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        Self {
            theme: non_empty(theme),
            layout: non_empty(layout),
            request_id: non_empty(request_id),
        }
    }
}

/// Trim an input, mapping blank values to `None`.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fallback style used when no other tier supplies one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefaults {
    pub theme: String,
    pub layout: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
        }
    }
}
