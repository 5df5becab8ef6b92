//! Partial config -> validated descriptor.

use super::{
    ConfigOptions, PartialConfigOptions, RepoOptions, ResourceOptions, RunInputs, StyleDefaults,
    StyleOptions,
};
use crate::context::AmbientContext;
use crate::error::ValueError;
use serde_json::Value;

const REQUEST_ID: &str = "requestId";

/// Resolves batch entries against action inputs, style defaults, and the
/// ambient run context.
///
/// Precedence per field, highest first: the batch entry, the single-run
/// input, then the ambient source (style defaults for theme/layout, the event
/// number for `requestId`). The repository always comes from the context.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    inputs: RunInputs,
    defaults: StyleDefaults,
    context: AmbientContext,
}

impl ConfigResolver {
    pub fn new(inputs: RunInputs, defaults: StyleDefaults, context: AmbientContext) -> Self {
        Self {
            inputs,
            defaults,
            context,
        }
    }

    /// Ambient context this resolver reads from.
    pub fn context(&self) -> &AmbientContext {
        &self.context
    }

    /// Resolve one partial config into a complete descriptor.
    pub fn resolve(&self, partial: &PartialConfigOptions) -> Result<ConfigOptions, ValueError> {
        let theme = partial
            .theme()
            .or(self.inputs.theme.as_deref())
            .unwrap_or(self.defaults.theme.as_str())
            .to_string();
        let layout = partial
            .layout()
            .or(self.inputs.layout.as_deref())
            .unwrap_or(self.defaults.layout.as_str())
            .to_string();

        let request_id = self.resolve_request_id(partial)?;

        Ok(ConfigOptions {
            style_options: StyleOptions { theme, layout },
            resource_options: ResourceOptions { request_id },
            repo_options: RepoOptions {
                owner: self.context.owner.clone(),
                repo: self.context.repo.clone(),
            },
        })
    }

    fn resolve_request_id(&self, partial: &PartialConfigOptions) -> Result<u64, ValueError> {
        // The first tier holding a candidate decides; an invalid candidate
        // never falls through to a lower tier.
        if let Some(value) = partial.request_id() {
            return coerce_request_id(value);
        }
        if let Some(raw) = self.inputs.request_id.as_deref() {
            return parse_request_id(raw);
        }
        match self.context.issue_number {
            Some(0) => Err(ValueError::NotPositiveInteger {
                field: REQUEST_ID,
                value: "0".to_string(),
            }),
            Some(n) => Ok(n),
            None => Err(ValueError::Unresolved { field: REQUEST_ID }),
        }
    }
}

/// Coerce a JSON scalar into a positive request id.
fn coerce_request_id(value: &Value) -> Result<u64, ValueError> {
    match value {
        Value::String(s) => parse_request_id(s),
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(id), _) if id > 0 => Ok(id),
            (None, Some(f)) if is_positive_integral(f) => Ok(f as u64),
            _ => Err(not_positive(n.to_string())),
        },
        other => Err(not_positive(other.to_string())),
    }
}

/// Floats such as `9.0` or `1e1` still name an integer.
fn is_positive_integral(f: f64) -> bool {
    f.fract() == 0.0 && f >= 1.0 && f < u64::MAX as f64
}

/// Parse a base-10 positive integer, ignoring surrounding whitespace.
fn parse_request_id(raw: &str) -> Result<u64, ValueError> {
    match raw.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(not_positive(raw.to_string())),
    }
}

fn not_positive(value: String) -> ValueError {
    ValueError::NotPositiveInteger {
        field: REQUEST_ID,
        value,
    }
}
