//! Functions for loading context settings.

use serde_json;

use crate::errors::*;

/// A structure containing configuration data for a `Context`. None of these
/// switches change the lifecycle rules of resources, they only control the
/// diagnostics around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextParams {
    /// Logs a warning when a resource is dropped without being deleted, which
    /// leaks the native object.
    pub leak_warnings: bool,
    /// Logs a warning when `VertexBuffer::upload` implicitly binds itself and
    /// thereby replaces another buffer of the same kind.
    pub rebind_warnings: bool,
    /// Queries the native binding points on context creation instead of
    /// assuming nothing is bound.
    pub verify_bindings: bool,
}

impl Default for ContextParams {
    fn default() -> Self {
        ContextParams {
            leak_warnings: true,
            rebind_warnings: false,
            verify_bindings: false,
        }
    }
}

impl ContextParams {
    /// Parses params from a json document. Missing fields take their default
    /// values.
    pub fn from_json(json: &str) -> Result<Self> {
        let params = serde_json::from_str(json)?;
        Ok(params)
    }
}
