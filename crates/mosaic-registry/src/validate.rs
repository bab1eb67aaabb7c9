//! Node id hygiene for caller-chosen identifiers.

use once_cell::sync::Lazy;
use regex::Regex;

use mosaic_core::{Error, Result};

/// Longest id a caller may choose.
pub const MAX_NODE_ID_LEN: usize = 100;

static NODE_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap());

/// Check that `id` is a well-formed node identifier.
pub fn validate_node_id(id: &str) -> Result<()> {
    if id.len() > MAX_NODE_ID_LEN {
        return Err(Error::InvalidNodeId(format!(
            "id longer than {} characters",
            MAX_NODE_ID_LEN
        )));
    }
    if !NODE_ID_RE.is_match(id) {
        return Err(Error::InvalidNodeId(format!("{:?}", id)));
    }
    Ok(())
}
