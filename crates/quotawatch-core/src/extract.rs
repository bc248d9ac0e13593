//! Ordered multi-path field extraction
//!
//! A logical value that may live at several places in a loosely specified
//! response is described by a list of [`FieldPath`]s. The first path that
//! resolves to a present value wins, so precedence is the list order.

use serde_json::Value;
use std::fmt;

/// A nested object path such as `codeAssistTier.paidTier.id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static [&'static str]);

impl FieldPath {
    /// Resolve against `root`, returning the value if it is present
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let value = self.0.iter().try_fold(root, |node, key| node.get(*key))?;
        is_present(value).then_some(value)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Null and empty strings count as absent
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// First present value across `paths`, in order
pub fn first_present<'a>(root: Option<&'a Value>, paths: &[FieldPath]) -> Option<&'a Value> {
    let root = root?;
    paths.iter().find_map(|path| path.resolve(root))
}

/// Like [`first_present`], rendered as a string. Non-string scalars use their
/// JSON text.
pub fn first_present_string(root: Option<&Value>, paths: &[FieldPath]) -> Option<String> {
    first_present(root, paths).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}
