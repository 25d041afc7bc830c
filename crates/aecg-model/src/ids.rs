//! Instance identifiers (`root` + optional `extension`).
//!
//! Identifiers are opaque metadata: nothing in this crate compares entities by
//! identifier. A process-wide default root can be configured so identifiers
//! supplied with only an extension still carry an authority.

use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

static DEFAULT_ROOT: RwLock<Option<String>> = RwLock::new(None);

/// Configure the root used by [`Identifier::extension`].
pub fn set_default_root(root: impl Into<String>) {
    let root = root.into();
    match DEFAULT_ROOT.write() {
        Ok(mut guard) => *guard = Some(root),
        Err(poisoned) => *poisoned.into_inner() = Some(root),
    }
}

/// The configured default root, if any.
pub fn default_root() -> Option<String> {
    match DEFAULT_ROOT.read() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn clear_default_root() {
    match DEFAULT_ROOT.write() {
        Ok(mut guard) => *guard = None,
        Err(poisoned) => *poisoned.into_inner() = None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Identifier {
    /// Globally unique authority (usually an OID or UUID). Empty when unknown.
    pub root: String,
    /// Locally unique value within `root`.
    pub extension: Option<String>,
}

impl Identifier {
    pub fn new(root: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: Some(extension.into()),
        }
    }

    /// Identifier made of a root alone.
    pub fn root(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: None,
        }
    }

    /// Identifier with an extension under the configured default root.
    ///
    /// Without a default root the identifier has an empty root, which the
    /// validator reports.
    pub fn extension(extension: impl Into<String>) -> Self {
        Self {
            root: default_root().unwrap_or_default(),
            extension: Some(extension.into()),
        }
    }

    pub fn has_root(&self) -> bool {
        !self.root.trim().is_empty()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extension {
            Some(extension) => write!(f, "{}^{}", self.root, extension),
            None => f.write_str(&self.root),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_root_and_extension() {
        assert_eq!(Identifier::new("1.2.3", "42").to_string(), "1.2.3^42");
        assert_eq!(Identifier::root("1.2.3").to_string(), "1.2.3");
    }

    #[test]
    fn blank_root_is_not_a_root() {
        let id = Identifier {
            root: "  ".to_string(),
            extension: Some("7".to_string()),
        };
        assert!(!id.has_root());
        assert!(Identifier::root("1.2").has_root());
    }
}
