//! Target membership and cross-target visibility of provided modules.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a provided module may be imported outside its own target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => f.write_str("public"),
            Visibility::Private => f.write_str("private"),
        }
    }
}

/// The target a unit belongs to, as reported by the target model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TargetScope {
    pub target: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl TargetScope {
    pub fn public(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            visibility: Visibility::Public,
        }
    }

    pub fn private(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            visibility: Visibility::Private,
        }
    }

    /// Whether a module provided under this scope may be required by a unit
    /// of `consumer_target`.
    pub fn is_visible_to(&self, consumer_target: &str) -> bool {
        match self.visibility {
            Visibility::Public => true,
            Visibility::Private => self.target == consumer_target,
        }
    }
}
