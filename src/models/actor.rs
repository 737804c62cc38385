//! The identity on whose behalf an engine operation runs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// The user or system performing an operation.
///
/// Passed explicitly into every write so records carry who produced them.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Actor;
///
/// let actor = Actor::new("superadmin").unwrap();
/// assert_eq!(actor.id(), "superadmin");
/// assert!(Actor::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Actor(String);

impl Actor {
    /// Creates an actor from a non-blank identifier.
    pub fn new(id: impl Into<String>) -> EngineResult<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(EngineError::validation("actor", "actor id must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The actor identifier.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
