//! Event definition model

use serde::{Deserialize, Serialize};

/// Event definition model
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventDefinition {
    pub name: String,
    /// Trigger condition; empty means the event always fires
    #[serde(default)]
    pub when: String,
    /// Statements executed when the condition holds
    #[serde(default)]
    pub then: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl EventDefinition {
    /// Create an event with a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set trigger condition
    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.when = condition.into();
        self
    }

    /// Builder: add an action statement
    pub fn then(mut self, action: impl Into<String>) -> Self {
        self.then.push(action.into());
        self
    }
}
