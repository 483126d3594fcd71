//! How an utterance should be matched against history.

use serde::{Deserialize, Serialize};

/// Identifier lookup vs. natural-language description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// The user typed an equipment code (e.g. `RFCC-00123`).
    Identifier,
    /// The user described the problem in words. Most traffic lands here.
    #[default]
    Descriptive,
}

impl Scenario {
    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Identifier => "identifier",
            Scenario::Descriptive => "descriptive",
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
