use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Session behaviour settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    /// Pick a random maximum matching instead of the first one found
    pub randomize: bool,

    /// Seed for the session RNG; a random seed is drawn when absent
    pub seed: Option<u64>,

    /// Refuse to generate races while a group has more pilots than cars
    pub enforce_group_size: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { randomize: true, seed: None, enforce_group_size: true }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }
}
