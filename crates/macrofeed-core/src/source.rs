use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical provider identifiers used in metadata and cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    WorldBank,
    Fred,
    OpenExchange,
    Numbeo,
}

impl ProviderId {
    pub const ALL: [Self; 4] = [
        Self::WorldBank,
        Self::Fred,
        Self::OpenExchange,
        Self::Numbeo,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WorldBank => "world_bank",
            Self::Fred => "fred",
            Self::OpenExchange => "open_exchange",
            Self::Numbeo => "numbeo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "world_bank" => Ok(Self::WorldBank),
            "fred" => Ok(Self::Fred),
            "open_exchange" => Ok(Self::OpenExchange),
            "numbeo" => Ok(Self::Numbeo),
            other => Err(ValidationError::InvalidProvider {
                value: other.to_owned(),
            }),
        }
    }
}
