use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Caller-specified tolerance for how degraded the returned data may be.
///
/// Policies are ordered by permissiveness: `MustBeFresh` accepts live data
/// and non-stale cache entries only; `AllowStale` additionally accepts
/// stale cache entries; `EstimateOk` additionally accepts carry-forward
/// estimates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FreshnessPolicy {
    MustBeFresh,
    AllowStale,
    EstimateOk,
}

impl FreshnessPolicy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MustBeFresh => "must-be-fresh",
            Self::AllowStale => "allow-stale",
            Self::EstimateOk => "estimate-ok",
        }
    }

    pub const fn permits_stale(self) -> bool {
        matches!(self, Self::AllowStale | Self::EstimateOk)
    }

    pub const fn permits_estimate(self) -> bool {
        matches!(self, Self::EstimateOk)
    }
}

impl Display for FreshnessPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FreshnessPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "must-be-fresh" => Ok(Self::MustBeFresh),
            "allow-stale" => Ok(Self::AllowStale),
            "estimate-ok" => Ok(Self::EstimateOk),
            other => Err(ValidationError::InvalidFreshnessPolicy {
                value: other.to_owned(),
            }),
        }
    }
}

/// Trust-level tag attached to every resolved result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Live,
    Cached,
    CachedStale,
    Estimated,
}

impl Provenance {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::CachedStale => "cached-stale",
            Self::Estimated => "estimated",
        }
    }
}

impl Display for Provenance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
