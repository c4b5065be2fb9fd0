use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Measured quantity tracked by the pipeline. Immutable reference data.
///
/// The variant set mirrors the upstream sources: annual country indicators
/// (inflation, GDP per capita, unemployment), the US CPI level, spot
/// exchange rates, and the composite cost-of-living index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    InflationRate,
    ConsumerPriceIndex,
    ExchangeRate,
    CostOfLiving,
    UnemploymentRate,
    GdpPerCapita,
}

/// Whether an indicator is measured per country or once globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionScope {
    Country,
    Global,
}

impl RegionScope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Global => "global",
        }
    }
}

/// Unit of measure attached to an indicator's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Percent,
    Index,
    Rate,
    UsDollars,
}

impl Indicator {
    pub const ALL: [Self; 6] = [
        Self::InflationRate,
        Self::ConsumerPriceIndex,
        Self::ExchangeRate,
        Self::CostOfLiving,
        Self::UnemploymentRate,
        Self::GdpPerCapita,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::InflationRate => "inflation_rate",
            Self::ConsumerPriceIndex => "consumer_price_index",
            Self::ExchangeRate => "exchange_rate",
            Self::CostOfLiving => "cost_of_living",
            Self::UnemploymentRate => "unemployment_rate",
            Self::GdpPerCapita => "gdp_per_capita",
        }
    }

    pub const fn unit(self) -> Unit {
        match self {
            Self::InflationRate | Self::UnemploymentRate => Unit::Percent,
            Self::ConsumerPriceIndex | Self::CostOfLiving => Unit::Index,
            Self::ExchangeRate => Unit::Rate,
            Self::GdpPerCapita => Unit::UsDollars,
        }
    }

    pub const fn scope(self) -> RegionScope {
        // Every built-in indicator is country-scoped; `Global` stays in the
        // vocabulary for aggregate series (e.g. world inflation) requested
        // with `Region::global()`.
        RegionScope::Country
    }
}

impl Display for Indicator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Indicator {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inflation_rate" => Ok(Self::InflationRate),
            "consumer_price_index" => Ok(Self::ConsumerPriceIndex),
            "exchange_rate" => Ok(Self::ExchangeRate),
            "cost_of_living" => Ok(Self::CostOfLiving),
            "unemployment_rate" => Ok(Self::UnemploymentRate),
            "gdp_per_capita" => Ok(Self::GdpPerCapita),
            other => Err(ValidationError::InvalidIndicator {
                value: other.to_owned(),
            }),
        }
    }
}
