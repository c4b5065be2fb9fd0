use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Indicator, ProviderId, Region, ValidationError};

/// Per-point trust level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Live,
    Cached,
    Estimated,
}

impl Confidence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Live => "live",
            Self::Cached => "cached",
            Self::Estimated => "estimated",
        }
    }
}

/// Period grid a series is sampled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl Resolution {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }

    /// Observations per seasonal cycle on this grid.
    pub const fn periods_per_cycle(self) -> usize {
        match self {
            Self::Daily => 7,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Annual => 1,
        }
    }

    /// Snap a date down to the start of its period.
    pub fn align(self, date: Date) -> Date {
        match self {
            Self::Daily => date,
            Self::Monthly => first_of_month(date.year(), date.month()),
            Self::Quarterly => {
                let quarter_start = match date.month() {
                    Month::January | Month::February | Month::March => Month::January,
                    Month::April | Month::May | Month::June => Month::April,
                    Month::July | Month::August | Month::September => Month::July,
                    Month::October | Month::November | Month::December => Month::October,
                };
                first_of_month(date.year(), quarter_start)
            }
            Self::Annual => first_of_month(date.year(), Month::January),
        }
    }

    /// Start of the period following the one containing `date`.
    pub fn advance(self, date: Date) -> Date {
        match self {
            Self::Daily => date
                .next_day()
                .expect("observation dates stay far from Date::MAX"),
            Self::Monthly => add_months(self.align(date), 1),
            Self::Quarterly => add_months(self.align(date), 3),
            Self::Annual => first_of_month(date.year() + 1, Month::January),
        }
    }
}

fn first_of_month(year: i32, month: Month) -> Date {
    Date::from_calendar_date(year, month, 1).expect("first of month is always a valid date")
}

fn add_months(date: Date, months: u32) -> Date {
    let mut year = date.year();
    let mut month = date.month();
    for _ in 0..months {
        month = month.next();
        if month == Month::January {
            year += 1;
        }
    }
    first_of_month(year, month)
}

impl Display for Resolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "annual" => Ok(Self::Annual),
            other => Err(ValidationError::InvalidResolution {
                value: other.to_owned(),
            }),
        }
    }
}

/// Closed date interval, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    start: Date,
    end: Date,
}

impl TimeRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::ReversedTimeRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(Self { start, end })
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Single observation of one indicator in one region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: Date,
    pub value: f64,
    pub source: ProviderId,
    pub confidence: Confidence,
}

impl DataPoint {
    pub fn new(
        date: Date,
        value: f64,
        source: ProviderId,
        confidence: Confidence,
    ) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "value" });
        }
        Ok(Self {
            date,
            value,
            source,
            confidence,
        })
    }
}

/// Ordered observations for one `(indicator, region, resolution)`.
///
/// Empty is a valid "no data" state; dates are strictly increasing with no
/// duplicates, enforced on every insertion path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    indicator: Indicator,
    region: Region,
    resolution: Resolution,
    points: Vec<DataPoint>,
}

impl Series {
    pub fn empty(indicator: Indicator, region: Region, resolution: Resolution) -> Self {
        Self {
            indicator,
            region,
            resolution,
            points: Vec::new(),
        }
    }

    pub fn from_points(
        indicator: Indicator,
        region: Region,
        resolution: Resolution,
        points: Vec<DataPoint>,
    ) -> Result<Self, ValidationError> {
        let mut series = Self::empty(indicator, region, resolution);
        for point in points {
            series.push(point)?;
        }
        Ok(series)
    }

    /// Append an observation, preserving the monotonic-date invariant.
    pub fn push(&mut self, point: DataPoint) -> Result<(), ValidationError> {
        if let Some(last) = self.points.last() {
            if point.date == last.date {
                return Err(ValidationError::DuplicateObservation {
                    date: point.date.to_string(),
                });
            }
            if point.date < last.date {
                return Err(ValidationError::ObservationOutOfOrder {
                    date: point.date.to_string(),
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub const fn indicator(&self) -> Indicator {
        self.indicator
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub const fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|point| point.value).collect()
    }

    /// True when the two series describe the same dataset.
    pub fn same_context(&self, other: &Self) -> bool {
        self.indicator == other.indicator
            && self.region == other.region
            && self.resolution == other.resolution
    }

    /// Copy of the series with every point retagged to `confidence`.
    pub fn retagged(&self, confidence: Confidence) -> Self {
        let points = self
            .points
            .iter()
            .map(|point| DataPoint {
                confidence,
                ..*point
            })
            .collect();
        Self {
            indicator: self.indicator,
            region: self.region.clone(),
            resolution: self.resolution,
            points,
        }
    }

    /// Sub-series restricted to `range` (ordering is preserved).
    pub fn within(&self, range: &TimeRange) -> Self {
        let points = self
            .points
            .iter()
            .filter(|point| range.contains(point.date))
            .copied()
            .collect();
        Self {
            indicator: self.indicator,
            region: self.region.clone(),
            resolution: self.resolution,
            points,
        }
    }
}
