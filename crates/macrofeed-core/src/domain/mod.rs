//! Canonical domain models for the macrofeed pipeline.

pub mod indicator;
pub mod region;
pub mod series;
pub mod timestamp;

pub use indicator::{Indicator, RegionScope, Unit};
pub use region::Region;
pub use series::{Confidence, DataPoint, Resolution, Series, TimeRange};
pub use timestamp::UtcDateTime;
