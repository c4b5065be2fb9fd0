//! Series cleaning ahead of model fitting.
//!
//! Observations are snapped to the series' resolution grid, implausible
//! rate readings are discarded, and interior gaps are filled by linear
//! interpolation. Values beyond either end are never extrapolated here;
//! that is forecasting, not cleaning.

use std::collections::BTreeMap;

use macrofeed_core::{Confidence, DataPoint, Series, Unit};
use time::Date;

/// Plausibility window for percent-unit indicators; readings outside it
/// are treated as upstream glitches.
const RATE_LOWER_BOUND: f64 = -20.0;
const RATE_UPPER_BOUND: f64 = 100.0;

/// Clean a series for fitting: outlier removal, grid alignment, linear
/// interpolation of interior gaps. Interpolated points are tagged
/// `Estimated`.
pub fn prepare(series: &Series) -> Series {
    let resolution = series.resolution();
    let is_rate = series.indicator().unit() == Unit::Percent;

    let mut by_period: BTreeMap<Date, DataPoint> = BTreeMap::new();
    for point in series.points() {
        if is_rate && !(RATE_LOWER_BOUND..=RATE_UPPER_BOUND).contains(&point.value) {
            continue;
        }
        let aligned = resolution.align(point.date);
        // Later observations win within one period.
        by_period.insert(
            aligned,
            DataPoint {
                date: aligned,
                ..*point
            },
        );
    }

    let known: Vec<DataPoint> = by_period.into_values().collect();
    let mut points: Vec<DataPoint> = Vec::with_capacity(known.len());

    for window in known.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        points.push(*prev);

        // Count grid steps between the two known observations.
        let mut steps = Vec::new();
        let mut cursor = resolution.advance(prev.date);
        while cursor < next.date {
            steps.push(cursor);
            cursor = resolution.advance(cursor);
        }

        let gap = steps.len() + 1;
        for (offset, date) in steps.into_iter().enumerate() {
            let fraction = (offset + 1) as f64 / gap as f64;
            let value = prev.value + (next.value - prev.value) * fraction;
            points.push(DataPoint {
                date,
                value,
                source: prev.source,
                confidence: Confidence::Estimated,
            });
        }
    }
    if let Some(last) = known.last() {
        points.push(*last);
    }

    Series::from_points(
        series.indicator(),
        series.region().clone(),
        resolution,
        points,
    )
    .expect("grid walk emits strictly increasing dates")
}
