//! Fallback resolution: merging live results and synthesizing estimates.
//!
//! Merge policy across disagreeing live providers is priority-wins: the
//! higher-priority provider's value is taken outright at every overlapping
//! date, never averaged. Dates only a lower-priority provider covers are
//! kept, so the merged series is the union of observations.

use std::collections::BTreeMap;

use time::Date;

use crate::{
    Confidence, DataPoint, ProviderId, Series, TimeRange, ValidationError,
};

/// One provider's successful fetch.
#[derive(Debug, Clone)]
pub struct LiveResult {
    pub provider: ProviderId,
    pub series: Series,
}

/// Merged live series plus the provider whose data won the overlaps.
#[derive(Debug, Clone)]
pub struct MergedLive {
    pub series: Series,
    pub winner: ProviderId,
}

/// Merge live provider results under the configured priority order.
///
/// `priority` lists providers best-first; results from providers absent
/// from the list lose to every listed one. Returns `None` when `results`
/// is empty.
pub fn merge_live(
    results: &[LiveResult],
    priority: &[ProviderId],
) -> Result<Option<MergedLive>, ValidationError> {
    let Some(first) = results.first() else {
        return Ok(None);
    };

    for result in &results[1..] {
        if !first.series.same_context(&result.series) {
            return Err(ValidationError::SeriesContextMismatch);
        }
    }

    let rank = |provider: ProviderId| -> usize {
        priority
            .iter()
            .position(|candidate| *candidate == provider)
            .unwrap_or(priority.len())
    };

    // Insert worst-first so better providers overwrite on date conflicts.
    let mut ordered: Vec<&LiveResult> = results.iter().collect();
    ordered.sort_by_key(|result| std::cmp::Reverse(rank(result.provider)));

    let mut merged: BTreeMap<Date, DataPoint> = BTreeMap::new();
    for result in &ordered {
        for point in result.series.points() {
            merged.insert(point.date, *point);
        }
    }

    let winner = ordered
        .last()
        .map(|result| result.provider)
        .expect("results is non-empty");

    let series = Series::from_points(
        first.series.indicator(),
        first.series.region().clone(),
        first.series.resolution(),
        merged.into_values().collect(),
    )?;

    Ok(Some(MergedLive { series, winner }))
}

/// Last-known-value carry-forward over the requested range.
///
/// Historical points inside `range` are kept; the last known value is then
/// extrapolated flat along the series' resolution grid until `range.end`.
/// Every emitted point is tagged `Estimated`; synthetic data is never
/// presented as live. An empty history yields an empty series.
pub fn carry_forward(history: &Series, range: &TimeRange) -> Series {
    let mut points: Vec<DataPoint> = history
        .points()
        .iter()
        .filter(|point| range.contains(point.date))
        .map(|point| DataPoint {
            confidence: Confidence::Estimated,
            ..*point
        })
        .collect();

    let Some(anchor) = history
        .points()
        .iter()
        .filter(|point| point.date <= range.end())
        .next_back()
    else {
        return Series::empty(
            history.indicator(),
            history.region().clone(),
            history.resolution(),
        );
    };

    let resolution = history.resolution();
    let mut cursor = points
        .last()
        .map(|point| point.date)
        .unwrap_or(anchor.date);

    loop {
        cursor = resolution.advance(cursor);
        if cursor > range.end() {
            break;
        }
        if cursor < range.start() {
            continue;
        }
        points.push(DataPoint {
            date: cursor,
            value: anchor.value,
            source: anchor.source,
            confidence: Confidence::Estimated,
        });
    }

    Series::from_points(
        history.indicator(),
        history.region().clone(),
        history.resolution(),
        points,
    )
    .expect("carry-forward emits strictly increasing dates")
}
