//! Level-shift detection on an aggregated series.
//!
//! This is a deliberately simple, deterministic heuristic rather than a
//! statistical changepoint test: scanning forward, the first value whose
//! ratio to the mean of everything before it crosses the configured
//! threshold (in either direction) splits the series into a "before" and an
//! "after" segment. First hit wins; there is no search for a stronger later
//! shift. Recomputing the leading mean per index is O(n²) worst case, which
//! is fine at the tens-of-points series lengths seen here.
//!
//! The function is total: short, flat or empty series degrade to "no change
//! point" so the composer can branch on presence/absence without error
//! handling.

use serde::{Deserialize, Serialize};

use crate::domain::{ChangePoint, DetectorParams, Segment, Series};

/// Segmentation produced by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Span before the change point; the full date range when no change
    /// point exists; absent only for an empty series.
    pub before: Option<Segment>,
    pub change: Option<ChangePoint>,
    pub after: Option<Segment>,
}

impl Detection {
    fn flat(series: &Series) -> Self {
        Self {
            before: series.full_range(),
            change: None,
            after: None,
        }
    }
}

/// Find the first index whose value departs from the leading mean by the
/// configured ratio.
///
/// Scanning starts at `min_before` (clamped to 1 so the leading mean is
/// never taken over an empty prefix). Indices whose leading mean is 0 are
/// skipped rather than divided by.
pub fn detect_level_shift(series: &Series, params: &DetectorParams) -> Detection {
    if series.len() < 3 {
        return Detection::flat(series);
    }

    let min_before = params.min_before.max(1);
    let points = series.points();

    for i in min_before..points.len() {
        let Some(mean_before) = series.mean_range(0, i) else {
            continue;
        };
        if mean_before == 0.0 {
            continue;
        }

        let ratio = points[i].value / mean_before;
        if ratio >= params.change_ratio || ratio <= 1.0 / params.change_ratio {
            return Detection {
                before: Some(Segment::new(points[0].date, points[i - 1].date)),
                change: Some(ChangePoint {
                    date: points[i].date,
                    index: i,
                }),
                after: Some(Segment::new(points[i].date, points[points.len() - 1].date)),
            };
        }
    }

    Detection::flat(series)
}
