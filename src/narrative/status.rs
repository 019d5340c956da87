//! Coarse status classification.
//!
//! A pure function of the narrative's scalar statistics, independent of the
//! rest of the pipeline. The thresholds are fixed design constants; scenario
//! tests depend on the exact boundary values.

use crate::domain::{ActivityStatus, GrowthStatus, NarrativeStats, ScaleStatus, StatusTags};

/// Below this many total users the deployment counts as a pilot.
const SCALE_PILOT_LIMIT: u64 = 500;
/// Below this many total users the deployment counts as growing.
const SCALE_GROWING_LIMIT: u64 = 5_000;

/// DAU / total-users penetration for "high".
const PENETRATION_HIGH: f64 = 0.5;
/// DAU / total-users penetration for "medium".
const PENETRATION_MEDIUM: f64 = 0.2;

/// Classify scale, activity and growth from narrative statistics.
pub fn classify(stats: &NarrativeStats) -> StatusTags {
    StatusTags {
        scale: classify_scale(stats.total_users),
        activity: classify_activity(stats.dau_mean, stats.total_users),
        growth: classify_growth(stats.total_new, stats.zero_days),
    }
}

fn classify_scale(total_users: u64) -> ScaleStatus {
    if total_users == 0 {
        ScaleStatus::NoData
    } else if total_users < SCALE_PILOT_LIMIT {
        ScaleStatus::Pilot
    } else if total_users < SCALE_GROWING_LIMIT {
        ScaleStatus::Growing
    } else {
        ScaleStatus::Established
    }
}

fn classify_activity(dau_mean: Option<f64>, total_users: u64) -> ActivityStatus {
    let Some(mean) = dau_mean else {
        return ActivityStatus::NoData;
    };
    if total_users == 0 {
        return ActivityStatus::Unclear;
    }
    let penetration = mean / total_users as f64;
    if penetration >= PENETRATION_HIGH {
        ActivityStatus::HighPenetration
    } else if penetration >= PENETRATION_MEDIUM {
        ActivityStatus::Medium
    } else {
        ActivityStatus::NeedsImprovement
    }
}

fn classify_growth(total_new: Option<u64>, zero_days: Option<usize>) -> GrowthStatus {
    let Some(total) = total_new else {
        return GrowthStatus::NoData;
    };
    if total == 0 {
        return GrowthStatus::None;
    }
    if zero_days.unwrap_or(0) > 0 {
        GrowthStatus::Unstable
    } else {
        GrowthStatus::Stable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(total_users: u64) -> NarrativeStats {
        NarrativeStats {
            total_users,
            ..NarrativeStats::default()
        }
    }

    #[test]
    fn scale_boundaries() {
        assert_eq!(classify(&stats(0)).scale, ScaleStatus::NoData);
        assert_eq!(classify(&stats(499)).scale, ScaleStatus::Pilot);
        assert_eq!(classify(&stats(500)).scale, ScaleStatus::Growing);
        assert_eq!(classify(&stats(4_999)).scale, ScaleStatus::Growing);
        assert_eq!(classify(&stats(5_000)).scale, ScaleStatus::Established);
    }

    #[test]
    fn activity_penetration_bands() {
        let mut s = stats(100);
        assert_eq!(classify(&s).activity, ActivityStatus::NoData);

        s.dau_mean = Some(50.0);
        assert_eq!(classify(&s).activity, ActivityStatus::HighPenetration);

        s.dau_mean = Some(20.0);
        assert_eq!(classify(&s).activity, ActivityStatus::Medium);

        s.dau_mean = Some(19.9);
        assert_eq!(classify(&s).activity, ActivityStatus::NeedsImprovement);
    }

    #[test]
    fn activity_guards_division_by_zero() {
        let mut s = stats(0);
        s.dau_mean = Some(3.0);
        assert_eq!(classify(&s).activity, ActivityStatus::Unclear);
    }

    #[test]
    fn growth_bands() {
        let mut s = stats(100);
        assert_eq!(classify(&s).growth, GrowthStatus::NoData);

        s.total_new = Some(0);
        assert_eq!(classify(&s).growth, GrowthStatus::None);

        s.total_new = Some(8);
        s.zero_days = Some(3);
        assert_eq!(classify(&s).growth, GrowthStatus::Unstable);

        s.zero_days = Some(0);
        assert_eq!(classify(&s).growth, GrowthStatus::Stable);
    }
}
