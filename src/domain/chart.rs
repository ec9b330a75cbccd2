//! Chart domain selection for trajectory plots.

use super::physiology::EDEMA_LUNG_WATER_THRESHOLD;
use super::prescription::TrajectoryPoint;

/// Lowest upper bound of the lung-water axis, just above the edema threshold.
pub const LUNG_WATER_AXIS_FLOOR: f64 = EDEMA_LUNG_WATER_THRESHOLD + 1.0;

/// MAP axis used when there is nothing to plot.
pub const DEFAULT_MAP_BOUNDS: [f64; 2] = [0.0, 120.0];

const MAP_AXIS_PADDING: f64 = 10.0;

/// Upper bound of the lung-water axis.
///
/// Never below `LUNG_WATER_AXIS_FLOOR`, so the edema reference line stays
/// visible even for a trajectory that never approaches it.
#[must_use]
pub fn lung_water_upper_bound(points: &[TrajectoryPoint]) -> f64 {
    points
        .iter()
        .map(|p| p.lung_water)
        .fold(LUNG_WATER_AXIS_FLOOR, f64::max)
}

/// Time axis `[first, last]`, at least one minute wide.
#[must_use]
pub fn time_bounds(points: &[TrajectoryPoint]) -> [f64; 2] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => {
            let start = first.time;
            [start, last.time.max(start + 1.0)]
        }
        _ => [0.0, 1.0],
    }
}

/// MAP axis padded on both sides and clamped at zero.
#[must_use]
pub fn map_bounds(points: &[TrajectoryPoint]) -> [f64; 2] {
    if points.is_empty() {
        return DEFAULT_MAP_BOUNDS;
    }
    let (lo, hi) = points
        .iter()
        .map(|p| p.map)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    [(lo - MAP_AXIS_PADDING).max(0.0), hi + MAP_AXIS_PADDING]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_lung_water(values: &[f64]) -> Vec<TrajectoryPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, lw)| TrajectoryPoint::at(i as f64, 60.0 + i as f64, *lw))
            .collect()
    }

    #[test]
    fn test_low_trajectory_uses_floor() {
        let points = with_lung_water(&[0.5, 2.0, 1.0]);
        assert!((lung_water_upper_bound(&points) - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_high_trajectory_uses_observed_max() {
        let points = with_lung_water(&[3.0, 9.0, 7.5]);
        assert!((lung_water_upper_bound(&points) - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_trajectory_falls_back_to_floor() {
        assert!((lung_water_upper_bound(&[]) - LUNG_WATER_AXIS_FLOOR).abs() < f64::EPSILON);
        assert_eq!(time_bounds(&[]), [0.0, 1.0]);
        assert_eq!(map_bounds(&[]), DEFAULT_MAP_BOUNDS);
    }

    #[test]
    fn test_floor_sits_above_threshold() {
        assert!(LUNG_WATER_AXIS_FLOOR > EDEMA_LUNG_WATER_THRESHOLD);
    }

    #[test]
    fn test_time_and_map_bounds() {
        let points = with_lung_water(&[1.0, 1.0, 1.0]);
        assert_eq!(time_bounds(&points), [0.0, 2.0]);
        assert_eq!(map_bounds(&points), [50.0, 72.0]);

        let single = with_lung_water(&[1.0]);
        assert_eq!(time_bounds(&single), [0.0, 1.0]);
    }
}
