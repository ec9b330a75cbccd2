//! Infusion pacing: drip timing for the visual metronome.
//!
//! Below the countability threshold each drop is shown as a discrete pulse
//! repeating once per drop. At or above it, drops are no longer
//! distinguishable by eye and the display switches to a continuous stream.

use std::time::Duration;

/// Drop rate (drops/min) from which individual drops are not countable.
pub const COUNTABLE_DROP_RATE: f64 = 100.0;

/// Time the pulse takes to travel down the drip chamber (seconds).
pub const PULSE_TRAVEL_SECS: f64 = 0.6;

/// Minimum pause between two pulses (seconds). Must stay positive.
pub const MIN_REPEAT_DELAY_SECS: f64 = 0.15;

/// Presentation mode for a prescribed drop rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DripPacing {
    /// No positive finite rate; nothing flows
    Halted,
    /// One pulse per drop
    Discrete {
        drops_per_minute: f64,
        seconds_per_drop: f64,
        /// Pause after the pulse completes before the next one starts
        repeat_delay_secs: f64,
    },
    /// Too fast to count; shown as a stream
    ContinuousStream { drops_per_minute: f64 },
}

impl DripPacing {
    /// Choose the presentation mode for a drops-per-minute rate.
    #[must_use]
    pub fn from_rate(drops_per_minute: f64) -> Self {
        if !drops_per_minute.is_finite() || drops_per_minute <= 0.0 {
            return Self::Halted;
        }
        if drops_per_minute >= COUNTABLE_DROP_RATE {
            return Self::ContinuousStream { drops_per_minute };
        }

        let seconds_per_drop = 60.0 / drops_per_minute;
        Self::Discrete {
            drops_per_minute,
            seconds_per_drop,
            repeat_delay_secs: (seconds_per_drop - PULSE_TRAVEL_SECS).max(MIN_REPEAT_DELAY_SECS),
        }
    }

    /// Displayed rate; capped at `>100` once drops are uncountable.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Halted => "0".to_string(),
            Self::Discrete {
                drops_per_minute, ..
            } => format!("{drops_per_minute:.0}"),
            Self::ContinuousStream { .. } => format!(">{COUNTABLE_DROP_RATE:.0}"),
        }
    }

    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Self::ContinuousStream { .. })
    }

    #[must_use]
    pub fn seconds_per_drop(&self) -> Option<f64> {
        match self {
            Self::Discrete {
                seconds_per_drop, ..
            } => Some(*seconds_per_drop),
            _ => None,
        }
    }

    /// Length of one pulse cycle: travel plus repeat delay.
    #[must_use]
    pub fn cycle_secs(&self) -> Option<f64> {
        match self {
            Self::Discrete {
                repeat_delay_secs, ..
            } => Some(PULSE_TRAVEL_SECS + repeat_delay_secs),
            _ => None,
        }
    }

    /// Position of the pulse in `[0, 1)` while it travels, `None` while resting.
    #[must_use]
    pub fn pulse_phase(&self, elapsed: Duration) -> Option<f64> {
        let cycle = self.cycle_secs()?;
        let t = elapsed.as_secs_f64() % cycle;
        (t < PULSE_TRAVEL_SECS).then(|| t / PULSE_TRAVEL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slow_rate_is_discrete() {
        let pacing = DripPacing::from_rate(20.0);
        assert!((pacing.seconds_per_drop().unwrap_or_default() - 3.0).abs() < f64::EPSILON);
        assert!(!pacing.is_continuous());
        assert_eq!(pacing.label(), "20");
        match pacing {
            DripPacing::Discrete {
                repeat_delay_secs, ..
            } => assert!((repeat_delay_secs - (3.0 - PULSE_TRAVEL_SECS)).abs() < 1e-9),
            other => panic!("Expected discrete pacing, got {other:?}"),
        }
        // The cycle matches the real drop interval.
        assert!((pacing.cycle_secs().unwrap_or_default() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fast_rate_is_continuous() {
        let pacing = DripPacing::from_rate(150.0);
        assert!(pacing.is_continuous());
        assert_eq!(pacing.label(), ">100");
        assert!(pacing.seconds_per_drop().is_none());
        assert!(pacing.pulse_phase(Duration::from_millis(100)).is_none());
    }

    #[test]
    fn test_threshold_itself_is_continuous() {
        assert!(DripPacing::from_rate(COUNTABLE_DROP_RATE).is_continuous());
        assert!(!DripPacing::from_rate(99.0).is_continuous());
    }

    #[test]
    fn test_repeat_delay_never_below_floor() {
        // 99 drops/min is ~0.606 s per drop, barely longer than the pulse itself.
        match DripPacing::from_rate(99.0) {
            DripPacing::Discrete {
                repeat_delay_secs, ..
            } => assert!((repeat_delay_secs - MIN_REPEAT_DELAY_SECS).abs() < f64::EPSILON),
            other => panic!("Expected discrete pacing, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_rates_halt() {
        assert_eq!(DripPacing::from_rate(0.0), DripPacing::Halted);
        assert_eq!(DripPacing::from_rate(-5.0), DripPacing::Halted);
        assert_eq!(DripPacing::from_rate(f64::NAN), DripPacing::Halted);
        assert_eq!(DripPacing::Halted.label(), "0");
    }

    #[test]
    fn test_pulse_phase_cycles() {
        let pacing = DripPacing::from_rate(20.0);
        let start = pacing.pulse_phase(Duration::ZERO).unwrap_or(-1.0);
        assert!(start.abs() < f64::EPSILON);
        assert!(pacing.pulse_phase(Duration::from_millis(300)).is_some());
        assert!(pacing.pulse_phase(Duration::from_millis(1500)).is_none());
        assert!(pacing.pulse_phase(Duration::from_millis(3100)).is_some());
    }
}
