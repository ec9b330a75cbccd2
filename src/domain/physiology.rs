//! Physiological state deriver.
//!
//! Reduces a prescription (or simulation) into one snapshot per body
//! compartment. Safety flags take precedence over trajectory values when
//! colouring organ status, so the displayed state never contradicts a raised
//! flag; the numeric readouts still come from the trajectory when it exists.

use serde::{Deserialize, Serialize};

use super::alerts::SafetyAlerts;
use super::prescription::{PrescriptionResponse, TrajectoryPoint};

/// Lung-water index at or above which pulmonary edema is assumed.
pub const EDEMA_LUNG_WATER_THRESHOLD: f64 = 5.0;

/// MAP shown when the engine stopped before producing a trajectory.
pub const NOMINAL_MAP_MMHG: f64 = 65.0;

/// Synthesized lung water when the edema flag is raised without a trajectory.
const SYNTHETIC_EDEMA_LUNG_WATER: f64 = 6.0;

/// Synthesized lung water when only volume overload is raised.
const SYNTHETIC_OVERLOAD_LUNG_WATER: f64 = 4.5;

/// Discrete organ status, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganStatus {
    Ok,
    Warning,
    Danger,
}

impl OrganStatus {
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Ok => "Within safe limits",
            Self::Warning => "Watch closely",
            Self::Danger => "Stop and reassess",
        }
    }

    /// RGB colour for the TUI.
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Ok => (16, 185, 129),     // Emerald (#10B981)
            Self::Warning => (251, 191, 36), // Amber (#FBBF24)
            Self::Danger => (244, 63, 94),   // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for OrganStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Danger => write!(f, "DANGER"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Organ {
    Heart,
    Lungs,
    Brain,
    Kidney,
}

impl Organ {
    pub const ALL: [Self; 4] = [Self::Heart, Self::Lungs, Self::Brain, Self::Kidney];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Heart => "Heart",
            Self::Lungs => "Lungs",
            Self::Brain => "Brain",
            Self::Kidney => "Kidney",
        }
    }
}

/// Where the snapshot's numeric readouts came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Terminal point of the predicted trajectory
    Trajectory,
    /// Engine halted before simulating; readouts synthesized from flags
    AlertFallback,
}

/// Current state per compartment, derived from one engine response.
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentSnapshot {
    pub map_mmhg: f64,
    pub lung_water: f64,
    pub leak_rate: Option<f64>,
    pub hematocrit: Option<f64>,
    pub heart: OrganStatus,
    pub lungs: OrganStatus,
    pub brain: OrganStatus,
    pub kidney: OrganStatus,
    pub source: SnapshotSource,
}

impl CompartmentSnapshot {
    /// Derive a snapshot from alert flags and a trajectory.
    ///
    /// Total over its inputs: an empty trajectory falls back to a nominal MAP
    /// and lung water synthesized from the flags.
    #[must_use]
    pub fn derive(alerts: &SafetyAlerts, trajectory: &[TrajectoryPoint]) -> Self {
        let (map_mmhg, lung_water, leak_rate, hematocrit, source) = match trajectory.last() {
            Some(last) => (
                last.map,
                last.lung_water,
                Some(last.leak_rate),
                last.hematocrit,
                SnapshotSource::Trajectory,
            ),
            None => {
                let lung_water = if alerts.risk_pulmonary_edema {
                    SYNTHETIC_EDEMA_LUNG_WATER
                } else if alerts.risk_volume_overload {
                    SYNTHETIC_OVERLOAD_LUNG_WATER
                } else {
                    0.0
                };
                (
                    NOMINAL_MAP_MMHG,
                    lung_water,
                    None,
                    None,
                    SnapshotSource::AlertFallback,
                )
            }
        };

        let heart = if alerts.sam_heart_warning {
            OrganStatus::Warning
        } else {
            OrganStatus::Ok
        };
        let lungs = if alerts.risk_pulmonary_edema || lung_water >= EDEMA_LUNG_WATER_THRESHOLD {
            OrganStatus::Danger
        } else {
            OrganStatus::Ok
        };
        let brain = if alerts.risk_cerebral_edema {
            OrganStatus::Danger
        } else {
            OrganStatus::Ok
        };
        let kidney = if alerts.risk_volume_overload {
            OrganStatus::Warning
        } else {
            OrganStatus::Ok
        };

        tracing::debug!(
            ?source,
            map = map_mmhg,
            lung_water,
            "Derived compartment snapshot"
        );

        Self {
            map_mmhg,
            lung_water,
            leak_rate,
            hematocrit,
            heart,
            lungs,
            brain,
            kidney,
            source,
        }
    }

    #[must_use]
    pub fn from_prescription(prescription: &PrescriptionResponse) -> Self {
        Self::derive(&prescription.alerts, &prescription.trajectory)
    }

    #[must_use]
    pub fn status(&self, organ: Organ) -> OrganStatus {
        match organ {
            Organ::Heart => self.heart,
            Organ::Lungs => self.lungs,
            Organ::Brain => self.brain,
            Organ::Kidney => self.kidney,
        }
    }

    /// Every organ with its status, in display order.
    #[must_use]
    pub fn organs(&self) -> [(Organ, OrganStatus); 4] {
        Organ::ALL.map(|o| (o, self.status(o)))
    }

    /// Most severe organ status.
    #[must_use]
    pub fn worst(&self) -> OrganStatus {
        self.organs()
            .iter()
            .map(|(_, s)| *s)
            .max()
            .unwrap_or(OrganStatus::Ok)
    }
}
