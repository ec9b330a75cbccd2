//! Domain layer: Core clinical types and derivation logic.
//!
//! Everything here is pure and synchronous. The only suspension point in
//! the client is the engine call, which lives behind `ports`.

mod alerts;
pub mod chart;
mod pacing;
mod patient;
mod physiology;
mod prescription;

pub use alerts::{AlertFlag, AlertVocabulary, SafetyAlerts, DEFAULT_TRIGGERS};
pub use pacing::{DripPacing, COUNTABLE_DROP_RATE, MIN_REPEAT_DELAY_SECS, PULSE_TRAVEL_SECS};
pub use patient::{
    Advisory, ClinicalDiagnosis, FieldDomain, FieldViolation, IvSetType, OngoingLosses,
    PatientDraft, PatientInput, Sex, UnknownVariant, ValidationReport, ViolationKind,
    FIELD_DOMAINS, SAM_MUAC_CM, UNKNOWN_FIELD,
};
pub use physiology::{
    CompartmentSnapshot, Organ, OrganStatus, SnapshotSource, EDEMA_LUNG_WATER_THRESHOLD,
    NOMINAL_MAP_MMHG,
};
pub use prescription::{
    FluidType, PrescriptionResponse, SimulationRequest, SimulationResponse, SimulationSummary,
    TrajectoryPoint,
};

#[cfg(test)]
pub(crate) use patient::tests::sample_input as sample_patient;
#[cfg(test)]
pub(crate) use prescription::tests::PRESCRIPTION_JSON;
