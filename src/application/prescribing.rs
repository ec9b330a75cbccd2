//! Prescribing service: Orchestrates engine calls and derivations.
//!
//! Each engine response is turned into a complete view in one place:
//! - organ snapshot from flags and trajectory
//! - drip pacing for the prescribed rate
//! - lung-water axis bound for the chart
//! - advisories raised by the submitted record

use std::sync::Arc;

use crate::domain::{
    chart, Advisory, AlertVocabulary, CompartmentSnapshot, DripPacing, PatientInput,
    PrescriptionResponse, SafetyAlerts, SimulationRequest, SimulationResponse,
};
use crate::ports::ResuscitationEngine;
use crate::PediaflowError;

/// A prescription with everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrescriptionView {
    pub patient: PatientInput,
    pub response: PrescriptionResponse,
    pub snapshot: CompartmentSnapshot,
    pub pacing: DripPacing,
    pub lung_water_axis_max: f64,
    pub advisories: Vec<Advisory>,
}

impl PrescriptionView {
    #[must_use]
    pub fn new(patient: PatientInput, response: PrescriptionResponse) -> Self {
        let snapshot = CompartmentSnapshot::from_prescription(&response);
        let pacing = DripPacing::from_rate(f64::from(response.drops_per_minute));
        let lung_water_axis_max = chart::lung_water_upper_bound(&response.trajectory);
        let advisories = patient.advisories();

        Self {
            patient,
            response,
            snapshot,
            pacing,
            lung_water_axis_max,
            advisories,
        }
    }

    /// What-if request replaying the prescribed bolus for this patient.
    #[must_use]
    pub fn simulation_request(&self) -> SimulationRequest {
        SimulationRequest::for_prescription(self.patient.clone(), &self.response)
    }
}

/// A simulation with flags normalized from its free-text alerts.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationView {
    pub request: SimulationRequest,
    pub response: SimulationResponse,
    pub alerts: SafetyAlerts,
    pub snapshot: CompartmentSnapshot,
    pub lung_water_axis_max: f64,
}

impl SimulationView {
    #[must_use]
    pub fn new(
        request: SimulationRequest,
        response: SimulationResponse,
        vocabulary: &AlertVocabulary,
    ) -> Self {
        let alerts = vocabulary.normalize(&response.summary.safety_alerts);
        let snapshot = CompartmentSnapshot::derive(&alerts, &response.graph_data);
        let lung_water_axis_max = chart::lung_water_upper_bound(&response.graph_data);

        Self {
            request,
            response,
            alerts,
            snapshot,
            lung_water_axis_max,
        }
    }

    /// Change in systolic pressure over the simulated bolus.
    #[must_use]
    pub fn bp_delta(&self) -> i32 {
        self.response.summary.bp_end - self.response.summary.bp_start
    }
}

/// Service for requesting prescriptions and simulations.
pub struct PrescriptionService<E>
where
    E: ResuscitationEngine,
{
    engine: Arc<E>,
    vocabulary: AlertVocabulary,
}

impl<E> Clone for PrescriptionService<E>
where
    E: ResuscitationEngine,
{
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            vocabulary: self.vocabulary.clone(),
        }
    }
}

impl<E> PrescriptionService<E>
where
    E: ResuscitationEngine,
{
    pub fn new(engine: Arc<E>) -> Self {
        Self::with_vocabulary(engine, AlertVocabulary::default())
    }

    pub fn with_vocabulary(engine: Arc<E>, vocabulary: AlertVocabulary) -> Self {
        Self { engine, vocabulary }
    }

    /// Request a prescription and derive its view.
    ///
    /// # Errors
    /// Returns `PediaflowError::Engine` if the engine call fails.
    pub fn prescribe(&self, patient: PatientInput) -> Result<PrescriptionView, PediaflowError> {
        tracing::info!(
            diagnosis = patient.diagnosis.wire_value(),
            "Requesting prescription..."
        );

        let response = self.engine.prescribe(&patient)?;
        let view = PrescriptionView::new(patient, response);

        tracing::info!(
            "Prescription ready: fluid={}, bolus={}ml over {}min, pacing={}, worst organ={}",
            view.response.recommended_fluid.wire_value(),
            view.response.bolus_volume_ml,
            view.response.infusion_duration_min,
            view.pacing.label(),
            view.snapshot.worst()
        );
        if view.response.alerts.any() {
            tracing::warn!(alerts = ?view.response.alerts.active(), "Engine raised safety alerts");
        }

        Ok(view)
    }

    /// Run a what-if simulation and normalize its alerts.
    ///
    /// # Errors
    /// Returns `PediaflowError::Engine` if the engine call fails.
    pub fn simulate(&self, request: SimulationRequest) -> Result<SimulationView, PediaflowError> {
        tracing::info!(
            fluid = %request.fluid_type,
            volume_ml = request.volume_ml,
            duration_min = request.duration_min,
            "Requesting simulation..."
        );

        let response = self.engine.simulate(&request)?;
        let view = SimulationView::new(request, response, &self.vocabulary);

        tracing::info!(
            "Simulation complete: {} points, bp {} -> {}, {} alerts",
            view.response.graph_data.len(),
            view.response.summary.bp_start,
            view.response.summary.bp_end,
            view.response.summary.safety_alerts.len()
        );

        Ok(view)
    }
}
