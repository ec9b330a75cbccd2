//! Session state: Latest results and in-flight requests.
//!
//! The session is the single owner of the current prescription and
//! simulation. At most one request of each kind is in flight; a failed
//! request clears the view of its kind so stale results are never shown
//! next to a fresh error.

use std::fmt;

use super::prescribing::{PrescriptionView, SimulationView};
use crate::domain::SimulationRequest;
use crate::PediaflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Prescription,
    Simulation,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prescription => write!(f, "prescription"),
            Self::Simulation => write!(f, "simulation"),
        }
    }
}

#[derive(Debug, Default)]
pub struct Session {
    prescription: Option<PrescriptionView>,
    simulation: Option<SimulationView>,
    prescription_pending: bool,
    simulation_pending: bool,
    last_error: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prescription(&self) -> Option<&PrescriptionView> {
        self.prescription.as_ref()
    }

    #[must_use]
    pub fn simulation(&self) -> Option<&SimulationView> {
        self.simulation.as_ref()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    #[must_use]
    pub fn is_pending(&self, kind: RequestKind) -> bool {
        match kind {
            RequestKind::Prescription => self.prescription_pending,
            RequestKind::Simulation => self.simulation_pending,
        }
    }

    /// Mark a request as in flight.
    ///
    /// # Errors
    /// Returns `PediaflowError::RequestPending` if one of that kind already is.
    pub fn begin(&mut self, kind: RequestKind) -> Result<(), PediaflowError> {
        let pending = match kind {
            RequestKind::Prescription => &mut self.prescription_pending,
            RequestKind::Simulation => &mut self.simulation_pending,
        };
        if *pending {
            return Err(PediaflowError::RequestPending(kind));
        }
        *pending = true;
        self.last_error = None;
        Ok(())
    }

    /// Simulation request for the current prescription, if any.
    ///
    /// # Errors
    /// Returns `PediaflowError::NoPrescription` if nothing is loaded.
    pub fn simulation_request(&self) -> Result<SimulationRequest, PediaflowError> {
        self.prescription
            .as_ref()
            .map(PrescriptionView::simulation_request)
            .ok_or(PediaflowError::NoPrescription)
    }

    /// Record the outcome of a prescription request.
    ///
    /// A new prescription invalidates any simulation of the previous one.
    pub fn complete_prescription(&mut self, outcome: Result<PrescriptionView, String>) {
        self.prescription_pending = false;
        self.simulation = None;
        match outcome {
            Ok(view) => {
                self.prescription = Some(view);
                self.last_error = None;
            }
            Err(message) => {
                self.prescription = None;
                self.last_error = Some(message);
            }
        }
    }

    /// Record the outcome of a simulation request.
    ///
    /// A result whose request no longer matches the current prescription
    /// belongs to a replaced patient and is discarded.
    pub fn complete_simulation(&mut self, outcome: Result<SimulationView, String>) {
        self.simulation_pending = false;
        match outcome {
            Ok(view) if self.simulation_request().ok().as_ref() != Some(&view.request) => {
                tracing::warn!("Discarding simulation for a superseded prescription");
            }
            Ok(view) => {
                self.simulation = Some(view);
                self.last_error = None;
            }
            Err(message) => {
                self.simulation = None;
                self.last_error = Some(message);
            }
        }
    }

    /// Drop all results and errors. Pending flags survive so an in-flight
    /// reply is still accounted for when it lands.
    pub fn clear(&mut self) {
        self.prescription = None;
        self.simulation = None;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{sample_prescription, FakeEngine};
    use crate::application::PrescriptionService;
    use crate::domain::sample_patient;
    use std::sync::Arc;

    fn prescription_view() -> PrescriptionView {
        PrescriptionView::new(sample_patient(), sample_prescription())
    }

    fn simulation_view() -> SimulationView {
        let service = PrescriptionService::new(Arc::new(FakeEngine::healthy()));
        service
            .simulate(prescription_view().simulation_request())
            .expect("Should simulate")
    }

    #[test]
    fn test_one_request_per_kind_in_flight() {
        let mut session = Session::new();
        session.begin(RequestKind::Prescription).expect("First begin");

        let err = session
            .begin(RequestKind::Prescription)
            .expect_err("Second begin should fail");
        assert!(matches!(
            err,
            PediaflowError::RequestPending(RequestKind::Prescription)
        ));

        // The other kind is independent.
        session.begin(RequestKind::Simulation).expect("Simulation begin");
        assert!(session.is_pending(RequestKind::Prescription));
        assert!(session.is_pending(RequestKind::Simulation));
    }

    #[test]
    fn test_completion_releases_pending() {
        let mut session = Session::new();
        session.begin(RequestKind::Prescription).expect("Begin");
        session.complete_prescription(Ok(prescription_view()));

        assert!(!session.is_pending(RequestKind::Prescription));
        assert!(session.prescription().is_some());
        session.begin(RequestKind::Prescription).expect("Begin again");
    }

    #[test]
    fn test_failed_prescription_clears_views() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        session.complete_simulation(Ok(simulation_view()));

        session.begin(RequestKind::Prescription).expect("Begin");
        session.complete_prescription(Err("Engine unreachable: refused".to_string()));

        assert!(session.prescription().is_none());
        assert!(session.simulation().is_none());
        assert_eq!(session.last_error(), Some("Engine unreachable: refused"));
    }

    #[test]
    fn test_failed_simulation_keeps_prescription() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        session.complete_simulation(Ok(simulation_view()));

        session.begin(RequestKind::Simulation).expect("Begin");
        session.complete_simulation(Err("Internal Server Error".to_string()));

        assert!(session.prescription().is_some());
        assert!(session.simulation().is_none());
        assert_eq!(session.last_error(), Some("Internal Server Error"));

        session.dismiss_error();
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_new_prescription_drops_old_simulation() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        session.complete_simulation(Ok(simulation_view()));
        session.complete_prescription(Ok(prescription_view()));

        assert!(session.simulation().is_none());
    }

    #[test]
    fn test_stale_simulation_is_discarded() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        let stale = simulation_view();
        session.begin(RequestKind::Simulation).expect("Begin");

        let mut heavier = sample_patient();
        heavier.weight_kg = 20.0;
        session.complete_prescription(Ok(PrescriptionView::new(heavier, sample_prescription())));
        session.complete_simulation(Ok(stale));

        assert!(!session.is_pending(RequestKind::Simulation));
        assert!(session.simulation().is_none());
        let current = session.prescription().expect("Prescription kept");
        assert!((current.patient.weight_kg - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stale_simulation_dropped_after_clear() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        let stale = simulation_view();
        session.clear();
        session.complete_simulation(Ok(stale));

        assert!(session.simulation().is_none());
    }

    #[test]
    fn test_simulation_request_needs_prescription() {
        let mut session = Session::new();
        assert!(matches!(
            session.simulation_request(),
            Err(PediaflowError::NoPrescription)
        ));

        session.complete_prescription(Ok(prescription_view()));
        let request = session.simulation_request().expect("Should build request");
        assert_eq!(request.volume_ml, 100);
        assert_eq!(request.duration_min, 30);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut session = Session::new();
        session.complete_prescription(Ok(prescription_view()));
        session.complete_simulation(Err("boom".to_string()));
        session.clear();

        assert!(session.prescription().is_none());
        assert!(session.simulation().is_none());
        assert!(session.last_error().is_none());
    }
}
