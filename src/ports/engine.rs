//! Engine port: Trait for the remote resuscitation engine.
//!
//! This trait abstracts the transport (JSON over HTTP) from the application
//! logic so the session can be driven by an in-memory engine in tests.

use crate::domain::{PatientInput, PrescriptionResponse, SimulationRequest, SimulationResponse};

/// Failure of a single engine call. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Non-success response; `detail` is the engine's message or the status text.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// Request never produced a response.
    #[error("Engine unreachable: {0}")]
    Transport(String),

    /// Response body did not match the contract.
    #[error("Malformed engine response: {0}")]
    Decode(String),
}

/// Trait for the resuscitation engine.
///
/// Implementations provide:
/// - `prescribe`: fluid protocol and predicted trajectory for a patient
/// - `simulate`: what-if trajectory for a given fluid, volume and duration
pub trait ResuscitationEngine: Send + Sync {
    /// Request a prescription for a validated patient.
    ///
    /// # Errors
    /// Returns `EngineError::Rejected` if the engine refuses the patient
    /// (e.g. clinical hard stop), or a transport/decode error.
    fn prescribe(&self, patient: &PatientInput) -> Result<PrescriptionResponse, EngineError>;

    /// Simulate the outcome of a bolus.
    ///
    /// # Errors
    /// Same failure modes as `prescribe`.
    fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResponse, EngineError>;
}
