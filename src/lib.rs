//! # Pediaflow
//!
//! Terminal client for a pediatric fluid-resuscitation engine.
//!
//! This crate provides:
//! - Range and type validation of a pediatric patient record
//! - Normalization of free-text engine warnings into safety flags
//! - Per-organ status derived from the predicted trajectory
//! - Drip pacing for a visual metronome and chart axis selection
//! - Terminal UI for bedside use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core clinical types (PatientInput, SafetyAlerts, snapshots)
//! - `ports`: Trait definition for the remote engine
//! - `adapters`: Concrete implementations (HTTP client, log sanitizer)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use application::RequestKind;
pub use domain::{PatientInput, PrescriptionResponse, SafetyAlerts};

/// Result type for Pediaflow operations
pub type Result<T> = std::result::Result<T, PediaflowError>;

/// Main error type for Pediaflow
#[derive(Debug, thiserror::Error)]
pub enum PediaflowError {
    #[error("Invalid patient data: {0}")]
    Validation(#[from] domain::ValidationReport),

    #[error(transparent)]
    Engine(#[from] ports::EngineError),

    #[error("A {0} request is already in flight")]
    RequestPending(RequestKind),

    #[error("Nothing to simulate: no prescription loaded")]
    NoPrescription,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
