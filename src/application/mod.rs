//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with the engine port to implement
//! the prescribe and simulate use cases, and owns the session state.

mod prescribing;
mod session;

pub use prescribing::{PrescriptionService, PrescriptionView, SimulationView};
pub use session::{RequestKind, Session};

#[cfg(test)]
pub(crate) use prescribing::tests::{sample_prescription, FakeEngine};
