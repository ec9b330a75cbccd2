//! Ports layer: Trait definitions for external operations.
//!
//! The resuscitation engine is the only external collaborator; the
//! application layer talks to it exclusively through `ResuscitationEngine`.

mod engine;

pub use engine::{EngineError, ResuscitationEngine};
