//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a bedside interface for:
//! - Patient assessment entry with per-field validation
//! - Prescription review with organ status and a drip metronome
//! - Predicted and simulated trajectory charts

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{EngineProgress, EngineWorker, EngineWorkerHandle};
