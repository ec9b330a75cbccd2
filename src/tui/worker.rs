//! Background engine worker for non-blocking HTTP calls.
//!
//! Each request runs on its own thread and reports back over a channel,
//! so the TUI keeps redrawing (and the drip keeps pulsing) while the engine
//! is busy.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::application::{PrescriptionService, PrescriptionView, RequestKind, SimulationView};
use crate::domain::{PatientInput, SimulationRequest};
use crate::ports::ResuscitationEngine;

/// Progress updates from the engine worker.
#[derive(Debug, Clone)]
pub enum EngineProgress {
    /// Request sent, waiting for the engine
    Submitted(RequestKind),
    /// Prescription derived and ready to display
    Prescribed(Box<PrescriptionView>),
    /// Simulation derived and ready to display
    Simulated(Box<SimulationView>),
    /// Request failed; message is ready for display
    Failed { kind: RequestKind, message: String },
}

/// Handle to a running engine request.
pub struct EngineWorkerHandle {
    pub kind: RequestKind,
    /// Receiver for progress updates
    pub progress_rx: Receiver<EngineProgress>,
    handle: JoinHandle<()>,
}

impl EngineWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<EngineProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Worker that runs engine calls in the background.
pub struct EngineWorker;

impl EngineWorker {
    pub fn spawn_prescription<E>(
        service: PrescriptionService<E>,
        patient: PatientInput,
    ) -> EngineWorkerHandle
    where
        E: ResuscitationEngine + 'static,
    {
        Self::spawn(RequestKind::Prescription, move |tx| {
            let progress = match service.prescribe(patient) {
                Ok(view) => EngineProgress::Prescribed(Box::new(view)),
                Err(e) => EngineProgress::Failed {
                    kind: RequestKind::Prescription,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(progress);
        })
    }

    pub fn spawn_simulation<E>(
        service: PrescriptionService<E>,
        request: SimulationRequest,
    ) -> EngineWorkerHandle
    where
        E: ResuscitationEngine + 'static,
    {
        Self::spawn(RequestKind::Simulation, move |tx| {
            let progress = match service.simulate(request) {
                Ok(view) => EngineProgress::Simulated(Box::new(view)),
                Err(e) => EngineProgress::Failed {
                    kind: RequestKind::Simulation,
                    message: e.to_string(),
                },
            };
            let _ = tx.send(progress);
        })
    }

    fn spawn<F>(kind: RequestKind, job: F) -> EngineWorkerHandle
    where
        F: FnOnce(&Sender<EngineProgress>) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let _ = tx.send(EngineProgress::Submitted(kind));
            job(&tx);
        });

        EngineWorkerHandle {
            kind,
            progress_rx: rx,
            handle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{sample_prescription, FakeEngine};
    use crate::domain::sample_patient;
    use std::sync::Arc;

    fn drain(handle: &EngineWorkerHandle) -> Vec<EngineProgress> {
        handle.progress_rx.iter().collect()
    }

    #[test]
    fn test_prescription_worker_reports_result() {
        let service = PrescriptionService::new(Arc::new(FakeEngine::healthy()));
        let handle = EngineWorker::spawn_prescription(service, sample_patient());

        let updates = drain(&handle);
        assert!(matches!(
            updates.first(),
            Some(EngineProgress::Submitted(RequestKind::Prescription))
        ));
        assert!(matches!(updates.last(), Some(EngineProgress::Prescribed(_))));
    }

    #[test]
    fn test_simulation_worker_reports_failure() {
        let service =
            PrescriptionService::new(Arc::new(FakeEngine::rejecting("Internal Server Error")));
        let request = PrescriptionView::new(sample_patient(), sample_prescription())
            .simulation_request();
        let handle = EngineWorker::spawn_simulation(service, request);

        match drain(&handle).last() {
            Some(EngineProgress::Failed { kind, message }) => {
                assert_eq!(*kind, RequestKind::Simulation);
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("Expected failure, got {other:?}"),
        }
    }
}
