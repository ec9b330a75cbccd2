//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Engine calls via background workers, one per request kind

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::HttpEngine;
use crate::application::{PrescriptionService, RequestKind, Session};
use crate::config::Settings;
use crate::ports::ResuscitationEngine;

use super::ui::{
    patient::{render_patient_form, PatientFormState},
    prescription::{render_prescription, PrescriptionScreen},
    render_disclaimer, render_error,
    trajectory::render_trajectory,
};
use super::worker::{EngineProgress, EngineWorker, EngineWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    PatientForm,
    Prescription,
    Trajectory,
    Error,
}

/// Main application state
pub struct App<E = HttpEngine>
where
    E: ResuscitationEngine + 'static,
{
    screen: Screen,
    should_quit: bool,

    service: PrescriptionService<E>,
    session: Session,
    patient_form_state: PatientFormState,

    prescription_worker: Option<EngineWorkerHandle>,
    simulation_worker: Option<EngineWorkerHandle>,

    /// Start of the drip animation for the current prescription
    drip_started_at: Instant,
}

impl App<HttpEngine> {
    /// Create an application talking to the engine named in `settings`.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self> {
        let engine = HttpEngine::new(settings.engine_url.clone())?;
        tracing::info!(url = engine.base_url(), "Using resuscitation engine");
        Ok(Self::with_service(PrescriptionService::new(Arc::new(engine))))
    }
}

impl<E> App<E>
where
    E: ResuscitationEngine + 'static,
{
    /// Create application with an injected service (Composition Root pattern).
    pub fn with_service(service: PrescriptionService<E>) -> Self {
        Self {
            screen: Screen::PatientForm,
            should_quit: false,
            service,
            session: Session::new(),
            patient_form_state: PatientFormState::default(),
            prescription_worker: None,
            simulation_worker: None,
            drip_started_at: Instant::now(),
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_workers();

            terminal.draw(|f| self.render(f))?;

            // Short poll keeps the drip animation smooth.
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let content_area = chunks[0];
        let disclaimer_area = chunks[1];

        match self.screen {
            Screen::PatientForm => render_patient_form(f, content_area, &self.patient_form_state),
            Screen::Prescription => render_prescription(
                f,
                content_area,
                &PrescriptionScreen {
                    view: self.session.prescription(),
                    simulation: self.session.simulation(),
                    prescription_pending: self.session.is_pending(RequestKind::Prescription),
                    simulation_pending: self.session.is_pending(RequestKind::Simulation),
                    elapsed: self.drip_started_at.elapsed(),
                },
            ),
            Screen::Trajectory => render_trajectory(
                f,
                content_area,
                self.session.prescription(),
                self.session.simulation(),
            ),
            Screen::Error => render_error(
                f,
                content_area,
                self.session.last_error().unwrap_or("Unknown error"),
            ),
        }

        render_disclaimer(f, disclaimer_area);
    }

    fn worker_slot(&mut self, kind: RequestKind) -> &mut Option<EngineWorkerHandle> {
        match kind {
            RequestKind::Prescription => &mut self.prescription_worker,
            RequestKind::Simulation => &mut self.simulation_worker,
        }
    }

    /// Next update from the worker of `kind`, if any.
    ///
    /// A worker thread that ended without a final message is reported as a
    /// failure so the session never stays pending forever.
    fn next_progress(&mut self, kind: RequestKind) -> Option<EngineProgress> {
        let slot = self.worker_slot(kind);
        let worker = slot.as_ref()?;
        if let Some(progress) = worker.try_recv() {
            return Some(progress);
        }
        if !worker.is_finished() {
            return None;
        }
        // The thread may have sent its result just before finishing.
        if let Some(progress) = worker.try_recv() {
            return Some(progress);
        }
        *slot = None;
        Some(EngineProgress::Failed {
            kind,
            message: "Engine worker stopped unexpectedly".to_string(),
        })
    }

    /// Poll both background workers and fold results into the session.
    fn poll_workers(&mut self) {
        for kind in [RequestKind::Prescription, RequestKind::Simulation] {
            while let Some(progress) = self.next_progress(kind) {
                self.apply_progress(progress);
            }
        }
    }

    fn apply_progress(&mut self, progress: EngineProgress) {
        match progress {
            EngineProgress::Submitted(kind) => {
                tracing::debug!(%kind, "Request submitted");
            }
            EngineProgress::Prescribed(view) => {
                self.prescription_worker = None;
                self.session.complete_prescription(Ok(*view));
                self.drip_started_at = Instant::now();
            }
            EngineProgress::Simulated(view) => {
                self.simulation_worker = None;
                self.session.complete_simulation(Ok(*view));
            }
            EngineProgress::Failed { kind, message } => {
                tracing::error!(%kind, "Request failed: {}", message);
                *self.worker_slot(kind) = None;
                match kind {
                    RequestKind::Prescription => self.session.complete_prescription(Err(message)),
                    RequestKind::Simulation => self.session.complete_simulation(Err(message)),
                }
                self.screen = Screen::Error;
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('q') | KeyCode::Char('c'))
        {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::PatientForm => self.handle_patient_form_key(key),
            Screen::Prescription => self.handle_prescription_key(key),
            Screen::Trajectory => self.handle_trajectory_key(key),
            Screen::Error => self.handle_error_key(key),
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                if self.session.prescription().is_some()
                    || self.session.is_pending(RequestKind::Prescription)
                {
                    self.screen = Screen::Prescription;
                }
            }
            KeyCode::Up | KeyCode::BackTab => self.patient_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.patient_form_state.next_field(),
            KeyCode::Left => self.patient_form_state.cycle_choice(false),
            KeyCode::Right => self.patient_form_state.cycle_choice(true),
            KeyCode::Char('s') | KeyCode::Char('S') => self.patient_form_state.load_sample_data(),
            KeyCode::Char(c) => self.patient_form_state.input_char(c),
            KeyCode::Backspace => self.patient_form_state.delete_char(),
            KeyCode::Delete => self.patient_form_state.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_prescription_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('n') | KeyCode::Char('N') => {
                self.patient_form_state = PatientFormState::default();
                self.screen = Screen::PatientForm;
            }
            KeyCode::Char('t') | KeyCode::Char('T') => self.screen = Screen::Trajectory,
            KeyCode::Char('s') | KeyCode::Char('S') => self.start_simulation(),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.session.clear();
                tracing::info!("Session cleared");
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_trajectory_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('t') | KeyCode::Char('T') => {
                self.screen = Screen::Prescription;
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.start_simulation(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_error_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Enter | KeyCode::Esc => {
                self.session.dismiss_error();
                self.screen = if self.session.prescription().is_some() {
                    Screen::Prescription
                } else {
                    Screen::PatientForm
                };
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        if self.session.is_pending(RequestKind::Prescription) {
            tracing::debug!("Prescription already in flight; ignoring submit");
            return;
        }

        // Violations are kept on the form state for annotation.
        let Ok(patient) = self.patient_form_state.validate() else {
            return;
        };

        if let Err(e) = self.session.begin(RequestKind::Prescription) {
            tracing::debug!("{}", e);
            return;
        }

        let worker = EngineWorker::spawn_prescription(self.service.clone(), patient);
        self.prescription_worker = Some(worker);
        self.screen = Screen::Prescription;

        // Clear plaintext buffers from the UI immediately.
        self.patient_form_state.clear_sensitive();
    }

    fn start_simulation(&mut self) {
        let request = match self.session.simulation_request() {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!("{}", e);
                return;
            }
        };
        if let Err(e) = self.session.begin(RequestKind::Simulation) {
            tracing::debug!("{}", e);
            return;
        }

        let worker = EngineWorker::spawn_simulation(self.service.clone(), request);
        self.simulation_worker = Some(worker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::FakeEngine;

    fn app_with(engine: FakeEngine) -> (App<FakeEngine>, Arc<FakeEngine>) {
        let engine = Arc::new(engine);
        let app = App::with_service(PrescriptionService::new(Arc::clone(&engine)));
        (app, engine)
    }

    fn press(app: &mut App<FakeEngine>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    /// Poll until no request is in flight.
    fn settle(app: &mut App<FakeEngine>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.prescription_worker.is_some() || app.simulation_worker.is_some() {
            assert!(Instant::now() < deadline, "Worker did not finish");
            app.poll_workers();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_invalid_form_stays_on_form() {
        let (mut app, _) = app_with(FakeEngine::healthy());
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app.prescription_worker.is_none());
        assert!(!app.patient_form_state.violations.is_empty());
    }

    #[test]
    fn test_submit_prescribes_and_clears_form() {
        let (mut app, _) = app_with(FakeEngine::healthy());
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.screen, Screen::Prescription);
        assert!(app.session.is_pending(RequestKind::Prescription));
        assert!(app.patient_form_state.to_draft().numbers.is_empty());

        settle(&mut app);
        assert!(!app.session.is_pending(RequestKind::Prescription));
        let view = app.session.prescription().expect("Prescription should land");
        assert_eq!(view.snapshot.organs().len(), 4);
    }

    #[test]
    fn test_simulate_ignored_while_pending() {
        let (mut app, engine) = app_with(FakeEngine::healthy());
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('s'));
        settle(&mut app);

        let seen = engine.seen_simulations.lock().expect("Lock");
        assert_eq!(seen.len(), 1);
        assert!(app.session.simulation().is_some());
    }

    #[test]
    fn test_simulate_without_prescription_does_nothing() {
        let (mut app, _) = app_with(FakeEngine::healthy());
        app.screen = Screen::Prescription;
        press(&mut app, KeyCode::Char('s'));

        assert!(app.simulation_worker.is_none());
        assert!(!app.session.is_pending(RequestKind::Simulation));
    }

    #[test]
    fn test_engine_rejection_shows_error_screen() {
        let (mut app, _) =
            app_with(FakeEngine::rejecting("Clinical Validation Error: Invalid BP: 20"));
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        assert_eq!(app.screen, Screen::Error);
        assert_eq!(
            app.session.last_error(),
            Some("Clinical Validation Error: Invalid BP: 20")
        );

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::PatientForm);
        assert!(app.session.last_error().is_none());
    }

    #[test]
    fn test_navigation_between_screens() {
        let (mut app, _) = app_with(FakeEngine::healthy());
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Enter);
        settle(&mut app);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.screen, Screen::Trajectory);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Prescription);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.screen, Screen::PatientForm);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Prescription);

        press(&mut app, KeyCode::Char('c'));
        assert!(app.session.prescription().is_none());

        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }
}
