//! Prescription view: pump settings, organ status and the drip indicator.

use std::time::Duration;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::{PrescriptionView, SimulationView};
use crate::domain::{CompartmentSnapshot, DripPacing, SnapshotSource};
use crate::tui::styles::MedicalTheme;

/// Rows in the drawn drip chamber.
const CHAMBER_ROWS: usize = 6;

/// Everything the prescription screen shows.
pub struct PrescriptionScreen<'a> {
    pub view: Option<&'a PrescriptionView>,
    pub simulation: Option<&'a SimulationView>,
    pub prescription_pending: bool,
    pub simulation_pending: bool,
    /// Time since the view was loaded; drives the drip animation
    pub elapsed: Duration,
}

pub fn render_prescription(f: &mut Frame, area: Rect, screen: &PrescriptionScreen<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], screen.view);
    match screen.view {
        Some(view) => render_content(f, chunks[1], view, screen),
        None => render_waiting(f, chunks[1], screen.prescription_pending),
    }
    render_footer(f, chunks[2], screen);
}

fn render_header(f: &mut Frame, area: Rect, view: Option<&PrescriptionView>) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prescription", MedicalTheme::title()),
    ];
    if let Some(view) = view {
        let r = &view.response;
        spans.push(Span::styled(
            format!(
                " │ {} {} mL over {} min",
                r.recommended_fluid.label(),
                r.bolus_volume_ml,
                r.infusion_duration_min
            ),
            MedicalTheme::text_secondary(),
        ));
        if let Some(at) = r.generated_at {
            spans.push(Span::styled(
                format!(" │ {}", at.format("%Y-%m-%d %H:%M:%S")),
                MedicalTheme::text_muted(),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, area);
}

fn render_waiting(f: &mut Frame, area: Rect, pending: bool) {
    let message = if pending {
        "Waiting for the engine..."
    } else {
        "No prescription loaded"
    };
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled(
            "Press [N] to enter a patient",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(content, area);
}

fn render_content(f: &mut Frame, area: Rect, view: &PrescriptionView, screen: &PrescriptionScreen) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[0]);

    render_pump(f, columns[0], view);

    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(CHAMBER_ROWS as u16 + 4)])
        .split(columns[1]);
    let snapshot = screen
        .simulation
        .map(|s| &s.snapshot)
        .unwrap_or(&view.snapshot);
    render_organs(f, middle[0], snapshot, screen.simulation.is_some());
    render_drip(f, middle[1], &view.pacing, screen.elapsed);

    render_alerts(f, columns[2], view, screen.simulation, screen.simulation_pending);
    render_summary(f, rows[1], &view.response.human_readable_summary);
}

fn labelled(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {label:<18}"), MedicalTheme::text_secondary()),
        Span::styled(value, MedicalTheme::text()),
    ])
}

fn render_pump(f: &mut Frame, area: Rect, view: &PrescriptionView) {
    let r = &view.response;
    let lines = vec![
        Line::from(Span::styled(" Pump", MedicalTheme::subtitle())),
        labelled("Flow rate", format!("{} mL/h", r.flow_rate_ml_hr)),
        labelled("Drops", format!("{} /min", view.pacing.label())),
        labelled("Seconds per drop", format!("{:.1} s", r.seconds_per_drop)),
        labelled("IV set", r.iv_set_used.clone()),
        Line::from(""),
        Line::from(Span::styled(" Safety ceilings", MedicalTheme::subtitle())),
        labelled("Max rate", format!("{} mL/h", r.max_safe_infusion_rate_ml_hr)),
        labelled("Max bolus", format!("{} mL", r.max_allowed_bolus_volume_ml)),
        Line::from(""),
        Line::from(Span::styled(" Stop if", MedicalTheme::subtitle())),
        labelled("Heart rate >", format!("{} bpm", r.stop_trigger_heart_rate)),
        labelled("Resp. rate >", format!("{} /min", r.stop_trigger_respiratory_rate)),
        labelled("Expected BP rise", format!("{:+} mmHg", r.predicted_bp_rise)),
    ];

    let block = Block::default()
        .title(Span::styled(" Infusion ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_organs(f: &mut Frame, area: Rect, snapshot: &CompartmentSnapshot, simulated: bool) {
    let mut lines: Vec<Line> = snapshot
        .organs()
        .iter()
        .map(|(organ, status)| {
            Line::from(vec![
                Span::styled(format!("  {:<8}", organ.label()), MedicalTheme::text()),
                Span::styled(format!(" {status} "), MedicalTheme::organ_status(*status)),
                Span::styled(format!("  {}", status.description()), MedicalTheme::text_muted()),
            ])
        })
        .collect();

    lines.push(Line::from(""));
    lines.push(labelled("MAP", format!("{:.0} mmHg", snapshot.map_mmhg)));
    lines.push(labelled("Lung water", format!("{:.2}", snapshot.lung_water)));
    if let Some(leak) = snapshot.leak_rate {
        lines.push(labelled("Leak rate", format!("{leak:.2}")));
    }
    if let Some(hct) = snapshot.hematocrit {
        lines.push(labelled("Hematocrit", format!("{hct:.1} %")));
    }
    if snapshot.source == SnapshotSource::AlertFallback {
        lines.push(Line::from(Span::styled(
            "  Engine halted before simulating",
            MedicalTheme::warning(),
        )));
    }

    let title = if simulated {
        " Compartments (simulated) "
    } else {
        " Compartments "
    };
    let block = Block::default()
        .title(Span::styled(title, MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::organ_status(snapshot.worst()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

/// Row of the falling drop in a chamber of `rows` rows, if one is visible.
fn drop_row(pacing: &DripPacing, elapsed: Duration, rows: usize) -> Option<usize> {
    let phase = pacing.pulse_phase(elapsed)?;
    Some(((phase * rows as f64) as usize).min(rows.saturating_sub(1)))
}

fn render_drip(f: &mut Frame, area: Rect, pacing: &DripPacing, elapsed: Duration) {
    let falling = drop_row(pacing, elapsed, CHAMBER_ROWS);

    let mut lines = vec![Line::from(Span::styled("▀▀▀", MedicalTheme::border()))];
    for row in 0..CHAMBER_ROWS {
        let cell = match pacing {
            DripPacing::ContinuousStream { .. } => Span::styled(" ┃ ", MedicalTheme::fluid()),
            DripPacing::Discrete { .. } if falling == Some(row) => {
                Span::styled(" ● ", MedicalTheme::fluid())
            }
            _ => Span::raw("   "),
        };
        lines.push(Line::from(cell));
    }
    lines.push(Line::from(Span::styled(
        format!("{} gtt/min", pacing.label()),
        MedicalTheme::text_secondary(),
    )));

    let block = Block::default()
        .title(Span::styled(" Drip ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block),
        area,
    );
}

fn render_alerts(
    f: &mut Frame,
    area: Rect,
    view: &PrescriptionView,
    simulation: Option<&SimulationView>,
    simulation_pending: bool,
) {
    let mut lines = Vec::new();

    let active = view.response.alerts.active();
    if active.is_empty() {
        lines.push(Line::from(Span::styled("  No safety flags", MedicalTheme::success())));
    }
    for flag in active {
        lines.push(Line::from(Span::styled(
            format!("  ■ {}", flag.label()),
            MedicalTheme::alert(flag.is_stop_signal()),
        )));
    }

    if !view.advisories.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(" Advisories", MedicalTheme::subtitle())));
        for advisory in &view.advisories {
            lines.push(Line::from(Span::styled(
                format!("  • {advisory}"),
                MedicalTheme::advisory(*advisory),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Simulation", MedicalTheme::subtitle())));
    match (simulation, simulation_pending) {
        (_, true) => lines.push(Line::from(Span::styled(
            "  Running...",
            MedicalTheme::text_muted(),
        ))),
        (Some(sim), false) => {
            let summary = &sim.response.summary;
            lines.push(labelled(
                "Systolic BP",
                format!("{} → {} ({:+})", summary.bp_start, summary.bp_end, sim.bp_delta()),
            ));
            for message in &summary.safety_alerts {
                lines.push(Line::from(Span::styled(
                    format!("  ! {message}"),
                    MedicalTheme::warning(),
                )));
            }
        }
        (None, false) => lines.push(Line::from(Span::styled(
            "  Press [S] to simulate this bolus",
            MedicalTheme::text_muted(),
        ))),
    }

    let block = Block::default()
        .title(Span::styled(" Alerts ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if view.response.alerts.any() {
            MedicalTheme::danger()
        } else {
            MedicalTheme::border()
        });
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

fn render_summary(f: &mut Frame, area: Rect, summary: &str) {
    let block = Block::default()
        .title(Span::styled(" Summary ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    let text = if summary.trim().is_empty() {
        Span::styled("No summary provided", MedicalTheme::text_muted())
    } else {
        Span::styled(summary, MedicalTheme::text())
    };
    f.render_widget(
        Paragraph::new(Line::from(text))
            .wrap(Wrap { trim: true })
            .block(block),
        area,
    );
}

fn render_footer(f: &mut Frame, area: Rect, screen: &PrescriptionScreen) {
    let content = Line::from(vec![
        Span::styled("[S] ", MedicalTheme::key_hint()),
        Span::styled(
            if screen.simulation_pending {
                "Simulating... "
            } else {
                "Simulate "
            },
            MedicalTheme::key_desc(),
        ),
        Span::styled("[T] ", MedicalTheme::key_hint()),
        Span::styled("Trajectory ", MedicalTheme::key_desc()),
        Span::styled("[N] ", MedicalTheme::key_hint()),
        Span::styled("New Patient ", MedicalTheme::key_desc()),
        Span::styled("[C] ", MedicalTheme::key_hint()),
        Span::styled("Clear ", MedicalTheme::key_desc()),
        Span::styled("[Q] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_falls_through_chamber() {
        let pacing = DripPacing::from_rate(20.0);
        assert_eq!(drop_row(&pacing, Duration::ZERO, CHAMBER_ROWS), Some(0));
        assert_eq!(
            drop_row(&pacing, Duration::from_millis(590), CHAMBER_ROWS),
            Some(CHAMBER_ROWS - 1)
        );
        // Resting between drops.
        assert_eq!(drop_row(&pacing, Duration::from_secs(2), CHAMBER_ROWS), None);
    }

    #[test]
    fn test_no_drop_for_stream_or_halt() {
        let stream = DripPacing::from_rate(240.0);
        assert_eq!(drop_row(&stream, Duration::ZERO, CHAMBER_ROWS), None);
        assert_eq!(drop_row(&DripPacing::Halted, Duration::ZERO, CHAMBER_ROWS), None);
    }
}
