//! Trajectory charts: lung water against the edema threshold, and MAP.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::application::{PrescriptionView, SimulationView};
use crate::domain::{chart, TrajectoryPoint, EDEMA_LUNG_WATER_THRESHOLD};
use crate::tui::styles::MedicalTheme;

/// Series plotted on both charts: `(x, y)` pairs per source.
struct Series {
    predicted: Vec<(f64, f64)>,
    simulated: Vec<(f64, f64)>,
}

impl Series {
    fn collect(
        predicted: &[TrajectoryPoint],
        simulated: &[TrajectoryPoint],
        y: fn(&TrajectoryPoint) -> f64,
    ) -> Self {
        Self {
            predicted: predicted.iter().map(|p| (p.time, y(p))).collect(),
            simulated: simulated.iter().map(|p| (p.time, y(p))).collect(),
        }
    }
}

pub fn render_trajectory(
    f: &mut Frame,
    area: Rect,
    view: Option<&PrescriptionView>,
    simulation: Option<&SimulationView>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Charts
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0], simulation.is_some());

    match view {
        Some(view) if !view.response.trajectory.is_empty() || simulation.is_some() => {
            render_charts(f, chunks[1], view, simulation);
        }
        Some(_) => render_empty(f, chunks[1], "Engine returned no trajectory"),
        None => render_empty(f, chunks[1], "No prescription loaded"),
    }

    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, simulated: bool) {
    let mut spans = vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Predicted Trajectory", MedicalTheme::title()),
    ];
    if simulated {
        spans.push(Span::styled(" │ ", MedicalTheme::text_secondary()));
        spans.push(Span::styled("── predicted", MedicalTheme::info()));
        spans.push(Span::styled("  ── simulated", MedicalTheme::warning()));
    }
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text_secondary())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    );
    f.render_widget(content, area);
}

fn axis_labels(bounds: [f64; 2], precision: usize) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{v:.precision$}"))
        .collect()
}

fn datasets<'a>(series: &'a Series) -> Vec<Dataset<'a>> {
    let mut out = vec![Dataset::default()
        .name("predicted")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(MedicalTheme::info())
        .data(&series.predicted)];
    if !series.simulated.is_empty() {
        out.push(
            Dataset::default()
                .name("simulated")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(MedicalTheme::warning())
                .data(&series.simulated),
        );
    }
    out
}

fn render_charts(
    f: &mut Frame,
    area: Rect,
    view: &PrescriptionView,
    simulation: Option<&SimulationView>,
) {
    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let predicted = view.response.trajectory.as_slice();
    let simulated = simulation.map_or(&[][..], |s| s.response.graph_data.as_slice());
    let combined: Vec<TrajectoryPoint> = predicted.iter().chain(simulated).cloned().collect();

    let mut time = chart::time_bounds(predicted);
    let sim_time = chart::time_bounds(simulated);
    if !simulated.is_empty() {
        time = [time[0].min(sim_time[0]), time[1].max(sim_time[1])];
    }

    // Lung water, with the edema threshold drawn across the whole window.
    let lung_max = simulation.map_or(view.lung_water_axis_max, |s| {
        s.lung_water_axis_max.max(view.lung_water_axis_max)
    });
    let lung = Series::collect(predicted, simulated, |p| p.lung_water);
    let threshold = [
        (time[0], EDEMA_LUNG_WATER_THRESHOLD),
        (time[1], EDEMA_LUNG_WATER_THRESHOLD),
    ];
    let mut lung_sets = datasets(&lung);
    lung_sets.push(
        Dataset::default()
            .name("edema threshold")
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(MedicalTheme::danger())
            .data(&threshold),
    );

    let lung_chart = Chart::new(lung_sets)
        .block(
            Block::default()
                .title(Span::styled(" Lung Water ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("min", MedicalTheme::text_muted()))
                .style(MedicalTheme::text_secondary())
                .bounds(time)
                .labels(axis_labels(time, 0)),
        )
        .y_axis(
            Axis::default()
                .style(MedicalTheme::text_secondary())
                .bounds([0.0, lung_max])
                .labels(axis_labels([0.0, lung_max], 1)),
        );
    f.render_widget(lung_chart, halves[0]);

    let map = Series::collect(predicted, simulated, |p| p.map);
    let map_bounds = chart::map_bounds(&combined);
    let map_chart = Chart::new(datasets(&map))
        .block(
            Block::default()
                .title(Span::styled(" Mean Arterial Pressure ", MedicalTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("min", MedicalTheme::text_muted()))
                .style(MedicalTheme::text_secondary())
                .bounds(time)
                .labels(axis_labels(time, 0)),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("mmHg", MedicalTheme::text_muted()))
                .style(MedicalTheme::text_secondary())
                .bounds(map_bounds)
                .labels(axis_labels(map_bounds, 0)),
        );
    f.render_widget(map_chart, halves[1]);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Back ", MedicalTheme::key_desc()),
        Span::styled("[S] ", MedicalTheme::key_hint()),
        Span::styled("Simulate ", MedicalTheme::key_desc()),
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
    fn test_axis_labels_span_bounds() {
        assert_eq!(axis_labels([0.0, 6.0], 1), vec!["0.0", "3.0", "6.0"]);
        assert_eq!(axis_labels([50.0, 90.0], 0), vec!["50", "70", "90"]);
    }

    #[test]
    fn test_series_follow_selected_field() {
        let predicted = vec![TrajectoryPoint::at(0.0, 60.0, 1.0)];
        let simulated = vec![
            TrajectoryPoint::at(0.0, 61.0, 2.0),
            TrajectoryPoint::at(5.0, 66.0, 5.5),
        ];
        let series = Series::collect(&predicted, &simulated, |p| p.lung_water);
        assert_eq!(series.predicted, vec![(0.0, 1.0)]);
        assert_eq!(series.simulated, vec![(0.0, 2.0), (5.0, 5.5)]);
    }
}
