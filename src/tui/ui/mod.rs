//! UI module: View components for the TUI.

pub mod patient;
pub mod prescription;
pub mod trajectory;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::{MedicalTheme, LOGO_SMALL};

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(vec![
            Span::styled(LOGO_SMALL, MedicalTheme::subtitle()),
            Span::styled(
                " │ Decision support only. Confirm every rate and volume at the bedside.",
                MedicalTheme::text_muted(),
            ),
        ]),
        Line::from(vec![Span::styled(
            "Stop the infusion and reassess on crackles, hepatomegaly or a rising heart rate.",
            MedicalTheme::text_muted(),
        )]),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(MedicalTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}

/// Full-screen message for a failed engine request.
pub fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Engine request failed", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Enter/Esc] ", MedicalTheme::key_hint()),
            Span::styled("Dismiss ", MedicalTheme::key_desc()),
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}
