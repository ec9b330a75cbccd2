//! Colour palette and styles for the bedside display.
//!
//! Status colours follow the usual triage convention (green, amber, red)
//! and are the only saturated colours on screen, so an alert is never
//! confused with decoration.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::{Advisory, OrganStatus};

pub struct MedicalTheme;

impl MedicalTheme {
    /// Deep teal
    pub const PRIMARY: Color = Color::Rgb(13, 148, 136); // #0D9488
    pub const PRIMARY_LIGHT: Color = Color::Rgb(45, 212, 191); // #2DD4BF
    pub const PRIMARY_DARK: Color = Color::Rgb(15, 118, 110); // #0F766E

    pub const SECONDARY_LIGHT: Color = Color::Rgb(148, 163, 184); // #94A3B8

    pub const INFO: Color = Color::Rgb(59, 130, 246); // #3B82F6

    /// Drip chamber fluid
    pub const FLUID: Color = Color::Rgb(125, 211, 252); // #7DD3FC

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    pub const TEXT_PRIMARY: Color = Color::Rgb(248, 250, 252); // #F8FAFC
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    fn status_color(status: OrganStatus) -> Color {
        let (r, g, b) = status.color();
        Color::Rgb(r, g, b)
    }

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::status_color(OrganStatus::Ok))
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::status_color(OrganStatus::Warning))
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::status_color(OrganStatus::Danger))
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    #[must_use]
    pub fn fluid() -> Style {
        Style::default().fg(Self::FLUID).add_modifier(Modifier::BOLD)
    }

    /// Selected choice in a cycling field
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::SECONDARY_LIGHT)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    #[must_use]
    pub fn header() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Style for an organ status badge.
    #[must_use]
    pub fn organ_status(status: OrganStatus) -> Style {
        let style = Style::default().fg(Self::status_color(status));
        match status {
            OrganStatus::Ok => style,
            OrganStatus::Warning => style.add_modifier(Modifier::BOLD),
            OrganStatus::Danger => style.add_modifier(Modifier::BOLD | Modifier::REVERSED),
        }
    }

    /// Style for a raised safety flag.
    #[must_use]
    pub fn alert(stop_signal: bool) -> Style {
        if stop_signal {
            Self::danger().add_modifier(Modifier::BOLD)
        } else {
            Self::warning()
        }
    }

    #[must_use]
    pub fn advisory(advisory: Advisory) -> Style {
        if advisory.is_critical() {
            Self::danger().add_modifier(Modifier::BOLD)
        } else {
            Self::warning()
        }
    }
}

pub const LOGO_SMALL: &str = "PediaFlow";
