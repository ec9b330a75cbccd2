//! Patient data input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use zeroize::Zeroize;

use crate::domain::{
    ClinicalDiagnosis, FieldDomain, FieldViolation, IvSetType, OngoingLosses, PatientDraft,
    PatientInput, Sex, ValidationReport, FIELD_DOMAINS,
};
use crate::tui::styles::MedicalTheme;

const LABEL_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Vitals,
    Labs,
    Context,
}

impl FieldGroup {
    fn title(&self) -> &'static str {
        match self {
            Self::Vitals => " Vitals (required) ",
            Self::Labs => " Labs & History (optional) ",
            Self::Context => " Clinical Context ",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Numeric {
        domain: &'static FieldDomain,
        value: String,
    },
    /// `(wire value, label)` pairs; the wire value is what the validator sees.
    Choice {
        options: Vec<(&'static str, &'static str)>,
        index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub group: FieldGroup,
    pub kind: FieldKind,
}

impl FormField {
    fn numeric(domain: &'static FieldDomain) -> Self {
        Self {
            name: domain.name,
            label: domain.label,
            group: if domain.required {
                FieldGroup::Vitals
            } else {
                FieldGroup::Labs
            },
            kind: FieldKind::Numeric {
                domain,
                value: String::new(),
            },
        }
    }

    fn choice(
        name: &'static str,
        label: &'static str,
        group: FieldGroup,
        options: Vec<(&'static str, &'static str)>,
        index: usize,
    ) -> Self {
        Self {
            name,
            label,
            group,
            kind: FieldKind::Choice { options, index },
        }
    }

    /// Text shown in the value column.
    fn display(&self) -> &str {
        match &self.kind {
            FieldKind::Numeric { value, .. } => value.as_str(),
            FieldKind::Choice { options, index } => {
                options.get(*index).map(|(_, label)| *label).unwrap_or("")
            }
        }
    }

    fn wire_choice(&self) -> &'static str {
        match &self.kind {
            FieldKind::Choice { options, index } => {
                options.get(*index).map(|(wire, _)| *wire).unwrap_or("")
            }
            FieldKind::Numeric { .. } => "",
        }
    }

    fn hint(&self) -> String {
        match &self.kind {
            FieldKind::Numeric { domain, .. } => domain.hint(),
            FieldKind::Choice { .. } => "◀ ▶ to change".to_string(),
        }
    }
}

fn default_fields() -> Vec<FormField> {
    let (required, optional): (Vec<_>, Vec<_>) =
        FIELD_DOMAINS.iter().partition(|domain| domain.required);

    let mut sex_options = vec![("", "Select…")];
    sex_options.extend(Sex::ALL.iter().map(|s| (s.wire_value(), s.label())));

    let diagnosis_options: Vec<_> = ClinicalDiagnosis::ALL
        .iter()
        .map(|d| (d.wire_value(), d.label()))
        .collect();
    let iv_options: Vec<_> = IvSetType::ALL
        .iter()
        .map(|s| (s.wire_value(), s.label()))
        .collect();
    let loss_options: Vec<_> = OngoingLosses::ALL
        .iter()
        .map(|l| (l.wire_value(), l.label()))
        .collect();

    let default_index = |options: &[(&str, &str)], wire: &str| {
        options.iter().position(|(w, _)| *w == wire).unwrap_or(0)
    };
    let diagnosis_index =
        default_index(&diagnosis_options, ClinicalDiagnosis::default().wire_value());
    let iv_index = default_index(&iv_options, IvSetType::default().wire_value());
    let loss_index = default_index(&loss_options, OngoingLosses::default().wire_value());

    let mut fields: Vec<FormField> = required.into_iter().map(FormField::numeric).collect();
    fields.push(FormField::choice("sex", "Sex", FieldGroup::Vitals, sex_options, 0));
    fields.extend(optional.into_iter().map(FormField::numeric));
    fields.push(FormField::choice(
        "diagnosis",
        "Diagnosis",
        FieldGroup::Context,
        diagnosis_options,
        diagnosis_index,
    ));
    fields.push(FormField::choice(
        "iv_set_available",
        "IV Set",
        FieldGroup::Context,
        iv_options,
        iv_index,
    ));
    fields.push(FormField::choice(
        "ongoing_losses_severity",
        "Ongoing Losses",
        FieldGroup::Context,
        loss_options,
        loss_index,
    ));
    fields.push(FormField::choice(
        "baseline_hepatomegaly",
        "Hepatomegaly",
        FieldGroup::Context,
        vec![("false", "No"), ("true", "Yes")],
        0,
    ));
    fields
}

/// Patient form state
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    pub violations: Vec<FieldViolation>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            selected_field: 0,
            error_message: None,
            violations: Vec::new(),
        }
    }
}

impl PatientFormState {
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let FieldKind::Numeric { value, .. } = &mut self.fields[self.selected_field].kind {
            if c.is_ascii_digit() || c == '.' || c == '-' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldKind::Numeric { value, .. } = &mut self.fields[self.selected_field].kind {
            value.pop();
        }
    }

    pub fn clear_field(&mut self) {
        if let FieldKind::Numeric { value, .. } = &mut self.fields[self.selected_field].kind {
            value.zeroize();
        }
    }

    /// Step the current choice field forwards or backwards.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldKind::Choice { options, index } = &mut self.fields[self.selected_field].kind {
            let len = options.len();
            if len == 0 {
                return;
            }
            *index = if forward {
                (*index + 1) % len
            } else {
                (*index + len - 1) % len
            };
            self.error_message = None;
        }
    }

    /// Wipe all field buffers from memory and reset choices.
    ///
    /// Called right after a submission is handed to the worker so plaintext
    /// vitals do not persist in the UI state.
    pub fn clear_sensitive(&mut self) {
        for field in self.fields.iter_mut() {
            if let FieldKind::Numeric { value, .. } = &mut field.kind {
                value.zeroize();
            }
        }
        let selected = self.selected_field;
        *self = Self::default();
        self.selected_field = selected.min(self.fields.len() - 1);
    }

    /// Unvalidated record as typed.
    ///
    /// Blank numeric fields are absent; text that does not parse is passed
    /// on as NaN so the validator can report or drop it.
    #[must_use]
    pub fn to_draft(&self) -> PatientDraft {
        let mut draft = PatientDraft::default();
        for field in &self.fields {
            match (&field.kind, field.name) {
                (FieldKind::Numeric { value, .. }, name) => {
                    let text = value.trim();
                    if !text.is_empty() {
                        draft.set(name, text.parse::<f64>().unwrap_or(f64::NAN));
                    }
                }
                (FieldKind::Choice { .. }, "sex") => draft.sex = field.wire_choice().to_string(),
                (FieldKind::Choice { .. }, "diagnosis") => {
                    draft.diagnosis = field.wire_choice().to_string();
                }
                (FieldKind::Choice { .. }, "iv_set_available") => {
                    draft.iv_set = field.wire_choice().to_string();
                }
                (FieldKind::Choice { .. }, "ongoing_losses_severity") => {
                    draft.ongoing_losses = field.wire_choice().to_string();
                }
                (FieldKind::Choice { .. }, "baseline_hepatomegaly") => {
                    draft.baseline_hepatomegaly = field.wire_choice() == "true";
                }
                (FieldKind::Choice { .. }, _) => {}
            }
        }
        draft
    }

    /// Validate the form, keeping every violation for annotation.
    ///
    /// # Errors
    /// Returns the validation report when any field is out of its domain.
    pub fn validate(&mut self) -> Result<PatientInput, ValidationReport> {
        match self.to_draft().validate() {
            Ok(input) => {
                self.violations.clear();
                self.error_message = None;
                Ok(input)
            }
            Err(report) => {
                self.violations = report.violations.clone();
                self.error_message = Some(format!(
                    "{} field(s) need attention: {}",
                    report.violations.len(),
                    report.fields().join(", ")
                ));
                Err(report)
            }
        }
    }

    fn violation_for(&self, name: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == name)
    }

    fn set_text(&mut self, name: &str, text: &str) {
        if let Some(FieldKind::Numeric { value, .. }) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.kind)
        {
            value.zeroize();
            value.push_str(text);
        }
    }

    fn set_choice(&mut self, name: &str, wire: &str) {
        if let Some(FieldKind::Choice { options, index }) = self
            .fields
            .iter_mut()
            .find(|f| f.name == name)
            .map(|f| &mut f.kind)
        {
            if let Some(pos) = options.iter().position(|(w, _)| *w == wire) {
                *index = pos;
            }
        }
    }

    /// Load sample data (2-year-old in septic shock)
    pub fn load_sample_data(&mut self) {
        let sample = [
            ("age_months", "24"),
            ("weight_kg", "12"),
            ("muac_cm", "14.5"),
            ("temp_celsius", "38.9"),
            ("systolic_bp", "78"),
            ("heart_rate", "165"),
            ("respiratory_rate_bpm", "42"),
            ("sp_o2_percent", "95"),
            ("capillary_refill_sec", "4"),
            ("hemoglobin_g_dl", "10.5"),
            ("diastolic_bp", "42"),
            ("current_sodium", "134"),
            ("current_glucose", "92"),
            ("lactate_mmol_l", "4.2"),
            ("time_since_last_urine_hours", "8"),
        ];
        for (name, text) in sample {
            self.set_text(name, text);
        }
        self.set_choice("sex", Sex::Female.wire_value());
        self.set_choice("diagnosis", ClinicalDiagnosis::SepticShock.wire_value());
        self.set_choice("iv_set_available", IvSetType::MicroDrip.wire_value());
        self.set_choice("ongoing_losses_severity", OngoingLosses::None.wire_value());
        self.violations.clear();
        self.error_message = None;
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Patient Assessment", MedicalTheme::title()),
        Span::styled(
            " │ Pediatric fluid resuscitation",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(36),
            Constraint::Percentage(36),
            Constraint::Percentage(28),
        ])
        .split(area);

    for (column, group) in columns
        .iter()
        .zip([FieldGroup::Vitals, FieldGroup::Labs, FieldGroup::Context])
    {
        render_field_group(f, *column, state, group);
    }
}

fn render_field_group(f: &mut Frame, area: Rect, state: &PatientFormState, group: FieldGroup) {
    let has_focus = state
        .fields
        .get(state.selected_field)
        .is_some_and(|field| field.group == group);

    let lines: Vec<Line> = state
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.group == group)
        .flat_map(|(i, field)| field_lines(field, i == state.selected_field, state))
        .collect();

    let block = Block::default()
        .title(Span::styled(group.title(), MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(if has_focus {
            MedicalTheme::border_focused()
        } else {
            MedicalTheme::border()
        });

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn field_lines<'a>(
    field: &'a FormField,
    is_selected: bool,
    state: &'a PatientFormState,
) -> Vec<Line<'a>> {
    let violation = state.violation_for(field.name);

    let marker = if is_selected { "▶ " } else { "  " };
    let label_style = match (violation.is_some(), is_selected) {
        (true, _) => MedicalTheme::danger(),
        (false, true) => MedicalTheme::focused(),
        (false, false) => MedicalTheme::text_secondary(),
    };

    let value = field.display();
    let value_span = match (&field.kind, value.is_empty()) {
        (FieldKind::Numeric { .. }, true) => Span::styled(field.hint(), MedicalTheme::text_muted()),
        (FieldKind::Choice { .. }, _) if is_selected => {
            Span::styled(format!("◀ {value} ▶"), MedicalTheme::selected())
        }
        _ => Span::styled(value, MedicalTheme::text()),
    };

    let mut line = vec![
        Span::styled(marker, MedicalTheme::focused()),
        Span::styled(format!("{:<LABEL_WIDTH$}", field.label), label_style),
        value_span,
    ];
    if is_selected && matches!(field.kind, FieldKind::Numeric { .. }) {
        line.push(Span::styled("▌", MedicalTheme::focused()));
    }

    let mut lines = vec![Line::from(line)];
    if let Some(v) = violation {
        lines.push(Line::from(Span::styled(
            format!("    {}", v.kind),
            MedicalTheme::danger(),
        )));
    }
    lines
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓/Tab] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Change ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Prescribe ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample Data ", MedicalTheme::key_desc()),
            Span::styled("[Del] ", MedicalTheme::key_hint()),
            Span::styled("Clear Field ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

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
    use crate::domain::ViolationKind;

    fn select(state: &mut PatientFormState, name: &str) {
        state.selected_field = state
            .fields
            .iter()
            .position(|f| f.name == name)
            .expect("Field should exist");
    }

    #[test]
    fn test_form_covers_every_domain() {
        let state = PatientFormState::default();
        for domain in FIELD_DOMAINS.iter() {
            assert!(state.fields.iter().any(|f| f.name == domain.name));
        }
        assert_eq!(state.fields.len(), FIELD_DOMAINS.len() + 5);
    }

    #[test]
    fn test_sample_data_validates() {
        let mut state = PatientFormState::default();
        state.load_sample_data();

        let input = state.validate().expect("Sample should validate");
        assert_eq!(input.sex, Sex::Female);
        assert_eq!(input.diagnosis, ClinicalDiagnosis::SepticShock);
        assert_eq!(input.diastolic_bp, Some(42));
        assert!(input.height_cm.is_none());
        assert!(state.violations.is_empty());
    }

    #[test]
    fn test_empty_form_reports_every_required_field() {
        let mut state = PatientFormState::default();
        let report = state.validate().expect_err("Empty form should fail");

        // Ten required numbers plus sex.
        assert_eq!(report.violations.len(), 11);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::Missing));
        assert!(state.error_message.is_some());
        assert!(state.violation_for("sex").is_some());
    }

    #[test]
    fn test_unparseable_optional_is_dropped() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        select(&mut state, "height_cm");
        state.input_char('-');
        state.input_char('.');

        let input = state.validate().expect("Garbage optional should be dropped");
        assert!(input.height_cm.is_none());
    }

    #[test]
    fn test_out_of_range_is_annotated() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        select(&mut state, "sp_o2_percent");
        state.clear_field();
        for c in "120".chars() {
            state.input_char(c);
        }

        let report = state.validate().expect_err("SpO2 120 should fail");
        assert_eq!(report.fields(), vec!["sp_o2_percent"]);
        assert!(state.violation_for("sp_o2_percent").is_some());
    }

    #[test]
    fn test_choice_cycling_wraps() {
        let mut state = PatientFormState::default();
        select(&mut state, "baseline_hepatomegaly");
        state.cycle_choice(true);
        assert!(state.to_draft().baseline_hepatomegaly);
        state.cycle_choice(true);
        assert!(!state.to_draft().baseline_hepatomegaly);
        state.cycle_choice(false);
        assert!(state.to_draft().baseline_hepatomegaly);
    }

    #[test]
    fn test_letters_ignored_in_numeric_fields() {
        let mut state = PatientFormState::default();
        state.input_char('x');
        state.input_char('7');
        assert_eq!(state.fields[0].display(), "7");
    }

    #[test]
    fn test_clear_sensitive_wipes_values() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        state.clear_sensitive();

        assert!(state.to_draft().numbers.is_empty());
        assert!(state.to_draft().sex.is_empty());
    }
}
