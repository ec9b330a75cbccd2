//! Safety alert flags and the free-text alert normalizer.
//!
//! The prescription endpoint reports alerts as a fixed record of booleans,
//! while the simulation endpoint reports them as free-text phrases. The
//! normalizer reconciles the two by keyword containment against a trigger
//! table, evaluated independently per flag.

use serde::{Deserialize, Serialize};

/// Fixed-shape record of the engine's nine safety flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyAlerts {
    pub risk_pulmonary_edema: bool,
    pub risk_volume_overload: bool,
    pub risk_cerebral_edema: bool,
    pub risk_hypoglycemia: bool,
    pub hydrocortisone_needed: bool,
    pub risk_ketoacidosis: bool,
    pub sam_heart_warning: bool,
    pub anemia_dilution_warning: bool,
    pub dengue_leak_warning: bool,
}

/// Names one of the nine flags in `SafetyAlerts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AlertFlag {
    PulmonaryEdema,
    VolumeOverload,
    CerebralEdema,
    Hypoglycemia,
    HydrocortisoneNeeded,
    Ketoacidosis,
    SamHeart,
    AnemiaDilution,
    DengueLeak,
}

impl AlertFlag {
    pub const ALL: [Self; 9] = [
        Self::PulmonaryEdema,
        Self::VolumeOverload,
        Self::CerebralEdema,
        Self::Hypoglycemia,
        Self::HydrocortisoneNeeded,
        Self::Ketoacidosis,
        Self::SamHeart,
        Self::AnemiaDilution,
        Self::DengueLeak,
    ];

    /// Short banner text for the TUI.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PulmonaryEdema => "Pulmonary edema risk",
            Self::VolumeOverload => "Volume overload",
            Self::CerebralEdema => "Cerebral edema risk",
            Self::Hypoglycemia => "Hypoglycemia risk",
            Self::HydrocortisoneNeeded => "Consider hydrocortisone",
            Self::Ketoacidosis => "Ketoacidosis risk",
            Self::SamHeart => "Weak heart (SAM): rate limited",
            Self::AnemiaDilution => "Hemodilution: consider blood",
            Self::DengueLeak => "Active capillary leak",
        }
    }

    /// Whether the flag calls for stopping the infusion rather than watching.
    #[must_use]
    pub fn is_stop_signal(&self) -> bool {
        matches!(
            self,
            Self::PulmonaryEdema | Self::CerebralEdema | Self::AnemiaDilution
        )
    }
}

impl SafetyAlerts {
    #[must_use]
    pub fn is_set(&self, flag: AlertFlag) -> bool {
        match flag {
            AlertFlag::PulmonaryEdema => self.risk_pulmonary_edema,
            AlertFlag::VolumeOverload => self.risk_volume_overload,
            AlertFlag::CerebralEdema => self.risk_cerebral_edema,
            AlertFlag::Hypoglycemia => self.risk_hypoglycemia,
            AlertFlag::HydrocortisoneNeeded => self.hydrocortisone_needed,
            AlertFlag::Ketoacidosis => self.risk_ketoacidosis,
            AlertFlag::SamHeart => self.sam_heart_warning,
            AlertFlag::AnemiaDilution => self.anemia_dilution_warning,
            AlertFlag::DengueLeak => self.dengue_leak_warning,
        }
    }

    pub fn set(&mut self, flag: AlertFlag, value: bool) {
        let slot = match flag {
            AlertFlag::PulmonaryEdema => &mut self.risk_pulmonary_edema,
            AlertFlag::VolumeOverload => &mut self.risk_volume_overload,
            AlertFlag::CerebralEdema => &mut self.risk_cerebral_edema,
            AlertFlag::Hypoglycemia => &mut self.risk_hypoglycemia,
            AlertFlag::HydrocortisoneNeeded => &mut self.hydrocortisone_needed,
            AlertFlag::Ketoacidosis => &mut self.risk_ketoacidosis,
            AlertFlag::SamHeart => &mut self.sam_heart_warning,
            AlertFlag::AnemiaDilution => &mut self.anemia_dilution_warning,
            AlertFlag::DengueLeak => &mut self.dengue_leak_warning,
        };
        *slot = value;
    }

    /// Flags currently raised, in declaration order.
    #[must_use]
    pub fn active(&self) -> Vec<AlertFlag> {
        AlertFlag::ALL
            .into_iter()
            .filter(|f| self.is_set(*f))
            .collect()
    }

    #[must_use]
    pub fn any(&self) -> bool {
        AlertFlag::ALL.iter().any(|f| self.is_set(*f))
    }

    /// Normalize free-text alerts with the default trigger vocabulary.
    #[must_use]
    pub fn from_messages<S: AsRef<str>>(messages: &[S]) -> Self {
        AlertVocabulary::default().normalize(messages)
    }
}

/// Default lowercase trigger substrings per flag.
pub const DEFAULT_TRIGGERS: [(AlertFlag, &[&str]); 9] = [
    (AlertFlag::PulmonaryEdema, &["pulmonary", "lung"]),
    (AlertFlag::VolumeOverload, &["volume", "overload"]),
    (AlertFlag::CerebralEdema, &["cerebral", "brain"]),
    (AlertFlag::Hypoglycemia, &["hypoglyc"]),
    (AlertFlag::HydrocortisoneNeeded, &["hydrocortisone", "steroid"]),
    (AlertFlag::Ketoacidosis, &["ketoacidosis", "ketosis"]),
    (AlertFlag::SamHeart, &["sam heart", "weak heart", "heart failure"]),
    (AlertFlag::AnemiaDilution, &["hemodilution", "anemia", "anaemia", "need blood"]),
    (AlertFlag::DengueLeak, &["dengue", "capillary leak"]),
];

/// Trigger table mapping each flag to the substrings that raise it.
#[derive(Debug, Clone)]
pub struct AlertVocabulary {
    triggers: Vec<(AlertFlag, Vec<String>)>,
}

impl Default for AlertVocabulary {
    fn default() -> Self {
        Self {
            triggers: DEFAULT_TRIGGERS
                .iter()
                .map(|(flag, tokens)| (*flag, tokens.iter().map(|t| t.to_string()).collect()))
                .collect(),
        }
    }
}

impl AlertVocabulary {
    /// Add a trigger substring for a flag. Matching is case-insensitive.
    #[must_use]
    pub fn with_trigger(mut self, flag: AlertFlag, token: &str) -> Self {
        let token = token.to_lowercase();
        match self.triggers.iter_mut().find(|(f, _)| *f == flag) {
            Some((_, tokens)) => tokens.push(token),
            None => self.triggers.push((flag, vec![token])),
        }
        self
    }

    /// Trigger substrings registered for a flag.
    #[must_use]
    pub fn triggers(&self, flag: AlertFlag) -> &[String] {
        self.triggers
            .iter()
            .find(|(f, _)| *f == flag)
            .map(|(_, tokens)| tokens.as_slice())
            .unwrap_or(&[])
    }

    /// Reduce free-text alerts to a `SafetyAlerts` record.
    ///
    /// A flag is raised iff the lowercase corpus contains any of its
    /// triggers. Flags are not mutually exclusive.
    #[must_use]
    pub fn normalize<S: AsRef<str>>(&self, messages: &[S]) -> SafetyAlerts {
        // Newline-joined so a token never spans two messages.
        let corpus = messages
            .iter()
            .map(|m| m.as_ref().to_lowercase())
            .collect::<Vec<_>>()
            .join("\n");

        let mut alerts = SafetyAlerts::default();
        if corpus.is_empty() {
            return alerts;
        }

        for (flag, tokens) in &self.triggers {
            if tokens.iter().any(|t| corpus.contains(t.as_str())) {
                alerts.set(*flag, true);
            }
        }

        tracing::debug!(
            messages = messages.len(),
            raised = alerts.active().len(),
            "Normalized free-text alerts"
        );
        alerts
    }
}
