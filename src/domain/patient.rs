//! Patient input record and the clinical input validator.
//!
//! Field domains mirror the engine's request schema. The validator collects
//! every violation before reporting so the form can annotate all offending
//! fields at once, and it never forwards a partially valid record.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Closed numeric interval for one patient field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDomain {
    /// Wire name of the field (engine JSON key)
    pub name: &'static str,
    /// Short human label for the form
    pub label: &'static str,
    /// Display unit
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    /// Whether the engine expects a whole number
    pub integer: bool,
    /// Whether the field must be present
    pub required: bool,
}

impl FieldDomain {
    const fn required(
        name: &'static str,
        label: &'static str,
        unit: &'static str,
        min: f64,
        max: f64,
        integer: bool,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            min,
            max,
            integer,
            required: true,
        }
    }

    const fn optional(
        name: &'static str,
        label: &'static str,
        unit: &'static str,
        min: f64,
        max: f64,
        integer: bool,
    ) -> Self {
        Self {
            name,
            label,
            unit,
            min,
            max,
            integer,
            required: false,
        }
    }

    /// Look up the domain of a field by wire name.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static FieldDomain> {
        FIELD_DOMAINS.iter().find(|d| d.name == name)
    }

    /// Check a finite value against this domain.
    ///
    /// # Errors
    /// Returns the violation kind when the value is fractional for an integer
    /// field or lies outside `[min, max]`.
    pub fn check(&self, value: f64) -> Result<(), ViolationKind> {
        if !(self.min..=self.max).contains(&value) {
            return Err(ViolationKind::OutOfRange {
                value,
                min: self.min,
                max: self.max,
            });
        }
        if self.integer && value.fract() != 0.0 {
            return Err(ViolationKind::NotWholeNumber { value });
        }
        Ok(())
    }

    /// Form hint, e.g. `"mmHg (30-250)"`.
    #[must_use]
    pub fn hint(&self) -> String {
        let optional = if self.required { "" } else { ", optional" };
        if self.unit.is_empty() {
            format!("{}-{}{}", self.min, self.max, optional)
        } else {
            format!("{} ({}-{}{})", self.unit, self.min, self.max, optional)
        }
    }
}

/// Numeric field domains enforced before submission.
pub static FIELD_DOMAINS: [FieldDomain; 22] = [
    FieldDomain::required("age_months", "Age", "months", 0.0, 216.0, true),
    FieldDomain::required("weight_kg", "Weight", "kg", 0.5, 120.0, false),
    FieldDomain::required("muac_cm", "MUAC", "cm", 5.0, 40.0, false),
    FieldDomain::required("temp_celsius", "Temperature", "°C", 25.0, 45.0, false),
    FieldDomain::required("systolic_bp", "Systolic BP", "mmHg", 30.0, 250.0, true),
    FieldDomain::required("heart_rate", "Heart Rate", "bpm", 30.0, 300.0, true),
    FieldDomain::required("respiratory_rate_bpm", "Resp. Rate", "/min", 10.0, 150.0, true),
    FieldDomain::required("sp_o2_percent", "SpO2", "%", 0.0, 100.0, true),
    FieldDomain::required("capillary_refill_sec", "Cap. Refill", "s", 0.0, 20.0, true),
    FieldDomain::required("hemoglobin_g_dl", "Hemoglobin", "g/dL", 1.0, 25.0, false),
    FieldDomain::optional("height_cm", "Height", "cm", 20.0, 250.0, false),
    FieldDomain::optional("diastolic_bp", "Diastolic BP", "mmHg", 10.0, 200.0, true),
    FieldDomain::optional("current_sodium", "Sodium", "mEq/L", 100.0, 180.0, false),
    FieldDomain::optional("current_glucose", "Glucose", "mg/dL", 10.0, 1000.0, false),
    FieldDomain::optional("hematocrit_pct", "Hematocrit", "%", 5.0, 80.0, false),
    FieldDomain::optional("lactate_mmol_l", "Lactate", "mmol/L", 0.0, 30.0, false),
    FieldDomain::optional("plasma_albumin_g_dl", "Albumin", "g/dL", 1.0, 6.0, false),
    FieldDomain::optional("platelet_count", "Platelets", "/µL", 1000.0, 1_000_000.0, true),
    FieldDomain::optional("baseline_hematocrit_pct", "Baseline Hct", "%", 5.0, 80.0, false),
    FieldDomain::optional("target_hemoglobin_g_dl", "Target Hb", "g/dL", 4.0, 20.0, false),
    FieldDomain::optional("illness_day", "Illness Day", "day", 1.0, 30.0, true),
    FieldDomain::optional("time_since_last_urine_hours", "Since Urine", "h", 0.0, 72.0, false),
];

/// MUAC below this marks severe acute malnutrition.
pub const SAM_MUAC_CM: f64 = 11.5;

/// Error raised when enum text matches none of the declared members.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{value}' (expected one of: {})", allowed.join(", "))]
pub struct UnknownVariant {
    pub value: String,
    pub allowed: Vec<&'static str>,
}

fn matches_member(input: &str, wire: &str, name: &str) -> bool {
    let input = input.trim();
    input.eq_ignore_ascii_case(wire) || input.eq_ignore_ascii_case(name)
}

/// Patient sex as the engine encodes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    #[must_use]
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

impl FromStr for Sex {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| matches_member(s, v.wire_value(), v.label()))
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(Sex::wire_value).collect(),
            })
    }
}

/// Clinical category of the presenting shock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClinicalDiagnosis {
    #[serde(rename = "severe_dehydration")]
    SevereDehydration,
    #[serde(rename = "septic_shock")]
    SepticShock,
    #[serde(rename = "dengue_shock_syndrome")]
    DengueShock,
    #[serde(rename = "sam_severe_malnutrition")]
    SamDehydration,
    #[default]
    #[serde(rename = "undifferentiated_shock")]
    Undifferentiated,
    #[serde(rename = "severe_anemia")]
    SevereAnemia,
}

impl ClinicalDiagnosis {
    pub const ALL: [Self; 6] = [
        Self::Undifferentiated,
        Self::SevereDehydration,
        Self::SepticShock,
        Self::DengueShock,
        Self::SamDehydration,
        Self::SevereAnemia,
    ];

    #[must_use]
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::SevereDehydration => "severe_dehydration",
            Self::SepticShock => "septic_shock",
            Self::DengueShock => "dengue_shock_syndrome",
            Self::SamDehydration => "sam_severe_malnutrition",
            Self::Undifferentiated => "undifferentiated_shock",
            Self::SevereAnemia => "severe_anemia",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SevereDehydration => "Severe Dehydration",
            Self::SepticShock => "Septic Shock",
            Self::DengueShock => "Dengue Shock",
            Self::SamDehydration => "SAM Dehydration",
            Self::Undifferentiated => "Undifferentiated",
            Self::SevereAnemia => "Severe Anemia",
        }
    }

    /// Whether the category is a shock state that conflicts with SAM rate limits.
    #[must_use]
    pub fn is_shock(&self) -> bool {
        matches!(self, Self::SepticShock | Self::DengueShock)
    }
}

impl FromStr for ClinicalDiagnosis {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| matches_member(s, v.wire_value(), v.label()))
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(ClinicalDiagnosis::wire_value).collect(),
            })
    }
}

/// Infusion set available at the bedside, encoded as drops per mL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum IvSetType {
    #[default]
    MicroDrip,
    MacroDrip,
}

impl IvSetType {
    pub const ALL: [Self; 2] = [Self::MicroDrip, Self::MacroDrip];

    /// Drop factor in drops per mL.
    #[must_use]
    pub fn drops_per_ml(&self) -> u8 {
        match self {
            Self::MicroDrip => 60,
            Self::MacroDrip => 20,
        }
    }

    #[must_use]
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::MicroDrip => "60",
            Self::MacroDrip => "20",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MicroDrip => "Micro-drip (60 gtt/mL)",
            Self::MacroDrip => "Macro-drip (20 gtt/mL)",
        }
    }
}

impl From<IvSetType> for u8 {
    fn from(value: IvSetType) -> Self {
        value.drops_per_ml()
    }
}

impl TryFrom<u8> for IvSetType {
    type Error = UnknownVariant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        value.to_string().parse()
    }
}

impl FromStr for IvSetType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| {
                matches_member(s, v.wire_value(), v.label())
                    || matches_member(s, "micro", "micro_drip") && *v == Self::MicroDrip
                    || matches_member(s, "macro", "macro_drip") && *v == Self::MacroDrip
            })
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(IvSetType::wire_value).collect(),
            })
    }
}

/// Severity of ongoing losses, encoded as mL/kg/h.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OngoingLosses {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
}

impl OngoingLosses {
    pub const ALL: [Self; 4] = [Self::None, Self::Mild, Self::Moderate, Self::Severe];

    #[must_use]
    pub fn ml_per_kg_hr(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Mild => 5,
            Self::Moderate => 7,
            Self::Severe => 10,
        }
    }

    #[must_use]
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Mild => "5",
            Self::Moderate => "7",
            Self::Severe => "10",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Mild => "Mild",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
        }
    }
}

impl From<OngoingLosses> for u8 {
    fn from(value: OngoingLosses) -> Self {
        value.ml_per_kg_hr()
    }
}

impl TryFrom<u8> for OngoingLosses {
    type Error = UnknownVariant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        value.to_string().parse()
    }
}

impl FromStr for OngoingLosses {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| matches_member(s, v.wire_value(), v.label()))
            .ok_or_else(|| UnknownVariant {
                value: s.to_string(),
                allowed: Self::ALL.iter().map(OngoingLosses::wire_value).collect(),
            })
    }
}

/// Validated patient record, ready to be sent to the engine.
///
/// Optional fields that are absent are omitted from the JSON body so the
/// engine applies its own defaults. Numeric values are wiped on drop;
/// the categorical fields are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct PatientInput {
    pub age_months: u32,
    pub weight_kg: f64,
    #[zeroize(skip)]
    pub sex: Sex,
    pub muac_cm: f64,
    pub temp_celsius: f64,
    pub systolic_bp: u32,
    pub heart_rate: u32,
    pub respiratory_rate_bpm: u32,
    pub sp_o2_percent: u32,
    pub capillary_refill_sec: u32,
    pub hemoglobin_g_dl: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diastolic_bp: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_glucose: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hematocrit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lactate_mmol_l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plasma_albumin_g_dl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platelet_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_hematocrit_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_hemoglobin_g_dl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illness_day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_since_last_urine_hours: Option<f64>,

    #[serde(default)]
    pub baseline_hepatomegaly: bool,
    #[serde(default)]
    #[zeroize(skip)]
    pub diagnosis: ClinicalDiagnosis,
    #[serde(default)]
    #[zeroize(skip)]
    pub iv_set_available: IvSetType,
    #[serde(default)]
    #[zeroize(skip)]
    pub ongoing_losses_severity: OngoingLosses,
}

impl PatientInput {
    /// Numeric fields that carry a value, keyed by wire name.
    #[must_use]
    pub fn numeric_values(&self) -> BTreeMap<&'static str, f64> {
        let pairs: [(&'static str, Option<f64>); 22] = [
            ("age_months", Some(f64::from(self.age_months))),
            ("weight_kg", Some(self.weight_kg)),
            ("muac_cm", Some(self.muac_cm)),
            ("temp_celsius", Some(self.temp_celsius)),
            ("systolic_bp", Some(f64::from(self.systolic_bp))),
            ("heart_rate", Some(f64::from(self.heart_rate))),
            ("respiratory_rate_bpm", Some(f64::from(self.respiratory_rate_bpm))),
            ("sp_o2_percent", Some(f64::from(self.sp_o2_percent))),
            ("capillary_refill_sec", Some(f64::from(self.capillary_refill_sec))),
            ("hemoglobin_g_dl", Some(self.hemoglobin_g_dl)),
            ("height_cm", self.height_cm),
            ("diastolic_bp", self.diastolic_bp.map(f64::from)),
            ("current_sodium", self.current_sodium),
            ("current_glucose", self.current_glucose),
            ("hematocrit_pct", self.hematocrit_pct),
            ("lactate_mmol_l", self.lactate_mmol_l),
            ("plasma_albumin_g_dl", self.plasma_albumin_g_dl),
            ("platelet_count", self.platelet_count.map(f64::from)),
            ("baseline_hematocrit_pct", self.baseline_hematocrit_pct),
            ("target_hemoglobin_g_dl", self.target_hemoglobin_g_dl),
            ("illness_day", self.illness_day.map(f64::from)),
            ("time_since_last_urine_hours", self.time_since_last_urine_hours),
        ];
        pairs
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }

    /// Whether MUAC indicates severe acute malnutrition.
    #[must_use]
    pub fn is_sam(&self) -> bool {
        self.muac_cm < SAM_MUAC_CM
    }

    /// Clinical advisories that do not block submission.
    #[must_use]
    pub fn advisories(&self) -> Vec<Advisory> {
        let mut out = Vec::new();

        if self.systolic_bp < 40 {
            out.push(Advisory::CriticalHypotension);
        }
        if self.sp_o2_percent < 80 {
            out.push(Advisory::CriticalHypoxia);
        }
        if self.hemoglobin_g_dl < 4.0 {
            out.push(Advisory::CriticalAnemia);
        }
        if let Some(diastolic) = self.diastolic_bp {
            if diastolic >= self.systolic_bp {
                out.push(Advisory::DiastolicNotBelowSystolic);
            }
        }
        if self.diagnosis == ClinicalDiagnosis::DengueShock && self.illness_day.is_none() {
            out.push(Advisory::DengueWithoutIllnessDay);
        }
        if self.is_sam() && self.diagnosis.is_shock() {
            out.push(Advisory::SamWithShock);
        }

        out
    }
}

/// Non-blocking clinical observations about an accepted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    CriticalHypotension,
    CriticalHypoxia,
    CriticalAnemia,
    DiastolicNotBelowSystolic,
    DengueWithoutIllnessDay,
    SamWithShock,
}

impl Advisory {
    /// Whether the engine is expected to refuse the calculation outright.
    #[must_use]
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::CriticalHypotension | Self::CriticalHypoxia | Self::CriticalAnemia
        )
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CriticalHypotension => write!(f, "SBP < 40 mmHg: escalate to ICU"),
            Self::CriticalHypoxia => write!(f, "SpO2 < 80%: oxygenation first"),
            Self::CriticalAnemia => write!(f, "Hb < 4 g/dL: transfuse before crystalloids"),
            Self::DiastolicNotBelowSystolic => write!(f, "Diastolic BP is not below systolic"),
            Self::DengueWithoutIllnessDay => write!(f, "Dengue diagnosis needs an illness day"),
            Self::SamWithShock => write!(f, "SAM with shock: rate limits will apply"),
        }
    }
}

/// Why a single field was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// Required field absent or not a number
    Missing,
    OutOfRange { value: f64, min: f64, max: f64 },
    NotWholeNumber { value: f64 },
    UnknownVariant(UnknownVariant),
    /// Numeric key with no entry in `FIELD_DOMAINS`
    UnknownField(String),
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub kind: ViolationKind,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "required"),
            Self::OutOfRange { value, min, max } => {
                write!(f, "{} outside [{}, {}]", value, min, max)
            }
            Self::NotWholeNumber { value } => write!(f, "{} must be a whole number", value),
            Self::UnknownVariant(e) => write!(f, "{}", e),
            Self::UnknownField(name) => write!(f, "'{}' is not a patient field", name),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.kind)
    }
}

/// Field name reported for numeric keys outside `FIELD_DOMAINS`.
pub const UNKNOWN_FIELD: &str = "unknown";

/// Every field violation found in one candidate record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", self.summary())]
pub struct ValidationReport {
    pub violations: Vec<FieldViolation>,
}

impl ValidationReport {
    /// Names of the offending fields, in table order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.violations.iter().map(|v| v.field).collect()
    }

    #[must_use]
    pub fn for_field(&self, field: &str) -> Option<&FieldViolation> {
        self.violations.iter().find(|v| v.field == field)
    }

    fn summary(&self) -> String {
        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Unvalidated candidate record as entered at the bedside.
///
/// Numeric values use `f64::NAN` (or any non-finite value) as the
/// "not a number" marker; such optional fields are dropped on validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientDraft {
    pub numbers: BTreeMap<String, f64>,
    pub sex: String,
    pub diagnosis: String,
    pub iv_set: String,
    pub ongoing_losses: String,
    pub baseline_hepatomegaly: bool,
}

impl PatientDraft {
    /// Set a numeric field by wire name.
    pub fn set(&mut self, field: &str, value: f64) -> &mut Self {
        self.numbers.insert(field.to_string(), value);
        self
    }

    /// Validate and normalize into a `PatientInput`.
    ///
    /// # Errors
    /// Returns a report naming every offending field.
    pub fn validate(&self) -> Result<PatientInput, ValidationReport> {
        let mut violations = Vec::new();
        let mut accepted: BTreeMap<&'static str, f64> = BTreeMap::new();

        for domain in FIELD_DOMAINS.iter() {
            let raw = self.numbers.get(domain.name).copied();
            match raw.filter(|v| v.is_finite()) {
                Some(value) => match domain.check(value) {
                    Ok(()) => {
                        accepted.insert(domain.name, value);
                    }
                    Err(kind) => violations.push(FieldViolation {
                        field: domain.name,
                        kind,
                    }),
                },
                None if domain.required => violations.push(FieldViolation {
                    field: domain.name,
                    kind: ViolationKind::Missing,
                }),
                None => {
                    if raw.is_some() {
                        tracing::warn!(field = domain.name, "Dropping non-numeric optional field");
                    }
                }
            }
        }

        for key in self.numbers.keys() {
            if FieldDomain::lookup(key).is_none() {
                violations.push(FieldViolation {
                    field: UNKNOWN_FIELD,
                    kind: ViolationKind::UnknownField(key.clone()),
                });
            }
        }

        let sex = if self.sex.trim().is_empty() {
            violations.push(FieldViolation {
                field: "sex",
                kind: ViolationKind::Missing,
            });
            None
        } else {
            coerce::<Sex>("sex", &self.sex, &mut violations)
        };
        let diagnosis =
            coerce_or_default::<ClinicalDiagnosis>("diagnosis", &self.diagnosis, &mut violations);
        let iv_set =
            coerce_or_default::<IvSetType>("iv_set_available", &self.iv_set, &mut violations);
        let losses = coerce_or_default::<OngoingLosses>(
            "ongoing_losses_severity",
            &self.ongoing_losses,
            &mut violations,
        );

        let (Some(sex), Some(diagnosis), Some(iv_set_available), Some(ongoing_losses_severity)) =
            (sex, diagnosis, iv_set, losses)
        else {
            return Err(ValidationReport { violations });
        };
        if !violations.is_empty() {
            return Err(ValidationReport { violations });
        }

        let real = |name: &str| accepted.get(name).copied();
        // Integer domains all have non-negative minimums, so the cast is exact.
        let whole = |name: &str| accepted.get(name).map(|v| *v as u32);

        Ok(PatientInput {
            age_months: whole("age_months").unwrap_or_default(),
            weight_kg: real("weight_kg").unwrap_or_default(),
            sex,
            muac_cm: real("muac_cm").unwrap_or_default(),
            temp_celsius: real("temp_celsius").unwrap_or_default(),
            systolic_bp: whole("systolic_bp").unwrap_or_default(),
            heart_rate: whole("heart_rate").unwrap_or_default(),
            respiratory_rate_bpm: whole("respiratory_rate_bpm").unwrap_or_default(),
            sp_o2_percent: whole("sp_o2_percent").unwrap_or_default(),
            capillary_refill_sec: whole("capillary_refill_sec").unwrap_or_default(),
            hemoglobin_g_dl: real("hemoglobin_g_dl").unwrap_or_default(),
            height_cm: real("height_cm"),
            diastolic_bp: whole("diastolic_bp"),
            current_sodium: real("current_sodium"),
            current_glucose: real("current_glucose"),
            hematocrit_pct: real("hematocrit_pct"),
            lactate_mmol_l: real("lactate_mmol_l"),
            plasma_albumin_g_dl: real("plasma_albumin_g_dl"),
            platelet_count: whole("platelet_count"),
            baseline_hematocrit_pct: real("baseline_hematocrit_pct"),
            target_hemoglobin_g_dl: real("target_hemoglobin_g_dl"),
            illness_day: whole("illness_day"),
            time_since_last_urine_hours: real("time_since_last_urine_hours"),
            baseline_hepatomegaly: self.baseline_hepatomegaly,
            diagnosis,
            iv_set_available,
            ongoing_losses_severity,
        })
    }
}

impl From<&PatientInput> for PatientDraft {
    fn from(input: &PatientInput) -> Self {
        Self {
            numbers: input
                .numeric_values()
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            sex: input.sex.wire_value().to_string(),
            diagnosis: input.diagnosis.wire_value().to_string(),
            iv_set: input.iv_set_available.wire_value().to_string(),
            ongoing_losses: input.ongoing_losses_severity.wire_value().to_string(),
            baseline_hepatomegaly: input.baseline_hepatomegaly,
        }
    }
}

fn coerce<T>(field: &'static str, text: &str, violations: &mut Vec<FieldViolation>) -> Option<T>
where
    T: FromStr<Err = UnknownVariant>,
{
    match text.parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            violations.push(FieldViolation {
                field,
                kind: ViolationKind::UnknownVariant(e),
            });
            None
        }
    }
}

fn coerce_or_default<T>(
    field: &'static str,
    text: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<T>
where
    T: FromStr<Err = UnknownVariant> + Default,
{
    if text.trim().is_empty() {
        Some(T::default())
    } else {
        coerce(field, text, violations)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> PatientInput {
        PatientInput {
            age_months: 12,
            weight_kg: 10.0,
            sex: Sex::Male,
            muac_cm: 14.0,
            temp_celsius: 38.5,
            systolic_bp: 85,
            heart_rate: 150,
            respiratory_rate_bpm: 40,
            sp_o2_percent: 96,
            capillary_refill_sec: 3,
            hemoglobin_g_dl: 11.0,
            height_cm: None,
            diastolic_bp: Some(50),
            current_sodium: Some(138.0),
            current_glucose: Some(85.0),
            hematocrit_pct: None,
            lactate_mmol_l: Some(2.5),
            plasma_albumin_g_dl: None,
            platelet_count: Some(180_000),
            baseline_hematocrit_pct: None,
            target_hemoglobin_g_dl: None,
            illness_day: None,
            time_since_last_urine_hours: Some(6.0),
            baseline_hepatomegaly: false,
            diagnosis: ClinicalDiagnosis::SepticShock,
            iv_set_available: IvSetType::MicroDrip,
            ongoing_losses_severity: OngoingLosses::Mild,
        }
    }

    #[test]
    fn test_valid_input_round_trips_unchanged() {
        let input = sample_input();
        let draft = PatientDraft::from(&input);
        assert_eq!(draft.validate(), Ok(input));
    }

    #[test]
    fn test_every_offending_field_is_reported() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("age_months", 300.0);
        draft.set("heart_rate", 12.0);
        draft.set("lactate_mmol_l", 45.0);
        draft.diagnosis = "malaria".to_string();

        let report = draft.validate().expect_err("Should reject");
        assert_eq!(
            report.fields(),
            vec!["age_months", "heart_rate", "lactate_mmol_l", "diagnosis"]
        );
        assert!(matches!(
            report.for_field("age_months").map(|v| &v.kind),
            Some(ViolationKind::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("age_months", 216.0);
        draft.set("weight_kg", 0.5);
        draft.set("sp_o2_percent", 0.0);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_fractional_integer_field_rejected() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("systolic_bp", 85.5);
        let report = draft.validate().expect_err("Should reject");
        assert_eq!(
            report.for_field("systolic_bp").map(|v| &v.kind),
            Some(&ViolationKind::NotWholeNumber { value: 85.5 })
        );
    }

    #[test]
    fn test_non_numeric_optional_field_is_stripped() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("lactate_mmol_l", f64::NAN);
        draft.set("height_cm", f64::NAN);

        let input = draft.validate().expect("Should accept");
        assert!(input.lactate_mmol_l.is_none());

        let json = serde_json::to_value(&input).expect("Should serialize");
        let obj = json.as_object().expect("Should be an object");
        assert!(!obj.contains_key("lactate_mmol_l"));
        assert!(!obj.contains_key("height_cm"));
        assert!(obj.contains_key("current_sodium"));
    }

    #[test]
    fn test_zeroize_wipes_vitals() {
        let mut input = sample_input();
        input.zeroize();
        assert_eq!(input.age_months, 0);
        assert!(input.weight_kg.abs() < f64::EPSILON);
        assert!(input.current_sodium.is_none());
        assert!(input.time_since_last_urine_hours.is_none());
        assert_eq!(input.diagnosis, ClinicalDiagnosis::SepticShock);
    }

    #[test]
    fn test_misspelled_numeric_key_is_reported() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("heartrate", 120.0);

        let report = draft.validate().expect_err("Should reject");
        assert_eq!(report.fields(), vec![UNKNOWN_FIELD]);
        assert_eq!(
            report.violations[0].kind,
            ViolationKind::UnknownField("heartrate".to_string())
        );
        assert!(report.to_string().contains("heartrate"));
    }

    #[test]
    fn test_non_numeric_required_field_is_missing() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.set("weight_kg", f64::NAN);
        draft.numbers.remove("muac_cm");
        let report = draft.validate().expect_err("Should reject");
        assert_eq!(report.fields(), vec!["weight_kg", "muac_cm"]);
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind == ViolationKind::Missing));
    }

    #[test]
    fn test_enum_coercion() {
        assert_eq!("f".parse::<Sex>(), Ok(Sex::Female));
        assert_eq!("Septic Shock".parse(), Ok(ClinicalDiagnosis::SepticShock));
        assert_eq!("20".parse(), Ok(IvSetType::MacroDrip));
        assert_eq!("severe".parse(), Ok(OngoingLosses::Severe));
        assert!("X".parse::<Sex>().is_err());

        let mut draft = PatientDraft::from(&sample_input());
        draft.sex = String::new();
        draft.iv_set = "45".to_string();
        let report = draft.validate().expect_err("Should reject");
        assert_eq!(report.fields(), vec!["sex", "iv_set_available"]);
    }

    #[test]
    fn test_empty_optional_enums_take_defaults() {
        let mut draft = PatientDraft::from(&sample_input());
        draft.diagnosis.clear();
        draft.ongoing_losses.clear();
        let input = draft.validate().expect("Should accept");
        assert_eq!(input.diagnosis, ClinicalDiagnosis::Undifferentiated);
        assert_eq!(input.ongoing_losses_severity, OngoingLosses::None);
    }

    #[test]
    fn test_numeric_enums_serialize_as_numbers() {
        let json = serde_json::to_value(sample_input()).expect("Should serialize");
        assert_eq!(json["iv_set_available"], serde_json::json!(60));
        assert_eq!(json["ongoing_losses_severity"], serde_json::json!(5));
        assert_eq!(json["diagnosis"], serde_json::json!("septic_shock"));
        assert_eq!(json["sex"], serde_json::json!("M"));
    }

    #[test]
    fn test_advisories() {
        assert!(sample_input().advisories().is_empty());

        let mut input = sample_input();
        input.muac_cm = 10.5;
        input.diagnosis = ClinicalDiagnosis::DengueShock;
        input.diastolic_bp = Some(90);
        input.sp_o2_percent = 75;
        let advisories = input.advisories();
        assert!(advisories.contains(&Advisory::SamWithShock));
        assert!(advisories.contains(&Advisory::DengueWithoutIllnessDay));
        assert!(advisories.contains(&Advisory::DiastolicNotBelowSystolic));
        assert!(advisories.iter().any(Advisory::is_critical));
    }
}
