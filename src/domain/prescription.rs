//! Engine response types: prescription, trajectory, and simulation.
//!
//! These mirror the engine's JSON contract. Responses are immutable once
//! received; derived presentation state lives in `physiology`, `pacing`
//! and `chart`.

use serde::{Deserialize, Serialize};

use super::alerts::SafetyAlerts;
use super::patient::PatientInput;

/// Fluid types the engine can recommend or simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluidType {
    #[serde(rename = "ringer_lactate")]
    RingerLactate,
    #[serde(rename = "normal_saline_0.9")]
    NormalSaline,
    #[serde(rename = "dextrose_5_normal_saline")]
    D5NormalSaline,
    #[serde(rename = "resomal_rehydration_sol")]
    Resomal,
    #[serde(rename = "packed_red_blood_cells")]
    PackedRedCells,
    #[serde(rename = "albumin_5_percent")]
    Albumin,
    #[serde(rename = "oral_rehydration_solution")]
    Ors,
    #[serde(rename = "half_normal_saline")]
    HalfNormalSaline,
    #[serde(rename = "dextrose_5_half_normal_saline")]
    D5HalfNormalSaline,
}

impl FluidType {
    /// Engine identifier, as used in simulation requests.
    #[must_use]
    pub fn wire_value(&self) -> &'static str {
        match self {
            Self::RingerLactate => "ringer_lactate",
            Self::NormalSaline => "normal_saline_0.9",
            Self::D5NormalSaline => "dextrose_5_normal_saline",
            Self::Resomal => "resomal_rehydration_sol",
            Self::PackedRedCells => "packed_red_blood_cells",
            Self::Albumin => "albumin_5_percent",
            Self::Ors => "oral_rehydration_solution",
            Self::HalfNormalSaline => "half_normal_saline",
            Self::D5HalfNormalSaline => "dextrose_5_half_normal_saline",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::RingerLactate => "Ringer Lactate",
            Self::NormalSaline => "Normal Saline 0.9%",
            Self::D5NormalSaline => "D5 Normal Saline",
            Self::Resomal => "ReSoMal",
            Self::PackedRedCells => "Packed Red Blood Cells",
            Self::Albumin => "Albumin 5%",
            Self::Ors => "Oral Rehydration Solution",
            Self::HalfNormalSaline => "Half Normal Saline 0.45%",
            Self::D5HalfNormalSaline => "D5 Half Normal Saline",
        }
    }

    /// Colloids and blood products stay intravascular.
    #[must_use]
    pub fn is_colloid(&self) -> bool {
        matches!(self, Self::Albumin | Self::PackedRedCells)
    }
}

impl std::fmt::Display for FluidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Predicted patient state at minute `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    #[serde(default)]
    pub time: f64,
    /// Mean arterial pressure (mmHg)
    pub map: f64,
    /// Lung-water index (edema proxy)
    pub lung_water: f64,
    #[serde(default)]
    pub leak_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urine_output: Option<f64>,
    #[serde(rename = "hct", alias = "hematocrit", default, skip_serializing_if = "Option::is_none")]
    pub hematocrit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potassium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glucose: Option<f64>,
    #[serde(rename = "hb", alias = "hemoglobin", default, skip_serializing_if = "Option::is_none")]
    pub hemoglobin: Option<f64>,
}

impl TrajectoryPoint {
    /// Point carrying only the hemodynamic core.
    #[must_use]
    pub fn at(time: f64, map: f64, lung_water: f64) -> Self {
        Self {
            time,
            map,
            lung_water,
            leak_rate: 0.0,
            urine_output: None,
            hematocrit: None,
            sodium: None,
            potassium: None,
            glucose: None,
            hemoglobin: None,
        }
    }
}

/// Output of the `prescribe` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrescriptionResponse {
    pub recommended_fluid: FluidType,
    pub bolus_volume_ml: u32,
    pub infusion_duration_min: u32,

    // Pump settings
    pub flow_rate_ml_hr: u32,
    pub drops_per_minute: u32,
    pub seconds_per_drop: f64,
    pub iv_set_used: String,

    // Safety ceilings
    pub max_safe_infusion_rate_ml_hr: u32,
    pub max_allowed_bolus_volume_ml: u32,
    pub alerts: SafetyAlerts,

    // Predictions and stop triggers
    pub predicted_bp_rise: i32,
    pub stop_trigger_heart_rate: u32,
    pub stop_trigger_respiratory_rate: u32,

    #[serde(default)]
    pub human_readable_summary: String,
    #[serde(default)]
    pub trajectory: Vec<TrajectoryPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<chrono::NaiveDateTime>,
}

/// Body of the `simulate` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub patient: PatientInput,
    pub fluid_type: String,
    pub volume_ml: u32,
    pub duration_min: u32,
}

impl SimulationRequest {
    /// What-if request replaying the prescribed bolus.
    #[must_use]
    pub fn for_prescription(patient: PatientInput, prescription: &PrescriptionResponse) -> Self {
        Self {
            patient,
            fluid_type: prescription.recommended_fluid.wire_value().to_string(),
            volume_ml: prescription.bolus_volume_ml,
            duration_min: prescription.infusion_duration_min,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub bp_start: i32,
    pub bp_end: i32,
    #[serde(default)]
    pub safety_alerts: Vec<String>,
}

/// Output of the `simulate` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub summary: SimulationSummary,
    #[serde(default)]
    pub graph_data: Vec<TrajectoryPoint>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PRESCRIPTION_JSON: &str = r#"{
        "recommended_fluid": "ringer_lactate",
        "bolus_volume_ml": 100,
        "infusion_duration_min": 30,
        "flow_rate_ml_hr": 200,
        "drops_per_minute": 200,
        "seconds_per_drop": 0.3,
        "iv_set_used": "Micro-Drip (60 drops/ml)",
        "max_safe_infusion_rate_ml_hr": 250,
        "max_allowed_bolus_volume_ml": 200,
        "alerts": {
            "risk_pulmonary_edema": false,
            "risk_volume_overload": false,
            "risk_cerebral_edema": false,
            "risk_hypoglycemia": false,
            "hydrocortisone_needed": false,
            "risk_ketoacidosis": false,
            "sam_heart_warning": false,
            "anemia_dilution_warning": false,
            "dengue_leak_warning": false
        },
        "predicted_bp_rise": 8,
        "stop_trigger_heart_rate": 180,
        "stop_trigger_respiratory_rate": 60,
        "human_readable_summary": "Give 100ml RL over 30 min.",
        "trajectory": [
            {"time": 0, "map": 55, "lung_water": 0.0, "leak_rate": 0.0, "urine_output": 0.0,
             "sodium": 138.0, "potassium": 4.0, "glucose": 85, "hb": 11.0, "hct": 33.0},
            {"time": 1, "map": 58, "lung_water": 1.2, "leak_rate": 0.4, "urine_output": 0.1,
             "sodium": 138.1, "potassium": 4.0, "glucose": 84, "hb": 10.9, "hct": 32.8}
        ],
        "generated_at": "2025-03-01T10:15:30.123456"
    }"#;

    #[test]
    fn test_prescription_decodes_engine_json() {
        let p: PrescriptionResponse = serde_json::from_str(PRESCRIPTION_JSON).expect("Should parse");
        assert_eq!(p.recommended_fluid, FluidType::RingerLactate);
        assert_eq!(p.trajectory.len(), 2);
        assert!((p.trajectory[1].lung_water - 1.2).abs() < f64::EPSILON);
        assert_eq!(p.trajectory[1].hematocrit, Some(32.8));
        assert_eq!(p.trajectory[0].hemoglobin, Some(11.0));
        assert!(p.generated_at.is_some());
    }

    #[test]
    fn test_halted_simulation_decodes_without_graph() {
        let json = r#"{"summary": {"bp_start": 52, "bp_end": 52,
            "safety_alerts": ["STOP: Pre-existing Pulmonary Congestion/Hypoxia"]}}"#;
        let r: SimulationResponse = serde_json::from_str(json).expect("Should parse");
        assert!(r.graph_data.is_empty());
        assert_eq!(r.summary.safety_alerts.len(), 1);
    }

    #[test]
    fn test_simulation_request_replays_bolus() {
        let p: PrescriptionResponse = serde_json::from_str(PRESCRIPTION_JSON).expect("Should parse");
        let patient = crate::domain::sample_patient();
        let request = SimulationRequest::for_prescription(patient, &p);
        assert_eq!(request.fluid_type, "ringer_lactate");
        assert_eq!(request.volume_ml, 100);
        assert_eq!(request.duration_min, 30);
    }
}
