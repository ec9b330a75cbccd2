//! HTTP adapter: Implementation of ResuscitationEngine over JSON/HTTP.
//!
//! Any non-success status is surfaced once as a single message: the engine's
//! `detail` field when present, otherwise the status text. There is no retry
//! and no timeout beyond the transport's default.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{PatientInput, PrescriptionResponse, SimulationRequest, SimulationResponse};
use crate::ports::{EngineError, ResuscitationEngine};

const PRESCRIBE_PATH: &str = "prescribe";
const SIMULATE_PATH: &str = "simulate";

/// Blocking HTTP client for the engine.
pub struct HttpEngine {
    client: Client,
    base_url: String,
}

impl HttpEngine {
    /// Create a client for the engine at `base_url`.
    ///
    /// # Errors
    /// Returns `EngineError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent(concat!("pediaflow/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&base_url.into()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post<B, R>(&self, path: &str, body: &B) -> Result<R, EngineError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = endpoint(&self.base_url, path);
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let detail = error_detail(status.as_u16(), &body);
            tracing::warn!(status = status.as_u16(), "Engine rejected request: {}", detail);
            return Err(EngineError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        response
            .json::<R>()
            .map_err(|e| EngineError::Decode(e.to_string()))
    }
}

impl ResuscitationEngine for HttpEngine {
    fn prescribe(&self, patient: &PatientInput) -> Result<PrescriptionResponse, EngineError> {
        self.post(PRESCRIBE_PATH, patient)
    }

    fn simulate(&self, request: &SimulationRequest) -> Result<SimulationResponse, EngineError> {
        self.post(SIMULATE_PATH, request)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url, path.trim_start_matches('/'))
}

/// Human-readable message for a failed engine call.
///
/// Prefers the body's `detail`: a string is used verbatim, a list of
/// validation items is flattened to `loc: msg` pairs. Falls back to the
/// canonical status text.
#[must_use]
pub fn error_detail(status: u16, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s,
        Some(serde_json::Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(describe_validation_item)
            .collect::<Vec<_>>()
            .join("; "),
        _ => StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {status}")),
    }
}

fn describe_validation_item(item: &serde_json::Value) -> String {
    let msg = item
        .get("msg")
        .and_then(|m| m.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| item.to_string());

    let loc = item.get("loc").and_then(|l| l.as_array()).map(|parts| {
        parts
            .iter()
            .filter(|p| p.as_str() != Some("body"))
            .map(|p| match p {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    });

    match loc {
        Some(loc) if !loc.is_empty() => format!("{loc}: {msg}"),
        _ => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_detail_is_verbatim() {
        let body = r#"{"detail": "Clinical Validation Error: SpO2 <80%: Priority is Oxygenation, not Fluid Calculation."}"#;
        assert_eq!(
            error_detail(422, body),
            "Clinical Validation Error: SpO2 <80%: Priority is Oxygenation, not Fluid Calculation."
        );
    }

    #[test]
    fn test_validation_list_is_flattened() {
        let body = r#"{"detail": [
            {"loc": ["body", "weight_kg"], "msg": "Input should be greater than 0.5", "type": "greater_than"},
            {"loc": ["body", "patient", "sex"], "msg": "String should match pattern", "type": "string_pattern_mismatch"}
        ]}"#;
        assert_eq!(
            error_detail(422, body),
            "weight_kg: Input should be greater than 0.5; patient.sex: String should match pattern"
        );
    }

    #[test]
    fn test_missing_detail_falls_back_to_status_text() {
        assert_eq!(error_detail(500, "<html>oops</html>"), "Internal Server Error");
        assert_eq!(error_detail(503, ""), "Service Unavailable");
        assert_eq!(error_detail(599, "{}"), "HTTP 599");
    }

    #[test]
    fn test_endpoint_building() {
        assert_eq!(normalize_base_url(" http://engine:8000/ "), "http://engine:8000");
        assert_eq!(endpoint("http://engine:8000", "/prescribe"), "http://engine:8000/prescribe");
        assert_eq!(endpoint("http://engine:8000/api", SIMULATE_PATH), "http://engine:8000/api/simulate");
    }

    #[test]
    fn test_client_keeps_normalized_url() {
        let engine = HttpEngine::new("http://127.0.0.1:8000//").expect("Should build client");
        assert_eq!(engine.base_url(), "http://127.0.0.1:8000");
    }
}
