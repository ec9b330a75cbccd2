//! Runtime settings read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `PEDIAFLOW_ENGINE_URL` | `http://127.0.0.1:8000` |
//! | `PEDIAFLOW_LOG_MODE` | `auto` (`file`, `stdout`) |
//! | `PEDIAFLOW_LOG_FILE` | `pediaflow.log` |

pub const DEFAULT_ENGINE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_LOG_FILE: &str = "pediaflow.log";

/// Where log lines go.
///
/// Logging to the terminal corrupts the TUI's alternate screen, so `Auto`
/// picks the file whenever stdout is interactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    File,
    Stdout,
    #[default]
    Auto,
}

impl LogMode {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Self::File,
            "stdout" => Self::Stdout,
            _ => Self::Auto,
        }
    }

    /// Whether to write to the log file given stdout interactivity.
    #[must_use]
    pub fn uses_file(&self, interactive: bool) -> bool {
        match self {
            Self::File => true,
            Self::Stdout => false,
            Self::Auto => interactive,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Engine base URL, without trailing slash
    pub engine_url: String,
    pub log_mode: LogMode,
    pub log_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            engine_url: DEFAULT_ENGINE_URL.to_string(),
            log_mode: LogMode::Auto,
            log_file: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let engine_url = get("PEDIAFLOW_ENGINE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or(defaults.engine_url);

        Self {
            engine_url,
            log_mode: get("PEDIAFLOW_LOG_MODE")
                .map(|m| LogMode::parse(&m))
                .unwrap_or(defaults.log_mode),
            log_file: get("PEDIAFLOW_LOG_FILE").unwrap_or(defaults.log_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(Settings::from_lookup(lookup(&[])), Settings::default());
    }

    #[test]
    fn test_engine_url_trailing_slash_trimmed() {
        let settings = Settings::from_lookup(lookup(&[("PEDIAFLOW_ENGINE_URL", "http://engine:9000/")]));
        assert_eq!(settings.engine_url, "http://engine:9000");
    }

    #[test]
    fn test_blank_values_fall_back() {
        let settings = Settings::from_lookup(lookup(&[
            ("PEDIAFLOW_ENGINE_URL", "   "),
            ("PEDIAFLOW_LOG_FILE", ""),
        ]));
        assert_eq!(settings.engine_url, DEFAULT_ENGINE_URL);
        assert_eq!(settings.log_file, DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_log_mode_parsing() {
        let file = Settings::from_lookup(lookup(&[("PEDIAFLOW_LOG_MODE", "FILE")]));
        assert_eq!(file.log_mode, LogMode::File);
        let other = Settings::from_lookup(lookup(&[("PEDIAFLOW_LOG_MODE", "syslog")]));
        assert_eq!(other.log_mode, LogMode::Auto);

        assert!(LogMode::Auto.uses_file(true));
        assert!(!LogMode::Auto.uses_file(false));
        assert!(LogMode::File.uses_file(false));
        assert!(!LogMode::Stdout.uses_file(true));
    }
}
