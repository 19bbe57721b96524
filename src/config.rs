//! Environment-driven defaults.
//!
//! Values are read from the process environment after loading an optional
//! `.env` file. CLI flags always take precedence over these.

use crate::error::AppError;
use crate::linear::DecompositionMode;

/// Default decomposition mode (`svd` or `qr`).
pub const ENV_MODE: &str = "DOASFIT_MODE";
/// Log filter, e.g. `debug` or `doas_linfit=trace`.
pub const ENV_LOG: &str = "DOASFIT_LOG";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub default_mode: DecompositionMode,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_mode: DecompositionMode::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let mut settings = Self::default();
        if let Some(mode) = lookup(ENV_MODE) {
            settings.default_mode = mode
                .parse()
                .map_err(|e| AppError::new(2, format!("Invalid {ENV_MODE}: {e}.")))?;
        }
        if let Some(level) = lookup(ENV_LOG).or_else(|| lookup("RUST_LOG")) {
            if !level.trim().is_empty() {
                settings.log_level = level.trim().to_string();
            }
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn reads_mode_and_log_level() {
        let s = Settings::from_lookup(lookup(&[(ENV_MODE, "qr"), ("RUST_LOG", "debug")])).unwrap();
        assert_eq!(s.default_mode, DecompositionMode::Qr);
        assert_eq!(s.log_level, "debug");
    }

    #[test]
    fn own_log_variable_wins_over_rust_log() {
        let s = Settings::from_lookup(lookup(&[(ENV_LOG, "warn"), ("RUST_LOG", "debug")])).unwrap();
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn invalid_mode_is_an_input_error() {
        let err = Settings::from_lookup(lookup(&[(ENV_MODE, "lu")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
