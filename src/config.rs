//! Runtime configuration from environment variables.

use std::env;
use std::path::PathBuf;

use tracing::warn;

pub const DATA_PATH_VAR: &str = "CLINIC_DASHBOARD_DATA";
pub const PREVIEW_LIMIT_VAR: &str = "CLINIC_DASHBOARD_PREVIEW_LIMIT";
pub const DEFAULT_DATA_PATH: &str = "data.json";
/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    /// Overrides the per-preset analytics preview size when set.
    pub preview_limit: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            preview_limit: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_path = lookup(DATA_PATH_VAR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                warn!("{} not set, using {}", DATA_PATH_VAR, DEFAULT_DATA_PATH);
                PathBuf::from(DEFAULT_DATA_PATH)
            });

        let preview_limit = lookup(PREVIEW_LIMIT_VAR).and_then(|raw| {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => Some(limit),
                _ => {
                    warn!("{}={:?} is not a positive number, ignoring", PREVIEW_LIMIT_VAR, raw);
                    None
                }
            }
        });

        AppConfig {
            data_path,
            preview_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config_from(&[]), AppConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = config_from(&[
            (DATA_PATH_VAR, "/srv/clinic/data.json"),
            (PREVIEW_LIMIT_VAR, "12"),
        ]);

        assert_eq!(config.data_path, PathBuf::from("/srv/clinic/data.json"));
        assert_eq!(config.preview_limit, Some(12));
    }

    #[test]
    fn bad_preview_limit_is_ignored() {
        assert_eq!(config_from(&[(PREVIEW_LIMIT_VAR, "lots")]).preview_limit, None);
        assert_eq!(config_from(&[(PREVIEW_LIMIT_VAR, "0")]).preview_limit, None);
    }
}
