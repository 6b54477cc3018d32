//! Layered configuration loading
//!
//! Every binary in the workspace resolves its configuration the same way:
//! serialized defaults, then a TOML file, then prefixed environment
//! variables (nested keys separated by `__`).

use crate::error::ConfigurationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::debug;

/// Loader for configuration structures with sensible defaults
pub trait ConfigLoader: Serialize + DeserializeOwned + Default {
    /// Environment variable prefix, e.g. `ERP_`
    const ENV_PREFIX: &'static str;

    /// Load from a specific file. A missing file only contributes nothing.
    fn load_from_file(path: &Path) -> Result<Self, ConfigurationError> {
        debug!(
            path = %path.display(),
            exists = path.exists(),
            "Loading configuration"
        );
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(Self::ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigurationError::ParseError {
                details: e.to_string(),
            })
    }

    /// Render the configuration as pretty TOML
    fn to_toml(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self).map_err(|e| ConfigurationError::ParseError {
            details: format!("Failed to serialize config: {e}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        retries: u32,
        nested: Nested,
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Nested {
        timeout: u64,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self {
                name: "default".to_string(),
                retries: 3,
                nested: Nested { timeout: 30 },
            }
        }
    }

    impl ConfigLoader for Sample {
        const ENV_PREFIX: &'static str = "ERP_COMMON_SAMPLE_";
    }

    /// Same shape with its own prefix, so env mutation stays local to one test
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    struct EnvSample(Sample);

    impl ConfigLoader for EnvSample {
        const ENV_PREFIX: &'static str = "ERP_COMMON_OVERRIDE_";
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Sample::load_from_file(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Sample::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"\n[nested]\ntimeout = 5").unwrap();

        let config = Sample::load_from_file(file.path()).unwrap();
        assert_eq!(config.name, "from-file");
        assert_eq!(config.retries, 3);
        assert_eq!(config.nested.timeout, 5);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"from-file\"\n[nested]\ntimeout = 5").unwrap();

        std::env::set_var("ERP_COMMON_OVERRIDE_NESTED__TIMEOUT", "99");
        let config = EnvSample::load_from_file(file.path()).unwrap().0;
        std::env::remove_var("ERP_COMMON_OVERRIDE_NESTED__TIMEOUT");

        assert_eq!(config.nested.timeout, 99);
        assert_eq!(config.name, "from-file");
        assert_eq!(config.retries, 3);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retries = \"many\"").unwrap();

        let result = Sample::load_from_file(file.path());
        assert!(matches!(
            result,
            Err(ConfigurationError::ParseError { .. })
        ));
    }

    #[test]
    fn test_to_toml_round_trips_values() {
        let rendered = Sample::default().to_toml().unwrap();
        assert!(rendered.contains("name = \"default\""));
        assert!(rendered.contains("timeout = 30"));
    }
}
