use serde::Deserialize;

use roster_api::input::ValidationRules;

use crate::error::EngineError;

/// Root configuration, parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    /// HTTP API port.
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Browser origin allowed to call the API with credentials.
    #[serde(default = "default_client_origin")]
    pub client_origin: String,

    /// Include the underlying failure text in 500 responses.
    #[serde(default)]
    pub expose_error_details: bool,

    /// Store backend: `"memory"` or `"file"`.
    #[serde(default = "default_storage")]
    pub storage: String,

    /// Backend-specific options, passed to the store factory as JSON.
    #[serde(default)]
    pub storage_config: Option<toml::Value>,

    #[serde(default)]
    pub validation: ValidationConfig,
}

fn default_api_port() -> u16 {
    5000
}

fn default_client_origin() -> String {
    "http://localhost:3000".to_string()
}

fn default_storage() -> String {
    "memory".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidationConfig {
    /// Reject marks outside 0–100.
    #[serde(default = "default_true")]
    pub enforce_marks_range: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { enforce_marks_range: true }
    }
}

impl ValidationConfig {
    pub fn rules(&self) -> ValidationRules {
        ValidationRules {
            enforce_marks_range: self.enforce_marks_range,
        }
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            api_port: default_api_port(),
            client_origin: default_client_origin(),
            expose_error_details: false,
            storage: default_storage(),
            storage_config: None,
            validation: ValidationConfig::default(),
        }
    }
}

impl RosterConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{path}: {e}")))?;
        Self::parse(&content).map_err(|e| e.with_context(path))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Store options as a JSON string, `{}` when none are given.
    pub fn storage_config_json(&self) -> Result<String, EngineError> {
        match &self.storage_config {
            Some(v) => serde_json::to_string(v)
                .map_err(|e| EngineError::Config(format!("storage_config: {e}"))),
            None => Ok("{}".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg = RosterConfig::parse("").unwrap();
        assert_eq!(cfg.api_port, 5000);
        assert_eq!(cfg.client_origin, "http://localhost:3000");
        assert_eq!(cfg.storage, "memory");
        assert!(!cfg.expose_error_details);
        assert!(cfg.validation.enforce_marks_range);
        assert_eq!(cfg.storage_config_json().unwrap(), "{}");
    }

    #[test]
    fn file_storage_section_becomes_json() {
        let cfg = RosterConfig::parse(
            r#"
            api_port = 8080
            storage = "file"

            [storage_config]
            data_dir = "/var/lib/roster"

            [validation]
            enforce_marks_range = false
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api_port, 8080);
        assert_eq!(cfg.storage, "file");
        assert!(!cfg.validation.rules().enforce_marks_range);

        let json: serde_json::Value = serde_json::from_str(&cfg.storage_config_json().unwrap()).unwrap();
        assert_eq!(json["data_dir"], "/var/lib/roster");
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let err = RosterConfig::parse("api_port = \"five\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
