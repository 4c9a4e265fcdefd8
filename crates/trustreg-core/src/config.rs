//! Deployment configuration loading and management.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CoreError;
use crate::types::{Address, UseCase};

/// Full configuration of one registry deployment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Administrator of the directory, the trusted contract registry and
    /// the issuance workflow.
    #[serde(default)]
    pub administrator: Address,

    /// Signing domain shared by signers and the ledger.
    #[serde(default)]
    pub domain: DomainConfig,

    /// Verification payload settings.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Issuance workflow settings.
    #[serde(default)]
    pub issuance: IssuanceConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Human-readable signing namespace.
    #[serde(default = "default_domain_name")]
    pub name: String,
    /// Domain version.
    #[serde(default = "default_domain_version")]
    pub version: String,
    /// Network / chain identifier.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Identity of the verifying ledger instance.
    #[serde(default)]
    pub verifying_contract: Address,
}

/// Shape of the signed verification result, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationProfile {
    /// `subject, expiration, signature, jsonResult, useCase`.
    #[default]
    Attestation,
    /// `schema, subject, expiration`; the schema doubles as the use case.
    Schema,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    /// Payload profile.
    #[serde(default)]
    pub profile: VerificationProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// Use case a subject must be verified for to request a credential.
    #[serde(default = "default_use_case")]
    pub use_case: UseCase,
    /// Operating identity holders approve for consumption.
    #[serde(default)]
    pub operator: Address,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_domain_name() -> String {
    "VerificationRegistry".into()
}
fn default_domain_version() -> String {
    "1.0".into()
}
fn default_chain_id() -> u64 {
    1337
}
fn default_use_case() -> UseCase {
    UseCase::new("kyc")
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: default_domain_name(),
            version: default_domain_version(),
            chain_id: default_chain_id(),
            verifying_contract: Address::ZERO,
        }
    }
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            use_case: default_use_case(),
            operator: Address::ZERO,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RegistryConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Self::from_toml(&contents)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, CoreError> {
        toml::from_str(contents).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.domain.name, "VerificationRegistry");
        assert_eq!(config.domain.version, "1.0");
        assert_eq!(config.domain.chain_id, 1337);
        assert_eq!(config.verification.profile, VerificationProfile::Attestation);
        assert_eq!(config.issuance.use_case.as_str(), "kyc");
        assert_eq!(config.logging.level, "info");
        assert!(config.administrator.is_zero());
    }

    #[test]
    fn test_config_from_toml_partial() {
        let toml_str = r#"
administrator = "0x71cb05ee1b1f506ff321da3dac38f25c0c9ce6e1"

[domain]
chain_id = 5

[verification]
profile = "schema"

[issuance]
use_case = "diploma"
"#;
        let config = RegistryConfig::from_toml(toml_str).expect("parse");
        assert_eq!(
            config.administrator.to_hex(),
            "0x71cb05ee1b1f506ff321da3dac38f25c0c9ce6e1"
        );
        assert_eq!(config.domain.chain_id, 5);
        // Defaults for unspecified
        assert_eq!(config.domain.name, "VerificationRegistry");
        assert_eq!(config.verification.profile, VerificationProfile::Schema);
        assert_eq!(config.issuance.use_case.as_str(), "diploma");
    }

    #[test]
    fn test_config_rejects_bad_address() {
        let result = RegistryConfig::from_toml(r#"administrator = "0x1234""#);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_config_load_nonexistent_uses_defaults() {
        let config = RegistryConfig::load(Path::new("/nonexistent/trustreg.toml")).unwrap();
        assert_eq!(config.domain.chain_id, 1337);
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("trustreg.toml");
        let mut config = RegistryConfig::default();
        config.administrator = Address::repeat_byte(0x42);
        config.issuance.use_case = UseCase::new("diploma");
        config.save(&path).unwrap();

        let loaded = RegistryConfig::load(&path).unwrap();
        assert_eq!(loaded.administrator, Address::repeat_byte(0x42));
        assert_eq!(loaded.issuance.use_case.as_str(), "diploma");
    }
}
