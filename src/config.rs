use crate::error::ConfigError;
use crate::secure::MasterKey;
use std::env;

/// Environment variable holding the master encryption key.
pub const MASTER_KEY_VAR: &str = "ENCRYPTION_KEY";

/// Codec configuration sourced from the process environment.
#[derive(Debug, Clone)]
pub struct CodecSettings {
    pub master_key: MasterKey,
}

impl CodecSettings {
    /// Reads `ENCRYPTION_KEY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(MASTER_KEY_VAR)
    }

    /// Reads the master key from `name`. An unset or empty variable is an error.
    pub fn from_var(name: &str) -> Result<Self, ConfigError> {
        let secret = env::var(name)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingMasterKey(name.to_string()))?;
        Ok(Self {
            master_key: MasterKey::new(secret)?,
        })
    }
}
