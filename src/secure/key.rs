use crate::error::ConfigError;
use std::fmt;
use tracing::warn;

/// Shortest master key accepted, in characters.
pub const MIN_MASTER_KEY_LEN: usize = 32;

/// Values shipped in sample configuration files. Accepted, but loudly.
const PLACEHOLDER_KEYS: &[&str] = &[
    "fallback-key-change-this",
    "change-me-to-a-random-32-character-secret",
];

/// The process-wide secret every field key is derived from.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone)]
pub struct MasterKey {
    secret: String,
}

impl MasterKey {
    /// Validates and wraps a master key.
    ///
    /// A known placeholder only logs a warning; a key under 32 characters is rejected.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if PLACEHOLDER_KEYS.contains(&secret.as_str()) {
            warn!("using a placeholder master encryption key; set a real secret in production");
        }
        let len = secret.chars().count();
        if len < MIN_MASTER_KEY_LEN {
            return Err(ConfigError::MasterKeyTooShort {
                len,
                min: MIN_MASTER_KEY_LEN,
            });
        }
        Ok(Self { secret })
    }

    pub fn is_placeholder(&self) -> bool {
        PLACEHOLDER_KEYS.contains(&self.secret.as_str())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey(<redacted>)")
    }
}
