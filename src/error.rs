use thiserror::Error;

/// Errors that can occur while loading or converting a canvas graph.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid canvas data: {0}")]
    ConversionError(String),
}

/// Errors raised while sourcing or validating the master key.
///
/// These are fatal: no codec can be constructed without a valid key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required to hold the master encryption key")]
    MissingMasterKey(String),

    #[error("Master encryption key must be at least {min} characters, got {len}")]
    MasterKeyTooShort { len: usize, min: usize },
}

/// Errors raised by the secure field codec for a single value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Value to encrypt or decrypt must be a non-empty string")]
    EmptyInput,

    #[error("Encrypted record is not valid base64: {0}")]
    MalformedRecord(String),

    #[error("Encrypted record is too short: expected at least {min} bytes, got {len}")]
    RecordTooShort { len: usize, min: usize },

    #[error(
        "Authentication failed: the record was encrypted under a different master key or has been tampered with"
    )]
    AuthenticationFailed,

    #[error("Invalid legacy format: {0}")]
    InvalidLegacyFormat(String),

    #[error("Invalid IV length: expected {expected} bytes, got {actual} bytes")]
    InvalidIvLength { expected: usize, actual: usize },

    #[error("Failed to decrypt legacy format: {0}")]
    LegacyDecryptionFailed(String),

    #[error("Decrypted value is not valid UTF-8")]
    InvalidUtf8,

    #[error("Failed to encrypt value")]
    EncryptionFailed,

    #[error("System randomness unavailable")]
    RandomnessUnavailable,
}

impl CodecError {
    /// `true` when the stored bytes are intact but do not open under this key.
    pub fn is_wrong_key_or_tampered(&self) -> bool {
        matches!(
            self,
            CodecError::AuthenticationFailed | CodecError::LegacyDecryptionFailed(_)
        )
    }

    /// `true` when the stored value itself is structurally broken.
    pub fn is_corrupted(&self) -> bool {
        matches!(
            self,
            CodecError::MalformedRecord(_)
                | CodecError::RecordTooShort { .. }
                | CodecError::InvalidLegacyFormat(_)
                | CodecError::InvalidIvLength { .. }
                | CodecError::InvalidUtf8
        )
    }
}

/// Errors reported by the pre-flight check that callers run before dispatching a plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreflightError {
    #[error(
        "No connected executable nodes found; connect nodes into a workflow path or add an input node"
    )]
    NoExecutableNodes,

    #[error("Please enter a query in the input node before executing")]
    EmptyUserQuery,

    #[error("Node '{node_id}' ({backend_id}) has no primary text from its own data or an incoming edge")]
    MissingPrimaryText { node_id: String, backend_id: String },
}

/// Errors that stop a sequential plan run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Step '{backend_id}' (node '{node_id}') failed: {message}")]
    StepFailed {
        node_id: String,
        backend_id: String,
        message: String,
    },
}
