//! Authenticated encryption for secret fields stored inside node data.
//!
//! Records are `base64(salt | iv | tag | ciphertext)`: a per-record key is derived from the
//! master key with PBKDF2-HMAC-SHA256 and the value is sealed with AES-256-GCM. Records
//! written by older releases (`hex(iv):hex(ciphertext)`) can still be opened, never
//! written.

mod cipher;
mod key;
mod legacy;
mod walk;

pub use cipher::{IV_LEN, MIN_RECORD_LEN, SALT_LEN, TAG_LEN};
pub use key::{MIN_MASTER_KEY_LEN, MasterKey};
pub use legacy::{LEGACY_IV_LEN, LEGACY_STRATEGIES, LegacyStrategy};
pub use walk::{
    DEFAULT_SENSITIVE_FIELDS, FieldAction, FieldFailure, SensitiveFields, any_sensitive,
    map_sensitive,
};

use crate::error::{CodecError, ConfigError};
use crate::graph::Graph;
use ring::rand::SystemRandom;
use serde_json::{Map, Value};
use subtle::ConstantTimeEq;
use tracing::{error, warn};

/// Encrypts and decrypts individual values and whole node-data objects.
#[derive(Debug, Clone)]
pub struct FieldCodec {
    master: MasterKey,
    sensitive: SensitiveFields,
}

impl FieldCodec {
    pub fn new(master: MasterKey) -> Self {
        Self {
            master,
            sensitive: SensitiveFields::default(),
        }
    }

    /// Builds a codec from the `ENCRYPTION_KEY` environment variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(crate::config::CodecSettings::from_env()?.master_key))
    }

    /// Adds a key to the set of fields the object walk treats as secret.
    pub fn with_sensitive_field(mut self, key: &str) -> Self {
        self.sensitive.insert(key);
        self
    }

    pub fn sensitive_fields(&self) -> &SensitiveFields {
        &self.sensitive
    }

    /// Seals a single value. Two calls with the same input produce different records.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CodecError> {
        cipher::seal(&self.master, plaintext)
    }

    /// Opens a record in the current or the legacy format.
    pub fn decrypt(&self, record: &str) -> Result<String, CodecError> {
        if record.trim().is_empty() {
            return Err(CodecError::EmptyInput);
        }
        if legacy::is_legacy_shape(record) {
            warn!("found legacy encrypted format; re-encrypt to upgrade it");
            return legacy::open(&self.master, record);
        }
        cipher::open(&self.master, record)
    }

    /// Encrypts every plaintext sensitive field in `data`. Fields that already look
    /// encrypted are left alone; a field that fails to encrypt keeps its value.
    pub fn encrypt_object(&self, data: &Value) -> Value {
        self.encrypt_object_with_report(data).0
    }

    pub fn encrypt_object_with_report(&self, data: &Value) -> (Value, Vec<FieldFailure>) {
        let mut failures = Vec::new();
        let sealed = map_sensitive(
            data,
            "",
            &|key: &str| self.sensitive.contains(key),
            &mut |path: &str, value: &str| {
                if is_encrypted(value) {
                    return FieldAction::Keep;
                }
                match self.encrypt(value) {
                    Ok(record) => FieldAction::Replace(record),
                    Err(e) => {
                        error!(field = %path, error = %e, "failed to encrypt field");
                        failures.push(FieldFailure {
                            path: path.to_string(),
                            error: e,
                            cleared: false,
                        });
                        FieldAction::Keep
                    }
                }
            },
        );
        (sealed, failures)
    }

    /// Decrypts every encrypted sensitive field in `data`.
    ///
    /// Failures never abort the walk. A legacy record with a wrong-length IV is cleared to
    /// `""`; any other failure keeps the stored value for manual investigation.
    pub fn decrypt_object(&self, data: &Value) -> Value {
        self.decrypt_object_with_report(data).0
    }

    pub fn decrypt_object_with_report(&self, data: &Value) -> (Value, Vec<FieldFailure>) {
        let mut failures = Vec::new();
        let opened = map_sensitive(
            data,
            "",
            &|key: &str| self.sensitive.contains(key),
            &mut |path: &str, value: &str| {
                if !is_encrypted(value) {
                    return FieldAction::Keep;
                }
                match self.decrypt(value) {
                    Ok(plaintext) => FieldAction::Replace(plaintext),
                    Err(e) => {
                        let format = if value.contains(':') { "legacy" } else { "current" };
                        error!(
                            field = %path,
                            error = %e,
                            value_len = value.len(),
                            format,
                            "failed to decrypt field"
                        );
                        let cleared = matches!(e, CodecError::InvalidIvLength { .. });
                        if cleared {
                            warn!(field = %path, "clearing corrupted legacy value");
                        } else {
                            warn!(
                                field = %path,
                                "keeping encrypted value for manual investigation"
                            );
                        }
                        failures.push(FieldFailure {
                            path: path.to_string(),
                            error: e,
                            cleared,
                        });
                        if cleared {
                            FieldAction::Replace(String::new())
                        } else {
                            FieldAction::Keep
                        }
                    }
                }
            },
        );
        (opened, failures)
    }

    /// Applies `encrypt_object` to every node's `data`.
    pub fn seal_graph(&self, graph: &Graph) -> Graph {
        self.seal_graph_with_report(graph).0
    }

    /// Like `seal_graph`, also returning each failed field as `"<node id>.<path>"`.
    pub fn seal_graph_with_report(&self, graph: &Graph) -> (Graph, Vec<FieldFailure>) {
        self.map_node_data(graph, |data| self.encrypt_object_with_report(data))
    }

    /// Applies `decrypt_object` to every node's `data`.
    pub fn unseal_graph(&self, graph: &Graph) -> Graph {
        self.unseal_graph_with_report(graph).0
    }

    /// Like `unseal_graph`, also returning each failed field as `"<node id>.<path>"`.
    pub fn unseal_graph_with_report(&self, graph: &Graph) -> (Graph, Vec<FieldFailure>) {
        self.map_node_data(graph, |data| self.decrypt_object_with_report(data))
    }

    /// `true` when some node still stores a sensitive field in plaintext.
    pub fn needs_sealing(&self, graph: &Graph) -> bool {
        let is_sensitive = |key: &str| self.sensitive.contains(key);
        graph.nodes.iter().any(|node| {
            let data = Value::Object(node.data.clone());
            any_sensitive(&data, &is_sensitive, &mut |value: &str| !is_encrypted(value))
        })
    }

    fn map_node_data<F>(&self, graph: &Graph, f: F) -> (Graph, Vec<FieldFailure>)
    where
        F: Fn(&Value) -> (Value, Vec<FieldFailure>),
    {
        let mut out = graph.clone();
        let mut failures = Vec::new();
        for node in &mut out.nodes {
            let data = Value::Object(std::mem::take(&mut node.data));
            let (mapped, node_failures) = f(&data);
            failures.extend(node_failures.into_iter().map(|mut failure| {
                failure.path = format!("{}.{}", node.id, failure.path);
                failure
            }));
            node.data = match mapped {
                Value::Object(map) => map,
                _ => Map::new(),
            };
        }
        (out, failures)
    }
}

/// Heuristic check for values that are already encrypted.
///
/// Matches the legacy `hex:hex` shape, or strict base64 decoding to at least
/// `MIN_RECORD_LEN` bytes. Plaintext that happens to match is treated as encrypted.
pub fn is_encrypted(value: &str) -> bool {
    legacy::looks_like_legacy(value) || cipher::looks_like_record(value)
}

/// Masks a secret for display: first and last four characters around a run of `*`.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.trim().chars().collect();
    if chars.len() < 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    let stars = "*".repeat((chars.len() - 8).max(4));
    format!("{head}{stars}{tail}")
}

/// Hex encoding of `len` random bytes.
pub fn generate_token(len: usize) -> Result<String, CodecError> {
    use ring::rand::SecureRandom;

    let mut buf = vec![0u8; len];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| CodecError::RandomnessUnavailable)?;
    Ok(hex::encode(buf))
}

/// Compares two secrets in constant time with respect to their contents.
pub fn secure_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> FieldCodec {
        FieldCodec::new(MasterKey::new("k".repeat(32)).unwrap())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn prop_roundtrip_recovers_plaintext(text in "[a-zA-Z0-9 _\\-]{1,64}") {
            prop_assume!(!text.trim().is_empty());
            let codec = codec();
            let record = codec.encrypt(&text).unwrap();
            prop_assert!(is_encrypted(&record));
            prop_assert_eq!(codec.decrypt(&record).unwrap(), text);
        }
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("short"), "***");
        assert_eq!(mask_secret("sk-1234567890abcd"), "sk-1*********abcd");
        assert_eq!(mask_secret("abcdefgh"), "abcd****efgh");
    }

    #[test]
    fn test_generate_token_length() {
        let token = generate_token(16).unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_secure_compare() {
        assert!(secure_compare("same-secret", "same-secret"));
        assert!(!secure_compare("same-secret", "same-secreT"));
        assert!(!secure_compare("a", "ab"));
    }
}
