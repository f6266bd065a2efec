use super::cipher::{Aes256Gcm16, TAG_LEN};
use super::key::MasterKey;
use crate::error::CodecError;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

pub const LEGACY_IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Ways older releases wrote `hex(iv):hex(ciphertext)` records, tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyStrategy {
    /// AES-256-GCM with the 16-byte tag stored in front of the ciphertext.
    GcmTagPrefixed,
    /// AES-256-CBC with PKCS#7 padding.
    Cbc,
}

pub const LEGACY_STRATEGIES: &[LegacyStrategy] =
    &[LegacyStrategy::GcmTagPrefixed, LegacyStrategy::Cbc];

impl LegacyStrategy {
    pub fn name(self) -> &'static str {
        match self {
            LegacyStrategy::GcmTagPrefixed => "aes-256-gcm",
            LegacyStrategy::Cbc => "aes-256-cbc",
        }
    }

    fn open(self, key: &[u8; 32], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, String> {
        match self {
            LegacyStrategy::GcmTagPrefixed => open_gcm_tag_prefixed(key, iv, ciphertext),
            LegacyStrategy::Cbc => open_cbc(key, iv, ciphertext),
        }
    }
}

/// The dispatch rule for `decrypt`: has a colon and no base64 padding.
pub(crate) fn is_legacy_shape(record: &str) -> bool {
    record.contains(':') && !record.contains('=')
}

/// The `is_encrypted` heuristic: exactly two non-empty hex halves around one colon.
pub(crate) fn looks_like_legacy(value: &str) -> bool {
    let mut parts = value.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(ct), None) => is_hex(iv) && is_hex(ct),
        _ => false,
    }
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Opens a legacy record. The key is SHA-256 of the master key.
pub(crate) fn open(master: &MasterKey, record: &str) -> Result<String, CodecError> {
    let parts: Vec<&str> = record.trim().split(':').collect();
    let [iv_hex, ct_hex] = parts.as_slice() else {
        return Err(CodecError::InvalidLegacyFormat(format!(
            "expected '<iv>:<ciphertext>', found {} part(s)",
            parts.len()
        )));
    };
    if iv_hex.is_empty() || ct_hex.is_empty() {
        return Err(CodecError::InvalidLegacyFormat(
            "empty iv or ciphertext".to_string(),
        ));
    }

    let iv = hex::decode(iv_hex)
        .map_err(|e| CodecError::InvalidLegacyFormat(format!("iv is not hex: {e}")))?;
    let ciphertext = hex::decode(ct_hex)
        .map_err(|e| CodecError::InvalidLegacyFormat(format!("ciphertext is not hex: {e}")))?;

    if iv.len() != LEGACY_IV_LEN {
        return Err(CodecError::InvalidIvLength {
            expected: LEGACY_IV_LEN,
            actual: iv.len(),
        });
    }

    let key: [u8; 32] = Sha256::digest(master.as_bytes()).into();

    let mut last_failure = String::from("no strategy applied");
    for strategy in LEGACY_STRATEGIES {
        match strategy.open(&key, &iv, &ciphertext) {
            Ok(plaintext) => {
                debug!(strategy = strategy.name(), "opened legacy record");
                return String::from_utf8(plaintext).map_err(|_| CodecError::InvalidUtf8);
            }
            Err(reason) => {
                warn!(strategy = strategy.name(), %reason, "legacy strategy failed");
                last_failure = format!("{}: {}", strategy.name(), reason);
            }
        }
    }

    Err(CodecError::LegacyDecryptionFailed(last_failure))
}

fn open_gcm_tag_prefixed(key: &[u8; 32], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, String> {
    if ciphertext.len() < TAG_LEN {
        return Err("ciphertext shorter than the authentication tag".to_string());
    }
    let (tag, body) = ciphertext.split_at(TAG_LEN);
    let mut sealed = Vec::with_capacity(ciphertext.len());
    sealed.extend_from_slice(body);
    sealed.extend_from_slice(tag);

    let cipher = Aes256Gcm16::new_from_slice(key).map_err(|e| e.to_string())?;
    cipher
        .decrypt(GenericArray::from_slice(iv), sealed.as_slice())
        .map_err(|_| "authentication failed".to_string())
}

fn open_cbc(key: &[u8; 32], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, String> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(format!(
            "ciphertext length {} is not a positive multiple of {}",
            ciphertext.len(),
            BLOCK_LEN
        ));
    }

    cbc::Decryptor::<Aes256>::new_from_slices(key, iv)
        .map_err(|e| e.to_string())?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| "bad decrypt: invalid padding".to_string())
}
