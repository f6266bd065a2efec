use super::key::MasterKey;
use crate::error::CodecError;
use aes_gcm::AesGcm;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use std::num::NonZeroU32;

/// AES-256-GCM with a 16-byte nonce, as stored records use.
pub(crate) type Aes256Gcm16 = AesGcm<Aes256, U16>;

pub const SALT_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const TAG_LEN: usize = 16;
pub const KEY_LEN: usize = 32;
/// salt, IV and tag, plus at least one byte of ciphertext.
pub const MIN_RECORD_LEN: usize = SALT_LEN + IV_LEN + TAG_LEN + 1;

const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(100_000) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

fn derive_key(master: &MasterKey, salt: &[u8]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        PBKDF2_ITERATIONS,
        salt,
        master.as_bytes(),
        &mut key,
    );
    key
}

pub(crate) fn random_bytes<const N: usize>(rng: &SystemRandom) -> Result<[u8; N], CodecError> {
    let mut buf = [0u8; N];
    rng.fill(&mut buf).map_err(|_| CodecError::RandomnessUnavailable)?;
    Ok(buf)
}

/// Encrypts `plaintext` into `base64(salt | iv | tag | ciphertext)` with a fresh salt and IV.
pub(crate) fn seal(master: &MasterKey, plaintext: &str) -> Result<String, CodecError> {
    if plaintext.trim().is_empty() {
        return Err(CodecError::EmptyInput);
    }

    let rng = SystemRandom::new();
    let salt: [u8; SALT_LEN] = random_bytes(&rng)?;
    let iv: [u8; IV_LEN] = random_bytes(&rng)?;

    let key = derive_key(master, &salt);
    let cipher =
        Aes256Gcm16::new_from_slice(&key).map_err(|_| CodecError::EncryptionFailed)?;
    // aead appends the tag; the record stores it before the ciphertext
    let sealed = cipher
        .encrypt(GenericArray::from_slice(&iv), plaintext.as_bytes())
        .map_err(|_| CodecError::EncryptionFailed)?;
    let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

    let mut record = Vec::with_capacity(SALT_LEN + IV_LEN + sealed.len());
    record.extend_from_slice(&salt);
    record.extend_from_slice(&iv);
    record.extend_from_slice(tag);
    record.extend_from_slice(ciphertext);
    Ok(base64::encode(record))
}

/// Opens a record produced by `seal`.
pub(crate) fn open(master: &MasterKey, record: &str) -> Result<String, CodecError> {
    let data =
        base64::decode(record.trim()).map_err(|e| CodecError::MalformedRecord(e.to_string()))?;
    if data.len() < MIN_RECORD_LEN {
        return Err(CodecError::RecordTooShort {
            len: data.len(),
            min: MIN_RECORD_LEN,
        });
    }

    let (salt, rest) = data.split_at(SALT_LEN);
    let (iv, rest) = rest.split_at(IV_LEN);
    let (tag, ciphertext) = rest.split_at(TAG_LEN);

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let key = derive_key(master, salt);
    let cipher =
        Aes256Gcm16::new_from_slice(&key).map_err(|_| CodecError::AuthenticationFailed)?;
    let plaintext = cipher
        .decrypt(GenericArray::from_slice(iv), sealed.as_slice())
        .map_err(|_| CodecError::AuthenticationFailed)?;

    String::from_utf8(plaintext).map_err(|_| CodecError::InvalidUtf8)
}

/// `true` when `value` is strict base64 long enough to be a record.
pub(crate) fn looks_like_record(value: &str) -> bool {
    base64::decode(value).is_ok_and(|data| data.len() >= MIN_RECORD_LEN)
}
