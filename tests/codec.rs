//! Tests for the secure field codec: record format, legacy fallback and object walks.
mod common;
use aes_gcm::AesGcm;
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockEncryptMut, KeyIvInit};
use common::*;
use flowplan::config::CodecSettings;
use flowplan::prelude::*;
use flowplan::secure::{FieldCodec, MIN_RECORD_LEN};
use serde_json::json;
use sha2::{Digest, Sha256};

const LEGACY_IV: [u8; 16] = [7u8; 16];

fn legacy_key(master: &str) -> [u8; 32] {
    Sha256::digest(master.as_bytes()).into()
}

/// `hex(iv):hex(tag | ciphertext)` as written by the GCM-era legacy writer.
fn legacy_gcm_record(master: &str, plaintext: &str) -> String {
    let cipher = AesGcm::<Aes256, U16>::new_from_slice(&legacy_key(master)).unwrap();
    let sealed = cipher
        .encrypt(GenericArray::from_slice(&LEGACY_IV), plaintext.as_bytes())
        .unwrap();
    let (ct, tag) = sealed.split_at(sealed.len() - 16);
    let mut body = tag.to_vec();
    body.extend_from_slice(ct);
    format!("{}:{}", hex::encode(LEGACY_IV), hex::encode(body))
}

/// `hex(iv):hex(ciphertext)` as written by the CBC-era legacy writer.
fn legacy_cbc_record(master: &str, plaintext: &str) -> String {
    let ct = cbc::Encryptor::<Aes256>::new_from_slices(&legacy_key(master), &LEGACY_IV)
        .unwrap()
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    format!("{}:{}", hex::encode(LEGACY_IV), hex::encode(ct))
}

#[test]
fn test_roundtrip() {
    let codec = test_codec();
    let record = codec.encrypt("sk-live-abcdef").unwrap();

    assert_eq!(codec.decrypt(&record).unwrap(), "sk-live-abcdef");
    assert!(is_encrypted(&record));
    assert!(base64::decode(&record).unwrap().len() >= MIN_RECORD_LEN);
}

#[test]
fn test_encryption_is_not_deterministic() {
    let codec = test_codec();
    let first = codec.encrypt("same input").unwrap();
    let second = codec.encrypt("same input").unwrap();

    assert_ne!(first, second);
    assert_eq!(codec.decrypt(&first).unwrap(), codec.decrypt(&second).unwrap());
}

#[test]
fn test_tampered_record_fails_authentication() {
    let codec = test_codec();
    let raw = base64::decode(codec.encrypt("secret value").unwrap()).unwrap();

    // Salt, IV, tag and ciphertext bytes alike; the flipped bit walks through each byte.
    for position in 0..raw.len() {
        let mut tampered = raw.clone();
        tampered[position] ^= 1 << (position % 8);

        let err = codec.decrypt(&base64::encode(&tampered)).unwrap_err();
        assert_eq!(
            err,
            CodecError::AuthenticationFailed,
            "byte {position} flipped"
        );
        assert!(err.is_wrong_key_or_tampered());
        assert!(!err.is_corrupted());
    }
}

#[test]
fn test_wrong_master_key_fails_authentication() {
    let record = test_codec().encrypt("secret value").unwrap();
    let other = FieldCodec::new(MasterKey::new("another-master-key-of-enough-length!").unwrap());

    assert_eq!(
        other.decrypt(&record).unwrap_err(),
        CodecError::AuthenticationFailed
    );
}

#[test]
fn test_short_and_malformed_records() {
    let codec = test_codec();

    let short = base64::encode([0u8; 64]);
    assert_eq!(
        codec.decrypt(&short).unwrap_err(),
        CodecError::RecordTooShort { len: 64, min: 65 }
    );

    let err = codec.decrypt("not base64 at all!").unwrap_err();
    assert!(matches!(err, CodecError::MalformedRecord(_)));
    assert!(err.is_corrupted());
}

#[test]
fn test_empty_input_is_rejected() {
    let codec = test_codec();
    assert_eq!(codec.encrypt("").unwrap_err(), CodecError::EmptyInput);
    assert_eq!(codec.encrypt("   ").unwrap_err(), CodecError::EmptyInput);
    assert_eq!(codec.decrypt("").unwrap_err(), CodecError::EmptyInput);
}

#[test]
fn test_legacy_gcm_record_decrypts() {
    let record = legacy_gcm_record(TEST_MASTER_KEY, "legacy-gcm-secret");

    assert_eq!(test_codec().decrypt(&record).unwrap(), "legacy-gcm-secret");
}

#[test]
fn test_legacy_cbc_record_decrypts() {
    let record = legacy_cbc_record(TEST_MASTER_KEY, "legacy-cbc-secret");

    assert_eq!(test_codec().decrypt(&record).unwrap(), "legacy-cbc-secret");
}

#[test]
fn test_legacy_iv_of_wrong_length_is_rejected() {
    let record = format!("{}:{}", hex::encode([1u8; 15]), hex::encode([2u8; 32]));

    let err = test_codec().decrypt(&record).unwrap_err();
    assert_eq!(
        err,
        CodecError::InvalidIvLength {
            expected: 16,
            actual: 15
        }
    );
    assert!(err.to_string().contains("Invalid IV length"));
}

#[test]
fn test_legacy_structural_errors() {
    let codec = test_codec();

    assert!(matches!(
        codec.decrypt("aa:bb:cc").unwrap_err(),
        CodecError::InvalidLegacyFormat(_)
    ));
    assert!(matches!(
        codec.decrypt(":abcd").unwrap_err(),
        CodecError::InvalidLegacyFormat(_)
    ));
    assert!(matches!(
        codec.decrypt("zz:abcd").unwrap_err(),
        CodecError::InvalidLegacyFormat(_)
    ));
}

#[test]
fn test_legacy_exhausts_all_strategies() {
    // 17 bytes: too short to authenticate as GCM, not whole blocks for CBC.
    let record = format!("{}:{}", hex::encode(LEGACY_IV), hex::encode([3u8; 17]));

    let err = test_codec().decrypt(&record).unwrap_err();
    assert!(matches!(err, CodecError::LegacyDecryptionFailed(_)));
    assert!(err.is_wrong_key_or_tampered());
}

#[test]
fn test_legacy_record_under_other_key_fails() {
    let record = legacy_gcm_record("some-other-master-key-0123456789abcdef", "secret");

    assert!(matches!(
        test_codec().decrypt(&record).unwrap_err(),
        CodecError::LegacyDecryptionFailed(_)
    ));
}

#[test]
fn test_is_encrypted_heuristic() {
    assert!(!is_encrypted("sk-plain-api-key"));
    assert!(!is_encrypted("aGVsbG8="));
    assert!(!is_encrypted("https://hooks.example.com/abc"));
    assert!(is_encrypted("0a0b0c0d:deadbeef"));
    assert!(is_encrypted(&base64::encode([9u8; 65])));
    assert!(!is_encrypted(&base64::encode([9u8; 64])));
}

#[test]
fn test_encrypt_object_seals_nested_sensitive_fields() {
    let codec = test_codec();
    let data = json!({
        "apiKey": "sk-123",
        "model": "gpt-4o",
        "password": "",
        "nested": { "password": "hunter2" },
        "accounts": [ { "username": "alice" } ],
        "temperature": 0.5
    });

    let sealed = codec.encrypt_object(&data);

    assert!(is_encrypted(sealed["apiKey"].as_str().unwrap()));
    assert!(is_encrypted(sealed["nested"]["password"].as_str().unwrap()));
    assert!(is_encrypted(sealed["accounts"][0]["username"].as_str().unwrap()));
    assert_eq!(sealed["model"], json!("gpt-4o"));
    assert_eq!(sealed["password"], json!(""));
    assert_eq!(sealed["temperature"], json!(0.5));

    assert_eq!(codec.decrypt_object(&sealed), data);
}

#[test]
fn test_encrypt_object_skips_already_encrypted_values() {
    let codec = test_codec();
    let sealed = codec.encrypt_object(&json!({ "apiKey": "sk-123" }));
    let resealed = codec.encrypt_object(&sealed);

    assert_eq!(sealed, resealed);
}

#[test]
fn test_extra_sensitive_fields() {
    let codec = test_codec().with_sensitive_field("mongoUri");
    let sealed = codec.encrypt_object(&json!({ "mongoUri": "mongodb://user:pw@host" }));

    assert!(is_encrypted(sealed["mongoUri"].as_str().unwrap()));
}

#[test]
fn test_decrypt_object_failure_policy() {
    let codec = test_codec();
    let good = codec.encrypt("still-readable").unwrap();
    let mut tampered = base64::decode(codec.encrypt("tampered").unwrap()).unwrap();
    tampered[40] ^= 0xff;
    let tampered = base64::encode(tampered);
    let bad_iv = format!("{}:{}", hex::encode([1u8; 15]), hex::encode([2u8; 32]));

    let data = json!({
        "apiKey": good,
        "password": tampered,
        "nested": { "username": bad_iv },
        "webhookUrl": "https://hooks.example.com/plain"
    });
    let (opened, failures) = codec.decrypt_object_with_report(&data);

    assert_eq!(opened["apiKey"], json!("still-readable"));
    assert_eq!(opened["password"], json!(tampered));
    assert_eq!(opened["nested"]["username"], json!(""));
    assert_eq!(opened["webhookUrl"], json!("https://hooks.example.com/plain"));

    assert_eq!(failures.len(), 2);
    let cleared = failures
        .iter()
        .find(|f| f.path == "nested.username")
        .unwrap();
    assert!(cleared.cleared);
    let kept = failures.iter().find(|f| f.path == "password").unwrap();
    assert!(!kept.cleared);
    assert_eq!(kept.error, CodecError::AuthenticationFailed);
}

#[test]
fn test_seal_and_unseal_graph() {
    let codec = test_codec();
    let graph = create_simple_workflow("query");
    assert!(codec.needs_sealing(&graph));

    let sealed = codec.seal_graph(&graph);
    assert!(!codec.needs_sealing(&sealed));
    assert_eq!(sealed.edges, graph.edges);
    assert_eq!(sealed.nodes[0], graph.nodes[0]);
    assert_ne!(sealed.nodes[1].data["apiKey"], json!("sk-test"));

    assert_eq!(codec.unseal_graph(&sealed), graph);
}

#[test]
fn test_graph_reports_name_the_failing_node() {
    let codec = test_codec();
    let graph = Graph {
        nodes: vec![
            Node::new("ai", "openai").with_data("apiKey", "sk-live"),
            Node::new("mail", "email").with_data("password", "   "),
        ],
        edges: vec![Edge::new("ai", "mail")],
    };

    let (sealed, failures) = codec.seal_graph_with_report(&graph);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "mail.password");
    assert_eq!(failures[0].error, CodecError::EmptyInput);
    assert_eq!(sealed.nodes[1].data["password"], json!("   "));

    let mut broken = sealed.clone();
    broken.nodes[0].data.insert(
        "apiKey".to_string(),
        json!(format!("{}:{}", hex::encode([1u8; 15]), hex::encode([2u8; 32]))),
    );
    let (opened, failures) = codec.unseal_graph_with_report(&broken);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].path, "ai.apiKey");
    assert!(failures[0].cleared);
    assert_eq!(opened.nodes[0].data["apiKey"], json!(""));

    let (restored, failures) = codec.unseal_graph_with_report(&sealed);
    assert!(failures.is_empty());
    assert_eq!(restored.nodes[0].data["apiKey"], json!("sk-live"));
}

#[test]
fn test_master_key_validation() {
    assert_eq!(
        MasterKey::new("too-short").unwrap_err(),
        ConfigError::MasterKeyTooShort { len: 9, min: 32 }
    );
    // The placeholder is too short to be accepted at all.
    assert!(MasterKey::new("fallback-key-change-this").is_err());

    let placeholder = MasterKey::new("change-me-to-a-random-32-character-secret").unwrap();
    assert!(placeholder.is_placeholder());

    // Length counts characters, not bytes.
    assert!(MasterKey::new("é".repeat(32)).is_ok());
    assert!(MasterKey::new("é".repeat(31)).is_err());
}

#[test]
fn test_master_key_debug_is_redacted() {
    let key = MasterKey::new(TEST_MASTER_KEY).unwrap();
    let printed = format!("{:?}", key);

    assert!(!printed.contains(TEST_MASTER_KEY));
    assert!(printed.contains("redacted"));
}

#[test]
fn test_settings_from_environment() {
    let missing = CodecSettings::from_var("FLOWPLAN_TEST_UNSET_KEY").unwrap_err();
    assert_eq!(
        missing,
        ConfigError::MissingMasterKey("FLOWPLAN_TEST_UNSET_KEY".to_string())
    );

    // SAFETY: the variable name is unique to this test.
    unsafe { std::env::set_var("FLOWPLAN_TEST_SHORT_KEY", "short") };
    assert!(matches!(
        CodecSettings::from_var("FLOWPLAN_TEST_SHORT_KEY").unwrap_err(),
        ConfigError::MasterKeyTooShort { .. }
    ));

    unsafe { std::env::set_var("FLOWPLAN_TEST_GOOD_KEY", TEST_MASTER_KEY) };
    let settings = CodecSettings::from_var("FLOWPLAN_TEST_GOOD_KEY").unwrap();
    let codec = FieldCodec::new(settings.master_key);
    let record = codec.encrypt("from env").unwrap();
    assert_eq!(test_codec().decrypt(&record).unwrap(), "from env");
}
