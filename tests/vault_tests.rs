//! Integration tests for the vault session and the encrypted item record.

use zerovault::boundary::{validate_untrusted_metadata, SecretInput, SecretPayload};
use zerovault::crypto::KdfParams;
use zerovault::errors::VaultError;
use zerovault::vault::{EncryptedItem, SecretType, SessionPolicy, VaultSession};

/// Floor-level scrypt params so tests stay fast.
fn fast_params() -> KdfParams {
    KdfParams::scrypt(1 << 14, 8, 1)
}

fn unlocked_session() -> (VaultSession, zerovault::crypto::VaultKeyBundle) {
    VaultSession::create(b"master-password", fast_params(), SessionPolicy::default())
        .expect("create vault")
}

fn password_input(password: &str) -> SecretInput {
    SecretInput::Password {
        title: "Gmail".into(),
        username: "ada".into(),
        website: "mail.google.com".into(),
        password: password.into(),
        notes: Some("recovery codes in drawer".into()),
    }
}

// ---------------------------------------------------------------------------
// Seal / open round-trip
// ---------------------------------------------------------------------------

#[test]
fn seal_and_open_password_roundtrip() {
    let (mut session, _bundle) = unlocked_session();

    let item = session
        .seal_secret("item-1", password_input("correct horse"))
        .expect("seal");

    assert_eq!(item.id, "item-1");
    assert_eq!(item.secret_type, SecretType::Password);

    let payload = session.open_secret(&item).expect("open");
    match payload {
        SecretPayload::Password {
            ref password,
            ref notes,
        } => {
            assert_eq!(password, "correct horse");
            assert_eq!(notes.as_deref(), Some("recovery codes in drawer"));
        }
        ref other => panic!("wrong payload variant: {other:?}"),
    }
}

#[test]
fn seal_and_open_env_vars_roundtrip() {
    let (mut session, _bundle) = unlocked_session();

    let input = SecretInput::EnvVars {
        title: "backend".into(),
        description: "production".into(),
        variables: vec![
            zerovault::boundary::EnvVar {
                key: "DB_URL".into(),
                value: "postgres://user:pw@db/prod".into(),
            },
            zerovault::boundary::EnvVar {
                key: "API_TOKEN".into(),
                value: "tok_secret".into(),
            },
        ],
        notes: None,
    };

    let item = session.seal_secret("item-env", input).expect("seal");
    assert_eq!(item.secret_type, SecretType::EnvVars);

    let payload = session.open_secret(&item).expect("open");
    match payload {
        SecretPayload::EnvVars { ref variables, .. } => {
            assert_eq!(variables.len(), 2);
            assert_eq!(variables[0].value, "postgres://user:pw@db/prod");
        }
        ref other => panic!("wrong payload variant: {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Unlock round-trip through the persisted bundle
// ---------------------------------------------------------------------------

#[test]
fn items_survive_lock_and_reunlock() {
    let (mut session, bundle) = unlocked_session();
    let item = session
        .seal_secret("item-1", password_input("hunter2"))
        .expect("seal");
    session.lock();

    let mut session2 = VaultSession::unlock(&bundle, b"master-password", SessionPolicy::default())
        .expect("unlock");
    let payload = session2.open_secret(&item).expect("open");
    match payload {
        SecretPayload::Password { ref password, .. } => assert_eq!(password, "hunter2"),
        ref other => panic!("wrong payload variant: {other:?}"),
    }
}

#[test]
fn unlock_with_wrong_password_is_a_generic_failure() {
    let (_, bundle) = unlocked_session();

    let result = VaultSession::unlock(&bundle, b"wrong-password", SessionPolicy::default());
    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn rotated_bundle_opens_old_items_with_the_new_password() {
    let (mut session, bundle) = unlocked_session();
    let item = session
        .seal_secret("item-1", password_input("hunter2"))
        .expect("seal");

    let rotated = bundle
        .rotate(b"master-password", b"new-master", fast_params())
        .expect("rotate");

    let mut session2 =
        VaultSession::unlock(&rotated, b"new-master", SessionPolicy::default()).expect("unlock");
    assert!(session2.open_secret(&item).is_ok());
}

// ---------------------------------------------------------------------------
// Wire record
// ---------------------------------------------------------------------------

#[test]
fn item_wire_record_is_camel_case_with_base64_blobs() {
    let (mut session, _bundle) = unlocked_session();
    let item = session
        .seal_secret("item-1", password_input("correct horse"))
        .expect("seal");

    let json = serde_json::to_value(&item).expect("serialize");

    assert_eq!(json["secretType"], "PASSWORD");
    assert!(json["ciphertext"].is_string());
    assert!(json["nonce"].is_string());
    assert_eq!(json["metadata"]["type"], "PASSWORD");
    assert_eq!(json["metadata"]["passwordLength"], 13);
    assert_eq!(json["metadata"]["hasNotes"], true);

    let back: EncryptedItem = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, item);
}

#[test]
fn serialized_item_never_contains_plaintext() {
    let (mut session, _bundle) = unlocked_session();
    let item = session
        .seal_secret("item-1", password_input("correct horse"))
        .expect("seal");

    let json = serde_json::to_string(&item).expect("serialize");
    assert!(!json.contains("correct horse"));
    assert!(!json.contains("recovery codes"));
}

#[test]
fn item_metadata_passes_the_receiving_side_validator() {
    let (mut session, _bundle) = unlocked_session();
    let item = session
        .seal_secret("item-1", password_input("correct horse"))
        .expect("seal");

    // What the server runs before persisting: the same validation the
    // client ran, on the untyped wire value.
    let wire = serde_json::to_value(&item).expect("serialize");
    assert!(validate_untrusted_metadata(&wire["metadata"]).is_ok());
}

#[test]
fn tampered_item_fails_to_open() {
    let (mut session, _bundle) = unlocked_session();
    let mut item = session
        .seal_secret("item-1", password_input("hunter2"))
        .expect("seal");

    item.ciphertext[0] ^= 0xFF;

    let result = session.open_secret(&item);
    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}
