//! Integration tests for the ZeroVault crypto module.

use zerovault::crypto::{
    decrypt_item, derive_kek, encrypt_item, generate_salt, unwrap, wrap, KdfParams, VaultKey,
    VaultKeyBundle,
};
use zerovault::errors::VaultError;

/// Floor-level scrypt params so tests stay fast.
fn fast_params() -> KdfParams {
    KdfParams::scrypt(1 << 14, 8, 1)
}

// ---------------------------------------------------------------------------
// KDF determinism and sensitivity
// ---------------------------------------------------------------------------

#[test]
fn derive_kek_same_inputs_same_output() {
    let salt = generate_salt();
    let params = fast_params();

    let kek1 = derive_kek(b"my-master-password", &salt, &params).expect("derive 1");
    let kek2 = derive_kek(b"my-master-password", &salt, &params).expect("derive 2");

    assert_eq!(
        kek1.as_bytes(),
        kek2.as_bytes(),
        "same password + salt + params must produce the same KEK"
    );
}

#[test]
fn derive_kek_different_passwords_different_keys() {
    let salt = generate_salt();
    let params = fast_params();

    let kek1 = derive_kek(b"password-one", &salt, &params).expect("derive 1");
    let kek2 = derive_kek(b"password-two", &salt, &params).expect("derive 2");

    assert_ne!(kek1.as_bytes(), kek2.as_bytes());
}

#[test]
fn derive_kek_different_salts_different_keys() {
    let params = fast_params();
    let salt1 = generate_salt();
    let salt2 = generate_salt();

    let kek1 = derive_kek(b"same-password", &salt1, &params).expect("derive 1");
    let kek2 = derive_kek(b"same-password", &salt2, &params).expect("derive 2");

    assert_ne!(kek1.as_bytes(), kek2.as_bytes());
}

#[test]
fn legacy_and_current_versions_coexist() {
    let salt = generate_salt();

    let legacy = derive_kek(b"pw", &salt, &KdfParams::legacy(100_000)).expect("legacy derive");
    let current = derive_kek(b"pw", &salt, &fast_params()).expect("current derive");

    // Different algorithms must not collide on the same inputs.
    assert_ne!(legacy.as_bytes(), current.as_bytes());
}

#[test]
fn legacy_derivation_is_deterministic() {
    let salt = generate_salt();
    let params = KdfParams::legacy(100_000);

    let kek1 = derive_kek(b"pw", &salt, &params).expect("derive 1");
    let kek2 = derive_kek(b"pw", &salt, &params).expect("derive 2");
    assert_eq!(kek1.as_bytes(), kek2.as_bytes());
}

// ---------------------------------------------------------------------------
// Item cipher round-trip and authentication
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = VaultKey::generate();
    let plaintext = b"{\"type\":\"PASSWORD\",\"password\":\"hunter2\"}";

    let (ciphertext, nonce) = encrypt_item(&key, plaintext).expect("encrypt");

    // Ciphertext carries a 16-byte tag.
    assert!(ciphertext.len() > plaintext.len());
    assert_eq!(nonce.len(), 12);

    let recovered = decrypt_item(&key, &ciphertext, &nonce).expect("decrypt");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypting_twice_yields_fresh_nonces_and_ciphertexts() {
    let key = VaultKey::generate();
    let plaintext = b"same plaintext";

    let (ct1, nonce1) = encrypt_item(&key, plaintext).expect("encrypt 1");
    let (ct2, nonce2) = encrypt_item(&key, plaintext).expect("encrypt 2");

    assert_ne!(nonce1, nonce2, "every encryption must use a fresh nonce");
    assert_ne!(ct1, ct2);
}

#[test]
fn decrypt_with_wrong_key_fails_authentication() {
    let key = VaultKey::generate();
    let wrong_key = VaultKey::generate();

    let (ciphertext, nonce) = encrypt_item(&key, b"top secret").expect("encrypt");
    let result = decrypt_item(&wrong_key, &ciphertext, &nonce);

    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn any_ciphertext_bit_flip_fails_authentication() {
    let key = VaultKey::generate();
    let (ciphertext, nonce) = encrypt_item(&key, b"integrity matters").expect("encrypt");

    for index in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[index] ^= 0x01;

        let result = decrypt_item(&key, &tampered, &nonce);
        assert!(
            matches!(result, Err(VaultError::AuthenticationFailure)),
            "bit flip at byte {index} must fail authentication"
        );
    }
}

#[test]
fn nonce_bit_flip_fails_authentication() {
    let key = VaultKey::generate();
    let (ciphertext, nonce) = encrypt_item(&key, b"integrity matters").expect("encrypt");

    let mut tampered = nonce.clone();
    tampered[0] ^= 0xFF;

    let result = decrypt_item(&key, &ciphertext, &tampered);
    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn truncated_nonce_fails_authentication() {
    let key = VaultKey::generate();
    let (ciphertext, _) = encrypt_item(&key, b"x").expect("encrypt");

    let result = decrypt_item(&key, &ciphertext, &[0u8; 5]);
    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

// ---------------------------------------------------------------------------
// Vault key wrap/unwrap
// ---------------------------------------------------------------------------

#[test]
fn wrap_unwrap_roundtrip() {
    let salt = generate_salt();
    let kek = derive_kek(b"master", &salt, &fast_params()).expect("derive");
    let vault_key = VaultKey::generate();

    let wrapped = wrap(&vault_key, &kek).expect("wrap");
    let unwrapped = unwrap(&wrapped, &kek).expect("unwrap");

    assert_eq!(vault_key.as_bytes(), unwrapped.as_bytes());
}

#[test]
fn unwrap_with_wrong_kek_fails_closed() {
    let salt = generate_salt();
    let kek = derive_kek(b"master", &salt, &fast_params()).expect("derive");
    let wrong_kek = derive_kek(b"not-master", &salt, &fast_params()).expect("derive");

    let wrapped = wrap(&VaultKey::generate(), &kek).expect("wrap");
    let result = unwrap(&wrapped, &wrong_kek);

    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn wrapping_twice_never_repeats_the_nonce() {
    let salt = generate_salt();
    let kek = derive_kek(b"master", &salt, &fast_params()).expect("derive");
    let vault_key = VaultKey::generate();

    let first = wrap(&vault_key, &kek).expect("wrap 1");
    let second = wrap(&vault_key, &kek).expect("wrap 2");

    assert_ne!(first.to_bytes(), second.to_bytes());
    assert_ne!(&first.to_bytes()[..12], &second.to_bytes()[..12]);
}

// ---------------------------------------------------------------------------
// Bundle: create, unlock, rotate, wire format
// ---------------------------------------------------------------------------

#[test]
fn bundle_create_then_unlock_recovers_the_vault_key() {
    let (bundle, vault_key) = VaultKeyBundle::create(b"master", fast_params()).expect("create");

    let unlocked = bundle.unlock(b"master").expect("unlock");
    assert_eq!(vault_key.as_bytes(), unlocked.as_bytes());
}

#[test]
fn bundle_unlock_with_wrong_password_fails_generically() {
    let (bundle, _) = VaultKeyBundle::create(b"master", fast_params()).expect("create");

    let result = bundle.unlock(b"guess");
    assert!(matches!(result, Err(VaultError::AuthenticationFailure)));
}

#[test]
fn rotate_keeps_items_decryptable() {
    let (bundle, vault_key) = VaultKeyBundle::create(b"old-password", fast_params()).expect("create");

    let (ciphertext, nonce) = encrypt_item(&vault_key, b"survives rotation").expect("encrypt");

    let rotated = bundle
        .rotate(b"old-password", b"new-password", fast_params())
        .expect("rotate");

    // Old password no longer works; the new one does.
    assert!(rotated.unlock(b"old-password").is_err());
    let new_key = rotated.unlock(b"new-password").expect("unlock");

    let recovered = decrypt_item(&new_key, &ciphertext, &nonce).expect("decrypt");
    assert_eq!(recovered, b"survives rotation");
}

#[test]
fn rotate_upgrades_legacy_kdf_params() {
    // A vault created under the legacy KDF, rotated onto the current one.
    let salt = generate_salt();
    let legacy = KdfParams::legacy(100_000);
    let kek = derive_kek(b"master", &salt, &legacy).expect("derive");
    let vault_key = VaultKey::generate();
    let bundle = VaultKeyBundle {
        encrypted_vault_key: wrap(&vault_key, &kek).expect("wrap"),
        salt: salt.to_vec(),
        kdf_params: legacy,
    };
    assert!(bundle.kdf_params.needs_upgrade());

    let rotated = bundle
        .rotate(b"master", b"master", fast_params())
        .expect("rotate");

    assert!(!rotated.kdf_params.needs_upgrade());
    let recovered = rotated.unlock(b"master").expect("unlock");
    assert_eq!(recovered.as_bytes(), vault_key.as_bytes());
}

#[test]
fn bundle_wire_format_roundtrip() {
    let (bundle, _) = VaultKeyBundle::create(b"master", fast_params()).expect("create");

    let json = serde_json::to_value(&bundle).expect("serialize");

    // encryptedVaultKey is a single base64 string of nonce || ciphertext.
    let encoded = json["encryptedVaultKey"].as_str().expect("base64 string");
    use base64::Engine;
    let raw = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .expect("valid base64");
    assert_eq!(raw.len(), 12 + 32 + 16, "nonce + key + tag");

    assert!(json["salt"].is_string());
    assert_eq!(json["kdfParams"]["version"], 2);
    assert_eq!(json["kdfParams"]["N"], 1 << 14);

    let back: VaultKeyBundle = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, bundle);
    back.unlock(b"master").expect("unlock after roundtrip");
}
