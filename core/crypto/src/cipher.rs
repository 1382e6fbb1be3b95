//! Symmetric encryption with an explicit per-call IV.
//!
//! Two suites are supported:
//! - [`CipherSuite::Aes256Cbc`] — the default. PKCS#7 padding, no integrity
//!   tag: a wrong key usually surfaces as a padding failure, but a
//!   corrupted ciphertext of valid block length may decrypt to garbage that
//!   only fails further downstream.
//! - [`CipherSuite::XChaCha20Poly1305`] — authenticated. Any tampering or
//!   wrong key is rejected by the Poly1305 tag before plaintext is
//!   released.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{Key, XChaCha20Poly1305, XNonce};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::keys::{Iv, SymmetricKey, KEY_LENGTH};
use ludosafe_common::{Error, Result};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Symmetric cipher suite identifier.
///
/// The serialized form is the algorithm id stored in envelope metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CipherSuite {
    #[serde(rename = "aes-256-cbc")]
    Aes256Cbc,
    #[serde(rename = "xchacha20-poly1305")]
    XChaCha20Poly1305,
}

impl CipherSuite {
    /// Key length in bytes (256-bit for both suites).
    pub fn key_length(self) -> usize {
        KEY_LENGTH
    }

    /// Required IV length in bytes.
    pub fn iv_length(self) -> usize {
        match self {
            CipherSuite::Aes256Cbc => 16,
            CipherSuite::XChaCha20Poly1305 => 24,
        }
    }

    /// Whether the suite authenticates the ciphertext.
    pub fn is_authenticated(self) -> bool {
        matches!(self, CipherSuite::XChaCha20Poly1305)
    }
}

impl Default for CipherSuite {
    fn default() -> Self {
        CipherSuite::Aes256Cbc
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CipherSuite::Aes256Cbc => write!(f, "aes-256-cbc"),
            CipherSuite::XChaCha20Poly1305 => write!(f, "xchacha20-poly1305"),
        }
    }
}

/// Encrypt a plaintext buffer.
///
/// # Preconditions
/// - `iv` must be [`CipherSuite::iv_length`] bytes and freshly random;
///   reusing an IV under the same key breaks confidentiality
///
/// # Errors
/// - Returns [`Error::InvalidInput`] if the IV length does not match the
///   suite
/// - Returns [`Error::Encryption`] if the cipher fails
pub fn encrypt(
    suite: CipherSuite,
    key: &SymmetricKey,
    iv: &Iv,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    check_iv(suite, iv)?;

    match suite {
        CipherSuite::Aes256Cbc => {
            let cipher = Aes256CbcEnc::new_from_slices(key.as_bytes(), iv.as_bytes())
                .map_err(|e| Error::Encryption(format!("Cipher setup failed: {}", e)))?;
            Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
        }
        CipherSuite::XChaCha20Poly1305 => {
            let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
            cipher
                .encrypt(XNonce::from_slice(iv.as_bytes()), plaintext)
                .map_err(|e| Error::Encryption(format!("Encryption failed: {}", e)))
        }
    }
}

/// Decrypt a ciphertext buffer.
///
/// # Errors
/// - Returns [`Error::InvalidInput`] if the IV length does not match the
///   suite
/// - Returns [`Error::Decryption`] on wrong key, corrupted ciphertext, or
///   padding failure. For `Aes256Cbc` this is the only signal a caller gets
///   to distinguish "wrong password" from "corrupted data"; for
///   `XChaCha20Poly1305` the tag check makes the rejection reliable.
pub fn decrypt(
    suite: CipherSuite,
    key: &SymmetricKey,
    iv: &Iv,
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    check_iv(suite, iv)?;

    match suite {
        CipherSuite::Aes256Cbc => {
            let cipher = Aes256CbcDec::new_from_slices(key.as_bytes(), iv.as_bytes())
                .map_err(|e| Error::Decryption(format!("Cipher setup failed: {}", e)))?;
            cipher
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
                .map_err(|_| {
                    Error::Decryption(
                        "Invalid padding (wrong password or corrupted ciphertext)".to_string(),
                    )
                })
        }
        CipherSuite::XChaCha20Poly1305 => {
            let cipher = XChaCha20Poly1305::new(Key::from_slice(key.as_bytes()));
            cipher
                .decrypt(XNonce::from_slice(iv.as_bytes()), ciphertext)
                .map_err(|_| {
                    Error::Decryption(
                        "Authentication failed (wrong password or tampered ciphertext)".to_string(),
                    )
                })
        }
    }
}

fn check_iv(suite: CipherSuite, iv: &Iv) -> Result<()> {
    if iv.len() != suite.iv_length() {
        return Err(Error::InvalidInput(format!(
            "Invalid IV length for {}: expected {}, got {}",
            suite,
            suite.iv_length(),
            iv.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(byte: u8) -> SymmetricKey {
        SymmetricKey::from_bytes([byte; KEY_LENGTH])
    }

    #[test]
    fn test_cbc_roundtrip() {
        let key = test_key(42);
        let iv = Iv::generate(16).unwrap();
        let plaintext = b"{\"name\":\"A\",\"items\":[1,2,3]}";

        let ciphertext = encrypt(CipherSuite::Aes256Cbc, &key, &iv, plaintext).unwrap();
        assert_ne!(&ciphertext[..], &plaintext[..]);

        let decrypted = decrypt(CipherSuite::Aes256Cbc, &key, &iv, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_cbc_pads_to_block_boundary() {
        let key = test_key(42);
        let iv = Iv::generate(16).unwrap();

        for len in [0usize, 1, 15, 16, 17, 100] {
            let plaintext = vec![7u8; len];
            let ciphertext = encrypt(CipherSuite::Aes256Cbc, &key, &iv, &plaintext).unwrap();
            assert_eq!(ciphertext.len() % 16, 0);
            assert!(ciphertext.len() > len);

            let decrypted = decrypt(CipherSuite::Aes256Cbc, &key, &iv, &ciphertext).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn test_cbc_wrong_key_does_not_recover_plaintext() {
        let key = test_key(1);
        let wrong = test_key(2);
        let iv = Iv::generate(16).unwrap();
        let plaintext = b"{\"secret\":\"structured json payload\"}";

        let ciphertext = encrypt(CipherSuite::Aes256Cbc, &key, &iv, plaintext).unwrap();

        // CBC has no integrity tag: the usual outcome is a padding error,
        // but a wrong key can occasionally unpad to garbage. Either way the
        // original plaintext must not come back.
        match decrypt(CipherSuite::Aes256Cbc, &wrong, &iv, &ciphertext) {
            Err(Error::Decryption(_)) => {}
            Err(other) => panic!("unexpected error kind: {other}"),
            Ok(garbage) => assert_ne!(garbage, plaintext),
        }
    }

    #[test]
    fn test_cbc_truncated_ciphertext_fails() {
        let key = test_key(42);
        let iv = Iv::generate(16).unwrap();

        let ciphertext = encrypt(CipherSuite::Aes256Cbc, &key, &iv, b"some plaintext").unwrap();
        let truncated = &ciphertext[..ciphertext.len() - 3];

        assert!(matches!(
            decrypt(CipherSuite::Aes256Cbc, &key, &iv, truncated),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_cbc_empty_ciphertext_fails() {
        let key = test_key(42);
        let iv = Iv::generate(16).unwrap();

        assert!(decrypt(CipherSuite::Aes256Cbc, &key, &iv, &[]).is_err());
    }

    #[test]
    fn test_cbc_wrong_iv_length_rejected() {
        let key = test_key(42);
        let iv = Iv::generate(24).unwrap();

        assert!(matches!(
            encrypt(CipherSuite::Aes256Cbc, &key, &iv, b"data"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_xchacha_roundtrip() {
        let key = test_key(42);
        let iv = Iv::generate(24).unwrap();
        let plaintext = b"Authenticated payload";

        let ciphertext = encrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, plaintext).unwrap();
        let decrypted = decrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, &ciphertext).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_xchacha_wrong_key_fails() {
        let key = test_key(1);
        let wrong = test_key(2);
        let iv = Iv::generate(24).unwrap();

        let ciphertext = encrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, b"secret").unwrap();

        assert!(matches!(
            decrypt(CipherSuite::XChaCha20Poly1305, &wrong, &iv, &ciphertext),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_xchacha_tampered_ciphertext_fails() {
        let key = test_key(42);
        let iv = Iv::generate(24).unwrap();

        let mut ciphertext =
            encrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, b"important data").unwrap();
        ciphertext[5] ^= 0xFF;

        assert!(matches!(
            decrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, &ciphertext),
            Err(Error::Decryption(_))
        ));
    }

    #[test]
    fn test_fresh_ivs_give_distinct_ciphertexts() {
        let key = test_key(42);
        let plaintext = b"same plaintext";

        let iv1 = Iv::generate(16).unwrap();
        let iv2 = Iv::generate(16).unwrap();
        let ct1 = encrypt(CipherSuite::Aes256Cbc, &key, &iv1, plaintext).unwrap();
        let ct2 = encrypt(CipherSuite::Aes256Cbc, &key, &iv2, plaintext).unwrap();

        assert_ne!(ct1, ct2);
    }

    #[test]
    fn test_suite_serialized_ids() {
        assert_eq!(
            serde_json::to_string(&CipherSuite::Aes256Cbc).unwrap(),
            "\"aes-256-cbc\""
        );
        assert_eq!(
            serde_json::to_string(&CipherSuite::XChaCha20Poly1305).unwrap(),
            "\"xchacha20-poly1305\""
        );
    }

    #[test]
    fn test_empty_plaintext_roundtrip() {
        let key = test_key(42);

        let iv = Iv::generate(16).unwrap();
        let ct = encrypt(CipherSuite::Aes256Cbc, &key, &iv, b"").unwrap();
        assert_eq!(decrypt(CipherSuite::Aes256Cbc, &key, &iv, &ct).unwrap(), b"");

        let iv = Iv::generate(24).unwrap();
        let ct = encrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, b"").unwrap();
        assert_eq!(
            decrypt(CipherSuite::XChaCha20Poly1305, &key, &iv, &ct).unwrap(),
            b""
        );
    }
}
