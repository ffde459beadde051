//! Sealing of exchange API credentials at rest.
//!
//! Keys and secrets are stored AES-256-GCM encrypted, wrapped in a base64
//! envelope of `nonce || ciphertext`. The cipher key is derived from the
//! `CREDENTIALS_KEY` passphrase; the engine core only ever sees plaintext
//! through [`unseal`].

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("sealed credential envelope is malformed")]
    Malformed,
    #[error("credential decryption failed")]
    Decrypt,
    #[error("credential encryption failed")]
    Encrypt,
}

fn cipher(passphrase: &str) -> Aes256Gcm {
    let key = Sha256::digest(passphrase.as_bytes());
    Aes256Gcm::new(&key)
}

pub fn seal(passphrase: &str, plaintext: &str) -> Result<String, CryptoError> {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let ciphertext = cipher(passphrase)
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Encrypt)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(BASE64.encode(envelope))
}

pub fn unseal(passphrase: &str, sealed: &str) -> Result<String, CryptoError> {
    let envelope = BASE64.decode(sealed).map_err(|_| CryptoError::Malformed)?;
    if envelope.len() <= NONCE_LEN {
        return Err(CryptoError::Malformed);
    }

    let (nonce, ciphertext) = envelope.split_at(NONCE_LEN);
    let plaintext = cipher(passphrase)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| CryptoError::Decrypt)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::Decrypt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_round_trips() {
        let sealed = seal("master-key", "binance-api-secret").unwrap();
        assert_ne!(sealed, "binance-api-secret");
        assert_eq!(unseal("master-key", &sealed).unwrap(), "binance-api-secret");
    }

    #[test]
    fn unseal_rejects_wrong_passphrase() {
        let sealed = seal("master-key", "binance-api-secret").unwrap();
        assert!(matches!(
            unseal("other-key", &sealed),
            Err(CryptoError::Decrypt)
        ));
    }

    #[test]
    fn unseal_rejects_tampered_envelope() {
        let sealed = seal("master-key", "binance-api-secret").unwrap();
        let mut bytes = BASE64.decode(&sealed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = BASE64.encode(bytes);
        assert!(unseal("master-key", &tampered).is_err());
    }

    #[test]
    fn unseal_rejects_garbage() {
        assert!(matches!(
            unseal("master-key", "not base64 at all!"),
            Err(CryptoError::Malformed)
        ));
        assert!(matches!(
            unseal("master-key", "AAAA"),
            Err(CryptoError::Malformed)
        ));
    }
}
