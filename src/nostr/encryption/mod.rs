//! Versioned payload encryption (NIP-44 version 2).
//!
//! Encrypts a UTF-8 string from one key holder to another so that either
//! party can decrypt it, with integrity protection and length-hiding padding.
//!
//! # Wire format
//!
//! ```text
//! base64( version[1] = 0x02 || nonce[32] || ciphertext[padded_len + 2] || mac[32] )
//! mac = HMAC-SHA256(hmac_key, nonce || ciphertext)
//! ```
//!
//! # Decryption order
//!
//! Structural checks, then the MAC is recomputed and compared in constant
//! time. Nothing is decrypted or unpadded until the MAC matches.
//!
//! The high-level functions return [`NostrError`] and report every
//! cryptographic failure as [`NostrError::DecryptionFailed`]. The byte-level
//! functions return the detailed [`PayloadError`].

mod conversation;
mod padding;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use chacha20::ChaCha20;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

pub use conversation::ConversationKey;
pub use padding::{calc_padded_len, MAX_PLAINTEXT_SIZE, MIN_PLAINTEXT_SIZE};

use crate::nostr::error::{NostrError, Result};
use crate::nostr::keys::{PublicKey, SecretKey};

/// Payload version byte produced by this scheme.
pub const VERSION: u8 = 2;

const NONCE_SIZE: usize = 32;
const MAC_SIZE: usize = 32;
const MIN_ENCODED_LEN: usize = 132;
const MAX_ENCODED_LEN: usize = 87_472;
const MIN_DECODED_LEN: usize = 99;
const MAX_DECODED_LEN: usize = 65_603;

type HmacSha256 = Hmac<Sha256>;

/// Detailed payload failures.
///
/// Only the byte-level API exposes these; converting into [`NostrError`]
/// collapses every cryptographic cause into `DecryptionFailed`.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PayloadError {
    /// Plaintext byte length outside `[1, 65535]`.
    #[error("invalid plaintext length: {0}")]
    InvalidPlaintextLength(usize),

    /// Version byte is not one this implementation understands.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// Payload is not valid base64 or has an impossible length.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// MAC did not match.
    #[error("invalid MAC")]
    MacMismatch,

    /// Length prefix or padding is inconsistent.
    #[error("invalid padding")]
    InvalidPadding,

    /// HKDF rejected its input.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
}

/// Encrypts `plaintext` from `secret` to `public` with a random nonce.
///
/// # Errors
///
/// - [`NostrError::InvalidPlaintextLength`] if the plaintext is empty or
///   longer than 65535 bytes
/// - key errors if either key is invalid
///
/// # Example
///
/// ```
/// use courier_core::nostr::encryption::{decrypt, encrypt};
/// use courier_core::nostr::Keypair;
///
/// let alice = Keypair::generate();
/// let bob = Keypair::generate();
///
/// let payload = encrypt("hello", alice.secret_key(), bob.public_key()).unwrap();
/// let plaintext = decrypt(&payload, bob.secret_key(), alice.public_key()).unwrap();
/// assert_eq!(plaintext, "hello");
/// ```
pub fn encrypt(plaintext: &str, secret: &SecretKey, public: &PublicKey) -> Result<String> {
    encrypt_with_rng(plaintext, secret, public, &mut OsRng)
}

/// Encrypts `plaintext` drawing the nonce from `rng`.
///
/// # Errors
///
/// Same as [`encrypt`].
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    plaintext: &str,
    secret: &SecretKey,
    public: &PublicKey,
    rng: &mut R,
) -> Result<String> {
    check_plaintext_len(plaintext)?;
    let key = ConversationKey::derive(secret, public)?;
    encrypt_with_conversation_key(plaintext, &key, rng)
}

/// Encrypts with an already derived conversation key.
///
/// # Errors
///
/// Returns [`NostrError::InvalidPlaintextLength`] for out-of-range plaintext.
pub fn encrypt_with_conversation_key<R: RngCore + CryptoRng>(
    plaintext: &str,
    key: &ConversationKey,
    rng: &mut R,
) -> Result<String> {
    check_plaintext_len(plaintext)?;
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);
    Ok(encrypt_with_nonce(plaintext, key, &nonce)?)
}

/// Encrypts with an explicit nonce.
///
/// Reusing a nonce with the same conversation key breaks confidentiality;
/// this exists for reproducing published test vectors.
///
/// # Errors
///
/// Returns [`PayloadError::InvalidPlaintextLength`] for out-of-range plaintext.
pub fn encrypt_with_nonce(
    plaintext: &str,
    key: &ConversationKey,
    nonce: &[u8; 32],
) -> std::result::Result<String, PayloadError> {
    let mut buffer = padding::pad(plaintext.as_bytes())?;
    let keys = key.message_keys(nonce)?;

    let mut cipher = ChaCha20::new(&keys.chacha_key.into(), &keys.chacha_nonce.into());
    cipher.apply_keystream(&mut buffer);

    let mac = compute_mac(&keys.hmac_key, nonce, &buffer)?;

    let mut payload = Vec::with_capacity(1 + NONCE_SIZE + buffer.len() + MAC_SIZE);
    payload.push(VERSION);
    payload.extend_from_slice(nonce);
    payload.extend_from_slice(&buffer);
    payload.extend_from_slice(&mac);

    Ok(BASE64.encode(payload))
}

/// Decrypts a payload sent between `secret`'s holder and `public`'s holder.
///
/// # Errors
///
/// - [`NostrError::DecryptionFailed`] for any malformed, unsupported or
///   tampered payload, or the wrong keys
/// - [`NostrError::Utf8EncodingFailed`] if the plaintext is not UTF-8
pub fn decrypt(payload: &str, secret: &SecretKey, public: &PublicKey) -> Result<String> {
    let key = ConversationKey::derive(secret, public)?;
    decrypt_with_conversation_key(payload, &key)
}

/// Decrypts with an already derived conversation key.
///
/// # Errors
///
/// Same as [`decrypt`].
pub fn decrypt_with_conversation_key(payload: &str, key: &ConversationKey) -> Result<String> {
    let plaintext = decrypt_to_bytes(payload, key)?;
    String::from_utf8(plaintext).map_err(|_| NostrError::Utf8EncodingFailed)
}

/// Decrypts a payload to raw bytes, reporting the detailed failure.
///
/// # Errors
///
/// Returns the [`PayloadError`] describing why the payload was rejected.
pub fn decrypt_to_bytes(
    payload: &str,
    key: &ConversationKey,
) -> std::result::Result<Vec<u8>, PayloadError> {
    if payload.starts_with('#') {
        return Err(PayloadError::UnsupportedVersion(b'#'));
    }
    if !(MIN_ENCODED_LEN..=MAX_ENCODED_LEN).contains(&payload.len()) {
        return Err(PayloadError::MalformedPayload(format!(
            "encoded length {} out of range",
            payload.len()
        )));
    }

    let decoded = BASE64
        .decode(payload)
        .map_err(|e| PayloadError::MalformedPayload(e.to_string()))?;

    match decoded.first() {
        Some(&VERSION) => {}
        Some(&other) => return Err(PayloadError::UnsupportedVersion(other)),
        None => return Err(PayloadError::MalformedPayload("empty payload".to_string())),
    }
    if !(MIN_DECODED_LEN..=MAX_DECODED_LEN).contains(&decoded.len()) {
        return Err(PayloadError::MalformedPayload(format!(
            "decoded length {} out of range",
            decoded.len()
        )));
    }

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(&decoded[1..=NONCE_SIZE]);
    let ciphertext = &decoded[1 + NONCE_SIZE..decoded.len() - MAC_SIZE];
    let given_mac = &decoded[decoded.len() - MAC_SIZE..];

    let keys = key.message_keys(&nonce)?;
    let expected_mac = compute_mac(&keys.hmac_key, &nonce, ciphertext)?;
    if !bool::from(expected_mac.as_slice().ct_eq(given_mac)) {
        return Err(PayloadError::MacMismatch);
    }

    let mut buffer = ciphertext.to_vec();
    let mut cipher = ChaCha20::new(&keys.chacha_key.into(), &keys.chacha_nonce.into());
    cipher.apply_keystream(&mut buffer);

    Ok(padding::unpad(&buffer)?.to_vec())
}

fn check_plaintext_len(plaintext: &str) -> Result<()> {
    let len = plaintext.len();
    if (MIN_PLAINTEXT_SIZE..=MAX_PLAINTEXT_SIZE).contains(&len) {
        Ok(())
    } else {
        Err(NostrError::InvalidPlaintextLength(len))
    }
}

fn compute_mac(
    hmac_key: &[u8; 32],
    nonce: &[u8; 32],
    ciphertext: &[u8],
) -> std::result::Result<[u8; 32], PayloadError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(hmac_key)
        .map_err(|e| PayloadError::KeyDerivation(e.to_string()))?;
    mac.update(nonce);
    mac.update(ciphertext);

    let mut out = [0u8; MAC_SIZE];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}
