//! Key agreement and key derivation for the version 2 payload scheme.
//!
//! ```text
//! shared_x          = x(ECDH(secret_a, public_b))        (== x(ECDH(secret_b, public_a)))
//! conversation_key  = HKDF-extract(salt = "nip44-v2", ikm = shared_x)
//! message_keys      = HKDF-expand(prk = conversation_key, info = nonce, L = 76)
//!                   = chacha_key[32] || chacha_nonce[12] || hmac_key[32]
//! ```

use hkdf::Hkdf;
use secp256k1::ecdh::shared_secret_point;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::PayloadError;
use crate::nostr::error::Result;
use crate::nostr::keys::{PublicKey, SecretKey};

const SALT: &[u8] = b"nip44-v2";

/// Symmetric key shared by one sender/receiver key pair.
///
/// Independent of any particular message, so it can be derived once per
/// correspondent and reused. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ConversationKey([u8; 32]);

impl ConversationKey {
    /// Derives the conversation key between `secret` and `public`.
    ///
    /// Symmetric: `derive(a, B) == derive(b, A)`.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::encryption::ConversationKey;
    /// use courier_core::nostr::Keypair;
    ///
    /// let alice = Keypair::generate();
    /// let bob = Keypair::generate();
    /// let ab = ConversationKey::derive(alice.secret_key(), bob.public_key()).unwrap();
    /// let ba = ConversationKey::derive(bob.secret_key(), alice.public_key()).unwrap();
    /// assert_eq!(ab.as_bytes(), ba.as_bytes());
    /// ```
    pub fn derive(secret: &SecretKey, public: &PublicKey) -> Result<Self> {
        let point = public.to_point()?;
        let secret_key = secret.to_secp()?;

        let shared = Zeroizing::new(shared_secret_point(&point, &secret_key));
        let (prk, _) = Hkdf::<Sha256>::extract(Some(SALT), &shared[..32]);

        let mut key = [0u8; 32];
        key.copy_from_slice(&prk);
        Ok(Self(key))
    }

    /// Wraps precomputed conversation key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Expands per-message keys for `nonce`.
    pub(super) fn message_keys(
        &self,
        nonce: &[u8; 32],
    ) -> std::result::Result<MessageKeys, PayloadError> {
        let hk = Hkdf::<Sha256>::from_prk(&self.0)
            .map_err(|e| PayloadError::KeyDerivation(e.to_string()))?;

        let mut okm = Zeroizing::new([0u8; 76]);
        hk.expand(nonce, okm.as_mut_slice())
            .map_err(|e| PayloadError::KeyDerivation(e.to_string()))?;

        let mut keys = MessageKeys {
            chacha_key: [0u8; 32],
            chacha_nonce: [0u8; 12],
            hmac_key: [0u8; 32],
        };
        keys.chacha_key.copy_from_slice(&okm[0..32]);
        keys.chacha_nonce.copy_from_slice(&okm[32..44]);
        keys.hmac_key.copy_from_slice(&okm[44..76]);
        Ok(keys)
    }
}

impl std::fmt::Debug for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ConversationKey(<redacted>)")
    }
}

/// Per-message keys; the MAC key is independent of the cipher key.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(super) struct MessageKeys {
    pub(super) chacha_key: [u8; 32],
    pub(super) chacha_nonce: [u8; 12],
    pub(super) hmac_key: [u8; 32],
}
