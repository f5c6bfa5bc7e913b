//! Key material and BIP-340 Schnorr signatures.
//!
//! [`SecretKey`] is a validated secp256k1 scalar whose bytes are zeroized on
//! drop. [`PublicKey`] is the 32-byte x-only point used in event `pubkey`
//! fields; it is not secret and is freely copied. A [`Keypair`] exclusively
//! owns its secret key and caches the derived public key.

use std::fmt;
use std::sync::LazyLock;

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secp256k1::{schnorr, Message, Parity, Secp256k1, XOnlyPublicKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::nostr::error::{NostrError, Result};

/// Global secp256k1 context for cryptographic operations.
///
/// Creating a `Secp256k1` context is expensive as it precomputes tables
/// for signing and verification. This shared context is initialized once
/// and reused across all operations.
///
/// # Thread Safety
///
/// The `Secp256k1` context is `Send + Sync`, making it safe to share
/// across threads.
pub static SECP: LazyLock<Secp256k1<secp256k1::All>> = LazyLock::new(Secp256k1::new);

/// A 32-byte x-only secp256k1 public key.
///
/// Always holds a point that lies on the curve; constructors reject anything else.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Creates a public key from its 32 x-only bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::PubkeyInvalid`] if the bytes are not a point on the curve.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        XOnlyPublicKey::from_slice(&bytes)
            .map_err(|e| NostrError::PubkeyInvalid(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Creates a public key from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::PubkeyInvalid`] if the slice is not 32 bytes or
    /// not a point on the curve.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 32] = bytes.try_into().map_err(|_| {
            NostrError::PubkeyInvalid(format!("expected 32 bytes, got {}", bytes.len()))
        })?;
        Self::from_bytes(array)
    }

    /// Parses a 64-character hex public key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::PubkeyInvalid`] for wrong length, bad hex or an
    /// off-curve point.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::{Keypair, PublicKey};
    ///
    /// let keypair = Keypair::generate();
    /// let hex = keypair.public_key().to_hex();
    /// assert_eq!(PublicKey::from_hex(&hex).unwrap(), *keypair.public_key());
    /// ```
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str).map_err(|e| NostrError::PubkeyInvalid(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Returns the key as a 64-character lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the raw x-only bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub(crate) fn x_only(&self) -> Result<XOnlyPublicKey> {
        XOnlyPublicKey::from_slice(&self.0).map_err(|e| NostrError::PubkeyInvalid(e.to_string()))
    }

    /// The full point with even y, as BIP-340 lifts x-only keys.
    pub(crate) fn to_point(&self) -> Result<secp256k1::PublicKey> {
        Ok(secp256k1::PublicKey::from_x_only_public_key(
            self.x_only()?,
            Parity::Even,
        ))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A validated secp256k1 secret scalar.
///
/// The bytes are zeroized when the key is dropped, and `Debug` never prints them.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Generates a new random secret key from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new random secret key from the supplied RNG.
    #[must_use]
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let secret = secp256k1::SecretKey::new(rng);
        Self(secret.secret_bytes())
    }

    /// Creates a secret key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the bytes are zero or not below
    /// the curve order.
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self> {
        secp256k1::SecretKey::from_slice(&bytes)
            .map_err(|e| NostrError::KeyInvalid(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Parses a 64-character hex secret key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] for wrong length, bad hex or an
    /// out-of-range scalar.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let mut bytes = [0u8; 32];
        let result = hex::decode_to_slice(hex_str, &mut bytes)
            .map_err(|e| NostrError::KeyInvalid(e.to_string()))
            .and_then(|()| Self::from_bytes(bytes));
        bytes.zeroize();
        result
    }

    /// Derives the x-only public key for this secret.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the stored scalar is invalid,
    /// which cannot happen for keys built through the public constructors.
    pub fn public_key(&self) -> Result<PublicKey> {
        let keypair = secp256k1::Keypair::from_secret_key(&SECP, &self.to_secp()?);
        let (xonly, _parity) = keypair.x_only_public_key();
        Ok(PublicKey(xonly.serialize()))
    }

    /// Returns the secret as hex for user-initiated export.
    ///
    /// # Security Warning
    ///
    /// The returned string is not zeroized. Handle with care.
    #[must_use]
    pub fn to_secret_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub(crate) fn to_secp(&self) -> Result<secp256k1::SecretKey> {
        secp256k1::SecretKey::from_slice(&self.0).map_err(|e| NostrError::KeyInvalid(e.to_string()))
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret key
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A 64-byte BIP-340 Schnorr signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    /// Wraps raw signature bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Creates a signature from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidSignatureFormat`] if the slice is not 64 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; 64] = bytes.try_into().map_err(|_| {
            NostrError::InvalidSignatureFormat(format!("expected 64 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(array))
    }

    /// Parses a 128-character hex signature.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidSignatureFormat`] for wrong length or bad hex.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes =
            hex::decode(hex_str).map_err(|e| NostrError::InvalidSignatureFormat(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Returns the signature as a 128-character lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the raw signature bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A secret key together with its derived public key.
///
/// # Security
///
/// - The secret key is zeroized on drop via `ZeroizeOnDrop`
/// - `Debug` output shows only the public key
/// - Ephemeral keypairs for gift wraps are created per message and dropped
///   immediately after signing
///
/// # Example
///
/// ```
/// use courier_core::nostr::Keypair;
///
/// let keypair = Keypair::generate();
/// assert_eq!(keypair.public_key().to_hex().len(), 64);
/// ```
#[derive(Clone, ZeroizeOnDrop)]
pub struct Keypair {
    secret: SecretKey,

    /// Cached public key (not sensitive, skip zeroization)
    #[zeroize(skip)]
    public: PublicKey,
}

impl Keypair {
    /// Generates a new random keypair from the operating system RNG.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generates a new random keypair from the supplied RNG.
    #[must_use]
    pub fn generate_with<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let keypair = secp256k1::Keypair::new(&SECP, rng);
        let (xonly, _parity) = keypair.x_only_public_key();
        Self {
            secret: SecretKey(keypair.secret_bytes()),
            public: PublicKey(xonly.serialize()),
        }
    }

    /// Builds a keypair around an existing secret key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the secret is not a valid scalar.
    pub fn from_secret_key(secret: SecretKey) -> Result<Self> {
        let public = secret.public_key()?;
        Ok(Self { secret, public })
    }

    /// Creates a keypair from raw secret key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the bytes are not a valid scalar.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::Keypair;
    ///
    /// let mut bytes = [0u8; 32];
    /// bytes[31] = 1;
    /// assert!(Keypair::from_secret_bytes(bytes).is_ok());
    /// assert!(Keypair::from_secret_bytes([0u8; 32]).is_err());
    /// ```
    pub fn from_secret_bytes(bytes: [u8; 32]) -> Result<Self> {
        Self::from_secret_key(SecretKey::from_bytes(bytes)?)
    }

    /// Creates a keypair from a hex-encoded secret key.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the hex is malformed or out of range.
    pub fn from_secret_hex(hex_str: &str) -> Result<Self> {
        Self::from_secret_key(SecretKey::from_hex(hex_str)?)
    }

    /// Returns the x-only public key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.public
    }

    /// Returns the secret key.
    #[must_use]
    pub const fn secret_key(&self) -> &SecretKey {
        &self.secret
    }

    /// Signs a 32-byte digest with fresh auxiliary randomness from the OS RNG.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the secret key is not a valid scalar.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<Signature> {
        self.sign_with_rng(digest, &mut OsRng)
    }

    /// Signs a 32-byte digest drawing auxiliary randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if the secret key is not a valid scalar.
    pub fn sign_with_rng<R: RngCore + CryptoRng>(
        &self,
        digest: &[u8; 32],
        rng: &mut R,
    ) -> Result<Signature> {
        let mut aux = [0u8; 32];
        rng.fill_bytes(&mut aux);
        let result = sign(digest, &self.secret, &aux);
        aux.zeroize();
        result
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print the secret key
        f.debug_struct("Keypair")
            .field("pubkey", &self.public.to_hex())
            .finish()
    }
}

/// Produces a BIP-340 Schnorr signature over a 32-byte digest.
///
/// `aux_rand` is mixed into nonce generation and must be fresh for every call.
///
/// # Errors
///
/// Returns [`NostrError::KeyInvalid`] if `secret` is not a valid scalar.
pub fn sign(digest: &[u8; 32], secret: &SecretKey, aux_rand: &[u8; 32]) -> Result<Signature> {
    let secret_key = secret.to_secp()?;
    let keypair = secp256k1::Keypair::from_secret_key(&SECP, &secret_key);
    let message = Message::from_digest(*digest);
    let signature = SECP.sign_schnorr_with_aux_rand(&message, &keypair, aux_rand);
    Ok(Signature(signature.serialize()))
}

/// Verifies a BIP-340 Schnorr signature over a 32-byte digest.
///
/// Never fails structurally: any invalid input yields `false`.
#[must_use]
pub fn verify(digest: &[u8; 32], pubkey: &PublicKey, signature: &Signature) -> bool {
    let Ok(xonly) = pubkey.x_only() else {
        return false;
    };
    let Ok(sig) = schnorr::Signature::from_slice(&signature.0) else {
        return false;
    };
    let message = Message::from_digest(*digest);
    SECP.verify_schnorr(&sig, &message, &xonly).is_ok()
}

/// Verifies a signature given as raw slices.
///
/// Returns `false` when any slice has the wrong length.
#[must_use]
pub fn verify_bytes(digest: &[u8], pubkey: &[u8], signature: &[u8]) -> bool {
    let Ok(digest) = <[u8; 32]>::try_from(digest) else {
        return false;
    };
    let Ok(pubkey) = PublicKey::from_slice(pubkey) else {
        return false;
    };
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    verify(&digest, &pubkey, &signature)
}
