//! Error types for Nostr operations.
//!
//! Failures fall into three groups:
//! - input validation (bad keys, bad plaintext length, sealing a signed event),
//!   reported before any cryptography runs
//! - cryptographic failures, all reported as [`NostrError::DecryptionFailed`]
//!   so callers cannot distinguish a bad MAC from a bad version byte
//! - encoding failures on successfully decrypted plaintext (UTF-8, JSON)

use thiserror::Error;

use super::encryption::PayloadError;

/// Errors that can occur during Nostr event construction, signing and encryption.
#[derive(Error, Debug)]
pub enum NostrError {
    /// Caller supplied a field combination that cannot form a valid event.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Secret key bytes are not a valid secp256k1 scalar.
    #[error("Invalid secret key: {0}")]
    KeyInvalid(String),

    /// Public key bytes are not a valid x-only secp256k1 point.
    #[error("Invalid public key: {0}")]
    PubkeyInvalid(String),

    /// Signature bytes have the wrong length or encoding.
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// Plaintext byte length outside `[1, 65535]`.
    #[error("Invalid plaintext length: {0} bytes")]
    InvalidPlaintextLength(usize),

    /// Payload could not be decrypted.
    #[error("Decryption failed")]
    DecryptionFailed,

    /// Decrypted plaintext is not valid UTF-8.
    #[error("Decrypted content is not valid UTF-8")]
    Utf8EncodingFailed,

    /// Decrypted plaintext is not a valid event document.
    #[error("JSON decoding failed: {0}")]
    JsonDecodingFailed(String),

    /// Serialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Attempted to seal an event that already carries a signature.
    #[error("Cannot seal a signed event")]
    SealSignedEvent,

    /// An unsealed rumor carried a signature.
    #[error("Rumor must not carry a signature")]
    SignedRumor,

    /// Event has an unexpected kind.
    #[error("Invalid kind: expected {expected}, got {got}")]
    InvalidKind {
        /// Kind required by the operation.
        expected: u16,
        /// Kind found on the event.
        got: u16,
    },

    /// Seal carried public tags.
    #[error("Seal must not carry tags")]
    SealHasTags,

    /// Seal arrived without a signature.
    #[error("Seal is not signed")]
    UnsignedSeal,

    /// Event signature verification failed.
    #[error("Invalid event signature")]
    InvalidSignature,

    /// Event id does not match its fields.
    #[error("Event ID mismatch")]
    IdMismatch,

    /// Rumor author differs from the seal signer.
    #[error("Rumor author does not match seal signer")]
    SenderMismatch,

    /// Hex encoding/decoding error.
    #[error("Hex encoding error: {0}")]
    HexError(String),

    /// Configuration value out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for Nostr operations.
pub type Result<T> = std::result::Result<T, NostrError>;

impl From<hex::FromHexError> for NostrError {
    fn from(e: hex::FromHexError) -> Self {
        Self::HexError(e.to_string())
    }
}

impl From<PayloadError> for NostrError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::InvalidPlaintextLength(len) => Self::InvalidPlaintextLength(len),
            other => {
                tracing::debug!(reason = %other, "payload rejected");
                Self::DecryptionFailed
            }
        }
    }
}
