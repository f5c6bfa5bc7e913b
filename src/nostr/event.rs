//! The universal Nostr event value type.
//!
//! An [`Event`] is built once from its fields, its id is computed at
//! construction, and signing is terminal:
//! - `Event` with `sig: None` is a **rumor**: it has a well-formed id but is
//!   never treated as authenticated
//! - `Event` with `sig: Some(_)` is signed and must verify against its id
//!
//! Feature-kind modules layer their own tag and content conventions on top
//! of [`EventBuilder`] and [`build_and_sign`].

use std::fmt;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::nostr::codec;
use crate::nostr::error::{NostrError, Result};
use crate::nostr::keys::{self, Keypair, PublicKey, Signature};
use crate::nostr::tags::{self, Tag, TagBuilder};

/// Event kind for short text notes.
pub const KIND_TEXT_NOTE: u16 = 1;

/// Event kind for seals (NIP-59), the sender-signed inner envelope.
pub const KIND_SEAL: u16 = 13;

/// Event kind for private direct messages (NIP-17), carried as rumors.
pub const KIND_PRIVATE_DIRECT_MESSAGE: u16 = 14;

/// Event kind for gift wraps (NIP-59), the ephemeral-signed outer envelope.
pub const KIND_GIFT_WRAP: u16 = 1059;

/// Returns the current Unix time in seconds.
#[must_use]
pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// A 32-byte event id: SHA-256 of the canonical serialization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId([u8; 32]);

impl EventId {
    /// Computes the id for the given signable fields.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::{EventId, Keypair};
    ///
    /// let keypair = Keypair::generate();
    /// let a = EventId::compute(keypair.public_key(), 1, 1, &[], "hello");
    /// let b = EventId::compute(keypair.public_key(), 1, 1, &[], "hello");
    /// assert_eq!(a, b);
    /// ```
    #[must_use]
    pub fn compute(
        pubkey: &PublicKey,
        created_at: i64,
        kind: u16,
        tags: &[Tag],
        content: &str,
    ) -> Self {
        let serialized = codec::serialize(pubkey, created_at, kind, tags, content);
        Self(Sha256::digest(&serialized).into())
    }

    /// Wraps raw id bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a 64-character hex id.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::HexError`] for bad hex and
    /// [`NostrError::InvalidInput`] for the wrong length.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let bytes = hex::decode(hex_str)?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| NostrError::InvalidInput("event id must be 32 bytes".to_string()))?;
        Ok(Self(array))
    }

    /// Returns the id as a 64-character lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns the raw id bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventId({})", self.to_hex())
    }
}

impl Serialize for EventId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EventId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// A Nostr event.
///
/// # Structure
///
/// ```json
/// {
///   "id": "...",           // SHA256 of [0, pubkey, created_at, kind, tags, content]
///   "pubkey": "...",       // x-only author key
///   "created_at": 123456,  // Unix timestamp
///   "kind": 1,
///   "tags": [["p", "..."]],
///   "content": "...",
///   "sig": "..."           // Schnorr signature, absent on rumors
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    pubkey: PublicKey,
    created_at: i64,
    kind: u16,
    tags: Vec<Tag>,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sig: Option<Signature>,
}

impl Event {
    /// Builds an unsigned event (a rumor) and computes its id.
    #[must_use]
    pub fn rumor(
        pubkey: PublicKey,
        created_at: i64,
        kind: u16,
        tags: Vec<Tag>,
        content: String,
    ) -> Self {
        let id = EventId::compute(&pubkey, created_at, kind, &tags, &content);
        Self {
            id,
            pubkey,
            created_at,
            kind,
            tags,
            content,
            sig: None,
        }
    }

    /// Signs this rumor, consuming it.
    ///
    /// # Errors
    ///
    /// - [`NostrError::InvalidInput`] if the event is already signed or the
    ///   keypair does not own `pubkey`
    /// - [`NostrError::IdMismatch`] if the stored id no longer matches the fields
    /// - [`NostrError::KeyInvalid`] if signing fails
    pub fn sign(self, keypair: &Keypair) -> Result<Self> {
        self.sign_with_rng(keypair, &mut OsRng)
    }

    /// Signs this rumor drawing auxiliary randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sign`].
    pub fn sign_with_rng<R: RngCore + CryptoRng>(
        mut self,
        keypair: &Keypair,
        rng: &mut R,
    ) -> Result<Self> {
        if self.sig.is_some() {
            return Err(NostrError::InvalidInput(
                "event is already signed".to_string(),
            ));
        }
        if keypair.public_key() != &self.pubkey {
            return Err(NostrError::InvalidInput(
                "keypair does not match event pubkey".to_string(),
            ));
        }
        if !self.check_id() {
            return Err(NostrError::IdMismatch);
        }
        self.sig = Some(keypair.sign_with_rng(self.id.as_bytes(), rng)?);
        Ok(self)
    }

    /// Event id.
    #[must_use]
    pub const fn id(&self) -> &EventId {
        &self.id
    }

    /// Author public key.
    #[must_use]
    pub const fn pubkey(&self) -> &PublicKey {
        &self.pubkey
    }

    /// Unix timestamp in seconds.
    #[must_use]
    pub const fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Event kind.
    #[must_use]
    pub const fn kind(&self) -> u16 {
        self.kind
    }

    /// Event tags in order.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Event content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Signature, absent on rumors.
    #[must_use]
    pub const fn sig(&self) -> Option<&Signature> {
        self.sig.as_ref()
    }

    /// Returns true if this event carries no signature.
    #[must_use]
    pub const fn is_rumor(&self) -> bool {
        self.sig.is_none()
    }

    /// Recomputes the id from the fields and compares it in constant time.
    #[must_use]
    pub fn check_id(&self) -> bool {
        let computed = EventId::compute(
            &self.pubkey,
            self.created_at,
            self.kind,
            &self.tags,
            &self.content,
        );
        computed.as_bytes().ct_eq(self.id.as_bytes()).into()
    }

    /// Verifies the signature against the stored id.
    ///
    /// Rumors always return `false`.
    #[must_use]
    pub fn verify_signature(&self) -> bool {
        self.sig
            .as_ref()
            .is_some_and(|sig| keys::verify(self.id.as_bytes(), &self.pubkey, sig))
    }

    /// Verifies both the id and the signature.
    ///
    /// Rumors and events whose id does not match their fields return `false`.
    #[must_use]
    pub fn verify(&self) -> bool {
        self.check_id() && self.verify_signature()
    }

    /// Returns the second element of the first tag named `name`.
    #[must_use]
    pub fn first_tag_value(&self, name: &str) -> Option<&str> {
        tags::first_tag_value(&self.tags, name)
    }

    /// Public keys named by `p` tags, skipping malformed ones.
    #[must_use]
    pub fn recipients(&self) -> Vec<PublicKey> {
        tags::tag_values(&self.tags, "p")
            .filter_map(|hex| PublicKey::from_hex(hex).ok())
            .collect()
    }

    /// Serializes this event to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| NostrError::Serialization(e.to_string()))
    }

    /// Deserializes an event from JSON without checking id or signature.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::JsonDecodingFailed`] if the JSON is not an event.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| NostrError::JsonDecodingFailed(e.to_string()))
    }
}

/// Builder for events of any kind.
///
/// # Example
///
/// ```
/// use courier_core::nostr::{EventBuilder, Keypair, KIND_TEXT_NOTE};
///
/// let keypair = Keypair::generate();
/// let event = EventBuilder::new(KIND_TEXT_NOTE, "hello")
///     .created_at(1_700_000_000)
///     .sign(&keypair)
///     .unwrap();
/// assert!(event.verify());
/// ```
#[derive(Debug, Clone)]
pub struct EventBuilder {
    kind: u16,
    tags: Vec<Tag>,
    content: String,
    created_at: Option<i64>,
}

impl EventBuilder {
    /// Starts a builder for `kind` with `content`.
    #[must_use]
    pub fn new(kind: u16, content: impl Into<String>) -> Self {
        Self {
            kind,
            tags: Vec::new(),
            content: content.into(),
            created_at: None,
        }
    }

    /// Appends a tag.
    #[must_use]
    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Appends several tags in order.
    #[must_use]
    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Sets the timestamp; defaults to now.
    #[must_use]
    pub const fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds an unsigned rumor authored by `pubkey`.
    #[must_use]
    pub fn build(self, pubkey: PublicKey) -> Event {
        let created_at = self.created_at.unwrap_or_else(now);
        Event::rumor(pubkey, created_at, self.kind, self.tags, self.content)
    }

    /// Builds and signs the event with `keypair`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if signing fails.
    pub fn sign(self, keypair: &Keypair) -> Result<Event> {
        self.sign_with_rng(keypair, &mut OsRng)
    }

    /// Builds and signs the event drawing auxiliary randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::KeyInvalid`] if signing fails.
    pub fn sign_with_rng<R: RngCore + CryptoRng>(
        self,
        keypair: &Keypair,
        rng: &mut R,
    ) -> Result<Event> {
        self.build(*keypair.public_key()).sign_with_rng(keypair, rng)
    }
}

/// Builds and signs an event of `kind`.
///
/// # Errors
///
/// Returns [`NostrError::KeyInvalid`] if signing fails.
pub fn build_and_sign(
    kind: u16,
    tags: Vec<Tag>,
    content: impl Into<String>,
    created_at: i64,
    keypair: &Keypair,
) -> Result<Event> {
    EventBuilder::new(kind, content)
        .tags(tags)
        .created_at(created_at)
        .sign(keypair)
}

/// Verifies an event's id and signature.
#[must_use]
pub fn verify(event: &Event) -> bool {
    event.verify()
}

/// Builds a kind 14 private direct message rumor addressed to `recipients`.
///
/// The result is unsigned and meant to be sealed and gift-wrapped once per recipient.
#[must_use]
pub fn private_direct_message(
    sender: PublicKey,
    recipients: &[PublicKey],
    content: impl Into<String>,
) -> Event {
    EventBuilder::new(KIND_PRIVATE_DIRECT_MESSAGE, content)
        .tags(recipients.iter().map(TagBuilder::p_tag))
        .build(sender)
}
