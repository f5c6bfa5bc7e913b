//! Facade over the event, payload and envelope operations.

use crate::config::EnvelopeConfig;
use crate::nostr::giftwrap::{self, UnwrappedGift};
use crate::nostr::{self, encryption, Event, Keypair, PublicKey, Result, SecretKey, Tag};

/// Core interface for courier functionality.
///
/// This struct serves as the main entry point for transport and feature
/// layers: building and verifying events, encrypting payloads, and sealing
/// or unwrapping private envelopes with one validated [`EnvelopeConfig`].
#[derive(Debug, Clone, Default)]
pub struct CourierCore {
    config: EnvelopeConfig,
}

impl CourierCore {
    /// Creates a new `CourierCore` with the default configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_core::CourierCore;
    ///
    /// let core = CourierCore::new();
    /// assert_eq!(core.config().timestamp_jitter_secs, 172_800);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `CourierCore` with `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::nostr::NostrError::InvalidConfig`] if `config` is invalid.
    pub fn with_config(config: EnvelopeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &EnvelopeConfig {
        &self.config
    }

    /// Builds and signs an event of `kind`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn build_and_sign(
        &self,
        kind: u16,
        tags: Vec<Tag>,
        content: &str,
        created_at: i64,
        keypair: &Keypair,
    ) -> Result<Event> {
        nostr::build_and_sign(kind, tags, content, created_at, keypair)
    }

    /// Verifies an event's id and signature.
    #[must_use]
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn verify(&self, event: &Event) -> bool {
        nostr::verify(event)
    }

    /// Encrypts `plaintext` from `secret` to `public`.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range plaintext or invalid keys.
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn encrypt(
        &self,
        plaintext: &str,
        secret: &SecretKey,
        public: &PublicKey,
    ) -> Result<String> {
        encryption::encrypt(plaintext, secret, public)
    }

    /// Decrypts a payload exchanged between `secret` and `public`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::nostr::NostrError::DecryptionFailed`] for any rejected payload.
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn decrypt(
        &self,
        payload: &str,
        secret: &SecretKey,
        public: &PublicKey,
    ) -> Result<String> {
        encryption::decrypt(payload, secret, public)
    }

    /// Seals `rumor` for `recipient`.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::seal`].
    pub fn seal(
        &self,
        rumor: &Event,
        recipient: &PublicKey,
        sender: &Keypair,
        created_at: Option<i64>,
    ) -> Result<Event> {
        giftwrap::seal_with(
            rumor,
            recipient,
            sender,
            created_at,
            &self.config,
            &mut rand::rngs::OsRng,
        )
    }

    /// Gift-wraps `seal` for `recipient`.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::gift_wrap`].
    pub fn gift_wrap(
        &self,
        seal: &Event,
        recipient: &PublicKey,
        extra_tags: Vec<Tag>,
        created_at: Option<i64>,
    ) -> Result<Event> {
        giftwrap::gift_wrap_with(
            seal,
            recipient,
            extra_tags,
            created_at,
            &self.config,
            &mut rand::rngs::OsRng,
        )
    }

    /// Seals and gift-wraps `rumor` for `recipient`.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::wrap_rumor`].
    ///
    /// # Examples
    ///
    /// ```
    /// use courier_core::nostr::{EventBuilder, Keypair, KIND_TEXT_NOTE};
    /// use courier_core::CourierCore;
    ///
    /// let core = CourierCore::new();
    /// let alice = Keypair::generate();
    /// let bob = Keypair::generate();
    ///
    /// let rumor = EventBuilder::new(KIND_TEXT_NOTE, "hi").build(*alice.public_key());
    /// let wrap = core.wrap_rumor(&rumor, bob.public_key(), &alice, Vec::new(), None).unwrap();
    /// assert!(core.verify(&wrap));
    /// assert_eq!(core.unwrap_and_unseal(&wrap, bob.secret_key()).unwrap(), rumor);
    /// ```
    pub fn wrap_rumor(
        &self,
        rumor: &Event,
        recipient: &PublicKey,
        sender: &Keypair,
        extra_tags: Vec<Tag>,
        created_at: Option<i64>,
    ) -> Result<Event> {
        giftwrap::wrap_rumor_with(
            rumor,
            recipient,
            sender,
            extra_tags,
            created_at,
            &self.config,
            &mut rand::rngs::OsRng,
        )
    }

    /// Decrypts a gift wrap down to its verified seal.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::unwrap`].
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn unwrap(&self, gift_wrap: &Event, recipient: &SecretKey) -> Result<Event> {
        giftwrap::unwrap(gift_wrap, recipient)
    }

    /// Decrypts a seal down to its rumor.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::unseal`].
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn unseal(&self, seal: &Event, recipient: &SecretKey) -> Result<Event> {
        giftwrap::unseal(seal, recipient)
    }

    /// Unwraps and unseals a gift wrap down to its rumor.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::unwrap_and_unseal`].
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn unwrap_and_unseal(&self, gift_wrap: &Event, recipient: &SecretKey) -> Result<Event> {
        giftwrap::unwrap_and_unseal(gift_wrap, recipient)
    }

    /// Unwraps a gift wrap, returning sender, seal and rumor.
    ///
    /// # Errors
    ///
    /// See [`giftwrap::unwrap_gift`].
    #[allow(clippy::unused_self)] // Stateless pass-through.
    pub fn unwrap_gift(
        &self,
        gift_wrap: &Event,
        recipient: &SecretKey,
    ) -> Result<UnwrappedGift> {
        giftwrap::unwrap_gift(gift_wrap, recipient)
    }
}
