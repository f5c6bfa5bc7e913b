//! NIP-59 Gift Wrap for metadata-resistant event delivery.
//!
//! This module seals a rumor for one recipient and wraps the seal under a
//! single-use key, and reverses both steps on receipt.
//!
//! # Gift Wrap Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │ Layer 3: Gift Wrap (kind 1059) - PUBLIC             │
//! │ • Uses ephemeral keypair (single use)               │
//! │ • Timestamp randomized up to 48 hours back          │
//! │ • Only reveals: recipient (p-tag)                   │
//! │  ┌───────────────────────────────────────────────┐  │
//! │  │ Layer 2: Seal (kind 13) - ENCRYPTED           │  │
//! │  │ • NIP-44 encrypted for recipient              │  │
//! │  │ • Signed by sender's real key                 │  │
//! │  │ • No tags                                     │  │
//! │  │  ┌─────────────────────────────────────────┐  │  │
//! │  │  │ Layer 1: Rumor (any kind) - UNSIGNED    │  │  │
//! │  │  │ • The actual message                    │  │  │
//! │  │  │ • MUST remain unsigned                  │  │  │
//! │  │  └─────────────────────────────────────────┘  │  │
//! │  └───────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Security
//!
//! - **Metadata protection**: Sender identity hidden behind ephemeral key
//! - **Unsigned rumor**: Cannot be published as authenticated even if leaked
//! - **Ephemeral keys**: Fresh keypair per wrap, never stored
//! - **Timestamp randomization**: Up to 48 hours back to prevent timing correlation
//! - **Sender binding**: The rumor author must be the seal signer

use rand::rngs::OsRng;
use rand::{CryptoRng, Rng, RngCore};
use tracing::debug;

use super::encryption;
use super::error::{NostrError, Result};
use super::event::{now, Event, EventBuilder, KIND_GIFT_WRAP, KIND_SEAL};
use super::keys::{Keypair, PublicKey, SecretKey};
use super::tags::{Tag, TagBuilder};
use crate::config::EnvelopeConfig;

/// Result of fully unwrapping a gift wrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedGift {
    /// The sender's real public key (the seal signer).
    pub sender: PublicKey,

    /// The verified kind 13 seal.
    pub seal: Event,

    /// The unsigned rumor.
    pub rumor: Event,
}

/// Returns `now` moved back by a uniform amount in `[0, window]` seconds.
///
/// # Example
///
/// ```
/// use courier_core::nostr::giftwrap::jittered_timestamp;
/// use rand::rngs::OsRng;
///
/// let ts = jittered_timestamp(&mut OsRng, 1_700_000_000, 3600);
/// assert!((1_700_000_000 - 3600..=1_700_000_000).contains(&ts));
/// ```
pub fn jittered_timestamp<R: RngCore + CryptoRng>(rng: &mut R, now: i64, window: u32) -> i64 {
    if window == 0 {
        return now;
    }
    now - i64::from(rng.gen_range(0..=window))
}

/// Seals a rumor for `recipient` (NIP-59 kind 13).
///
/// # Arguments
///
/// * `rumor` - The unsigned event authored by `sender`
/// * `recipient` - The recipient's public key
/// * `sender` - The author's identity keys
/// * `created_at` - Seal timestamp; jittered into the past when `None`
///
/// # Errors
///
/// Returns error if:
/// - The rumor is signed ([`NostrError::SealSignedEvent`])
/// - The rumor is not authored by `sender` ([`NostrError::SenderMismatch`])
/// - The rumor's id does not match its fields ([`NostrError::IdMismatch`])
/// - Encryption or signing fails
pub fn seal(
    rumor: &Event,
    recipient: &PublicKey,
    sender: &Keypair,
    created_at: Option<i64>,
) -> Result<Event> {
    seal_with(
        rumor,
        recipient,
        sender,
        created_at,
        &EnvelopeConfig::default(),
        &mut OsRng,
    )
}

/// Seals a rumor using `config` for timestamps and `rng` for all randomness.
///
/// # Errors
///
/// Same as [`seal`].
pub fn seal_with<R: RngCore + CryptoRng>(
    rumor: &Event,
    recipient: &PublicKey,
    sender: &Keypair,
    created_at: Option<i64>,
    config: &EnvelopeConfig,
    rng: &mut R,
) -> Result<Event> {
    if !rumor.is_rumor() {
        return Err(NostrError::SealSignedEvent);
    }
    if rumor.pubkey() != sender.public_key() {
        return Err(NostrError::SenderMismatch);
    }
    if !rumor.check_id() {
        return Err(NostrError::IdMismatch);
    }

    let content = encryption::encrypt_with_rng(
        &rumor.to_json()?,
        sender.secret_key(),
        recipient,
        rng,
    )?;
    let created_at = created_at
        .unwrap_or_else(|| jittered_timestamp(rng, now(), config.timestamp_jitter_secs));

    let seal = EventBuilder::new(KIND_SEAL, content)
        .created_at(created_at)
        .sign_with_rng(sender, rng)?;

    debug!(seal_id = %seal.id(), rumor_kind = rumor.kind(), "sealed rumor");
    Ok(seal)
}

/// Wraps a seal for `recipient` under a fresh ephemeral key (NIP-59 kind 1059).
///
/// # Arguments
///
/// * `seal` - A signed kind 13 seal
/// * `recipient` - The recipient's public key
/// * `extra_tags` - Tags appended after the recipient `p` tag
/// * `created_at` - Wrap timestamp; jittered into the past when `None`
///
/// # Returns
///
/// A kind 1059 event ready to publish to the recipient's inbox relays.
///
/// # Errors
///
/// Returns error if:
/// - The seal is not kind 13 or is unsigned
/// - Encryption or signing fails
pub fn gift_wrap(
    seal: &Event,
    recipient: &PublicKey,
    extra_tags: Vec<Tag>,
    created_at: Option<i64>,
) -> Result<Event> {
    gift_wrap_with(
        seal,
        recipient,
        extra_tags,
        created_at,
        &EnvelopeConfig::default(),
        &mut OsRng,
    )
}

/// Wraps a seal using `config` for public tags and timestamps.
///
/// The ephemeral keypair is drawn from `rng` and dropped (zeroized) on return.
///
/// # Errors
///
/// Same as [`gift_wrap`].
pub fn gift_wrap_with<R: RngCore + CryptoRng>(
    seal: &Event,
    recipient: &PublicKey,
    extra_tags: Vec<Tag>,
    created_at: Option<i64>,
    config: &EnvelopeConfig,
    rng: &mut R,
) -> Result<Event> {
    if seal.kind() != KIND_SEAL {
        return Err(NostrError::InvalidKind {
            expected: KIND_SEAL,
            got: seal.kind(),
        });
    }
    if seal.is_rumor() {
        return Err(NostrError::UnsignedSeal);
    }

    let ephemeral = Keypair::generate_with(rng);
    let content =
        encryption::encrypt_with_rng(&seal.to_json()?, ephemeral.secret_key(), recipient, rng)?;

    let current = now();
    let created_at = created_at
        .unwrap_or_else(|| jittered_timestamp(rng, current, config.timestamp_jitter_secs));

    let mut tags = vec![TagBuilder::p_tag(recipient)];
    if let Some(expires_at) = config.expiration_at(current) {
        tags.push(TagBuilder::expiration_tag_at(expires_at));
    }
    tags.extend(extra_tags);

    let wrap = EventBuilder::new(KIND_GIFT_WRAP, content)
        .tags(tags)
        .created_at(created_at)
        .sign_with_rng(&ephemeral, rng)?;

    debug!(wrap_id = %wrap.id(), "gift wrapped seal");
    Ok(wrap)
}

/// Seals and gift-wraps a rumor in one step.
///
/// `created_at`, when given, is used for both layers.
///
/// # Errors
///
/// Returns any error from [`seal`] or [`gift_wrap`].
///
/// # Example
///
/// ```
/// use courier_core::nostr::giftwrap::{unwrap_and_unseal, wrap_rumor};
/// use courier_core::nostr::{EventBuilder, Keypair, KIND_TEXT_NOTE};
///
/// let alice = Keypair::generate();
/// let bob = Keypair::generate();
///
/// let rumor = EventBuilder::new(KIND_TEXT_NOTE, "hi bob").build(*alice.public_key());
/// let wrap = wrap_rumor(&rumor, bob.public_key(), &alice, Vec::new(), None).unwrap();
///
/// let received = unwrap_and_unseal(&wrap, bob.secret_key()).unwrap();
/// assert_eq!(received, rumor);
/// ```
pub fn wrap_rumor(
    rumor: &Event,
    recipient: &PublicKey,
    sender: &Keypair,
    extra_tags: Vec<Tag>,
    created_at: Option<i64>,
) -> Result<Event> {
    wrap_rumor_with(
        rumor,
        recipient,
        sender,
        extra_tags,
        created_at,
        &EnvelopeConfig::default(),
        &mut OsRng,
    )
}

/// Seals and gift-wraps a rumor with explicit config and randomness.
///
/// # Errors
///
/// Same as [`wrap_rumor`].
pub fn wrap_rumor_with<R: RngCore + CryptoRng>(
    rumor: &Event,
    recipient: &PublicKey,
    sender: &Keypair,
    extra_tags: Vec<Tag>,
    created_at: Option<i64>,
    config: &EnvelopeConfig,
    rng: &mut R,
) -> Result<Event> {
    let seal = seal_with(rumor, recipient, sender, created_at, config, rng)?;
    gift_wrap_with(&seal, recipient, extra_tags, created_at, config, rng)
}

/// Decrypts a gift wrap down to its verified seal.
///
/// # Errors
///
/// Returns error if:
/// - The event is not kind 1059, or the inner event is not kind 13
/// - Decryption fails (not intended for this recipient)
/// - The seal is unsigned, carries tags, or fails verification
pub fn unwrap(gift_wrap: &Event, recipient: &SecretKey) -> Result<Event> {
    if gift_wrap.kind() != KIND_GIFT_WRAP {
        return Err(NostrError::InvalidKind {
            expected: KIND_GIFT_WRAP,
            got: gift_wrap.kind(),
        });
    }

    let json = encryption::decrypt(gift_wrap.content(), recipient, gift_wrap.pubkey())?;
    let seal = Event::from_json(&json)?;

    if seal.kind() != KIND_SEAL {
        return Err(NostrError::InvalidKind {
            expected: KIND_SEAL,
            got: seal.kind(),
        });
    }
    if seal.is_rumor() {
        return Err(NostrError::UnsignedSeal);
    }
    if !seal.check_id() {
        return Err(NostrError::IdMismatch);
    }
    if !seal.verify_signature() {
        return Err(NostrError::InvalidSignature);
    }
    if !seal.tags().is_empty() {
        return Err(NostrError::SealHasTags);
    }
    Ok(seal)
}

/// Decrypts a seal down to its rumor.
///
/// # Errors
///
/// Returns error if:
/// - The event is not kind 13
/// - Decryption fails (not intended for this recipient)
/// - The inner event is signed or its id does not match its fields
pub fn unseal(seal: &Event, recipient: &SecretKey) -> Result<Event> {
    if seal.kind() != KIND_SEAL {
        return Err(NostrError::InvalidKind {
            expected: KIND_SEAL,
            got: seal.kind(),
        });
    }

    let json = encryption::decrypt(seal.content(), recipient, seal.pubkey())?;
    let rumor = Event::from_json(&json)?;

    if !rumor.is_rumor() {
        return Err(NostrError::SignedRumor);
    }
    if !rumor.check_id() {
        return Err(NostrError::IdMismatch);
    }
    Ok(rumor)
}

/// Unwraps and unseals a gift wrap down to its rumor.
///
/// # Errors
///
/// Returns any error from [`unwrap_gift`].
pub fn unwrap_and_unseal(gift_wrap: &Event, recipient: &SecretKey) -> Result<Event> {
    unwrap_gift(gift_wrap, recipient).map(|gift| gift.rumor)
}

/// Unwraps a gift wrap, returning the sender, seal and rumor.
///
/// # Errors
///
/// Returns any error from [`unwrap`] or [`unseal`], or
/// [`NostrError::SenderMismatch`] if the rumor author is not the seal signer.
pub fn unwrap_gift(gift_wrap: &Event, recipient: &SecretKey) -> Result<UnwrappedGift> {
    let result = unwrap(gift_wrap, recipient).and_then(|seal| {
        let rumor = unseal(&seal, recipient)?;
        if rumor.pubkey() != seal.pubkey() {
            return Err(NostrError::SenderMismatch);
        }
        Ok(UnwrappedGift {
            sender: *seal.pubkey(),
            seal,
            rumor,
        })
    });

    result.inspect_err(|e| debug!(wrap_id = %gift_wrap.id(), error = %e, "gift wrap rejected"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nostr::event::{KIND_PRIVATE_DIRECT_MESSAGE, KIND_TEXT_NOTE};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn author() -> Keypair {
        Keypair::from_secret_hex("0beebd062ec8735f4243466049d7747ef5d6594ee838de147f8aab842b15e273")
            .unwrap()
    }

    fn recipient() -> Keypair {
        Keypair::from_secret_hex("e108399bd8424357a710b606ae0c13166d853d327e47a6e5e038197346bdbf45")
            .unwrap()
    }

    fn create_test_rumor(sender: &Keypair) -> Event {
        EventBuilder::new(KIND_TEXT_NOTE, "Are you going to the party tonight?")
            .created_at(1_691_518_405)
            .build(*sender.public_key())
    }

    /// Wraps an arbitrary inner event the way a peer might, skipping local checks.
    fn wrap_raw(inner: &Event, recipient: &PublicKey) -> Event {
        let ephemeral = Keypair::generate();
        let content =
            encryption::encrypt(&inner.to_json().unwrap(), ephemeral.secret_key(), recipient)
                .unwrap();
        EventBuilder::new(KIND_GIFT_WRAP, content)
            .tag(TagBuilder::p_tag(recipient))
            .sign(&ephemeral)
            .unwrap()
    }

    /// Seals an arbitrary inner event, skipping local checks.
    fn seal_raw(inner: &Event, signer: &Keypair, recipient: &PublicKey, tags: Vec<Tag>) -> Event {
        let content =
            encryption::encrypt(&inner.to_json().unwrap(), signer.secret_key(), recipient)
                .unwrap();
        EventBuilder::new(KIND_SEAL, content)
            .tags(tags)
            .sign(signer)
            .unwrap()
    }

    #[test]
    fn seal_is_signed_kind_13_without_tags() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let seal = seal(&rumor, receiver.public_key(), &sender, None).unwrap();

        assert_eq!(seal.kind(), KIND_SEAL);
        assert!(seal.tags().is_empty());
        assert_eq!(seal.pubkey(), sender.public_key());
        assert!(seal.verify());
        assert!(!seal.content().contains("party"));
    }

    #[test]
    fn seal_rejects_signed_event() {
        let sender = author();
        let receiver = recipient();
        let signed = EventBuilder::new(KIND_TEXT_NOTE, "signed").sign(&sender).unwrap();

        let result = seal(&signed, receiver.public_key(), &sender, None);
        assert!(matches!(result, Err(NostrError::SealSignedEvent)));
    }

    #[test]
    fn seal_rejects_rumor_from_another_author() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&receiver);

        let result = seal(&rumor, receiver.public_key(), &sender, None);
        assert!(matches!(result, Err(NostrError::SenderMismatch)));
    }

    #[test]
    fn seal_rejects_rumor_with_stale_id() {
        let sender = author();
        let receiver = recipient();
        let json = create_test_rumor(&sender)
            .to_json()
            .unwrap()
            .replace("party tonight", "meeting tomorrow");
        let edited = Event::from_json(&json).unwrap();

        let result = seal(&edited, receiver.public_key(), &sender, None);
        assert!(matches!(result, Err(NostrError::IdMismatch)));
    }

    #[test]
    fn unseal_recovers_rumor() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let seal = seal(&rumor, receiver.public_key(), &sender, Some(1_700_000_000)).unwrap();
        assert_eq!(seal.created_at(), 1_700_000_000);

        let unsealed = unseal(&seal, receiver.secret_key()).unwrap();
        assert_eq!(unsealed, rumor);
        assert!(unsealed.is_rumor());
    }

    #[test]
    fn gift_wrap_creates_kind_1059_with_recipient_tag_first() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);
        let extra = vec![TagBuilder::alt_tag("private message")];

        let wrapped = wrap_rumor(&rumor, receiver.public_key(), &sender, extra, None).unwrap();

        assert_eq!(wrapped.kind(), KIND_GIFT_WRAP);
        assert!(wrapped.verify());
        assert_ne!(wrapped.pubkey(), sender.public_key());
        assert_eq!(wrapped.tags()[0], TagBuilder::p_tag(receiver.public_key()));
        assert_eq!(wrapped.tags()[1][0], "alt");
        assert_eq!(wrapped.recipients(), vec![*receiver.public_key()]);
    }

    #[test]
    fn gift_wrap_rejects_non_seal() {
        let sender = author();
        let receiver = recipient();
        let note = EventBuilder::new(KIND_TEXT_NOTE, "x").sign(&sender).unwrap();

        let result = gift_wrap(&note, receiver.public_key(), Vec::new(), None);
        assert!(matches!(
            result,
            Err(NostrError::InvalidKind { expected: 13, got: 1 })
        ));
    }

    #[test]
    fn gift_wrap_rejects_unsigned_seal() {
        let sender = author();
        let receiver = recipient();
        let unsigned = EventBuilder::new(KIND_SEAL, "x").build(*sender.public_key());

        let result = gift_wrap(&unsigned, receiver.public_key(), Vec::new(), None);
        assert!(matches!(result, Err(NostrError::UnsignedSeal)));
    }

    #[test]
    fn ephemeral_keys_are_unique() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let wrapped1 =
            wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();
        let wrapped2 =
            wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();

        // Each wrap should use a different ephemeral key
        assert_ne!(wrapped1.pubkey(), wrapped2.pubkey());
        assert_ne!(wrapped1.pubkey(), sender.public_key());
        assert_ne!(wrapped2.pubkey(), sender.public_key());
    }

    #[test]
    fn expiration_tag_follows_recipient_tag_when_configured() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);
        let config = EnvelopeConfig {
            gift_wrap_expiration_secs: Some(3600),
            ..EnvelopeConfig::default()
        };

        let before = now();
        let wrapped = wrap_rumor_with(
            &rumor,
            receiver.public_key(),
            &sender,
            vec![TagBuilder::alt_tag("dm")],
            None,
            &config,
            &mut OsRng,
        )
        .unwrap();

        assert_eq!(wrapped.tags()[1][0], "expiration");
        let expires: i64 = wrapped.tags()[1][1].parse().unwrap();
        assert!(expires >= before + 3600 && expires <= now() + 3600);
        assert_eq!(wrapped.tags()[2][0], "alt");
    }

    #[test]
    fn default_timestamps_fall_within_jitter_window() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        for _ in 0..10 {
            let before = now();
            let wrapped =
                wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();
            let seal = unwrap(&wrapped, receiver.secret_key()).unwrap();
            let after = now();

            for ts in [wrapped.created_at(), seal.created_at()] {
                assert!(ts >= before - 172_800);
                assert!(ts <= after);
            }
        }
    }

    #[test]
    fn jittered_timestamp_respects_window() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let ts = jittered_timestamp(&mut rng, 1_000_000, 600);
            assert!((1_000_000 - 600..=1_000_000).contains(&ts));
        }
        assert_eq!(jittered_timestamp(&mut rng, 42, 0), 42);
    }

    #[test]
    fn unwrap_gift_reports_sender_and_seal() {
        let sender = author();
        let receiver = recipient();
        let rumor = private_dm(&sender, &receiver);

        let wrapped = wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();
        let gift = unwrap_gift(&wrapped, receiver.secret_key()).unwrap();

        assert_eq!(gift.sender, *sender.public_key());
        assert_eq!(gift.seal.kind(), KIND_SEAL);
        assert_eq!(gift.rumor, rumor);
    }

    fn private_dm(sender: &Keypair, receiver: &Keypair) -> Event {
        crate::nostr::event::private_direct_message(
            *sender.public_key(),
            &[*receiver.public_key()],
            "see you there",
        )
    }

    #[test]
    fn private_dm_roundtrip_keeps_kind_and_tags() {
        let sender = author();
        let receiver = recipient();
        let rumor = private_dm(&sender, &receiver);

        let wrapped = wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();
        let received = unwrap_and_unseal(&wrapped, receiver.secret_key()).unwrap();

        assert_eq!(received.kind(), KIND_PRIVATE_DIRECT_MESSAGE);
        assert_eq!(received.recipients(), vec![*receiver.public_key()]);
    }

    #[test]
    fn unwrap_fails_for_wrong_recipient() {
        let sender = author();
        let receiver = recipient();
        let stranger = Keypair::generate();
        let rumor = create_test_rumor(&sender);

        let wrapped = wrap_rumor(&rumor, receiver.public_key(), &sender, Vec::new(), None).unwrap();

        let result = unwrap_and_unseal(&wrapped, stranger.secret_key());
        assert!(matches!(result, Err(NostrError::DecryptionFailed)));
    }

    #[test]
    fn author_cannot_unseal_own_seal() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let seal = seal(&rumor, receiver.public_key(), &sender, None).unwrap();
        let result = unseal(&seal, sender.secret_key());
        assert!(matches!(result, Err(NostrError::DecryptionFailed)));
    }

    #[test]
    fn unwrap_rejects_non_gift_wrap() {
        let sender = author();
        let receiver = recipient();
        let note = EventBuilder::new(KIND_TEXT_NOTE, "x").sign(&sender).unwrap();

        let result = unwrap(&note, receiver.secret_key());
        assert!(matches!(
            result,
            Err(NostrError::InvalidKind { expected: 1059, got: 1 })
        ));
    }

    #[test]
    fn unwrap_rejects_seal_with_tags() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);
        let tagged = seal_raw(
            &rumor,
            &sender,
            receiver.public_key(),
            vec![TagBuilder::p_tag(receiver.public_key())],
        );

        let result = unwrap(&wrap_raw(&tagged, receiver.public_key()), receiver.secret_key());
        assert!(matches!(result, Err(NostrError::SealHasTags)));
    }

    #[test]
    fn unwrap_rejects_unsigned_seal() {
        let sender = author();
        let receiver = recipient();
        let unsigned = EventBuilder::new(KIND_SEAL, "x").build(*sender.public_key());

        let result = unwrap(&wrap_raw(&unsigned, receiver.public_key()), receiver.secret_key());
        assert!(matches!(result, Err(NostrError::UnsignedSeal)));
    }

    #[test]
    fn unwrap_rejects_seal_with_forged_signature() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let genuine = seal(&rumor, receiver.public_key(), &sender, None).unwrap();
        let other = seal(&rumor, receiver.public_key(), &sender, None).unwrap();

        // Graft the signature of a different seal onto this one
        let mut value: serde_json::Value =
            serde_json::from_str(&genuine.to_json().unwrap()).unwrap();
        value["sig"] = serde_json::Value::String(other.sig().unwrap().to_hex());
        let forged = Event::from_json(&value.to_string()).unwrap();

        let result = unwrap(&wrap_raw(&forged, receiver.public_key()), receiver.secret_key());
        assert!(matches!(result, Err(NostrError::InvalidSignature)));
    }

    #[test]
    fn unwrap_rejects_inner_event_of_wrong_kind() {
        let sender = author();
        let receiver = recipient();
        let note = EventBuilder::new(KIND_TEXT_NOTE, "x").sign(&sender).unwrap();

        let result = unwrap(&wrap_raw(&note, receiver.public_key()), receiver.secret_key());
        assert!(matches!(
            result,
            Err(NostrError::InvalidKind { expected: 13, got: 1 })
        ));
    }

    #[test]
    fn unseal_rejects_signed_rumor() {
        let sender = author();
        let receiver = recipient();
        let signed = EventBuilder::new(KIND_TEXT_NOTE, "signed").sign(&sender).unwrap();
        let bad_seal = seal_raw(&signed, &sender, receiver.public_key(), Vec::new());

        let result = unseal(&bad_seal, receiver.secret_key());
        assert!(matches!(result, Err(NostrError::SignedRumor)));
    }

    #[test]
    fn unseal_rejects_rumor_with_wrong_id() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);

        let mut value: serde_json::Value = serde_json::from_str(&rumor.to_json().unwrap()).unwrap();
        value["content"] = serde_json::Value::String("edited".to_string());
        let edited = Event::from_json(&value.to_string()).unwrap();
        let bad_seal = seal_raw(&edited, &sender, receiver.public_key(), Vec::new());

        let result = unseal(&bad_seal, receiver.secret_key());
        assert!(matches!(result, Err(NostrError::IdMismatch)));
    }

    #[test]
    fn unwrap_gift_rejects_impersonated_rumor() {
        let victim = author();
        let receiver = recipient();
        let mallory = Keypair::generate();

        // Mallory seals a rumor claiming to be from the victim
        let rumor = create_test_rumor(&victim);
        let forged_seal = seal_raw(&rumor, &mallory, receiver.public_key(), Vec::new());
        let wrapped = wrap_raw(&forged_seal, receiver.public_key());

        // The seal itself is valid, only the binding check catches it
        assert!(unwrap(&wrapped, receiver.secret_key()).is_ok());
        let result = unwrap_gift(&wrapped, receiver.secret_key());
        assert!(matches!(result, Err(NostrError::SenderMismatch)));
    }

    #[test]
    fn seeded_rng_makes_wrapping_reproducible() {
        let sender = author();
        let receiver = recipient();
        let rumor = create_test_rumor(&sender);
        let config = EnvelopeConfig::default();

        let a = wrap_rumor_with(
            &rumor,
            receiver.public_key(),
            &sender,
            Vec::new(),
            Some(1_700_000_000),
            &config,
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();
        let b = wrap_rumor_with(
            &rumor,
            receiver.public_key(),
            &sender,
            Vec::new(),
            Some(1_700_000_000),
            &config,
            &mut StdRng::seed_from_u64(99),
        )
        .unwrap();

        assert_eq!(a, b);
    }
}
