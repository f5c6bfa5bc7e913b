//! Nostr event identity, payload encryption and private envelopes.
//!
//! # Architecture
//!
//! ```text
//! Rumor (unsigned Event, any kind)
//!        ↓  seal: NIP-44 encrypt to recipient, sign with author key
//! Seal (kind 13, no tags)
//!        ↓  gift_wrap: NIP-44 encrypt under an ephemeral key, sign with it
//! Gift Wrap (kind 1059, p-tag → recipient, ready for relay)
//! ```
//!
//! Receiving runs the same chain backwards with [`giftwrap::unwrap`],
//! [`giftwrap::unseal`] and [`giftwrap::unwrap_and_unseal`].
//!
//! # Security
//!
//! - Event ids are SHA-256 over the canonical serialization in [`codec`]
//! - Signatures are BIP-340 Schnorr with fresh auxiliary randomness
//! - Payload MACs are checked in constant time before any decryption
//! - Secret keys and derived keys are zeroized on drop
//!
//! # Example
//!
//! ```
//! use courier_core::nostr::giftwrap::{unwrap_and_unseal, wrap_rumor};
//! use courier_core::nostr::{private_direct_message, Keypair};
//!
//! let alice = Keypair::generate();
//! let bob = Keypair::generate();
//!
//! let dm = private_direct_message(*alice.public_key(), &[*bob.public_key()], "hello");
//! let wrap = wrap_rumor(&dm, bob.public_key(), &alice, Vec::new(), None).unwrap();
//!
//! let received = unwrap_and_unseal(&wrap, bob.secret_key()).unwrap();
//! assert_eq!(received.content(), "hello");
//! ```

mod error;
mod event;
mod keys;
mod tags;

pub mod codec;
pub mod encryption;
pub mod giftwrap;

pub use error::{NostrError, Result};
pub use event::{
    build_and_sign, now, private_direct_message, verify, Event, EventBuilder, EventId,
    KIND_GIFT_WRAP, KIND_PRIVATE_DIRECT_MESSAGE, KIND_SEAL, KIND_TEXT_NOTE,
};
pub use giftwrap::UnwrappedGift;
pub use keys::{
    sign, verify as verify_signature, verify_bytes, Keypair, PublicKey, SecretKey, Signature,
};
pub use tags::{first_tag_value, tag_values, Tag, TagBuilder};
