//! Courier Core Library
//!
//! Core functionality for Courier - private messaging over Nostr.
//! This crate provides canonical event ids and Schnorr signatures, NIP-44
//! versioned payload encryption, and NIP-59 seal / gift wrap envelopes.
//!
//! Transport and feature-kind layers call into it through [`CourierCore`]
//! or the free functions in [`nostr`].

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![deny(unsafe_code)]

mod api;
pub mod config;
pub mod nostr;

pub use api::CourierCore;
