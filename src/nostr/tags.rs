//! Tag builders and accessors for Nostr events.
//!
//! A tag is an ordered list of strings whose first element names it.
//! The core only builds the tags the envelope protocol needs:
//! - `p` tag: recipient public key (gift wrap routing, direct messages)
//! - `e` tag: referenced event id
//! - `expiration` tag: NIP-40 automatic expiration
//! - `alt` tag: NIP-31 human-readable description

use chrono::{DateTime, Utc};

use super::keys::PublicKey;

/// A single event tag.
pub type Tag = Vec<String>;

/// Builder for Nostr event tags.
///
/// Provides static methods for constructing properly formatted tags.
///
/// # Example
///
/// ```
/// use courier_core::nostr::{Keypair, TagBuilder};
///
/// let recipient = Keypair::generate();
/// let tag = TagBuilder::p_tag(recipient.public_key());
/// assert_eq!(tag[0], "p");
/// assert_eq!(tag[1], recipient.public_key().to_hex());
/// ```
pub struct TagBuilder;

impl TagBuilder {
    /// Builds the `p` tag naming a public key.
    #[must_use]
    pub fn p_tag(pubkey: &PublicKey) -> Tag {
        vec!["p".to_string(), pubkey.to_hex()]
    }

    /// Builds a `p` tag with a relay hint.
    #[must_use]
    pub fn p_tag_with_relay(pubkey: &PublicKey, relay_url: &str) -> Tag {
        vec!["p".to_string(), pubkey.to_hex(), relay_url.to_string()]
    }

    /// Builds the `e` tag referencing another event by hex id.
    #[must_use]
    pub fn e_tag(event_id_hex: &str) -> Tag {
        vec!["e".to_string(), event_id_hex.to_string()]
    }

    /// Builds the `expiration` tag for NIP-40 automatic expiration.
    ///
    /// Relays that support NIP-40 will automatically delete events
    /// after the specified timestamp.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_core::nostr::TagBuilder;
    /// use chrono::{Utc, Duration};
    ///
    /// let expires = Utc::now() + Duration::hours(24);
    /// let tag = TagBuilder::expiration_tag(expires);
    /// assert_eq!(tag[0], "expiration");
    /// ```
    #[must_use]
    pub fn expiration_tag(expires_at: DateTime<Utc>) -> Tag {
        Self::expiration_tag_at(expires_at.timestamp())
    }

    /// Builds the `expiration` tag from Unix seconds.
    #[must_use]
    pub fn expiration_tag_at(unix_seconds: i64) -> Tag {
        vec!["expiration".to_string(), unix_seconds.to_string()]
    }

    /// Builds the `alt` tag for NIP-31 human-readable descriptions.
    #[must_use]
    pub fn alt_tag(description: &str) -> Tag {
        vec!["alt".to_string(), description.to_string()]
    }
}

/// Returns the second element of the first tag named `name`.
///
/// Absence is not an error: the tag may simply not be present.
#[must_use]
pub fn first_tag_value<'a>(tags: &'a [Tag], name: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.first().map(String::as_str) == Some(name))
        .and_then(|tag| tag.get(1).map(String::as_str))
}

/// Returns the second element of every tag named `name`, in order.
pub fn tag_values<'a>(tags: &'a [Tag], name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    tags.iter()
        .filter(move |tag| tag.first().map(String::as_str) == Some(name))
        .filter_map(|tag| tag.get(1).map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nostr::keys::Keypair;
    use chrono::Duration;

    #[test]
    fn p_tag_format() {
        let keypair = Keypair::generate();
        let tag = TagBuilder::p_tag(keypair.public_key());
        assert_eq!(tag.len(), 2);
        assert_eq!(tag[0], "p");
        assert_eq!(tag[1], keypair.public_key().to_hex());
    }

    #[test]
    fn p_tag_with_relay_hint() {
        let keypair = Keypair::generate();
        let tag = TagBuilder::p_tag_with_relay(keypair.public_key(), "wss://relay.example");
        assert_eq!(tag.len(), 3);
        assert_eq!(tag[2], "wss://relay.example");
    }

    #[test]
    fn e_tag_format() {
        let tag = TagBuilder::e_tag("abc123");
        assert_eq!(tag, vec!["e", "abc123"]);
    }

    #[test]
    fn expiration_tag_matches_timestamp() {
        let expires = Utc::now() + Duration::hours(24);
        let tag = TagBuilder::expiration_tag(expires);
        assert_eq!(tag[0], "expiration");
        let actual_ts: i64 = tag[1].parse().unwrap();
        assert_eq!(actual_ts, expires.timestamp());
    }

    #[test]
    fn alt_tag_with_special_chars() {
        let tag = TagBuilder::alt_tag("Line1\nLine2\t\"quoted\"");
        assert_eq!(tag[1], "Line1\nLine2\t\"quoted\"");
    }

    #[test]
    fn first_tag_value_finds_first_match() {
        let tags = vec![
            vec!["e".to_string(), "one".to_string()],
            vec!["p".to_string(), "two".to_string()],
            vec!["p".to_string(), "three".to_string()],
        ];
        assert_eq!(first_tag_value(&tags, "p"), Some("two"));
        assert_eq!(first_tag_value(&tags, "expiration"), None);
    }

    #[test]
    fn first_tag_value_ignores_name_only_tag() {
        let tags = vec![vec!["p".to_string()]];
        assert_eq!(first_tag_value(&tags, "p"), None);
    }

    #[test]
    fn tag_values_collects_all_matches() {
        let tags = vec![
            vec!["p".to_string(), "a".to_string()],
            vec!["t".to_string(), "b".to_string()],
            vec!["p".to_string(), "c".to_string()],
            vec![],
        ];
        let values: Vec<&str> = tag_values(&tags, "p").collect();
        assert_eq!(values, vec!["a", "c"]);
    }
}
