//! Envelope configuration.
//!
//! Controls the public metadata a gift wrap exposes: how far timestamps are
//! pushed into the past and whether relays are asked to expire the wrap.

use serde::{Deserialize, Serialize};

use crate::nostr::{NostrError, Result};

/// Two days, in seconds.
pub const DEFAULT_TIMESTAMP_JITTER_SECS: u32 = 172_800;

/// Settings for sealing and gift wrapping.
///
/// Missing fields take their default when deserialized.
///
/// # Example
///
/// ```
/// use courier_core::config::EnvelopeConfig;
///
/// let config = EnvelopeConfig::from_json(r#"{"gift_wrap_expiration_secs": 86400}"#).unwrap();
/// assert_eq!(config.timestamp_jitter_secs, 172_800);
/// assert_eq!(config.gift_wrap_expiration_secs, Some(86_400));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeConfig {
    /// Seals and wraps without an explicit timestamp use
    /// `now - uniform[0, timestamp_jitter_secs]`
    pub timestamp_jitter_secs: u32,

    /// When set, gift wraps carry an `expiration` tag this many seconds ahead
    pub gift_wrap_expiration_secs: Option<u64>,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            timestamp_jitter_secs: DEFAULT_TIMESTAMP_JITTER_SECS,
            gift_wrap_expiration_secs: None, // Relays keep wraps unless asked
        }
    }
}

impl EnvelopeConfig {
    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidConfig`] if the expiration is zero or
    /// does not fit a Unix timestamp.
    pub fn validate(&self) -> Result<()> {
        match self.gift_wrap_expiration_secs {
            Some(0) => Err(NostrError::InvalidConfig(
                "gift_wrap_expiration_secs must be greater than zero".to_string(),
            )),
            Some(secs) if i64::try_from(secs).is_err() => Err(NostrError::InvalidConfig(format!(
                "gift_wrap_expiration_secs {secs} is out of range"
            ))),
            _ => Ok(()),
        }
    }

    /// Parses a configuration from JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`NostrError::InvalidConfig`] for malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| NostrError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this configuration to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| NostrError::Serialization(e.to_string()))
    }

    /// Expiration timestamp for a wrap created at `now`, if configured.
    #[must_use]
    pub fn expiration_at(&self, now: i64) -> Option<i64> {
        self.gift_wrap_expiration_secs
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| now.saturating_add(secs))
    }
}
