use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A provider API key.
///
/// `Debug` and `Display` never print the secret; use [`ApiKey::expose`] at
/// the point where the header is built.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, returning `None` for empty or whitespace-only input
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// Serialized only so figment can round-trip defaults; keys are never written
// to disk by this crate.
impl Serialize for ApiKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| serde::de::Error::custom("api key cannot be empty"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::new("sk-test-1234567890").unwrap();
        assert_eq!(format!("{key:?}"), "ApiKey([REDACTED])");
        assert_eq!(key.to_string(), "[REDACTED]");
        assert_eq!(key.expose(), "sk-test-1234567890");
    }

    #[test]
    fn test_blank_key_rejected() {
        assert!(ApiKey::new("   ").is_none());
        assert!(serde_json::from_str::<ApiKey>("\"\"").is_err());
    }

    #[test]
    fn test_key_is_trimmed() {
        assert_eq!(ApiKey::new("  key \n").unwrap().expose(), "key");
    }
}
