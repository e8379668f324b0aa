//! Secret handling for passwords and session credentials
//!
//! `MaskedSecret` keeps the value in a `secrecy::SecretString` (zeroized on
//! drop) and only ever prints a partially masked form, so credentials can
//! flow through `tracing` fields and `Debug` output without leaking.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Mask a value while keeping a short suffix visible.
///
/// - values shorter than 12 chars keep their last 2 chars
/// - longer values keep their last 4 chars
/// - dashes stay in place
pub fn mask_value(value: &str) -> String {
    let value_len = value.chars().count();
    let visible_suffix_len = if value_len >= 12 { 4 } else { 2.min(value_len) };
    let prefix_len = value_len.saturating_sub(visible_suffix_len);

    value
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i >= prefix_len || c == '-' {
                c
            } else {
                '*'
            }
        })
        .collect()
}

/// A secret string that shows partial masking in Debug/Display output.
///
/// # Example
/// ```
/// use integra_core::utils::secret::MaskedSecret;
///
/// let token = MaskedSecret::new("tok-1234567890abcd".to_string());
/// assert_eq!(format!("{}", token), "***-**********abcd");
/// assert_eq!(token.expose_secret(), "tok-1234567890abcd");
/// ```
#[derive(Clone)]
pub struct MaskedSecret(SecretString);

impl MaskedSecret {
    pub fn new(value: String) -> Self {
        Self(SecretString::new(value.into_boxed_str()))
    }

    /// Expose the secret value, only where it has to leave the process
    /// (provider requests, the credential file)
    pub fn expose_secret(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl From<&str> for MaskedSecret {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for MaskedSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for MaskedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\"", mask_value(self.0.expose_secret()))
    }
}

impl std::fmt::Display for MaskedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", mask_value(self.0.expose_secret()))
    }
}

impl Serialize for MaskedSecret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Full value: the credential file has to be readable on the next start
        self.0.expose_secret().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MaskedSecret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(MaskedSecret::new(value))
    }
}

impl PartialEq for MaskedSecret {
    fn eq(&self, other: &Self) -> bool {
        self.0.expose_secret() == other.0.expose_secret()
    }
}

impl Eq for MaskedSecret {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_value() {
        assert_eq!(mask_value("pass123"), "*****23");
        assert_eq!(mask_value("ab"), "ab");
        assert_eq!(mask_value(""), "");
        assert_eq!(mask_value("password1234"), "********1234");
        assert_eq!(mask_value("jwt-token-xyz"), "***-*****-xyz");
    }

    #[test]
    fn test_mask_value_counts_chars_not_bytes() {
        assert_eq!(mask_value("päss"), "**ss");
    }

    #[test]
    fn test_masked_secret_debug_shows_partial() {
        let secret = MaskedSecret::from("correct-horse-battery");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("horse"));
        assert!(debug.ends_with("tery\""));
    }

    #[test]
    fn test_masked_secret_serializes_full_value() {
        let secret = MaskedSecret::from("s3cr3t-token");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"s3cr3t-token\"");
        let back: MaskedSecret = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
