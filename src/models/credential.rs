//! API credential handling.

use std::fmt;

/// A Readwise access token.
///
/// Input is trimmed on construction. An empty or whitespace-only token is
/// stored as absent and never produces an `Authorization` header.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Credential(Option<String>);

impl Credential {
    /// Build a credential from raw user input
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Self(None)
        } else {
            Self(Some(trimmed.to_string()))
        }
    }

    /// A credential with no token
    pub fn absent() -> Self {
        Self(None)
    }

    /// Whether no usable token is present
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// The trimmed token, if present
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Value for the `Authorization` header (`Token <key>`)
    pub fn authorization(&self) -> Option<String> {
        self.0.as_ref().map(|token| format!("Token {}", token))
    }
}

// Tokens must not leak into logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(<absent>)"),
        }
    }
}

impl From<&str> for Credential {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Credential {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<Option<String>> for Credential {
    fn from(raw: Option<String>) -> Self {
        raw.map(Self::new).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_absent() {
        assert!(Credential::new("").is_absent());
        assert!(Credential::new("   \t\n").is_absent());
        assert!(Credential::from(None).is_absent());
        assert_eq!(Credential::new("  ").authorization(), None);
    }

    #[test]
    fn test_trimmed_token() {
        let credential = Credential::new("  abc123 \n");
        assert_eq!(credential.token(), Some("abc123"));
        assert_eq!(credential.authorization().as_deref(), Some("Token abc123"));
        assert_eq!(credential, Credential::new("abc123"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", Credential::new("secret-token"));
        assert!(!rendered.contains("secret-token"));
        assert_eq!(format!("{:?}", Credential::absent()), "Credential(<absent>)");
    }
}
