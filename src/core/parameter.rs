//! Parameter record and kind.

use serde::{Deserialize, Serialize};

/// Kind of a stored parameter: plain text or secret.
///
/// Secret values come back from the store in sealed form unless decryption
/// is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterKind {
    String,
    SecureString,
}

impl ParameterKind {
    pub fn is_secure(self) -> bool {
        matches!(self, ParameterKind::SecureString)
    }
}

impl std::fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParameterKind::String => write!(f, "String"),
            ParameterKind::SecureString => write!(f, "SecureString"),
        }
    }
}

impl std::str::FromStr for ParameterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(ParameterKind::String),
            "securestring" => Ok(ParameterKind::SecureString),
            other => Err(format!("unknown parameter kind: {}", other)),
        }
    }
}

/// A single stored entry.
///
/// `name` is always a fullpath of shape `/{project}/{environment}/{key...}`.
/// `value` is the raw string as fetched; for a secret it stays sealed until
/// a decrypt pass overwrites it in place and flips `decrypted`. The flag is
/// only ever set, never reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    pub kind: ParameterKind,
    pub decrypted: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            kind,
            decrypted: false,
        }
    }

    /// True for a secret whose plaintext has not been fetched yet.
    pub fn still_encrypted(&self) -> bool {
        self.kind.is_secure() && !self.decrypted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_roundtrip() {
        assert_eq!(
            "securestring".parse::<ParameterKind>().unwrap(),
            ParameterKind::SecureString
        );
        assert_eq!("String".parse::<ParameterKind>().unwrap(), ParameterKind::String);
        assert!("Secure".parse::<ParameterKind>().is_err());
    }

    #[test]
    fn test_still_encrypted() {
        let mut p = Parameter::new("/P/E/K", "sealed", ParameterKind::SecureString);
        assert!(p.still_encrypted());
        p.decrypted = true;
        assert!(!p.still_encrypted());
        assert!(!Parameter::new("/P/E/K", "v", ParameterKind::String).still_encrypted());
    }
}
