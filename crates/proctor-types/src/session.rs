use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ProctorError, ProctorResult};

/// Opaque identifier scoping violation counters to one interview attempt.
///
/// Usually supplied by the caller; must not be blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> ProctorResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ProctorError::InvalidInput(
                "session id must not be blank".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SessionId {
    type Error = ProctorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for SessionId {
    type Error = ProctorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(SessionId::new("").is_err());
        assert!(SessionId::new("   ").is_err());
        assert!(matches!(
            SessionId::new("\t"),
            Err(ProctorError::InvalidInput(_))
        ));
    }

    #[test]
    fn serde_is_a_plain_string() {
        let id = SessionId::new("interview-42").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"interview-42\"");

        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);

        assert!(serde_json::from_str::<SessionId>("\"\"").is_err());
    }
}
