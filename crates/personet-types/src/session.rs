//! Session identifiers.
//!
//! A session id has the shape `<prefix>/<ordinal>` where the ordinal is a
//! 1-based index into the user's topic list (e.g. `chat1/2` selects the
//! second topic). Malformed ids are rejected before any session state is
//! touched.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::SessionKeyError;

/// Parsed session identifier.
///
/// The raw form round-trips through `Display`: `format!("{key}")` yields the
/// original `<prefix>/<ordinal>` string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    prefix: String,
    ordinal: u32,
}

impl SessionKey {
    /// Construct a key from parts. The ordinal must be positive.
    pub fn new(prefix: impl Into<String>, ordinal: u32) -> Result<Self, SessionKeyError> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(SessionKeyError::EmptyPrefix);
        }
        if ordinal == 0 {
            return Err(SessionKeyError::ZeroOrdinal);
        }
        Ok(Self { prefix, ordinal })
    }

    /// Conversation prefix (everything before the final `/`).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 1-based topic ordinal (the numeric suffix).
    pub fn ordinal(&self) -> u32 {
        self.ordinal
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.ordinal)
    }
}

impl FromStr for SessionKey {
    type Err = SessionKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((prefix, suffix)) = s.rsplit_once('/') else {
            return Err(SessionKeyError::MissingOrdinal(s.to_string()));
        };
        if prefix.is_empty() {
            return Err(SessionKeyError::EmptyPrefix);
        }
        let ordinal: u32 = suffix
            .parse()
            .map_err(|_| SessionKeyError::InvalidOrdinal(suffix.to_string()))?;
        if ordinal == 0 {
            return Err(SessionKeyError::ZeroOrdinal);
        }
        Ok(Self {
            prefix: prefix.to_string(),
            ordinal,
        })
    }
}
