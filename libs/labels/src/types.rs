//! Typed label keys and values for front-end workload selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{define_label_value, LabelError};

/// Maximum length of a label value and of the name part of a label key.
pub const MAX_NAME_LEN: usize = 63;

/// Maximum length of a label key prefix.
pub const MAX_PREFIX_LEN: usize = 253;

// =============================================================================
// Label values
// =============================================================================

define_label_value!(WorkloadName, "workload name");
define_label_value!(GenerationHash, "generation hash");

/// Validates `s` against the label value grammar.
///
/// Empty values are rejected even though the API server accepts them: an
/// empty value in an `In` selector matches nothing.
pub fn validate_label_value(what: &'static str, s: &str) -> Result<(), LabelError> {
    if s.is_empty() {
        return Err(LabelError::Empty { what });
    }

    if s.len() > MAX_NAME_LEN {
        return Err(LabelError::TooLong {
            what,
            len: s.len(),
            max: MAX_NAME_LEN,
        });
    }

    if let Some(ch) = s
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(LabelError::InvalidCharacter {
            what,
            value: s.to_string(),
            ch,
        });
    }

    let bytes = s.as_bytes();
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return Err(LabelError::InvalidBoundary {
            what,
            value: s.to_string(),
        });
    }

    Ok(())
}

fn validate_prefix(prefix: &str) -> Result<(), LabelError> {
    let invalid = || LabelError::InvalidPrefix {
        prefix: prefix.to_string(),
    };

    if prefix.is_empty() || prefix.len() > MAX_PREFIX_LEN {
        return Err(invalid());
    }

    for segment in prefix.split('.') {
        let bytes = segment.as_bytes();
        let Some((first, last)) = bytes.first().zip(bytes.last()) else {
            return Err(invalid());
        };
        if !first.is_ascii_alphanumeric() || !last.is_ascii_alphanumeric() {
            return Err(invalid());
        }
        if !bytes
            .iter()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || *b == b'-')
        {
            return Err(invalid());
        }
    }

    Ok(())
}

// =============================================================================
// Label keys
// =============================================================================

/// A label key of the form `[prefix/]name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelKey(String);

impl LabelKey {
    /// Parses and validates a label key.
    pub fn parse(s: &str) -> Result<Self, LabelError> {
        if s.is_empty() {
            return Err(LabelError::Empty { what: "label key" });
        }

        let name = match s.split_once('/') {
            Some((prefix, name)) => {
                validate_prefix(prefix)?;
                name
            }
            None => s,
        };
        validate_label_value("label key name", name)?;

        Ok(Self(s.to_string()))
    }

    /// Returns the optional prefix of the key.
    pub fn prefix(&self) -> Option<&str> {
        self.0.split_once('/').map(|(prefix, _)| prefix)
    }

    /// Returns the name part of the key.
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or(&self.0, |(_, name)| name)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LabelKey {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LabelKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LabelKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Default key of the label identifying which workload a pod belongs to.
pub const DEFAULT_DEPLOYMENT_LABEL: &str = "frontdoor.io/deployment";

/// Default key of the label carrying a pod template's generation hash.
pub const DEFAULT_GENERATION_HASH_LABEL: &str = "frontdoor.io/generation-hash";

/// The pair of label keys the affinity selectors match on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelKeys {
    /// Key whose value is the workload name.
    pub deployment: LabelKey,

    /// Key whose value is the pod template generation hash.
    pub generation_hash: LabelKey,
}

impl Default for LabelKeys {
    fn default() -> Self {
        Self {
            deployment: LabelKey(DEFAULT_DEPLOYMENT_LABEL.to_string()),
            generation_hash: LabelKey(DEFAULT_GENERATION_HASH_LABEL.to_string()),
        }
    }
}
