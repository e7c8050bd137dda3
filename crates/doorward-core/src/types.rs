use crate::{Result, error::Error};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Label asserted by the face classifier for a detected face.
///
/// Identities are opaque: the classifier may mis-predict, so an `Identity`
/// says nothing about enrollment until it is looked up in the registry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Create a new identity.
    ///
    /// Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// Returns `Error::InvalidIdentity` if the label is empty.
    pub fn new(label: &str) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(Error::InvalidIdentity(
                "Identity label cannot be empty".to_string(),
            ));
        }
        Ok(Identity(label.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Identity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Identity::new(s)
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Identity::new(&label).map_err(serde::de::Error::custom)
    }
}

/// Possession-factor identifier read from a physical tag.
///
/// Token identifiers are compared as text: a reader reporting the numeric
/// id `123` matches an enrolled `"123"`.
///
/// # Security
/// Equality is constant-time so that a wrong card cannot be narrowed down
/// by timing the comparison.
#[derive(Debug, Clone, Eq, Serialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    /// Create a new token identifier.
    ///
    /// # Errors
    /// Returns `Error::InvalidTokenFormat` if the identifier is empty or
    /// contains non-ASCII characters.
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();

        if id.is_empty() {
            return Err(Error::InvalidTokenFormat(
                "Token id cannot be empty".to_string(),
            ));
        }

        if !id.is_ascii() {
            return Err(Error::InvalidTokenFormat(
                "Token id must be ASCII".to_string(),
            ));
        }

        Ok(TokenId(id.to_string()))
    }

    /// Create a token identifier from the numeric id reported by a reader.
    #[must_use]
    pub fn from_numeric(id: u64) -> Self {
        TokenId(id.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        TokenId::new(s)
    }
}

impl PartialEq for TokenId {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl std::hash::Hash for TokenId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// Enrollment files store token ids either as strings or as the raw integer
/// the reader produced.
impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Text(text) => TokenId::new(&text).map_err(serde::de::Error::custom),
            Raw::Number(n) => Ok(TokenId::from_numeric(n)),
        }
    }
}

/// One enrolled person: the identity and the token bound to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledRecord {
    pub identity: Identity,
    pub expected_token: TokenId,
}

impl EnrolledRecord {
    pub fn new(identity: Identity, expected_token: TokenId) -> Self {
        Self {
            identity,
            expected_token,
        }
    }
}

/// Normalized fixed-size face vector.
///
/// Produced from one face crop and consumed immediately by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceSample(Vec<f32>);

impl FaceSample {
    /// Wrap a flattened face vector.
    ///
    /// # Errors
    /// Returns `Error::InvalidFaceSample` if the vector is empty or contains
    /// non-finite values.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidFaceSample(
                "Face sample cannot be empty".to_string(),
            ));
        }

        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidFaceSample(format!(
                "Face sample has a non-finite value at index {index}"
            )));
        }

        Ok(FaceSample(values))
    }

    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_values(self) -> Vec<f32> {
        self.0
    }
}
