//! Token verification against the identity registry.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Identity, IdentityRegistry, TokenId};

/// Outcome of checking an observed token against a claimed identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verification {
    /// Identity is enrolled and the token is the expected one.
    Match,
    /// Identity is enrolled but the token belongs to someone else (or no one).
    Mismatch,
    /// Identity has no enrollment record.
    UnknownIdentity,
}

impl Verification {
    pub fn is_match(self) -> bool {
        matches!(self, Verification::Match)
    }
}

impl fmt::Display for Verification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verification::Match => "Match",
            Verification::Mismatch => "Mismatch",
            Verification::UnknownIdentity => "UnknownIdentity",
        };
        write!(f, "{s}")
    }
}

/// Checks observed tokens against the registry.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use doorward_core::{EnrolledRecord, Identity, IdentityRegistry, TokenId, TokenVerifier, Verification};
///
/// let alice = Identity::new("alice").unwrap();
/// let registry = IdentityRegistry::from_records([
///     EnrolledRecord::new(alice.clone(), TokenId::new("T1").unwrap()),
/// ]);
/// let verifier = TokenVerifier::new(Arc::new(registry));
///
/// assert_eq!(verifier.verify(&alice, &TokenId::new("T1").unwrap()), Verification::Match);
/// assert_eq!(verifier.verify(&alice, &TokenId::new("T2").unwrap()), Verification::Mismatch);
/// ```
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    registry: Arc<IdentityRegistry>,
}

impl TokenVerifier {
    pub fn new(registry: Arc<IdentityRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn verify(&self, identity: &Identity, observed: &TokenId) -> Verification {
        match self.registry.lookup(identity) {
            None => Verification::UnknownIdentity,
            Some(expected) if expected == observed => Verification::Match,
            Some(_) => Verification::Mismatch,
        }
    }
}
