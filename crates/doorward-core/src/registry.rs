//! Identity registry: enrolled identity → expected token.
//!
//! The registry is built once from enrollment data at startup and is
//! read-only afterwards. Enrollment stores one row per face vector, so a
//! person with several enrolled faces appears several times in the label
//! list; lookups resolve to the token at the label's first row.

use std::collections::HashMap;

use crate::{EnrolledRecord, Error, Identity, Result, TokenId};

/// Static mapping from enrolled identity to expected token identifier.
///
/// # Examples
///
/// ```
/// use doorward_core::{Identity, IdentityRegistry, TokenId};
///
/// let labels = vec![Identity::new("alice").unwrap(), Identity::new("bob").unwrap()];
/// let tokens = vec![TokenId::new("T1").unwrap(), TokenId::new("T2").unwrap()];
/// let registry = IdentityRegistry::from_parallel(&labels, &tokens).unwrap();
///
/// assert_eq!(registry.lookup(&labels[0]).unwrap().as_str(), "T1");
/// assert!(registry.lookup(&Identity::new("carol").unwrap()).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    records: HashMap<Identity, TokenId>,
}

impl IdentityRegistry {
    /// Build the registry from parallel-indexed label and token lists.
    ///
    /// # Errors
    /// Returns `Error::RegistryMismatch` if the two lists have different
    /// lengths.
    pub fn from_parallel(labels: &[Identity], tokens: &[TokenId]) -> Result<Self> {
        if labels.len() != tokens.len() {
            return Err(Error::RegistryMismatch {
                labels: labels.len(),
                tokens: tokens.len(),
            });
        }

        let mut records = HashMap::with_capacity(labels.len());
        for (identity, token) in labels.iter().zip(tokens) {
            records
                .entry(identity.clone())
                .or_insert_with(|| token.clone());
        }

        Ok(Self { records })
    }

    /// Build the registry from explicit records. Later duplicates are ignored.
    pub fn from_records(records: impl IntoIterator<Item = EnrolledRecord>) -> Self {
        let mut map = HashMap::new();
        for record in records {
            map.entry(record.identity).or_insert(record.expected_token);
        }
        Self { records: map }
    }

    /// Expected token for `identity`, or `None` when it is not enrolled.
    pub fn lookup(&self, identity: &Identity) -> Option<&TokenId> {
        self.records.get(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.records.contains_key(identity)
    }

    /// Number of distinct enrolled identities.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Enrolled identities in sorted order.
    pub fn identities(&self) -> Vec<&Identity> {
        let mut identities: Vec<_> = self.records.keys().collect();
        identities.sort();
        identities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> Identity {
        Identity::new(label).unwrap()
    }

    fn token(value: &str) -> TokenId {
        TokenId::new(value).unwrap()
    }

    #[test]
    fn test_lookup_enrolled_and_missing() {
        let registry =
            IdentityRegistry::from_parallel(&[id("alice"), id("bob")], &[token("T1"), token("T2")])
                .unwrap();

        assert_eq!(registry.lookup(&id("alice")), Some(&token("T1")));
        assert_eq!(registry.lookup(&id("bob")), Some(&token("T2")));
        assert_eq!(registry.lookup(&id("carol")), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let result = IdentityRegistry::from_parallel(&[id("alice"), id("bob")], &[token("T1")]);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            Error::RegistryMismatch {
                labels: 2,
                tokens: 1
            }
        ));
        assert_eq!(
            err.to_string(),
            "Registry needs one token per label: 2 labels, 1 tokens"
        );
    }

    #[test]
    fn test_duplicate_label_resolves_to_first_row() {
        let registry = IdentityRegistry::from_parallel(
            &[id("alice"), id("alice"), id("bob")],
            &[token("T1"), token("T9"), token("T2")],
        )
        .unwrap();

        assert_eq!(registry.lookup(&id("alice")), Some(&token("T1")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_records_and_identities_sorted() {
        let registry = IdentityRegistry::from_records([
            EnrolledRecord::new(id("bob"), token("T2")),
            EnrolledRecord::new(id("alice"), token("T1")),
        ]);

        let identities: Vec<&str> = registry.identities().iter().map(|i| i.as_str()).collect();
        assert_eq!(identities, vec!["alice", "bob"]);
        assert!(registry.contains(&id("alice")));
    }
}
