//! Startup loading of static enrollment data.
//!
//! Enrollment consists of three parallel-indexed JSON arrays:
//!
//! - `names.json`: one identity label per enrolled face vector
//! - `faces.json`: the flattened face vectors
//! - `rfid.json`: the token bound to the label at the same index
//!
//! A missing or corrupt file, ragged face vectors, or arrays of different
//! lengths are startup-fatal.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::{Error, Identity, IdentityRegistry, Result, TokenId};

/// Locations of the three enrollment files.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnrollmentPaths {
    #[serde(default = "default_labels_path")]
    pub labels: PathBuf,

    #[serde(default = "default_faces_path")]
    pub faces: PathBuf,

    #[serde(default = "default_tokens_path")]
    pub tokens: PathBuf,
}

fn default_labels_path() -> PathBuf {
    PathBuf::from("data/names.json")
}

fn default_faces_path() -> PathBuf {
    PathBuf::from("data/faces.json")
}

fn default_tokens_path() -> PathBuf {
    PathBuf::from("data/rfid.json")
}

impl Default for EnrollmentPaths {
    fn default() -> Self {
        Self {
            labels: default_labels_path(),
            faces: default_faces_path(),
            tokens: default_tokens_path(),
        }
    }
}

impl EnrollmentPaths {
    /// Paths for the default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            labels: dir.join("names.json"),
            faces: dir.join("faces.json"),
            tokens: dir.join("rfid.json"),
        }
    }
}

/// Validated enrollment data.
#[derive(Debug, Clone)]
pub struct EnrollmentData {
    labels: Vec<Identity>,
    faces: Vec<Vec<f32>>,
    tokens: Vec<TokenId>,
}

impl EnrollmentData {
    /// Validate already-parsed enrollment sequences.
    ///
    /// # Errors
    /// - `Error::EmptyEnrollment` if there are no rows
    /// - `Error::EnrollmentMismatch` if the three sequences differ in length
    /// - `Error::RaggedFaceVector` if face vectors differ in dimension
    pub fn from_parts(
        labels: Vec<Identity>,
        faces: Vec<Vec<f32>>,
        tokens: Vec<TokenId>,
    ) -> Result<Self> {
        if labels.len() != faces.len() || labels.len() != tokens.len() {
            return Err(Error::EnrollmentMismatch {
                labels: labels.len(),
                faces: faces.len(),
                tokens: tokens.len(),
            });
        }

        let Some(first) = faces.first() else {
            return Err(Error::EmptyEnrollment);
        };

        let expected = first.len();
        if expected == 0 {
            return Err(Error::RaggedFaceVector {
                index: 0,
                expected: 1,
                actual: 0,
            });
        }

        if let Some((index, face)) = faces
            .iter()
            .enumerate()
            .find(|(_, face)| face.len() != expected)
        {
            return Err(Error::RaggedFaceVector {
                index,
                expected,
                actual: face.len(),
            });
        }

        Ok(Self {
            labels,
            faces,
            tokens,
        })
    }

    /// Load and validate the three enrollment files.
    pub fn load(paths: &EnrollmentPaths) -> Result<Self> {
        let labels: Vec<Identity> = read_json(&paths.labels)?;
        let faces: Vec<Vec<f32>> = read_json(&paths.faces)?;
        let tokens: Vec<TokenId> = read_json(&paths.tokens)?;

        debug!(
            labels = labels.len(),
            faces = faces.len(),
            tokens = tokens.len(),
            "enrollment files parsed"
        );

        let data = Self::from_parts(labels, faces, tokens)?;
        info!(
            rows = data.len(),
            dimension = data.dimension(),
            "enrollment data loaded"
        );
        Ok(data)
    }

    /// Number of enrolled face vectors.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Length of each face vector.
    pub fn dimension(&self) -> usize {
        self.faces.first().map_or(0, Vec::len)
    }

    pub fn labels(&self) -> &[Identity] {
        &self.labels
    }

    pub fn faces(&self) -> &[Vec<f32>] {
        &self.faces
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    /// First enrolled face vector for `identity`.
    pub fn face_of(&self, identity: &Identity) -> Option<&[f32]> {
        self.labels
            .iter()
            .position(|label| label == identity)
            .map(|index| self.faces[index].as_slice())
    }

    /// Build the identity registry from the label and token columns.
    pub fn registry(&self) -> Result<IdentityRegistry> {
        IdentityRegistry::from_parallel(&self.labels, &self.tokens)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| Error::EnrollmentLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| Error::EnrollmentLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn id(label: &str) -> Identity {
        Identity::new(label).unwrap()
    }

    fn token(value: &str) -> TokenId {
        TokenId::new(value).unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        let mut file = fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_from_parts_valid() {
        let data = EnrollmentData::from_parts(
            vec![id("alice"), id("bob")],
            vec![vec![0.0, 1.0], vec![2.0, 3.0]],
            vec![token("T1"), token("T2")],
        )
        .unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data.dimension(), 2);
        assert_eq!(data.face_of(&id("bob")), Some(&[2.0, 3.0][..]));
        assert_eq!(data.face_of(&id("carol")), None);
    }

    #[test]
    fn test_from_parts_length_mismatch() {
        let result = EnrollmentData::from_parts(
            vec![id("alice"), id("bob")],
            vec![vec![0.0], vec![1.0]],
            vec![token("T1")],
        );

        assert!(matches!(
            result,
            Err(Error::EnrollmentMismatch {
                labels: 2,
                faces: 2,
                tokens: 1
            })
        ));
    }

    #[test]
    fn test_from_parts_ragged_faces() {
        let result = EnrollmentData::from_parts(
            vec![id("alice"), id("bob")],
            vec![vec![0.0, 1.0], vec![1.0]],
            vec![token("T1"), token("T2")],
        );

        assert!(matches!(
            result,
            Err(Error::RaggedFaceVector {
                index: 1,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_parts_empty() {
        let result = EnrollmentData::from_parts(vec![], vec![], vec![]);
        assert!(matches!(result, Err(Error::EmptyEnrollment)));
    }

    #[test]
    fn test_load_from_files() {
        let dir = TempDir::new().unwrap();
        write(&dir, "names.json", r#"["alice", "alice", "bob"]"#);
        write(&dir, "faces.json", "[[0, 0], [1, 1], [9, 9]]");
        write(&dir, "rfid.json", r#"[584190234871, 584190234871, "T2"]"#);

        let data = EnrollmentData::load(&EnrollmentPaths::in_dir(dir.path())).unwrap();
        assert_eq!(data.len(), 3);

        let registry = data.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.lookup(&id("alice")).unwrap().as_str(),
            "584190234871"
        );
    }

    #[test]
    fn test_load_rejects_blank_label() {
        let dir = TempDir::new().unwrap();
        write(&dir, "names.json", r#"[" alice", "  "]"#);
        write(&dir, "faces.json", "[[0, 0], [1, 1]]");
        write(&dir, "rfid.json", r#"["T1", "T2"]"#);

        let result = EnrollmentData::load(&EnrollmentPaths::in_dir(dir.path()));
        assert!(matches!(result, Err(Error::EnrollmentLoad { .. })));

        write(&dir, "names.json", r#"[" alice", "bob "]"#);
        let data = EnrollmentData::load(&EnrollmentPaths::in_dir(dir.path())).unwrap();
        assert_eq!(data.face_of(&id("alice")), Some(&[0.0, 0.0][..]));
        assert_eq!(data.face_of(&id("bob")), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "names.json", r#"["alice"]"#);

        let result = EnrollmentData::load(&EnrollmentPaths::in_dir(dir.path()));
        assert!(matches!(result, Err(Error::EnrollmentLoad { .. })));
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = TempDir::new().unwrap();
        write(&dir, "names.json", r#"["alice"]"#);
        write(&dir, "faces.json", "[[0, 0]");
        write(&dir, "rfid.json", r#"["T1"]"#);

        let result = EnrollmentData::load(&EnrollmentPaths::in_dir(dir.path()));
        assert!(matches!(result, Err(Error::EnrollmentLoad { .. })));
    }
}
