use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use memtsdb_utils::hash::{hash_key, hash_parts};

/// Label is a single `name="value"` pair of a series.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// bytes returns the name bytes directly followed by the value bytes.
    pub fn bytes(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(self.size());
        b.extend_from_slice(self.name.as_bytes());
        b.extend_from_slice(self.value.as_bytes());
        b
    }

    pub fn size(&self) -> usize {
        self.name.len() + self.value.len()
    }
}

impl Debug for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Label")
            .field("name", &self.name)
            .field("value", &self.value)
            .finish()
    }
}

/// Labels is the ordered label set identifying a series.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Labels(Vec<Label>);

impl Labels {
    pub fn new(labels: Vec<Label>) -> Self {
        Self(labels)
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self(pairs.iter().map(|(n, v)| Label::new(*n, *v)).collect())
    }

    /// get returns the value of the label called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|l| l.name == name)
            .map(|l| l.value.as_str())
    }

    pub fn size(&self) -> usize {
        self.0.iter().map(|x| x.size()).sum()
    }
}

impl Deref for Labels {
    type Target = [Label];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice()
    }
}

impl From<Vec<Label>> for Labels {
    fn from(labels: Vec<Label>) -> Self {
        Self(labels)
    }
}

impl<'a> IntoIterator for &'a Labels {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Labels {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, l) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={:?}", l.name, l.value)?;
        }
        write!(f, "}}")
    }
}

/// Fingerprinter reduces a label set to the key of its series.
pub trait Fingerprinter: Send + Sync {
    fn fingerprint(&self, labels: &Labels) -> u64;
}

/// ConcatFingerprinter hashes every label's name and value bytes back to back
/// with no separator, so `{ab="c"}` and `{a="bc"}` share a fingerprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatFingerprinter;

impl Fingerprinter for ConcatFingerprinter {
    fn fingerprint(&self, labels: &Labels) -> u64 {
        hash_parts(
            labels
                .iter()
                .flat_map(|l| [l.name.as_bytes(), l.value.as_bytes()]),
        )
    }
}

/// LengthPrefixedFingerprinter hashes every name and value behind its u32
/// big-endian length.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthPrefixedFingerprinter;

impl Fingerprinter for LengthPrefixedFingerprinter {
    fn fingerprint(&self, labels: &Labels) -> u64 {
        let mut buf = Vec::with_capacity(labels.size() + labels.len() * 8);
        for l in labels {
            for part in [l.name.as_bytes(), l.value.as_bytes()] {
                buf.extend_from_slice(&(part.len() as u32).to_be_bytes());
                buf.extend_from_slice(part);
            }
        }
        hash_key(&buf)
    }
}

/// FingerprintScheme selects one of the built-in fingerprinters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FingerprintScheme {
    Concat,
    #[default]
    LengthPrefixed,
}

impl FingerprintScheme {
    pub fn fingerprinter(&self) -> Box<dyn Fingerprinter> {
        match self {
            FingerprintScheme::Concat => Box::new(ConcatFingerprinter),
            FingerprintScheme::LengthPrefixed => Box::new(LengthPrefixedFingerprinter),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::labels::{
        ConcatFingerprinter, FingerprintScheme, Fingerprinter, Label, Labels,
        LengthPrefixedFingerprinter,
    };

    #[test]
    fn test_label_bytes() {
        let label = Label::new("status_code", "500");
        assert_eq!(label.bytes(), b"status_code500".to_vec());
        assert_eq!(label.size(), 14);
    }

    #[test]
    fn test_labels_get_and_display() {
        let labels = Labels::from_pairs(&[("__name__", "up"), ("job", "node")]);
        assert_eq!(labels.get("job"), Some("node"));
        assert_eq!(labels.get("instance"), None);
        assert_eq!(labels.len(), 2);
        assert_eq!(labels.to_string(), r#"{__name__="up", job="node"}"#);
    }

    #[test]
    fn test_concat_collides() {
        let a = Labels::from_pairs(&[("ab", "c")]);
        let b = Labels::from_pairs(&[("a", "bc")]);
        assert_eq!(
            ConcatFingerprinter.fingerprint(&a),
            ConcatFingerprinter.fingerprint(&b)
        );
    }

    #[test]
    fn test_length_prefixed_distinguishes() {
        let a = Labels::from_pairs(&[("ab", "c")]);
        let b = Labels::from_pairs(&[("a", "bc")]);
        let fp = LengthPrefixedFingerprinter;
        assert_ne!(fp.fingerprint(&a), fp.fingerprint(&b));
        assert_eq!(fp.fingerprint(&a), fp.fingerprint(&a.clone()));

        // label order is part of the identity
        let c = Labels::from_pairs(&[("x", "1"), ("y", "2")]);
        let d = Labels::from_pairs(&[("y", "2"), ("x", "1")]);
        assert_ne!(fp.fingerprint(&c), fp.fingerprint(&d));
    }

    #[test]
    fn test_scheme_config() {
        let scheme: FingerprintScheme = serde_json::from_str(r#""concat""#).unwrap();
        assert_eq!(scheme, FingerprintScheme::Concat);
        assert_eq!(FingerprintScheme::default(), FingerprintScheme::LengthPrefixed);

        let labels = Labels::from_pairs(&[("a", "bc")]);
        assert_eq!(
            scheme.fingerprinter().fingerprint(&labels),
            ConcatFingerprinter.fingerprint(&labels)
        );
    }
}
