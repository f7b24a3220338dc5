//! Redacted secrets and rotatable credential lists.

use serde::{Deserialize, Deserializer};

#[derive(Clone, PartialEq, Eq)]
pub struct SecretString {
    value: String,
}

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn expose(&self) -> &str {
        self.value.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        unsafe {
            self.value.as_mut_vec().fill(0);
        }
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretString::new)
    }
}

/// Ordered API keys plus the index of the key the user marked active.
///
/// The current index is always a valid index into `keys`, or 0 when the list
/// is empty.
///
/// ```rust
/// use rprovider::CredentialList;
///
/// let mut keys = CredentialList::new(["k1", "k2", "k3"]);
/// assert!(keys.select(2));
/// keys.remove("k3");
/// assert_eq!(keys.current_index(), 1);
///
/// let order: Vec<&str> = keys.rotation_order().iter().map(|k| k.expose()).collect();
/// assert_eq!(order, vec!["k2", "k1"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialList {
    keys: Vec<SecretString>,
    current_index: usize,
}

impl CredentialList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for key in keys {
            list.add(key);
        }
        list
    }

    /// Restores a persisted index, clamping it into range.
    pub fn with_current_index(mut self, index: usize) -> Self {
        self.current_index = index;
        self.clamp_index();
        self
    }

    /// Appends a trimmed key. Blank and duplicate keys are ignored.
    pub fn add(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        let key = key.trim();
        if key.is_empty() || self.keys.iter().any(|existing| existing.expose() == key) {
            return false;
        }

        self.keys.push(SecretString::new(key));
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|existing| existing.expose() != key);
        let removed = self.keys.len() != before;
        self.clamp_index();
        removed
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.keys.len() {
            return false;
        }

        self.current_index = index;
        true
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn active(&self) -> Option<&SecretString> {
        self.keys.get(self.current_index)
    }

    pub fn keys(&self) -> &[SecretString] {
        &self.keys
    }

    /// Every key exactly once, starting at the active one and wrapping around.
    pub fn rotation_order(&self) -> Vec<&SecretString> {
        let (tail, head) = self.keys.split_at(self.current_index.min(self.keys.len()));
        head.iter().chain(tail.iter()).collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn clamp_index(&mut self) {
        if self.current_index >= self.keys.len() {
            self.current_index = self.keys.len().saturating_sub(1);
        }
    }
}
