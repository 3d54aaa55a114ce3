//! Append-only set of sensitive strings that must never reach diagnostics.
//!
//! A [`SecretSet`] is a cheap handle: clones share the same underlying set.
//! Every sink that writes diagnostics (workflow commands, log writers) holds a
//! handle and passes its output through [`SecretSet::mask`].

use std::borrow::Cow;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use zeroize::Zeroizing;

/// Replacement text for a masked value.
pub const MASK: &str = "***";

/// Shared, append-only collection of secrets.
#[derive(Clone, Default)]
pub struct SecretSet {
    inner: Arc<RwLock<Vec<Zeroizing<String>>>>,
}

impl SecretSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a value for masking.
    ///
    /// Empty values are ignored. Returns `true` if the value was newly added.
    pub fn register(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }

        let mut secrets = self.write();
        if secrets.iter().any(|s| s.as_str() == value) {
            return false;
        }

        secrets.push(Zeroizing::new(value.to_string()));
        // Longest first, so a secret containing another is replaced whole.
        secrets.sort_by(|a, b| b.len().cmp(&a.len()));
        true
    }

    /// Number of registered secrets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Check whether `text` contains any registered secret.
    pub fn contains_secret(&self, text: &str) -> bool {
        self.read().iter().any(|s| text.contains(s.as_str()))
    }

    /// Replace every registered secret in `text` with [`MASK`].
    pub fn mask<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let secrets = self.read();
        if !secrets.iter().any(|s| text.contains(s.as_str())) {
            return Cow::Borrowed(text);
        }

        let mut masked = text.to_string();
        for secret in secrets.iter() {
            if masked.contains(secret.as_str()) {
                masked = masked.replace(secret.as_str(), MASK);
            }
        }
        Cow::Owned(masked)
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Zeroizing<String>>> {
        // The set is append-only, so a poisoned lock still holds valid data.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Zeroizing<String>>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for SecretSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretSet")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mask_replaces_registered_values() {
        let secrets = SecretSet::new();
        secrets.register("hunter2");

        assert_eq!(secrets.mask("password is hunter2!"), "password is ***!");
        assert_eq!(secrets.mask("nothing here"), "nothing here");
    }

    #[test]
    fn test_register_ignores_empty_and_duplicates() {
        let secrets = SecretSet::new();
        assert!(!secrets.register(""));
        assert!(secrets.register("abc"));
        assert!(!secrets.register("abc"));
        assert_eq!(secrets.len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let secrets = SecretSet::new();
        let handle = secrets.clone();
        handle.register("shared-secret");

        assert!(secrets.contains_secret("the shared-secret leaks"));
        assert_eq!(secrets.mask("shared-secret"), MASK);
    }

    #[test]
    fn test_longer_secret_masked_whole() {
        let secrets = SecretSet::new();
        secrets.register("key");
        secrets.register("private-key-material");

        assert_eq!(secrets.mask("x private-key-material y"), "x *** y");
    }

    #[test]
    fn test_debug_does_not_reveal_values() {
        let secrets = SecretSet::new();
        secrets.register("top-secret");
        assert!(!format!("{:?}", secrets).contains("top-secret"));
    }

    proptest! {
        #[test]
        fn prop_masked_output_never_contains_secret(
            secret in "[a-z0-9]{4,32}",
            prefix in "[A-Z ]{0,16}",
            suffix in "[A-Z ]{0,16}",
        ) {
            let secrets = SecretSet::new();
            secrets.register(&secret);

            let line = format!("{}{}{}{}", prefix, secret, suffix, secret);
            let masked = secrets.mask(&line);
            prop_assert!(!masked.contains(&secret));
        }
    }
}
