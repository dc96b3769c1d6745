use bytes::Bytes;

/// Identifies the backing counter for one ID class.
///
/// An empty key is the sentinel "invalid" value: it marks the counter as
/// temporarily unusable (unreachable or misconfigured) without tearing the
/// allocator down. While a key is invalid, block reservations pause and
/// retry; they resume as soon as a valid key is restored.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CounterKey(Bytes);

impl CounterKey {
    pub fn new(key: impl Into<Bytes>) -> Self {
        Self(key.into())
    }

    /// The sentinel key. Reservations against it are deferred, not failed.
    pub const fn invalid() -> Self {
        Self(Bytes::new())
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_invalid() {
        assert!(!CounterKey::invalid().is_valid());
        assert!(CounterKey::new("group-id-generator").is_valid());
    }

    #[test]
    fn keys_compare_by_contents() {
        assert_eq!(CounterKey::new("a"), CounterKey::new(Bytes::from_static(b"a")));
        assert_ne!(CounterKey::new("a"), CounterKey::new("b"));
        assert_eq!(CounterKey::new("a").as_bytes(), b"a");
    }
}
