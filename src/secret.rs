use secrecy::{ExposeSecret, SecretBox};

/// Heap bytes that are zeroized on drop and redacted in `Debug`.
///
/// Holds decoded key and IV material for the lifetime of one job.
pub struct SecretBytes {
    inner: SecretBox<Vec<u8>>,
}

impl SecretBytes {
    pub fn new(data: &[u8]) -> Self {
        Self { inner: SecretBox::new(Box::new(data.to_vec())) }
    }

    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { inner: SecretBox::new(Box::new(data)) }
    }

    pub fn expose_secret(&self) -> &[u8] {
        self.inner.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl Clone for SecretBytes {
    fn clone(&self) -> Self {
        Self::new(self.expose_secret())
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretBytes([... {} bytes ...])", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretBytes::new(b"0123456789abcdef");
        let shown = format!("{secret:?}");
        assert_eq!(shown, "SecretBytes([... 16 bytes ...])");
        assert!(!shown.contains("0123"));
    }

    #[test]
    fn test_clone_copies_bytes() {
        let secret = SecretBytes::from_vec(vec![1, 2, 3]);
        assert_eq!(secret.clone().expose_secret(), &[1, 2, 3]);
    }
}
