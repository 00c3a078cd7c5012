use sha2::{Digest, Sha256};

/// Fingerprint accumulating the inputs a model is resolved from
///
/// Each input is framed by its label and length, so moving bytes between
/// inputs changes the digest.
#[derive(Debug, Clone, Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: &str, content: &[u8]) {
        self.hasher.update(label.as_bytes());
        self.hasher.update((content.len() as u64).to_le_bytes());
        self.hasher.update(content);
    }

    /// Lowercase hex sha-256
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Lowercase hex sha-256 of `content`
pub fn sha256_hex(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}
