//! Keccak256 digests. Every message that gets signed is first reduced to one of these.
use crate::ByteFmt;
use sha3::{digest::Update as _, Digest as _};

pub mod testonly;

/// Length of a digest in bytes.
pub const HASH_LENGTH: usize = 32;

/// Keccak256 hash.
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Keccak256(pub(crate) [u8; HASH_LENGTH]);

impl Keccak256 {
    /// Hashes a message.
    pub fn new(msg: &[u8]) -> Self {
        Self(sha3::Keccak256::new().chain(msg).finalize().into())
    }

    /// Hashes the concatenation of several parts, without materializing it.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let hasher = parts
            .into_iter()
            .fold(sha3::Keccak256::new(), |h, part| h.chain(part));
        Self(hasher.finalize().into())
    }

    /// Wraps an existing digest.
    pub fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }
}

impl ByteFmt for Keccak256 {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        Ok(Self(bytes.try_into()?))
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl std::fmt::Debug for Keccak256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Keccak256({})", hex::encode(self.0))
    }
}
