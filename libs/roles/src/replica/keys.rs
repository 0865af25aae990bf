//! Cryptographic keys of the replica role.
use std::{fmt, sync::Arc};

use hotstuff_crypto::{secp256k1, ByteFmt, Text, TextFmt};

use super::{Hash, PartialSignature, ReplicaId};

/// A secret key of a replica.
/// Kept behind an Arc, so that clones don't copy the secret around in memory.
#[derive(Clone, PartialEq)]
pub struct SecretKey(pub(crate) Arc<secp256k1::SecretKey>);

impl SecretKey {
    /// Generates a secret key from a cryptographically-secure entropy source.
    pub fn generate() -> Self {
        Self(Arc::new(secp256k1::SecretKey::generate()))
    }

    /// Public key corresponding to this secret key.
    pub fn public(&self) -> PublicKey {
        PublicKey(self.0.public())
    }

    /// Signs a message hash on behalf of `signer`.
    ///
    /// Fails only if the entropy source does.
    pub fn sign_hash(&self, signer: ReplicaId, hash: &Hash) -> anyhow::Result<PartialSignature> {
        let sig = self.0.sign_hash(hash.0.as_bytes())?;
        Ok(PartialSignature { sig, signer })
    }
}

impl ByteFmt for SecretKey {
    fn encode(&self) -> Vec<u8> {
        ByteFmt::encode(&*self.0)
    }

    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        ByteFmt::decode(bytes).map(Arc::new).map(Self)
    }
}

impl TextFmt for SecretKey {
    fn encode(&self) -> String {
        format!(
            "replica:secret:secp256k1:{}",
            hex::encode(ByteFmt::encode(&*self.0))
        )
    }

    fn decode(text: Text) -> anyhow::Result<Self> {
        text.strip("replica:secret:secp256k1:")?
            .decode_hex()
            .map(Arc::new)
            .map(Self)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        // The secret itself is never printed.
        write!(fmt, "<secret for {}>", TextFmt::encode(&self.public()))
    }
}

/// A public key of a replica.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, std::hash::Hash)]
pub struct PublicKey(pub(crate) secp256k1::PublicKey);

impl ByteFmt for PublicKey {
    fn encode(&self) -> Vec<u8> {
        ByteFmt::encode(&self.0)
    }

    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        ByteFmt::decode(bytes).map(Self)
    }
}

impl TextFmt for PublicKey {
    fn encode(&self) -> String {
        format!(
            "replica:public:secp256k1:{}",
            hex::encode(ByteFmt::encode(&self.0))
        )
    }

    fn decode(text: Text) -> anyhow::Result<Self> {
        text.strip("replica:public:secp256k1:")?
            .decode_hex()
            .map(Self)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&TextFmt::encode(self))
    }
}
