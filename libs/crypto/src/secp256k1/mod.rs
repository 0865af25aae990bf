//! ECDSA over the secp256k1 curve.
//!
//! Signing is randomized: the RFC6979 nonce derivation is mixed with fresh
//! entropy, so signing the same digest twice yields different signatures.
//! Signatures are always low-S normalized and encode to a fixed 64 bytes.

use k256::ecdsa::signature::hazmat::{PrehashVerifier as _, RandomizedPrehashSigner as _};
use num_bigint::BigUint;
use zeroize::ZeroizeOnDrop;

use crate::ByteFmt;

mod testonly;


/// Width of one scalar of the curve in bytes.
pub const SCALAR_LENGTH: usize = 32;
/// Length of an encoded signature: `r` followed by `s`, both fixed width.
pub const SIGNATURE_LENGTH: usize = 2 * SCALAR_LENGTH;

/// Secp256k1 secret key
#[derive(ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretKey(k256::ecdsa::SigningKey);

impl SecretKey {
    /// Generates a secret key from a cryptographically-secure entropy source.
    pub fn generate() -> Self {
        Self(k256::SecretKey::random(&mut rand::rngs::OsRng).into())
    }

    /// Gets the corresponding [`PublicKey`] for this [`SecretKey`]
    pub fn public(&self) -> PublicKey {
        PublicKey(*self.0.verifying_key())
    }

    /// Signs a message digest, drawing the extra nonce entropy from the OS.
    ///
    /// Fails if the entropy source fails or the digest is too short to be
    /// reduced to a scalar.
    pub fn sign_hash(&self, hash: &[u8]) -> anyhow::Result<Signature> {
        self.sign_hash_with_rng(&mut rand::rngs::OsRng, hash)
    }

    /// Signs a message digest with caller provided entropy.
    pub fn sign_hash_with_rng(
        &self,
        rng: &mut impl elliptic_curve::rand_core::CryptoRngCore,
        hash: &[u8],
    ) -> anyhow::Result<Signature> {
        let sig: k256::ecdsa::Signature = self.0.sign_prehash_with_rng(rng, hash)?;
        // k256 already produces low-S signatures; normalizing again is a noop then.
        Ok(Signature(sig.normalize_s().unwrap_or(sig)))
    }
}

impl ByteFmt for SecretKey {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let sk = k256::ecdsa::SigningKey::from_slice(bytes)?;
        Ok(Self(sk))
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_bytes().to_vec()
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey({:?})", self.public())
    }
}

/// Secp256k1 public key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PublicKey(k256::ecdsa::VerifyingKey);

impl ByteFmt for PublicKey {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let vk = k256::ecdsa::VerifyingKey::from_sec1_bytes(bytes)?;
        Ok(Self(vk))
    }

    fn encode(&self) -> Vec<u8> {
        self.0.to_sec1_bytes().to_vec()
    }
}

impl std::hash::Hash for PublicKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write(&self.encode())
    }
}

/// Secp256k1 ECDSA signature, i.e. the `(r, s)` scalar pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(k256::ecdsa::Signature);

impl Signature {
    /// Reassembles a signature from its big-endian `r` and `s` scalars.
    ///
    /// Both scalars must be non-zero and below the curve order.
    pub fn from_scalars(r: &BigUint, s: &BigUint) -> anyhow::Result<Self> {
        let r = to_fixed_width(r).map_err(|err| err.context("r"))?;
        let s = to_fixed_width(s).map_err(|err| err.context("s"))?;
        let sig = k256::ecdsa::Signature::from_scalars(r, s)?;
        Ok(Self(sig))
    }

    /// The `r` scalar.
    pub fn r(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.r().to_bytes())
    }

    /// The `s` scalar.
    pub fn s(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0.s().to_bytes())
    }

    /// Verifies the signature of a message digest against a public key.
    ///
    /// Both `(r, s)` and `(r, n - s)` are accepted, since restored signatures
    /// may come in the high-S form.
    pub fn verify_hash(&self, hash: &[u8], pk: &PublicKey) -> anyhow::Result<()> {
        match self.0.normalize_s() {
            Some(low) => pk.0.verify_prehash(hash, &low)?,
            None => pk.0.verify_prehash(hash, &self.0)?,
        }
        Ok(())
    }
}

/// Left-pads a big-endian integer to the scalar width.
fn to_fixed_width(x: &BigUint) -> anyhow::Result<[u8; SCALAR_LENGTH]> {
    let bytes = x.to_bytes_be();
    anyhow::ensure!(
        bytes.len() <= SCALAR_LENGTH,
        "scalar has {} bytes, at most {SCALAR_LENGTH} allowed",
        bytes.len()
    );
    let mut out = [0u8; SCALAR_LENGTH];
    out[SCALAR_LENGTH - bytes.len()..].copy_from_slice(&bytes);
    Ok(out)
}

impl ByteFmt for Signature {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            bytes.len() == SIGNATURE_LENGTH,
            "unexpected signature length: {}",
            bytes.len()
        );
        Ok(Self(k256::ecdsa::Signature::from_slice(bytes)?))
    }

    /// Fixed-width `r || s`. The leading zeroes of each scalar are kept, so
    /// the halves can always be split at [`SCALAR_LENGTH`].
    fn encode(&self) -> Vec<u8> {
        let (r, s) = self.0.split_bytes();
        let mut bz = Vec::with_capacity(SIGNATURE_LENGTH);
        bz.extend_from_slice(&r);
        bz.extend_from_slice(&s);
        bz
    }
}

impl std::hash::Hash for Signature {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write(&self.encode())
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        ByteFmt::encode(self).cmp(&ByteFmt::encode(other))
    }
}
