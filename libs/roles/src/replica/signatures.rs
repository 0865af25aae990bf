//! Partial signatures of single replicas and the threshold signatures assembled from them.
use std::{collections::BTreeMap, fmt};

use hotstuff_crypto::{secp256k1, ByteFmt as _};
use hotstuff_utils::enum_util::{BadVariantError, Variant};
use num_bigint::BigUint;

use super::{Hash, PublicKey, ReplicaId};

/// Signature of a single replica over a message hash.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PartialSignature {
    pub(crate) sig: secp256k1::Signature,
    pub(crate) signer: ReplicaId,
}

impl PartialSignature {
    /// Restores a previously produced signature from its scalars.
    /// New signatures are made with [`super::SecretKey::sign_hash`].
    pub fn restore(r: &BigUint, s: &BigUint, signer: ReplicaId) -> anyhow::Result<Self> {
        Ok(Self {
            sig: secp256k1::Signature::from_scalars(r, s)?,
            signer,
        })
    }

    /// Replica that produced the signature.
    pub fn signer(&self) -> ReplicaId {
        self.signer
    }

    /// The `r` component.
    pub fn r(&self) -> BigUint {
        self.sig.r()
    }

    /// The `s` component.
    pub fn s(&self) -> BigUint {
        self.sig.s()
    }

    /// Checks the signature against the signer's public key.
    pub fn verify_hash(&self, hash: &Hash, pk: &PublicKey) -> anyhow::Result<()> {
        self.sig.verify_hash(hash.0.as_bytes(), &pk.0)
    }

    /// Fixed-width `r || s` encoding, 64 bytes. The signer is not part of it.
    pub fn encode(&self) -> Vec<u8> {
        self.sig.encode()
    }
}

impl fmt::Debug for PartialSignature {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "PartialSignature({:?}, {})",
            self.signer,
            hex::encode(self.encode())
        )
    }
}

/// A quorum certificate's signature: at most one partial signature per replica.
///
/// Valid instances are produced by the threshold signature service, which
/// only hands them out once a quorum of verified partials has been collected.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ThresholdSignature(BTreeMap<ReplicaId, PartialSignature>);

impl ThresholdSignature {
    /// Rebuilds a threshold signature out of partial signatures, without any verification.
    /// If a signer appears more than once, its last partial is kept.
    pub fn restore(partials: impl IntoIterator<Item = PartialSignature>) -> Self {
        Self(partials.into_iter().map(|p| (p.signer, p)).collect())
    }

    /// Number of partial signatures.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no partial signatures.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Replicas whose partial signatures are included.
    pub fn participants(&self) -> Participants<'_> {
        Participants(&self.0)
    }

    /// The partial signature of a given replica.
    pub fn get(&self, signer: ReplicaId) -> Option<&PartialSignature> {
        self.0.get(&signer)
    }

    /// Partial signatures in ascending signer order.
    pub fn partials(&self) -> impl Iterator<Item = &PartialSignature> {
        self.0.values()
    }

    /// Concatenation of the partial signature encodings in ascending signer order.
    /// The result doesn't depend on the order the partials were collected in,
    /// so it can be used as a hash input.
    pub fn encode(&self) -> Vec<u8> {
        self.partials().flat_map(PartialSignature::encode).collect()
    }
}

impl fmt::Debug for ThresholdSignature {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_list().entries(self.0.values()).finish()
    }
}

/// Read-only view of the signers of a [`ThresholdSignature`].
#[derive(Clone, Copy)]
pub struct Participants<'a>(&'a BTreeMap<ReplicaId, PartialSignature>);

impl<'a> Participants<'a> {
    /// Whether the replica signed.
    pub fn contains(&self, id: ReplicaId) -> bool {
        self.0.contains_key(&id)
    }

    /// Signers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ReplicaId> + 'a {
        let signers: &'a BTreeMap<_, _> = self.0;
        signers.keys().copied()
    }

    /// Number of signers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nobody signed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Participants<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_set().entries(self.iter()).finish()
    }
}

/// Any signature that can travel in a consensus message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Signature {
    /// Signature of a single replica.
    Partial(PartialSignature),
    /// Aggregate of a quorum of partial signatures.
    Threshold(ThresholdSignature),
}

impl Signature {
    /// The single signer, for variants that have one.
    pub fn signer(&self) -> Option<ReplicaId> {
        match self {
            Self::Partial(sig) => Some(sig.signer),
            Self::Threshold(_) => None,
        }
    }

    /// Name of the variant, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Partial(_) => "partial",
            Self::Threshold(_) => "threshold",
        }
    }

    /// Byte encoding of the underlying variant.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Partial(sig) => sig.encode(),
            Self::Threshold(sig) => sig.encode(),
        }
    }
}

impl Variant<Signature> for PartialSignature {
    fn insert(self) -> Signature {
        Signature::Partial(self)
    }

    fn extract(sig: Signature) -> Result<Self, BadVariantError> {
        let Signature::Partial(this) = sig else {
            return Err(BadVariantError {
                expected: "partial",
            });
        };
        Ok(this)
    }
}

impl Variant<Signature> for ThresholdSignature {
    fn insert(self) -> Signature {
        Signature::Threshold(self)
    }

    fn extract(sig: Signature) -> Result<Self, BadVariantError> {
        let Signature::Threshold(this) = sig else {
            return Err(BadVariantError {
                expected: "threshold",
            });
        };
        Ok(this)
    }
}

impl From<PartialSignature> for Signature {
    fn from(sig: PartialSignature) -> Self {
        sig.insert()
    }
}

impl From<ThresholdSignature> for Signature {
    fn from(sig: ThresholdSignature) -> Self {
        sig.insert()
    }
}
