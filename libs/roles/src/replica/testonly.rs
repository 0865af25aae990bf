//! Test-only utilities.
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};

use super::{
    Block, Committee, Hash, PartialSignature, PublicKey, QuorumCert, ReplicaId, SecretKey,
    ThresholdSignature, View,
};

/// A committee together with the secret keys of all its members,
/// for tests which play every replica themselves.
#[derive(Debug, Clone)]
pub struct Setup {
    /// Secret keys of replicas `1..=n`, in id order.
    pub keys: Vec<(ReplicaId, SecretKey)>,
    /// Committee made of the public keys.
    pub committee: Committee,
}

impl Setup {
    /// Generates `n` replicas with ids `1..=n`.
    pub fn new(rng: &mut impl Rng, n: u32) -> Self {
        let keys: Vec<_> = (1..=n).map(|i| (ReplicaId(i), rng.gen())).collect();
        let committee = Committee::new(keys.iter().map(|(id, k): &(_, SecretKey)| (*id, k.public())))
            .unwrap();
        Self { keys, committee }
    }

    /// Secret key of a replica.
    pub fn key(&self, id: ReplicaId) -> &SecretKey {
        &self.keys.iter().find(|(i, _)| *i == id).unwrap().1
    }

    /// Partial signature of `id` over `hash`.
    pub fn sign(&self, id: ReplicaId, hash: &Hash) -> PartialSignature {
        self.key(id).sign_hash(id, hash).unwrap()
    }

    /// Partial signatures of every replica over `hash`.
    pub fn sign_all(&self, hash: &Hash) -> Vec<PartialSignature> {
        self.keys.iter().map(|(id, _)| self.sign(*id, hash)).collect()
    }
}

impl Distribution<SecretKey> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SecretKey {
        SecretKey(std::sync::Arc::new(rng.gen()))
    }
}

impl Distribution<PublicKey> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PublicKey {
        PublicKey(rng.gen())
    }
}

impl Distribution<Hash> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Hash {
        Hash(rng.gen())
    }
}

impl Distribution<ReplicaId> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ReplicaId {
        ReplicaId(rng.gen_range(1..100))
    }
}

impl Distribution<View> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> View {
        View(rng.gen_range(1..1000))
    }
}

/// Random `(r, s)` attributed to a random replica; it won't verify.
impl Distribution<PartialSignature> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PartialSignature {
        PartialSignature {
            sig: rng.gen(),
            signer: rng.gen(),
        }
    }
}

impl Distribution<ThresholdSignature> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ThresholdSignature {
        let n = rng.gen_range(1..5);
        ThresholdSignature::restore((0..n).map(|_| rng.gen::<PartialSignature>()))
    }
}

impl Distribution<Block> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Block {
        let view: View = rng.gen();
        Block {
            parent: rng.gen(),
            qc: QuorumCert::genesis(rng.gen()),
            proposer: rng.gen(),
            view,
            payload: (0..rng.gen_range(0..32)).map(|_| rng.gen()).collect(),
        }
    }
}
