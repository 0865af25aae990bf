//! Collaborators of the service: the roster and the verifier of single signatures.
use std::{fmt, sync::Arc};

use hotstuff_roles::replica::{Committee, Hash, PublicKey, ReplicaId, Signature};

use crate::metrics::{self, ResultLabel};

/// Source of public keys and of the quorum size.
pub trait Roster: fmt::Debug + Send + Sync {
    /// Public key of a replica, `None` if it is not a member.
    fn public_key(&self, id: ReplicaId) -> Option<PublicKey>;
    /// Number of distinct signatures required for a quorum certificate.
    fn quorum_size(&self) -> usize;
}

impl Roster for Committee {
    fn public_key(&self, id: ReplicaId) -> Option<PublicKey> {
        Committee::public_key(self, id).cloned()
    }

    fn quorum_size(&self) -> usize {
        Committee::quorum_size(self)
    }
}

/// Verification of a single signature.
///
/// The service routes every verification through the registered implementation,
/// so decorators like [`crate::SignatureCache`] see all of them.
pub trait Verifier: fmt::Debug + Send + Sync {
    /// Checks the signature over `hash`. Never fails, an invalid signature is just `false`.
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool;
}

impl<V: Verifier + ?Sized> Verifier for Arc<V> {
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        (**self).verify(sig, hash)
    }
}

/// Plain ECDSA verification of partial signatures against the roster keys.
#[derive(Debug, Clone)]
pub struct EcdsaVerifier {
    roster: Arc<dyn Roster>,
}

impl EcdsaVerifier {
    /// Verifier resolving signers through `roster`.
    pub fn new(roster: Arc<dyn Roster>) -> Self {
        Self { roster }
    }
}

impl Verifier for EcdsaVerifier {
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        let Signature::Partial(sig) = sig else {
            tracing::debug!("cannot verify a {} signature as a single one", sig.kind());
            return false;
        };
        let Some(pk) = self.roster.public_key(sig.signer()) else {
            tracing::info!("no public key for {:?}, signature rejected", sig.signer());
            return false;
        };
        let ok = match sig.verify_hash(hash, &pk) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!("invalid signature of {:?}: {err:#}", sig.signer());
                false
            }
        };
        metrics::METRICS.partial_verifications[&ResultLabel::from(ok)].inc();
        ok
    }
}
