//! Test-only utilities.
use std::{
    collections::BTreeSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use hotstuff_roles::replica::{testonly::Setup, Hash, ReplicaId, Signature};

use crate::{Config, EcdsaVerifier, ThresholdCrypto, Verifier};

/// Verifier decorator counting the calls it receives.
#[derive(Debug)]
pub struct CountingVerifier<V> {
    inner: V,
    calls: AtomicUsize,
}

impl<V: Verifier> CountingVerifier<V> {
    /// Wraps `inner`.
    pub fn new(inner: V) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `verify()` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<V: Verifier> Verifier for CountingVerifier<V> {
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.verify(sig, hash)
    }
}

/// Verifier decorator which blocks the calling thread for `delay`
/// before verifying a signature of one of the `slow` signers.
#[derive(Debug)]
pub struct SlowVerifier<V> {
    /// Wrapped verifier.
    pub inner: V,
    /// Signers whose signatures take long to verify.
    pub slow: BTreeSet<ReplicaId>,
    /// How long.
    pub delay: Duration,
}

impl<V: Verifier> Verifier for SlowVerifier<V> {
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        if sig.signer().is_some_and(|id| self.slow.contains(&id)) {
            std::thread::sleep(self.delay);
        }
        self.inner.verify(sig, hash)
    }
}

/// ECDSA verifier over the setup's committee.
pub fn ecdsa_verifier(setup: &Setup) -> EcdsaVerifier {
    EcdsaVerifier::new(Arc::new(setup.committee.clone()))
}

/// Service of replica `id` of the setup, with the given registered verifier.
pub fn new_service(
    setup: &Setup,
    id: ReplicaId,
    verifier: Arc<dyn Verifier>,
    config: Config,
) -> ThresholdCrypto {
    ThresholdCrypto::new(
        id,
        setup.key(id).clone(),
        Arc::new(setup.committee.clone()),
        verifier,
        config,
    )
}
