//! Memoization of signature verification.
use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use hotstuff_crypto::keccak256::Keccak256;
use hotstuff_roles::replica::{Hash, PartialSignature, Signature};

use crate::{metrics, Verifier};


/// [`Verifier`] decorator remembering the results of partial signature
/// verifications, so that a vote seen while collecting a quorum and again
/// inside the resulting certificate is checked only once.
///
/// Holds at most `capacity` results; the oldest one is evicted first.
/// Other signature kinds are passed through uncached.
#[derive(Debug)]
pub struct SignatureCache<V> {
    inner: V,
    capacity: usize,
    entries: Mutex<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    results: HashMap<Keccak256, bool>,
    order: VecDeque<Keccak256>,
}

impl<V: Verifier> SignatureCache<V> {
    /// Wraps `inner` with a cache of the given capacity.
    pub fn new(inner: V, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            entries: Mutex::default(),
        }
    }

    /// The wrapped verifier.
    pub fn inner(&self) -> &V {
        &self.inner
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().order.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&self, key: Keccak256, ok: bool) {
        if self.capacity == 0 {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        // Racing verifications of the same signature may both miss.
        if entries.results.insert(key, ok).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            let Some(old) = entries.order.pop_front() else {
                break;
            };
            entries.results.remove(&old);
        }
    }
}

/// The signer is part of the key: the encoding alone doesn't commit to it.
fn cache_key(sig: &PartialSignature, hash: &Hash) -> Keccak256 {
    let signer = sig.signer().0.to_be_bytes();
    let encoding = sig.encode();
    let parts: [&[u8]; 3] = [hash.as_bytes(), &signer, &encoding];
    Keccak256::concat(parts)
}

impl<V: Verifier> Verifier for SignatureCache<V> {
    fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        let Signature::Partial(partial) = sig else {
            return self.inner.verify(sig, hash);
        };
        let key = cache_key(partial, hash);
        if let Some(ok) = self.entries.lock().unwrap().results.get(&key).copied() {
            metrics::METRICS.cache_hits.inc();
            return ok;
        }
        metrics::METRICS.cache_misses.inc();
        // The lock is not held while verifying.
        let ok = self.inner.verify(sig, hash);
        self.insert(key, ok);
        ok
    }
}
