//! Replica identities and the committee they form.
use std::{collections::BTreeMap, fmt};

use super::PublicKey;

/// Identifier of a replica, unique within the committee.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplicaId(pub u32);

impl fmt::Debug for ReplicaId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "replica#{}", self.0)
    }
}

impl fmt::Display for ReplicaId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// Maximal number of faulty replicas tolerated by a committee of `n`,
/// so that `n >= 3 * f + 1` holds.
pub fn max_faulty(n: usize) -> usize {
    n.saturating_sub(1) / 3
}

/// Number of distinct signatures needed for a quorum certificate
/// in a committee of `n` replicas, ie. `n - f`.
pub fn quorum_size(n: usize) -> usize {
    n - max_faulty(n)
}

/// The set of replicas taking part in consensus, with their public keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Committee {
    keys: BTreeMap<ReplicaId, PublicKey>,
}

impl Committee {
    /// Creates a committee. Fails on an empty list or on a repeated replica id.
    pub fn new(replicas: impl IntoIterator<Item = (ReplicaId, PublicKey)>) -> anyhow::Result<Self> {
        let mut keys = BTreeMap::new();
        for (id, key) in replicas {
            anyhow::ensure!(
                keys.insert(id, key).is_none(),
                "duplicate replica {id:?} in committee"
            );
        }
        anyhow::ensure!(!keys.is_empty(), "committee must contain at least one replica");
        Ok(Self { keys })
    }

    /// Public key of the replica, if it is a member.
    pub fn public_key(&self, id: ReplicaId) -> Option<&PublicKey> {
        self.keys.get(&id)
    }

    /// Checks membership.
    pub fn contains(&self, id: ReplicaId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Iterates over members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (ReplicaId, &PublicKey)> {
        self.keys.iter().map(|(id, key)| (*id, key))
    }

    /// Number of members.
    #[allow(clippy::len_without_is_empty)] // a valid committee is never empty
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Number of distinct signatures required for a quorum certificate.
    pub fn quorum_size(&self) -> usize {
        quorum_size(self.len())
    }

    /// Maximal number of faulty members tolerated.
    pub fn max_faulty(&self) -> usize {
        max_faulty(self.len())
    }
}
