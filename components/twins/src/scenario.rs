//! Generation of partition schedules.
use std::cmp::min;

use hotstuff_roles::replica::{self, ReplicaId};
use rand::{seq::SliceRandom as _, Rng};

use crate::{NodeId, NodeSet, PartitionSchedule};


/// All ways to split `items` into exactly `num_partitions` non-empty groups.
///
/// Groups are unlabeled: `[{A, B}, {C}]` is generated, but not `[{C}, {A, B}]`
/// or `[{B, A}, {C}]`. Within a group items keep their input order, and the
/// groups are ordered by their first item.
///
/// The placements form a table like this one, filled row by row:
/// ```text
///   P1 P2 P3
/// A  *
/// B  *
/// C     *
/// D        *
/// ```
pub fn partitions<T: Clone>(items: &[T], num_partitions: usize) -> Vec<Vec<Vec<T>>> {
    if items.is_empty() || num_partitions == 0 || num_partitions > items.len() {
        return vec![];
    }
    let mut partitioner = Partitioner {
        items,
        num_partitions,
        output: vec![],
        acc: vec![vec![]; num_partitions],
    };
    partitioner.go(0, 0);
    partitioner.output
}

/// Backtracking state of [`partitions`].
struct Partitioner<'a, T> {
    items: &'a [T],
    num_partitions: usize,
    /// Complete partitionings found so far.
    output: Vec<Vec<Vec<T>>>,
    /// Partitioning under construction.
    acc: Vec<Vec<T>>,
}

impl<T: Clone> Partitioner<'_, T> {
    /// Places item `idx` and everything after it, with groups from
    /// `first_empty` onwards still empty.
    ///
    /// An item may go into any non-empty group or into the first empty one;
    /// opening a later empty group first would only relabel the groups. If the
    /// remaining items are just enough to fill the remaining empty groups,
    /// the item must open a new group.
    fn go(&mut self, idx: usize, first_empty: usize) {
        if idx == self.items.len() {
            self.output.push(self.acc.clone());
            return;
        }
        let rem_items = self.items.len() - idx;
        let rem_empty = self.num_partitions - first_empty;
        let max_part = min(first_empty, self.num_partitions - 1);
        let min_part = if rem_empty == rem_items { max_part } else { 0 };
        for part in min_part..=max_part {
            self.acc[part].push(self.items[idx].clone());
            let first_empty = if part == first_empty {
                first_empty + 1
            } else {
                first_empty
            };
            self.go(idx + 1, first_empty);
            self.acc[part].pop();
        }
    }
}

/// All nodes of a simulation: replicas `1..=n`, some of them with a twin.
///
/// Replica `r` runs as node `(r, 10 * r)` and its twin, if any, as
/// `(r, 10 * r + 1)`. The first `num_twins` replicas get a twin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Replicas first, then twins.
    nodes: Vec<NodeId>,
    num_replicas: usize,
}

impl Cluster {
    /// Constructs a cluster. `num_twins` is capped at `num_replicas`.
    pub fn new(num_replicas: u32, num_twins: u32) -> Self {
        let replicas = (1..=num_replicas).map(|r| NodeId::new(ReplicaId(r), 10 * r));
        let twins = (1..=min(num_twins, num_replicas)).map(|r| NodeId::new(ReplicaId(r), 10 * r + 1));
        Self {
            nodes: replicas.chain(twins).collect(),
            num_replicas: num_replicas as usize,
        }
    }

    /// All nodes, replicas and twins.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Number of nodes, replicas and twins.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of replicas, ie. the committee size.
    pub fn num_replicas(&self) -> usize {
        self.num_replicas
    }

    /// Number of twins.
    pub fn num_twins(&self) -> usize {
        self.num_nodes() - self.num_replicas()
    }

    /// Number of faulty replicas the committee tolerates.
    pub fn max_faulty(&self) -> usize {
        replica::max_faulty(self.num_replicas)
    }

    /// Number of votes needed for a quorum certificate.
    pub fn quorum_size(&self) -> usize {
        replica::quorum_size(self.num_replicas)
    }
}

/// Draws random partition schedules for a cluster.
#[derive(Debug)]
pub struct ScenarioGenerator {
    num_views: usize,
    /// All partitionings of the cluster's nodes, indexed by the number of partitions minus one.
    partitionings: Vec<Vec<Vec<NodeSet>>>,
}

impl ScenarioGenerator {
    /// Generator of `num_views` long schedules, splitting the nodes into
    /// 1 to `max_partitions` partitions in every view.
    ///
    /// The number of partitionings grows exponentially with the number of
    /// nodes, so this is only practical for small clusters.
    pub fn new(cluster: &Cluster, num_views: usize, max_partitions: usize) -> Self {
        let max_partitions = max_partitions.clamp(1, cluster.num_nodes().max(1));
        let partitionings = (1..=max_partitions)
            .map(|k| {
                partitions(cluster.nodes(), k)
                    .into_iter()
                    .map(|ps| ps.into_iter().map(NodeSet::from_iter).collect())
                    .collect()
            })
            .collect();
        Self {
            num_views,
            partitionings,
        }
    }

    /// A random schedule. Every view picks the number of partitions
    /// uniformly, then one of the partitionings of that size.
    pub fn generate_one(&self, rng: &mut impl Rng) -> PartitionSchedule {
        (0..self.num_views)
            .map(|_| {
                self.partitionings
                    .choose(rng)
                    .and_then(|ps| ps.choose(rng))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect()
    }
}
