//! The partitioned network and its liveness tracking.
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use hotstuff_concurrency::signal;
use hotstuff_roles::replica::{Block, ConsensusMsg, Hash, ReplicaId, View};

use crate::{metrics, Configuration, Node, NodeId, NodeSet, TopologyError};

#[cfg(test)]
mod tests;

/// Partitions of every view, starting with view 1.
///
/// Nodes can talk to each other in a view iff some partition of the view
/// contains both. Partitions of a view may overlap.
pub type PartitionSchedule = Vec<Vec<NodeSet>>;

/// Collects the nodes of a [`Network`].
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    nodes: BTreeMap<NodeId, Node>,
    partitions: PartitionSchedule,
}

impl NetworkBuilder {
    /// Registers a node. Twins are registered as separate nodes of the same replica.
    pub fn add_node(&mut self, node: Node) -> Result<&mut Self, TopologyError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TopologyError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id, node);
        Ok(self)
    }

    /// Freezes the topology. Only the liveness state changes afterwards.
    pub fn build(self) -> Arc<Network> {
        let mut replicas: BTreeMap<ReplicaId, Vec<Node>> = BTreeMap::new();
        for node in self.nodes.values() {
            replicas.entry(node.id.replica).or_default().push(node.clone());
        }
        Arc::new(Network {
            nodes: self.nodes,
            replicas,
            partitions: self.partitions,
            liveness: Mutex::default(),
            all_hung: signal::Once::new(),
        })
    }
}

#[derive(Debug, Default)]
struct Liveness {
    /// View of the last reported timeout of every node.
    last_timeouts: BTreeMap<NodeId, View>,
    /// Nodes which timed out twice in a row in the same view.
    hung: NodeSet,
}

/// Registry of all nodes, together with the partition schedule which
/// decides whether a message between two nodes is delivered.
#[derive(Debug)]
pub struct Network {
    nodes: BTreeMap<NodeId, Node>,
    /// Nodes of every replica, in ascending network id order. Never empty.
    replicas: BTreeMap<ReplicaId, Vec<Node>>,
    partitions: PartitionSchedule,
    liveness: Mutex<Liveness>,
    all_hung: signal::Once,
}

impl Network {
    /// Starts building a network with the given schedule.
    pub fn builder(partitions: PartitionSchedule) -> NetworkBuilder {
        NetworkBuilder {
            nodes: BTreeMap::new(),
            partitions,
        }
    }

    /// All nodes, in ascending id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Looks a node up.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Replicas in ascending id order, each with all of its nodes.
    pub fn replicas(&self) -> impl Iterator<Item = (ReplicaId, &[Node])> {
        self.replicas.iter().map(|(id, twins)| (*id, twins.as_slice()))
    }

    /// Number of replicas, twins not counted.
    pub fn num_replicas(&self) -> usize {
        self.replicas.len()
    }

    /// Nodes of a replica: the replica itself and its twins.
    pub fn twins(&self, replica: ReplicaId) -> Option<&[Node]> {
        self.replicas.get(&replica).map(Vec::as_slice)
    }

    /// The partition schedule.
    pub fn partitions(&self) -> &PartitionSchedule {
        &self.partitions
    }

    /// Decides whether a message from `sender` to `receiver` is dropped,
    /// based on the partitions of the sender's current view.
    /// Views without partitions in the schedule drop everything.
    pub fn should_drop(&self, sender: NodeId, receiver: NodeId) -> Result<bool, TopologyError> {
        let sender = self
            .nodes
            .get(&sender)
            .ok_or(TopologyError::UnknownNode(sender))?;
        if !self.nodes.contains_key(&receiver) {
            return Err(TopologyError::UnknownNode(receiver));
        }
        Ok(!self.reachable(sender, receiver))
    }

    pub(crate) fn reachable(&self, sender: &Node, receiver: NodeId) -> bool {
        let view = sender.modules.view.view();
        // View 1 is the first entry; view 0 has none.
        let Some(partitions) = view
            .0
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| self.partitions.get(i))
        else {
            return false;
        };
        partitions
            .iter()
            .any(|p| p.contains(&sender.id) && p.contains(&receiver))
    }

    /// Enqueues `msg` at every node in `targets` reachable from `sender`.
    pub(crate) fn deliver(&self, sender: &Node, targets: &[Node], msg: &ConsensusMsg) {
        let kind = metrics::MsgKindLabel::from(msg);
        for target in targets {
            if !self.reachable(sender, target.id) {
                tracing::debug!("dropped {} from {} to {}", msg.label(), sender.id, target.id);
                metrics::METRICS.dropped_messages[&kind].inc();
                continue;
            }
            metrics::METRICS.delivered_messages[&kind].inc();
            target.modules.events.add_event(msg.clone());
        }
    }

    /// Sends `msg` to every node of every replica, the sender's own included.
    pub(crate) fn broadcast(&self, sender: &Node, msg: &ConsensusMsg) {
        for twins in self.replicas.values() {
            self.deliver(sender, twins, msg);
        }
    }

    /// First block with the given hash found in a reachable node's local store.
    ///
    /// Nodes are asked in ascending id order. Nothing checks that reachable
    /// nodes agree on the block, so a faulty twin may well be the one answering.
    pub(crate) fn fetch(&self, requester: &Node, hash: &Hash) -> Option<Block> {
        let block = self
            .nodes
            .values()
            .filter(|node| self.reachable(requester, node.id))
            .find_map(|node| node.modules.blocks.local_get(hash));
        let label = match block {
            Some(_) => metrics::FetchLabel::Found,
            None => metrics::FetchLabel::NotFound,
        };
        metrics::METRICS.fetches[&label].inc();
        block
    }

    /// Records that the local timer of `node` fired in `view` without progress.
    ///
    /// A second timeout in the same view marks the node as hung, and once all
    /// nodes are hung [`Network::wait_until_hung`] returns. A timeout in a
    /// later view clears the mark; one in an earlier view is ignored.
    pub fn timeout(&self, node: NodeId, view: View) -> Result<(), TopologyError> {
        if !self.nodes.contains_key(&node) {
            return Err(TopologyError::UnknownNode(node));
        }
        self.record_timeout(node, view);
        Ok(())
    }

    pub(crate) fn record_timeout(&self, node: NodeId, view: View) {
        let mut guard = self.liveness.lock().unwrap();
        let liveness = &mut *guard;
        match liveness.last_timeouts.get(&node).copied() {
            Some(last) if last == view => {
                if liveness.hung.insert(node) {
                    tracing::debug!("node {node} hung in view {view}");
                }
                metrics::METRICS.hung_nodes.set(liveness.hung.len());
                if liveness.hung.len() == self.nodes.len() && self.all_hung.send() {
                    tracing::info!("all {} nodes hung", self.nodes.len());
                }
            }
            Some(last) if last > view => {
                tracing::debug!("node {node} timed out in view {view} after view {last}, ignoring");
            }
            _ => {
                liveness.last_timeouts.insert(node, view);
                liveness.hung.remove(&node);
                metrics::METRICS.hung_nodes.set(liveness.hung.len());
            }
        }
    }

    /// Nodes currently considered hung.
    pub fn hung_nodes(&self) -> NodeSet {
        self.liveness.lock().unwrap().hung.clone()
    }

    /// Waits until all nodes are hung.
    pub async fn wait_until_hung(&self) {
        self.all_hung.recv().await;
    }

    /// Checks whether all nodes have been hung at some point.
    pub fn is_hung(&self) -> bool {
        self.all_hung.try_recv()
    }

    /// The interface used by the protocol instance running as `node`.
    pub fn configuration(self: &Arc<Self>, node: NodeId) -> Result<Configuration, TopologyError> {
        let node = self
            .nodes
            .get(&node)
            .ok_or(TopologyError::UnknownNode(node))?
            .clone();
        Ok(Configuration::new(node, self.clone()))
    }
}
