//! Nodes of the network and the protocol modules they consist of.
use std::{collections::BTreeSet, fmt, sync::Arc};

use hotstuff_roles::replica::{Block, ConsensusMsg, Hash, PublicKey, ReplicaId, View};
use tokio::sync::mpsc;

/// Identity of a node: the replica it acts for plus a network id,
/// which tells twins of the same replica apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    /// Replica whose keys the node uses.
    pub replica: ReplicaId,
    /// Network identity, unique among the twins of a replica.
    pub network: u32,
}

impl NodeId {
    /// Constructs a node id.
    pub fn new(replica: ReplicaId, network: u32) -> Self {
        Self { replica, network }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "({}, {})", self.replica, self.network)
    }
}

/// Set of nodes, e.g. a partition.
pub type NodeSet = BTreeSet<NodeId>;

/// Current view of a node's protocol state.
pub trait ViewSource: fmt::Debug + Send + Sync {
    /// View the node is in.
    fn view(&self) -> View;
}

/// Queue of messages waiting to be processed by a node.
pub trait EventSink: fmt::Debug + Send + Sync {
    /// Enqueues a message without waiting for it to be processed.
    fn add_event(&self, msg: ConsensusMsg);
}

impl EventSink for mpsc::UnboundedSender<ConsensusMsg> {
    fn add_event(&self, msg: ConsensusMsg) {
        // A closed queue means the node has stopped, so nobody is left to process it.
        let _ = self.send(msg);
    }
}

/// Local block storage of a node.
pub trait BlockStore: fmt::Debug + Send + Sync {
    /// Looks a block up without asking anybody else.
    fn local_get(&self, hash: &Hash) -> Option<Block>;
}

/// Protocol modules of a node which the network interacts with.
#[derive(Debug, Clone)]
pub struct Modules {
    /// Public key of the node's replica.
    pub public_key: PublicKey,
    /// The node's view synchronizer.
    pub view: Arc<dyn ViewSource>,
    /// The node's event queue.
    pub events: Arc<dyn EventSink>,
    /// The node's block store.
    pub blocks: Arc<dyn BlockStore>,
}

/// A single participant of the network: one independent instance of the protocol.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identity of the node.
    pub id: NodeId,
    /// Modules of the protocol instance.
    pub modules: Modules,
}
