use hotstuff_roles::replica::ReplicaId;

use crate::NodeId;

/// Reference to a node or replica the network doesn't know about.
///
/// These are setup bugs of the test harness rather than network conditions,
/// and callers are expected to abort the run on them.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    /// The node is not registered.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    /// No node of the replica is registered.
    #[error("unknown replica {0}")]
    UnknownReplica(ReplicaId),
    /// The node was registered twice.
    #[error("node {0} registered twice")]
    DuplicateNode(NodeId),
}
