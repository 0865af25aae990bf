//! The network as seen by the protocol instance of one node.
use std::{collections::BTreeMap, sync::Arc};

use hotstuff_roles::replica::{
    self, Block, ConsensusMsg, Hash, NewViewMsg, PartialCert, ProposeMsg, PublicKey, ReplicaId,
    SyncInfo, TimeoutMsg, View, VoteMsg,
};
use hotstuff_threshold::Roster;
use hotstuff_utils::enum_util::Variant as _;

use crate::{Network, Node, NodeId, TopologyError};

/// Configuration of the committee, bound to the node sending through it.
///
/// Every message goes through the partition schedule of the [`Network`],
/// using the sending node's current view.
#[derive(Debug, Clone)]
pub struct Configuration {
    node: Node,
    network: Arc<Network>,
}

impl Configuration {
    pub(crate) fn new(node: Node, network: Arc<Network>) -> Self {
        Self { node, network }
    }

    /// Node sending through this configuration.
    pub fn node_id(&self) -> NodeId {
        self.node.id
    }

    /// All replicas, by id.
    pub fn replicas(&self) -> BTreeMap<ReplicaId, Replica<'_>> {
        self.network
            .replicas()
            .map(|(id, twins)| (id, Replica::new(self, id, twins)))
            .collect()
    }

    /// Looks a replica up.
    pub fn replica(&self, id: ReplicaId) -> Option<Replica<'_>> {
        let twins = self.network.twins(id)?;
        Some(Replica::new(self, id, twins))
    }

    /// Number of replicas. Twins don't count.
    #[allow(clippy::len_without_is_empty)] // a configuration contains at least its own replica
    pub fn len(&self) -> usize {
        self.network.num_replicas()
    }

    /// Number of votes needed for a quorum certificate.
    pub fn quorum_size(&self) -> usize {
        replica::quorum_size(self.len())
    }

    /// Broadcasts a proposal.
    pub fn propose(&self, msg: ProposeMsg) {
        self.network.broadcast(&self.node, &msg.insert());
    }

    /// Broadcasts a timeout message.
    pub fn timeout(&self, msg: TimeoutMsg) {
        self.network.broadcast(&self.node, &msg.insert());
    }

    /// Sends a message to every node of replica `id`.
    pub fn send(&self, id: ReplicaId, msg: ConsensusMsg) -> Result<(), TopologyError> {
        let twins = self
            .network
            .twins(id)
            .ok_or(TopologyError::UnknownReplica(id))?;
        self.network.deliver(&self.node, twins, &msg);
        Ok(())
    }

    /// Fetches a block from any node this one can currently reach.
    pub fn fetch(&self, hash: &Hash) -> Option<Block> {
        self.network.fetch(&self.node, hash)
    }

    /// Reports that this node's timer fired in `view` without progress.
    pub fn report_timeout(&self, view: View) {
        self.network.record_timeout(self.node.id, view);
    }
}

impl Roster for Configuration {
    fn public_key(&self, id: ReplicaId) -> Option<PublicKey> {
        Some(self.replica(id)?.public_key())
    }

    fn quorum_size(&self) -> usize {
        Configuration::quorum_size(self)
    }
}

/// A replica as a destination of messages. Messages reach every twin
/// of the replica that the sender can reach.
#[derive(Debug, Clone, Copy)]
pub struct Replica<'a> {
    config: &'a Configuration,
    id: ReplicaId,
    /// Never empty.
    twins: &'a [Node],
}

impl<'a> Replica<'a> {
    fn new(config: &'a Configuration, id: ReplicaId, twins: &'a [Node]) -> Self {
        Self { config, id, twins }
    }

    /// Id of the replica.
    pub fn id(&self) -> ReplicaId {
        self.id
    }

    /// Public key of the replica, shared by all of its twins.
    pub fn public_key(&self) -> PublicKey {
        self.twins[0].modules.public_key.clone()
    }

    /// Sends a vote to the replica.
    pub fn vote(&self, partial_cert: PartialCert) {
        let msg = VoteMsg {
            id: self.config.node.id.replica,
            partial_cert,
        };
        self.send(msg.insert());
    }

    /// Sends the sender's sync info to the replica on a view change.
    pub fn new_view(&self, sync_info: SyncInfo) {
        let msg = NewViewMsg {
            id: self.config.node.id.replica,
            sync_info,
        };
        self.send(msg.insert());
    }

    fn send(&self, msg: ConsensusMsg) {
        self.config
            .network
            .deliver(&self.config.node, self.twins, &msg);
    }
}
