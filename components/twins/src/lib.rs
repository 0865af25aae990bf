//! In-memory network for testing a BFT protocol along the lines of the
//! [Twins paper](https://arxiv.org/pdf/2004.10617).
//!
//! The main concepts are:
//! * Up to `f` replicas of the committee get a _twin_: a second node with the
//!   same replica id and key, but its own memory, event queue and block store.
//!   Each twin runs the protocol honestly, yet because the twins see different
//!   messages the replica as a whole can equivocate.
//! * In every view the nodes are split into partitions, and the network only
//!   delivers messages between nodes sharing a partition in the sender's
//!   current view. Views past the end of the schedule deliver nothing, which
//!   is how a simulated run ends.
//! * Nodes report their timeouts; a node timing out twice in the same view is
//!   hung, and once every node is hung the network signals it, exactly once.
//!
//! The protocol under test talks to the network only through [`Configuration`]
//! and [`Replica`], the same shape a real network configuration has.

pub use self::{
    config::{Configuration, Replica},
    error::TopologyError,
    network::{Network, NetworkBuilder, PartitionSchedule},
    node::{BlockStore, EventSink, Modules, Node, NodeId, NodeSet, ViewSource},
    scenario::{partitions, Cluster, ScenarioGenerator},
};

mod config;
mod error;
mod metrics;
mod network;
mod node;
mod scenario;
pub mod testonly;
#[cfg(test)]
mod tests;
