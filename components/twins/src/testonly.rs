//! Test-only utilities: in-memory protocol modules and network setup.
use std::{
    collections::{BTreeMap, HashMap},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use hotstuff_roles::replica::{testonly::Setup, Block, ConsensusMsg, Hash, View};
use tokio::sync::mpsc;

use crate::{BlockStore, Modules, Network, Node, NodeId, PartitionSchedule, ViewSource};

/// View source whose view is moved by the test.
#[derive(Debug, Default)]
pub struct ManualView(AtomicU64);

impl ManualView {
    /// Sets the view.
    pub fn set(&self, view: View) {
        self.0.store(view.0, Ordering::SeqCst);
    }
}

impl ViewSource for ManualView {
    fn view(&self) -> View {
        View(self.0.load(Ordering::SeqCst))
    }
}

/// Block store keeping blocks in a map.
#[derive(Debug, Default)]
pub struct MemoryBlockStore(Mutex<HashMap<Hash, Block>>);

impl MemoryBlockStore {
    /// Stores a block.
    pub fn insert(&self, block: Block) {
        self.0.lock().unwrap().insert(block.hash(), block);
    }
}

impl BlockStore for MemoryBlockStore {
    fn local_get(&self, hash: &Hash) -> Option<Block> {
        self.0.lock().unwrap().get(hash).cloned()
    }
}

/// Handles to the in-memory modules of a node.
#[derive(Debug)]
pub struct TestNode {
    /// View of the node, initially 1.
    pub view: Arc<ManualView>,
    /// Block store of the node.
    pub blocks: Arc<MemoryBlockStore>,
    /// Messages delivered to the node.
    pub events: mpsc::UnboundedReceiver<ConsensusMsg>,
}

impl TestNode {
    /// Drains the messages delivered so far.
    pub fn received(&mut self) -> Vec<ConsensusMsg> {
        let mut msgs = vec![];
        while let Ok(msg) = self.events.try_recv() {
            msgs.push(msg);
        }
        msgs
    }
}

/// Builds a network out of `nodes`, using the keys of `setup` for their replicas.
pub fn new_network(
    setup: &Setup,
    nodes: &[NodeId],
    partitions: PartitionSchedule,
) -> (Arc<Network>, BTreeMap<NodeId, TestNode>) {
    let mut builder = Network::builder(partitions);
    let mut handles = BTreeMap::new();
    for id in nodes {
        let view = Arc::new(ManualView::default());
        view.set(View(1));
        let blocks = Arc::new(MemoryBlockStore::default());
        let (send, recv) = mpsc::unbounded_channel();
        builder
            .add_node(Node {
                id: *id,
                modules: Modules {
                    public_key: setup.key(id.replica).public(),
                    view: view.clone(),
                    events: Arc::new(send),
                    blocks: blocks.clone(),
                },
            })
            .unwrap();
        handles.insert(
            *id,
            TestNode {
                view,
                blocks,
                events: recv,
            },
        );
    }
    (builder.build(), handles)
}

/// Shorthand for a node id.
pub fn node(replica: u32, network: u32) -> NodeId {
    NodeId::new(hotstuff_roles::replica::ReplicaId(replica), network)
}
