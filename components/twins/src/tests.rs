use std::{collections::BTreeMap, sync::Arc};

use assert_matches::assert_matches;
use hotstuff_concurrency::testonly::abort_on_panic;
use hotstuff_roles::replica::{
    testonly::Setup, Block, ConsensusMsg, Hash, PartialCert, ProposeMsg, QuorumCert, ReplicaId,
    Signature, SyncInfo, TimeoutMsg, View, VoteMsg,
};
use hotstuff_threshold::{Config, EcdsaVerifier, Roster as _, ThresholdCrypto};
use hotstuff_utils::enum_util::Variant as _;
use pretty_assertions::assert_eq;
use rand::{rngs::StdRng, Rng as _, SeedableRng as _};

use crate::{
    testonly::{new_network, node, TestNode},
    Cluster, NodeId, NodeSet, ScenarioGenerator, TopologyError,
};

fn make_rng() -> StdRng {
    StdRng::seed_from_u64(4242)
}

/// Replica 1 has a twin; in view 1 the twins end up on different sides.
fn split_nodes() -> ([NodeId; 5], NodeSet, NodeSet) {
    let nodes = [node(1, 10), node(1, 11), node(2, 20), node(3, 30), node(4, 40)];
    let left = NodeSet::from([node(1, 10), node(2, 20), node(3, 30)]);
    let right = NodeSet::from([node(1, 11), node(4, 40)]);
    (nodes, left, right)
}

fn senders(handles: &mut BTreeMap<NodeId, TestNode>) -> BTreeMap<NodeId, Vec<ReplicaId>> {
    handles
        .iter_mut()
        .map(|(id, h)| (*id, h.received().iter().map(ConsensusMsg::sender).collect()))
        .collect()
}

#[test]
fn test_configuration_shape() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 4);
    let (nodes, left, right) = split_nodes();
    let (net, _handles) = new_network(&setup, &nodes, vec![vec![left, right]]);

    let config = net.configuration(node(1, 11)).unwrap();
    assert_eq!(config.node_id(), node(1, 11));
    assert_eq!(config.len(), 4);
    assert_eq!(config.quorum_size(), 3);
    assert_eq!(
        config.replicas().keys().copied().collect::<Vec<_>>(),
        (1..=4).map(ReplicaId).collect::<Vec<_>>()
    );
    for (id, replica) in config.replicas() {
        assert_eq!(replica.id(), id);
        assert_eq!(replica.public_key(), setup.key(id).public());
        assert_eq!(config.public_key(id), Some(replica.public_key()));
    }
    assert!(config.replica(ReplicaId(5)).is_none());
    assert_eq!(config.public_key(ReplicaId(5)), None);
}

#[test]
fn test_broadcast_respects_partitions() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 4);
    let (nodes, left, right) = split_nodes();
    let (net, mut handles) = new_network(&setup, &nodes, vec![vec![left, right]]);

    let block: Block = rng.gen();
    net.configuration(node(1, 10)).unwrap().propose(ProposeMsg {
        id: ReplicaId(1),
        block: block.clone(),
    });
    let got = senders(&mut handles);
    assert_eq!(got[&node(1, 10)], vec![ReplicaId(1)]);
    assert_eq!(got[&node(2, 20)], vec![ReplicaId(1)]);
    assert_eq!(got[&node(3, 30)], vec![ReplicaId(1)]);
    assert!(got[&node(1, 11)].is_empty());
    assert!(got[&node(4, 40)].is_empty());

    // The twin on the other side equivocates undisturbed.
    let msg = TimeoutMsg {
        id: ReplicaId(1),
        view: View(1),
        view_signature: setup.sign(ReplicaId(1), &Hash::of(&1u64.to_be_bytes())),
        sync_info: SyncInfo::default(),
    };
    net.configuration(node(1, 11))
        .unwrap()
        .timeout(msg.clone());
    assert_eq!(
        handles.get_mut(&node(4, 40)).unwrap().received(),
        vec![msg.clone().insert()]
    );
    assert_eq!(
        handles.get_mut(&node(1, 11)).unwrap().received(),
        vec![msg.insert()]
    );
    assert!(handles.get_mut(&node(2, 20)).unwrap().received().is_empty());
}

#[test]
fn test_vote_and_new_view_reach_reachable_twins() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 4);
    let nodes = [node(1, 10), node(1, 11), node(2, 20), node(3, 30), node(4, 40)];
    let view1 = vec![
        NodeSet::from([node(1, 10), node(1, 11), node(2, 20)]),
        NodeSet::from([node(3, 30), node(4, 40)]),
    ];
    let (net, mut handles) = new_network(&setup, &nodes, vec![view1]);

    let hash: Hash = rng.gen();
    let config = net.configuration(node(2, 20)).unwrap();
    let cert = PartialCert {
        signature: setup.sign(ReplicaId(2), &hash),
        block_hash: hash,
    };
    config.replica(ReplicaId(1)).unwrap().vote(cert.clone());
    let want = VoteMsg {
        id: ReplicaId(2),
        partial_cert: cert,
    };
    for twin in [node(1, 10), node(1, 11)] {
        let got = handles.get_mut(&twin).unwrap().received();
        assert_eq!(got, vec![want.clone().insert()]);
    }

    // Unreachable replica: nothing arrives.
    config.replica(ReplicaId(3)).unwrap().new_view(SyncInfo::default());
    assert!(handles.get_mut(&node(3, 30)).unwrap().received().is_empty());

    config.replica(ReplicaId(2)).unwrap().new_view(SyncInfo {
        qc: Some(QuorumCert::genesis(hash)),
        tc: None,
    });
    let got = handles.get_mut(&node(2, 20)).unwrap().received();
    assert_matches!(&got[..], [ConsensusMsg::NewView(msg)] => {
        assert_eq!(msg.id, ReplicaId(2));
        assert_eq!(msg.sync_info.qc, Some(QuorumCert::genesis(hash)));
    });
}

#[test]
fn test_send_to_unknown_replica() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(1, 10), node(2, 20)];
    let (net, _handles) = new_network(&setup, &nodes, vec![vec![NodeSet::from(nodes)]]);
    let config = net.configuration(nodes[0]).unwrap();
    let msg = ProposeMsg {
        id: ReplicaId(1),
        block: rng.gen(),
    };
    assert_matches!(
        config.send(ReplicaId(7), msg.clone().insert()),
        Err(TopologyError::UnknownReplica(ReplicaId(7)))
    );
    config.send(ReplicaId(2), msg.insert()).unwrap();
}

#[test]
fn test_fetch_asks_reachable_nodes_only() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 4);
    let (nodes, left, right) = split_nodes();
    let (net, handles) = new_network(&setup, &nodes, vec![vec![left, right]]);
    let config = net.configuration(node(2, 20)).unwrap();

    let hidden: Block = rng.gen();
    handles[&node(4, 40)].blocks.insert(hidden.clone());
    assert_eq!(config.fetch(&hidden.hash()), None);

    // Only the twin on the sender's side has it.
    let block: Block = rng.gen();
    handles[&node(1, 10)].blocks.insert(block.clone());
    assert_eq!(config.fetch(&block.hash()), Some(block.clone()));

    // Once the view is past the schedule nothing is reachable.
    handles[&node(2, 20)].view.set(View(2));
    assert_eq!(config.fetch(&block.hash()), None);
}

#[tokio::test]
async fn test_report_timeout() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(1, 10), node(2, 20)];
    let (net, _handles) = new_network(&setup, &nodes, vec![]);
    for n in nodes {
        let config = net.configuration(n).unwrap();
        config.report_timeout(View(7));
        config.report_timeout(View(7));
    }
    net.wait_until_hung().await;
    assert!(net.is_hung());
}

#[test]
fn test_threshold_crypto_over_configuration() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 4);
    let (nodes, left, right) = split_nodes();
    let (net, _handles) = new_network(&setup, &nodes, vec![vec![left, right]]);

    let roster = Arc::new(net.configuration(node(1, 11)).unwrap());
    let verifier = Arc::new(EcdsaVerifier::new(roster.clone()));
    let crypto = ThresholdCrypto::new(
        ReplicaId(1),
        setup.key(ReplicaId(1)).clone(),
        roster,
        verifier,
        Config::default(),
    );

    let hash: Hash = rng.gen();
    let mut partials: Vec<Signature> = vec![crypto.sign(&hash).unwrap().into()];
    partials.extend((2..=3).map(|i| Signature::from(setup.sign(ReplicaId(i), &hash))));
    let qc = crypto.create_threshold_signature(partials, &hash).unwrap();
    assert_eq!(qc.len(), 3);
}

#[test]
fn test_generated_schedule_routing() {
    abort_on_panic();
    let rng = &mut make_rng();
    let cluster = Cluster::new(4, 1);
    let setup = Setup::new(rng, 4);
    let schedule = ScenarioGenerator::new(&cluster, 4, 3).generate_one(rng);
    let (net, mut handles) = new_network(&setup, cluster.nodes(), schedule.clone());

    for (i, partitions) in schedule.iter().enumerate() {
        let view = View(i as u64 + 1);
        for h in handles.values() {
            h.view.set(view);
        }
        for sender in cluster.nodes() {
            net.configuration(*sender).unwrap().propose(ProposeMsg {
                id: sender.replica,
                block: rng.gen(),
            });
            for (receiver, h) in &mut handles {
                let reachable = partitions
                    .iter()
                    .any(|p| p.contains(sender) && p.contains(receiver));
                assert_eq!(h.received().len(), usize::from(reachable), "view {view}");
                assert_eq!(net.should_drop(*sender, *receiver).unwrap(), !reachable);
            }
        }
    }
}
