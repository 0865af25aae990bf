use std::time::Duration;

use assert_matches::assert_matches;
use hotstuff_concurrency::testonly::abort_on_panic;
use hotstuff_roles::replica::{testonly::Setup, ReplicaId, View};
use rand::{rngs::StdRng, SeedableRng as _};

use crate::{
    testonly::{new_network, node},
    Network, Node, NodeSet, TopologyError,
};

fn make_rng() -> StdRng {
    StdRng::seed_from_u64(1010)
}

#[test]
fn test_twin_partitions() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let (a, b, c) = (node(1, 10), node(1, 11), node(2, 20));
    let schedule = vec![vec![NodeSet::from([a, c]), NodeSet::from([b])]];
    let (net, handles) = new_network(&setup, &[a, b, c], schedule);

    assert!(!net.should_drop(a, c).unwrap());
    assert!(!net.should_drop(c, a).unwrap());
    assert!(net.should_drop(b, c).unwrap());
    assert!(net.should_drop(a, b).unwrap());
    // A node alone in its partition still reaches itself.
    assert!(!net.should_drop(b, b).unwrap());

    // The sender's view decides.
    handles[&a].view.set(View(2));
    assert!(net.should_drop(a, c).unwrap());
    assert!(!net.should_drop(c, a).unwrap());
}

#[test]
fn test_views_outside_schedule_drop_everything() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(1, 10), node(2, 20)];
    let everyone = NodeSet::from(nodes);
    let schedule = vec![vec![everyone.clone()], vec![everyone]];
    let (net, handles) = new_network(&setup, &nodes, schedule);

    for view in [0, 3, 4, 1000] {
        for h in handles.values() {
            h.view.set(View(view));
        }
        for from in nodes {
            for to in nodes {
                assert!(net.should_drop(from, to).unwrap(), "view {view}");
            }
        }
    }
    for view in [1, 2] {
        for h in handles.values() {
            h.view.set(View(view));
        }
        assert!(!net.should_drop(nodes[0], nodes[1]).unwrap());
    }
}

#[test]
fn test_overlapping_partitions() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 3);
    let (a, b, c) = (node(1, 10), node(2, 20), node(3, 30));
    let schedule = vec![vec![NodeSet::from([a, b]), NodeSet::from([b, c])]];
    let (net, _handles) = new_network(&setup, &[a, b, c], schedule);
    assert!(!net.should_drop(a, b).unwrap());
    assert!(!net.should_drop(b, c).unwrap());
    assert!(net.should_drop(a, c).unwrap());
}

#[test]
fn test_topology_errors() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let (a, unknown) = (node(1, 10), node(2, 99));
    let (net, _handles) = new_network(&setup, &[a], vec![]);

    assert_matches!(net.should_drop(unknown, a), Err(TopologyError::UnknownNode(n)) if n == unknown);
    assert_matches!(net.should_drop(a, unknown), Err(TopologyError::UnknownNode(n)) if n == unknown);
    assert_matches!(net.timeout(unknown, View(1)), Err(TopologyError::UnknownNode(_)));
    assert_matches!(net.configuration(unknown), Err(TopologyError::UnknownNode(_)));

    let mut builder = Network::builder(vec![]);
    let node = Node {
        id: a,
        modules: net.node(a).unwrap().modules.clone(),
    };
    builder.add_node(node.clone()).unwrap();
    assert_matches!(builder.add_node(node), Err(TopologyError::DuplicateNode(n)) if n == a);
}

#[tokio::test]
async fn test_all_nodes_hang() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(1, 10), node(1, 11), node(2, 20)];
    let (net, _handles) = new_network(&setup, &nodes, vec![]);

    let waiter = tokio::spawn({
        let net = net.clone();
        async move { net.wait_until_hung().await }
    });

    net.timeout(nodes[2], View(3)).unwrap();
    assert!(net.hung_nodes().is_empty());
    net.timeout(nodes[2], View(3)).unwrap();
    assert_eq!(net.hung_nodes(), NodeSet::from([nodes[2]]));
    assert!(!net.is_hung());

    for n in &nodes[..2] {
        net.timeout(*n, View(5)).unwrap();
        net.timeout(*n, View(5)).unwrap();
    }
    assert_eq!(net.hung_nodes(), NodeSet::from(nodes));
    assert!(net.is_hung());
    tokio::time::timeout(Duration::from_secs(10), waiter)
        .await
        .unwrap()
        .unwrap();

    // Repeated timeouts change nothing, late waiters return right away.
    net.timeout(nodes[2], View(3)).unwrap();
    assert!(net.is_hung());
    assert_eq!(net.hung_nodes(), NodeSet::from(nodes));
    tokio::time::timeout(Duration::from_secs(10), net.wait_until_hung())
        .await
        .unwrap();
}

#[test]
fn test_progress_clears_hung_flag() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(1, 10), node(2, 20)];
    let (net, _handles) = new_network(&setup, &nodes, vec![]);
    let n = nodes[0];

    net.timeout(n, View(3)).unwrap();
    net.timeout(n, View(3)).unwrap();
    assert!(net.hung_nodes().contains(&n));

    // An older view is ignored.
    net.timeout(n, View(2)).unwrap();
    assert!(net.hung_nodes().contains(&n));

    net.timeout(n, View(4)).unwrap();
    assert!(net.hung_nodes().is_empty());

    // Hanging again requires two timeouts in the new view.
    net.timeout(n, View(2)).unwrap();
    assert!(net.hung_nodes().is_empty());
    net.timeout(n, View(4)).unwrap();
    assert!(net.hung_nodes().contains(&n));
    assert!(!net.is_hung());
}

#[test]
fn test_replica_registry() {
    abort_on_panic();
    let rng = &mut make_rng();
    let setup = Setup::new(rng, 2);
    let nodes = [node(2, 20), node(1, 11), node(1, 10)];
    let (net, _handles) = new_network(&setup, &nodes, vec![]);

    assert_eq!(net.num_replicas(), 2);
    let twins: Vec<_> = net
        .twins(ReplicaId(1))
        .unwrap()
        .iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(twins, vec![node(1, 10), node(1, 11)]);
    assert!(net.twins(ReplicaId(3)).is_none());
    assert_eq!(net.nodes().count(), 3);
}
