//! Property-based tests for the graph store and edge selection using proptest.
mod common;
use common::*;
use kessai::prelude::*;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    AddApproval(u8),
    AddCondition(u8),
    DeleteNode(usize),
    Connect(usize, usize),
    DeleteEdge(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..12).prop_map(Op::AddApproval),
        (0u8..12).prop_map(Op::AddCondition),
        any::<usize>().prop_map(Op::DeleteNode),
        (any::<usize>(), any::<usize>()).prop_map(|(a, b)| Op::Connect(a, b)),
        any::<usize>().prop_map(Op::DeleteEdge),
    ]
}

fn node_ids(store: &GraphStore) -> Vec<String> {
    store.nodes().iter().map(|n| n.id.clone()).collect()
}

/// Applies operations, ignoring the ones the store rejects.
fn apply(store: &mut GraphStore, ops: &[Op]) {
    for op in ops {
        let ids = node_ids(store);
        let _ = match op {
            Op::AddApproval(n) => store.add_node(Node::approval(
                format!("n{}", n),
                ApprovalAttributes::department_head(),
            )),
            Op::AddCondition(n) => store.add_node(Node::condition(format!("n{}", n))),
            Op::DeleteNode(i) => store.delete_node(&ids[i % ids.len()]).map(|_| ()),
            Op::Connect(a, b) => store
                .connect(&ids[a % ids.len()], &ids[b % ids.len()])
                .map(|_| ()),
            Op::DeleteEdge(i) => {
                let edges: Vec<String> = store.edges().iter().map(|e| e.id.clone()).collect();
                if edges.is_empty() {
                    continue;
                }
                store.delete_edge(&edges[i % edges.len()]).map(|_| ())
            }
        };
    }
}

proptest! {
    #[test]
    fn edits_never_leave_dangling_edges(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = bare_store();
        apply(&mut store, &ops);

        for edge in store.edges() {
            prop_assert!(store.node(&edge.from_node_id).is_some());
            prop_assert!(store.node(&edge.to_node_id).is_some());
            prop_assert_ne!(&edge.from_node_id, &edge.to_node_id);
        }
        prop_assert!(!store.validate().has_error(IssueCode::DanglingEdge));
    }

    #[test]
    fn delete_node_removes_exactly_touching_edges(
        ops in prop::collection::vec(op_strategy(), 0..60),
        pick in any::<usize>(),
    ) {
        let mut store = bare_store();
        apply(&mut store, &ops);

        let candidates: Vec<String> = store
            .nodes()
            .iter()
            .filter(|n| !n.is_protected())
            .map(|n| n.id.clone())
            .collect();
        prop_assume!(!candidates.is_empty());
        let target = &candidates[pick % candidates.len()];

        let expected: Vec<Edge> = store
            .edges()
            .into_iter()
            .filter(|e| !e.touches(target))
            .cloned()
            .collect();
        store.delete_node(target).unwrap();
        let remaining: Vec<Edge> = store.edges().into_iter().cloned().collect();
        prop_assert_eq!(remaining, expected);
    }

    #[test]
    fn protected_nodes_survive_any_history(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let mut store = bare_store();
        apply(&mut store, &ops);
        let before = store.to_definition();

        for id in ["start", "end"] {
            let is_protected_error = matches!(
                store.delete_node(id),
                Err(GraphError::ProtectedNode { .. })
            );
            prop_assert!(is_protected_error);
        }
        prop_assert_eq!(store.to_definition(), before);
    }

    #[test]
    fn edge_selection_is_a_pure_function(value in -5000.0f64..5000.0) {
        let definition = amount_definition();
        let edges: Vec<&Edge> = definition.edges_from("check").collect();
        let context = amount(value);

        let first = select_edge(&edges, &context).map(|s| s.edge.id.clone());
        let second = select_edge(&edges, &context).map(|s| s.edge.id.clone());
        prop_assert_eq!(&first, &second);

        let expected = if value > 1000.0 { "e-large" } else { "e-default" };
        prop_assert_eq!(first.as_deref(), Some(expected));
    }
}
