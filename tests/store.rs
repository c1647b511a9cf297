//! Graph store tests
//!
//! Authoring operations: lenient writes, cascades, protected nodes,
//! selection and record serialization.
mod common;
use common::*;
use kessai::prelude::*;
use kessai::registry::Attribute;
use pretty_assertions::assert_eq;

#[cfg(test)]
mod store_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut store = bare_store();
        let err = store.add_node(Node::condition("start")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateId("start".to_string()));
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.node("start").map(Node::kind), Some(NodeKind::Start));
    }

    #[test]
    fn test_connect_self_loop_leaves_graph_unchanged() {
        let mut store = bare_store();
        store
            .add_node(Node::approval("a", ApprovalAttributes::department_head()))
            .unwrap();
        store.connect("start", "a").unwrap();

        let err = store.connect("a", "a").unwrap_err();
        assert_eq!(err, GraphError::SelfLoop("a".to_string()));
        assert_eq!(store.edge_count(), 1);
    }

    #[test]
    fn test_connect_missing_endpoint() {
        let mut store = bare_store();
        let err = store.connect("start", "ghost").unwrap_err();
        assert_eq!(
            err,
            GraphError::NotFound {
                element: "node",
                id: "ghost".to_string()
            }
        );
        assert_eq!(store.edge_count(), 0);
    }

    #[test]
    fn test_connect_assigns_prefixed_id_and_next_sort_order() {
        let mut store = bare_store();
        store.add_node(Node::condition("check")).unwrap();
        store.add_node(Node::condition("other")).unwrap();

        let first = store.connect("check", "end").unwrap();
        store
            .update_edge_attributes(&first, EdgePatch::new().sort_order(7))
            .unwrap();
        let second = store.connect("check", "other").unwrap();
        let unrelated = store.connect("start", "check").unwrap();

        assert!(first.starts_with("edge-"));
        assert_ne!(first, second);
        assert_eq!(store.edge(&second).unwrap().sort_order, 8);
        assert_eq!(store.edge(&unrelated).unwrap().sort_order, 0);
        assert!(!store.edge(&second).unwrap().is_default);
    }

    #[test]
    fn test_connect_after_max_sort_order_is_rejected() {
        let mut store = bare_store();
        store.add_node(Node::condition("check")).unwrap();
        store.add_node(Node::condition("other")).unwrap();

        let first = store.connect("check", "end").unwrap();
        store
            .update_edge_attributes(&first, EdgePatch::new().sort_order(i32::MAX))
            .unwrap();

        let err = store.connect("check", "other").unwrap_err();
        assert!(matches!(
            err,
            GraphError::Validation { ref element, ref field, .. }
                if element == "check" && field.as_deref() == Some("sortOrder")
        ));
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.outgoing("check").len(), 1);
    }

    #[test]
    fn test_connect_uses_configured_prefix() {
        let config = KessaiConfig::from_toml_str("[store]\nedge_id_prefix = \"link\"").unwrap();
        let mut store = GraphStore::with_config(&config);
        store.add_node(Node::start("start")).unwrap();
        store.add_node(Node::end("end")).unwrap();

        let id = store.connect("start", "end").unwrap();
        assert!(id.starts_with("link-"));
    }

    #[test]
    fn test_protected_nodes_cannot_be_deleted() {
        let mut store = GraphStore::from_definition(linear_definition()).unwrap();
        let before = store.to_definition();

        for (id, kind) in [("start", NodeKind::Start), ("end", NodeKind::End)] {
            let err = store.delete_node(id).unwrap_err();
            assert_eq!(
                err,
                GraphError::ProtectedNode {
                    node_id: id.to_string(),
                    kind
                }
            );
        }
        assert_eq!(store.to_definition(), before);
    }

    #[test]
    fn test_delete_node_cascades_exactly_touching_edges() {
        let mut store = GraphStore::from_definition(amount_definition()).unwrap();

        let removed = store.delete_node("cfo").unwrap();
        assert_eq!(removed.id, "cfo");

        let remaining: Vec<&str> = store.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["e-start", "e-default"]);
        assert!(store.incoming("end").iter().all(|e| e.id == "e-default"));
        assert!(store.outgoing("check").iter().all(|e| e.to_node_id != "cfo"));
    }

    #[test]
    fn test_delete_missing_elements() {
        let mut store = bare_store();
        assert!(matches!(
            store.delete_node("nope"),
            Err(GraphError::NotFound { element: "node", .. })
        ));
        assert!(matches!(
            store.delete_edge("nope"),
            Err(GraphError::NotFound { element: "edge", .. })
        ));
    }

    #[test]
    fn test_update_node_attributes_is_lenient_within_kind() {
        let mut store = GraphStore::from_definition(linear_definition()).unwrap();

        // A conflicting approver form is stored; the validator reports it.
        store
            .update_node_attributes(
                "a",
                NodePatch::new()
                    .approver_type(ApproverType::OrgRelation)
                    .name("Manager sign-off")
                    .position(120.0, 40.0),
            )
            .unwrap();

        let node = store.node("a").unwrap();
        assert_eq!(node.display_name(), "Manager sign-off");
        assert_eq!(node.position, Position::new(120.0, 40.0));
        let attributes = node.approval_attributes().unwrap();
        assert_eq!(attributes.approver_type, Some(ApproverType::OrgRelation));
        assert_eq!(attributes.approver_id.as_deref(), Some("E-100"));

        let result = store.validate();
        assert!(result.has_error(IssueCode::ApproverAttributes));
    }

    #[test]
    fn test_update_node_attributes_rejects_foreign_attribute() {
        let mut store = bare_store();
        store.add_node(Node::condition("check")).unwrap();

        let err = store
            .update_node_attributes("check", NodePatch::new().approver_id("E-1"))
            .unwrap_err();
        match err {
            GraphError::Validation { element, field, .. } => {
                assert_eq!(element, "check");
                assert_eq!(field.as_deref(), Some("approverId"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Clearing an attribute the kind never carries is harmless.
        store
            .update_node_attributes("check", NodePatch::new().clear(Attribute::ApproverId))
            .unwrap();
    }

    #[test]
    fn test_update_node_attributes_missing_node() {
        let mut store = bare_store();
        let err = store
            .update_node_attributes("ghost", NodePatch::new().name("x"))
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound { element: "node", .. }));
    }

    #[test]
    fn test_parallel_mode_patch_and_default() {
        let mut store = bare_store();
        store.add_node(Node::parallel_start("fork", None)).unwrap();
        assert_eq!(store.node("fork").unwrap().parallel_mode(), Some(ParallelMode::All));

        store
            .update_node_attributes("fork", NodePatch::new().parallel_mode(ParallelMode::Majority))
            .unwrap();
        assert_eq!(
            store.node("fork").unwrap().parallel_mode(),
            Some(ParallelMode::Majority)
        );
    }

    #[test]
    fn test_second_default_is_stored_but_fails_validation() {
        let mut store = GraphStore::from_definition(amount_definition()).unwrap();

        store
            .update_edge_attributes(
                "e-large",
                EdgePatch::new().clear_condition().default_edge(true),
            )
            .unwrap();
        assert!(store.edge("e-large").unwrap().is_default);

        let result = store.validate();
        assert!(!result.is_valid());
        assert_eq!(
            result
                .errors
                .iter()
                .filter(|i| i.code == IssueCode::MultipleDefaults)
                .count(),
            2
        );
    }

    #[test]
    fn test_selection_is_cleared_on_delete() {
        let mut store = GraphStore::from_definition(amount_definition()).unwrap();

        store.select_node("cfo").unwrap();
        assert_eq!(store.selection(), Some(&Selected::Node("cfo".to_string())));
        store.delete_node("cfo").unwrap();
        assert_eq!(store.selection(), None);

        store.select_edge("e-default").unwrap();
        store.delete_edge("e-default").unwrap();
        assert_eq!(store.selection(), None);

        assert!(store.select_edge("e-default").is_err());
        store.select_node("check").unwrap();
        store.clear_selection();
        assert_eq!(store.selection(), None);
    }

    #[test]
    fn test_load_graph_rejects_dangling_and_keeps_state() {
        let mut store = GraphStore::from_definition(linear_definition()).unwrap();
        let before = store.to_definition();

        let err = store
            .load_graph(
                vec![Node::start("s"), Node::end("e")],
                vec![Edge::new("x", "s", "missing")],
            )
            .unwrap_err();
        match err {
            GraphError::Validation { element, field, .. } => {
                assert_eq!(element, "x");
                assert_eq!(field.as_deref(), Some("toNodeId"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.to_definition(), before);

        let err = store
            .load_graph(vec![Node::start("s"), Node::end("s")], vec![])
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateId("s".to_string()));
        assert_eq!(store.to_definition(), before);
    }

    #[test]
    fn test_set_definition_keeps_graph() {
        let mut store = GraphStore::from_definition(linear_definition()).unwrap();
        let mut info = DefinitionInfo::new("Renamed", Scope::Employee);
        info.employee_id = Some("E-7".to_string());
        store.set_definition(info.clone());

        assert_eq!(store.definition(), &info);
        assert_eq!(store.node_count(), 3);
        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn test_outgoing_is_in_evaluation_order() {
        let mut store = bare_store();
        store.add_node(Node::condition("check")).unwrap();
        store.add_node(Node::approval("a", ApprovalAttributes::department_head())).unwrap();
        store.add_node(Node::approval("b", ApprovalAttributes::department_head())).unwrap();

        let to_end = store.connect("check", "end").unwrap();
        let to_a = store.connect("check", "a").unwrap();
        let to_b = store.connect("check", "b").unwrap();
        store
            .update_edge_attributes(&to_end, EdgePatch::new().default_edge(true))
            .unwrap();
        store
            .update_edge_attributes(&to_b, EdgePatch::new().sort_order(1))
            .unwrap();

        // `to_a` has sort order 1 as well; insertion order breaks the tie.
        let ordered: Vec<&str> = store.outgoing("check").iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ordered, vec![to_a.as_str(), to_b.as_str(), to_end.as_str()]);
    }

    #[test]
    fn test_serialize_renumbers_sort_order_densely() {
        let mut definition = amount_definition();
        for edge in &mut definition.edges {
            match edge.id.as_str() {
                "e-large" => edge.sort_order = 10,
                "e-default" => edge.sort_order = -3,
                _ => edge.sort_order = 42,
            }
        }
        let store = GraphStore::from_definition(definition).unwrap();
        let records = store.serialize();

        let orders: Vec<(&str, i32)> = records
            .edges
            .iter()
            .map(|e| (e.id.as_str(), e.sort_order))
            .collect();
        assert_eq!(
            orders,
            vec![("e-start", 0), ("e-large", 0), ("e-default", 1), ("e-cfo", 0)]
        );

        let ids: Vec<&str> = records.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["start", "check", "cfo", "end"]);
    }

    #[test]
    fn test_serialize_keeps_positions_and_attributes() {
        let mut definition = linear_definition();
        definition.nodes[1] = Node::approval(
            "a",
            ApprovalAttributes::org_relation(OrgRelation::NLevelUp, Some(2)),
        )
        .with_name("Skip level")
        .at(310.5, -20.0);
        let store = GraphStore::from_definition(definition).unwrap();

        let record = store
            .serialize()
            .nodes
            .into_iter()
            .find(|n| n.id == "a")
            .unwrap();
        assert_eq!(record.node_type, NodeKind::Approval);
        assert_eq!(record.name.as_deref(), Some("Skip level"));
        assert_eq!(record.org_relation, Some(OrgRelation::NLevelUp));
        assert_eq!(record.org_level_up, Some(2));
        assert_eq!(record.approver_id, None);
        assert_eq!((record.pos_x, record.pos_y), (310.5, -20.0));
    }
}
