//! Execution contract tests
//!
//! Tokens, approvals, condition routing, fork/join policies and the fatal
//! conditions a live request can run into.
mod common;
use common::*;
use kessai::config::ExecutionConfig;
use kessai::prelude::*;
use kessai::registry::ApproverSpec;
use pretty_assertions::assert_eq;

fn approve(instance: &mut Instance<'_>, node_id: &str) {
    instance
        .decide(node_id, Decision::Approve)
        .unwrap_or_else(|e| panic!("approving '{}' failed: {}", node_id, e));
}

#[cfg(test)]
mod execution_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_linear_approval_completes() {
        let graph = ExecutionGraph::new(&linear_definition()).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());

        assert_eq!(instance.start().unwrap(), &InstanceStatus::Running);
        assert!(instance.is_waiting_at("a"));
        assert_eq!(
            instance.pending_approvals()[0].approver,
            Some(ApproverSpec::SpecificEmployee {
                employee_id: "E-100".to_string()
            })
        );

        approve(&mut instance, "a");
        assert_eq!(instance.status(), &InstanceStatus::Completed);
        assert_eq!(
            instance.history(),
            &[
                ExecutionEvent::Started {
                    node_id: "start".to_string()
                },
                ExecutionEvent::ApprovalPending {
                    node_id: "a".to_string()
                },
                ExecutionEvent::Approved {
                    node_id: "a".to_string()
                },
                ExecutionEvent::Completed {
                    node_id: "end".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_rejection_terminates() {
        let graph = ExecutionGraph::new(&linear_definition()).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        let status = instance.decide("a", Decision::Reject).unwrap();
        assert_eq!(
            status,
            &InstanceStatus::Rejected {
                node_id: "a".to_string()
            }
        );
        assert!(instance.pending_approvals().is_empty());
        assert!(matches!(
            instance.decide("a", Decision::Approve),
            Err(RoutingError::InstanceClosed(_))
        ));
    }

    #[test]
    fn test_decide_without_waiting_token() {
        let graph = ExecutionGraph::new(&linear_definition()).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        assert_eq!(
            instance.decide("end", Decision::Approve).unwrap_err(),
            RoutingError::NotAwaitingDecision("end".to_string())
        );
        assert!(instance.status().is_running());
    }

    #[test]
    fn test_condition_routes_on_snapshot() {
        let graph = ExecutionGraph::new(&amount_definition()).unwrap();

        let mut large = Instance::new(&graph, amount(1500.0));
        large.start().unwrap();
        assert!(large.is_waiting_at("cfo"));
        assert!(large.history().iter().any(|e| matches!(
            e,
            ExecutionEvent::ConditionResolved { edge_id, .. } if edge_id == "e-large"
        )));

        let mut small = Instance::new(&graph, amount(500.0));
        assert_eq!(small.start().unwrap(), &InstanceStatus::Completed);
    }

    #[test]
    fn test_parallel_all_waits_for_every_branch() {
        let graph = ExecutionGraph::new(&parallel_definition(ParallelMode::All, &["a", "b"])).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        assert!(instance.is_waiting_at("a"));
        assert!(instance.is_waiting_at("b"));
        assert_eq!(instance.join_progress("join"), None);

        approve(&mut instance, "a");
        assert_eq!(instance.join_progress("join"), Some((1, 2)));
        assert!(instance.status().is_running());
        assert!(instance.is_waiting_at("b"));

        approve(&mut instance, "b");
        assert_eq!(instance.status(), &InstanceStatus::Completed);
        assert!(instance.history().iter().any(|e| matches!(
            e,
            ExecutionEvent::JoinCompleted {
                arrived: 2,
                required: 2,
                ..
            }
        )));
    }

    #[test]
    fn test_parallel_any_discards_remaining_branches() {
        let graph =
            ExecutionGraph::new(&parallel_definition(ParallelMode::Any, &["a", "b", "c"])).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();
        assert_eq!(instance.pending_approvals().len(), 3);

        approve(&mut instance, "b");
        assert_eq!(instance.status(), &InstanceStatus::Completed);
        assert!(instance.pending_approvals().is_empty());
    }

    #[test]
    fn test_parallel_majority() {
        let graph =
            ExecutionGraph::new(&parallel_definition(ParallelMode::Majority, &["a", "b", "c"]))
                .unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        approve(&mut instance, "c");
        assert_eq!(instance.join_progress("join"), Some((1, 2)));
        approve(&mut instance, "a");
        assert_eq!(instance.status(), &InstanceStatus::Completed);
        assert!(!instance.is_waiting_at("b"));
    }

    #[test]
    fn test_join_progress_reports_innermost_open_fork() {
        // outer forks to `x` and to an inner fork over p, q, r; every branch
        // meets at the same join.
        let mut nodes = vec![
            Node::start("start"),
            Node::parallel_start("outer", None),
            Node::parallel_start("inner", None),
            Node::parallel_join("join"),
            Node::end("end"),
        ];
        let mut edges = vec![
            Edge::new("e-start", "start", "outer"),
            Edge::new("e-outer-x", "outer", "x"),
            Edge::new("e-outer-inner", "outer", "inner"),
            Edge::new("e-join", "join", "end"),
        ];
        for branch in ["x", "p", "q", "r"] {
            nodes.push(Node::approval(branch, ApprovalAttributes::department_head()));
            edges.push(Edge::new(format!("e-{}-join", branch), branch, "join"));
        }
        for branch in ["p", "q", "r"] {
            edges.push(Edge::new(format!("e-inner-{}", branch), "inner", branch));
        }
        let definition = WorkflowDefinition::new(DefinitionInfo::default(), nodes, edges);
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        approve(&mut instance, "x");
        assert_eq!(instance.join_progress("join"), Some((1, 2)));

        approve(&mut instance, "p");
        assert_eq!(instance.join_progress("join"), Some((1, 3)));
        approve(&mut instance, "q");
        assert_eq!(instance.join_progress("join"), Some((2, 3)));
    }

    #[test]
    fn test_required_arrivals_per_mode() {
        assert_eq!(ParallelMode::All.required_arrivals(4), 4);
        assert_eq!(ParallelMode::Any.required_arrivals(4), 1);
        assert_eq!(ParallelMode::Majority.required_arrivals(4), 3);
        assert_eq!(ParallelMode::Majority.required_arrivals(3), 2);
    }

    #[test]
    fn test_dead_end_is_fatal() {
        let mut definition = amount_definition();
        definition.edges.retain(|e| e.id != "e-default");
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance = Instance::new(&graph, amount(10.0));

        let err = instance.start().unwrap_err();
        assert_eq!(
            err,
            RoutingError::DeadEnd {
                node_id: "check".to_string()
            }
        );
        assert!(matches!(instance.status(), InstanceStatus::Failed { .. }));
        assert!(matches!(
            instance.history().last(),
            Some(ExecutionEvent::Failed { .. })
        ));
    }

    #[test]
    fn test_branch_reaching_end_inside_fork() {
        let mut definition = parallel_definition(ParallelMode::All, &["a", "b"]);
        definition.edges.retain(|e| e.id != "e-b-join");
        definition.edges.push(Edge::new("e-b-end", "b", "end"));
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        let err = instance.decide("b", Decision::Approve).unwrap_err();
        assert!(matches!(err, RoutingError::ForkJoinMismatch { ref node_id, .. } if node_id == "end"));
    }

    #[test]
    fn test_join_outside_fork() {
        let definition = WorkflowDefinition::new(
            DefinitionInfo::default(),
            vec![
                Node::start("start"),
                Node::parallel_join("join"),
                Node::end("end"),
            ],
            vec![Edge::new("e1", "start", "join"), Edge::new("e2", "join", "end")],
        );
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        assert!(matches!(
            instance.start(),
            Err(RoutingError::ForkJoinMismatch { .. })
        ));
    }

    #[test]
    fn test_step_limit_stops_automatic_cycles() {
        let definition = WorkflowDefinition::new(
            DefinitionInfo::default(),
            vec![
                Node::start("start"),
                Node::condition("ping"),
                Node::condition("pong"),
                Node::end("end"),
            ],
            vec![
                Edge::new("e1", "start", "ping"),
                Edge::new("e2", "ping", "pong"),
                Edge::new("e3", "pong", "ping"),
                Edge::new("e4", "pong", "end").as_default(),
            ],
        );
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance =
            Instance::new(&graph, RequestContext::new()).with_config(&ExecutionConfig { max_steps: 25 });

        assert_eq!(
            instance.start().unwrap_err(),
            RoutingError::StepLimitExceeded { limit: 25 }
        );
    }

    #[test]
    fn test_ambiguous_single_edge_node() {
        let mut definition = linear_definition();
        definition.nodes.push(Node::end("end-2"));
        definition.edges.push(Edge::new("e3", "a", "end-2"));
        let graph = ExecutionGraph::new(&definition).unwrap();
        let mut instance = Instance::new(&graph, RequestContext::new());
        instance.start().unwrap();

        assert_eq!(
            instance.decide("a", Decision::Approve).unwrap_err(),
            RoutingError::AmbiguousTransition {
                node_id: "a".to_string(),
                count: 2
            }
        );
    }

    #[test]
    fn test_graph_entry_errors() {
        let mut definition = linear_definition();
        definition.nodes.retain(|n| n.id != "start");
        definition.edges.retain(|e| e.from_node_id != "start");
        assert_eq!(
            ExecutionGraph::new(&definition).unwrap_err(),
            RoutingError::MissingStart
        );

        let mut definition = linear_definition();
        definition.edges.push(Edge::new("bad", "a", "ghost"));
        assert_eq!(
            ExecutionGraph::new(&definition).unwrap_err(),
            RoutingError::DanglingEdge {
                edge_id: "bad".to_string(),
                node_id: "ghost".to_string()
            }
        );
    }
}
