//! Common test utilities for building workflow definitions and contexts.
use kessai::prelude::*;

/// START -> APPROVAL(a) -> END
#[allow(dead_code)]
pub fn linear_definition() -> WorkflowDefinition {
    WorkflowDefinition::new(
        DefinitionInfo::new("Linear", Scope::Default),
        vec![
            Node::start("start"),
            Node::approval("a", ApprovalAttributes::specific_employee("E-100")),
            Node::end("end"),
        ],
        vec![Edge::new("e1", "start", "a"), Edge::new("e2", "a", "end")],
    )
}

/// START -> CONDITION(check) with `AMOUNT > 1000` to an approval and a
/// default edge straight to END.
#[allow(dead_code)]
pub fn amount_definition() -> WorkflowDefinition {
    WorkflowDefinition::new(
        DefinitionInfo::new("Amount", Scope::Default),
        vec![
            Node::start("start"),
            Node::condition("check"),
            Node::approval("cfo", ApprovalAttributes::specific_employee("E-1")),
            Node::end("end"),
        ],
        vec![
            Edge::new("e-start", "start", "check"),
            Edge::new("e-large", "check", "cfo")
                .when(ConditionField::Amount, ConditionOperator::GreaterThan, "1000")
                .with_sort_order(0),
            Edge::new("e-default", "check", "end")
                .as_default()
                .with_sort_order(1),
            Edge::new("e-cfo", "cfo", "end"),
        ],
    )
}

/// START -> PARALLEL_START(fork) -> {a, b, c...} -> PARALLEL_JOIN(join) -> END
#[allow(dead_code)]
pub fn parallel_definition(mode: ParallelMode, branches: &[&str]) -> WorkflowDefinition {
    let mut nodes = vec![
        Node::start("start"),
        Node::parallel_start("fork", Some(mode)),
        Node::parallel_join("join"),
        Node::end("end"),
    ];
    let mut edges = vec![
        Edge::new("e-start", "start", "fork"),
        Edge::new("e-join", "join", "end"),
    ];
    for branch in branches {
        nodes.push(Node::approval(
            *branch,
            ApprovalAttributes::org_relation(OrgRelation::DirectSupervisor, None),
        ));
        edges.push(Edge::new(format!("e-fork-{}", branch), "fork", *branch));
        edges.push(Edge::new(format!("e-{}-join", branch), *branch, "join"));
    }
    WorkflowDefinition::new(DefinitionInfo::new("Parallel", Scope::Default), nodes, edges)
}

/// A store with START and END only.
#[allow(dead_code)]
pub fn bare_store() -> GraphStore {
    let mut store = GraphStore::new();
    store.add_node(Node::start("start")).expect("add start");
    store.add_node(Node::end("end")).expect("add end");
    store
}

#[allow(dead_code)]
pub fn amount(value: f64) -> RequestContext {
    RequestContext::new().with(ConditionField::Amount, value)
}

#[allow(dead_code)]
pub fn codes(issues: &[ValidationIssue]) -> Vec<IssueCode> {
    issues.iter().map(|i| i.code).collect()
}
