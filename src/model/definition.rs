use super::{Edge, Node, NodeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Targeting rule that decides which definition applies to a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    Employee,
    RequestType,
    #[default]
    Default,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Employee => "EMPLOYEE",
            Scope::RequestType => "REQUEST_TYPE",
            Scope::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Definition-level metadata. `definition_id` stays `None` until the first save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefinitionInfo {
    pub definition_id: Option<String>,
    pub name: String,
    pub scope: Scope,
    pub company_id: Option<String>,
    pub group_id: Option<String>,
    pub employee_id: Option<String>,
    pub request_type: Option<String>,
}

/// A scope key that is missing for, or meaningless under, the chosen scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeIssue {
    pub field: &'static str,
    pub message: String,
}

impl DefinitionInfo {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
            ..Default::default()
        }
    }

    /// Checks the scope tuple. Company and group keys qualify every scope.
    pub fn scope_issues(&self) -> Vec<ScopeIssue> {
        let employee = ("employeeId", self.employee_id.is_some());
        let request_type = ("requestType", self.request_type.is_some());
        let (required, unused) = match self.scope {
            Scope::Employee => (vec![employee], vec![request_type]),
            Scope::RequestType => (vec![request_type], vec![employee]),
            Scope::Default => (vec![], vec![employee, request_type]),
        };

        let mut issues = Vec::new();
        for (field, present) in required {
            if !present {
                issues.push(ScopeIssue {
                    field,
                    message: format!("scope {} requires {}", self.scope, field),
                });
            }
        }
        for (field, present) in unused {
            if present {
                issues.push(ScopeIssue {
                    field,
                    message: format!("{} has no meaning for scope {}", field, self.scope),
                });
            }
        }
        issues
    }
}

/// A complete workflow definition: metadata plus the node and edge sets.
///
/// Edge order is insertion order and breaks ties between equal `sort_order`
/// values during edge selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowDefinition {
    pub info: DefinitionInfo,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl WorkflowDefinition {
    pub fn new(info: DefinitionInfo, nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { info, nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.kind() == kind)
    }

    /// Outgoing edges of a node in insertion order.
    pub fn edges_from<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges.iter().filter(move |e| e.from_node_id == node_id)
    }
}
