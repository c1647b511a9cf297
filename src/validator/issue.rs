use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Blocks saving.
    Error,
    /// Surfaced to the author; saving is still allowed.
    Warning,
}

/// Machine-readable category of a validation issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    DuplicateId,
    MissingStart,
    MultipleStarts,
    MissingEnd,
    DanglingEdge,
    SelfLoop,
    UnreachableNode,
    InDegree,
    OutDegree,
    JoinArity,
    MultipleDefaults,
    IncompleteCondition,
    EmptyList,
    NonNumericOperand,
    IgnoredCondition,
    IneffectiveDefault,
    ShadowedEdge,
    MissingDefault,
    ApproverAttributes,
    ParallelBalance,
    ScopeKeys,
}

/// One finding, located as precisely as possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    pub node_id: Option<String>,
    pub edge_id: Option<String>,
    /// Record field name for field-level findings, e.g. `approverId`.
    pub field: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    pub(crate) fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub(crate) fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            node_id: None,
            edge_id: None,
            field: None,
            message: message.into(),
        }
    }

    pub(crate) fn on_node(mut self, node_id: &str) -> Self {
        self.node_id = Some(node_id.to_string());
        self
    }

    pub(crate) fn on_edge(mut self, edge_id: &str) -> Self {
        self.edge_id = Some(edge_id.to_string());
        self
    }

    pub(crate) fn with_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    /// Promotes the issue to an error when `escalate` is set.
    pub(crate) fn escalate_if(mut self, escalate: bool) -> Self {
        if escalate {
            self.severity = Severity::Error;
        }
        self
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "[{}]", label)?;
        if let Some(node_id) = &self.node_id {
            write!(f, " node '{}'", node_id)?;
        }
        if let Some(edge_id) = &self.edge_id {
            write!(f, " edge '{}'", edge_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " ({})", field)?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Errors block saving; warnings are informational.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }

    pub fn has_error(&self, code: IssueCode) -> bool {
        self.errors.iter().any(|i| i.code == code)
    }

    pub fn has_warning(&self, code: IssueCode) -> bool {
        self.warnings.iter().any(|i| i.code == code)
    }

    /// All issues located on a node.
    pub fn for_node(&self, node_id: &str) -> Vec<&ValidationIssue> {
        self.issues()
            .filter(|i| i.node_id.as_deref() == Some(node_id))
            .collect()
    }

    /// All issues located on an edge.
    pub fn for_edge(&self, edge_id: &str) -> Vec<&ValidationIssue> {
        self.issues()
            .filter(|i| i.edge_id.as_deref() == Some(edge_id))
            .collect()
    }
}
