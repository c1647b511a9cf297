use crate::model::ParallelMode;
use std::fmt;

/// One entry of an instance's history.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    Started {
        node_id: String,
    },
    ApprovalPending {
        node_id: String,
    },
    Approved {
        node_id: String,
    },
    Rejected {
        node_id: String,
    },
    ConditionResolved {
        node_id: String,
        edge_id: String,
        explanation: String,
    },
    Forked {
        node_id: String,
        branches: usize,
        mode: ParallelMode,
    },
    JoinWaiting {
        node_id: String,
        arrived: usize,
        required: usize,
    },
    JoinCompleted {
        node_id: String,
        arrived: usize,
        required: usize,
    },
    Completed {
        node_id: String,
    },
    Failed {
        reason: String,
    },
}

impl fmt::Display for ExecutionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionEvent::Started { node_id } => write!(f, "started at '{}'", node_id),
            ExecutionEvent::ApprovalPending { node_id } => {
                write!(f, "waiting for approval at '{}'", node_id)
            }
            ExecutionEvent::Approved { node_id } => write!(f, "approved at '{}'", node_id),
            ExecutionEvent::Rejected { node_id } => write!(f, "rejected at '{}'", node_id),
            ExecutionEvent::ConditionResolved {
                node_id,
                explanation,
                ..
            } => write!(f, "condition '{}' took {}", node_id, explanation),
            ExecutionEvent::Forked {
                node_id,
                branches,
                mode,
            } => write!(
                f,
                "forked at '{}' into {} branches ({:?})",
                node_id, branches, mode
            ),
            ExecutionEvent::JoinWaiting {
                node_id,
                arrived,
                required,
            } => write!(f, "join '{}' waiting ({}/{})", node_id, arrived, required),
            ExecutionEvent::JoinCompleted {
                node_id,
                arrived,
                required,
            } => write!(f, "join '{}' completed ({}/{})", node_id, arrived, required),
            ExecutionEvent::Completed { node_id } => write!(f, "completed at '{}'", node_id),
            ExecutionEvent::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}
