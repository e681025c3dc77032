//! Ledger errors.

use crate::dispatch::revert::failure_message;
use crate::primitives::{Address, CallType, ProposalId};

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error category, for callers that only care about the class of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller lacks the admin, approver or proposer role.
    Authorization,
    /// Configuration arguments rejected.
    Validation,
    /// Proposal not in the lifecycle state the operation requires.
    State,
    /// Per-approver open-proposal cap reached.
    ResourceExhausted,
    /// Target not callable, or the dispatched operation failed.
    Execution,
}

/// Ledger operation errors.
///
/// Every error leaves the ledger exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Not an admin: {0}")]
    NotAdmin(Address),

    #[error("Not an approver for {call_type}: {caller}")]
    NotApprover { caller: Address, call_type: CallType },

    #[error("Not the proposer of proposal {id}: {caller}")]
    NotProposer { caller: Address, id: ProposalId },

    #[error("Threshold must be greater than zero")]
    ZeroThreshold,

    #[error("Open proposal cap must be greater than zero")]
    ZeroOpenCap,

    #[error("Endpoint must not be the null address")]
    NullEndpoint,

    #[error("Insufficient approvers: {approvers} distinct, threshold {threshold}")]
    InsufficientApprovers { approvers: usize, threshold: u32 },

    #[error("Call type not configured: {0}")]
    NotConfigured(CallType),

    #[error("Proposal {0} is not open")]
    NotOpen(ProposalId),

    #[error("Proposal {0} needs more approvals")]
    NeedsMoreApprovals(ProposalId),

    #[error("Proposal {id} already approved by {approver}")]
    AlreadyApproved { id: ProposalId, approver: Address },

    #[error("Proposal {id} not approved by {approver}")]
    NotApproved { id: ProposalId, approver: Address },

    #[error("Executable proposal exists for {0}")]
    ExecutableProposalExists(CallType),

    #[error("Open proposal cap reached: {cap}")]
    OpenCapReached { cap: u32 },

    #[error("Target is not callable: {0}")]
    TargetNotCallable(Address),

    #[error("{}", failure_message(.reason.as_deref()))]
    CallFailed { reason: Option<String> },
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotAdmin(_)
            | LedgerError::NotApprover { .. }
            | LedgerError::NotProposer { .. } => ErrorKind::Authorization,
            LedgerError::ZeroThreshold
            | LedgerError::ZeroOpenCap
            | LedgerError::NullEndpoint
            | LedgerError::InsufficientApprovers { .. }
            | LedgerError::NotConfigured(_) => ErrorKind::Validation,
            LedgerError::NotOpen(_)
            | LedgerError::NeedsMoreApprovals(_)
            | LedgerError::AlreadyApproved { .. }
            | LedgerError::NotApproved { .. }
            | LedgerError::ExecutableProposalExists(_) => ErrorKind::State,
            LedgerError::OpenCapReached { .. } => ErrorKind::ResourceExhausted,
            LedgerError::TargetNotCallable(_) | LedgerError::CallFailed { .. } => {
                ErrorKind::Execution
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_failed_messages() {
        let bare = LedgerError::CallFailed { reason: None };
        assert_eq!(bare.to_string(), "call failed");

        let with_reason = LedgerError::CallFailed {
            reason: Some("boom".to_string()),
        };
        assert_eq!(with_reason.to_string(), "call failed: boom");
    }

    #[test]
    fn test_error_kinds() {
        let alice = Address::from_label("alice");
        assert_eq!(LedgerError::NotAdmin(alice).kind(), ErrorKind::Authorization);
        assert_eq!(LedgerError::ZeroThreshold.kind(), ErrorKind::Validation);
        assert_eq!(LedgerError::NotOpen(3).kind(), ErrorKind::State);
        assert_eq!(
            LedgerError::OpenCapReached { cap: 2 }.kind(),
            ErrorKind::ResourceExhausted
        );
        assert_eq!(
            LedgerError::TargetNotCallable(alice).kind(),
            ErrorKind::Execution
        );
    }
}
