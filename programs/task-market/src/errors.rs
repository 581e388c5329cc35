//! Error codes for the task market

use anchor_lang::error::Error;
use anchor_lang::prelude::*;

/// Declares [`MarketError`] along with `MarketError::ALL`, which lists every
/// variant in declaration order.
macro_rules! market_errors {
    ($( #[msg($msg:tt)] $variant:ident, )*) => {
        #[error_code]
        pub enum MarketError {
            $( #[msg($msg)] $variant, )*
        }

        impl MarketError {
            pub const ALL: &'static [MarketError] = &[$(MarketError::$variant),*];
        }
    };
}

market_errors! {
    // Authorization errors (6000-6008)
    #[msg("Only the task creator can perform this action")]
    NotCreator,

    #[msg("Only the bound worker can perform this action")]
    NotWorker,

    #[msg("Caller is not an active admin with sufficient stake")]
    NotActiveAdmin,

    #[msg("Only the dispute worker or task creator can perform this action")]
    NotDisputeParty,

    #[msg("Dispute participants cannot vote on their own dispute")]
    AdminIsDisputeParty,

    #[msg("Only the market owner can perform this action")]
    NotOwner,

    #[msg("Only the token owner can mint")]
    NotTokenOwner,

    #[msg("Task creator cannot bid on their own task")]
    CreatorCannotBid,

    #[msg("Market store accounts cannot sign")]
    StoreCannotSign,

    // State errors (6009-6034)
    #[msg("Task not found")]
    TaskNotFound,

    #[msg("Bid not found")]
    BidNotFound,

    #[msg("Milestone not found")]
    MilestoneNotFound,

    #[msg("Dispute not found")]
    DisputeNotFound,

    #[msg("Task is not open")]
    TaskNotOpen,

    #[msg("Task is not in progress")]
    TaskNotInProgress,

    #[msg("Task is not completed")]
    TaskNotCompleted,

    #[msg("Task is already paid or cancelled")]
    TaskFinalized,

    #[msg("Task cannot be cancelled in its current status")]
    TaskNotCancellable,

    #[msg("Task or milestone is under dispute")]
    TaskUnderDispute,

    #[msg("Task already has a worker assigned")]
    WorkerAlreadyAssigned,

    #[msg("Task has no worker assigned")]
    NoWorkerAssigned,

    #[msg("Task deadline has passed")]
    DeadlineExceeded,

    #[msg("No proof of work submitted")]
    ProofNotFound,

    #[msg("Task has no milestones")]
    NoMilestones,

    #[msg("Not all milestones are approved")]
    MilestonesIncomplete,

    #[msg("Milestone is not approved")]
    MilestoneNotApproved,

    #[msg("Dispute is not in Filed status")]
    DisputeNotFiled,

    #[msg("Dispute is not in Resolved status")]
    DisputeNotResolved,

    #[msg("Distribution proposal is not approved by both parties")]
    ProposalNotApproved,

    #[msg("Not enough votes to process the dispute")]
    InsufficientVotes,

    #[msg("Admin has votes in unprocessed dispute rounds")]
    AdminHasActiveVotes,

    #[msg("Admin has no stake")]
    AdminNotStaked,

    #[msg("User is not registered")]
    UserNotRegistered,

    #[msg("Invalid status transition")]
    InvalidStatusTransition,

    #[msg("Operation not supported by this task registry")]
    UnsupportedTaskKind,

    // Validation errors (6035-6047)
    #[msg("Deadline must be in the future and within the maximum horizon")]
    InvalidDeadline,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Invalid worker address")]
    InvalidWorker,

    #[msg("Worker share exceeds the disputed reward")]
    ShareOutOfRange,

    #[msg("Fee basis points out of range")]
    InvalidFeeBps,

    #[msg("String exceeds maximum length")]
    StringTooLong,

    #[msg("String contains invalid characters")]
    InvalidStringInput,

    #[msg("Content must not be empty")]
    EmptyContent,

    #[msg("Milestone rewards exceed the escrowed task budget")]
    MilestoneBudgetExceeded,

    #[msg("Invalid market configuration")]
    InvalidConfig,

    #[msg("Task contract address is not a known registry")]
    UnknownTaskContract,

    #[msg("Clock cannot move backwards")]
    ClockWentBackwards,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,

    // Insufficient funds errors (6048-6050)
    #[msg("Token allowance is too low")]
    InsufficientAllowance,

    #[msg("Token balance is too low")]
    InsufficientBalance,

    #[msg("Escrow balance is too low")]
    InsufficientEscrowBalance,

    // Already-done errors (6051-6058)
    #[msg("Admin has already voted on this dispute")]
    AlreadyVoted,

    #[msg("Proof of work is already approved")]
    ProofAlreadyApproved,

    #[msg("Milestone is already approved")]
    MilestoneAlreadyApproved,

    #[msg("Milestone is already paid")]
    MilestoneAlreadyPaid,

    #[msg("A dispute is already open for this task or milestone")]
    DisputeAlreadyFiled,

    #[msg("Dispute funds have already been distributed")]
    DisputeAlreadyDistributed,

    #[msg("User is already registered")]
    UserAlreadyRegistered,

    #[msg("Admin is already active")]
    AdminAlreadyActive,
}

/// Caller-facing error taxonomy. Every [`MarketError`] belongs to exactly one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong caller role
    Authorization,
    /// Operation invalid for the current status
    State,
    /// Bad input
    Validation,
    /// Allowance or balance shortfall
    InsufficientFunds,
    /// Repeated action that must happen at most once
    AlreadyDone,
}

impl MarketError {
    pub fn kind(self) -> ErrorKind {
        use MarketError::*;
        match self {
            NotCreator | NotWorker | NotActiveAdmin | NotDisputeParty | AdminIsDisputeParty
            | NotOwner | NotTokenOwner | CreatorCannotBid | StoreCannotSign => {
                ErrorKind::Authorization
            }

            TaskNotFound | BidNotFound | MilestoneNotFound | DisputeNotFound | TaskNotOpen
            | TaskNotInProgress | TaskNotCompleted | TaskFinalized | TaskNotCancellable
            | TaskUnderDispute | WorkerAlreadyAssigned | NoWorkerAssigned | DeadlineExceeded
            | ProofNotFound | NoMilestones | MilestonesIncomplete | MilestoneNotApproved
            | DisputeNotFiled | DisputeNotResolved | ProposalNotApproved | InsufficientVotes
            | AdminHasActiveVotes | AdminNotStaked | UserNotRegistered
            | InvalidStatusTransition | UnsupportedTaskKind => ErrorKind::State,

            InvalidDeadline | InvalidAmount | InvalidWorker | ShareOutOfRange | InvalidFeeBps
            | StringTooLong | InvalidStringInput | EmptyContent | MilestoneBudgetExceeded
            | InvalidConfig | UnknownTaskContract | ClockWentBackwards | ArithmeticOverflow => {
                ErrorKind::Validation
            }

            InsufficientAllowance | InsufficientBalance | InsufficientEscrowBalance => {
                ErrorKind::InsufficientFunds
            }

            AlreadyVoted | ProofAlreadyApproved | MilestoneAlreadyApproved
            | MilestoneAlreadyPaid | DisputeAlreadyFiled | DisputeAlreadyDistributed
            | UserAlreadyRegistered | AdminAlreadyActive => ErrorKind::AlreadyDone,
        }
    }

    /// Look up a variant by its numeric error code (offset included).
    pub fn from_code(code: u32) -> Option<MarketError> {
        Self::ALL.iter().copied().find(|e| u32::from(*e) == code)
    }
}

/// Recover the market error from a returned anchor error, if it is one.
pub fn market_error(err: &Error) -> Option<MarketError> {
    match err {
        Error::AnchorError(e) => MarketError::from_code(e.error_code_number),
        _ => None,
    }
}

/// Recover the [`ErrorKind`] from a returned anchor error.
pub fn error_kind(err: &Error) -> Option<ErrorKind> {
    market_error(err).map(MarketError::kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_sequential_from_offset() {
        for (i, e) in MarketError::ALL.iter().enumerate() {
            assert_eq!(
                u32::from(*e),
                anchor_lang::error::ERROR_CODE_OFFSET + i as u32,
                "{:?} out of declaration order",
                e
            );
        }
    }

    #[test]
    fn test_all_spans_every_code() {
        let last = MarketError::ALL.last().copied().map(u32::from);
        assert_eq!(
            last,
            Some(anchor_lang::error::ERROR_CODE_OFFSET + MarketError::ALL.len() as u32 - 1)
        );
        assert!(MarketError::ALL.iter().any(|e| e.name() == "StoreCannotSign"));
        assert!(MarketError::from_code(u32::from(MarketError::AdminAlreadyActive) + 1).is_none());
    }

    #[test]
    fn test_from_code_round_trips_every_variant() {
        for &e in MarketError::ALL {
            assert_eq!(MarketError::from_code(u32::from(e)).map(u32::from), Some(u32::from(e)));
        }
        assert!(MarketError::from_code(0).is_none());
    }

    #[test]
    fn test_kind_taxonomy() {
        assert_eq!(MarketError::NotCreator.kind(), ErrorKind::Authorization);
        assert_eq!(MarketError::StoreCannotSign.kind(), ErrorKind::Authorization);
        assert_eq!(MarketError::TaskFinalized.kind(), ErrorKind::State);
        assert_eq!(MarketError::ShareOutOfRange.kind(), ErrorKind::Validation);
        assert_eq!(MarketError::InsufficientAllowance.kind(), ErrorKind::InsufficientFunds);
        assert_eq!(MarketError::AlreadyVoted.kind(), ErrorKind::AlreadyDone);
        assert_eq!(MarketError::MilestoneAlreadyPaid.kind(), ErrorKind::AlreadyDone);
    }

    #[test]
    fn test_error_kind_from_anchor_error() {
        let err: Error = MarketError::DeadlineExceeded.into();
        assert_eq!(error_kind(&err), Some(ErrorKind::State));

        let err = error!(MarketError::InsufficientBalance);
        assert_eq!(error_kind(&err), Some(ErrorKind::InsufficientFunds));
    }
}
