//! Arbitrary input generators for fuzz testing
//!
//! Generates random inputs for driving the market through its public
//! operations. Inputs are allowed to be invalid: the scenarios expect the
//! market to reject them cleanly.

use proptest::prelude::*;

/// Balance minted to every actor before a scenario starts
pub const ACTOR_FUNDING: u64 = 1_000_000_000_000;

/// Largest reward a scenario escrows
pub const MAX_REWARD: u64 = ACTOR_FUNDING / 4;

/// Arbitrary reward amount with edge cases
/// Tests: 1, tiny values where fee rounding dominates, large values
pub fn arb_reward_amount() -> impl Strategy<Value = u64> {
    prop_oneof![
        // Edge cases
        Just(1u64),
        Just(2u64),
        Just(3u64),
        Just(MAX_REWARD),
        // Rounding-sensitive amounts
        4u64..1_000u64,
        // Typical amounts
        1_000u64..1_000_000_000u64,
        // Large amounts
        1_000_000_000u64..MAX_REWARD,
    ]
}

/// Arbitrary platform fee in basis points (0-1000, the allowed range)
pub fn arb_platform_fee_bps() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(0u16),
        Just(1u16),
        Just(250u16), // Default
        Just(1000u16), // Cap
        0u16..=1000u16,
    ]
}

/// Arbitrary rejection processing fee in basis points (0-10000)
pub fn arb_processing_bps() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(0u16),
        Just(100u16), // Default
        Just(10000u16), // Whole reward
        0u16..=10000u16,
    ]
}

/// Vote as basis points of the disputed reward. Above 10000 is out of range
/// and must be rejected.
pub fn arb_share_bps() -> impl Strategy<Value = u16> {
    prop_oneof![
        Just(0u16),
        Just(10000u16),
        Just(10001u16),
        0u16..=10000u16,
        10001u16..=12000u16,
    ]
}

/// Clock step in seconds
pub fn arb_clock_step() -> impl Strategy<Value = i64> {
    prop_oneof![
        Just(0i64),
        Just(1i64),
        Just(86_400i64),
        0i64..(30 * 86_400i64),
    ]
}

/// One call against a bidding or fixed-payment task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    SubmitProof,
    ApproveProof,
    Pay,
    Terminate,
    AdvanceClock(i64),
    IncreaseReward(u64),
    ExtendDeadline(i64),
    FileDispute,
}

pub fn arb_task_action() -> impl Strategy<Value = TaskAction> {
    prop_oneof![
        Just(TaskAction::SubmitProof),
        Just(TaskAction::ApproveProof),
        Just(TaskAction::Pay),
        Just(TaskAction::Terminate),
        Just(TaskAction::FileDispute),
        arb_clock_step().prop_map(TaskAction::AdvanceClock),
        arb_reward_amount().prop_map(TaskAction::IncreaseReward),
        arb_clock_step().prop_map(TaskAction::ExtendDeadline),
    ]
}

/// One call against a milestone task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneAction {
    SubmitProof(u8),
    Approve(u8),
    Pay(u8),
    Complete,
    Terminate,
}

pub fn arb_milestone_action() -> impl Strategy<Value = MilestoneAction> {
    prop_oneof![
        (0u8..4u8).prop_map(MilestoneAction::SubmitProof),
        (0u8..4u8).prop_map(MilestoneAction::Approve),
        (0u8..4u8).prop_map(MilestoneAction::Pay),
        Just(MilestoneAction::Complete),
        Just(MilestoneAction::Terminate),
    ]
}

/// Input for task lifecycle fuzz testing
#[derive(Debug, Clone)]
pub struct TaskLifecycleInput {
    /// Bind the worker through a bid rather than direct assignment
    pub by_bid: bool,
    pub reward: u64,
    pub platform_fee_bps: u16,
    pub deadline_offset: i64,
    pub actions: Vec<TaskAction>,
}

impl Arbitrary for TaskLifecycleInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            any::<bool>(),
            arb_reward_amount(),
            arb_platform_fee_bps(),
            1i64..(60 * 86_400i64),
            prop::collection::vec(arb_task_action(), 1..12),
        )
            .prop_map(
                |(by_bid, reward, platform_fee_bps, deadline_offset, actions)| TaskLifecycleInput {
                    by_bid,
                    reward,
                    platform_fee_bps,
                    deadline_offset,
                    actions,
                },
            )
            .boxed()
    }
}

/// Input for milestone task fuzz testing
#[derive(Debug, Clone)]
pub struct MilestoneInput {
    pub budget: u64,
    /// Milestone rewards as basis points of the budget; the registry rejects
    /// those that overrun it
    pub reward_bps: Vec<u16>,
    pub platform_fee_bps: u16,
    pub actions: Vec<MilestoneAction>,
}

impl Arbitrary for MilestoneInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            arb_reward_amount(),
            prop::collection::vec(1u16..=6000u16, 1..5),
            arb_platform_fee_bps(),
            prop::collection::vec(arb_milestone_action(), 1..16),
        )
            .prop_map(|(budget, reward_bps, platform_fee_bps, actions)| MilestoneInput {
                budget,
                reward_bps,
                platform_fee_bps,
                actions,
            })
            .boxed()
    }
}

/// Input for vote_dispute fuzz testing
#[derive(Debug, Clone)]
pub struct VoteDisputeInput {
    pub reward: u64,
    /// One entry per admin, in voting order
    pub share_bps: Vec<u16>,
    /// Admin index that tries to vote a second time
    pub repeat_voter: Option<u8>,
    /// Whether the worker also stakes and tries to vote
    pub party_votes: bool,
}

impl Arbitrary for VoteDisputeInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            arb_reward_amount(),
            prop::collection::vec(arb_share_bps(), 0..7),
            prop::option::of(0u8..7u8),
            any::<bool>(),
        )
            .prop_map(|(reward, share_bps, repeat_voter, party_votes)| VoteDisputeInput {
                reward,
                share_bps,
                repeat_voter,
                party_votes,
            })
            .boxed()
    }
}

/// Input for resolve_dispute fuzz testing
#[derive(Debug, Clone)]
pub struct ResolveDisputeInput {
    pub reward: u64,
    pub first_round_bps: [u16; 3],
    pub second_round_bps: [u16; 3],
    /// Reject the first proposal, and by whom (true = worker)
    pub rejection: Option<bool>,
    pub processing_bps: u16,
    /// Escrow added by the creator after filing
    pub late_top_up: u64,
}

impl Arbitrary for ResolveDisputeInput {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            arb_reward_amount(),
            prop::array::uniform3(0u16..=10000u16),
            prop::array::uniform3(0u16..=10000u16),
            prop::option::of(any::<bool>()),
            arb_processing_bps(),
            prop_oneof![Just(0u64), 1u64..1_000_000u64],
        )
            .prop_map(
                |(reward, first_round_bps, second_round_bps, rejection, processing_bps, late_top_up)| {
                    ResolveDisputeInput {
                        reward,
                        first_round_bps,
                        second_round_bps,
                        rejection,
                        processing_bps,
                        late_top_up,
                    }
                },
            )
            .boxed()
    }
}

/// Share of `reward` given in basis points, rounded down.
pub fn share_of(reward: u64, bps: u16) -> u64 {
    (reward as u128 * bps as u128 / 10_000) as u64
}
