//! Fuzz test runner for the task market
//!
//! Run with: cargo run --release
//! Or: cargo test (for property-based tests)

use anchor_lang::error::Error;
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::time::Instant;
use task_market::{MarketError, TaskKind};
use task_market_fuzz::*;

fn main() {
    println!("=== Task Market Fuzz Testing ===\n");

    let start = Instant::now();
    let mut total_tests = 0;
    let mut passed = 0;
    let mut failed = 0;

    println!("Running task_lifecycle fuzz tests...");
    let (p, f) = run_task_lifecycle_fuzz(200);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running milestone_escrow fuzz tests...");
    let (p, f) = run_milestone_fuzz(200);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running vote_dispute fuzz tests...");
    let (p, f) = run_vote_dispute_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running resolve_dispute fuzz tests...");
    let (p, f) = run_resolve_dispute_fuzz(100);
    passed += p;
    failed += f;
    total_tests += p + f;

    println!("Running edge case tests...");
    let (p, f) = run_edge_case_tests();
    passed += p;
    failed += f;
    total_tests += p + f;

    let duration = start.elapsed();

    println!("\n=== Fuzz Testing Complete ===");
    println!("Total tests: {}", total_tests);
    println!("Passed: {}", passed);
    println!("Failed: {}", failed);
    println!("Duration: {:?}", duration);

    if failed > 0 {
        std::process::exit(1);
    }
}

/// Draw `iterations` inputs of type `T` and run `simulate` on each.
fn run_fuzz<T, F>(name: &str, iterations: usize, simulate: F) -> (usize, usize)
where
    T: Arbitrary + std::fmt::Debug,
    F: Fn(&T) -> SimulationResult,
{
    let mut passed = 0;
    let mut failed = 0;
    let mut rejected = 0;

    let mut runner = TestRunner::default();

    for i in 0..iterations {
        let input = any::<T>()
            .new_tree(&mut runner)
            .expect("Failed to generate fuzz input")
            .current();

        let result = simulate(&input);
        if result.is_invariant_violation() {
            println!("  [FAIL] Iteration {}: {:?}", i, result);
            println!("         Input: {:?}", input);
            failed += 1;
        } else {
            if result.is_error() {
                rejected += 1;
            }
            passed += 1;
        }
    }

    println!(
        "  {}: {} passed ({} ended on a rejected call), {} failed",
        name, passed, rejected, failed
    );
    (passed, failed)
}

fn run_task_lifecycle_fuzz(iterations: usize) -> (usize, usize) {
    run_fuzz::<TaskLifecycleInput, _>("task_lifecycle", iterations, simulate_task_lifecycle)
}

fn run_milestone_fuzz(iterations: usize) -> (usize, usize) {
    run_fuzz::<MilestoneInput, _>("milestone_escrow", iterations, simulate_milestone_task)
}

fn run_vote_dispute_fuzz(iterations: usize) -> (usize, usize) {
    run_fuzz::<VoteDisputeInput, _>("vote_dispute", iterations, simulate_vote_dispute)
}

fn run_resolve_dispute_fuzz(iterations: usize) -> (usize, usize) {
    run_fuzz::<ResolveDisputeInput, _>("resolve_dispute", iterations, simulate_resolve_dispute)
}

fn run_edge_case_tests() -> (usize, usize) {
    let mut passed = 0;
    let mut failed = 0;

    let mut record = |name: &str, ok: bool| {
        if ok {
            passed += 1;
        } else {
            println!("  [FAIL] {}", name);
            failed += 1;
        }
    };

    // Largest reward with the largest fee still settles without overflow
    {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(1000, 100, 0);
        let ok = market
            .create_task(creator(), kind, "Max", "", START + 86_400)
            .and_then(|id| {
                market.add_worker(creator(), kind, id, worker(), MAX_REWARD)?;
                market.submit_proof_of_work(worker(), kind, id, "proof")?;
                market.approve_proof_of_work(creator(), kind, id, worker())?;
                market.pay_task(worker(), kind, id)
            })
            .is_ok();
        record("max reward payout", ok && market.escrow_balanced());
    }

    // Zero fee sends the whole reward to the worker
    {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(0, 100, 0);
        let ok = market
            .create_task(creator(), kind, "Free", "", START + 86_400)
            .and_then(|id| {
                market.add_worker(creator(), kind, id, worker(), 1)?;
                market.submit_proof_of_work(worker(), kind, id, "proof")?;
                market.approve_proof_of_work(creator(), kind, id, worker())?;
                market.pay_task(worker(), kind, id)
            })
            .is_ok();
        record(
            "zero fee payout",
            ok && market.balance_of(&worker()) == ACTOR_FUNDING + 1
                && market.balance_of(&treasury()) == 0,
        );
    }

    // Proof exactly at the deadline is still on time
    {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, 0);
        let deadline = START + 86_400;
        let ok = market
            .create_task(creator(), kind, "Edge", "", deadline)
            .and_then(|id| {
                market.add_worker(creator(), kind, id, worker(), 100)?;
                market.set_clock(deadline)?;
                market.submit_proof_of_work(worker(), kind, id, "proof")
            })
            .is_ok();
        record("proof at deadline", ok);
    }

    // A dispute one vote short of quorum cannot be processed
    {
        let kind = TaskKind::FixedPayment;
        let mut market = funded_market(250, 100, 3);
        let result = market
            .create_task(creator(), kind, "Quorum", "", START + 86_400)
            .and_then(|id| {
                market.add_worker(creator(), kind, id, worker(), 100)?;
                market.submit_proof_of_work(worker(), kind, id, "proof")?;
                let dispute_id = market.file_dispute_by_worker(worker(), kind, id)?;
                market.vote_on_dispute(admin(0), dispute_id, 10)?;
                market.vote_on_dispute(admin(1), dispute_id, 20)?;
                market.process_votes(admin(2), dispute_id)
            });
        record(
            "quorum short by one",
            result.is_err_and(|e| e == Error::from(MarketError::InsufficientVotes)),
        );
    }

    println!("  edge_cases: {} passed, {} failed", passed, failed);
    (passed, failed)
}
