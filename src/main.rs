use std::cell::Cell;
use std::rc::Rc;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use slist::{LinkedSequence, SequenceError, TryClone};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slist-demo", about = "Exercise the singly linked sequence")]
struct Cli {
    /// Largest number of successful element copies to allow before copying
    /// fails. Every budget from zero up to this one is tried.
    #[arg(long, default_value_t = 4)]
    copy_budget: usize,
    /// Log every step, including the sequence's own debug events.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    run_construction()?;
    run_ordering()?;
    run_insert_erase()?;
    run_copy_failures(cli.copy_budget)?;

    info!("all scenarios passed");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run_construction() -> Result<()> {
    let seq = LinkedSequence::from([1, 2, 3]);
    ensure!(seq.len() == 3, "expected 3 elements, got {}", seq.len());
    ensure!(
        seq.iter().copied().eq([1, 2, 3]),
        "construction reordered the values: {:?}",
        seq
    );

    let mut copy = seq.clone();
    ensure!(copy == seq, "copy differs from its source");
    copy.push_front(0);
    ensure!(seq == LinkedSequence::from([1, 2, 3]), "mutating a copy changed the source");

    copy.pop_front();
    ensure!(copy == seq, "push_front then pop_front did not round-trip");

    copy.clear();
    ensure!(copy.is_empty() && copy.begin() == copy.end(), "clear left elements behind");

    info!(?seq, "construction and copies behave");
    Ok(())
}

fn run_ordering() -> Result<()> {
    let short = LinkedSequence::from([1, 2]);
    let long = LinkedSequence::from([1, 2, 3]);
    let other = LinkedSequence::from([1, 3]);

    ensure!(short < long, "a strict prefix must order first");
    ensure!(long < other, "{:?} should order before {:?}", long, other);
    ensure!(long == LinkedSequence::from([1, 2, 3]), "equal sequences compare unequal");
    ensure!(other >= long && !(other < long), "relational operators disagree");

    info!("lexicographic ordering holds");
    Ok(())
}

fn run_insert_erase() -> Result<()> {
    let mut seq = LinkedSequence::new();
    let pos = seq.insert_after(seq.before_begin(), 4);
    ensure!(pos == seq.begin() && *pos.get(&seq) == 4, "insert into empty sequence");

    let mut seq = LinkedSequence::from([1, 2, 3, 4]);
    let next = seq.erase_after(seq.before_begin());
    ensure!(next == seq.begin(), "erasing the front must return the new begin");
    ensure!(seq == LinkedSequence::from([2, 3, 4]), "unexpected contents {:?}", seq);

    let mut seq = LinkedSequence::from([1, 2, 3, 4]);
    let third = seq.begin().next(&seq).next(&seq);
    let next = seq.erase_after(third);
    ensure!(next == seq.end(), "erasing the last element must return end");
    ensure!(seq == LinkedSequence::from([1, 2, 3]), "unexpected contents {:?}", seq);

    let first = seq.begin();
    let second = first.next(&seq);
    let inserted = seq.insert_after(first, 10);
    ensure!(inserted.next(&seq) == second, "insert_after must keep the old successor");
    ensure!(*second.get(&seq) == 2, "insert_after disturbed another position");

    info!(?seq, "insertion and erasure behave");
    Ok(())
}

/// An element whose copies draw from a shared budget, and fail once the budget
/// runs out.
#[derive(Debug)]
struct Budgeted {
    id: u32,
    budget: Rc<Cell<usize>>,
}

#[derive(Debug, thiserror::Error)]
#[error("copy budget exhausted")]
struct BudgetExhausted;

impl TryClone for Budgeted {
    type Error = BudgetExhausted;

    fn try_clone(&self) -> Result<Self, BudgetExhausted> {
        match self.budget.get() {
            0 => Err(BudgetExhausted),
            left => {
                self.budget.set(left - 1);
                Ok(Self {
                    id: self.id,
                    budget: self.budget.clone(),
                })
            }
        }
    }
}

fn ids(seq: &LinkedSequence<Budgeted>) -> Vec<u32> { seq.iter().map(|item| item.id).collect() }

/// Pass copy failures through, anything else is a real error.
fn expect_copy_failure(err: SequenceError) -> Result<()> {
    match err {
        SequenceError::ElementCopy(source) => {
            debug!(%source, "copy failed as planned");
            Ok(())
        }
        other => Err(other).context("unexpected failure while copying"),
    }
}

fn run_copy_failures(max_budget: usize) -> Result<()> {
    let budget = Rc::new(Cell::new(0));
    let item = |id| Budgeted {
        id,
        budget: budget.clone(),
    };

    for copies in 0..=max_budget {
        let mut seq = LinkedSequence::from([item(1), item(2), item(3)]);
        let extra = item(4);

        budget.set(copies);
        match seq.try_insert_after(seq.begin(), &extra) {
            Ok(pos) => {
                ensure!(seq.len() == 4, "insert succeeded but length is {}", seq.len());
                seq.erase_after(seq.begin());
                ensure!(pos != seq.begin(), "erased element still reachable");
            }
            Err(err) => expect_copy_failure(err)?,
        }
        ensure!(seq.len() == 3, "budget {copies}: length changed to {}", seq.len());
        ensure!(ids(&seq) == [1, 2, 3], "budget {copies}: contents changed");

        budget.set(copies);
        match seq.try_clone() {
            Ok(copy) => ensure!(ids(&copy) == [1, 2, 3], "budget {copies}: bad copy"),
            Err(err) => expect_copy_failure(err)?,
        }
        ensure!(ids(&seq) == [1, 2, 3], "budget {copies}: copying changed the source");

        let mut target = LinkedSequence::from([item(9)]);
        budget.set(copies);
        match target.try_assign(&seq) {
            Ok(()) => ensure!(ids(&target) == [1, 2, 3], "budget {copies}: bad assignment"),
            Err(err) => {
                expect_copy_failure(err)?;
                ensure!(ids(&target) == [9], "budget {copies}: failed assignment changed target");
            }
        }

        debug!(copies, "copy failure scenario holds");
    }

    info!(max_budget, "strong guarantee holds for every copy budget");
    Ok(())
}
