use std::cell::Cell;
use std::rc::Rc;

use slist::{LinkedSequence, SequenceError, TryClone};
use test_case::test_case;

/// Shared bookkeeping for [`Tracked`] elements.
#[derive(Debug, Default)]
struct Ledger {
    /// Copies allowed before the next one fails.
    budget: Cell<usize>,
    /// Live elements, incremented on creation and decremented on drop.
    live: Cell<isize>,
}

#[derive(Debug, thiserror::Error)]
#[error("copy refused")]
struct CopyRefused;

#[derive(Debug)]
struct Tracked {
    value: i32,
    ledger: Rc<Ledger>,
}

impl Tracked {
    fn new(ledger: &Rc<Ledger>, value: i32) -> Self {
        ledger.live.set(ledger.live.get() + 1);
        Self {
            value,
            ledger: ledger.clone(),
        }
    }
}

impl TryClone for Tracked {
    type Error = CopyRefused;

    fn try_clone(&self) -> Result<Self, CopyRefused> {
        let left = self.ledger.budget.get();
        if left == 0 {
            return Err(CopyRefused);
        }
        self.ledger.budget.set(left - 1);
        Ok(Tracked::new(&self.ledger, self.value))
    }
}

impl Drop for Tracked {
    fn drop(&mut self) { self.ledger.live.set(self.ledger.live.get() - 1); }
}

fn values(seq: &LinkedSequence<Tracked>) -> Vec<i32> { seq.iter().map(|item| item.value).collect() }

fn three(ledger: &Rc<Ledger>) -> LinkedSequence<Tracked> {
    LinkedSequence::from([
        Tracked::new(ledger, 1),
        Tracked::new(ledger, 2),
        Tracked::new(ledger, 3),
    ])
}

fn assert_copy_error(err: SequenceError) {
    assert!(
        matches!(err, SequenceError::ElementCopy(_)),
        "expected a copy failure, got {err:?}"
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test_case(0 ; "first copy fails")]
#[test_case(1 ; "copy succeeds")]
fn insert_after_is_all_or_nothing(budget: usize) {
    let ledger = Rc::new(Ledger::default());
    let mut seq = three(&ledger);
    let extra = Tracked::new(&ledger, 4);
    let second = seq.begin().next(&seq);

    ledger.budget.set(budget);
    match seq.try_insert_after(second, &extra) {
        Ok(pos) => {
            assert_eq!(values(&seq), vec![1, 2, 4, 3]);
            assert_eq!(pos.get(&seq).value, 4);
            assert_eq!(ledger.live.get(), 5);
        }
        Err(err) => {
            assert_copy_error(err);
            assert_eq!(seq.len(), 3);
            assert_eq!(values(&seq), vec![1, 2, 3]);
            assert_eq!(ledger.live.get(), 4);
            // positions taken before the failure still work
            assert_eq!(second.get(&seq).value, 2);
        }
    }
}

#[test_case(0)]
#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
#[test_case(4)]
fn try_clone_never_leaks(budget: usize) {
    let ledger = Rc::new(Ledger::default());
    let seq = three(&ledger);

    ledger.budget.set(budget);
    match seq.try_clone() {
        Ok(copy) => {
            assert!(budget >= 3);
            assert_eq!(values(&copy), vec![1, 2, 3]);
            assert_eq!(ledger.live.get(), 6);
        }
        Err(err) => {
            assert!(budget < 3);
            assert_copy_error(err);
            // the partial copy is gone
            assert_eq!(ledger.live.get(), 3);
        }
    }
    assert_eq!(values(&seq), vec![1, 2, 3]);
}

#[test_case(0)]
#[test_case(2)]
#[test_case(3)]
fn try_assign_is_copy_and_swap(budget: usize) {
    let ledger = Rc::new(Ledger::default());
    let source = three(&ledger);
    let mut target = LinkedSequence::from([Tracked::new(&ledger, 7), Tracked::new(&ledger, 8)]);

    ledger.budget.set(budget);
    match target.try_assign(&source) {
        Ok(()) => {
            assert_eq!(values(&target), vec![1, 2, 3]);
            // the old contents went away with the temporary
            assert_eq!(ledger.live.get(), 6);
        }
        Err(err) => {
            assert_copy_error(err);
            assert_eq!(values(&target), vec![7, 8]);
            assert_eq!(ledger.live.get(), 5);
        }
    }
    assert_eq!(values(&source), vec![1, 2, 3]);
}

#[test]
fn try_from_slice_failure_leaves_nothing() {
    let ledger = Rc::new(Ledger::default());
    let items = [Tracked::new(&ledger, 1), Tracked::new(&ledger, 2)];

    ledger.budget.set(1);
    let err = LinkedSequence::try_from_slice(&items).unwrap_err();
    assert_copy_error(err);
    assert_eq!(ledger.live.get(), 2);
}

#[test]
fn every_element_is_dropped_once() {
    let ledger = Rc::new(Ledger::default());
    let mut seq = three(&ledger);
    seq.push_front(Tracked::new(&ledger, 0));
    seq.erase_after(seq.begin());
    assert_eq!(ledger.live.get(), 3);

    let mut iter = seq.into_iter();
    let first = iter.next().unwrap();
    assert_eq!(first.value, 0);
    drop(iter);
    assert_eq!(ledger.live.get(), 1);
    drop(first);
    assert_eq!(ledger.live.get(), 0);
}
