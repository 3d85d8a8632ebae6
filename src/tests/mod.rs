use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;

/// Move-only element counting its drops.
struct Tracked(Rc<Cell<u32>>);

impl Drop for Tracked {
    fn drop(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

crate::relocate_by_move!(Tracked);

/// Lifecycle events observed on the current test thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counts {
    defaults: usize,
    clones: usize,
    drops: usize,
}

thread_local! {
    static COUNTS: Cell<Counts> = const {
        Cell::new(Counts {
            defaults: 0,
            clones: 0,
            drops: 0,
        })
    };
    static CLONE_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

fn counts() -> Counts {
    COUNTS.with(Cell::get)
}

/// Zeroes the counters and lifts any clone failure injection.
fn reset_counts() {
    COUNTS.with(|c| c.set(Counts::default()));
    CLONE_BUDGET.with(|b| b.set(None));
}

/// Lets `clones` more clones succeed, then panics on the next one.
fn fail_after(clones: usize) {
    CLONE_BUDGET.with(|b| b.set(Some(clones)));
}

fn record(update: impl FnOnce(&mut Counts)) {
    COUNTS.with(|c| {
        let mut current = c.get();
        update(&mut current);
        c.set(current);
    });
}

fn charge_clone() {
    CLONE_BUDGET.with(|b| match b.get() {
        Some(0) => panic!("injected clone failure"),
        Some(left) => b.set(Some(left - 1)),
        None => {}
    });
    record(|n| n.clones += 1);
}

macro_rules! instrumented {
    ($name:ident, $strategy:ty) => {
        #[derive(Debug, PartialEq, Eq)]
        struct $name(i32);

        impl Default for $name {
            fn default() -> Self {
                record(|n| n.defaults += 1);
                Self(0)
            }
        }

        impl Clone for $name {
            fn clone(&self) -> Self {
                charge_clone();
                Self(self.0)
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                record(|n| n.drops += 1);
            }
        }

        impl Relocate for $name {
            type Strategy = $strategy;
        }
    };
}

// Relocated with bitwise moves; clones only when asked to.
instrumented!(Moved, ByMove);
// Relocated by clone-then-drop.
instrumented!(Copied, ByCopy);

/// Builds an array of `Copied` with capacity equal to its length.
fn copied(values: &[i32]) -> DynamicArray<Copied> {
    values.iter().map(|&v| Copied(v)).collect()
}

fn values_of(array: &DynamicArray<Copied>) -> Vec<i32> {
    array.iter().map(|c| c.0).collect()
}

thread_local! {
    static NEXT_ID: Cell<usize> = const { Cell::new(0) };
    static DROPPED: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
    static DROP_BUDGET: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Copy-relocated element with a distinct id per object, clones included.
/// Every drop is logged by id.
#[derive(Debug)]
struct Noisy {
    id: usize,
    value: i32,
}

impl Noisy {
    fn new(value: i32) -> Self {
        let id = NEXT_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            id
        });
        Self { id, value }
    }
}

impl Clone for Noisy {
    fn clone(&self) -> Self {
        Self::new(self.value)
    }
}

impl Drop for Noisy {
    fn drop(&mut self) {
        DROPPED.with(|d| d.borrow_mut().push(self.id));
        let fail = DROP_BUDGET.with(|b| match b.get() {
            Some(0) => {
                b.set(None);
                true
            }
            Some(left) => {
                b.set(Some(left - 1));
                false
            }
            None => false,
        });
        assert!(!fail, "injected drop failure");
    }
}

impl Relocate for Noisy {
    type Strategy = ByCopy;
}

/// Clears the drop log and lifts any drop failure injection.
fn reset_drop_log() {
    DROPPED.with(|d| d.borrow_mut().clear());
    DROP_BUDGET.with(|b| b.set(None));
}

/// Lets `drops` more drops succeed, then panics once on the next one.
fn fail_drop_after(drops: usize) {
    DROP_BUDGET.with(|b| b.set(Some(drops)));
}

fn dropped_ids() -> Vec<usize> {
    DROPPED.with(|d| d.borrow().clone())
}

fn noisy(values: &[i32]) -> DynamicArray<Noisy> {
    values.iter().map(|&v| Noisy::new(v)).collect()
}

fn noisy_values(array: &DynamicArray<Noisy>) -> Vec<i32> {
    array.iter().map(|n| n.value).collect()
}

mod array;
