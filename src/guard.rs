//! Scoped rollback for multi-step slot operations.
//!
//! Each guard describes what to undo if the step in progress unwinds. A
//! guard is disarmed once the operation commits.

use std::mem;
use std::ptr;

/// Drops a contiguous run of constructed slots unless disarmed.
pub(crate) struct DropGuard<T> {
    start: *mut T,
    len: usize,
}

impl<T> DropGuard<T> {
    /// Guards `len` already constructed slots starting at `start`.
    pub(crate) const fn new(start: *mut T, len: usize) -> Self {
        Self { start, len }
    }

    /// Extends the guarded run by one freshly constructed slot.
    pub(crate) const fn push(&mut self) {
        self.len += 1;
    }

    /// Commits: the guarded slots stay alive.
    pub(crate) fn disarm(self) {
        mem::forget(self);
    }
}

impl<T> Drop for DropGuard<T> {
    fn drop(&mut self) {
        // SAFETY: the guard only ever covers slots constructed by the
        // operation that owns it, none of which were handed out yet.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.start, self.len)) }
    }
}

/// Restores a back-to-front shift interrupted by a panicking clone.
///
/// While armed, `base[hole]` is live and for every `k` in `hole..end` the
/// original value of slot `k` sits in slot `k + 1`. Undoing drops the value
/// at `hole` and moves `hole + 1..=end` down by one, leaving slot `end`
/// uninitialized again.
pub(crate) struct ShiftGuard<T> {
    base: *mut T,
    hole: usize,
    end: usize,
}

impl<T> ShiftGuard<T> {
    /// Arms the guard right after the last element was duplicated into the
    /// free slot `end`.
    pub(crate) const fn new(base: *mut T, end: usize) -> Self {
        Self {
            base,
            hole: end - 1,
            end,
        }
    }

    /// Slot about to be overwritten by its predecessor.
    pub(crate) const fn hole(&self) -> usize {
        self.hole
    }

    /// Records that slot `hole` now holds its predecessor's value.
    pub(crate) const fn step(&mut self) {
        self.hole -= 1;
    }

    pub(crate) fn disarm(self) {
        mem::forget(self);
    }
}

impl<T> Drop for ShiftGuard<T> {
    fn drop(&mut self) {
        // SAFETY: see the type-level invariant; all slots touched lie in
        // `hole..=end`, which the shifting operation owns.
        unsafe {
            let at = self.base.add(self.hole);
            ptr::drop_in_place(at);
            ptr::copy(at.add(1), at, self.end - self.hole);
        }
    }
}

/// Clone-constructs `dst[..count]` from `src[..count]`.
///
/// If a clone panics, the copies made so far are dropped and `dst` is left
/// uninitialized.
///
/// # Safety
///
/// `src[..count]` must be live, `dst[..count]` writable and uninitialized,
/// and the two ranges must not overlap.
pub(crate) unsafe fn clone_slots<T: Clone>(src: *const T, dst: *mut T, count: usize) {
    let mut guard = DropGuard::new(dst, 0);
    for i in 0..count {
        // SAFETY: i < count, per the caller's contract.
        unsafe { dst.add(i).write((*src.add(i)).clone()) };
        guard.push();
    }
    guard.disarm();
}

/// Constructs `dst[..count]` from successive calls to `make`.
///
/// If `make` panics, the values built so far are dropped.
///
/// # Safety
///
/// `dst[..count]` must be writable and uninitialized.
pub(crate) unsafe fn fill_slots<T>(dst: *mut T, count: usize, mut make: impl FnMut() -> T) {
    let mut guard = DropGuard::new(dst, 0);
    for i in 0..count {
        // SAFETY: i < count, per the caller's contract.
        unsafe { dst.add(i).write(make()) };
        guard.push();
    }
    guard.disarm();
}
