use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::ffi::{CString, OsString};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::ptr;
use std::rc::{self, Rc};
use std::sync::{self, Arc};

use crate::guard::{ShiftGuard, clone_slots};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::ByMove {}
    impl Sealed for super::ByCopy {}
}

/// Path an element takes when the array reorganises its storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelocationKind {
    /// Bitwise move. The source slot is left logically uninitialized.
    Move,
    /// Clone into the destination. The source stays live until released,
    /// so a failure partway can be undone by dropping the copies.
    Copy,
}

/// Element types that can live in a growing [`DynamicArray`](crate::DynamicArray).
///
/// The associated [`Strategy`](Relocate::Strategy) decides how existing
/// elements are carried over when storage is reallocated or shifted:
///
/// - [`ByMove`]: a bitwise move. Cannot fail, never clones.
/// - [`ByCopy`]: a clone followed by dropping the original. Requires
///   [`Clone`]. Every clone is observable and may panic; the array undoes
///   partial work so reallocating operations keep the strong guarantee.
///
/// Primitives, tuples and the common std containers relocate by move. Other types
/// opt in with an impl or the [`relocate_by_move!`](crate::relocate_by_move)
/// macro.
///
/// # Example
///
/// ```
/// use advanced_vector::{ByCopy, DynamicArray, Relocate};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Entry(Vec<u64>);
///
/// impl Relocate for Entry {
///     type Strategy = ByCopy;
/// }
///
/// let mut entries = DynamicArray::new();
/// entries.push_back(Entry(vec![1]));
/// entries.push_back(Entry(vec![2]));
/// assert_eq!(entries[1], Entry(vec![2]));
/// ```
pub trait Relocate: Sized {
    /// Either [`ByMove`] or [`ByCopy`].
    type Strategy: Relocation<Self>;
}

/// Relocation primitives behind a [`Relocate::Strategy`].
///
/// Sealed: implemented only by [`ByMove`] and [`ByCopy`].
pub trait Relocation<T>: sealed::Sealed {
    /// Which path this strategy takes.
    const KIND: RelocationKind;

    /// Constructs `dst[..count]` from `src[..count]`.
    ///
    /// Afterwards the source slots are still live for
    /// [`RelocationKind::Copy`] and moved-from otherwise; either way
    /// [`release`](Self::release) finishes the job. If a clone panics, the
    /// copies made so far are dropped and `src` is untouched.
    ///
    /// # Safety
    ///
    /// `src[..count]` must be live, `dst[..count]` writable and
    /// uninitialized, and the ranges must not overlap.
    unsafe fn transfer(src: *const T, dst: *mut T, count: usize);

    /// Retires source slots after a successful [`transfer`](Self::transfer).
    ///
    /// # Safety
    ///
    /// `src[..count]` must be the source of a completed transfer.
    unsafe fn release(src: *mut T, count: usize);

    /// Places `value` at `pos`, shifting `pos..len` one slot toward the end
    /// and incrementing `len`.
    ///
    /// If a clone panics, slots `..len` hold their original values again,
    /// slot `len` is uninitialized and `len` is unchanged. Values are
    /// restored, not objects: for [`ByCopy`] the slot where the shift
    /// stopped may now hold a clone in place of the element it replaced.
    ///
    /// # Safety
    ///
    /// Slots `..len` must be live, slot `len` writable and uninitialized,
    /// and `pos < len`.
    unsafe fn insert_within(base: *mut T, pos: usize, len: &mut usize, value: T);

    /// Destroys the element at `pos`, shifting `pos + 1..len` one slot toward
    /// the beginning and decrementing `len`.
    ///
    /// If a clone panics, every slot below `len` is still live and `len` is
    /// unchanged, but values already shifted stay shifted.
    ///
    /// # Safety
    ///
    /// Slots `..len` must be live and `pos < len`.
    unsafe fn remove_within(base: *mut T, pos: usize, len: &mut usize);
}

/// Relocate with bitwise moves.
#[derive(Debug)]
pub enum ByMove {}

/// Relocate by cloning, then dropping the originals.
#[derive(Debug)]
pub enum ByCopy {}

impl<T> Relocation<T> for ByMove {
    const KIND: RelocationKind = RelocationKind::Move;

    unsafe fn transfer(src: *const T, dst: *mut T, count: usize) {
        // SAFETY: caller guarantees both ranges are valid and disjoint.
        unsafe { ptr::copy_nonoverlapping(src, dst, count) }
    }

    unsafe fn release(_src: *mut T, _count: usize) {}

    unsafe fn insert_within(base: *mut T, pos: usize, len: &mut usize, value: T) {
        let end = *len;
        // SAFETY: pos < end and slot `end` is spare capacity.
        unsafe {
            let at = base.add(pos);
            ptr::copy(at, at.add(1), end - pos);
            at.write(value);
        }
        *len = end + 1;
    }

    unsafe fn remove_within(base: *mut T, pos: usize, len: &mut usize) {
        let end = *len;
        // SAFETY: pos < end; the removed value is read out before its slot
        // is overwritten, and `len` shrinks before it is dropped.
        unsafe {
            let at = base.add(pos);
            let removed = at.read();
            ptr::copy(at.add(1), at, end - pos - 1);
            *len = end - 1;
            drop(removed);
        }
    }
}

impl<T: Clone> Relocation<T> for ByCopy {
    const KIND: RelocationKind = RelocationKind::Copy;

    unsafe fn transfer(src: *const T, dst: *mut T, count: usize) {
        // SAFETY: forwarded from the caller.
        unsafe { clone_slots(src, dst, count) }
    }

    unsafe fn release(src: *mut T, count: usize) {
        // SAFETY: the transfer left `src[..count]` live.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(src, count)) }
    }

    unsafe fn insert_within(base: *mut T, pos: usize, len: &mut usize, value: T) {
        let end = *len;
        // SAFETY: pos < end, so slot `end - 1` is live and `end` is spare.
        // The shift guard restores the original layout if a clone unwinds.
        unsafe {
            base.add(end).write((*base.add(end - 1)).clone());
            let mut shift = ShiftGuard::new(base, end);
            while shift.hole() > pos {
                let i = shift.hole();
                (*base.add(i)).clone_from(&*base.add(i - 1));
                shift.step();
            }
            shift.disarm();
            *len = end + 1;
            *base.add(pos) = value;
        }
    }

    unsafe fn remove_within(base: *mut T, pos: usize, len: &mut usize) {
        let end = *len;
        // SAFETY: pos < end; every slot below `end` stays live until the
        // last one is dropped after `len` shrinks.
        unsafe {
            for i in pos..end - 1 {
                (*base.add(i)).clone_from(&*base.add(i + 1));
            }
            *len = end - 1;
            ptr::drop_in_place(base.add(end - 1));
        }
    }
}

/// Implements [`Relocate`] with [`ByMove`] for each listed type.
///
/// ```
/// use advanced_vector::{relocate_by_move, DynamicArray};
///
/// struct Handle(u32);
/// relocate_by_move!(Handle);
///
/// let mut handles = DynamicArray::new();
/// handles.push_back(Handle(7));
/// assert_eq!(handles[0].0, 7);
/// ```
#[macro_export]
macro_rules! relocate_by_move {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Relocate for $ty {
                type Strategy = $crate::ByMove;
            }
        )+
    };
}

relocate_by_move!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    PathBuf,
    OsString,
    CString,
);

impl<T: ?Sized> Relocate for &T {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for Box<T> {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for Rc<T> {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for Arc<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for Vec<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for Option<T> {
    type Strategy = ByMove;
}

impl<T, const N: usize> Relocate for [T; N] {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for &mut T {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for rc::Weak<T> {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for sync::Weak<T> {
    type Strategy = ByMove;
}

impl<B: ToOwned + ?Sized> Relocate for Cow<'_, B> {
    type Strategy = ByMove;
}

impl<T, E> Relocate for Result<T, E> {
    type Strategy = ByMove;
}

impl<T: ?Sized> Relocate for PhantomData<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for Cell<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for RefCell<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for VecDeque<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for LinkedList<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for BinaryHeap<T> {
    type Strategy = ByMove;
}

impl<T> Relocate for BTreeSet<T> {
    type Strategy = ByMove;
}

impl<K, V> Relocate for BTreeMap<K, V> {
    type Strategy = ByMove;
}

impl<T, S> Relocate for HashSet<T, S> {
    type Strategy = ByMove;
}

impl<K, V, S> Relocate for HashMap<K, V, S> {
    type Strategy = ByMove;
}

macro_rules! relocate_tuples {
    ($(($($name:ident),+)),+ $(,)?) => {
        $(
            impl<$($name),+> Relocate for ($($name,)+) {
                type Strategy = ByMove;
            }
        )+
    };
}

relocate_tuples!(
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
    (A, B, C, D, E),
    (A, B, C, D, E, F),
    (A, B, C, D, E, F, G),
    (A, B, C, D, E, F, G, H),
    (A, B, C, D, E, F, G, H, I),
    (A, B, C, D, E, F, G, H, I, J),
    (A, B, C, D, E, F, G, H, I, J, K),
    (A, B, C, D, E, F, G, H, I, J, K, L),
);
