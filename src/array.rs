use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::{cmp, fmt, ptr, slice};

use crate::error::or_raise;
use crate::guard::{DropGuard, clone_slots, fill_slots};
use crate::{AllocError, IntoIter, Position, RawBuffer, Relocate, Relocation, RelocationKind};

/// Growable contiguous array built directly on a [`RawBuffer`].
///
/// Slots `..len()` always hold live elements and slots
/// `len()..capacity()` are uninitialized. Every operation either restores
/// that invariant before returning or, when it fails, leaves it as it was.
///
/// Operations that carry existing elements to new slots require
/// [`T: Relocate`](Relocate), which selects moving or cloning. Growth
/// doubles the capacity, starting at 1.
///
/// # Example
///
/// ```
/// use advanced_vector::DynamicArray;
///
/// let mut array = DynamicArray::new();
/// array.push_back(1);
/// array.push_back(2);
/// array.push_back(3);
/// assert_eq!(array.capacity(), 4);
///
/// array.insert(array.begin() + 1, 9);
/// assert_eq!(array, [1, 9, 2, 3]);
///
/// array.erase(array.begin() + 2);
/// array.pop_back();
/// assert_eq!(array, [1, 9]);
/// ```
///
/// # Failure
///
/// Allocation failures surface as [`AllocError`] from the `try_*` methods;
/// their panicking counterparts behave like the std collections. Element
/// constructors (`Clone`, `Default`, emplace closures) report failure by
/// panicking; the array drops anything half-built and, for every
/// reallocating operation and every insertion, is observably unchanged
/// once the panic propagates.
pub struct DynamicArray<T> {
    buf: RawBuffer<T>,
    len: usize,
}

impl<T> DynamicArray<T> {
    /// Creates an empty array without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates an empty array with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if the allocator fails.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        or_raise(Self::try_with_capacity(capacity))
    }

    /// Fallible [`with_capacity`](Self::with_capacity).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            buf: RawBuffer::allocate(capacity)?,
            len: 0,
        })
    }

    /// Returns the number of live elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots backed by storage.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the live elements as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: slots ..len are live; the pointer is non-null and aligned
        // even when nothing is allocated.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[must_use]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` makes access exclusive.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Returns a pointer to the first slot.
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Position of the first element.
    #[must_use]
    pub const fn begin(&self) -> Position<T> {
        Position::from_offset(0)
    }

    /// Position one past the last element.
    #[must_use]
    pub const fn end(&self) -> Position<T> {
        Position::from_offset(self.len)
    }

    /// Returns the element at `pos`, or `None` past the end.
    #[must_use]
    pub fn at(&self, pos: Position<T>) -> Option<&T> {
        self.as_slice().get(pos.offset())
    }

    /// Returns the element at `pos` mutably, or `None` past the end.
    #[must_use]
    pub fn at_mut(&mut self, pos: Position<T>) -> Option<&mut T> {
        self.as_mut_slice().get_mut(pos.offset())
    }

    /// Destroys the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty.
    pub fn pop_back(&mut self) {
        assert!(self.len > 0, "pop_back on empty array");
        self.len -= 1;
        // SAFETY: the slot was live and is no longer reachable through len.
        unsafe { ptr::drop_in_place(self.buf.slot(self.len)) }
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live; ownership moves to the caller.
        Some(unsafe { self.buf.slot(self.len).read() })
    }

    /// Destroys the elements from `new_len` onwards.
    ///
    /// No-op if `new_len >= len()`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        // SAFETY: new_len < len, so the tail is live. `len` shrinks first so
        // a panicking destructor cannot expose dropped slots.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.buf.slot(new_len), self.len - new_len);
            self.len = new_len;
            ptr::drop_in_place(tail);
        }
    }

    /// Destroys every element, keeping the storage.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges contents with `other` in O(1).
    pub const fn swap_with(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves the contents out, leaving `self` empty with no storage.
    #[must_use]
    pub const fn take(&mut self) -> Self {
        let len = self.len;
        self.len = 0;
        Self {
            buf: self.buf.take(),
            len,
        }
    }

    /// Appends `value` without checking capacity.
    ///
    /// # Safety
    ///
    /// `len() < capacity()`.
    unsafe fn push_unchecked(&mut self, value: T) {
        // SAFETY: the caller guarantees slot `len` is spare capacity.
        unsafe { self.buf.slot(self.len).write(value) };
        self.len += 1;
    }
}

impl<T: Default> DynamicArray<T> {
    /// Creates an array of `len` default-constructed elements with capacity
    /// exactly `len`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or `T::default` panics; aborts if
    /// the allocator fails.
    #[must_use]
    pub fn with_len(len: usize) -> Self {
        or_raise(Self::try_with_len(len))
    }

    /// Fallible [`with_len`](Self::with_len).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer.
    pub fn try_with_len(len: usize) -> Result<Self, AllocError> {
        let mut buf = RawBuffer::<T>::allocate(len)?;
        // SAFETY: the fresh buffer has `len` uninitialized slots.
        unsafe { fill_slots(buf.as_mut_ptr(), len, T::default) };
        Ok(Self { buf, len })
    }
}

impl<T: Relocate> DynamicArray<T> {
    /// Ensures capacity for at least `new_capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if the allocator fails.
    pub fn reserve(&mut self, new_capacity: usize) {
        or_raise(self.try_reserve(new_capacity));
    }

    /// Ensures capacity for at least `new_capacity` elements.
    ///
    /// No-op when `new_capacity <= capacity()`. Otherwise allocates exactly
    /// `new_capacity` slots and relocates the elements in order. If a clone
    /// panics during relocation the copies are dropped and the array keeps
    /// its old buffer. The originals are released only after the new buffer
    /// is adopted, so a panicking destructor at that point leaves the array
    /// holding the relocated elements.
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; the array is
    /// unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let mut fresh = RawBuffer::<T>::allocate(new_capacity)?;
        let len = self.len;
        // SAFETY: slots ..len are live and `fresh` has at least len spare
        // slots. On unwind `transfer` drops its own copies and `fresh` is
        // released untouched.
        unsafe { <T::Strategy as Relocation<T>>::transfer(self.buf.as_ptr(), fresh.as_mut_ptr(), len) };
        log::trace!(
            "relocated {len} elements: capacity {} -> {new_capacity}",
            self.capacity()
        );
        self.buf.swap(&mut fresh);
        // SAFETY: `fresh` now holds the retired block, whose slots ..len were
        // the transfer source. The array already owns the relocated values,
        // so a panicking destructor here can only leak.
        unsafe { <T::Strategy as Relocation<T>>::release(fresh.as_mut_ptr(), len) };
        Ok(())
    }

    /// Changes the length to `new_len`, default-constructing new elements.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or `T::default` panics; aborts if
    /// the allocator fails.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        or_raise(self.try_resize_with(new_len, T::default));
    }

    /// Fallible [`resize`](Self::resize).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer.
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), AllocError>
    where
        T: Default,
    {
        self.try_resize_with(new_len, T::default)
    }

    /// Changes the length to `new_len`, building new elements with `make`.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or `make` panics; aborts if the
    /// allocator fails.
    pub fn resize_with(&mut self, new_len: usize, make: impl FnMut() -> T) {
        or_raise(self.try_resize_with(new_len, make));
    }

    /// Changes the length to `new_len`.
    ///
    /// Shrinking destroys the trailing elements. Growing reserves exactly
    /// `new_len` slots if needed, then constructs the new tail; if `make`
    /// panics the tail built so far is dropped and the length is unchanged
    /// (capacity may have grown).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; the array is
    /// unchanged.
    pub fn try_resize_with(
        &mut self,
        new_len: usize,
        make: impl FnMut() -> T,
    ) -> Result<(), AllocError> {
        match new_len.cmp(&self.len) {
            cmp::Ordering::Equal => {}
            cmp::Ordering::Less => self.truncate(new_len),
            cmp::Ordering::Greater => {
                self.try_reserve(new_len)?;
                // SAFETY: capacity >= new_len, so len..new_len is spare.
                unsafe { fill_slots(self.buf.slot(self.len), new_len - self.len, make) };
                self.len = new_len;
            }
        }
        Ok(())
    }

    /// Appends `value`, returning a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows; aborts if the allocator fails.
    pub fn push_back(&mut self, value: T) -> &mut T {
        or_raise(self.try_push_back(value))
    }

    /// Fallible [`push_back`](Self::push_back).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; `value` is dropped
    /// and the array is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<&mut T, AllocError> {
        self.try_emplace_back(move || value)
    }

    /// Appends the element built by `make`, returning a reference to it.
    ///
    /// # Panics
    ///
    /// Panics if the capacity overflows or `make` panics; aborts if the
    /// allocator fails.
    pub fn emplace_back(&mut self, make: impl FnOnce() -> T) -> &mut T {
        or_raise(self.try_emplace_back(make))
    }

    /// Fallible [`emplace_back`](Self::emplace_back).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; `make` is not
    /// called.
    pub fn try_emplace_back(&mut self, make: impl FnOnce() -> T) -> Result<&mut T, AllocError> {
        let end = self.end();
        let index = self.try_emplace(end, make)?.offset();
        // SAFETY: the element at `index` was just constructed.
        Ok(unsafe { &mut *self.buf.slot(index) })
    }

    /// Inserts `value` at `pos`, shifting later elements toward the end.
    ///
    /// Returns the position of the new element.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the end or the capacity overflows; aborts
    /// if the allocator fails.
    pub fn insert(&mut self, pos: Position<T>, value: T) -> Position<T> {
        or_raise(self.try_insert(pos, value))
    }

    /// Fallible [`insert`](Self::insert).
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; `value` is dropped
    /// and the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the end.
    pub fn try_insert(&mut self, pos: Position<T>, value: T) -> Result<Position<T>, AllocError> {
        self.try_emplace(pos, move || value)
    }

    /// Inserts the element built by `make` at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the end, the capacity overflows, or `make`
    /// panics; aborts if the allocator fails.
    pub fn emplace(&mut self, pos: Position<T>, make: impl FnOnce() -> T) -> Position<T> {
        or_raise(self.try_emplace(pos, make))
    }

    /// Inserts the element built by `make` at `pos`.
    ///
    /// With spare capacity the element is built first and then placed,
    /// shifting `pos..len()` toward the end. Without it, a buffer of double
    /// the capacity (1 when empty) is allocated, the element is built into
    /// its final slot, and the prefix and suffix are relocated around it.
    /// If `make` or a relocating clone panics, everything built for the
    /// call is dropped and the array is unchanged.
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer; `make` is not
    /// called and the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `pos` lies past the end.
    pub fn try_emplace(
        &mut self,
        pos: Position<T>,
        make: impl FnOnce() -> T,
    ) -> Result<Position<T>, AllocError> {
        let index = pos.offset();
        assert!(
            index <= self.len,
            "insertion position {index} beyond length {}",
            self.len
        );

        if self.len == self.capacity() {
            self.emplace_reallocating(index, make)?;
        } else if index == self.len {
            let value = make();
            // SAFETY: len < capacity.
            unsafe { self.push_unchecked(value) };
        } else {
            let value = make();
            // SAFETY: index < len < capacity.
            unsafe {
                <T::Strategy as Relocation<T>>::insert_within(
                    self.buf.as_mut_ptr(),
                    index,
                    &mut self.len,
                    value,
                );
            }
        }
        Ok(Position::from_offset(index))
    }

    fn emplace_reallocating(
        &mut self,
        index: usize,
        make: impl FnOnce() -> T,
    ) -> Result<(), AllocError> {
        let new_capacity = grown_capacity(self.capacity())?;
        let mut fresh = RawBuffer::<T>::allocate(new_capacity)?;
        let len = self.len;
        let copies = <T::Strategy as Relocation<T>>::KIND == RelocationKind::Copy;

        // SAFETY: `fresh` has len + 1 spare slots. Moved ranges are never
        // rolled back: nothing after a bitwise move can unwind.
        unsafe {
            let src = self.buf.as_ptr();
            let dst = fresh.as_mut_ptr();

            dst.add(index).write(make());
            let placed = DropGuard::new(dst.add(index), 1);

            <T::Strategy as Relocation<T>>::transfer(src, dst, index);
            let prefix = DropGuard::new(dst, if copies { index } else { 0 });

            <T::Strategy as Relocation<T>>::transfer(
                src.add(index),
                dst.add(index + 1),
                len - index,
            );

            prefix.disarm();
            placed.disarm();
        }

        log::trace!(
            "grew to insert at {index}: {len} elements, capacity {} -> {new_capacity}",
            self.capacity()
        );
        self.buf.swap(&mut fresh);
        self.len = len + 1;
        // SAFETY: `fresh` holds the retired block and its slots ..len were
        // the transfer source. Released only after the new buffer is
        // committed.
        unsafe { <T::Strategy as Relocation<T>>::release(fresh.as_mut_ptr(), len) };
        Ok(())
    }

    /// Removes the element at `pos`, shifting later elements toward the
    /// beginning.
    ///
    /// Returns the position now holding the element that followed the
    /// removed one.
    ///
    /// # Panics
    ///
    /// Panics if `pos` does not refer to an element.
    pub fn erase(&mut self, pos: Position<T>) -> Position<T> {
        let index = pos.offset();
        assert!(
            index < self.len,
            "erase position {index} out of bounds for length {}",
            self.len
        );
        // SAFETY: index < len.
        unsafe {
            <T::Strategy as Relocation<T>>::remove_within(self.buf.as_mut_ptr(), index, &mut self.len);
        }
        pos
    }
}

impl<T: Clone> DynamicArray<T> {
    /// Fallible [`clone`](Clone::clone).
    ///
    /// The copy's capacity equals `len()`.
    ///
    /// # Errors
    ///
    /// Returns the [`AllocError`] reported by the buffer.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        let mut buf = RawBuffer::<T>::allocate(self.len)?;
        // SAFETY: slots ..len are live; the fresh buffer has len spare slots.
        unsafe { clone_slots(self.buf.as_ptr(), buf.as_mut_ptr(), self.len) };
        Ok(Self { buf, len: self.len })
    }
}

/// Capacity after one growth step.
fn grown_capacity(capacity: usize) -> Result<usize, AllocError> {
    if capacity == 0 {
        Ok(1)
    } else {
        capacity.checked_mul(2).ok_or(AllocError::CapacityOverflow)
    }
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: slots ..len are live; RawBuffer's Drop then releases the
        // block.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> Default for DynamicArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for DynamicArray<T> {
    fn clone(&self) -> Self {
        or_raise(self.try_clone())
    }

    /// Copy-assigns from `source`.
    ///
    /// If `source` does not fit in the current capacity, a full copy is
    /// built and swapped in, so a panicking clone leaves `self` unchanged.
    /// Otherwise the storage is reused: the common prefix is assigned with
    /// [`Clone::clone_from`], then excess elements are dropped or the rest
    /// of `source` is cloned in after the current end.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        let common = cmp::min(self.len, source.len);
        self.as_mut_slice()[..common].clone_from_slice(&source.as_slice()[..common]);
        if self.len > source.len {
            self.truncate(source.len);
        } else {
            // SAFETY: source.len <= capacity, so len..source.len is spare;
            // the source slots len..source.len are live.
            unsafe {
                clone_slots(
                    source.buf.slot(self.len),
                    self.buf.slot(self.len),
                    source.len - self.len,
                );
            }
            self.len = source.len;
        }
    }
}

impl<T> Deref for DynamicArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynamicArray<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynamicArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynamicArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> std::ops::Index<usize> for DynamicArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> std::ops::IndexMut<usize> for DynamicArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> std::ops::Index<Position<T>> for DynamicArray<T> {
    type Output = T;

    fn index(&self, pos: Position<T>) -> &T {
        &self.as_slice()[pos.offset()]
    }
}

impl<T> std::ops::IndexMut<Position<T>> for DynamicArray<T> {
    fn index_mut(&mut self, pos: Position<T>) -> &mut T {
        &mut self.as_mut_slice()[pos.offset()]
    }
}

impl<T: fmt::Debug> fmt::Debug for DynamicArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U> PartialEq<DynamicArray<U>> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &DynamicArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynamicArray<T> {}

impl<T, U> PartialEq<[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynamicArray<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: std::hash::Hash> std::hash::Hash for DynamicArray<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: Relocate> Extend<T> for DynamicArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        let wanted = self.len.saturating_add(lower);
        self.reserve(wanted);
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T: Relocate> FromIterator<T> for DynamicArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}

impl<T, const N: usize> From<[T; N]> for DynamicArray<T> {
    fn from(values: [T; N]) -> Self {
        let mut array = Self::with_capacity(N);
        for value in values {
            // SAFETY: capacity is N and exactly N values are pushed.
            unsafe { array.push_unchecked(value) };
        }
        array
    }
}

impl<'a, T> IntoIterator for &'a DynamicArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynamicArray<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        IntoIter::new(this.buf.take(), len)
    }
}

impl<T> Relocate for DynamicArray<T> {
    type Strategy = crate::ByMove;
}
