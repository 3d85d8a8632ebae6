use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use crate::AllocError;

/// Exclusively owned block of uninitialized storage for `T` values.
///
/// A `RawBuffer` only reserves memory. It never constructs, reads or drops
/// an element: which slots hold live values is tracked by its owner (see
/// [`DynamicArray`](crate::DynamicArray)). Dropping the buffer releases the
/// block and nothing else.
///
/// Zero-sized types never allocate; their buffers report a capacity of
/// `usize::MAX`.
///
/// # Example
///
/// ```
/// use advanced_vector::RawBuffer;
///
/// let mut buf = RawBuffer::<u64>::allocate(4).unwrap();
/// assert_eq!(buf.capacity(), 4);
///
/// let moved = buf.take();
/// assert_eq!(moved.capacity(), 4);
/// assert_eq!(buf.capacity(), 0);
/// ```
pub struct RawBuffer<T> {
    /// Start of the block, dangling when nothing is allocated.
    ptr: NonNull<T>,
    /// Number of slots the block can hold.
    cap: usize,
    _marker: PhantomData<T>,
}

// SAFETY: RawBuffer uniquely owns its block; sending or sharing it is as
// safe as sending or sharing the `T` values its owner places there.
unsafe impl<T: Send> Send for RawBuffer<T> {}
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> RawBuffer<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Creates an empty buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            _marker: PhantomData,
        }
    }

    /// Allocates uninitialized storage for `capacity` elements.
    ///
    /// No allocation happens for `capacity == 0` or zero-sized `T`.
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::CapacityOverflow`] if the block would exceed
    /// `isize::MAX` bytes and [`AllocError::Exhausted`] if the allocator
    /// fails.
    pub fn allocate(capacity: usize) -> Result<Self, AllocError> {
        if capacity == 0 || Self::IS_ZST {
            return Ok(Self::new());
        }

        let layout = Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?;
        // SAFETY: layout has non-zero size (capacity > 0, T is not zero-sized).
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(AllocError::Exhausted { layout })?;

        Ok(Self {
            ptr,
            cap: capacity,
            _marker: PhantomData,
        })
    }

    /// Returns the number of slots the buffer can hold.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a pointer to the first slot.
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns a mutable pointer to the first slot.
    #[must_use]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the address of slot `offset`.
    ///
    /// `offset == capacity` yields the one-past-the-end address, usable as
    /// an exclusive bound but never dereferenced.
    ///
    /// # Safety
    ///
    /// `offset` must not exceed [`capacity`](Self::capacity).
    #[must_use]
    pub unsafe fn slot(&self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.cap,
            "slot {offset} beyond capacity {}",
            self.cap
        );
        // SAFETY: offset <= cap keeps the result within (or one past) the block.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Exchanges blocks and capacities with `other`.
    pub const fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the block out, leaving `self` empty.
    #[must_use]
    pub const fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawBuffer({:p}, {})", self.ptr, self.cap)
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        if Self::IS_ZST || self.cap == 0 {
            return;
        }
        // SAFETY: the block was allocated by `allocate` with exactly this
        // layout, which was validated by `Layout::array` at that time.
        unsafe {
            let layout =
                Layout::from_size_align_unchecked(mem::size_of::<T>() * self.cap, mem::align_of::<T>());
            alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}
