use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use crate::RawBuffer;

/// Owning iterator over the elements of a
/// [`DynamicArray`](crate::DynamicArray).
///
/// Created by `DynamicArray::into_iter`. Takes over the array's buffer;
/// elements not yielded are dropped together with the iterator.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    /// Next slot to yield from the front.
    front: usize,
    /// One past the next slot to yield from the back.
    back: usize,
}

impl<T> IntoIter<T> {
    /// Wraps a buffer whose slots `..len` are live.
    pub(crate) const fn new(buf: RawBuffer<T>, len: usize) -> Self {
        Self {
            buf,
            front: 0,
            back: len,
        }
    }

    /// Returns the elements not yet yielded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots front..back are live and front <= back <= capacity.
        unsafe { slice::from_raw_parts(self.buf.slot(self.front), self.back - self.front) }
    }

    /// Returns the elements not yet yielded, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`; `&mut self` makes access exclusive.
        unsafe { slice::from_raw_parts_mut(self.buf.slot(self.front), self.back - self.front) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        // SAFETY: front < back, so the slot is live; advancing `front`
        // hands its ownership to the caller.
        let value = unsafe { self.buf.slot(self.front).read() };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        // SAFETY: back was live before the decrement above.
        Some(unsafe { self.buf.slot(self.back).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: remaining slots are live; the buffer itself is released
        // by RawBuffer's Drop afterwards.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}
