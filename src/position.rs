use std::marker::PhantomData;

/// Position of a slot in a [`DynamicArray`](crate::DynamicArray).
///
/// Obtained from [`DynamicArray::begin`](crate::DynamicArray::begin),
/// [`DynamicArray::end`](crate::DynamicArray::end), or returned by
/// [`insert`](crate::DynamicArray::insert) and
/// [`erase`](crate::DynamicArray::erase). Positions walk forward with
/// [`next`](Position::next) or `+ n`, and implement [`Copy`].
///
/// A position is invalidated by any operation that reallocates or shifts
/// storage. It does not borrow the array, so using a stale position is
/// caught by the array's bounds checks rather than dereferencing freed
/// memory.
///
/// # Example
///
/// ```
/// use advanced_vector::DynamicArray;
///
/// let array = DynamicArray::from([10, 20, 30]);
/// let mut pos = array.begin();
/// let mut seen = Vec::new();
/// while pos != array.end() {
///     seen.push(array[pos]);
///     pos = pos.next();
/// }
/// assert_eq!(seen, [10, 20, 30]);
/// ```
pub struct Position<T> {
    offset: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Position<T> {
    /// Creates a position at `offset` slots from the beginning.
    #[must_use]
    pub const fn from_offset(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    /// Returns the distance from the beginning.
    #[must_use]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Returns the position one slot further.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::from_offset(self.offset + 1)
    }
}

impl<T> Clone for Position<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Position<T> {}

impl<T> PartialEq for Position<T> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<T> Eq for Position<T> {}

impl<T> std::hash::Hash for Position<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl<T> std::fmt::Debug for Position<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Position({})", self.offset)
    }
}

impl<T> PartialOrd for Position<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Position<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.offset.cmp(&other.offset)
    }
}

impl<T> std::ops::Add<usize> for Position<T> {
    type Output = Self;

    fn add(self, rhs: usize) -> Self {
        Self::from_offset(self.offset + rhs)
    }
}

impl<T> std::ops::Sub for Position<T> {
    type Output = usize;

    /// Distance between two positions.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` lies after `self`.
    fn sub(self, rhs: Self) -> usize {
        self.offset
            .checked_sub(rhs.offset)
            .unwrap_or_else(|| panic!("position {} precedes {}", self.offset, rhs.offset))
    }
}
