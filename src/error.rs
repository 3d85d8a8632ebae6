use std::alloc::Layout;
use std::error::Error;
use std::fmt;

/// Errors reported when storage for a [`RawBuffer`](crate::RawBuffer)
/// cannot be obtained.
///
/// Every `try_*` operation on [`DynamicArray`](crate::DynamicArray) returns
/// this error and leaves the array exactly as it was before the call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested capacity does not fit in `isize::MAX` bytes.
    CapacityOverflow,
    /// The global allocator could not satisfy the request.
    Exhausted {
        /// Layout that was passed to the allocator.
        layout: Layout,
    },
}

impl AllocError {
    /// Reports the error the way the std collections do: a panic for
    /// overflow, [`handle_alloc_error`](std::alloc::handle_alloc_error) for
    /// an exhausted allocator.
    #[track_caller]
    pub(crate) fn raise(self) -> ! {
        match self {
            Self::CapacityOverflow => panic!("capacity overflow"),
            Self::Exhausted { layout } => std::alloc::handle_alloc_error(layout),
        }
    }
}

/// Unwraps the result of a fallible allocation, raising on failure.
#[track_caller]
pub(crate) fn or_raise<V>(result: Result<V, AllocError>) -> V {
    match result {
        Ok(value) => value,
        Err(err) => err.raise(),
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow => write!(f, "capacity overflow"),
            Self::Exhausted { layout } => {
                write!(
                    f,
                    "allocation of {} bytes (align {}) failed",
                    layout.size(),
                    layout.align()
                )
            }
        }
    }
}

impl Error for AllocError {}
