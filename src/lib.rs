//! Growable contiguous array with explicit raw storage.
//!
//! `advanced-vector` provides [`DynamicArray<T>`], a vector built in two
//! layers:
//!
//! - [`RawBuffer<T>`]: exclusively owned uninitialized storage; allocates
//!   and releases, never constructs or drops an element
//! - [`DynamicArray<T>`]: a `RawBuffer` plus a length; owns every element
//!   lifecycle step: construction, relocation, shifting, destruction
//!
//! # Key properties
//!
//! - **Amortized O(1) append**: capacity doubles, starting at 1
//! - **Move-or-copy relocation**: [`Relocate`] picks [`ByMove`] or
//!   [`ByCopy`] per element type, at compile time
//! - **Strong guarantee**: a panicking constructor or clone during a
//!   reallocation or insertion leaves the array exactly as it was
//! - **Fallible allocation**: every growing operation has a `try_*` form
//!   returning [`AllocError`]
//!
//! # Example
//!
//! ```
//! use advanced_vector::DynamicArray;
//!
//! let mut names: DynamicArray<String> = DynamicArray::new();
//! names.push_back(String::from("ada"));
//! names.push_back(String::from("grace"));
//!
//! let pos = names.insert(names.begin(), String::from("alan"));
//! assert_eq!(names[pos], "alan");
//! assert_eq!(names, ["alan", "ada", "grace"]);
//!
//! names.reserve(16);
//! assert_eq!(names.capacity(), 16);
//! assert_eq!(names.len(), 3);
//! ```

#![deny(missing_docs)]

mod array;
mod error;
mod guard;
mod iter;
mod position;
mod raw_buffer;
mod relocate;

pub use array::DynamicArray;
pub use error::AllocError;
pub use iter::IntoIter;
pub use position::Position;
pub use raw_buffer::RawBuffer;
pub use relocate::{ByCopy, ByMove, Relocate, Relocation, RelocationKind};

#[cfg(test)]
mod tests;
