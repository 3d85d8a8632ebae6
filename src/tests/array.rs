use std::borrow::Cow;
use std::cell::Cell;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::rc::Rc;

use super::Tracked;
use crate::{AllocError, DynamicArray, Position};

#[test]
fn empty_array() {
    let array: DynamicArray<i32> = DynamicArray::new();
    assert!(array.is_empty());
    assert_eq!(array.len(), 0);
    assert_eq!(array.capacity(), 0);
}

#[test]
fn default_is_empty() {
    let array: DynamicArray<u8> = DynamicArray::default();
    assert!(array.is_empty());
    assert_eq!(array.capacity(), 0);
}

#[test]
fn push_back_doubles_capacity() {
    let mut array = DynamicArray::new();
    let mut capacities = Vec::new();
    for i in 0..5 {
        array.push_back(i);
        capacities.push(array.capacity());
    }
    assert_eq!(capacities, [1, 2, 4, 4, 8]);
    assert_eq!(array, [0, 1, 2, 3, 4]);
}

#[test]
fn push_insert_erase_pop_scenario() {
    let mut array = DynamicArray::new();
    array.push_back(1);
    array.push_back(2);
    array.push_back(3);
    assert_eq!(array, [1, 2, 3]);
    assert_eq!(array.capacity(), 4);

    array.insert(array.begin() + 1, 9);
    assert_eq!(array, [1, 9, 2, 3]);

    array.erase(array.begin() + 2);
    assert_eq!(array, [1, 9, 3]);

    array.pop_back();
    assert_eq!(array, [1, 9]);
}

#[test]
fn push_back_returns_new_element() {
    let mut array = DynamicArray::new();
    *array.push_back(String::from("old")) = String::from("new");
    assert_eq!(array[0], "new");
}

#[test]
fn emplace_back_builds_in_place() {
    let mut array = DynamicArray::new();
    let value = array.emplace_back(|| vec![1, 2, 3]);
    value.push(4);
    assert_eq!(array[0], [1, 2, 3, 4]);
}

#[test]
fn insert_at_end_with_spare_capacity() {
    let mut array = DynamicArray::with_capacity(4);
    array.push_back(1);
    let pos = array.insert(array.end(), 2);
    assert_eq!(pos, Position::from_offset(1));
    assert_eq!(array, [1, 2]);
    assert_eq!(array.capacity(), 4);
}

#[test]
fn insert_mid_with_spare_capacity() {
    let mut array = DynamicArray::with_capacity(8);
    array.extend([1, 2, 3, 4]);
    let ptr = array.as_ptr();

    let pos = array.insert(array.begin() + 2, 10);
    assert_eq!(array[pos], 10);
    assert_eq!(array, [1, 2, 10, 3, 4]);
    assert_eq!(array.as_ptr(), ptr);
}

#[test]
fn insert_into_empty_allocates_one_slot() {
    let mut array = DynamicArray::new();
    array.insert(array.begin(), String::from("only"));
    assert_eq!(array.capacity(), 1);
    assert_eq!(array, ["only"]);
}

#[test]
fn insert_front_when_full_reallocates() {
    let mut array = DynamicArray::from([1, 2]);
    assert_eq!(array.capacity(), 2);

    let pos = array.insert(array.begin(), 0);
    assert_eq!(pos, array.begin());
    assert_eq!(array, [0, 1, 2]);
    assert_eq!(array.capacity(), 4);
}

#[test]
fn emplace_mid_sequence() {
    let mut array = DynamicArray::from([String::from("a"), String::from("c")]);
    array.emplace(array.begin() + 1, || "b".repeat(1));
    assert_eq!(array, ["a", "b", "c"]);
}

#[test]
fn insert_then_erase_restores_sequence() {
    let original = DynamicArray::from([String::from("x"), String::from("y"), String::from("z")]);
    for at in 0..=original.len() {
        let mut array = original.clone();
        let pos = array.insert(Position::from_offset(at), String::from("new"));
        array.erase(pos);
        assert_eq!(array, original);
    }
}

#[test]
fn erase_returns_following_position() {
    let mut array = DynamicArray::from([10, 20, 30]);
    let pos = array.erase(array.begin());
    assert_eq!(array[pos], 20);

    let last = array.begin() + 1;
    let pos = array.erase(last);
    assert_eq!(pos, array.end());
    assert_eq!(array, [20]);
}

#[test]
fn erase_keeps_capacity() {
    let mut array = DynamicArray::from([1, 2, 3, 4]);
    array.erase(array.begin() + 1);
    assert_eq!(array.capacity(), 4);
}

#[test]
#[should_panic(expected = "erase position 3 out of bounds for length 3")]
fn erase_at_end_panics() {
    let mut array = DynamicArray::from([1, 2, 3]);
    array.erase(array.end());
}

#[test]
#[should_panic(expected = "insertion position 4 beyond length 2")]
fn insert_past_end_panics() {
    let mut array = DynamicArray::from([1, 2]);
    array.insert(Position::from_offset(4), 3);
}

#[test]
#[should_panic(expected = "pop_back on empty array")]
fn pop_back_on_empty_panics() {
    let mut array: DynamicArray<i32> = DynamicArray::new();
    array.pop_back();
}

#[test]
#[should_panic(expected = "index out of bounds")]
fn stale_position_panics() {
    let mut array = DynamicArray::from([1, 2, 3]);
    let last = array.begin() + 2;
    array.pop_back();
    let _ = array[last];
}

#[test]
fn pop_returns_values_in_reverse() {
    let mut array = DynamicArray::from([1, 2]);
    assert_eq!(array.pop(), Some(2));
    assert_eq!(array.pop(), Some(1));
    assert_eq!(array.pop(), None);
}

#[test]
fn reserve_below_capacity_changes_nothing() {
    let mut array = DynamicArray::with_capacity(8);
    array.extend([1, 2, 3]);
    let ptr = array.as_ptr();

    array.reserve(2);
    array.reserve(8);
    assert_eq!(array.capacity(), 8);
    assert_eq!(array.len(), 3);
    assert_eq!(array.as_ptr(), ptr);
    assert_eq!(array, [1, 2, 3]);
}

#[test]
fn reserve_allocates_exactly() {
    let mut array = DynamicArray::from([String::from("a"), String::from("b")]);
    array.reserve(10);
    assert_eq!(array.capacity(), 10);
    assert_eq!(array, ["a", "b"]);
}

#[test]
fn try_reserve_overflow_leaves_array_unchanged() {
    let mut array = DynamicArray::from([1u64, 2]);
    assert_eq!(array.try_reserve(usize::MAX), Err(AllocError::CapacityOverflow));
    assert_eq!(array.capacity(), 2);
    assert_eq!(array, [1, 2]);
}

#[test]
fn try_with_capacity_overflow() {
    let result = DynamicArray::<u64>::try_with_capacity(usize::MAX);
    assert_eq!(result.unwrap_err(), AllocError::CapacityOverflow);
}

#[test]
fn with_len_default_constructs() {
    let array: DynamicArray<String> = DynamicArray::with_len(3);
    assert_eq!(array.len(), 3);
    assert_eq!(array.capacity(), 3);
    assert!(array.iter().all(String::is_empty));
}

#[test]
fn resize_grows_and_shrinks() {
    let mut array: DynamicArray<i32> = DynamicArray::new();
    array.resize(3);
    assert_eq!(array, [0, 0, 0]);
    assert_eq!(array.capacity(), 3);

    array[1] = 5;
    array.resize(2);
    assert_eq!(array, [0, 5]);
    assert_eq!(array.capacity(), 3);

    array.resize(2);
    assert_eq!(array, [0, 5]);
}

#[test]
fn resize_within_capacity_keeps_buffer() {
    let mut array: DynamicArray<i32> = DynamicArray::with_capacity(10);
    let ptr = array.as_ptr();
    array.resize(6);
    assert_eq!(array.capacity(), 10);
    assert_eq!(array.as_ptr(), ptr);
}

#[test]
fn resize_with_uses_maker() {
    let mut array = DynamicArray::from([1]);
    let mut next = 1;
    array.resize_with(4, || {
        next += 1;
        next
    });
    assert_eq!(array, [1, 2, 3, 4]);
}

#[test]
fn truncate_and_clear_keep_capacity() {
    let mut array = DynamicArray::from([1, 2, 3, 4]);
    array.truncate(10);
    assert_eq!(array.len(), 4);

    array.truncate(1);
    assert_eq!(array, [1]);
    array.clear();
    assert!(array.is_empty());
    assert_eq!(array.capacity(), 4);
}

#[test]
fn drop_runs_destructors() {
    let drops = Rc::new(Cell::new(0u32));
    let mut array = DynamicArray::new();
    for _ in 0..3 {
        array.push_back(Tracked(Rc::clone(&drops)));
    }
    assert_eq!(drops.get(), 0);

    drop(array);
    assert_eq!(drops.get(), 3);
}

#[test]
fn truncate_runs_destructors() {
    let drops = Rc::new(Cell::new(0u32));
    let mut array = DynamicArray::new();
    for _ in 0..4 {
        array.push_back(Tracked(Rc::clone(&drops)));
    }

    array.truncate(1);
    assert_eq!(drops.get(), 3);
}

#[test]
fn clone_has_capacity_of_len() {
    let mut array = DynamicArray::with_capacity(8);
    array.extend([String::from("a"), String::from("b")]);

    let copy = array.clone();
    assert_eq!(copy, array);
    assert_eq!(copy.capacity(), 2);
}

#[test]
fn clone_from_shorter_source() {
    let mut target = DynamicArray::from([1, 2, 3, 4, 5]);
    let source = DynamicArray::from([8, 9]);

    target.clone_from(&source);
    assert_eq!(target, [8, 9]);
    assert_eq!(target.capacity(), 5);
}

#[test]
fn clone_from_longer_source_within_capacity() {
    let mut target = DynamicArray::with_capacity(8);
    target.extend([String::from("old")]);
    let ptr = target.as_ptr();
    let source = DynamicArray::from([String::from("a"), String::from("b"), String::from("c")]);

    target.clone_from(&source);
    assert_eq!(target, source);
    assert_eq!(target.capacity(), 8);
    assert_eq!(target.as_ptr(), ptr);
}

#[test]
fn clone_from_source_beyond_capacity() {
    let mut target = DynamicArray::from([1]);
    let source = DynamicArray::from([4, 5, 6]);

    target.clone_from(&source);
    assert_eq!(target, [4, 5, 6]);
    assert_eq!(target.capacity(), 3);
}

#[test]
fn take_moves_contents_out() {
    let mut source = DynamicArray::from([1, 2, 3]);
    let ptr = source.as_ptr();

    let target = source.take();
    assert_eq!(target, [1, 2, 3]);
    assert_eq!(target.as_ptr(), ptr);
    assert!(source.is_empty());
    assert_eq!(source.capacity(), 0);
}

#[test]
fn move_assignment_replaces_contents() {
    let mut a = DynamicArray::from([String::from("gone")]);
    let mut b = DynamicArray::from([String::from("x"), String::from("y")]);
    assert_eq!(a, ["gone"]);

    a = b.take();
    assert_eq!(a, ["x", "y"]);
    assert_eq!(b.len(), 0);
}

#[test]
fn swap_with_exchanges_contents() {
    let mut a = DynamicArray::from([1]);
    let mut b = DynamicArray::from([2, 3, 4]);

    a.swap_with(&mut b);
    assert_eq!(a, [2, 3, 4]);
    assert_eq!(b, [1]);
    assert_eq!(a.capacity(), 3);
    assert_eq!(b.capacity(), 1);
}

#[test]
fn positions_walk_forward() {
    let array = DynamicArray::from(['a', 'b', 'c']);
    let mut pos = array.begin();
    let mut seen = String::new();
    while pos != array.end() {
        seen.push(array[pos]);
        pos = pos.next();
    }
    assert_eq!(seen, "abc");
    assert_eq!(array.end() - array.begin(), 3);
}

#[test]
fn at_checks_bounds() {
    let mut array = DynamicArray::from([1, 2]);
    assert_eq!(array.at(array.begin() + 1), Some(&2));
    assert_eq!(array.at(array.end()), None);

    *array.at_mut(array.begin()).unwrap() = 7;
    assert_eq!(array, [7, 2]);
}

#[test]
fn into_iter_yields_in_order() {
    let array = DynamicArray::from([String::from("a"), String::from("b"), String::from("c")]);
    let items: Vec<_> = array.into_iter().collect();
    assert_eq!(items, ["a", "b", "c"]);
}

#[test]
fn into_iter_is_double_ended() {
    let mut iter = DynamicArray::from([1, 2, 3, 4]).into_iter();
    assert_eq!(iter.len(), 4);
    assert_eq!(iter.next_back(), Some(4));
    assert_eq!(iter.next(), Some(1));
    assert_eq!(iter.as_slice(), &[2, 3]);
}

#[test]
fn into_iter_drops_unconsumed() {
    let drops = Rc::new(Cell::new(0u32));
    let mut array = DynamicArray::new();
    for _ in 0..4 {
        array.push_back(Tracked(Rc::clone(&drops)));
    }

    let mut iter = array.into_iter();
    drop(iter.next());
    assert_eq!(drops.get(), 1);
    drop(iter);
    assert_eq!(drops.get(), 4);
}

#[test]
fn borrowed_iteration() {
    let mut array = DynamicArray::from([1, 2, 3]);
    for value in &mut array {
        *value *= 10;
    }
    let sum: i32 = (&array).into_iter().sum();
    assert_eq!(sum, 60);
}

#[test]
fn collect_and_extend() {
    let mut array: DynamicArray<u32> = (1..=3).collect();
    array.extend(4..=5);
    assert_eq!(array, [1, 2, 3, 4, 5]);
}

#[test]
fn debug_format() {
    let array = DynamicArray::from([1, 2, 3]);
    assert_eq!(format!("{array:?}"), "[1, 2, 3]");
}

#[test]
fn equal_arrays_hash_equal() {
    let hash = |array: &DynamicArray<i32>| {
        let mut hasher = DefaultHasher::new();
        array.hash(&mut hasher);
        hasher.finish()
    };
    let a = DynamicArray::from([1, 2]);
    let mut b = DynamicArray::with_capacity(10);
    b.extend([1, 2]);
    assert_eq!(a, b);
    assert_eq!(hash(&a), hash(&b));
}

#[test]
fn slice_access_through_deref() {
    let mut array = DynamicArray::from([3, 1, 2]);
    array.sort_unstable();
    assert_eq!(array.first(), Some(&1));
    assert_eq!(array.as_slice(), &[1, 2, 3]);
    assert!(array.contains(&2));
}

#[test]
fn zero_sized_elements() {
    let mut array = DynamicArray::new();
    for _ in 0..1000 {
        array.push_back(());
    }
    assert_eq!(array.len(), 1000);
    assert_eq!(array.capacity(), usize::MAX);

    array.insert(array.begin(), ());
    array.erase(array.begin() + 10);
    assert_eq!(array.len(), 1000);
}

#[test]
fn many_pushes() {
    let mut array = DynamicArray::with_capacity(0);
    for i in 0..10_000 {
        array.push_back(i);
    }
    assert_eq!(array.len(), 10_000);
    assert_eq!(array.capacity(), 16_384);
    assert!(array.iter().copied().eq(0..10_000));
}

#[test]
fn tuples_and_std_owners_relocate_by_move() {
    let mut pairs = DynamicArray::new();
    for i in 0..5 {
        pairs.push_back((i, i * 2));
    }
    pairs.insert(pairs.begin(), (-1, -2));
    assert_eq!(pairs[0], (-1, -2));
    assert_eq!(pairs[5], (4, 8));

    let mut paths = DynamicArray::new();
    paths.push_back(PathBuf::from("/tmp"));
    paths.push_back(PathBuf::from("/var"));
    assert_eq!(paths[1], PathBuf::from("/var"));

    let mut maps: DynamicArray<HashMap<u8, String>> = DynamicArray::new();
    maps.push_back(HashMap::from([(1, String::from("one"))]));
    maps.push_back(HashMap::new());
    assert_eq!(maps[0][&1], "one");

    let mut names: DynamicArray<Cow<'_, str>> = DynamicArray::new();
    names.push_back(Cow::Borrowed("a"));
    names.push_back(Cow::Owned(String::from("b")));
    assert_eq!(names, ["a", "b"]);
}
