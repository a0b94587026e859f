//! Cache Set Unit Tests.
//!
//! Exercises the per-set LRU list directly: insertion at the MRU end,
//! promotion, LRU eviction, removal from arbitrary positions, and the
//! occupancy bound.

use cachesim_core::cache::{CacheLine, CacheSet};

fn tags(set: &CacheSet) -> Vec<u64> {
    set.iter().map(|line| line.tag).collect()
}

/// Builds a set of `ways` ways and fills it with `resident` tags, inserted in order.
fn filled(ways: usize, resident: &[u64]) -> CacheSet {
    let mut set = CacheSet::with_capacity(ways);
    for &tag in resident {
        assert!(set.insert_at_head(CacheLine::new(tag, false)).is_some());
    }
    set.debug_validate_invariants();
    set
}

#[test]
fn new_set_is_empty() {
    let set = CacheSet::with_capacity(4);

    assert!(set.is_empty());
    assert!(!set.is_full());
    assert_eq!(set.capacity(), 4);
    assert_eq!(set.occupancy(), 0);
    assert_eq!(set.mru(), None);
    assert_eq!(set.lru(), None);
    assert_eq!(set.find(0), None);
}

/// The most recent insertion is the head; the first is the tail.
#[test]
fn insert_places_line_at_mru() {
    let set = filled(4, &[1, 2, 3]);

    assert_eq!(tags(&set), vec![3, 2, 1]);
    assert_eq!(set.occupancy(), 3);
    assert_eq!(set.get(set.mru().unwrap()).unwrap().tag, 3);
    assert_eq!(set.get(set.lru().unwrap()).unwrap().tag, 1);
}

#[test]
fn insert_into_full_set_is_refused() {
    let mut set = filled(2, &[1, 2]);
    assert!(set.is_full());

    assert_eq!(set.insert_at_head(CacheLine::new(9, true)), None);
    assert_eq!(tags(&set), vec![2, 1]);
    set.debug_validate_invariants();
}

#[test]
fn promote_moves_line_to_head() {
    let mut set = filled(4, &[1, 2, 3, 4]);
    let id = set.find(2).unwrap();

    assert!(set.promote(id));
    assert_eq!(tags(&set), vec![2, 4, 3, 1]);
    set.debug_validate_invariants();

    // Promoting the tail updates the tail pointer.
    let tail = set.lru().unwrap();
    assert!(set.promote(tail));
    assert_eq!(tags(&set), vec![1, 2, 4, 3]);
    assert_eq!(set.get(set.lru().unwrap()).unwrap().tag, 3);
    set.debug_validate_invariants();
}

#[test]
fn promote_head_is_a_no_op() {
    let mut set = filled(3, &[1, 2, 3]);
    let head = set.mru().unwrap();

    assert!(set.promote(head));
    assert_eq!(tags(&set), vec![3, 2, 1]);
}

#[test]
fn evict_lru_removes_tail() {
    let mut set = filled(3, &[1, 2, 3]);

    let victim = set.evict_lru().unwrap();
    assert_eq!(victim.tag, 1);
    assert_eq!(tags(&set), vec![3, 2]);
    assert_eq!(set.occupancy(), 2);
    set.debug_validate_invariants();
}

#[test]
fn evict_from_empty_set_yields_nothing() {
    let mut set = CacheSet::with_capacity(2);
    assert_eq!(set.evict_lru(), None);
}

/// Removing from the middle relinks neighbours in both directions.
#[test]
fn remove_from_middle_keeps_list_linked() {
    let mut set = filled(4, &[1, 2, 3]);
    let id = set.find(2).unwrap();

    assert_eq!(set.remove(id), Some(CacheLine::new(2, false)));
    assert_eq!(tags(&set), vec![3, 1]);
    set.debug_validate_invariants();

    let _ = set.insert_at_head(CacheLine::new(7, false)).unwrap();
    assert_eq!(tags(&set), vec![7, 3, 1]);
    set.debug_validate_invariants();
}

#[test]
fn removing_only_line_empties_set() {
    let mut set = filled(1, &[5]);
    let id = set.mru().unwrap();

    assert!(set.remove(id).is_some());
    assert!(set.is_empty());
    assert_eq!(set.mru(), None);
    assert_eq!(set.lru(), None);
    set.debug_validate_invariants();
}

#[test]
fn dirty_bit_is_writable_through_handle() {
    let mut set = filled(2, &[1, 2]);
    let id = set.find(1).unwrap();

    set.get_mut(id).unwrap().dirty = true;
    assert!(set.get(id).unwrap().dirty);
    assert_eq!(set.iter().filter(|line| line.dirty).count(), 1);
}

#[test]
fn lines_mut_visits_every_resident_line() {
    let mut set = filled(4, &[1, 2, 3]);
    for line in set.lines_mut() {
        line.dirty = true;
    }
    assert!(set.iter().all(|line| line.dirty));
    assert_eq!(set.iter_ids().count(), 3);
}
