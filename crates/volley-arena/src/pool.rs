//! Fixed-capacity slot pool with an O(1) free list.
//!
//! [`SlotPool`] pre-allocates every slot at construction. Allocation pops
//! a free slot index, free pushes it back, and both are O(1). Reuse order
//! is LIFO: the most recently freed slot is handed out first, which keeps
//! reuse deterministic within a run.

use crate::error::ArenaError;
use crate::handle::Handle;

/// First generation assigned to every slot. Zero is never valid, so a
/// zeroed handle from outside the core can never resolve.
const FIRST_GENERATION: u32 = 1;

/// A single pool slot.
#[derive(Clone, Debug)]
struct Slot<T> {
    /// Bumped on every free; never decreases.
    generation: u32,
    /// `Some` while the slot is active.
    value: Option<T>,
}

/// Fixed-capacity arena validating handles by generation.
#[derive(Clone, Debug)]
pub struct SlotPool<T> {
    slots: Vec<Slot<T>>,
    /// Indices of inactive, reusable slots. Popped from the back.
    free_list: Vec<u32>,
    /// Number of active slots.
    active: usize,
    /// Slots permanently removed because their generation saturated.
    retired: usize,
}

impl<T> SlotPool<T> {
    /// Largest supported capacity: indices must fit in a `u32`.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a pool with exactly `capacity` slots.
    ///
    /// # Errors
    ///
    /// Returns [`ArenaError::ZeroCapacity`] for an empty pool and
    /// [`ArenaError::CapacityTooLarge`] when the index space would overflow.
    pub fn with_capacity(capacity: usize) -> Result<Self, ArenaError> {
        if capacity == 0 {
            return Err(ArenaError::ZeroCapacity);
        }
        if capacity > Self::MAX_CAPACITY {
            return Err(ArenaError::CapacityTooLarge {
                requested: capacity,
                max: Self::MAX_CAPACITY,
            });
        }
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || Slot {
            generation: FIRST_GENERATION,
            value: None,
        });
        // Reversed so the first allocation gets slot 0.
        let free_list = (0..capacity as u32).rev().collect();
        Ok(Self {
            slots,
            free_list,
            active: 0,
            retired: 0,
        })
    }

    /// Store `value` in a free slot.
    ///
    /// Returns `None` if every slot is active; the pool is left untouched
    /// and `value` is dropped.
    pub fn allocate(&mut self, value: T) -> Option<Handle<T>> {
        let index = self.free_list.pop()?;
        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.value.is_none(), "free list held an active slot");
        slot.value = Some(value);
        self.active += 1;
        Some(Handle::new(index, slot.generation))
    }

    /// Release the slot named by `handle`, returning its value.
    ///
    /// A stale or out-of-range handle is a no-op returning `None`.
    pub fn free(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        self.active -= 1;
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free_list.push(handle.index);
            }
            // Saturated: the slot is retired so no handle can ever match again.
            None => self.retired += 1,
        }
        Some(value)
    }

    /// Borrow the value named by `handle`, if it is still live.
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_ref()
    }

    /// Mutably borrow the value named by `handle`, if it is still live.
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.value.as_mut()
    }

    /// Whether `handle` names a live slot.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of active slots.
    pub fn len(&self) -> usize {
        self.active
    }

    /// Whether no slot is active.
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// Total slots, active or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether the next [`allocate`](Self::allocate) would fail.
    pub fn is_full(&self) -> bool {
        self.free_list.is_empty()
    }

    /// Number of slots retired after their generation saturated.
    pub fn retired_count(&self) -> usize {
        self.retired
    }

    /// Current generation of the slot at `index`, active or not.
    pub fn slot_generation(&self, index: u32) -> Option<u32> {
        self.slots.get(index as usize).map(|s| s.generation)
    }

    /// Handles of every active slot, in index order.
    pub fn handles(&self) -> Vec<Handle<T>> {
        self.iter().map(|(h, _)| h).collect()
    }

    /// Iterate over active slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value
                .as_ref()
                .map(|v| (Handle::new(i as u32, slot.generation), v))
        })
    }

    /// Mutably iterate over active slots in index order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|v| (Handle::new(i as u32, generation), v))
        })
    }

    /// Free every active slot, invalidating all outstanding handles.
    pub fn clear(&mut self) {
        for handle in self.handles() {
            self.free(handle);
        }
    }

    /// Test hook: force a slot's generation so saturation can be exercised.
    #[cfg(test)]
    fn set_generation(&mut self, index: u32, generation: u32) {
        self.slots[index as usize].generation = generation;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            SlotPool::<u8>::with_capacity(0).unwrap_err(),
            ArenaError::ZeroCapacity
        );
    }

    #[test]
    fn first_allocation_uses_slot_zero() {
        let mut pool = SlotPool::with_capacity(4).unwrap();
        let h = pool.allocate("a").unwrap();
        assert_eq!(h.index(), 0);
        assert_eq!(h.generation(), FIRST_GENERATION);
        assert_eq!(pool.get(h), Some(&"a"));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn free_invalidates_handle() {
        let mut pool = SlotPool::with_capacity(2).unwrap();
        let h = pool.allocate(10).unwrap();
        assert_eq!(pool.free(h), Some(10));
        assert!(pool.get(h).is_none());
        assert!(pool.get_mut(h).is_none());
        assert!(pool.is_empty());
    }

    #[test]
    fn stale_handle_stays_invalid_after_reuse() {
        let mut pool = SlotPool::with_capacity(1).unwrap();
        let old = pool.allocate(1).unwrap();
        pool.free(old);
        let new = pool.allocate(2).unwrap();
        assert_eq!(old.index(), new.index());
        assert!(new.generation() > old.generation());
        assert!(pool.get(old).is_none());
        assert_eq!(pool.get(new), Some(&2));
    }

    #[test]
    fn double_free_is_noop() {
        let mut pool = SlotPool::with_capacity(2).unwrap();
        let h = pool.allocate(5).unwrap();
        pool.free(h);
        let gen_after_first = pool.slot_generation(h.index()).unwrap();
        assert_eq!(pool.free(h), None);
        assert_eq!(pool.slot_generation(h.index()), Some(gen_after_first));
    }

    #[test]
    fn full_pool_returns_none_without_mutation() {
        let mut pool = SlotPool::with_capacity(2).unwrap();
        let a = pool.allocate(1).unwrap();
        let b = pool.allocate(2).unwrap();
        assert!(pool.is_full());
        assert!(pool.allocate(3).is_none());
        assert_eq!(pool.get(a), Some(&1));
        assert_eq!(pool.get(b), Some(&2));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn out_of_range_handle_is_not_found() {
        let mut pool = SlotPool::<u8>::with_capacity(1).unwrap();
        let h = Handle::from_raw_parts(99, FIRST_GENERATION);
        assert!(pool.get(h).is_none());
        assert!(pool.free(h).is_none());
    }

    #[test]
    fn zeroed_handle_never_resolves() {
        let mut pool = SlotPool::with_capacity(1).unwrap();
        pool.allocate(1).unwrap();
        assert!(pool.get(Handle::from_raw_parts(0, 0)).is_none());
    }

    #[test]
    fn reuse_is_lifo() {
        let mut pool = SlotPool::with_capacity(3).unwrap();
        let a = pool.allocate('a').unwrap();
        let b = pool.allocate('b').unwrap();
        pool.free(a);
        pool.free(b);
        assert_eq!(pool.allocate('c').unwrap().index(), b.index());
        assert_eq!(pool.allocate('d').unwrap().index(), a.index());
    }

    #[test]
    fn iteration_is_index_ordered_and_skips_free() {
        let mut pool = SlotPool::with_capacity(4).unwrap();
        let hs: Vec<_> = (0..4).map(|i| pool.allocate(i).unwrap()).collect();
        pool.free(hs[1]);
        let seen: Vec<i32> = pool.iter().map(|(_, v)| *v).collect();
        assert_eq!(seen, vec![0, 2, 3]);
        for (_, v) in pool.iter_mut() {
            *v *= 10;
        }
        assert_eq!(pool.get(hs[3]), Some(&30));
    }

    #[test]
    fn clear_invalidates_everything() {
        let mut pool = SlotPool::with_capacity(3).unwrap();
        let hs: Vec<_> = (0..3).map(|i| pool.allocate(i).unwrap()).collect();
        pool.clear();
        assert!(pool.is_empty());
        assert!(hs.iter().all(|h| pool.get(*h).is_none()));
        assert!(!pool.is_full());
    }

    #[test]
    fn saturated_slot_is_retired() {
        let mut pool = SlotPool::with_capacity(2).unwrap();
        pool.set_generation(1, u32::MAX);
        pool.set_generation(0, u32::MAX);
        let h = pool.allocate(7).unwrap();
        assert_eq!(h.generation(), u32::MAX);
        pool.free(h);
        assert_eq!(pool.retired_count(), 1);
        assert!(pool.get(h).is_none());
        // The retired slot is never handed out again.
        let next = pool.allocate(8).unwrap();
        assert_ne!(next.index(), h.index());
        assert!(pool.allocate(9).is_none());
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Alloc,
            Free(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![Just(Op::Alloc), (0usize..64).prop_map(Op::Free)]
        }

        proptest! {
            #[test]
            fn freed_handles_never_revalidate(
                capacity in 1usize..8,
                ops in proptest::collection::vec(op(), 1..64),
            ) {
                let mut pool = SlotPool::with_capacity(capacity).unwrap();
                let mut live: Vec<Handle<u32>> = Vec::new();
                let mut dead: Vec<Handle<u32>> = Vec::new();
                let mut counter = 0u32;
                for op in ops {
                    match op {
                        Op::Alloc => {
                            if let Some(h) = pool.allocate(counter) {
                                live.push(h);
                            }
                            counter += 1;
                        }
                        Op::Free(i) if !live.is_empty() => {
                            let h = live.swap_remove(i % live.len());
                            prop_assert!(pool.free(h).is_some());
                            dead.push(h);
                        }
                        Op::Free(_) => {}
                    }
                    for h in &dead {
                        prop_assert!(pool.get(*h).is_none());
                    }
                    for h in &live {
                        prop_assert!(pool.get(*h).is_some());
                    }
                    prop_assert_eq!(pool.len(), live.len());
                }
            }

            #[test]
            fn generations_never_decrease(
                double_frees in proptest::collection::vec(any::<bool>(), 1..40),
            ) {
                let mut pool = SlotPool::with_capacity(1).unwrap();
                let mut last = pool.slot_generation(0).unwrap();
                for double in double_frees {
                    if let Some(h) = pool.allocate(()) {
                        pool.free(h);
                        if double {
                            prop_assert!(pool.free(h).is_none());
                        }
                    }
                    let now = pool.slot_generation(0).unwrap();
                    prop_assert!(now >= last);
                    last = now;
                }
            }

            #[test]
            fn allocating_into_full_pool_changes_nothing(capacity in 1usize..16) {
                let mut pool = SlotPool::with_capacity(capacity).unwrap();
                let hs: Vec<_> = (0..capacity).map(|i| pool.allocate(i).unwrap()).collect();
                let gens: Vec<_> = (0..capacity as u32).map(|i| pool.slot_generation(i)).collect();
                prop_assert!(pool.allocate(usize::MAX).is_none());
                for (i, h) in hs.iter().enumerate() {
                    prop_assert_eq!(pool.get(*h), Some(&i));
                }
                let after: Vec<_> = (0..capacity as u32).map(|i| pool.slot_generation(i)).collect();
                prop_assert_eq!(gens, after);
            }
        }
    }
}
