use alloc::vec::Vec;

use super::handle::Handle;

/// Flat slot table owning every node of a tree.
///
/// Freed slots go on a free-list and are handed out again before the table grows, so a
/// handle stays valid exactly as long as its node is alive.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of live elements.
    pub(crate) const fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.free.len())
    }

    pub(crate) fn alloc(&mut self, element: T) -> Handle {
        if let Some(handle) = self.free.pop() {
            self.slots[handle.index()] = Some(element);
            return handle;
        }
        // Strict less-than keeps the newest index within `Handle::MAX`.
        assert!(
            self.slots.len() < Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX
        );
        self.slots.push(Some(element));
        Handle::from_index(self.slots.len() - 1)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.try_get(handle).expect("`Arena::get()` - `handle` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .expect("`Arena::get_mut()` - `handle` is invalid!")
    }

    /// Like [`Arena::get`], but reports a stale handle instead of panicking.
    #[inline]
    pub(crate) fn try_get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.index()).and_then(Option::as_ref)
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let element = self
            .slots
            .get_mut(handle.index())
            .and_then(Option::take)
            .expect("`Arena::take()` - `handle` is invalid!");
        self.free.push(handle);
        element
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn freed_slot_is_reused_first() {
        let mut arena = Arena::new();
        let a = arena.alloc('a');
        let b = arena.alloc('b');
        assert_eq!(arena.take(a), 'a');
        assert!(arena.try_get(a).is_none());

        let c = arena.alloc('c');
        assert_eq!(c, a);
        assert_eq!(*arena.get(c), 'c');
        assert_eq!(*arena.get(b), 'b');
        assert_eq!(arena.len(), 2);
    }

    #[test]
    #[should_panic(expected = "`Arena::take()` - `handle` is invalid!")]
    fn double_take_panics() {
        let mut arena = Arena::new();
        let handle = arena.alloc(1u8);
        arena.take(handle);
        arena.take(handle);
    }

    #[test]
    fn with_capacity_preallocates() {
        let arena: Arena<u64> = Arena::with_capacity(12);
        assert!(arena.capacity() >= 12);
        assert_eq!(arena.len(), 0);
    }

    #[derive(Clone, Debug)]
    enum Step {
        Alloc(u32),
        Overwrite(usize, u32),
        Release(usize),
        Reset,
    }

    fn step_strategy() -> impl Strategy<Value = Step> {
        prop_oneof![
            10 => any::<u32>().prop_map(Step::Alloc),
            4 => (any::<usize>(), any::<u32>()).prop_map(|(which, value)| Step::Overwrite(which, value)),
            5 => any::<usize>().prop_map(Step::Release),
            1 => Just(Step::Reset),
        ]
    }

    proptest! {
        #[test]
        fn arena_tracks_live_slots(steps in prop::collection::vec(step_strategy(), 0..256)) {
            let mut arena: Arena<u32> = Arena::new();
            let mut live: Vec<(Handle, u32)> = Vec::new();
            let mut released: Vec<Handle> = Vec::new();

            for step in steps {
                match step {
                    Step::Alloc(value) => {
                        let handle = arena.alloc(value);
                        if let Some(reused) = released.pop() {
                            prop_assert_eq!(handle, reused);
                        }
                        live.push((handle, value));
                    }
                    Step::Overwrite(which, value) if !live.is_empty() => {
                        let slot = which % live.len();
                        *arena.get_mut(live[slot].0) = value;
                        live[slot].1 = value;
                    }
                    Step::Release(which) if !live.is_empty() => {
                        let (handle, value) = live.swap_remove(which % live.len());
                        prop_assert_eq!(arena.take(handle), value);
                        prop_assert!(arena.try_get(handle).is_none());
                        released.push(handle);
                    }
                    Step::Reset => {
                        arena.clear();
                        live.clear();
                        released.clear();
                    }
                    Step::Overwrite(..) | Step::Release(_) => {}
                }

                prop_assert_eq!(arena.len(), live.len());
                for &(handle, value) in &live {
                    prop_assert_eq!(*arena.get(handle), value);
                }
            }
        }
    }
}
