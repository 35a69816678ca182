//! Fixed-capacity slot pool for short-lived effects

/// Slab of `capacity` slots allocated once. Claiming scans for the first free
/// slot; nothing is allocated after construction, so the live count can never
/// exceed the capacity.
pub struct EffectPool<T> {
    slots: Vec<T>,
    active: Vec<bool>,
    live: usize,
}

impl<T: Default> EffectPool<T> {
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, T::default);
        Self {
            slots,
            active: vec![false; capacity],
            live: 0,
        }
    }

    /// Claim the first free slot, resetting it to `T::default()`.
    /// Returns None if the pool is full.
    pub fn claim(&mut self) -> Option<(usize, &mut T)> {
        if self.live >= self.slots.len() {
            return None;
        }
        let idx = self.active.iter().position(|a| !a)?;
        self.active[idx] = true;
        self.live += 1;
        self.slots[idx] = T::default();
        Some((idx, &mut self.slots[idx]))
    }

    /// Release every slot
    pub fn clear(&mut self) {
        self.active.iter_mut().for_each(|a| *a = false);
        self.live = 0;
    }
}

impl<T> EffectPool<T> {
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn is_active(&self, idx: usize) -> bool {
        self.active.get(idx).copied().unwrap_or(false)
    }

    /// Free a slot. Releasing an inactive slot is a no-op.
    pub fn release(&mut self, idx: usize) {
        if self.is_active(idx) {
            self.active[idx] = false;
            self.live -= 1;
        }
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        if self.is_active(idx) {
            self.slots.get(idx)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        if self.is_active(idx) {
            self.slots.get_mut(idx)
        } else {
            None
        }
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(i, _)| self.active[*i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_until_full() {
        let mut pool: EffectPool<u32> = EffectPool::new(4);
        for i in 0..4 {
            let (idx, slot) = pool.claim().unwrap();
            assert_eq!(idx, i);
            *slot = 10 + i as u32;
        }
        assert!(pool.claim().is_none());
        assert_eq!(pool.live_count(), 4);
    }

    #[test]
    fn released_slot_is_reused_first() {
        let mut pool: EffectPool<u32> = EffectPool::new(3);
        for _ in 0..3 {
            pool.claim().unwrap();
        }
        pool.release(1);
        assert_eq!(pool.live_count(), 2);
        assert!(pool.get(1).is_none());
        let (idx, slot) = pool.claim().unwrap();
        assert_eq!(idx, 1);
        assert_eq!(*slot, 0);
    }

    #[test]
    fn double_release_is_harmless() {
        let mut pool: EffectPool<u32> = EffectPool::new(2);
        pool.claim().unwrap();
        pool.release(0);
        pool.release(0);
        pool.release(7);
        assert_eq!(pool.live_count(), 0);
    }

    #[test]
    fn live_count_never_exceeds_capacity() {
        let mut pool: EffectPool<u8> = EffectPool::new(5);
        for round in 0..100 {
            pool.claim();
            if round % 3 == 0 {
                pool.release(round % 5);
            }
            assert!(pool.live_count() <= pool.capacity());
            assert_eq!(pool.live_count(), pool.iter_active().count());
        }
    }
}
