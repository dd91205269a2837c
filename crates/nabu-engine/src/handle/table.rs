use std::collections::BTreeSet;

use super::{Handle, HandleError, TableError};

/// Generation given to a slot the first time it is used.
///
/// Starting at 1 keeps a zeroed `{0, 0}` handle from ever validating.
const FIRST_GENERATION: u32 = 1;

/// Highest slot count; index `u32::MAX` is reserved for `Handle::NULL`.
const MAX_SLOTS: usize = u32::MAX as usize;

/// Dense, index-addressable resource storage with per-slot generations.
///
/// Layout:
/// - `resources[i]` holds the value for slot `i`
/// - `generations[i]` holds the slot's current generation; the tombstone bit
///   is set while the slot is free
/// - `free_list` holds freed indices, reused lowest first
///
/// Destroyed slots are reset to `T::default()` and kept allocated, so reuse
/// never reallocates the dense arrays.
///
/// Thread model: the table has no internal locking. It is owned by the render
/// thread; any cross-thread access goes through an external mutex.
#[derive(Debug)]
pub struct HandleTable<T> {
    resources: Vec<T>,
    generations: Vec<u32>,
    free_list: BTreeSet<u32>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            generations: Vec::new(),
            free_list: BTreeSet::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            resources: Vec::with_capacity(capacity),
            generations: Vec::with_capacity(capacity),
            free_list: BTreeSet::new(),
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len() - self.free_list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots ever allocated (live + free).
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.resources.len()
    }

    /// Stores `value` in a free slot (lowest index first) or a new one.
    ///
    /// Fails only when the index space is exhausted or the dense arrays
    /// cannot grow.
    pub fn create(&mut self, value: T) -> Result<Handle, TableError> {
        if let Some(index) = self.free_list.pop_first() {
            let slot = index as usize;
            let generation = next_generation(self.generations[slot]);
            self.generations[slot] = generation;
            self.resources[slot] = value;
            return Ok(Handle::new(index, generation));
        }

        let slot = self.resources.len();
        if slot >= MAX_SLOTS {
            return Err(TableError::Exhausted { slots: slot });
        }

        self.resources.try_reserve(1)?;
        self.generations.try_reserve(1)?;

        self.resources.push(value);
        self.generations.push(FIRST_GENERATION);

        Ok(Handle::new(slot as u32, FIRST_GENERATION))
    }

    /// Checks `handle` against the table.
    ///
    /// Order of checks:
    /// 1) index within the dense array
    /// 2) slot not tombstoned
    /// 3) slot generation equals the handle generation
    pub fn validate(&self, handle: Handle) -> Result<(), HandleError> {
        self.slot_of(handle).map(|_| ())
    }

    /// `validate` collapsed to a boolean.
    #[inline]
    pub fn owns(&self, handle: Handle) -> bool {
        self.slot_of(handle).is_ok()
    }

    /// Returns the value for `handle`, or `None` if the handle is stale.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        let slot = self.slot_of(handle).ok()?;
        Some(&self.resources[slot])
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        let slot = self.slot_of(handle).ok()?;
        Some(&mut self.resources[slot])
    }

    /// Iterates live entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> + '_ {
        self.generations
            .iter()
            .zip(self.resources.iter())
            .enumerate()
            .filter(|(_, (generation, _))| **generation & Handle::TOMBSTONE_BIT == 0)
            .map(|(i, (generation, value))| (Handle::new(i as u32, *generation), value))
    }

    fn slot_of(&self, handle: Handle) -> Result<usize, HandleError> {
        let slot = handle.index() as usize;

        if slot >= self.resources.len() {
            return Err(HandleError::OutOfRange {
                handle,
                len: self.resources.len(),
            });
        }

        let current = self.generations[slot];
        if current & Handle::TOMBSTONE_BIT != 0 {
            return Err(HandleError::Tombstoned { handle });
        }
        if current != handle.generation() {
            return Err(HandleError::StaleGeneration { handle, current });
        }

        Ok(slot)
    }
}

impl<T: Default> HandleTable<T> {
    /// Frees the slot behind `handle`.
    ///
    /// Returns `false` and leaves the table untouched if `handle` does not
    /// validate.
    pub fn destroy(&mut self, handle: Handle) -> bool {
        self.take(handle).is_some()
    }

    /// Frees the slot behind `handle` and returns the value it held.
    ///
    /// The slot is left holding `T::default()`.
    pub fn take(&mut self, handle: Handle) -> Option<T> {
        let slot = self.slot_of(handle).ok()?;

        self.generations[slot] |= Handle::TOMBSTONE_BIT;
        self.free_list.insert(handle.index());

        Some(std::mem::take(&mut self.resources[slot]))
    }

    /// Frees every live slot, keeping the dense arrays allocated.
    pub fn clear(&mut self) {
        for (i, generation) in self.generations.iter_mut().enumerate() {
            if *generation & Handle::TOMBSTONE_BIT == 0 {
                *generation |= Handle::TOMBSTONE_BIT;
                self.free_list.insert(i as u32);
                self.resources[i] = T::default();
            }
        }
    }
}

/// Generation following `stored` (which may carry the tombstone bit).
///
/// Wraps within the 31 live bits and skips 0.
fn next_generation(stored: u32) -> u32 {
    let next = (stored & Handle::GENERATION_MASK).wrapping_add(1) & Handle::GENERATION_MASK;
    if next == 0 { FIRST_GENERATION } else { next }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(values: &[&'static str]) -> (HandleTable<&'static str>, Vec<Handle>) {
        let mut table = HandleTable::new();
        let handles = values.iter().map(|v| table.create(*v).unwrap()).collect();
        (table, handles)
    }

    // ── create / get ──────────────────────────────────────────────────────

    #[test]
    fn create_then_get_returns_value() {
        let (table, h) = table_with(&["a", "b"]);
        assert_eq!(table.get(h[0]), Some(&"a"));
        assert_eq!(table.get(h[1]), Some(&"b"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn fresh_slots_start_at_first_generation() {
        let (_, h) = table_with(&["a", "b", "c"]);
        for (i, handle) in h.iter().enumerate() {
            assert_eq!(handle.index(), i as u32);
            assert_eq!(handle.generation(), FIRST_GENERATION);
        }
    }

    #[test]
    fn zeroed_handle_never_validates() {
        let (table, _) = table_with(&["a"]);
        assert!(!table.owns(Handle::new(0, 0)));
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut table = HandleTable::new();
        let h = table.create(1u32).unwrap();
        *table.get_mut(h).unwrap() += 41;
        assert_eq!(table.get(h), Some(&42));
    }

    // ── destroy ───────────────────────────────────────────────────────────

    #[test]
    fn destroy_then_get_is_none() {
        let (mut table, h) = table_with(&["a"]);
        assert!(table.destroy(h[0]));
        assert_eq!(table.get(h[0]), None);
        assert!(table.is_empty());
    }

    #[test]
    fn double_destroy_is_true_then_false() {
        let (mut table, h) = table_with(&["a", "b"]);
        assert!(table.destroy(h[0]));

        let len = table.len();
        let slots = table.slot_count();
        assert!(!table.destroy(h[0]));
        assert_eq!(table.len(), len);
        assert_eq!(table.slot_count(), slots);
        assert_eq!(table.get(h[1]), Some(&"b"));
    }

    #[test]
    fn destroy_resets_value_to_default() {
        let mut table = HandleTable::new();
        let h = table.create(String::from("texture")).unwrap();
        assert_eq!(table.take(h).as_deref(), Some("texture"));
        assert_eq!(table.resources[0], String::new());
    }

    #[test]
    fn destroy_null_is_rejected() {
        let (mut table, _) = table_with(&["a"]);
        assert!(!table.destroy(Handle::NULL));
        assert_eq!(table.len(), 1);
    }

    // ── reuse ─────────────────────────────────────────────────────────────

    #[test]
    fn reuse_middle_slot_bumps_generation() {
        let (mut table, h) = table_with(&["a", "b", "c"]);
        assert!(table.destroy(h[1]));

        let reused = table.create("d").unwrap();
        assert_eq!(reused.index(), 1);
        assert!(reused.generation() > h[1].generation());

        assert!(!table.owns(h[1]));
        assert!(table.owns(reused));
        assert_eq!(table.get(reused), Some(&"d"));
        assert_eq!(table.slot_count(), 3);
    }

    #[test]
    fn reuse_picks_lowest_free_index() {
        let (mut table, h) = table_with(&["a", "b", "c", "d"]);
        assert!(table.destroy(h[3]));
        assert!(table.destroy(h[0]));
        assert!(table.destroy(h[2]));

        assert_eq!(table.create("x").unwrap().index(), 0);
        assert_eq!(table.create("y").unwrap().index(), 2);
        assert_eq!(table.create("z").unwrap().index(), 3);
        assert_eq!(table.create("w").unwrap().index(), 4);
    }

    #[test]
    fn stale_handle_fails_across_many_reuses() {
        let mut table = HandleTable::new();
        let mut issued = Vec::new();
        for i in 0..32u32 {
            let h = table.create(i).unwrap();
            assert_eq!(h.index(), 0);
            issued.push(h);
            assert!(table.destroy(h));
        }
        assert!(issued.iter().all(|h| !table.owns(*h)));
    }

    // ── validation reasons ────────────────────────────────────────────────

    #[test]
    fn validate_reports_out_of_range() {
        let (table, _) = table_with(&["a"]);
        let h = Handle::new(5, 1);
        assert_eq!(table.validate(h), Err(HandleError::OutOfRange { handle: h, len: 1 }));
    }

    #[test]
    fn validate_reports_tombstone() {
        let (mut table, h) = table_with(&["a"]);
        table.destroy(h[0]);
        assert_eq!(table.validate(h[0]), Err(HandleError::Tombstoned { handle: h[0] }));
    }

    #[test]
    fn validate_reports_stale_generation() {
        let (mut table, h) = table_with(&["a"]);
        table.destroy(h[0]);
        let fresh = table.create("b").unwrap();
        assert_eq!(
            table.validate(h[0]),
            Err(HandleError::StaleGeneration { handle: h[0], current: fresh.generation() })
        );
    }

    // ── generation arithmetic ─────────────────────────────────────────────

    #[test]
    fn next_generation_clears_tombstone_and_increments() {
        assert_eq!(next_generation(1 | Handle::TOMBSTONE_BIT), 2);
        assert_eq!(next_generation(7), 8);
    }

    #[test]
    fn next_generation_wraps_past_zero() {
        assert_eq!(next_generation(Handle::GENERATION_MASK | Handle::TOMBSTONE_BIT), FIRST_GENERATION);
    }

    // ── iteration / clear ─────────────────────────────────────────────────

    #[test]
    fn iter_skips_freed_slots() {
        let (mut table, h) = table_with(&["a", "b", "c"]);
        table.destroy(h[1]);
        let live: Vec<_> = table.iter().map(|(handle, v)| (handle, *v)).collect();
        assert_eq!(live, vec![(h[0], "a"), (h[2], "c")]);
    }

    #[test]
    fn clear_invalidates_everything() {
        let (mut table, h) = table_with(&["a", "b"]);
        table.clear();
        assert!(table.is_empty());
        assert!(h.iter().all(|handle| !table.owns(*handle)));
        assert_eq!(table.create("c").unwrap().index(), 0);
    }

    // ── randomized create/destroy sequence ────────────────────────────────

    #[test]
    fn handles_valid_exactly_until_destroyed() {
        let mut table = HandleTable::new();
        let mut live: Vec<Handle> = Vec::new();
        let mut dead: Vec<Handle> = Vec::new();

        // Small LCG keeps the sequence deterministic without extra dependencies.
        let mut seed = 0x2545_f491_u32;
        for step in 0..2_000u32 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            if live.is_empty() || seed % 3 != 0 {
                live.push(table.create(step).unwrap());
            } else {
                let victim = live.swap_remove((seed as usize / 3) % live.len());
                assert!(table.destroy(victim));
                dead.push(victim);
            }

            assert!(live.iter().all(|h| table.owns(*h)));
        }

        assert!(dead.iter().all(|h| !table.owns(*h)));
        assert_eq!(table.len(), live.len());
    }
}
