//! Fixed-size circular ring of DMA descriptors.

/// A descriptor array with one wrapping cursor.
///
/// Ownership lives in the descriptors themselves (their OWN bits), not
/// here. `current` is the next slot the driver touches: the next
/// submission slot on TX, the next slot to inspect on RX.
pub struct DescriptorRing<D, const N: usize> {
    /// Backing descriptor storage
    pub(super) descriptors: [D; N],
    /// Cursor position
    pub(super) current: usize,
}

impl<D, const N: usize> DescriptorRing<D, N> {
    /// Wrap an existing descriptor array, cursor at slot 0.
    #[must_use]
    pub const fn from_array(descriptors: [D; N]) -> Self {
        Self {
            descriptors,
            current: 0,
        }
    }

    /// Number of slots.
    #[inline(always)]
    #[must_use]
    pub const fn len(&self) -> usize {
        N
    }

    /// True only for the degenerate zero-slot ring.
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Where the cursor is now.
    #[inline(always)]
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.current
    }

    /// Absolute slot index `offset` places past the cursor.
    #[inline(always)]
    #[must_use]
    pub const fn index_at_offset(&self, offset: usize) -> usize {
        (self.current + offset) % N
    }

    /// Step the cursor forward one slot.
    #[inline(always)]
    pub fn advance(&mut self) {
        self.advance_by(1);
    }

    /// Step the cursor forward `n` slots.
    #[inline(always)]
    pub fn advance_by(&mut self, n: usize) {
        self.current = (self.current + n) % N;
    }

    /// Put the cursor back on slot 0.
    #[inline(always)]
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// The descriptor under the cursor.
    #[inline(always)]
    pub fn current(&self) -> &D {
        &self.descriptors[self.current]
    }

    /// Mutable access to the descriptor under the cursor.
    #[inline(always)]
    pub fn current_mut(&mut self) -> &mut D {
        &mut self.descriptors[self.current]
    }

    /// The descriptor in an absolute slot; indices wrap.
    #[inline(always)]
    pub fn get(&self, index: usize) -> &D {
        &self.descriptors[index % N]
    }

    /// Mutable access to an absolute slot; indices wrap.
    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> &mut D {
        &mut self.descriptors[index % N]
    }

    /// The descriptor `offset` places past the cursor.
    #[inline(always)]
    pub fn at_offset(&self, offset: usize) -> &D {
        &self.descriptors[self.index_at_offset(offset)]
    }

    /// Pointer to slot 0, the address the hardware list base takes.
    #[inline(always)]
    pub fn base_addr(&self) -> *const D {
        self.descriptors.as_ptr()
    }

    /// Slot 0 address narrowed for a 32-bit DMA register.
    #[inline(always)]
    pub fn base_addr_u32(&self) -> u32 {
        self.base_addr() as u32
    }

    /// Visit every slot in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &D> {
        self.descriptors.iter()
    }

    /// Visit every slot mutably in storage order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut D> {
        self.descriptors.iter_mut()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::testing::MockDescriptor;

    #[test]
    fn cursor_wraps_at_the_end() {
        let mut ring = DescriptorRing::from_array([0u32; 4]);

        let mut seen = [0usize; 6];
        for slot in &mut seen {
            ring.advance();
            *slot = ring.current_index();
        }
        assert_eq!(seen, [1, 2, 3, 0, 1, 2]);
    }

    #[test]
    fn bulk_steps_wrap_modulo_len() {
        let mut ring = DescriptorRing::from_array([0u8; 5]);

        for (step, expected) in [(3, 3), (4, 2), (10, 2), (5, 2), (1, 3)] {
            ring.advance_by(step);
            assert_eq!(ring.current_index(), expected);
        }
    }

    #[test]
    fn construction_starts_at_slot_zero() {
        let ring = DescriptorRing::from_array([7u32, 8, 9]);

        assert_eq!(ring.len(), 3);
        assert!(!ring.is_empty());
        assert_eq!(ring.current_index(), 0);
        assert_eq!(*ring.current(), 7);
    }

    #[test]
    fn absolute_and_relative_lookups_agree() {
        let mut ring = DescriptorRing::from_array([10u32, 20, 30, 40]);
        ring.advance_by(2);

        for offset in 0..6 {
            let index = ring.index_at_offset(offset);
            assert_eq!(ring.at_offset(offset), ring.get(index));
        }
        assert_eq!(*ring.at_offset(0), 30);
        assert_eq!(*ring.at_offset(2), 10);
        assert_eq!(*ring.get(7), 40);
    }

    #[test]
    fn reset_rewinds_the_cursor() {
        let mut ring = DescriptorRing::from_array([0u32; 4]);
        ring.advance_by(3);
        ring.reset();
        assert_eq!(ring.current_index(), 0);
    }

    #[test]
    fn cursor_slot_is_writable() {
        let mut ring = DescriptorRing::from_array([5u32, 6, 7]);
        ring.advance();
        *ring.current_mut() = 66;
        assert_eq!(*ring.get(1), 66);
    }

    #[test]
    fn base_address_is_slot_zero() {
        let ring = DescriptorRing::from_array([11u32, 22, 33]);

        let base = ring.base_addr();
        unsafe {
            assert_eq!(*base, 11);
        }
        assert_eq!(ring.base_addr_u32(), base as u32);
    }

    #[test]
    fn iteration_runs_in_storage_order() {
        let mut ring = DescriptorRing::from_array([1u32, 2, 3, 4]);
        ring.advance_by(2);

        // iteration order follows storage, not the cursor
        let collected: std::vec::Vec<u32> = ring.iter().copied().collect();
        assert_eq!(collected, [1, 2, 3, 4]);

        for value in ring.iter_mut() {
            *value += 100;
        }
        assert_eq!(*ring.get(0), 101);
        assert_eq!(*ring.get(3), 104);
    }

    #[test]
    fn one_slot_ring_cycles_onto_itself() {
        let mut ring = DescriptorRing::from_array([MockDescriptor::new()]);

        ring.advance();
        assert_eq!(ring.current_index(), 0);

        ring.current_mut().set_owned();
        assert!(ring.get(0).is_owned());
    }

    #[test]
    fn own_bits_live_in_the_descriptors() {
        let mut ring = DescriptorRing::from_array([MockDescriptor::new(); 8]);

        let owned = |ring: &DescriptorRing<MockDescriptor, 8>| {
            ring.iter().filter(|d| d.is_owned()).count()
        };
        assert_eq!(owned(&ring), 0);

        for slot in [0, 2, 5] {
            ring.get_mut(slot).set_owned();
        }
        assert_eq!(owned(&ring), 3);

        ring.get_mut(2).clear_owned();
        assert_eq!(owned(&ring), 2);
        assert!(!ring.get(2).is_owned());
    }
}
