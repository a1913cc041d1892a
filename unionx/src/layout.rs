//! Payload layouts and the slot sizes derived from them

use std::{cmp, mem};

/// Size and alignment of one alternative's payload
///
/// This is all the bucket configuration needs to know about a payload type.
/// The slot an alternative occupies in its bucket is [`Self::slot_size`] bytes
/// wide, which is never smaller than the payload itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayloadLayout {
    /// Payload size in bytes
    size: usize,
    /// Payload alignment requirement in bytes
    align: usize,
}

impl PayloadLayout {
    /// Layout of a concrete payload type.
    pub const fn of<T>() -> Self {
        Self {
            size: mem::size_of::<T>(),
            align: mem::align_of::<T>(),
        }
    }

    /// Layout with an explicit size and alignment.
    ///
    /// The alignment is not required to be a power of two; it only
    /// participates in the slot size.
    pub const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }

    /// Payload size in bytes.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Payload alignment in bytes.
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Width of the bucket slot this payload is stored in.
    ///
    /// A layout built with zero size and zero alignment still takes a one
    /// byte slot, so that every slot has a distinct byte offset.
    pub fn slot_size(&self) -> usize {
        cmp::max(1, cmp::max(self.align, self.size))
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::PayloadLayout;

    #[test]
    fn slot_size_is_max_of_size_and_align() {
        assert_eq!(PayloadLayout::of::<u8>().slot_size(), 1);
        assert_eq!(PayloadLayout::of::<u32>().slot_size(), 4);
        assert_eq!(PayloadLayout::of::<[u8; 3]>().slot_size(), 3);
        assert_eq!(PayloadLayout::new(3, 8).slot_size(), 8);
        assert_eq!(PayloadLayout::new(12, 4).slot_size(), 12);
    }

    #[test]
    fn zero_sized_payloads_get_a_byte() {
        assert_eq!(PayloadLayout::of::<()>().slot_size(), 1);
        assert_eq!(PayloadLayout::of::<[u64; 0]>().slot_size(), 8);
        assert_eq!(PayloadLayout::new(0, 0).slot_size(), 1);
    }
}
