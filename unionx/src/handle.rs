//! Packed handles naming one slot in one bucket
//!
//! A [`Handle`] is a single machine word. The low [`HandleCodec::tag_bits`]
//! bits hold the discriminant of the stored alternative and the remaining
//! bits hold the slot's position within its bucket, counted in slots rather
//! than bytes. The discriminant is enough to recover the bucket and slot
//! size through the [`crate::BucketTable`], so nothing else needs to travel
//! alongside the handle.

use crate::Error;

/// Opaque reference to one stored value, returned by
/// [`crate::UnionStore::append`]
///
/// Handles compare for equality only. They are not ordered and are not
/// contiguous indices. A handle goes stale as soon as the slot it names is
/// removed or relocated by a swap-remove; the store does not detect this.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Handle(usize);

impl Handle {
    /// Raw packed representation of this handle.
    pub fn into_raw(self) -> usize {
        self.0
    }

    /// Rebuild a handle from its raw representation.
    ///
    /// Any value is accepted. Values that were not produced by
    /// [`Self::into_raw`] on a handle from the same schema may decode to
    /// an unknown discriminant or an out-of-range position.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }
}

/// Bit layout of handles for one variant schema
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct HandleCodec {
    /// Number of low bits reserved for the discriminant
    tag_bits: u32,
}

impl HandleCodec {
    /// Codec for a schema with `count` alternatives.
    ///
    /// Reserves `ceil(log2(count))` tag bits; a schema with one alternative
    /// (or none) needs no tag bits at all.
    pub fn for_discriminants(count: usize) -> Self {
        let tag_bits = match count {
            0 | 1 => 0,
            n => usize::BITS - (n - 1).leading_zeros(),
        };
        Self { tag_bits }
    }

    /// Number of low bits holding the discriminant.
    pub fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Largest slot position that fits in a handle.
    pub fn max_position(&self) -> usize {
        usize::MAX >> self.tag_bits
    }

    /// Mask selecting the discriminant bits.
    #[inline(always)]
    fn tag_mask(&self) -> usize {
        (1usize << self.tag_bits) - 1
    }

    /// Pack a discriminant and slot position into a [`Handle`].
    ///
    /// The discriminant must fit in the tag bits. Returns `Err(())` if the
    /// position doesn't fit in the remaining bits.
    #[inline(always)]
    pub(crate) fn try_encode(&self, discriminant: usize, position: usize) -> Result<Handle, ()> {
        debug_assert_eq!(discriminant & !self.tag_mask(), 0);
        if position > self.max_position() {
            return Err(());
        }
        Ok(Handle((position << self.tag_bits) | discriminant))
    }

    /// Pack a discriminant and slot position into a [`Handle`].
    ///
    /// `bucket` is only used to describe the failure when the position
    /// overflows, which is reported as [`Error::IndexSpaceExhausted`].
    /// Discriminants wider than the tag bits are reported as
    /// [`Error::UnknownDiscriminant`].
    pub fn encode(
        &self,
        discriminant: usize,
        position: usize,
        bucket: usize,
    ) -> Result<Handle, Error> {
        if discriminant & !self.tag_mask() != 0 {
            return Err(Error::UnknownDiscriminant(discriminant));
        }
        self.try_encode(discriminant, position)
            .map_err(|()| Error::IndexSpaceExhausted { bucket, position })
    }

    /// Split a [`Handle`] into its discriminant and slot position.
    #[inline(always)]
    pub fn decode(&self, handle: Handle) -> (usize, usize) {
        (handle.0 & self.tag_mask(), handle.0 >> self.tag_bits)
    }
}
