//! Bucket configuration for a variant schema
//!
//! The [`BucketTable`] assigns every alternative of a schema to a bucket,
//! keyed by slot size. Alternatives are scanned in discriminant order and
//! each new slot size opens the next bucket, so bucket indices follow the
//! order in which sizes first appear. The table never changes after it's
//! built and is shared by reference between all stores of the schema.

mod slot_sizes;

use crate::handle::HandleCodec;
use crate::layout::PayloadLayout;
use crate::Error;
use slot_sizes::SlotSizes;
use tracing::debug;

/// Maximum number of distinct slot sizes, and so buckets, per schema
pub const MAX_BUCKETS: usize = 256;

/// Immutable mapping from discriminant to bucket, and bucket to slot size
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BucketTable {
    /// Bucket index of each alternative, indexed by discriminant
    buckets: Box<[u8]>,
    /// Slot size of each bucket, indexed by bucket
    slot_sizes: Box<[usize]>,
    /// Handle bit layout for this schema
    codec: HandleCodec,
}

impl BucketTable {
    /// Build the table for a schema, given each alternative's payload
    /// layout in discriminant order.
    ///
    /// Fails with [`Error::SchemaTooWide`] if the schema needs more than
    /// [`MAX_BUCKETS`] distinct slot sizes.
    pub fn configure(layouts: &[PayloadLayout]) -> Result<Self, Error> {
        let mut sizes = SlotSizes::<MAX_BUCKETS>::new();
        let mut buckets = Vec::with_capacity(layouts.len());
        for layout in layouts {
            let bucket = sizes
                .find_or_push(layout.slot_size())
                .map_err(|()| Error::SchemaTooWide { limit: MAX_BUCKETS })?;
            buckets.push(u8::try_from(bucket).map_err(|_| Error::SchemaTooWide {
                limit: MAX_BUCKETS,
            })?);
        }
        let table = Self {
            buckets: buckets.into_boxed_slice(),
            slot_sizes: sizes.as_slice().into(),
            codec: HandleCodec::for_discriminants(layouts.len()),
        };
        debug!(
            alternatives = table.discriminant_count(),
            buckets = table.bucket_count(),
            tag_bits = table.codec.tag_bits(),
            slot_sizes = ?table.slot_sizes,
            "configured bucket table"
        );
        Ok(table)
    }

    /// Number of alternatives in the schema.
    pub fn discriminant_count(&self) -> usize {
        self.buckets.len()
    }

    /// Number of distinct buckets.
    pub fn bucket_count(&self) -> usize {
        self.slot_sizes.len()
    }

    /// Bucket holding the alternative with this discriminant.
    pub fn bucket_of(&self, discriminant: usize) -> Result<usize, Error> {
        self.buckets
            .get(discriminant)
            .map(|&bucket| usize::from(bucket))
            .ok_or(Error::UnknownDiscriminant(discriminant))
    }

    /// Slot size of a bucket.
    ///
    /// Panics if the bucket index is out of range.
    pub fn slot_size(&self, bucket: usize) -> usize {
        self.slot_sizes[bucket]
    }

    /// Slot sizes of all buckets, indexed by bucket.
    pub fn slot_sizes(&self) -> &[usize] {
        &self.slot_sizes
    }

    /// Bucket and slot size for the alternative with this discriminant.
    pub fn slot_of(&self, discriminant: usize) -> Result<(usize, usize), Error> {
        let bucket = self.bucket_of(discriminant)?;
        Ok((bucket, self.slot_sizes[bucket]))
    }

    /// Handle bit layout for this schema.
    pub fn codec(&self) -> HandleCodec {
        self.codec
    }

    /// Check that this table could have been built from `layouts`.
    ///
    /// Every alternative must be present and fit in its bucket's slots.
    pub(crate) fn fits(&self, layouts: &[PayloadLayout]) -> bool {
        layouts.len() == self.discriminant_count()
            && layouts.iter().zip(self.buckets.iter()).all(|(layout, &b)| {
                layout.slot_size() == self.slot_sizes[usize::from(b)]
            })
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use super::{BucketTable, MAX_BUCKETS};
    use crate::{Error, PayloadLayout};

    #[test]
    fn equal_slot_sizes_share_a_bucket() {
        let table = BucketTable::configure(&[
            PayloadLayout::of::<u8>(),
            PayloadLayout::of::<u8>(),
            PayloadLayout::of::<u32>(),
            PayloadLayout::of::<[u8; 4]>(),
            PayloadLayout::of::<u64>(),
        ])
        .unwrap();
        assert_eq!(table.discriminant_count(), 5);
        assert_eq!(table.bucket_count(), 3);
        let buckets: Vec<usize> = (0..5).map(|d| table.bucket_of(d).unwrap()).collect();
        assert_eq!(buckets, vec![0, 0, 1, 1, 2]);
        assert_eq!(table.slot_sizes(), &[1, 4, 8]);
        assert_eq!(table.codec().tag_bits(), 3);
    }

    #[test]
    fn first_appearance_order() {
        // The first alternative always opens bucket zero.
        let table = BucketTable::configure(&[
            PayloadLayout::of::<u64>(),
            PayloadLayout::of::<u16>(),
            PayloadLayout::of::<u64>(),
        ])
        .unwrap();
        assert_eq!(table.slot_of(0), Ok((0, 8)));
        assert_eq!(table.slot_of(1), Ok((1, 2)));
        assert_eq!(table.slot_of(2), Ok((0, 8)));
    }

    #[test]
    fn alignment_widens_slots() {
        let table = BucketTable::configure(&[
            PayloadLayout::new(2, 8),
            PayloadLayout::of::<u64>(),
            PayloadLayout::new(2, 2),
        ])
        .unwrap();
        assert_eq!(table.bucket_of(0), table.bucket_of(1));
        assert_ne!(table.bucket_of(0), table.bucket_of(2));
    }

    #[test]
    fn bucket_limit() {
        let widest: Vec<PayloadLayout> = (1..=MAX_BUCKETS)
            .map(|size| PayloadLayout::new(size, 1))
            .collect();
        let table = BucketTable::configure(&widest).unwrap();
        assert_eq!(table.bucket_count(), MAX_BUCKETS);
        assert_eq!(table.bucket_of(MAX_BUCKETS - 1), Ok(MAX_BUCKETS - 1));

        let mut too_wide = widest.clone();
        too_wide.push(PayloadLayout::new(MAX_BUCKETS + 1, 1));
        assert_eq!(
            BucketTable::configure(&too_wide),
            Err(Error::SchemaTooWide { limit: MAX_BUCKETS })
        );

        // Repeating an existing size past the limit is fine.
        let mut repeats = widest;
        repeats.push(PayloadLayout::new(7, 1));
        assert_eq!(BucketTable::configure(&repeats).unwrap().bucket_count(), MAX_BUCKETS);
    }

    #[test]
    fn unknown_discriminant() {
        let table = BucketTable::configure(&[PayloadLayout::of::<u8>()]).unwrap();
        assert_eq!(table.bucket_of(1), Err(Error::UnknownDiscriminant(1)));
    }

    #[test]
    fn empty_schema() {
        let table = BucketTable::configure(&[]).unwrap();
        assert_eq!(table.bucket_count(), 0);
        assert_eq!(table.codec().tag_bits(), 0);
    }
}
