//! Store instances: one growable byte buffer per bucket
//!
//! A [`UnionStore`] owns a `Vec<u8>` for every bucket in its schema's
//! [`BucketTable`]. Each buffer holds a whole number of fixed-width slots.
//! Appending writes one slot at the end of the value's bucket, and
//! swap-removal copies the bucket's last slot over the removed one before
//! shrinking the buffer by a slot. No operation touches more than one bucket.

use crate::{BucketTable, Error, Handle, Variant};
use std::marker::PhantomData;
use std::ops::Range;
use tracing::{debug, trace};

/// Compact storage for values of one [`Variant`] schema
///
/// The store exclusively owns its bucket buffers and borrows the schema's
/// bucket table for `'t`. Stores built through [`UnionStore::new`] use the
/// schema's memoized table and are `UnionStore<'static, V>`.
#[derive(Debug, Clone)]
pub struct UnionStore<'t, V: Variant> {
    /// Shared configuration for this schema
    table: &'t BucketTable,
    /// Byte buffer for each bucket, indexed by bucket
    buckets: Vec<Vec<u8>>,
    /// Values are only stored as bytes
    _variant: PhantomData<fn(V) -> V>,
}

impl<V: Variant> UnionStore<'static, V> {
    /// Make a new empty store using the schema's shared [`BucketTable`].
    ///
    /// Fails with [`Error::SchemaTooWide`] if the schema can't be
    /// configured.
    pub fn new() -> Result<Self, Error> {
        StoreBuilder::new().build()
    }
}

impl<'t, V: Variant> UnionStore<'t, V> {
    /// Make a new empty store using an explicitly configured table.
    ///
    /// The table must have been configured from [`Variant::LAYOUTS`];
    /// anything else is rejected with [`Error::SchemaMismatch`].
    pub fn with_table(table: &'t BucketTable) -> Result<Self, Error> {
        StoreBuilder::new().table(table).build()
    }

    /// The bucket table this store was built with.
    pub fn table(&self) -> &'t BucketTable {
        self.table
    }

    /// Append a value, returning the [`Handle`] that names its slot.
    ///
    /// Grows exactly one bucket by exactly one slot. On failure the store is
    /// unchanged: [`Error::IndexSpaceExhausted`] if the bucket's next
    /// position wouldn't fit in a handle, or [`Error::Allocation`] if the
    /// bucket buffer couldn't grow.
    pub fn append(&mut self, value: &V) -> Result<Handle, Error> {
        let discriminant = value.discriminant();
        let (bucket, slot_size) = self.table.slot_of(discriminant)?;
        let buffer = &mut self.buckets[bucket];
        let offset = buffer.len();
        let position = offset / slot_size;
        let handle = self
            .table
            .codec()
            .encode(discriminant, position, bucket)
            .inspect_err(|err| debug!(%err, "append rejected"))?;
        buffer.try_reserve(slot_size)?;
        buffer.resize(offset + slot_size, 0);
        value.write_payload(&mut buffer[offset..]);
        trace!(discriminant, bucket, position, slot_size, "append");
        Ok(handle)
    }

    /// Copy the value named by a handle out of its bucket.
    ///
    /// Handles past the end of their bucket are reported as
    /// [`Error::OutOfBounds`]. A stale handle that still lands inside the
    /// bucket is not detected and returns whatever value occupies the slot
    /// now.
    pub fn get(&self, handle: Handle) -> Result<V, Error> {
        let (discriminant, bucket, range) = self.locate(handle)?;
        trace!(discriminant, bucket, offset = range.start, "get");
        self.read(discriminant, &self.buckets[bucket][range])
    }

    /// Remove the value named by a handle and return it.
    ///
    /// The bucket's last slot is copied into the removed slot, and the
    /// bucket shrinks by one slot. Any handle to that last slot is stale
    /// afterwards. Handles past the end of their bucket are reported as
    /// [`Error::OutOfBounds`] and nothing is removed.
    pub fn swap_remove(&mut self, handle: Handle) -> Result<V, Error> {
        let (discriminant, bucket, range) = self.locate(handle)?;
        let buffer = &self.buckets[bucket];
        let removed = self.read(discriminant, &buffer[range.clone()])?;
        let last = buffer.len() - range.len();

        let buffer = &mut self.buckets[bucket];
        if range.start != last {
            buffer.copy_within(last.., range.start);
        }
        buffer.truncate(last);
        trace!(
            discriminant,
            bucket,
            offset = range.start,
            moved_from = last,
            "swap_remove"
        );
        Ok(removed)
    }

    /// Number of slots currently in a bucket.
    ///
    /// Panics if the bucket index is out of range.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.buckets[bucket].len() / self.table.slot_size(bucket)
    }

    /// Raw contents of a bucket, a whole number of slots long.
    ///
    /// Panics if the bucket index is out of range.
    pub fn bucket_bytes(&self, bucket: usize) -> &[u8] {
        &self.buckets[bucket]
    }

    /// Number of values stored across all buckets.
    pub fn len(&self) -> usize {
        (0..self.buckets.len()).map(|b| self.bucket_len(b)).sum()
    }

    /// True if no bucket holds any value.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Remove every value, keeping the bucket allocations.
    ///
    /// All outstanding handles become stale.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
    }

    /// Used and allocated heap bytes across all bucket buffers.
    pub fn heap_size(&self) -> (usize, usize) {
        self.buckets
            .iter()
            .fold((0, 0), |(used, cap), b| (used + b.len(), cap + b.capacity()))
    }

    /// Resolve a handle to its discriminant, bucket, and byte range.
    fn locate(&self, handle: Handle) -> Result<(usize, usize, Range<usize>), Error> {
        let (discriminant, position) = self.table.codec().decode(handle);
        let (bucket, slot_size) = self.table.slot_of(discriminant)?;
        let slots = self.buckets[bucket].len() / slot_size;
        if position >= slots {
            debug!(discriminant, bucket, position, slots, "handle out of bounds");
            return Err(Error::OutOfBounds { position, slots });
        }
        let offset = position * slot_size;
        Ok((discriminant, bucket, offset..offset + slot_size))
    }

    /// Rebuild a value from the bytes of one slot.
    ///
    /// The discriminant was already resolved through the table, so a `None`
    /// here means the [`Variant`] implementation disagrees with its layouts.
    fn read(&self, discriminant: usize, slot: &[u8]) -> Result<V, Error> {
        V::read_payload(discriminant, slot).ok_or(Error::SchemaMismatch)
    }
}

/// Builder for [`UnionStore`] instances with custom settings
#[derive(Debug, Clone, Copy)]
pub struct StoreBuilder<'t, V: Variant> {
    /// Explicit table, or `None` for the schema's memoized table
    table: Option<&'t BucketTable>,
    /// Slots to reserve up front in every bucket
    reserve_slots: usize,
    /// Builds stores for this schema
    _variant: PhantomData<fn(V) -> V>,
}

impl<'t, V: Variant> StoreBuilder<'t, V> {
    /// Create a new [`StoreBuilder`] with default settings.
    ///
    /// Immediately calling [`Self::build()`] would be equivalent to using
    /// [`UnionStore::new()`].
    pub fn new() -> Self {
        Self {
            table: None,
            reserve_slots: 0,
            _variant: PhantomData,
        }
    }

    /// Use an explicitly configured [`BucketTable`] instead of the schema's
    /// shared one.
    pub fn table(&mut self, table: &'t BucketTable) -> &mut Self {
        self.table = Some(table);
        self
    }

    /// Reserve room for `slots` values in every bucket.
    pub fn reserve_slots(&mut self, slots: usize) -> &mut Self {
        self.reserve_slots = slots;
        self
    }

    /// Build an empty [`UnionStore`] with the selected options.
    ///
    /// Fails with [`Error::SchemaMismatch`] if the table, explicit or
    /// memoized, wasn't configured from [`Variant::LAYOUTS`], and with
    /// [`Error::Allocation`] if the reservation can't be made.
    pub fn build(&self) -> Result<UnionStore<'t, V>, Error> {
        let table = match self.table {
            Some(table) => table,
            None => V::bucket_table()?,
        };
        if !table.fits(V::LAYOUTS) {
            debug!("bucket table does not fit the schema layouts");
            return Err(Error::SchemaMismatch);
        }
        let mut buckets = Vec::with_capacity(table.bucket_count());
        for &slot_size in table.slot_sizes() {
            let mut buffer = Vec::new();
            if self.reserve_slots > 0 {
                // Oversized requests saturate and fail as a capacity overflow.
                buffer.try_reserve_exact(slot_size.saturating_mul(self.reserve_slots))?;
            }
            buckets.push(buffer);
        }
        Ok(UnionStore {
            table,
            buckets,
            _variant: PhantomData,
        })
    }
}

impl<'t, V: Variant> Default for StoreBuilder<'t, V> {
    fn default() -> Self {
        Self::new()
    }
}
