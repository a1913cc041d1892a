//! Error types for the `unionx` crate

use std::collections::TryReserveError;

/// Errors reported while configuring a schema or operating on a store
///
/// Every reported error leaves the store exactly as it was before the
/// failing call.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The schema needs more distinct slot sizes than there are buckets.
    ///
    /// This is detected while building the [`crate::BucketTable`], before
    /// any store for the schema can exist. The schema itself must change.
    #[error("variant schema needs more than {limit} distinct slot sizes")]
    SchemaTooWide {
        /// Maximum number of buckets per schema
        limit: usize,
    },

    /// The allocator could not grow a bucket buffer.
    #[error("failed to grow bucket buffer: {0}")]
    Allocation(#[from] TryReserveError),

    /// A bucket has issued so many positions that the next one no longer
    /// fits in the position bits of a [`crate::Handle`].
    #[error("bucket {bucket} exhausted its handle index space at position {position}")]
    IndexSpaceExhausted {
        /// Index of the full bucket
        bucket: usize,
        /// Position that could not be encoded
        position: usize,
    },

    /// A handle names a position past the last slot of its bucket.
    #[error("slot position {position} is out of bounds for a bucket of {slots} slots")]
    OutOfBounds {
        /// Position decoded from the handle
        position: usize,
        /// Number of slots currently in the bucket
        slots: usize,
    },

    /// A discriminant that isn't part of the schema.
    ///
    /// Only reachable through handles built with [`crate::Handle::from_raw`]
    /// or a hand-written [`crate::Variant`] implementation that disagrees
    /// with its own layout list.
    #[error("discriminant {0} is not part of the variant schema")]
    UnknownDiscriminant(usize),

    /// A [`crate::BucketTable`] configured for a different schema was given
    /// to a store, or a [`crate::Variant`] implementation disagrees with its
    /// own layouts.
    #[error("bucket table does not match the variant schema of this store")]
    SchemaMismatch,
}
