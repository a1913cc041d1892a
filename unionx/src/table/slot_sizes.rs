//! Bounded list of distinct slot sizes
//!
//! Bucket configuration walks the schema once and needs to know whether it
//! has already seen a slot size. Schemas are small, so a linear scan over a
//! fixed-capacity [`ArrayVec`] is plenty. The position of a size within the
//! list is the index of the bucket that holds it.

use arrayvec::ArrayVec;

/// Distinct slot sizes in order of first appearance, at most `CAP` of them
#[derive(Debug, Clone, Default)]
pub(crate) struct SlotSizes<const CAP: usize>(ArrayVec<usize, CAP>);

impl<const CAP: usize> SlotSizes<CAP> {
    /// Start with no sizes recorded.
    pub(crate) fn new() -> Self {
        Self(ArrayVec::new())
    }

    /// Index of `size` within the list, if it was seen before.
    pub(crate) fn position(&self, size: usize) -> Option<usize> {
        self.0.iter().position(|&s| s == size)
    }

    /// Append a new size, returning its index.
    ///
    /// If the list is full, returns `Err(())` and makes no changes.
    pub(crate) fn push(&mut self, size: usize) -> Result<usize, ()> {
        let index = self.0.len();
        self.0.try_push(size).map_err(|_| ())?;
        Ok(index)
    }

    /// Find `size`, or append it if it's new.
    ///
    /// If `size` is new and the list is full, returns `Err(())`.
    pub(crate) fn find_or_push(&mut self, size: usize) -> Result<usize, ()> {
        match self.position(size) {
            Some(index) => Ok(index),
            None => self.push(size),
        }
    }

    /// Number of distinct sizes recorded.
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    /// Recorded sizes, indexed by bucket.
    pub(crate) fn as_slice(&self) -> &[usize] {
        &self.0
    }
}
