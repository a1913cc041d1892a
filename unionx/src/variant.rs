//! Variant schemas: the types a [`crate::UnionStore`] can hold
//!
//! A schema is a closed set of alternatives, each with a dense discriminant
//! starting at zero and a plain-data payload. The [`Variant`] trait exposes
//! that schema to the store, and [`crate::variant_schema!`] derives it for an
//! enum whose variants each carry a single [`bytemuck::Pod`] payload.

use crate::{BucketTable, Error, PayloadLayout};
use bytemuck::Pod;
use std::mem;
use std::sync::OnceLock;

/// A tagged union whose values can be packed into bucket slots
///
/// Implementations must agree with themselves: [`Self::discriminant`] is
/// always an index into [`Self::LAYOUTS`], [`Self::write_payload`] writes no
/// more than that layout's size, and [`Self::read_payload`] inverts it.
pub trait Variant: Sized {
    /// Payload layout of each alternative, indexed by discriminant
    const LAYOUTS: &'static [PayloadLayout];

    /// Discriminant of this value's alternative.
    fn discriminant(&self) -> usize;

    /// Copy this value's payload bytes to the front of `slot`.
    ///
    /// `slot` is exactly one slot wide for this value's bucket. Bytes past
    /// the payload are padding and their contents don't matter.
    fn write_payload(&self, slot: &mut [u8]);

    /// Rebuild a value from a discriminant and the bytes of its slot.
    ///
    /// Returns `None` if the discriminant is not part of the schema or the
    /// slot is too short for its payload.
    fn read_payload(discriminant: usize, slot: &[u8]) -> Option<Self>;

    /// The schema's bucket table, built on first use and shared afterwards.
    ///
    /// Fails with [`Error::SchemaTooWide`] every time if the schema can't be
    /// configured. See [`configure_once`] for a ready-made implementation.
    fn bucket_table() -> Result<&'static BucketTable, Error>;
}

/// Build a bucket table at most once, caching it in `cell`.
///
/// A failed configuration is cached too, so every caller sees the same
/// error.
pub fn configure_once(
    cell: &'static OnceLock<Result<BucketTable, Error>>,
    layouts: &[PayloadLayout],
) -> Result<&'static BucketTable, Error> {
    cell.get_or_init(|| BucketTable::configure(layouts))
        .as_ref()
        .map_err(Clone::clone)
}

/// Copy a plain-data payload to the front of a slot.
///
/// Panics if the slot is shorter than the payload.
#[inline(always)]
pub fn write_pod<T: Pod>(payload: &T, slot: &mut [u8]) {
    let bytes = bytemuck::bytes_of(payload);
    slot[..bytes.len()].copy_from_slice(bytes);
}

/// Read a plain-data payload from the front of a slot.
///
/// The slot needs no particular alignment. Returns `None` if it is shorter
/// than the payload.
#[inline(always)]
pub fn read_pod<T: Pod>(slot: &[u8]) -> Option<T> {
    let bytes = slot.get(..mem::size_of::<T>())?;
    bytemuck::try_pod_read_unaligned(bytes).ok()
}

/// Declare an enum of plain-data payloads and implement [`Variant`] for it.
///
/// Every variant must be a tuple variant with exactly one field whose type
/// implements [`bytemuck::Pod`]. Discriminants are assigned in declaration
/// order. Generic enums are not supported.
///
/// ```
/// unionx::variant_schema! {
///     #[derive(Clone, Copy, Debug, PartialEq)]
///     pub enum Value {
///         /// Small integer
///         Int(i32),
///         Float(f64),
///         Pair([u16; 2]),
///     }
/// }
///
/// use unionx::Variant;
/// assert_eq!(Value::Float(1.0).discriminant(), 1);
/// assert_eq!(Value::bucket_table()?.bucket_count(), 2);
/// # Ok::<(), unionx::Error>(())
/// ```
#[macro_export]
macro_rules! variant_schema {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident($payload:ty)
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant($payload),
            )+
        }

        impl $crate::Variant for $name {
            const LAYOUTS: &'static [$crate::PayloadLayout] = &[
                $( $crate::PayloadLayout::of::<$payload>(), )+
            ];

            fn discriminant(&self) -> usize {
                #[allow(non_camel_case_types, dead_code)]
                enum Tag {
                    $( $variant, )+
                }
                match self {
                    $( Self::$variant(_) => Tag::$variant as usize, )+
                }
            }

            fn write_payload(&self, slot: &mut [u8]) {
                match self {
                    $( Self::$variant(payload) => $crate::variant::write_pod(payload, slot), )+
                }
            }

            fn read_payload(discriminant: usize, slot: &[u8]) -> ::core::option::Option<Self> {
                #[allow(non_camel_case_types, dead_code)]
                enum Tag {
                    $( $variant, )+
                }
                $(
                    if discriminant == Tag::$variant as usize {
                        return $crate::variant::read_pod::<$payload>(slot).map(Self::$variant);
                    }
                )+
                ::core::option::Option::None
            }

            fn bucket_table(
            ) -> ::core::result::Result<&'static $crate::BucketTable, $crate::Error> {
                static TABLE: ::std::sync::OnceLock<
                    ::core::result::Result<$crate::BucketTable, $crate::Error>,
                > = ::std::sync::OnceLock::new();
                $crate::variant::configure_once(&TABLE, <Self as $crate::Variant>::LAYOUTS)
            }
        }
    };
}
