//! Marker types naming the packing strategy of a source type.
//!
//! Each [`SourceType`](crate::SourceType) names one of the markers below as
//! its `Strategy`. The marker decides, at compile time:
//!
//! - the [`Category`] of the type,
//! - which slot of the [`RawStorage`] a value of the type is written to,
//! - which packing function reads that slot back.
//!
//! Since writer and reader come from the same [`Strategy`] implementation, the
//! storage a value is written to always matches the packing function that is
//! resolved for it.
//!
//! # Available Markers
//!
//! | Marker | Category | Accepted types |
//! |---|---|---|
//! | [`PlainObject`] | [`Category::PlainObject`] | any `Clone + 'static` type |
//! | [`ObjectPointer`] | [`Category::ObjectPointer`] | [`ObjectPtr`] types |
//! | [`FunctionPointer`] | [`Category::FunctionPointer`] | [`FnPtr`] types |
//! | [`BareFunction`] | [`Category::BareFunctionType`] | [`BareFn`] types |
//! | [`MemberData`] | [`Category::MemberDataPointer`] | [`Field`] |
//! | [`MemberFunction`] | [`Category::MemberFunctionPointer`] | [`Method`] |
//!
//! The trait bounds on the implementations of [`Strategy`] are what makes the
//! classification trustworthy: a user type can name [`PlainObject`], but it
//! cannot name [`ObjectPointer`], because [`ObjectPtr`] is sealed.
//!
//! # Examples
//!
//! ```
//! use typepack::{Category, SourceType, category_of, markers};
//!
//! #[derive(Clone)]
//! struct Celsius(f32);
//!
//! impl SourceType for Celsius {
//!     type Strategy = markers::PlainObject;
//! }
//!
//! assert_eq!(category_of::<Celsius>(), Category::PlainObject);
//! ```
//!
//! [`ObjectPtr`]: crate::pointer::ObjectPtr
//! [`FnPtr`]: crate::pointer::FnPtr
//! [`BareFn`]: crate::pointer::BareFn
//! [`Field`]: crate::Field
//! [`Method`]: crate::Method

use core::alloc::Layout;

use typepack_internals::RawStorage;

use crate::{Category, DynamicValue};

/// Marker for types whose values are copied into the dynamic value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct PlainObject;

/// Marker for raw object pointers. The pointer is stored, not the pointee.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct ObjectPointer;

/// Marker for pointers to free functions.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct FunctionPointer;

/// Marker for function types that cannot be held by value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct BareFunction;

/// Marker for typed field offsets.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct MemberData;

/// Marker for receiver-first function pointers.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default, Hash)]
pub struct MemberFunction;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::PlainObject {}
    impl Sealed for super::ObjectPointer {}
    impl Sealed for super::FunctionPointer {}
    impl Sealed for super::BareFunction {}
    impl Sealed for super::MemberData {}
    impl Sealed for super::MemberFunction {}
}

/// A packing strategy for the source type `T`.
///
/// This trait is sealed and implemented only by the markers in this module.
/// The implementations live in [`pack`](crate::pack).
pub trait Strategy<T: ?Sized>: sealed::Sealed + 'static {
    /// The category of every type using this strategy.
    const CATEGORY: Category;

    /// The layout of `T`, or `None` when `T` is unsized.
    const LAYOUT: Option<Layout>;

    /// Writes the raw representation of `value` into a fresh storage.
    fn store(value: &T) -> RawStorage<'_>;

    /// Packs a storage written by [`Strategy::store`] into a dynamic value.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `storage` was produced by [`Strategy::store`] of this strategy for
    ///    this `T`, or was populated with the same slot the same way.
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue;
}
