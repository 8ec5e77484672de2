//! The packing-function resolver.

use typepack_internals::RawStorage;

use crate::{DynamicValue, SourceType, markers::Strategy};

/// The uniform signature of every packing function.
///
/// A packing function reads one slot of a [`RawStorage`] and turns it into a
/// [`DynamicValue`]. Which slot it reads is not recorded anywhere at runtime,
/// so calling a packing function is `unsafe`: the storage must have been
/// populated for the same source type the function was resolved for.
pub type PackFn = unsafe fn(RawStorage<'_>) -> DynamicValue;

/// Returns the packing function for the source type `T`.
///
/// The choice is made entirely at compile time from the category of `T`, and
/// can be stored in a `const` or a table of function pointers:
///
/// | Category of `T` | Returned function |
/// |---|---|
/// | plain object | [`pack_object::<T>`](crate::pack::pack_object) |
/// | object pointer | [`pack_object_ptr::<T>`](crate::pack::pack_object_ptr) |
/// | function pointer | [`pack_function::<T>`](crate::pack::pack_function) |
/// | bare function type | [`pack_invalid::<T>`](crate::pack::pack_invalid) |
/// | member data pointer | [`pack_member_data`](crate::pack::pack_member_data) |
/// | member function pointer | [`pack_member_function`](crate::pack::pack_member_function) |
///
/// # Examples
///
/// ```
/// use typepack::{PackFn, RawStorage, resolve};
///
/// const PACK_I32: PackFn = resolve::<i32>();
///
/// let number = 42_i32;
/// // SAFETY: The storage holds an `i32`, which is what `PACK_I32` reads.
/// let value = unsafe { PACK_I32(RawStorage::from_object(&number)) };
/// assert_eq!(value.get::<i32>(), Some(42));
/// ```
///
/// The packing function of a bare function type ignores its storage:
///
/// ```
/// use typepack::{RawStorage, resolve};
///
/// let pack = resolve::<dyn Fn(u8) -> u8>();
/// // SAFETY: The returned function never reads the storage.
/// let value = unsafe { pack(RawStorage::from_member_data(8)) };
/// assert!(value.is_empty());
/// ```
#[inline]
#[must_use]
pub const fn resolve<T: SourceType + ?Sized>() -> PackFn {
    <T::Strategy as Strategy<T>>::pack
}
