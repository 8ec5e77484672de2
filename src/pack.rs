//! Packing functions and the strategy implementations that pair them with a
//! writer.
//!
//! Every packing function has the shape of a [`PackFn`](crate::PackFn): it
//! takes a [`RawStorage`] and returns a [`DynamicValue`]. Which slot of the
//! storage it reads is fixed by its category:
//!
//! | Function | Reads | Produces |
//! |---|---|---|
//! | [`pack_object`] | the object slot, as `&T` | a clone of the object |
//! | [`pack_object_ptr`] | the object slot, as an address | the pointer itself |
//! | [`pack_function`] | the function slot | the function pointer |
//! | [`pack_invalid`] | nothing | the empty value |
//! | [`pack_member_data`] | the member data slot | a [`Field`] |
//! | [`pack_member_function`] | the member function slot | a [`Method`] |
//!
//! None of these functions inspect the storage to find out what it holds; the
//! storage carries no tag. Calling one on a storage populated for another
//! category is undefined behavior, which is why they are `unsafe`.

use core::alloc::Layout;

use typepack_internals::RawStorage;

use crate::{
    Category, DynamicValue, Field, Method,
    markers::{
        BareFunction, FunctionPointer, MemberData, MemberFunction, ObjectPointer, PlainObject,
        Strategy,
    },
    pointer::{BareFn, FnPtr, MethodFn, ObjectPtr},
};

/// Packs a plain object by cloning it out of the storage.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` holds an object reference to a live `T`, as written by
///    [`RawStorage::from_object`].
///
/// # Examples
///
/// ```
/// use typepack::{RawStorage, pack::pack_object};
///
/// let number = 42_i32;
/// let storage = RawStorage::from_object(&number);
///
/// // SAFETY: The storage refers to an `i32`.
/// let value = unsafe { pack_object::<i32>(storage) };
/// assert_eq!(value.get::<i32>(), Some(42));
/// ```
pub unsafe fn pack_object<T: Clone + 'static>(storage: RawStorage<'_>) -> DynamicValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let object: &T = unsafe { storage.object::<T>() };
    DynamicValue::from_value(object.clone())
}

/// Packs an object pointer. The pointer is copied, the pointee is not read.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` holds an object pointer erased from a `P`, as written by
///    [`RawStorage::from_object_ptr`] with [`ObjectPtr::into_erased`].
pub unsafe fn pack_object_ptr<P: ObjectPtr>(storage: RawStorage<'_>) -> DynamicValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let erased = unsafe { storage.object_ptr() };
    // SAFETY:
    // 1. Guaranteed by the caller
    let ptr = unsafe { P::from_erased(erased) };
    DynamicValue::from_value(ptr)
}

/// Packs a pointer to a free function.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` holds the bit pattern of an `F`, as written by
///    [`RawStorage::from_function`] with [`FnPtr::to_raw`].
pub unsafe fn pack_function<F: FnPtr>(storage: RawStorage<'_>) -> DynamicValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let raw = unsafe { storage.function() };
    // SAFETY:
    // 1. Guaranteed by the caller
    let function = unsafe { F::from_raw(raw) };
    DynamicValue::from_value(function)
}

/// Packing function for types that cannot be packed. Always returns the empty
/// value, whatever the storage holds.
///
/// # Safety
///
/// This function never reads the storage and is always safe to call. It is
/// declared `unsafe` only so that it has the shape of a
/// [`PackFn`](crate::PackFn).
///
/// # Examples
///
/// ```
/// use typepack::{RawStorage, pack::pack_invalid};
///
/// let number = 7_u64;
/// // SAFETY: `pack_invalid` does not read the storage.
/// let value = unsafe { pack_invalid::<dyn Fn()>(RawStorage::from_object(&number)) };
/// assert!(value.is_empty());
/// ```
pub unsafe fn pack_invalid<T: ?Sized>(_storage: RawStorage<'_>) -> DynamicValue {
    DynamicValue::empty()
}

/// Packs a field offset into a [`Field<C, F>`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` holds the offset of a field of type `F` inside `C`, as
///    written by [`RawStorage::from_member_data`] with [`Field::offset`].
pub unsafe fn pack_member_data<C: 'static, F: 'static>(storage: RawStorage<'_>) -> DynamicValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let offset = unsafe { storage.member_data() };
    // SAFETY:
    // 1. Guaranteed by the caller
    let field = unsafe { Field::<C, F>::from_offset(offset) };
    DynamicValue::from_value(field)
}

/// Packs a receiver-first function pointer into a [`Method<C, F>`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `storage` holds the bit pattern of an `F`, as written by
///    [`RawStorage::from_member_function`] with [`MethodFn::to_raw`].
pub unsafe fn pack_member_function<C: 'static, F: MethodFn<C>>(
    storage: RawStorage<'_>,
) -> DynamicValue {
    // SAFETY:
    // 1. Guaranteed by the caller
    let raw = unsafe { storage.member_function() };
    // SAFETY:
    // 1. Guaranteed by the caller
    let function = unsafe { F::from_raw(raw) };
    DynamicValue::from_value(Method::<C, F>::new(function))
}

impl<T: Clone + 'static> Strategy<T> for PlainObject {
    const CATEGORY: Category = Category::PlainObject;
    const LAYOUT: Option<Layout> = Some(Layout::new::<T>());

    #[inline]
    fn store(value: &T) -> RawStorage<'_> {
        RawStorage::from_object(value)
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller, `store` writes an object reference
        unsafe { pack_object::<T>(storage) }
    }
}

impl<P: ObjectPtr> Strategy<P> for ObjectPointer {
    const CATEGORY: Category = Category::ObjectPointer;
    const LAYOUT: Option<Layout> = Some(Layout::new::<P>());

    #[inline]
    fn store(value: &P) -> RawStorage<'_> {
        RawStorage::from_object_ptr(value.into_erased())
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller, `store` writes an erased `P`
        unsafe { pack_object_ptr::<P>(storage) }
    }
}

impl<F: FnPtr> Strategy<F> for FunctionPointer {
    const CATEGORY: Category = Category::FunctionPointer;
    const LAYOUT: Option<Layout> = Some(Layout::new::<F>());

    #[inline]
    fn store(value: &F) -> RawStorage<'_> {
        RawStorage::from_function(value.to_raw())
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller, `store` writes the bit pattern of an `F`
        unsafe { pack_function::<F>(storage) }
    }
}

impl<T: ?Sized + BareFn> Strategy<T> for BareFunction {
    const CATEGORY: Category = Category::BareFunctionType;
    const LAYOUT: Option<Layout> = None;

    #[inline]
    fn store(_value: &T) -> RawStorage<'_> {
        RawStorage::empty()
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. `pack_invalid` does not read the storage
        unsafe { pack_invalid::<T>(storage) }
    }
}

impl<C: 'static, F: 'static> Strategy<Field<C, F>> for MemberData {
    const CATEGORY: Category = Category::MemberDataPointer;
    const LAYOUT: Option<Layout> = Some(Layout::new::<Field<C, F>>());

    #[inline]
    fn store(value: &Field<C, F>) -> RawStorage<'_> {
        RawStorage::from_member_data(value.offset())
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller, `store` writes the offset of a `Field<C, F>`
        unsafe { pack_member_data::<C, F>(storage) }
    }
}

impl<C: 'static, F: MethodFn<C>> Strategy<Method<C, F>> for MemberFunction {
    const CATEGORY: Category = Category::MemberFunctionPointer;
    const LAYOUT: Option<Layout> = Some(Layout::new::<Method<C, F>>());

    #[inline]
    fn store(value: &Method<C, F>) -> RawStorage<'_> {
        RawStorage::from_member_function(value.function().to_raw())
    }

    #[inline]
    unsafe fn pack(storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller, `store` writes the bit pattern of an `F`
        unsafe { pack_member_function::<C, F>(storage) }
    }
}
