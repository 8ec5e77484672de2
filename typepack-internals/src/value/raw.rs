//! Type-erased value pointer types.
//!
//! This module encapsulates the `ptr` field of [`RawValue`] and
//! [`RawValueRef`], ensuring it is only visible within this module. This
//! visibility restriction guarantees the safety invariant: **the pointer always
//! comes from `Box<ValueData<T>>`**.
//!
//! # Safety Invariant
//!
//! Since the `ptr` field can only be set via [`RawValue::new`] (which creates
//! it from `Box::into_raw`), and cannot be modified afterward (no `pub` or
//! `pub(crate)` fields), the pointer provenance remains valid throughout the
//! value's lifetime.
//!
//! The [`RawValue::drop`] implementation and [`RawValue::into_value_unchecked`]
//! rely on this invariant to safely reconstruct the `Box`.
//!
//! # Type Erasure
//!
//! The concrete type parameter `T` is erased by casting to
//! `ValueData<Erased>`. The vtable stored within the `ValueData` provides the
//! runtime type information needed to safely downcast, clone and drop values.

use alloc::boxed::Box;
use core::{any::TypeId, mem::ManuallyDrop, ptr::NonNull};

use crate::{util::Erased, value::data::ValueData};

/// A pointer to a [`ValueData`] that is guaranteed to point to an initialized
/// instance of a [`ValueData<T>`] for some specific `T`, though we do not know
/// which actual `T` it is.
///
/// However, the pointer is allowed to transition into a non-initialized state
/// inside the [`RawValue::drop`] method.
///
/// The pointer is guaranteed to have been created using [`Box::into_raw`].
///
/// We cannot use a [`Box<ValueData<T>>`] directly, because that does not
/// allow us to type-erase the `T`.
#[repr(transparent)]
pub struct RawValue {
    /// Pointer to the inner value data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<ValueData<T>>` for
    ///    some `T` using `Box::into_raw`.
    /// 2. The pointer will point to the same `ValueData<T>` for the entire
    ///    lifetime of this object.
    /// 3. The pointee is properly initialized for the entire lifetime of this
    ///    object, except during the execution of the `Drop` implementation.
    ptr: NonNull<ValueData<Erased>>,
}

impl RawValue {
    /// Creates a new [`RawValue`] owning `value`.
    #[inline]
    pub fn new<T>(value: T) -> Self
    where
        T: Clone + 'static,
    {
        let ptr = Box::new(ValueData::new(value));
        let ptr: *mut ValueData<T> = Box::into_raw(ptr);
        let ptr: *mut ValueData<Erased> = ptr.cast::<ValueData<Erased>>();

        // SAFETY: `Box::into_raw` returns a non-null pointer
        let ptr: NonNull<ValueData<Erased>> = unsafe { NonNull::new_unchecked(ptr) };

        Self { ptr }
    }

    /// Returns a reference to the [`ValueData`] instance.
    #[inline]
    pub fn as_ref(&self) -> RawValueRef<'_> {
        RawValueRef {
            ptr: self.ptr,
            _marker: core::marker::PhantomData,
        }
    }

    /// Returns the [`NonNull`] pointer to the [`ValueData`] instance.
    #[inline]
    pub(super) fn as_non_null(&self) -> NonNull<ValueData<Erased>> {
        self.ptr
    }

    /// Consumes the [`RawValue`] and moves the stored value out of its
    /// allocation.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual value type
    /// stored in the [`ValueData`].
    #[inline]
    pub unsafe fn into_value_unchecked<T: 'static>(self) -> T {
        debug_assert_eq!(self.as_ref().vtable().type_id(), TypeId::of::<T>());

        // The allocation is released below through the typed `Box`, so the erased
        // drop must not run as well.
        let this = ManuallyDrop::new(self);
        let ptr: *mut ValueData<T> = this.ptr.cast::<ValueData<T>>().as_ptr();

        // SAFETY: The pointer came from `Box::into_raw` on a `Box<ValueData<T>>`
        // (guaranteed by the invariants of `RawValue` and the caller). Ownership is
        // transferred here, since `this` is never dropped.
        let boxed: Box<ValueData<T>> = unsafe { Box::from_raw(ptr) };
        (*boxed).into_value()
    }
}

impl Clone for RawValue {
    #[inline]
    fn clone(&self) -> Self {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The vtable returned by `self.as_ref().vtable()` is guaranteed to match the
        //    data in the `ValueData`.
        unsafe { vtable.clone(self.as_ref()) }
    }
}

impl core::ops::Drop for RawValue {
    #[inline]
    fn drop(&mut self) {
        let vtable = self.as_ref().vtable();

        // SAFETY:
        // 1. The pointer comes from `Box::into_raw` (guaranteed by `RawValue::new`)
        // 2. The vtable returned by `self.as_ref().vtable()` is guaranteed to match the
        //    data in the `ValueData`.
        // 3. The pointer is initialized and has not been previously free as guaranteed
        //    by the invariants on this type. We are correctly transferring ownership
        //    here and the pointer is not used afterwards, as we are in the drop
        //    function.
        unsafe {
            vtable.drop(self.ptr);
        }
    }
}

/// A lifetime-bound pointer to a [`ValueData`] that is guaranteed to point to
/// an initialized instance of a [`ValueData<T>`] for some specific `T`, though
/// we do not know which actual `T` it is.
///
/// We cannot use a [`&'a ValueData<T>`] directly, because that would require
/// us to know the actual type of the value, which we do not.
///
/// [`&'a ValueData<T>`]: ValueData
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawValueRef<'a> {
    /// Pointer to the inner value data
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer must have been created from a `Box<ValueData<T>>` for
    ///    some `T` using `Box::into_raw`.
    /// 2. The pointer will point to the same `ValueData<T>` for the entire
    ///    lifetime of this object.
    ptr: NonNull<ValueData<Erased>>,

    /// Marker to tell the compiler that we should
    /// behave the same as a `&'a ValueData<Erased>`
    _marker: core::marker::PhantomData<&'a ValueData<Erased>>,
}

impl<'a> RawValueRef<'a> {
    /// Casts the [`RawValueRef`] to a [`ValueData<T>`] reference.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. The type `T` matches the actual value type stored in the
    ///    [`ValueData`].
    #[inline]
    pub(super) unsafe fn cast_inner<T: 'static>(self) -> &'a ValueData<T> {
        // Debug assertion to catch type mismatches in case of bugs
        debug_assert_eq!(self.vtable().type_id(), TypeId::of::<T>());

        let this = self.ptr.cast::<ValueData<T>>();
        // SAFETY: Converting the NonNull pointer to a reference is sound because:
        // - The pointer is non-null, properly aligned, and dereferenceable (guaranteed
        //   by RawValueRef's type invariants)
        // - The pointee is properly initialized (RawValueRef's doc comment guarantees
        //   it points to an initialized ValueData<T> for some T)
        // - The type `T` matches the actual value type (guaranteed by caller)
        // - Shared access is allowed
        // - The reference lifetime 'a is valid (tied to RawValueRef<'a>'s lifetime)
        unsafe { this.as_ref() }
    }

    /// Returns a raw pointer to the [`ValueData`] instance.
    #[inline]
    pub(super) fn as_ptr(self) -> *const ValueData<Erased> {
        self.ptr.as_ptr()
    }

    /// Returns the [`TypeId`] of the stored value.
    #[inline]
    pub fn value_type_id(self) -> TypeId {
        self.vtable().type_id()
    }

    /// Returns the [`core::any::type_name`] of the stored value.
    #[inline]
    pub fn value_type_name(self) -> &'static str {
        self.vtable().type_name()
    }
}
