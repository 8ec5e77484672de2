//! This module encapsulates the fields of the [`ValueData`]. Since this is
//! the only place they are visible, this means that the type of the
//! [`ValueVtable`] is guaranteed to always be in sync with the type of the
//! actual value. This follows from the fact that they are in sync when created
//! and that the API offers no way to change the [`ValueVtable`] or value type
//! after creation.

use core::ptr::NonNull;

use crate::value::{
    raw::{RawValue, RawValueRef},
    vtable::ValueVtable,
};

/// Type-erased value data structure with vtable-based dispatch.
///
/// This struct uses `#[repr(C)]` to enable safe field access in type-erased
/// contexts, allowing access to the vtable field even when the concrete value
/// type `T` is unknown.
#[repr(C)]
pub(super) struct ValueData<T: 'static> {
    /// The Vtable of this value
    vtable: &'static ValueVtable,
    /// The actual value
    value: T,
}

impl<T: Clone + 'static> ValueData<T> {
    /// Creates a new [`ValueData`] pairing `value` with the vtable for `T`.
    #[inline]
    pub(super) fn new(value: T) -> Self {
        Self {
            vtable: ValueVtable::new::<T>(),
            value,
        }
    }
}

impl<T: 'static> ValueData<T> {
    /// Moves the stored value out of the data structure.
    #[inline]
    pub(super) fn into_value(self) -> T {
        self.value
    }
}

impl<'a> RawValueRef<'a> {
    /// Returns a reference to the [`ValueVtable`] of the [`ValueData`]
    /// instance.
    #[inline]
    pub(super) fn vtable(self) -> &'static ValueVtable {
        let ptr = self.as_ptr();
        // SAFETY: We don't know the actual inner value type, but we do know
        // that it points to an instance of `ValueData<T>` for some specific `T`.
        // Since `ValueData<T>` is `#[repr(C)]`, that means that it's
        // safe to create pointers to the fields before the actual value.
        //
        // We need to take care to avoid creating an actual reference to
        // the `ValueData` itself though, as that would still be undefined behavior
        // since we don't have the right type.
        let vtable_ptr: *const &'static ValueVtable = unsafe { &raw const (*ptr).vtable };

        // SAFETY: Deferencing the pointer and getting out the `&'static
        // ValueVtable` is valid for the same reasons
        unsafe { *vtable_ptr }
    }

    /// Accesses the inner value of the [`ValueData`] instance as a reference
    /// to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual value type
    /// stored in the [`ValueData`].
    #[inline]
    pub unsafe fn value_downcast_unchecked<T: 'static>(self) -> &'a T {
        // SAFETY: The inner function requires that `T` matches the type stored, but
        // that is guaranteed by our caller.
        let this = unsafe { self.cast_inner::<T>() };
        &this.value
    }
}

impl RawValue {
    /// Accesses the inner value of the [`ValueData`] instance as a mutable
    /// reference to the specified type.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the type `T` matches the actual value type
    /// stored in the [`ValueData`].
    #[inline]
    pub unsafe fn value_downcast_mut_unchecked<T: 'static>(&mut self) -> &mut T {
        debug_assert_eq!(self.as_ref().vtable().type_id(), core::any::TypeId::of::<T>());

        let ptr: NonNull<ValueData<T>> = self.as_non_null().cast::<ValueData<T>>();
        let ptr: *mut ValueData<T> = ptr.as_ptr();
        // SAFETY: The pointer came from `Box::into_raw`, so it is valid and properly
        // aligned. The type `T` matches the stored type as guaranteed by the caller.
        // `RawValue` uniquely owns its allocation and we hold `&mut self`, so no
        // other reference to the data exists for the returned lifetime.
        let this: &mut ValueData<T> = unsafe { &mut *ptr };
        &mut this.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_field_offsets() {
        use core::mem::{offset_of, size_of};

        #[repr(align(32))]
        #[derive(Clone)]
        struct LargeAlignment {
            _value: u8,
        }

        assert_eq!(offset_of!(ValueData<u8>, vtable), 0);
        assert_eq!(offset_of!(ValueData<u32>, vtable), 0);
        assert_eq!(offset_of!(ValueData<[u64; 4]>, vtable), 0);
        assert_eq!(offset_of!(ValueData<LargeAlignment>, vtable), 0);

        assert!(offset_of!(ValueData<u8>, value) >= size_of::<&'static ValueVtable>());
        assert!(offset_of!(ValueData<u32>, value) >= size_of::<&'static ValueVtable>());
        assert!(offset_of!(ValueData<[u64; 4]>, value) >= size_of::<&'static ValueVtable>());
        assert!(
            offset_of!(ValueData<LargeAlignment>, value) >= size_of::<&'static ValueVtable>()
        );
    }

    #[test]
    fn test_value_data_into_value() {
        let data = ValueData::new(17_u16);
        assert_eq!(data.into_value(), 17);
    }
}
