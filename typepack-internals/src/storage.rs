//! The raw storage container handed to packing functions.
//!
//! A [`RawStorage`] carries exactly one raw representation of a source value
//! across a single packing call. It deliberately has no runtime tag: which of
//! the four slots is meaningful is decided by the packing function that reads
//! it, and that choice is made at compile time from the source type.
//!
//! # Safety Invariant
//!
//! Writers are safe, readers are `unsafe`. A reader may only be called on a
//! storage whose matching writer was used:
//!
//! | writer | reader |
//! |---|---|
//! | [`RawStorage::from_object`], [`RawStorage::from_object_ptr`] | [`RawStorage::object`], [`RawStorage::object_ptr`] |
//! | [`RawStorage::from_member_data`] | [`RawStorage::member_data`] |
//! | [`RawStorage::from_function`] | [`RawStorage::function`] |
//! | [`RawStorage::from_member_function`] | [`RawStorage::member_function`] |
//!
//! [`RawStorage::empty`] writes a null object pointer, so only
//! [`RawStorage::object_ptr`] may be called on it.

use core::marker::PhantomData;

/// Untyped function pointer used to carry the bit pattern of any function
/// pointer.
///
/// A value of this type must never be called directly. It is only converted
/// back to the function pointer type it was created from, using
/// [`reinterpret::raw_to_fn`](crate::reinterpret::raw_to_fn).
pub type RawFn = fn();

/// The four pointer-sized representations a source value can be packed from.
#[derive(Clone, Copy)]
#[repr(C)]
union RawSlot {
    /// Untyped pointer to an object, or the value of an object pointer
    object: *const (),
    /// Byte offset of a field inside its containing type
    member_data: usize,
    /// Bit pattern of a free function pointer
    function: RawFn,
    /// Bit pattern of a receiver-first function pointer
    member_function: RawFn,
}

/// Raw storage container for a single packing operation.
///
/// The lifetime `'a` is the borrow of the object written by
/// [`RawStorage::from_object`]. The container asserts no ownership of that
/// object and the reader gets it back with the same lifetime, so a packing
/// function cannot keep it past the call.
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct RawStorage<'a> {
    /// The single slot shared by all four representations
    slot: RawSlot,
    /// Marker to tell the compiler that we should behave like a `&'a ()`
    _marker: PhantomData<&'a ()>,
}

impl<'a> RawStorage<'a> {
    /// Creates a storage with a null object pointer.
    ///
    /// Used for source types that have nothing to pack.
    #[inline]
    pub const fn empty() -> Self {
        Self::from_erased_ptr(core::ptr::null())
    }

    /// Stores a borrowed pointer to `object`.
    #[inline]
    pub const fn from_object<T>(object: &'a T) -> Self {
        let ptr: *const T = object;
        Self::from_erased_ptr(ptr.cast::<()>())
    }

    /// Stores the value of an object pointer.
    ///
    /// The pointer itself is the payload; it is not dereferenced by this crate.
    #[inline]
    pub const fn from_object_ptr<T>(ptr: *const T) -> Self {
        Self::from_erased_ptr(ptr.cast::<()>())
    }

    /// Stores the byte offset of a field inside its containing type.
    #[inline]
    pub const fn from_member_data(offset: usize) -> Self {
        Self {
            slot: RawSlot {
                member_data: offset,
            },
            _marker: PhantomData,
        }
    }

    /// Stores the bit pattern of a free function pointer.
    #[inline]
    pub const fn from_function(function: RawFn) -> Self {
        Self {
            slot: RawSlot { function },
            _marker: PhantomData,
        }
    }

    /// Stores the bit pattern of a receiver-first function pointer.
    #[inline]
    pub const fn from_member_function(member_function: RawFn) -> Self {
        Self {
            slot: RawSlot { member_function },
            _marker: PhantomData,
        }
    }

    /// Shared constructor for the object slot.
    #[inline]
    const fn from_erased_ptr(object: *const ()) -> Self {
        Self {
            slot: RawSlot { object },
            _marker: PhantomData,
        }
    }

    /// Reads the object slot back as a reference to `T`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created with [`RawStorage::from_object`] from a
    ///    `&'a T` with exactly this `T`.
    #[inline]
    pub unsafe fn object<T>(self) -> &'a T {
        // SAFETY: The object slot was written, as guaranteed by the caller.
        let ptr: *const () = unsafe { self.slot.object };
        let ptr: *const T = ptr.cast::<T>();
        // SAFETY: The pointer came from a `&'a T`, so it is non-null, aligned and
        // points to an initialized `T` that lives for at least `'a`.
        unsafe { &*ptr }
    }

    /// Reads the object slot as an untyped pointer.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created with [`RawStorage::empty`],
    ///    [`RawStorage::from_object`] or [`RawStorage::from_object_ptr`].
    #[inline]
    pub unsafe fn object_ptr(self) -> *const () {
        // SAFETY: The object slot was written, as guaranteed by the caller.
        unsafe { self.slot.object }
    }

    /// Reads the field offset slot.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created with [`RawStorage::from_member_data`].
    #[inline]
    pub unsafe fn member_data(self) -> usize {
        // SAFETY: The member data slot was written, as guaranteed by the caller.
        unsafe { self.slot.member_data }
    }

    /// Reads the free function pointer slot.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created with [`RawStorage::from_function`].
    #[inline]
    pub unsafe fn function(self) -> RawFn {
        // SAFETY: The function slot was written, as guaranteed by the caller.
        unsafe { self.slot.function }
    }

    /// Reads the receiver-first function pointer slot.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. This storage was created with [`RawStorage::from_member_function`].
    #[inline]
    pub unsafe fn member_function(self) -> RawFn {
        // SAFETY: The member function slot was written, as guaranteed by the
        // caller.
        unsafe { self.slot.member_function }
    }
}

impl core::fmt::Debug for RawStorage<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // The valid slot is unknown here, so none of them can be read.
        f.debug_struct("RawStorage").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() {}

    #[test]
    fn test_raw_storage_size() {
        assert_eq!(
            core::mem::size_of::<RawStorage<'_>>(),
            core::mem::size_of::<usize>()
        );
        assert_eq!(
            core::mem::align_of::<RawStorage<'_>>(),
            core::mem::align_of::<usize>()
        );
        assert_eq!(
            core::mem::size_of::<RawFn>(),
            core::mem::size_of::<*const ()>()
        );
    }

    #[test]
    fn test_object_slot() {
        let value: u64 = 0xdead_beef;
        let storage = RawStorage::from_object(&value);

        // SAFETY: Written by `from_object` with `u64`.
        let read: &u64 = unsafe { storage.object::<u64>() };
        assert!(core::ptr::eq(read, &value));
        assert_eq!(*read, 0xdead_beef);
    }

    #[test]
    fn test_object_ptr_slot() {
        let value = 7_i32;
        let ptr: *const i32 = &value;
        let storage = RawStorage::from_object_ptr(ptr);

        // SAFETY: Written by `from_object_ptr`.
        let read = unsafe { storage.object_ptr() };
        assert_eq!(read, ptr.cast::<()>());
    }

    #[test]
    fn test_empty_is_null() {
        let storage = RawStorage::empty();
        // SAFETY: `empty` writes the object slot.
        let read = unsafe { storage.object_ptr() };
        assert!(read.is_null());
    }

    #[test]
    fn test_member_data_slot() {
        let storage = RawStorage::from_member_data(24);
        // SAFETY: Written by `from_member_data`.
        assert_eq!(unsafe { storage.member_data() }, 24);
    }

    #[test]
    fn test_function_slots() {
        let function: RawFn = marker;

        let storage = RawStorage::from_function(function);
        // SAFETY: Written by `from_function`.
        let read = unsafe { storage.function() };
        assert!(core::ptr::fn_addr_eq(read, function));

        let storage = RawStorage::from_member_function(function);
        // SAFETY: Written by `from_member_function`.
        let read = unsafe { storage.member_function() };
        assert!(core::ptr::fn_addr_eq(read, function));
    }

    #[test]
    fn test_storage_is_copy() {
        let value = 1_u8;
        let storage = RawStorage::from_object(&value);
        let copy = storage;

        // SAFETY: Written by `from_object`.
        let a = unsafe { storage.object_ptr() };
        // SAFETY: Copied from a storage written by `from_object`.
        let b = unsafe { copy.object_ptr() };
        assert_eq!(a, b);
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_not_impl_any!(RawStorage<'static>: Send, Sync);
    }
}
