//! Classification primitives for pointer-like source types.
//!
//! The traits in this module answer questions such as "is this a pointer to a
//! free function" at the type level. They are sealed: the set of implementing
//! types is fixed by this crate, which is what lets the
//! [`markers`](crate::markers) trust them.
//!
//! - [`ObjectPtr`]: `*const T`, `*mut T` and `NonNull<T>` for sized `T`.
//! - [`FnPtr`]: `fn`, `unsafe fn`, `extern "C" fn` and `unsafe extern "C" fn`
//!   pointers with up to six arguments.
//! - [`MethodFn<C>`]: `fn(&C, ..) -> R` and `fn(&mut C, ..) -> R` with up to
//!   four arguments after the receiver.
//! - [`BareFn`]: `dyn Fn`, `dyn FnMut` and `dyn FnOnce` with up to six
//!   arguments.
//!
//! Function pointers whose arguments borrow with a free lifetime, like
//! `fn(&str) -> usize`, are higher-ranked types and are not covered by
//! [`FnPtr`]. A method taking a receiver by reference is covered by
//! [`MethodFn`] instead.

use core::ptr::NonNull;

use typepack_internals::{RawFn, reinterpret};

mod sealed {
    pub trait Sealed {}

    pub trait SealedMethod<C: ?Sized> {}
}

/// A raw pointer to a sized object.
///
/// The pointer is converted to an untyped address and back without being
/// dereferenced.
pub trait ObjectPtr: Copy + 'static + sealed::Sealed {
    /// Erases the pointee type of the pointer.
    fn into_erased(self) -> *const ();

    /// Restores a pointer erased by [`ObjectPtr::into_erased`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `ptr` was produced by [`ObjectPtr::into_erased`] on a value of this
    ///    same type.
    unsafe fn from_erased(ptr: *const ()) -> Self;
}

impl<T: 'static> sealed::Sealed for *const T {}
impl<T: 'static> ObjectPtr for *const T {
    #[inline]
    fn into_erased(self) -> *const () {
        self.cast::<()>()
    }

    #[inline]
    unsafe fn from_erased(ptr: *const ()) -> Self {
        ptr.cast::<T>()
    }
}

impl<T: 'static> sealed::Sealed for *mut T {}
impl<T: 'static> ObjectPtr for *mut T {
    #[inline]
    fn into_erased(self) -> *const () {
        self.cast_const().cast::<()>()
    }

    #[inline]
    unsafe fn from_erased(ptr: *const ()) -> Self {
        ptr.cast_mut().cast::<T>()
    }
}

impl<T: 'static> sealed::Sealed for NonNull<T> {}
impl<T: 'static> ObjectPtr for NonNull<T> {
    #[inline]
    fn into_erased(self) -> *const () {
        self.as_ptr().cast_const().cast::<()>()
    }

    #[inline]
    unsafe fn from_erased(ptr: *const ()) -> Self {
        let ptr: *mut T = ptr.cast_mut().cast::<T>();
        // SAFETY: `ptr` came from `into_erased` on a `NonNull<T>`, as guaranteed by
        // the caller, so it is not null.
        unsafe { NonNull::new_unchecked(ptr) }
    }
}

/// A pointer to a free function.
///
/// # Examples
///
/// ```
/// use typepack::pointer::FnPtr;
///
/// fn double(value: i32) -> i32 {
///     value * 2
/// }
///
/// let function: fn(i32) -> i32 = double;
/// let raw = function.to_raw();
///
/// // SAFETY: `raw` was produced from a `fn(i32) -> i32`.
/// let restored = unsafe { <fn(i32) -> i32 as FnPtr>::from_raw(raw) };
/// assert_eq!(restored(21), 42);
/// assert_eq!(<fn(i32) -> i32 as FnPtr>::ARITY, 1);
/// ```
pub trait FnPtr: Copy + 'static + sealed::Sealed {
    /// The number of arguments of the function.
    const ARITY: usize;

    /// Whether calling the function requires `unsafe`.
    const IS_UNSAFE: bool;

    /// Erases the signature of the function pointer, keeping its bit pattern.
    fn to_raw(self) -> RawFn;

    /// Restores a function pointer erased by [`FnPtr::to_raw`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `raw` was produced by [`FnPtr::to_raw`] on a value of this same
    ///    type.
    unsafe fn from_raw(raw: RawFn) -> Self;
}

/// A function pointer taking a receiver of type `C` as its first argument.
///
/// This is the shape of a method, and is what [`Method`](crate::Method)
/// stores.
pub trait MethodFn<C: ?Sized>: Copy + 'static + sealed::SealedMethod<C> {
    /// The number of arguments of the function, not counting the receiver.
    const ARITY: usize;

    /// Whether the receiver is taken by `&mut C` rather than `&C`.
    const MUTABLE_RECEIVER: bool;

    /// Erases the signature of the function pointer, keeping its bit pattern.
    fn to_raw(self) -> RawFn;

    /// Restores a function pointer erased by [`MethodFn::to_raw`].
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `raw` was produced by [`MethodFn::to_raw`] on a value of this same
    ///    type.
    unsafe fn from_raw(raw: RawFn) -> Self;
}

/// A function type that cannot be held by value.
///
/// Such types are unsized, so no value of them can be copied into a dynamic
/// value. They are classified as
/// [`Category::BareFunctionType`](crate::Category::BareFunctionType).
pub trait BareFn: 'static + sealed::Sealed {}

macro_rules! count {
    () => { 0 };
    ($head:ident $($tail:ident)*) => { 1 + count!($($tail)*) };
}

macro_rules! impl_fn_ptr {
    ($($arg:ident),*) => {
        impl_fn_ptr!(@one false, [fn($($arg),*) -> R], $($arg),*);
        impl_fn_ptr!(@one true, [unsafe fn($($arg),*) -> R], $($arg),*);
        impl_fn_ptr!(@one false, [extern "C" fn($($arg),*) -> R], $($arg),*);
        impl_fn_ptr!(@one true, [unsafe extern "C" fn($($arg),*) -> R], $($arg),*);

        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for dyn Fn($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> BareFn for dyn Fn($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for dyn FnMut($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> BareFn for dyn FnMut($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for dyn FnOnce($($arg),*) -> R {}
        impl<R: 'static, $($arg: 'static),*> BareFn for dyn FnOnce($($arg),*) -> R {}
    };
    (@one $unsafe:literal, [$($fn_ty:tt)*], $($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> sealed::Sealed for $($fn_ty)* {}

        impl<R: 'static, $($arg: 'static),*> FnPtr for $($fn_ty)* {
            const ARITY: usize = count!($($arg)*);
            const IS_UNSAFE: bool = $unsafe;

            #[inline]
            fn to_raw(self) -> RawFn {
                // SAFETY: `Self` is a function pointer type.
                unsafe { reinterpret::fn_to_raw(self) }
            }

            #[inline]
            unsafe fn from_raw(raw: RawFn) -> Self {
                // SAFETY: `Self` is a function pointer type and `raw` came from
                // `to_raw` on a `Self`, as guaranteed by the caller.
                unsafe { reinterpret::raw_to_fn::<Self>(raw) }
            }
        }
    };
}

impl_fn_ptr!();
impl_fn_ptr!(A1);
impl_fn_ptr!(A1, A2);
impl_fn_ptr!(A1, A2, A3);
impl_fn_ptr!(A1, A2, A3, A4);
impl_fn_ptr!(A1, A2, A3, A4, A5);
impl_fn_ptr!(A1, A2, A3, A4, A5, A6);

macro_rules! impl_method_fn {
    ($($arg:ident),*) => {
        impl_method_fn!(@one false, [fn(&C $(, $arg)*) -> R], $($arg),*);
        impl_method_fn!(@one true, [fn(&mut C $(, $arg)*) -> R], $($arg),*);
    };
    (@one $mutable:literal, [$($fn_ty:tt)*], $($arg:ident),*) => {
        impl<C: 'static, R: 'static, $($arg: 'static),*> sealed::SealedMethod<C> for $($fn_ty)* {}

        impl<C: 'static, R: 'static, $($arg: 'static),*> MethodFn<C> for $($fn_ty)* {
            const ARITY: usize = count!($($arg)*);
            const MUTABLE_RECEIVER: bool = $mutable;

            #[inline]
            fn to_raw(self) -> RawFn {
                // SAFETY: `Self` is a function pointer type.
                unsafe { reinterpret::fn_to_raw(self) }
            }

            #[inline]
            unsafe fn from_raw(raw: RawFn) -> Self {
                // SAFETY: `Self` is a function pointer type and `raw` came from
                // `to_raw` on a `Self`, as guaranteed by the caller.
                unsafe { reinterpret::raw_to_fn::<Self>(raw) }
            }
        }
    };
}

impl_method_fn!();
impl_method_fn!(A1);
impl_method_fn!(A1, A2);
impl_method_fn!(A1, A2, A3);
impl_method_fn!(A1, A2, A3, A4);

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() {}

    fn sum3(a: u8, b: u8, c: u8) -> u8 {
        a + b + c
    }

    struct Counter {
        value: u32,
    }

    fn counter_get(counter: &Counter) -> u32 {
        counter.value
    }

    fn counter_add(counter: &mut Counter, amount: u32) {
        counter.value += amount;
    }

    #[test]
    fn test_fn_ptr_metadata() {
        assert_eq!(<fn() as FnPtr>::ARITY, 0);
        assert_eq!(<fn(u8, u8, u8) -> u8 as FnPtr>::ARITY, 3);
        assert_eq!(
            <fn(u8, u8, u8, u8, u8, u8) -> u8 as FnPtr>::ARITY,
            6
        );
        assert!(!<fn() as FnPtr>::IS_UNSAFE);
        assert!(<unsafe fn() as FnPtr>::IS_UNSAFE);
        assert!(<unsafe extern "C" fn(i32) as FnPtr>::IS_UNSAFE);
        assert!(!<extern "C" fn(i32) as FnPtr>::IS_UNSAFE);
    }

    #[test]
    fn test_fn_ptr_roundtrip() {
        let function: fn(u8, u8, u8) -> u8 = sum3;
        let raw = function.to_raw();
        // SAFETY: `raw` came from a `fn(u8, u8, u8) -> u8`.
        let restored = unsafe { <fn(u8, u8, u8) -> u8 as FnPtr>::from_raw(raw) };
        assert_eq!(restored(1, 2, 3), 6);

        let function: fn() = unit;
        assert!(core::ptr::fn_addr_eq(function.to_raw(), function));
    }

    #[test]
    fn test_method_fn_metadata() {
        assert_eq!(<fn(&Counter) -> u32 as MethodFn<Counter>>::ARITY, 0);
        assert!(!<fn(&Counter) -> u32 as MethodFn<Counter>>::MUTABLE_RECEIVER);
        assert_eq!(<fn(&mut Counter, u32) as MethodFn<Counter>>::ARITY, 1);
        assert!(<fn(&mut Counter, u32) as MethodFn<Counter>>::MUTABLE_RECEIVER);
    }

    #[test]
    fn test_method_fn_roundtrip() {
        let get: fn(&Counter) -> u32 = counter_get;
        let add: fn(&mut Counter, u32) = counter_add;

        // SAFETY: Each raw value came from the same function pointer type.
        let get = unsafe { <fn(&Counter) -> u32 as MethodFn<Counter>>::from_raw(get.to_raw()) };
        // SAFETY: See above.
        let add = unsafe { <fn(&mut Counter, u32) as MethodFn<Counter>>::from_raw(add.to_raw()) };

        let mut counter = Counter { value: 1 };
        add(&mut counter, 4);
        assert_eq!(get(&counter), 5);
    }

    #[test]
    fn test_object_ptr_roundtrip() {
        let mut value = 5_i16;
        let ptr: *mut i16 = &mut value;

        // SAFETY: Erased from a `*mut i16`.
        let restored = unsafe { <*mut i16 as ObjectPtr>::from_erased(ptr.into_erased()) };
        assert_eq!(restored, ptr);

        let non_null = NonNull::from(&mut value);
        // SAFETY: Erased from a `NonNull<i16>`.
        let restored = unsafe { <NonNull<i16> as ObjectPtr>::from_erased(non_null.into_erased()) };
        assert_eq!(restored, non_null);
    }

    #[test]
    fn test_bare_fn_impls() {
        static_assertions::assert_impl_all!(dyn Fn(): BareFn);
        static_assertions::assert_impl_all!(dyn FnMut(i32) -> i32: BareFn);
        static_assertions::assert_impl_all!(dyn FnOnce(u8, u8, u8, u8, u8, u8): BareFn);
        static_assertions::assert_not_impl_any!(fn() -> (): BareFn);
    }
}
