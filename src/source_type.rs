//! The source-type classifier.
//!
//! A type takes part in packing by implementing [`SourceType`], which names
//! one [strategy marker](crate::markers) for it. Coherence guarantees that a
//! type has at most one implementation, so its category is unique, and the
//! sealed bounds on the markers guarantee it is the right one.
//!
//! This module implements [`SourceType`] for:
//!
//! - primitives, `String`, `&'static str`, `Duration`, and the containers
//!   `Box<T>`, `Vec<T>`, `Option<T>`, arrays and tuples up to six elements as
//!   plain objects,
//! - `*const T`, `*mut T` and `NonNull<T>` as object pointers,
//! - every [`FnPtr`](crate::pointer::FnPtr) shape as function pointers,
//! - every [`BareFn`](crate::pointer::BareFn) shape as bare function types,
//! - [`Field`] and [`Method`] as member data and member function pointers.
//!
//! Owning handles such as `Box<T>` are plain objects: packing one clones the
//! handle together with what it owns. Only raw pointers are object pointers.
//!
//! User types opt in with [`plain_object!`](crate::plain_object), or by
//! implementing [`SourceType`] by hand for generic types.

use alloc::{boxed::Box, string::String, vec::Vec};
use core::ptr::NonNull;

use crate::{
    Category, Field, Method,
    markers::{
        BareFunction, FunctionPointer, MemberData, MemberFunction, ObjectPointer, PlainObject,
        Strategy,
    },
    pointer::MethodFn,
};

/// A type that can be packed into a [`DynamicValue`](crate::DynamicValue).
///
/// The associated `Strategy` decides the [`Category`] of the type, and
/// through it both how a value is written into a raw storage and which
/// packing function reads it back.
///
/// # Examples
///
/// Non-generic types are most easily declared with
/// [`plain_object!`](crate::plain_object). Generic types implement the trait
/// by hand:
///
/// ```
/// use typepack::{Category, SourceType, category_of, markers};
///
/// #[derive(Clone)]
/// struct Tagged<T> {
///     tag: u32,
///     value: T,
/// }
///
/// impl<T: Clone + 'static> SourceType for Tagged<T> {
///     type Strategy = markers::PlainObject;
/// }
///
/// assert_eq!(category_of::<Tagged<String>>(), Category::PlainObject);
/// ```
pub trait SourceType: 'static {
    /// The packing strategy of this type.
    type Strategy: Strategy<Self>;
}

/// The category of the source type `T`, computed at compile time.
///
/// # Examples
///
/// ```
/// use typepack::{Category, Method, category_of};
///
/// struct Widget;
///
/// const CATEGORY: Category = category_of::<Method<Widget, fn(&Widget) -> u32>>();
/// assert_eq!(CATEGORY, Category::MemberFunctionPointer);
/// ```
#[inline]
pub const fn category_of<T: SourceType + ?Sized>() -> Category {
    <T::Strategy as Strategy<T>>::CATEGORY
}

crate::plain_object!(
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    (),
    String,
    &'static str,
    core::time::Duration,
);

impl<T: Clone + 'static> SourceType for Box<T> {
    type Strategy = PlainObject;
}

impl<T: Clone + 'static> SourceType for Vec<T> {
    type Strategy = PlainObject;
}

impl<T: Clone + 'static> SourceType for Option<T> {
    type Strategy = PlainObject;
}

impl<T: Clone + 'static, const N: usize> SourceType for [T; N] {
    type Strategy = PlainObject;
}

macro_rules! impl_tuple_source_type {
    ($($elem:ident),+) => {
        impl<$($elem: Clone + 'static),+> SourceType for ($($elem,)+) {
            type Strategy = PlainObject;
        }
    };
}

impl_tuple_source_type!(T1);
impl_tuple_source_type!(T1, T2);
impl_tuple_source_type!(T1, T2, T3);
impl_tuple_source_type!(T1, T2, T3, T4);
impl_tuple_source_type!(T1, T2, T3, T4, T5);
impl_tuple_source_type!(T1, T2, T3, T4, T5, T6);

impl<T: 'static> SourceType for *const T {
    type Strategy = ObjectPointer;
}

impl<T: 'static> SourceType for *mut T {
    type Strategy = ObjectPointer;
}

impl<T: 'static> SourceType for NonNull<T> {
    type Strategy = ObjectPointer;
}

macro_rules! impl_fn_source_type {
    ($($arg:ident),*) => {
        impl<R: 'static, $($arg: 'static),*> SourceType for fn($($arg),*) -> R {
            type Strategy = FunctionPointer;
        }
        impl<R: 'static, $($arg: 'static),*> SourceType for unsafe fn($($arg),*) -> R {
            type Strategy = FunctionPointer;
        }
        impl<R: 'static, $($arg: 'static),*> SourceType for extern "C" fn($($arg),*) -> R {
            type Strategy = FunctionPointer;
        }
        impl<R: 'static, $($arg: 'static),*> SourceType for unsafe extern "C" fn($($arg),*) -> R {
            type Strategy = FunctionPointer;
        }

        impl<R: 'static, $($arg: 'static),*> SourceType for dyn Fn($($arg),*) -> R {
            type Strategy = BareFunction;
        }
        impl<R: 'static, $($arg: 'static),*> SourceType for dyn FnMut($($arg),*) -> R {
            type Strategy = BareFunction;
        }
        impl<R: 'static, $($arg: 'static),*> SourceType for dyn FnOnce($($arg),*) -> R {
            type Strategy = BareFunction;
        }
    };
}

impl_fn_source_type!();
impl_fn_source_type!(A1);
impl_fn_source_type!(A1, A2);
impl_fn_source_type!(A1, A2, A3);
impl_fn_source_type!(A1, A2, A3, A4);
impl_fn_source_type!(A1, A2, A3, A4, A5);
impl_fn_source_type!(A1, A2, A3, A4, A5, A6);

impl<C: 'static, F: 'static> SourceType for Field<C, F> {
    type Strategy = MemberData;
}

impl<C: 'static, F: MethodFn<C>> SourceType for Method<C, F> {
    type Strategy = MemberFunction;
}
