//! Member accessors: typed field offsets and receiver-first function pointers.
//!
//! These are the two member pointer shapes a dynamic value can hold:
//!
//! - [`Field<C, F>`] names a field of type `F` inside a `C` by its byte
//!   offset. It is packed through its offset, see
//!   [`Category::MemberDataPointer`](crate::Category::MemberDataPointer).
//! - [`Method<C, F>`] wraps a function pointer `F` whose first argument is
//!   the receiver `&C` or `&mut C`. It is packed through the function
//!   pointer's bit pattern, see
//!   [`Category::MemberFunctionPointer`](crate::Category::MemberFunctionPointer).
//!
//! Both are distinct types, so they are never mistaken for an object pointer
//! even though their payload is pointer-like.

use core::{any::type_name, marker::PhantomData};

use crate::pointer::MethodFn;

/// A typed byte offset to a field of type `F` inside a `C`.
///
/// Create one with the [`field!`](crate::field) macro.
///
/// # Examples
///
/// ```
/// use typepack::{Field, field};
///
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// let y: Field<Point, i32> = field!(Point, y);
/// let mut point = Point { x: 1, y: 2 };
///
/// assert_eq!(*y.get(&point), 2);
/// *y.get_mut(&mut point) = 5;
/// assert_eq!(point.y, 5);
/// # let _ = point.x;
/// ```
pub struct Field<C, F> {
    /// Byte offset of the field inside `C`
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. `offset` is the offset of a field of type `F` inside `C`, so
    ///    `offset + size_of::<F>() <= size_of::<C>()` and the field is
    ///    properly aligned for `F` whenever `C` is.
    offset: usize,
    /// Marker for the projection this offset performs
    _marker: PhantomData<fn(&C) -> &F>,
}

impl<C: 'static, F: 'static> Field<C, F> {
    /// Creates a [`Field`] from a raw byte offset.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `offset` is the offset of a field of type `F` inside `C`, as
    ///    returned by [`core::mem::offset_of!`].
    #[inline]
    pub const unsafe fn from_offset(offset: usize) -> Self {
        Self {
            offset,
            _marker: PhantomData,
        }
    }

    /// Used by [`field!`](crate::field). The witness projection exists only to
    /// let the compiler infer `F` from the field expression.
    ///
    /// # Safety
    ///
    /// Same as [`Field::from_offset`].
    #[doc(hidden)]
    #[inline]
    pub const unsafe fn __from_offset_of(offset: usize, _witness: fn(&C) -> &F) -> Self {
        // SAFETY: Guaranteed by the caller.
        unsafe { Self::from_offset(offset) }
    }

    /// The byte offset of the field inside `C`.
    #[inline]
    pub const fn offset(self) -> usize {
        self.offset
    }

    /// Borrows the field out of `object`.
    #[inline]
    pub fn get(self, object: &C) -> &F {
        let base: *const C = object;
        let field: *const F = base.wrapping_byte_add(self.offset).cast::<F>();
        // SAFETY: By the invariant on `offset`, `field` points to an initialized,
        // aligned `F` inside `*object`, which is borrowed for the returned lifetime.
        unsafe { &*field }
    }

    /// Mutably borrows the field out of `object`.
    #[inline]
    pub fn get_mut(self, object: &mut C) -> &mut F {
        let base: *mut C = object;
        let field: *mut F = base.wrapping_byte_add(self.offset).cast::<F>();
        // SAFETY: By the invariant on `offset`, `field` points to an initialized,
        // aligned `F` inside `*object`, which is uniquely borrowed for the returned
        // lifetime.
        unsafe { &mut *field }
    }
}

impl<C, F> Clone for Field<C, F> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, F> Copy for Field<C, F> {}

impl<C, F> PartialEq for Field<C, F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset
    }
}

impl<C, F> Eq for Field<C, F> {}

impl<C, F> core::hash::Hash for Field<C, F> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.offset.hash(state);
    }
}

impl<C, F> core::fmt::Debug for Field<C, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Field")
            .field("container", &type_name::<C>())
            .field("field", &type_name::<F>())
            .field("offset", &self.offset)
            .finish()
    }
}

/// A function pointer with a receiver of type `C`.
///
/// # Examples
///
/// ```
/// use typepack::Method;
///
/// struct Account {
///     balance: i64,
/// }
///
/// fn balance(account: &Account) -> i64 {
///     account.balance
/// }
///
/// fn deposit(account: &mut Account, amount: i64) {
///     account.balance += amount;
/// }
///
/// let get = Method::<Account, fn(&Account) -> i64>::new(balance);
/// let put = Method::<Account, fn(&mut Account, i64)>::new(deposit);
/// assert!(!get.is_mut());
/// assert_eq!(put.arity(), 1);
///
/// let mut account = Account { balance: 10 };
/// (put.function())(&mut account, 5);
/// assert_eq!((get.function())(&account), 15);
/// ```
pub struct Method<C, F> {
    /// The receiver-first function
    function: F,
    /// Marker for the receiver type
    _receiver: PhantomData<fn(&C)>,
}

impl<C: 'static, F: MethodFn<C>> Method<C, F> {
    /// Wraps a receiver-first function pointer.
    #[inline]
    pub const fn new(function: F) -> Self {
        Self {
            function,
            _receiver: PhantomData,
        }
    }

    /// The wrapped function pointer.
    #[inline]
    pub const fn function(self) -> F {
        self.function
    }

    /// The number of arguments after the receiver.
    #[inline]
    pub const fn arity(self) -> usize {
        F::ARITY
    }

    /// Whether the receiver is taken by mutable reference.
    #[inline]
    pub const fn is_mut(self) -> bool {
        F::MUTABLE_RECEIVER
    }
}

impl<C, F: Copy> Clone for Method<C, F> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, F: Copy> Copy for Method<C, F> {}

impl<C: 'static, F: MethodFn<C>> PartialEq for Method<C, F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::fn_addr_eq(self.function.to_raw(), other.function.to_raw())
    }
}

impl<C: 'static, F: MethodFn<C>> Eq for Method<C, F> {}

impl<C, F> core::fmt::Debug for Method<C, F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Method")
            .field("receiver", &type_name::<C>())
            .field("function", &type_name::<F>())
            .finish()
    }
}
