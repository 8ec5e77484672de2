//! Bit-pattern reinterpretation between typed function pointers and
//! [`RawFn`].
//!
//! Function pointers of every signature share one representation: a single
//! code address. This module converts between a concrete function pointer
//! type `F` and the untyped [`RawFn`] without changing a single bit. Both
//! directions check, at compile time, that `F` has the size and alignment of
//! a function pointer, so passing a fat pointer or an integer of the wrong
//! width fails to compile instead of reading out of bounds.

use crate::storage::RawFn;

/// Returns `true` when `F` has exactly the size and alignment of [`RawFn`].
#[inline]
pub const fn has_fn_layout<F>() -> bool {
    core::mem::size_of::<F>() == core::mem::size_of::<RawFn>()
        && core::mem::align_of::<F>() == core::mem::align_of::<RawFn>()
}

/// Erases the signature of a function pointer.
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `F` is a function pointer type (`fn(..) -> R`, `unsafe fn(..) -> R`,
///    or one of their `extern` variants).
#[inline]
pub unsafe fn fn_to_raw<F: Copy>(function: F) -> RawFn {
    const {
        assert!(
            has_fn_layout::<F>(),
            "`F` must have the layout of a function pointer"
        );
    }
    // SAFETY: `F` is a function pointer (guaranteed by the caller) and has the same
    // size as `RawFn` (checked above), so every bit pattern of `F` is a valid,
    // non-null `RawFn`.
    unsafe { core::mem::transmute_copy::<F, RawFn>(&function) }
}

/// Restores the signature of a function pointer erased by [`fn_to_raw`].
///
/// # Safety
///
/// The caller must ensure:
///
/// 1. `F` is a function pointer type.
/// 2. `raw` was produced by [`fn_to_raw`] with exactly this `F`, so
///    that calling the result uses the signature and ABI of the original
///    function.
#[inline]
pub unsafe fn raw_to_fn<F: Copy>(raw: RawFn) -> F {
    const {
        assert!(
            has_fn_layout::<F>(),
            "`F` must have the layout of a function pointer"
        );
    }
    // SAFETY: `raw` holds the bit pattern of an `F` (guaranteed by the caller) and
    // both types have the same size (checked above).
    unsafe { core::mem::transmute_copy::<RawFn, F>(&raw) }
}
