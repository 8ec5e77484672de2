#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::missing_docs_in_private_items,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`typepack`].
//!
//! # Overview
//!
//! This crate contains the low-level, type-erased data structures and unsafe
//! operations that power the [`typepack`] reflection layer. Every raw memory
//! reinterpretation used by `typepack` lives here, so that the safety
//! arguments can be checked in one place.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`typepack`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - **[`storage`]**: The raw storage container handed to packing functions
//!   - [`RawStorage`]: One pointer-sized slot holding an object pointer, a
//!     field offset or a function pointer bit pattern, with no runtime tag
//!   - [`RawFn`]: The untyped carrier for function pointer bit patterns
//!
//! - **[`reinterpret`]**: Bit-pattern conversion between typed function
//!   pointers and [`RawFn`]
//!
//! - **[`value`]**: Type-erased owned value storage
//!   - [`RawValue`]: Owned value with [`Box`]-based allocation
//!   - [`RawValueRef`]: Borrowed reference to a stored value
//!   - [`ValueData`]: `#[repr(C)]` wrapper enabling field access on erased
//!     types
//!   - [`ValueVtable`]: Function pointers for type-erased dispatch
//!
//! # Safety Strategy
//!
//! Type erasure requires careful handling to maintain Rust's type safety
//! guarantees. When we erase a type like `ValueData<String>` to
//! `ValueData<Erased>`, we must ensure that the vtable function pointers still
//! match the actual concrete type stored in memory.
//!
//! This crate maintains safety through:
//!
//! - **Module-based encapsulation**: Safety-critical types keep fields
//!   module-private, making invariants locally verifiable within a single file
//! - **`#[repr(C)]` layout**: Enables safe field projection on type-erased
//!   pointers without constructing invalid references
//! - **Compile-time size checks**: Every bit-pattern reinterpretation asserts,
//!   in a `const` block, that source and target have the same size and
//!   alignment
//! - **Documented contracts**: Each unsafe reader specifies exactly which
//!   writer it must be paired with
//!
//! [`typepack`]: ../typepack/index.html
//! [`ValueData`]: value::data::ValueData
//! [`ValueVtable`]: value::vtable::ValueVtable
//! [`Box`]: alloc::boxed::Box

extern crate alloc;

pub mod reinterpret;
pub mod storage;
mod util;
mod value;

pub use storage::{RawFn, RawStorage};
pub use value::{RawValue, RawValueRef};
