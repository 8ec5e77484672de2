#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Compile-time resolved type erasure for runtime reflection.
//!
//! ## Overview
//!
//! A reflection layer eventually has to turn a value of some statically known
//! type into a uniform, type-erased value that can be stored, passed around
//! and inspected at runtime. How that is done depends on what kind of type it
//! is: a plain object is copied, a raw pointer is kept as an address, a
//! function pointer keeps its bit pattern, and some types cannot be held by
//! value at all.
//!
//! This crate makes that decision once per type, at compile time, and hands
//! back a single function pointer of a uniform shape, the [`PackFn`]. The
//! packing function reads a [`RawStorage`] and produces a [`DynamicValue`].
//!
//! ## Quick Example
//!
//! ```
//! use typepack::{Category, DynamicValue, category_of};
//!
//! fn answer() -> i32 {
//!     42
//! }
//!
//! let number = DynamicValue::new(&42_i32);
//! assert_eq!(number.get::<i32>(), Some(42));
//!
//! let function: fn() -> i32 = answer;
//! assert_eq!(category_of::<fn() -> i32>(), Category::FunctionPointer);
//! let packed = DynamicValue::new(&function);
//! assert_eq!((packed.get::<fn() -> i32>().unwrap())(), 42);
//! ```
//!
//! ## Categories
//!
//! Every type taking part in packing implements [`SourceType`], which assigns
//! it exactly one [`Category`]:
//!
//! | Category | Rust types | Packed as |
//! |---|---|---|
//! | [`PlainObject`](Category::PlainObject) | primitives, `String`, containers, [`plain_object!`] types | a clone of the value |
//! | [`ObjectPointer`](Category::ObjectPointer) | `*const T`, `*mut T`, `NonNull<T>` | the pointer, not the pointee |
//! | [`FunctionPointer`](Category::FunctionPointer) | `fn(..) -> R` and its `unsafe`/`extern "C"` forms | the function pointer |
//! | [`BareFunctionType`](Category::BareFunctionType) | `dyn Fn(..)`, `dyn FnMut(..)`, `dyn FnOnce(..)` | the empty value |
//! | [`MemberDataPointer`](Category::MemberDataPointer) | [`Field<C, F>`] | the field offset |
//! | [`MemberFunctionPointer`](Category::MemberFunctionPointer) | [`Method<C, F>`] | the receiver-first function |
//! | unsupported | `*const str`, `*const [T]`, `*const dyn Trait` and other pointers to unsized targets; fn pointers with borrowed arguments such as `fn(&str) -> usize` | does not compile |
//!
//! Pointers to unsized targets carry a length or vtable next to the address,
//! and fn pointers with borrowed arguments are higher-ranked (`for<'a>`), so
//! neither implements [`SourceType`]. Receiver-first functions like
//! `fn(&C) -> R` are covered by [`Method`].
//!
//! The category is available as a constant through [`category_of`].
//!
//! ## Packing Pipeline
//!
//! [`DynamicValue::new`] is a shorthand for the three steps below, which can
//! also be taken separately when the storage is populated elsewhere:
//!
//! 1. The strategy of `T` writes the value into a [`RawStorage`]. The storage
//!    has one pointer-sized slot per shape (object, member data, function,
//!    member function) and no tag.
//! 2. [`resolve::<T>()`](resolve) returns the packing function for `T`. It is
//!    a `const fn`, so the choice costs nothing at runtime.
//! 3. Calling the packing function on the storage produces the
//!    [`DynamicValue`].
//!
//! Since a storage carries no tag, the packing function cannot check what it
//! is given. Calling it is `unsafe`, and the storage must have been populated
//! for the type the function was resolved for.
//!
//! ## Runtime Lookup
//!
//! [`TypeDescriptor::of`] bundles the identity, category, layout and packing
//! function of a type into a `&'static` record. A [`TypeRegistry`] collects
//! descriptors so they can be found by [`TypeId`](core::any::TypeId) or by
//! type name:
//!
//! ```
//! use core::any::TypeId;
//!
//! use typepack::{RawStorage, TypeRegistry};
//!
//! TypeRegistry::global().register::<f64>();
//!
//! let descriptor = TypeRegistry::global().get(TypeId::of::<f64>()).unwrap();
//! let ratio = 2.5_f64;
//! // SAFETY: The storage holds an `f64`, the type of the descriptor.
//! let value = unsafe { descriptor.pack(RawStorage::from_object(&ratio)) };
//! assert_eq!(value.get::<f64>(), Some(2.5));
//! ```
//!
//! ## Features
//!
//! - `std`: use `std::sync::RwLock` for the registry instead of a spin lock.
//! - `tracing`: emit [`tracing`](https://docs.rs/tracing) events when types
//!   are registered.
//!
//! ## Architecture
//!
//! The unsafe building blocks, [`RawStorage`] and the owned erased value
//! behind [`DynamicValue`], live in the `typepack-internals` crate. This crate
//! adds the classification, the packing functions and the runtime lookup on
//! top of them.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
mod macros;

mod category;
mod descriptor;
mod member;
pub mod markers;
pub mod pack;
pub mod pointer;
pub mod prelude;
mod registry;
mod resolver;
mod source_type;
mod value;

pub use typepack_internals::{RawFn, RawStorage};

pub use self::{
    category::Category,
    descriptor::TypeDescriptor,
    member::{Field, Method},
    registry::{RegistryError, TypeRegistry},
    resolver::{PackFn, resolve},
    source_type::{SourceType, category_of},
    value::{DowncastError, DynamicValue},
};
