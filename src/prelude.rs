//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use typepack::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Label(&'static str);
//!
//! plain_object!(Label);
//!
//! let value = DynamicValue::new(&Label("seven"));
//! assert_eq!(category_of::<Label>(), Category::PlainObject);
//! assert_eq!(value.downcast_ref::<Label>(), Some(&Label("seven")));
//! ```
//!
//! # What's Included
//!
//! - **[`DynamicValue`]**: The type-erased value
//! - **[`SourceType`]**, **[`Category`]** and **[`category_of`]**: Type
//!   classification
//! - **[`Field`]**, **[`Method`]** and **[`field!`]**: Member accessors
//! - **[`resolve`]** and **[`PackFn`]**: The packing-function resolver
//! - **[`plain_object!`]**: Declares user types as plain objects

pub use crate::{
    Category, DynamicValue, Field, Method, PackFn, SourceType, category_of, field, plain_object,
    resolve,
};
