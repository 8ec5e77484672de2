//! Module containing the type-erased value storage

mod data;
mod raw;
mod vtable;

pub use self::raw::{RawValue, RawValueRef};
