//! Per-type descriptors carrying the resolved packing function.

use core::{alloc::Layout, any::TypeId};

use typepack_internals::RawStorage;

use crate::{Category, DynamicValue, PackFn, SourceType, markers::Strategy, resolve};

/// Everything known about a source type at runtime.
///
/// A descriptor is created once per type, at compile time, and is always
/// handed out as a `&'static TypeDescriptor`. It bundles the identity of the
/// type with its [`Category`] and the packing function that
/// [`resolve`](crate::resolve) picked for it, so that a value can be packed
/// later knowing only the descriptor.
///
/// # Examples
///
/// ```
/// use typepack::{Category, RawStorage, TypeDescriptor};
///
/// let descriptor = TypeDescriptor::of::<u32>();
/// assert_eq!(descriptor.category(), Category::PlainObject);
/// assert_eq!(descriptor.type_name(), "u32");
/// assert_eq!(descriptor.size(), Some(4));
///
/// let number = 10_u32;
/// // SAFETY: The storage holds a `u32`, the type of the descriptor.
/// let value = unsafe { descriptor.pack(RawStorage::from_object(&number)) };
/// assert_eq!(value.get::<u32>(), Some(10));
/// ```
#[derive(Copy, Clone)]
pub struct TypeDescriptor {
    /// Gets the [`TypeId`] of the described type
    type_id: fn() -> TypeId,
    /// Gets the [`core::any::type_name`] of the described type
    type_name: fn() -> &'static str,
    /// The category of the described type
    category: Category,
    /// The layout of the described type, `None` if it is unsized
    layout: Option<Layout>,
    /// The packing function resolved for the described type
    pack: PackFn,
}

impl TypeDescriptor {
    /// Returns the descriptor of the source type `T`.
    ///
    /// The descriptor is a promoted constant, so no allocation takes place.
    #[inline]
    #[must_use]
    pub const fn of<T: SourceType + ?Sized>() -> &'static Self {
        const {
            &Self {
                type_id: TypeId::of::<T>,
                type_name: core::any::type_name::<T>,
                category: <T::Strategy as Strategy<T>>::CATEGORY,
                layout: <T::Strategy as Strategy<T>>::LAYOUT,
                pack: resolve::<T>(),
            }
        }
    }

    /// The [`TypeId`] of the described type.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        (self.type_id)()
    }

    /// The [`core::any::type_name`] of the described type.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        (self.type_name)()
    }

    /// The category of the described type.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    /// The layout of the described type, or `None` if it is unsized.
    #[inline]
    #[must_use]
    pub const fn layout(&self) -> Option<Layout> {
        self.layout
    }

    /// The size of the described type in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self.layout {
            Some(layout) => Some(layout.size()),
            None => None,
        }
    }

    /// The alignment of the described type in bytes.
    #[inline]
    #[must_use]
    pub const fn align(&self) -> Option<usize> {
        match self.layout {
            Some(layout) => Some(layout.align()),
            None => None,
        }
    }

    /// The packing function resolved for the described type.
    #[inline]
    #[must_use]
    pub const fn pack_fn(&self) -> PackFn {
        self.pack
    }

    /// Packs `storage` with the packing function of the described type.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. `storage` was populated for the described type, the same way its
    ///    strategy's `store` would populate it.
    #[inline]
    pub unsafe fn pack(&self, storage: RawStorage<'_>) -> DynamicValue {
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { (self.pack)(storage) }
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name())
            .field("category", &self.category)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}
