//! Runtime lookup of type descriptors.
//!
//! [`resolve`](crate::resolve) and [`TypeDescriptor::of`] need the source type
//! to be named statically. A [`TypeRegistry`] records descriptors as types are
//! registered, so that code holding only a [`TypeId`] or a type name can still
//! find the packing function for it.
//!
//! Most programs use the process-wide registry returned by
//! [`TypeRegistry::global`]. Independent registries can be created with
//! [`TypeRegistry::new`], which is `const` and so can back a `static`.
//!
//! # Bare function types
//!
//! [`TypeRegistry::register`] accepts every source type, including bare
//! function types, whose descriptors always pack to the empty value.
//! [`TypeRegistry::try_register`] rejects them with
//! [`RegistryError::Unpackable`] instead.
//!
//! # Examples
//!
//! ```
//! use core::any::TypeId;
//!
//! use typepack::{RawStorage, TypeRegistry};
//!
//! static REGISTRY: TypeRegistry = TypeRegistry::new();
//!
//! REGISTRY.register::<u16>();
//! assert!(REGISTRY.contains(TypeId::of::<u16>()));
//! assert_eq!(REGISTRY.get_by_name("u16").unwrap().size(), Some(2));
//!
//! let number = 512_u16;
//! // SAFETY: The storage holds a `u16`, the registered type for this ID.
//! let value = unsafe { REGISTRY.pack(TypeId::of::<u16>(), RawStorage::from_object(&number)) };
//! assert_eq!(value.unwrap().get::<u16>(), Some(512));
//! ```

mod lock;

use alloc::vec::Vec;
use core::any::TypeId;

use hashbrown::HashMap;
use indexmap::{IndexMap, map::Entry};
use rustc_hash::FxBuildHasher;
use typepack_internals::RawStorage;

use self::lock::RegistryLock;
use crate::{Category, DynamicValue, SourceType, TypeDescriptor};

/// The registered descriptors and their name index.
struct Entries {
    /// Descriptors in registration order
    by_id: IndexMap<TypeId, &'static TypeDescriptor, FxBuildHasher>,
    /// The first type registered under each type name
    by_name: HashMap<&'static str, TypeId, FxBuildHasher>,
}

/// A set of registered [`TypeDescriptor`]s, indexed by [`TypeId`] and by type
/// name.
///
/// Registration is idempotent: registering the same type twice keeps a single
/// entry, at the position of the first registration. Lookups take a shared
/// lock and only copy a `&'static` reference out of it.
pub struct TypeRegistry {
    /// The entries, behind a reader-writer lock
    entries: RegistryLock<Entries>,
}

/// The registry returned by [`TypeRegistry::global`].
static GLOBAL: TypeRegistry = TypeRegistry::new();

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: RegistryLock::new(Entries {
                by_id: IndexMap::with_hasher(FxBuildHasher),
                by_name: HashMap::with_hasher(FxBuildHasher),
            }),
        }
    }

    /// The process-wide registry.
    #[inline]
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL
    }

    /// Registers the source type `T` and returns its descriptor.
    ///
    /// Bare function types are accepted, and their descriptor packs every
    /// storage to the empty value. Use [`TypeRegistry::try_register`] to
    /// reject them.
    pub fn register<T: SourceType + ?Sized>(&self) -> &'static TypeDescriptor {
        self.register_descriptor(TypeDescriptor::of::<T>())
    }

    /// Registers the source type `T`, unless it cannot be packed into a
    /// non-empty value.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unpackable`] if `T` is a bare function type.
    /// Nothing is registered in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use typepack::{RegistryError, TypeRegistry};
    ///
    /// let registry = TypeRegistry::new();
    /// assert!(registry.try_register::<fn(u8) -> u8>().is_ok());
    /// assert!(matches!(
    ///     registry.try_register::<dyn Fn(u8) -> u8>(),
    ///     Err(RegistryError::Unpackable { .. })
    /// ));
    /// assert_eq!(registry.len(), 1);
    /// ```
    pub fn try_register<T: SourceType + ?Sized>(
        &self,
    ) -> Result<&'static TypeDescriptor, RegistryError> {
        let descriptor = TypeDescriptor::of::<T>();
        if descriptor.category().is_packable() {
            Ok(self.register_descriptor(descriptor))
        } else {
            Err(RegistryError::Unpackable {
                type_name: descriptor.type_name(),
            })
        }
    }

    /// Registers an existing descriptor.
    ///
    /// If a descriptor for the same type is already registered, that one is
    /// kept and returned.
    pub fn register_descriptor(
        &self,
        descriptor: &'static TypeDescriptor,
    ) -> &'static TypeDescriptor {
        let type_id = descriptor.type_id();
        let existing = self.entries.read().by_id.get(&type_id).copied();
        if let Some(existing) = existing {
            return existing;
        }

        let mut guard = self.entries.write();
        let entries = &mut *guard;
        match entries.by_id.entry(type_id) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                entry.insert(descriptor);
                entries
                    .by_name
                    .entry(descriptor.type_name())
                    .or_insert(type_id);

                #[cfg(feature = "tracing")]
                if descriptor.category() == Category::BareFunctionType {
                    tracing::warn!(
                        type_name = descriptor.type_name(),
                        "registered a bare function type, it always packs to an empty value"
                    );
                } else {
                    tracing::debug!(
                        type_name = descriptor.type_name(),
                        category = %descriptor.category(),
                        "registered type"
                    );
                }

                descriptor
            }
        }
    }

    /// Looks up the descriptor registered for `type_id`.
    #[must_use]
    pub fn get(&self, type_id: TypeId) -> Option<&'static TypeDescriptor> {
        self.entries.read().by_id.get(&type_id).copied()
    }

    /// Looks up a descriptor by [`core::any::type_name`].
    ///
    /// Type names are not guaranteed to be unique. If several registered
    /// types share a name, the one registered first is returned.
    #[must_use]
    pub fn get_by_name(&self, type_name: &str) -> Option<&'static TypeDescriptor> {
        let entries = self.entries.read();
        let type_id = entries.by_name.get(type_name)?;
        entries.by_id.get(type_id).copied()
    }

    /// Returns `true` if a descriptor is registered for `type_id`.
    #[must_use]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.read().by_id.contains_key(&type_id)
    }

    /// The number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().by_id.len()
    }

    /// Returns `true` if no type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().by_id.is_empty()
    }

    /// All registered descriptors, in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<&'static TypeDescriptor> {
        self.entries.read().by_id.values().copied().collect()
    }

    /// All registered descriptors of the given category, in registration
    /// order.
    #[must_use]
    pub fn descriptors_of(&self, category: Category) -> Vec<&'static TypeDescriptor> {
        self.entries
            .read()
            .by_id
            .values()
            .copied()
            .filter(|descriptor| descriptor.category() == category)
            .collect()
    }

    /// Packs `storage` with the packing function registered for `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unregistered`] if no descriptor is registered
    /// for `type_id`.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If a descriptor is registered for `type_id`, `storage` was populated
    ///    for that type, the same way its strategy's `store` would populate
    ///    it.
    pub unsafe fn pack(
        &self,
        type_id: TypeId,
        storage: RawStorage<'_>,
    ) -> Result<DynamicValue, RegistryError> {
        let descriptor = self
            .get(type_id)
            .ok_or(RegistryError::Unregistered { type_id })?;
        // SAFETY:
        // 1. Guaranteed by the caller
        Ok(unsafe { descriptor.pack(storage) })
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.descriptors()).finish()
    }
}

/// Error returned by the fallible operations of [`TypeRegistry`].
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RegistryError {
    /// No descriptor is registered for the type.
    Unregistered {
        /// The type that was looked up
        type_id: TypeId,
    },
    /// The type is a bare function type, so packing it can only produce the
    /// empty value.
    Unpackable {
        /// The [`core::any::type_name`] of the rejected type
        type_name: &'static str,
    },
}

impl core::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unregistered { type_id } => {
                write!(f, "no type descriptor is registered for {type_id:?}")
            }
            Self::Unpackable { type_name } => {
                write!(f, "`{type_name}` is a bare function type and cannot be packed")
            }
        }
    }
}

impl core::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use alloc::{string::String, string::ToString};

    use super::*;
    use crate::{Field, Method};

    struct Node {
        weight: u64,
    }

    fn node_weight(node: &Node) -> u64 {
        node.weight
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.get(TypeId::of::<u8>()).is_none());
        assert!(registry.get_by_name("u8").is_none());
    }

    #[test]
    fn test_register_is_idempotent() {
        let registry = TypeRegistry::new();
        let first = registry.register::<String>();
        let second = registry.register::<String>();

        assert!(core::ptr::eq(first, second));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(TypeId::of::<String>()));
    }

    #[test]
    fn test_registration_order() {
        let registry = TypeRegistry::new();
        registry.register::<u8>();
        registry.register::<Field<Node, u64>>();
        registry.register::<*const Node>();
        registry.register::<u8>();
        registry.register::<Method<Node, fn(&Node) -> u64>>();

        let ids: Vec<TypeId> = registry
            .descriptors()
            .iter()
            .map(|descriptor| descriptor.type_id())
            .collect();
        assert_eq!(
            ids,
            [
                TypeId::of::<u8>(),
                TypeId::of::<Field<Node, u64>>(),
                TypeId::of::<*const Node>(),
                TypeId::of::<Method<Node, fn(&Node) -> u64>>(),
            ]
        );
        assert_eq!(
            registry.descriptors_of(Category::MemberDataPointer).len(),
            1
        );
    }

    #[test]
    fn test_lenient_and_strict_bare_functions() {
        let registry = TypeRegistry::new();
        let error = registry.try_register::<dyn FnMut()>().unwrap_err();
        assert!(matches!(error, RegistryError::Unpackable { .. }));
        assert!(error.to_string().contains("bare function type"));
        assert!(registry.is_empty());

        let descriptor = registry.register::<dyn FnMut()>();
        assert_eq!(descriptor.category(), Category::BareFunctionType);
        // SAFETY: The packing function of a bare function type does not read the
        // storage.
        let value = unsafe { registry.pack(TypeId::of::<dyn FnMut()>(), RawStorage::empty()) };
        assert!(value.unwrap().is_empty());
    }

    #[test]
    fn test_lookup_by_name() {
        let registry = TypeRegistry::new();
        registry.register::<Method<Node, fn(&Node) -> u64>>();

        let name = core::any::type_name::<Method<Node, fn(&Node) -> u64>>();
        let descriptor = registry.get_by_name(name).unwrap();
        assert_eq!(descriptor.category(), Category::MemberFunctionPointer);

        let method = Method::<Node, fn(&Node) -> u64>::new(node_weight);
        let storage = RawStorage::from_member_function(crate::pointer::MethodFn::to_raw(
            method.function(),
        ));
        // SAFETY: The storage was populated for the registered method type.
        let value = unsafe { descriptor.pack(storage) };
        let restored = value.get::<Method<Node, fn(&Node) -> u64>>().unwrap();
        assert_eq!((restored.function())(&Node { weight: 30 }), 30);
    }

    #[test]
    fn test_pack_unregistered() {
        let registry = TypeRegistry::new();
        let number = 1_i8;
        // SAFETY: Nothing is registered, so the storage is never read.
        let result = unsafe { registry.pack(TypeId::of::<i8>(), RawStorage::from_object(&number)) };
        let error = result.unwrap_err();
        assert_eq!(
            error,
            RegistryError::Unregistered {
                type_id: TypeId::of::<i8>()
            }
        );
        assert!(error.to_string().starts_with("no type descriptor is registered"));
    }

    #[test]
    fn test_global_is_shared() {
        assert!(core::ptr::eq(TypeRegistry::global(), TypeRegistry::global()));
    }

    #[test]
    fn test_send_sync() {
        static_assertions::assert_impl_all!(TypeRegistry: Send, Sync);
        static_assertions::assert_impl_all!(RegistryError: Send, Sync);
    }
}
