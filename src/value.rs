//! The type-erased value produced by packing.

use core::any::TypeId;

use typepack_internals::RawValue;

use crate::{SourceType, markers::Strategy, resolve};

/// A type-erased value, or the empty value.
///
/// A [`DynamicValue`] owns a copy of whatever was packed into it: a plain
/// object, an object pointer (not its pointee), a function pointer, or a
/// member accessor. It remembers the [`TypeId`] of the stored value, so it can
/// be downcast back later without the static type being known at the place
/// where it was created.
///
/// The empty value is produced by [`DynamicValue::empty`] and by packing a
/// [bare function type](crate::Category::BareFunctionType).
///
/// A [`DynamicValue`] is neither `Send` nor `Sync`, since it may hold raw
/// pointers.
///
/// # Examples
///
/// ```
/// use typepack::DynamicValue;
///
/// let value = DynamicValue::new(&42_i32);
/// assert!(value.is_valid());
/// assert!(value.is::<i32>());
/// assert_eq!(value.get::<i32>(), Some(42));
/// assert_eq!(value.get::<u32>(), None);
///
/// let empty = DynamicValue::empty();
/// assert!(empty.is_empty());
/// assert_eq!(empty.type_id(), None);
/// ```
#[derive(Clone, Default)]
#[repr(transparent)]
pub struct DynamicValue {
    /// The stored value, or `None` for the empty value
    raw: Option<RawValue>,
}

impl DynamicValue {
    /// Creates the empty value.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self { raw: None }
    }

    /// Creates a value holding `value` directly, without going through a
    /// packing function.
    #[inline]
    #[must_use]
    pub fn from_value<T: Clone + 'static>(value: T) -> Self {
        Self {
            raw: Some(RawValue::new(value)),
        }
    }

    /// Packs `value` using the strategy of its source type.
    ///
    /// The value is written into a raw storage by the strategy of `T` and
    /// read back by the packing function [`resolve::<T>()`](crate::resolve)
    /// returns. For plain objects this clones `value`; for pointers and
    /// member accessors it copies the pointer itself; for bare function types
    /// it yields the empty value.
    ///
    /// # Examples
    ///
    /// ```
    /// use typepack::DynamicValue;
    ///
    /// let x = 5_u8;
    /// let ptr: *const u8 = &x;
    /// let value = DynamicValue::new(&ptr);
    /// assert_eq!(value.get::<*const u8>(), Some(ptr));
    ///
    /// let callback: &dyn Fn() = &|| {};
    /// assert!(DynamicValue::new(callback).is_empty());
    /// ```
    #[must_use]
    pub fn new<T: SourceType + ?Sized>(value: &T) -> Self {
        let storage = <T::Strategy as Strategy<T>>::store(value);
        let pack = resolve::<T>();
        // SAFETY:
        // 1. The storage was written by the strategy of `T`, and `resolve::<T>()` is
        //    the packing function of the same strategy.
        unsafe { pack(storage) }
    }

    /// Returns `true` unless this is the empty value.
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.raw.is_some()
    }

    /// Returns `true` for the empty value.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Returns the [`TypeId`] of the stored value.
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.raw.as_ref().map(|raw| raw.as_ref().value_type_id())
    }

    /// Returns the [`core::any::type_name`] of the stored value.
    #[inline]
    #[must_use]
    pub fn type_name(&self) -> Option<&'static str> {
        self.raw.as_ref().map(|raw| raw.as_ref().value_type_name())
    }

    /// Returns `true` if the stored value is a `T`.
    #[inline]
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id() == Some(TypeId::of::<T>())
    }

    /// Borrows the stored value as a `T`.
    #[must_use]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        let raw = self.raw.as_ref()?;
        if raw.as_ref().value_type_id() == TypeId::of::<T>() {
            // SAFETY:
            // 1. We just checked that the type IDs match
            Some(unsafe { raw.as_ref().value_downcast_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Mutably borrows the stored value as a `T`.
    #[must_use]
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        let raw = self.raw.as_mut()?;
        if raw.as_ref().value_type_id() == TypeId::of::<T>() {
            // SAFETY:
            // 1. We just checked that the type IDs match
            Some(unsafe { raw.value_downcast_mut_unchecked::<T>() })
        } else {
            None
        }
    }

    /// Returns a copy of the stored value if it is a `T`.
    #[inline]
    #[must_use]
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Moves the stored value out if it is a `T`.
    ///
    /// On a type mismatch the value is handed back inside the error.
    ///
    /// # Examples
    ///
    /// ```
    /// use typepack::DynamicValue;
    ///
    /// let value = DynamicValue::new(&String::from("kept"));
    /// let error = value.downcast::<u8>().unwrap_err();
    /// assert_eq!(error.expected(), "u8");
    ///
    /// let text: String = error.into_inner().downcast().unwrap();
    /// assert_eq!(text, "kept");
    /// ```
    pub fn downcast<T: 'static>(self) -> Result<T, DowncastError> {
        match self.raw {
            Some(raw) if raw.as_ref().value_type_id() == TypeId::of::<T>() => {
                // SAFETY:
                // 1. We just checked that the type IDs match
                Ok(unsafe { raw.into_value_unchecked::<T>() })
            }
            raw => Err(DowncastError {
                expected: core::any::type_name::<T>(),
                value: Self { raw },
            }),
        }
    }

    /// Exposes the underlying [`RawValue`].
    #[inline]
    #[must_use]
    pub fn as_raw(&self) -> Option<&RawValue> {
        self.raw.as_ref()
    }
}

impl core::fmt::Debug for DynamicValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.type_name() {
            Some(type_name) => f.debug_tuple("DynamicValue").field(&type_name).finish(),
            None => f.write_str("DynamicValue(empty)"),
        }
    }
}

/// Error returned by [`DynamicValue::downcast`] when the stored value is not
/// of the requested type.
///
/// The value that failed to downcast can be recovered with
/// [`DowncastError::into_inner`].
pub struct DowncastError {
    /// The type name that was requested
    expected: &'static str,
    /// The value, unchanged
    value: DynamicValue,
}

impl DowncastError {
    /// The [`core::any::type_name`] of the requested type.
    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    /// The [`core::any::type_name`] of the stored value, or `None` if the
    /// value was empty.
    #[must_use]
    pub fn actual(&self) -> Option<&'static str> {
        self.value.type_name()
    }

    /// Gives back the value that failed to downcast.
    #[must_use]
    pub fn into_inner(self) -> DynamicValue {
        self.value
    }
}

impl core::fmt::Debug for DowncastError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DowncastError")
            .field("expected", &self.expected)
            .field("actual", &self.actual())
            .finish()
    }
}

impl core::fmt::Display for DowncastError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.actual() {
            Some(actual) => write!(
                f,
                "cannot downcast a dynamic value of type `{actual}` to `{}`",
                self.expected
            ),
            None => write!(
                f,
                "cannot downcast an empty dynamic value to `{}`",
                self.expected
            ),
        }
    }
}

impl core::error::Error for DowncastError {}
