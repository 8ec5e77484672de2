//! The closed set of source-type categories.
//!
//! Every type implementing [`SourceType`](crate::SourceType) belongs to
//! exactly one [`Category`]. The category is a pure function of the type and
//! is known at compile time, see [`category_of`](crate::category_of).

/// Classification of a source type, deciding how its values are packed.
///
/// # Examples
///
/// ```
/// use typepack::{Category, category_of};
///
/// assert_eq!(category_of::<i32>(), Category::PlainObject);
/// assert_eq!(category_of::<*const i32>(), Category::ObjectPointer);
/// assert_eq!(category_of::<fn() -> i32>(), Category::FunctionPointer);
/// assert_eq!(category_of::<dyn Fn()>(), Category::BareFunctionType);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum Category {
    /// A value that is copied into the dynamic value.
    PlainObject,
    /// A raw pointer to an object. The pointer itself is stored, never the
    /// pointee.
    ObjectPointer,
    /// A pointer to a free function.
    FunctionPointer,
    /// A function type that cannot be held by value, such as `dyn Fn()`.
    /// Packing it always yields the empty dynamic value.
    BareFunctionType,
    /// A typed field offset, see [`Field`](crate::Field).
    MemberDataPointer,
    /// A receiver-first function pointer, see [`Method`](crate::Method).
    MemberFunctionPointer,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 6] = [
        Category::PlainObject,
        Category::ObjectPointer,
        Category::FunctionPointer,
        Category::BareFunctionType,
        Category::MemberDataPointer,
        Category::MemberFunctionPointer,
    ];

    /// A short human-readable name for the category.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Category::PlainObject => "plain object",
            Category::ObjectPointer => "object pointer",
            Category::FunctionPointer => "function pointer",
            Category::BareFunctionType => "bare function type",
            Category::MemberDataPointer => "member data pointer",
            Category::MemberFunctionPointer => "member function pointer",
        }
    }

    /// Returns `false` for the one category whose values cannot be captured,
    /// [`Category::BareFunctionType`].
    #[inline]
    pub const fn is_packable(self) -> bool {
        !matches!(self, Category::BareFunctionType)
    }

    /// Returns `true` for the two member accessor categories.
    #[inline]
    pub const fn is_member(self) -> bool {
        matches!(
            self,
            Category::MemberDataPointer | Category::MemberFunctionPointer
        )
    }

    /// Returns `true` for every category whose packed payload is a pointer or
    /// a pointer-like bit pattern rather than a copied value.
    #[inline]
    pub const fn is_pointer_like(self) -> bool {
        matches!(
            self,
            Category::ObjectPointer
                | Category::FunctionPointer
                | Category::MemberDataPointer
                | Category::MemberFunctionPointer
        )
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
