/// Declares one or more types as plain objects.
///
/// A plain object is copied into the dynamic value when packed, so every type
/// passed to this macro must implement [`Clone`] and be `'static`. The macro
/// only accepts non-generic types; implement
/// [`SourceType`](crate::SourceType) by hand for generic ones.
///
/// # Examples
///
/// ```
/// use typepack::{Category, DynamicValue, category_of, plain_object};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Rgb(u8, u8, u8);
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Shape {
///     Dot,
///     Line(f32),
/// }
///
/// plain_object!(Rgb, Shape);
///
/// assert_eq!(category_of::<Rgb>(), Category::PlainObject);
///
/// let value = DynamicValue::new(&Shape::Line(2.5));
/// assert_eq!(value.downcast_ref::<Shape>(), Some(&Shape::Line(2.5)));
/// ```
#[macro_export]
macro_rules! plain_object {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::SourceType for $ty {
                type Strategy = $crate::markers::PlainObject;
            }
        )+
    };
}

/// Creates a [`Field`](crate::Field) for a named field of a type.
///
/// The offset is computed with [`core::mem::offset_of!`] and the field type is
/// inferred from the field itself, so the resulting `Field<C, F>` always
/// describes a real field. The field must be visible at the call site.
///
/// # Examples
///
/// ```
/// use typepack::{Category, DynamicValue, Field, field};
///
/// struct Sample {
///     id: u32,
///     label: &'static str,
/// }
///
/// let label: Field<Sample, &'static str> = field!(Sample, label);
/// let sample = Sample { id: 1, label: "first" };
/// assert_eq!(*label.get(&sample), "first");
///
/// let value = DynamicValue::new(&label);
/// assert_eq!(value.downcast_ref::<Field<Sample, &'static str>>(), Some(&label));
/// # let _ = sample.id;
/// ```
///
/// Union fields are rejected, since reading one is `unsafe`:
///
/// ```compile_fail,E0133
/// use typepack::{Field, field};
///
/// union Bits {
///     raw: u8,
///     flag: bool,
/// }
///
/// let flag: Field<Bits, bool> = field!(Bits, flag);
/// # let _ = Bits { raw: 3 };
/// ```
#[macro_export]
macro_rules! field {
    ($container:ty, $field:ident $(,)?) => {{
        let witness: fn(&$container) -> &_ = |object| &object.$field;
        // SAFETY: The offset and the witness projection both name the same field of
        // the same type.
        unsafe {
            $crate::Field::<$container, _>::__from_offset_of(
                ::core::mem::offset_of!($container, $field),
                witness,
            )
        }
    }};
}
