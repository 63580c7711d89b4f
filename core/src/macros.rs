/// Implements a basic `Debug` trait for types using their type name.
///
/// Useful for types holding trait objects whose internals are not worth printing.
#[macro_export]
macro_rules! impl_debug {
    ($ty:ty) => {
        impl core::fmt::Debug for $ty {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(core::any::type_name::<Self>())
            }
        }
    };
}

/// Builds the ordered list of linkable fields returned from
/// [`View::linkable_state`](crate::View::linkable_state).
///
/// Fields are linked in the order they are listed here. That order *is* their identity
/// inside the scope handle, so keep it stable between passes.
///
/// # Usage
///
/// ```ignore
/// fn linkable_state(&self) -> StateFields<'_> {
///     linkable![&self.count, &self.title]
/// }
/// ```
#[macro_export]
macro_rules! linkable {
    () => {
        $crate::StateFields::new()
    };
    ($($field:expr),+ $(,)?) => {
        $crate::StateFields::from_fields(
            ::std::vec![$($field as &dyn $crate::LinkableState),+]
        )
    };
}
