use std::any::Any;
use std::fmt;

use hst_hist::NativeRef;

/// Anything that can live in an [`ObjectStore`](crate::ObjectStore).
///
/// Implementations only need to name themselves and support downcasting;
/// the native-histogram capability is opt-in.
pub trait Storable: Any + fmt::Debug {
    /// Short kind name used in diagnostics.
    fn kind_name(&self) -> &'static str;

    /// The native histogram behind this object, if it has one.
    ///
    /// Only objects returning `Some` can be written into a container.
    fn as_native(&self) -> Option<NativeRef<'_>> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Arithmetic combination of two objects of the same type.
///
/// Histograms deliberately do not implement this: they accumulate through
/// fills only.
pub trait Combine {
    /// Add `other`'s contents into `self`.
    fn combine(&mut self, other: &Self);

    /// Multiply all contents by `factor`.
    fn scale(&mut self, factor: f64);
}
