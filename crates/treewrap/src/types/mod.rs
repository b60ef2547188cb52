/// Types of the objects that live on the wrapper heap.
///
/// `kind` and `wrapper_type` describe how native nodes are classified and
/// which script-visible type each classification maps to. The remaining
/// modules hold the heap payloads themselves.
pub mod kind;
pub(crate) mod location;
pub(crate) mod str;
pub(crate) mod tree;
pub mod wrapper_type;

pub use kind::{KindTag, TreeClass};
pub(crate) use location::LocationWrapper;
pub(crate) use str::Str;
pub(crate) use tree::TreeWrapper;
pub use wrapper_type::{TypeTable, UnregisteredPolicy, WrapperType};

/// Common interface of every heap payload.
pub(crate) trait WrapperTrait {
    /// The runtime type scripts see for this object.
    fn wrapper_type(&self) -> WrapperType;

    /// Approximate heap footprint, charged against memory limits.
    fn estimate_size(&self) -> usize
    where
        Self: Sized,
    {
        std::mem::size_of::<Self>()
    }
}
