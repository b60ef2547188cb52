use std::mem::ManuallyDrop;

use crate::heap::HeapId;

/// An owned reference to a wrapper object on the session heap.
///
/// Holding an `ObjRef` accounts for one reference count. It is deliberately
/// not `Clone`: duplicate it with
/// [`WrapperSession::clone_ref`](crate::WrapperSession::clone_ref) and give it
/// back with [`WrapperSession::release`](crate::WrapperSession::release).
#[must_use = "wrapper references must be released through the session"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ObjRef(HeapId);

impl ObjRef {
    pub(crate) fn new(id: HeapId) -> Self {
        Self(id)
    }

    /// Slot index of the referenced object, stable while the reference is held.
    #[must_use]
    pub fn id(&self) -> usize {
        self.0.index()
    }

    pub(crate) fn heap_id(&self) -> HeapId {
        self.0
    }

    /// Consumes the reference without running its drop check.
    pub(crate) fn into_heap_id(self) -> HeapId {
        let this = ManuallyDrop::new(self);
        this.0
    }
}

/// Panics if an `ObjRef` goes out of scope without being released.
/// Only enabled when the `ref-count-panic` feature is active.
#[cfg(feature = "ref-count-panic")]
impl Drop for ObjRef {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            panic!(
                "ObjRef({}) dropped without calling release() - this is a reference counting bug",
                self.0.index()
            );
        }
    }
}

/// Value of an attribute read from a wrapper.
#[derive(Debug, PartialEq, Eq)]
pub enum AttrValue {
    Int(u64),
    /// A new reference to a heap object, owned by the caller.
    Object(ObjRef),
}

impl AttrValue {
    /// Returns the integer payload, if any.
    #[must_use]
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Object(_) => None,
        }
    }

    /// Unwraps an object payload, handing back the value otherwise.
    pub fn into_object(self) -> Result<ObjRef, Self> {
        match self {
            Self::Object(obj) => Ok(obj),
            other => Err(other),
        }
    }
}
