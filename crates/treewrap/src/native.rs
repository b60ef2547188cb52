//! Values that live on the host side of the boundary.
//!
//! Neither type here owns anything: a [`NativeNodeHandle`] is an address into
//! memory managed by the host compiler's collector, and a [`NativeLocation`] is
//! a plain value the host knows how to decode.

use std::fmt;

/// Opaque handle to a tree node in host-owned memory.
///
/// The handle is a non-owning reference. The host may reclaim or relocate the
/// node at any of its collection points without telling this crate, so any use
/// of a handle after such a point is only sound when the host's own retention
/// rules keep the node alive. Dropping a handle does nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NativeNodeHandle(u64);

impl NativeNodeHandle {
    /// Wraps a raw host address.
    #[must_use]
    pub const fn from_raw(addr: u64) -> Self {
        Self(addr)
    }

    /// Returns the raw host address.
    #[must_use]
    pub const fn addr(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NativeNodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Identifier of a source file as encoded by the host's line maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct FileId(u32);

impl FileId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

/// A fixed-size source location: file identifier plus line number.
///
/// Copied by value everywhere; it has no lifetime of its own. The file name is
/// decoded through [`Host::location_file`](crate::Host::location_file).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct NativeLocation {
    pub file: FileId,
    pub line: u32,
}

impl NativeLocation {
    #[must_use]
    pub const fn new(file: FileId, line: u32) -> Self {
        Self { file, line }
    }
}
