use ahash::AHashMap;

use crate::{
    native::{FileId, NativeLocation, NativeNodeHandle},
    types::KindTag,
};

/// The host compiler as seen by the wrapper factories.
///
/// Every method is a read of host-owned data. None of them may trigger a host
/// collection, and the wrapper layer never asks the host to free anything.
pub trait Host {
    /// Returns the raw tree code of `node`.
    ///
    /// Calling this on a node the host has already reclaimed is a hazard of the
    /// host's memory model; implementations need not detect it.
    fn tree_code(&self, node: NativeNodeHandle) -> u16;

    /// Decodes the file name of a location.
    fn location_file(&self, loc: NativeLocation) -> &str;

    /// Returns the name of a declaration node, `None` if it has none.
    fn decl_name(&self, node: NativeNodeHandle) -> Option<&str>;

    /// Returns the source location of a declaration node.
    fn decl_location(&self, _node: NativeNodeHandle) -> Option<NativeLocation> {
        None
    }
}

/// A synthetic node held by [`InMemoryHost`].
#[derive(Debug, Clone)]
struct SyntheticNode {
    code: u16,
    name: Option<String>,
    location: Option<NativeLocation>,
}

/// A self-contained [`Host`] backed by maps.
///
/// Useful for embedders' tests and benchmarks: nodes are created with any
/// tree code (registered or not), and handles are spaced like real addresses.
/// Handles the host does not know classify as [`KindTag::ErrorMark`].
#[derive(Debug, Default)]
pub struct InMemoryHost {
    nodes: AHashMap<NativeNodeHandle, SyntheticNode>,
    files: Vec<String>,
    file_ids: AHashMap<String, FileId>,
    next_addr: u64,
}

/// Address of the first node, and the spacing between nodes.
const NODE_BASE: u64 = 0x1000;
const NODE_STRIDE: u64 = 0x40;

impl InMemoryHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a file name, returning its id.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` files are interned.
    pub fn file(&mut self, name: &str) -> FileId {
        if let Some(&id) = self.file_ids.get(name) {
            return id;
        }
        let index = u32::try_from(self.files.len()).expect("InMemoryHost: too many files");
        let id = FileId::new(index);
        self.files.push(name.to_owned());
        self.file_ids.insert(name.to_owned(), id);
        id
    }

    /// Builds a location in `file` at `line`.
    pub fn location(&mut self, file: &str, line: u32) -> NativeLocation {
        NativeLocation::new(self.file(file), line)
    }

    /// Adds a node of the given kind.
    pub fn add_node(&mut self, kind: KindTag) -> NativeNodeHandle {
        self.insert(kind.code(), None, None)
    }

    /// Adds a node carrying an arbitrary raw code, registered or not.
    pub fn add_raw_node(&mut self, code: u16) -> NativeNodeHandle {
        self.insert(code, None, None)
    }

    /// Adds a declaration node with an optional name and location.
    pub fn add_decl(
        &mut self,
        kind: KindTag,
        name: Option<&str>,
        location: Option<NativeLocation>,
    ) -> NativeNodeHandle {
        self.insert(kind.code(), name.map(str::to_owned), location)
    }

    /// Number of nodes the host holds.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if the host still holds `node`.
    #[must_use]
    pub fn contains(&self, node: NativeNodeHandle) -> bool {
        self.nodes.contains_key(&node)
    }

    fn insert(&mut self, code: u16, name: Option<String>, location: Option<NativeLocation>) -> NativeNodeHandle {
        let handle = NativeNodeHandle::from_raw(NODE_BASE + self.next_addr * NODE_STRIDE);
        self.next_addr += 1;
        self.nodes.insert(handle, SyntheticNode { code, name, location });
        handle
    }
}

impl Host for InMemoryHost {
    fn tree_code(&self, node: NativeNodeHandle) -> u16 {
        self.nodes.get(&node).map_or(KindTag::ErrorMark.code(), |n| n.code)
    }

    fn location_file(&self, loc: NativeLocation) -> &str {
        self.files.get(loc.file.index() as usize).map_or("<unknown>", String::as_str)
    }

    fn decl_name(&self, node: NativeNodeHandle) -> Option<&str> {
        self.nodes.get(&node)?.name.as_deref()
    }

    fn decl_location(&self, node: NativeNodeHandle) -> Option<NativeLocation> {
        self.nodes.get(&node)?.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_interned() {
        let mut host = InMemoryHost::new();
        let a = host.file("foo.c");
        let b = host.file("bar.c");
        assert_ne!(a, b);
        assert_eq!(host.file("foo.c"), a);
        assert_eq!(host.location_file(NativeLocation::new(b, 1)), "bar.c");
    }

    #[test]
    fn handles_are_distinct_and_classified() {
        let mut host = InMemoryHost::new();
        let a = host.add_node(KindTag::IntegerCst);
        let b = host.add_raw_node(4000);
        assert_ne!(a, b);
        assert_eq!(host.tree_code(a), KindTag::IntegerCst.code());
        assert_eq!(host.tree_code(b), 4000);
        assert_eq!(host.tree_code(NativeNodeHandle::from_raw(1)), KindTag::ErrorMark.code());
    }
}
