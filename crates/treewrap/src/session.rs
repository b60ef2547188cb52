use std::fmt;

use crate::{
    exception::{WrapError, WrapResult},
    heap::{Heap, HeapData, HeapStats},
    host::Host,
    native::{NativeLocation, NativeNodeHandle},
    object::{AttrValue, ObjRef},
    resource::{NoLimitTracker, ResourceTracker},
    tracer::{NoopTracer, WrapTracer},
    types::{KindTag, LocationWrapper, Str, TreeWrapper, TypeTable, UnregisteredPolicy, WrapperTrait, WrapperType},
};

/// Initial number of heap slots reserved by a new session.
const DEFAULT_HEAP_CAPACITY: usize = 64;

/// Owns the wrapper heap and exposes host nodes and locations to scripts.
///
/// Generic over the host, the resource tracker and the tracer. With the
/// defaults (`NoLimitTracker`, `NoopTracer`) limit checks and trace hooks
/// compile away entirely.
///
/// Every [`ObjRef`] a session hands out carries one reference count and must
/// come back through [`release`](Self::release). Wrappers never own the native
/// data they point at: releasing the last reference frees the wrapper's heap
/// slot and leaves the host untouched.
///
/// An `ObjRef` is only valid with the session that created it. Passing it to
/// another session panics instead of reaching that session's objects.
#[derive(Debug)]
pub struct WrapperSession<H: Host, T: ResourceTracker = NoLimitTracker, Tr: WrapTracer = NoopTracer> {
    host: H,
    heap: Heap<T>,
    types: TypeTable,
    tracer: Tr,
}

impl<H: Host> WrapperSession<H> {
    /// Creates an unlimited, untraced session over `host`.
    #[must_use]
    pub fn new(host: H) -> Self {
        Self::with_tracker(host, NoLimitTracker)
    }
}

impl<H: Host, T: ResourceTracker> WrapperSession<H, T> {
    /// Creates an untraced session whose heap is governed by `tracker`.
    #[must_use]
    pub fn with_tracker(host: H, tracker: T) -> Self {
        Self {
            host,
            heap: Heap::new(DEFAULT_HEAP_CAPACITY, tracker),
            types: TypeTable::builtin(),
            tracer: NoopTracer,
        }
    }
}

impl<H: Host, T: ResourceTracker, Tr: WrapTracer> WrapperSession<H, T, Tr> {
    /// Replaces the session's tracer.
    #[must_use]
    pub fn with_tracer<Tr2: WrapTracer>(self, tracer: Tr2) -> WrapperSession<H, T, Tr2> {
        WrapperSession {
            host: self.host,
            heap: self.heap,
            types: self.types,
            tracer,
        }
    }

    /// Replaces the kind→type table.
    #[must_use]
    pub fn with_types(mut self, types: TypeTable) -> Self {
        self.types = types;
        self
    }

    /// Wraps a source location.
    ///
    /// The location is copied into the wrapper; nothing is allocated when the
    /// heap refuses the allocation.
    pub fn make_location_wrapper(&mut self, loc: NativeLocation) -> WrapResult<ObjRef> {
        self.allocate(HeapData::Location(LocationWrapper::new(loc)))
    }

    /// Wraps a native tree node in the wrapper type of its kind.
    ///
    /// A raw code with no registered kind fails with
    /// [`WrapError::UnregisteredKindTag`] unless the type table's policy is
    /// [`UnregisteredPolicy::Fallback`]. Every call yields a fresh wrapper:
    /// wrapping the same node twice gives two objects that compare equal.
    pub fn make_node_wrapper(&mut self, node: NativeNodeHandle) -> WrapResult<ObjRef> {
        let code = self.host.tree_code(node);
        let kind = KindTag::from_code(code);
        self.tracer.on_classify(node, code, kind);

        let wrapper_type = match (kind, self.types.policy()) {
            (Some(kind), _) => self.types.resolve(kind),
            (None, UnregisteredPolicy::Fallback) => WrapperType::GenericTree,
            (None, UnregisteredPolicy::Fatal) => return Err(WrapError::UnregisteredKindTag { code }),
        };
        self.allocate(HeapData::Tree(TreeWrapper::new(node, code, wrapper_type)))
    }

    /// Returns the script-visible repr of an object.
    ///
    /// For declarations this allocates the name string and releases it before
    /// returning, so it can fail with `MemoryError` or `AttributeError`.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn repr(&mut self, obj: &ObjRef) -> WrapResult<String> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Location(loc) => Ok(render(|f| loc.repr_fmt(f, &self.host))),
            HeapData::Str(s) => Ok(render(|f| s.repr_fmt(f))),
            HeapData::Tree(tree) if tree.is_declaration() => self.declaration_repr(obj),
            HeapData::Tree(tree) => Ok(render(|f| tree.repr_fmt(f))),
        }
    }

    /// Returns the script-visible string conversion of an object.
    ///
    /// Locations render as `<file>:<line>`, strings as themselves, and tree
    /// wrappers fall back to their repr.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn display(&mut self, obj: &ObjRef) -> WrapResult<String> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Location(loc) => Ok(render(|f| loc.str_fmt(f, &self.host))),
            HeapData::Str(s) => Ok(s.as_str().to_owned()),
            HeapData::Tree(_) => self.repr(obj),
        }
    }

    /// Returns a new string object holding a declaration's name.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn declaration_name(&mut self, obj: &ObjRef) -> WrapResult<ObjRef> {
        let name = match self.heap.get(obj.heap_id()) {
            HeapData::Tree(tree) => Str::from(tree.declaration_name_str(&self.host)?),
            other => {
                return Err(WrapError::WrongType {
                    expected: "Declaration",
                    found: other.wrapper_type().name(),
                });
            }
        };
        self.allocate(HeapData::Str(name))
    }

    /// Reads an attribute of an object.
    ///
    /// Locations expose `file` and `line`, tree wrappers `addr` and
    /// `tree_code`, and declarations additionally `name` and `location`.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn get_attr(&mut self, obj: &ObjRef, name: &str) -> WrapResult<AttrValue> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Location(loc) => {
                let loc = loc.loc();
                match name {
                    "file" => {
                        let file = Str::from(self.host.location_file(loc));
                        self.allocate(HeapData::Str(file)).map(AttrValue::Object)
                    }
                    "line" => Ok(AttrValue::Int(u64::from(loc.line))),
                    _ => Err(WrapError::attribute("Location", name)),
                }
            }
            HeapData::Tree(tree) => {
                let tree = *tree;
                self.tree_attr(obj, tree, name)
            }
            HeapData::Str(_) => Err(WrapError::attribute("str", name)),
        }
    }

    /// Compares two objects.
    ///
    /// Locations compare by value and tree wrappers by the node they wrap, so
    /// two wrappers of the same node are equal. Objects of different kinds are
    /// never equal.
    ///
    /// # Panics
    /// Panics if `a` or `b` was released already or belongs to another session.
    #[must_use]
    pub fn eq(&self, a: &ObjRef, b: &ObjRef) -> bool {
        match (self.heap.get(a.heap_id()), self.heap.get(b.heap_id())) {
            (HeapData::Location(x), HeapData::Location(y)) => x == y,
            (HeapData::Tree(x), HeapData::Tree(y)) => x.handle() == y.handle(),
            (HeapData::Str(x), HeapData::Str(y)) => x == y,
            _ => false,
        }
    }

    /// Returns the runtime type of an object.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    #[must_use]
    pub fn type_of(&self, obj: &ObjRef) -> WrapperType {
        self.heap.get(obj.heap_id()).wrapper_type()
    }

    /// Returns the native node a tree wrapper points at.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    #[must_use]
    pub fn handle_of(&self, obj: &ObjRef) -> Option<NativeNodeHandle> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Tree(tree) => Some(tree.handle()),
            _ => None,
        }
    }

    /// Returns the location a location wrapper holds.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    #[must_use]
    pub fn location_of(&self, obj: &ObjRef) -> Option<NativeLocation> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Location(loc) => Some(loc.loc()),
            _ => None,
        }
    }

    /// Returns the contents of a string object.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    #[must_use]
    pub fn as_str(&self, obj: &ObjRef) -> Option<&str> {
        match self.heap.get(obj.heap_id()) {
            HeapData::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Takes an additional reference to `obj`.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn clone_ref(&self, obj: &ObjRef) -> ObjRef {
        self.heap.inc_ref(obj.heap_id());
        ObjRef::new(obj.heap_id())
    }

    /// Gives a reference back, freeing the object when it was the last one.
    ///
    /// Freeing a wrapper never frees, mutates or otherwise touches the native
    /// node or location it points at.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    pub fn release(&mut self, obj: ObjRef) {
        let id = obj.into_heap_id();
        let freed = self.heap.dec_ref(id);
        self.tracer.on_release(id.index(), freed);
    }

    /// Returns the number of references currently held to `obj`.
    ///
    /// # Panics
    /// Panics if `obj` was released already or belongs to another session.
    #[must_use]
    pub fn refcount(&self, obj: &ObjRef) -> usize {
        self.heap.get_refcount(obj.heap_id())
    }

    /// Captures a snapshot of the session heap.
    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        self.heap.heap_stats()
    }

    #[must_use]
    pub fn tracker(&self) -> &T {
        self.heap.tracker()
    }

    #[must_use]
    pub fn types(&self) -> &TypeTable {
        &self.types
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for embedders that build nodes on the fly.
    ///
    /// Wrappers created earlier keep their handles; if the host reclaims a
    /// node, any wrapper still pointing at it must not be used.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    pub fn tracer_mut(&mut self) -> &mut Tr {
        &mut self.tracer
    }

    /// Consumes the session, returning the tracer.
    #[must_use]
    pub fn into_tracer(self) -> Tr {
        self.tracer
    }

    fn allocate(&mut self, data: HeapData) -> WrapResult<ObjRef> {
        let type_name = data.wrapper_type().name();
        match self.heap.allocate(data) {
            Ok(id) => {
                self.tracer.on_allocate(type_name, id.index());
                Ok(ObjRef::new(id))
            }
            Err(err) => {
                self.tracer.on_allocation_failed(type_name);
                Err(err.into())
            }
        }
    }

    /// Formats `Declaration('<name>')` through a temporary name object.
    ///
    /// The name goes between the quotes as is, with no escaping.
    fn declaration_repr(&mut self, obj: &ObjRef) -> WrapResult<String> {
        let name = self.declaration_name(obj)?;
        let repr = match self.heap.get(name.heap_id()) {
            HeapData::Str(s) => format!("Declaration('{}')", s.as_str()),
            _ => unreachable!("declaration_name always allocates a str"),
        };
        self.release(name);
        Ok(repr)
    }

    fn tree_attr(&mut self, obj: &ObjRef, tree: TreeWrapper, name: &str) -> WrapResult<AttrValue> {
        match name {
            "addr" => Ok(AttrValue::Int(tree.handle().addr())),
            "tree_code" => Ok(AttrValue::Int(u64::from(tree.code()))),
            "name" if tree.is_declaration() => self.declaration_name(obj).map(AttrValue::Object),
            "location" if tree.is_declaration() => {
                let loc = self
                    .host
                    .decl_location(tree.handle())
                    .ok_or_else(|| WrapError::attribute(tree.wrapper_type().name(), name))?;
                self.make_location_wrapper(loc).map(AttrValue::Object)
            }
            _ => Err(WrapError::attribute(tree.wrapper_type().name(), name)),
        }
    }
}

/// Runs a formatting closure into a fresh `String`.
fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = write(&mut out);
    out
}
