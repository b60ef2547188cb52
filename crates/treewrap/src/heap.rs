use std::{
    cell::Cell,
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    resource::{ResourceError, ResourceTracker},
    types::{LocationWrapper, Str, TreeWrapper, WrapperTrait, WrapperType},
};

/// Snapshot of heap state at a point in time.
///
/// The `objects_by_type` map uses `BTreeMap` for deterministic iteration order,
/// making snapshots suitable for display and comparison without sort overhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeapStats {
    /// Total number of live objects on the heap.
    pub live_objects: usize,
    /// Number of free (recycled) slots available for reuse.
    pub free_slots: usize,
    /// Total heap capacity (live + free).
    pub total_slots: usize,
    /// Breakdown of live objects by the type name scripts see.
    pub objects_by_type: BTreeMap<&'static str, usize>,
    /// Resource tracker allocation count, if using `LimitedTracker`.
    pub tracker_allocations: Option<usize>,
    /// Resource tracker memory usage in bytes, if using `LimitedTracker`.
    pub tracker_memory_bytes: Option<usize>,
}

/// Source of per-heap owner tags; every heap ever created gets a distinct one.
static NEXT_HEAP_TAG: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for objects stored inside the heap arena.
///
/// Carries the tag of the heap that allocated it, so an id can never address
/// a slot in another session's heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HeapId {
    index: usize,
    heap: u64,
}

impl HeapId {
    /// Returns the raw index value.
    #[inline]
    pub fn index(self) -> usize {
        self.index
    }
}

/// Payload of a heap slot.
#[derive(Debug)]
pub(crate) enum HeapData {
    Location(LocationWrapper),
    Tree(TreeWrapper),
    Str(Str),
}

impl WrapperTrait for HeapData {
    fn wrapper_type(&self) -> WrapperType {
        match self {
            Self::Location(loc) => loc.wrapper_type(),
            Self::Tree(tree) => tree.wrapper_type(),
            Self::Str(s) => s.wrapper_type(),
        }
    }

    fn estimate_size(&self) -> usize {
        match self {
            Self::Location(loc) => loc.estimate_size(),
            Self::Tree(tree) => tree.estimate_size(),
            Self::Str(s) => s.estimate_size(),
        }
    }
}

/// A live heap slot: the payload plus its reference count.
///
/// The refcount lives in a `Cell` so `inc_ref` only needs shared access to the heap.
#[derive(Debug)]
struct HeapValue {
    refcount: Cell<usize>,
    data: HeapData,
}

/// Reference-counted arena that backs every wrapper object.
///
/// Uses a free list to reuse slots from freed objects, so long-running sessions
/// that repeatedly wrap and release nodes keep a constant footprint.
///
/// Generic over `T: ResourceTracker`; with `NoLimitTracker` all resource checks
/// compile away. Wrapper payloads hold native handles but never own them:
/// freeing a slot drops the payload and nothing else.
#[derive(Debug)]
pub(crate) struct Heap<T: ResourceTracker> {
    tag: u64,
    entries: Vec<Option<HeapValue>>,
    free_list: Vec<HeapId>,
    tracker: T,
}

impl<T: ResourceTracker> Heap<T> {
    pub fn new(capacity: usize, tracker: T) -> Self {
        Self {
            tag: NEXT_HEAP_TAG.fetch_add(1, Ordering::Relaxed),
            entries: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            tracker,
        }
    }

    /// Allocates a new heap entry with a refcount of one.
    ///
    /// Returns `Err(ResourceError)` if the allocation would exceed configured
    /// limits. Nothing is stored in that case.
    pub fn allocate(&mut self, data: HeapData) -> Result<HeapId, ResourceError> {
        self.tracker.on_allocate(|| data.estimate_size())?;

        let new_entry = HeapValue {
            refcount: Cell::new(1),
            data,
        };

        let id = if let Some(id) = self.free_list.pop() {
            // Reuse a freed slot
            self.entries[id.index()] = Some(new_entry);
            id
        } else {
            let id = HeapId {
                index: self.entries.len(),
                heap: self.tag,
            };
            self.entries.push(Some(new_entry));
            id
        };
        Ok(id)
    }

    /// Increments the reference count for an existing heap entry.
    ///
    /// # Panics
    /// Panics if the ID belongs to another heap, is invalid, or the object has
    /// already been freed.
    pub fn inc_ref(&self, id: HeapId) {
        let value = self.live(id, "Heap::inc_ref");
        value.refcount.set(value.refcount.get() + 1);
    }

    /// Decrements the reference count, freeing the slot once it hits zero.
    ///
    /// Returns true if this call freed the object.
    ///
    /// # Panics
    /// Panics if the ID belongs to another heap, is invalid, or the object has
    /// already been freed.
    pub fn dec_ref(&mut self, id: HeapId) -> bool {
        self.check_owner(id, "Heap::dec_ref");
        let value = {
            let slot = self.entries.get_mut(id.index()).expect("Heap::dec_ref: slot missing");
            let entry = slot.as_ref().expect("Heap::dec_ref: object already freed");
            let count = entry.refcount.get();
            if count > 1 {
                entry.refcount.set(count - 1);
                return false;
            }
            slot.take().expect("Heap::dec_ref: object already freed")
        };

        self.free_list.push(id);
        self.tracker.on_free(|| value.data.estimate_size());
        true
    }

    /// Returns the heap data stored at the given ID.
    ///
    /// # Panics
    /// Panics if the ID belongs to another heap, is invalid, or the object has
    /// already been freed.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.live(id, "Heap::get").data
    }

    /// Returns the current reference count of an object.
    ///
    /// # Panics
    /// Panics if the ID belongs to another heap, is invalid, or the object has
    /// already been freed.
    #[must_use]
    pub fn get_refcount(&self, id: HeapId) -> usize {
        self.live(id, "Heap::get_refcount").refcount.get()
    }

    /// Captures a snapshot of the heap's current state.
    #[must_use]
    pub fn heap_stats(&self) -> HeapStats {
        let mut objects_by_type = BTreeMap::new();
        let mut live_objects = 0;
        for value in self.entries.iter().flatten() {
            live_objects += 1;
            *objects_by_type.entry(value.data.wrapper_type().name()).or_insert(0) += 1;
        }
        HeapStats {
            live_objects,
            free_slots: self.free_list.len(),
            total_slots: self.entries.len(),
            objects_by_type,
            tracker_allocations: self.tracker.allocation_count(),
            tracker_memory_bytes: self.tracker.current_memory_bytes(),
        }
    }

    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    fn live(&self, id: HeapId, caller: &str) -> &HeapValue {
        self.check_owner(id, caller);
        match self.entries.get(id.index()) {
            Some(Some(value)) => value,
            Some(None) => panic!("{caller}: object already freed"),
            None => panic!("{caller}: slot missing"),
        }
    }

    fn check_owner(&self, id: HeapId, caller: &str) {
        assert!(id.heap == self.tag, "{caller}: object belongs to another session");
    }
}
