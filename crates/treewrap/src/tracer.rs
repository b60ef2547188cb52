//! Wrapper factory tracing infrastructure.
//!
//! Provides a trait-based diagnostic channel for the wrapper factories with
//! zero-cost abstraction. When using [`NoopTracer`], every hook compiles away
//! via monomorphization, identical to how
//! [`NoLimitTracker`](crate::resource::NoLimitTracker) eliminates resource
//! checking overhead. Nothing in the factories writes to stdout or stderr
//! unless a tracer that does so is chosen explicitly.
//!
//! # Architecture
//!
//! The [`WrapTracer`] trait defines hook points at the events of a wrapper's
//! life (classification, allocation, allocation failure, release). Concrete
//! implementations collect different kinds of data:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (default) |
//! | [`StderrTracer`] | Human-readable factory log to stderr |
//! | [`ProfilingTracer`] | Per-type allocation counters |
//! | [`RecordingTracer`] | Full event recording for post-mortem analysis |
//!
//! # Usage
//!
//! The session is parameterized as `WrapperSession<H: Host, T: ResourceTracker, Tr: WrapTracer>`.
//! Callers choose the tracer at construction time:
//!
//! ```ignore
//! // Production (zero overhead):
//! let session = WrapperSession::new(host);
//!
//! // Debugging:
//! let session = WrapperSession::new(host).with_tracer(StderrTracer::new());
//!
//! // Profiling:
//! let mut session = WrapperSession::new(host).with_tracer(ProfilingTracer::new());
//! // ... wrap nodes ...
//! let report = session.tracer().report();
//! ```

use std::collections::HashMap;

use crate::{native::NativeNodeHandle, types::KindTag};

/// Trace event emitted by the wrapper factories.
///
/// Used by [`RecordingTracer`] to capture a full trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A native node was classified.
    Classify {
        /// The node being wrapped.
        node: NativeNodeHandle,
        /// Raw tree code reported by the host.
        code: u16,
        /// The kind the code maps to, `None` when unregistered.
        kind: Option<KindTag>,
    },
    /// A wrapper object was allocated.
    Allocate {
        /// Name of the wrapper type.
        type_name: &'static str,
        /// Heap slot of the new object.
        slot: usize,
    },
    /// The allocator refused a wrapper object.
    AllocationFailed {
        /// Name of the wrapper type that could not be allocated.
        type_name: &'static str,
    },
    /// A reference to a wrapper object was released.
    Release {
        /// Heap slot of the object.
        slot: usize,
        /// True when this was the last reference and the object was freed.
        freed: bool,
    },
}

/// Trait for wrapper factory tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions. Implementations only
/// override the hooks they care about.
pub trait WrapTracer: std::fmt::Debug {
    /// Called after the host reported a node's raw tree code.
    ///
    /// # Arguments
    /// * `node` - The node being wrapped
    /// * `code` - Raw tree code from the host
    /// * `kind` - The classified kind, `None` when the code is unregistered
    #[inline(always)]
    fn on_classify(&mut self, _node: NativeNodeHandle, _code: u16, _kind: Option<KindTag>) {}

    /// Called after a heap object was allocated.
    ///
    /// # Arguments
    /// * `type_name` - Name of the allocated object's type
    /// * `slot` - Heap slot of the new object
    #[inline(always)]
    fn on_allocate(&mut self, _type_name: &'static str, _slot: usize) {}

    /// Called when the allocator refused an object.
    #[inline(always)]
    fn on_allocation_failed(&mut self, _type_name: &'static str) {}

    /// Called when a reference is released.
    ///
    /// # Arguments
    /// * `slot` - Heap slot of the object
    /// * `freed` - True when the object's last reference went away
    #[inline(always)]
    fn on_release(&mut self, _slot: usize, _freed: bool) {}
}

// ============================================================================
// NoopTracer: zero-cost default
// ============================================================================

/// A tracer that does nothing.
///
/// All trait methods use the default no-op implementations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl WrapTracer for NoopTracer {}

// ============================================================================
// StderrTracer: human-readable factory log
// ============================================================================

/// Tracer that prints a human-readable factory log to stderr.
///
/// Output format:
/// ```text
/// [classify] node=0x1000 code=30 kind=FunctionDecl
/// [alloc   ] FunctionDecl slot=0
/// [release ] slot=0 freed
/// ```
#[derive(Debug)]
pub struct StderrTracer {
    /// Maximum number of lines to print before stopping. None = unlimited.
    limit: Option<usize>,
    /// Number of lines printed so far.
    count: usize,
}

impl StderrTracer {
    /// Creates a new stderr tracer with no line limit.
    #[must_use]
    pub fn new() -> Self {
        Self { limit: None, count: 0 }
    }

    /// Creates a new stderr tracer that goes quiet after `limit` lines.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            count: 0,
        }
    }

    /// Returns false once the line limit has been reached.
    fn admit(&mut self) -> bool {
        if self.limit.is_some_and(|limit| self.count >= limit) {
            return false;
        }
        self.count += 1;
        true
    }
}

impl Default for StderrTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl WrapTracer for StderrTracer {
    fn on_classify(&mut self, node: NativeNodeHandle, code: u16, kind: Option<KindTag>) {
        if !self.admit() {
            return;
        }
        match kind {
            Some(kind) => eprintln!("[classify] node={node} code={code} kind={}", kind.name()),
            None => eprintln!("[classify] node={node} code={code} kind=<unregistered>"),
        }
    }

    fn on_allocate(&mut self, type_name: &'static str, slot: usize) {
        if self.admit() {
            eprintln!("[alloc   ] {type_name} slot={slot}");
        }
    }

    fn on_allocation_failed(&mut self, type_name: &'static str) {
        if self.admit() {
            eprintln!("[alloc   ] {type_name} FAILED");
        }
    }

    fn on_release(&mut self, slot: usize, freed: bool) {
        if self.admit() {
            let state = if freed { "freed" } else { "live" };
            eprintln!("[release ] slot={slot} {state}");
        }
    }
}

// ============================================================================
// ProfilingTracer: per-type allocation counters
// ============================================================================

/// Tracer that collects allocation statistics.
///
/// Retrieve results via [`ProfilingTracer::report`].
#[derive(Debug, Default)]
pub struct ProfilingTracer {
    /// Allocations per wrapper type name.
    type_counts: HashMap<&'static str, u64>,
    /// Classifications that hit an unregistered code.
    unregistered: u64,
    /// Refused allocations.
    failed_allocations: u64,
    /// Releases that freed the object.
    frees: u64,
    /// Currently live objects observed through this tracer.
    live: u64,
    /// Highest `live` value observed.
    peak_live: u64,
}

/// Summary report from a profiling trace.
#[derive(Debug)]
pub struct ProfilingReport {
    /// Allocations per wrapper type, sorted by frequency (highest first).
    pub type_counts: Vec<(&'static str, u64)>,
    /// Total successful allocations.
    pub total_allocations: u64,
    /// Classifications that hit an unregistered code.
    pub unregistered: u64,
    /// Refused allocations.
    pub failed_allocations: u64,
    /// Objects freed.
    pub frees: u64,
    /// Highest number of simultaneously live objects.
    pub peak_live: u64,
}

impl ProfilingTracer {
    /// Creates a new profiling tracer with zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a profiling report from the collected data.
    ///
    /// Type counts are sorted by frequency, ties broken by name.
    #[must_use]
    pub fn report(&self) -> ProfilingReport {
        let mut type_counts: Vec<_> = self.type_counts.iter().map(|(&k, &v)| (k, v)).collect();
        type_counts.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ProfilingReport {
            total_allocations: type_counts.iter().map(|(_, count)| count).sum(),
            type_counts,
            unregistered: self.unregistered,
            failed_allocations: self.failed_allocations,
            frees: self.frees,
            peak_live: self.peak_live,
        }
    }
}

impl WrapTracer for ProfilingTracer {
    fn on_classify(&mut self, _node: NativeNodeHandle, _code: u16, kind: Option<KindTag>) {
        if kind.is_none() {
            self.unregistered += 1;
        }
    }

    #[inline]
    fn on_allocate(&mut self, type_name: &'static str, _slot: usize) {
        *self.type_counts.entry(type_name).or_insert(0) += 1;
        self.live += 1;
        self.peak_live = self.peak_live.max(self.live);
    }

    fn on_allocation_failed(&mut self, _type_name: &'static str) {
        self.failed_allocations += 1;
    }

    fn on_release(&mut self, _slot: usize, freed: bool) {
        if freed {
            self.frees += 1;
            self.live = self.live.saturating_sub(1);
        }
    }
}

impl std::fmt::Display for ProfilingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Wrapper Profiling Report ===")?;
        writeln!(f, "Total allocations:  {}", self.total_allocations)?;
        writeln!(f, "Failed allocations: {}", self.failed_allocations)?;
        writeln!(f, "Unregistered codes: {}", self.unregistered)?;
        writeln!(f, "Frees:              {}", self.frees)?;
        writeln!(f, "Peak live objects:  {}", self.peak_live)?;
        writeln!(f)?;
        writeln!(f, "--- Allocations by type ---")?;
        for (type_name, count) in &self.type_counts {
            let pct = (*count as f64 / self.total_allocations as f64) * 100.0;
            writeln!(f, "  {type_name:<20} {count:>10}  ({pct:>5.1}%)")?;
        }
        Ok(())
    }
}

// ============================================================================
// RecordingTracer: full event recording
// ============================================================================

/// Tracer that records every factory event.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// All recorded events in chronological order.
    events: Vec<TraceEvent>,
    /// Optional limit on number of events recorded.
    limit: Option<usize>,
}

impl RecordingTracer {
    /// Creates a new recording tracer with no event limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new recording tracer that stops recording after `limit` events.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            events: Vec::with_capacity(limit.min(1024)),
            limit: Some(limit),
        }
    }

    /// Returns the recorded events.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }

    fn push(&mut self, event: TraceEvent) {
        if self.limit.is_some_and(|l| self.events.len() >= l) {
            return;
        }
        self.events.push(event);
    }
}

impl WrapTracer for RecordingTracer {
    fn on_classify(&mut self, node: NativeNodeHandle, code: u16, kind: Option<KindTag>) {
        self.push(TraceEvent::Classify { node, code, kind });
    }

    fn on_allocate(&mut self, type_name: &'static str, slot: usize) {
        self.push(TraceEvent::Allocate { type_name, slot });
    }

    fn on_allocation_failed(&mut self, type_name: &'static str) {
        self.push(TraceEvent::AllocationFailed { type_name });
    }

    fn on_release(&mut self, slot: usize, freed: bool) {
        self.push(TraceEvent::Release { slot, freed });
    }
}
