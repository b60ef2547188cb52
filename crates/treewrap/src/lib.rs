#![doc = include_str!("../../../README.md")]

mod exception;
mod heap;
mod host;
mod native;
mod object;
mod resource;
mod session;
pub mod tracer;
pub mod types;

pub use crate::{
    exception::{ExcType, Exception, WrapError, WrapResult},
    heap::HeapStats,
    host::{Host, InMemoryHost},
    native::{FileId, NativeLocation, NativeNodeHandle},
    object::{AttrValue, ObjRef},
    resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceLimits, ResourceTracker},
    session::WrapperSession,
    tracer::{NoopTracer, ProfilingReport, ProfilingTracer, RecordingTracer, StderrTracer, TraceEvent, WrapTracer},
    types::{KindTag, TreeClass, TypeTable, UnregisteredPolicy, WrapperType},
};
