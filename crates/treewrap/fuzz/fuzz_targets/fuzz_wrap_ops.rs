//! Fuzz target: drive a wrapper session with an arbitrary operation stream.
//!
//! Each input byte pair selects an operation (create a node with a raw code,
//! wrap it, format it, read attributes, clone or release references). Tight
//! allocation limits keep refused allocations on the hot path.
//!
//! Findings from this target are panics or leaked heap objects after every
//! reference has been released.

#![no_main]

use libfuzzer_sys::fuzz_target;

use treewrap::{
    InMemoryHost, KindTag, LimitedTracker, ObjRef, ResourceLimits, TypeTable, UnregisteredPolicy, WrapperSession,
};

const ATTRS: [&str; 6] = ["addr", "tree_code", "name", "location", "file", "line"];

fuzz_target!(|data: &[u8]| {
    if data.len() > 4096 || data.is_empty() {
        return;
    }

    let policy = if data[0] & 1 == 0 {
        UnregisteredPolicy::Fatal
    } else {
        UnregisteredPolicy::Fallback
    };
    let tracker = LimitedTracker::new(ResourceLimits::new().max_allocations(256).max_memory(16 * 1024));
    let mut session =
        WrapperSession::with_tracker(InMemoryHost::new(), tracker).with_types(TypeTable::builtin().with_policy(policy));
    let mut nodes = Vec::new();
    let mut objs: Vec<ObjRef> = Vec::new();

    for pair in data[1..].chunks_exact(2) {
        let (op, arg) = (pair[0], pair[1]);
        match op % 8 {
            0 => {
                let host = session.host_mut();
                let node = match KindTag::from_code(u16::from(arg)) {
                    Some(kind) if kind.is_declaration() && arg & 1 == 0 => {
                        let loc = host.location("fuzz.c", u32::from(arg));
                        host.add_decl(kind, Some("d"), Some(loc))
                    }
                    Some(kind) if kind.is_declaration() => host.add_decl(kind, None, None),
                    _ => host.add_raw_node(u16::from(arg)),
                };
                nodes.push(node);
            }
            1 => {
                if let Some(&node) = nodes.get(usize::from(arg) % nodes.len().max(1)) {
                    if let Ok(obj) = session.make_node_wrapper(node) {
                        objs.push(obj);
                    }
                }
            }
            2 => {
                let loc = session.host_mut().location("fuzz.c", u32::from(arg));
                if let Ok(obj) = session.make_location_wrapper(loc) {
                    objs.push(obj);
                }
            }
            3 | 4 => {
                if let Some(obj) = objs.get(usize::from(arg) % objs.len().max(1)) {
                    let _ = if op % 8 == 3 { session.repr(obj) } else { session.display(obj) };
                }
            }
            5 => {
                if let Some(obj) = objs.get(usize::from(arg) % objs.len().max(1)) {
                    let attr = ATTRS[usize::from(op / 8) % ATTRS.len()];
                    if let Ok(value) = session.get_attr(obj, attr) {
                        if let Ok(new_obj) = value.into_object() {
                            objs.push(new_obj);
                        }
                    }
                }
            }
            6 => {
                if let Some(obj) = objs.get(usize::from(arg) % objs.len().max(1)) {
                    let extra = session.clone_ref(obj);
                    objs.push(extra);
                }
            }
            _ => {
                if !objs.is_empty() {
                    let obj = objs.swap_remove(usize::from(arg) % objs.len());
                    session.release(obj);
                }
            }
        }
    }

    for obj in objs {
        session.release(obj);
    }
    assert_eq!(session.heap_stats().live_objects, 0, "leaked wrapper objects");
});
