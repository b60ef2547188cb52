//! Tests for the node wrapper factory.
//!
//! Covers kind dispatch over the whole kind table, the handling of raw codes
//! with no registered kind, aliasing, and the guarantee that releasing
//! wrappers never touches host-owned nodes.

use pretty_assertions::assert_eq;
use strum::IntoEnumIterator;
use treewrap::{
    AttrValue, ExcType, InMemoryHost, KindTag, LimitedTracker, ResourceError, ResourceLimits, TreeClass, TypeTable,
    UnregisteredPolicy, WrapError, WrapperSession, WrapperType,
};

// =============================================================================
// 1. Dispatch
// =============================================================================

/// Every registered kind yields a wrapper of exactly that kind's type.
#[test]
fn every_kind_dispatches_to_its_type() {
    let mut host = InMemoryHost::new();
    let nodes: Vec<_> = KindTag::iter().map(|kind| (kind, host.add_node(kind))).collect();
    let mut session = WrapperSession::new(host);

    for (kind, node) in nodes {
        let obj = session.make_node_wrapper(node).unwrap();
        let ty = session.type_of(&obj);
        assert_eq!(ty.kind(), Some(kind), "wrong kind for {kind:?}");
        assert_eq!(ty.class(), Some(kind.class()), "wrong class for {kind:?}");
        assert_eq!(ty.name(), kind.name());
        assert_eq!(session.handle_of(&obj), Some(node));
        session.release(obj);
    }
    assert_eq!(session.heap_stats().live_objects, 0);
}

/// A renamed kind keeps its class, so declarations still format as declarations.
#[test]
fn renamed_kinds_keep_their_behavior() {
    let mut host = InMemoryHost::new();
    let decl = host.add_decl(KindTag::FunctionDecl, Some("main"), None);
    let types = TypeTable::builtin().with_name(KindTag::FunctionDecl, "gcc.FunctionDecl");
    let mut session = WrapperSession::new(host).with_types(types);

    let obj = session.make_node_wrapper(decl).unwrap();
    assert_eq!(session.type_of(&obj).name(), "gcc.FunctionDecl");
    assert_eq!(session.type_of(&obj).class(), Some(TreeClass::Declaration));
    assert_eq!(session.repr(&obj).unwrap(), "Declaration('main')");
    session.release(obj);
}

/// Non-declaration nodes use the generic repr, and display falls back to it.
#[test]
fn generic_repr_shows_type_name_and_address() {
    let mut host = InMemoryHost::new();
    let node = host.add_node(KindTag::PointerType);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(node).unwrap();
    let expected = format!("<PointerType object at {:#x}>", node.addr());
    assert_eq!(session.repr(&obj).unwrap(), expected);
    assert_eq!(session.display(&obj).unwrap(), expected);
    session.release(obj);
}

// =============================================================================
// 2. Unregistered codes
// =============================================================================

/// By default an unknown raw code is a fatal error and nothing is allocated.
#[test]
fn unregistered_code_is_fatal_and_allocates_nothing() {
    let mut host = InMemoryHost::new();
    let node = host.add_raw_node(4000);
    let mut session = WrapperSession::new(host);

    let err = session.make_node_wrapper(node).unwrap_err();
    assert_eq!(err, WrapError::UnregisteredKindTag { code: 4000 });
    assert!(err.is_fatal());
    assert_eq!(err.exc_type(), ExcType::SystemError);

    let stats = session.heap_stats();
    assert_eq!(stats.live_objects, 0);
    assert_eq!(stats.total_slots, 0);
}

/// The fallback policy wraps unknown codes in the generic tree type.
#[test]
fn fallback_policy_wraps_unknown_codes_generically() {
    let mut host = InMemoryHost::new();
    let node = host.add_raw_node(4000);
    let types = TypeTable::builtin().with_policy(UnregisteredPolicy::Fallback);
    let mut session = WrapperSession::new(host).with_types(types);

    let obj = session.make_node_wrapper(node).unwrap();
    assert_eq!(session.type_of(&obj), WrapperType::GenericTree);
    assert_eq!(
        session.repr(&obj).unwrap(),
        format!("<Tree object at {:#x}>", node.addr())
    );
    assert_eq!(session.get_attr(&obj, "tree_code").unwrap(), AttrValue::Int(4000));
    session.release(obj);
}

// =============================================================================
// 3. Aliasing and ownership
// =============================================================================

/// Wrapping the same node twice gives two distinct objects that compare equal.
#[test]
fn wrapping_twice_gives_equal_distinct_objects() {
    let mut host = InMemoryHost::new();
    let node = host.add_node(KindTag::CallExpr);
    let other = host.add_node(KindTag::CallExpr);
    let mut session = WrapperSession::new(host);

    let a = session.make_node_wrapper(node).unwrap();
    let b = session.make_node_wrapper(node).unwrap();
    let c = session.make_node_wrapper(other).unwrap();
    assert_ne!(a.id(), b.id());
    assert_eq!(session.type_of(&a), session.type_of(&b));
    assert_eq!(session.handle_of(&a), Some(node));
    assert_eq!(session.handle_of(&b), Some(node));
    assert!(session.eq(&a, &b));
    assert!(!session.eq(&a, &c));
    assert_eq!(session.refcount(&a), 1);

    session.release(a);
    session.release(b);
    session.release(c);
}

/// Releasing wrappers frees heap slots and leaves host nodes alone.
#[test]
fn release_never_touches_the_host() {
    let mut host = InMemoryHost::new();
    let node = host.add_decl(KindTag::VarDecl, Some("counter"), None);
    let mut session = WrapperSession::new(host);

    for _ in 0..100 {
        let obj = session.make_node_wrapper(node).unwrap();
        let extra = session.clone_ref(&obj);
        assert_eq!(session.refcount(&obj), 2);
        session.release(extra);
        session.release(obj);
    }

    assert!(session.host().contains(node));
    assert_eq!(session.host().node_count(), 1);
    let stats = session.heap_stats();
    assert_eq!(stats.live_objects, 0);
    assert_eq!(stats.total_slots, 1, "freed slots should be reused");

    let obj = session.make_node_wrapper(node).unwrap();
    assert_eq!(session.repr(&obj).unwrap(), "Declaration('counter')");
    session.release(obj);
}

/// A reference from one session is refused by another, even when the other
/// session has a live object in the same slot.
#[test]
#[should_panic(expected = "Heap::get: object belongs to another session")]
fn references_do_not_cross_sessions() {
    let mut host_a = InMemoryHost::new();
    let node_a = host_a.add_node(KindTag::CallExpr);
    let mut host_b = InMemoryHost::new();
    let node_b = host_b.add_node(KindTag::CondExpr);
    let mut first = WrapperSession::new(host_a);
    let mut second = WrapperSession::new(host_b);

    let ours = first.make_node_wrapper(node_a).unwrap();
    let theirs = second.make_node_wrapper(node_b).unwrap();
    assert_eq!(ours.id(), theirs.id());
    let _ = second.type_of(&ours);
}

/// Releasing a foreign reference panics before it can free the other
/// session's object.
#[test]
#[should_panic(expected = "Heap::dec_ref: object belongs to another session")]
fn release_refuses_foreign_references() {
    let mut host_a = InMemoryHost::new();
    let node_a = host_a.add_node(KindTag::CallExpr);
    let mut host_b = InMemoryHost::new();
    let node_b = host_b.add_node(KindTag::CallExpr);
    let mut first = WrapperSession::new(host_a);
    let mut second = WrapperSession::new(host_b);

    let ours = first.make_node_wrapper(node_a).unwrap();
    let _theirs = second.make_node_wrapper(node_b).unwrap();
    second.release(ours);
}

/// A refused allocation raises `MemoryError` and leaves no wrapper behind.
#[test]
fn allocation_failure_leaves_nothing_reachable() {
    let mut host = InMemoryHost::new();
    let node = host.add_node(KindTag::ArrayRef);
    let tracker = LimitedTracker::new(ResourceLimits::new().max_allocations(0));
    let mut session = WrapperSession::with_tracker(host, tracker);

    let err = session.make_node_wrapper(node).unwrap_err();
    assert_eq!(err, WrapError::Allocation(ResourceError::Allocation { limit: 0, count: 1 }));
    assert_eq!(err.exc_type(), ExcType::MemoryError);
    assert!(!err.is_fatal());

    let stats = session.heap_stats();
    assert_eq!(stats.live_objects, 0);
    assert_eq!(stats.total_slots, 0);
    assert!(session.host().contains(node));
}

// =============================================================================
// 4. Attributes
// =============================================================================

/// Tree wrappers expose their address and raw code.
#[test]
fn tree_attributes() {
    let mut host = InMemoryHost::new();
    let node = host.add_node(KindTag::IntegerCst);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(node).unwrap();
    assert_eq!(session.get_attr(&obj, "addr").unwrap(), AttrValue::Int(node.addr()));
    assert_eq!(
        session.get_attr(&obj, "tree_code").unwrap(),
        AttrValue::Int(u64::from(KindTag::IntegerCst.code()))
    );

    let err = session.get_attr(&obj, "name").unwrap_err();
    assert_eq!(err.exc_type(), ExcType::AttributeError);
    assert_eq!(err.to_string(), "'IntegerCst' object has no attribute 'name'");
    session.release(obj);
}

/// Declarations expose their location as a fresh location wrapper.
#[test]
fn declaration_location_attribute() {
    let mut host = InMemoryHost::new();
    let loc = host.location("main.c", 7);
    let with_loc = host.add_decl(KindTag::ParmDecl, Some("argc"), Some(loc));
    let without_loc = host.add_decl(KindTag::ParmDecl, Some("argv"), None);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(with_loc).unwrap();
    let loc_obj = session.get_attr(&obj, "location").unwrap().into_object().unwrap();
    assert_eq!(session.location_of(&loc_obj), Some(loc));
    assert_eq!(session.display(&loc_obj).unwrap(), "main.c:7");
    session.release(loc_obj);
    session.release(obj);

    let obj = session.make_node_wrapper(without_loc).unwrap();
    let err = session.get_attr(&obj, "location").unwrap_err();
    assert_eq!(err, WrapError::Attribute { type_name: "ParmDecl", attr: "location".to_owned() });
    session.release(obj);

    assert_eq!(session.heap_stats().live_objects, 0);
}
