//! Tests for declaration formatting and the declaration name accessor.
//!
//! The repr of a declaration goes through a temporary name object; these
//! tests check both the output and that nothing is leaked on any path.

use pretty_assertions::assert_eq;
use treewrap::{
    AttrValue, ExcType, InMemoryHost, KindTag, LimitedTracker, ResourceLimits, WrapError, WrapperSession,
};

#[test]
fn named_declaration_repr() {
    let mut host = InMemoryHost::new();
    let decl = host.add_decl(KindTag::VarDecl, Some("x"), None);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(decl).unwrap();
    assert_eq!(session.repr(&obj).unwrap(), "Declaration('x')");
    assert_eq!(session.display(&obj).unwrap(), "Declaration('x')");

    let stats = session.heap_stats();
    assert_eq!(stats.live_objects, 1, "the name object must be released");
    assert_eq!(stats.objects_by_type.get("str"), None);
    session.release(obj);
}

/// Names go between single quotes verbatim, while the name object itself
/// still reprs as an escaped string literal.
#[test]
fn names_are_not_escaped() {
    let mut host = InMemoryHost::new();
    let quoted = host.add_decl(KindTag::TypeDecl, Some("it's"), None);
    let slashed = host.add_decl(KindTag::VarDecl, Some("a\\b"), None);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(quoted).unwrap();
    assert_eq!(session.repr(&obj).unwrap(), "Declaration('it's')");
    let name = session.declaration_name(&obj).unwrap();
    assert_eq!(session.repr(&name).unwrap(), "\"it's\"");
    session.release(name);
    session.release(obj);

    let obj = session.make_node_wrapper(slashed).unwrap();
    assert_eq!(session.repr(&obj).unwrap(), "Declaration('a\\b')");
    session.release(obj);
    assert_eq!(session.heap_stats().live_objects, 0);
}

/// An anonymous declaration raises `AttributeError` and allocates nothing.
#[test]
fn anonymous_declaration_repr_fails() {
    let mut host = InMemoryHost::new();
    let decl = host.add_decl(KindTag::FieldDecl, None, None);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(decl).unwrap();
    let err = session.repr(&obj).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::AttributeError);
    assert_eq!(err.to_string(), "'FieldDecl' object has no attribute 'name'");

    let stats = session.heap_stats();
    assert_eq!(stats.live_objects, 1);
    assert_eq!(stats.total_slots, 1);
    session.release(obj);
}

/// When the name object cannot be allocated, repr raises `MemoryError`.
#[test]
fn name_allocation_failure_propagates() {
    let mut host = InMemoryHost::new();
    let decl = host.add_decl(KindTag::VarDecl, Some("x"), None);
    let tracker = LimitedTracker::new(ResourceLimits::new().max_allocations(1));
    let mut session = WrapperSession::with_tracker(host, tracker);

    let obj = session.make_node_wrapper(decl).unwrap();
    let err = session.repr(&obj).unwrap_err();
    assert!(matches!(err, WrapError::Allocation(_)));
    assert_eq!(err.exc_type(), ExcType::MemoryError);
    assert_eq!(session.heap_stats().live_objects, 1);
    session.release(obj);
}

#[test]
fn name_accessor_returns_an_owned_string() {
    let mut host = InMemoryHost::new();
    let decl = host.add_decl(KindTag::FunctionDecl, Some("main"), None);
    let mut session = WrapperSession::new(host);

    let obj = session.make_node_wrapper(decl).unwrap();
    let name = session.declaration_name(&obj).unwrap();
    assert_eq!(session.as_str(&name), Some("main"));
    assert_eq!(session.display(&name).unwrap(), "main");
    assert_eq!(session.refcount(&name), 1);

    let via_attr = session.get_attr(&obj, "name").unwrap().into_object().unwrap();
    assert!(session.eq(&name, &via_attr));
    assert_ne!(name.id(), via_attr.id());

    session.release(via_attr);
    session.release(name);
    session.release(obj);
    assert_eq!(session.heap_stats().live_objects, 0);
}

/// The name accessor refuses anything that is not a declaration.
#[test]
fn name_accessor_rejects_other_objects() {
    let mut host = InMemoryHost::new();
    let node = host.add_node(KindTag::ReturnExpr);
    let loc = host.location("foo.c", 1);
    let mut session = WrapperSession::new(host);

    let tree = session.make_node_wrapper(node).unwrap();
    let err = session.declaration_name(&tree).unwrap_err();
    assert_eq!(
        err,
        WrapError::WrongType {
            expected: "Declaration",
            found: "ReturnExpr"
        }
    );
    assert_eq!(err.exc_type(), ExcType::TypeError);

    let location = session.make_location_wrapper(loc).unwrap();
    let err = session.declaration_name(&location).unwrap_err();
    assert_eq!(err.to_string(), "expected 'Declaration' object, got 'Location'");

    assert!(matches!(
        session.get_attr(&tree, "location"),
        Err(WrapError::Attribute { .. })
    ));
    assert_eq!(session.get_attr(&tree, "addr").unwrap(), AttrValue::Int(node.addr()));

    session.release(location);
    session.release(tree);
}
