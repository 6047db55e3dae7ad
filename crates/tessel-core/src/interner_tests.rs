use crate::{Interner, Name};

#[test]
fn interning_deduplicates() {
    let mut interner = Interner::new();

    let a = interner.intern("name");
    let b = interner.intern("name");
    let c = interner.intern("value");

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 2);
}

#[test]
fn handles_resolve_back() {
    let mut interner = Interner::new();
    let name = interner.intern("left");

    assert_eq!(interner.resolve(name), Some("left"));
    assert_eq!(interner.get("left"), Some(name));
    assert_eq!(interner.get("right"), None);
}

#[test]
fn foreign_handles_do_not_resolve() {
    let mut other = Interner::new();
    other.intern("a");
    let foreign = other.intern("b");

    let interner = Interner::new();
    assert!(interner.is_empty());
    assert_eq!(interner.resolve(foreign), None);
}

#[test]
fn handles_follow_insertion_order() {
    let mut interner = Interner::new();

    let z = interner.intern("z");
    let a = interner.intern("a");

    assert!(z < a);
    let names: Vec<(usize, &str)> = interner.iter().map(|(n, s)| (n.index(), s)).collect();
    insta::assert_debug_snapshot!(names, @r#"
    [
        (
            0,
            "z",
        ),
        (
            1,
            "a",
        ),
    ]
    "#);
}
