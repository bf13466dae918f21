//! Tests for the type builder: union canonical form, struct field
//! ordering, duplicate rejection, and cycle closure.

use crate::*;

fn struct_type(name: &str, fields: Vec<StructField>) -> Type {
    make_struct_type(name, fields).expect("field names are distinct")
}

#[test]
fn primitives_are_distinct() {
    let prims = [
        bool_type(),
        number_type(),
        string_type(),
        blob_type(),
        value_type(),
        type_type(),
    ];
    for (i, a) in prims.iter().enumerate() {
        for (j, b) in prims.iter().enumerate() {
            assert_eq!(a == b, i == j, "{a} vs {b}");
        }
    }
}

#[test]
fn kind_helpers_report_shape() {
    assert!(Kind::Number.is_leaf());
    assert!(Kind::Value.is_leaf());
    assert!(!Kind::List.is_leaf());
    assert!(!Kind::Struct.is_leaf());
    assert_eq!(Kind::Map.as_str(), "Map");
    assert_eq!(Kind::Union.to_string(), "Union");
}

#[test]
fn empty_struct_is_not_the_top_type() {
    assert_ne!(empty_struct_type(), value_type());
    assert_eq!(empty_struct_type().kind(), Kind::Struct);
    assert_eq!(empty_struct_type().struct_name(), Some(""));
    assert_eq!(empty_struct_type().fields().count(), 0);
}

#[test]
fn collection_constructors_carry_their_children() {
    let list = make_list_type(number_type());
    assert_eq!(list.kind(), Kind::List);
    assert_eq!(list.element_type(), Some(number_type()));
    assert_eq!(list.child(0), Some(number_type()));
    assert_eq!(list.child(1), None);

    let map = make_map_type(string_type(), bool_type());
    assert_eq!(map.kind(), Kind::Map);
    assert_eq!(map.key_type(), Some(string_type()));
    assert_eq!(map.value_type(), Some(bool_type()));
    assert_eq!(map.child(0), Some(string_type()));
    assert_eq!(map.child(1), Some(bool_type()));

    let reference = make_ref_type(make_set_type(number_type()));
    assert_eq!(reference.kind(), Kind::Ref);
    assert_eq!(reference.element_type(), Some(make_set_type(number_type())));
}

#[test]
fn union_of_one_collapses_to_the_arm() {
    assert_eq!(make_union_type([number_type()]), number_type());
}

#[test]
fn union_deduplicates_equal_arms() {
    assert_eq!(
        make_union_type([number_type(), number_type()]),
        number_type()
    );
    assert_eq!(
        make_union_type([number_type(), string_type(), number_type()]),
        make_union_type([string_type(), number_type()])
    );
}

#[test]
fn union_flattens_nested_unions() {
    let nested = make_union_type([
        number_type(),
        make_union_type([string_type(), bool_type()]),
    ]);
    let flat = make_union_type([bool_type(), number_type(), string_type()]);
    assert_eq!(nested, flat);
    assert_eq!(nested.union_arms().count(), 3);
    assert!(nested.union_arms().all(|arm| arm.kind() != Kind::Union));
}

#[test]
fn union_order_is_canonical() {
    let a = make_union_type([string_type(), number_type()]);
    let b = make_union_type([number_type(), string_type()]);
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn empty_union_is_a_valid_type() {
    let bottom = make_union_type([]);
    assert_eq!(bottom.kind(), Kind::Union);
    assert_eq!(bottom.union_arms().count(), 0);
    assert_eq!(bottom, make_union_type([]));
}

#[test]
fn struct_fields_are_sorted_by_name() {
    let t = struct_type(
        "S",
        vec![
            StructField::required("z", bool_type()),
            StructField::required("a", number_type()),
            StructField::optional("m", string_type()),
        ],
    );
    let names: Vec<_> = t.fields().map(|fld| fld.name.to_string()).collect();
    assert_eq!(names, ["a", "m", "z"]);

    let m = t.field("m").expect("field exists");
    assert!(m.optional);
    assert_eq!(m.ty, string_type());
    assert!(t.field("missing").is_none());
}

#[test]
fn duplicate_field_names_are_rejected() {
    let err = make_struct_type(
        "S",
        vec![
            StructField::required("x", number_type()),
            StructField::optional("x", string_type()),
        ],
    )
    .expect_err("duplicate field names");
    assert_eq!(
        err,
        TypeError::DuplicateField {
            name: "S".to_string(),
            field: "x".to_string(),
        }
    );
}

#[test]
fn cycle_placeholder_resolves_to_the_enclosing_struct() {
    let t = struct_type(
        "S",
        vec![
            StructField::required("x", make_cycle_type("S")),
            StructField::required("y", number_type()),
        ],
    );
    assert!(!t.has_unresolved_cycle());
    // The back-edge makes the field type the struct itself.
    let x = t.field("x").expect("field exists");
    assert_eq!(x.ty, t);
    assert_eq!(t.to_string(), "Struct S { x: Cycle<S>, y: Number }");
}

#[test]
fn cycle_placeholder_resolves_through_collections_and_unions() {
    let t = struct_type(
        "Commit",
        vec![
            StructField::required(
                "parents",
                make_set_type(make_ref_type(make_cycle_type("Commit"))),
            ),
            StructField::required("value", value_type()),
        ],
    );
    assert!(!t.has_unresolved_cycle());
    assert_eq!(
        t.to_string(),
        "Struct Commit { parents: Set<Ref<Cycle<Commit>>>, value: Value }"
    );

    let u = struct_type(
        "S",
        vec![StructField::required(
            "x",
            make_union_type([make_cycle_type("S"), number_type()]),
        )],
    );
    assert!(!u.has_unresolved_cycle());
    let x = u.field("x").expect("field exists");
    assert_eq!(x.ty.kind(), Kind::Union);
    assert!(x.ty.union_arms().any(|arm| arm == u));
}

#[test]
fn inner_struct_resolves_its_own_name_first() {
    // The placeholder names "A"; the inner struct is also named "A", so
    // the inner (innermost enclosing) one wins when it is built.
    let inner = struct_type(
        "A",
        vec![StructField::required("x", make_cycle_type("A"))],
    );
    let outer = struct_type("A", vec![StructField::required("inner", inner.clone())]);
    let kept = outer.field("inner").expect("field exists");
    assert_eq!(kept.ty, inner);
    // The inner back-edge still points at the inner struct, not the outer.
    let inner_x = kept.ty.field("x").expect("field exists");
    assert_eq!(inner_x.ty, inner);
    assert_ne!(inner_x.ty, outer);
}

#[test]
fn placeholder_for_an_outer_name_survives_until_resolved() {
    let inner = struct_type(
        "B",
        vec![StructField::required("c", make_cycle_type("A"))],
    );
    assert!(inner.has_unresolved_cycle());
    assert_eq!(
        inner.ensure_resolved(),
        Err(TypeError::UnresolvedCycle {
            name: "A".to_string()
        })
    );

    let outer = struct_type("A", vec![StructField::required("b", inner)]);
    assert!(!outer.has_unresolved_cycle());
    let b = outer.field("b").expect("field exists");
    let c = b.ty.field("c").expect("field exists");
    assert_eq!(c.ty, outer);
}

#[test]
fn empty_name_placeholder_matches_the_anonymous_struct() {
    let t = struct_type(
        "",
        vec![StructField::required("next", make_cycle_type(""))],
    );
    assert!(!t.has_unresolved_cycle());
    let next = t.field("next").expect("field exists");
    assert_eq!(next.ty, t);
}

#[test]
fn escaped_placeholder_is_reported_not_resolved() {
    let placeholder = make_cycle_type("Nowhere");
    assert_eq!(placeholder.kind(), Kind::Cycle);
    assert_eq!(placeholder.cycle_name(), Some("Nowhere"));

    let loose = make_list_type(placeholder);
    assert!(loose.has_unresolved_cycle());
    assert_eq!(
        loose.ensure_resolved(),
        Err(TypeError::UnresolvedCycle {
            name: "Nowhere".to_string()
        })
    );
}

#[test]
fn union_arms_renormalize_after_cycle_resolution() {
    // Before resolution the placeholder sorts as a Cycle; after resolution
    // it is a struct back-edge and must still sit in canonical position
    // relative to the other struct arm.
    let other = struct_type("Other", vec![StructField::required("n", number_type())]);
    let t = struct_type(
        "S",
        vec![StructField::required(
            "x",
            make_union_type([make_cycle_type("S"), other.clone()]),
        )],
    );
    let x = t.field("x").expect("field exists");
    let arms: Vec<_> = x.ty.union_arms().collect();
    assert_eq!(arms.len(), 2);
    assert_eq!(arms[0].struct_name(), Some("Other"));
    assert_eq!(arms[1], t);

    // A duplicate surfaced by resolution collapses the union entirely.
    let dup = struct_type(
        "D",
        vec![StructField::required(
            "x",
            make_union_type([make_cycle_type("D"), make_cycle_type("D")]),
        )],
    );
    let x = dup.field("x").expect("field exists");
    assert_eq!(x.ty, dup);
}
