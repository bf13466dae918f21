//! Tests for structural equality and the canonical order, cyclic terms
//! included.

use std::cmp::Ordering;

use crate::*;

fn struct_type(name: &str, fields: Vec<StructField>) -> Type {
    make_struct_type(name, fields).expect("field names are distinct")
}

fn self_referential(name: &str) -> Type {
    struct_type(
        name,
        vec![StructField::required("next", make_cycle_type(name))],
    )
}

#[test]
fn equality_ignores_arena_shape() {
    let a = make_list_type(make_union_type([number_type(), string_type()]));
    let b = make_list_type(make_union_type([string_type(), number_type()]));
    assert_eq!(a, b);
}

#[test]
fn equality_distinguishes_field_optionality() {
    let required = struct_type("", vec![StructField::required("a", number_type())]);
    let optional = struct_type("", vec![StructField::optional("a", number_type())]);
    assert_ne!(required, optional);
}

#[test]
fn equality_distinguishes_struct_names() {
    let named = struct_type("Name", vec![StructField::required("x", number_type())]);
    let anon = struct_type("", vec![StructField::required("x", number_type())]);
    assert_ne!(named, anon);
}

#[test]
fn cyclic_terms_compare_equal_when_built_alike() {
    assert_eq!(self_referential("S"), self_referential("S"));
    assert_ne!(self_referential("S"), self_referential("T"));
}

#[test]
fn an_unrolled_cycle_equals_its_minimal_form() {
    let minimal = self_referential("S");
    // Struct S { next: Struct S { next: Cycle<S> } } — the inner struct
    // closes over itself, so both terms unroll identically forever.
    let unrolled = struct_type(
        "S",
        vec![StructField::required("next", self_referential("S"))],
    );
    assert_eq!(minimal, unrolled);
    assert_eq!(unrolled, minimal);
}

#[test]
fn crossed_field_names_are_not_equal() {
    let tb = struct_type(
        "A",
        vec![StructField::required(
            "b",
            struct_type("B", vec![StructField::required("c", make_cycle_type("A"))]),
        )],
    );
    let tc = struct_type(
        "A",
        vec![StructField::required(
            "c",
            struct_type("B", vec![StructField::required("b", make_cycle_type("A"))]),
        )],
    );
    assert_ne!(tb, tc);
}

#[test]
fn canonical_order_is_total_and_antisymmetric_on_samples() {
    let samples = [
        bool_type(),
        number_type(),
        string_type(),
        blob_type(),
        value_type(),
        type_type(),
        make_list_type(number_type()),
        make_list_type(string_type()),
        make_set_type(number_type()),
        make_map_type(string_type(), number_type()),
        make_ref_type(bool_type()),
        make_union_type([]),
        make_union_type([number_type(), string_type()]),
        empty_struct_type(),
        struct_type("S", vec![StructField::required("a", number_type())]),
        self_referential("S"),
    ];
    for a in &samples {
        for b in &samples {
            let ab = crate::compare::canonical_cmp(a, b);
            let ba = crate::compare::canonical_cmp(b, a);
            assert_eq!(ab, ba.reverse(), "{a} vs {b}");
            assert_eq!(ab == Ordering::Equal, a == b, "{a} vs {b}");
        }
    }
}

#[test]
fn kind_rank_orders_before_payload() {
    assert_eq!(
        crate::compare::canonical_cmp(&bool_type(), &number_type()),
        Ordering::Less
    );
    assert_eq!(
        crate::compare::canonical_cmp(&make_list_type(number_type()), &empty_struct_type()),
        Ordering::Less
    );
    assert_eq!(
        crate::compare::canonical_cmp(
            &make_list_type(number_type()),
            &make_list_type(string_type())
        ),
        Ordering::Less
    );
}

#[test]
fn union_arms_store_in_canonical_order() {
    let u = make_union_type([
        empty_struct_type(),
        string_type(),
        make_list_type(number_type()),
        bool_type(),
    ]);
    let kinds: Vec<_> = u.union_arms().map(|arm| arm.kind()).collect();
    assert_eq!(kinds, [Kind::Bool, Kind::String, Kind::List, Kind::Struct]);
}
