//! Structural comparison of type terms.
//!
//! One comparison function serves two needs: equality (`Ordering::Equal`)
//! and the canonical total order that fixes the stored form of unions.
//! Keeping them a single function guarantees the order is consistent with
//! equality, which the union sort-then-dedup step relies on.
//!
//! Terms can be cyclic, so the walk is coinductive: a pair of struct nodes
//! already under comparison on the current path is assumed equal. Cycles
//! pass through struct nodes only, so assuming at struct pairs is enough
//! for the walk to terminate.

use std::cmp::Ordering;

use crate::{Graph, Node, NodeId, Type};

/// A pair of nodes currently being compared, keyed by arena address plus
/// node index.
type Side = (usize, NodeId);

pub(crate) fn types_equal(a: &Type, b: &Type) -> bool {
    canonical_cmp(a, b) == Ordering::Equal
}

/// The canonical total order over terms: kind rank first (declaration
/// order of [`crate::Kind`]), then the per-kind payload — element types
/// recursively, key then value for maps, arity then arms for unions, name
/// then (field name, optional, field type) triples for structs, the
/// referenced name for cycle placeholders.
pub(crate) fn canonical_cmp(a: &Type, b: &Type) -> Ordering {
    cmp_nodes(a.graph(), a.root(), b.graph(), b.root(), &mut Vec::new())
}

pub(crate) fn cmp_nodes(
    ga: &Graph,
    a: NodeId,
    gb: &Graph,
    b: NodeId,
    visiting: &mut Vec<(Side, Side)>,
) -> Ordering {
    let left: Side = (ga as *const Graph as usize, a);
    let right: Side = (gb as *const Graph as usize, b);
    if left == right {
        return Ordering::Equal;
    }

    let na = ga.node(a);
    let nb = gb.node(b);
    let by_kind = na.kind().cmp(&nb.kind());
    if by_kind != Ordering::Equal {
        return by_kind;
    }

    match (na, nb) {
        (Node::Bool, Node::Bool)
        | (Node::Number, Node::Number)
        | (Node::String, Node::String)
        | (Node::Blob, Node::Blob)
        | (Node::Value, Node::Value)
        | (Node::Type, Node::Type) => Ordering::Equal,

        (Node::List(ea), Node::List(eb))
        | (Node::Set(ea), Node::Set(eb))
        | (Node::Ref(ea), Node::Ref(eb)) => cmp_nodes(ga, *ea, gb, *eb, visiting),

        (Node::Map(ka, va), Node::Map(kb, vb)) => cmp_nodes(ga, *ka, gb, *kb, visiting)
            .then_with(|| cmp_nodes(ga, *va, gb, *vb, visiting)),

        (Node::Union(xs), Node::Union(ys)) => {
            let by_arity = xs.len().cmp(&ys.len());
            if by_arity != Ordering::Equal {
                return by_arity;
            }
            for (x, y) in xs.iter().zip(ys) {
                let arm = cmp_nodes(ga, *x, gb, *y, visiting);
                if arm != Ordering::Equal {
                    return arm;
                }
            }
            Ordering::Equal
        }

        (
            Node::Struct {
                name: name_a,
                fields: fields_a,
            },
            Node::Struct {
                name: name_b,
                fields: fields_b,
            },
        ) => {
            if visiting.contains(&(left, right)) {
                return Ordering::Equal;
            }
            visiting.push((left, right));
            let verdict = cmp_structs(ga, name_a, fields_a, gb, name_b, fields_b, visiting);
            visiting.pop();
            verdict
        }

        (Node::Cycle(x), Node::Cycle(y)) => x.cmp(y),

        _ => unreachable!("kind ranks matched but node variants differ"),
    }
}

fn cmp_structs(
    ga: &Graph,
    name_a: &str,
    fields_a: &[crate::FieldNode],
    gb: &Graph,
    name_b: &str,
    fields_b: &[crate::FieldNode],
    visiting: &mut Vec<(Side, Side)>,
) -> Ordering {
    let by_name = name_a.cmp(name_b);
    if by_name != Ordering::Equal {
        return by_name;
    }
    let by_len = fields_a.len().cmp(&fields_b.len());
    if by_len != Ordering::Equal {
        return by_len;
    }
    for (fa, fb) in fields_a.iter().zip(fields_b) {
        let by_field = fa
            .name
            .cmp(&fb.name)
            .then(fa.optional.cmp(&fb.optional))
            .then_with(|| cmp_nodes(ga, fa.ty, gb, fb.ty, visiting));
        if by_field != Ordering::Equal {
            return by_field;
        }
    }
    Ordering::Equal
}
