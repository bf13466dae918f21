//! The structural subtype judge for cairn.
//!
//! `is_subtype(required, concrete)` decides whether every value of the
//! concrete type is acceptable where the required type is expected:
//! - `Value` is top: it accepts everything.
//! - Unions are asymmetric. A concrete union conforms only if every arm
//!   does (the value could be any of them); a required union is satisfied
//!   if some arm accepts. The empty union is bottom: as a concrete type it
//!   conforms vacuously, as a required type it accepts nothing.
//! - Structs use width subtyping (extra concrete fields are fine) plus
//!   depth on each shared field; a required field is never satisfied by an
//!   optional concrete one.
//! - Cyclic types are judged coinductively: a struct pair already on the
//!   comparison path is assumed compatible, and any finite counterexample
//!   surfaces along another branch.
//!
//! The judge is total and pure; it holds no state beyond a per-call memo,
//! so concurrent judgments over shared type graphs need no locking.

use cairn_types::{Kind, Type, TypeIdentity};
use cairn_value::Value;

pub mod trace;

pub use trace::{SubtypeAction, SubtypeStep};

use trace::TraceLog;


// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Decide whether `concrete` is a structural subtype of `required`.
///
/// Total: every pair of finalized types gets a verdict in finite time.
/// Panics only if a term still carries an unresolved cycle placeholder,
/// which is a construction bug (see [`Type::ensure_resolved`]).
pub fn is_subtype(required: &Type, concrete: &Type) -> bool {
    subtype_of(required, concrete, &mut Vec::new(), &mut None)
}

/// Like [`is_subtype`], additionally returning the decision steps taken.
pub fn is_subtype_traced(required: &Type, concrete: &Type) -> (bool, Vec<SubtypeStep>) {
    let mut log = Some(TraceLog::new());
    let verdict = subtype_of(required, concrete, &mut Vec::new(), &mut log);
    (verdict, log.expect("log installed above").into_steps())
}

/// Check a value against a required type via its type witness.
pub fn assert_subtype(required: &Type, value: &Value) -> Result<(), ConformanceError> {
    let concrete = value.type_of();
    if subtype_of(required, &concrete, &mut Vec::new(), &mut None) {
        Ok(())
    } else {
        Err(ConformanceError {
            required: required.clone(),
            concrete,
        })
    }
}

/// A value failed its conformance check. Expected at system boundaries
/// (e.g. rejecting a malformed write); carries both sides for reporting.
#[derive(Debug, Clone, thiserror::Error)]
#[error("value of type `{concrete}` does not conform to `{required}`")]
pub struct ConformanceError {
    pub required: Type,
    pub concrete: Type,
}

// ---------------------------------------------------------------------------
// The judgment
// ---------------------------------------------------------------------------

/// Struct pairs currently being compared on this path. Pushed before a
/// field walk, popped after; a linear scan is cheaper than hashing at the
/// depths real type graphs reach.
type Visiting = Vec<(TypeIdentity, TypeIdentity)>;

fn subtype_of(
    required: &Type,
    concrete: &Type,
    visiting: &mut Visiting,
    log: &mut Option<TraceLog>,
) -> bool {
    if required.kind() == Kind::Cycle || concrete.kind() == Kind::Cycle {
        panic!(
            "cycle placeholder reached the subtype judge \
             (required: `{required}`, concrete: `{concrete}`); \
             the enclosing struct type was never built"
        );
    }

    if required == concrete {
        trace::record(log, SubtypeAction::Identity, required, concrete, "terms are equal");
        return true;
    }

    if required.kind() == Kind::Value {
        trace::record(log, SubtypeAction::TopType, required, concrete, "Value accepts everything");
        return true;
    }

    if concrete.kind() == Kind::Union {
        trace::record(
            log,
            SubtypeAction::UnionAll,
            required,
            concrete,
            "every arm of the concrete union must conform",
        );
        return concrete
            .union_arms()
            .all(|arm| subtype_of(required, &arm, visiting, log));
    }

    if required.kind() == Kind::Union {
        trace::record(
            log,
            SubtypeAction::UnionAny,
            required,
            concrete,
            "some arm of the required union must accept",
        );
        return required
            .union_arms()
            .any(|arm| subtype_of(&arm, concrete, visiting, log));
    }

    if required.kind() != concrete.kind() {
        trace::record(
            log,
            SubtypeAction::KindMismatch,
            required,
            concrete,
            format!("{} is not {}", concrete.kind(), required.kind()),
        );
        return false;
    }

    match required.kind() {
        Kind::Bool | Kind::Number | Kind::String | Kind::Blob | Kind::Type => true,

        Kind::List | Kind::Set | Kind::Ref => {
            trace::record(log, SubtypeAction::Decompose, required, concrete, "element is covariant");
            let required_elem = required.element_type().expect("kind checked");
            let concrete_elem = concrete.element_type().expect("kind checked");
            subtype_of(&required_elem, &concrete_elem, visiting, log)
        }

        Kind::Map => {
            trace::record(
                log,
                SubtypeAction::Decompose,
                required,
                concrete,
                "key and value are covariant",
            );
            let required_key = required.key_type().expect("kind checked");
            let concrete_key = concrete.key_type().expect("kind checked");
            let required_value = required.value_type().expect("kind checked");
            let concrete_value = concrete.value_type().expect("kind checked");
            subtype_of(&required_key, &concrete_key, visiting, log)
                && subtype_of(&required_value, &concrete_value, visiting, log)
        }

        Kind::Struct => struct_subtype(required, concrete, visiting, log),

        Kind::Value | Kind::Union | Kind::Cycle => unreachable!("handled before the kind match"),
    }
}

fn struct_subtype(
    required: &Type,
    concrete: &Type,
    visiting: &mut Visiting,
    log: &mut Option<TraceLog>,
) -> bool {
    let required_name = required.struct_name().expect("kind checked");
    let concrete_name = concrete.struct_name().expect("kind checked");
    if !required_name.is_empty() && required_name != concrete_name {
        trace::record(
            log,
            SubtypeAction::NameMismatch,
            required,
            concrete,
            format!("`{concrete_name}` is not `{required_name}`"),
        );
        return false;
    }

    let pair = (required.identity(), concrete.identity());
    if visiting.contains(&pair) {
        trace::record(
            log,
            SubtypeAction::CycleAssumed,
            required,
            concrete,
            "pair already under comparison",
        );
        return true;
    }

    trace::record(log, SubtypeAction::StructWalk, required, concrete, "walking fields");
    visiting.push(pair);
    let verdict = struct_fields_subtype(required, concrete, visiting, log);
    visiting.pop();
    verdict
}

/// Width + depth + optionality over two field lists in ascending name
/// order. Concrete fields with no required counterpart are always fine;
/// a missing concrete field is fine only for an optional required field.
fn struct_fields_subtype(
    required: &Type,
    concrete: &Type,
    visiting: &mut Visiting,
    log: &mut Option<TraceLog>,
) -> bool {
    let concrete_fields: Vec<_> = concrete.fields().collect();
    let mut ci = 0;
    for r in required.fields() {
        while ci < concrete_fields.len() && concrete_fields[ci].name < r.name {
            ci += 1;
        }
        match concrete_fields.get(ci) {
            Some(c) if c.name == r.name => {
                if c.optional && !r.optional {
                    return false;
                }
                if !subtype_of(&r.ty, &c.ty, visiting, log) {
                    return false;
                }
                ci += 1;
            }
            _ => {
                if !r.optional {
                    return false;
                }
            }
        }
    }
    true
}
