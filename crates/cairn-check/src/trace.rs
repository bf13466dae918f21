//! Step tracing for the subtype judge.
//!
//! [`crate::is_subtype_traced`] records every decision the judge takes,
//! so tooling can expose why a conformance check passed or failed. The
//! plain entry point never constructs a log; tracing costs nothing unless
//! asked for.

use cairn_types::Type;
use serde::Serialize;

/// A single decision taken while judging one `(required, concrete)` pair.
#[derive(Debug, Clone, Serialize)]
pub struct SubtypeStep {
    pub step: usize,
    pub action: SubtypeAction,
    pub required: String,
    pub concrete: String,
    pub detail: String,
}

/// Which rule fired at a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtypeAction {
    /// The two terms are structurally equal; accepted outright.
    Identity,
    /// The required side is `Value`, the top type.
    TopType,
    /// Concrete union: every arm must conform.
    UnionAll,
    /// Required union: some arm must accept the concrete type.
    UnionAny,
    /// Structural recursion into element slots.
    Decompose,
    /// Struct-vs-struct field walk entered.
    StructWalk,
    /// Pair already on the comparison path; assumed compatible.
    CycleAssumed,
    /// Kinds differ and no rule applies.
    KindMismatch,
    /// Non-empty required struct name differs from the concrete name.
    NameMismatch,
}

#[derive(Debug, Default)]
pub(crate) struct TraceLog {
    steps: Vec<SubtypeStep>,
}

impl TraceLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn into_steps(self) -> Vec<SubtypeStep> {
        self.steps
    }
}

pub(crate) fn record(
    log: &mut Option<TraceLog>,
    action: SubtypeAction,
    required: &Type,
    concrete: &Type,
    detail: impl Into<String>,
) {
    let Some(log) = log else { return };
    let step = log.steps.len();
    log.steps.push(SubtypeStep {
        step,
        action,
        required: required.to_string(),
        concrete: concrete.to_string(),
        detail: detail.into(),
    });
}
