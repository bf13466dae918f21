//! Type terms for the cairn value database.
//!
//! This crate defines the algebraic representation of a type (a rooted,
//! possibly cyclic graph of kind-tagged nodes) together with the builder
//! that produces canonical terms (union flattening and deduplication,
//! sorted struct fields, cycle closure) and the structural operations the
//! rest of the system leans on: coinductive equality, the canonical total
//! order over terms, and diagnostic rendering.
//!
//! Terms are immutable once built. Each term owns an arena of nodes behind
//! an `Arc`; children and back-edges are indices into that arena, so cyclic
//! types carry no ownership cycles and terms are `Send + Sync` for free.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

mod compare;
mod make;

pub use make::{
    StructField, blob_type, bool_type, empty_struct_type, make_cycle_type, make_list_type,
    make_map_type, make_ref_type, make_set_type, make_struct_type, make_union_type, number_type,
    string_type, type_type, value_type,
};

#[cfg(test)]
mod compare_tests;
#[cfg(test)]
mod make_tests;

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// The closed set of type discriminants.
///
/// Declaration order doubles as the rank used by the canonical order over
/// terms, so reordering variants changes the canonical form of unions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Kind {
    Bool,
    Number,
    String,
    Blob,
    /// The top type: every value conforms to it.
    Value,
    /// The kind of type-values; types are first-class values.
    Type,
    List,
    Set,
    Map,
    Ref,
    Struct,
    Union,
    /// Symbolic back-reference to an enclosing struct, by name. Valid only
    /// inside a struct builder call; resolved placeholders never survive.
    Cycle,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "Bool",
            Kind::Number => "Number",
            Kind::String => "String",
            Kind::Blob => "Blob",
            Kind::Value => "Value",
            Kind::Type => "Type",
            Kind::List => "List",
            Kind::Set => "Set",
            Kind::Map => "Map",
            Kind::Ref => "Ref",
            Kind::Struct => "Struct",
            Kind::Union => "Union",
            Kind::Cycle => "Cycle",
        }
    }

    /// Kinds whose terms have zero child slots.
    pub fn is_leaf(self) -> bool {
        matches!(
            self,
            Kind::Bool | Kind::Number | Kind::String | Kind::Blob | Kind::Value | Kind::Type
        )
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Term graph
// ---------------------------------------------------------------------------

/// Index of a node within its term's arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub(crate) struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A field slot inside a struct node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FieldNode {
    pub(crate) name: String,
    pub(crate) ty: NodeId,
    pub(crate) optional: bool,
}

/// One node of a term graph. Children are arena indices; a `Struct` node
/// reachable from one of its own descendants is how a cycle is spelled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Node {
    Bool,
    Number,
    String,
    Blob,
    Value,
    Type,
    List(NodeId),
    Set(NodeId),
    Ref(NodeId),
    Map(NodeId, NodeId),
    Union(Vec<NodeId>),
    Struct {
        name: String,
        fields: Vec<FieldNode>,
    },
    Cycle(String),
}

impl Node {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Node::Bool => Kind::Bool,
            Node::Number => Kind::Number,
            Node::String => Kind::String,
            Node::Blob => Kind::Blob,
            Node::Value => Kind::Value,
            Node::Type => Kind::Type,
            Node::List(_) => Kind::List,
            Node::Set(_) => Kind::Set,
            Node::Map(_, _) => Kind::Map,
            Node::Ref(_) => Kind::Ref,
            Node::Struct { .. } => Kind::Struct,
            Node::Union(_) => Kind::Union,
            Node::Cycle(_) => Kind::Cycle,
        }
    }
}

/// The node arena of a single term. Index 0 is not special in general; the
/// owning [`Type`] records its root explicitly.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Graph {
    pub(crate) nodes: Vec<Node>,
}

impl Graph {
    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

// ---------------------------------------------------------------------------
// Type
// ---------------------------------------------------------------------------

/// A type term: a root node in a shared, immutable arena.
///
/// Cloning is cheap (an `Arc` bump plus an index). Equality is structural
/// and coinductive: two terms are equal iff every finite unrolling
/// matches, so differently-shaped arenas describing the same regular type
/// compare equal.
#[derive(Clone, Serialize, Deserialize)]
pub struct Type {
    graph: Arc<Graph>,
    root: NodeId,
}

/// Stable identity of a term's root node: the arena address plus the node
/// index. Two handles share an identity iff they are literally the same
/// node, which is the keying the subtype judge's memo needs; structural
/// equality would collapse distinct subproblems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeIdentity {
    graph: usize,
    node: NodeId,
}

/// Borrowed view of one struct field: name, field type, optional marker.
#[derive(Debug, Clone)]
pub struct FieldRef<'a> {
    pub name: &'a str,
    pub ty: Type,
    pub optional: bool,
}

impl Type {
    pub(crate) fn new(graph: Arc<Graph>, root: NodeId) -> Self {
        Self { graph, root }
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.graph
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    /// Another handle into the same arena. Used by child accessors.
    pub(crate) fn at(&self, node: NodeId) -> Type {
        Type {
            graph: Arc::clone(&self.graph),
            root: node,
        }
    }

    fn node(&self) -> &Node {
        self.graph.node(self.root)
    }

    pub fn kind(&self) -> Kind {
        self.node().kind()
    }

    pub fn identity(&self) -> TypeIdentity {
        TypeIdentity {
            graph: Arc::as_ptr(&self.graph) as usize,
            node: self.root,
        }
    }

    /// The i-th child slot, in the order fixed by the kind: the element
    /// type for `List`/`Set`/`Ref`, key then value for `Map`, canonical arm
    /// order for `Union`, field order for `Struct`.
    pub fn child(&self, i: usize) -> Option<Type> {
        match self.node() {
            Node::List(e) | Node::Set(e) | Node::Ref(e) => (i == 0).then(|| self.at(*e)),
            Node::Map(k, v) => match i {
                0 => Some(self.at(*k)),
                1 => Some(self.at(*v)),
                _ => None,
            },
            Node::Union(arms) => arms.get(i).map(|a| self.at(*a)),
            Node::Struct { fields, .. } => fields.get(i).map(|fld| self.at(fld.ty)),
            _ => None,
        }
    }

    /// Element type of a `List`, `Set`, or `Ref` term.
    pub fn element_type(&self) -> Option<Type> {
        match self.node() {
            Node::List(e) | Node::Set(e) | Node::Ref(e) => Some(self.at(*e)),
            _ => None,
        }
    }

    /// Key type of a `Map` term.
    pub fn key_type(&self) -> Option<Type> {
        match self.node() {
            Node::Map(k, _) => Some(self.at(*k)),
            _ => None,
        }
    }

    /// Value type of a `Map` term.
    pub fn value_type(&self) -> Option<Type> {
        match self.node() {
            Node::Map(_, v) => Some(self.at(*v)),
            _ => None,
        }
    }

    /// Arms of a `Union` term, in canonical order. Empty for other kinds.
    pub fn union_arms(&self) -> impl Iterator<Item = Type> + '_ {
        let arms: &[NodeId] = match self.node() {
            Node::Union(arms) => arms,
            _ => &[],
        };
        arms.iter().map(|a| self.at(*a))
    }

    /// Declared name of a `Struct` term. The empty string is the anonymous
    /// struct name and matches any concrete name during subtyping.
    pub fn struct_name(&self) -> Option<&str> {
        match self.node() {
            Node::Struct { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Fields of a `Struct` term, in ascending name order. Empty for other
    /// kinds.
    pub fn fields(&self) -> impl Iterator<Item = FieldRef<'_>> + '_ {
        let fields: &[FieldNode] = match self.node() {
            Node::Struct { fields, .. } => fields,
            _ => &[],
        };
        fields.iter().map(|fld| FieldRef {
            name: &fld.name,
            ty: self.at(fld.ty),
            optional: fld.optional,
        })
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        let Node::Struct { fields, .. } = self.node() else {
            return None;
        };
        fields
            .binary_search_by(|fld| fld.name.as_str().cmp(name))
            .ok()
            .map(|idx| {
                let fld = &fields[idx];
                FieldRef {
                    name: &fld.name,
                    ty: self.at(fld.ty),
                    optional: fld.optional,
                }
            })
    }

    /// Referenced struct name of a `Cycle` placeholder.
    pub fn cycle_name(&self) -> Option<&str> {
        match self.node() {
            Node::Cycle(name) => Some(name),
            _ => None,
        }
    }

    /// True while a `Cycle` placeholder is still reachable from the root.
    /// Such terms are legal only as inputs to an enclosing struct builder
    /// call; handing one to the subtype judge is a construction bug.
    pub fn has_unresolved_cycle(&self) -> bool {
        self.ensure_resolved().is_err()
    }

    /// Eager validation of the no-placeholder invariant, for boundaries
    /// that would rather reject a term than trip the judge later.
    pub fn ensure_resolved(&self) -> Result<(), TypeError> {
        let mut visited = vec![false; self.graph.nodes.len()];
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            match self.graph.node(id) {
                Node::Cycle(name) => {
                    return Err(TypeError::UnresolvedCycle { name: name.clone() });
                }
                Node::List(e) | Node::Set(e) | Node::Ref(e) => stack.push(*e),
                Node::Map(k, v) => {
                    stack.push(*k);
                    stack.push(*v);
                }
                Node::Union(arms) => stack.extend(arms.iter().copied()),
                Node::Struct { fields, .. } => stack.extend(fields.iter().map(|fld| fld.ty)),
                _ => {}
            }
        }
        Ok(())
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        compare::types_equal(self, other)
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({self})")
    }
}

// ---------------------------------------------------------------------------
// Diagnostic rendering
// ---------------------------------------------------------------------------

impl fmt::Display for Type {
    /// Canonical human-readable form, for diagnostics only. Back-edges
    /// render as `Cycle<Name>`, so cyclic terms print in finite space.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, &self.graph, self.root, &mut Vec::new())
    }
}

fn write_type(
    f: &mut fmt::Formatter<'_>,
    graph: &Graph,
    id: NodeId,
    on_path: &mut Vec<NodeId>,
) -> fmt::Result {
    match graph.node(id) {
        Node::Bool => f.write_str("Bool"),
        Node::Number => f.write_str("Number"),
        Node::String => f.write_str("String"),
        Node::Blob => f.write_str("Blob"),
        Node::Value => f.write_str("Value"),
        Node::Type => f.write_str("Type"),
        Node::List(e) => {
            f.write_str("List<")?;
            write_type(f, graph, *e, on_path)?;
            f.write_str(">")
        }
        Node::Set(e) => {
            f.write_str("Set<")?;
            write_type(f, graph, *e, on_path)?;
            f.write_str(">")
        }
        Node::Ref(e) => {
            f.write_str("Ref<")?;
            write_type(f, graph, *e, on_path)?;
            f.write_str(">")
        }
        Node::Map(k, v) => {
            f.write_str("Map<")?;
            write_type(f, graph, *k, on_path)?;
            f.write_str(", ")?;
            write_type(f, graph, *v, on_path)?;
            f.write_str(">")
        }
        Node::Union(arms) => {
            if arms.is_empty() {
                return f.write_str("Union<>");
            }
            for (i, arm) in arms.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                write_type(f, graph, *arm, on_path)?;
            }
            Ok(())
        }
        Node::Struct { name, fields } => {
            if on_path.contains(&id) {
                return write!(f, "Cycle<{name}>");
            }
            on_path.push(id);
            f.write_str("Struct ")?;
            if !name.is_empty() {
                write!(f, "{name} ")?;
            }
            if fields.is_empty() {
                f.write_str("{}")?;
            } else {
                f.write_str("{ ")?;
                for (i, fld) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}{}: ", fld.name, if fld.optional { "?" } else { "" })?;
                    write_type(f, graph, fld.ty, on_path)?;
                }
                f.write_str(" }")?;
            }
            on_path.pop();
            Ok(())
        }
        Node::Cycle(name) => write!(f, "Cycle<{name}>"),
    }
}

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

/// Fatal builder errors. These are programmer errors, raised eagerly; the
/// subtype judge itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("duplicate field `{field}` in struct type `{name}`")]
    DuplicateField { name: String, field: String },
    #[error("unresolved cycle placeholder `Cycle<{name}>`: no enclosing struct named `{name}`")]
    UnresolvedCycle { name: String },
}
