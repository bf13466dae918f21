//! The type builder: primitive singletons, parameterized collection
//! constructors, union normalization, and struct construction with cycle
//! closure.
//!
//! Every constructor allocates a fresh arena and imports the reachable
//! nodes of its argument terms into it, so the returned term is
//! self-contained. Struct construction is where cycles close: while
//! importing field types, a `Cycle<name>` placeholder whose name matches
//! the struct being built is redirected to the struct's own root instead
//! of being copied. Inner structs resolved their own names when they were
//! built, so the innermost enclosing struct always wins.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::{FieldNode, Graph, Kind, Node, NodeId, Type, TypeError, compare};

// ---------------------------------------------------------------------------
// Struct field input
// ---------------------------------------------------------------------------

/// One field handed to [`make_struct_type`]: name, field type, optional
/// marker. Input order is irrelevant; the builder sorts by name.
#[derive(Debug, Clone)]
pub struct StructField {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

impl StructField {
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Primitive singletons
// ---------------------------------------------------------------------------

fn leaf(node: Node) -> Type {
    Type::new(Arc::new(Graph { nodes: vec![node] }), NodeId(0))
}

static BOOL: LazyLock<Type> = LazyLock::new(|| leaf(Node::Bool));
static NUMBER: LazyLock<Type> = LazyLock::new(|| leaf(Node::Number));
static STRING: LazyLock<Type> = LazyLock::new(|| leaf(Node::String));
static BLOB: LazyLock<Type> = LazyLock::new(|| leaf(Node::Blob));
static VALUE: LazyLock<Type> = LazyLock::new(|| leaf(Node::Value));
static TYPE: LazyLock<Type> = LazyLock::new(|| leaf(Node::Type));
static EMPTY_STRUCT: LazyLock<Type> =
    LazyLock::new(|| make_struct_type("", Vec::new()).expect("no fields, no duplicates"));

pub fn bool_type() -> Type {
    BOOL.clone()
}

pub fn number_type() -> Type {
    NUMBER.clone()
}

pub fn string_type() -> Type {
    STRING.clone()
}

pub fn blob_type() -> Type {
    BLOB.clone()
}

/// The top type: every value conforms to it.
pub fn value_type() -> Type {
    VALUE.clone()
}

/// The kind of type-values.
pub fn type_type() -> Type {
    TYPE.clone()
}

/// The anonymous struct with zero fields. Distinct from [`value_type`]:
/// it accepts any struct value, not any value.
pub fn empty_struct_type() -> Type {
    EMPTY_STRUCT.clone()
}

// ---------------------------------------------------------------------------
// Graph assembly
// ---------------------------------------------------------------------------

struct GraphBuilder {
    nodes: Vec<Node>,
    /// Source node → destination slot, so shared subterms import once and
    /// back-edges in the source land on the already-imported slot.
    imported: HashMap<(usize, NodeId), NodeId>,
    /// When building a struct: placeholders naming it resolve to this slot.
    cycle_target: Option<(String, NodeId)>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            imported: HashMap::new(),
            cycle_target: None,
        }
    }

    /// Reserve a slot before its children exist, so back-edges can point
    /// at it. The scratch node is overwritten once the children are in.
    fn reserve(&mut self) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::Value);
        id
    }

    fn import(&mut self, ty: &Type) -> NodeId {
        self.import_node(ty.graph(), ty.root())
    }

    fn import_node(&mut self, graph: &Graph, id: NodeId) -> NodeId {
        if let Some((name, target)) = &self.cycle_target
            && let Node::Cycle(referenced) = graph.node(id)
            && referenced == name
        {
            return *target;
        }

        let key = (graph as *const Graph as usize, id);
        if let Some(&done) = self.imported.get(&key) {
            return done;
        }
        let slot = self.reserve();
        self.imported.insert(key, slot);

        let node = match graph.node(id) {
            Node::Bool => Node::Bool,
            Node::Number => Node::Number,
            Node::String => Node::String,
            Node::Blob => Node::Blob,
            Node::Value => Node::Value,
            Node::Type => Node::Type,
            Node::List(e) => Node::List(self.import_node(graph, *e)),
            Node::Set(e) => Node::Set(self.import_node(graph, *e)),
            Node::Ref(e) => Node::Ref(self.import_node(graph, *e)),
            Node::Map(k, v) => {
                Node::Map(self.import_node(graph, *k), self.import_node(graph, *v))
            }
            Node::Union(arms) => Node::Union(
                arms.iter()
                    .map(|arm| self.import_node(graph, *arm))
                    .collect(),
            ),
            Node::Struct { name, fields } => Node::Struct {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|fld| FieldNode {
                        name: fld.name.clone(),
                        ty: self.import_node(graph, fld.ty),
                        optional: fld.optional,
                    })
                    .collect(),
            },
            Node::Cycle(name) => Node::Cycle(name.clone()),
        };
        self.nodes[slot.index()] = node;
        slot
    }

    fn finish(self, root: NodeId) -> Type {
        Type::new(Arc::new(Graph { nodes: self.nodes }), root)
    }
}

// ---------------------------------------------------------------------------
// Parameterized collections
// ---------------------------------------------------------------------------

pub fn make_list_type(element: Type) -> Type {
    make_compound(&element, Node::List)
}

pub fn make_set_type(element: Type) -> Type {
    make_compound(&element, Node::Set)
}

pub fn make_ref_type(target: Type) -> Type {
    make_compound(&target, Node::Ref)
}

fn make_compound(element: &Type, wrap: fn(NodeId) -> Node) -> Type {
    let mut builder = GraphBuilder::new();
    let root = builder.reserve();
    let element = builder.import(element);
    builder.nodes[root.index()] = wrap(element);
    builder.finish(root)
}

pub fn make_map_type(key: Type, value: Type) -> Type {
    let mut builder = GraphBuilder::new();
    let root = builder.reserve();
    let key = builder.import(&key);
    let value = builder.import(&value);
    builder.nodes[root.index()] = Node::Map(key, value);
    builder.finish(root)
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

/// Build a union in canonical form: flatten nested unions, deduplicate by
/// structural equality, sort by the canonical order, and collapse arity 1
/// to the arm itself. Zero arms yield the empty union, the bottom type,
/// which is how empty collections are typed.
pub fn make_union_type(arms: impl IntoIterator<Item = Type>) -> Type {
    let mut flat = Vec::new();
    for arm in arms {
        flatten_into(arm, &mut flat);
    }
    flat.sort_by(|a, b| compare::canonical_cmp(a, b));
    flat.dedup_by(|a, b| a == b);

    if flat.len() == 1 {
        return flat.pop().expect("length checked");
    }

    let mut builder = GraphBuilder::new();
    let root = builder.reserve();
    let arm_nodes = flat.iter().map(|arm| builder.import(arm)).collect();
    builder.nodes[root.index()] = Node::Union(arm_nodes);
    builder.finish(root)
}

fn flatten_into(ty: Type, out: &mut Vec<Type>) {
    if ty.kind() == Kind::Union {
        for arm in ty.union_arms() {
            flatten_into(arm, out);
        }
    } else {
        out.push(ty);
    }
}

// ---------------------------------------------------------------------------
// Structs and cycles
// ---------------------------------------------------------------------------

/// Build a struct type. Fields are sorted by name; duplicate names are a
/// construction error. `Cycle<name>` placeholders in the field types that
/// name this struct resolve to a back-edge at the new root, which is how
/// self-referential types close.
pub fn make_struct_type(
    name: impl Into<String>,
    mut fields: Vec<StructField>,
) -> Result<Type, TypeError> {
    let name = name.into();
    fields.sort_by(|a, b| a.name.cmp(&b.name));
    for window in fields.windows(2) {
        if window[0].name == window[1].name {
            return Err(TypeError::DuplicateField {
                name,
                field: window[1].name.clone(),
            });
        }
    }

    let mut builder = GraphBuilder::new();
    let root = builder.reserve();
    builder.cycle_target = Some((name.clone(), root));
    let field_nodes = fields
        .iter()
        .map(|fld| FieldNode {
            name: fld.name.clone(),
            ty: builder.import(&fld.ty),
            optional: fld.optional,
        })
        .collect();
    builder.nodes[root.index()] = Node::Struct {
        name,
        fields: field_nodes,
    };

    let mut graph = Graph {
        nodes: builder.nodes,
    };
    renormalize_unions(&mut graph);
    Ok(Type::new(Arc::new(graph), root))
}

/// A symbolic back-reference to an enclosing struct, by name. Only
/// meaningful as a field-type subterm of a [`make_struct_type`] call;
/// a placeholder no enclosing struct resolves stays in the term, where
/// [`Type::ensure_resolved`] reports it and the subtype judge treats it
/// as a construction bug.
pub fn make_cycle_type(name: impl Into<String>) -> Type {
    leaf(Node::Cycle(name.into()))
}

/// Re-establish union canonical form after cycle resolution. Resolving a
/// placeholder turns a `Cycle` arm into a struct back-edge, which can
/// change its rank relative to sibling arms or make it equal to one.
fn renormalize_unions(graph: &mut Graph) {
    for i in 0..graph.nodes.len() {
        let arms = match &graph.nodes[i] {
            Node::Union(arms) => arms.clone(),
            _ => continue,
        };
        let mut arms = arms;
        arms.sort_by(|a, b| compare::cmp_nodes(graph, *a, graph, *b, &mut Vec::new()));
        arms.dedup_by(|a, b| {
            compare::cmp_nodes(graph, *a, graph, *b, &mut Vec::new()) == Ordering::Equal
        });
        let replacement = if arms.len() == 1 {
            graph.nodes[arms[0].index()].clone()
        } else {
            Node::Union(arms)
        };
        graph.nodes[i] = replacement;
    }
}
