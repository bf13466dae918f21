//! Boundary view of values for the cairn type core.
//!
//! The subtype judge never traverses a value's contents; it inspects the
//! value's observable kind and, for compound values, the type witness this
//! crate computes: collections report the normalized union of their
//! element types (the empty union when empty), maps report key and value
//! unions likewise, and structs report their declared name and per-field
//! types. Full value representations (chunked sequences, content
//! addressing, lazy loading) live elsewhere; this model carries exactly
//! what the judge inspects.

use std::collections::BTreeMap;

use cairn_types::{
    Kind, StructField, Type, blob_type, bool_type, make_list_type, make_map_type, make_ref_type,
    make_set_type, make_struct_type, make_union_type, number_type, string_type, type_type,
};

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// A value, restricted to the judge's observable surface. Types are values
/// too ([`Value::Type`]); a [`Value::Ref`] carries its target inline, the
/// content address being out of scope at this layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    Blob(Vec<u8>),
    List(Vec<Value>),
    Set(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Ref(Box<Value>),
    Struct(StructValue),
    Type(Type),
}

/// A struct value: declared name (possibly empty) plus a sorted field map.
#[derive(Debug, Clone, PartialEq)]
pub struct StructValue {
    name: String,
    fields: BTreeMap<String, Value>,
}

impl StructValue {
    pub fn new<N, I, F>(name: N, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (F, Value)>,
        F: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(field, value)| (field.into(), value))
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Fields in ascending name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl Value {
    pub fn string(s: impl Into<String>) -> Value {
        Value::String(s.into())
    }

    pub fn blob(bytes: impl Into<Vec<u8>>) -> Value {
        Value::Blob(bytes.into())
    }

    pub fn list(items: impl IntoIterator<Item = Value>) -> Value {
        Value::List(items.into_iter().collect())
    }

    pub fn set(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Set(items.into_iter().collect())
    }

    pub fn map(entries: impl IntoIterator<Item = (Value, Value)>) -> Value {
        Value::Map(entries.into_iter().collect())
    }

    pub fn ref_to(target: Value) -> Value {
        Value::Ref(Box::new(target))
    }

    pub fn struct_of<N, I, F>(name: N, fields: I) -> Value
    where
        N: Into<String>,
        I: IntoIterator<Item = (F, Value)>,
        F: Into<String>,
    {
        Value::Struct(StructValue::new(name, fields))
    }

    /// The value's observable kind.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Blob(_) => Kind::Blob,
            Value::List(_) => Kind::List,
            Value::Set(_) => Kind::Set,
            Value::Map(_) => Kind::Map,
            Value::Ref(_) => Kind::Ref,
            Value::Struct(_) => Kind::Struct,
            Value::Type(_) => Kind::Type,
        }
    }

    /// Element-type witness for `List`, `Set`, and `Ref` values: the
    /// normalized union of element types present, the empty union for an
    /// empty collection, the target's type for a ref.
    pub fn element_type(&self) -> Option<Type> {
        match self {
            Value::List(items) | Value::Set(items) => Some(union_of(items.iter())),
            Value::Ref(target) => Some(target.type_of()),
            _ => None,
        }
    }

    /// Key-type witness for `Map` values, with the same union conventions.
    pub fn key_type(&self) -> Option<Type> {
        match self {
            Value::Map(entries) => Some(union_of(entries.iter().map(|(key, _)| key))),
            _ => None,
        }
    }

    /// Value-type witness for `Map` values, with the same union conventions.
    pub fn value_type(&self) -> Option<Type> {
        match self {
            Value::Map(entries) => Some(union_of(entries.iter().map(|(_, value)| value))),
            _ => None,
        }
    }

    /// The type witness: the most specific type this value conforms to,
    /// computed shallowly from the element types present. An empty
    /// collection reports the empty union in its element slot, which is
    /// why empty collections conform to any element type.
    pub fn type_of(&self) -> Type {
        match self {
            Value::Bool(_) => bool_type(),
            Value::Number(_) => number_type(),
            Value::String(_) => string_type(),
            Value::Blob(_) => blob_type(),
            Value::List(items) => make_list_type(union_of(items.iter())),
            Value::Set(items) => make_set_type(union_of(items.iter())),
            Value::Map(entries) => make_map_type(
                union_of(entries.iter().map(|(key, _)| key)),
                union_of(entries.iter().map(|(_, value)| value)),
            ),
            Value::Ref(target) => make_ref_type(target.type_of()),
            Value::Struct(sv) => make_struct_type(
                sv.name.clone(),
                sv.fields()
                    .map(|(field, value)| StructField::required(field, value.type_of()))
                    .collect(),
            )
            .expect("struct value fields are unique by construction"),
            Value::Type(_) => type_type(),
        }
    }
}

fn union_of<'a>(values: impl Iterator<Item = &'a Value>) -> Type {
    make_union_type(values.map(Value::type_of))
}
