// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod aggregate;
mod service;
mod simple;

pub use aggregate::{CollectionShape, MapShape, MemberShape, StructureShape};
pub use service::{
    OperationMemberShape, OperationShape, ResourceMemberShape, ResourceShape, ServiceShape,
};
pub use simple::SimpleShape;

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::model::Model;
use crate::registry::{ShapeDecodeFn, TraitRegistry};
use crate::traits::{Trait, TraitList};
use crate::value::Value;

use core::fmt;

/// Kind tag of a shape, as spelled in the `type` field of the JSON AST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShapeType {
    Blob,
    Boolean,
    String,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    BigDecimal,
    Timestamp,
    Document,
    List,
    Set,
    Map,
    Structure,
    Union,
    Enum,
    IntEnum,
    Member,
    Service,
    Operation,
    Resource,
}

const SHAPE_TYPE_NAMES: [(ShapeType, &str); 24] = [
    (ShapeType::Blob, "blob"),
    (ShapeType::Boolean, "boolean"),
    (ShapeType::String, "string"),
    (ShapeType::Byte, "byte"),
    (ShapeType::Short, "short"),
    (ShapeType::Integer, "integer"),
    (ShapeType::Long, "long"),
    (ShapeType::Float, "float"),
    (ShapeType::Double, "double"),
    (ShapeType::BigInteger, "bigInteger"),
    (ShapeType::BigDecimal, "bigDecimal"),
    (ShapeType::Timestamp, "timestamp"),
    (ShapeType::Document, "document"),
    (ShapeType::List, "list"),
    (ShapeType::Set, "set"),
    (ShapeType::Map, "map"),
    (ShapeType::Structure, "structure"),
    (ShapeType::Union, "union"),
    (ShapeType::Enum, "enum"),
    (ShapeType::IntEnum, "intEnum"),
    (ShapeType::Member, "member"),
    (ShapeType::Service, "service"),
    (ShapeType::Operation, "operation"),
    (ShapeType::Resource, "resource"),
];

impl ShapeType {
    pub fn name(self) -> &'static str {
        SHAPE_TYPE_NAMES
            .iter()
            .find(|(t, _)| *t == self)
            .map_or("unknown", |(_, n)| n)
    }

    pub fn from_name(name: &str) -> Option<ShapeType> {
        SHAPE_TYPE_NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(t, _)| *t)
    }

    pub fn is_number(self) -> bool {
        matches!(
            self,
            ShapeType::Byte
                | ShapeType::Short
                | ShapeType::Integer
                | ShapeType::Long
                | ShapeType::Float
                | ShapeType::Double
                | ShapeType::BigInteger
                | ShapeType::BigDecimal
        )
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            ShapeType::Byte
                | ShapeType::Short
                | ShapeType::Integer
                | ShapeType::Long
                | ShapeType::BigInteger
        )
    }

    pub fn is_simple(self) -> bool {
        self.is_number()
            || matches!(
                self,
                ShapeType::Blob
                    | ShapeType::Boolean
                    | ShapeType::String
                    | ShapeType::Timestamp
                    | ShapeType::Document
            )
    }

    pub fn is_collection(self) -> bool {
        matches!(self, ShapeType::List | ShapeType::Set)
    }

    /// Shapes that plain members may not target.
    pub fn is_service_kind(self) -> bool {
        matches!(
            self,
            ShapeType::Service | ShapeType::Operation | ShapeType::Resource
        )
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named type definition held by a [`Model`].
///
/// Shapes refer to each other only through [`Identifier`]s; the model is the
/// single owner and every cross reference is resolved by lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Blob(SimpleShape),
    Boolean(SimpleShape),
    String(SimpleShape),
    Byte(SimpleShape),
    Short(SimpleShape),
    Integer(SimpleShape),
    Long(SimpleShape),
    Float(SimpleShape),
    Double(SimpleShape),
    BigInteger(SimpleShape),
    BigDecimal(SimpleShape),
    Timestamp(SimpleShape),
    Document(SimpleShape),
    List(CollectionShape),
    Set(CollectionShape),
    Map(MapShape),
    Structure(StructureShape),
    Union(StructureShape),
    Enum(StructureShape),
    IntEnum(StructureShape),
    Service(ServiceShape),
    Operation(OperationShape),
    Resource(ResourceShape),
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Blob(_) => ShapeType::Blob,
            Shape::Boolean(_) => ShapeType::Boolean,
            Shape::String(_) => ShapeType::String,
            Shape::Byte(_) => ShapeType::Byte,
            Shape::Short(_) => ShapeType::Short,
            Shape::Integer(_) => ShapeType::Integer,
            Shape::Long(_) => ShapeType::Long,
            Shape::Float(_) => ShapeType::Float,
            Shape::Double(_) => ShapeType::Double,
            Shape::BigInteger(_) => ShapeType::BigInteger,
            Shape::BigDecimal(_) => ShapeType::BigDecimal,
            Shape::Timestamp(_) => ShapeType::Timestamp,
            Shape::Document(_) => ShapeType::Document,
            Shape::List(_) => ShapeType::List,
            Shape::Set(_) => ShapeType::Set,
            Shape::Map(_) => ShapeType::Map,
            Shape::Structure(_) => ShapeType::Structure,
            Shape::Union(_) => ShapeType::Union,
            Shape::Enum(_) => ShapeType::Enum,
            Shape::IntEnum(_) => ShapeType::IntEnum,
            Shape::Service(_) => ShapeType::Service,
            Shape::Operation(_) => ShapeType::Operation,
            Shape::Resource(_) => ShapeType::Resource,
        }
    }

    pub fn traits(&self) -> &TraitList {
        match self {
            Shape::Blob(s)
            | Shape::Boolean(s)
            | Shape::String(s)
            | Shape::Byte(s)
            | Shape::Short(s)
            | Shape::Integer(s)
            | Shape::Long(s)
            | Shape::Float(s)
            | Shape::Double(s)
            | Shape::BigInteger(s)
            | Shape::BigDecimal(s)
            | Shape::Timestamp(s)
            | Shape::Document(s) => &s.traits,
            Shape::List(s) | Shape::Set(s) => &s.traits,
            Shape::Map(s) => &s.traits,
            Shape::Structure(s) | Shape::Union(s) | Shape::Enum(s) | Shape::IntEnum(s) => {
                &s.traits
            }
            Shape::Service(s) => &s.traits,
            Shape::Operation(s) => &s.traits,
            Shape::Resource(s) => &s.traits,
        }
    }

    pub fn traits_mut(&mut self) -> &mut TraitList {
        match self {
            Shape::Blob(s)
            | Shape::Boolean(s)
            | Shape::String(s)
            | Shape::Byte(s)
            | Shape::Short(s)
            | Shape::Integer(s)
            | Shape::Long(s)
            | Shape::Float(s)
            | Shape::Double(s)
            | Shape::BigInteger(s)
            | Shape::BigDecimal(s)
            | Shape::Timestamp(s)
            | Shape::Document(s) => &mut s.traits,
            Shape::List(s) | Shape::Set(s) => &mut s.traits,
            Shape::Map(s) => &mut s.traits,
            Shape::Structure(s) | Shape::Union(s) | Shape::Enum(s) | Shape::IntEnum(s) => {
                &mut s.traits
            }
            Shape::Service(s) => &mut s.traits,
            Shape::Operation(s) => &mut s.traits,
            Shape::Resource(s) => &mut s.traits,
        }
    }

    /// Structure, union and enum shapes expose their members by name.
    pub fn as_structure(&self) -> Option<&StructureShape> {
        match self {
            Shape::Structure(s) | Shape::Union(s) | Shape::Enum(s) | Shape::IntEnum(s) => Some(s),
            _ => None,
        }
    }

    fn as_structure_mut(&mut self) -> Option<&mut StructureShape> {
        match self {
            Shape::Structure(s) | Shape::Union(s) | Shape::Enum(s) | Shape::IntEnum(s) => Some(s),
            _ => None,
        }
    }

    /// Named member lookup. Lists and maps do not support it.
    pub fn member(&self, name: &str) -> Option<&MemberShape> {
        self.as_structure().and_then(|s| s.members.get(name))
    }

    pub fn add_trait_to_member(&mut self, member: &Identifier, t: Trait) -> Result<()> {
        match self.as_structure_mut() {
            Some(s) => s.add_trait_to_member(member, t),
            None => Err(member_not_found(member)),
        }
    }

    pub fn remove_trait_from_member(&mut self, member: &Identifier, name: &str) -> Result<()> {
        match self.as_structure_mut() {
            Some(s) => s.remove_trait_from_member(member, name),
            None => Err(member_not_found(member)),
        }
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        match self {
            Shape::Blob(_)
            | Shape::Boolean(_)
            | Shape::String(_)
            | Shape::Byte(_)
            | Shape::Short(_)
            | Shape::Integer(_)
            | Shape::Long(_)
            | Shape::Float(_)
            | Shape::Double(_)
            | Shape::BigInteger(_)
            | Shape::BigDecimal(_)
            | Shape::Timestamp(_)
            | Shape::Document(_) => {}
            Shape::List(s) | Shape::Set(s) => s.validate(model, id)?,
            Shape::Map(s) => s.validate(model, id)?,
            Shape::Structure(s) | Shape::Union(s) | Shape::Enum(s) | Shape::IntEnum(s) => {
                s.validate(model, id)?
            }
            Shape::Service(s) => s.validate(model, id)?,
            Shape::Operation(s) => s.validate(model, id)?,
            Shape::Resource(s) => s.validate(model, id)?,
        }
        self.traits().validate(model, ShapeRef::Shape(self), id)
    }
}

pub(crate) fn member_not_found(member: &Identifier) -> Error {
    Error::MemberNotFound {
        shape: member.root(),
        member: member.member().unwrap_or_default().to_string(),
    }
}

/// Borrowed view of either a model shape or a member nested inside one.
/// Selectors and trait validation operate on this view.
#[derive(Debug, Clone, Copy)]
pub enum ShapeRef<'a> {
    Shape(&'a Shape),
    Member(&'a MemberShape),
}

impl<'a> ShapeRef<'a> {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeRef::Shape(s) => s.shape_type(),
            ShapeRef::Member(_) => ShapeType::Member,
        }
    }

    pub fn traits(&self) -> &'a TraitList {
        match self {
            ShapeRef::Shape(s) => s.traits(),
            ShapeRef::Member(m) => &m.traits,
        }
    }

    /// The shape a member points at. `None` for anything but members.
    pub fn target(&self) -> Option<&'a Identifier> {
        match self {
            ShapeRef::Shape(_) => None,
            ShapeRef::Member(m) => Some(&m.target),
        }
    }

    pub fn as_shape(&self) -> Option<&'a Shape> {
        match self {
            ShapeRef::Shape(s) => Some(s),
            ShapeRef::Member(_) => None,
        }
    }

    pub fn as_member(&self) -> Option<&'a MemberShape> {
        match self {
            ShapeRef::Shape(_) => None,
            ShapeRef::Member(m) => Some(m),
        }
    }
}

pub(crate) fn decode_traits(value: &Value, traits: &TraitRegistry) -> Result<TraitList> {
    match value.get("traits") {
        Some(t) if !t.is_null() => TraitList::decode(t, traits),
        _ => Ok(TraitList::default()),
    }
}

pub(crate) fn decode_string(value: &Value, field: &str) -> Result<Option<String>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_string()
            .map(|s| Some(s.to_string()))
            .map_err(|e| Error::decode(format!("field `{field}`"), e)),
    }
}

pub(crate) fn decode_target(value: &Value) -> Result<Identifier> {
    match decode_string(value, "target")? {
        Some(t) => Ok(Identifier::parse(&t)),
        None => Err(Error::decode("member", "missing `target`")),
    }
}

pub(crate) fn decode_list<T>(
    value: &Value,
    field: &str,
    mut decode: impl FnMut(&Value) -> Result<T>,
) -> Result<Vec<T>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(vec![]),
        Some(v) => v
            .as_array()
            .map_err(|e| Error::decode(format!("field `{field}`"), e))?
            .iter()
            .map(&mut decode)
            .collect(),
    }
}

macro_rules! builtin_shape_kinds {
    ($($name:literal => $variant:ident($ty:ident)),* $(,)?) => {
        /// Built-in shape kinds in the form consumed by [`crate::ShapeRegistry`].
        pub(crate) fn builtin_shape_kinds() -> Vec<(&'static str, ShapeDecodeFn)> {
            let mut kinds: Vec<(&'static str, ShapeDecodeFn)> = vec![];
            $(
                {
                    fn decode(value: &Value, traits: &TraitRegistry) -> Result<Shape> {
                        Ok(Shape::$variant($ty::decode(value, traits)?))
                    }
                    kinds.push(($name, decode as ShapeDecodeFn));
                }
            )*
            kinds
        }
    };
}

builtin_shape_kinds! {
    "blob" => Blob(SimpleShape),
    "boolean" => Boolean(SimpleShape),
    "string" => String(SimpleShape),
    "byte" => Byte(SimpleShape),
    "short" => Short(SimpleShape),
    "integer" => Integer(SimpleShape),
    "long" => Long(SimpleShape),
    "float" => Float(SimpleShape),
    "double" => Double(SimpleShape),
    "bigInteger" => BigInteger(SimpleShape),
    "bigDecimal" => BigDecimal(SimpleShape),
    "timestamp" => Timestamp(SimpleShape),
    "document" => Document(SimpleShape),
    "list" => List(CollectionShape),
    "set" => Set(CollectionShape),
    "map" => Map(MapShape),
    "structure" => Structure(StructureShape),
    "union" => Union(StructureShape),
    "enum" => Enum(StructureShape),
    "intEnum" => IntEnum(StructureShape),
    "service" => Service(ServiceShape),
    "operation" => Operation(OperationShape),
    "resource" => Resource(ResourceShape),
}
