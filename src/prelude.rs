// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Shapes every model starts with.

use crate::identifier::Identifier;
use crate::shapes::{Shape, SimpleShape, StructureShape};
use crate::traits::{DefaultTrait, LengthTrait, Trait, TraitList, UnitTypeTrait};
use crate::value::Value;

pub const PRELUDE_NAMESPACE: &str = "smithy.api";

const SIMPLE_SHAPES: [&str; 15] = [
    "Blob",
    "Boolean",
    "String",
    "NonEmptyString",
    "ShapeIdString",
    "Byte",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "BigInteger",
    "BigDecimal",
    "Timestamp",
    "Document",
];

const PRIMITIVE_SHAPES: [&str; 7] = [
    "PrimitiveBoolean",
    "PrimitiveByte",
    "PrimitiveShort",
    "PrimitiveInteger",
    "PrimitiveLong",
    "PrimitiveFloat",
    "PrimitiveDouble",
];

/// Whether `name` is a prelude shape name. Used to resolve bare names in IDL.
pub fn is_prelude_shape(name: &str) -> bool {
    name == "Unit" || SIMPLE_SHAPES.contains(&name) || PRIMITIVE_SHAPES.contains(&name)
}

fn prelude_id(name: &str) -> Identifier {
    Identifier::new(Some(PRELUDE_NAMESPACE), name, None)
}

fn simple(name: &str, traits: TraitList) -> Option<Shape> {
    let shape = SimpleShape::new(traits);
    let shape = match name {
        "Blob" => Shape::Blob(shape),
        "Boolean" | "PrimitiveBoolean" => Shape::Boolean(shape),
        "String" | "NonEmptyString" | "ShapeIdString" => Shape::String(shape),
        "Byte" | "PrimitiveByte" => Shape::Byte(shape),
        "Short" | "PrimitiveShort" => Shape::Short(shape),
        "Integer" | "PrimitiveInteger" => Shape::Integer(shape),
        "Long" | "PrimitiveLong" => Shape::Long(shape),
        "Float" | "PrimitiveFloat" => Shape::Float(shape),
        "Double" | "PrimitiveDouble" => Shape::Double(shape),
        "BigInteger" => Shape::BigInteger(shape),
        "BigDecimal" => Shape::BigDecimal(shape),
        "Timestamp" => Shape::Timestamp(shape),
        "Document" => Shape::Document(shape),
        _ => return None,
    };
    Some(shape)
}

pub(crate) fn prelude_shapes() -> Vec<(Identifier, Shape)> {
    let mut shapes = vec![];
    for name in SIMPLE_SHAPES {
        let mut traits = TraitList::default();
        if name == "NonEmptyString" {
            traits.add(LengthTrait {
                min: Some(1),
                max: None,
            });
        }
        shapes.extend(simple(name, traits).map(|s| (prelude_id(name), s)));
    }
    for name in PRIMITIVE_SHAPES {
        let default = if name == "PrimitiveBoolean" {
            Value::Bool(false)
        } else {
            Value::from(0u64)
        };
        let traits = TraitList::from_iter([Trait::from(DefaultTrait(default))]);
        shapes.extend(simple(name, traits).map(|s| (prelude_id(name), s)));
    }
    let unit = StructureShape {
        traits: TraitList::from_iter([Trait::from(UnitTypeTrait)]),
        ..StructureShape::default()
    };
    shapes.push((prelude_id("Unit"), Shape::Structure(unit)));
    shapes
}
