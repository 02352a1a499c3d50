// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result, ValidationError};
use crate::identifier::Identifier;
use crate::model::Model;
use crate::shapes::{MemberShape, Shape, ShapeRef, StructureShape};
use crate::traits::{
    EnumValueTrait, LengthTrait, PatternTrait, RangeTrait, RequiredTrait, StaticTrait, TraitList,
    UniqueItemsTrait,
};
use crate::value::Value;

/// Checks dynamic values, such as trait payloads, against model shapes.
pub(crate) struct ValueValidator<'m> {
    model: &'m Model,
}

fn child(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

fn mismatch(path: &str, id: &Identifier, expected: &str, value: &Value) -> Error {
    ValidationError::ValueMismatch {
        path: path.to_string(),
        shape: id.clone(),
        expected: expected.to_string(),
        actual: value.kind().to_string(),
    }
    .into()
}

fn violated(path: &str, trait_name: &str, reason: String) -> Error {
    ValidationError::ConstraintViolated {
        path: path.to_string(),
        trait_name: trait_name.to_string(),
        reason,
    }
    .into()
}

impl<'m> ValueValidator<'m> {
    pub(crate) fn new(model: &'m Model) -> Self {
        Self { model }
    }

    pub(crate) fn validate(&self, value: &Value, id: &Identifier) -> Result<()> {
        self.validate_with_path(value, id, "$")
    }

    fn validate_with_path(&self, value: &Value, id: &Identifier, path: &str) -> Result<()> {
        match self.model.shape(id) {
            Some(ShapeRef::Shape(shape)) => self.validate_shape(value, shape, id, path),
            Some(ShapeRef::Member(member)) => self.validate_member(value, member, path),
            None => Err(Error::ShapeNotFound(id.clone())),
        }
    }

    fn validate_member(&self, value: &Value, member: &MemberShape, path: &str) -> Result<()> {
        Self::check_constraints(value, &member.traits, path)?;
        match self.model.shape(&member.target) {
            Some(ShapeRef::Shape(shape)) => self.validate_shape(value, shape, &member.target, path),
            // Member to member targets would never bottom out.
            Some(ShapeRef::Member(_)) => Err(ValidationError::ValueMismatch {
                path: path.to_string(),
                shape: member.target.clone(),
                expected: "a shape target".to_string(),
                actual: "a member".to_string(),
            }
            .into()),
            None => Err(Error::ShapeNotFound(member.target.clone())),
        }
    }

    fn validate_shape(&self, value: &Value, shape: &Shape, id: &Identifier, path: &str) -> Result<()> {
        Self::check_constraints(value, shape.traits(), path)?;
        match shape {
            Shape::Blob(_) | Shape::String(_) => match value {
                Value::String(_) => Ok(()),
                _ => Err(mismatch(path, id, "a string", value)),
            },
            Shape::Boolean(_) => match value {
                Value::Bool(_) => Ok(()),
                _ => Err(mismatch(path, id, "a boolean", value)),
            },
            Shape::Byte(_)
            | Shape::Short(_)
            | Shape::Integer(_)
            | Shape::Long(_)
            | Shape::BigInteger(_) => match value {
                Value::Number(n) if n.is_integer() => Ok(()),
                _ => Err(mismatch(path, id, "an integer", value)),
            },
            Shape::Float(_) | Shape::Double(_) | Shape::BigDecimal(_) => match value {
                Value::Number(_) => Ok(()),
                _ => Err(mismatch(path, id, "a number", value)),
            },
            Shape::Timestamp(_) => match value {
                Value::String(_) | Value::Number(_) => Ok(()),
                _ => Err(mismatch(path, id, "a timestamp", value)),
            },
            Shape::Document(_) => Ok(()),
            Shape::List(c) | Shape::Set(c) => {
                let Value::Array(items) = value else {
                    return Err(mismatch(path, id, "an array", value));
                };
                for (idx, item) in items.iter().enumerate() {
                    self.validate_member(item, &c.member, &format!("{path}[{idx}]"))?;
                }
                if matches!(shape, Shape::Set(_)) || c.traits.has_trait::<UniqueItemsTrait>() {
                    for (idx, item) in items.iter().enumerate() {
                        if items[..idx].contains(item) {
                            return Err(mismatch(
                                &format!("{path}[{idx}]"),
                                id,
                                "unique items",
                                item,
                            ));
                        }
                    }
                }
                Ok(())
            }
            Shape::Map(m) => {
                let Value::Object(fields) = value else {
                    return Err(mismatch(path, id, "an object", value));
                };
                for (key, v) in fields.iter() {
                    let path = child(path, key);
                    self.validate_member(&Value::String(key.clone()), &m.key, &path)?;
                    self.validate_member(v, &m.value, &path)?;
                }
                Ok(())
            }
            Shape::Structure(s) => self.validate_structure(value, s, id, path),
            Shape::Union(s) => {
                match value {
                    Value::Object(fields) if fields.len() == 1 => (),
                    _ => return Err(mismatch(path, id, "an object with exactly one member", value)),
                }
                self.validate_structure(value, s, id, path)
            }
            Shape::Enum(s) => self.validate_enum(value, s, id, path, false),
            Shape::IntEnum(s) => self.validate_enum(value, s, id, path, true),
            Shape::Service(_) | Shape::Operation(_) | Shape::Resource(_) => Err(mismatch(
                path,
                id,
                "a data shape",
                value,
            )),
        }
    }

    fn validate_structure(
        &self,
        value: &Value,
        shape: &StructureShape,
        id: &Identifier,
        path: &str,
    ) -> Result<()> {
        let Value::Object(fields) = value else {
            return Err(mismatch(path, id, "an object", value));
        };
        for (key, v) in fields.iter() {
            let Some(member) = shape.members.get(&**key) else {
                return Err(ValidationError::UnknownMember {
                    path: path.to_string(),
                    member: key.to_string(),
                }
                .into());
            };
            self.validate_member(v, member, &child(path, key))?;
        }
        for (name, member) in &shape.members {
            if member.traits.has_trait::<RequiredTrait>() && !fields.contains_key(name.as_str()) {
                return Err(ValidationError::MissingRequiredMember {
                    path: path.to_string(),
                    member: name.clone(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// A string enum accepts each member's value, which defaults to the
    /// member name. Int enums require explicit values.
    fn validate_enum(
        &self,
        value: &Value,
        shape: &StructureShape,
        id: &Identifier,
        path: &str,
        int_enum: bool,
    ) -> Result<()> {
        let found = shape.members.iter().any(|(name, member)| {
            match member.traits.get::<EnumValueTrait>() {
                Some(EnumValueTrait(v)) => v == value,
                None => !int_enum && value.as_string().is_ok_and(|s| &**s == name.as_str()),
            }
        });
        if found {
            Ok(())
        } else if int_enum {
            Err(mismatch(path, id, "a declared intEnum value", value))
        } else {
            Err(mismatch(path, id, "a declared enum value", value))
        }
    }

    /// Length, range and pattern constraints. Values of the wrong kind are
    /// left for the shape check to report.
    fn check_constraints(value: &Value, traits: &TraitList, path: &str) -> Result<()> {
        if let Some(length) = traits.get::<LengthTrait>() {
            let len = match value {
                Value::String(s) => Some(s.chars().count()),
                Value::Array(a) => Some(a.len()),
                Value::Object(m) => Some(m.len()),
                _ => None,
            };
            if let Some(len) = len.filter(|len| !length.contains(*len)) {
                return Err(violated(
                    path,
                    LengthTrait::NAME,
                    format!("length {len} is out of bounds"),
                ));
            }
        }
        if let Some(range) = traits.get::<RangeTrait>() {
            if let Some(n) = value.as_number().ok().and_then(|n| n.as_f64()) {
                if !range.contains(n) {
                    return Err(violated(
                        path,
                        RangeTrait::NAME,
                        format!("{n} is out of range"),
                    ));
                }
            }
        }
        if let (Some(pattern), Ok(s)) = (traits.get::<PatternTrait>(), value.as_string()) {
            if !Self::matches_pattern(&pattern.0, s) {
                return Err(violated(
                    path,
                    PatternTrait::NAME,
                    format!("`{s}` does not match `{}`", pattern.0),
                ));
            }
        }
        Ok(())
    }

    #[cfg(feature = "regex")]
    fn matches_pattern(pattern: &str, s: &str) -> bool {
        // An invalid pattern is reported by trait validation, not here.
        regex::Regex::new(pattern).map_or(true, |re| re.is_match(s))
    }

    #[cfg(not(feature = "regex"))]
    fn matches_pattern(_pattern: &str, _s: &str) -> bool {
        true
    }
}
