// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{decode_target, decode_traits, member_not_found, ShapeRef, ShapeType};
use crate::error::{Error, Result, ValidationError};
use crate::identifier::Identifier;
use crate::model::Model;
use crate::registry::TraitRegistry;
use crate::traits::{Trait, TraitList};
use crate::value::Value;

use std::collections::BTreeMap;

/// Named reference from an aggregate shape to the shape it contains.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    pub target: Identifier,
    pub traits: TraitList,
}

impl MemberShape {
    pub fn new(target: Identifier) -> Self {
        Self {
            target,
            traits: TraitList::default(),
        }
    }

    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self {
            target: decode_target(value)?,
            traits: decode_traits(value, traits)?,
        })
    }

    /// The target must exist and must not be a member, service, operation or resource.
    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        let target = model.shape(&self.target).ok_or_else(|| {
            Error::from(ValidationError::TargetNotFound {
                member: id.clone(),
                target: self.target.clone(),
            })
        })?;
        let shape_type = target.shape_type();
        if shape_type.is_service_kind() || shape_type == ShapeType::Member {
            return Err(ValidationError::IllegalTarget {
                member: id.clone(),
                target: self.target.clone(),
                shape_type,
            }
            .into());
        }
        self.validate_traits(model, id)
    }

    /// Check that the target exists and is of the given kind.
    pub(crate) fn validate_target_kind(
        &self,
        model: &Model,
        id: &Identifier,
        expected: ShapeType,
    ) -> Result<()> {
        let actual = match model.shape(&self.target) {
            Some(target) => target.shape_type(),
            None => {
                return Err(ValidationError::TargetNotFound {
                    member: id.clone(),
                    target: self.target.clone(),
                }
                .into())
            }
        };
        if actual == ShapeType::Member {
            return Err(ValidationError::IllegalTarget {
                member: id.clone(),
                target: self.target.clone(),
                shape_type: actual,
            }
            .into());
        }
        if actual != expected {
            return Err(ValidationError::UnexpectedTargetKind {
                member: id.clone(),
                target: self.target.clone(),
                expected,
                actual,
            }
            .into());
        }
        self.validate_traits(model, id)
    }

    fn validate_traits(&self, model: &Model, id: &Identifier) -> Result<()> {
        self.traits.validate(model, ShapeRef::Member(self), id)
    }
}

/// Element shape of a `list` or `set`.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionShape {
    pub member: MemberShape,
    pub traits: TraitList,
}

impl CollectionShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        let member = value
            .get("member")
            .ok_or_else(|| Error::decode("collection", "missing `member`"))?;
        Ok(Self {
            member: MemberShape::decode(member, traits)?,
            traits: decode_traits(value, traits)?,
        })
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        self.member.validate(model, &id.with_member("member"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapShape {
    pub key: MemberShape,
    pub value: MemberShape,
    pub traits: TraitList,
}

impl MapShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        let field = |name: &str| {
            value
                .get(name)
                .ok_or_else(|| Error::decode("map", format!("missing `{name}`")))
        };
        Ok(Self {
            key: MemberShape::decode(field("key")?, traits)?,
            value: MemberShape::decode(field("value")?, traits)?,
            traits: decode_traits(value, traits)?,
        })
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        self.key.validate(model, &id.with_member("key"))?;
        self.value.validate(model, &id.with_member("value"))
    }
}

/// Members by name. Backs `structure`, `union`, `enum` and `intEnum`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureShape {
    pub members: BTreeMap<String, MemberShape>,
    pub traits: TraitList,
}

impl StructureShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        let mut members = BTreeMap::new();
        if let Some(fields) = value.get("members").filter(|m| !m.is_null()) {
            let fields = fields
                .as_object()
                .map_err(|e| Error::decode("field `members`", e))?;
            for (name, member) in fields.iter() {
                let member = MemberShape::decode(member, traits)
                    .map_err(|e| Error::decode(format!("member `{name}`"), e))?;
                members.insert(name.to_string(), member);
            }
        }
        Ok(Self {
            members,
            traits: decode_traits(value, traits)?,
        })
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        for (name, member) in &self.members {
            member.validate(model, &id.with_member(name))?;
        }
        Ok(())
    }

    pub fn add_trait_to_member(&mut self, member: &Identifier, t: Trait) -> Result<()> {
        let name = member.member().unwrap_or_default();
        match self.members.get_mut(name) {
            Some(m) => {
                m.traits.add(t);
                Ok(())
            }
            None => Err(member_not_found(member)),
        }
    }

    pub fn remove_trait_from_member(&mut self, member: &Identifier, name: &str) -> Result<()> {
        let member_name = member.member().unwrap_or_default();
        match self.members.get_mut(member_name) {
            Some(m) => {
                m.traits.remove_by_name(name);
                Ok(())
            }
            None => Err(member_not_found(member)),
        }
    }
}
