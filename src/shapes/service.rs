// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::{decode_list, decode_string, decode_traits, MemberShape, ShapeType};
use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::model::Model;
use crate::registry::TraitRegistry;
use crate::traits::TraitList;
use crate::value::Value;

use std::collections::BTreeMap;

/// Member that must target an `operation` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationMemberShape(pub MemberShape);

impl OperationMemberShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self(MemberShape::decode(value, traits)?))
    }

    pub fn target(&self) -> &Identifier {
        &self.0.target
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        self.0.validate_target_kind(model, id, ShapeType::Operation)
    }
}

/// Member that must target a `resource` shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceMemberShape(pub MemberShape);

impl ResourceMemberShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self(MemberShape::decode(value, traits)?))
    }

    pub fn target(&self) -> &Identifier {
        &self.0.target
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        self.0.validate_target_kind(model, id, ShapeType::Resource)
    }
}

fn decode_optional<T>(
    value: &Value,
    field: &str,
    decode: impl FnOnce(&Value) -> Result<T>,
) -> Result<Option<T>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => decode(v)
            .map(Some)
            .map_err(|e| Error::decode(format!("field `{field}`"), e)),
    }
}

fn decode_members(
    value: &Value,
    field: &str,
    traits: &TraitRegistry,
) -> Result<BTreeMap<String, MemberShape>> {
    let mut members = BTreeMap::new();
    if let Some(fields) = value.get(field).filter(|v| !v.is_null()) {
        let fields = fields
            .as_object()
            .map_err(|e| Error::decode(format!("field `{field}`"), e))?;
        for (name, member) in fields.iter() {
            members.insert(name.to_string(), MemberShape::decode(member, traits)?);
        }
    }
    Ok(members)
}

fn validate_all<T>(
    items: &[T],
    model: &Model,
    id: &Identifier,
    field: &str,
    validate: impl Fn(&T, &Model, &Identifier) -> Result<()>,
) -> Result<()> {
    let id = id.with_member(field);
    items.iter().try_for_each(|item| validate(item, model, &id))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceShape {
    pub version: Option<String>,
    pub operations: Vec<OperationMemberShape>,
    pub resources: Vec<ResourceMemberShape>,
    pub errors: Vec<MemberShape>,
    pub traits: TraitList,
}

impl ServiceShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self {
            version: decode_string(value, "version")?,
            operations: decode_list(value, "operations", |v| {
                OperationMemberShape::decode(v, traits)
            })?,
            resources: decode_list(value, "resources", |v| ResourceMemberShape::decode(v, traits))?,
            errors: decode_list(value, "errors", |v| MemberShape::decode(v, traits))?,
            traits: decode_traits(value, traits)?,
        })
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        validate_all(&self.operations, model, id, "operations", |m, model, id| {
            m.validate(model, id)
        })?;
        validate_all(&self.resources, model, id, "resources", |m, model, id| {
            m.validate(model, id)
        })?;
        validate_all(&self.errors, model, id, "errors", |m, model, id| {
            m.validate_target_kind(model, id, ShapeType::Structure)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationShape {
    pub input: Option<MemberShape>,
    pub output: Option<MemberShape>,
    pub errors: Vec<MemberShape>,
    pub traits: TraitList,
}

impl OperationShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self {
            input: decode_optional(value, "input", |v| MemberShape::decode(v, traits))?,
            output: decode_optional(value, "output", |v| MemberShape::decode(v, traits))?,
            errors: decode_list(value, "errors", |v| MemberShape::decode(v, traits))?,
            traits: decode_traits(value, traits)?,
        })
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        if let Some(input) = &self.input {
            input.validate_target_kind(model, &id.with_member("input"), ShapeType::Structure)?;
        }
        if let Some(output) = &self.output {
            output.validate_target_kind(model, &id.with_member("output"), ShapeType::Structure)?;
        }
        validate_all(&self.errors, model, id, "errors", |m, model, id| {
            m.validate_target_kind(model, id, ShapeType::Structure)
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceShape {
    pub identifiers: BTreeMap<String, MemberShape>,
    pub properties: BTreeMap<String, MemberShape>,
    pub create: Option<OperationMemberShape>,
    pub put: Option<OperationMemberShape>,
    pub read: Option<OperationMemberShape>,
    pub update: Option<OperationMemberShape>,
    pub delete: Option<OperationMemberShape>,
    pub list: Option<OperationMemberShape>,
    pub operations: Vec<OperationMemberShape>,
    pub collection_operations: Vec<OperationMemberShape>,
    pub resources: Vec<ResourceMemberShape>,
    pub traits: TraitList,
}

impl ResourceShape {
    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        let lifecycle = |field: &str| {
            decode_optional(value, field, |v| OperationMemberShape::decode(v, traits))
        };
        Ok(Self {
            identifiers: decode_members(value, "identifiers", traits)?,
            properties: decode_members(value, "properties", traits)?,
            create: lifecycle("create")?,
            put: lifecycle("put")?,
            read: lifecycle("read")?,
            update: lifecycle("update")?,
            delete: lifecycle("delete")?,
            list: lifecycle("list")?,
            operations: decode_list(value, "operations", |v| {
                OperationMemberShape::decode(v, traits)
            })?,
            collection_operations: decode_list(value, "collectionOperations", |v| {
                OperationMemberShape::decode(v, traits)
            })?,
            resources: decode_list(value, "resources", |v| ResourceMemberShape::decode(v, traits))?,
            traits: decode_traits(value, traits)?,
        })
    }

    /// Lifecycle operations paired with their field names.
    pub fn lifecycle(&self) -> impl Iterator<Item = (&'static str, &OperationMemberShape)> {
        [
            ("create", &self.create),
            ("put", &self.put),
            ("read", &self.read),
            ("update", &self.update),
            ("delete", &self.delete),
            ("list", &self.list),
        ]
        .into_iter()
        .filter_map(|(name, op)| op.as_ref().map(|op| (name, op)))
    }

    pub fn validate(&self, model: &Model, id: &Identifier) -> Result<()> {
        for (name, member) in self.identifiers.iter().chain(self.properties.iter()) {
            member.validate(model, &id.with_member(name))?;
        }
        for (name, op) in self.lifecycle() {
            op.validate(model, &id.with_member(name))?;
        }
        validate_all(&self.operations, model, id, "operations", |m, model, id| {
            m.validate(model, id)
        })?;
        validate_all(
            &self.collection_operations,
            model,
            id,
            "collectionOperations",
            |m, model, id| m.validate(model, id),
        )?;
        validate_all(&self.resources, model, id, "resources", |m, model, id| {
            m.validate(model, id)
        })
    }
}
