// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod validate;

use crate::error::{Error, Result};
use crate::identifier::Identifier;
use crate::prelude::prelude_shapes;
use crate::registry::{ShapeRegistry, TraitRegistry};
use crate::selector::Selector;
use crate::shapes::{decode_string, decode_traits, Shape, ShapeRef};
use crate::traits::{StaticTrait, Trait};
use crate::value::Value;

use std::collections::BTreeMap;

/// Model version assumed when a document does not declare one.
pub const DEFAULT_VERSION: &str = "1.0";

/// A decoded set of shapes plus document metadata.
///
/// Every model starts with the `smithy.api` prelude shapes. Shapes decoded
/// afterwards replace prelude entries with the same identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    version: String,
    metadata: BTreeMap<String, Value>,
    shapes: BTreeMap<Identifier, Shape>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// A model holding only the prelude.
    pub fn new() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            metadata: BTreeMap::new(),
            shapes: prelude_shapes().into_iter().collect(),
        }
    }

    /// Decode a JSON AST document.
    ///
    /// Entries of type `apply` are merged into shapes decoded from the same
    /// document, after every other entry has been decoded.
    pub fn decode(ast: &Value, shapes: &ShapeRegistry, traits: &TraitRegistry) -> Result<Self> {
        let mut model = Model::new();
        if let Some(version) = decode_string(ast, "smithy")? {
            model.version = version;
        }

        if let Some(metadata) = ast.get("metadata").filter(|m| !m.is_null()) {
            let metadata = metadata
                .as_object()
                .map_err(|e| Error::decode("field `metadata`", e))?;
            for (key, value) in metadata.iter() {
                model.metadata.insert(key.to_string(), value.clone());
            }
        }

        let mut applies = vec![];
        if let Some(entries) = ast.get("shapes").filter(|s| !s.is_null()) {
            let entries = entries
                .as_object()
                .map_err(|e| Error::decode("field `shapes`", e))?;
            for (name, entry) in entries.iter() {
                let id = Identifier::parse(name);
                let kind = decode_string(entry, "type")?
                    .ok_or_else(|| Error::decode(format!("shape `{id}`"), "missing `type`"))?;
                if kind == "apply" {
                    applies.push((id, entry));
                    continue;
                }
                let shape = shapes
                    .decode(&kind, entry, traits)
                    .map_err(|e| in_shape(&id, e))?;
                if model.insert_shape(id.clone(), shape).is_some() {
                    log::trace!("`{id}` replaces a prelude shape");
                }
            }
        }

        for (id, entry) in applies {
            let applied = decode_traits(entry, traits).map_err(|e| in_shape(&id, e))?;
            log::trace!("applying {} traits to `{id}`", applied.len());
            for t in applied {
                model.add_trait(t, &id)?;
            }
        }

        log::debug!(
            "decoded model version {} with {} shapes",
            model.version,
            model.shapes.len()
        );
        Ok(model)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// Top level shapes, prelude included, ordered by identifier.
    pub fn shapes(&self) -> impl Iterator<Item = (&Identifier, &Shape)> {
        self.shapes.iter()
    }

    /// Look up a shape, or a member when `id` has a member part. Members are
    /// only found on structure, union and enum shapes.
    pub fn shape(&self, id: &Identifier) -> Option<ShapeRef<'_>> {
        match id.member() {
            None => self.shapes.get(id).map(ShapeRef::Shape),
            Some(member) => self
                .shapes
                .get(&id.root())?
                .member(member)
                .map(ShapeRef::Member),
        }
    }

    /// Insert or replace a top level shape.
    pub fn insert_shape(&mut self, id: Identifier, shape: Shape) -> Option<Shape> {
        self.shapes.insert(id, shape)
    }

    /// Validate every shape. Stops at the first failure.
    pub fn validate(&self) -> Result<()> {
        log::debug!("validating {} shapes", self.shapes.len());
        for (id, shape) in &self.shapes {
            shape.validate(self, id)?;
        }
        Ok(())
    }

    fn root_mut(&mut self, id: &Identifier) -> Result<&mut Shape> {
        let root = id.root();
        match self.shapes.get_mut(&root) {
            Some(shape) => Ok(shape),
            None => Err(Error::ShapeNotFound(root)),
        }
    }

    /// Attach a trait to a shape or member, replacing one with the same name.
    pub fn add_trait(&mut self, t: impl Into<Trait>, to: &Identifier) -> Result<()> {
        let t = t.into();
        let shape = self.root_mut(to)?;
        if to.member().is_some() {
            shape.add_trait_to_member(to, t)
        } else {
            shape.traits_mut().add(t);
            Ok(())
        }
    }

    pub fn remove_trait<T: StaticTrait>(&mut self, from: &Identifier) -> Result<()> {
        self.remove_trait_by_name(T::NAME, from)
    }

    pub fn remove_trait_by_name(&mut self, name: &str, from: &Identifier) -> Result<()> {
        let shape = self.root_mut(from)?;
        if from.member().is_some() {
            shape.remove_trait_from_member(from, name)
        } else {
            shape.traits_mut().remove_by_name(name);
            Ok(())
        }
    }

    /// Identifiers of shapes matching a textual selector.
    pub fn select(&self, selector: &str) -> Result<Vec<Identifier>> {
        Ok(self.select_with(&Selector::parse(selector)?))
    }

    /// Identifiers of shapes and structure members matching `selector`.
    pub fn select_with(&self, selector: &Selector) -> Vec<Identifier> {
        let mut matches = vec![];
        for (id, shape) in &self.shapes {
            if selector.matches(self, ShapeRef::Shape(shape)) {
                matches.push(id.clone());
            }
            if let Some(s) = shape.as_structure() {
                for (name, member) in &s.members {
                    if selector.matches(self, ShapeRef::Member(member)) {
                        matches.push(id.with_member(name));
                    }
                }
            }
        }
        log::trace!("selector {selector:?} matched {} shapes", matches.len());
        matches
    }

    /// Check that `value` conforms to the shape `id`.
    pub fn validate_value(&self, value: &Value, id: &Identifier) -> Result<()> {
        validate::ValueValidator::new(self).validate(value, id)
    }
}

fn in_shape(id: &Identifier, error: Error) -> Error {
    match error {
        Error::Decode { context, message } => Error::Decode {
            context: format!("shape `{id}`, {context}"),
            message,
        },
        e => e,
    }
}
