// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::Result;
use crate::lexer::Source;
use crate::model::Model;
use crate::parser::Parser;
use crate::registry::{ShapeDecodeFn, ShapeRegistry, TraitDecodeFn, TraitRegistry};
use crate::value::Value;

/// Entry point for loading models.
///
/// Holds the shape and trait kind registries. Register extra kinds first;
/// every parse and decode call only needs `&self`, so a configured
/// instance can be shared freely.
///
/// ```no_run
/// # fn main() -> smithy_model::Result<()> {
/// let smithy = smithy_model::Smithy::new();
/// let model = smithy.parse("namespace example\nstring Name")?;
/// model.validate()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Smithy {
    shapes: ShapeRegistry,
    traits: TraitRegistry,
}

impl Default for Smithy {
    fn default() -> Self {
        Self::new()
    }
}

impl Smithy {
    /// Configuration knowing every built-in shape kind and prelude trait.
    pub fn new() -> Self {
        Self {
            shapes: ShapeRegistry::builtin(),
            traits: TraitRegistry::builtin(),
        }
    }

    /// Add or replace shape kinds. Later entries win.
    pub fn register_shape_kinds<'a>(
        &mut self,
        kinds: impl IntoIterator<Item = (&'a str, ShapeDecodeFn)>,
    ) -> Result<()> {
        self.shapes.register_all(kinds)?;
        Ok(())
    }

    /// Add or replace trait kinds, keyed by fully-qualified trait name.
    pub fn register_trait_kinds<'a>(
        &mut self,
        kinds: impl IntoIterator<Item = (&'a str, TraitDecodeFn)>,
    ) -> Result<()> {
        self.traits.register_all(kinds)?;
        Ok(())
    }

    pub fn shape_registry(&self) -> &ShapeRegistry {
        &self.shapes
    }

    pub fn trait_registry(&self) -> &TraitRegistry {
        &self.traits
    }

    /// Parse IDL text.
    pub fn parse(&self, idl: &str) -> Result<Model> {
        self.parse_source(&Source::from_contents("<idl>", idl)?)
    }

    pub fn parse_source(&self, source: &Source) -> Result<Model> {
        let ast = Parser::new(source, &self.traits)?.parse()?;
        self.decode_value(&ast)
    }

    /// Decode a JSON AST document.
    pub fn decode_ast(&self, json: &str) -> Result<Model> {
        let ast = Value::from_json_str(json)
            .map_err(|e| crate::Error::decode("JSON AST", e))?;
        self.decode_value(&ast)
    }

    pub fn decode_value(&self, ast: &Value) -> Result<Model> {
        Model::decode(ast, &self.shapes, &self.traits)
    }
}
