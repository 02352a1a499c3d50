// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Parser, typed model and selector engine for the Smithy interface
//! definition language.
//!
//! A [`Smithy`] instance carries the shape and trait kind registries. It
//! turns IDL text or a JSON AST document into a [`Model`], which can then be
//! validated, mutated and queried with selectors.

#[cfg(feature = "arc")]
use std::sync::Arc as Rc;

#[cfg(not(feature = "arc"))]
use std::rc::Rc;

mod error;
mod identifier;
mod lexer;
mod model;
mod number;
mod parser;
mod prelude;
mod registry;
mod selector;
mod shapes;
mod smithy;
mod tokens;
mod traits;
mod value;

pub use error::{Error, LexicalError, Position, Result, SyntaxError, ValidationError};
pub use identifier::Identifier;
pub use model::Model;
pub use number::Number;
pub use prelude::PRELUDE_NAMESPACE;
pub use registry::{
    Registry, RegistryError, ShapeDecodeFn, ShapeRegistry, TraitDecodeFn, TraitRegistry,
};
pub use selector::Selector;
pub use shapes::*;
pub use smithy::Smithy;
pub use traits::*;
pub use value::Value;

/// Items in `unstable` are likely to change.
pub mod unstable {
    pub use crate::lexer::*;
    pub use crate::parser::*;
    pub use crate::tokens::*;
}
