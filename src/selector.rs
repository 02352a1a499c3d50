// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::model::Model;
use crate::prelude::PRELUDE_NAMESPACE;
use crate::shapes::{ShapeRef, ShapeType};
use crate::traits::StaticTrait;

use core::str::FromStr;

/// Predicate over a shape, evaluated in the context of a model.
///
/// Only a subset is reachable from text (see [`Selector::parse`]); `Or`,
/// `Not` and the target forms are built in code.
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `*`
    All,
    Type(ShapeType),
    /// Any numeric kind.
    Number,
    /// Numbers, blob, boolean, string, timestamp and document.
    SimpleType,
    /// List or set.
    Collection,
    /// Shapes carrying the named trait.
    Trait(String),
    And(Vec<Selector>),
    Or(Vec<Selector>),
    Not(Box<Selector>),
    /// Evaluated against the shape a member targets. Never matches non-members.
    Target(Box<Selector>),
    /// Matches the shape itself, or the shape it targets when it is a member.
    OrTarget(Box<Selector>),
}

impl Selector {
    pub fn and(selectors: Vec<Selector>) -> Self {
        Selector::And(selectors)
    }

    pub fn or(selectors: Vec<Selector>) -> Self {
        Selector::Or(selectors)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(selector: Selector) -> Self {
        Selector::Not(Box::new(selector))
    }

    pub fn target(selector: Selector) -> Self {
        Selector::Target(Box::new(selector))
    }

    pub fn or_target(selector: Selector) -> Self {
        Selector::OrTarget(Box::new(selector))
    }

    pub fn has_trait<T: StaticTrait>() -> Self {
        Selector::Trait(T::NAME.to_string())
    }

    pub fn matches(&self, model: &Model, shape: ShapeRef<'_>) -> bool {
        match self {
            Selector::All => true,
            Selector::Type(t) => shape.shape_type() == *t,
            Selector::Number => shape.shape_type().is_number(),
            Selector::SimpleType => shape.shape_type().is_simple(),
            Selector::Collection => shape.shape_type().is_collection(),
            Selector::Trait(name) => shape.traits().has(name),
            Selector::And(selectors) => selectors.iter().all(|s| s.matches(model, shape)),
            Selector::Or(selectors) => selectors.iter().any(|s| s.matches(model, shape)),
            Selector::Not(s) => !s.matches(model, shape),
            Selector::Target(s) => Self::matches_target(s, model, shape),
            Selector::OrTarget(s) => {
                s.matches(model, shape) || Self::matches_target(s, model, shape)
            }
        }
    }

    fn matches_target(selector: &Selector, model: &Model, shape: ShapeRef<'_>) -> bool {
        shape
            .target()
            .and_then(|target| model.shape(target))
            .is_some_and(|target| selector.matches(model, target))
    }

    /// Parse the textual query form.
    ///
    /// Whitespace separated tokens, all of which must match. A token is `*`,
    /// a shape type name, `number`, `simpleType`, `collection` or
    /// `[trait:name]`. Trait names without a namespace are looked up in the
    /// prelude.
    pub fn parse(text: &str) -> Result<Selector> {
        let mut selectors = text
            .split_whitespace()
            .map(Self::parse_token)
            .collect::<Result<Vec<_>>>()?;
        match selectors.len() {
            0 => Err(Error::UnrecognizedSelector(text.to_string())),
            1 => Ok(selectors.remove(0)),
            _ => Ok(Selector::And(selectors)),
        }
    }

    fn parse_token(token: &str) -> Result<Selector> {
        let selector = match token {
            "*" => Selector::All,
            "number" => Selector::Number,
            "simpleType" => Selector::SimpleType,
            "collection" => Selector::Collection,
            _ => {
                if let Some(name) = token
                    .strip_prefix("[trait:")
                    .and_then(|t| t.strip_suffix(']'))
                    .filter(|name| !name.is_empty())
                {
                    if name.contains('#') {
                        Selector::Trait(name.to_string())
                    } else {
                        Selector::Trait(format!("{PRELUDE_NAMESPACE}#{name}"))
                    }
                } else if let Some(t) = ShapeType::from_name(token) {
                    Selector::Type(t)
                } else {
                    return Err(Error::UnrecognizedSelector(token.to_string()));
                }
            }
        };
        Ok(selector)
    }
}

impl FromStr for Selector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Selector::parse(s)
    }
}
