// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::identifier::Identifier;
use crate::registry::RegistryError;
use crate::shapes::ShapeType;

use core::fmt;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Failures raised while turning characters into tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexicalError {
    #[error("unrecognized character `{0}`")]
    UnrecognizedCharacter(char),
    #[error("unrecognized escape character `{0}`")]
    UnrecognizedEscape(char),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("corrupt block text delimiter")]
    CorruptBlockText,
}

/// Failures raised while consuming the token stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyntaxError {
    #[error("unexpected token `{found}`, expecting {expected}")]
    UnexpectedToken { found: String, expected: String },
    #[error("unexpected end of input, expecting {0}")]
    UnexpectedEnd(String),
    #[error("traits not attached to a shape")]
    UnattachedTraits,
    #[error("namespace has already been declared")]
    DuplicateNamespace,
    #[error("`{0}` must appear before any shape declaration")]
    DeclarationAfterShapes(&'static str),
    #[error("cannot apply traits to `{0}`, shape has not been declared")]
    ApplyToUndeclaredShape(String),
    #[error("shape `{0}` has already been declared")]
    DuplicateShape(String),
    #[error("identifier `{0}` is not allowed in a metadata value")]
    IdentifierInMetadata(String),
}

/// Location of a syntax error, rendered with the offending source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub col: u32,
    pub context: String,
}

/// Failures raised by [`crate::Model::validate`] and the structural value check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("member `{member}` targets `{target}` which does not exist")]
    TargetNotFound {
        member: Identifier,
        target: Identifier,
    },
    #[error("member `{member}` cannot target `{target}`, a {shape_type} shape")]
    IllegalTarget {
        member: Identifier,
        target: Identifier,
        shape_type: ShapeType,
    },
    #[error("`{member}` must target a {expected} shape but `{target}` is a {actual}")]
    UnexpectedTargetKind {
        member: Identifier,
        target: Identifier,
        expected: ShapeType,
        actual: ShapeType,
    },
    #[error("trait `{trait_name}` cannot be applied to `{shape}`, a {shape_type} shape")]
    TraitNotAllowed {
        trait_name: String,
        shape: Identifier,
        shape_type: ShapeType,
    },
    #[error("trait `{trait_name}` on `{shape}` is invalid: {reason}")]
    InvalidTraitValue {
        trait_name: String,
        shape: Identifier,
        reason: String,
    },
    #[error("value at `{path}` does not match shape `{shape}`: expected {expected}, got {actual}")]
    ValueMismatch {
        path: String,
        shape: Identifier,
        expected: String,
        actual: String,
    },
    #[error("value at `{path}` is missing required member `{member}`")]
    MissingRequiredMember { path: String, member: String },
    #[error("value at `{path}` has unknown member `{member}`")]
    UnknownMember { path: String, member: String },
    #[error("value at `{path}` violates `{trait_name}`: {reason}")]
    ConstraintViolated {
        path: String,
        trait_name: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("{context}")]
    Lexical {
        error: LexicalError,
        line: u32,
        col: u32,
        context: String,
    },
    #[error("{}", display_syntax(.error, .position))]
    Syntax {
        error: SyntaxError,
        position: Option<Position>,
    },
    #[error("unrecognized shape type `{0}`")]
    UnrecognizedShapeType(String),
    #[error("failed to decode {context}: {message}")]
    Decode { context: String, message: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("shape `{0}` does not exist")]
    ShapeNotFound(Identifier),
    #[error("member `{member}` does not exist in `{shape}`")]
    MemberNotFound { shape: Identifier, member: String },
    #[error("unrecognized selector `{0}`")]
    UnrecognizedSelector(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn display_syntax(error: &SyntaxError, position: &Option<Position>) -> String {
    match position {
        Some(p) => p.context.clone(),
        None => error.to_string(),
    }
}

impl Error {
    pub(crate) fn syntax(error: SyntaxError) -> Self {
        Error::Syntax {
            error,
            position: None,
        }
    }

    pub(crate) fn decode(context: impl fmt::Display, message: impl fmt::Display) -> Self {
        Error::Decode {
            context: context.to_string(),
            message: message.to_string(),
        }
    }
}
