// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result, SyntaxError};
use crate::identifier::Identifier;
use crate::lexer::{tokenize, Source, TokenKind};
use crate::number::Number;
use crate::prelude::{is_prelude_shape, PRELUDE_NAMESPACE};
use crate::registry::TraitRegistry;
use crate::tokens::TokenStream;
use crate::traits::{DocumentationTrait, EnumValueTrait, StaticTrait};
use crate::value::Value;
use crate::Rc;

use core::str::FromStr;
use std::collections::BTreeMap;

type Map = BTreeMap<Rc<str>, Value>;

/// Recursive descent parser lowering IDL text to the JSON AST.
///
/// The result is a [`Value`] of the form
/// `{ "smithy": .., "metadata": {..}, "shapes": {..} }` which
/// [`crate::Model::decode`] turns into a typed model.
pub struct Parser<'r> {
    tokens: TokenStream,
    traits: &'r TraitRegistry,
    namespace: Option<String>,
    aliases: BTreeMap<String, String>,
    in_metadata: bool,
    in_trait: bool,
    version: Option<String>,
    metadata: Map,
    shapes: Map,
    pending: Map,
}

fn object(map: Map) -> Value {
    Value::from(map)
}

impl<'r> Parser<'r> {
    pub fn new(source: &Source, traits: &'r TraitRegistry) -> Result<Self> {
        let tokens = tokenize(source)?;
        Ok(Self {
            tokens: TokenStream::new(source, tokens),
            traits,
            namespace: None,
            aliases: BTreeMap::new(),
            in_metadata: false,
            in_trait: false,
            version: None,
            metadata: Map::new(),
            shapes: Map::new(),
            pending: Map::new(),
        })
    }

    /// Parse the whole document.
    ///
    /// Errors raised without a position are reported at the token that
    /// was just consumed.
    pub fn parse(mut self) -> Result<Value> {
        match self.parse_document() {
            Err(Error::Syntax {
                error,
                position: None,
            }) => {
                self.tokens.back();
                Err(self.tokens.error(error))
            }
            r => r,
        }
    }

    fn parse_document(&mut self) -> Result<Value> {
        self.tokens.skip_newlines();
        self.parse_control_section()?;
        self.parse_metadata_section()?;
        self.parse_shapes_section()?;

        log::debug!(
            "parsed {} shapes in namespace {:?}",
            self.shapes.len(),
            self.namespace
        );

        let mut ast = Map::new();
        if let Some(version) = self.version.take() {
            ast.insert("smithy".into(), Value::from(version));
        }
        ast.insert(
            "metadata".into(),
            object(core::mem::take(&mut self.metadata)),
        );
        ast.insert("shapes".into(), object(core::mem::take(&mut self.shapes)));
        Ok(object(ast))
    }

    fn is_word(&self, word: &str) -> bool {
        matches!(self.tokens.peek(), Some(TokenKind::Word(w)) if w == word)
    }

    /// A statement ends at a newline or at the end of input.
    fn end_statement(&mut self) -> Result<()> {
        match self.tokens.peek() {
            None => Ok(()),
            Some(TokenKind::Newline) => {
                self.tokens.advance();
                Ok(())
            }
            Some(_) => Err(self.tokens.unexpected("a newline")),
        }
    }

    fn parse_control_section(&mut self) -> Result<()> {
        while self.is_word("$version") {
            self.tokens.advance();
            self.tokens.expect_grammar(':')?;
            self.version = Some(self.tokens.expect_string()?);
            self.end_statement()?;
            self.tokens.skip_newlines();
        }
        Ok(())
    }

    fn parse_metadata_section(&mut self) -> Result<()> {
        while self.is_word("metadata") {
            self.parse_metadata()?;
            self.tokens.skip_newlines();
        }
        Ok(())
    }

    /// `metadata <key> = <value>`. Only literals are allowed in the value.
    fn parse_metadata(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            return Err(self.tokens.error(SyntaxError::UnattachedTraits));
        }
        self.tokens.advance();
        let key = self.tokens.expect_key()?;
        self.tokens.expect_grammar('=')?;
        self.in_metadata = true;
        let value = self.parse_value();
        self.in_metadata = false;
        self.metadata.insert(key.into(), value?);
        self.end_statement()
    }

    fn parse_shapes_section(&mut self) -> Result<()> {
        loop {
            let word = match self.tokens.peek() {
                None => break,
                Some(TokenKind::Newline) => {
                    if !self.pending.is_empty() {
                        return Err(self.tokens.error(SyntaxError::UnattachedTraits));
                    }
                    self.tokens.advance();
                    continue;
                }
                Some(TokenKind::Documentation(text)) => {
                    let text = text.clone();
                    self.tokens.advance();
                    Self::add_documentation(&mut self.pending, &text);
                    self.skip_one_newline();
                    continue;
                }
                Some(TokenKind::Word(w)) => w.clone(),
                Some(_) => return Err(self.tokens.unexpected("a shape declaration")),
            };

            match word.as_str() {
                "namespace" => self.parse_namespace()?,
                "metadata" => self.parse_metadata()?,
                "use" => self.parse_use()?,
                "apply" => self.parse_apply()?,
                w if w.starts_with('@') => {
                    let (name, value) = self.parse_trait()?;
                    self.pending.insert(name.into(), value);
                    self.skip_one_newline();
                }
                _ => self.parse_shape()?,
            }
        }

        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(self.tokens.error(SyntaxError::UnattachedTraits))
        }
    }

    fn skip_one_newline(&mut self) {
        if self.tokens.peek() == Some(&TokenKind::Newline) {
            self.tokens.advance();
        }
    }

    /// Consecutive documentation comments form one paragraph.
    fn add_documentation(traits: &mut Map, text: &str) {
        let text = match traits.get(DocumentationTrait::NAME) {
            Some(Value::String(existing)) => format!("{existing}\n{text}"),
            _ => text.to_string(),
        };
        traits.insert(DocumentationTrait::NAME.into(), Value::from(text));
    }

    /// `namespace` and `use` come before any shape and cannot carry traits.
    fn check_declaration(&self, keyword: &'static str) -> Result<()> {
        if !self.pending.is_empty() {
            return Err(self.tokens.error(SyntaxError::UnattachedTraits));
        }
        if !self.shapes.is_empty() {
            return Err(self
                .tokens
                .error(SyntaxError::DeclarationAfterShapes(keyword)));
        }
        Ok(())
    }

    fn parse_namespace(&mut self) -> Result<()> {
        self.check_declaration("namespace")?;
        if self.namespace.is_some() {
            return Err(self.tokens.error(SyntaxError::DuplicateNamespace));
        }
        self.tokens.advance();
        self.namespace = Some(self.tokens.expect_word()?);
        self.end_statement()
    }

    fn parse_use(&mut self) -> Result<()> {
        self.check_declaration("use")?;
        self.tokens.advance();
        let target = self.tokens.expect_word()?;
        let id = Identifier::parse(&target);
        self.aliases
            .insert(id.shape_name().to_string(), id.root().to_string());
        self.end_statement()
    }

    fn parse_apply(&mut self) -> Result<()> {
        if !self.pending.is_empty() {
            return Err(self.tokens.error(SyntaxError::UnattachedTraits));
        }
        self.tokens.advance();
        let target = self.tokens.expect_word()?;
        let id = Identifier::parse(&self.fully_qualify(&target, false));
        let root = id.root().to_string();
        if !self.shapes.contains_key(root.as_str()) {
            return Err(Error::syntax(SyntaxError::ApplyToUndeclaredShape(
                id.to_string(),
            )));
        }

        let mut applied = Map::new();
        match self.tokens.peek() {
            Some(TokenKind::Word(w)) if w.starts_with('@') => {
                let (name, value) = self.parse_trait()?;
                applied.insert(name.into(), value);
            }
            _ => return Err(self.tokens.unexpected("a trait")),
        }

        let entry = self.shapes.get_mut(root.as_str()).and_then(|shape| match id.member() {
            None => Some(shape),
            Some(member) => shape
                .as_object_mut()
                .ok()?
                .get_mut("members")?
                .as_object_mut()
                .ok()?
                .get_mut(member),
        });
        match entry {
            Some(entry) => Self::attach_traits(entry, applied)?,
            None => {
                return Err(Error::syntax(SyntaxError::ApplyToUndeclaredShape(
                    id.to_string(),
                )))
            }
        }
        self.end_statement()
    }

    /// Merge `traits` into the `traits` field of a shape or member entry.
    fn attach_traits(entry: &mut Value, traits: Map) -> Result<()> {
        if traits.is_empty() {
            return Ok(());
        }
        let fields = entry
            .as_object_mut()
            .map_err(|_| Error::syntax(SyntaxError::UnattachedTraits))?;
        let existing = fields
            .entry("traits".into())
            .or_insert_with(Value::new_object);
        let existing = existing
            .as_object_mut()
            .map_err(|_| Error::syntax(SyntaxError::UnattachedTraits))?;
        existing.extend(traits);
        Ok(())
    }

    /// `@name` optionally followed by `(value)` or `(key: value, ..)`.
    fn parse_trait(&mut self) -> Result<(String, Value)> {
        let word = self.tokens.expect_word()?;
        let name = self.fully_qualify(word.trim_start_matches('@'), true);
        if !self.tokens.is_grammar('(') {
            return Ok((name, Value::new_object()));
        }
        self.tokens.advance();
        self.tokens.skip_newlines();

        self.in_trait = true;
        let value = self.parse_trait_body();
        self.in_trait = false;
        Ok((name, value?))
    }

    fn parse_trait_body(&mut self) -> Result<Value> {
        let is_pairs = matches!(
            (self.tokens.peek(), self.tokens.peek_ahead(1)),
            (
                Some(TokenKind::Word(_) | TokenKind::String(_)),
                Some(TokenKind::Grammar(':'))
            )
        );
        if is_pairs || self.tokens.is_grammar(')') {
            return Ok(object(self.parse_entries(')')?));
        }
        let value = self.parse_value()?;
        self.tokens.skip_newlines();
        self.tokens.expect_grammar(')')?;
        Ok(value)
    }

    /// Documentation comments and trait applications preceding a member.
    fn parse_member_traits(&mut self) -> Result<Map> {
        let mut traits = Map::new();
        loop {
            match self.tokens.peek() {
                Some(TokenKind::Newline) => {
                    self.tokens.advance();
                }
                Some(TokenKind::Documentation(text)) => {
                    let text = text.clone();
                    self.tokens.advance();
                    Self::add_documentation(&mut traits, &text);
                }
                Some(TokenKind::Word(w)) if w.starts_with('@') => {
                    let (name, value) = self.parse_trait()?;
                    traits.insert(name.into(), value);
                }
                _ => return Ok(traits),
            }
        }
    }

    fn parse_shape(&mut self) -> Result<()> {
        let kind = self.tokens.expect_word()?;
        let name = self.tokens.expect_word()?;
        let id = match &self.namespace {
            Some(ns) => format!("{ns}#{name}"),
            None => name,
        };
        if self.shapes.contains_key(id.as_str()) {
            return Err(Error::syntax(SyntaxError::DuplicateShape(id)));
        }

        let mut shape = Map::new();
        shape.insert("type".into(), Value::from(kind.as_str()));
        let traits = core::mem::take(&mut self.pending);
        if !traits.is_empty() {
            shape.insert("traits".into(), object(traits));
        }

        if !matches!(self.tokens.peek(), None | Some(TokenKind::Newline)) {
            self.tokens.expect_grammar('{')?;
            match kind.as_str() {
                "enum" | "intEnum" => {
                    let members = self.parse_enum_members()?;
                    shape.insert("members".into(), object(members));
                }
                "structure" | "union" => {
                    let members = self.parse_members()?;
                    shape.insert("members".into(), object(members));
                }
                _ => shape.extend(self.parse_members()?),
            }
        }

        log::trace!("parsed {kind} `{id}`");
        self.shapes.insert(id.into(), object(shape));
        self.end_statement()
    }

    /// `name: value` pairs up to and including the closing `}`.
    fn parse_members(&mut self) -> Result<Map> {
        let mut members = Map::new();
        loop {
            let traits = self.parse_member_traits()?;
            if self.tokens.is_grammar('}') {
                if !traits.is_empty() {
                    return Err(self.tokens.error(SyntaxError::UnattachedTraits));
                }
                self.tokens.advance();
                return Ok(members);
            }
            let name = self.tokens.expect_key()?;
            self.tokens.expect_grammar(':')?;
            let mut value = self.parse_value()?;
            Self::attach_traits(&mut value, traits)?;
            members.insert(name.into(), value);
            self.tokens.expect_separator('}')?;
        }
    }

    /// Bare value names, each optionally followed by `= value`.
    fn parse_enum_members(&mut self) -> Result<Map> {
        let mut members = Map::new();
        loop {
            let mut traits = self.parse_member_traits()?;
            if self.tokens.is_grammar('}') {
                if !traits.is_empty() {
                    return Err(self.tokens.error(SyntaxError::UnattachedTraits));
                }
                self.tokens.advance();
                return Ok(members);
            }
            let name = self.tokens.expect_word()?;
            if self.tokens.is_grammar('=') {
                self.tokens.advance();
                self.in_trait = true;
                let value = self.parse_value();
                self.in_trait = false;
                traits.insert(EnumValueTrait::NAME.into(), value?);
            }

            let mut member = Map::new();
            member.insert(
                "target".into(),
                Value::from(format!("{PRELUDE_NAMESPACE}#Unit")),
            );
            if !traits.is_empty() {
                member.insert("traits".into(), object(traits));
            }
            members.insert(name.into(), object(member));
            self.tokens.expect_separator('}')?;
        }
    }

    /// `key: value` pairs up to and including `close`. Keys are words or strings.
    fn parse_entries(&mut self, close: char) -> Result<Map> {
        let mut entries = Map::new();
        loop {
            self.tokens.skip_newlines();
            if self.tokens.is_grammar(close) {
                self.tokens.advance();
                return Ok(entries);
            }
            let key = self.tokens.expect_key()?;
            self.tokens.expect_grammar(':')?;
            self.tokens.skip_newlines();
            let value = self.parse_value()?;
            entries.insert(key.into(), value);
            self.tokens.skip_newlines();
            if self.tokens.is_grammar(',') {
                self.tokens.advance();
            }
        }
    }

    fn parse_array(&mut self) -> Result<Value> {
        let mut items = vec![];
        loop {
            self.tokens.skip_newlines();
            if self.tokens.is_grammar(']') {
                self.tokens.advance();
                return Ok(Value::from(items));
            }
            items.push(self.parse_value()?);
            self.tokens.skip_newlines();
            if self.tokens.is_grammar(',') {
                self.tokens.advance();
            }
        }
    }

    /// Parse a literal, object, array or shape reference.
    ///
    /// A bare word is a shape reference. Inside a trait value it becomes the
    /// fully-qualified id as a string; inside a member it becomes
    /// `{ "target": id }`; inside metadata it is rejected.
    pub fn parse_value(&mut self) -> Result<Value> {
        let Some(token) = self.tokens.advance() else {
            return Err(self.tokens.unexpected("a value"));
        };
        match token {
            TokenKind::String(s) => Ok(Value::from(s)),
            TokenKind::Number(n) => match Number::from_str(&n) {
                Ok(n) => Ok(Value::from(n)),
                Err(_) => Err(Error::syntax(SyntaxError::UnexpectedToken {
                    found: n,
                    expected: "a number".to_string(),
                })),
            },
            TokenKind::Grammar('{') => Ok(object(self.parse_entries('}')?)),
            TokenKind::Grammar('[') => self.parse_array(),
            TokenKind::Word(w) => match w.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" => Ok(Value::Null),
                _ if self.in_metadata => {
                    Err(Error::syntax(SyntaxError::IdentifierInMetadata(w)))
                }
                _ if self.in_trait => Ok(Value::from(self.fully_qualify(&w, false))),
                _ => {
                    let mut target = Map::new();
                    target.insert("target".into(), Value::from(self.fully_qualify(&w, false)));
                    Ok(object(target))
                }
            },
            _ => {
                self.tokens.back();
                Err(self.tokens.unexpected("a value"))
            }
        }
    }

    /// Resolve a name against, in order, the prelude (or for traits, the
    /// registered prelude traits), `use` aliases and the current namespace.
    /// Names that already carry a namespace are returned unchanged.
    pub fn fully_qualify(&self, name: &str, is_trait: bool) -> String {
        let id = Identifier::parse(name);
        if id.namespace().is_some() {
            return name.to_string();
        }
        let shape = id.shape_name();
        let prelude = format!("{PRELUDE_NAMESPACE}#{shape}");
        let in_prelude = if is_trait {
            self.traits.contains(&prelude)
        } else {
            is_prelude_shape(shape)
        };

        let root = if in_prelude {
            Some(prelude)
        } else if let Some(alias) = self.aliases.get(shape) {
            Some(alias.clone())
        } else {
            self.namespace.as_ref().map(|ns| format!("{ns}#{shape}"))
        };
        match (root, id.member()) {
            (Some(root), Some(member)) => format!("{root}${member}"),
            (Some(root), None) => root,
            (None, _) => name.to_string(),
        }
    }
}
