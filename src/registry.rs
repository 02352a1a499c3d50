// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::{Error, Result};
use crate::shapes::Shape;
use crate::traits::Trait;
use crate::value::Value;
use crate::Rc;

use core::fmt;
use std::collections::BTreeMap;


/// Errors that can occur when interacting with a Registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    InvalidName { name: Rc<str>, registry: Rc<str> },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::InvalidName { name, registry } => {
                write!(f, "{registry} registration failed: The name '{name}' is invalid (empty or whitespace-only names are not allowed).")
            }
        }
    }
}

impl core::error::Error for RegistryError {}

/// Validates that a name is not empty or whitespace-only.
pub fn validate_name(name: &str, registry_name: &str) -> Result<(), RegistryError> {
    if name.trim().is_empty() {
        Err(RegistryError::InvalidName {
            name: Rc::from(name),
            registry: Rc::from(registry_name),
        })
    } else {
        Ok(())
    }
}

/// Named table of items, ordered by name.
///
/// Mutation needs `&mut self`. Once a registry is shared behind `&` it is
/// read-only, which is what makes concurrent decoding sound.
#[derive(Clone)]
pub struct Registry<T> {
    inner: BTreeMap<Rc<str>, T>,
    name: Rc<str>,
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field("items", &self.inner.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> Registry<T> {
    /// Create a new, empty registry with a given name.
    pub fn new(registry_name: &str) -> Self {
        Self {
            inner: BTreeMap::new(),
            name: Rc::from(registry_name),
        }
    }

    /// Get the name of this registry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an item with a given name. An existing item with the same
    /// name is replaced and returned.
    pub fn register(&mut self, name: &str, item: T) -> Result<Option<T>, RegistryError> {
        validate_name(name, &self.name)?;
        let previous = self.inner.insert(Rc::from(name), item);
        if previous.is_some() {
            log::debug!("{}: replaced `{name}`", self.name);
        }
        Ok(previous)
    }

    /// Register every item, in order. Later entries win.
    pub fn register_all<'a>(
        &mut self,
        items: impl IntoIterator<Item = (&'a str, T)>,
    ) -> Result<(), RegistryError> {
        for (name, item) in items {
            self.register(name, item)?;
        }
        Ok(())
    }

    /// Retrieve an item by name, if it exists.
    pub fn get(&self, name: &str) -> Option<&T> {
        self.inner.get(name)
    }

    /// List all registered item names.
    pub fn list_names(&self) -> Vec<Rc<str>> {
        self.inner.keys().cloned().collect()
    }

    /// Check if an item with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(name)
    }

    /// Get the number of registered items.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get an iterator over all (name, item) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.inner.iter().map(|(k, v)| (k.as_ref(), v))
    }
}

/// Builds a shape of one kind from its JSON AST entry.
pub type ShapeDecodeFn = fn(&Value, &TraitRegistry) -> Result<Shape>;

/// Builds a trait from its name and raw payload.
pub type TraitDecodeFn = fn(&str, &Value) -> Result<Trait>;

/// Shape kind name (`"structure"`, `"list"`, ...) to decoder.
pub type ShapeRegistry = Registry<ShapeDecodeFn>;

/// Fully-qualified trait name to decoder.
pub type TraitRegistry = Registry<TraitDecodeFn>;

impl Registry<ShapeDecodeFn> {
    /// Registry holding every built-in shape kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new("SHAPE_REGISTRY");
        for (name, decode) in crate::shapes::builtin_shape_kinds() {
            registry.inner.insert(Rc::from(name), decode);
        }
        registry
    }

    /// Decode `value` with the decoder registered for `kind`.
    pub fn decode(&self, kind: &str, value: &Value, traits: &TraitRegistry) -> Result<Shape> {
        match self.get(kind) {
            Some(decode) => decode(value, traits),
            None => Err(Error::UnrecognizedShapeType(kind.to_string())),
        }
    }
}

impl Registry<TraitDecodeFn> {
    /// Registry holding every prelude trait kind.
    pub fn builtin() -> Self {
        let mut registry = Self::new("TRAIT_REGISTRY");
        for (name, decode) in crate::traits::builtin_trait_kinds() {
            registry.inner.insert(Rc::from(name), decode);
        }
        registry
    }
}
