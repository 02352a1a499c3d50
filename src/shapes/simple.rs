// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::error::Result;
use crate::registry::TraitRegistry;
use crate::traits::TraitList;
use crate::value::Value;

/// Payload shared by all scalar shape kinds. The kind itself is the
/// [`crate::Shape`] variant wrapping it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleShape {
    pub traits: TraitList,
}

impl SimpleShape {
    pub fn new(traits: TraitList) -> Self {
        Self { traits }
    }

    pub fn decode(value: &Value, traits: &TraitRegistry) -> Result<Self> {
        Ok(Self {
            traits: super::decode_traits(value, traits)?,
        })
    }
}
