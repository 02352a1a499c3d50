// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Trait kinds defined in the `smithy.api` prelude.

use crate::value::Value;

use core::fmt;

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

/// Annotation traits carry no payload. Whatever value was written for them
/// (usually `{}`) is accepted and dropped.
macro_rules! marker_trait {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>,
                {
                    IgnoredAny::deserialize(deserializer)?;
                    Ok($name)
                }
            }
        )*
    };
}

marker_trait! {
    /// The member must be present.
    RequiredTrait,
    SensitiveTrait,
    ReadonlyTrait,
    IdempotentTrait,
    InputTrait,
    OutputTrait,
    /// Marks `smithy.api#Unit`.
    UnitTypeTrait,
    PrivateTrait,
    UniqueItemsTrait,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DocumentationTrait(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeprecatedTrait {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub since: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatternTrait(pub String);

impl PatternTrait {
    #[cfg(feature = "regex")]
    pub(crate) fn check(&self) -> Result<(), String> {
        regex::Regex::new(&self.0)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    #[cfg(not(feature = "regex"))]
    pub(crate) fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LengthTrait {
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

impl LengthTrait {
    pub(crate) fn check(&self) -> Result<(), String> {
        match (self.min, self.max) {
            (Some(min), _) if min < 0 => Err(format!("min {min} is negative")),
            (Some(min), Some(max)) if min > max => {
                Err(format!("min {min} is greater than max {max}"))
            }
            _ => Ok(()),
        }
    }

    /// Whether a size falls inside the bounds.
    pub fn contains(&self, len: usize) -> bool {
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        self.min.map_or(true, |min| len >= min) && self.max.map_or(true, |max| len <= max)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RangeTrait {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl RangeTrait {
    pub(crate) fn check(&self) -> Result<(), String> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => {
                Err(format!("min {min} is greater than max {max}"))
            }
            _ => Ok(()),
        }
    }

    pub fn contains(&self, n: f64) -> bool {
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
    }
}

/// Value of an `enum` or `intEnum` member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnumValueTrait(pub Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Client,
    Server,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Client => f.write_str("client"),
            ErrorKind::Server => f.write_str("server"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ErrorTrait(pub ErrorKind);

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefaultTrait(pub Value);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TagsTrait(pub Vec<String>);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleTrait(pub String);

/// `@trait`: turns the shape it is applied to into a trait definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitDefinitionTrait {
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub conflicts: Vec<String>,
    #[serde(default)]
    pub structurally_exclusive: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimestampFormatTrait(pub String);

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedTrait {
    #[serde(default)]
    pub input_token: Option<String>,
    #[serde(default)]
    pub output_token: Option<String>,
    #[serde(default)]
    pub items: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}
