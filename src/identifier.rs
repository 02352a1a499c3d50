// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Address of a shape or member: `namespace#shapeName$member`.
///
/// Parsing never fails. A string without `#` has no namespace and a string
/// without `$` has no member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier {
    namespace: Option<String>,
    shape_name: String,
    member: Option<String>,
}

impl Identifier {
    pub fn new(namespace: Option<&str>, shape_name: &str, member: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            shape_name: shape_name.to_string(),
            member: member.map(str::to_string),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let (namespace, rest) = match raw.split_once('#') {
            Some((ns, rest)) => (Some(ns.to_string()), rest),
            None => (None, raw),
        };
        let (shape_name, member) = match rest.split_once('$') {
            Some((name, member)) => (name.to_string(), Some(member.to_string())),
            None => (rest.to_string(), None),
        };
        Self {
            namespace,
            shape_name,
            member,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn shape_name(&self) -> &str {
        &self.shape_name
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    /// The identifier with its member suffix removed.
    pub fn root(&self) -> Identifier {
        Self {
            namespace: self.namespace.clone(),
            shape_name: self.shape_name.clone(),
            member: None,
        }
    }

    pub fn with_member(&self, member: &str) -> Identifier {
        Self {
            namespace: self.namespace.clone(),
            shape_name: self.shape_name.clone(),
            member: Some(member.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}#")?;
        }
        f.write_str(&self.shape_name)?;
        if let Some(member) = &self.member {
            write!(f, "${member}")?;
        }
        Ok(())
    }
}

impl FromStr for Identifier {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for Identifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

struct IdentifierVisitor;

impl Visitor<'_> for IdentifierVisitor {
    type Value = Identifier;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a shape identifier string")
    }

    fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(Identifier::parse(s))
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D>(deserializer: D) -> Result<Identifier, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(IdentifierVisitor)
    }
}
