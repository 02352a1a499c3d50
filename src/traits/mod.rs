// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

mod builtin;

pub use builtin::*;

use crate::error::{Error, Result, ValidationError};
use crate::identifier::Identifier;
use crate::model::Model;
use crate::registry::{TraitDecodeFn, TraitRegistry};
use crate::selector::Selector;
use crate::shapes::{ShapeRef, ShapeType};
use crate::value::Value;

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;

/// A trait kind known at compile time.
///
/// Implemented for every prelude trait. `NAME` is the fully-qualified
/// trait identifier used as the key in a [`TraitList`].
pub trait StaticTrait: Sized {
    const NAME: &'static str;

    /// Shapes this trait may be applied to.
    fn selector() -> Selector;

    fn from_trait(t: &Trait) -> Option<&Self>;

    fn into_trait(self) -> Trait;
}

/// Decode a raw payload into a typed prelude trait.
pub fn decode_trait<T>(name: &str, value: &Value) -> Result<Trait>
where
    T: StaticTrait + DeserializeOwned,
{
    value
        .to_typed::<T>()
        .map(StaticTrait::into_trait)
        .map_err(|e| Error::decode(format!("trait `{name}`"), e))
}

/// A trait the registry has no decoder for. The payload is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTrait {
    pub name: String,
    pub value: Value,
}

impl CustomTrait {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// The `@trait` definition of this trait, when the model declares one.
    fn definition<'m>(&self, model: &'m Model) -> Option<&'m TraitDefinitionTrait> {
        model
            .shape(&Identifier::parse(&self.name))?
            .traits()
            .get::<TraitDefinitionTrait>()
    }

    fn selector(&self, model: &Model) -> Selector {
        let Some(text) = self.definition(model).and_then(|d| d.selector.as_deref()) else {
            return Selector::All;
        };
        match Selector::parse(text) {
            Ok(selector) => selector,
            Err(e) => {
                log::debug!("ignoring selector of trait `{}`: {e}", self.name);
                Selector::All
            }
        }
    }

    fn check(&self, model: &Model) -> core::result::Result<(), String> {
        if self.definition(model).is_none() {
            return Ok(());
        }
        model
            .validate_value(&self.value, &Identifier::parse(&self.name))
            .map_err(|e| e.to_string())
    }
}

/// A trait contributed by a collaborator crate through
/// [`crate::Smithy::register_trait_kinds`]. It carries its own selector.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionTrait {
    pub name: String,
    pub value: Value,
    pub selector: Selector,
}

impl ExtensionTrait {
    pub fn new(name: impl Into<String>, value: Value, selector: Selector) -> Self {
        Self {
            name: name.into(),
            value,
            selector,
        }
    }

    /// Typed view of the payload.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        self.value
            .to_typed()
            .map_err(|e| Error::decode(format!("trait `{}`", self.name), e))
    }
}

macro_rules! builtin_traits {
    ($($variant:ident($ty:ident) => $name:literal, $selector:expr;)*) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Trait {
            $($variant($ty),)*
            Custom(CustomTrait),
            Extension(ExtensionTrait),
        }

        impl Trait {
            pub fn name(&self) -> &str {
                match self {
                    $(Trait::$variant(_) => $name,)*
                    Trait::Custom(t) => &t.name,
                    Trait::Extension(t) => &t.name,
                }
            }

            fn selector(&self, model: &Model) -> Selector {
                match self {
                    $(Trait::$variant(_) => <$ty as StaticTrait>::selector(),)*
                    Trait::Custom(t) => t.selector(model),
                    Trait::Extension(t) => t.selector.clone(),
                }
            }
        }

        $(
            impl StaticTrait for $ty {
                const NAME: &'static str = $name;

                fn selector() -> Selector {
                    $selector
                }

                fn from_trait(t: &Trait) -> Option<&Self> {
                    match t {
                        Trait::$variant(v) => Some(v),
                        _ => None,
                    }
                }

                fn into_trait(self) -> Trait {
                    Trait::$variant(self)
                }
            }

            impl From<$ty> for Trait {
                fn from(t: $ty) -> Self {
                    Trait::$variant(t)
                }
            }
        )*

        /// Prelude trait kinds in the form consumed by [`crate::TraitRegistry`].
        pub(crate) fn builtin_trait_kinds() -> Vec<(&'static str, TraitDecodeFn)> {
            vec![$(($name, decode_trait::<$ty> as TraitDecodeFn),)*]
        }
    };
}

use Selector as S;
use ShapeType as Kind;

fn service_kinds() -> Selector {
    S::or(vec![
        S::Type(Kind::Service),
        S::Type(Kind::Operation),
        S::Type(Kind::Resource),
    ])
}

builtin_traits! {
    Documentation(DocumentationTrait) => "smithy.api#documentation", S::All;
    Required(RequiredTrait) => "smithy.api#required", S::Type(Kind::Member);
    Deprecated(DeprecatedTrait) => "smithy.api#deprecated", S::All;
    Sensitive(SensitiveTrait) => "smithy.api#sensitive", S::not(service_kinds());
    Pattern(PatternTrait) => "smithy.api#pattern", S::or_target(S::Type(Kind::String));
    Length(LengthTrait) => "smithy.api#length", S::or_target(S::or(vec![
        S::Type(Kind::List),
        S::Type(Kind::Set),
        S::Type(Kind::Map),
        S::Type(Kind::String),
        S::Type(Kind::Blob),
    ]));
    Range(RangeTrait) => "smithy.api#range", S::or_target(S::Number);
    EnumValue(EnumValueTrait) => "smithy.api#enumValue", S::Type(Kind::Member);
    Error(ErrorTrait) => "smithy.api#error", S::Type(Kind::Structure);
    Readonly(ReadonlyTrait) => "smithy.api#readonly", S::Type(Kind::Operation);
    Idempotent(IdempotentTrait) => "smithy.api#idempotent", S::Type(Kind::Operation);
    Input(InputTrait) => "smithy.api#input", S::Type(Kind::Structure);
    Output(OutputTrait) => "smithy.api#output", S::Type(Kind::Structure);
    Default(DefaultTrait) => "smithy.api#default", S::or_target(S::or(vec![
        S::SimpleType,
        S::Type(Kind::List),
        S::Type(Kind::Map),
    ]));
    Tags(TagsTrait) => "smithy.api#tags", S::All;
    Title(TitleTrait) => "smithy.api#title", S::All;
    UnitType(UnitTypeTrait) => "smithy.api#unitType", S::Type(Kind::Structure);
    Private(PrivateTrait) => "smithy.api#private", S::All;
    TraitDefinition(TraitDefinitionTrait) => "smithy.api#trait", S::not(S::or(vec![
        service_kinds(),
        S::Type(Kind::Member),
    ]));
    TimestampFormat(TimestampFormatTrait) => "smithy.api#timestampFormat",
        S::or_target(S::Type(Kind::Timestamp));
    Paginated(PaginatedTrait) => "smithy.api#paginated", S::or(vec![
        S::Type(Kind::Operation),
        S::Type(Kind::Service),
    ]);
    UniqueItems(UniqueItemsTrait) => "smithy.api#uniqueItems", S::or_target(S::Type(Kind::List));
}

impl Trait {
    /// Check that the trait may be applied to `shape` and that its payload
    /// is well formed.
    pub fn validate(&self, model: &Model, shape: ShapeRef<'_>, id: &Identifier) -> Result<()> {
        if !self.selector(model).matches(model, shape) {
            return Err(ValidationError::TraitNotAllowed {
                trait_name: self.name().to_string(),
                shape: id.clone(),
                shape_type: shape.shape_type(),
            }
            .into());
        }
        let checked = match self {
            Trait::Length(t) => t.check(),
            Trait::Range(t) => t.check(),
            Trait::Pattern(t) => t.check(),
            Trait::Custom(t) => t.check(model),
            _ => Ok(()),
        };
        checked.map_err(|reason| {
            ValidationError::InvalidTraitValue {
                trait_name: self.name().to_string(),
                shape: id.clone(),
                reason,
            }
            .into()
        })
    }
}

/// Traits attached to one shape or member, keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitList {
    traits: BTreeMap<String, Trait>,
}

impl TraitList {
    /// Decode a `{ name: payload }` map. Names without a registered decoder
    /// become [`CustomTrait`]s.
    pub fn decode(value: &Value, registry: &TraitRegistry) -> Result<Self> {
        let fields = value
            .as_object()
            .map_err(|e| Error::decode("traits", e))?;
        let mut traits = Self::default();
        for (name, payload) in fields.iter() {
            let t = match registry.get(name) {
                Some(decode) => decode(name, payload)?,
                None => {
                    log::trace!("no decoder for trait `{name}`, keeping raw value");
                    Trait::Custom(CustomTrait::new(name.to_string(), payload.clone()))
                }
            };
            traits.add(t);
        }
        Ok(traits)
    }

    pub fn get<T: StaticTrait>(&self) -> Option<&T> {
        self.traits.get(T::NAME).and_then(T::from_trait)
    }

    pub fn has(&self, name: &str) -> bool {
        self.traits.contains_key(name)
    }

    pub fn has_trait<T: StaticTrait>(&self) -> bool {
        self.has(T::NAME)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Trait> {
        self.traits.get(name)
    }

    /// Insert a trait, replacing any trait with the same name.
    pub fn add(&mut self, t: impl Into<Trait>) -> Option<Trait> {
        let t = t.into();
        self.traits.insert(t.name().to_string(), t)
    }

    pub fn remove<T: StaticTrait>(&mut self) -> Option<Trait> {
        self.traits.remove(T::NAME)
    }

    pub fn remove_by_name(&mut self, name: &str) -> Option<Trait> {
        self.traits.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.traits.values()
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    pub fn validate(&self, model: &Model, shape: ShapeRef<'_>, id: &Identifier) -> Result<()> {
        self.traits
            .values()
            .try_for_each(|t| t.validate(model, shape, id))
    }
}

impl IntoIterator for TraitList {
    type Item = Trait;
    type IntoIter = std::collections::btree_map::IntoValues<String, Trait>;

    fn into_iter(self) -> Self::IntoIter {
        self.traits.into_values()
    }
}

impl FromIterator<Trait> for TraitList {
    fn from_iter<I: IntoIterator<Item = Trait>>(iter: I) -> Self {
        let mut traits = Self::default();
        for t in iter {
            traits.add(t);
        }
        traits
    }
}
