// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{anyhow, bail, Result};
use smithy_model::*;

const UNION_MODEL: &str = r#"{
    "smithy": "2.0",
    "metadata": { "owner": "example" },
    "shapes": {
        "example#Choice": {
            "type": "union",
            "members": {
                "first": { "target": "example#First" },
                "second": { "target": "example#Second" }
            }
        },
        "example#First": { "type": "string" },
        "example#Second": {
            "type": "string",
            "traits": {
                "smithy.api#deprecated": { "message": "use First", "since": "2.0" }
            }
        }
    }
}"#;

fn id(s: &str) -> Identifier {
    Identifier::parse(s)
}

fn expect_validation_error(model: &Model) -> Result<ValidationError> {
    match model.validate() {
        Err(Error::Validation(e)) => Ok(e),
        Err(e) => bail!("expected validation error, got {e:?}"),
        Ok(()) => bail!("model unexpectedly validated"),
    }
}

#[test]
fn decode_json_ast() -> Result<()> {
    let model = Smithy::new().decode_ast(UNION_MODEL)?;
    model.validate()?;

    assert_eq!(model.version(), "2.0");
    assert_eq!(model.metadata()["owner"], Value::from("example"));
    assert_eq!(model.select("string")?.len(), 5);
    assert_eq!(model.select("union")?, vec![id("example#Choice")]);
    assert_eq!(
        model.shape(&id("example#Choice$second")).and_then(|s| s.target().cloned()),
        Some(id("example#Second"))
    );
    Ok(())
}

#[test]
fn prelude_is_seeded() -> Result<()> {
    let model = Model::new();
    model.validate()?;
    assert_eq!(model.version(), "1.0");

    let unit = model
        .shape(&id("smithy.api#Unit"))
        .ok_or_else(|| anyhow!("Unit missing"))?;
    assert_eq!(unit.shape_type(), ShapeType::Structure);
    assert!(unit.traits().has_trait::<UnitTypeTrait>());

    let non_empty = model
        .shape(&id("smithy.api#NonEmptyString"))
        .ok_or_else(|| anyhow!("NonEmptyString missing"))?;
    assert_eq!(
        non_empty.traits().get::<LengthTrait>(),
        Some(&LengthTrait {
            min: Some(1),
            max: None
        })
    );
    assert!(model
        .shape(&id("smithy.api#PrimitiveInteger"))
        .is_some_and(|s| s.traits().has_trait::<DefaultTrait>()));
    Ok(())
}

#[test]
fn unknown_traits_are_kept_raw() -> Result<()> {
    let model = Smithy::new().decode_ast(
        r#"{
            "shapes": {
                "example#Name": {
                    "type": "string",
                    "traits": { "example#label": { "text": "name" } }
                }
            }
        }"#,
    )?;
    let shape = model
        .shape(&id("example#Name"))
        .ok_or_else(|| anyhow!("Name missing"))?;
    match shape.traits().get_by_name("example#label") {
        Some(Trait::Custom(t)) => assert_eq!(t.value["text"], Value::from("name")),
        other => bail!("expected custom trait, got {other:?}"),
    }
    // Without a definition there is nothing to check it against.
    model.validate()?;
    Ok(())
}

#[test]
fn add_and_remove_traits() -> Result<()> {
    let mut model = Smithy::new().decode_ast(UNION_MODEL)?;

    model.add_trait(RequiredTrait, &id("example#Choice$first"))?;
    assert!(model
        .shape(&id("example#Choice$first"))
        .is_some_and(|m| m.traits().has_trait::<RequiredTrait>()));
    model.validate()?;

    // `@required` is only allowed on members.
    model.add_trait(RequiredTrait, &id("example#Choice"))?;
    match expect_validation_error(&model)? {
        ValidationError::TraitNotAllowed {
            trait_name,
            shape,
            shape_type,
        } => {
            assert_eq!(trait_name, "smithy.api#required");
            assert_eq!(shape, id("example#Choice"));
            assert_eq!(shape_type, ShapeType::Union);
        }
        e => bail!("unexpected error {e}"),
    }

    model.remove_trait::<RequiredTrait>(&id("example#Choice"))?;
    model.remove_trait::<RequiredTrait>(&id("example#Choice$first"))?;
    assert!(model
        .shape(&id("example#Choice$first"))
        .is_some_and(|m| m.traits().is_empty()));
    model.validate()?;

    model.remove_trait_by_name("smithy.api#deprecated", &id("example#Second"))?;
    assert!(model.select("[trait:deprecated]")?.is_empty());
    Ok(())
}

#[test]
fn mutation_errors() -> Result<()> {
    let mut model = Smithy::new().decode_ast(UNION_MODEL)?;

    match model.add_trait(RequiredTrait, &id("example#Missing")) {
        Err(Error::ShapeNotFound(shape)) => assert_eq!(shape, id("example#Missing")),
        other => bail!("expected shape not found, got {other:?}"),
    }
    match model.add_trait(RequiredTrait, &id("example#Choice$third")) {
        Err(Error::MemberNotFound { shape, member }) => {
            assert_eq!(shape, id("example#Choice"));
            assert_eq!(member, "third");
        }
        other => bail!("expected member not found, got {other:?}"),
    }
    // Strings have no named members.
    match model.remove_trait::<RequiredTrait>(&id("example#First$x")) {
        Err(Error::MemberNotFound { .. }) => (),
        other => bail!("expected member not found, got {other:?}"),
    }
    Ok(())
}

fn decode_service_only(name: &str, value: &Value) -> smithy_model::Result<Trait> {
    Ok(Trait::Extension(ExtensionTrait::new(
        name,
        value.clone(),
        Selector::Type(ShapeType::Service),
    )))
}

#[test]
fn registered_trait_selector() -> Result<()> {
    let mut smithy = Smithy::new();
    smithy.register_trait_kinds([("example#serviceOnly", decode_service_only as TraitDecodeFn)])?;

    let idl = r#"
namespace example

@serviceOnly(level: 2)
service Api {}

@serviceOnly
string Name
"#;
    let model = smithy.parse(idl)?;
    match model
        .shape(&id("example#Api"))
        .and_then(|s| s.traits().get_by_name("example#serviceOnly"))
    {
        Some(Trait::Extension(t)) => {
            #[derive(serde::Deserialize)]
            struct Payload {
                level: u32,
            }
            assert_eq!(t.decode::<Payload>()?.level, 2);
        }
        other => bail!("expected extension trait, got {other:?}"),
    }

    let error = expect_validation_error(&model)?;
    assert!(
        matches!(&error, ValidationError::TraitNotAllowed { shape_type: ShapeType::String, .. }),
        "{error}"
    );
    assert!(error.to_string().contains("example#serviceOnly"), "{error}");
    Ok(())
}

#[test]
fn invalid_registration_name() {
    let mut smithy = Smithy::new();
    match smithy.register_trait_kinds([("", decode_service_only as TraitDecodeFn)]) {
        Err(Error::Registry(RegistryError::InvalidName { registry, .. })) => {
            assert_eq!(&*registry, "TRAIT_REGISTRY")
        }
        other => panic!("expected invalid name, got {other:?}"),
    }
}

#[test]
fn member_targets() -> Result<()> {
    let smithy = Smithy::new();

    let model = smithy.parse("namespace a\nstructure S {\n    m: Missing\n}")?;
    match expect_validation_error(&model)? {
        ValidationError::TargetNotFound { member, target } => {
            assert_eq!(member, id("a#S$m"));
            assert_eq!(target, id("a#Missing"));
        }
        e => bail!("unexpected error {e}"),
    }

    let model = smithy.parse("namespace a\noperation Op {}\nlist L {\n    member: Op\n}")?;
    match expect_validation_error(&model)? {
        ValidationError::IllegalTarget { shape_type, .. } => {
            assert_eq!(shape_type, ShapeType::Operation)
        }
        e => bail!("unexpected error {e}"),
    }

    let model = smithy.parse("namespace a\nstring Op\nservice S {\n    operations: [Op]\n}")?;
    match expect_validation_error(&model)? {
        ValidationError::UnexpectedTargetKind {
            expected, actual, ..
        } => {
            assert_eq!(expected, ShapeType::Operation);
            assert_eq!(actual, ShapeType::String);
        }
        e => bail!("unexpected error {e}"),
    }
    Ok(())
}

#[test]
fn member_cannot_target_member() -> Result<()> {
    let smithy = Smithy::new();

    let model = smithy.decode_ast(
        r#"{
            "shapes": {
                "a#S": {
                    "type": "structure",
                    "members": { "m": { "target": "a#S$m" } }
                }
            }
        }"#,
    )?;
    match expect_validation_error(&model)? {
        ValidationError::IllegalTarget {
            member,
            target,
            shape_type,
        } => {
            assert_eq!(member, id("a#S$m"));
            assert_eq!(target, id("a#S$m"));
            assert_eq!(shape_type, ShapeType::Member);
        }
        e => bail!("unexpected error {e}"),
    }

    // A trait definition whose member targets a member cannot check values.
    let model = smithy.decode_ast(
        r#"{
            "shapes": {
                "a#t": {
                    "type": "structure",
                    "traits": { "smithy.api#trait": {} },
                    "members": { "m": { "target": "a#t$m" } }
                },
                "a#Name": {
                    "type": "string",
                    "traits": { "a#t": { "m": 1 } }
                }
            }
        }"#,
    )?;
    assert!(model.validate().is_err());
    match model.validate_value(&Value::from_json_str(r#"{ "m": 1 }"#)?, &id("a#t")) {
        Err(Error::Validation(ValidationError::ValueMismatch { path, shape, .. })) => {
            assert_eq!(path, "$.m");
            assert_eq!(shape, id("a#t$m"));
        }
        other => bail!("expected value mismatch, got {other:?}"),
    }
    Ok(())
}

#[test]
fn document_shapes_replace_prelude() -> Result<()> {
    let model = Smithy::new().decode_ast(
        r#"{
            "shapes": {
                "smithy.api#String": {
                    "type": "string",
                    "traits": { "smithy.api#sensitive": {} }
                }
            }
        }"#,
    )?;
    assert!(model
        .shape(&id("smithy.api#String"))
        .is_some_and(|s| s.traits().has_trait::<SensitiveTrait>()));
    assert!(!Model::new()
        .shape(&id("smithy.api#String"))
        .is_some_and(|s| s.traits().has_trait::<SensitiveTrait>()));
    model.validate()?;

    let mut model = Model::new();
    let previous = model.insert_shape(
        id("smithy.api#String"),
        Shape::Integer(SimpleShape::new(TraitList::default())),
    );
    assert_eq!(previous.map(|s| s.shape_type()), Some(ShapeType::String));
    assert_eq!(
        model.shape(&id("smithy.api#String")).map(|s| s.shape_type()),
        Some(ShapeType::Integer)
    );
    Ok(())
}

#[test]
fn apply_entries() -> Result<()> {
    let model = Smithy::new().decode_ast(
        r#"{
            "shapes": {
                "example#S": {
                    "type": "structure",
                    "members": { "m": { "target": "smithy.api#String" } }
                },
                "example#S$m": {
                    "type": "apply",
                    "traits": { "smithy.api#required": {} }
                }
            }
        }"#,
    )?;
    assert!(model
        .shape(&id("example#S$m"))
        .is_some_and(|m| m.traits().has_trait::<RequiredTrait>()));

    let missing = Smithy::new().decode_ast(
        r#"{ "shapes": { "example#Nope": { "type": "apply", "traits": { "smithy.api#sensitive": {} } } } }"#,
    );
    assert!(matches!(missing, Err(Error::ShapeNotFound(_))));
    Ok(())
}

#[test]
fn decode_errors() {
    let smithy = Smithy::new();
    match smithy.decode_ast(r#"{ "shapes": { "a#B": { "type": "gadget" } } }"#) {
        Err(Error::UnrecognizedShapeType(kind)) => assert_eq!(kind, "gadget"),
        other => panic!("expected unrecognized shape type, got {other:?}"),
    }
    match smithy.decode_ast(r#"{ "shapes": { "a#B": { "type": "list" } } }"#) {
        Err(Error::Decode { context, .. }) => assert!(context.contains("a#B"), "{context}"),
        other => panic!("expected decode error, got {other:?}"),
    }
    match smithy.decode_ast(
        r#"{ "shapes": { "a#B": { "type": "string", "traits": { "smithy.api#length": { "min": "x" } } } } }"#,
    ) {
        Err(Error::Decode { context, .. }) => {
            assert!(context.contains("smithy.api#length"), "{context}")
        }
        other => panic!("expected decode error, got {other:?}"),
    }
    assert!(matches!(
        smithy.decode_ast("{ not json"),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn trait_value_checks() -> Result<()> {
    let smithy = Smithy::new();

    let model = smithy.parse("namespace a\n@length(min: 5, max: 1)\nstring S")?;
    match expect_validation_error(&model)? {
        ValidationError::InvalidTraitValue { trait_name, .. } => {
            assert_eq!(trait_name, "smithy.api#length")
        }
        e => bail!("unexpected error {e}"),
    }

    let model = smithy.parse("namespace a\n@range(min: 1)\nstring S")?;
    assert!(matches!(
        expect_validation_error(&model)?,
        ValidationError::TraitNotAllowed { .. }
    ));

    let model = smithy.parse("namespace a\nstructure S {\n    @range(min: 1)\n    n: Integer\n}")?;
    model.validate()?;
    Ok(())
}

const CUSTOM_TRAIT: &str = r#"
namespace example

@trait(selector: "string")
structure label {
    @required
    text: String
}
"#;

#[test]
fn custom_trait_definitions() -> Result<()> {
    let smithy = Smithy::new();

    let model = smithy.parse(&format!("{CUSTOM_TRAIT}\n@label(text: \"name\")\nstring Name\n"))?;
    model.validate()?;
    assert_eq!(model.select("[trait:example#label]")?, vec![id("example#Name")]);

    let model = smithy.parse(&format!("{CUSTOM_TRAIT}\n@label(text: \"x\")\ninteger Count\n"))?;
    assert!(matches!(
        expect_validation_error(&model)?,
        ValidationError::TraitNotAllowed { .. }
    ));

    let model = smithy.parse(&format!("{CUSTOM_TRAIT}\n@label(txt: \"x\")\nstring Name\n"))?;
    match expect_validation_error(&model)? {
        ValidationError::InvalidTraitValue { trait_name, reason, .. } => {
            assert_eq!(trait_name, "example#label");
            assert!(reason.contains("txt"), "{reason}");
        }
        e => bail!("unexpected error {e}"),
    }
    Ok(())
}

const VALUES: &str = r#"
namespace example

structure Person {
    @required
    name: NonEmptyString
    @range(min: 0, max: 150)
    age: Integer
    tags: Tags
    attributes: Attributes
    suit: Suit
}

@uniqueItems
list Tags {
    member: String
}

map Attributes {
    key: String
    value: Level
}

intEnum Level {
    LOW = 1
    HIGH = 2
}

enum Suit {
    CLUB
    HEART = "heart"
}

union Contact {
    email: String
    phone: Long
}
"#;

#[test]
fn validate_values() -> Result<()> {
    let model = Smithy::new().parse(VALUES)?;
    model.validate()?;
    let person = id("example#Person");

    let valid = Value::from_json_str(
        r#"{
            "name": "Ada",
            "age": 36,
            "tags": ["a", "b"],
            "attributes": { "x": 1, "y": 2 },
            "suit": "heart"
        }"#,
    )?;
    model.validate_value(&valid, &person)?;
    model.validate_value(&Value::from_json_str(r#"{ "name": "Bo", "suit": "CLUB" }"#)?, &person)?;
    model.validate_value(&Value::from_json_str(r#"{ "phone": 5 }"#)?, &id("example#Contact"))?;

    let cases = [
        (r#"{ "age": 3 }"#, "missing required member `name`"),
        (r#"{ "name": "" }"#, "smithy.api#length"),
        (r#"{ "name": "x", "age": 200 }"#, "smithy.api#range"),
        (r#"{ "name": "x", "age": 1.5 }"#, "expected an integer"),
        (r#"{ "name": "x", "tags": ["a", "a"] }"#, "unique items"),
        (r#"{ "name": "x", "attributes": { "k": 3 } }"#, "intEnum"),
        (r#"{ "name": "x", "suit": "spade" }"#, "enum value"),
        (r#"{ "name": "x", "extra": true }"#, "unknown member `extra`"),
        (r#"["x"]"#, "expected an object"),
    ];
    for (json, expected) in cases {
        match model.validate_value(&Value::from_json_str(json)?, &person) {
            Err(e) => assert!(e.to_string().contains(expected), "{json}: {e}"),
            Ok(()) => bail!("{json} unexpectedly validated"),
        }
    }

    let contact = Value::from_json_str(r#"{ "phone": 5, "email": "a@b" }"#)?;
    assert!(model.validate_value(&contact, &id("example#Contact")).is_err());
    assert!(matches!(
        model.validate_value(&Value::Null, &id("example#Nope")),
        Err(Error::ShapeNotFound(_))
    ));
    Ok(())
}

#[cfg(feature = "regex")]
#[test]
fn pattern_constraint() -> Result<()> {
    let model = Smithy::new().parse("namespace a\n@pattern(\"^[a-z]+$\")\nstring Lower")?;
    model.validate()?;
    model.validate_value(&Value::from("abc"), &id("a#Lower"))?;
    match model.validate_value(&Value::from("ABC"), &id("a#Lower")) {
        Err(Error::Validation(ValidationError::ConstraintViolated { path, trait_name, .. })) => {
            assert_eq!(path, "$");
            assert_eq!(trait_name, "smithy.api#pattern");
        }
        other => bail!("expected pattern violation, got {other:?}"),
    }

    let model = Smithy::new().parse("namespace a\n@pattern(\"[\")\nstring Broken")?;
    assert!(matches!(
        expect_validation_error(&model)?,
        ValidationError::InvalidTraitValue { .. }
    ));
    Ok(())
}
