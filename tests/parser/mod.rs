// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{bail, Result};
use smithy_model::unstable::*;
use smithy_model::*;

fn parse(idl: &str) -> Result<Model> {
    Ok(Smithy::new().parse(idl)?)
}

fn ast(idl: &str) -> Result<Value> {
    let smithy = Smithy::new();
    let source = Source::from_contents("test.smithy", idl)?;
    Ok(Parser::new(&source, smithy.trait_registry())?.parse()?)
}

fn id(s: &str) -> Identifier {
    Identifier::parse(s)
}

/// Expect a syntax error of the given kind reported on `line`.
fn expect_syntax_error(idl: &str, expected: SyntaxError, line: u32) -> Result<()> {
    match Smithy::new().parse(idl) {
        Err(Error::Syntax {
            error,
            position: Some(position),
        }) => {
            assert_eq!(error, expected);
            assert_eq!(position.line, line, "{}", position.context);
            assert!(position.context.contains("<idl>"), "{}", position.context);
            Ok(())
        }
        Err(e) => bail!("expected {expected:?}, got {e:?}"),
        Ok(_) => bail!("expected {expected:?}, parse succeeded"),
    }
}

#[test]
fn simple_shape() -> Result<()> {
    let model = parse("namespace soto.example\nstring MyString")?;
    let shape = model.shape(&id("soto.example#MyString"));
    assert_eq!(shape.map(|s| s.shape_type()), Some(ShapeType::String));
    model.validate()?;
    Ok(())
}

#[test]
fn metadata() -> Result<()> {
    let model = parse("namespace soto.example\nmetadata \"test\" = \"test string\"")?;
    assert_eq!(model.metadata()["test"], Value::from("test string"));

    let model = parse("$version: \"2.0\"\nmetadata list = [1, true, null]\nmetadata map = { a: \"b\" }")?;
    assert_eq!(model.version(), "2.0");
    assert_eq!(model.metadata()["list"][1], Value::Bool(true));
    assert!(model.metadata()["list"][2].is_null());
    assert_eq!(model.metadata()["map"]["a"], Value::from("b"));
    Ok(())
}

#[test]
fn version_defaults() -> Result<()> {
    let model = parse("namespace a\nstring B")?;
    assert_eq!(model.version(), "1.0");
    Ok(())
}

#[test]
fn list_member_targets_prelude() -> Result<()> {
    let model = parse("namespace soto.example\nlist MyList {\n    member: String\n}")?;
    match model.shape(&id("soto.example#MyList")).and_then(|s| s.as_shape()) {
        Some(Shape::List(list)) => {
            assert_eq!(list.member.target, id("smithy.api#String"));
        }
        other => bail!("expected list, got {other:?}"),
    }
    model.validate()?;
    Ok(())
}

#[test]
fn structure_members_and_traits() -> Result<()> {
    let idl = r#"
namespace example.weather

/// Provides weather forecasts.
/// Second line.
@title("City")
structure City {
    /// City identifier.
    @required
    cityId: CityId,
    @length(min: 1, max: 64)
    name: String
    coordinates: Coordinates
}

@pattern("^[A-Za-z0-9 ]+$")
string CityId

structure Coordinates {
    latitude: Float
    longitude: Float
}
"#;
    let model = parse(idl)?;
    model.validate()?;

    let city = model
        .shape(&id("example.weather#City"))
        .ok_or_else(|| anyhow::anyhow!("City not found"))?;
    assert_eq!(
        city.traits().get::<DocumentationTrait>(),
        Some(&DocumentationTrait(
            "Provides weather forecasts.\nSecond line.".to_string()
        ))
    );
    assert_eq!(
        city.traits().get::<TitleTrait>(),
        Some(&TitleTrait("City".to_string()))
    );

    let city_id = model
        .shape(&id("example.weather#City$cityId"))
        .ok_or_else(|| anyhow::anyhow!("cityId not found"))?;
    assert_eq!(city_id.shape_type(), ShapeType::Member);
    assert!(city_id.traits().has_trait::<RequiredTrait>());
    assert_eq!(city_id.target(), Some(&id("example.weather#CityId")));

    let name = model
        .shape(&id("example.weather#City$name"))
        .ok_or_else(|| anyhow::anyhow!("name not found"))?;
    assert_eq!(
        name.traits().get::<LengthTrait>(),
        Some(&LengthTrait {
            min: Some(1),
            max: Some(64)
        })
    );
    Ok(())
}

#[test]
fn json_ast_lowering() -> Result<()> {
    let idl = r#"
namespace a
use b#Other

@tags(["x", "y"])
structure S {
    m: String
    o: Other
}

@myTrait(ref: S, nested: { list: [1, 2] })
string T
"#;
    let ast = ast(idl)?;
    let shapes = &ast["shapes"];
    assert_eq!(shapes["a#S"]["type"], Value::from("structure"));
    assert_eq!(
        shapes["a#S"]["members"]["m"]["target"],
        Value::from("smithy.api#String")
    );
    assert_eq!(shapes["a#S"]["members"]["o"]["target"], Value::from("b#Other"));
    assert_eq!(
        shapes["a#S"]["traits"]["smithy.api#tags"],
        Value::from(vec![Value::from("x"), Value::from("y")])
    );

    // Unknown trait names resolve against the current namespace and bare
    // words inside trait values become identifiers.
    let my_trait = &shapes["a#T"]["traits"]["a#myTrait"];
    assert_eq!(my_trait["ref"], Value::from("a#S"));
    assert_eq!(my_trait["nested"]["list"][1], Value::from(2u64));
    assert!(ast.get("smithy").is_none());
    Ok(())
}

#[test]
fn annotation_trait_is_empty_object() -> Result<()> {
    let ast = ast("namespace a\n@sensitive\nstring Secret")?;
    assert!(ast["shapes"]["a#Secret"]["traits"]["smithy.api#sensitive"].is_empty_object());
    Ok(())
}

#[test]
fn enums() -> Result<()> {
    let idl = r#"
namespace cards

enum Suit {
    DIAMOND = "diamond"
    CLUB
    /// Hearts.
    HEART = "heart"
}

intEnum Level {
    LOW = 1
    HIGH = 10
}
"#;
    let model = parse(idl)?;
    model.validate()?;

    let diamond = model
        .shape(&id("cards#Suit$DIAMOND"))
        .ok_or_else(|| anyhow::anyhow!("DIAMOND not found"))?;
    assert_eq!(diamond.target(), Some(&id("smithy.api#Unit")));
    assert_eq!(
        diamond.traits().get::<EnumValueTrait>(),
        Some(&EnumValueTrait(Value::from("diamond")))
    );
    let club = model
        .shape(&id("cards#Suit$CLUB"))
        .ok_or_else(|| anyhow::anyhow!("CLUB not found"))?;
    assert!(club.traits().is_empty());

    let high = model
        .shape(&id("cards#Level$HIGH"))
        .ok_or_else(|| anyhow::anyhow!("HIGH not found"))?;
    assert_eq!(
        high.traits().get::<EnumValueTrait>(),
        Some(&EnumValueTrait(Value::from(10u64)))
    );
    assert_eq!(
        model.shape(&id("cards#Level")).map(|s| s.shape_type()),
        Some(ShapeType::IntEnum)
    );
    Ok(())
}

#[test]
fn service_shapes() -> Result<()> {
    let idl = r#"
namespace example.weather

@paginated(inputToken: "nextToken", outputToken: "nextToken", pageSize: "pageSize")
service Weather {
    version: "2006-03-01"
    operations: [GetCity]
    resources: [Forecast]
}

resource Forecast {
    identifiers: { forecastId: String }
    read: GetCity
}

@readonly
operation GetCity {
    input: GetCityInput
    output: GetCityOutput
    errors: [NoSuchResource]
}

@input
structure GetCityInput {}

@output
structure GetCityOutput {}

@error("client")
structure NoSuchResource {
    resourceType: String
}
"#;
    let model = parse(idl)?;
    model.validate()?;

    match model.shape(&id("example.weather#Weather")).and_then(|s| s.as_shape()) {
        Some(Shape::Service(service)) => {
            assert_eq!(service.version.as_deref(), Some("2006-03-01"));
            assert_eq!(
                service.operations[0].target(),
                &id("example.weather#GetCity")
            );
            assert_eq!(
                service.traits.get::<PaginatedTrait>().and_then(|p| p.page_size.as_deref()),
                Some("pageSize")
            );
        }
        other => bail!("expected service, got {other:?}"),
    }
    match model.shape(&id("example.weather#Forecast")).and_then(|s| s.as_shape()) {
        Some(Shape::Resource(resource)) => {
            assert!(resource.identifiers.contains_key("forecastId"));
            assert_eq!(resource.lifecycle().count(), 1);
        }
        other => bail!("expected resource, got {other:?}"),
    }
    match model.shape(&id("example.weather#NoSuchResource")).and_then(|s| s.as_shape()) {
        Some(shape) => assert_eq!(
            shape.traits().get::<ErrorTrait>(),
            Some(&ErrorTrait(ErrorKind::Client))
        ),
        None => bail!("NoSuchResource not found"),
    }
    Ok(())
}

#[test]
fn apply_statements() -> Result<()> {
    let idl = r#"
namespace a

structure S {
    m: String
}

apply S @documentation("applied")
apply S$m @required
"#;
    let model = parse(idl)?;
    let s = model.shape(&id("a#S")).ok_or_else(|| anyhow::anyhow!("S not found"))?;
    assert_eq!(
        s.traits().get::<DocumentationTrait>(),
        Some(&DocumentationTrait("applied".to_string()))
    );
    let m = model
        .shape(&id("a#S$m"))
        .ok_or_else(|| anyhow::anyhow!("m not found"))?;
    assert!(m.traits().has_trait::<RequiredTrait>());

    // Traits cannot be carried across an `apply` onto the next shape.
    expect_syntax_error(
        "namespace a\nstructure S {}\n@sensitive\napply S @documentation(\"x\")\nstring T",
        SyntaxError::UnattachedTraits,
        4,
    )
}

#[test]
fn syntax_errors() -> Result<()> {
    expect_syntax_error(
        "namespace a\nnamespace b",
        SyntaxError::DuplicateNamespace,
        2,
    )?;
    expect_syntax_error(
        "namespace a\nstring B\n\nuse c#D",
        SyntaxError::DeclarationAfterShapes("use"),
        4,
    )?;
    expect_syntax_error(
        "namespace a\n@required\n\nstring B",
        SyntaxError::UnattachedTraits,
        3,
    )?;
    expect_syntax_error("namespace a\nstring B\n@required", SyntaxError::UnattachedTraits, 3)?;
    expect_syntax_error(
        "namespace a\nstructure S {\n    @required\n}",
        SyntaxError::UnattachedTraits,
        4,
    )?;
    expect_syntax_error(
        "namespace a\napply Missing @required",
        SyntaxError::ApplyToUndeclaredShape("a#Missing".to_string()),
        2,
    )?;
    expect_syntax_error(
        "namespace a\nstring B\nstring B",
        SyntaxError::DuplicateShape("a#B".to_string()),
        3,
    )?;
    expect_syntax_error(
        "metadata foo = bar",
        SyntaxError::IdentifierInMetadata("bar".to_string()),
        1,
    )?;
    expect_syntax_error(
        "namespace a\nstructure B {\n    c String\n}",
        SyntaxError::UnexpectedToken {
            found: "String".to_string(),
            expected: "`:`".to_string(),
        },
        3,
    )?;
    Ok(())
}

#[test]
fn unexpected_end() {
    match Smithy::new().parse("namespace a\nstructure B {\n    c: String\n") {
        Err(Error::Syntax {
            error: SyntaxError::UnexpectedEnd(_),
            ..
        }) => (),
        other => panic!("expected unexpected end, got {other:?}"),
    }
}

#[test]
fn error_message_shows_source_line() {
    let err = match Smithy::new().parse("namespace a\nnamespace b") {
        Err(e) => e.to_string(),
        Ok(_) => panic!("duplicate namespace accepted"),
    };
    assert!(err.contains("--> <idl>:2:1"), "{err}");
    assert!(err.contains("namespace b"), "{err}");
    assert!(err.contains("error: namespace has already been declared"), "{err}");
}

#[test]
fn unrecognized_shape_type() {
    match Smithy::new().parse("namespace a\nwidget B") {
        Err(Error::UnrecognizedShapeType(kind)) => assert_eq!(kind, "widget"),
        other => panic!("expected unrecognized shape type, got {other:?}"),
    }
}

#[test]
fn fully_qualify() -> Result<()> {
    let smithy = Smithy::new();
    let source = Source::from_contents("q.smithy", "namespace a\nuse b#Alias\n")?;
    let parser = Parser::new(&source, smithy.trait_registry())?;

    // Nothing has been parsed yet, so only the prelude and absolute names resolve.
    assert_eq!(parser.fully_qualify("String", false), "smithy.api#String");
    assert_eq!(parser.fully_qualify("Foo", false), "Foo");
    assert_eq!(parser.fully_qualify("x#Foo$m", false), "x#Foo$m");
    assert_eq!(parser.fully_qualify("required", true), "smithy.api#required");
    assert_eq!(parser.fully_qualify("String", true), "String");
    Ok(())
}
