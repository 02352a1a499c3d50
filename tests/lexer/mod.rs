// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use anyhow::{bail, Result};
use serde::Deserialize;
use smithy_model::unstable::*;
use smithy_model::{Error, LexicalError};
use test_generator::test_resources;

fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Word(_) => "word",
        TokenKind::Grammar(_) => "grammar",
        TokenKind::String(_) => "string",
        TokenKind::Number(_) => "number",
        TokenKind::Documentation(_) => "documentation",
        TokenKind::Newline => "newline",
    }
}

fn lex(idl: &str) -> smithy_model::Result<Vec<Token>> {
    let source = Source::from_contents("case.smithy", idl)?;
    tokenize(&source)
}

#[derive(Deserialize, Debug)]
struct Case {
    note: String,
    idl: String,
    #[serde(default)]
    tokens: Vec<String>,
    kinds: Option<Vec<String>>,
    error: Option<String>,
    line: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct Test {
    cases: Vec<Case>,
}

fn yaml_test_impl(file: &str) -> Result<()> {
    println!("\nrunning {file}");

    let yaml = std::fs::read_to_string(file)?;
    let test: Test = serde_yaml::from_str(&yaml)?;

    for case in &test.cases {
        print!("case {} ", case.note);
        match (lex(&case.idl), &case.error) {
            (Ok(tokens), None) => {
                let texts: Vec<String> = tokens.iter().map(|t| t.0.to_string()).collect();
                assert_eq!(texts, case.tokens, "token mismatch in `{}`", case.note);
                if let Some(kinds) = &case.kinds {
                    let actual: Vec<&str> = tokens.iter().map(|t| kind_name(&t.0)).collect();
                    assert_eq!(&actual, kinds, "kind mismatch in `{}`", case.note);
                }
            }
            (Ok(tokens), Some(expected)) => {
                bail!("expected error `{expected}`, lexed {tokens:?}")
            }
            (Err(actual), Some(expected)) => {
                let message = actual.to_string();
                if !message.contains(expected.as_str()) {
                    bail!("error message\n`{message}`\ndoes not contain `{expected}`");
                }
                if let (Some(line), Error::Lexical { line: actual, .. }) = (case.line, &actual) {
                    assert_eq!(line, *actual, "wrong error line in `{}`", case.note);
                }
            }
            (Err(actual), None) => return Err(actual.into()),
        }
        println!("passed");
    }
    println!("{} cases passed.", test.cases.len());
    Ok(())
}

fn yaml_test(file: &str) -> Result<()> {
    match yaml_test_impl(file) {
        Ok(_) => Ok(()),
        Err(e) => {
            // If Err is returned, it doesn't always get printed by cargo test.
            // Therefore, panic with the error.
            panic!("{}", e);
        }
    }
}

#[test_resources("tests/lexer/cases/*.yaml")]
fn run(path: &str) {
    yaml_test(path).unwrap()
}

#[test]
fn trait_application_token_count() -> Result<()> {
    let tokens = lex("@testTrait(value: 1)")?;
    let kinds: Vec<_> = tokens.iter().map(|t| t.0.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Word("@testTrait".to_string()),
            TokenKind::Grammar('('),
            TokenKind::Word("value".to_string()),
            TokenKind::Grammar(':'),
            TokenKind::Number("1".to_string()),
            TokenKind::Grammar(')'),
        ]
    );
    Ok(())
}

#[test]
fn unterminated_string_reports_line() {
    match lex("namespace a\nstring B\n@documentation(\"oops\n)") {
        Err(Error::Lexical {
            error: LexicalError::UnterminatedString,
            line,
            col,
            ..
        }) => {
            assert_eq!(line, 3);
            assert_eq!(col, 16);
        }
        other => panic!("expected unterminated string, got {other:?}"),
    }
}

#[test]
fn spans_point_into_source() -> Result<()> {
    let tokens = lex("structure Foo {\n\tbar: String\n}")?;
    let bar = &tokens[4];
    assert_eq!(bar.0, TokenKind::Word("bar".to_string()));
    assert_eq!(bar.1.text(), "bar");
    // A tab counts as four columns.
    assert_eq!((bar.1.line, bar.1.col), (2, 5));
    Ok(())
}

#[test]
fn block_string_dedents() -> Result<()> {
    let idl = "@documentation(\"\"\"\n    Hello\n      World\n    \"\"\")";
    let tokens = lex(idl)?;
    assert_eq!(
        tokens[2].0,
        TokenKind::String("Hello\n  World\n".to_string())
    );
    Ok(())
}
