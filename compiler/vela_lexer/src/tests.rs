#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vela_ir::{Literal, VersionNumber};

fn kinds(source: &str) -> Vec<TokenKind> {
    let interner = StringInterner::new();
    lex(source, &interner)
        .unwrap()
        .iter()
        .map(|t| t.kind)
        .collect()
}

fn single_literal(source: &str) -> Literal {
    match kinds(source).as_slice() {
        [TokenKind::Literal(lit), TokenKind::Eof] => *lit,
        other => panic!("expected one literal, got {other:?}"),
    }
}

fn lex_err(source: &str) -> LexErrorKind {
    let interner = StringInterner::new();
    lex(source, &interner).unwrap_err().kind
}

#[test]
fn compound_symbols_take_longest_match() {
    assert_eq!(
        kinds(":= ?= ** >= <= <> << => -> .. * ."),
        vec![
            TokenKind::ColonEq,
            TokenKind::QuestionEq,
            TokenKind::StarStar,
            TokenKind::GtEq,
            TokenKind::LtEq,
            TokenKind::NotEq,
            TokenKind::Shl,
            TokenKind::FatArrow,
            TokenKind::Arrow,
            TokenKind::DotDot,
            TokenKind::Star,
            TokenKind::Dot,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn shift_right_is_two_tokens() {
    let interner = StringInterner::new();
    let tokens = lex("a >> b", &interner).unwrap();
    let gt: Vec<_> = tokens
        .iter()
        .filter(|t| t.kind == TokenKind::Gt)
        .map(|t| t.span)
        .collect();
    assert_eq!(gt.len(), 2);
    assert_eq!(gt[0].end, gt[1].start);
}

#[test]
fn interval_is_not_a_fraction() {
    assert_eq!(
        kinds("1..5"),
        vec![
            TokenKind::Literal(Literal::Integer(1)),
            TokenKind::DotDot,
            TokenKind::Literal(Literal::Integer(5)),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn numeric_forms() {
    assert_eq!(single_literal("17"), Literal::Integer(17));
    assert_eq!(single_literal("17L"), Literal::Long(17));
    assert_eq!(single_literal("0x11"), Literal::Integer(17));
    assert_eq!(single_literal("0xFFL"), Literal::Long(255));
    assert_eq!(single_literal("0xFFFFFFFF"), Literal::Integer(-1));
    assert_eq!(single_literal("0xFFFFFFFFFFFFFFFFL"), Literal::Long(-1));
    assert_eq!(single_literal("2.5"), Literal::Double(2.5));
    assert_eq!(single_literal("25e-1"), Literal::Double(2.5));
    assert_eq!(
        single_literal("1.2.3"),
        Literal::Version(VersionNumber::parse("1.2.3").unwrap())
    );
    assert_eq!(
        single_literal("1.2.3.4"),
        Literal::Version(VersionNumber::parse("1.2.3.4").unwrap())
    );
}

#[test]
fn invalid_numbers() {
    assert!(matches!(lex_err("12ab"), LexErrorKind::InvalidNumber(_)));
    assert!(matches!(lex_err("0x"), LexErrorKind::InvalidNumber(_)));
    assert!(matches!(lex_err("1e"), LexErrorKind::InvalidNumber(_)));
    assert!(matches!(lex_err("1e5e3"), LexErrorKind::InvalidNumber(_)));
    assert!(matches!(lex_err("3000000000"), LexErrorKind::InvalidNumber(_)));
    assert!(matches!(lex_err("1.2.3.4.5"), LexErrorKind::InvalidNumber(_)));
}

#[test]
fn string_styles_and_escapes() {
    let interner = StringInterner::new();
    let tokens = lex(r#""a\tb\x41é" 'it''s'"#, &interner).unwrap();
    let texts: Vec<String> = tokens
        .iter()
        .filter_map(|t| match t.kind {
            TokenKind::Literal(Literal::String(name)) => Some(interner.lookup(name).to_string()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, vec!["a\tbAé".to_string(), "it's".to_string()]);
}

#[test]
fn suffixes_retag_strings() {
    assert_eq!(single_literal("'x'c"), Literal::Char('x'));
    assert!(matches!(single_literal("'2024-05-01'd"), Literal::DateTime(_)));
    assert!(matches!(single_literal("'2024-05-01T10:00:00'dt"), Literal::DateTime(_)));
    assert!(matches!(single_literal("'1.00:00:00'ts"), Literal::TimeSpan(_)));
    assert!(matches!(single_literal("'08:30't"), Literal::TimeSpan(_)));
    assert!(matches!(
        single_literal("'67e55044-10b1-426f-9247-bb680e5fe0c8'g"),
        Literal::Guid(_)
    ));
    assert!(matches!(single_literal("'Acme\\Hr'n"), Literal::Name(_)));
}

#[test]
fn bad_suffixed_literals() {
    assert_eq!(lex_err("'xy'c"), LexErrorKind::InvalidCharLiteral);
    assert_eq!(lex_err("'x'q"), LexErrorKind::UnknownSuffix("q".to_string()));
    assert!(matches!(
        lex_err("'not a date'd"),
        LexErrorKind::InvalidLiteralText { .. }
    ));
}

#[test]
fn string_errors() {
    assert_eq!(lex_err("\"abc"), LexErrorKind::UnterminatedString);
    assert_eq!(lex_err("'abc"), LexErrorKind::UnterminatedString);
    assert_eq!(lex_err(r#""\q""#), LexErrorKind::InvalidEscape('q'));
    assert!(matches!(
        lex_err(r#""\uD800""#),
        LexErrorKind::InvalidCharCode(_)
    ));
}

#[test]
fn comments_are_skipped_and_nest() {
    assert_eq!(
        kinds("1 -- trailing\n/* outer /* inner */ still */ 2"),
        vec![
            TokenKind::Literal(Literal::Integer(1)),
            TokenKind::Literal(Literal::Integer(2)),
            TokenKind::Eof,
        ]
    );
    assert_eq!(lex_err("/* open /* nested */"), LexErrorKind::UnterminatedComment);
}

#[test]
fn illegal_character_is_positioned() {
    let interner = StringInterner::new();
    let err = lex("a $ b", &interner).unwrap_err();
    assert_eq!(err.kind, LexErrorKind::IllegalCharacter('$'));
    assert_eq!(err.span, Span::new(2, 3));
    assert_eq!(err.to_diagnostic().code, vela_diagnostic::ErrorCode::E0002);
}

#[test]
fn keywords_and_identifiers() {
    let interner = StringInterner::new();
    let tokens = lex("for employee in Staff return value", &interner).unwrap();
    let first: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(first[0], TokenKind::For);
    assert_eq!(first[1], TokenKind::Ident(interner.intern("employee")));
    assert_eq!(first[2], TokenKind::In);
    assert_eq!(first[4], TokenKind::Return);
    assert_eq!(first[5], TokenKind::Ident(interner.intern("value")));
}

fn round_trip(literal: Literal, interner: &StringInterner) -> Literal {
    let text = literal.render(interner);
    let tokens = lex(&text, interner).unwrap();
    match tokens.as_slice() {
        [token, eof] if eof.kind == TokenKind::Eof => match token.kind {
            TokenKind::Literal(lit) => lit,
            other => panic!("`{text}` lexed as {other:?}"),
        },
        other => panic!("`{text}` lexed as {other:?}"),
    }
}

proptest! {
    #[test]
    fn integer_literals_round_trip(n in 0..=i32::MAX) {
        let interner = StringInterner::new();
        prop_assert_eq!(round_trip(Literal::Integer(n), &interner), Literal::Integer(n));
    }

    #[test]
    fn long_literals_round_trip(n in 0..=i64::MAX) {
        let interner = StringInterner::new();
        prop_assert_eq!(round_trip(Literal::Long(n), &interner), Literal::Long(n));
    }

    #[test]
    fn double_literals_round_trip(d in 0.0f64..1.0e300) {
        let interner = StringInterner::new();
        prop_assert_eq!(round_trip(Literal::Double(d), &interner), Literal::Double(d));
    }

    #[test]
    fn string_literals_round_trip(s in "\\PC{0,24}") {
        let interner = StringInterner::new();
        let lit = Literal::String(interner.intern(&s));
        prop_assert_eq!(round_trip(lit, &interner), lit);
    }

    #[test]
    fn version_literals_round_trip(parts in proptest::collection::vec(0u32..100_000, 3..=4)) {
        let interner = StringInterner::new();
        let lit = Literal::Version(VersionNumber::new(&parts).unwrap());
        prop_assert_eq!(round_trip(lit, &interner), lit);
    }

    #[test]
    fn timespan_literals_round_trip(nanos in -10_000_000_000_000_000i64..10_000_000_000_000_000) {
        let interner = StringInterner::new();
        let lit = Literal::TimeSpan(chrono::TimeDelta::nanoseconds(nanos));
        prop_assert_eq!(round_trip(lit, &interner), lit);
    }

    #[test]
    fn char_literals_round_trip(c in proptest::char::any()) {
        let interner = StringInterner::new();
        prop_assert_eq!(round_trip(Literal::Char(c), &interner), Literal::Char(c));
    }
}

#[test]
fn hex_renders_back_to_the_same_value() {
    assert_eq!(single_literal("0x11"), single_literal("17"));
}

#[test]
fn minimum_integers_round_trip() {
    let interner = StringInterner::new();
    let min = Literal::Integer(i32::MIN);
    assert_eq!(round_trip(min, &interner), min);
    let min = Literal::Long(i64::MIN);
    assert_eq!(round_trip(min, &interner), min);
}
