//! Property tests: the canonical form re-parses to the same tree, and
//! formatting a canonical document changes nothing.

use bali_core::{
    format, format_expression, parse_document, parse_expression, Extent, Interval,
    StructureError,
};
use proptest::prelude::*;
use proptest::sample::select;

const LEAVES: &[&str] = &[
    "true",
    "false",
    "none",
    "any",
    "1",
    "-3",
    "2.5",
    ".25",
    "42%",
    "~pi",
    "~P3D",
    "<2024-01-31>",
    "\"hello\"",
    "\"^[a-z]+\"?",
    "$name",
    "#AB12",
    "v2.1",
    "'0a1b 2c3d'",
    "/bali/types/Text/v1",
    "<https://example.com/x>",
    "[1..5]",
    "(2..9)",
    "[\"a\"..\"z\")",
    "[0.5..2.5)",
    "[.25..1.]",
    "(.5 .. 1.]",
    "[1. .. 1.]",
    "1.",
    "\">\n    a tale\n<\"",
    "[ ]",
    "[:]",
];

/// Spellings that scan as identifiers rather than keywords, intrinsics or
/// numbers.
const NAMES: &[&str] = &["count", "items", "flag", "total"];
const METHODS: &[&str] = &["addItem", "getValue", "close"];
const INTRINSICS: &[&str] = &["getSize", "isEmpty", "randomBytes"];
const BINARY_OPERATORS: &[&str] = &[
    "&", "^", "+", "-", "*", "/", "//", "<", "=", ">", "IS", "MATCHES", "AND", "SANS", "XOR",
    "OR",
];
const INVERSIONS: &[&str] = &["-", "/", "*"];
const ASSIGNMENTS: &[&str] = &[":=", "?=", "+=", "-=", "*=", "/="];
const ANNOTATIONS: &[&str] = &["! first things first", "!>\n    a longer remark\n<!"];

/// Source text for an arbitrary component built from literals, series,
/// catalogs and typed contexts.
fn component() -> impl Strategy<Value = String> {
    let leaf = proptest::sample::select(LEAVES).prop_map(str::to_owned);
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 1..4)
                .prop_map(|items| format!("[{}]", items.join(", "))),
            proptest::collection::vec(inner.clone(), 1..4).prop_map(|values| {
                let entries: Vec<String> = values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| format!("key{}: {}", index, value))
                    .collect();
                format!("[{}]", entries.join(", "))
            }),
            proptest::collection::vec(inner.clone(), 1..3).prop_map(|items| {
                format!("[{}]($type: /bali/collections/Set/v1)", items.join(", "))
            }),
            (inner, proptest::sample::select(&["first", "second"][..]))
                .prop_map(|(value, word)| format!("[\n    {}  ! {}\n]", value, word)),
        ]
    })
}

/// Source text for an arbitrary expression: every primary, and every
/// continuation applied to arbitrary expressions.
fn expression() -> BoxedStrategy<String> {
    let leaf = prop_oneof![
        3 => select(LEAVES).prop_map(str::to_owned),
        2 => select(NAMES).prop_map(str::to_owned),
        1 => select(INTRINSICS).prop_map(|function| format!("{}()", function)),
    ];
    leaf.prop_recursive(3, 24, 3, |inner| {
        let arguments =
            proptest::collection::vec(inner.clone(), 0..3).prop_map(|list| list.join(", "));
        prop_oneof![
            (inner.clone(), select(BINARY_OPERATORS), inner.clone())
                .prop_map(|(left, op, right)| format!("{} {} {}", left, op, right)),
            inner.clone().prop_map(|e| format!("({})", e)),
            inner.clone().prop_map(|e| format!("|{}|", e)),
            inner.clone().prop_map(|e| format!("@{}", e)),
            (select(INVERSIONS), inner.clone()).prop_map(|(op, e)| format!("{} {}", op, e)),
            inner.clone().prop_map(|e| format!("NOT {}", e)),
            (select(INTRINSICS), arguments.clone())
                .prop_map(|(function, list)| format!("{}({})", function, list)),
            (
                inner.clone(),
                select(&[".", "<-"][..]),
                select(METHODS),
                arguments
            )
                .prop_map(|(target, op, method, list)| {
                    format!("{} {}{}({})", target, op, method, list)
                }),
            (inner.clone(), proptest::collection::vec(inner, 1..3))
                .prop_map(|(composite, indices)| format!("{}[{}]", composite, indices.join(", "))),
        ]
    })
    .boxed()
}

fn recipient() -> BoxedStrategy<String> {
    prop_oneof![
        select(&["$result", "$draft"][..]).prop_map(str::to_owned),
        proptest::collection::vec(expression(), 1..3)
            .prop_map(|indices| format!("items[{}]", indices.join(", "))),
    ]
    .boxed()
}

/// `matching <pattern> do <procedure>` one or more times.
fn match_blocks(procedure: BoxedStrategy<String>) -> BoxedStrategy<String> {
    proptest::collection::vec((expression(), procedure), 1..3)
        .prop_map(|blocks| {
            blocks
                .iter()
                .map(|(pattern, body)| format!(" matching {} do {}", pattern, body))
                .collect::<String>()
        })
        .boxed()
}

/// One of the eighteen main clauses.
fn clause(procedure: BoxedStrategy<String>) -> BoxedStrategy<String> {
    let valued = select(&["accept", "discard", "publish", "reject", "return", "throw"][..]);
    prop_oneof![
        (valued, expression())
            .prop_map(|(keyword, value)| format!("{} {}", keyword, value)),
        select(&["break loop", "continue loop"][..]).prop_map(str::to_owned),
        (recipient(), proptest::option::of(expression()), expression()).prop_map(
            |(recipient, level, moniker)| match level {
                Some(level) => {
                    format!("checkout {} at level {} from {}", recipient, level, moniker)
                }
                None => format!("checkout {} from {}", recipient, moniker),
            }
        ),
        (select(&["if", "while"][..]), expression(), procedure.clone())
            .prop_map(|(keyword, condition, body)| {
                format!("{} {} do {}", keyword, condition, body)
            }),
        (recipient(), select(ASSIGNMENTS), expression())
            .prop_map(|(recipient, op, value)| format!("let {} {} {}", recipient, op, value)),
        (
            select(&[("notarize", "as"), ("post", "to")][..]),
            expression(),
            expression()
        )
            .prop_map(|((keyword, joint), first, second)| {
                format!("{} {} {} {}", keyword, first, joint, second)
            }),
        (recipient(), expression())
            .prop_map(|(recipient, bag)| format!("retrieve {} from {}", recipient, bag)),
        (expression(), recipient())
            .prop_map(|(draft, recipient)| format!("save {} as {}", draft, recipient)),
        (expression(), match_blocks(procedure.clone()))
            .prop_map(|(target, blocks)| format!("select {}{}", target, blocks)),
        (expression(), procedure)
            .prop_map(|(sequence, body)| format!("with each $item in {} do {}", sequence, body)),
    ]
    .boxed()
}

fn statement(procedure: BoxedStrategy<String>) -> BoxedStrategy<String> {
    (clause(procedure.clone()), proptest::option::of(match_blocks(procedure)))
        .prop_map(|(clause, on)| match on {
            Some(blocks) => format!("{} on $failure{}", clause, blocks),
            None => clause,
        })
        .boxed()
}

/// A statement on its own line, possibly annotated or carrying a trailing
/// note, or a blank line.
fn statement_line(statement: BoxedStrategy<String>) -> BoxedStrategy<String> {
    prop_oneof![
        1 => Just(String::new()),
        4 => (
            proptest::option::of(select(ANNOTATIONS)),
            statement,
            proptest::bool::ANY
        )
            .prop_map(|(annotation, statement, noted)| {
                let mut line = String::new();
                if let Some(annotation) = annotation {
                    line.push_str(annotation);
                    line.push('\n');
                }
                line.push_str(&statement);
                if noted {
                    line.push_str(" ! done");
                }
                line
            }),
    ]
    .boxed()
}

/// Source text for an arbitrary procedure, inline or one statement per
/// line.
fn procedure() -> impl Strategy<Value = String> {
    let leaf = select(&["{ }", "{break loop}", "{return count}"][..]).prop_map(str::to_owned);
    leaf.prop_recursive(3, 12, 4, |inner| {
        let statement = statement(inner);
        prop_oneof![
            proptest::collection::vec(statement.clone(), 1..4)
                .prop_map(|statements| format!("{{{}}}", statements.join("; "))),
            proptest::collection::vec(statement_line(statement), 0..5)
                .prop_map(|lines| format!("{{\n{}\n}}", lines.join("\n"))),
        ]
    })
}

fn assert_document_round_trips(source: &str) -> Result<(), TestCaseError> {
    let document = format!("{}\n", source);
    let parsed = parse_document(document.as_bytes())
        .map_err(|e| TestCaseError::fail(format!("{}\n{}", document, e)))?;
    let formatted = format(&parsed);
    let reparsed = parse_document(formatted.as_bytes())
        .map_err(|e| TestCaseError::fail(format!("{}\n{}", formatted, e)))?;
    prop_assert_eq!(&reparsed, &parsed);
    prop_assert_eq!(format(&reparsed), formatted);
    Ok(())
}

proptest! {
    #[test]
    fn canonical_procedures_reparse_to_the_same_tree(source in procedure()) {
        assert_document_round_trips(&source)?;
    }

    #[test]
    fn canonical_expressions_reparse_to_the_same_tree(source in expression()) {
        let parsed = parse_expression(&source)
            .map_err(|e| TestCaseError::fail(format!("{}\n{}", source, e)))?;
        let formatted = format_expression(&parsed);
        let reparsed = parse_expression(&formatted)
            .map_err(|e| TestCaseError::fail(format!("{}\n{}", formatted, e)))?;
        prop_assert_eq!(&reparsed, &parsed);
        prop_assert_eq!(format_expression(&reparsed), formatted);
    }

    #[test]
    fn canonical_form_reparses_to_the_same_tree(source in component()) {
        let document = format!("{}\n", source);
        let parsed = parse_document(document.as_bytes())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let formatted = format(&parsed);
        let reparsed = parse_document(formatted.as_bytes())
            .map_err(|e| TestCaseError::fail(format!("{}\n{}", formatted, e)))?;
        prop_assert_eq!(&reparsed, &parsed);
        prop_assert_eq!(format(&reparsed), formatted);
    }

    #[test]
    fn interval_size_matches_its_members(
        first in -1000i64..1000,
        span in -2i64..50,
        extent in proptest::sample::select(&[
            Extent::Inclusive,
            Extent::Left,
            Extent::Right,
            Extent::Exclusive,
        ][..]),
    ) {
        let last = first + span;
        let excluded = i64::from(!extent.includes_first()) + i64::from(!extent.includes_last());
        let expected = last - first + 1 - excluded;
        match Interval::from_integers(first, extent, last) {
            Ok(interval) => {
                prop_assert!(expected >= 0);
                prop_assert_eq!(interval.get_size(), expected as u64);
                prop_assert_eq!(interval.members().count() as u64, interval.get_size());
            }
            Err(StructureError::NegativeSize { .. }) => prop_assert!(expected < 0),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
