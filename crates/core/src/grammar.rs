//! The BDN grammar, rule by rule.
//!
//! The table is descriptive only: the parser quotes it in diagnostics. The
//! alternative lists below are shared with the parser, which walks them in
//! the order given, so the table and the parser cannot drift apart on trial
//! order.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const DOCUMENT: &str = "$document";
pub const COMPONENT: &str = "$component";
pub const ENTITY: &str = "$entity";
pub const ELEMENT: &str = "$element";
pub const STRING: &str = "$string";
pub const PRIMITIVE: &str = "$primitive";
pub const CONTEXT: &str = "$context";
pub const PARAMETERS: &str = "$parameters";
pub const PARAMETER: &str = "$parameter";
pub const NOTE: &str = "$note";
pub const RANGE: &str = "$range";
pub const COLLECTION: &str = "$collection";
pub const MAPPING: &str = "$mapping";
pub const ASSOCIATION: &str = "$association";
pub const KEY: &str = "$key";
pub const SERIES: &str = "$series";
pub const PROCEDURE: &str = "$procedure";
pub const STATEMENTS: &str = "$statements";
pub const STATEMENT: &str = "$statement";
pub const ANNOTATION: &str = "$annotation";
pub const MAIN_CLAUSE: &str = "$mainClause";
pub const ON_CLAUSE: &str = "$onClause";
pub const MATCH_BLOCK: &str = "$matchBlock";
pub const ACCEPT_CLAUSE: &str = "$acceptClause";
pub const BREAK_CLAUSE: &str = "$breakClause";
pub const CHECKOUT_CLAUSE: &str = "$checkoutClause";
pub const CONTINUE_CLAUSE: &str = "$continueClause";
pub const DISCARD_CLAUSE: &str = "$discardClause";
pub const IF_CLAUSE: &str = "$ifClause";
pub const LET_CLAUSE: &str = "$letClause";
pub const NOTARIZE_CLAUSE: &str = "$notarizeClause";
pub const POST_CLAUSE: &str = "$postClause";
pub const PUBLISH_CLAUSE: &str = "$publishClause";
pub const REJECT_CLAUSE: &str = "$rejectClause";
pub const RETRIEVE_CLAUSE: &str = "$retrieveClause";
pub const RETURN_CLAUSE: &str = "$returnClause";
pub const SAVE_CLAUSE: &str = "$saveClause";
pub const SELECT_CLAUSE: &str = "$selectClause";
pub const THROW_CLAUSE: &str = "$throwClause";
pub const WHILE_CLAUSE: &str = "$whileClause";
pub const WITH_CLAUSE: &str = "$withClause";
pub const RECIPIENT: &str = "$recipient";
pub const ATTRIBUTE: &str = "$attribute";
pub const INDICES: &str = "$indices";
pub const ASSIGNMENT: &str = "$assignment";
pub const EXPRESSION: &str = "$expression";
pub const PRIMARY: &str = "$primary";
pub const OPERAND: &str = "$operand";
pub const CONTINUATION: &str = "$continuation";
pub const INTRINSIC: &str = "$intrinsic";
pub const ARGUMENTS: &str = "$arguments";
pub const VARIABLE: &str = "$variable";
pub const PRECEDENCE: &str = "$precedence";
pub const DEREFERENCE: &str = "$dereference";
pub const INVERSION: &str = "$inversion";
pub const MAGNITUDE: &str = "$magnitude";
pub const COMPLEMENT: &str = "$complement";
pub const INVOCATION: &str = "$invocation";
pub const SUBCOMPONENT: &str = "$subcomponent";
pub const CHAINING: &str = "$chaining";
pub const EXPONENTIAL: &str = "$exponential";
pub const ARITHMETIC: &str = "$arithmetic";
pub const COMPARISON: &str = "$comparison";
pub const LOGICAL: &str = "$logical";

/// Alternatives of `$entity`, in trial order.
pub const ENTITY_FORMS: &[&str] = &[ELEMENT, STRING, RANGE, COLLECTION, PROCEDURE];

/// Alternatives of `$primary`, in trial order.
pub const PRIMARY_FORMS: &[&str] = &[
    COMPONENT,
    INTRINSIC,
    VARIABLE,
    PRECEDENCE,
    DEREFERENCE,
    INVERSION,
    MAGNITUDE,
    COMPLEMENT,
];

/// Alternatives of `$continuation`, in trial order.
pub const CONTINUATIONS: &[&str] = &[
    INVOCATION,
    SUBCOMPONENT,
    CHAINING,
    EXPONENTIAL,
    ARITHMETIC,
    COMPARISON,
    LOGICAL,
];

/// Alternatives of `$mainClause`, in trial order.
pub const MAIN_CLAUSES: &[&str] = &[
    IF_CLAUSE,
    SELECT_CLAUSE,
    WITH_CLAUSE,
    WHILE_CLAUSE,
    CONTINUE_CLAUSE,
    BREAK_CLAUSE,
    RETURN_CLAUSE,
    THROW_CLAUSE,
    SAVE_CLAUSE,
    DISCARD_CLAUSE,
    NOTARIZE_CLAUSE,
    CHECKOUT_CLAUSE,
    PUBLISH_CLAUSE,
    POST_CLAUSE,
    RETRIEVE_CLAUSE,
    ACCEPT_CLAUSE,
    REJECT_CLAUSE,
    LET_CLAUSE,
];

/// Every rule with its definition, in reading order.
pub const GRAMMAR: &[(&str, &str)] = &[
    (DOCUMENT, "component EOL EOF"),
    (COMPONENT, "entity context? note?"),
    (ENTITY, "element | string | range | collection | procedure"),
    (
        ELEMENT,
        "ANGLE | BOOLEAN | DURATION | MOMENT | NUMBER | PATTERN | PERCENTAGE | PROBABILITY | RESOURCE",
    ),
    (
        STRING,
        "BINARY | BYTECODE | NAME | NARRATIVE | QUOTE | SYMBOL | TAG | VERSION",
    ),
    (PRIMITIVE, "element | string"),
    (CONTEXT, "\"(\" parameters \")\""),
    (
        PARAMETERS,
        "parameter (\",\" parameter)* | EOL (parameter EOL)+",
    ),
    (PARAMETER, "SYMBOL \":\" component"),
    (NOTE, "NOTE"),
    (
        RANGE,
        "(\"[\" | \"(\") primitive \"..\" primitive (\"]\" | \")\")",
    ),
    (COLLECTION, "\"[\" (mapping | series) \"]\""),
    (
        MAPPING,
        "\":\" | association (\",\" association)* | EOL (association EOL)+",
    ),
    (ASSOCIATION, "key \":\" component"),
    (KEY, "primitive | IDENTIFIER"),
    (
        SERIES,
        "component (\",\" component)* | EOL (component EOL)* | ! no components",
    ),
    (PROCEDURE, "\"{\" statements \"}\""),
    (
        STATEMENTS,
        "statement (\";\" statement)* | EOL (statement? EOL)* | ! no statements",
    ),
    (STATEMENT, "annotation? mainClause onClause? note?"),
    (ANNOTATION, "(NOTE | COMMENT) EOL"),
    (
        MAIN_CLAUSE,
        "ifClause | selectClause | withClause | whileClause | continueClause | breakClause | returnClause | throwClause | saveClause | discardClause | notarizeClause | checkoutClause | publishClause | postClause | retrieveClause | acceptClause | rejectClause | letClause",
    ),
    (ON_CLAUSE, "\"on\" SYMBOL matchBlock+"),
    (MATCH_BLOCK, "\"matching\" expression \"do\" procedure"),
    (ACCEPT_CLAUSE, "\"accept\" expression"),
    (BREAK_CLAUSE, "\"break\" \"loop\""),
    (
        CHECKOUT_CLAUSE,
        "\"checkout\" recipient (\"at\" \"level\" expression)? \"from\" expression",
    ),
    (CONTINUE_CLAUSE, "\"continue\" \"loop\""),
    (DISCARD_CLAUSE, "\"discard\" expression"),
    (IF_CLAUSE, "\"if\" expression \"do\" procedure"),
    (LET_CLAUSE, "\"let\" recipient assignment expression"),
    (NOTARIZE_CLAUSE, "\"notarize\" expression \"as\" expression"),
    (POST_CLAUSE, "\"post\" expression \"to\" expression"),
    (PUBLISH_CLAUSE, "\"publish\" expression"),
    (REJECT_CLAUSE, "\"reject\" expression"),
    (RETRIEVE_CLAUSE, "\"retrieve\" recipient \"from\" expression"),
    (RETURN_CLAUSE, "\"return\" expression"),
    (SAVE_CLAUSE, "\"save\" expression \"as\" recipient"),
    (SELECT_CLAUSE, "\"select\" expression matchBlock+"),
    (THROW_CLAUSE, "\"throw\" expression"),
    (WHILE_CLAUSE, "\"while\" expression \"do\" procedure"),
    (
        WITH_CLAUSE,
        "\"with\" \"each\" SYMBOL \"in\" expression \"do\" procedure",
    ),
    (RECIPIENT, "SYMBOL | attribute"),
    (ATTRIBUTE, "IDENTIFIER \"[\" indices \"]\""),
    (INDICES, "expression (\",\" expression)*"),
    (
        ASSIGNMENT,
        "\":=\" | \"?=\" | \"+=\" | \"-=\" | \"*=\" | \"/=\"",
    ),
    (EXPRESSION, "primary continuation*"),
    (
        PRIMARY,
        "component | intrinsic | variable | precedence | dereference | inversion | magnitude | complement",
    ),
    (OPERAND, "primary (invocation | subcomponent)*"),
    (
        CONTINUATION,
        "invocation | subcomponent | chaining | exponential | arithmetic | comparison | logical",
    ),
    (INTRINSIC, "INTRINSIC \"(\" arguments? \")\""),
    (ARGUMENTS, "expression (\",\" expression)*"),
    (VARIABLE, "IDENTIFIER"),
    (PRECEDENCE, "\"(\" expression \")\""),
    (DEREFERENCE, "\"@\" operand"),
    (INVERSION, "(\"-\" | \"/\" | \"*\") operand"),
    (MAGNITUDE, "\"|\" expression \"|\""),
    (COMPLEMENT, "\"NOT\" operand"),
    (
        INVOCATION,
        "expression (\".\" | \"<-\") IDENTIFIER \"(\" arguments? \")\"",
    ),
    (SUBCOMPONENT, "expression \"[\" indices \"]\""),
    (CHAINING, "expression \"&\" operand"),
    (EXPONENTIAL, "expression \"^\" operand"),
    (
        ARITHMETIC,
        "expression (\"*\" | \"/\" | \"//\" | \"+\" | \"-\") operand",
    ),
    (
        COMPARISON,
        "expression (\"<\" | \"=\" | \">\" | \"IS\" | \"MATCHES\") operand",
    ),
    (
        LOGICAL,
        "expression (\"AND\" | \"SANS\" | \"XOR\" | \"OR\") operand",
    ),
];

static DEFINITIONS: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| GRAMMAR.iter().copied().collect());

/// The definition of a rule, if the rule exists.
pub fn definition(rule: &str) -> Option<&'static str> {
    DEFINITIONS.get(rule).copied()
}

/// The rule name as it appears inside definitions (`$ifClause` -> `ifClause`).
pub fn bare(rule: &str) -> &str {
    rule.trim_start_matches('$')
}

/// The top-level alternatives of a definition, split on `|`.
pub fn alternatives(rule: &str) -> Vec<&'static str> {
    definition(rule)
        .map(|d| d.split('|').map(str::trim).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_sync(rule: &str, order: &[&str]) {
        let listed: Vec<&str> = order.iter().map(|r| bare(r)).collect();
        assert_eq!(alternatives(rule), listed, "{} drifted", rule);
    }

    #[test]
    fn alternative_lists_match_the_table() {
        assert_in_sync(ENTITY, ENTITY_FORMS);
        assert_in_sync(PRIMARY, PRIMARY_FORMS);
        assert_in_sync(CONTINUATION, CONTINUATIONS);
        assert_in_sync(MAIN_CLAUSE, MAIN_CLAUSES);
    }

    #[test]
    fn every_rule_is_defined_once() {
        let mut seen = std::collections::HashSet::new();
        for (name, definition) in GRAMMAR {
            assert!(name.starts_with('$'), "{} lacks its sigil", name);
            assert!(!definition.is_empty());
            assert!(seen.insert(*name), "{} defined twice", name);
        }
    }

    #[test]
    fn lowercase_references_name_defined_rules() {
        for (name, definition) in GRAMMAR {
            for word in definition
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|w| w.chars().next().is_some_and(|c| c.is_ascii_lowercase()))
            {
                let inside_quotes = definition.contains(&format!("\"{}\"", word));
                let in_comment = definition
                    .split_once('!')
                    .is_some_and(|(_, c)| c.contains(word));
                if inside_quotes || in_comment {
                    continue;
                }
                assert!(
                    definition_exists(word),
                    "{} refers to undefined rule {}",
                    name,
                    word
                );
            }
        }
    }

    fn definition_exists(word: &str) -> bool {
        definition(&format!("${}", word)).is_some()
    }

    #[test]
    fn unknown_rules_have_no_definition() {
        assert!(definition("$nonsense").is_none());
        assert!(alternatives("$nonsense").is_empty());
    }
}
