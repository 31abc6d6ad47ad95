//! Canonical BDN rendering.
//!
//! The output is deterministic and re-parses to an equal tree. Containers
//! lay out by entry count: none renders the empty form, one stays on the
//! line it opened on, and two or more go one per indented line. A single
//! entry that ends in a note, or a lone statement carrying an annotation,
//! is laid out as if it had company since a note runs to the end of the
//! line.

use crate::ast::{
    Annotation, Clause, Collection, Component, Context, Element, Entity, Expression, Key,
    MatchBlock, Primitive, Procedure, Range, Recipient, Statement, StringValue,
};
use crate::collections::Cursor;

const INDENT: &str = "    ";

/// Render a component as a complete document, terminating EOL included.
pub fn format(component: &Component) -> String {
    let mut f = Formatter::default();
    f.component(component);
    f.out.push('\n');
    f.out
}

/// Render a component without the document terminator.
pub fn format_component(component: &Component) -> String {
    let mut f = Formatter::default();
    f.component(component);
    f.out
}

pub fn format_entity(entity: &Entity) -> String {
    let mut f = Formatter::default();
    f.entity(entity);
    f.out
}

pub fn format_expression(expression: &Expression) -> String {
    let mut f = Formatter::default();
    f.expression(expression);
    f.out
}

pub fn format_procedure(procedure: &Procedure) -> String {
    let mut f = Formatter::default();
    f.procedure(procedure);
    f.out
}

#[derive(Default)]
struct Formatter {
    out: String,
    depth: usize,
}

impl Formatter {
    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.out.push('\n');
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
    }

    /// Text that opens with `.`, kept apart from a preceding `1.` so the
    /// two do not scan as one run of dots.
    fn dotted(&mut self, text: &str) {
        if self.out.ends_with('.') {
            self.out.push(' ');
        }
        self.text(text);
    }

    /// Drop the indentation written for a line that stays empty.
    fn blank_line(&mut self) {
        let kept = self.out.trim_end_matches(' ').len();
        self.out.truncate(kept);
    }

    fn block<T>(
        &mut self,
        (open, close): (&str, &str),
        empty: &str,
        entries: &[T],
        single_inline: bool,
        mut entry: impl FnMut(&mut Self, &T),
    ) {
        match entries {
            [] => self.text(empty),
            [only] if single_inline => {
                self.text(open);
                entry(self, only);
                self.text(close);
            }
            _ => {
                self.text(open);
                self.depth += 1;
                let mut cursor = Cursor::new(entries);
                while let Some(item) = cursor.get_next() {
                    self.newline();
                    entry(self, item);
                }
                self.depth -= 1;
                self.newline();
                self.text(close);
            }
        }
    }

    // -- Components ---------------------------------------------

    fn component(&mut self, component: &Component) {
        self.entity(&component.entity);
        if let Some(context) = &component.context {
            self.context(context);
        }
        if let Some(note) = &component.note {
            self.text(" ");
            self.text(note.as_str());
        }
    }

    fn context(&mut self, context: &Context) {
        let parameters = context.parameters();
        let inline = !parameters.iter().any(|(_, value)| component_ends_in_note(value));
        self.block(("(", ")"), "", parameters, inline, |f, (symbol, value)| {
            f.text(symbol.as_str());
            f.text(": ");
            f.component(value);
        });
    }

    fn entity(&mut self, entity: &Entity) {
        match entity {
            Entity::Element(element) => self.element(element),
            Entity::String(string) => self.string(string),
            Entity::Range(range) => self.range(range),
            Entity::Collection(collection) => self.collection(collection),
            Entity::Procedure(procedure) => self.procedure(procedure),
        }
    }

    fn element(&mut self, element: &Element) {
        self.text(element.as_str());
    }

    fn string(&mut self, string: &StringValue) {
        self.text(string.as_str());
    }

    fn primitive(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Element(element) => self.element(element),
            Primitive::String(string) => self.string(string),
        }
    }

    fn range(&mut self, range: &Range) {
        let (open, close) = range.extent().brackets();
        self.text(open);
        self.primitive(range.first());
        self.dotted("..");
        self.primitive(range.last());
        self.text(close);
    }

    fn collection(&mut self, collection: &Collection) {
        match collection {
            Collection::Catalog(catalog) => {
                let entries = catalog.entries();
                let inline = !entries.iter().any(|(_, value)| component_ends_in_note(value));
                self.block(("[", "]"), "[:]", entries, inline, |f, (key, value)| {
                    f.key(key);
                    f.text(": ");
                    f.component(value);
                });
            }
            Collection::List(items) | Collection::Queue(items) | Collection::Stack(items) => {
                self.series(items)
            }
            Collection::Set(set) => self.series(set.members()),
        }
    }

    fn series(&mut self, items: &[Component]) {
        let inline = !items.iter().any(component_ends_in_note);
        self.block(("[", "]"), "[ ]", items, inline, |f, item| f.component(item));
    }

    fn key(&mut self, key: &Key) {
        match key {
            Key::Primitive(primitive) => self.primitive(primitive),
            Key::Identifier(name) => self.text(name),
        }
    }

    // -- Procedures ---------------------------------------------

    fn procedure(&mut self, procedure: &Procedure) {
        let inline = match procedure.statements.as_slice() {
            [Some(statement)] => {
                statement.annotation.is_none() && !statement_ends_in_note(statement)
            }
            _ => false,
        };
        self.block(
            ("{", "}"),
            "{ }",
            &procedure.statements,
            inline,
            |f, entry| match entry {
                Some(statement) => f.statement(statement),
                None => f.blank_line(),
            },
        );
    }

    fn statement(&mut self, statement: &Statement) {
        if let Some(annotation) = &statement.annotation {
            match annotation {
                Annotation::Note(note) => self.text(note.as_str()),
                Annotation::Comment(comment) => self.text(comment.as_str()),
            }
            self.newline();
        }
        self.clause(&statement.main_clause);
        if let Some(on) = &statement.on_clause {
            self.text(" on ");
            self.text(on.failure().as_str());
            self.match_blocks(on.blocks());
        }
        if let Some(note) = &statement.note {
            self.text(" ");
            self.text(note.as_str());
        }
    }

    fn match_blocks(&mut self, blocks: &[MatchBlock]) {
        for block in blocks {
            self.text(" matching ");
            self.expression(&block.pattern);
            self.text(" do ");
            self.procedure(&block.procedure);
        }
    }

    fn clause(&mut self, clause: &Clause) {
        self.text(clause.keyword());
        match clause {
            Clause::Accept { message: value }
            | Clause::Discard { draft: value }
            | Clause::Publish { event: value }
            | Clause::Reject { message: value }
            | Clause::Return { result: value }
            | Clause::Throw { exception: value } => {
                self.text(" ");
                self.expression(value);
            }
            Clause::Break | Clause::Continue => self.text(" loop"),
            Clause::Checkout {
                recipient,
                level,
                moniker,
            } => {
                self.text(" ");
                self.recipient(recipient);
                if let Some(level) = level {
                    self.text(" at level ");
                    self.expression(level);
                }
                self.text(" from ");
                self.expression(moniker);
            }
            Clause::If {
                condition,
                procedure,
            }
            | Clause::While {
                condition,
                procedure,
            } => {
                self.text(" ");
                self.expression(condition);
                self.text(" do ");
                self.procedure(procedure);
            }
            Clause::Let {
                recipient,
                operator,
                expression,
            } => {
                self.text(" ");
                self.recipient(recipient);
                self.text(" ");
                self.text(operator.as_str());
                self.text(" ");
                self.expression(expression);
            }
            Clause::Notarize { draft, moniker } => {
                self.text(" ");
                self.expression(draft);
                self.text(" as ");
                self.expression(moniker);
            }
            Clause::Post { message, bag } => {
                self.text(" ");
                self.expression(message);
                self.text(" to ");
                self.expression(bag);
            }
            Clause::Retrieve { recipient, bag } => {
                self.text(" ");
                self.recipient(recipient);
                self.text(" from ");
                self.expression(bag);
            }
            Clause::Save { draft, recipient } => {
                self.text(" ");
                self.expression(draft);
                self.text(" as ");
                self.recipient(recipient);
            }
            Clause::Select(select) => {
                self.text(" ");
                self.expression(select.target());
                self.match_blocks(select.blocks());
            }
            Clause::With {
                item,
                sequence,
                procedure,
            } => {
                self.text(" each ");
                self.text(item.as_str());
                self.text(" in ");
                self.expression(sequence);
                self.text(" do ");
                self.procedure(procedure);
            }
        }
    }

    fn recipient(&mut self, recipient: &Recipient) {
        match recipient {
            Recipient::Symbol(symbol) => self.text(symbol.as_str()),
            Recipient::Attribute(attribute) => {
                self.text(attribute.variable());
                self.text("[");
                self.list(attribute.indices());
                self.text("]");
            }
        }
    }

    // -- Expressions --------------------------------------------

    fn expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Component(component) => self.component(component),
            Expression::Intrinsic {
                function,
                arguments,
            } => {
                self.text(function);
                self.text("(");
                self.list(arguments);
                self.text(")");
            }
            Expression::Variable(name) => self.text(name),
            Expression::Precedence(inner) => {
                self.text("(");
                self.expression(inner);
                self.text(")");
            }
            Expression::Dereference(operand) => {
                self.text("@");
                self.expression(operand);
            }
            Expression::Invocation {
                target,
                operator,
                method,
                arguments,
            } => {
                self.expression(target);
                self.dotted(operator.as_str());
                self.text(method);
                self.text("(");
                self.list(arguments);
                self.text(")");
            }
            Expression::Subcomponent(subcomponent) => {
                self.expression(subcomponent.composite());
                self.text("[");
                self.list(subcomponent.indices());
                self.text("]");
            }
            Expression::Chaining(binary)
            | Expression::Exponential(binary)
            | Expression::Arithmetic(binary)
            | Expression::Comparison(binary)
            | Expression::Logical(binary) => {
                self.expression(&binary.left);
                self.text(" ");
                self.text(binary.operator.as_str());
                self.text(" ");
                self.expression(&binary.right);
            }
            Expression::Inversion { operator, operand } => {
                self.text(operator.as_str());
                let start = self.out.len();
                self.expression(operand);
                if self.out[start..].chars().next().is_some_and(fuses) {
                    self.out.insert(start, ' ');
                }
            }
            Expression::Magnitude(inner) => {
                self.text("|");
                self.expression(inner);
                self.text("|");
            }
            Expression::Complement(operand) => {
                self.text("NOT ");
                self.expression(operand);
            }
        }
    }

    fn list(&mut self, expressions: &[Expression]) {
        for (index, expression) in expressions.iter().enumerate() {
            if index > 0 {
                self.text(", ");
            }
            self.expression(expression);
        }
    }
}

/// Would this character merge with a preceding `-`, `/` or `*` into a
/// different token?
fn fuses(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '/' || !c.is_ascii()
}

fn component_ends_in_note(component: &Component) -> bool {
    component.note.is_some()
}

fn statement_ends_in_note(statement: &Statement) -> bool {
    statement.note.is_some()
        || (statement.on_clause.is_none() && clause_ends_in_note(&statement.main_clause))
}

fn clause_ends_in_note(clause: &Clause) -> bool {
    match clause {
        Clause::Accept { message: last }
        | Clause::Discard { draft: last }
        | Clause::Publish { event: last }
        | Clause::Reject { message: last }
        | Clause::Return { result: last }
        | Clause::Throw { exception: last }
        | Clause::Checkout { moniker: last, .. }
        | Clause::Let {
            expression: last, ..
        }
        | Clause::Notarize { moniker: last, .. }
        | Clause::Post { bag: last, .. }
        | Clause::Retrieve { bag: last, .. } => expression_ends_in_note(last),
        _ => false,
    }
}

fn expression_ends_in_note(expression: &Expression) -> bool {
    match expression {
        Expression::Component(component) => component_ends_in_note(component),
        Expression::Chaining(binary)
        | Expression::Exponential(binary)
        | Expression::Arithmetic(binary)
        | Expression::Comparison(binary)
        | Expression::Logical(binary) => expression_ends_in_note(&binary.right),
        Expression::Dereference(operand)
        | Expression::Complement(operand)
        | Expression::Inversion { operand, .. } => expression_ends_in_note(operand),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Binary, Extent, Interval, Operator};
    use crate::values::{Note, Number, Probability, Quote};

    fn number(value: i64) -> Component {
        Component::new(Element::Number(Number::from_integer(value)))
    }

    #[test]
    fn layout_by_entry_count() {
        let empty = Component::new(Collection::List(vec![]));
        assert_eq!(format_component(&empty), "[ ]");
        let one = Component::new(Collection::List(vec![number(1)]));
        assert_eq!(format_component(&one), "[1]");
        let two = Component::new(Collection::List(vec![number(1), number(2)]));
        assert_eq!(format_component(&two), "[\n    1\n    2\n]");
        let catalog = Component::new(Collection::Catalog(Default::default()));
        assert_eq!(format_component(&catalog), "[:]");
        assert_eq!(format_procedure(&Procedure::default()), "{ }");
    }

    #[test]
    fn nested_blocks_indent_by_depth() {
        let inner = Component::new(Collection::List(vec![number(1), number(2)]));
        let outer = Component::new(Collection::List(vec![number(0), inner]));
        assert_eq!(
            format(&outer),
            "[\n    0\n    [\n        1\n        2\n    ]\n]\n"
        );
    }

    #[test]
    fn single_entry_ending_in_a_note_goes_multiline() {
        let noted = number(1).with_note(Note::from_token("! one").unwrap());
        let list = Component::new(Collection::List(vec![noted]));
        assert_eq!(format_component(&list), "[\n    1 ! one\n]");
    }

    #[test]
    fn ranges_render_their_brackets() {
        let interval = Interval::from_integers(3, Extent::Right, 7).unwrap();
        let component = Component::new(Entity::Range(Range::Interval(interval)));
        assert_eq!(format_component(&component), "(3..7]");
    }

    #[test]
    fn probability_one_is_kept_apart_from_following_dots() {
        let one = || Element::Probability(Probability::from_token("1.").unwrap());
        let range = Range::new(one().into(), Extent::Inclusive, one().into()).unwrap();
        assert_eq!(format_component(&Component::new(range)), "[1. ..1.]");

        let call = Expression::Invocation {
            target: Box::new(Expression::component(Component::new(one()))),
            operator: Operator::Dot,
            method: "close".to_owned(),
            arguments: vec![],
        };
        assert_eq!(format_expression(&call), "1. .close()");
    }

    #[test]
    fn blank_statement_lines_have_no_indentation() {
        let procedure = Procedure::new(vec![
            Some(Statement::new(Clause::Break)),
            None,
            Some(Statement::new(Clause::Continue)),
        ]);
        assert_eq!(
            format_procedure(&procedure),
            "{\n    break loop\n\n    continue loop\n}"
        );
    }

    #[test]
    fn inversion_spaces_only_when_tokens_would_fuse() {
        let minus_number = Expression::Inversion {
            operator: Operator::Minus,
            operand: Box::new(Expression::component(number(5))),
        };
        assert_eq!(format_expression(&minus_number), "- 5");
        let reciprocal = Expression::Inversion {
            operator: Operator::Slash,
            operand: Box::new(Expression::variable("x")),
        };
        assert_eq!(format_expression(&reciprocal), "/ x");
        let negated_group = Expression::Inversion {
            operator: Operator::Minus,
            operand: Box::new(Expression::Precedence(Box::new(Expression::variable("x")))),
        };
        assert_eq!(format_expression(&negated_group), "-(x)");
    }

    #[test]
    fn binary_expressions_are_spaced() {
        let quote = Component::new(StringValue::Quote(Quote::from_token("\"a\"").unwrap()));
        let chain = Expression::Chaining(Binary::new(
            Expression::component(quote),
            Operator::Chain,
            Expression::variable("b"),
        ));
        assert_eq!(format_expression(&chain), "\"a\" & b");
    }
}
