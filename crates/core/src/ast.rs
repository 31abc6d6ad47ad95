//! The component model: the typed tree produced by the parser and read by
//! the formatter.
//!
//! Every node exclusively owns its children and is never mutated after it
//! is built. Nodes whose shape carries an invariant (ranges, select and on
//! clauses, attributes, subcomponents) keep their fields private and are
//! built through constructors that return [`StructureError`].

use crate::collections::{Cursor, OrderedMap, Set};
use crate::error::StructureError;
use crate::values::{
    Angle, Binary as BinaryString, Boolean, Bytecode, Comment, Duration, Moment, Moniker, Narrative, Note, Number,
    Pattern, Percentage, Probability, Quote, Resource, Symbol, Tag, Version,
};
use serde::Serialize;
use std::fmt;

// ──────────────────────────────────────────────
// Components
// ──────────────────────────────────────────────

/// An entity with its optional parameter context and trailing note.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub entity: Entity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
}

impl Component {
    pub fn new(entity: impl Into<Entity>) -> Self {
        Component {
            entity: entity.into(),
            context: None,
            note: None,
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }

    /// The value of a context parameter, looked up by name without `$`.
    pub fn parameter(&self, name: &str) -> Option<&Component> {
        self.context.as_ref()?.get(name)
    }
}

/// Type and shape parameters: `($type: /bali/collections/Set/v1)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Context {
    parameters: OrderedMap<Symbol, Component>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol, value: Component) -> Option<Component> {
        self.parameters.insert(symbol, value)
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.parameters
            .entries()
            .iter()
            .find(|(symbol, _)| symbol.name() == name)
            .map(|(_, value)| value)
    }

    pub fn parameters(&self) -> &[(Symbol, Component)] {
        self.parameters.entries()
    }

    pub fn cursor(&self) -> Cursor<'_, (Symbol, Component)> {
        self.parameters.cursor()
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

impl FromIterator<(Symbol, Component)> for Context {
    fn from_iter<I: IntoIterator<Item = (Symbol, Component)>>(iter: I) -> Self {
        Context {
            parameters: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Element(Element),
    String(StringValue),
    Range(Range),
    Collection(Collection),
    Procedure(Procedure),
}

impl From<Element> for Entity {
    fn from(element: Element) -> Self {
        Entity::Element(element)
    }
}

impl From<StringValue> for Entity {
    fn from(string: StringValue) -> Self {
        Entity::String(string)
    }
}

impl From<Primitive> for Entity {
    fn from(primitive: Primitive) -> Self {
        match primitive {
            Primitive::Element(element) => Entity::Element(element),
            Primitive::String(string) => Entity::String(string),
        }
    }
}

impl From<Range> for Entity {
    fn from(range: Range) -> Self {
        Entity::Range(range)
    }
}

impl From<Collection> for Entity {
    fn from(collection: Collection) -> Self {
        Entity::Collection(collection)
    }
}

impl From<Procedure> for Entity {
    fn from(procedure: Procedure) -> Self {
        Entity::Procedure(procedure)
    }
}

// ──────────────────────────────────────────────
// Primitives
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Angle(Angle),
    Boolean(Boolean),
    Duration(Duration),
    Moment(Moment),
    Number(Number),
    Pattern(Pattern),
    Percentage(Percentage),
    Probability(Probability),
    Resource(Resource),
}

impl Element {
    pub fn as_str(&self) -> &str {
        match self {
            Element::Angle(v) => v.as_str(),
            Element::Boolean(v) => v.as_str(),
            Element::Duration(v) => v.as_str(),
            Element::Moment(v) => v.as_str(),
            Element::Number(v) => v.as_str(),
            Element::Pattern(v) => v.as_str(),
            Element::Percentage(v) => v.as_str(),
            Element::Probability(v) => v.as_str(),
            Element::Resource(v) => v.as_str(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Element::Angle(_) => "Angle",
            Element::Boolean(_) => "Boolean",
            Element::Duration(_) => "Duration",
            Element::Moment(_) => "Moment",
            Element::Number(_) => "Number",
            Element::Pattern(_) => "Pattern",
            Element::Percentage(_) => "Percentage",
            Element::Probability(_) => "Probability",
            Element::Resource(_) => "Resource",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StringValue {
    Binary(BinaryString),
    Bytecode(Bytecode),
    Moniker(Moniker),
    Narrative(Narrative),
    Quote(Quote),
    Symbol(Symbol),
    Tag(Tag),
    Version(Version),
}

impl StringValue {
    pub fn as_str(&self) -> &str {
        match self {
            StringValue::Binary(v) => v.as_str(),
            StringValue::Bytecode(v) => v.as_str(),
            StringValue::Moniker(v) => v.as_str(),
            StringValue::Narrative(v) => v.as_str(),
            StringValue::Quote(v) => v.as_str(),
            StringValue::Symbol(v) => v.as_str(),
            StringValue::Tag(v) => v.as_str(),
            StringValue::Version(v) => v.as_str(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            StringValue::Binary(_) => "Binary",
            StringValue::Bytecode(_) => "Bytecode",
            StringValue::Moniker(_) => "Name",
            StringValue::Narrative(_) => "Narrative",
            StringValue::Quote(_) => "Quote",
            StringValue::Symbol(_) => "Symbol",
            StringValue::Tag(_) => "Tag",
            StringValue::Version(_) => "Version",
        }
    }
}

/// An element or a string: what may bound a range or key an association.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    Element(Element),
    String(StringValue),
}

impl Primitive {
    pub fn as_str(&self) -> &str {
        match self {
            Primitive::Element(element) => element.as_str(),
            Primitive::String(string) => string.as_str(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Element(element) => element.type_name(),
            Primitive::String(string) => string.type_name(),
        }
    }

    /// How the primitive orders its values, if it can bound a range.
    pub fn range_class(&self) -> Option<RangeClass> {
        match self {
            Primitive::Element(Element::Number(number)) if number.is_integral() => {
                Some(RangeClass::Discrete)
            }
            Primitive::Element(
                Element::Number(_)
                | Element::Angle(_)
                | Element::Duration(_)
                | Element::Moment(_)
                | Element::Percentage(_)
                | Element::Probability(_),
            ) => Some(RangeClass::Continuous),
            Primitive::String(
                StringValue::Quote(_)
                | StringValue::Symbol(_)
                | StringValue::Tag(_)
                | StringValue::Version(_)
                | StringValue::Moniker(_),
            ) => Some(RangeClass::Lexical),
            _ => None,
        }
    }

    fn describe(&self) -> String {
        match self.range_class() {
            Some(RangeClass::Discrete) => "integral Number".to_owned(),
            Some(RangeClass::Continuous) if self.type_name() == "Number" => {
                "real Number".to_owned()
            }
            _ => self.type_name().to_owned(),
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Element> for Primitive {
    fn from(element: Element) -> Self {
        Primitive::Element(element)
    }
}

impl From<StringValue> for Primitive {
    fn from(string: StringValue) -> Self {
        Primitive::String(string)
    }
}

// ──────────────────────────────────────────────
// Ranges
// ──────────────────────────────────────────────

/// Which endpoints belong to a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Extent {
    /// `[a..b]`
    Inclusive,
    /// `[a..b)`
    Left,
    /// `(a..b]`
    Right,
    /// `(a..b)`
    Exclusive,
}

impl Extent {
    pub fn from_brackets(open: &str, close: &str) -> Option<Extent> {
        match (open, close) {
            ("[", "]") => Some(Extent::Inclusive),
            ("[", ")") => Some(Extent::Left),
            ("(", "]") => Some(Extent::Right),
            ("(", ")") => Some(Extent::Exclusive),
            _ => None,
        }
    }

    pub fn brackets(self) -> (&'static str, &'static str) {
        match self {
            Extent::Inclusive => ("[", "]"),
            Extent::Left => ("[", ")"),
            Extent::Right => ("(", "]"),
            Extent::Exclusive => ("(", ")"),
        }
    }

    pub fn includes_first(self) -> bool {
        matches!(self, Extent::Inclusive | Extent::Left)
    }

    pub fn includes_last(self) -> bool {
        matches!(self, Extent::Inclusive | Extent::Right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeClass {
    Discrete,
    Continuous,
    Lexical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Range {
    Interval(Interval),
    Spectrum(Spectrum),
    Continuum(Continuum),
}

impl Range {
    /// Build the range kind that matches the class of the endpoints.
    pub fn new(first: Primitive, extent: Extent, last: Primitive) -> Result<Range, StructureError> {
        let class = first
            .range_class()
            .ok_or_else(|| StructureError::UnrangeableEndpoint(first.type_name().to_owned()))?;
        if first.type_name() != last.type_name() || last.range_class() != Some(class) {
            return Err(StructureError::MismatchedEndpoints {
                first: first.describe(),
                last: last.describe(),
            });
        }
        Ok(match class {
            RangeClass::Discrete => Range::Interval(Interval::new(first, extent, last)?),
            RangeClass::Continuous => Range::Continuum(Continuum {
                first,
                extent,
                last,
            }),
            RangeClass::Lexical => Range::Spectrum(Spectrum {
                first,
                extent,
                last,
            }),
        })
    }

    pub fn first(&self) -> &Primitive {
        match self {
            Range::Interval(r) => &r.first,
            Range::Spectrum(r) => &r.first,
            Range::Continuum(r) => &r.first,
        }
    }

    pub fn extent(&self) -> Extent {
        match self {
            Range::Interval(r) => r.extent,
            Range::Spectrum(r) => r.extent,
            Range::Continuum(r) => r.extent,
        }
    }

    pub fn last(&self) -> &Primitive {
        match self {
            Range::Interval(r) => &r.last,
            Range::Spectrum(r) => &r.last,
            Range::Continuum(r) => &r.last,
        }
    }

    pub fn class(&self) -> RangeClass {
        match self {
            Range::Interval(_) => RangeClass::Discrete,
            Range::Spectrum(_) => RangeClass::Lexical,
            Range::Continuum(_) => RangeClass::Continuous,
        }
    }
}

/// A range over integers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    first: Primitive,
    extent: Extent,
    last: Primitive,
    /// Lowest and highest member after applying the extent; `None` when
    /// the interval is empty.
    #[serde(skip)]
    members: Option<(i64, i64)>,
}

impl Interval {
    fn new(first: Primitive, extent: Extent, last: Primitive) -> Result<Interval, StructureError> {
        let (a, b) = match (&first, &last) {
            (
                Primitive::Element(Element::Number(a)),
                Primitive::Element(Element::Number(b)),
            ) => match (a.as_integer(), b.as_integer()) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    return Err(StructureError::MismatchedEndpoints {
                        first: first.describe(),
                        last: last.describe(),
                    })
                }
            },
            _ => return Err(StructureError::UnrangeableEndpoint(first.type_name().to_owned())),
        };
        let low = i128::from(a) + if extent.includes_first() { 0 } else { 1 };
        let high = i128::from(b) - if extent.includes_last() { 0 } else { 1 };
        let size = high - low + 1;
        if size < 0 {
            return Err(StructureError::NegativeSize { first: a, last: b });
        }
        if size > i128::from(u64::MAX) {
            return Err(StructureError::Uncountable { first: a, last: b });
        }
        // An empty interval's bounds may sit outside i64.
        let members = if size == 0 {
            None
        } else {
            Some((low as i64, high as i64))
        };
        Ok(Interval {
            first,
            extent,
            last,
            members,
        })
    }

    pub fn from_integers(first: i64, extent: Extent, last: i64) -> Result<Interval, StructureError> {
        Interval::new(
            Primitive::Element(Element::Number(Number::from_integer(first))),
            extent,
            Primitive::Element(Element::Number(Number::from_integer(last))),
        )
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn get_size(&self) -> u64 {
        self.members.map_or(0, |(low, high)| high.abs_diff(low) + 1)
    }

    /// The members in ascending order, produced lazily.
    pub fn members(&self) -> impl Iterator<Item = i64> {
        self.members.into_iter().flat_map(|(low, high)| low..=high)
    }

    /// Every member in one vector. Fails instead of aborting when the
    /// interval is too large to hold in memory.
    pub fn as_array(&self) -> Result<Vec<i64>, StructureError> {
        let size = self.get_size();
        let too_large = || StructureError::TooManyMembers(size);
        let mut array = Vec::new();
        let capacity = usize::try_from(size).map_err(|_| too_large())?;
        array.try_reserve_exact(capacity).map_err(|_| too_large())?;
        array.extend(self.members());
        Ok(array)
    }
}

/// A range over lexically ordered strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spectrum {
    first: Primitive,
    extent: Extent,
    last: Primitive,
}

/// A range over continuous values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Continuum {
    first: Primitive,
    extent: Extent,
    last: Primitive,
}

// ──────────────────────────────────────────────
// Collections
// ──────────────────────────────────────────────

/// An association key: a primitive or a bare identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Primitive(Primitive),
    Identifier(String),
}

impl Key {
    pub fn as_str(&self) -> &str {
        match self {
            Key::Primitive(primitive) => primitive.as_str(),
            Key::Identifier(name) => name,
        }
    }
}

/// Ordered associations of key to component.
pub type Catalog = OrderedMap<Key, Component>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    List(Vec<Component>),
    Catalog(Catalog),
    Set(Set<Component>),
    Queue(Vec<Component>),
    Stack(Vec<Component>),
}

impl Collection {
    pub fn len(&self) -> usize {
        match self {
            Collection::List(items) | Collection::Queue(items) | Collection::Stack(items) => {
                items.len()
            }
            Collection::Catalog(catalog) => catalog.len(),
            Collection::Set(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The items of a series-shaped collection; `None` for catalogs.
    pub fn items(&self) -> Option<&[Component]> {
        match self {
            Collection::List(items) | Collection::Queue(items) | Collection::Stack(items) => {
                Some(items)
            }
            Collection::Set(set) => Some(set.members()),
            Collection::Catalog(_) => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Collection::List(_) => "List",
            Collection::Catalog(_) => "Catalog",
            Collection::Set(_) => "Set",
            Collection::Queue(_) => "Queue",
            Collection::Stack(_) => "Stack",
        }
    }
}

// ──────────────────────────────────────────────
// Procedures and statements
// ──────────────────────────────────────────────

/// A block of statements. `None` entries are blank lines kept from a
/// multi-line source so the layout can be reproduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Procedure {
    pub statements: Vec<Option<Statement>>,
}

impl Procedure {
    pub fn new(statements: Vec<Option<Statement>>) -> Self {
        Procedure { statements }
    }

    pub fn of(statements: impl IntoIterator<Item = Statement>) -> Self {
        Procedure {
            statements: statements.into_iter().map(Some).collect(),
        }
    }

    /// The statements, skipping blank-line placeholders.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter().flatten()
    }

    pub fn cursor(&self) -> Cursor<'_, Option<Statement>> {
        Cursor::new(&self.statements)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Annotation {
    Note(Note),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
    pub main_clause: Clause,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_clause: Option<OnClause>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
}

impl Statement {
    pub fn new(main_clause: Clause) -> Self {
        Statement {
            annotation: None,
            main_clause,
            on_clause: None,
            note: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Clause {
    Accept {
        message: Expression,
    },
    Break,
    Checkout {
        recipient: Recipient,
        level: Option<Expression>,
        moniker: Expression,
    },
    Continue,
    Discard {
        draft: Expression,
    },
    If {
        condition: Expression,
        procedure: Procedure,
    },
    Let {
        recipient: Recipient,
        operator: Operator,
        expression: Expression,
    },
    Notarize {
        draft: Expression,
        moniker: Expression,
    },
    Post {
        message: Expression,
        bag: Expression,
    },
    Publish {
        event: Expression,
    },
    Reject {
        message: Expression,
    },
    Retrieve {
        recipient: Recipient,
        bag: Expression,
    },
    Return {
        result: Expression,
    },
    Save {
        draft: Expression,
        recipient: Recipient,
    },
    Select(SelectClause),
    Throw {
        exception: Expression,
    },
    While {
        condition: Expression,
        procedure: Procedure,
    },
    With {
        item: Symbol,
        sequence: Expression,
        procedure: Procedure,
    },
}

impl Clause {
    /// The keyword that opens the clause.
    pub fn keyword(&self) -> &'static str {
        match self {
            Clause::Accept { .. } => "accept",
            Clause::Break => "break",
            Clause::Checkout { .. } => "checkout",
            Clause::Continue => "continue",
            Clause::Discard { .. } => "discard",
            Clause::If { .. } => "if",
            Clause::Let { .. } => "let",
            Clause::Notarize { .. } => "notarize",
            Clause::Post { .. } => "post",
            Clause::Publish { .. } => "publish",
            Clause::Reject { .. } => "reject",
            Clause::Retrieve { .. } => "retrieve",
            Clause::Return { .. } => "return",
            Clause::Save { .. } => "save",
            Clause::Select(_) => "select",
            Clause::Throw { .. } => "throw",
            Clause::While { .. } => "while",
            Clause::With { .. } => "with",
        }
    }
}

/// `matching pattern do { ... }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBlock {
    pub pattern: Expression,
    pub procedure: Procedure,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectClause {
    target: Expression,
    blocks: Vec<MatchBlock>,
}

impl SelectClause {
    pub fn new(target: Expression, blocks: Vec<MatchBlock>) -> Result<Self, StructureError> {
        if blocks.is_empty() {
            return Err(StructureError::MissingMatchBlocks("a select clause"));
        }
        Ok(SelectClause { target, blocks })
    }

    pub fn target(&self) -> &Expression {
        &self.target
    }

    pub fn blocks(&self) -> &[MatchBlock] {
        &self.blocks
    }
}

/// Exception handling attached to a statement: `on $exception matching ...`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnClause {
    failure: Symbol,
    blocks: Vec<MatchBlock>,
}

impl OnClause {
    pub fn new(failure: Symbol, blocks: Vec<MatchBlock>) -> Result<Self, StructureError> {
        if blocks.is_empty() {
            return Err(StructureError::MissingMatchBlocks("an on clause"));
        }
        Ok(OnClause { failure, blocks })
    }

    pub fn failure(&self) -> &Symbol {
        &self.failure
    }

    pub fn blocks(&self) -> &[MatchBlock] {
        &self.blocks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recipient {
    Symbol(Symbol),
    Attribute(Attribute),
}

/// An indexed variable used as an assignment target: `cache[$key]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    variable: String,
    indices: Vec<Expression>,
}

impl Attribute {
    pub fn new(variable: impl Into<String>, indices: Vec<Expression>) -> Result<Self, StructureError> {
        if indices.is_empty() {
            return Err(StructureError::MissingIndices("an attribute"));
        }
        Ok(Attribute {
            variable: variable.into(),
            indices,
        })
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn indices(&self) -> &[Expression] {
        &self.indices
    }
}

// ──────────────────────────────────────────────
// Expressions
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    Component(Box<Component>),
    Intrinsic {
        function: String,
        arguments: Vec<Expression>,
    },
    Variable(String),
    Precedence(Box<Expression>),
    Dereference(Box<Expression>),
    Invocation {
        target: Box<Expression>,
        operator: Operator,
        method: String,
        arguments: Vec<Expression>,
    },
    Subcomponent(Subcomponent),
    Chaining(Binary),
    Exponential(Binary),
    Inversion {
        operator: Operator,
        operand: Box<Expression>,
    },
    Arithmetic(Binary),
    Magnitude(Box<Expression>),
    Comparison(Binary),
    Complement(Box<Expression>),
    Logical(Binary),
}

impl Expression {
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn component(component: Component) -> Self {
        Expression::Component(Box::new(component))
    }
}

/// Two operands joined by an infix operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binary {
    pub left: Box<Expression>,
    pub operator: Operator,
    pub right: Box<Expression>,
}

impl Binary {
    pub fn new(left: Expression, operator: Operator, right: Expression) -> Self {
        Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }
}

/// An indexed expression: `list[1]`, `matrix[$row, $column]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Subcomponent {
    composite: Box<Expression>,
    indices: Vec<Expression>,
}

impl Subcomponent {
    pub fn new(composite: Expression, indices: Vec<Expression>) -> Result<Self, StructureError> {
        if indices.is_empty() {
            return Err(StructureError::MissingIndices("a subcomponent"));
        }
        Ok(Subcomponent {
            composite: Box::new(composite),
            indices,
        })
    }

    pub fn composite(&self) -> &Expression {
        &self.composite
    }

    pub fn indices(&self) -> &[Expression] {
        &self.indices
    }
}

/// Operators, in an order whose contiguous ranges classify them. Do not
/// reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Operator {
    Assign,
    DefaultAssign,
    SumAssign,
    DifferenceAssign,
    ProductAssign,
    QuotientAssign,
    Dot,
    Arrow,
    Chain,
    Power,
    Minus,
    Slash,
    Star,
    Modulo,
    Plus,
    Bar,
    Less,
    Equal,
    More,
    Is,
    Matches,
    Not,
    And,
    Sans,
    Xor,
    Or,
    At,
}

const OPERATORS: &[(Operator, &str)] = &[
    (Operator::Assign, ":="),
    (Operator::DefaultAssign, "?="),
    (Operator::SumAssign, "+="),
    (Operator::DifferenceAssign, "-="),
    (Operator::ProductAssign, "*="),
    (Operator::QuotientAssign, "/="),
    (Operator::Dot, "."),
    (Operator::Arrow, "<-"),
    (Operator::Chain, "&"),
    (Operator::Power, "^"),
    (Operator::Minus, "-"),
    (Operator::Slash, "/"),
    (Operator::Star, "*"),
    (Operator::Modulo, "//"),
    (Operator::Plus, "+"),
    (Operator::Bar, "|"),
    (Operator::Less, "<"),
    (Operator::Equal, "="),
    (Operator::More, ">"),
    (Operator::Is, "IS"),
    (Operator::Matches, "MATCHES"),
    (Operator::Not, "NOT"),
    (Operator::And, "AND"),
    (Operator::Sans, "SANS"),
    (Operator::Xor, "XOR"),
    (Operator::Or, "OR"),
    (Operator::At, "@"),
];

impl Operator {
    pub fn from_text(text: &str) -> Option<Operator> {
        OPERATORS
            .iter()
            .find(|(_, spelling)| *spelling == text)
            .map(|(operator, _)| *operator)
    }

    pub fn as_str(self) -> &'static str {
        OPERATORS[self as usize].1
    }

    fn within(self, first: Operator, last: Operator) -> bool {
        (first as u8..=last as u8).contains(&(self as u8))
    }

    pub fn is_assignment(self) -> bool {
        self.within(Operator::Assign, Operator::QuotientAssign)
    }

    pub fn is_invocation(self) -> bool {
        self.within(Operator::Dot, Operator::Arrow)
    }

    pub fn is_inversion(self) -> bool {
        self.within(Operator::Minus, Operator::Star)
    }

    pub fn is_arithmetic(self) -> bool {
        self.within(Operator::Minus, Operator::Plus)
    }

    pub fn is_comparison(self) -> bool {
        self.within(Operator::Less, Operator::Matches)
    }

    pub fn is_logical(self) -> bool {
        self.within(Operator::And, Operator::Or)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
