use super::{Attempt, Parser};
use crate::ast::{
    Catalog, Collection, Component, Context, Element, Entity, Extent, Key, Primitive, Range,
    StringValue,
};
use crate::error::BaliError;
use crate::grammar;
use crate::token::TokenKind;
use crate::values::{
    Angle, Binary, Boolean, Bytecode, Duration, Moment, Moniker, Narrative, Note, Number, Pattern,
    Percentage, Probability, Quote, Resource, Symbol, Tag, Version,
};

impl Parser<'_> {
    // -- Components ---------------------------------------------

    pub(crate) fn parse_component(&mut self) -> Attempt<Component> {
        self.attempt(grammar::COMPONENT, |p| {
            p.nested(|p| {
                let Some(entity) = p.parse_entity()? else {
                    return Ok(None);
                };
                let context = p.parse_context()?;
                let note = p.parse_note()?;
                let entity = match &context {
                    Some(context) => typed(entity, context),
                    None => entity,
                };
                Ok(Some(Component {
                    entity,
                    context,
                    note,
                }))
            })
        })
    }

    pub(crate) fn parse_context(&mut self) -> Attempt<Context> {
        self.attempt(grammar::CONTEXT, |p| {
            if !p.attempt_delimiter("(")? {
                return Ok(None);
            }
            let Some(parameters) = p.parse_parameters()? else {
                return Ok(None);
            };
            p.expect_delimiter(")")?;
            Ok(Some(parameters))
        })
    }

    fn parse_parameters(&mut self) -> Attempt<Context> {
        self.attempt(grammar::PARAMETERS, |p| {
            let mut context = Context::new();
            if p.attempt_eol()? {
                let Some((symbol, value)) = p.parse_parameter()? else {
                    return Ok(None);
                };
                context.insert(symbol, value);
                p.expect_kind(TokenKind::Eol)?;
                while let Some((symbol, value)) = p.parse_parameter()? {
                    context.insert(symbol, value);
                    p.expect_kind(TokenKind::Eol)?;
                }
            } else {
                let Some((symbol, value)) = p.parse_parameter()? else {
                    return Ok(None);
                };
                context.insert(symbol, value);
                while p.attempt_delimiter(",")? {
                    let parameter = p.parse_parameter()?;
                    let (symbol, value) = p.required(parameter, "parameter")?;
                    context.insert(symbol, value);
                }
            }
            Ok(Some(context))
        })
    }

    fn parse_parameter(&mut self) -> Attempt<(Symbol, Component)> {
        self.attempt(grammar::PARAMETER, |p| {
            let Some(token) = p.attempt_kind(TokenKind::Symbol)? else {
                return Ok(None);
            };
            if !p.attempt_delimiter(":")? {
                return Ok(None);
            }
            let symbol = Symbol::from_token(&token.text).map_err(|e| p.structural(e, &token))?;
            let value = p.parse_component()?;
            let value = p.required(value, "component")?;
            Ok(Some((symbol, value)))
        })
    }

    pub(crate) fn parse_note(&mut self) -> Attempt<Note> {
        let Some(token) = self.attempt_kind(TokenKind::Note)? else {
            return Ok(None);
        };
        Note::from_token(&token.text)
            .map(Some)
            .map_err(|e| self.structural(e, &token))
    }

    // -- Entities -----------------------------------------------

    pub(crate) fn parse_entity(&mut self) -> Attempt<Entity> {
        self.attempt(grammar::ENTITY, |p| {
            for &form in grammar::ENTITY_FORMS {
                let entity = match form {
                    grammar::ELEMENT => p.parse_element()?.map(Entity::Element),
                    grammar::STRING => p.parse_string()?.map(Entity::String),
                    grammar::RANGE => p.parse_range()?.map(Entity::Range),
                    grammar::COLLECTION => p.parse_collection()?.map(Entity::Collection),
                    grammar::PROCEDURE => p.parse_procedure()?.map(Entity::Procedure),
                    _ => None,
                };
                if entity.is_some() {
                    return Ok(entity);
                }
            }
            Ok(None)
        })
    }

    fn parse_element(&mut self) -> Attempt<Element> {
        let token = self.next_token()?;
        let text = token.text.as_str();
        let element = match token.kind {
            TokenKind::Angle => Angle::from_token(text).map(Element::Angle),
            TokenKind::Boolean => Boolean::from_token(text).map(Element::Boolean),
            TokenKind::Duration => Duration::from_token(text).map(Element::Duration),
            TokenKind::Moment => Moment::from_token(text).map(Element::Moment),
            TokenKind::Number => Number::from_token(text).map(Element::Number),
            TokenKind::Pattern => Pattern::from_token(text).map(Element::Pattern),
            TokenKind::Percentage => Percentage::from_token(text).map(Element::Percentage),
            TokenKind::Probability => Probability::from_token(text).map(Element::Probability),
            TokenKind::Resource => Resource::from_token(text).map(Element::Resource),
            _ => {
                self.unread();
                return Ok(None);
            }
        };
        element.map(Some).map_err(|e| self.structural(e, &token))
    }

    fn parse_string(&mut self) -> Attempt<StringValue> {
        let token = self.next_token()?;
        let text = token.text.as_str();
        let string = match token.kind {
            TokenKind::Binary => Binary::from_token(text).map(StringValue::Binary),
            TokenKind::Bytecode => Bytecode::from_token(text).map(StringValue::Bytecode),
            TokenKind::Name => Moniker::from_token(text).map(StringValue::Moniker),
            TokenKind::Narrative => Narrative::from_token(text).map(StringValue::Narrative),
            TokenKind::Quote => Quote::from_token(text).map(StringValue::Quote),
            TokenKind::Symbol => Symbol::from_token(text).map(StringValue::Symbol),
            TokenKind::Tag => Tag::from_token(text).map(StringValue::Tag),
            TokenKind::Version => Version::from_token(text).map(StringValue::Version),
            _ => {
                self.unread();
                return Ok(None);
            }
        };
        string.map(Some).map_err(|e| self.structural(e, &token))
    }

    fn parse_primitive(&mut self) -> Attempt<Primitive> {
        self.attempt(grammar::PRIMITIVE, |p| {
            if let Some(element) = p.parse_element()? {
                return Ok(Some(Primitive::Element(element)));
            }
            Ok(p.parse_string()?.map(Primitive::String))
        })
    }

    // -- Ranges -------------------------------------------------

    fn parse_range(&mut self) -> Attempt<Range> {
        self.attempt(grammar::RANGE, |p| {
            let open = p.next_token()?;
            if !(open.is_delimiter("[") || open.is_delimiter("(")) {
                return Ok(None);
            }
            let Some(first) = p.parse_primitive()? else {
                return Ok(None);
            };
            if !p.attempt_delimiter("..")? {
                return Ok(None);
            }
            let last = p.parse_primitive()?;
            let last = p.required(last, "primitive")?;
            let close = p.next_token()?;
            let extent = match close.kind {
                TokenKind::Delimiter => Extent::from_brackets(&open.text, &close.text),
                _ => None,
            };
            let Some(extent) = extent else {
                p.unread();
                return Err(p.unexpected("] or )"));
            };
            Range::new(first, extent, last)
                .map(Some)
                .map_err(|e| p.structural(e, &open))
        })
    }

    // -- Collections --------------------------------------------

    fn parse_collection(&mut self) -> Attempt<Collection> {
        self.attempt(grammar::COLLECTION, |p| {
            if !p.attempt_delimiter("[")? {
                return Ok(None);
            }
            let collection = match p.parse_mapping()? {
                Some(catalog) => Collection::Catalog(catalog),
                None => Collection::List(p.parse_series()?),
            };
            p.expect_delimiter("]")?;
            Ok(Some(collection))
        })
    }

    fn parse_mapping(&mut self) -> Attempt<Catalog> {
        self.attempt(grammar::MAPPING, |p| {
            let mut catalog = Catalog::new();
            if p.attempt_delimiter(":")? {
                return Ok(Some(catalog));
            }
            if p.attempt_eol()? {
                let Some((key, value)) = p.parse_association()? else {
                    return Ok(None);
                };
                catalog.insert(key, value);
                p.expect_kind(TokenKind::Eol)?;
                while let Some((key, value)) = p.parse_association()? {
                    catalog.insert(key, value);
                    p.expect_kind(TokenKind::Eol)?;
                }
            } else {
                let Some((key, value)) = p.parse_association()? else {
                    return Ok(None);
                };
                catalog.insert(key, value);
                while p.attempt_delimiter(",")? {
                    let association = p.parse_association()?;
                    let (key, value) = p.required(association, "association")?;
                    catalog.insert(key, value);
                }
            }
            Ok(Some(catalog))
        })
    }

    fn parse_association(&mut self) -> Attempt<(Key, Component)> {
        self.attempt(grammar::ASSOCIATION, |p| {
            let Some(key) = p.parse_key()? else {
                return Ok(None);
            };
            if !p.attempt_delimiter(":")? {
                return Ok(None);
            }
            let value = p.parse_component()?;
            let value = p.required(value, "component")?;
            Ok(Some((key, value)))
        })
    }

    fn parse_key(&mut self) -> Attempt<Key> {
        self.attempt(grammar::KEY, |p| {
            if let Some(primitive) = p.parse_primitive()? {
                return Ok(Some(Key::Primitive(primitive)));
            }
            Ok(p
                .attempt_kind(TokenKind::Identifier)?
                .map(|token| Key::Identifier(token.text)))
        })
    }

    fn parse_series(&mut self) -> Result<Vec<Component>, BaliError> {
        self.within(grammar::SERIES, |p| {
            let mut items = Vec::new();
            if p.attempt_eol()? {
                while let Some(item) = p.parse_component()? {
                    items.push(item);
                    p.expect_kind(TokenKind::Eol)?;
                }
            } else if let Some(item) = p.parse_component()? {
                items.push(item);
                while p.attempt_delimiter(",")? {
                    let item = p.parse_component()?;
                    items.push(p.required(item, "component")?);
                }
            }
            Ok(items)
        })
    }
}

/// A series whose `$type` names a set, queue or stack becomes one.
fn typed(entity: Entity, context: &Context) -> Entity {
    let kind = context.get("type").and_then(|value| match &value.entity {
        Entity::String(StringValue::Moniker(moniker)) => moniker.type_name(),
        _ => None,
    });
    match entity {
        Entity::Collection(Collection::List(items)) => Entity::Collection(match kind {
            Some("Set") => Collection::Set(items.into_iter().collect()),
            Some("Queue") => Collection::Queue(items),
            Some("Stack") => Collection::Stack(items),
            _ => Collection::List(items),
        }),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{Collection, Entity, Extent, Key, Range, StringValue};
    use crate::error::BaliError;
    use crate::options::ParseOptions;
    use crate::parser::Parser;

    fn entity(source: &str) -> Result<Entity, BaliError> {
        let mut p = Parser::new(source, &ParseOptions::default());
        p.parse_document().map(|component| component.entity)
    }

    #[test]
    fn ranges_pick_their_extent_from_the_brackets() {
        let cases = [
            ("[1..3]\n", Extent::Inclusive),
            ("[1..3)\n", Extent::Left),
            ("(1..3]\n", Extent::Right),
            ("(1..3)\n", Extent::Exclusive),
        ];
        for (source, extent) in cases {
            match entity(source).unwrap() {
                Entity::Range(range) => assert_eq!(range.extent(), extent, "{}", source),
                other => panic!("expected a range, got {:?}", other),
            }
        }
    }

    #[test]
    fn spectrum_from_quotes() {
        let parsed = entity("[\"a\"..\"z\")\n").unwrap();
        assert!(matches!(parsed, Entity::Range(Range::Spectrum(_))));
    }

    #[test]
    fn binary_strings_are_string_values() {
        let parsed = entity("'0a1b 2c3d'\n").unwrap();
        let Entity::String(StringValue::Binary(binary)) = parsed else {
            panic!("expected a binary string");
        };
        assert_eq!(binary.as_str(), "'0a1b 2c3d'");
    }

    #[test]
    fn mixed_endpoints_are_structural() {
        let err = entity("[1..\"z\"]\n").unwrap_err();
        assert!(matches!(err, BaliError::Structural(_)));
        assert_eq!(err.diagnostic().rules[0].name, "$range");
    }

    #[test]
    fn catalog_keys_may_be_identifiers_or_primitives() {
        let parsed = entity("[foo: 1, $bar: 2, \"baz\": 3]\n").unwrap();
        let Entity::Collection(Collection::Catalog(catalog)) = parsed else {
            panic!("expected a catalog");
        };
        let keys: Vec<&str> = catalog.keys().map(Key::as_str).collect();
        assert_eq!(keys, vec!["foo", "$bar", "\"baz\""]);
    }

    #[test]
    fn empty_forms() {
        assert_eq!(
            entity("[:]\n").unwrap(),
            Entity::Collection(Collection::Catalog(Default::default()))
        );
        assert_eq!(
            entity("[ ]\n").unwrap(),
            Entity::Collection(Collection::List(vec![]))
        );
        assert_eq!(
            entity("[\n]\n").unwrap(),
            Entity::Collection(Collection::List(vec![]))
        );
    }

    #[test]
    fn multiline_mapping() {
        let parsed = entity("[\n    $a: 1\n    $b: 2\n]\n").unwrap();
        let Entity::Collection(Collection::Catalog(catalog)) = parsed else {
            panic!("expected a catalog");
        };
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn typed_series_become_sets_queues_and_stacks() {
        let set = entity("[1, 2, 1]($type: /bali/collections/Set/v1)\n").unwrap();
        let Entity::Collection(Collection::Set(members)) = set else {
            panic!("expected a set");
        };
        assert_eq!(members.len(), 2);
        let queue = entity("[1, 2]($type: /bali/collections/Queue/v1)\n").unwrap();
        assert!(matches!(queue, Entity::Collection(Collection::Queue(_))));
        let stack = entity("[1]($type: /Stack)\n").unwrap();
        assert!(matches!(stack, Entity::Collection(Collection::Stack(_))));
        let list = entity("[1]($type: /bali/collections/List/v1)\n").unwrap();
        assert!(matches!(list, Entity::Collection(Collection::List(_))));
    }

    #[test]
    fn unterminated_series_cites_the_collection() {
        let err = entity("[1, 2\n").unwrap_err();
        assert!(matches!(err, BaliError::Syntax(_)));
        let diagnostic = err.diagnostic();
        assert_eq!(diagnostic.expected.as_deref(), Some("]"));
        assert_eq!(diagnostic.rules[0].name, "$collection");
    }
}
