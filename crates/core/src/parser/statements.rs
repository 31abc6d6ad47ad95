use super::{Attempt, Parser};
use crate::ast::{
    Annotation, Attribute, Clause, Expression, MatchBlock, OnClause, Operator, Procedure,
    Recipient, SelectClause, Statement,
};
use crate::error::BaliError;
use crate::grammar;
use crate::token::{Token, TokenKind};
use crate::values::{Comment, Note, Symbol};

impl Parser<'_> {
    // -- Procedures ---------------------------------------------

    pub(crate) fn parse_procedure(&mut self) -> Attempt<Procedure> {
        self.attempt(grammar::PROCEDURE, |p| {
            if !p.attempt_delimiter("{")? {
                return Ok(None);
            }
            p.nested(|p| {
                let statements = p.parse_statements()?;
                p.expect_delimiter("}")?;
                Ok(Some(Procedure::new(statements)))
            })
        })
    }

    /// Inline statements are separated by `;`. Multi-line statements sit
    /// one per line, and blank lines are kept as `None`.
    fn parse_statements(&mut self) -> Result<Vec<Option<Statement>>, BaliError> {
        self.within(grammar::STATEMENTS, |p| {
            let mut statements = Vec::new();
            if p.attempt_eol()? {
                loop {
                    if let Some(statement) = p.parse_statement()? {
                        statements.push(Some(statement));
                        p.expect_kind(TokenKind::Eol)?;
                    } else if p.attempt_eol()? {
                        statements.push(None);
                    } else {
                        break;
                    }
                }
            } else if let Some(statement) = p.parse_statement()? {
                statements.push(Some(statement));
                while p.attempt_delimiter(";")? {
                    let statement = p.parse_statement()?;
                    statements.push(Some(p.required(statement, "statement")?));
                }
            }
            Ok(statements)
        })
    }

    fn parse_statement(&mut self) -> Attempt<Statement> {
        self.attempt(grammar::STATEMENT, |p| {
            let annotation = p.parse_annotation()?;
            let main_clause = match p.parse_main_clause()? {
                Some(clause) => clause,
                None if annotation.is_some() => return Err(p.unexpected("mainClause")),
                None => return Ok(None),
            };
            let on_clause = p.parse_on_clause()?;
            let note = p.parse_note()?;
            Ok(Some(Statement {
                annotation,
                main_clause,
                on_clause,
                note,
            }))
        })
    }

    fn parse_annotation(&mut self) -> Attempt<Annotation> {
        self.attempt(grammar::ANNOTATION, |p| {
            let token = p.next_token()?;
            let annotation = match token.kind {
                TokenKind::Note => Note::from_token(&token.text).map(Annotation::Note),
                TokenKind::Comment => Comment::from_token(&token.text).map(Annotation::Comment),
                _ => return Ok(None),
            }
            .map_err(|e| p.structural(e, &token))?;
            if !p.attempt_eol()? {
                return Ok(None);
            }
            Ok(Some(annotation))
        })
    }

    // -- Clauses ------------------------------------------------

    fn parse_main_clause(&mut self) -> Attempt<Clause> {
        self.attempt(grammar::MAIN_CLAUSE, |p| {
            for &rule in grammar::MAIN_CLAUSES {
                let clause = p.parse_clause(rule)?;
                if clause.is_some() {
                    return Ok(clause);
                }
            }
            Ok(None)
        })
    }

    fn parse_clause(&mut self, rule: &'static str) -> Attempt<Clause> {
        match rule {
            grammar::ACCEPT_CLAUSE => self.clause(rule, "accept", |p| {
                Ok(Clause::Accept {
                    message: p.expression()?,
                })
            }),
            grammar::BREAK_CLAUSE => self.clause(rule, "break", |p| {
                p.expect_keyword("loop")?;
                Ok(Clause::Break)
            }),
            grammar::CHECKOUT_CLAUSE => self.clause(rule, "checkout", |p| {
                let recipient = p.recipient()?;
                let level = match p.attempt_keyword("at")? {
                    Some(_) => {
                        p.expect_keyword("level")?;
                        Some(p.expression()?)
                    }
                    None => None,
                };
                p.expect_keyword("from")?;
                let moniker = p.expression()?;
                Ok(Clause::Checkout {
                    recipient,
                    level,
                    moniker,
                })
            }),
            grammar::CONTINUE_CLAUSE => self.clause(rule, "continue", |p| {
                p.expect_keyword("loop")?;
                Ok(Clause::Continue)
            }),
            grammar::DISCARD_CLAUSE => self.clause(rule, "discard", |p| {
                Ok(Clause::Discard {
                    draft: p.expression()?,
                })
            }),
            grammar::IF_CLAUSE => self.clause(rule, "if", |p| {
                let condition = p.expression()?;
                p.expect_keyword("do")?;
                let procedure = p.procedure()?;
                Ok(Clause::If {
                    condition,
                    procedure,
                })
            }),
            grammar::LET_CLAUSE => self.clause(rule, "let", |p| {
                let recipient = p.recipient()?;
                let operator = p.assignment()?;
                let expression = p.expression()?;
                Ok(Clause::Let {
                    recipient,
                    operator,
                    expression,
                })
            }),
            grammar::NOTARIZE_CLAUSE => self.clause(rule, "notarize", |p| {
                let draft = p.expression()?;
                p.expect_keyword("as")?;
                let moniker = p.expression()?;
                Ok(Clause::Notarize { draft, moniker })
            }),
            grammar::POST_CLAUSE => self.clause(rule, "post", |p| {
                let message = p.expression()?;
                p.expect_keyword("to")?;
                let bag = p.expression()?;
                Ok(Clause::Post { message, bag })
            }),
            grammar::PUBLISH_CLAUSE => self.clause(rule, "publish", |p| {
                Ok(Clause::Publish {
                    event: p.expression()?,
                })
            }),
            grammar::REJECT_CLAUSE => self.clause(rule, "reject", |p| {
                Ok(Clause::Reject {
                    message: p.expression()?,
                })
            }),
            grammar::RETRIEVE_CLAUSE => self.clause(rule, "retrieve", |p| {
                let recipient = p.recipient()?;
                p.expect_keyword("from")?;
                let bag = p.expression()?;
                Ok(Clause::Retrieve { recipient, bag })
            }),
            grammar::RETURN_CLAUSE => self.clause(rule, "return", |p| {
                Ok(Clause::Return {
                    result: p.expression()?,
                })
            }),
            grammar::SAVE_CLAUSE => self.clause(rule, "save", |p| {
                let draft = p.expression()?;
                p.expect_keyword("as")?;
                let recipient = p.recipient()?;
                Ok(Clause::Save { draft, recipient })
            }),
            grammar::SELECT_CLAUSE => self.clause(rule, "select", |p| {
                let keyword = p.last_token();
                let target = p.expression()?;
                let blocks = p.parse_match_blocks()?;
                SelectClause::new(target, blocks)
                    .map(Clause::Select)
                    .map_err(|e| p.structural(e, &keyword))
            }),
            grammar::THROW_CLAUSE => self.clause(rule, "throw", |p| {
                Ok(Clause::Throw {
                    exception: p.expression()?,
                })
            }),
            grammar::WHILE_CLAUSE => self.clause(rule, "while", |p| {
                let condition = p.expression()?;
                p.expect_keyword("do")?;
                let procedure = p.procedure()?;
                Ok(Clause::While {
                    condition,
                    procedure,
                })
            }),
            grammar::WITH_CLAUSE => self.clause(rule, "with", |p| {
                p.expect_keyword("each")?;
                let item = p.symbol()?;
                p.expect_keyword("in")?;
                let sequence = p.expression()?;
                p.expect_keyword("do")?;
                let procedure = p.procedure()?;
                Ok(Clause::With {
                    item,
                    sequence,
                    procedure,
                })
            }),
            _ => Ok(None),
        }
    }

    /// A clause that commits once its opening keyword is seen.
    fn clause(
        &mut self,
        rule: &'static str,
        keyword: &str,
        body: impl FnOnce(&mut Self) -> Result<Clause, BaliError>,
    ) -> Attempt<Clause> {
        self.attempt(rule, |p| {
            if p.attempt_keyword(keyword)?.is_none() {
                return Ok(None);
            }
            body(p).map(Some)
        })
    }

    fn parse_on_clause(&mut self) -> Attempt<OnClause> {
        self.attempt(grammar::ON_CLAUSE, |p| {
            let Some(keyword) = p.attempt_keyword("on")? else {
                return Ok(None);
            };
            let failure = p.symbol()?;
            let blocks = p.parse_match_blocks()?;
            OnClause::new(failure, blocks)
                .map(Some)
                .map_err(|e| p.structural(e, &keyword))
        })
    }

    fn parse_match_blocks(&mut self) -> Result<Vec<MatchBlock>, BaliError> {
        let mut blocks = Vec::new();
        while let Some(block) = self.parse_match_block()? {
            blocks.push(block);
        }
        Ok(blocks)
    }

    fn parse_match_block(&mut self) -> Attempt<MatchBlock> {
        self.attempt(grammar::MATCH_BLOCK, |p| {
            if p.attempt_keyword("matching")?.is_none() {
                return Ok(None);
            }
            let pattern = p.expression()?;
            p.expect_keyword("do")?;
            let procedure = p.procedure()?;
            Ok(Some(MatchBlock { pattern, procedure }))
        })
    }

    // -- Clause parts -------------------------------------------

    fn recipient(&mut self) -> Result<Recipient, BaliError> {
        let recipient = self.parse_recipient()?;
        self.required(recipient, "recipient")
    }

    fn parse_recipient(&mut self) -> Attempt<Recipient> {
        self.attempt(grammar::RECIPIENT, |p| {
            if let Some(token) = p.attempt_kind(TokenKind::Symbol)? {
                return symbol_of(p, &token).map(|s| Some(Recipient::Symbol(s)));
            }
            Ok(p.parse_attribute()?.map(Recipient::Attribute))
        })
    }

    fn parse_attribute(&mut self) -> Attempt<Attribute> {
        self.attempt(grammar::ATTRIBUTE, |p| {
            let Some(name) = p.attempt_kind(TokenKind::Identifier)? else {
                return Ok(None);
            };
            if !p.attempt_delimiter("[")? {
                return Ok(None);
            }
            let indices = p.parse_indices()?;
            p.expect_delimiter("]")?;
            Attribute::new(name.text.clone(), indices)
                .map(Some)
                .map_err(|e| p.structural(e, &name))
        })
    }

    fn assignment(&mut self) -> Result<Operator, BaliError> {
        self.within(grammar::ASSIGNMENT, |p| {
            let token = p.next_token()?;
            let operator = match token.kind {
                TokenKind::Delimiter => Operator::from_text(&token.text),
                _ => None,
            };
            match operator.filter(|op| op.is_assignment()) {
                Some(operator) => Ok(operator),
                None => {
                    p.unread();
                    Err(p.unexpected("assignment"))
                }
            }
        })
    }

    fn symbol(&mut self) -> Result<Symbol, BaliError> {
        let token = self.expect_kind(TokenKind::Symbol)?;
        symbol_of(self, &token)
    }

    fn expression(&mut self) -> Result<Expression, BaliError> {
        let expression = self.parse_expression()?;
        self.required(expression, "expression")
    }

    fn procedure(&mut self) -> Result<Procedure, BaliError> {
        let procedure = self.parse_procedure()?;
        self.required(procedure, "procedure")
    }
}

fn symbol_of(parser: &Parser<'_>, token: &Token) -> Result<Symbol, BaliError> {
    Symbol::from_token(&token.text).map_err(|e| parser.structural(e, token))
}
