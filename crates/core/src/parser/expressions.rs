use super::{Attempt, Parser};
use crate::ast::{Binary, Expression, Operator, Subcomponent};
use crate::error::{BaliError, StructureError};
use crate::grammar;
use crate::token::{Token, TokenKind};

/// The trailing half of a continuation, attached to the expression built so
/// far once it has been parsed.
enum Suffix {
    Invocation {
        operator: Operator,
        method: String,
        arguments: Vec<Expression>,
    },
    Subcomponent(Vec<Expression>),
    Binary {
        kind: fn(Binary) -> Expression,
        operator: Operator,
        right: Expression,
    },
}

impl Suffix {
    fn attach(self, left: Expression) -> Result<Expression, StructureError> {
        Ok(match self {
            Suffix::Invocation {
                operator,
                method,
                arguments,
            } => Expression::Invocation {
                target: Box::new(left),
                operator,
                method,
                arguments,
            },
            Suffix::Subcomponent(indices) => {
                Expression::Subcomponent(Subcomponent::new(left, indices)?)
            }
            Suffix::Binary {
                kind,
                operator,
                right,
            } => kind(Binary::new(left, operator, right)),
        })
    }
}

/// Continuations that may extend an operand.
const OPERAND_CONTINUATIONS: &[&str] = &[grammar::INVOCATION, grammar::SUBCOMPONENT];

fn operator_of(token: &Token) -> Option<Operator> {
    match token.kind {
        TokenKind::Delimiter | TokenKind::Keyword => Operator::from_text(&token.text),
        _ => None,
    }
}

impl Parser<'_> {
    // -- Expressions --------------------------------------------

    /// A primary followed by as many continuations as match. The chain is
    /// flat and associates to the left: `a - b - c` is `(a - b) - c`.
    pub(crate) fn parse_expression(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::EXPRESSION, |p| {
            p.nested(|p| p.extend(grammar::CONTINUATIONS))
        })
    }

    /// A primary extended only by invocations and subcomponents.
    fn parse_operand(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::OPERAND, |p| {
            p.nested(|p| p.extend(OPERAND_CONTINUATIONS))
        })
    }

    fn operand(&mut self) -> Result<Expression, BaliError> {
        let operand = self.parse_operand()?;
        self.required(operand, "operand")
    }

    fn extend(&mut self, continuations: &[&'static str]) -> Attempt<Expression> {
        let Some(mut expression) = self.parse_primary()? else {
            return Ok(None);
        };
        while let Some(suffix) = self.parse_continuation(continuations)? {
            expression = suffix
                .attach(expression)
                .map_err(|e| self.structural(e, &self.last_token()))?;
        }
        Ok(Some(expression))
    }

    // -- Primaries ----------------------------------------------

    fn parse_primary(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::PRIMARY, |p| {
            for &form in grammar::PRIMARY_FORMS {
                let primary = match form {
                    grammar::COMPONENT => p.parse_component()?.map(Expression::component),
                    grammar::INTRINSIC => p.parse_intrinsic()?,
                    grammar::VARIABLE => p.parse_variable()?,
                    grammar::PRECEDENCE => p.parse_precedence()?,
                    grammar::DEREFERENCE => p.parse_dereference()?,
                    grammar::INVERSION => p.parse_inversion()?,
                    grammar::MAGNITUDE => p.parse_magnitude()?,
                    grammar::COMPLEMENT => p.parse_complement()?,
                    _ => None,
                };
                if primary.is_some() {
                    return Ok(primary);
                }
            }
            Ok(None)
        })
    }

    fn parse_intrinsic(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::INTRINSIC, |p| {
            let Some(function) = p.attempt_kind(TokenKind::Intrinsic)? else {
                return Ok(None);
            };
            p.expect_delimiter("(")?;
            let arguments = p.parse_arguments()?;
            p.expect_delimiter(")")?;
            Ok(Some(Expression::Intrinsic {
                function: function.text,
                arguments,
            }))
        })
    }

    fn parse_variable(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::VARIABLE, |p| {
            Ok(p
                .attempt_kind(TokenKind::Identifier)?
                .map(|token| Expression::Variable(token.text)))
        })
    }

    fn parse_precedence(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::PRECEDENCE, |p| {
            if !p.attempt_delimiter("(")? {
                return Ok(None);
            }
            let inner = p.parse_expression()?;
            let inner = p.required(inner, "expression")?;
            p.expect_delimiter(")")?;
            Ok(Some(Expression::Precedence(Box::new(inner))))
        })
    }

    fn parse_dereference(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::DEREFERENCE, |p| {
            if !p.attempt_delimiter("@")? {
                return Ok(None);
            }
            Ok(Some(Expression::Dereference(Box::new(p.operand()?))))
        })
    }

    fn parse_inversion(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::INVERSION, |p| {
            let token = p.next_token()?;
            let Some(operator) = operator_of(&token).filter(|op| op.is_inversion()) else {
                return Ok(None);
            };
            let operand = p.operand()?;
            Ok(Some(Expression::Inversion {
                operator,
                operand: Box::new(operand),
            }))
        })
    }

    fn parse_magnitude(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::MAGNITUDE, |p| {
            if !p.attempt_delimiter("|")? {
                return Ok(None);
            }
            let inner = p.parse_expression()?;
            let inner = p.required(inner, "expression")?;
            p.expect_delimiter("|")?;
            Ok(Some(Expression::Magnitude(Box::new(inner))))
        })
    }

    fn parse_complement(&mut self) -> Attempt<Expression> {
        self.attempt(grammar::COMPLEMENT, |p| {
            if p.attempt_keyword("NOT")?.is_none() {
                return Ok(None);
            }
            Ok(Some(Expression::Complement(Box::new(p.operand()?))))
        })
    }

    // -- Continuations ------------------------------------------

    fn parse_continuation(&mut self, forms: &[&'static str]) -> Attempt<Suffix> {
        for &form in forms {
            let suffix = match form {
                grammar::INVOCATION => self.parse_invocation()?,
                grammar::SUBCOMPONENT => self.parse_subcomponent()?,
                grammar::CHAINING => {
                    self.parse_binary(form, |op| op == Operator::Chain, Expression::Chaining)?
                }
                grammar::EXPONENTIAL => {
                    self.parse_binary(form, |op| op == Operator::Power, Expression::Exponential)?
                }
                grammar::ARITHMETIC => {
                    self.parse_binary(form, Operator::is_arithmetic, Expression::Arithmetic)?
                }
                grammar::COMPARISON => {
                    self.parse_binary(form, Operator::is_comparison, Expression::Comparison)?
                }
                grammar::LOGICAL => {
                    self.parse_binary(form, Operator::is_logical, Expression::Logical)?
                }
                _ => None,
            };
            if suffix.is_some() {
                return Ok(suffix);
            }
        }
        Ok(None)
    }

    fn parse_invocation(&mut self) -> Attempt<Suffix> {
        self.attempt(grammar::INVOCATION, |p| {
            let token = p.next_token()?;
            let Some(operator) = operator_of(&token).filter(|op| op.is_invocation()) else {
                return Ok(None);
            };
            let method = p.expect_kind(TokenKind::Identifier)?;
            p.expect_delimiter("(")?;
            let arguments = p.parse_arguments()?;
            p.expect_delimiter(")")?;
            Ok(Some(Suffix::Invocation {
                operator,
                method: method.text,
                arguments,
            }))
        })
    }

    fn parse_subcomponent(&mut self) -> Attempt<Suffix> {
        self.attempt(grammar::SUBCOMPONENT, |p| {
            if !p.attempt_delimiter("[")? {
                return Ok(None);
            }
            let indices = p.parse_indices()?;
            p.expect_delimiter("]")?;
            Ok(Some(Suffix::Subcomponent(indices)))
        })
    }

    fn parse_binary(
        &mut self,
        rule: &'static str,
        accepts: fn(Operator) -> bool,
        kind: fn(Binary) -> Expression,
    ) -> Attempt<Suffix> {
        self.attempt(rule, |p| {
            let token = p.next_token()?;
            let Some(operator) = operator_of(&token).filter(|op| accepts(*op)) else {
                return Ok(None);
            };
            let right = p.operand()?;
            Ok(Some(Suffix::Binary {
                kind,
                operator,
                right,
            }))
        })
    }

    // -- Argument lists -----------------------------------------

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, BaliError> {
        self.within(grammar::ARGUMENTS, |p| {
            let mut arguments = Vec::new();
            if let Some(first) = p.parse_expression()? {
                arguments.push(first);
                while p.attempt_delimiter(",")? {
                    let next = p.parse_expression()?;
                    arguments.push(p.required(next, "expression")?);
                }
            }
            Ok(arguments)
        })
    }

    pub(crate) fn parse_indices(&mut self) -> Result<Vec<Expression>, BaliError> {
        self.within(grammar::INDICES, |p| {
            let first = p.parse_expression()?;
            let mut indices = vec![p.required(first, "expression")?];
            while p.attempt_delimiter(",")? {
                let next = p.parse_expression()?;
                indices.push(p.required(next, "expression")?);
            }
            Ok(indices)
        })
    }
}
