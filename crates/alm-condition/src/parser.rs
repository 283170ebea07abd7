//! Recursive-descent parser over the token stream.
//!
//! Grammar, loosest-binding first:
//!
//! ```text
//! Or       := And ('||' And)*
//! And      := Cmp ('&&' Cmp)*
//! Cmp      := Unary (cmpOp Unary)?
//! Unary    := '!' Unary | Primary
//! Primary  := EventRef | bool | string | number | '(' Or ')'
//! EventRef := 'events' '[' string ']' '.' ('active' | 'state' | 'effects' '[' string ']')
//! ```

use crate::ast::{CmpOp, EventField, Expr};
use crate::error::{ConditionError, ConditionResult};
use crate::lexer::{Token, lex};

type Span = std::ops::Range<usize>;

/// Parse a condition source string into an expression tree.
///
/// # Errors
///
/// Returns [`ConditionError::Parse`] on any lexical or syntactic problem,
/// including trailing input after a complete expression.
pub fn parse_condition(source: &str) -> ConditionResult<Expr> {
    let (tokens, lex_errors) = lex(source);
    if let Some(first) = lex_errors.first() {
        return Err(ConditionError::Parse {
            offset: first.span.start,
            message: first.message.clone(),
        });
    }
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: source.len(),
    };
    let expr = parser.parse_or()?;
    if let Some((token, span)) = parser.peek() {
        return Err(ConditionError::Parse {
            offset: span.start,
            message: format!("unexpected trailing input: {token}"),
        });
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    end: usize,
}

impl Parser {
    fn peek(&self) -> Option<&(Token, Span)> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let item = self.tokens.get(self.pos).cloned();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn error_at_current(&self, message: impl Into<String>) -> ConditionError {
        let offset = self
            .peek()
            .map(|(_, span)| span.start)
            .unwrap_or(self.end);
        ConditionError::Parse {
            offset,
            message: message.into(),
        }
    }

    /// Consume a specific token or fail.
    fn expect(&mut self, expected: &Token) -> ConditionResult<()> {
        match self.peek() {
            Some((token, _)) if token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some((token, span)) => Err(ConditionError::Parse {
                offset: span.start,
                message: format!("expected {expected}, found {token}"),
            }),
            None => Err(self.error_at_current(format!("expected {expected}, found end of input"))),
        }
    }

    /// Consume a string literal or fail.
    fn expect_string(&mut self, what: &str) -> ConditionResult<String> {
        match self.advance() {
            Some((Token::Str(s), _)) => Ok(s),
            Some((token, span)) => Err(ConditionError::Parse {
                offset: span.start,
                message: format!("expected {what}, found {token}"),
            }),
            None => Err(self.error_at_current(format!("expected {what}, found end of input"))),
        }
    }

    fn parse_or(&mut self) -> ConditionResult<Expr> {
        let mut expr = self.parse_and()?;
        while matches!(self.peek(), Some((Token::OrOr, _))) {
            self.pos += 1;
            let rhs = self.parse_and()?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> ConditionResult<Expr> {
        let mut expr = self.parse_cmp()?;
        while matches!(self.peek(), Some((Token::AndAnd, _))) {
            self.pos += 1;
            let rhs = self.parse_cmp()?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_cmp(&mut self) -> ConditionResult<Expr> {
        let lhs = self.parse_unary()?;
        let op = match self.peek() {
            Some((Token::EqEq, _)) => CmpOp::Eq,
            Some((Token::NotEq, _)) => CmpOp::Ne,
            Some((Token::Lt, _)) => CmpOp::Lt,
            Some((Token::Le, _)) => CmpOp::Le,
            Some((Token::Gt, _)) => CmpOp::Gt,
            Some((Token::Ge, _)) => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.pos += 1;
        let rhs = self.parse_unary()?;
        Ok(Expr::Cmp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_unary(&mut self) -> ConditionResult<Expr> {
        if matches!(self.peek(), Some((Token::Bang, _))) {
            self.pos += 1;
            let inner = self.parse_unary()?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> ConditionResult<Expr> {
        match self.advance() {
            Some((Token::Word(w), span)) => match w.as_str() {
                "true" => Ok(Expr::Bool(true)),
                "false" => Ok(Expr::Bool(false)),
                "events" => self.parse_event_ref(),
                other => Err(ConditionError::Parse {
                    offset: span.start,
                    message: format!("unknown identifier '{other}'"),
                }),
            },
            Some((Token::Number(n), _)) => Ok(Expr::Number(n)),
            Some((Token::Str(s), _)) => Ok(Expr::Str(s)),
            Some((Token::LParen, _)) => {
                let expr = self.parse_or()?;
                self.expect(&Token::RParen)?;
                Ok(expr)
            }
            Some((token, span)) => Err(ConditionError::Parse {
                offset: span.start,
                message: format!("expected expression, found {token}"),
            }),
            None => Err(self.error_at_current("expected expression, found end of input")),
        }
    }

    /// Parse the remainder of an event reference; `events` is consumed.
    fn parse_event_ref(&mut self) -> ConditionResult<Expr> {
        self.expect(&Token::LBracket)?;
        let event_id = self.expect_string("event id string")?;
        self.expect(&Token::RBracket)?;
        self.expect(&Token::Dot)?;

        let field = match self.advance() {
            Some((Token::Word(w), span)) => match w.as_str() {
                "active" => EventField::Active,
                "state" => EventField::State,
                "effects" => {
                    self.expect(&Token::LBracket)?;
                    let key = self.expect_string("effect key string")?;
                    self.expect(&Token::RBracket)?;
                    EventField::Effect(key)
                }
                other => {
                    return Err(ConditionError::Parse {
                        offset: span.start,
                        message: format!(
                            "expected 'active', 'state', or 'effects', found '{other}'"
                        ),
                    });
                }
            },
            Some((token, span)) => {
                return Err(ConditionError::Parse {
                    offset: span.start,
                    message: format!("expected event field, found {token}"),
                });
            }
            None => {
                return Err(self.error_at_current("expected event field, found end of input"));
            }
        };

        Ok(Expr::EventRef { event_id, field })
    }
}
