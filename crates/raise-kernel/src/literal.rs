//! Reader for exception literals.
//!
//! Reads back what [`Repr`](raise_types::Repr) writes:
//!
//! ```text
//! value := "$ok" | "?(" form ")"
//! form  := "error" string
//!        | "return" | "break" | "continue"
//!        | "multi-error" value*
//! ```
//!
//! Strings are barewords or quoted strings.

use thiserror::Error;

use raise_types::{aggregate, Exception, Flow};

use crate::lexer::{tokenize, Spanned, Token};

/// Errors from reading a literal. Offsets are byte positions in the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("invalid token at {0}")]
    Lex(usize),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("unexpected {found} at {at}")]
    Unexpected { found: String, at: usize },
    #[error("unknown form ?({name}) at {at}")]
    UnknownForm { name: String, at: usize },
    #[error("trailing input at {0}")]
    Trailing(usize),
}

/// Read a single exception literal.
pub fn read_exception(source: &str) -> Result<Exception, LiteralError> {
    let tokens = tokenize(source).map_err(|errors| {
        LiteralError::Lex(errors.first().map_or(0, |e| e.span.start))
    })?;
    let mut reader = Reader { tokens, pos: 0 };
    let exc = reader.value()?;
    if let Some(extra) = reader.peek() {
        return Err(LiteralError::Trailing(extra.span.start));
    }
    Ok(exc)
}

struct Reader {
    tokens: Vec<Spanned<Token>>,
    pos: usize,
}

impl Reader {
    fn peek(&self) -> Option<&Spanned<Token>> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Result<Spanned<Token>, LiteralError> {
        let tok = self.tokens.get(self.pos).cloned().ok_or(LiteralError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(tok)
    }

    fn value(&mut self) -> Result<Exception, LiteralError> {
        let tok = self.next()?;
        match tok.token {
            Token::Ok => Ok(Exception::OK),
            Token::OpenForm => self.form(),
            other => Err(unexpected(&other, tok.span.start)),
        }
    }

    fn form(&mut self) -> Result<Exception, LiteralError> {
        let head = self.next()?;
        let name = match head.token {
            Token::Bare(name) => name,
            other => return Err(unexpected(&other, head.span.start)),
        };

        let exc = match name.as_str() {
            "error" => Exception::message(self.string()?),
            "multi-error" => {
                let mut errors = Vec::new();
                while !matches!(self.peek(), Some(Spanned { token: Token::Close, .. }) | None) {
                    errors.push(self.value()?);
                }
                aggregate(errors)
            }
            other => match Flow::from_name(other) {
                Some(flow) => Exception::new(flow),
                None => {
                    return Err(LiteralError::UnknownForm {
                        name,
                        at: head.span.start,
                    });
                }
            },
        };

        let close = self.next()?;
        if close.token != Token::Close {
            return Err(unexpected(&close.token, close.span.start));
        }
        Ok(exc)
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let tok = self.next()?;
        match tok.token {
            Token::Bare(s) | Token::SingleQuoted(s) | Token::DoubleQuoted(s) => Ok(s),
            other => Err(unexpected(&other, tok.span.start)),
        }
    }
}

fn unexpected(token: &Token, at: usize) -> LiteralError {
    LiteralError::Unexpected {
        found: token.to_string(),
        at,
    }
}
