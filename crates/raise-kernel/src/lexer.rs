//! Lexer for exception literals.
//!
//! Converts literal text such as `?(multi-error $ok ?(error 'x'))` into a
//! stream of tokens using the logos lexer generator. Quoted strings are
//! unquoted here, so the reader only ever sees their values.

use logos::{Logos, Span};
use std::fmt;

use raise_types::quote::{unquote_double, unquote_single};

/// Lexer error types.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexerError {
    /// A character no token starts with, or a malformed quoted string.
    #[default]
    InvalidToken,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexerError::InvalidToken => write!(f, "invalid token"),
        }
    }
}

/// Tokens of the exception literal syntax.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexerError)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    /// `$ok`
    #[token("$ok")]
    Ok,

    /// `?(` opening a form.
    #[token("?(")]
    OpenForm,

    #[token(")")]
    Close,

    #[regex(r"'([^']|'')*'", |lex| unquote_single(lex.slice()))]
    SingleQuoted(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unquote_double(lex.slice()))]
    DoubleQuoted(String),

    /// A bareword: form names and unquoted strings.
    #[regex(r#"[^\s'"()$?]+"#, |lex| lex.slice().to_string())]
    Bare(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Ok => write!(f, "$ok"),
            Token::OpenForm => write!(f, "'?('"),
            Token::Close => write!(f, "')'"),
            Token::SingleQuoted(s) | Token::DoubleQuoted(s) => write!(f, "string {s:?}"),
            Token::Bare(s) => write!(f, "bareword {s}"),
        }
    }
}

/// A token with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub token: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(token: T, span: Span) -> Self {
        Self { token, span }
    }
}

/// Tokenize literal text, collecting every lexer error.
pub fn tokenize(source: &str) -> Result<Vec<Spanned<Token>>, Vec<Spanned<LexerError>>> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (result, span) in Token::lexer(source).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned::new(token, span)),
            Err(err) => errors.push(Spanned::new(err, span)),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
