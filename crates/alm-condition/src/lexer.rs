//! Token definitions and the logos-based lexer.

use logos::Logos;
use std::fmt;

/// Token type for the condition language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Logical or `||`.
    OrOr,
    /// Logical and `&&`.
    AndAnd,
    /// Equality `==`.
    EqEq,
    /// Inequality `!=`.
    NotEq,
    /// Less-or-equal `<=`.
    Le,
    /// Greater-or-equal `>=`.
    Ge,
    /// Less-than `<`.
    Lt,
    /// Greater-than `>`.
    Gt,
    /// Logical not `!`.
    Bang,
    /// Left parenthesis `(`.
    LParen,
    /// Right parenthesis `)`.
    RParen,
    /// Left bracket `[`.
    LBracket,
    /// Right bracket `]`.
    RBracket,
    /// Member access `.`.
    Dot,
    /// Single- or double-quoted string literal.
    Str(String),
    /// Numeric literal.
    Number(f64),
    /// Bare word (keyword or identifier, disambiguated by the parser).
    Word(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::OrOr => write!(f, "||"),
            Token::AndAnd => write!(f, "&&"),
            Token::EqEq => write!(f, "=="),
            Token::NotEq => write!(f, "!="),
            Token::Le => write!(f, "<="),
            Token::Ge => write!(f, ">="),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Bang => write!(f, "!"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Dot => write!(f, "."),
            Token::Str(s) => write!(f, "'{s}'"),
            Token::Number(n) => write!(f, "{n}"),
            Token::Word(w) => write!(f, "{w}"),
        }
    }
}

/// Internal logos token — converted to owned [`Token`] after lexing.
#[derive(Logos, Debug)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("||")]
    OrOr,

    #[token("&&")]
    AndAnd,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<=")]
    Le,

    #[token(">=")]
    Ge,

    #[token("<")]
    Lt,

    #[token(">")]
    Gt,

    #[token("!")]
    Bang,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token(".")]
    Dot,

    #[regex(r"'[^'\n]*'")]
    SingleStr,

    #[regex(r#""[^"\n]*""#)]
    DoubleStr,

    #[regex(r"-?[0-9]+(\.[0-9]+)?")]
    Number,

    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,
}

/// A lexer error with source location.
#[derive(Debug, Clone)]
pub struct LexError {
    /// Byte range of the erroneous input in the source.
    pub span: std::ops::Range<usize>,
    /// Human-readable description of the lexer error.
    pub message: String,
}

/// Lex source code into a sequence of `(Token, Span)` pairs.
///
/// Lexing continues past errors to collect as many tokens as possible;
/// the parser reports the first error with its location.
pub fn lex(source: &str) -> (Vec<(Token, std::ops::Range<usize>)>, Vec<LexError>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(raw) => {
                let token = match raw {
                    RawToken::OrOr => Token::OrOr,
                    RawToken::AndAnd => Token::AndAnd,
                    RawToken::EqEq => Token::EqEq,
                    RawToken::NotEq => Token::NotEq,
                    RawToken::Le => Token::Le,
                    RawToken::Ge => Token::Ge,
                    RawToken::Lt => Token::Lt,
                    RawToken::Gt => Token::Gt,
                    RawToken::Bang => Token::Bang,
                    RawToken::LParen => Token::LParen,
                    RawToken::RParen => Token::RParen,
                    RawToken::LBracket => Token::LBracket,
                    RawToken::RBracket => Token::RBracket,
                    RawToken::Dot => Token::Dot,
                    RawToken::SingleStr | RawToken::DoubleStr => {
                        let slice = lexer.slice();
                        Token::Str(slice[1..slice.len() - 1].to_string())
                    }
                    RawToken::Number => {
                        let raw = lexer.slice();
                        match raw.parse::<f64>() {
                            Ok(n) => Token::Number(n),
                            Err(_) => {
                                errors.push(LexError {
                                    span: span.clone(),
                                    message: format!("invalid number literal: {raw}"),
                                });
                                continue;
                            }
                        }
                    }
                    RawToken::Word => Token::Word(lexer.slice().to_string()),
                };
                tokens.push((token, span));
            }
            Err(()) => {
                errors.push(LexError {
                    span: span.clone(),
                    message: format!("unexpected character: {:?}", &source[span.clone()]),
                });
            }
        }
    }

    (tokens, errors)
}
