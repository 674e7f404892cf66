use logos::{Lexer, Logos, Skip};
use std::fmt;

fn newline(lex: &mut Lexer<Token>) -> Skip {
    lex.extras += 1;
    Skip
}

// Comments may span lines; their newlines still have to count.
fn comment(lex: &mut Lexer<Token>) -> Skip {
    lex.extras += lex.slice().bytes().filter(|&b| b == b'\n').count();
    Skip
}

/// One LALG token. Reserved words match case-insensitively; the identifier
/// token keeps the source spelling.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(extras = usize)]
#[logos(skip r"[ \t\r\f]+")]
pub enum Token {
    // --- Reserved words ---
    #[token("program", ignore(ascii_case))]
    Program,
    #[token("var", ignore(ascii_case))]
    Var,
    #[token("integer", ignore(ascii_case))]
    Integer,
    #[token("real", ignore(ascii_case))]
    Real,
    #[token("procedure", ignore(ascii_case))]
    Procedure,
    #[token("begin", ignore(ascii_case))]
    Begin,
    #[token("end", ignore(ascii_case))]
    End,
    #[token("if", ignore(ascii_case))]
    If,
    #[token("then", ignore(ascii_case))]
    Then,
    #[token("else", ignore(ascii_case))]
    Else,
    #[token("while", ignore(ascii_case))]
    While,
    #[token("do", ignore(ascii_case))]
    Do,
    #[token("read", ignore(ascii_case))]
    Read,
    #[token("write", ignore(ascii_case))]
    Write,

    // --- Identifiers and numerals ---
    #[regex(r"[A-Za-z][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // The fractional form is matched first by virtue of being the longer
    // match, so `10.` lexes as NUM_INT then DOT.
    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse::<f64>().ok())]
    NumReal(f64),

    #[regex(r"[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    NumInt(i64),

    // --- Operators ---
    #[token(":=")]
    Assign,
    #[token("=")]
    Eq,
    #[token("<>")]
    Neq,
    #[token("<=")]
    Lte,
    #[token(">=")]
    Gte,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Times,
    #[token("/")]
    Divide,

    // --- Punctuation ---
    #[token(";")]
    Semicolon,
    #[token(".")]
    Dot,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token("$")]
    Dollar,

    // --- Skipped input that still needs line accounting ---
    #[regex(r"\n", newline)]
    Newline,

    #[regex(r"\{[^}]*\}", comment)]
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/", comment)]
    Comment,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Program => write!(f, "'program'"),
            Token::Var => write!(f, "'var'"),
            Token::Integer => write!(f, "'integer'"),
            Token::Real => write!(f, "'real'"),
            Token::Procedure => write!(f, "'procedure'"),
            Token::Begin => write!(f, "'begin'"),
            Token::End => write!(f, "'end'"),
            Token::If => write!(f, "'if'"),
            Token::Then => write!(f, "'then'"),
            Token::Else => write!(f, "'else'"),
            Token::While => write!(f, "'while'"),
            Token::Do => write!(f, "'do'"),
            Token::Read => write!(f, "'read'"),
            Token::Write => write!(f, "'write'"),
            Token::Ident(s) => write!(f, "'{s}'"),
            Token::NumReal(x) => write!(f, "{x}"),
            Token::NumInt(n) => write!(f, "{n}"),
            Token::Assign => write!(f, "':='"),
            Token::Eq => write!(f, "'='"),
            Token::Neq => write!(f, "'<>'"),
            Token::Lte => write!(f, "'<='"),
            Token::Gte => write!(f, "'>='"),
            Token::Lt => write!(f, "'<'"),
            Token::Gt => write!(f, "'>'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Times => write!(f, "'*'"),
            Token::Divide => write!(f, "'/'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Dot => write!(f, "'.'"),
            Token::Colon => write!(f, "':'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::Comma => write!(f, "','"),
            Token::Dollar => write!(f, "'$'"),
            Token::Newline | Token::Comment => Ok(()),
        }
    }
}

/// An illegal character in the input. Recoverable: the scanner reports it
/// and keeps lexing from the next character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalError {
    pub ch: char,
    pub line: usize,
}

impl fmt::Display for LexicalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lexical error: illegal character '{}' on line {}",
            self.ch, self.line
        )
    }
}

impl std::error::Error for LexicalError {}

/// A token paired with the 1-based source line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
}

/// Lazy token stream over a source string.
///
/// There is no end-of-stream token; exhaustion of the iterator is end of
/// input. Illegal characters come out as `Err` items so the caller can
/// record them and keep pulling tokens.
pub struct Scanner<'src> {
    inner: Lexer<'src, Token>,
}

impl<'src> Scanner<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Token::lexer(source),
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<SpannedToken, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.inner.next()?;
        let line = self.inner.extras + 1;
        Some(match result {
            Ok(token) => Ok(SpannedToken { token, line }),
            Err(()) => Err(LexicalError {
                ch: self.inner.slice().chars().next().unwrap_or('\u{fffd}'),
                line,
            }),
        })
    }
}
