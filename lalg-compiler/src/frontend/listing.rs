//! Formatted token listing, one `[Category, Value]` line per token.

use super::lexer::Token;
use logos::Logos;

/// Produce the listing lines for a source text. Illegal characters are
/// simply skipped here; the compile pass reports them.
pub fn token_listing(source: &str) -> Vec<String> {
    let mut lexer = Token::lexer(source);
    let mut lines = Vec::new();
    while let Some(result) = lexer.next() {
        let Ok(token) = result else { continue };
        let value = match &token {
            Token::NumInt(n) => n.to_string(),
            Token::NumReal(x) => x.to_string(),
            _ => lexer.slice().to_string(),
        };
        lines.push(format!("[{}, {}]", category(&token), value));
    }
    lines
}

fn category(token: &Token) -> &'static str {
    match token {
        Token::Program
        | Token::Var
        | Token::Integer
        | Token::Real
        | Token::Procedure
        | Token::Begin
        | Token::End
        | Token::If
        | Token::Then
        | Token::Else
        | Token::While
        | Token::Do
        | Token::Read
        | Token::Write => "Palavras Reservadas",
        Token::Ident(_) => "Identificador",
        Token::NumInt(_) | Token::NumReal(_) => "Numeral",
        Token::Assign
        | Token::Eq
        | Token::Neq
        | Token::Lt
        | Token::Gt
        | Token::Lte
        | Token::Gte
        | Token::Plus
        | Token::Minus
        | Token::Times
        | Token::Divide => "Operador",
        Token::Semicolon
        | Token::Dot
        | Token::Colon
        | Token::LParen
        | Token::RParen
        | Token::Comma
        | Token::Dollar => "Pontuacao",
        // Never produced by the lexer; both patterns are skipped.
        Token::Newline | Token::Comment => "Pontuacao",
    }
}
