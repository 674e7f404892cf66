//! Expression productions.
//!
//! Every production leaves exactly one value on the machine's operand
//! stack: operands are emitted first, their operator after, so `2 + 3 * 4`
//! becomes `CRCT 2, CRCT 3, CRCT 4, MULT, SOMA`.

use super::{Parser, PResult};
use crate::code::{Instr, Value};
use crate::frontend::lexer::Token;

impl Parser<'_> {
    /// `expressao := termo {(+|-) termo}`
    pub(super) fn expression(&mut self) -> PResult<()> {
        self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => Instr::Soma,
                Some(Token::Minus) => Instr::Subt,
                _ => break,
            };
            self.advance();
            self.term()?;
            self.gen.emit(op);
        }
        Ok(())
    }

    /// `termo := [-] fator {(*|/) fator}`
    ///
    /// A leading minus negates the whole term by subtracting it from a
    /// zero pushed up front.
    fn term(&mut self) -> PResult<()> {
        let negated = self.eat(Token::Minus);
        if negated {
            self.gen.emit(Instr::Crct(Value::Int(0)));
        }
        self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Times) => Instr::Mult,
                Some(Token::Divide) => Instr::Divi,
                _ => break,
            };
            self.advance();
            self.factor()?;
            self.gen.emit(op);
        }
        if negated {
            self.gen.emit(Instr::Subt);
        }
        Ok(())
    }

    /// `fator := IDENT | NUM_INT | NUM_REAL | ( expressao )`
    fn factor(&mut self) -> PResult<()> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let (name, line) = self.expect_ident()?;
                let address = self.gen.resolve(&name, line)?;
                self.gen.emit(Instr::Crvl(address));
                Ok(())
            }
            Some(&Token::NumInt(n)) => {
                self.advance();
                self.gen.emit(Instr::Crct(Value::Int(n)));
                Ok(())
            }
            Some(&Token::NumReal(x)) => {
                self.advance();
                self.gen.emit(Instr::Crct(Value::Real(x)));
                Ok(())
            }
            Some(Token::LParen) => {
                self.advance();
                self.expression()?;
                self.expect(Token::RParen)?;
                Ok(())
            }
            _ => {
                let message = match &self.current {
                    Some(found) => format!("expected an expression, found {}", found.token),
                    None => "expected an expression, found end of file".to_string(),
                };
                Err(self.syntax_error(message))
            }
        }
    }
}
