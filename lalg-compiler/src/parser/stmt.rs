//! Statement productions: assignment, I/O, control flow, procedure calls.

use super::{ParseError, Parser, PResult};
use crate::code::program::UNRESOLVED;
use crate::code::{Instr, Value};
use crate::frontend::lexer::Token;

/// A call argument as written: a variable (becomes `PARAM addr`) or a
/// numeric literal (becomes `CRCT v`). Either way exactly one instruction,
/// which the return-address arithmetic relies on.
enum CallArg {
    Var(String, usize),
    Lit(Value),
}

impl Parser<'_> {
    /// `comandos`: statements until a block-closing token (`end`, `else`,
    /// `$`, or end of input). A syntax error inside one statement skips to
    /// the next statement boundary and keeps going.
    pub(super) fn statements(&mut self) -> PResult<()> {
        loop {
            match self.peek() {
                Some(
                    Token::Read | Token::Write | Token::If | Token::While | Token::Ident(_),
                ) => {
                    if let Err(error) = self.statement() {
                        match error {
                            ParseError::Fatal(_) => return Err(error),
                            ParseError::Syntax => self.synchronize_statement(),
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn statement(&mut self) -> PResult<()> {
        match self.peek() {
            Some(Token::Read) => self.read_statement(),
            Some(Token::Write) => self.write_statement(),
            Some(Token::If) => self.if_statement(),
            Some(Token::While) => self.while_statement(),
            _ => self.assignment_or_call(),
        }
    }

    /// Skip ahead to something that can start or follow a statement.
    fn synchronize_statement(&mut self) {
        self.advance();
        loop {
            match self.peek() {
                None
                | Some(
                    Token::Read
                    | Token::Write
                    | Token::If
                    | Token::While
                    | Token::Ident(_)
                    | Token::End
                    | Token::Else
                    | Token::Dollar,
                ) => break,
                Some(Token::Semicolon) => {
                    self.advance();
                    break;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// `read ( IDENT )` — `LEIT` then `ARMZ` into the variable.
    fn read_statement(&mut self) -> PResult<()> {
        self.expect(Token::Read)?;
        self.expect(Token::LParen)?;
        let (name, line) = self.expect_ident()?;
        self.expect(Token::RParen)?;
        self.gen.emit(Instr::Leit);
        let address = self.gen.resolve(&name, line)?;
        self.gen.emit(Instr::Armz(address));
        self.eat(Token::Semicolon);
        Ok(())
    }

    /// `write ( IDENT )` — `CRVL` then `IMPR`.
    fn write_statement(&mut self) -> PResult<()> {
        self.expect(Token::Write)?;
        self.expect(Token::LParen)?;
        let (name, line) = self.expect_ident()?;
        self.expect(Token::RParen)?;
        let address = self.gen.resolve(&name, line)?;
        self.gen.emit(Instr::Crvl(address));
        self.gen.emit(Instr::Impr);
        self.eat(Token::Semicolon);
        Ok(())
    }

    /// `if condicao then comandos [else comandos] $`
    ///
    /// The condition leaves a `DSVF` with a hole. Without an else the hole
    /// is patched to the join point; with one, an extra `DSVI` jumps the
    /// then-branch over the else-branch and both holes are patched once
    /// their targets exist.
    fn if_statement(&mut self) -> PResult<()> {
        self.expect(Token::If)?;
        let branch = self.condition()?;
        self.expect(Token::Then)?;
        self.statements()?;
        if self.eat(Token::Else) {
            let exit = self.gen.emit(Instr::Dsvi(UNRESOLVED));
            let else_start = self.gen.here();
            self.gen.patch(branch, else_start);
            self.statements()?;
            let join = self.gen.here();
            self.gen.patch(exit, join);
        } else {
            let join = self.gen.here();
            self.gen.patch(branch, join);
        }
        self.expect(Token::Dollar)?;
        Ok(())
    }

    /// `while condicao do comandos $`
    ///
    /// The loop-top address is captured before the condition emits
    /// anything; the condition's length is not fixed, so it can never be
    /// reconstructed from the `DSVF` index afterwards.
    fn while_statement(&mut self) -> PResult<()> {
        self.expect(Token::While)?;
        let loop_top = self.gen.here();
        let branch = self.condition()?;
        self.expect(Token::Do)?;
        self.statements()?;
        self.gen.emit(Instr::Dsvi(loop_top));
        let exit = self.gen.here();
        self.gen.patch(branch, exit);
        self.expect(Token::Dollar)?;
        Ok(())
    }

    /// `condicao := expressao relacao expressao` — emits both operands,
    /// the comparison, and a `DSVF` with an unresolved target. Returns the
    /// `DSVF` address for the caller to patch.
    fn condition(&mut self) -> PResult<usize> {
        self.expression()?;
        let relation = match self.peek() {
            Some(Token::Eq) => Instr::Cpig,
            Some(Token::Neq) => Instr::Cdif,
            Some(Token::Gte) => Instr::Cpma,
            Some(Token::Lte) => Instr::Cpmi,
            Some(Token::Gt) => Instr::Cmai,
            Some(Token::Lt) => Instr::Cmen,
            _ => {
                let message = match &self.current {
                    Some(found) => {
                        format!("expected a relational operator, found {}", found.token)
                    }
                    None => "expected a relational operator, found end of file".to_string(),
                };
                return Err(self.syntax_error(message));
            }
        };
        self.advance();
        self.expression()?;
        self.gen.emit(relation);
        Ok(self.gen.emit(Instr::Dsvf(UNRESOLVED)))
    }

    /// A statement opening with an identifier: `IDENT := expressao`, or a
    /// procedure call `IDENT [( argumentos )]`.
    fn assignment_or_call(&mut self) -> PResult<()> {
        let (name, line) = self.expect_ident()?;
        match self.peek() {
            Some(Token::Assign) => {
                self.advance();
                self.expression()?;
                let address = self.gen.resolve(&name, line)?;
                self.gen.emit(Instr::Armz(address));
            }
            Some(Token::LParen) => {
                let args = self.argument_list()?;
                self.call(name, args, line)?;
            }
            _ => {
                self.call(name, Vec::new(), line)?;
            }
        }
        self.eat(Token::Semicolon);
        Ok(())
    }

    /// `( [argumento {, argumento}] )`
    fn argument_list(&mut self) -> PResult<Vec<CallArg>> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(Token::RParen)) {
            loop {
                let arg = match self.peek() {
                    Some(Token::Ident(_)) => {
                        let (name, line) = self.expect_ident()?;
                        CallArg::Var(name, line)
                    }
                    Some(&Token::NumInt(n)) => {
                        self.advance();
                        CallArg::Lit(Value::Int(n))
                    }
                    Some(&Token::NumReal(x)) => {
                        self.advance();
                        CallArg::Lit(Value::Real(x))
                    }
                    _ => {
                        let message = match &self.current {
                            Some(found) => format!("expected an argument, found {}", found.token),
                            None => "expected an argument, found end of file".to_string(),
                        };
                        return Err(self.syntax_error(message));
                    }
                };
                args.push(arg);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }

    /// Emit a procedure call.
    ///
    /// `PUSHER ra`, the argument instructions in reverse argument order
    /// (so the first parameter's value ends up on top for the callee's
    /// declaration-order `ARMZ`s), then `CHPR`. The return address counts
    /// one instruction per argument plus the `PUSHER` and `CHPR`.
    fn call(&mut self, name: String, args: Vec<CallArg>, line: usize) -> PResult<()> {
        let info = self.gen.check_call(&name, args.len(), line)?;
        let entry = info.entry;

        let mut arg_instrs = Vec::with_capacity(args.len());
        for arg in &args {
            let instr = match arg {
                CallArg::Var(var, var_line) => Instr::Param(self.gen.resolve(var, *var_line)?),
                CallArg::Lit(value) => Instr::Crct(*value),
            };
            arg_instrs.push(instr);
        }

        let return_address = self.gen.here() + args.len() + 2;
        self.gen.emit(Instr::Pusher(return_address));
        for instr in arg_instrs.into_iter().rev() {
            self.gen.emit(instr);
        }
        self.gen.emit(Instr::Chpr(entry));
        Ok(())
    }
}
