//! Single-pass recursive-descent parser for LALG.
//!
//! Grammar productions double as code-generation actions: each production
//! emits stack-machine instructions through the [`Gen`] context while it
//! recognizes its phrase, and control flow is wired up afterwards by
//! backpatching branch operands. There is no syntax tree.
//!
//! Error discipline: lexical and syntax problems become diagnostics and
//! parsing resynchronizes at the next statement or declaration boundary;
//! semantic problems abort compilation through a fatal [`CompileError`].

pub mod context;
pub mod symbol_table;

mod expr;
mod stmt;

use crate::code::program::UNRESOLVED;
use crate::code::Instr;
use crate::frontend::lexer::{Scanner, SpannedToken, Token};
use crate::{CompileError, CompileOutput, Diagnostic};
use context::Gen;
use symbol_table::{SymbolKind, VarType};

/// Internal control flow for productions: syntax errors have already been
/// recorded as diagnostics when this is raised, semantic errors abort.
pub(crate) enum ParseError {
    Fatal(CompileError),
    Syntax,
}

impl From<CompileError> for ParseError {
    fn from(e: CompileError) -> Self {
        ParseError::Fatal(e)
    }
}

pub(crate) type PResult<T> = Result<T, ParseError>;

pub struct Parser<'src> {
    scanner: Scanner<'src>,
    current: Option<SpannedToken>,
    /// Line of the most recently seen token, for end-of-file messages.
    line: usize,
    pub(crate) gen: Gen,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut parser = Parser {
            scanner: Scanner::new(source),
            current: None,
            line: 1,
            gen: Gen::new(),
        };
        parser.advance();
        parser
    }

    /// Run the `programa` production to completion and hand back whatever
    /// was emitted, degraded or not, together with the diagnostics.
    pub fn parse(mut self) -> Result<CompileOutput, CompileError> {
        match self.program() {
            Ok(()) => {}
            Err(ParseError::Fatal(e)) => return Err(e),
            Err(ParseError::Syntax) => {}
        }
        Ok(CompileOutput {
            program: self.gen.out,
            diagnostics: self.gen.diagnostics,
        })
    }

    // ── Token cursor ────────────────────────────────────────────────────

    /// Step to the next token, turning illegal characters into diagnostics
    /// along the way. Returns the token stepped over.
    fn advance(&mut self) -> Option<SpannedToken> {
        let previous = self.current.take();
        loop {
            match self.scanner.next() {
                Some(Ok(token)) => {
                    self.line = token.line;
                    self.current = Some(token);
                    break;
                }
                Some(Err(error)) => self.gen.diagnostics.push(Diagnostic::Lexical(error)),
                None => break,
            }
        }
        previous
    }

    fn peek(&self) -> Option<&Token> {
        self.current.as_ref().map(|t| &t.token)
    }

    /// Consume the current token when it equals `token`.
    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(&token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn syntax_error(&mut self, message: String) -> ParseError {
        self.gen.diagnostics.push(Diagnostic::Syntax {
            message,
            line: self.line,
        });
        ParseError::Syntax
    }

    fn expect(&mut self, token: Token) -> PResult<()> {
        if self.eat(token.clone()) {
            return Ok(());
        }
        let message = match &self.current {
            Some(found) => format!("expected {token}, found {}", found.token),
            None => format!("expected {token}, found end of file"),
        };
        Err(self.syntax_error(message))
    }

    /// Consume an identifier, returning its spelling and line.
    fn expect_ident(&mut self) -> PResult<(String, usize)> {
        if matches!(self.peek(), Some(Token::Ident(_))) {
            if let Some(SpannedToken {
                token: Token::Ident(name),
                line,
            }) = self.advance()
            {
                return Ok((name, line));
            }
        }
        let message = match &self.current {
            Some(found) => format!("expected an identifier, found {}", found.token),
            None => "expected an identifier, found end of file".to_string(),
        };
        Err(self.syntax_error(message))
    }

    // ── Program structure ───────────────────────────────────────────────

    /// `programa := program IDENT corpo .`
    fn program(&mut self) -> PResult<()> {
        self.gen.emit(Instr::Inpp);
        self.expect(Token::Program)?;
        let _name = self.expect_ident()?;
        self.body()?;
        self.expect(Token::Dot)?;
        self.gen.emit(Instr::Para);
        if self.current.is_some() {
            let message = "text after the final '.'".to_string();
            return Err(self.syntax_error(message));
        }
        Ok(())
    }

    /// `corpo := dc begin comandos end`
    fn body(&mut self) -> PResult<()> {
        self.declarations()?;
        self.expect(Token::Begin)?;
        self.statements()?;
        self.expect(Token::End)?;
        Ok(())
    }

    /// `dc`: variable and procedure declarations, each terminated by `;`.
    fn declarations(&mut self) -> PResult<()> {
        loop {
            let result = match self.peek() {
                Some(Token::Var) => self.var_declaration(),
                Some(Token::Procedure) => self.procedure_declaration(),
                _ => break,
            };
            match result {
                Ok(()) => {
                    if !self.eat(Token::Semicolon) {
                        break;
                    }
                }
                Err(ParseError::Fatal(e)) => return Err(ParseError::Fatal(e)),
                Err(ParseError::Syntax) => {
                    // A procedure may have been abandoned mid-scope.
                    self.gen.symbols.reset_to_global();
                    self.synchronize_declaration();
                }
            }
        }
        Ok(())
    }

    fn synchronize_declaration(&mut self) {
        loop {
            match self.peek() {
                None | Some(Token::Var | Token::Procedure | Token::Begin) => break,
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

    /// `dc_v := var variaveis : tipo_var` — declare each name and reserve
    /// its cell with `ALME 1`.
    fn var_declaration(&mut self) -> PResult<()> {
        self.expect(Token::Var)?;
        let names = self.name_list()?;
        self.expect(Token::Colon)?;
        let ty = self.type_name()?;
        for (name, line) in names {
            self.gen.declare(&name, ty, SymbolKind::Variable, line)?;
            self.gen.emit(Instr::Alme(1));
        }
        Ok(())
    }

    /// `variaveis := IDENT {, IDENT}`
    fn name_list(&mut self) -> PResult<Vec<(String, usize)>> {
        let mut names = vec![self.expect_ident()?];
        while self.eat(Token::Comma) {
            names.push(self.expect_ident()?);
        }
        Ok(names)
    }

    /// `tipo_var := integer | real`
    fn type_name(&mut self) -> PResult<VarType> {
        if self.eat(Token::Integer) {
            Ok(VarType::Integer)
        } else if self.eat(Token::Real) {
            Ok(VarType::Real)
        } else {
            let message = match &self.current {
                Some(found) => format!("expected a type name, found {}", found.token),
                None => "expected a type name, found end of file".to_string(),
            };
            Err(self.syntax_error(message))
        }
    }

    /// `dc_p := procedure IDENT [parametros] corpo_p`
    ///
    /// Emission protocol: a `DSVI` first so linear fall-through never runs
    /// the body; one `ALME 1` per parameter, then one `ARMZ` per parameter
    /// in declaration order to capture the arguments the caller stacked;
    /// locals; body; `DESM`/`RTPR` epilogue. The descriptor is registered
    /// once the body is complete, and the `DSVI` is patched past it.
    fn procedure_declaration(&mut self) -> PResult<()> {
        self.expect(Token::Procedure)?;
        let (name, line) = self.expect_ident()?;
        if self.gen.procedures.contains_key(&name) {
            return Err(ParseError::Fatal(CompileError::Semantic {
                kind: crate::SemanticErrorKind::RedeclaredSymbol,
                name,
                line,
            }));
        }

        let skip = self.gen.emit(Instr::Dsvi(UNRESOLVED));
        let entry = skip + 1;

        self.gen.symbols.enter_scope();

        let params = if matches!(self.peek(), Some(Token::LParen)) {
            self.parameter_list()?
        } else {
            Vec::new()
        };
        for &address in &params {
            self.gen.emit(Instr::Armz(address));
        }

        // Local declarations, `var` lines separated or terminated by `;`.
        while matches!(self.peek(), Some(Token::Var)) {
            self.var_declaration()?;
            if !self.eat(Token::Semicolon) {
                break;
            }
        }

        self.expect(Token::Begin)?;
        self.statements()?;
        self.expect(Token::End)?;

        let frame = self.gen.symbols.current_scope_len();
        self.gen.emit(Instr::Desm(frame));
        self.gen.emit(Instr::Rtpr);

        self.gen.symbols.leave_scope();
        self.gen
            .procedures
            .insert(name, context::ProcedureInfo { entry, params });

        let after_body = self.gen.here();
        self.gen.patch(skip, after_body);
        Ok(())
    }

    /// `parametros := ( lista_par )` — groups of `names : type` separated
    /// by `;`. Returns the parameter addresses in declaration order.
    fn parameter_list(&mut self) -> PResult<Vec<usize>> {
        self.expect(Token::LParen)?;
        let mut addresses = Vec::new();
        loop {
            let names = self.name_list()?;
            self.expect(Token::Colon)?;
            let ty = self.type_name()?;
            for (name, line) in names {
                let address = self.gen.declare(&name, ty, SymbolKind::Parameter, line)?;
                self.gen.emit(Instr::Alme(1));
                addresses.push(address);
            }
            if !self.eat(Token::Semicolon) {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(addresses)
    }
}
