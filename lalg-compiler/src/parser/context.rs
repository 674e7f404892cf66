use crate::code::{Instr, Program};
use crate::parser::symbol_table::{SymbolKind, SymbolTable, VarType};
use crate::{CompileError, Diagnostic, SemanticErrorKind};
use std::collections::HashMap;

/// Everything recorded about a declared procedure: where its body starts
/// and the data-area addresses of its parameters in declaration order.
#[derive(Debug, Clone)]
pub struct ProcedureInfo {
    pub entry: usize,
    pub params: Vec<usize>,
}

impl ProcedureInfo {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Code-generation context threaded through every parser production.
///
/// Owns the growing instruction buffer, the symbol table, the procedure
/// descriptors, and the recoverable diagnostics. Parse productions emit
/// through it and ask it semantic questions; a semantic failure comes back
/// as a fatal [`CompileError`].
pub struct Gen {
    pub out: Program,
    pub symbols: SymbolTable,
    pub procedures: HashMap<String, ProcedureInfo>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Gen {
    pub fn new() -> Self {
        Self {
            out: Program::new(),
            symbols: SymbolTable::new(),
            procedures: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Append an instruction; the returned address is what backpatching
    /// later rewrites.
    pub fn emit(&mut self, instr: Instr) -> usize {
        self.out.push(instr)
    }

    /// Address of the next instruction to be emitted.
    pub fn here(&self) -> usize {
        self.out.here()
    }

    pub fn patch(&mut self, index: usize, target: usize) {
        self.out.patch(index, target);
    }

    /// Declare a variable or parameter in the current scope.
    pub fn declare(
        &mut self,
        name: &str,
        ty: VarType,
        kind: SymbolKind,
        line: usize,
    ) -> Result<usize, CompileError> {
        self.symbols
            .declare(name, ty, kind)
            .map_err(|_existing| CompileError::Semantic {
                kind: SemanticErrorKind::RedeclaredSymbol,
                name: name.to_string(),
                line,
            })
    }

    /// Resolve a name to its data-area address.
    pub fn resolve(&self, name: &str, line: usize) -> Result<usize, CompileError> {
        self.symbols
            .resolve(name)
            .map(|symbol| symbol.address)
            .ok_or_else(|| CompileError::Semantic {
                kind: SemanticErrorKind::UndeclaredSymbol,
                name: name.to_string(),
                line,
            })
    }

    /// Look up a procedure and check the call's arity against it.
    pub fn check_call(
        &self,
        name: &str,
        argc: usize,
        line: usize,
    ) -> Result<&ProcedureInfo, CompileError> {
        let info = self
            .procedures
            .get(name)
            .ok_or_else(|| CompileError::Semantic {
                kind: SemanticErrorKind::UndeclaredProcedure,
                name: name.to_string(),
                line,
            })?;
        if info.arity() != argc {
            return Err(CompileError::Semantic {
                kind: SemanticErrorKind::ArityMismatch,
                name: name.to_string(),
                line,
            });
        }
        Ok(info)
    }
}

impl Default for Gen {
    fn default() -> Self {
        Self::new()
    }
}
