//! Compiler and stack virtual machine for LALG, a small Pascal-dialect
//! teaching language.
//!
//! The pipeline is strictly forward: source text is tokenized
//! ([`frontend::lexer`]), parsed in a single pass with embedded semantic
//! analysis and code generation ([`parser`]), and the resulting linear
//! instruction buffer ([`code`]) is executed by a stack machine ([`vm`]).
//! The only backward motion anywhere is backpatching of branch operands
//! inside the instruction buffer while the parser is still running.

pub mod code;
pub mod frontend;
pub mod parser;
pub mod vm;

use code::Program;
use std::fmt;
use thiserror::Error;

/// What went wrong semantically. Semantic errors are fatal to compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticErrorKind {
    /// A name was used before any declaration of it is visible.
    UndeclaredSymbol,
    /// A name was declared twice in the same scope.
    RedeclaredSymbol,
    /// A call names a procedure that was never declared.
    UndeclaredProcedure,
    /// A call passes the wrong number of arguments.
    ArityMismatch,
}

impl fmt::Display for SemanticErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SemanticErrorKind::UndeclaredSymbol => "undeclared symbol",
            SemanticErrorKind::RedeclaredSymbol => "symbol redeclared in the same scope",
            SemanticErrorKind::UndeclaredProcedure => "call to undeclared procedure",
            SemanticErrorKind::ArityMismatch => "wrong number of arguments for procedure",
        };
        write!(f, "{s}")
    }
}

/// A fatal compilation error. Lexical and syntax problems are recoverable
/// and surface as [`Diagnostic`]s instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("semantic error on line {line}: {kind} '{name}'")]
    Semantic {
        kind: SemanticErrorKind,
        name: String,
        line: usize,
    },
}

/// A recoverable problem found while compiling. The compiler reports it,
/// skips past it, and keeps going; emitted code after a syntax error may be
/// garbage but an object file is still produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error(transparent)]
    Lexical(#[from] frontend::lexer::LexicalError),

    #[error("syntax error on line {line}: {message}")]
    Syntax { message: String, line: usize },
}

/// The result of a compilation that was not aborted by a semantic error.
#[derive(Debug)]
pub struct CompileOutput {
    /// The emitted instruction buffer.
    pub program: Program,
    /// Lexical and syntax problems encountered along the way, in source
    /// order. Empty for a clean compile.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompileOutput {
    /// True when no diagnostics were recorded.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Compile LALG source text to a stack-machine program.
pub fn compile(source: &str) -> Result<CompileOutput, CompileError> {
    parser::Parser::new(source).parse()
}

/// Compile LALG source text directly to object-code text.
///
/// The text is produced even when recoverable diagnostics were recorded;
/// callers that care should use [`compile`] and inspect the output.
pub fn compile_to_object(source: &str) -> Result<String, CompileError> {
    Ok(compile(source)?.program.to_string())
}
