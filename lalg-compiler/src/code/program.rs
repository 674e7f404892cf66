//! The instruction buffer and the textual object-code codec.
//!
//! The buffer is append-only; the one exception is [`Program::patch`],
//! which rewrites a branch operand in place once its target is known
//! (backpatching). Buffer indices are the program addresses branches
//! refer to.

use super::instruction::{Instr, Value};
use std::fmt;
use thiserror::Error;

/// Operand used when a branch is emitted before its target is known.
/// Every placeholder must be patched before the program is run or written.
pub const UNRESOLVED: usize = usize::MAX;

/// Malformed object-code text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObjectError {
    #[error("object error on line {line}: unknown opcode '{opcode}'")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("object error on line {line}: {opcode} needs a numeric operand")]
    BadOperand { line: usize, opcode: String },
}

/// A linear stack-machine program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    instrs: Vec<Instr>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// The address the next emitted instruction will get.
    pub fn here(&self) -> usize {
        self.instrs.len()
    }

    /// Append an instruction and return its address.
    pub fn push(&mut self, instr: Instr) -> usize {
        self.instrs.push(instr);
        self.instrs.len() - 1
    }

    /// Rewrite the target of the branch at `index`.
    pub fn patch(&mut self, index: usize, target: usize) {
        match &mut self.instrs[index] {
            Instr::Dsvf(t) | Instr::Dsvi(t) => *t = target,
            other => debug_assert!(false, "patch of non-branch instruction {other:?}"),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Instr> {
        self.instrs.get(index)
    }

    pub fn instrs(&self) -> &[Instr] {
        &self.instrs
    }

    /// Render to object text, one instruction per line.
    pub fn to_lines(&self) -> Vec<String> {
        self.instrs.iter().map(Instr::to_string).collect()
    }

    /// Load a program from object text. Blank lines are ignored and `#`
    /// starts a trailing comment, so hand-annotated object files stay
    /// runnable.
    pub fn load(text: &str) -> Result<Program, ObjectError> {
        let mut program = Program::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let opcode = parts.next().unwrap_or("");
            let operand = parts.next();
            program.push(parse_instr(opcode, operand, index + 1)?);
        }
        Ok(program)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{instr}")?;
        }
        Ok(())
    }
}

fn parse_instr(opcode: &str, operand: Option<&str>, line: usize) -> Result<Instr, ObjectError> {
    let index = |operand: Option<&str>| -> Result<usize, ObjectError> {
        operand
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| ObjectError::BadOperand {
                line,
                opcode: opcode.to_string(),
            })
    };

    Ok(match opcode {
        "INPP" => Instr::Inpp,
        "PARA" => Instr::Para,
        "ALME" => Instr::Alme(index(operand)?),
        "DESM" => Instr::Desm(index(operand)?),
        "CRCT" => {
            let value = operand
                .and_then(Value::parse)
                .ok_or_else(|| ObjectError::BadOperand {
                    line,
                    opcode: opcode.to_string(),
                })?;
            Instr::Crct(value)
        }
        "CRVL" => Instr::Crvl(index(operand)?),
        "ARMZ" => Instr::Armz(index(operand)?),
        "SOMA" => Instr::Soma,
        "SUBT" => Instr::Subt,
        "MULT" => Instr::Mult,
        "DIVI" => Instr::Divi,
        "CPIG" => Instr::Cpig,
        "CDIF" => Instr::Cdif,
        "CMAI" => Instr::Cmai,
        "CMEN" => Instr::Cmen,
        "CPMA" => Instr::Cpma,
        "CPMI" => Instr::Cpmi,
        "DSVF" => Instr::Dsvf(index(operand)?),
        "DSVI" => Instr::Dsvi(index(operand)?),
        "IMPR" => Instr::Impr,
        "LEIT" => Instr::Leit,
        "PUSHER" => Instr::Pusher(index(operand)?),
        "PARAM" => Instr::Param(index(operand)?),
        "CHPR" => Instr::Chpr(index(operand)?),
        "RTPR" => Instr::Rtpr,
        _ => {
            return Err(ObjectError::UnknownOpcode {
                line,
                opcode: opcode.to_string(),
            })
        }
    })
}
