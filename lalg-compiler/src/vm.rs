//! The stack machine that executes emitted object code.
//!
//! A linear fetch-decode-execute loop over the instruction buffer. State
//! is four pieces: the flat data area (variables), the operand stack
//! (expressions, comparisons, I/O), the return-address stack (procedure
//! linkage), and the program counter. The operand and return stacks are
//! deliberately separate: `PUSHER`/`RTPR` touch only the latter.
//!
//! The data area is permissive: loads and stores past its end extend it
//! with zeros, which is how reading an uninitialized global behaves.

use crate::code::{Instr, Program, Value};
use std::cmp::Ordering;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeFault {
    #[error("runtime fault at pc {pc}: operand stack empty on {op}")]
    StackUnderflow { pc: usize, op: &'static str },

    #[error("runtime fault at pc {pc}: division by zero")]
    DivisionByZero { pc: usize },

    #[error("runtime fault at pc {pc}: input {input:?} is not numeric")]
    NonNumericInput { pc: usize, input: String },

    #[error("runtime fault at pc {pc}: end of input on LEIT")]
    EndOfInput { pc: usize },

    #[error("runtime fault: {0}")]
    Io(#[from] io::Error),
}

pub struct Vm<R, W> {
    program: Program,
    data: Vec<Value>,
    stack: Vec<Value>,
    return_stack: Vec<usize>,
    pc: usize,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Vm<R, W> {
    pub fn new(program: Program, input: R, output: W) -> Self {
        Self {
            program,
            data: Vec::new(),
            stack: Vec::new(),
            return_stack: Vec::new(),
            pc: 0,
            input,
            output,
        }
    }

    /// Run until `PARA`, a fault, or falling off the end of the program.
    pub fn run(&mut self) -> Result<(), RuntimeFault> {
        while let Some(&instr) = self.program.get(self.pc) {
            match instr {
                Instr::Inpp => self.pc += 1,
                Instr::Para => break,
                Instr::Alme(n) => {
                    self.data.extend(std::iter::repeat(Value::Int(0)).take(n));
                    self.pc += 1;
                }
                Instr::Desm(n) => {
                    let keep = self.data.len().saturating_sub(n);
                    self.data.truncate(keep);
                    self.pc += 1;
                }
                Instr::Crct(value) => {
                    self.stack.push(value);
                    self.pc += 1;
                }
                Instr::Crvl(address) | Instr::Param(address) => {
                    let value = self.load(address);
                    self.stack.push(value);
                    self.pc += 1;
                }
                Instr::Armz(address) => {
                    let value = self.pop("ARMZ")?;
                    self.store(address, value);
                    self.pc += 1;
                }
                Instr::Soma => self.arithmetic("SOMA", Value::add)?,
                Instr::Subt => self.arithmetic("SUBT", Value::sub)?,
                Instr::Mult => self.arithmetic("MULT", Value::mul)?,
                Instr::Divi => {
                    let b = self.pop("DIVI")?;
                    let a = self.pop("DIVI")?;
                    if b.as_f64() == 0.0 {
                        return Err(RuntimeFault::DivisionByZero { pc: self.pc });
                    }
                    self.stack.push(Value::Real(a.as_f64() / b.as_f64()));
                    self.pc += 1;
                }
                Instr::Cpig => self.relation("CPIG", |o| o == Ordering::Equal)?,
                Instr::Cdif => self.relation("CDIF", |o| o != Ordering::Equal)?,
                Instr::Cmai => self.relation("CMAI", |o| o == Ordering::Greater)?,
                Instr::Cmen => self.relation("CMEN", |o| o == Ordering::Less)?,
                Instr::Cpma => self.relation("CPMA", |o| o != Ordering::Less)?,
                Instr::Cpmi => self.relation("CPMI", |o| o != Ordering::Greater)?,
                Instr::Dsvf(target) => {
                    let value = self.pop("DSVF")?;
                    if value.is_truthy() {
                        self.pc += 1;
                    } else {
                        self.pc = target;
                    }
                }
                Instr::Dsvi(target) => self.pc = target,
                Instr::Impr => {
                    let value = self.pop("IMPR")?;
                    writeln!(self.output, "{value}")?;
                    self.pc += 1;
                }
                Instr::Leit => {
                    let value = self.read_number()?;
                    self.stack.push(value);
                    self.pc += 1;
                }
                Instr::Pusher(address) => {
                    self.return_stack.push(address);
                    self.pc += 1;
                }
                Instr::Chpr(entry) => self.pc = entry,
                Instr::Rtpr => match self.return_stack.pop() {
                    Some(address) => self.pc = address,
                    // Top-level fall-off; benign.
                    None => self.pc += 1,
                },
            }
        }
        self.output.flush()?;
        Ok(())
    }

    fn pop(&mut self, op: &'static str) -> Result<Value, RuntimeFault> {
        self.stack
            .pop()
            .ok_or(RuntimeFault::StackUnderflow { pc: self.pc, op })
    }

    fn arithmetic(
        &mut self,
        op: &'static str,
        apply: fn(Value, Value) -> Value,
    ) -> Result<(), RuntimeFault> {
        let b = self.pop(op)?;
        let a = self.pop(op)?;
        self.stack.push(apply(a, b));
        self.pc += 1;
        Ok(())
    }

    fn relation(
        &mut self,
        op: &'static str,
        holds: fn(Ordering) -> bool,
    ) -> Result<(), RuntimeFault> {
        let b = self.pop(op)?;
        let a = self.pop(op)?;
        self.stack
            .push(Value::Int(holds(a.compare(b)) as i64));
        self.pc += 1;
        Ok(())
    }

    fn load(&mut self, address: usize) -> Value {
        if address >= self.data.len() {
            self.data.resize(address + 1, Value::Int(0));
        }
        self.data[address]
    }

    fn store(&mut self, address: usize, value: Value) {
        if address >= self.data.len() {
            self.data.resize(address + 1, Value::Int(0));
        }
        self.data[address] = value;
    }

    fn read_number(&mut self) -> Result<Value, RuntimeFault> {
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(RuntimeFault::EndOfInput { pc: self.pc });
        }
        let text = line.trim();
        Value::parse(text).ok_or_else(|| RuntimeFault::NonNumericInput {
            pc: self.pc,
            input: text.to_string(),
        })
    }

    // ── State inspection ────────────────────────────────────────────────

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn return_stack(&self) -> &[usize] {
        &self.return_stack
    }

    pub fn data(&self) -> &[Value] {
        &self.data
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
