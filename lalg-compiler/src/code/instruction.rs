//! Stack-machine instruction set and the numeric cell type.
//!
//! Instructions carry typed operands; `Display` lowers an instruction to
//! its line in the textual object format (uppercase opcode, one space,
//! decimal operand).

use std::cmp::Ordering;
use std::fmt;

// ============================================================================
// Numeric cell
// ============================================================================

/// A numeric cell as the machine sees it: integer or real, decided at
/// runtime by whichever operation produced it. Arithmetic widens to real
/// when either operand is real; division always produces a real.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(i64),
    Real(f64),
}

impl Value {
    pub fn as_f64(self) -> f64 {
        match self {
            Value::Int(n) => n as f64,
            Value::Real(x) => x,
        }
    }

    /// Zero is false, everything else is true.
    pub fn is_truthy(self) -> bool {
        match self {
            Value::Int(n) => n != 0,
            Value::Real(x) => x != 0.0,
        }
    }

    /// Parse a decimal number: integer when the fractional part is absent,
    /// real otherwise. Shared by the object-code loader and `LEIT`.
    pub fn parse(text: &str) -> Option<Value> {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Value::Int(n));
        }
        let x: f64 = text.parse::<f64>().ok().filter(|x| x.is_finite())?;
        if x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
            Some(Value::Int(x as i64))
        } else {
            Some(Value::Real(x))
        }
    }

    pub(crate) fn add(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_add(b)),
            (a, b) => Value::Real(a.as_f64() + b.as_f64()),
        }
    }

    pub(crate) fn sub(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_sub(b)),
            (a, b) => Value::Real(a.as_f64() - b.as_f64()),
        }
    }

    pub(crate) fn mul(self, rhs: Value) -> Value {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a.wrapping_mul(b)),
            (a, b) => Value::Real(a.as_f64() * b.as_f64()),
        }
    }

    /// Numeric ordering across the integer/real divide.
    pub(crate) fn compare(self, rhs: Value) -> Ordering {
        match (self, rhs) {
            (Value::Int(a), Value::Int(b)) => a.cmp(&b),
            (a, b) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Real(x) => write!(f, "{x}"),
        }
    }
}

// ============================================================================
// Instructions
// ============================================================================

/// One machine instruction. Indices into the instruction buffer double as
/// program addresses, so branch operands are buffer indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instr {
    /// `INPP` — sentinel marking program start; a no-op.
    Inpp,
    /// `PARA` — halt cleanly.
    Para,
    /// `ALME n` — append `n` zero cells to the data area.
    Alme(usize),
    /// `DESM n` — drop `n` cells from the end of the data area.
    Desm(usize),
    /// `CRCT v` — push the literal `v`.
    Crct(Value),
    /// `CRVL a` — push `data[a]`.
    Crvl(usize),
    /// `ARMZ a` — pop into `data[a]`.
    Armz(usize),
    /// `SOMA` — pop b, pop a, push a + b.
    Soma,
    /// `SUBT` — pop b, pop a, push a - b.
    Subt,
    /// `MULT` — pop b, pop a, push a * b.
    Mult,
    /// `DIVI` — pop b, pop a, push a / b as a real; b = 0 is a fault.
    Divi,
    /// `CPIG` — push 1 if a = b, else 0.
    Cpig,
    /// `CDIF` — push 1 if a <> b.
    Cdif,
    /// `CMAI` — push 1 if a > b.
    Cmai,
    /// `CMEN` — push 1 if a < b.
    Cmen,
    /// `CPMA` — push 1 if a >= b.
    Cpma,
    /// `CPMI` — push 1 if a <= b.
    Cpmi,
    /// `DSVF t` — pop; branch to `t` when the value is false.
    Dsvf(usize),
    /// `DSVI t` — branch to `t` unconditionally.
    Dsvi(usize),
    /// `IMPR` — pop and print, newline-terminated.
    Impr,
    /// `LEIT` — read one line, parse as a number, push.
    Leit,
    /// `PUSHER ra` — push `ra` onto the return-address stack.
    Pusher(usize),
    /// `PARAM a` — push `data[a]` (argument hand-off before a call).
    Param(usize),
    /// `CHPR e` — transfer control to the procedure entry `e`.
    Chpr(usize),
    /// `RTPR` — return to the popped return address; falls through when
    /// the return stack is empty.
    Rtpr,
}

impl Instr {
    /// The uppercase opcode name, as written in object files and faults.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Instr::Inpp => "INPP",
            Instr::Para => "PARA",
            Instr::Alme(_) => "ALME",
            Instr::Desm(_) => "DESM",
            Instr::Crct(_) => "CRCT",
            Instr::Crvl(_) => "CRVL",
            Instr::Armz(_) => "ARMZ",
            Instr::Soma => "SOMA",
            Instr::Subt => "SUBT",
            Instr::Mult => "MULT",
            Instr::Divi => "DIVI",
            Instr::Cpig => "CPIG",
            Instr::Cdif => "CDIF",
            Instr::Cmai => "CMAI",
            Instr::Cmen => "CMEN",
            Instr::Cpma => "CPMA",
            Instr::Cpmi => "CPMI",
            Instr::Dsvf(_) => "DSVF",
            Instr::Dsvi(_) => "DSVI",
            Instr::Impr => "IMPR",
            Instr::Leit => "LEIT",
            Instr::Pusher(_) => "PUSHER",
            Instr::Param(_) => "PARAM",
            Instr::Chpr(_) => "CHPR",
            Instr::Rtpr => "RTPR",
        }
    }

    /// The branch target of a `DSVF`/`DSVI`, if this is one.
    pub fn branch_target(&self) -> Option<usize> {
        match self {
            Instr::Dsvf(t) | Instr::Dsvi(t) => Some(*t),
            _ => None,
        }
    }
}

// ── Display — lower to object text ──────────────────────────────────────

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mnemonic())?;
        match self {
            Instr::Alme(n)
            | Instr::Desm(n)
            | Instr::Crvl(n)
            | Instr::Armz(n)
            | Instr::Dsvf(n)
            | Instr::Dsvi(n)
            | Instr::Pusher(n)
            | Instr::Param(n)
            | Instr::Chpr(n) => write!(f, " {n}"),
            Instr::Crct(v) => write!(f, " {v}"),
            _ => Ok(()),
        }
    }
}
