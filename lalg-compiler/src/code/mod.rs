pub mod instruction;
pub mod program;

pub use instruction::{Instr, Value};
pub use program::{ObjectError, Program};
