use lalg_compiler::code::{Program, Value};
use lalg_compiler::compile;
use lalg_compiler::vm::{RuntimeFault, Vm};
use std::io::Cursor;

// ── Helpers ──────────────────────────────────────────────────────────────

fn run_ok(source: &str, input: &str) -> (String, Vec<Value>, Vec<usize>) {
    let output = compile(source).expect("compilation should succeed");
    assert!(
        output.is_clean(),
        "unexpected diagnostics: {:?}",
        output.diagnostics
    );
    let mut vm = Vm::new(output.program, Cursor::new(input.as_bytes()), Vec::new());
    vm.run().expect("execution should succeed");
    let stack = vm.stack().to_vec();
    let return_stack = vm.return_stack().to_vec();
    let stdout = String::from_utf8(vm.into_output()).expect("utf-8 output");
    (stdout, stack, return_stack)
}

fn run_fault(source: &str, input: &str) -> RuntimeFault {
    let output = compile(source).expect("compilation should succeed");
    assert!(output.is_clean());
    let mut vm = Vm::new(output.program, Cursor::new(input.as_bytes()), Vec::new());
    vm.run().expect_err("execution should fault")
}

// ── The literal scenarios ────────────────────────────────────────────────

#[test]
fn assign_and_write() {
    let (stdout, stack, return_stack) =
        run_ok("program t var a: integer; begin a := 10; write(a) end.", "");
    assert_eq!(stdout, "10\n");
    assert!(stack.is_empty());
    assert!(return_stack.is_empty());
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let (stdout, _, _) = run_ok(
        "program t var r: integer; begin r := 2 + 3 * 4; write(r) end.",
        "",
    );
    assert_eq!(stdout, "14\n");
}

#[test]
fn if_else_takes_the_else_branch() {
    let (stdout, stack, _) = run_ok(
        "program t var a: integer;
         begin
           a := 7;
           if a < 5 then write(a) else write(a) $
         end.",
        "",
    );
    assert_eq!(stdout, "7\n");
    assert!(stack.is_empty());
}

#[test]
fn if_without_else_runs_when_true() {
    let (stdout, _, _) = run_ok(
        "program t var a: integer; begin a := 7; if a > 5 then write(a) $ end.",
        "",
    );
    assert_eq!(stdout, "7\n");
}

#[test]
fn if_without_else_skips_when_false() {
    let (stdout, stack, _) = run_ok(
        "program t var a: integer; begin a := 3; if a > 5 then write(a) $ end.",
        "",
    );
    assert_eq!(stdout, "");
    assert!(stack.is_empty());
}

#[test]
fn while_counts_to_three() {
    let (stdout, stack, return_stack) = run_ok(
        "program t var a: integer;
         begin
           a := 0;
           while a < 4 do
             write(a);
             a := a + 1
           $
         end.",
        "",
    );
    assert_eq!(stdout, "0\n1\n2\n3\n");
    assert!(stack.is_empty());
    assert!(return_stack.is_empty());
}

#[test]
fn procedure_receives_its_argument() {
    let (stdout, stack, return_stack) = run_ok(
        "program t
         procedure p(x: integer)
         begin write(x) end;
         begin p(42) end.",
        "",
    );
    assert_eq!(stdout, "42\n");
    assert!(stack.is_empty());
    assert!(return_stack.is_empty());
}

// ── Calling convention ───────────────────────────────────────────────────

#[test]
fn parameters_arrive_in_declaration_order() {
    let (stdout, _, return_stack) = run_ok(
        "program t
         var a, b: integer;
         procedure q(x, y: integer)
         begin write(x); write(y) end;
         begin a := 1; b := 2; q(a, b) end.",
        "",
    );
    assert_eq!(stdout, "1\n2\n");
    assert!(return_stack.is_empty());
}

#[test]
fn procedure_parameter_shadows_a_global() {
    let (stdout, _, _) = run_ok(
        "program t
         var a: integer;
         procedure p(a: integer)
         begin write(a) end;
         begin
           a := 1;
           p(9);
           write(a)
         end.",
        "",
    );
    assert_eq!(stdout, "9\n1\n");
}

#[test]
fn zero_argument_procedure_call() {
    let (stdout, _, return_stack) = run_ok(
        "program t
         var a: integer;
         procedure hello
         begin write(a) end;
         begin a := 5; hello end.",
        "",
    );
    assert_eq!(stdout, "5\n");
    assert!(return_stack.is_empty());
}

// ── Arithmetic and I/O semantics ─────────────────────────────────────────

#[test]
fn division_always_yields_a_real() {
    let (stdout, _, _) = run_ok(
        "program t var r: integer; begin r := 7 / 2; write(r) end.",
        "",
    );
    assert_eq!(stdout, "3.5\n");
}

#[test]
fn unary_minus_negates_a_term() {
    let (stdout, _, _) = run_ok(
        "program t var a: integer; begin a := -5; write(a) end.",
        "",
    );
    assert_eq!(stdout, "-5\n");
}

#[test]
fn read_pushes_what_was_typed() {
    let (stdout, _, _) = run_ok(
        "program t var a: integer; begin read(a); write(a) end.",
        "5\n",
    );
    assert_eq!(stdout, "5\n");
}

#[test]
fn read_accepts_reals() {
    let (stdout, _, _) = run_ok(
        "program t var a: real; begin read(a); write(a) end.",
        "2.5\n",
    );
    assert_eq!(stdout, "2.5\n");
}

#[test]
fn uninitialized_variable_reads_as_zero() {
    let (stdout, _, _) = run_ok("program t var a: integer; begin write(a) end.", "");
    assert_eq!(stdout, "0\n");
}

#[test]
fn real_literals_flow_through() {
    let (stdout, _, _) = run_ok(
        "program t var r: real; begin r := 1.5 + 1; write(r) end.",
        "",
    );
    assert_eq!(stdout, "2.5\n");
}

// ── Runtime faults ───────────────────────────────────────────────────────

#[test]
fn division_by_zero_faults() {
    let fault = run_fault(
        "program t var a, b: integer; begin b := 0; a := 1 / b end.",
        "",
    );
    assert!(matches!(fault, RuntimeFault::DivisionByZero { .. }));
}

#[test]
fn non_numeric_input_faults() {
    let fault = run_fault("program t var a: integer; begin read(a) end.", "hello\n");
    assert!(matches!(fault, RuntimeFault::NonNumericInput { .. }));
}

#[test]
fn consuming_an_empty_stack_faults_with_pc_and_opcode() {
    let program = Program::load("SOMA\n").expect("loadable");
    let mut vm = Vm::new(program, Cursor::new(&b""[..]), Vec::new());
    match vm.run() {
        Err(RuntimeFault::StackUnderflow { pc, op }) => {
            assert_eq!(pc, 0);
            assert_eq!(op, "SOMA");
        }
        other => panic!("expected a stack underflow, got {other:?}"),
    }
}

// ── Determinism and loading ──────────────────────────────────────────────

#[test]
fn write_only_programs_are_deterministic() {
    let source = "program t var a: integer;
                  begin a := 0; while a < 10 do write(a); a := a + 3 $ end.";
    let (first, _, _) = run_ok(source, "");
    let (second, _, _) = run_ok(source, "");
    assert_eq!(first.into_bytes(), second.into_bytes());
}

#[test]
fn a_written_object_file_runs_the_same() {
    let source = "program t var a: integer; begin a := 10; write(a) end.";
    let text = lalg_compiler::compile_to_object(source).expect("compiles");
    let program = Program::load(&text).expect("loads");
    let mut vm = Vm::new(program, Cursor::new(&b""[..]), Vec::new());
    vm.run().expect("runs");
    assert_eq!(String::from_utf8(vm.into_output()).expect("utf-8"), "10\n");
}
