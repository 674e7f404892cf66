use lalg_compiler::parser::symbol_table::{SymbolKind, SymbolTable, VarType};
use lalg_compiler::{compile, CompileError, CompileOutput, Diagnostic, SemanticErrorKind};

// ── Semantic error detection ─────────────────────────────────────────────
// Each test verifies that an invalid program produces the correct error
// kind and offending name.

fn assert_semantic_error(
    result: Result<CompileOutput, CompileError>,
    expected: SemanticErrorKind,
    expected_name: &str,
) {
    match result {
        Ok(_) => panic!("expected {expected:?} error, but compilation succeeded"),
        Err(CompileError::Semantic { kind, name, .. }) => {
            assert_eq!(kind, expected);
            assert_eq!(name, expected_name);
        }
    }
}

#[test]
fn assignment_to_undeclared_symbol() {
    let result = compile("program t var a: integer; begin b := 1 end.");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredSymbol, "b");
}

#[test]
fn undeclared_symbol_in_expression() {
    let result = compile("program t var a: integer; begin a := c + 1 end.");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredSymbol, "c");
}

#[test]
fn undeclared_symbol_in_write() {
    let result = compile("program t var a: integer; begin write(b) end.");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredSymbol, "b");
}

#[test]
fn undeclared_symbol_in_read() {
    let result = compile("program t begin read(x) end.");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredSymbol, "x");
}

#[test]
fn redeclaration_in_same_scope() {
    let result = compile("program t var a: integer; var a: real; begin a := 1 end.");
    assert_semantic_error(result, SemanticErrorKind::RedeclaredSymbol, "a");
}

#[test]
fn duplicate_parameter_names() {
    let result = compile(
        "program t
         procedure p(x: integer; x: integer)
         begin write(x) end;
         begin p(1, 2) end.",
    );
    assert_semantic_error(result, SemanticErrorKind::RedeclaredSymbol, "x");
}

#[test]
fn shadowing_across_scopes_is_allowed() {
    let result = compile(
        "program t
         var a: integer;
         procedure p(a: integer)
         begin write(a) end;
         begin p(1) end.",
    );
    let output = result.expect("shadowing is not a redeclaration");
    assert!(output.is_clean());
}

#[test]
fn call_to_undeclared_procedure() {
    let result = compile("program t var a: integer; begin q(a) end.");
    assert_semantic_error(result, SemanticErrorKind::UndeclaredProcedure, "q");
}

#[test]
fn call_with_wrong_arity() {
    let result = compile(
        "program t
         procedure p(x: integer)
         begin write(x) end;
         begin p(1, 2) end.",
    );
    assert_semantic_error(result, SemanticErrorKind::ArityMismatch, "p");
}

#[test]
fn procedure_name_redeclared() {
    let result = compile(
        "program t
         procedure p
         begin end;
         procedure p
         begin end;
         begin p end.",
    );
    assert_semantic_error(result, SemanticErrorKind::RedeclaredSymbol, "p");
}

// ── Error location accuracy ─────────────────────────────────────────────

#[test]
fn semantic_error_reports_the_source_line() {
    let source = "program t\nvar a: integer;\nbegin\n  b := 1\nend.";
    match compile(source) {
        Err(CompileError::Semantic { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

// ── Recoverable diagnostics ─────────────────────────────────────────────

#[test]
fn illegal_character_is_reported_and_skipped() {
    let output = compile("program t var a: integer; begin a := 10 @ ; write(a) end.")
        .expect("lexical errors are recoverable");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(matches!(
        output.diagnostics[0],
        Diagnostic::Lexical(ref e) if e.ch == '@'
    ));
}

#[test]
fn comment_newlines_count_toward_line_numbers() {
    let source = "program t { a comment\nspanning\nlines } var a: integer;\nbegin a := 1 ? end.";
    let output = compile(source).expect("recoverable");
    assert_eq!(output.diagnostics.len(), 1);
    match &output.diagnostics[0] {
        Diagnostic::Lexical(e) => {
            assert_eq!(e.ch, '?');
            assert_eq!(e.line, 4);
        }
        other => panic!("expected a lexical diagnostic, got {other:?}"),
    }
}

#[test]
fn syntax_error_recovers_at_the_next_statement() {
    let output = compile("program t var a: integer; begin a := ; a := 2; write(a) end.")
        .expect("syntax errors are recoverable");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(matches!(output.diagnostics[0], Diagnostic::Syntax { .. }));
    // Compilation continued: the second assignment and the write made it
    // into the object code.
    let text = output.program.to_string();
    assert!(text.contains("CRCT 2"));
    assert!(text.contains("IMPR"));
}

#[test]
fn text_after_the_final_dot_is_a_diagnostic() {
    let output = compile("program t var a: integer; begin a := 1 end. leftover")
        .expect("trailing text is recoverable");
    assert_eq!(output.diagnostics.len(), 1);
    assert!(matches!(output.diagnostics[0], Diagnostic::Syntax { .. }));
    // The program itself is complete.
    assert!(output.program.to_string().ends_with("PARA\n"));
}

// ── Scope stack ─────────────────────────────────────────────────────────

#[test]
fn inner_shadowing_does_not_disturb_the_outer_address() {
    let mut table = SymbolTable::new();
    let outer = table
        .declare("x", VarType::Integer, SymbolKind::Variable)
        .expect("fresh name");
    table.enter_scope();
    let inner = table
        .declare("x", VarType::Real, SymbolKind::Parameter)
        .expect("shadowing in an inner scope");
    assert_ne!(outer, inner);
    assert_eq!(table.resolve("x").map(|s| s.address), Some(inner));
    table.leave_scope();
    assert_eq!(table.resolve("x").map(|s| s.address), Some(outer));
    assert_eq!(table.type_of("x"), Some(VarType::Integer));
}

#[test]
fn addresses_are_never_reused_after_a_scope_pops() {
    let mut table = SymbolTable::new();
    table.enter_scope();
    let first = table
        .declare("local", VarType::Integer, SymbolKind::Variable)
        .expect("fresh name");
    table.leave_scope();
    let second = table
        .declare("global", VarType::Integer, SymbolKind::Variable)
        .expect("fresh name");
    assert!(second > first, "popped scope must not free addresses");
}

#[test]
fn the_global_scope_cannot_be_popped() {
    let mut table = SymbolTable::new();
    table
        .declare("x", VarType::Integer, SymbolKind::Variable)
        .expect("fresh name");
    table.leave_scope();
    table.leave_scope();
    assert_eq!(table.depth(), 1);
    assert!(table.resolve("x").is_some());
}
