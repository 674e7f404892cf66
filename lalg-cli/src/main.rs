use clap::Parser;
use lalg_compiler::code::Program;
use lalg_compiler::frontend::listing;
use lalg_compiler::vm::Vm;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "lalg")]
#[command(about = "Compiler and stack machine for the LALG teaching language")]
struct Args {
    /// Path to the LALG source file to compile
    #[arg(default_value = "codigo.txt")]
    file: PathBuf,

    /// Where to write the generated object code
    #[arg(short, long, default_value = "codigo_objeto.txt")]
    output: PathBuf,

    /// Write a formatted token listing to this file
    #[arg(long, value_name = "FILE")]
    tokens: Option<PathBuf>,

    /// Compile only; do not execute the program
    #[arg(long)]
    no_run: bool,

    /// Execute an existing object file instead of compiling
    #[arg(long, value_name = "FILE")]
    object: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    // Execute-only mode: load object text and run it, no compilation.
    if let Some(path) = &args.object {
        let text = read_file(path);
        let program = Program::load(&text).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
        execute(program);
        return;
    }

    let source = read_file(&args.file);

    if let Some(path) = &args.tokens {
        let mut lines = listing::token_listing(&source).join("\n");
        lines.push('\n');
        write_file(path, &lines);
    }

    let output = lalg_compiler::compile(&source).unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(1);
    });

    for diagnostic in &output.diagnostics {
        eprintln!("{diagnostic}");
    }

    write_file(&args.output, &output.program.to_string());

    if !output.is_clean() {
        // The object file was still written, but running it would execute
        // degraded code.
        process::exit(1);
    }
    if args.no_run {
        return;
    }

    execute(output.program);
}

fn execute(program: Program) {
    let stdin = io::stdin();
    let mut vm = Vm::new(program, stdin.lock(), io::stdout());
    if let Err(fault) = vm.run() {
        eprintln!("{fault}");
        process::exit(1);
    }
}

fn read_file(path: &PathBuf) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error reading '{}': {e}", path.display());
        process::exit(1);
    })
}

fn write_file(path: &PathBuf, contents: &str) {
    fs::write(path, contents).unwrap_or_else(|e| {
        eprintln!("error writing '{}': {e}", path.display());
        process::exit(1);
    });
}
