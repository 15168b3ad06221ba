use std::env;
use std::fs;
use std::path::Path;

use anyhow::Context;

use monkey::compiler::{Bytecode, Compiler};
use monkey::environment::Environment;
use monkey::lexer::Lexer;
use monkey::macros::{define_macros, expand_macros};
use monkey::parser::Parser;
use monkey::repl;
use monkey::vm::VM;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return repl::start().context("repl failed");
    }

    let command = args[1].as_str();
    if args.len() < 3 {
        print_usage();
        std::process::exit(1);
    }
    let filename = args[2].as_str();

    match command {
        "run" => run(filename),
        "build" => build(filename),
        _ => {
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Usage:");
    println!("  monkey                      - Start the REPL");
    println!("  monkey run <file.monkey>    - Compile and run immediately");
    println!("  monkey run <file.monc>     - Run precompiled bytecode");
    println!("  monkey build <file.monkey>  - Compile to a bytecode file");
}

fn run(filename: &str) -> anyhow::Result<()> {
    let bytecode = if filename.ends_with(".monc") {
        let bytes = fs::read(filename)
            .with_context(|| format!("could not read file: {}", filename))?;
        bincode::deserialize(&bytes).context("failed to deserialize bytecode")?
    } else {
        compile_file(filename)?
    };

    let mut machine = VM::new(bytecode);
    machine.run().context("vm error")?;
    Ok(())
}

fn build(filename: &str) -> anyhow::Result<()> {
    let bytecode = compile_file(filename)?;

    let out = Path::new(filename).with_extension("monc");
    let bytes = bincode::serialize(&bytecode).context("failed to serialize bytecode")?;
    fs::write(&out, bytes).with_context(|| format!("could not write {}", out.display()))?;

    println!("wrote {}", out.display());
    Ok(())
}

fn compile_file(filename: &str) -> anyhow::Result<Bytecode> {
    let source = fs::read_to_string(filename)
        .with_context(|| format!("could not read file: {}", filename))?;

    let mut parser = Parser::new(Lexer::new(&source));
    let mut program = parser.parse_program();
    if !parser.errors().is_empty() {
        for msg in parser.errors() {
            eprintln!("parser error: {}", msg);
        }
        anyhow::bail!("parsing failed with {} errors", parser.errors().len());
    }

    let macro_env = Environment::new();
    define_macros(&mut program, &macro_env);
    let expanded = expand_macros(program, &macro_env);

    let mut compiler = Compiler::new();
    compiler.compile(&expanded).context("compiler error")?;
    Ok(compiler.bytecode())
}
