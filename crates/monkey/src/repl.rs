use rustyline::history::MemHistory;
use rustyline::Config;

use crate::builtins::BUILTINS;
use crate::compiler::Compiler;
use crate::environment::Environment;
use crate::lexer::Lexer;
use crate::macros::{define_macros, expand_macros};
use crate::parser::Parser;
use crate::symbols::SymbolTable;
use crate::value::Value;
use crate::vm::{VM, GLOBALS_SIZE};

const PROMPT: &str = ">> ";

const MONKEY_FACE: &str = r#"             __,__
     .--. .-"     "-. .--.
    / .. \/ .-. .-. \/ .. \
   | |  '| /   Y   \ |'  | |
   | \   \ \ 0 | 0 / /   / |
   \ '- ,\.-"""""""-./, -' /
    ''-' /_   ^ ^   _\ '-''
        |  \._   _./  |
        \   \ '~' /   /
         '._ '-=-' _.'
            '-----'
"#;

/// Line-at-a-time interactive session. Bindings, constants, and macros
/// persist from one line to the next.
pub fn start() -> rustyline::Result<()> {
    let mut readline =
        rustyline::Editor::<(), _>::with_history(Config::default(), MemHistory::new())?;

    let mut symbol_table = SymbolTable::new();
    for (i, builtin) in BUILTINS.iter().enumerate() {
        symbol_table.define_builtin(i, builtin.name);
    }
    let mut constants: Vec<Value> = Vec::new();
    let mut globals = vec![Value::Null; GLOBALS_SIZE];
    let macro_env = Environment::new();

    while let Ok(line) = readline.readline(PROMPT) {
        readline.add_history_entry(line.as_str())?;

        let mut parser = Parser::new(Lexer::new(&line));
        let mut program = parser.parse_program();
        if !parser.errors().is_empty() {
            print_parser_errors(parser.errors());
            continue;
        }

        define_macros(&mut program, &macro_env);
        let expanded = expand_macros(program, &macro_env);

        let mut compiler = Compiler::with_state(symbol_table, constants);
        let compiled = compiler.compile(&expanded);
        let bytecode = compiler.bytecode();
        (symbol_table, constants) = compiler.into_state();

        if let Err(err) = compiled {
            println!("Woops! Compilation failed:\n {}", err);
            continue;
        }

        let mut machine = VM::with_globals_store(bytecode, globals);
        let outcome = machine.run();
        let last_popped = machine.last_popped_stack_elem();
        globals = machine.into_globals();

        match outcome {
            Ok(()) => println!("{}", last_popped),
            Err(err) => println!("Woops! Executing bytecode failed:\n {}", err),
        }
    }

    Ok(())
}

fn print_parser_errors(errors: &[String]) {
    print!("{}", MONKEY_FACE);
    println!("Woops! We ran into some monkey business here!");
    println!(" parser errors:");
    for msg in errors {
        println!("\t{}", msg);
    }
}
