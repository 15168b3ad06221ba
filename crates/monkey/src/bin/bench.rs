use std::time::Instant;

use monkey::compiler::Compiler;
use monkey::environment::Environment;
use monkey::eval::eval_program;
use monkey::lexer::Lexer;
use monkey::parser::Parser;
use monkey::vm::VM;

const INPUT: &str = "
let fibonacci = fn(x) {
    if (x == 0) {
        0
    } else {
        if (x == 1) {
            return 1;
        } else {
            fibonacci(x - 1) + fibonacci(x - 2);
        }
    }
};

fibonacci(35);
";

fn main() {
    let engine = std::env::args()
        .find_map(|arg| arg.strip_prefix("--engine=").map(|s| s.to_string()))
        .unwrap_or_else(|| "vm".to_string());

    let mut parser = Parser::new(Lexer::new(INPUT));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        eprintln!("parser errors: {:?}", parser.errors());
        return;
    }

    let (result, duration) = if engine == "vm" {
        let mut compiler = Compiler::new();
        if let Err(err) = compiler.compile(&program) {
            eprintln!("compiler error: {}", err);
            return;
        }

        let mut machine = VM::new(compiler.bytecode());
        let start = Instant::now();
        if let Err(err) = machine.run() {
            eprintln!("vm error: {}", err);
            return;
        }
        (machine.last_popped_stack_elem(), start.elapsed())
    } else {
        let env = Environment::new();
        let start = Instant::now();
        (eval_program(&program, &env), start.elapsed())
    };

    println!("engine={}, result={}, duration={:?}", engine, result, duration);
}
