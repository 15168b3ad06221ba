//! Compile-time macro expansion. Macros are collected out of the program,
//! bound in their own environment, and every call site whose callee resolves
//! to one is replaced by the AST its body evaluates to.

use std::rc::Rc;

use crate::environment::{Env, Environment};
use crate::eval::eval_block_statement;
use crate::parser::{modify_program, Expr, Program, Statement};
use crate::value::{MacroDef, Value};

/// Strips `let name = macro(..) {..}` statements from the program and binds
/// each as a `Value::Macro` in `env`.
pub fn define_macros(program: &mut Program, env: &Env) {
    program.statements.retain(|stmt| {
        let Statement::Let { name, value } = stmt else {
            return true;
        };
        let Expr::Macro { parameters, body } = value else {
            return true;
        };

        let macro_def = MacroDef {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        };
        env.borrow_mut().set(name, Value::Macro(Rc::new(macro_def)));
        false
    });
}

/// Rewrites macro call sites. Arguments are passed unevaluated, wrapped as
/// quoted AST; the macro body must evaluate to a quote, whose node is
/// spliced in place of the call.
pub fn expand_macros(program: Program, env: &Env) -> Program {
    modify_program(program, &mut |expr| {
        let Expr::Call {
            function,
            arguments,
        } = &expr
        else {
            return expr;
        };
        let Expr::Identifier(name) = function.as_ref() else {
            return expr;
        };
        let Some(Value::Macro(macro_def)) = env.borrow().get(name) else {
            return expr;
        };

        if arguments.len() != macro_def.parameters.len() {
            panic!(
                "macro {} expects {} arguments, got {}",
                name,
                macro_def.parameters.len(),
                arguments.len()
            );
        }

        let eval_env = Environment::new_enclosed(Rc::clone(&macro_def.env));
        for (param, arg) in macro_def.parameters.iter().zip(arguments) {
            eval_env
                .borrow_mut()
                .set(param, Value::Quote(arg.clone()));
        }

        match eval_block_statement(&macro_def.body, &eval_env) {
            Value::Quote(node) => node,
            _ => panic!("macros must return a quoted AST node"),
        }
    })
}
