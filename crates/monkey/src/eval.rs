//! Tree-walking engine. The macro pass uses it to evaluate macro bodies and
//! `quote`/`unquote`; the benchmark runs whole programs through it for
//! comparison against the VM. Truthiness and error messages follow the
//! compiled semantics wherever both engines are observable.

use std::collections::HashMap;
use std::rc::Rc;

use crate::builtins;
use crate::environment::{Env, Environment};
use crate::parser::{modify_expr, BlockStatement, Expr, Program, Statement};
use crate::value::{Function, Value};

/// A `return` unwinding through nested blocks. Riding on `Err` lets `?`
/// carry it out of arbitrarily deep expression nesting.
pub enum Interrupt {
    Return(Value),
}

type EvalResult = Result<Value, Interrupt>;

pub fn eval_program(program: &Program, env: &Env) -> Value {
    match eval_statements(&program.statements, env) {
        Ok(value) => value,
        Err(Interrupt::Return(value)) => value,
    }
}

/// Evaluates a block and absorbs any `return` into a plain value. This is
/// the function-body and macro-body entry point.
pub fn eval_block_statement(block: &BlockStatement, env: &Env) -> Value {
    match eval_statements(&block.statements, env) {
        Ok(value) => value,
        Err(Interrupt::Return(value)) => value,
    }
}

fn eval_statements(statements: &[Statement], env: &Env) -> EvalResult {
    let mut result = Value::Null;

    for stmt in statements {
        result = eval_statement(stmt, env)?;
        if result.is_error() {
            return Ok(result);
        }
    }

    Ok(result)
}

fn eval_statement(stmt: &Statement, env: &Env) -> EvalResult {
    match stmt {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env)?;
            if value.is_error() {
                return Ok(value);
            }
            env.borrow_mut().set(name, value);
            Ok(Value::Null)
        }
        Statement::Return(value) => {
            let value = eval_expression(value, env)?;
            if value.is_error() {
                return Ok(value);
            }
            Err(Interrupt::Return(value))
        }
        Statement::Expression(value) => eval_expression(value, env),
    }
}

fn eval_expression(expr: &Expr, env: &Env) -> EvalResult {
    match expr {
        Expr::Integer(value) => Ok(Value::Integer(*value)),
        Expr::Str(value) => Ok(Value::String(value.clone())),
        Expr::Boolean(value) => Ok(Value::Boolean(*value)),
        Expr::Identifier(name) => Ok(eval_identifier(name, env)),
        Expr::Prefix { operator, right } => {
            let right = eval_expression(right, env)?;
            if right.is_error() {
                return Ok(right);
            }
            Ok(eval_prefix_expression(operator, right))
        }
        Expr::Infix {
            left,
            operator,
            right,
        } => {
            let left = eval_expression(left, env)?;
            if left.is_error() {
                return Ok(left);
            }
            let right = eval_expression(right, env)?;
            if right.is_error() {
                return Ok(right);
            }
            Ok(eval_infix_expression(operator, left, right))
        }
        Expr::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env)?;
            if condition.is_error() {
                return Ok(condition);
            }
            if condition.is_truthy() {
                eval_statements(&consequence.statements, env)
            } else if let Some(alternative) = alternative {
                eval_statements(&alternative.statements, env)
            } else {
                Ok(Value::Null)
            }
        }
        Expr::Function {
            parameters, body, ..
        } => Ok(Value::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        }))),
        Expr::Call {
            function,
            arguments,
        } => {
            if arguments.len() == 1
                && matches!(function.as_ref(), Expr::Identifier(name) if name == "quote")
            {
                return Ok(quote(arguments[0].clone(), env));
            }

            let function = eval_expression(function, env)?;
            if function.is_error() {
                return Ok(function);
            }

            let mut args = Vec::with_capacity(arguments.len());
            for arg in arguments {
                let arg = eval_expression(arg, env)?;
                if arg.is_error() {
                    return Ok(arg);
                }
                args.push(arg);
            }

            Ok(apply_function(function, args))
        }
        Expr::Array(elements) => {
            let mut values = Vec::with_capacity(elements.len());
            for elem in elements {
                let value = eval_expression(elem, env)?;
                if value.is_error() {
                    return Ok(value);
                }
                values.push(value);
            }
            Ok(Value::Array(values))
        }
        Expr::Hash(pairs) => eval_hash_literal(pairs, env),
        Expr::Index { left, index } => {
            let left = eval_expression(left, env)?;
            if left.is_error() {
                return Ok(left);
            }
            let index = eval_expression(index, env)?;
            if index.is_error() {
                return Ok(index);
            }
            Ok(eval_index_expression(left, index))
        }
        // Macro literals only appear transiently; the expansion pass consumes
        // them before anything evaluates.
        Expr::Macro { .. } => Ok(Value::Null),
    }
}

fn eval_identifier(name: &str, env: &Env) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = builtins::lookup(name) {
        return Value::Builtin(builtin);
    }
    Value::Error(format!("identifier not found: {}", name))
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => Value::Boolean(!right.is_truthy()),
        "-" => match right {
            Value::Integer(value) => Value::Integer(value.wrapping_neg()),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
        other => Value::Error(format!(
            "unknown operator: {}{}",
            other,
            right.type_name()
        )),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Value::String(l), Value::String(r)) => {
            if operator == "+" {
                Value::String(format!("{}{}", l, r))
            } else {
                Value::Error(format!("unknown operator: STRING {} STRING", operator))
            }
        }
        (Value::Boolean(l), Value::Boolean(r)) => match operator {
            "==" => Value::Boolean(l == r),
            "!=" => Value::Boolean(l != r),
            _ => Value::Error(format!("unknown operator: BOOLEAN {} BOOLEAN", operator)),
        },
        (l, r) if l.type_name() != r.type_name() => Value::Error(format!(
            "type mismatch: {} {} {}",
            l.type_name(),
            operator,
            r.type_name()
        )),
        (l, r) => Value::Error(format!(
            "unknown operator: {} {} {}",
            l.type_name(),
            operator,
            r.type_name()
        )),
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left.wrapping_add(right)),
        "-" => Value::Integer(left.wrapping_sub(right)),
        "*" => Value::Integer(left.wrapping_mul(right)),
        "/" => Value::Integer(left.wrapping_div(right)),
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        _ => Value::Error(format!("unknown operator: INTEGER {} INTEGER", operator)),
    }
}

fn apply_function(function: Value, args: Vec<Value>) -> Value {
    match function {
        Value::Function(func) => {
            if args.len() != func.parameters.len() {
                return Value::Error(format!(
                    "wrong number of arguments: want={}, got={}",
                    func.parameters.len(),
                    args.len()
                ));
            }

            let extended = Environment::new_enclosed(Rc::clone(&func.env));
            for (param, arg) in func.parameters.iter().zip(args) {
                extended.borrow_mut().set(param, arg);
            }

            eval_block_statement(&func.body, &extended)
        }
        Value::Builtin(builtin) => (builtin.func)(args),
        other => Value::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_hash_literal(pairs: &[(Expr, Expr)], env: &Env) -> EvalResult {
    let mut hash = HashMap::with_capacity(pairs.len());

    for (key, value) in pairs {
        let key = eval_expression(key, env)?;
        if key.is_error() {
            return Ok(key);
        }
        let key = match key.hash_key() {
            Ok(key) => key,
            Err(err) => return Ok(Value::Error(err.to_string())),
        };

        let value = eval_expression(value, env)?;
        if value.is_error() {
            return Ok(value);
        }

        hash.insert(key, value);
    }

    Ok(Value::Hash(hash))
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match (left, index) {
        (Value::Array(elements), Value::Integer(idx)) => {
            if idx < 0 || idx as usize >= elements.len() {
                Value::Null
            } else {
                elements[idx as usize].clone()
            }
        }
        (Value::Hash(pairs), index) => match index.hash_key() {
            Ok(key) => pairs.get(&key).cloned().unwrap_or(Value::Null),
            Err(err) => Value::Error(err.to_string()),
        },
        (left, _) => Value::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

/// `quote(..)` freezes its argument as an AST value, evaluating any
/// `unquote(..)` calls inside it first.
fn quote(node: Expr, env: &Env) -> Value {
    let node = eval_unquote_calls(node, env);
    Value::Quote(node)
}

fn eval_unquote_calls(node: Expr, env: &Env) -> Expr {
    modify_expr(node, &mut |expr| {
        let Expr::Call {
            function,
            arguments,
        } = &expr
        else {
            return expr;
        };
        if !matches!(function.as_ref(), Expr::Identifier(name) if name == "unquote") {
            return expr;
        }
        if arguments.len() != 1 {
            return expr;
        }

        let evaluated = match eval_expression(&arguments[0], env) {
            Ok(value) => value,
            Err(Interrupt::Return(value)) => value,
        };

        value_to_expr(evaluated).unwrap_or(expr)
    })
}

fn value_to_expr(value: Value) -> Option<Expr> {
    match value {
        Value::Integer(value) => Some(Expr::Integer(value)),
        Value::Boolean(value) => Some(Expr::Boolean(value)),
        Value::String(value) => Some(Expr::Str(value)),
        Value::Quote(node) => Some(node),
        _ => None,
    }
}
