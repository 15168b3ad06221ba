//! Host functions callable from Monkey code. The table order is load-bearing:
//! the compiler resolves builtins by name, the VM dispatches on the index.
//! Failures come back as `Value::Error` data rather than aborting execution.

use crate::value::Value;

pub type BuiltinFn = fn(Vec<Value>) -> Value;

#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

pub static BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: len,
    },
    Builtin {
        name: "first",
        func: first,
    },
    Builtin {
        name: "last",
        func: last,
    },
    Builtin {
        name: "rest",
        func: rest,
    },
    Builtin {
        name: "push",
        func: push,
    },
    Builtin {
        name: "puts",
        func: puts,
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|b| b.name == name)
}

fn wrong_arg_count(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={}, want={}",
        got, want
    ))
}

fn len(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Value::String(s) => Value::Integer(s.len() as i64),
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        other => Value::Error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn first(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `first` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn last(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::Error(format!(
            "argument to `last` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn rest(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arg_count(args.len(), 1);
    }

    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Value::Null
            } else {
                Value::Array(elements[1..].to_vec())
            }
        }
        other => Value::Error(format!(
            "argument to `rest` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn push(args: Vec<Value>) -> Value {
    if args.len() != 2 {
        return wrong_arg_count(args.len(), 2);
    }

    match &args[0] {
        Value::Array(elements) => {
            let mut extended = elements.clone();
            extended.push(args[1].clone());
            Value::Array(extended)
        }
        other => Value::Error(format!(
            "argument to `push` must be ARRAY, got {}",
            other.type_name()
        )),
    }
}

fn puts(args: Vec<Value>) -> Value {
    for arg in &args {
        println!("{}", arg);
    }
    Value::Null
}
