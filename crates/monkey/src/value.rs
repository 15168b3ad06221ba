use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::builtins::Builtin;
use crate::bytecode::Instructions;
use crate::environment::Env;
use crate::error::RuntimeError;
use crate::parser::{BlockStatement, Expr};

/// Runtime values. The same representation serves the compiler's constants
/// pool, the VM stack, and the macro-time evaluator; the last four variants
/// exist only for the latter and are never emitted into a constants pool.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    String(String),
    Null,
    Array(Vec<Value>),
    Hash(HashMap<HashKey, Value>),
    Error(String),
    CompiledFunction(Rc<CompiledFunction>),
    Closure(Rc<Closure>),
    #[serde(skip)]
    Builtin(&'static Builtin),
    #[serde(skip)]
    Function(Rc<Function>),
    #[serde(skip)]
    Quote(Expr),
    #[serde(skip)]
    Macro(Rc<MacroDef>),
}

/// The subset of values usable as hash keys. Keeping the variant distinguishes
/// `1` from `"1"` under the same printed form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(String),
}

impl fmt::Display for HashKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HashKey::Integer(value) => write!(f, "{}", value),
            HashKey::Boolean(value) => write!(f, "{}", value),
            HashKey::String(value) => write!(f, "{}", value),
        }
    }
}

/// A function body lowered to bytecode, plus the stack layout facts the VM
/// needs to set up a call frame for it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompiledFunction {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_parameters: usize,
}

/// A compiled function paired with the values of its free variables,
/// snapshotted at the point the closure was constructed.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Closure {
    pub func: Rc<CompiledFunction>,
    pub free: Vec<Value>,
}

/// A function value for the tree-walking engine; captures its defining
/// environment.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

// The environment can hold the function itself, so Debug must not descend
// into it.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct MacroDef {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
    pub env: Env,
}

impl fmt::Debug for MacroDef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("MacroDef")
            .field("parameters", &self.parameters)
            .field("body", &self.body.to_string())
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::String(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Error(_) => "ERROR",
            Value::CompiledFunction(_) => "COMPILEDFUNCTION",
            Value::Closure(_) => "CLOSURE",
            Value::Builtin(_) => "BUILTIN",
            Value::Function(_) => "FUNCTION",
            Value::Quote(_) => "QUOTE",
            Value::Macro(_) => "MACRO",
        }
    }

    /// Only `false` and `null` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false) | Value::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn hash_key(&self) -> Result<HashKey, RuntimeError> {
        match self {
            Value::Integer(value) => Ok(HashKey::Integer(*value)),
            Value::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Value::String(value) => Ok(HashKey::String(value.clone())),
            other => Err(RuntimeError::UnusableHashKey(other.type_name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Hash(a), Value::Hash(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::CompiledFunction(a), Value::CompiledFunction(b)) => a == b,
            (Value::Closure(a), Value::Closure(b)) => {
                Rc::ptr_eq(a, b) || (a.func == b.func && a.free == b.free)
            }
            (Value::Builtin(a), Value::Builtin(b)) => std::ptr::eq(*a, *b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Quote(a), Value::Quote(b)) => a == b,
            (Value::Macro(a), Value::Macro(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{}", value),
            Value::Boolean(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::Null => write!(f, "null"),
            Value::Array(elements) => {
                write!(f, "[")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                write!(f, "]")
            }
            Value::Hash(pairs) => {
                write!(f, "{{")?;
                let mut first = true;
                for (key, value) in pairs {
                    if !first {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                    first = false;
                }
                write!(f, "}}")
            }
            Value::Error(message) => write!(f, "Error: {}", message),
            Value::CompiledFunction(func) => {
                write!(f, "CompiledFunction[{:p}]", Rc::as_ptr(func))
            }
            Value::Closure(closure) => write!(f, "Closure[{:p}]", Rc::as_ptr(closure)),
            Value::Builtin(_) => write!(f, "builtin function"),
            Value::Function(func) => {
                write!(f, "fn({}) {{\n{}\n}}", func.parameters.join(", "), func.body)
            }
            Value::Quote(node) => write!(f, "QUOTE({})", node),
            Value::Macro(m) => {
                write!(f, "macro({}) {{\n{}\n}}", m.parameters.join(", "), m.body)
            }
        }
    }
}
